use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Parameter;

/// General lifestyle suggestions for one parameter. Not personalised.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GuidanceEntry {
    pub care: Vec<String>,
    pub avoid: Vec<String>,
}

struct GuidanceText {
    care: &'static [&'static str],
    avoid: &'static [&'static str],
}

const GLUCOSE: GuidanceText = GuidanceText {
    care: &[
        "Monitor carbohydrate intake",
        "Maintain regular meal timing",
        "Stay physically active",
    ],
    avoid: &[
        "Excessive sugar and refined carbs",
        "Prolonged fasting or irregular meals",
        "Sedentary lifestyle",
    ],
};

const CHOLESTEROL: GuidanceText = GuidanceText {
    care: &[
        "Include fiber-rich foods",
        "Choose healthy fats (olive oil, nuts)",
        "Regular exercise",
    ],
    avoid: &[
        "Trans fats and excessive saturated fats",
        "Smoking",
        "Excessive alcohol",
    ],
};

const BLOOD_PRESSURE: GuidanceText = GuidanceText {
    care: &[
        "Reduce sodium intake",
        "Manage stress",
        "Regular cardiovascular exercise",
    ],
    avoid: &["Excessive salt", "Chronic stress", "Excessive caffeine"],
};

impl Parameter {
    pub fn guidance(self) -> GuidanceEntry {
        let text = match self {
            Parameter::Glucose => &GLUCOSE,
            Parameter::Cholesterol => &CHOLESTEROL,
            Parameter::BloodPressure => &BLOOD_PRESSURE,
        };
        GuidanceEntry {
            care: text.care.iter().map(|s| s.to_string()).collect(),
            avoid: text.avoid.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Guidance for every listed parameter the table knows; others are skipped.
pub fn lookup<S: AsRef<str>>(abnormal_parameters: &[S]) -> BTreeMap<String, GuidanceEntry> {
    abnormal_parameters
        .iter()
        .filter_map(|name| Parameter::from_name(name.as_ref()))
        .map(|param| (param.as_str().to_string(), param.guidance()))
        .collect()
}
