use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::format_date;
use crate::{
    detect_trend, find_abnormal, AbnormalVisit, AnalysisSession, PatientInfo, ReferenceRange,
    ReferenceRanges, TrendResult,
};

/// First and last visit dates of a session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterAnalysis {
    /// Sent as `[low, high]`, the shape the report page indexes into.
    #[serde(with = "range_pair")]
    pub normal_range: ReferenceRange,
    pub trend: TrendResult,
    pub abnormalities: Vec<AbnormalVisit>,
    pub abnormal_count: usize,
}

mod range_pair {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::ReferenceRange;

    pub fn serialize<S: Serializer>(range: &ReferenceRange, serializer: S) -> Result<S::Ok, S::Error> {
        (range.low, range.high).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ReferenceRange, D::Error> {
        let (low, high) = <(f64, f64)>::deserialize(deserializer)?;
        Ok(ReferenceRange::new(low, high))
    }
}

/// Longitudinal summary of one session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisReport {
    pub patient_info: PatientInfo,
    pub total_visits: usize,
    pub date_range: DateRange,
    pub parameters: BTreeMap<String, ParameterAnalysis>,
}

impl AnalysisReport {
    pub fn parameter(&self, name: &str) -> Option<&ParameterAnalysis> {
        self.parameters.get(name)
    }

    /// Names with at least one abnormal visit, in the order given by `order`.
    pub fn abnormal_parameters<'a>(&self, order: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        order
            .into_iter()
            .filter(|name| {
                self.parameters
                    .get(*name)
                    .is_some_and(|analysis| analysis.abnormal_count > 0)
            })
            .map(str::to_string)
            .collect()
    }
}

/// Assembles trend and range results for every parameter of `ranges`.
///
/// Returns `None` for a session without observations. Parameters recorded on
/// fewer than two visits are left out, abnormal or not.
pub fn build_report(session: &AnalysisSession, ranges: &ReferenceRanges) -> Option<AnalysisReport> {
    let observations = session.observations();
    let first = observations.first()?;
    let last = observations.last()?;

    let mut parameters = BTreeMap::new();
    for (name, range) in ranges.iter() {
        let Some(trend) = detect_trend(observations, name) else {
            debug!(parameter = name, "not enough readings for a trend");
            continue;
        };

        let abnormalities = find_abnormal(observations, name, range);
        debug!(
            parameter = name,
            trend = ?trend.trend,
            abnormal = abnormalities.len(),
            "parameter analysed"
        );

        parameters.insert(
            name.to_string(),
            ParameterAnalysis {
                normal_range: range,
                trend,
                abnormal_count: abnormalities.len(),
                abnormalities,
            },
        );
    }

    Some(AnalysisReport {
        patient_info: session.patient_info().clone(),
        total_visits: observations.len(),
        date_range: DateRange {
            start: format_date(first.date),
            end: format_date(last.date),
        },
        parameters,
    })
}
