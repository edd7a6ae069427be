//! Core engine for longitudinal analysis of clinical readings across visits.
//!
//! A caller builds one [`AnalysisSession`] per request, fills it with dated
//! observations and asks [`build_report`] for trends and out-of-range visits.
//! [`run_analysis`] wraps the whole flow for already-parsed request data.

mod analysis;
mod audit;
mod guidance;
mod report;
mod session;
mod trend;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use analysis::{run_analysis, AnalysisOutcome, VisitInput};
pub use audit::{find_abnormal, AbnormalStatus, AbnormalVisit};
pub use guidance::{lookup, GuidanceEntry};
pub use report::{build_report, AnalysisReport, DateRange, ParameterAnalysis};
pub use session::{parse_visit_date, AnalysisSession, Observation, ObservationSet, Readings};
pub use trend::{detect_trend, TrendDirection, TrendResult};

/// Identifying metadata attached to a report. Free-form, never validated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PatientInfo {
    pub name: String,
    pub id: String,
    pub age: String,
    pub gender: String,
    pub report_type: String,
}

impl PatientInfo {
    pub fn new(
        name: impl Into<String>,
        id: impl Into<String>,
        age: impl Into<String>,
        gender: impl Into<String>,
        report_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
            age: age.into(),
            gender: gender.into(),
            report_type: report_type.into(),
        }
    }
}

impl Default for PatientInfo {
    fn default() -> Self {
        Self::new("Unknown", "N/A", "N/A", "N/A", "General")
    }
}

/// Parameters known to the guidance table and to the default range table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    Glucose,
    Cholesterol,
    BloodPressure,
}

impl Parameter {
    pub const ALL: [Parameter; 3] = [
        Parameter::Glucose,
        Parameter::Cholesterol,
        Parameter::BloodPressure,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Parameter::Glucose => "glucose",
            Parameter::Cholesterol => "cholesterol",
            Parameter::BloodPressure => "blood_pressure",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|param| param.as_str() == name)
    }

    /// Range applied when the caller does not supply one.
    pub fn default_range(self) -> ReferenceRange {
        match self {
            Parameter::Glucose => ReferenceRange::new(70.0, 100.0),
            Parameter::Cholesterol => ReferenceRange::new(0.0, 200.0),
            Parameter::BloodPressure => ReferenceRange::new(90.0, 120.0),
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive bounds of the normal interval for one parameter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ReferenceRange {
    pub low: f64,
    pub high: f64,
}

impl ReferenceRange {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    pub fn is_well_formed(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }
}

/// One row of the reference table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RangeEntry {
    pub parameter: String,
    #[serde(flatten)]
    pub range: ReferenceRange,
}

/// Ordered table of reference ranges. Report order follows table order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct ReferenceRanges {
    entries: Vec<RangeEntry>,
}

impl ReferenceRanges {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Replaces the range of a known parameter in place, appends otherwise.
    pub fn insert(
        &mut self,
        parameter: impl Into<String>,
        range: ReferenceRange,
    ) -> Result<(), TrendError> {
        let parameter = parameter.into();
        if !range.is_well_formed() {
            return Err(TrendError::InvalidRange {
                parameter,
                low: range.low,
                high: range.high,
            });
        }

        match self
            .entries
            .iter_mut()
            .find(|entry| entry.parameter == parameter)
        {
            Some(entry) => entry.range = range,
            None => self.entries.push(RangeEntry { parameter, range }),
        }
        Ok(())
    }

    pub fn get(&self, parameter: &str) -> Option<ReferenceRange> {
        self.entries
            .iter()
            .find(|entry| entry.parameter == parameter)
            .map(|entry| entry.range)
    }

    pub fn contains(&self, parameter: &str) -> bool {
        self.get(parameter).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ReferenceRange)> {
        self.entries
            .iter()
            .map(|entry| (entry.parameter.as_str(), entry.range))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.parameter.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ReferenceRanges {
    fn default() -> Self {
        Self {
            entries: Parameter::ALL
                .into_iter()
                .map(|param| RangeEntry {
                    parameter: param.as_str().to_string(),
                    range: param.default_range(),
                })
                .collect(),
        }
    }
}

/// Settings for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub ranges: ReferenceRanges,
}

impl AnalysisConfig {
    /// Applies caller-supplied ranges on top of the current table.
    pub fn with_overrides<I, S>(mut self, overrides: I) -> Result<Self, TrendError>
    where
        I: IntoIterator<Item = (S, ReferenceRange)>,
        S: Into<String>,
    {
        for (parameter, range) in overrides {
            self.ranges.insert(parameter, range)?;
        }
        Ok(self)
    }
}

/// Failures surfaced to the caller of the analysis.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendError {
    #[error("Invalid visit date {date:?}")]
    InvalidDate { date: String },
    #[error("Invalid value {value:?} for {parameter} in visit {visit}")]
    InvalidValue {
        parameter: String,
        visit: usize,
        value: String,
    },
    #[error("No reports provided")]
    NoReports,
    #[error("Unable to generate analysis: not enough visits per parameter")]
    AnalysisUnavailable,
    #[error("Invalid reference range for {parameter}: [{low}, {high}]")]
    InvalidRange {
        parameter: String,
        low: f64,
        high: f64,
    },
    #[error("Cannot read request: {0}")]
    Parse(String),
    #[error("Internal analysis error: {0}")]
    Internal(String),
}

impl TrendError {
    /// True when the request itself is at fault rather than the engine.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, TrendError::Internal(_))
    }
}
