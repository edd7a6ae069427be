use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PatientInfo, TrendError};

/// Numeric readings of one visit, keyed by parameter name.
pub type Readings = BTreeMap<String, f64>;

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// One visit: a calendar date and whatever was measured on it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub data: Readings,
}

impl Observation {
    pub fn new(date: NaiveDate, data: Readings) -> Self {
        Self { date, data }
    }

    pub fn value(&self, parameter: &str) -> Option<f64> {
        self.data.get(parameter).copied()
    }

    /// Date as shown in reports (`YYYY-MM-DD`).
    pub fn display_date(&self) -> String {
        format_date(self.date)
    }
}

/// Observations of a session, always ascending by date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    items: Vec<Observation>,
}

impl ObservationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends and restores date order. Same-date visits keep arrival order.
    pub fn push(&mut self, observation: Observation) {
        self.items.push(observation);
        self.items.sort_by_key(|obs| obs.date);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Observation] {
        &self.items
    }

    pub fn first(&self) -> Option<&Observation> {
        self.items.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Chronological `(date, value)` pairs for visits that recorded `parameter`.
    pub fn series<'a>(
        &'a self,
        parameter: &'a str,
    ) -> impl Iterator<Item = (&'a Observation, f64)> + 'a {
        self.items
            .iter()
            .filter_map(move |obs| obs.value(parameter).map(|value| (obs, value)))
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// State of a single analysis request. Never shared between requests.
#[derive(Debug, Clone, Default)]
pub struct AnalysisSession {
    patient_info: PatientInfo,
    observations: ObservationSet,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_patient(patient_info: PatientInfo) -> Self {
        Self {
            patient_info,
            observations: ObservationSet::new(),
        }
    }

    pub fn set_patient_info(
        &mut self,
        name: impl Into<String>,
        id: impl Into<String>,
        age: impl Into<String>,
        gender: impl Into<String>,
        report_type: impl Into<String>,
    ) {
        self.patient_info = PatientInfo::new(name, id, age, gender, report_type);
    }

    /// Parses `date` and records the visit.
    pub fn add_observation(&mut self, values: Readings, date: &str) -> Result<(), TrendError> {
        let date = parse_visit_date(date)?;
        self.push_observation(Observation::new(date, values));
        Ok(())
    }

    pub fn push_observation(&mut self, observation: Observation) {
        debug!(
            date = %observation.date,
            readings = observation.data.len(),
            "recording observation"
        );
        self.observations.push(observation);
    }

    pub fn patient_info(&self) -> &PatientInfo {
        &self.patient_info
    }

    pub fn observations(&self) -> &ObservationSet {
        &self.observations
    }
}

/// Reads a visit date. Time-of-day parts are accepted and dropped.
pub fn parse_visit_date(value: &str) -> Result<NaiveDate, TrendError> {
    let text = value.trim();

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }

    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.date_naive())
        .map_err(|_| TrendError::InvalidDate {
            date: value.to_string(),
        })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
