use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    build_report, lookup, parse_visit_date, AnalysisConfig, AnalysisReport, AnalysisSession,
    GuidanceEntry, Observation, PatientInfo, Readings, TrendError,
};

/// One visit as received from the caller, values still in text form.
///
/// `None` or a blank string means the parameter was not measured. Zero is a
/// real reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct VisitInput {
    pub date: String,
    #[serde(default)]
    pub values: BTreeMap<String, Option<String>>,
}

impl VisitInput {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, parameter: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(parameter.into(), Some(value.into()));
        self
    }
}

/// Everything a front end needs to render the result of one request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisOutcome {
    pub analysis: AnalysisReport,
    pub guidance: BTreeMap<String, GuidanceEntry>,
    pub abnormal_parameters: Vec<String>,
}

/// Runs a full analysis in a fresh session.
///
/// Any unparseable date or value fails the whole request. Visits carrying no
/// reading at all are validated but not recorded. A request where no
/// parameter reaches two readings is `AnalysisUnavailable`.
pub fn run_analysis(
    patient_info: PatientInfo,
    visits: &[VisitInput],
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, TrendError> {
    if visits.is_empty() {
        warn!("analysis requested without any visit");
        return Err(TrendError::NoReports);
    }

    let mut session = AnalysisSession::with_patient(patient_info);

    for (index, visit) in visits.iter().enumerate() {
        let visit_no = index + 1;
        let date = parse_visit_date(&visit.date).map_err(|err| {
            warn!(visit = visit_no, date = %visit.date, "rejecting visit date");
            err
        })?;

        let readings = coerce_readings(visit, visit_no)?;
        if readings.is_empty() {
            debug!(visit = visit_no, "visit has no readings, skipped");
            continue;
        }

        session.push_observation(Observation::new(date, readings));
    }

    let analysis = build_report(&session, &config.ranges)
        .filter(|report| !report.parameters.is_empty())
        .ok_or_else(|| {
            warn!(
                visits = session.observations().len(),
                "no parameter has enough readings"
            );
            TrendError::AnalysisUnavailable
        })?;

    let abnormal_parameters = analysis.abnormal_parameters(config.ranges.names());
    let guidance = lookup(abnormal_parameters.as_slice());

    info!(
        visits = analysis.total_visits,
        parameters = analysis.parameters.len(),
        abnormal = abnormal_parameters.len(),
        "analysis complete"
    );

    Ok(AnalysisOutcome {
        analysis,
        guidance,
        abnormal_parameters,
    })
}

fn coerce_readings(visit: &VisitInput, visit_no: usize) -> Result<Readings, TrendError> {
    let mut readings = Readings::new();

    for (parameter, raw) in &visit.values {
        let Some(raw) = raw.as_deref().map(str::trim) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }

        let value = raw
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                warn!(visit = visit_no, parameter = %parameter, "rejecting non-numeric value");
                TrendError::InvalidValue {
                    parameter: parameter.clone(),
                    visit: visit_no,
                    value: raw.to_string(),
                }
            })?;

        readings.insert(parameter.clone(), value);
    }

    Ok(readings)
}
