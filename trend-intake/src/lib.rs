//! JSON request body to `AnalysisOutcome` adapter.
//!
//! Accepts the shape posted by the report form:
//! `{ "patient_info": {..}, "reports": [ { "date": "..", "glucose": "..", .. } ] }`.

use serde_json::{json, Value};
use tracing::debug;
use trend_core::{
    run_analysis, AnalysisConfig, AnalysisOutcome, PatientInfo, TrendError, VisitInput,
};

/// Patient metadata and visits extracted from a request body.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub patient_info: PatientInfo,
    pub visits: Vec<VisitInput>,
}

/// Analyze a request given as a JSON string.
pub fn analyze_request_str(
    request_json: &str,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, TrendError> {
    let value: Value =
        serde_json::from_str(request_json).map_err(|err| TrendError::Parse(err.to_string()))?;
    analyze_request_value(&value, config)
}

/// Analyze a request given as a `serde_json::Value`.
pub fn analyze_request_value(
    request: &Value,
    config: &AnalysisConfig,
) -> Result<AnalysisOutcome, TrendError> {
    let parsed = parse_request(request, config)?;
    run_analysis(parsed.patient_info, &parsed.visits, config)
}

/// Map the request body onto core inputs.
///
/// Only parameters present in `config.ranges` are read from each report;
/// other keys are ignored.
pub fn parse_request(request: &Value, config: &AnalysisConfig) -> Result<AnalysisRequest, TrendError> {
    if !request.is_object() {
        return Err(TrendError::Parse(
            "Expected a JSON object request body".to_string(),
        ));
    }

    let patient_info = request
        .get("patient_info")
        .map(extract_patient_info)
        .unwrap_or_default();

    let reports = match request.get("reports") {
        None | Some(Value::Null) => return Err(TrendError::NoReports),
        Some(Value::Array(reports)) => reports,
        Some(other) => {
            return Err(TrendError::Parse(format!(
                "Expected `reports` to be an array, received {}",
                json_type_name(other)
            )))
        }
    };

    let visits = reports
        .iter()
        .enumerate()
        .map(|(index, report)| extract_visit(report, index + 1, config))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(visits = visits.len(), "request parsed");

    Ok(AnalysisRequest {
        patient_info,
        visits,
    })
}

/// Serialize an outcome to the response body.
pub fn outcome_to_value(outcome: &AnalysisOutcome) -> Result<Value, TrendError> {
    serde_json::to_value(outcome).map_err(|err| TrendError::Internal(err.to_string()))
}

/// Response body for a failed request: `{ "error": message }`.
pub fn error_body(err: &TrendError) -> Value {
    json!({ "error": err.to_string() })
}

fn extract_patient_info(value: &Value) -> PatientInfo {
    let defaults = PatientInfo::default();
    PatientInfo {
        name: text_field(value, "name").unwrap_or(defaults.name),
        id: text_field(value, "id").unwrap_or(defaults.id),
        age: text_field(value, "age").unwrap_or(defaults.age),
        gender: text_field(value, "gender").unwrap_or(defaults.gender),
        report_type: text_field(value, "report_type").unwrap_or(defaults.report_type),
    }
}

fn text_field(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn extract_visit(
    report: &Value,
    visit_no: usize,
    config: &AnalysisConfig,
) -> Result<VisitInput, TrendError> {
    let Some(fields) = report.as_object() else {
        return Err(TrendError::Parse(format!(
            "Report {visit_no} must be an object, received {}",
            json_type_name(report)
        )));
    };

    let date = match fields.get("date") {
        Some(Value::String(text)) => text.clone(),
        Some(other) => {
            return Err(TrendError::InvalidDate {
                date: other.to_string(),
            })
        }
        None => {
            return Err(TrendError::InvalidDate {
                date: String::new(),
            })
        }
    };

    let mut visit = VisitInput::new(date);
    for parameter in config.ranges.names() {
        let reading = match fields.get(parameter) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) => Some(text.clone()),
            Some(Value::Number(number)) => Some(number.to_string()),
            Some(other) => {
                return Err(TrendError::InvalidValue {
                    parameter: parameter.to_string(),
                    visit: visit_no,
                    value: other.to_string(),
                })
            }
        };
        visit.values.insert(parameter.to_string(), reading);
    }

    Ok(visit)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
