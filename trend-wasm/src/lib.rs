//! WASM <-> JavaScript bridge for the report form, framework neutral.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_wasm_bindgen::{from_value, to_value};
use trend_core::{AnalysisConfig, AnalysisOutcome, ReferenceRange, TrendError};
use wasm_bindgen::prelude::*;

#[derive(Deserialize, Default)]
struct JsAnalysisConfig {
    #[serde(default)]
    ranges: Option<BTreeMap<String, ReferenceRange>>,
}

impl TryFrom<JsAnalysisConfig> for AnalysisConfig {
    type Error = TrendError;

    fn try_from(cfg: JsAnalysisConfig) -> Result<Self, Self::Error> {
        let base = AnalysisConfig::default();
        match cfg.ranges {
            Some(ranges) => base.with_overrides(ranges),
            None => Ok(base),
        }
    }
}

/// Analyze a `{ patient_info, reports }` object.
///
/// `config` may carry `{ ranges: { glucose: { low, high }, .. } }` to override
/// or extend the default reference table.
#[wasm_bindgen]
pub fn analyze_reports(request: JsValue, config: Option<JsValue>) -> Result<JsValue, JsValue> {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    let request_value = from_value::<serde_json::Value>(request)
        .map_err(|err| JsValue::from_str(&format!("Cannot read request JSON: {err}")))?;

    let js_cfg = match config {
        Some(js_cfg) if !js_cfg.is_undefined() && !js_cfg.is_null() => {
            let cfg: JsAnalysisConfig = from_value(js_cfg)
                .map_err(|err| JsValue::from_str(&format!("Cannot read config: {err}")))?;
            Some(cfg)
        }
        _ => None,
    };

    let outcome = analyze_value(&request_value, js_cfg).map_err(|err| JsValue::from_str(&err))?;

    to_value(&outcome).map_err(|err| JsValue::from_str(&format!("Cannot serialize analysis: {err}")))
}

/// Default reference table, for pre-filling range inputs.
#[wasm_bindgen]
pub fn default_ranges() -> Result<JsValue, JsValue> {
    to_value(&range_table(&AnalysisConfig::default()))
        .map_err(|err| JsValue::from_str(&format!("Cannot serialize ranges: {err}")))
}

fn analyze_value(
    request: &serde_json::Value,
    js_cfg: Option<JsAnalysisConfig>,
) -> Result<AnalysisOutcome, String> {
    let cfg = AnalysisConfig::try_from(js_cfg.unwrap_or_default()).map_err(format_trend_error)?;
    trend_intake::analyze_request_value(request, &cfg).map_err(format_trend_error)
}

fn range_table(config: &AnalysisConfig) -> BTreeMap<String, ReferenceRange> {
    config
        .ranges
        .iter()
        .map(|(name, range)| (name.to_string(), range))
        .collect()
}

fn format_trend_error(err: TrendError) -> String {
    format!("Analysis error: {err}")
}
