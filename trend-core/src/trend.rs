use serde::{Deserialize, Serialize};

use crate::ObservationSet;

/// Direction of change between the first and last reading.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

/// Chart-ready series of a parameter plus its first-to-last change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendResult {
    pub dates: Vec<String>,
    pub values: Vec<f64>,
    pub trend: TrendDirection,
    pub change: f64,
}

/// Compares the earliest and latest readings of `parameter`.
///
/// Readings in between are returned for display only; they never affect
/// `trend` or `change`. Returns `None` when fewer than two visits recorded
/// the parameter.
pub fn detect_trend(observations: &ObservationSet, parameter: &str) -> Option<TrendResult> {
    let (dates, values): (Vec<String>, Vec<f64>) = observations
        .series(parameter)
        .map(|(obs, value)| (obs.display_date(), value))
        .unzip();

    if values.len() < 2 {
        return None;
    }

    let first = *values.first()?;
    let last = *values.last()?;

    let trend = if last > first {
        TrendDirection::Increasing
    } else if last < first {
        TrendDirection::Decreasing
    } else {
        TrendDirection::Stable
    };

    Some(TrendResult {
        dates,
        values,
        trend,
        change: round_to_cents(last - first),
    })
}

fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AnalysisSession;

    fn session_with(parameter: &str, points: &[(&str, f64)]) -> AnalysisSession {
        let mut session = AnalysisSession::new();
        for (date, value) in points {
            session
                .add_observation([(parameter.to_string(), *value)].into(), date)
                .unwrap();
        }
        session
    }

    #[test]
    fn label_uses_first_and_last_only() {
        let session = session_with(
            "glucose",
            &[("2024-01-01", 90.0), ("2024-02-01", 150.0), ("2024-03-01", 80.0)],
        );
        let trend = detect_trend(session.observations(), "glucose").unwrap();

        assert_eq!(trend.trend, TrendDirection::Decreasing);
        assert_eq!(trend.change, -10.0);
        assert_eq!(trend.values, vec![90.0, 150.0, 80.0]);
        assert_eq!(trend.dates, vec!["2024-01-01", "2024-02-01", "2024-03-01"]);
    }

    #[test]
    fn equal_endpoints_are_stable() {
        let session = session_with(
            "cholesterol",
            &[("2024-01-01", 180.0), ("2024-02-01", 240.0), ("2024-03-01", 180.0)],
        );
        let trend = detect_trend(session.observations(), "cholesterol").unwrap();
        assert_eq!(trend.trend, TrendDirection::Stable);
        assert_eq!(trend.change, 0.0);
    }

    #[test]
    fn single_reading_has_no_trend() {
        let session = session_with("glucose", &[("2024-01-01", 110.0)]);
        assert!(detect_trend(session.observations(), "glucose").is_none());
        assert!(detect_trend(session.observations(), "cholesterol").is_none());
    }

    #[test]
    fn visits_without_the_parameter_are_skipped() {
        let mut session = session_with("glucose", &[("2024-01-01", 95.1)]);
        session
            .add_observation([("cholesterol".to_string(), 210.0)].into(), "2024-01-15")
            .unwrap();
        session
            .add_observation([("glucose".to_string(), 101.3)].into(), "2024-02-01")
            .unwrap();

        let trend = detect_trend(session.observations(), "glucose").unwrap();
        assert_eq!(trend.dates, vec!["2024-01-01", "2024-02-01"]);
        assert_eq!(trend.trend, TrendDirection::Increasing);
        assert_eq!(trend.change, 6.2);
    }

    #[test]
    fn ordering_comes_from_dates_not_arrival() {
        let session = session_with("glucose", &[("2024-02-01", 130.0), ("2024-01-01", 60.0)]);
        let trend = detect_trend(session.observations(), "glucose").unwrap();
        assert_eq!(trend.trend, TrendDirection::Increasing);
        assert_eq!(trend.change, 70.0);
    }
}
