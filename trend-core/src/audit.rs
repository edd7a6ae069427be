use serde::{Deserialize, Serialize};

use crate::{ObservationSet, ReferenceRange};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AbnormalStatus {
    Low,
    High,
}

/// A visit whose reading fell outside the reference range.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AbnormalVisit {
    pub date: String,
    pub value: f64,
    pub status: AbnormalStatus,
}

impl ReferenceRange {
    /// `None` for values inside the range, bounds included.
    pub fn classify(&self, value: f64) -> Option<AbnormalStatus> {
        if value < self.low {
            Some(AbnormalStatus::Low)
        } else if value > self.high {
            Some(AbnormalStatus::High)
        } else {
            None
        }
    }
}

/// Every out-of-range reading of `parameter`, in visit order.
pub fn find_abnormal(
    observations: &ObservationSet,
    parameter: &str,
    range: ReferenceRange,
) -> Vec<AbnormalVisit> {
    observations
        .series(parameter)
        .filter_map(|(obs, value)| {
            range.classify(value).map(|status| AbnormalVisit {
                date: obs.display_date(),
                value,
                status,
            })
        })
        .collect()
}
