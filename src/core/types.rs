use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::kpi::Kpi;
use crate::model::IntegratedRecord;

/// Result of one refresh: the ranked records and their headline numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Digest {
    pub records: Vec<IntegratedRecord>,
    pub kpi: Option<Kpi>,
    pub last_updated: DateTime<Utc>,
}

impl Digest {
    pub fn new(records: Vec<IntegratedRecord>) -> Self {
        let kpi = Kpi::compute(&records);
        Self {
            records,
            kpi,
            last_updated: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, symbol: &str) -> Option<&IntegratedRecord> {
        self.records.iter().find(|r| r.symbol == symbol)
    }
}
