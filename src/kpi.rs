use serde::{Deserialize, Serialize};

use crate::model::IntegratedRecord;

/// Company shown on the gainer/loser cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mover {
    pub symbol: String,
    pub company_name: String,
    pub change_rate_percent: Option<f64>,
    pub market_cap_rank: usize,
}

impl From<&IntegratedRecord> for Mover {
    fn from(record: &IntegratedRecord) -> Self {
        Self {
            symbol: record.symbol.clone(),
            company_name: record.company_name.clone(),
            change_rate_percent: record.change_rate_percent,
            market_cap_rank: record.market_cap_rank,
        }
    }
}

/// Headline numbers of a digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    pub top_gainer: Mover,
    pub top_loser: Mover,
    pub total_disclosures: usize,
    pub total_issues: usize,
    pub total_market_cap: f64,
    pub total_companies: usize,
}

impl Kpi {
    /// Reduces the integrated list in a single pass. `None` for an empty list.
    ///
    /// A missing change rate counts as 0% and the earlier record keeps a tie.
    pub fn compute(records: &[IntegratedRecord]) -> Option<Self> {
        let first = records.first()?;
        let rate = |r: &IntegratedRecord| r.change_rate_percent.unwrap_or(0.0);

        let mut gainer = first;
        let mut loser = first;
        let mut total_disclosures = 0;
        let mut total_issues = 0;
        let mut total_market_cap = 0.0;

        for record in records {
            if rate(record) > rate(gainer) {
                gainer = record;
            }
            if rate(record) < rate(loser) {
                loser = record;
            }
            total_disclosures += record.disclosures.len();
            total_issues += record.issues.len();
            total_market_cap += record.market_cap.unwrap_or(0.0);
        }

        Some(Self {
            top_gainer: gainer.into(),
            top_loser: loser.into(),
            total_disclosures,
            total_issues,
            total_market_cap,
            total_companies: records.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::Market;

    fn record(symbol: &str, cap: f64, rate: Option<f64>, rank: usize) -> IntegratedRecord {
        IntegratedRecord {
            symbol: symbol.to_string(),
            company_name: format!("{} Co", symbol),
            country: "KR".to_string(),
            market: Market::Unknown,
            market_cap: Some(cap),
            current_price: None,
            previous_week_close: None,
            change_rate_percent: rate,
            week_high: None,
            week_low: None,
            disclosures: Vec::new(),
            issues: Vec::new(),
            market_cap_rank: rank,
        }
    }

    #[test]
    fn test_empty_list_has_no_kpi() {
        assert!(Kpi::compute(&[]).is_none());
    }

    #[test]
    fn test_gainer_loser_and_totals() {
        let records = vec![
            record("AAA", 500.0, Some(-1.5), 1),
            record("BBB", 300.0, Some(7.25), 2),
            record("CCC", 200.0, None, 3),
            record("DDD", 100.0, Some(-4.0), 4),
        ];
        let kpi = Kpi::compute(&records).unwrap();
        assert_eq!(kpi.top_gainer.symbol, "BBB");
        assert_eq!(kpi.top_loser.symbol, "DDD");
        assert_eq!(kpi.top_loser.market_cap_rank, 4);
        assert_eq!(kpi.total_market_cap, 1100.0);
        assert_eq!(kpi.total_companies, 4);
        assert_eq!(kpi.total_disclosures, 0);
    }

    #[test]
    fn test_ties_keep_first_record() {
        let records = vec![
            record("AAA", 2.0, Some(3.0), 1),
            record("BBB", 1.0, Some(3.0), 2),
        ];
        let kpi = Kpi::compute(&records).unwrap();
        assert_eq!(kpi.top_gainer.symbol, "AAA");
        assert_eq!(kpi.top_loser.symbol, "AAA");
    }

    #[test]
    fn test_missing_rates_count_as_zero() {
        let records = vec![
            record("AAA", 2.0, None, 1),
            record("BBB", 1.0, Some(-0.5), 2),
        ];
        let kpi = Kpi::compute(&records).unwrap();
        assert_eq!(kpi.top_gainer.symbol, "AAA");
        assert_eq!(kpi.top_loser.symbol, "BBB");
    }
}
