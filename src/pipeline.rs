//! Joins the four weekly feeds into one ranked list of companies.

use itertools::Itertools;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::markets::market_for;
use crate::model::{
    CompanyRecord, DisclosureRecord, IntegratedRecord, IssueRecord, StockQuote, UNKNOWN_COUNTRY,
};
use crate::sources::SourceSnapshot;

/// Country assumed for companies derived from disclosures, which are
/// filed with the Korean regulator.
pub const DISCLOSURE_COUNTRY: &str = "KR";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub derive_companies: bool,
}

/// Joins, filters, deduplicates, sorts and ranks a snapshot.
///
/// Quotes without a market cap are dropped before deduplication, so a
/// capless row never hides a later row for the same symbol. The survivors
/// are ordered by market cap descending, then symbol ascending, and ranked
/// from 1.
pub fn integrate(snapshot: &SourceSnapshot, options: PipelineOptions) -> Vec<IntegratedRecord> {
    let derived;
    let companies: &[CompanyRecord] = if options.derive_companies
        && snapshot.companies.is_empty()
        && !snapshot.disclosures.is_empty()
    {
        derived = companies_from_disclosures(&snapshot.disclosures);
        log::debug!(
            "Company registry empty, derived {} companies from disclosures",
            derived.len()
        );
        &derived
    } else {
        &snapshot.companies
    };

    let registry = first_by_symbol(companies);
    let disclosures = group_by_symbol(&snapshot.disclosures, |d| d.symbol.as_str());
    let issues = group_by_symbol(&snapshot.issues, |i| i.symbol.as_str());

    let mut records: Vec<IntegratedRecord> = snapshot
        .quotes
        .iter()
        .filter(|quote| quote.market_cap.is_some())
        .unique_by(|quote| quote.symbol.clone())
        .map(|quote| join(quote, &registry, &disclosures, &issues))
        .collect();

    records.sort_by(compare_for_ranking);

    for (index, record) in records.iter_mut().enumerate() {
        record.market_cap_rank = index + 1;
    }

    log::info!(
        "Integrated {} of {} quotes ({} with disclosures, {} with issues)",
        records.len(),
        snapshot.quotes.len(),
        records.iter().filter(|r| !r.disclosures.is_empty()).count(),
        records.iter().filter(|r| !r.issues.is_empty()).count()
    );

    records
}

fn join(
    quote: &StockQuote,
    registry: &HashMap<&str, &CompanyRecord>,
    disclosures: &HashMap<&str, Vec<&DisclosureRecord>>,
    issues: &HashMap<&str, Vec<&IssueRecord>>,
) -> IntegratedRecord {
    let symbol = quote.symbol.as_str();
    let (company_name, country) = match registry.get(symbol) {
        Some(company) => (company.name.clone(), company.country.clone()),
        None => (quote.symbol.clone(), UNKNOWN_COUNTRY.to_string()),
    };

    IntegratedRecord {
        symbol: quote.symbol.clone(),
        company_name,
        country,
        market: market_for(symbol),
        market_cap: quote.market_cap,
        current_price: quote.current_price,
        previous_week_close: quote.previous_week_close,
        change_rate_percent: quote.change_rate_percent,
        week_high: quote.week_high,
        week_low: quote.week_low,
        disclosures: cloned_for(disclosures, symbol),
        issues: cloned_for(issues, symbol),
        market_cap_rank: 0,
    }
}

fn cloned_for<T: Clone>(groups: &HashMap<&str, Vec<&T>>, symbol: &str) -> Vec<T> {
    groups
        .get(symbol)
        .map(|items| items.iter().map(|item| (*item).clone()).collect())
        .unwrap_or_default()
}

fn first_by_symbol(companies: &[CompanyRecord]) -> HashMap<&str, &CompanyRecord> {
    let mut registry = HashMap::with_capacity(companies.len());
    for company in companies {
        registry.entry(company.symbol.as_str()).or_insert(company);
    }
    registry
}

// Keeps input order within each group
fn group_by_symbol<'a, T, F>(items: &'a [T], key: F) -> HashMap<&'a str, Vec<&'a T>>
where
    F: Fn(&'a T) -> &'a str,
{
    let mut groups: HashMap<&str, Vec<&T>> = HashMap::new();
    for item in items {
        groups.entry(key(item)).or_default().push(item);
    }
    groups
}

fn compare_for_ranking(a: &IntegratedRecord, b: &IntegratedRecord) -> Ordering {
    let cap = |r: &IntegratedRecord| r.market_cap.unwrap_or(f64::NEG_INFINITY);
    cap(b)
        .total_cmp(&cap(a))
        .then_with(|| a.symbol.cmp(&b.symbol))
}

/// One company per disclosing symbol, named after its first disclosure.
pub fn companies_from_disclosures(disclosures: &[DisclosureRecord]) -> Vec<CompanyRecord> {
    disclosures
        .iter()
        .unique_by(|d| d.symbol.clone())
        .map(|d| CompanyRecord::new(d.symbol.clone(), d.company_name.clone(), DISCLOSURE_COUNTRY))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::Market;
    use crate::model::Sentiment;

    fn disclosure(symbol: &str, title: &str) -> DisclosureRecord {
        DisclosureRecord {
            symbol: symbol.to_string(),
            company_name: format!("{} Corp", symbol),
            title: title.to_string(),
            date: "20241220".to_string(),
            category: "report".to_string(),
            url: None,
            summary: None,
        }
    }

    fn issue(symbol: &str, title: &str) -> IssueRecord {
        IssueRecord {
            symbol: symbol.to_string(),
            company_name: symbol.to_string(),
            title: title.to_string(),
            date: "2024-12-20".to_string(),
            category: "business".to_string(),
            source: "news".to_string(),
            sentiment: Sentiment::Positive,
            url: None,
            summary: None,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let snapshot = SourceSnapshot {
            quotes: vec![
                StockQuote::new("AAA", Some(500.0)),
                StockQuote::new("BBB", None),
                StockQuote::new("AAA", Some(500.0)),
            ],
            companies: vec![CompanyRecord::new("AAA", "Alpha", "KR")],
            ..Default::default()
        };

        let records = integrate(&snapshot, PipelineOptions::default());
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.symbol, "AAA");
        assert_eq!(record.company_name, "Alpha");
        assert_eq!(record.country, "KR");
        assert_eq!(record.market_cap, Some(500.0));
        assert_eq!(record.market_cap_rank, 1);
        assert!(record.disclosures.is_empty());
        assert!(record.issues.is_empty());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let snapshot = SourceSnapshot {
            quotes: vec![
                StockQuote::new("AAA", Some(100.0)).with_change_rate(1.0),
                StockQuote::new("AAA", Some(900.0)).with_change_rate(2.0),
            ],
            ..Default::default()
        };
        let records = integrate(&snapshot, PipelineOptions::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].market_cap, Some(100.0));
        assert_eq!(records[0].change_rate_percent, Some(1.0));
    }

    #[test]
    fn test_capless_row_does_not_hide_later_duplicate() {
        let snapshot = SourceSnapshot {
            quotes: vec![
                StockQuote::new("AAA", None),
                StockQuote::new("AAA", Some(42.0)),
            ],
            ..Default::default()
        };
        let records = integrate(&snapshot, PipelineOptions::default());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].market_cap, Some(42.0));
    }

    #[test]
    fn test_sorted_and_ranked_with_symbol_tiebreak() {
        let snapshot = SourceSnapshot {
            quotes: vec![
                StockQuote::new("CCC", Some(10.0)),
                StockQuote::new("BBB", Some(300.0)),
                StockQuote::new("ZZZ", Some(300.0)),
                StockQuote::new("AAA", Some(300.0)),
                StockQuote::new("DDD", Some(50.0)),
            ],
            ..Default::default()
        };
        let records = integrate(&snapshot, PipelineOptions::default());
        let order: Vec<_> = records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "BBB", "ZZZ", "DDD", "CCC"]);
        let ranks: Vec<_> = records.iter().map(|r| r.market_cap_rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_unmatched_company_defaults() {
        let snapshot = SourceSnapshot {
            quotes: vec![StockQuote::new("259960", Some(1.0))],
            companies: vec![CompanyRecord::new("036570", "NCSoft", "KR")],
            ..Default::default()
        };
        let records = integrate(&snapshot, PipelineOptions::default());
        assert_eq!(records[0].company_name, "259960");
        assert_eq!(records[0].country, "Unknown");
        assert_eq!(records[0].market, Market::Kospi);
    }

    #[test]
    fn test_first_company_match_wins() {
        let snapshot = SourceSnapshot {
            quotes: vec![StockQuote::new("AAA", Some(1.0))],
            companies: vec![
                CompanyRecord::new("AAA", "Alpha", "KR"),
                CompanyRecord::new("AAA", "Alpha Duplicate", "US"),
            ],
            ..Default::default()
        };
        let records = integrate(&snapshot, PipelineOptions::default());
        assert_eq!(records[0].company_name, "Alpha");
        assert_eq!(records[0].country, "KR");
    }

    #[test]
    fn test_attachments_are_exact_subsets_in_input_order() {
        let snapshot = SourceSnapshot {
            quotes: vec![
                StockQuote::new("AAA", Some(2.0)),
                StockQuote::new("BBB", Some(1.0)),
            ],
            disclosures: vec![
                disclosure("AAA", "first"),
                disclosure("BBB", "other"),
                disclosure("AAA", "second"),
                disclosure("CCC", "orphan"),
            ],
            issues: vec![issue("BBB", "news"), issue("AAA ", "padded symbol")],
            ..Default::default()
        };
        let before = snapshot.clone();
        let records = integrate(&snapshot, PipelineOptions::default());

        let aaa = &records[0];
        let titles: Vec<_> = aaa.disclosures.iter().map(|d| d.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second"]);
        assert!(aaa.issues.is_empty());

        let bbb = &records[1];
        assert_eq!(bbb.disclosures.len(), 1);
        assert_eq!(bbb.issues.len(), 1);

        // Inputs are left untouched
        assert_eq!(snapshot, before);
    }

    #[test]
    fn test_unknown_market() {
        let snapshot = SourceSnapshot {
            quotes: vec![StockQuote::new("EA", Some(1.0))],
            ..Default::default()
        };
        let records = integrate(&snapshot, PipelineOptions::default());
        assert_eq!(records[0].market, Market::Unknown);
    }

    #[test]
    fn test_empty_snapshot() {
        let records = integrate(&SourceSnapshot::default(), PipelineOptions::default());
        assert!(records.is_empty());
    }

    #[test]
    fn test_derived_registry_only_when_enabled_and_registry_empty() {
        let snapshot = SourceSnapshot {
            quotes: vec![StockQuote::new("AAA", Some(1.0))],
            disclosures: vec![disclosure("AAA", "first")],
            ..Default::default()
        };

        let records = integrate(&snapshot, PipelineOptions::default());
        assert_eq!(records[0].company_name, "AAA");
        assert_eq!(records[0].country, "Unknown");

        let records = integrate(
            &snapshot,
            PipelineOptions {
                derive_companies: true,
            },
        );
        assert_eq!(records[0].company_name, "AAA Corp");
        assert_eq!(records[0].country, "KR");

        let with_registry = SourceSnapshot {
            companies: vec![CompanyRecord::new("ZZZ", "Zeta", "US")],
            ..snapshot
        };
        let records = integrate(
            &with_registry,
            PipelineOptions {
                derive_companies: true,
            },
        );
        assert_eq!(records[0].company_name, "AAA");
    }

    #[test]
    fn test_companies_from_disclosures_dedups() {
        let companies = companies_from_disclosures(&[
            disclosure("AAA", "1"),
            disclosure("BBB", "2"),
            disclosure("AAA", "3"),
        ]);
        assert_eq!(companies.len(), 2);
        assert_eq!(companies[0], CompanyRecord::new("AAA", "AAA Corp", "KR"));
    }
}
