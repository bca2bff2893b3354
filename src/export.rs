use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::model::IntegratedRecord;

const HEADERS: [&str; 13] = [
    "Rank",
    "Symbol",
    "Company",
    "Country",
    "Market",
    "Market Cap",
    "Price",
    "Previous Week Close",
    "Change %",
    "Week High",
    "Week Low",
    "Disclosures",
    "Issues",
];

/// Serialized in `HEADERS` order.
#[derive(Serialize)]
struct CsvRow<'a> {
    rank: usize,
    symbol: &'a str,
    company: &'a str,
    country: &'a str,
    market: String,
    market_cap: Option<f64>,
    price: Option<f64>,
    previous_week_close: Option<f64>,
    change_rate_percent: Option<f64>,
    week_high: Option<f64>,
    week_low: Option<f64>,
    disclosures: usize,
    issues: usize,
}

impl<'a> From<&'a IntegratedRecord> for CsvRow<'a> {
    fn from(r: &'a IntegratedRecord) -> Self {
        Self {
            rank: r.market_cap_rank,
            symbol: &r.symbol,
            company: &r.company_name,
            country: &r.country,
            market: r.market.to_string(),
            market_cap: r.market_cap,
            price: r.current_price,
            previous_week_close: r.previous_week_close,
            change_rate_percent: r.change_rate_percent,
            week_high: r.week_high,
            week_low: r.week_low,
            disclosures: r.disclosures.len(),
            issues: r.issues.len(),
        }
    }
}

/// Writes the header and one CSV row per record. Returns the row count.
pub fn write_csv<'a, W, I>(writer: W, records: I) -> Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a IntegratedRecord>,
{
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(HEADERS)?;
    let mut rows = 0;
    for record in records {
        writer.serialize(CsvRow::from(record))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

pub fn to_csv_file<'a, I>(path: &Path, records: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a IntegratedRecord>,
{
    let file = File::create(path)?;
    let rows = write_csv(file, records)?;
    log::debug!("Exported {} records to {:?}", rows, path);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markets::Market;
    use tempfile::tempdir;

    fn record() -> IntegratedRecord {
        IntegratedRecord {
            symbol: "259960".to_string(),
            company_name: "Krafton".to_string(),
            country: "KR".to_string(),
            market: Market::Kospi,
            market_cap: Some(120000.0),
            current_price: Some(250000.0),
            previous_week_close: None,
            change_rate_percent: Some(-1.25),
            week_high: None,
            week_low: None,
            disclosures: Vec::new(),
            issues: Vec::new(),
            market_cap_rank: 1,
        }
    }

    #[test]
    fn test_write_csv() {
        let records = vec![record()];
        let mut out = Vec::new();
        let rows = write_csv(&mut out, &records).unwrap();
        assert_eq!(rows, 1);

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Rank,Symbol,Company,Country,Market,Market Cap,Price,Previous Week Close,Change %,Week High,Week Low,Disclosures,Issues"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,259960,Krafton,KR,KOSPI,120000.0,250000.0,,-1.25,,,0,0"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_export_writes_header_only() {
        let mut out = Vec::new();
        assert_eq!(write_csv(&mut out, &Vec::new()).unwrap(), 0);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, format!("{}\n", HEADERS.join(",")));
    }

    #[test]
    fn test_to_csv_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("digest.csv");
        let records = vec![record()];
        assert_eq!(to_csv_file(&path, &records).unwrap(), 1);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Krafton"));
    }
}
