use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::markets::Market;

pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Treats an explicit `null` like a missing key.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One row of the weekly stock-price feed.
///
/// The price service reports caps in units of 100M KRW and prices in KRW;
/// the pipeline only compares them, so units are not converted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockQuote {
    pub symbol: String,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default, alias = "today")]
    pub current_price: Option<f64>,
    #[serde(default, alias = "lastWeek")]
    pub previous_week_close: Option<f64>,
    #[serde(default, alias = "changeRate")]
    pub change_rate_percent: Option<f64>,
    #[serde(default)]
    pub week_high: Option<f64>,
    #[serde(default)]
    pub week_low: Option<f64>,
    // Per-row scrape failure reported by the price service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StockQuote {
    pub fn new(symbol: impl Into<String>, market_cap: Option<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            market_cap,
            current_price: None,
            previous_week_close: None,
            change_rate_percent: None,
            week_high: None,
            week_low: None,
            error: None,
        }
    }

    pub fn with_change_rate(mut self, rate: f64) -> Self {
        self.change_rate_percent = Some(rate);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub symbol: String,
    pub name: String,
    pub country: String,
}

impl CompanyRecord {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            country: country.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureRecord {
    #[serde(alias = "stock_code")]
    pub symbol: String,
    #[serde(default, alias = "company_name", deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(alias = "disclosure_title")]
    pub title: String,
    #[serde(default, alias = "disclosure_date", deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, alias = "report_name", deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    #[serde(other)]
    Neutral,
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sentiment::Positive => write!(f, "positive"),
            Sentiment::Negative => write!(f, "negative"),
            Sentiment::Neutral => write!(f, "neutral"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRecord {
    #[serde(alias = "stock_code")]
    pub symbol: String,
    #[serde(default, alias = "corp", deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(alias = "original_title")]
    pub title: String,
    #[serde(default, alias = "published_date", deserialize_with = "null_as_default")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment: Sentiment,
    #[serde(default, alias = "news_url", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A stock quote joined with its company metadata, market and the week's
/// disclosures and issues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegratedRecord {
    pub symbol: String,
    pub company_name: String,
    pub country: String,
    pub market: Market,
    pub market_cap: Option<f64>,
    pub current_price: Option<f64>,
    pub previous_week_close: Option<f64>,
    pub change_rate_percent: Option<f64>,
    pub week_high: Option<f64>,
    pub week_low: Option<f64>,
    pub disclosures: Vec<DisclosureRecord>,
    pub issues: Vec<IssueRecord>,
    pub market_cap_rank: usize,
}
