//! The four upstream data services and the best-effort gather over them.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::error::SourceError;
use crate::model::{null_as_default, CompanyRecord, DisclosureRecord, IssueRecord, StockQuote};

pub use self::http::HttpSources;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[strum(serialize = "stock-price service")]
    StockPrices,
    #[strum(serialize = "company registry")]
    Companies,
    #[strum(serialize = "disclosure service")]
    Disclosures,
    #[strum(serialize = "issue service")]
    Issues,
}

/// `{ "data": [...] }` envelope used by the price, disclosure and issue services.
///
/// Rows stay raw JSON until `decode_rows`, so one bad row cannot sink the
/// whole response.
#[derive(Debug, Deserialize)]
pub struct DataEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<Value>,
}

/// `{ "companies": [...] }` envelope used by the company registry.
#[derive(Debug, Deserialize)]
pub struct CompaniesEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub companies: Vec<Value>,
}

/// Decodes each row on its own, skipping rows that do not fit `T`.
pub fn decode_rows<T: DeserializeOwned>(kind: SourceKind, rows: Vec<Value>) -> Vec<T> {
    let total = rows.len();
    let decoded: Vec<T> = rows
        .into_iter()
        .enumerate()
        .filter_map(|(index, row)| match serde_json::from_value(row) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Skipping row {} from {}: {}", index, kind, e);
                None
            }
        })
        .collect();
    if decoded.len() < total {
        log::warn!("{} kept {} of {} rows", kind, decoded.len(), total);
    }
    decoded
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceHealth {
    pub source: SourceKind,
    pub healthy: bool,
    pub status: Option<u16>,
}

/// Everything one digest run read from upstream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceSnapshot {
    pub quotes: Vec<StockQuote>,
    pub companies: Vec<CompanyRecord>,
    pub disclosures: Vec<DisclosureRecord>,
    pub issues: Vec<IssueRecord>,
}

/// Access to the upstream services.
///
/// `HttpSources` talks to the real services; tests plug in fixed data.
#[async_trait]
pub trait DataSources: Send + Sync {
    async fn stock_quotes(&self) -> Result<Vec<StockQuote>, SourceError>;

    async fn companies(&self) -> Result<Vec<CompanyRecord>, SourceError>;

    async fn disclosures(&self) -> Result<Vec<DisclosureRecord>, SourceError>;

    async fn issues(&self) -> Result<Vec<IssueRecord>, SourceError>;

    /// Never fails: an unreachable service is reported as unhealthy.
    async fn probe(&self, kind: SourceKind) -> SourceHealth;
}

/// Awaits `fetch` for at most `timeout`, turning any failure into an empty
/// collection.
pub async fn fetch_or_empty<T, F>(kind: SourceKind, timeout: Duration, fetch: F) -> Vec<T>
where
    F: Future<Output = Result<Vec<T>, SourceError>>,
{
    let outcome = match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout {
            source_kind: kind,
            timeout,
        }),
    };

    match outcome {
        Ok(records) => {
            log::debug!("{} returned {} records", kind, records.len());
            records
        }
        Err(e) => {
            log::warn!("{}; continuing without it", e);
            Vec::new()
        }
    }
}

/// Fetches all four sources concurrently.
///
/// Individual source failures degrade to empty collections. An error is
/// returned only when a fetch task itself dies (e.g. panics).
pub async fn gather(sources: Arc<dyn DataSources>, timeout: Duration) -> Result<SourceSnapshot> {
    let quotes = {
        let sources = Arc::clone(&sources);
        tokio::spawn(async move {
            fetch_or_empty(SourceKind::StockPrices, timeout, sources.stock_quotes()).await
        })
    };
    let companies = {
        let sources = Arc::clone(&sources);
        tokio::spawn(async move {
            fetch_or_empty(SourceKind::Companies, timeout, sources.companies()).await
        })
    };
    let disclosures = {
        let sources = Arc::clone(&sources);
        tokio::spawn(async move {
            fetch_or_empty(SourceKind::Disclosures, timeout, sources.disclosures()).await
        })
    };
    let issues = {
        let sources = Arc::clone(&sources);
        tokio::spawn(async move {
            fetch_or_empty(SourceKind::Issues, timeout, sources.issues()).await
        })
    };

    let (quotes, companies, disclosures, issues) =
        tokio::try_join!(quotes, companies, disclosures, issues)?;

    log::debug!(
        "Gathered {} quotes, {} companies, {} disclosures, {} issues",
        quotes.len(),
        companies.len(),
        disclosures.len(),
        issues.len()
    );

    Ok(SourceSnapshot {
        quotes,
        companies,
        disclosures,
        issues,
    })
}

/// Probes every source's health endpoint concurrently, in `SourceKind` order.
pub async fn check_health(sources: &dyn DataSources) -> Vec<SourceHealth> {
    join_all(SourceKind::iter().map(|kind| sources.probe(kind))).await
}
