use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

use super::{decode_rows, CompaniesEnvelope, DataEnvelope, DataSources, SourceHealth, SourceKind};
use crate::core::config::DigestConfig;
use crate::error::SourceError;
use crate::model::{CompanyRecord, DisclosureRecord, IssueRecord, StockQuote};

#[derive(Debug, Clone)]
struct Endpoint {
    data: Url,
    health: Url,
}

impl Endpoint {
    fn new(base: &Url, data_path: &str) -> Result<Self> {
        Ok(Self {
            data: join_path(base, data_path)?,
            health: join_path(base, "health")?,
        })
    }
}

/// Appends `path` to `base` as extra segments, keeping the base's own path.
pub fn join_path(base: &Url, path: &str) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| anyhow!("{} cannot be used as a base URL", base))?
        .pop_if_empty()
        .extend(path.split('/').filter(|s| !s.is_empty()));
    Ok(url)
}

/// `DataSources` backed by the weekly services over plain JSON GETs.
pub struct HttpSources {
    client: Client,
    user_agent: String,
    probe_timeout: Duration,
    stock_prices: Endpoint,
    companies: Endpoint,
    disclosures: Endpoint,
    issues: Endpoint,
}

impl HttpSources {
    pub fn new(client: Client, config: &DigestConfig) -> Result<Self> {
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            probe_timeout: config.fetch_timeout,
            stock_prices: Endpoint::new(&config.stockprice_url, "db/all")?,
            companies: Endpoint::new(&config.companies_url, "companies")?,
            disclosures: Endpoint::new(&config.disclosure_url, "recent")?,
            issues: Endpoint::new(&config.issue_url, "recent")?,
        })
    }

    fn endpoint(&self, kind: SourceKind) -> &Endpoint {
        match kind {
            SourceKind::StockPrices => &self.stock_prices,
            SourceKind::Companies => &self.companies,
            SourceKind::Disclosures => &self.disclosures,
            SourceKind::Issues => &self.issues,
        }
    }

    pub fn data_url(&self, kind: SourceKind) -> &Url {
        &self.endpoint(kind).data
    }

    async fn get_json<T: DeserializeOwned>(&self, kind: SourceKind) -> Result<T, SourceError> {
        let url = self.data_url(kind);
        log::debug!("Fetching {} from {}", kind, url);

        let response = self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .header(reqwest::header::ACCEPT, mime::APPLICATION_JSON.as_ref())
            .send()
            .await
            .map_err(|error| SourceError::Request {
                source_kind: kind,
                error,
            })?;

        log::debug!("{} response status: {}", kind, response.status());

        if !response.status().is_success() {
            return Err(SourceError::Status {
                source_kind: kind,
                status: response.status(),
            });
        }

        let body = response.text().await.map_err(|error| SourceError::Request {
            source_kind: kind,
            error,
        })?;

        serde_json::from_str(&body).map_err(|error| SourceError::Decode {
            source_kind: kind,
            error,
        })
    }
}

#[async_trait]
impl DataSources for HttpSources {
    async fn stock_quotes(&self) -> Result<Vec<StockQuote>, SourceError> {
        let envelope: DataEnvelope = self.get_json(SourceKind::StockPrices).await?;
        let quotes: Vec<StockQuote> = decode_rows(SourceKind::StockPrices, envelope.data);
        for quote in quotes.iter().filter(|q| q.error.is_some()) {
            log::debug!(
                "Price service reported an error for {}: {}",
                quote.symbol,
                quote.error.as_deref().unwrap_or_default()
            );
        }
        Ok(quotes)
    }

    async fn companies(&self) -> Result<Vec<CompanyRecord>, SourceError> {
        let envelope: CompaniesEnvelope = self.get_json(SourceKind::Companies).await?;
        Ok(decode_rows(SourceKind::Companies, envelope.companies))
    }

    async fn disclosures(&self) -> Result<Vec<DisclosureRecord>, SourceError> {
        let envelope: DataEnvelope = self.get_json(SourceKind::Disclosures).await?;
        Ok(decode_rows(SourceKind::Disclosures, envelope.data))
    }

    async fn issues(&self) -> Result<Vec<IssueRecord>, SourceError> {
        let envelope: DataEnvelope = self.get_json(SourceKind::Issues).await?;
        Ok(decode_rows(SourceKind::Issues, envelope.data))
    }

    async fn probe(&self, kind: SourceKind) -> SourceHealth {
        let url = &self.endpoint(kind).health;
        let result = self
            .client
            .get(url.as_str())
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(self.probe_timeout)
            .send()
            .await;

        match result {
            Ok(response) => SourceHealth {
                source: kind,
                healthy: response.status().is_success(),
                status: Some(response.status().as_u16()),
            },
            Err(e) => {
                log::warn!("Health check of {} failed: {}", kind, e);
                SourceHealth {
                    source: kind,
                    healthy: false,
                    status: None,
                }
            }
        }
    }
}
