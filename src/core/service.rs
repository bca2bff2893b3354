use anyhow::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use super::config::DigestConfig;
use super::types::Digest;
use crate::pipeline::{self, PipelineOptions};
use crate::sources::{self, DataSources, HttpSources, SourceHealth};

/// Runs the digest against an injected set of data sources.
///
/// Every call to `refresh` starts from scratch; nothing is cached between
/// runs.
#[derive(Clone)]
pub struct DigestService {
    sources: Arc<dyn DataSources>,
    options: PipelineOptions,
    fetch_timeout: Duration,
}

impl DigestService {
    pub fn new(sources: Arc<dyn DataSources>, config: &DigestConfig) -> Self {
        Self {
            sources,
            options: PipelineOptions {
                derive_companies: config.derive_companies,
            },
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Service talking to the configured HTTP endpoints.
    pub fn from_config(config: &DigestConfig) -> Result<Self> {
        let client = Client::builder().gzip(true).build()?;
        let sources = HttpSources::new(client, config)?;
        Ok(Self::new(Arc::new(sources), config))
    }

    pub async fn refresh(&self) -> Result<Digest> {
        let snapshot = sources::gather(Arc::clone(&self.sources), self.fetch_timeout).await?;
        let records = pipeline::integrate(&snapshot, self.options);
        Ok(Digest::new(records))
    }

    pub async fn health(&self) -> Vec<SourceHealth> {
        sources::check_health(self.sources.as_ref()).await
    }
}
