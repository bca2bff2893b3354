use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_STOCKPRICE_URL: &str = "http://localhost:9006/stockprice";
pub const DEFAULT_COMPANIES_URL: &str = "http://localhost:8001/weekly";
pub const DEFAULT_DISCLOSURE_URL: &str = "http://localhost:8090/disclosures";
pub const DEFAULT_ISSUE_URL: &str = "http://localhost:8089/issue";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Clone, Debug)]
pub struct DigestConfig {
    pub stockprice_url: Url,
    pub companies_url: Url,
    pub disclosure_url: Url,
    pub issue_url: Url,
    pub fetch_timeout: Duration,
    pub user_agent: String,
    /// Build the company registry from disclosures when the registry is empty.
    pub derive_companies: bool,
    pub bind_addr: String,
}

impl DigestConfig {
    /// The local development endpoints, with no overrides.
    pub fn local() -> Result<Self> {
        Self::from_lookup(|_| None)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup, falling back to the
    /// local development endpoints.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = |key: &str, default: &str| -> Result<Url> {
            let raw = lookup(key).unwrap_or_else(|| default.to_string());
            Url::parse(&raw).with_context(|| format!("{} is not a valid URL: {}", key, raw))
        };

        let fetch_timeout = match lookup("DIGEST_FETCH_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map_err(|_| anyhow!("DIGEST_FETCH_TIMEOUT_SECS must be a whole number of seconds, got {}", raw))?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };
        if fetch_timeout == 0 {
            return Err(anyhow!("DIGEST_FETCH_TIMEOUT_SECS must be at least 1"));
        }

        let derive_companies = match lookup("DIGEST_DERIVE_COMPANIES") {
            Some(raw) => parse_flag(&raw)
                .ok_or_else(|| anyhow!("DIGEST_DERIVE_COMPANIES must be true or false, got {}", raw))?,
            None => false,
        };

        Ok(Self {
            stockprice_url: url("DIGEST_STOCKPRICE_URL", DEFAULT_STOCKPRICE_URL)?,
            companies_url: url("DIGEST_COMPANIES_URL", DEFAULT_COMPANIES_URL)?,
            disclosure_url: url("DIGEST_DISCLOSURE_URL", DEFAULT_DISCLOSURE_URL)?,
            issue_url: url("DIGEST_ISSUE_URL", DEFAULT_ISSUE_URL)?,
            fetch_timeout: Duration::from_secs(fetch_timeout),
            user_agent: lookup("DIGEST_USER_AGENT")
                .unwrap_or_else(|| format!("weekly-digest/{}", env!("CARGO_PKG_VERSION"))),
            derive_companies,
            bind_addr: lookup("DIGEST_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
