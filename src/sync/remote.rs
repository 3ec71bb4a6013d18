//! Remote collection endpoint
//!
//! The remote is a placeholder REST resource: `GET` returns an array of
//! objects carrying a `title`, which are reinterpreted as quotes under a
//! fixed category label; `POST` accepts a quote and its response is ignored.

use crate::config::SyncConfig;
use crate::error::{Error, Result};
use crate::quote::Quote;
use async_trait::async_trait;
use std::time::Duration;

/// Source of remote quotes
#[async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetch the remote collection as quotes
    async fn pull(&self) -> Result<Vec<Quote>>;

    /// Send one quote to the remote
    async fn push(&self, quote: &Quote) -> Result<()>;
}

/// `RemoteSource` over HTTP
pub struct HttpRemote {
    client: reqwest::Client,
    endpoint: String,
    limit: Option<u32>,
    category_label: String,
}

impl HttpRemote {
    pub fn new(config: &SyncConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            limit: config.limit,
            category_label: config.category_label.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RemoteSource for HttpRemote {
    async fn pull(&self) -> Result<Vec<Quote>> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(limit) = self.limit {
            request = request.query(&[("_limit", limit)]);
        }

        let response = request
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Sync(format!("GET {}: {}", self.endpoint, e)))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| Error::Sync(format!("GET {}: invalid body: {}", self.endpoint, e)))?;

        let items = body.as_array().ok_or_else(|| {
            Error::Sync(format!("GET {}: expected a JSON array", self.endpoint))
        })?;

        Ok(items
            .iter()
            .filter_map(|item| item.get("title").and_then(|t| t.as_str()))
            .map(|title| Quote::new(title, self.category_label.as_str()))
            .collect())
    }

    async fn push(&self, quote: &Quote) -> Result<()> {
        self.client
            .post(&self.endpoint)
            .json(quote)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| Error::Sync(format!("POST {}: {}", self.endpoint, e)))?;
        Ok(())
    }
}
