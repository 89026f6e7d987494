//! Upstream post origins
//!
//! The feed is merged from two independent read-only sources. Each origin is
//! fetched in isolation and may fail in isolation; the aggregator absorbs
//! those failures.

use async_trait::async_trait;
use serde_json::Value;

/// A read-only source of raw post records
#[async_trait]
pub trait PostOrigin: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the origin's raw payload (expected: a JSON array of records)
    async fn fetch(&self) -> anyhow::Result<Value>;
}

/// HTTP origin returning a JSON array of post records
pub struct HttpOrigin {
    name: String,
    url: String,
    client: reqwest::Client,
}

impl HttpOrigin {
    pub fn new(name: impl Into<String>, url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            client,
        }
    }
}

#[async_trait]
impl PostOrigin for HttpOrigin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> anyhow::Result<Value> {
        let payload = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;
        Ok(payload)
    }
}
