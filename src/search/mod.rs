//! Black-box search collaborator
//!
//! Search ranking lives in a separate service; this client passes queries
//! through and returns its `{posts, users}` payload untouched.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ServiceResult;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub posts: Vec<Value>,
    #[serde(default)]
    pub users: Vec<Value>,
}

pub struct SearchGateway {
    endpoint: String,
    client: reqwest::Client,
}

impl SearchGateway {
    pub fn new(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }

    pub async fn search(&self, query: &str) -> ServiceResult<SearchResults> {
        let results = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .json::<SearchResults>()
            .await?;
        Ok(results)
    }
}
