//! Elasticsearch / OpenSearch bulk store
//!
//! Pages are written through the `_bulk` endpoint as NDJSON `index` actions
//! with `_id` set to the page URL, which makes every write an upsert.

use crate::config::ElasticConfig;
use crate::index::traits::BulkStore;
use crate::page::ScrapedPage;
use crate::{ConfigError, FlushError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

/// `BulkStore` speaking the Elasticsearch bulk API over HTTP
#[derive(Debug, Clone)]
pub struct ElasticStore {
    client: Client,
    base_uri: String,
    index_name: String,
    daily_index: bool,
    user: Option<String>,
    password: Option<String>,
}

/// Subset of the bulk API response that decides success
#[derive(Debug, Deserialize)]
struct BulkResponse {
    errors: bool,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl ElasticStore {
    pub fn new(client: Client, config: &ElasticConfig) -> Self {
        Self {
            client,
            base_uri: config.uri.trim_end_matches('/').to_string(),
            index_name: config.index_name.clone(),
            daily_index: config.daily_index,
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    /// Probes the store so an unreachable backend fails startup
    pub async fn check_connection(&self) -> Result<(), ConfigError> {
        let unreachable = |message: String| ConfigError::StoreUnreachable {
            uri: self.base_uri.clone(),
            message,
        };

        let response = self
            .authorize(self.client.get(&self.base_uri))
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unreachable(format!("HTTP {}", response.status())));
        }

        tracing::debug!(uri = %self.base_uri, "Index store reachable");
        Ok(())
    }

    /// Index the pages are written to at `now`
    pub fn index_for(&self, now: DateTime<Utc>) -> String {
        if self.daily_index {
            format!("{}-{}", self.index_name, now.format("%d-%m-%y"))
        } else {
            self.index_name.clone()
        }
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.user {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }
}

/// Encodes pages as a bulk request body: one action line and one document
/// line per page, each terminated by a newline
pub fn encode_bulk_body(pages: &[ScrapedPage], index: &str) -> Result<String, FlushError> {
    let mut body = String::new();
    for page in pages {
        let action = json!({ "index": { "_index": index, "_id": page.url } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(page)?);
        body.push('\n');
    }
    Ok(body)
}

/// Summarizes per-item failures from a bulk response
fn item_failures(items: &[serde_json::Value]) -> (usize, String) {
    let errors: Vec<&serde_json::Value> = items
        .iter()
        .filter_map(|item| item.get("index").and_then(|action| action.get("error")))
        .collect();

    let reason = errors
        .first()
        .and_then(|error| error.get("reason"))
        .and_then(|reason| reason.as_str())
        .unwrap_or("unknown")
        .to_string();

    (errors.len(), reason)
}

#[async_trait]
impl BulkStore for ElasticStore {
    async fn bulk_upsert(&self, pages: &[ScrapedPage]) -> Result<usize, FlushError> {
        if pages.is_empty() {
            return Ok(0);
        }

        let index = self.index_for(Utc::now());
        let body = encode_bulk_body(pages, &index)?;

        let response = self
            .authorize(self.client.post(format!("{}/_bulk", self.base_uri)))
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlushError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: BulkResponse = response.json().await?;
        if parsed.errors {
            let (failed, reason) = item_failures(&parsed.items);
            return Err(FlushError::Items { failed, reason });
        }

        tracing::debug!(count = pages.len(), index = %index, "Bulk request accepted");
        Ok(pages.len())
    }
}
