//! HTTP client for the GBIF API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use super::{scoped_predicate, RecordCountService};
use crate::error::{MidsError, Result};
use crate::maturity::predicate::Predicate;

pub const DEFAULT_BASE_URL: &str = "https://api.gbif.org/v1";
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Body of `POST /occurrence/search/predicate`. Only the count is read, so
/// no records are requested.
#[derive(Debug, Serialize)]
pub struct CountRequest {
    pub limit: u32,
    pub predicate: Predicate,
}

impl CountRequest {
    pub fn new(dataset_key: &str, predicate: Option<&Predicate>) -> Self {
        Self {
            limit: 0,
            predicate: scoped_predicate(dataset_key, predicate),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CountResponse {
    count: u64,
}

/// One hit from `GET /dataset/suggest`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub key: String,
    #[serde(default)]
    pub title: String,
}

/// `GET /dataset/{key}`. Fields not modelled here are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub key: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing_organization_key: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub struct GbifClient {
    client: Client,
    base_url: String,
}

impl GbifClient {
    /// Creates a client rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mids/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn count_url(&self) -> String {
        format!("{}/occurrence/search/predicate", self.base_url)
    }

    pub fn suggest_url(&self) -> String {
        format!("{}/dataset/suggest", self.base_url)
    }

    pub fn dataset_url(&self, dataset_key: &str) -> String {
        format!("{}/dataset/{dataset_key}", self.base_url)
    }

    /// Searches occurrence datasets by free text (autocomplete semantics).
    pub async fn search_datasets(&self, text: &str, limit: u32) -> Result<Vec<DatasetSummary>> {
        debug!(text, limit, "searching datasets");
        let limit = limit.to_string();
        let response = self
            .client
            .get(self.suggest_url())
            .query(&[("limit", limit.as_str()), ("type", "OCCURRENCE"), ("q", text)])
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    pub async fn get_dataset(&self, dataset_key: &str) -> Result<DatasetMetadata> {
        debug!(dataset_key, "fetching dataset metadata");
        let response = self.client.get(self.dataset_url(dataset_key)).send().await?;
        Ok(check_status(response).await?.json().await?)
    }
}

#[async_trait]
impl RecordCountService for GbifClient {
    async fn count(&self, dataset_key: &str, predicate: Option<&Predicate>) -> Result<u64> {
        let request = CountRequest::new(dataset_key, predicate);
        let response = self
            .client
            .post(self.count_url())
            .json(&request)
            .send()
            .await?;
        let body: CountResponse = check_status(response).await?.json().await?;
        debug!(dataset_key, count = body.count, "occurrence count");
        Ok(body.count)
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MidsError::Api {
        status: status.as_u16(),
        body,
    })
}
