//! HTTP client for a remote data service

use crate::client::DataServiceClient;
use crate::error::{Error, Result};
use crate::query::Query;
use async_trait::async_trait;
use hie_models::Bundle;
use reqwest::{Client, Response, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for one data service, rooted at its base URL
/// (e.g. `https://hie.example.org/imsi`).
pub struct HttpDataServiceClient {
    client: Client,
    base_url: String,
}

impl HttpDataServiceClient {
    /// Create a client with the default request timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::InvalidUrl(base_url));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, resource_type: &str) -> String {
        format!("{}/{}", self.base_url, resource_type)
    }

    fn instance_url(&self, resource_type: &str, id: Uuid, version_id: Option<Uuid>) -> String {
        match version_id {
            Some(version) => format!(
                "{}/{}/{}/history/{}",
                self.base_url, resource_type, id, version
            ),
            None => format!("{}/{}/{}", self.base_url, resource_type, id),
        }
    }

    fn query_url(&self, resource_type: &str, query: &Query) -> String {
        let mut url = self.collection_url(resource_type);
        let query_string = query.to_query_string();
        if !query_string.is_empty() {
            url.push('?');
            url.push_str(&query_string);
        }
        url
    }

    async fn read_json(resource_type: &str, response: Response) -> Result<JsonValue> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Status {
                resource_type: resource_type.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| Error::Decode {
            resource_type: resource_type.to_string(),
            source,
        })
    }
}

#[async_trait]
impl DataServiceClient for HttpDataServiceClient {
    async fn query(&self, resource_type: &str, query: &Query) -> Result<Bundle> {
        let url = self.query_url(resource_type, query);
        tracing::debug!(%url, "querying data service");

        let response = self.client.get(&url).send().await?;
        let body = Self::read_json(resource_type, response).await?;
        Ok(Bundle::from_value(body)?)
    }

    async fn get(
        &self,
        resource_type: &str,
        id: Uuid,
        version_id: Option<Uuid>,
    ) -> Result<Option<JsonValue>> {
        let url = self.instance_url(resource_type, id, version_id);
        tracing::debug!(%url, "fetching record");

        let response = self.client.get(&url).send().await?;
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::GONE) {
            return Ok(None);
        }
        Self::read_json(resource_type, response).await.map(Some)
    }

    async fn create(&self, resource_type: &str, resource: JsonValue) -> Result<JsonValue> {
        let url = self.collection_url(resource_type);
        let response = self.client.post(&url).json(&resource).send().await?;
        Self::read_json(resource_type, response).await
    }

    async fn update(
        &self,
        resource_type: &str,
        id: Uuid,
        resource: JsonValue,
    ) -> Result<JsonValue> {
        let url = self.instance_url(resource_type, id, None);
        let response = self.client.put(&url).json(&resource).send().await?;
        Self::read_json(resource_type, response).await
    }

    async fn obsolete(&self, resource_type: &str, id: Uuid) -> Result<JsonValue> {
        let url = self.instance_url(resource_type, id, None);
        let response = self.client.delete(&url).send().await?;
        Self::read_json(resource_type, response).await
    }
}
