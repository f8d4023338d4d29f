//! HTTP client for the BICAN specimen portal
//!
//! Every request carries the portal JWT as a bearer token. Graph queries for
//! descendants can be slow, so they get a longer timeout than the rest.

use super::endpoints;
use super::error::{Result, SpecimenError};
use super::types::{DonorQuery, GraphResponse, InfoResponse, NodeRecord};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Timeout for record, ancestor, parent and donor lookups
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Timeout for descendant graph lookups
pub const DESCENDANTS_TIMEOUT_SECS: u64 = 30;

/// Read access to the specimen provenance graph
#[async_trait]
pub trait SpecimenSource: Send + Sync {
    /// Full record of a single node
    async fn get_data(&self, nhash_id: &str) -> Result<NodeRecord>;

    /// The node and all of its ancestors with their parent edges
    async fn get_ancestors(&self, nhash_id: &str) -> Result<GraphResponse>;

    /// The node and all of its descendants
    async fn get_descendants(&self, nhash_id: &str) -> Result<GraphResponse>;
}

pub struct SpecimenPortalClient {
    client: Client,
    base_url: String,
    jwt_token: String,
    timeout: Duration,
    descendants_timeout: Duration,
}

impl SpecimenPortalClient {
    pub fn new(base_url: &str, jwt_token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("bkbit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: endpoints::normalize_base_url(base_url),
            jwt_token: jwt_token.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            descendants_timeout: Duration::from_secs(DESCENDANTS_TIMEOUT_SECS),
        })
    }

    /// Override both request timeouts
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.descendants_timeout = timeout.max(self.descendants_timeout);
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Direct parents of a node
    pub async fn get_parents(&self, nhash_id: &str) -> Result<Value> {
        let url = endpoints::parents_url(&self.base_url, nhash_id);
        self.fetch(&url, nhash_id, self.timeout).await
    }

    /// Donors matching the given filters
    pub async fn get_donors(&self, query: &DonorQuery) -> Result<Value> {
        let url = endpoints::donors_url(&self.base_url, &query.params());
        debug!(url = %url, "Querying donors");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.jwt_token)
            .timeout(self.timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SpecimenError::DonorStatus(response.status().as_u16()));
        }

        let body: Value = response.json().await?;
        check_portal_error(&body)?;
        Ok(body)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        nhash_id: &str,
        timeout: Duration,
    ) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.jwt_token)
            .timeout(timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(SpecimenError::Status {
                nhash_id: nhash_id.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body: Value = response.json().await?;
        check_portal_error(&body)?;
        Ok(serde_json::from_value(body)?)
    }
}

#[async_trait]
impl SpecimenSource for SpecimenPortalClient {
    async fn get_data(&self, nhash_id: &str) -> Result<NodeRecord> {
        let url = endpoints::info_url(&self.base_url, nhash_id);
        let info: InfoResponse = self.fetch(&url, nhash_id, self.timeout).await?;
        Ok(info.data)
    }

    async fn get_ancestors(&self, nhash_id: &str) -> Result<GraphResponse> {
        let url = endpoints::ancestors_url(&self.base_url, nhash_id, true);
        self.fetch(&url, nhash_id, self.timeout).await
    }

    async fn get_descendants(&self, nhash_id: &str) -> Result<GraphResponse> {
        let url = endpoints::descendants_url(&self.base_url, nhash_id, true);
        self.fetch(&url, nhash_id, self.descendants_timeout).await
    }
}

/// The portal answers some failures with 200 and an `error` member
fn check_portal_error(body: &Value) -> Result<()> {
    match body.get("error") {
        Some(Value::String(message)) => Err(SpecimenError::Portal(message.clone())),
        Some(other) => Err(SpecimenError::Portal(other.to_string())),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> SpecimenPortalClient {
        SpecimenPortalClient::new(&format!("{}/api/v1/nhash_ids", server.uri()), "secret").unwrap()
    }

    #[tokio::test]
    async fn test_get_data_sends_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/nhash_ids/info"))
            .and(query_param("id", "LA-1"))
            .and(header("authorization", "Bearer secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {"id": "LA-1", "category": "Library Aliquot", "record": {"library_aliquot_local_name": "NY-1"}}
            })))
            .mount(&server)
            .await;

        let record = client_for(&server).await.get_data("LA-1").await.unwrap();
        assert_eq!(record.id.as_deref(), Some("LA-1"));
        assert_eq!(record.category.as_deref(), Some("Library Aliquot"));
    }

    #[tokio::test]
    async fn test_non_200_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/nhash_ids/ancestors"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_ancestors("LA-1").await.unwrap_err();
        assert!(matches!(err, SpecimenError::Status { status: 401, .. }));
        assert_eq!(err.to_string(), "Error getting data for NHash ID = LA-1. Status Code: 401");
    }

    #[tokio::test]
    async fn test_error_member_is_portal_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/nhash_ids/descendants"))
            .and(query_param("nhash_only", "True"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "not found"})))
            .mount(&server)
            .await;

        let err = client_for(&server).await.get_descendants("XX-1").await.unwrap_err();
        assert!(matches!(err, SpecimenError::Portal(ref m) if m == "not found"));
    }

    #[tokio::test]
    async fn test_get_donors_passes_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/nhash_ids/donors"))
            .and(query_param("species", "Mus musculus"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"id": "DO-1"}]})))
            .mount(&server)
            .await;

        let query = DonorQuery {
            species: Some("Mus musculus".to_string()),
            ..Default::default()
        };
        let donors = client_for(&server).await.get_donors(&query).await.unwrap();
        assert_eq!(donors["data"][0]["id"], "DO-1");
    }
}
