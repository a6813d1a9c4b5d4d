//! Argo CD REST API client implementation

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::{Application, ArgoApi, Cluster};
use crate::config::ServerSettings;
use crate::error::{ApiError, Result};

/// Client-side ceiling on request rate against the Argo CD API server
const RATE_LIMIT_PER_SECOND: u32 = 10;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Argo CD list responses; `items` is `null` when the list is empty
#[derive(Deserialize)]
struct ListResponse<T> {
    items: Option<Vec<T>>,
}

/// Argo CD API client
pub struct ArgoCdClient {
    http: HttpClient,
    base_url: String,
    auth_token: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl ArgoCdClient {
    /// Create a new client for the configured server
    pub fn new(settings: &ServerSettings) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .danger_accept_invalid_certs(settings.insecure)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota =
            Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
            auth_token: settings.auth_token.clone(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// GET a list endpoint and unwrap its `items`
    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let response: ListResponse<T> = self.get(path).await?;
        Ok(response.items.unwrap_or_default())
    }

    /// Make an authenticated GET request
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.auth_token)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let data = response.json::<T>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl ArgoApi for ArgoCdClient {
    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        self.list("/api/v1/clusters").await
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        self.list("/api/v1/applications").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn settings(base_url: &str) -> ServerSettings {
        ServerSettings {
            base_url: base_url.to_string(),
            endpoint: "argocd.test:443".to_string(),
            auth_token: "test-token".to_string(),
            insecure: false,
        }
    }

    #[test]
    fn test_client_creation() {
        let client = ArgoCdClient::new(&settings("https://argocd.test"));
        assert!(client.is_ok());
    }

    #[cfg_attr(not(feature = "http-tests"), ignore)]
    #[tokio::test]
    async fn test_list_clusters_sends_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/clusters")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(r#"{"metadata":{},"items":[{"server":"https://kubernetes.default.svc","name":"in-cluster"}]}"#)
            .create_async()
            .await;

        let client = ArgoCdClient::new(&settings(&server.url())).unwrap();
        let clusters = client.list_clusters().await.unwrap();

        mock.assert_async().await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "in-cluster");
    }

    #[cfg_attr(not(feature = "http-tests"), ignore)]
    #[tokio::test]
    async fn test_null_items_is_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v1/applications")
            .with_status(200)
            .with_body(r#"{"metadata":{},"items":null}"#)
            .create_async()
            .await;

        let client = ArgoCdClient::new(&settings(&server.url())).unwrap();
        let apps = client.list_applications().await.unwrap();
        assert!(apps.is_empty());
    }

    #[cfg_attr(not(feature = "http-tests"), ignore)]
    #[tokio::test]
    async fn test_status_mapping() {
        let mut server = mockito::Server::new_async().await;
        let _unauthorized = server
            .mock("GET", "/api/v1/clusters")
            .with_status(401)
            .create_async()
            .await;
        let _limited = server
            .mock("GET", "/api/v1/applications")
            .with_status(429)
            .with_header("retry-after", "12")
            .create_async()
            .await;

        let client = ArgoCdClient::new(&settings(&server.url())).unwrap();

        match client.list_clusters().await {
            Err(Error::Api(ApiError::Unauthorized)) => (),
            other => panic!("Expected Unauthorized, got {:?}", other),
        }
        match client.list_applications().await {
            Err(Error::Api(ApiError::RateLimit(retry))) => {
                assert_eq!(retry, Duration::from_secs(12))
            }
            other => panic!("Expected RateLimit, got {:?}", other),
        }
    }
}
