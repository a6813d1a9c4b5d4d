//! Mock Argo CD API client for testing
//!
//! Provides a mock implementation of [`ArgoApi`] for unit testing
//! without making real API calls.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use super::{Application, ArgoApi, Cluster};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure expected responses via builder methods, then hand it to a cache.
///
/// # Example
/// ```ignore
/// let mock = MockArgoClient::new().with_clusters(vec![Cluster::new("prod", "https://prod")]);
///
/// let clusters = mock.list_clusters().await?;
/// assert_eq!(clusters.len(), 1);
/// ```
#[derive(Default)]
pub struct MockArgoClient {
    /// Clusters to return from list_clusters
    clusters: Arc<Mutex<Vec<Cluster>>>,
    /// Applications to return from list_applications
    applications: Arc<Mutex<Vec<Application>>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Fail every call with a network error
    unreachable: bool,
    /// Respond only after this long
    delay: Option<Duration>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
}

/// Number of calls made to each endpoint
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CallCounts {
    pub list_clusters: usize,
    pub list_applications: usize,
}

impl MockArgoClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clusters(self, clusters: Vec<Cluster>) -> Self {
        Self {
            clusters: Arc::new(Mutex::new(clusters)),
            ..self
        }
    }

    pub fn with_applications(self, applications: Vec<Application>) -> Self {
        Self {
            applications: Arc::new(Mutex::new(applications)),
            ..self
        }
    }

    /// Fail the next call with `error`
    pub fn with_error(self, error: ApiError) -> Self {
        Self {
            error: Arc::new(Mutex::new(Some(error))),
            ..self
        }
    }

    /// Fail every call, as if the server were down
    pub fn unreachable(self) -> Self {
        Self {
            unreachable: true,
            ..self
        }
    }

    /// Answer every call after `delay`, like a slow server
    pub fn with_delay(self, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..self
        }
    }

    pub async fn call_counts(&self) -> CallCounts {
        *self.call_count.lock().await
    }

    async fn take_error(&self) -> Result<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable {
            return Err(ApiError::Network("Failed to connect to Argo CD".to_string()).into());
        }
        match self.error.lock().await.take() {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ArgoApi for MockArgoClient {
    async fn list_clusters(&self) -> Result<Vec<Cluster>> {
        self.call_count.lock().await.list_clusters += 1;
        self.take_error().await?;
        Ok(self.clusters.lock().await.clone())
    }

    async fn list_applications(&self) -> Result<Vec<Application>> {
        self.call_count.lock().await.list_applications += 1;
        self.take_error().await?;
        Ok(self.applications.lock().await.clone())
    }
}
