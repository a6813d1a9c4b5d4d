//! Error types for argocd-mcp

use std::time::Duration;
use thiserror::Error;

/// Result type alias for argocd-mcp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upstream fetch failed while refreshing a resource cache
    #[error("failed to refresh {resource} cache: {source}")]
    Refresh {
        resource: &'static str,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an upstream failure with the resource it was fetching.
    pub fn refresh(resource: &'static str, source: Error) -> Self {
        Error::Refresh {
            resource,
            source: Box::new(source),
        }
    }
}

/// Argo CD API errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed. Check ARGOCD_API_TOKEN.")]
    Unauthorized,

    #[error("Access denied. The API token lacks permission for this resource.")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to Argo CD".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Argo CD server not configured. Set ARGOCD_BASE_URL or pass --server.")]
    MissingServer,

    #[error("Argo CD API token not configured. Set ARGOCD_API_TOKEN or pass --token.")]
    MissingToken,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Local cache persistence errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Failed to encode cache file: {0}")]
    Encode(String),

    #[error("Failed to decode cache file: {0}")]
    Decode(String),

    #[error("{0} cache is unexpectedly empty after refresh")]
    EmptyAfterRefresh(&'static str),
}
