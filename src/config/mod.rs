//! Configuration management for argocd-mcp
//!
//! Settings come from an optional YAML file, overridden by CLI flags and
//! environment variables (see `cli::CommandContext`).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cache::CacheTtl;
use crate::error::{ConfigError, Result};

/// Name of the per-user directory holding config and cached state
const APP_DIR: &str = "argocd-mcp";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Argo CD server address, with or without scheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Argo CD API token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Skip TLS certificate verification
    #[serde(default)]
    pub insecure: bool,

    /// Directory for cache files, identity record and logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Cache lifetimes
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Per-resource cache TTLs, in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cluster_ttl_secs")]
    pub cluster_ttl_secs: u64,

    #[serde(default = "default_application_ttl_secs")]
    pub application_ttl_secs: u64,
}

fn default_cluster_ttl_secs() -> u64 {
    CacheTtl::CLUSTERS.as_secs()
}

fn default_application_ttl_secs() -> u64 {
    CacheTtl::APPLICATIONS.as_secs()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cluster_ttl_secs: default_cluster_ttl_secs(),
            application_ttl_secs: default_application_ttl_secs(),
        }
    }
}

/// Resolved connection settings for the upstream server
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    /// REST base URL, scheme included, no trailing slash
    pub base_url: String,
    /// Server identity (`host:port`), used for drift detection
    pub endpoint: String,
    pub auth_token: String,
    pub insecure: bool,
}

/// Resolved cache settings
#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub state_dir: PathBuf,
    pub cluster_ttl: Duration,
    pub application_ttl: Duration,
}

impl Config {
    /// Get the default config file path (~/.argocd-mcp/config.yaml)
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(format!(".{}", APP_DIR)).join("config.yaml"))
    }

    /// Load configuration from an explicit path, or the default one.
    ///
    /// A missing default file yields the default configuration; a missing
    /// explicit file is an error.
    pub fn load_at(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(Path::new(path)),
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()).into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Default state directory (~/.cache/argocd-mcp on Linux)
    pub fn default_state_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
    }

    /// State directory, falling back to the platform default
    pub fn state_dir(&self) -> PathBuf {
        self.state_dir
            .clone()
            .unwrap_or_else(Self::default_state_dir)
    }

    /// Resolve the upstream connection settings; server and token are required.
    pub fn server_settings(&self) -> Result<ServerSettings> {
        let server = self
            .server
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingServer)?;
        let auth_token = self
            .auth_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let (base_url, endpoint) = normalize_server(server);

        Ok(ServerSettings {
            base_url,
            endpoint,
            auth_token: auth_token.to_string(),
            insecure: self.insecure,
        })
    }

    /// Resolve cache settings, rejecting zero TTLs.
    pub fn cache_settings(&self) -> Result<CacheSettings> {
        Ok(CacheSettings {
            state_dir: self.state_dir(),
            cluster_ttl: ttl("cluster", self.cache.cluster_ttl_secs)?,
            application_ttl: ttl("application", self.cache.application_ttl_secs)?,
        })
    }
}

fn ttl(resource: &str, secs: u64) -> Result<Duration> {
    if secs == 0 {
        return Err(
            ConfigError::Invalid(format!("{} cache TTL must be at least 1 second", resource))
                .into(),
        );
    }
    Ok(Duration::from_secs(secs))
}

/// Split a configured server into its REST base URL and its identity.
///
/// The identity drops the scheme so `https://argocd:443` and `argocd:443`
/// count as the same server; the base URL defaults to https.
pub fn normalize_server(server: &str) -> (String, String) {
    let server = server.trim().trim_end_matches('/');

    let endpoint = server
        .strip_prefix("https://")
        .or_else(|| server.strip_prefix("http://"))
        .unwrap_or(server)
        .to_string();

    let base_url = if server.starts_with("https://") || server.starts_with("http://") {
        server.to_string()
    } else {
        format!("https://{}", server)
    };

    (base_url, endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.server.is_none());
        assert!(config.auth_token.is_none());
        assert!(!config.insecure);
        assert_eq!(config.cache.cluster_ttl_secs, 3600);
        assert_eq!(config.cache.application_ttl_secs, 3600);
    }

    #[test]
    fn test_normalize_server() {
        let cases = [
            ("https://argocd.example.com:443", "https://argocd.example.com:443", "argocd.example.com:443"),
            ("http://argocd.example.com:80", "http://argocd.example.com:80", "argocd.example.com:80"),
            ("argocd.example.com:443", "https://argocd.example.com:443", "argocd.example.com:443"),
            ("https://localhost:8080/", "https://localhost:8080", "localhost:8080"),
        ];

        for (input, base_url, endpoint) in cases {
            let (b, e) = normalize_server(input);
            assert_eq!(b, base_url, "base url for {}", input);
            assert_eq!(e, endpoint, "endpoint for {}", input);
        }
    }

    #[test]
    fn test_server_settings_requires_server_and_token() {
        let mut config = Config::default();
        assert!(matches!(
            config.server_settings(),
            Err(Error::Config(ConfigError::MissingServer))
        ));

        config.server = Some("argocd:443".to_string());
        assert!(matches!(
            config.server_settings(),
            Err(Error::Config(ConfigError::MissingToken))
        ));

        config.auth_token = Some("token".to_string());
        let settings = config.server_settings().unwrap();
        assert_eq!(settings.endpoint, "argocd:443");
        assert_eq!(settings.base_url, "https://argocd:443");
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let mut config = Config::default();
        config.cache.application_ttl_secs = 0;

        match config.cache_settings() {
            Err(Error::Config(ConfigError::Invalid(msg))) => assert!(msg.contains("application")),
            other => panic!("Expected invalid TTL error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "server: https://argocd.internal\nauth_token: abc\nstate_dir: /var/lib/argocd-mcp\ncache:\n  cluster_ttl_secs: 120\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.server.as_deref(), Some("https://argocd.internal"));
        assert_eq!(config.state_dir(), PathBuf::from("/var/lib/argocd-mcp"));

        let cache = config.cache_settings().unwrap();
        assert_eq!(cache.cluster_ttl, Duration::from_secs(120));
        assert_eq!(cache.application_ttl, Duration::from_secs(3600));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.yaml");

        match Config::load_at(path.to_str()) {
            Err(Error::Config(ConfigError::NotFound(p))) => assert!(p.contains("nope.yaml")),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }
}
