//! Command execution context
//!
//! Merges the config file with CLI/env overrides so every command sees one
//! resolved [`Config`].

use crate::cli::{GlobalOptions, OutputFormat};
use crate::config::Config;
use crate::error::Result;

/// Context for command execution: resolved configuration plus runtime options.
pub struct CommandContext {
    /// Config file values with CLI/env overrides applied
    pub config: Config,
    /// Output format preference
    pub format: OutputFormat,
    /// Debug logging requested
    pub debug: bool,
}

impl CommandContext {
    /// Load the config file (explicit path or default location) and apply
    /// the CLI/env layer on top.
    ///
    /// # Errors
    /// Returns error if an explicitly named config file is missing or invalid.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_at(opts.config_ref())?;
        apply_overrides(&mut config, opts);

        Ok(Self {
            config,
            format: opts.format,
            debug: opts.debug,
        })
    }
}

fn apply_overrides(config: &mut Config, opts: &GlobalOptions) {
    if let Some(server) = &opts.server {
        config.server = Some(server.clone());
    }
    if let Some(token) = &opts.token {
        config.auth_token = Some(token.clone());
    }
    if opts.insecure {
        config.insecure = true;
    }
    if let Some(dir) = &opts.state_dir {
        config.state_dir = Some(dir.clone());
    }
    if let Some(secs) = opts.cluster_ttl {
        config.cache.cluster_ttl_secs = secs;
    }
    if let Some(secs) = opts.application_ttl {
        config.cache.application_ttl_secs = secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_overrides_win_over_file_values() {
        let mut config = Config {
            server: Some("file.example.com".to_string()),
            auth_token: Some("file-token".to_string()),
            ..Default::default()
        };
        let opts = GlobalOptions {
            server: Some("flag.example.com".to_string()),
            state_dir: Some(PathBuf::from("/tmp/flag")),
            application_ttl: Some(120),
            ..Default::default()
        };

        apply_overrides(&mut config, &opts);

        assert_eq!(config.server.as_deref(), Some("flag.example.com"));
        assert_eq!(config.auth_token.as_deref(), Some("file-token"));
        assert_eq!(config.state_dir, Some(PathBuf::from("/tmp/flag")));
        assert_eq!(config.cache.application_ttl_secs, 120);
        assert_eq!(config.cache.cluster_ttl_secs, 3600);
    }

    #[test]
    fn test_insecure_flag_cannot_disable_file_setting() {
        let mut config = Config {
            insecure: true,
            ..Default::default()
        };

        apply_overrides(&mut config, &GlobalOptions::default());

        assert!(config.insecure);
    }

    #[test]
    fn test_new_with_explicit_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "server: argocd.example.com\ninsecure: true\n").unwrap();

        let opts = GlobalOptions {
            config: Some(path.display().to_string()),
            token: Some("t".to_string()),
            ..Default::default()
        };
        let ctx = CommandContext::new(&opts).unwrap();

        assert_eq!(ctx.config.server.as_deref(), Some("argocd.example.com"));
        assert_eq!(ctx.config.auth_token.as_deref(), Some("t"));
        assert!(ctx.config.insecure);
    }

    #[test]
    fn test_new_with_missing_explicit_config_fails() {
        let opts = GlobalOptions {
            config: Some("/nonexistent/argocd-mcp/config.yaml".to_string()),
            ..Default::default()
        };

        assert!(CommandContext::new(&opts).is_err());
    }
}
