//! Global CLI options shared across all commands
//!
//! Consolidates the global flags so handlers take one argument.

use std::path::PathBuf;

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Output format (pretty, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.argocd-mcp/config.yaml)
    pub config: Option<String>,

    pub server: Option<String>,

    pub token: Option<String>,

    /// Only ever turns verification off; `false` defers to the config file
    pub insecure: bool,

    pub state_dir: Option<PathBuf>,

    pub cluster_ttl: Option<u64>,

    pub application_ttl: Option<u64>,

    pub debug: bool,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            server: cli.server.clone(),
            token: cli.token.clone(),
            insecure: cli.insecure,
            state_dir: cli.state_dir.clone(),
            cluster_ttl: cli.cluster_ttl,
            application_ttl: cli.application_ttl,
            debug: cli.debug,
        }
    }

    /// Get config path as `Option<&str>`.
    pub fn config_ref(&self) -> Option<&str> {
        self.config.as_deref()
    }
}
