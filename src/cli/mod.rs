//! CLI command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod cache;
pub mod context;
pub mod serve;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

/// argocd-mcp - cached Argo CD inventory for MCP clients
#[derive(Parser, Debug)]
#[command(name = "argocd-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format for cache commands (pretty, json)
    #[arg(
        long,
        global = true,
        env = "ARGOCD_MCP_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "ARGOCD_MCP_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Argo CD server address (e.g. https://argocd.example.com)
    #[arg(long, global = true, env = "ARGOCD_BASE_URL")]
    pub server: Option<String>,

    /// Argo CD API token
    #[arg(long, global = true, env = "ARGOCD_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true, env = "ARGOCD_INSECURE")]
    pub insecure: bool,

    /// Directory for cache files and logs
    #[arg(long, global = true, env = "ARGOCD_MCP_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Cluster cache TTL in seconds
    #[arg(long, global = true, env = "ARGOCD_MCP_CLUSTER_TTL", value_name = "SECONDS")]
    pub cluster_ttl: Option<u64>,

    /// Application cache TTL in seconds
    #[arg(long, global = true, env = "ARGOCD_MCP_APPLICATION_TTL", value_name = "SECONDS")]
    pub application_ttl: Option<u64>,

    /// Enable debug logging
    #[arg(long, global = true, env = "ARGOCD_MCP_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum Commands {
    /// Run the MCP server on stdin/stdout
    Serve,

    /// Manage the local cache
    #[command(subcommand)]
    Cache(CacheCommands),
}

/// Cache management subcommands
#[derive(Subcommand, Debug, Clone, Copy)]
pub enum CacheCommands {
    /// Show cache state per resource type
    Status,
    /// Delete cached data (the server identity record is kept)
    Clear,
    /// Print state directory path
    Path,
}
