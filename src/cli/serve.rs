//! `serve` command: run the MCP server on stdio

use std::sync::Arc;

use log::info;

use crate::cache::CacheContext;
use crate::cli::CommandContext;
use crate::client::ArgoCdClient;
use crate::error::Result;
use crate::logging::{self, LogTarget};
use crate::server;

/// Reconcile the cache against the configured server, then serve until
/// stdin closes.
pub async fn run(ctx: CommandContext) -> Result<()> {
    let cache_settings = ctx.config.cache_settings()?;
    logging::init(LogTarget::StateDir(cache_settings.state_dir.clone()), ctx.debug);

    let server_settings = ctx.config.server_settings()?;
    info!(
        "Starting {} v{} against {} (state dir {})",
        server::SERVER_NAME,
        env!("CARGO_PKG_VERSION"),
        server_settings.base_url,
        cache_settings.state_dir.display()
    );

    let client = Arc::new(ArgoCdClient::new(&server_settings)?);
    let cache = CacheContext::new(client, &server_settings.endpoint, &cache_settings).await;

    server::run_stdio(Arc::new(cache)).await?;

    info!("Input closed, shutting down");
    Ok(())
}
