//! argocd-mcp - cached Argo CD inventory served over the Model Context Protocol

use clap::Parser;

mod cache;
mod cli;
mod client;
mod config;
mod error;
mod logging;
mod server;

use cli::{CacheCommands, Cli, CommandContext, Commands, GlobalOptions};
use error::Result;
use logging::LogTarget;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let opts = GlobalOptions::from_cli(&cli);
    let ctx = CommandContext::new(&opts)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => cli::serve::run(ctx).await,
        Commands::Cache(cache_cmd) => {
            logging::init(LogTarget::Stderr, ctx.debug);
            match cache_cmd {
                CacheCommands::Status => cli::cache::status(&ctx),
                CacheCommands::Clear => cli::cache::clear(&ctx),
                CacheCommands::Path => cli::cache::path(&ctx),
            }
        }
    }
}
