//! Cache management commands
//!
//! These inspect the state directory directly; they never contact the
//! Argo CD server.

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheContext, CacheEntry, IdentityTracker};
use crate::cli::{CommandContext, OutputFormat};
use crate::error::{CacheError, Result};

/// State of one cache file on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileState {
    Missing,
    Valid,
    Expired,
    Corrupt,
}

/// Summary of one resource cache file
#[derive(Debug, Clone, Serialize)]
pub struct FileStatus {
    pub resource: &'static str,
    pub file: &'static str,
    pub state: FileState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Inspect every resource cache file under `state_dir`.
pub fn inspect(state_dir: &Path, now: DateTime<Utc>) -> Vec<FileStatus> {
    CacheContext::cache_files()
        .into_iter()
        .map(|(resource, file)| {
            let mut status = FileStatus {
                resource,
                file,
                state: FileState::Missing,
                items: None,
                size_bytes: None,
                cached_at: None,
                expires_at: None,
            };

            let Ok(bytes) = std::fs::read(state_dir.join(file)) else {
                return status;
            };
            status.size_bytes = Some(bytes.len() as u64);

            // Item shapes don't matter here, only the envelope
            match CacheEntry::<serde_json::Value>::decode(&bytes) {
                Ok(entry) => {
                    status.state = if entry.is_valid_at(now) {
                        FileState::Valid
                    } else {
                        FileState::Expired
                    };
                    status.items = Some(entry.items.len());
                    status.cached_at = Some(entry.cached_at);
                    status.expires_at = Some(entry.expires_at);
                }
                Err(_) => status.state = FileState::Corrupt,
            }

            status
        })
        .collect()
}

/// Delete every resource cache file under `state_dir`, returning how many
/// existed. The server identity record is left in place.
pub fn remove_cache_files(state_dir: &Path) -> Result<usize> {
    let mut removed = 0;
    for (_, file) in CacheContext::cache_files() {
        match std::fs::remove_file(state_dir.join(file)) {
            Ok(()) => removed += 1,
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(CacheError::Io(format!("{}: {}", file, e)).into()),
        }
    }
    Ok(removed)
}

/// Show cache status
pub fn status(ctx: &CommandContext) -> Result<()> {
    let state_dir = ctx.config.state_dir();
    let files = inspect(&state_dir, Utc::now());
    let identity = IdentityTracker::new(&state_dir).load();

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": state_dir.display().to_string(),
                "server": identity.as_ref().map(|i| i.endpoint.as_str()),
                "server_saved_at": identity.as_ref().map(|i| i.saved_at),
                "caches": files,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            println!("Cache Status");
            println!("────────────────────────────────────────");
            println!("Location:       {}", state_dir.display());
            match &identity {
                Some(id) => println!(
                    "Server:         {} (since {})",
                    id.endpoint,
                    format_time(id.saved_at)
                ),
                None => println!("Server:         (none recorded)"),
            }

            for file in &files {
                println!();
                println!("{} cache ({})", capitalize(file.resource), file.file);
                println!("  State:        {:?}", file.state);
                if let Some(items) = file.items {
                    println!("  Items:        {}", items);
                }
                if let Some(size) = file.size_bytes {
                    println!("  Size:         {}", format_size(size));
                }
                if let Some(cached_at) = file.cached_at {
                    println!("  Cached at:    {}", format_time(cached_at));
                }
                if let Some(expires_at) = file.expires_at {
                    println!("  Expires at:   {}", format_time(expires_at));
                }
            }
        }
    }

    Ok(())
}

/// Clear all cached resource files
pub fn clear(ctx: &CommandContext) -> Result<()> {
    let removed = remove_cache_files(&ctx.config.state_dir())?;

    match ctx.format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "files_removed": removed,
                "success": true,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            if removed > 0 {
                println!("Cleared {} cache files", removed);
            } else {
                println!("Cache was already empty");
            }
        }
    }

    Ok(())
}

/// Show state directory path
pub fn path(ctx: &CommandContext) -> Result<()> {
    println!("{}", ctx.config.state_dir().display());
    Ok(())
}

fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Format bytes as human-readable size
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
