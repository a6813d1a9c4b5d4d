//! Logging setup
//!
//! stdout carries protocol traffic, so the server logs to a file in the state
//! directory (truncated on every start). One-shot commands log to stderr.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Log file name inside the state directory
pub const LOG_FILE: &str = "log.txt";

/// Where log records go
#[derive(Debug, Clone)]
pub enum LogTarget {
    /// `<state-dir>/log.txt`, falling back to stderr if it cannot be opened
    StateDir(PathBuf),
    Stderr,
}

/// Initialize the global logger. Safe to call more than once.
///
/// `RUST_LOG` sets the filter (default `info`); `debug` raises this crate to
/// debug regardless.
pub fn init(target: LogTarget, debug: bool) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));

    if debug {
        builder.filter_module(env!("CARGO_CRATE_NAME"), LevelFilter::Debug);
    }

    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} [{}] {}",
            buf.timestamp_millis(),
            record.level(),
            record.target(),
            record.args()
        )
    });

    match target {
        LogTarget::StateDir(dir) => match open_log_file(&dir) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("Warning: failed to open log file in {}: {}", dir.display(), e);
                builder.target(Target::Stderr);
            }
        },
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
    }

    let _ = builder.try_init();
}

fn open_log_file(dir: &Path) -> std::io::Result<File> {
    std::fs::create_dir_all(dir)?;
    OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(dir.join(LOG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_log_file_is_truncated() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(LOG_FILE), b"previous run").unwrap();

        let file = open_log_file(dir.path()).unwrap();
        drop(file);

        assert_eq!(std::fs::read(dir.path().join(LOG_FILE)).unwrap().len(), 0);
    }

    #[test]
    fn test_log_file_creates_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        open_log_file(&nested).unwrap();
        assert!(nested.join(LOG_FILE).exists());
    }
}
