//! File logging setup
//!
//! Both binaries log to an append-only text file (`app.log` for the client,
//! `tool.log` for the server), one timestamped line per event. The file is
//! opened once at startup and handed to the global `tracing` subscriber;
//! `File` writes are unbuffered, so each event reaches disk as it is logged.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{Error, Result};

/// Install the global subscriber, writing to `path` in append mode.
///
/// `RUST_LOG` narrows the filter; the default level is `info`. Calling this
/// a second time in one process returns an error from `try_init`, which is
/// mapped to `Error::Config`.
pub fn init_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| Error::Config(format!("Failed to open log file {}: {}", path.display(), e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install subscriber: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_file_creates_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.log");

        // First init in the test process wins; a second install attempt
        // must come back as a Config error, not a panic.
        let first = init_file(&path);
        let second = init_file(&path);

        assert!(path.exists());
        assert!(first.is_ok() || matches!(first, Err(Error::Config(_))));
        assert!(matches!(second, Err(Error::Config(_))));
    }
}
