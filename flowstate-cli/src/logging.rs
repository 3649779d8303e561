//! Log output for the CLI
//!
//! Interactive commands log to stderr. The MCP server owns stdout for the
//! protocol, so in `serve` mode logs go to a file instead.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the server log file
pub const LOG_FILE_ENV: &str = "FLOWSTATE_LOG_FILE";

/// Default server log file name inside the data directory
pub const DEFAULT_LOG_FILE: &str = "mcp.log";

/// A writer that flushes and syncs every write
///
/// Server logs must be on disk even if the client kills the process, so every
/// write is pushed through to the file before returning. Clones share the
/// same file.
#[derive(Clone)]
pub struct FileWriterGuard {
    file: Arc<Mutex<File>>,
}

impl FileWriterGuard {
    /// Wrap a shared file
    pub fn new(file: Arc<Mutex<File>>) -> Self {
        Self { file }
    }
}

impl Write for FileWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        let written = file.write(buf)?;
        file.flush()?;
        file.sync_all()?;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.flush()?;
        file.sync_all()
    }
}

/// Level implied by the global flags
pub fn level_for(quiet: bool, debug: bool, verbose: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::TRACE
    } else if debug {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// `RUST_LOG` when set, otherwise everything at `level` and above
fn filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()))
}

/// Log to stderr
pub fn init_stderr(level: Level) {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter(level))
        .init();
}

/// Run `f` with a temporary stderr subscriber
///
/// Used for work that happens before the process-wide subscriber exists,
/// such as loading configuration, so its warnings still reach the user.
pub fn with_stderr<T>(level: Level, f: impl FnOnce() -> T) -> T {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter(level))
        .finish();
    tracing::subscriber::with_default(subscriber, f)
}

/// Server log path: `FLOWSTATE_LOG_FILE` if set, else `mcp.log` in `data_dir`
pub fn server_log_path(data_dir: &Path) -> PathBuf {
    match std::env::var(LOG_FILE_ENV) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => data_dir.join(DEFAULT_LOG_FILE),
    }
}

/// Log to a file for MCP mode, falling back to stderr when it cannot be opened
pub fn init_server(level: Level, log_file: &Path) {
    let opened = log_file
        .parent()
        .map_or(Ok(()), std::fs::create_dir_all)
        .and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_file)
        });

    match opened {
        Ok(file) => {
            let guard = FileWriterGuard::new(Arc::new(Mutex::new(file)));
            tracing_subscriber::fmt()
                .with_writer(move || guard.clone())
                .with_env_filter(filter(level))
                .with_ansi(false)
                .init();
        }
        Err(e) => {
            init_stderr(level);
            tracing::warn!("Failed to open log file {:?}, using stderr: {}", log_file, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use tempfile::TempDir;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(false, false, false), Level::INFO);
        assert_eq!(level_for(false, true, false), Level::DEBUG);
        assert_eq!(level_for(false, false, true), Level::TRACE);
        assert_eq!(level_for(true, true, true), Level::ERROR);
    }

    #[test]
    fn test_file_writer_guard_writes_through() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.log");
        let file = File::create(&path).unwrap();

        let mut guard = FileWriterGuard::new(Arc::new(Mutex::new(file)));
        let mut clone = guard.clone();
        guard.write_all(b"first\n").unwrap();
        clone.write_all(b"second\n").unwrap();

        let mut content = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut content)
            .unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[test]
    fn test_server_log_path_defaults_to_data_dir() {
        std::env::remove_var(LOG_FILE_ENV);
        assert_eq!(
            server_log_path(Path::new("/data")),
            PathBuf::from("/data/mcp.log")
        );
    }
}
