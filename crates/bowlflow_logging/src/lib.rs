//! Shared logging utilities for Bowlflow binaries.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "bowlflow=info,bowlflow_store=info";
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Logging configuration for Bowlflow binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a size-capped file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer = SharedCappedWriter::new(log_dir, config.app_name)
        .context("Failed to initialize log writer")?;

    let file_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

/// Get the Bowlflow home directory: ~/.bowlflow
pub fn bowlflow_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("BOWLFLOW_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .map(|home| home.join(".bowlflow"))
        .unwrap_or_else(|| PathBuf::from(".bowlflow"))
}

/// Get the logs directory: ~/.bowlflow/logs
pub fn logs_dir() -> PathBuf {
    bowlflow_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Appender that keeps one `<name>.log` plus one `<name>.log.1` backup,
/// rolling when the current file exceeds the size cap.
struct CappedFileAppender {
    dir: PathBuf,
    base_name: String,
    max_size: u64,
    file: Option<File>,
    current_size: u64,
}

impl CappedFileAppender {
    fn new(dir: PathBuf, base_name: &str, max_size: u64) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let mut appender = Self {
            dir,
            base_name: sanitize_name(base_name),
            max_size,
            file: None,
            current_size: 0,
        };
        appender.reopen()?;
        if appender.current_size > appender.max_size {
            appender.roll()?;
        }
        Ok(appender)
    }

    fn current_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log", self.base_name))
    }

    fn backup_path(&self) -> PathBuf {
        self.dir.join(format!("{}.log.1", self.base_name))
    }

    fn reopen(&mut self) -> io::Result<()> {
        let path = self.current_path();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.current_size = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn roll(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }
        let current = self.current_path();
        if current.exists() {
            let backup = self.backup_path();
            if backup.exists() {
                fs::remove_file(&backup)?;
            }
            fs::rename(&current, &backup)?;
        }
        self.reopen()
    }
}

impl Write for CappedFileAppender {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.current_size + buf.len() as u64 > self.max_size {
            self.roll()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let bytes = file.write(buf)?;
        self.current_size += bytes as u64;
        Ok(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

#[derive(Clone)]
struct SharedCappedWriter {
    inner: Arc<Mutex<CappedFileAppender>>,
}

impl SharedCappedWriter {
    fn new(dir: PathBuf, base_name: &str) -> Result<Self> {
        let appender = CappedFileAppender::new(dir, base_name, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {}", base_name))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(appender)),
        })
    }
}

struct SharedCappedWriterGuard {
    inner: Arc<Mutex<CappedFileAppender>>,
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedCappedWriter {
    type Writer = SharedCappedWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        SharedCappedWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Write for SharedCappedWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appender_rolls_once_past_the_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut appender =
            CappedFileAppender::new(dir.path().to_path_buf(), "tracker", 16).unwrap();
        appender.write_all(b"0123456789abcdef").unwrap();
        appender.write_all(b"next line").unwrap();
        appender.flush().unwrap();
        assert!(dir.path().join("tracker.log.1").exists());
        let current = fs::read_to_string(dir.path().join("tracker.log")).unwrap();
        assert_eq!(current, "next line");
    }

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_name("bowl/flow scan"), "bowl_flow_scan");
    }
}
