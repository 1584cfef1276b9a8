//! Append-only audit log.
//!
//! Every transformation and submission is written here so that a session can be reconstructed
//! after the fact. Strings are written as-is and everything else as pretty-printed JSON. Each
//! write opens the file in append mode and flushes before returning.

use crate::Result;
use anyhow::Context;
use chrono::Local;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handles writing entries to the audit log file. Created once per session and handed to the
/// parts of the program that need to record what they did.
#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
    echo: bool,
}

impl AuditLog {
    /// Opens (creating if needed) the audit log at `path` and writes a session header. When `echo`
    /// is set, every entry is also printed to the terminal.
    pub fn open(path: impl Into<PathBuf>, echo: bool) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Unable to create the log directory {}", parent.display())
            })?;
        }
        let log = Self { path, echo };
        let now = Local::now().format("%Y-%m-%dT%H:%M:%S%z");
        log.log(&format!("\n\n\n=={now}================================"))?;
        Ok(log)
    }

    /// Write a line of text.
    pub fn log(&self, text: &str) -> Result<()> {
        self.append(text)
    }

    /// Write a value as pretty-printed JSON.
    pub fn log_value<T>(&self, value: &T) -> Result<()>
    where
        T: Serialize + ?Sized,
    {
        let json = serde_json::to_string_pretty(value).context("Unable to serialize log entry")?;
        self.append(&json)
    }

    /// Write an empty line.
    pub fn blank(&self) -> Result<()> {
        self.append("")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, text: &str) -> Result<()> {
        if self.echo {
            println!("{text}");
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open audit log {}", self.path.display()))?;
        writeln!(file, "{text}")
            .with_context(|| format!("Failed to write audit log {}", self.path.display()))?;
        file.flush()
            .with_context(|| format!("Failed to flush audit log {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_writes_session_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log").join("log.log");
        let _log = AuditLog::open(&path, false).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("\n\n\n=="));
        assert!(contents.trim_end().ends_with("================================"));
    }

    #[test]
    fn test_entries_are_appended_across_sessions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.log");

        let first = AuditLog::open(&path, false).unwrap();
        first.log("first session").unwrap();
        let second = AuditLog::open(&path, false).unwrap();
        second.log_value(&serde_json::json!({"cost": "10.00"})).unwrap();
        second.blank().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("first session\n"));
        assert!(contents.contains("{\n  \"cost\": \"10.00\"\n}\n\n"));
        assert_eq!(2, contents.matches("\n\n\n==").count());
    }
}
