use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEntry {
    pub timestamp: String,
    pub query: String,
    pub helpful: bool,
}

/// Append-only JSON-lines file of user feedback on answers.
pub struct FeedbackLog {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FeedbackLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), write_lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn record(&self, query: &str, helpful: bool) -> Result<FeedbackEntry> {
        self.record_at(Utc::now(), query, helpful)
    }

    pub fn record_at(&self, at: DateTime<Utc>, query: &str, helpful: bool) -> Result<FeedbackEntry> {
        let entry = FeedbackEntry {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Secs, true),
            query: query.to_string(),
            helpful,
        };
        let line = serde_json::to_string(&entry)?;
        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open feedback log {}", self.path.display()))?;
        writeln!(file, "{line}").with_context(|| format!("Failed to append to {}", self.path.display()))?;
        debug!(helpful, path = %self.path.display(), "feedback recorded");
        Ok(entry)
    }

    /// Entries in file order; a missing file reads as empty.
    pub fn entries(&self) -> Result<Vec<FeedbackEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read feedback log {}", self.path.display()))?;
        content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).with_context(|| format!("Malformed feedback line: {l}")))
            .collect()
    }
}
