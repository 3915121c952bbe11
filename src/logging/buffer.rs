//! In-memory log buffer for real-time viewing
//!
//! A thread-safe ring buffer that doubles as a console surface, so an in-app
//! log viewer can show what the console sink renders.

use std::collections::VecDeque;
use std::io;
use std::sync::RwLock;

use chrono::{DateTime, Local};

use super::console::ConsoleSurface;
use super::record::Severity;

/// A single rendered line
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// When the line was rendered
    pub received_at: DateTime<Local>,
    pub severity: Severity,
    /// The formatted line as the console sink produced it
    pub line: String,
}

impl LogEntry {
    pub fn new(severity: Severity, line: impl Into<String>) -> Self {
        Self {
            received_at: Local::now(),
            severity,
            line: line.into(),
        }
    }
}

/// Thread-safe ring buffer for storing rendered lines
pub struct LogBuffer {
    /// All entries (capped at max_entries)
    entries: RwLock<VecDeque<LogEntry>>,
    max_entries: usize,
}

impl LogBuffer {
    /// Create a new log buffer holding at most `max_entries` lines
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(max_entries)),
            max_entries,
        }
    }

    /// Push a new entry, dropping the oldest when full
    pub fn push(&self, entry: LogEntry) {
        if self.max_entries == 0 {
            return;
        }
        if let Ok(mut entries) = self.entries.write() {
            if entries.len() >= self.max_entries {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
    }

    /// Get all entries as a vector (for rendering)
    pub fn all_entries(&self) -> Vec<LogEntry> {
        self.entries
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Get only the rendered lines
    pub fn lines(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|e| e.iter().map(|entry| entry.line.clone()).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ConsoleSurface for LogBuffer {
    fn render(&self, severity: Severity, line: &str) -> io::Result<()> {
        self.push(LogEntry::new(severity, line));
        Ok(())
    }
}
