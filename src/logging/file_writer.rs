//! Daily rotating file sink
//!
//! Writes one line per record to a file whose name carries the record's local
//! calendar date. Rotation is lazy: it is checked on every write, so a day
//! without log calls produces no file.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;

use super::error::{InitError, SinkError};
use super::record::{LogRecord, Severity};
use super::sink::Sink;

/// Date format prepended to the base file name
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Build the dated path for a base path
///
/// The date goes in front of the file name, never the directory:
/// `/logs/desktop.production.log` becomes `/logs/2024-05-17.desktop.production.log`.
pub fn dated_log_path(dir: &Path, base_name: &str, date: NaiveDate) -> PathBuf {
    dir.join(format!("{}.{}", date.format(DATE_FORMAT), base_name))
}

/// The file currently open for appending
#[derive(Debug)]
struct ActiveFile {
    date: NaiveDate,
    path: PathBuf,
    file: File,
}

impl ActiveFile {
    fn append(&mut self, line: &str) -> std::io::Result<()> {
        writeln!(self.file, "{}", line)?;
        self.file.flush()
    }
}

/// Sink that appends to `<dir>/<YYYY-MM-DD>.<base name>`
#[derive(Debug)]
pub struct RotatingFileSink {
    dir: PathBuf,
    base_name: String,
    threshold: Severity,
    /// At most one open handle; `None` before the first write or after a failure
    active: Mutex<Option<ActiveFile>>,
}

impl RotatingFileSink {
    /// Create a sink for `base_path` (directory + base file name)
    ///
    /// No file is opened until the first write.
    pub fn new(base_path: impl Into<PathBuf>, threshold: Severity) -> Result<Self, InitError> {
        let base_path = base_path.into();
        let base_name = match base_path.file_name().and_then(|n| n.to_str()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(InitError::InvalidBasePath(base_path)),
        };
        let dir = base_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Ok(Self {
            dir,
            base_name,
            threshold,
            active: Mutex::new(None),
        })
    }

    /// Directory the dated files are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Base file name without the date prefix
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    /// Path of the file currently open, if any
    pub fn current_path(&self) -> Option<PathBuf> {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|active| active.path.clone())
    }

    fn open(&self, date: NaiveDate) -> Result<ActiveFile, SinkError> {
        let path = dated_log_path(&self.dir, &self.base_name, date);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| SinkError::Rotation {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(target: "desklog::internal::file", path = %path.display(), "opened log file");
        Ok(ActiveFile { date, path, file })
    }
}

impl Sink for RotatingFileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn threshold(&self) -> Severity {
        self.threshold
    }

    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        let date = record.timestamp.date_naive();
        let mut slot = self.active.lock().unwrap_or_else(PoisonError::into_inner);

        let mut active = match slot.take() {
            Some(active) if active.date == date => active,
            previous => {
                // Close the old day's handle before opening the next one
                drop(previous);
                self.open(date)?
            }
        };

        // On failure the handle is dropped so the next write reopens it
        active
            .append(line)
            .map_err(|source| SinkError::write(self.name(), source))?;
        *slot = Some(active);
        Ok(())
    }
}
