//! Log file retention management
//!
//! Rotation never deletes anything. Cleanup only happens when a policy is
//! configured, and only touches files named `<YYYY-MM-DD>.<base name>`. The
//! newest such file is always kept.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use super::file_writer::DATE_FORMAT;

/// How long dated log files are kept
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionPolicy {
    /// Delete files dated more than this many days before today
    #[serde(default)]
    pub max_age_days: Option<u64>,

    /// Keep at most this many of the newest files
    #[serde(default)]
    pub max_files: Option<usize>,
}

impl RetentionPolicy {
    pub fn is_enabled(&self) -> bool {
        self.max_age_days.is_some() || self.max_files.is_some()
    }
}

/// Parse the date prefix of a dated log file name for `base_name`
fn log_file_date(file_name: &str, base_name: &str) -> Option<NaiveDate> {
    let date = file_name.strip_suffix(base_name)?.strip_suffix('.')?;
    NaiveDate::parse_from_str(date, DATE_FORMAT).ok()
}

/// Clean up dated log files according to `policy`
///
/// Returns the number of files deleted.
pub fn cleanup_old_logs(
    logs_dir: &Path,
    base_name: &str,
    policy: &RetentionPolicy,
    today: NaiveDate,
) -> Result<usize> {
    if !policy.is_enabled() || !logs_dir.exists() {
        return Ok(0);
    }

    let mut dated: Vec<(NaiveDate, PathBuf)> = Vec::new();
    for entry in fs::read_dir(logs_dir).context("Failed to read logs directory")? {
        let entry = entry?;
        let path = entry.path();

        let Some(date) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| log_file_date(n, base_name))
        else {
            continue;
        };
        if path.is_file() {
            dated.push((date, path));
        }
    }

    // Newest first
    dated.sort_by(|a, b| b.0.cmp(&a.0));

    let cutoff = policy
        .max_age_days
        .and_then(|days| today.checked_sub_days(Days::new(days)));
    let keep = policy.max_files;

    // The newest file is never deleted, whatever the policy
    let mut deleted_count = 0;
    for (index, (date, path)) in dated.iter().enumerate().skip(1) {
        let too_old = cutoff.is_some_and(|cutoff| *date < cutoff);
        let over_count = keep.is_some_and(|keep| index >= keep);
        if (too_old || over_count) && fs::remove_file(path).is_ok() {
            deleted_count += 1;
        }
    }

    Ok(deleted_count)
}
