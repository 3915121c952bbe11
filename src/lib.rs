//! desklog - console and daily rotating file logging for desktop applications
//!
//! The application owns a [`LoggerLifecycle`] (or uses the process-wide one
//! behind [`get_logger`]) and hands the resulting [`Logger`] to whatever needs
//! to log.
//!
//! ```rust,ignore
//! let logger = desklog::get_logger().await?;
//! logger.info("window opened");
//! ```

use std::sync::OnceLock;

pub mod config;
pub mod logging;
pub mod platform;

pub use config::LoggingConfig;
pub use logging::{InitError, Logger, LoggerLifecycle, Severity};

static LIFECYCLE: OnceLock<LoggerLifecycle> = OnceLock::new();

/// The process-wide lifecycle, wired to the default platform services
pub fn global_lifecycle() -> &'static LoggerLifecycle {
    LIFECYCLE.get_or_init(LoggerLifecycle::from_process)
}

/// Get the process-wide logger, initializing it on first use
pub async fn get_logger() -> Result<Logger, InitError> {
    global_lifecycle().get_logger().await
}
