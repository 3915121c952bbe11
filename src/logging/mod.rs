//! Logging core
//!
//! Routes records to a console sink and a daily rotating file sink, with
//! one-time lazy setup through `LoggerLifecycle`.

/// `tracing` target prefix for the logger's own diagnostics (sink failures,
/// rotation, retention). The tracing bridge never forwards these.
pub const INTERNAL_TARGET: &str = "desklog::internal";

mod bridge;
mod buffer;
mod console;
mod error;
mod facade;
mod file_writer;
mod lifecycle;
mod record;
mod retention;
mod router;
mod sink;

pub use bridge::TracingBridge;
pub use buffer::{LogBuffer, LogEntry};
pub use console::{ConsoleSink, ConsoleSurface, TerminalSurface};
pub use error::{InitError, SinkError};
pub use facade::{Clock, Logger, SystemClock};
pub use file_writer::{dated_log_path, RotatingFileSink, DATE_FORMAT};
pub use lifecycle::LoggerLifecycle;
pub use record::{LogRecord, ParseSeverityError, Severity};
pub use retention::{cleanup_old_logs, RetentionPolicy};
pub use router::{DispatchOutcome, LogRouter};
pub use sink::{BoxedSink, Sink};
