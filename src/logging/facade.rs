//! The logger handle handed to the rest of the application

use std::sync::Arc;

use chrono::{DateTime, Local};

use super::bridge::TracingBridge;
use super::record::{LogRecord, Severity};
use super::router::{DispatchOutcome, LogRouter};

/// Source of record timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

struct LoggerInner {
    router: LogRouter,
    clock: Box<dyn Clock>,
}

/// Cheap, cloneable logging handle
///
/// Every call stamps a record and dispatches it synchronously. Logging never
/// fails from the caller's point of view.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<LoggerInner>,
}

impl Logger {
    pub fn new(router: LogRouter) -> Self {
        Self::with_clock(router, SystemClock)
    }

    pub fn with_clock(router: LogRouter, clock: impl Clock + 'static) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                router,
                clock: Box::new(clock),
            }),
        }
    }

    /// Log a message at the given severity
    pub fn log(&self, severity: Severity, message: impl Into<String>) {
        self.dispatch(severity, message.into());
    }

    /// Log with a textual level; unknown levels are logged as info
    pub fn log_str(&self, level: &str, message: impl Into<String>) {
        let severity = level.parse().unwrap_or(Severity::Info);
        self.log(severity, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Severity::Debug, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Severity::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    /// Whether a record at this severity would reach any sink
    pub fn enabled(&self, severity: Severity) -> bool {
        self.inner
            .router
            .min_threshold()
            .is_some_and(|min| severity >= min)
    }

    /// Names of the sinks, in dispatch order
    pub fn sink_names(&self) -> Vec<&str> {
        self.inner.router.sink_names()
    }

    /// Layer that forwards `tracing` events into this logger
    pub fn tracing_layer(&self) -> TracingBridge {
        TracingBridge::new(self.clone())
    }

    /// Whether two handles point at the same logger
    pub fn same_instance(&self, other: &Logger) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn dispatch(&self, severity: Severity, message: String) -> DispatchOutcome {
        let record = LogRecord::at(self.inner.clock.now(), severity, message);
        self.inner.router.dispatch(&record)
    }
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("router", &self.inner.router)
            .finish_non_exhaustive()
    }
}
