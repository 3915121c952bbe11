//! Sink trait shared by every log destination

use super::error::SinkError;
use super::record::{LogRecord, Severity};

/// A destination for formatted log records
///
/// Implementations:
/// - `ConsoleSink`: renders to a console surface
/// - `RotatingFileSink`: appends to a file that rotates daily
pub trait Sink: Send + Sync {
    /// Short name used when reporting failures
    fn name(&self) -> &str;

    /// Minimum severity this sink accepts, fixed at construction
    fn threshold(&self) -> Severity;

    /// Write one record. `line` is the record already formatted by the router.
    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError>;

    /// Whether a record of this severity should reach the sink
    fn admits(&self, severity: Severity) -> bool {
        severity >= self.threshold()
    }
}

/// Type alias for a boxed sink
pub type BoxedSink = Box<dyn Sink>;
