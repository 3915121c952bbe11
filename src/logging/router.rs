//! Fan-out of records to registered sinks

use super::error::SinkError;
use super::record::{LogRecord, Severity};
use super::sink::{BoxedSink, Sink};

/// Result of dispatching one record
#[derive(Debug, Default)]
pub struct DispatchOutcome {
    /// Number of sinks that accepted the record
    pub delivered: usize,
    /// Sinks that admitted the record but failed to write it
    pub failures: Vec<SinkError>,
}

impl DispatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Ordered set of sinks. Registration order is dispatch order.
#[derive(Default)]
pub struct LogRouter {
    sinks: Vec<BoxedSink>,
}

impl LogRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sink after the existing ones
    pub fn add_sink(&mut self, sink: impl Sink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    /// Builder form of `add_sink`
    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.add_sink(sink);
        self
    }

    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    /// Lowest threshold among all sinks, or `None` with no sinks
    pub fn min_threshold(&self) -> Option<Severity> {
        self.sinks.iter().map(|s| s.threshold()).min()
    }

    /// Deliver a record to every sink whose threshold admits it
    ///
    /// A failing sink never stops delivery to the sinks after it. Failures are
    /// reported on the `desklog::internal` tracing target and returned, not re-logged
    /// through the router.
    pub fn dispatch(&self, record: &LogRecord) -> DispatchOutcome {
        let mut outcome = DispatchOutcome::default();
        let mut line: Option<String> = None;

        for sink in self.sinks.iter().filter(|s| s.admits(record.severity)) {
            let line = line.get_or_insert_with(|| record.format_line());
            match sink.write(record, line) {
                Ok(()) => outcome.delivered += 1,
                Err(e) => {
                    tracing::warn!(target: "desklog::internal::router", sink = sink.name(), error = %e, "log sink write failed");
                    outcome.failures.push(e);
                }
            }
        }

        outcome
    }
}

impl std::fmt::Debug for LogRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogRouter")
            .field("sinks", &self.sink_names())
            .finish()
    }
}
