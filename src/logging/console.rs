//! Console sink
//!
//! The sink decides what reaches the console; a `ConsoleSurface` decides how it
//! is drawn.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::QueueableCommand;

use super::error::SinkError;
use super::record::{LogRecord, Severity};
use super::sink::Sink;

/// Something that can show formatted log lines to a user
pub trait ConsoleSurface: Send + Sync {
    fn render(&self, severity: Severity, line: &str) -> io::Result<()>;
}

/// Renders to stderr, coloured by severity when stderr is a terminal
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }

    fn color_for(severity: Severity) -> Option<Color> {
        match severity {
            Severity::Debug => Some(Color::DarkGrey),
            Severity::Info => None,
            Severity::Warn => Some(Color::Yellow),
            Severity::Error => Some(Color::Red),
        }
    }
}

impl ConsoleSurface for TerminalSurface {
    fn render(&self, severity: Severity, line: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();

        match Self::color_for(severity) {
            Some(color) if stderr.is_terminal() => {
                stderr
                    .queue(SetForegroundColor(color))?
                    .queue(Print(line))?
                    .queue(ResetColor)?
                    .queue(Print("\n"))?;
            }
            _ => writeln!(stderr, "{}", line)?,
        }

        stderr.flush()
    }
}

/// Sink that forwards records to a console surface
pub struct ConsoleSink {
    threshold: Severity,
    surface: Arc<dyn ConsoleSurface>,
}

impl ConsoleSink {
    pub fn new(threshold: Severity, surface: Arc<dyn ConsoleSurface>) -> Self {
        Self { threshold, surface }
    }

    /// Console sink drawing to stderr
    pub fn stderr(threshold: Severity) -> Self {
        Self::new(threshold, Arc::new(TerminalSurface::new()))
    }
}

impl std::fmt::Debug for ConsoleSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSink")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn threshold(&self) -> Severity {
        self.threshold
    }

    fn write(&self, record: &LogRecord, line: &str) -> Result<(), SinkError> {
        self.surface
            .render(record.severity, line)
            .map_err(|source| SinkError::write(self.name(), source))
    }
}
