//! Lazy, single-flight logger initialization
//!
//! The first `get_logger()` call creates the log directory and builds the
//! sinks. Callers arriving while that is in flight wait for the same attempt
//! and share its result. A failed attempt leaves the lifecycle uninitialized so
//! a later call can retry.

use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::config::LoggingConfig;
use crate::platform::{AppDataDir, DirectoryCreator, FsDirectoryCreator, ProcessEnvironment};

use super::console::{ConsoleSink, ConsoleSurface, TerminalSurface};
use super::error::InitError;
use super::facade::Logger;
use super::file_writer::RotatingFileSink;
use super::retention::cleanup_old_logs;
use super::router::LogRouter;

type InitResult = Result<Logger, InitError>;

enum State {
    Uninitialized,
    /// An attempt is running; the receiver yields its result once done
    Initializing(watch::Receiver<Option<InitResult>>),
    Ready(Logger),
}

/// What a caller has to do after inspecting the state
enum Next {
    Done(Logger),
    Wait(watch::Receiver<Option<InitResult>>),
    Initialize(watch::Sender<Option<InitResult>>),
}

/// Owns the process-wide logger and its one-time setup
pub struct LoggerLifecycle {
    config: LoggingConfig,
    directories: Arc<dyn DirectoryCreator>,
    console: Arc<dyn ConsoleSurface>,
    state: Mutex<State>,
}

impl LoggerLifecycle {
    pub fn new(
        config: LoggingConfig,
        directories: Arc<dyn DirectoryCreator>,
        console: Arc<dyn ConsoleSurface>,
    ) -> Self {
        Self {
            config,
            directories,
            console,
            state: Mutex::new(State::Uninitialized),
        }
    }

    /// Lifecycle wired to the default platform services and stderr
    pub fn from_process() -> Self {
        let config =
            LoggingConfig::resolve(&AppDataDir::default(), &ProcessEnvironment::default());
        Self::with_config(config)
    }

    /// Default collaborators with an explicit configuration
    pub fn with_config(config: LoggingConfig) -> Self {
        Self::new(
            config,
            Arc::new(FsDirectoryCreator),
            Arc::new(TerminalSurface::new()),
        )
    }

    pub fn config(&self) -> &LoggingConfig {
        &self.config
    }

    /// Whether the logger has been built
    pub fn is_ready(&self) -> bool {
        matches!(*self.lock_state(), State::Ready(_))
    }

    /// Return the shared logger, initializing it on first use
    ///
    /// Only fails if the log directory cannot be created. Every caller waiting
    /// on a failed attempt receives the same error.
    pub async fn get_logger(&self) -> Result<Logger, InitError> {
        loop {
            match self.next_step() {
                Next::Done(logger) => return Ok(logger),
                Next::Wait(mut receiver) => {
                    // A closed channel means the initializing caller was dropped
                    // mid-flight and the state was reset; go round again.
                    if let Ok(result) = receiver.wait_for(Option::is_some).await {
                        if let Some(result) = &*result {
                            return result.clone();
                        }
                    }
                }
                Next::Initialize(sender) => return self.run_initialization(sender).await,
            }
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_step(&self) -> Next {
        let mut state = self.lock_state();
        match &*state {
            State::Ready(logger) => Next::Done(logger.clone()),
            State::Initializing(receiver) => Next::Wait(receiver.clone()),
            State::Uninitialized => {
                let (sender, receiver) = watch::channel(None);
                *state = State::Initializing(receiver);
                Next::Initialize(sender)
            }
        }
    }

    async fn run_initialization(&self, sender: watch::Sender<Option<InitResult>>) -> InitResult {
        let mut reset = ResetOnDrop {
            state: &self.state,
            armed: true,
        };

        let result = self.initialize().await;

        {
            let mut state = self.lock_state();
            *state = match &result {
                Ok(logger) => State::Ready(logger.clone()),
                Err(_) => State::Uninitialized,
            };
        }
        reset.armed = false;

        // Waiters may all be gone; that is fine
        let _ = sender.send(Some(result.clone()));
        result
    }

    async fn initialize(&self) -> InitResult {
        let logs_dir = &self.config.logs_dir;

        match self.directories.create_dir(logs_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => {
                return Err(InitError::DirectoryCreation {
                    path: logs_dir.clone(),
                    source: Arc::new(e),
                })
            }
        }

        if self.config.retention.is_enabled() {
            let today = chrono::Local::now().date_naive();
            match cleanup_old_logs(
                logs_dir,
                &self.config.log_file_name(),
                &self.config.retention,
                today,
            ) {
                Ok(count) if count > 0 => {
                    tracing::info!(target: "desklog::internal::retention", count, "Cleaned up old log files");
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(target: "desklog::internal::retention", error = %e, "Log cleanup failed");
                }
            }
        }

        let console = ConsoleSink::new(self.config.console_threshold, Arc::clone(&self.console));
        let file = RotatingFileSink::new(self.config.base_path(), self.config.file_threshold)?;
        let router = LogRouter::new().with_sink(console).with_sink(file);

        tracing::debug!(
            target: "desklog::internal::lifecycle",
            environment = %self.config.environment,
            dir = %logs_dir.display(),
            "logger initialized"
        );
        Ok(Logger::new(router))
    }
}

impl std::fmt::Debug for LoggerLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggerLifecycle")
            .field("config", &self.config)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

/// Puts the state back to uninitialized if the initializing future is dropped
struct ResetOnDrop<'a> {
    state: &'a Mutex<State>,
    armed: bool,
}

impl Drop for ResetOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            *state = State::Uninitialized;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::buffer::LogBuffer;
    use crate::logging::record::Severity;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::task::JoinSet;

    /// Creates directories after a short delay, counting attempts.
    /// The first `failures` attempts fail with permission denied.
    struct SlowCreator {
        calls: AtomicUsize,
        failures: usize,
    }

    impl SlowCreator {
        fn new(failures: usize) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                failures,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DirectoryCreator for SlowCreator {
        async fn create_dir(&self, path: &Path) -> io::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            if call < self.failures {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            std::fs::create_dir_all(path)
        }
    }

    struct ExistsCreator;

    #[async_trait]
    impl DirectoryCreator for ExistsCreator {
        async fn create_dir(&self, _path: &Path) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::AlreadyExists))
        }
    }

    fn lifecycle(
        temp_dir: &TempDir,
        environment: &str,
        creator: Arc<dyn DirectoryCreator>,
    ) -> (Arc<LoggerLifecycle>, Arc<LogBuffer>) {
        let console = Arc::new(LogBuffer::new(100));
        let config = LoggingConfig::for_environment(temp_dir.path(), environment);
        let lifecycle = Arc::new(LoggerLifecycle::new(config, creator, console.clone()));
        (lifecycle, console)
    }

    #[tokio::test]
    async fn test_concurrent_callers_share_one_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let creator = SlowCreator::new(0);
        let (lifecycle, _console) = lifecycle(&temp_dir, "production", creator.clone());

        let mut tasks = JoinSet::new();
        for _ in 0..8 {
            let lifecycle = Arc::clone(&lifecycle);
            tasks.spawn(async move { lifecycle.get_logger().await });
        }

        let mut loggers = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            loggers.push(joined.unwrap().unwrap());
        }

        assert_eq!(creator.calls(), 1);
        assert_eq!(loggers.len(), 8);
        assert!(loggers.iter().all(|l| l.same_instance(&loggers[0])));
        assert!(lifecycle.is_ready());

        // Later calls reuse the cached logger
        let again = lifecycle.get_logger().await.unwrap();
        assert!(again.same_instance(&loggers[0]));
        assert_eq!(creator.calls(), 1);
    }

    #[tokio::test]
    async fn test_waiters_share_the_same_failure() {
        let temp_dir = TempDir::new().unwrap();
        let creator = SlowCreator::new(1);
        let (lifecycle, _console) = lifecycle(&temp_dir, "production", creator.clone());

        let mut tasks = JoinSet::new();
        for _ in 0..4 {
            let lifecycle = Arc::clone(&lifecycle);
            tasks.spawn(async move { lifecycle.get_logger().await });
        }

        while let Some(joined) = tasks.join_next().await {
            let err = joined.unwrap().unwrap_err();
            assert!(matches!(err, InitError::DirectoryCreation { .. }));
        }
        assert_eq!(creator.calls(), 1);
        assert!(!lifecycle.is_ready());
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let creator = SlowCreator::new(1);
        let (lifecycle, console) = lifecycle(&temp_dir, "development", creator.clone());

        let err = lifecycle.get_logger().await.unwrap_err();
        assert!(err.to_string().starts_with("cannot create log directory"));

        let logger = lifecycle.get_logger().await.unwrap();
        assert_eq!(creator.calls(), 2);

        logger.debug("after retry");
        assert_eq!(console.len(), 1);
    }

    #[tokio::test]
    async fn test_already_exists_is_success() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("logs")).unwrap();
        let (lifecycle, _console) = lifecycle(&temp_dir, "production", Arc::new(ExistsCreator));

        assert!(lifecycle.get_logger().await.is_ok());
    }

    #[tokio::test]
    async fn test_logger_writes_console_and_dated_file() {
        let temp_dir = TempDir::new().unwrap();
        let (lifecycle, console) =
            lifecycle(&temp_dir, "production", Arc::new(FsDirectoryCreator));

        let logger = lifecycle.get_logger().await.unwrap();
        logger.debug("hidden");
        logger.info("to disk");
        logger.error("to both");

        assert_eq!(console.len(), 1);
        assert_eq!(console.all_entries()[0].severity, Severity::Error);

        let today = chrono::Local::now().date_naive();
        let file = temp_dir
            .path()
            .join("logs")
            .join(format!("{}.desktop.production.log", today.format("%Y-%m-%d")));
        let content = std::fs::read_to_string(file).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[info] to disk"));
        assert!(lines[1].ends_with("[error] to both"));
    }

    #[tokio::test]
    async fn test_console_registered_before_file() {
        let temp_dir = TempDir::new().unwrap();
        let (lifecycle, console) =
            lifecycle(&temp_dir, "development", Arc::new(FsDirectoryCreator));

        let logger = lifecycle.get_logger().await.unwrap();
        assert_eq!(logger.sink_names(), vec!["console", "file"]);

        logger.info("ordered");
        assert_eq!(console.len(), 1);
        let today = chrono::Local::now().date_naive();
        let file = temp_dir
            .path()
            .join("logs")
            .join(format!("{}.desktop.development.log", today.format("%Y-%m-%d")));
        assert!(std::fs::read_to_string(file).unwrap().contains("[info] ordered"));
    }

    #[tokio::test]
    async fn test_dropped_initialization_resets_state() {
        let temp_dir = TempDir::new().unwrap();
        let creator = SlowCreator::new(0);
        let (lifecycle, _console) = lifecycle(&temp_dir, "production", creator.clone());

        let attempt = tokio::time::timeout(Duration::from_millis(1), lifecycle.get_logger()).await;
        assert!(attempt.is_err());
        assert!(!lifecycle.is_ready());

        assert!(lifecycle.get_logger().await.is_ok());
        assert_eq!(creator.calls(), 2);
    }
}
