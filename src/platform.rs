//! Platform services the logger depends on
//!
//! Path resolution, environment detection and directory creation sit behind
//! small traits so the logging core can be driven from tests or from a host
//! application with its own notion of these things.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

/// Environment variable consulted by `ProcessEnvironment`
pub const ENVIRONMENT_VAR: &str = "DESKLOG_ENV";

/// Environment assumed when nothing is configured
pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Supplies the writable per-user application data directory
pub trait PathResolver: Send + Sync {
    fn app_data_dir(&self) -> PathBuf;
}

/// Supplies the runtime environment name ("development", "production", ...)
pub trait EnvironmentSource: Send + Sync {
    fn environment(&self) -> String;
}

/// Creates directories. `AlreadyExists` is treated as success by callers.
#[async_trait]
pub trait DirectoryCreator: Send + Sync {
    async fn create_dir(&self, path: &Path) -> io::Result<()>;
}

/// OS data directory joined with the application name
#[derive(Debug, Clone)]
pub struct AppDataDir {
    app_name: String,
}

impl AppDataDir {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    /// Try to get the data directory, returning None if the platform has none
    pub fn try_dir(&self) -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join(&self.app_name))
    }
}

impl Default for AppDataDir {
    fn default() -> Self {
        Self::new("desklog")
    }
}

impl PathResolver for AppDataDir {
    /// Falls back to `./.<app name>` if the data directory cannot be determined
    fn app_data_dir(&self) -> PathBuf {
        self.try_dir().unwrap_or_else(|| {
            tracing::warn!(target: "desklog::internal::platform", "Could not determine data directory, using current directory for logs");
            PathBuf::from(format!(".{}", self.app_name))
        })
    }
}

/// Reads the environment name from a process environment variable
#[derive(Debug, Clone)]
pub struct ProcessEnvironment {
    var: String,
}

impl ProcessEnvironment {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for ProcessEnvironment {
    fn default() -> Self {
        Self::new(ENVIRONMENT_VAR)
    }
}

impl EnvironmentSource for ProcessEnvironment {
    fn environment(&self) -> String {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
    }
}

/// A fixed environment name
#[derive(Debug, Clone)]
pub struct FixedEnvironment(pub String);

impl EnvironmentSource for FixedEnvironment {
    fn environment(&self) -> String {
        self.0.clone()
    }
}

/// Creates directories on the local filesystem, including missing parents
#[derive(Debug, Clone, Copy, Default)]
pub struct FsDirectoryCreator;

#[async_trait]
impl DirectoryCreator for FsDirectoryCreator {
    async fn create_dir(&self, path: &Path) -> io::Result<()> {
        tokio::fs::create_dir_all(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_app_data_dir_ends_with_app_name() {
        let dir = AppDataDir::new("desklog-test").app_data_dir();
        let name = dir.file_name().and_then(|n| n.to_str()).unwrap();
        assert!(name == "desklog-test" || name == ".desklog-test");
    }

    #[test]
    fn test_process_environment_defaults_to_production() {
        let env = ProcessEnvironment::new("DESKLOG_TEST_UNSET_VARIABLE");
        assert_eq!(env.environment(), "production");
    }

    #[test]
    fn test_fixed_environment() {
        let env = FixedEnvironment("development".to_string());
        assert_eq!(env.environment(), "development");
    }

    #[tokio::test]
    async fn test_fs_directory_creator_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let logs = temp_dir.path().join("app").join("logs");

        FsDirectoryCreator.create_dir(&logs).await.unwrap();
        FsDirectoryCreator.create_dir(&logs).await.unwrap();
        assert!(logs.is_dir());
    }
}
