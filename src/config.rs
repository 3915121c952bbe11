//! Logging configuration
//!
//! The environment is read once, when the configuration is resolved. Both the
//! console threshold and the log file name derive from that single value.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::logging::{RetentionPolicy, Severity};
use crate::platform::{EnvironmentSource, PathResolver};

/// Environment name that enables debug output on the console
pub const DEVELOPMENT: &str = "development";

/// Name of the logs folder inside the application data directory
pub const LOG_FOLDER: &str = "logs";

/// Resolved logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Runtime environment tag, e.g. "development" or "production"
    pub environment: String,

    /// Directory the dated log files are written to
    pub logs_dir: PathBuf,

    /// Minimum severity shown on the console
    pub console_threshold: Severity,

    /// Minimum severity written to disk (info by default in every environment)
    #[serde(default = "default_file_threshold")]
    pub file_threshold: Severity,

    /// Cleanup of old dated files; disabled unless configured
    #[serde(default)]
    pub retention: RetentionPolicy,
}

/// Optional overrides read from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConfigOverrides {
    pub logs_dir: Option<PathBuf>,
    pub console_threshold: Option<Severity>,
    pub file_threshold: Option<Severity>,
    pub retention: Option<RetentionPolicy>,
}

fn default_file_threshold() -> Severity {
    Severity::Info
}

/// Console threshold for an environment: debug in development, error elsewhere
pub fn console_threshold_for(environment: &str) -> Severity {
    if environment == DEVELOPMENT {
        Severity::Debug
    } else {
        Severity::Error
    }
}

impl LoggingConfig {
    /// Build the default configuration for an environment
    pub fn for_environment(app_data_dir: &Path, environment: impl Into<String>) -> Self {
        let environment = environment.into();
        Self {
            console_threshold: console_threshold_for(&environment),
            file_threshold: default_file_threshold(),
            logs_dir: app_data_dir.join(LOG_FOLDER),
            retention: RetentionPolicy::default(),
            environment,
        }
    }

    /// Resolve the configuration from platform collaborators
    ///
    /// The environment source is consulted exactly once.
    pub fn resolve(paths: &dyn PathResolver, env: &dyn EnvironmentSource) -> Self {
        Self::for_environment(&paths.app_data_dir(), env.environment())
    }

    pub fn is_development(&self) -> bool {
        self.environment == DEVELOPMENT
    }

    /// Base log file name, before the date is prepended
    pub fn log_file_name(&self) -> String {
        format!("desktop.{}.log", self.environment)
    }

    /// Directory plus base file name
    pub fn base_path(&self) -> PathBuf {
        self.logs_dir.join(self.log_file_name())
    }

    /// Apply overrides on top of this configuration
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(dir) = overrides.logs_dir {
            self.logs_dir = dir;
        }
        if let Some(threshold) = overrides.console_threshold {
            self.console_threshold = threshold;
        }
        if let Some(threshold) = overrides.file_threshold {
            self.file_threshold = threshold;
        }
        if let Some(retention) = overrides.retention {
            self.retention = retention;
        }
        self
    }

    /// Apply overrides from a TOML file if it exists
    pub fn load_overrides(self, path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(self);
        }
        let content = std::fs::read_to_string(path).context("Failed to read logging config file")?;
        let overrides: ConfigOverrides =
            toml::from_str(&content).context("Failed to parse logging config file")?;
        Ok(self.with_overrides(overrides))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::FixedEnvironment;
    use tempfile::TempDir;

    struct FixedPath(PathBuf);

    impl PathResolver for FixedPath {
        fn app_data_dir(&self) -> PathBuf {
            self.0.clone()
        }
    }

    #[test]
    fn test_development_config() {
        let config = LoggingConfig::for_environment(Path::new("/data/app"), "development");
        assert!(config.is_development());
        assert_eq!(config.console_threshold, Severity::Debug);
        assert_eq!(config.file_threshold, Severity::Info);
        assert_eq!(
            config.base_path(),
            PathBuf::from("/data/app/logs/desktop.development.log")
        );
    }

    #[test]
    fn test_production_config() {
        let config = LoggingConfig::for_environment(Path::new("/data/app"), "production");
        assert!(!config.is_development());
        assert_eq!(config.console_threshold, Severity::Error);
        assert_eq!(config.file_threshold, Severity::Info);
        assert_eq!(config.log_file_name(), "desktop.production.log");
    }

    #[test]
    fn test_any_other_environment_is_quiet_on_console() {
        assert_eq!(console_threshold_for("staging"), Severity::Error);
        assert_eq!(console_threshold_for("Development"), Severity::Error);
    }

    #[test]
    fn test_resolve_uses_collaborators() {
        let config = LoggingConfig::resolve(
            &FixedPath(PathBuf::from("/home/me/.local/share/app")),
            &FixedEnvironment("test".to_string()),
        );
        assert_eq!(config.logs_dir, PathBuf::from("/home/me/.local/share/app/logs"));
        assert_eq!(config.log_file_name(), "desktop.test.log");
    }

    #[test]
    fn test_config_serialization() {
        let config = LoggingConfig::for_environment(Path::new("/data/app"), "production");
        let toml_str = toml::to_string(&config).unwrap();
        let parsed: LoggingConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn test_load_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logging.toml");
        std::fs::write(
            &path,
            r#"
console_threshold = "info"
file_threshold = "debug"

[retention]
max_files = 14
"#,
        )
        .unwrap();

        let config = LoggingConfig::for_environment(Path::new("/data/app"), "production")
            .load_overrides(&path)
            .unwrap();

        assert_eq!(config.console_threshold, Severity::Info);
        assert_eq!(config.file_threshold, Severity::Debug);
        assert_eq!(config.retention.max_files, Some(14));
        assert_eq!(config.retention.max_age_days, None);
        assert_eq!(config.logs_dir, PathBuf::from("/data/app/logs"));
    }

    #[test]
    fn test_load_overrides_missing_file() {
        let config = LoggingConfig::for_environment(Path::new("/data/app"), "production");
        let loaded = config
            .clone()
            .load_overrides(Path::new("/nonexistent/logging.toml"))
            .unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_overrides_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logging.toml");
        std::fs::write(&path, "console_threshold = \"loud\"").unwrap();

        let config = LoggingConfig::for_environment(Path::new("/data/app"), "production");
        assert!(config.load_overrides(&path).is_err());
    }
}
