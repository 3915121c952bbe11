use anyhow::{Context, Result};
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use desklog::config::LoggingConfig;
use desklog::logging::{LoggerLifecycle, INTERNAL_TARGET};
use desklog::platform::{AppDataDir, PathResolver, ProcessEnvironment};
use desklog::Severity;

/// Split command line arguments into a level and the message words
///
/// The first argument is a level only when a message follows it, so
/// `desklog error` logs the word "error" at info.
fn split_level(mut args: Vec<String>) -> (Severity, Vec<String>) {
    if args.len() > 1 {
        if let Ok(level) = args[0].parse::<Severity>() {
            args.remove(0);
            return (level, args);
        }
    }
    (Severity::Info, args)
}

/// Usage: `desklog [LEVEL] MESSAGE...`
///
/// Writes MESSAGE through the console and file sinks. LEVEL defaults to info.
#[tokio::main]
async fn main() -> Result<()> {
    let paths = AppDataDir::default();
    let overrides = paths.app_data_dir().join("logging.toml");
    let config = LoggingConfig::resolve(&paths, &ProcessEnvironment::default())
        .load_overrides(&overrides)?;

    let lifecycle = LoggerLifecycle::with_config(config);
    let logger = lifecycle
        .get_logger()
        .await
        .context("Failed to initialize logging")?;

    // Application events go through the logger; the logger's own diagnostics
    // (sink failures, rotation) go to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());
    let diagnostics = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(Targets::new().with_target(INTERNAL_TARGET, tracing::Level::WARN));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(logger.tracing_layer())
        .with(diagnostics)
        .init();

    let (level, words) = split_level(std::env::args().skip(1).collect());

    if words.is_empty() {
        tracing::info!(
            "Logging to {} ({})",
            lifecycle.config().logs_dir.display(),
            lifecycle.config().environment
        );
    } else {
        logger.log(level, words.join(" "));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_split_level_with_message() {
        let (level, words) = split_level(args(&["error", "disk", "full"]));
        assert_eq!(level, Severity::Error);
        assert_eq!(words, vec!["disk", "full"]);
    }

    #[test]
    fn test_split_level_single_word_is_message() {
        let (level, words) = split_level(args(&["error"]));
        assert_eq!(level, Severity::Info);
        assert_eq!(words, vec!["error"]);
    }

    #[test]
    fn test_split_level_without_level() {
        let (level, words) = split_level(args(&["hello", "world"]));
        assert_eq!(level, Severity::Info);
        assert_eq!(words, vec!["hello", "world"]);
    }

    #[test]
    fn test_split_level_no_args() {
        let (level, words) = split_level(Vec::new());
        assert_eq!(level, Severity::Info);
        assert!(words.is_empty());
    }
}
