//! Logging infrastructure for ExploreFlix.
//!
//! Structured logging through `tracing`, with an optional daily-rotated file
//! and module-specific log levels. Console output goes to stderr so command
//! output on stdout stays machine readable.

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Resolved logging settings for one binary
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Directory for rotated log files
    pub log_dir: PathBuf,
    /// Component name, used as the filter target and log file prefix
    pub component: String,
    pub default_level: Level,
    /// Human-readable output on stderr
    pub console: bool,
    /// Daily-rotated file output
    pub file: bool,
    /// JSON lines in the log file
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("data/logs"),
            component: "exploreflix".to_string(),
            default_level: Level::INFO,
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Settings from the `[logging]` section; `verbose` forces DEBUG
    pub fn from_config(config: &Config, component: &str, verbose: bool) -> Self {
        let default_level = if verbose {
            Level::DEBUG
        } else {
            parse_level(&config.logging.default_level)
        };

        Self {
            log_dir: config.log_dir(),
            component: component.to_string(),
            default_level,
            console: config.logging.console,
            file: config.logging.file,
            json_format: config.logging.json_format,
        }
    }
}

/// Parse a level name from the config file, falling back to INFO
pub fn parse_level(name: &str) -> Level {
    name.trim().parse().unwrap_or(Level::INFO)
}

/// Default filter: our crates at the configured level, HTTP internals at warn
fn filter_directive(config: &LogConfig) -> String {
    let level = config.default_level;
    format!(
        "{}={level},shared={level},hyper=warn,reqwest=warn,h2=warn",
        config.component.replace('-', "_"),
    )
}

fn console_layer() -> BoxedLayer {
    fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .boxed()
}

/// Create the log directory if file output is on
fn prepare_log_dir(config: &LogConfig) -> Result<Option<&Path>> {
    if !config.file {
        return Ok(None);
    }

    std::fs::create_dir_all(&config.log_dir).with_context(|| {
        format!("Failed to create log directory: {}", config.log_dir.display())
    })?;
    Ok(Some(config.log_dir.as_path()))
}

fn file_layer(log_dir: &Path, config: &LogConfig) -> BoxedLayer {
    let appender = tracing_appender::rolling::daily(log_dir, &config.component);

    if config.json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_level(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(appender)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(appender)
            .boxed()
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` replaces the default filter when set. Fails if a subscriber
/// is already installed.
pub fn init(config: LogConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config)));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.console {
        layers.push(console_layer());
    }
    if let Some(log_dir) = prepare_log_dir(&config)? {
        layers.push(file_layer(log_dir, &config));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        component = %config.component,
        file = config.file,
        log_dir = %config.log_dir.display(),
        "Logging initialized"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_logging_config() {
        let config = LogConfig::default();
        assert_eq!(config.component, "exploreflix");
        assert_eq!(config.default_level, Level::INFO);
        assert!(config.console);
        assert!(!config.file);
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.logging.default_level = "warn".to_string();
        config.logging.file = true;

        let log = LogConfig::from_config(&config, "exploreflix", false);
        assert_eq!(log.default_level, Level::WARN);
        assert!(log.file);
        assert_eq!(log.log_dir, config.log_dir());

        let verbose = LogConfig::from_config(&config, "exploreflix", true);
        assert_eq!(verbose.default_level, Level::DEBUG);
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Level::DEBUG);
        assert_eq!(parse_level(" WARN "), Level::WARN);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn test_filter_directive() {
        let config = LogConfig {
            component: "explore-flix".to_string(),
            default_level: Level::DEBUG,
            ..Default::default()
        };
        let directive = filter_directive(&config);
        assert!(directive.starts_with("explore_flix=DEBUG,shared=DEBUG"));
        assert!(directive.contains("reqwest=warn"));
    }

    #[test]
    fn test_log_dir_only_created_for_file_output() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let log_dir = temp_dir.path().join("logs");

        let mut config = LogConfig {
            log_dir: log_dir.clone(),
            ..Default::default()
        };
        assert!(prepare_log_dir(&config)?.is_none());
        assert!(!log_dir.exists());

        config.file = true;
        assert_eq!(prepare_log_dir(&config)?, Some(log_dir.as_path()));
        assert!(log_dir.is_dir());

        Ok(())
    }
}
