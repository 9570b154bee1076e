//! Unified logging system
//!
//! Structured logging through `tracing`, configurable output format and sink.

use crate::error::{ErrorContext, GatekeepError, GatekeepResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing_subscriber::{
    fmt::{self, writer::BoxMakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Whether to log to file
    pub log_to_file: bool,
    /// Log file path (if log_to_file is true)
    pub log_file_path: Option<String>,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

/// Levels accepted in `LoggingConfig::level`
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_to_file: false,
            log_file_path: None,
            filter_directives: vec![
                "gatekeep=info".to_string(),
                "gatekeep_core=info".to_string(),
                "gatekeep_guard=info".to_string(),
            ],
        }
    }
}

impl LoggingConfig {
    /// Same configuration with the level raised to debug
    pub fn verbose(mut self) -> Self {
        self.level = "debug".to_string();
        self.filter_directives = self
            .filter_directives
            .iter()
            .map(|d| match d.split_once('=') {
                Some((target, _)) => format!("{}=debug", target),
                None => d.clone(),
            })
            .collect();
        self
    }

    fn make_writer(&self) -> GatekeepResult<BoxMakeWriter> {
        if !self.log_to_file {
            return Ok(BoxMakeWriter::new(std::io::stderr));
        }

        let log_path = self.log_file_path.as_ref().ok_or_else(|| GatekeepError::Config {
            message: "log_file_path must be specified when log_to_file is true".to_string(),
            source: None,
            context: ErrorContext::new("logging").with_operation("make_writer"),
        })?;

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        Ok(BoxMakeWriter::new(Arc::new(file)))
    }
}

/// Build the level filter.
///
/// A non-empty, parseable `env_directives` (the value of `RUST_LOG`) is used
/// as-is; `config.level` and `config.filter_directives` apply only otherwise.
pub fn build_filter(
    config: &LoggingConfig,
    env_directives: Option<&str>,
) -> GatekeepResult<EnvFilter> {
    if let Some(env) = env_directives.filter(|e| !e.trim().is_empty()) {
        if let Ok(filter) = EnvFilter::try_new(env) {
            return Ok(filter);
        }
    }

    let mut filter = EnvFilter::new(&config.level);
    for directive in &config.filter_directives {
        let directive = directive.parse().map_err(|e| GatekeepError::Config {
            message: format!("Invalid log filter directive '{}'", directive),
            source: Some(Box::new(e)),
            context: ErrorContext::new("logging").with_operation("parse_directive"),
        })?;
        filter = filter.add_directive(directive);
    }
    Ok(filter)
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` takes precedence over the configured level and directives.
/// Fails if a subscriber has already been installed in this process.
pub fn init_logging(config: &LoggingConfig) -> GatekeepResult<()> {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(config, env.as_deref())?;

    let writer = config.make_writer()?;
    let registry = tracing_subscriber::registry().with(filter);
    let base = fmt::layer()
        .with_writer(writer)
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_thread_ids(config.include_thread)
        .with_thread_names(config.include_thread);

    let installed = match config.format {
        LogFormat::Json => registry.with(base.json()).try_init(),
        LogFormat::Pretty => registry.with(base.pretty()).try_init(),
        LogFormat::Compact => registry.with(base.compact()).try_init(),
    };

    installed.map_err(|e| GatekeepError::Internal {
        message: "Failed to install tracing subscriber".to_string(),
        source: Some(Box::new(e)),
        context: ErrorContext::new("logging").with_operation("init"),
    })
}

/// Logging macros for common patterns
#[macro_export]
macro_rules! log_operation_start {
    ($operation:expr) => {
        $crate::tracing::info!(
            operation = $operation,
            "Starting operation"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        $crate::tracing::info!(
            operation = $operation,
            $($field)*,
            "Starting operation"
        );
    };
}

#[macro_export]
macro_rules! log_operation_success {
    ($operation:expr) => {
        $crate::tracing::info!(
            operation = $operation,
            "Operation completed successfully"
        );
    };
    ($operation:expr, $($field:tt)*) => {
        $crate::tracing::info!(
            operation = $operation,
            $($field)*,
            "Operation completed successfully"
        );
    };
}

#[macro_export]
macro_rules! log_operation_error {
    ($operation:expr, $error:expr) => {
        $crate::tracing::error!(
            operation = $operation,
            error = %$error,
            "Operation failed"
        );
    };
    ($operation:expr, $error:expr, $($field:tt)*) => {
        $crate::tracing::error!(
            operation = $operation,
            error = %$error,
            $($field)*,
            "Operation failed"
        );
    };
}
