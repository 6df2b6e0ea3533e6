use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
    Registry,
};

use crate::error::{QuerybotError, QuerybotResult};

/// Logging configuration for querybot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: PathBuf,
    /// Only honoured when built with the `advanced_logging` feature
    pub enable_file_logging: bool,
    pub enable_json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            enable_file_logging: false,
            enable_json_format: false,
        }
    }
}

/// Keeps the background file writer alive; drop it last.
#[derive(Default)]
pub struct LoggingGuard {
    #[cfg(feature = "advanced_logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initialize the logging system. `RUST_LOG` takes precedence over `config.level`.
pub fn init_logging(config: &LoggingConfig) -> QuerybotResult<LoggingGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("querybot_digest={},{}", config.level, config.level))
    });

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .boxed();

    let registry = Registry::default().with(env_filter).with(console_layer);

    #[cfg(feature = "advanced_logging")]
    let guard = if config.enable_file_logging {
        std::fs::create_dir_all(&config.log_dir).map_err(|e| {
            QuerybotError::file_io(config.log_dir.to_string_lossy().to_string(), e)
        })?;

        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "querybot.log");
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = if config.enable_json_format {
            fmt::layer().json().with_writer(file_writer).boxed()
        } else {
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .boxed()
        };

        registry.with(file_layer).try_init().map_err(|e| {
            QuerybotError::configuration(format!("Failed to install logger: {}", e))
        })?;

        LoggingGuard {
            _file_guard: Some(file_guard),
        }
    } else {
        registry.try_init().map_err(|e| {
            QuerybotError::configuration(format!("Failed to install logger: {}", e))
        })?;
        LoggingGuard::default()
    };

    #[cfg(not(feature = "advanced_logging"))]
    let guard = {
        registry.try_init().map_err(|e| {
            QuerybotError::configuration(format!("Failed to install logger: {}", e))
        })?;
        LoggingGuard::default()
    };

    debug!("Log level: {}", config.level);
    if config.enable_file_logging {
        if cfg!(feature = "advanced_logging") {
            info!("File logging enabled: {}", config.log_dir.display());
        } else {
            info!("File logging requested but this build lacks the advanced_logging feature");
        }
    }

    Ok(guard)
}

/// Logs how long a pipeline stage took when dropped
pub struct PerformanceTimer {
    start: std::time::Instant,
    operation: String,
}

impl PerformanceTimer {
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        debug!("Starting: {}", operation);
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    pub fn checkpoint(&self, checkpoint: &str) {
        let elapsed = self.start.elapsed();
        debug!("{} - {}: {}us", self.operation, checkpoint, elapsed.as_micros());
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        debug!("Completed {}: {}us", self.operation, elapsed.as_micros());
    }
}

#[macro_export]
macro_rules! log_error {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            row_level = $error.is_row_level(),
            "querybot error occurred"
        );
    };
}
