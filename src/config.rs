use serde::{Deserialize, Serialize};
use std::path::Path;
use anyhow::{Result, anyhow};

use crate::extraction::{ExtractionOptions, RowFailureMode};
use crate::logging::LoggingConfig;

/// The page's own default when no action is given
pub const DEFAULT_ACTION: &str = "Buy";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerybotConfig {
    pub extraction: ExtractionOptions,
    pub summary: SummaryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Action summarised when the command line does not name one
    pub default_action: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            default_action: DEFAULT_ACTION.to_string(),
        }
    }
}

impl QuerybotConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow!("Failed to read config file: {}", e))?;

        let config: QuerybotConfig = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file: {}", e))?;

        Ok(config)
    }

    pub fn load_from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override with environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(selector) = std::env::var("QUERYBOT_TABLE_SELECTOR") {
            self.extraction.table_selector = selector;
        }

        if let Ok(base_url) = std::env::var("QUERYBOT_BASE_URL") {
            self.extraction.base_url = Some(base_url).filter(|url| !url.is_empty());
        }

        if let Ok(mode) = std::env::var("QUERYBOT_FAILURE_MODE") {
            self.extraction.failure_mode = mode.parse::<RowFailureMode>()?;
        }

        if let Ok(action) = std::env::var("QUERYBOT_ACTION") {
            self.summary.default_action = action;
        }

        if let Ok(level) = std::env::var("QUERYBOT_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| anyhow!("Failed to write config file: {}", e))?;

        Ok(())
    }
}
