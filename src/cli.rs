use std::io::Read;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::info;

use crate::config::QuerybotConfig;
use crate::error::QuerybotError;
use crate::export::{render_listings, render_summary, OutputFormat};
use crate::extraction::{ExtractionResult, ListingExtractor, RowFailureMode};
use crate::logging::PerformanceTimer;
use crate::summary::summarize;

/// Command-line overrides applied on top of file and environment config
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub table_selector: Option<String>,
    pub base_url: Option<String>,
    pub skip_malformed: bool,
    pub log_level: Option<String>,
}

/// Defaults, then the config file, then `QUERYBOT_*` variables, then flags
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<QuerybotConfig> {
    let mut config = match &overrides.config_path {
        Some(path) => {
            let mut config = QuerybotConfig::load_from_file(path)?;
            config.apply_env()?;
            config
        }
        None => QuerybotConfig::load_from_env()?,
    };

    if let Some(selector) = &overrides.table_selector {
        config.extraction.table_selector = selector.clone();
    }
    if let Some(base_url) = &overrides.base_url {
        config.extraction.base_url = Some(base_url.clone());
    }
    if overrides.skip_malformed {
        config.extraction.failure_mode = RowFailureMode::SkipMalformed;
    }
    if let Some(level) = &overrides.log_level {
        config.logging.level = level.clone();
    }

    Ok(config)
}

/// The single line shown to the user when a command fails
pub fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<QuerybotError>() {
        Some(querybot_error) => {
            crate::log_error!(querybot_error, "command failed");
            querybot_error.user_message()
        }
        None => format!("Error: {:#}", error),
    }
}

/// Print every listing on the page
pub fn listings_command(
    input: &Path,
    format: OutputFormat,
    output: Option<PathBuf>,
    config: &QuerybotConfig,
) -> Result<()> {
    let result = extract_from_input(input, config)?;
    let rendered = render_listings(&result, format)?;
    write_output(&rendered, output.as_deref())?;

    if !result.rejected.is_empty() {
        eprintln!("Skipped {} malformed row(s)", result.rejected.len());
    }

    Ok(())
}

/// Print min/max/avg price per item for one action
pub fn summary_command(
    input: &Path,
    action: Option<String>,
    format: OutputFormat,
    output: Option<PathBuf>,
    config: &QuerybotConfig,
) -> Result<()> {
    let action = action.unwrap_or_else(|| config.summary.default_action.clone());
    let result = extract_from_input(input, config)?;

    let timer = PerformanceTimer::start("price summary");
    let summary = summarize(&result.entries, &action);
    timer.checkpoint("summarized");
    info!(action = %action, items = summary.len(), "Summarized item prices");

    let rendered = render_summary(&summary, &action, format)?;
    write_output(&rendered, output.as_deref())?;

    Ok(())
}

/// Write the default configuration to `path`
pub fn config_init_command(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(QuerybotError::configuration(format!(
            "{} already exists, pass --force to overwrite",
            path.display()
        ))
        .into());
    }

    QuerybotConfig::default().save_to_file(path)?;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

fn extract_from_input(input: &Path, config: &QuerybotConfig) -> Result<ExtractionResult> {
    let html = read_input(input)?;
    info!("Read {} bytes from {}", html.len(), input.display());

    let extractor = ListingExtractor::new(&config.extraction)?;
    Ok(extractor.extract_str(&html)?)
}

/// `-` reads standard input
fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .context("Failed to read page from stdin")?;
        return Ok(html);
    }

    std::fs::read_to_string(input)
        .map_err(|e| QuerybotError::file_io(input.to_string_lossy().to_string(), e).into())
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .map_err(|e| QuerybotError::file_io(path.to_string_lossy().to_string(), e))?;
            info!("Output saved to: {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_flags_override_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("querybot.toml");
        std::fs::write(&config_path, "[extraction]\ntable_selector = \"table.results\"\n").unwrap();

        let overrides = ConfigOverrides {
            config_path: Some(config_path),
            base_url: Some("http://example.org/".to_string()),
            skip_malformed: true,
            ..ConfigOverrides::default()
        };
        let config = resolve_config(&overrides).unwrap();

        assert_eq!(config.extraction.table_selector, "table.results");
        assert_eq!(config.extraction.base_url.as_deref(), Some("http://example.org/"));
        assert_eq!(config.extraction.failure_mode, RowFailureMode::SkipMalformed);
    }

    #[test]
    fn test_resolve_config_without_file_starts_from_defaults() {
        let overrides = ConfigOverrides {
            table_selector: Some("#results".to_string()),
            ..ConfigOverrides::default()
        };
        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config.extraction.table_selector, "#results");
        assert_eq!(config.extraction.base_url, None);
        assert_eq!(config.logging.log_dir, std::path::PathBuf::from("logs"));
    }

    #[test]
    fn test_failure_message_prefers_user_message() {
        let missing = anyhow::Error::from(QuerybotError::missing_cell(
            0,
            crate::layout::ListingField::Hoster,
        ));
        assert_eq!(
            failure_message(&missing),
            "Result row 1 has no hoster column. The page layout may have changed."
        );

        let other = anyhow::anyhow!("stdin closed");
        assert_eq!(failure_message(&other), "Error: stdin closed");
    }

    #[test]
    fn test_config_init_refuses_to_overwrite() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("querybot.toml");

        config_init_command(&path, false).unwrap();
        assert!(config_init_command(&path, false).is_err());
        config_init_command(&path, true).unwrap();

        let config = QuerybotConfig::load_from_file(&path).unwrap();
        assert_eq!(config, QuerybotConfig::default());
    }

    #[test]
    fn test_summary_command_writes_file() {
        let temp_dir = tempdir().unwrap();
        let page = temp_dir.path().join("page.html");
        let out = temp_dir.path().join("summary.csv");
        std::fs::write(
            &page,
            "<table><tr><th>a</th></tr>\
             <tr><td>H</td><td>B</td><td>O</td><td>L</td><td>Buy</td><td>1</td><td>2.00gc</td><td>bow</td></tr>\
             <tr><td>H</td><td>B</td><td>O</td><td>L</td><td>Buy</td><td>1</td><td>4.00gc</td><td>bow</td></tr>\
             </table>",
        )
        .unwrap();

        let config = QuerybotConfig::default();
        summary_command(&page, Some("Buy".to_string()), OutputFormat::Csv, Some(out.clone()), &config)
            .unwrap();

        let csv = std::fs::read_to_string(&out).unwrap();
        assert_eq!(csv, "item,min_price,max_price,avg_price\nbow,2,4,3\n");
    }
}
