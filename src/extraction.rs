use scraper::Html;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{QuerybotError, QuerybotResult};
use crate::listing::{Listing, ListingParser};
use crate::logging::PerformanceTimer;
use crate::table_extractor::{TableExtractor, DEFAULT_TABLE_SELECTOR};

/// What to do when a single row cannot be parsed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowFailureMode {
    /// The first bad row aborts the whole pass
    #[default]
    FailFast,
    /// Bad rows are dropped and reported in `ExtractionResult::rejected`
    SkipMalformed,
}

impl std::str::FromStr for RowFailureMode {
    type Err = QuerybotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_fast" | "strict" => Ok(RowFailureMode::FailFast),
            "skip_malformed" | "skip" | "lenient" => Ok(RowFailureMode::SkipMalformed),
            other => Err(QuerybotError::configuration(format!(
                "Unknown row failure mode {:?}, expected fail_fast or skip_malformed",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionOptions {
    pub table_selector: String,
    pub base_url: Option<String>,
    pub failure_mode: RowFailureMode,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            table_selector: DEFAULT_TABLE_SELECTOR.to_string(),
            base_url: None,
            failure_mode: RowFailureMode::FailFast,
        }
    }
}

/// A row dropped under `RowFailureMode::SkipMalformed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRow {
    pub row: usize,
    pub reason: String,
}

/// Listings of one page plus the layout they were read with
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub entries: Vec<Listing>,
    pub has_slots_and_emu: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub rejected: Vec<RejectedRow>,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
            has_slots_and_emu: false,
            rejected: Vec::new(),
        }
    }
}

/// Table extraction and row parsing wired together
pub struct ListingExtractor {
    tables: TableExtractor,
    parser: ListingParser,
    failure_mode: RowFailureMode,
}

impl ListingExtractor {
    pub fn new(options: &ExtractionOptions) -> QuerybotResult<Self> {
        let tables = TableExtractor::with_selector(&options.table_selector)?;
        let parser = match &options.base_url {
            Some(base_url) => ListingParser::new()?.with_base_url(base_url)?,
            None => ListingParser::new()?,
        };

        Ok(Self {
            tables,
            parser,
            failure_mode: options.failure_mode,
        })
    }

    pub fn extract_str(&self, html: &str) -> QuerybotResult<ExtractionResult> {
        let document = Html::parse_document(html);
        self.extract(&document)
    }

    pub fn extract(&self, document: &Html) -> QuerybotResult<ExtractionResult> {
        let _timer = PerformanceTimer::start("listing extraction");

        let table = self.tables.extract(document);
        let layout = table.layout;
        let mut entries = Vec::with_capacity(table.rows.len());
        let mut rejected = Vec::new();

        for row in &table.rows {
            match self.parser.parse(row, layout) {
                Ok(listing) => entries.push(listing),
                Err(e) if e.is_row_level() && self.failure_mode == RowFailureMode::SkipMalformed => {
                    warn!(row = row.index, error = %e, "Skipping malformed row");
                    rejected.push(RejectedRow {
                        row: row.index,
                        reason: e.to_string(),
                    });
                }
                Err(e) => {
                    debug!(row = row.index, error = %e, "Aborting extraction");
                    return Err(e);
                }
            }
        }

        info!(
            listings = entries.len(),
            rejected = rejected.len(),
            ?layout,
            "Extracted listings"
        );

        Ok(ExtractionResult {
            entries,
            has_slots_and_emu: layout.has_slots_and_emu(),
            rejected,
        })
    }
}
