//! Trading-post listing extraction for querybot result pages.
//!
//! The pipeline runs one way: [`table_extractor`] reads the result table out
//! of a parsed page, [`listing`] turns each raw row into a typed [`Listing`],
//! and [`summary`] folds listings into per-item price spreads.

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod extraction;
pub mod layout;
pub mod listing;
pub mod logging;
pub mod summary;
pub mod table_extractor;

pub use error::{QuerybotError, QuerybotResult};
pub use extraction::{ExtractionOptions, ExtractionResult, ListingExtractor, RejectedRow, RowFailureMode};
pub use layout::{ColumnLayout, ListingField};
pub use listing::{Listing, ListingParser, PriceParser};
pub use summary::{summarize, PriceSummary};
pub use table_extractor::{RawCell, RawRow, RawTable, TableExtractor};
