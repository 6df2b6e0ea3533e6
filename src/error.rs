use thiserror::Error;

use crate::layout::ListingField;

/// Main error type for querybot page extraction
#[derive(Error, Debug)]
pub enum QuerybotError {
    #[error("Row {row}: missing {field} cell")]
    MissingCell { row: usize, field: ListingField },

    #[error("Row {row}: malformed price {text:?}")]
    MalformedPrice { row: usize, text: String },

    #[error("Invalid CSS selector {selector:?}: {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Invalid URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("File I/O error: {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(#[from] anyhow::Error),
}

impl QuerybotError {
    pub fn missing_cell(row: usize, field: ListingField) -> Self {
        Self::MissingCell { row, field }
    }

    pub fn malformed_price(row: usize, text: impl Into<String>) -> Self {
        Self::MalformedPrice {
            row,
            text: text.into(),
        }
    }

    pub fn invalid_selector(selector: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSelector {
            selector: selector.into(),
            message: message.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            source,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIO {
            path: path.into(),
            source,
        }
    }

    /// True for errors that concern a single table row and can be skipped
    /// when extraction runs in `SkipMalformed` mode.
    pub fn is_row_level(&self) -> bool {
        matches!(
            self,
            QuerybotError::MissingCell { .. } | QuerybotError::MalformedPrice { .. }
        )
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            QuerybotError::MissingCell { row, field } => {
                format!(
                    "Result row {} has no {} column. The page layout may have changed.",
                    row + 1,
                    field
                )
            }
            QuerybotError::MalformedPrice { row, text } => {
                format!(
                    "Result row {} has a price that is not in NN.NNgc form: {:?}",
                    row + 1,
                    text
                )
            }
            QuerybotError::InvalidSelector { selector, .. } => {
                format!("The table selector {:?} is not valid CSS.", selector)
            }
            QuerybotError::InvalidUrl { url, .. } => {
                format!("{:?} is not a usable base URL.", url)
            }
            QuerybotError::Configuration { message } => message.clone(),
            QuerybotError::FileIO { path, .. } => {
                format!("Could not access {}. Check the path and permissions.", path)
            }
            _ => "Something went wrong. Run with --log-level debug for details.".to_string(),
        }
    }
}

/// Result type alias for convenience
pub type QuerybotResult<T> = Result<T, QuerybotError>;
