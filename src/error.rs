//! Pipeline error taxonomy.
//!
//! Only dataset-level problems are errors. A record without a match or a
//! field that fails to parse is absorbed and shows up in `PipelineStats`.

use std::fmt;
use thiserror::Error;

/// Which side of the link an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dataset {
    /// Awards ledger
    Primary,
    /// Streaming catalog
    Secondary,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dataset::Primary => f.write_str("primary (awards)"),
            Dataset::Secondary => f.write_str("secondary (catalog)"),
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{dataset} dataset missing or unreadable at {location}: {reason}")]
    MissingInput {
        dataset: Dataset,
        location: String,
        reason: String,
    },

    #[error(
        "{dataset} dataset is empty (primary rows: {primary_rows}, secondary rows: {secondary_rows})"
    )]
    EmptyInput {
        dataset: Dataset,
        primary_rows: usize,
        secondary_rows: usize,
    },

    #[error("failed to write output {path}: {reason}")]
    Output { path: String, reason: String },

    #[error("Safety check failed: {0}")]
    UnsafeOutput(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl PipelineError {
    pub fn missing(dataset: Dataset, location: impl fmt::Display, reason: impl fmt::Display) -> Self {
        PipelineError::MissingInput {
            dataset,
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }
}
