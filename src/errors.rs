use std::io;

use thiserror::Error;

use crate::types::{FilterName, GenderLabel};

/// Error type for dataset loading, filter validation, and scale computation.
#[derive(Debug, Error)]
pub enum SurveyError {
    #[error("cannot compute a range over zero groups ({context})")]
    EmptyGroupSet { context: String },
    #[error("invalid {filter} range: min {min} is greater than max {max}")]
    InvalidRange {
        filter: FilterName,
        min: f64,
        max: f64,
    },
    #[error("gender '{0}' does not occur in the dataset")]
    UnknownGender(GenderLabel),
    #[error("dataset contains no respondents")]
    EmptyDataset,
    #[error("dataset has no answered values for '{field}'")]
    DegenerateDomain { field: String },
    #[error("dataset '{path}' is unavailable: {reason}")]
    DatasetUnavailable { path: String, reason: String },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SurveyError {
    pub(crate) fn empty_group_set(context: impl Into<String>) -> Self {
        Self::EmptyGroupSet {
            context: context.into(),
        }
    }
}
