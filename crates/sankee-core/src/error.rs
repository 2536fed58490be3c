//! Error taxonomy for the land-cover change pipeline.
//!
//! Every failure is raised where it is detected and carries the offending
//! value; no stage returns partial output.

use thiserror::Error;

use crate::ClassCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SankeeError {
    /// Table shape problems: fewer than two columns, ragged columns, no rows,
    /// malformed cells or missing values reaching the reshaper.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Caller options that cannot be honoured (`max_classes == 0`, label list
    /// length mismatch, unknown image id, ...).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A class code or class label has no entry in the active scheme.
    #[error("unknown class {value:?} in scheme {scheme}")]
    UnknownClass { value: String, scheme: String },

    /// Sampling was requested without a scheme and without an explicit band.
    #[error("neither a classification scheme nor a band name was supplied")]
    MissingBandOrDataset,
}

impl SankeeError {
    pub fn unknown_code(code: ClassCode, scheme: &str) -> Self {
        Self::UnknownClass {
            value: code.to_string(),
            scheme: scheme.to_string(),
        }
    }

    pub fn unknown_label(label: &str, scheme: &str) -> Self {
        Self::UnknownClass {
            value: label.to_string(),
            scheme: scheme.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SankeeError>;
