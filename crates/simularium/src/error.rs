// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion errors.
//!
//! Every failure is raised where it is detected and propagated unchanged to
//! the caller; nothing is retried and no partial result is returned.

use std::io;
use thiserror::Error;

/// Errors raised while building, filtering or serializing trajectories.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// A required field is absent from a collaborator's output.
    #[error("Missing data: '{field}'")]
    MissingData { field: String },

    /// Data is present but malformed or inconsistent.
    #[error("Problem with data: {0}")]
    Data(String),

    /// `add_plot` was called with a plot type no reader handles.
    #[error("Unsupported plot type: '{0}'")]
    UnsupportedPlotType(String),

    /// Wire payload is newer than this library understands.
    #[error("Version mismatch: expected at most {expected}, got {got}")]
    VersionMismatch { expected: u32, got: u32 },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConversionError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::MissingData {
            field: field.into(),
        }
    }

    pub(crate) fn data(issue: impl Into<String>) -> Self {
        Self::Data(issue.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ConversionError::missing("xtrace").to_string(),
            "Missing data: 'xtrace'"
        );
        assert_eq!(
            ConversionError::UnsupportedPlotType("pie".into()).to_string(),
            "Unsupported plot type: 'pie'"
        );
        let err = ConversionError::VersionMismatch {
            expected: 3,
            got: 7,
        };
        assert!(err.to_string().contains("got 7"));
    }
}
