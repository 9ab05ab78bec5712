//! Error types raised while rendering score reports.
#![forbid(unsafe_code)]

use thiserror::Error;

/// Errors raised while serialising a [`ScoreReport`](crate::ScoreReport).
#[derive(Debug, Error)]
pub enum ScoreReportError {
    /// Encoding the rows as JSON failed.
    #[error("failed to serialise score report as JSON")]
    Serialise {
        /// Source error from `serde_json`.
        #[source]
        source: serde_json::Error,
    },
    /// The delimiter would make the text output ambiguous.
    #[error("{delimiter:?} cannot delimit score report fields")]
    InvalidDelimiter {
        /// Rejected delimiter.
        delimiter: char,
    },
}
