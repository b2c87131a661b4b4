//! Error types for cidian operations.

use thiserror::Error;

/// Errors that abort a conversion run.
///
/// Data gaps that the run tolerates (unresolved cross-references, images
/// without a source) are not errors; they are counted in
/// [`RunReport`](crate::pipeline::RunReport) instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse entry:\n{block}")]
    MalformedEntry { block: String },

    #[error("Unknown markup node kind: {kind}")]
    UnknownNodeKind { kind: &'static str },

    #[error("Invalid image data for {hash}: {source}")]
    InvalidImageData {
        hash: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
