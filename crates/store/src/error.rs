//! Typed error type for the store crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Endpoint or credential missing or unusable.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned {status}: {message}")]
    Api { status: u16, message: String },

    /// A count request came back without a usable `Content-Range` header.
    #[error("invalid content-range header: {0:?}")]
    ContentRange(String),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("row not found in '{table}'")]
    NotFound { table: String },
}
