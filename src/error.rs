use thiserror::Error;

/// Errors raised by the memory store and the Data Cloud clients.
///
/// Transport and platform failures are passed through as-is; the store never
/// retries or reinterprets them.
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Data Cloud answered with a non-2xx status; `message` is the raw body.
    #[error("Data Cloud error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    /// `insert` got a different number of payloads and ids.
    #[error("Input length mismatch: {payloads} payloads but {ids} ids")]
    InputLengthMismatch { payloads: usize, ids: usize },

    /// The payload at `index` has no usable memory text.
    #[error("Invalid payload at index {index}: {reason}")]
    InvalidPayload { index: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
