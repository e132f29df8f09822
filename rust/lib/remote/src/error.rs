use thiserror::Error;

/// Failure talking to the hosted backend.
///
/// The storage facade treats every variant the same way (fall back to local
/// storage); the distinction only matters for diagnostics.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    #[error("{table} row '{id}' not found")]
    NotFound { table: String, id: String },
}
