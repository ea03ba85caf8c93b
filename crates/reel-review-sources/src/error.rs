use thiserror::Error;

/// Failure talking to the upstream movie metadata API.
///
/// Every transport or non-success response collapses into `Request`, which
/// carries the operation that failed and the upstream message.
#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("TMDB API key is not set")]
    MissingApiKey,

    #[error("Error {operation}: {message}")]
    Request {
        operation: &'static str,
        message: String,
    },

    #[error("Error {operation}: unexpected response body: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

/// Low-level failure reported by a `Transport`
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("{0}")]
    Http(String),

    #[error("Request failed with status code {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid JSON in response: {0}")]
    Body(String),
}
