//! Directory client error types.

/// A failed directory fetch.
///
/// None of these are retried; the user triggers a fresh attempt.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Transport failure (connect, timeout, TLS, ...)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Response body was not the expected JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },
}
