use thiserror::Error;

/// Failure to produce an insight. Every variant surfaces to the caller as
/// a failed generation with no partial result; the user retries manually.
#[derive(Error, Debug)]
pub enum InsightError {
    #[error("insight generation failed: HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("insight generation failed: API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("insight generation failed: response contained no text")]
    EmptyResponse,

    #[error("insight generation failed: could not serialize trades: {0}")]
    Prompt(#[from] serde_json::Error),

    #[error("missing API key: set {0}")]
    MissingApiKey(&'static str),
}
