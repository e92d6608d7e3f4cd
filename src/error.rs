use reqwest::StatusCode;
use thiserror::Error;

/// Message shown to the user whenever a query fails, whatever the cause.
pub const GENERIC_FAILURE: &str = "There was an error processing your request.";

/// Everything that can go wrong between submitting a query and holding a reply.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("server responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("malformed reply: {0}")]
    Decode(String),

    #[error("reply stream interrupted: {0}")]
    Stream(#[from] reqwest::Error),
}

impl QueryError {
    /// Build a status error from a non-success response body.
    ///
    /// The service answers failures with `{"error": "..."}`; anything else is
    /// kept verbatim.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());

        QueryError::Status { status, message }
    }
}
