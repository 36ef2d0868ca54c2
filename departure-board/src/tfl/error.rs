//! Fetch error types.

/// Longest slice of an error response body kept for display.
const MAX_BODY_CHARS: usize = 200;

/// Errors from a single arrivals fetch.
///
/// Every failure mode collapses into this one type at the fetch boundary.
/// Its `Display` output is what the board shows in place of the rows.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Connection failure, timeout, or an unreadable body.
    #[error("network error: {message}")]
    Network {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not a JSON array of predictions.
    #[error("malformed response: {message}")]
    Malformed { message: String },

    /// No data exists for the requested stop (mock source only).
    #[error("no arrivals data: {0}")]
    Unavailable(String),

    /// The fetch task ended without producing a result.
    #[error("fetch task failed: {0}")]
    Aborted(String),
}

impl FetchError {
    /// Build a status error, trimming the response body to something that
    /// fits on one board row.
    pub fn status(status: u16, body: &str) -> Self {
        let message = body.trim();
        let message = if message.is_empty() {
            "no response body".to_string()
        } else {
            message.chars().take(MAX_BODY_CHARS).collect()
        };
        FetchError::Status { status, message }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries app_key when credentials are configured.
        let source = err.without_url();
        FetchError::Network {
            message: describe_network(&source),
            source,
        }
    }
}

/// One-line cause for a transport failure.
///
/// reqwest's own `Display` is only "error sending request"; the useful part
/// lives in the source chain.
fn describe_network(err: &reqwest::Error) -> String {
    let mut message = if err.is_timeout() {
        "request timed out".to_string()
    } else if err.is_connect() {
        "connection failed".to_string()
    } else {
        err.to_string()
    };

    let mut cause = std::error::Error::source(err);
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !text.is_empty() && !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}
