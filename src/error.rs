use std::time::Duration;
use thiserror::Error;

/// Error taxonomy for the reprint pipeline
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (permanent failures)
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // Network errors that a retry will not fix
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Connection resets and malformed status lines (transient - should retry)
    #[error("Transient network error for {url}: {message}")]
    TransientNetwork { url: String, message: String },

    #[error("HTTP {code} from {url}")]
    HttpStatus { code: u16, url: String },

    #[error("Reprint {pmid} is hosted by an unsupported provider: {url}")]
    UnsupportedProvider { pmid: u64, url: String },

    #[error("No finder produced a PDF for reprint {pmid}")]
    Verification { pmid: u64 },

    #[error("Timeout error: operation timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    // Client errors (permanent - don't retry)
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },
}

/// Error categorization for retry strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Permanent errors - should not retry
    Permanent,
    /// Transient errors - safe to retry
    Transient,
}

impl Error {
    /// Categorize error for retry logic
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TransientNetwork { .. } => ErrorCategory::Transient,
            _ => ErrorCategory::Permanent,
        }
    }

    /// Check if error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.category(), ErrorCategory::Transient)
    }

    /// Build an error from a failed request, separating the transient
    /// connection signatures from everything else.
    #[must_use]
    pub fn from_request(url: &str, err: reqwest::Error) -> Self {
        if is_transient_signature(&err) {
            return Self::TransientNetwork {
                url: url.to_string(),
                message: err.to_string(),
            };
        }
        Self::Http(err)
    }
}

const TRANSIENT_MESSAGES: &[&str] = &[
    "connection reset",
    "connection closed before message completed",
    "invalid http version parsed",
    "invalid http status-code parsed",
    "unexpected eof",
];

/// Walk the source chain looking for a reset connection or a response line
/// the HTTP parser could not read.
fn is_transient_signature(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io) = source.downcast_ref::<std::io::Error>() {
            if matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::UnexpectedEof
            ) {
                return true;
            }
        }
        let message = source.to_string().to_ascii_lowercase();
        if TRANSIENT_MESSAGES.iter().any(|m| message.contains(m)) {
            return true;
        }
        current = source.source();
    }
    false
}

pub type Result<T> = std::result::Result<T, Error>;
