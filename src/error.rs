//! Error types for wechatmp2markdown.
//!
//! Only a document that cannot be parsed at all, an unreadable local file,
//! or a failed top-level fetch surface as errors. Image failures and missing
//! containers are absorbed during conversion.

/// Error type for conversion operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not markup at all.
    #[error("HTML parsing failed: {0}")]
    ParseError(String),

    /// Reading a local document failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Building or sending a request, or reading its body, failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-2xx status.
    #[error("GET {url} returned {status}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// Status code returned by the server.
        status: u16,
    },

    /// The configured proxy address could not be used.
    #[error("invalid proxy {0}")]
    InvalidProxy(String),
}

impl Error {
    /// Whether the error came from the network layer (and may succeed on retry
    /// with a different route).
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Request(_) | Self::HttpStatus { .. } | Self::InvalidProxy(_)
        )
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;
