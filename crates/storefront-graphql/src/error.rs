//! Error types for GraphQL calls

use thiserror::Error;

/// Error returned by a GraphQL request
#[derive(Error, Debug)]
pub enum GraphqlError {
    /// Connection, timeout or body read failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body is not the expected JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Endpoint is not a valid URL
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Non-success HTTP status without a GraphQL error body
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Top-level `errors` in the GraphQL response
    #[error("GraphQL error: {}", .0.join("; "))]
    Response(Vec<String>),

    /// Response carried neither `data` nor `errors`
    #[error("GraphQL response has no data")]
    NoData,

    /// Invalid client configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl GraphqlError {
    /// Returns true for connect errors and timeouts
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }

    /// Messages fit to show an end user
    ///
    /// Only top-level GraphQL errors qualify. The other variants carry
    /// endpoint URLs or raw upstream bodies and belong in logs only.
    pub fn user_messages(&self) -> Option<&[String]> {
        match self {
            Self::Response(messages) if !messages.is_empty() => Some(messages.as_slice()),
            _ => None,
        }
    }
}

/// Result type for GraphQL calls
pub type Result<T> = std::result::Result<T, GraphqlError>;
