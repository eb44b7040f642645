//! Error types for the API client.

use crate::error_response::ErrorResponse;

/// Errors that can occur when making API requests.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The API returned a non-success status with a recognised error body.
    #[error(transparent)]
    Api(#[from] ErrorResponse),
    /// The API returned a non-success status whose body matched no known error format.
    #[error("failed to decode Snyk API error response; status: {status}, body: {body}")]
    UndecodableError { status: u16, body: String },
    /// The HTTP request failed (connection error, timeout, body read failure).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// A success response body could not be decoded into the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    /// A request body could not be serialized to JSON.
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    /// A base URL or endpoint could not be parsed.
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Endpoints are resolved relative to a base URL and must not start with `/`.
    #[error("endpoint URL {0:?} is invalid, cannot begin with a leading slash")]
    InvalidEndpoint(String),
    /// The `next` pagination link could not be parsed.
    #[error("failed to extract starting_after query param from {link:?}: {source}")]
    InvalidCursorLink {
        link: String,
        #[source]
        source: url::ParseError,
    },
    /// The caller's cancellation token fired before or during a request.
    #[error("request cancelled")]
    Cancelled,
    /// List options were used without the required API version.
    #[error("API version is required for endpoint {0:?}")]
    MissingVersion(String),
    /// The server returned a `next` link whose cursor was already requested.
    #[error("pagination of {endpoint:?} stalled: next link repeats already requested cursor {cursor:?}")]
    PaginationStalled { endpoint: String, cursor: String },
    /// The paginator reached its configured page limit.
    #[error("pagination of {endpoint:?} exceeded {max_pages} pages")]
    TooManyPages { endpoint: String, max_pages: usize },
    /// No region is registered under the given alias.
    #[error("region with alias ({0}) not found")]
    UnknownRegion(String),
    /// `SNYK_TOKEN` is not set.
    #[error("SNYK_TOKEN environment variable is not set")]
    MissingToken,
}

impl Error {
    /// Returns the normalized API error, if this is one.
    pub fn as_error_response(&self) -> Option<&ErrorResponse> {
        match self {
            Error::Api(resp) => Some(resp),
            _ => None,
        }
    }

    /// HTTP status of the failed call, for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(resp) => Some(resp.response.status.as_u16()),
            Error::UndecodableError { status, .. } => Some(*status),
            Error::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
