//! Response envelope returned alongside every decoded payload.

use reqwest::{header::HeaderMap, Method, StatusCode};
use url::Url;

use crate::types::PaginatedLinks;

/// Header carrying the server-side request identifier.
pub const HEADER_SNYK_REQUEST_ID: &str = "snyk-request-id";

/// Metadata about a completed API call.
///
/// Built from the transport response before its body is read, so it stays
/// available for error messages and for support requests.
#[derive(Clone, Debug)]
pub struct Response {
    /// Method of the originating request.
    pub method: Method,
    /// Final URL of the request.
    pub url: Url,
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Value of the `snyk-request-id` header. Quote it when contacting Snyk support.
    pub snyk_request_id: Option<String>,
    /// Pagination links parsed from the body of list responses.
    pub links: Option<PaginatedLinks>,
}

impl Response {
    pub(crate) fn new(method: Method, resp: &reqwest::Response) -> Self {
        let headers = resp.headers().clone();
        let snyk_request_id = headers
            .get(HEADER_SNYK_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        Self {
            method,
            url: resp.url().clone(),
            status: resp.status(),
            headers,
            snyk_request_id,
            links: None,
        }
    }
}
