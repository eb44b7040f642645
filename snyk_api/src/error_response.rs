//! Normalization of non-2xx responses into [`ErrorResponse`].
//!
//! The Snyk REST API answers failures with JSON:API error documents, while the
//! V1 API still uses a single `{code, message}` object. Both are folded into
//! the same [`ErrorResponse`] so callers only deal with one shape.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{response::Response, Error};

/// A single error reported by the API.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Human readable explanation specific to this occurrence.
    pub detail: String,
    /// Unique identifier for this particular occurrence of the problem.
    pub id: Option<String>,
    /// HTTP status code applicable to this problem, as a string.
    pub status: String,
    /// Short summary of the problem.
    pub title: Option<String>,
}

impl ApiError {
    /// The text used for this error in [`ErrorResponse`]'s message: the title
    /// when present, otherwise the first line of the detail.
    pub fn summary(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => self.detail.split('\n').next().unwrap_or_default(),
        }
    }
}

/// An error caused by an API request that returned a non-success status.
#[derive(Debug)]
pub struct ErrorResponse {
    /// The response that carried the error.
    pub response: Response,
    /// Errors reported in the body, in wire order. May be empty.
    pub errors: Vec<ApiError>,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.response.method,
            self.response.url,
            self.response.status.as_u16()
        )?;
        if let Some(request_id) = &self.response.snyk_request_id {
            write!(f, " (snyk-request-id: {})", request_id)?;
        }
        if !self.errors.is_empty() {
            let messages: Vec<&str> = self.errors.iter().map(ApiError::summary).collect();
            write!(f, " {}", messages.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorResponse {}

/// A body format the normalizer knows how to read. Returns `None` when the
/// body is not in this format.
type ErrorFormat = fn(&Value, &Response) -> Option<Vec<ApiError>>;

/// Tried in order; the first format that applies wins.
const ERROR_FORMATS: &[ErrorFormat] = &[parse_rest_errors, parse_legacy_v1_error];

/// Checks a response for an error status. Hands the response back for 2xx,
/// otherwise returns the normalized error built from `body`.
pub(crate) fn check_response(response: Response, body: &[u8]) -> Result<Response, Error> {
    if response.status.is_success() {
        return Ok(response);
    }
    Err(normalize(response, body))
}

fn normalize(response: Response, body: &[u8]) -> Error {
    if body.iter().all(u8::is_ascii_whitespace) {
        return ErrorResponse {
            response,
            errors: Vec::new(),
        }
        .into();
    }

    if let Ok(value) = serde_json::from_slice::<Value>(body) {
        for format in ERROR_FORMATS {
            if let Some(errors) = format(&value, &response) {
                return ErrorResponse { response, errors }.into();
            }
        }
    }

    Error::UndecodableError {
        status: response.status.as_u16(),
        body: String::from_utf8_lossy(body).into_owned(),
    }
}

/// Loosely typed JSON:API error object. Some endpoints send `details`
/// instead of `detail`; both are kept and coalesced afterwards.
#[derive(Default, Deserialize)]
#[serde(default)]
struct RawApiError {
    detail: Option<String>,
    details: Option<String>,
    id: Option<String>,
    status: Option<Value>,
    title: Option<String>,
}

impl From<RawApiError> for ApiError {
    fn from(raw: RawApiError) -> Self {
        let detail = match raw.detail {
            Some(detail) if !detail.is_empty() => detail,
            _ => raw.details.unwrap_or_default(),
        };
        let status = match raw.status {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        ApiError {
            detail,
            id: raw.id.filter(|id| !id.is_empty()),
            status,
            title: raw.title.filter(|title| !title.is_empty()),
        }
    }
}

fn parse_rest_errors(value: &Value, _response: &Response) -> Option<Vec<ApiError>> {
    let errors = value.as_object()?.get("errors")?.as_array()?;
    errors
        .iter()
        .map(|element| {
            let object: &Map<String, Value> = element.as_object()?;
            serde_json::from_value::<RawApiError>(Value::Object(object.clone()))
                .ok()
                .map(ApiError::from)
        })
        .collect()
}

fn parse_legacy_v1_error(value: &Value, response: &Response) -> Option<Vec<ApiError>> {
    let object = value.as_object()?;
    let message = object.get("message")?.as_str()?;
    let code = match object.get("code") {
        None | Some(Value::Null) => i64::from(response.status.as_u16()),
        Some(code) => code.as_i64()?,
    };
    Some(vec![ApiError {
        detail: message.to_string(),
        id: None,
        status: code.to_string(),
        title: None,
    }])
}
