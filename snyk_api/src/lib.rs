//! Client for the Snyk REST and V1 APIs.
//!
//! The [`Client`] builds authenticated requests, normalizes API failures into
//! [`Error`], and walks cursor-paginated collections with [`Paginator`].

mod client;
mod error_response;
mod errors;
mod paginator;
mod query;
pub mod region;
mod response;
pub mod types;
mod user_agent;
pub use self::client::{Api, Client, ClientBuilder};
pub use self::error_response::{ApiError, ErrorResponse};
pub use self::errors::Error;
pub use self::paginator::{extract_starting_after, Paginator};
pub use self::query::{BaseOptions, ListOptions, Query};
pub use self::region::Region;
pub use self::response::{Response, HEADER_SNYK_REQUEST_ID};

pub use reqwest::Method;
pub use tokio_util::sync::CancellationToken;
