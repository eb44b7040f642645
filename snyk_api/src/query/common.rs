//! Shared query infrastructure: the [`Query`] trait and [`BaseOptions`].

use url::Url;

/// Trait implemented by all request options. Provides URL serialization and
/// shared builder methods for the API version.
pub trait Query {
    /// Appends this query's parameters to the given URL, returning the modified URL.
    fn add_to_url(&self, url: &Url) -> Url;

    /// Returns a mutable reference to the options shared by every request.
    fn get_base(&mut self) -> &mut BaseOptions;

    /// Sets the requested API version (e.g. `2024-10-15`).
    fn with_version(mut self, version: &str) -> Self
    where
        Self: Sized,
    {
        self.get_base().version = version.to_string();
        self
    }
}

/// Options accepted by every REST endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BaseOptions {
    /// The requested API version. The REST API rejects requests without it.
    pub version: String,
}

impl BaseOptions {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
        }
    }
}

impl Query for BaseOptions {
    fn get_base(&mut self) -> &mut BaseOptions {
        self
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if !self.version.is_empty() {
            url.query_pairs_mut().append_pair("version", &self.version);
        }
        url
    }
}
