use url::Url;

use super::common::{BaseOptions, Query};

/// Options for cursor-paginated list endpoints.
///
/// `starting_after` and `ending_before` are opaque cursors handed out by the
/// server; they are mutually exclusive by convention but not checked here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub base: BaseOptions,
    /// Return the page of results immediately after this cursor.
    pub starting_after: Option<String>,
    /// Return the page of results immediately before this cursor.
    pub ending_before: Option<String>,
    /// Number of results to return per page.
    pub limit: Option<u32>,
}

impl ListOptions {
    pub fn new(version: &str) -> Self {
        Self {
            base: BaseOptions::new(version),
            ..Default::default()
        }
    }

    pub fn version(&self) -> &str {
        &self.base.version
    }

    pub fn with_starting_after(mut self, cursor: &str) -> Self {
        self.starting_after = Some(cursor.to_string());
        self
    }

    pub fn with_ending_before(mut self, cursor: &str) -> Self {
        self.ending_before = Some(cursor.to_string());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

impl Query for ListOptions {
    fn get_base(&mut self) -> &mut BaseOptions {
        &mut self.base
    }

    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = self.base.add_to_url(url);
        if let Some(cursor) = self.starting_after.as_deref().filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("starting_after", cursor);
        }
        if let Some(cursor) = self.ending_before.as_deref().filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("ending_before", cursor);
        }
        if let Some(limit) = self.limit {
            url.query_pairs_mut()
                .append_pair("limit", &limit.to_string());
        }
        url
    }
}
