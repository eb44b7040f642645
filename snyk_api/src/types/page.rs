use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::PaginatedLinks;
use crate::Error;

/// One page of a collection response: `{"data": [...], "links": {...}}`.
///
/// Unknown top-level fields (`meta`, `jsonapi`, ...) are ignored.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<PaginatedLinks>,
}

impl<T> Page<T> {
    fn empty() -> Self {
        Self {
            data: Vec::new(),
            links: None,
        }
    }
}

/// Decodes a single page of a collection.
///
/// An empty body is an empty page. A `links` object without any usable href
/// is treated as absent. Malformed JSON, or an element that does not match
/// `T`, fails the whole page.
pub fn decode_page<T: DeserializeOwned>(body: &[u8]) -> Result<Page<T>, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Page::empty());
    }
    let mut page: Page<T> = serde_json::from_slice(body)?;
    if page.links.as_ref().is_some_and(PaginatedLinks::is_empty) {
        page.links = None;
    }
    Ok(page)
}
