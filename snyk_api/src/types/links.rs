use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Links on a collection document.
///
/// Each link may be sent either as a plain string or as a JSON:API link
/// object (`{"href": "..."}`); empty links are dropped during decoding.
///
/// See: <https://jsonapi.org/format/#fetching-pagination>
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedLinks {
    #[serde(
        rename = "self",
        default,
        deserialize_with = "link_href",
        skip_serializing_if = "Option::is_none"
    )]
    pub self_link: Option<String>,
    #[serde(default, deserialize_with = "link_href", skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    #[serde(default, deserialize_with = "link_href", skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, deserialize_with = "link_href", skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    #[serde(default, deserialize_with = "link_href", skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    #[serde(default, deserialize_with = "link_href", skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl PaginatedLinks {
    /// The `next` link, if the server announced another page.
    pub fn next_link(&self) -> Option<&str> {
        self.next.as_deref().filter(|s| !s.is_empty())
    }

    /// True when no link carries a usable href.
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, v)| v.is_none())
    }

    fn fields(&self) -> [(&'static str, Option<&str>); 6] {
        [
            ("Self", self.self_link.as_deref()),
            ("Related", self.related.as_deref()),
            ("First", self.first.as_deref()),
            ("Last", self.last.as_deref()),
            ("Prev", self.prev.as_deref()),
            ("Next", self.next.as_deref()),
        ]
    }
}

impl fmt::Display for PaginatedLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PaginatedLinks{")?;
        let mut sep = false;
        for (name, value) in self.fields() {
            let Some(value) = value else { continue };
            if sep {
                f.write_str(", ")?;
            }
            sep = true;
            write!(f, "{}:{:?}", name, value)?;
        }
        f.write_str("}")
    }
}

fn link_href<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Link {
        Href(String),
        Object { href: Option<String> },
    }

    let href = match Option::<Link>::deserialize(deserializer)? {
        Some(Link::Href(href)) => Some(href),
        Some(Link::Object { href }) => href,
        None => None,
    };
    Ok(href.filter(|s| !s.is_empty()))
}
