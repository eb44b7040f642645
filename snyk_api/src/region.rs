//! Snyk regional instances.
//!
//! Snyk operates several isolated instances (US, EU, AU), each with its own
//! set of base URLs.
//!
//! See: <https://docs.snyk.io/snyk-data-and-governance/regional-hosting-and-data-residency#api-urls>

use crate::Error;

/// Alias of the region used when none is configured.
pub const DEFAULT_REGION: &str = "SNYK-US-01";

/// Base URLs of one Snyk regional instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub alias: &'static str,
    /// Base URL for App requests (token exchange).
    pub app_base_url: &'static str,
    /// Base URL for REST API requests.
    pub rest_base_url: &'static str,
    /// Base URL for V1 API requests.
    pub v1_base_url: &'static str,
}

const REGIONS: &[Region] = &[
    Region {
        alias: DEFAULT_REGION,
        app_base_url: "https://app.snyk.io/",
        rest_base_url: "https://api.snyk.io/rest/",
        v1_base_url: "https://api.snyk.io/v1/",
    },
    Region {
        alias: "SNYK-US-02",
        app_base_url: "https://app.us.snyk.io/",
        rest_base_url: "https://api.us.snyk.io/rest/",
        v1_base_url: "https://api.us.snyk.io/v1/",
    },
    Region {
        alias: "SNYK-EU-01",
        app_base_url: "https://app.eu.snyk.io/",
        rest_base_url: "https://api.eu.snyk.io/rest/",
        v1_base_url: "https://api.eu.snyk.io/v1/",
    },
    Region {
        alias: "SNYK-AU-01",
        app_base_url: "https://app.au.snyk.io/",
        rest_base_url: "https://api.au.snyk.io/rest/",
        v1_base_url: "https://api.au.snyk.io/v1/",
    },
];

/// All supported regions.
pub fn regions() -> &'static [Region] {
    REGIONS
}

impl Region {
    /// Looks up a region by its alias (e.g. `SNYK-EU-01`).
    pub fn find(alias: &str) -> Result<Region, Error> {
        REGIONS
            .iter()
            .find(|r| r.alias == alias)
            .copied()
            .ok_or_else(|| Error::UnknownRegion(alias.to_string()))
    }
}

impl Default for Region {
    fn default() -> Self {
        REGIONS[0]
    }
}
