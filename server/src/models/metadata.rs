use serde::{Deserialize, Serialize};

/// Link-preview metadata returned by `GET /api/metadata`.
///
/// Every field is a plain string so the front-end can render it without null
/// checks. `title` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataResult {
    pub title: String,
    pub image: String,
    pub description: String,
}

impl MetadataResult {
    /// URL-only preview used when the page could not be fetched or parsed.
    pub fn degraded(url: &str) -> Self {
        MetadataResult {
            title: url.to_string(),
            image: String::new(),
            description: String::new(),
        }
    }
}

/// Query string of `GET /api/metadata`.
///
/// Parsed leniently: when `url` is repeated the first value wins, and unknown
/// keys are ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MetadataQuery {
    pub url: Option<String>,
}

impl MetadataQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let url = raw.and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        });
        MetadataQuery { url }
    }
}
