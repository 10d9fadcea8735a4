use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as ReqwestClient;
use scraper::{Html, Selector};
use url::Url;

use crate::error::ExtractError;
use crate::models::MetadataResult;

pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
/// Crawler identity that social platforms let through to their Open Graph markup.
pub const CRAWLER_USER_AGENT: &str =
    "facebookexternalhit/1.1 (+http://www.facebook.com/externalhit_uatext.php)";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
/// Sites that show a login wall to browsers but full metadata to crawlers.
pub const STRICT_SCRAPING_DOMAINS: &[&str] = &["instagram.com", "facebook.com", "whatsapp.com"];

// ── Public helpers ─────────────────────────────────────────────────────────

fn has_http_scheme(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Prepend `https://` unless the URL already names an http(s) scheme.
/// Nothing else is validated; a malformed URL fails later, at fetch time.
pub fn normalize_url(raw: &str) -> String {
    if has_http_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{raw}")
    }
}

/// Case-insensitive substring match of the whole URL against
/// [`STRICT_SCRAPING_DOMAINS`], so `notinstagram.com` matches too.
pub fn is_strict_scraping_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    STRICT_SCRAPING_DOMAINS
        .iter()
        .any(|domain| lowered.contains(domain))
}

pub fn user_agent_for(url: &str) -> &'static str {
    if is_strict_scraping_url(url) {
        CRAWLER_USER_AGENT
    } else {
        DEFAULT_USER_AGENT
    }
}

pub fn request_headers(url: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::USER_AGENT,
        HeaderValue::from_static(user_agent_for(url)),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    headers
}

/// Resolve an `og:image` value against the page it came from.
/// Handles `/path`, `//host/path` and bare relative paths.
pub fn resolve_image_url(page_url: &str, src: &str) -> Result<String, ExtractError> {
    if has_http_scheme(src) {
        return Ok(src.to_string());
    }
    let base = Url::parse(page_url)?;
    Ok(base.join(src)?.to_string())
}

/// Parse `html` and pick title, image and description by tag priority.
///
/// - title: `og:title`, then `<title>`, then `page_url`
/// - image: `og:image` made absolute, else empty
/// - description: `og:description`, then `<meta name="description">`, else empty
///
/// A tag with blank content counts as missing. Malformed markup never fails
/// here; html5ever repairs it the way a browser would.
pub fn parse_metadata(html: &str, page_url: &str) -> Result<MetadataResult, ExtractError> {
    let document = Html::parse_document(html);

    let title = match get_meta_property(&document, "og:title")? {
        Some(title) => title,
        None => get_title_tag(&document)?.unwrap_or_else(|| page_url.to_string()),
    };

    let image = match get_meta_property(&document, "og:image")? {
        Some(src) => resolve_image_url(page_url, &src)?,
        None => String::new(),
    };

    let description = match get_meta_property(&document, "og:description")? {
        Some(description) => description,
        None => get_meta_name(&document, "description")?.unwrap_or_default(),
    };

    Ok(MetadataResult {
        title,
        image,
        description,
    })
}

fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

fn first_content(doc: &Html, css: &str) -> Result<Option<String>, ExtractError> {
    let selector = selector(css)?;
    Ok(doc
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn get_meta_property(doc: &Html, property: &str) -> Result<Option<String>, ExtractError> {
    first_content(doc, &format!(r#"meta[property="{property}"]"#))
}

fn get_meta_name(doc: &Html, name: &str) -> Result<Option<String>, ExtractError> {
    first_content(doc, &format!(r#"meta[name="{name}"]"#))
}

fn get_title_tag(doc: &Html) -> Result<Option<String>, ExtractError> {
    let selector = selector("title")?;
    Ok(doc
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty()))
}

// ── Extractor ──────────────────────────────────────────────────────────────

/// Fetches pages and turns them into [`MetadataResult`]s.
///
/// Holds nothing but the HTTP client; every call is independent.
#[derive(Clone, Debug)]
pub struct MetadataExtractor {
    client: ReqwestClient,
}

impl MetadataExtractor {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(FETCH_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = ReqwestClient::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Build a preview for `raw_url`. Never fails: fetch and parse errors are
    /// logged and answered with [`MetadataResult::degraded`].
    pub async fn extract(&self, raw_url: &str) -> MetadataResult {
        let url = normalize_url(raw_url);

        let html = match self.fetch_html(&url).await {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "Error fetching URL for metadata");
                return MetadataResult::degraded(&url);
            }
        };

        match parse_metadata(&html, &url) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %e, url = %url, "Error parsing metadata");
                MetadataResult::degraded(&url)
            }
        }
    }

    async fn fetch_html(&self, url: &str) -> Result<String, ExtractError> {
        let response = self
            .client
            .get(url)
            .headers(request_headers(url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractError::Status(status));
        }

        Ok(response.text().await?)
    }
}

// ── Unit tests ─────────────────────────────────────────────────────────────
