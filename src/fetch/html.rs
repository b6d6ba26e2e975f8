// src/fetch/html.rs
// =============================================================================
// This module extracts outbound links from HTML pages.
//
// We use the `scraper` crate to parse the HTML and select every <a href>,
// and the `url` crate to resolve relative links against the page URL.
//
// What we keep:
// - http:// and https:// links only
// - each URL once per page (first occurrence wins, order preserved)
//
// What we drop:
// - in-page anchors (#section), mailto:, tel:, javascript: links
// - the #fragment part of every link, since it points into the same page
// =============================================================================

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// Extracts all absolute http(s) links from an HTML document.
///
/// `base_url` is the URL the page was fetched from; relative hrefs are
/// resolved against it. If `base_url` does not parse, only links that are
/// already absolute are returned.
///
/// Example:
///   html = "<a href='/docs'>Docs</a>"
///   base_url = "https://example.com"
///   result = ["https://example.com/docs"]
pub fn extract_html_links(html: &str, base_url: &str) -> Vec<String> {
    let base = match Url::parse(base_url) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::debug!("Invalid base URL '{}': {}", base_url, e);
            None
        }
    };

    let document = Html::parse_document(html);
    // Constant selector, parsing cannot fail
    let selector = Selector::parse("a[href]").expect("'a[href]' is a valid selector");

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };

        if let Some(url) = resolve_link(base.as_ref(), href) {
            if seen.insert(url.clone()) {
                links.push(url);
            }
        }
    }

    tracing::debug!("Extracted {} links from {}", links.len(), base_url);
    links
}

/// Keeps only the links whose host is exactly `domain`.
pub fn retain_same_domain(links: Vec<String>, domain: &str) -> Vec<String> {
    links
        .into_iter()
        .filter(|link| {
            Url::parse(link)
                .map(|url| url.host_str() == Some(domain))
                .unwrap_or(false)
        })
        .collect()
}

// Resolves a possibly-relative href to an absolute http(s) URL without
// its fragment. Returns None for links that should not be followed.
fn resolve_link(base: Option<&Url>, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
    {
        return None;
    }

    let mut url = match (Url::parse(href), base) {
        (Ok(url), _) => url,
        (Err(_), Some(base)) => base.join(href).ok()?,
        (Err(_), None) => return None,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }

    url.set_fragment(None);
    Some(url.to_string())
}
