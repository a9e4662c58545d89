use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

/// Links on a listing page that point at composition detail pages, absolute,
/// fragment-free and deduplicated in document order.
pub fn discover_detail_links(html: &str, listing_url: &str, path_fragment: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let base = Url::parse(listing_url).ok();
    let listing_key = base.as_ref().map(dedupe_key);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Some(mut url) = resolve_url(href, base.as_ref()) else {
            continue;
        };
        if !matches!(url.scheme(), "http" | "https") || !url.path().contains(path_fragment) {
            continue;
        }
        url.set_fragment(None);
        let key = dedupe_key(&url);
        if listing_key.as_deref() == Some(key.as_str()) {
            continue;
        }
        if seen.insert(key) {
            links.push(url.to_string());
        }
    }
    links
}

fn dedupe_key(url: &Url) -> String {
    let mut key = url.clone();
    key.set_fragment(None);
    key.as_str().trim_end_matches('/').to_string()
}

fn resolve_url(reference: &str, base: Option<&Url>) -> Option<Url> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with('#') || lower.starts_with("javascript:") || lower.starts_with("mailto:") {
        return None;
    }
    if let Ok(url) = Url::parse(trimmed) {
        return Some(url);
    }
    base.and_then(|base| base.join(trimmed).ok())
}
