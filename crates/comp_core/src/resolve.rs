use std::sync::{Arc, LazyLock};

use engine_logging::{engine_debug, engine_warn};
use regex::Regex;

use crate::catalog::{Catalog, CatalogEntry, CatalogKind};
use crate::model::{MatchMethod, ResolvedIdentifier};

pub const PLACEHOLDER_PREFIX: &str = "UNRESOLVED_";
pub const FUZZY_THRESHOLD: f64 = 0.6;

const QUOTES: &[char] = &['\'', '"', '`', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}'];

static TRAILING_EXTENSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[._\-\s](?:tex|dds|png|jpe?g|webp|gif|svg|avif)$").expect("static regex")
});

static TRAILING_SET_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[._\-\s](?:tft_?)?set_?\d+$|[._\-]tft\d+$").expect("static regex")
});

/// Lowercase, drop quotes, peel trailing texture/set markers, then keep only
/// alphanumerics.
pub fn normalize(input: &str) -> String {
    let mut text: String = input.to_lowercase().chars().filter(|c| !QUOTES.contains(c)).collect();
    loop {
        let before = text.len();
        text = TRAILING_EXTENSION.replace(&text, "").into_owned();
        text = TRAILING_SET_MARKER.replace(&text, "").into_owned();
        if text.len() == before {
            break;
        }
    }
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

pub fn placeholder_id(slug: &str) -> String {
    format!("{PLACEHOLDER_PREFIX}{slug}")
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    id: String,
    id_key: String,
    name_key: String,
    alt_key: Option<String>,
    icon_key: Option<String>,
}

impl IndexedEntry {
    fn new(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.clone(),
            id_key: normalize(&entry.id),
            name_key: normalize(&entry.name),
            alt_key: entry.alt_name.as_deref().map(normalize).filter(|k| !k.is_empty()),
            icon_key: entry.icon.as_deref().map(normalize).filter(|k| !k.is_empty()),
        }
    }
}

/// Maps noisy slugs to canonical catalog identifiers.
///
/// Built once per catalog; lookups are pure and take `&self`.
#[derive(Debug, Clone)]
pub struct Resolver {
    catalog: Arc<Catalog>,
    units: Vec<IndexedEntry>,
    items: Vec<IndexedEntry>,
    augments: Vec<IndexedEntry>,
    fuzzy: bool,
}

impl Resolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        let index = |entries: &[CatalogEntry]| entries.iter().map(IndexedEntry::new).collect();
        Self {
            units: index(&catalog.units),
            items: index(&catalog.items),
            augments: index(&catalog.augments),
            catalog,
            fuzzy: true,
        }
    }

    pub fn with_fuzzy(mut self, enabled: bool) -> Self {
        self.fuzzy = enabled;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn index(&self, kind: CatalogKind) -> &[IndexedEntry] {
        match kind {
            CatalogKind::Units => &self.units,
            CatalogKind::Items => &self.items,
            CatalogKind::Augments => &self.augments,
        }
    }

    pub fn resolve(&self, slug: &str, kind: CatalogKind) -> Option<ResolvedIdentifier> {
        let key = normalize(slug);
        if key.is_empty() {
            return None;
        }
        let entries = self.index(kind);

        if let Some(hit) = lookup(&key, entries) {
            return Some(hit);
        }

        if key.ends_with(|c: char| c.is_ascii_digit()) {
            let stripped = key.trim_end_matches(|c: char| c.is_ascii_digit());
            if !stripped.is_empty() {
                if let Some(hit) = lookup(stripped, entries) {
                    engine_debug!("Resolved {} via suffix strip to {}", slug, hit.id);
                    return Some(hit);
                }
            }
        }

        if self.fuzzy {
            return fuzzy_lookup(&key, entries);
        }
        None
    }

    /// Like [`Resolver::resolve`], but a miss yields a placeholder identifier.
    pub fn resolve_or_placeholder(&self, slug: &str, kind: CatalogKind) -> ResolvedIdentifier {
        match self.resolve(slug, kind) {
            Some(hit) => hit,
            None => {
                engine_warn!("No {} catalog match for slug {:?}; using placeholder", kind, slug);
                ResolvedIdentifier::new(placeholder_id(slug), MatchMethod::Placeholder)
            }
        }
    }
}

fn lookup(key: &str, entries: &[IndexedEntry]) -> Option<ResolvedIdentifier> {
    let exact = entries
        .iter()
        .find(|e| e.name_key == key || e.alt_key.as_deref() == Some(key));
    if let Some(entry) = exact {
        return Some(ResolvedIdentifier::new(&entry.id, MatchMethod::Exact));
    }

    let by_id = entries.iter().find(|e| e.id_key.contains(key));
    if let Some(entry) = by_id {
        return Some(ResolvedIdentifier::new(&entry.id, MatchMethod::Substring));
    }

    entries
        .iter()
        .find(|e| e.icon_key.as_deref().is_some_and(|icon| icon.contains(key)))
        .map(|entry| ResolvedIdentifier::new(&entry.id, MatchMethod::Substring))
}

fn fuzzy_lookup(key: &str, entries: &[IndexedEntry]) -> Option<ResolvedIdentifier> {
    let mut best: Option<(&IndexedEntry, f64)> = None;
    for entry in entries {
        let score = std::iter::once(entry.name_key.as_str())
            .chain(entry.alt_key.as_deref())
            .map(|candidate| strsim::normalized_levenshtein(key, candidate))
            .fold(0.0_f64, f64::max);
        // Strictly greater keeps the earliest entry on ties.
        if score >= FUZZY_THRESHOLD && best.is_none_or(|(_, s)| score > s) {
            best = Some((entry, score));
        }
    }
    best.map(|(entry, _)| ResolvedIdentifier::new(&entry.id, MatchMethod::Fuzzy))
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn normalize_strips_quotes_and_markers() {
        assert_eq!(normalize("Guinsoo's Rageblade"), "guinsoosrageblade");
        assert_eq!(normalize("TFT13_Jinx_Square.TFT_Set13.tex"), "tft13jinxsquare");
        assert_eq!(normalize("jinx.png"), "jinx");
        assert_eq!(normalize("Cortex"), "cortex");
    }

    #[test]
    fn normalize_keeps_plain_digit_suffix() {
        assert_eq!(normalize("voidstaff70"), "voidstaff70");
    }
}
