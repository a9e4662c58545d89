use std::fmt;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

const BUNDLED_CATALOG: &str = include_str!("../data/catalog.json");

static BUNDLED: OnceLock<Result<Catalog, CatalogError>> = OnceLock::new();

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(String),
    #[error("catalog {kind} has an entry with an empty identifier")]
    EmptyIdentifier { kind: CatalogKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    Units,
    Items,
    Augments,
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogKind::Units => "units",
            CatalogKind::Items => "items",
            CatalogKind::Augments => "augments",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnitStats {
    #[serde(default)]
    pub cost: u8,
    #[serde(default)]
    pub hp: f32,
    #[serde(default)]
    pub armor: f32,
    #[serde(default = "default_range")]
    pub range: u8,
    #[serde(default)]
    pub traits: Vec<String>,
}

fn default_range() -> u8 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub alt_name: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub stats: Option<UnitStats>,
}

/// Canonical units, items and augments. Entry order is significant: it is the
/// tie-break for fuzzy matches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub units: Vec<CatalogEntry>,
    #[serde(default)]
    pub items: Vec<CatalogEntry>,
    #[serde(default)]
    pub augments: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog =
            serde_json::from_str(json).map_err(|err| CatalogError::Parse(err.to_string()))?;
        for kind in [CatalogKind::Units, CatalogKind::Items, CatalogKind::Augments] {
            if catalog.entries(kind).iter().any(|e| e.id.trim().is_empty()) {
                return Err(CatalogError::EmptyIdentifier { kind });
            }
        }
        Ok(catalog)
    }

    /// The dataset shipped with the crate, parsed on first use and shared for
    /// the life of the process.
    pub fn bundled() -> Result<&'static Catalog, CatalogError> {
        BUNDLED
            .get_or_init(|| Catalog::from_json(BUNDLED_CATALOG))
            .as_ref()
            .map_err(Clone::clone)
    }

    pub fn entries(&self, kind: CatalogKind) -> &[CatalogEntry] {
        match kind {
            CatalogKind::Units => &self.units,
            CatalogKind::Items => &self.items,
            CatalogKind::Augments => &self.augments,
        }
    }

    pub fn unit(&self, id: &str) -> Option<&CatalogEntry> {
        self.units.iter().find(|u| u.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert!(!catalog.units.is_empty());
        assert!(!catalog.items.is_empty());
        assert!(!catalog.augments.is_empty());
    }

    #[test]
    fn rejects_empty_identifier() {
        let json = r#"{"items":[{"id":" ","name":"Nothing"}]}"#;
        assert_eq!(
            Catalog::from_json(json),
            Err(CatalogError::EmptyIdentifier {
                kind: CatalogKind::Items
            })
        );
    }

    #[test]
    fn missing_stats_fields_default() {
        let json = r#"{"units":[{"id":"U","name":"U","stats":{"hp":500}}]}"#;
        let catalog = Catalog::from_json(json).unwrap();
        let stats = catalog.units[0].stats.clone().unwrap();
        assert_eq!(stats.range, 1);
        assert_eq!(stats.cost, 0);
    }
}
