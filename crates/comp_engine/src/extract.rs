//! Markup to [`CompositionSkeleton`].
//!
//! Guide sites change their templates often, so every field is read through an
//! ordered list of strategies: the first one that yields something wins, and a
//! field nobody can read falls back to its default instead of failing.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use comp_core::{
    Catalog, CatalogError, CatalogKind, CompositionSkeleton, PositionHint, ResolvedIdentifier,
    Resolver, Tier, UnitSlot,
};
use ego_tree::NodeId;
use engine_logging::{engine_debug, engine_info};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

/// How far up from a "Tier N" label to look for the augment icon group.
const MAX_GROUP_DEPTH: usize = 4;

static AUGMENT_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*tier\s*\d+\b").expect("static regex"));
static STYLE_OFFSET: LazyLock<Regex> = LazyLock::new(|| {
    // Anchored at a declaration start so `margin-top` or `padding-left` never match.
    Regex::new(r"(?i)(?:^|;)\s*(left|top)\s*:\s*(-?\d+(?:\.\d+)?)\s*(%|px)?").expect("static regex")
});

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn clean_text(element: ElementRef) -> Option<String> {
    let text = element.text().collect::<Vec<_>>().join(" ");
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!cleaned.is_empty()).then_some(cleaned)
}

fn first_text(doc: &Html, css: &str) -> Option<String> {
    let sel = selector(css)?;
    doc.select(&sel).find_map(clean_text)
}

fn first_attr(doc: &Html, css: &str, attr: &str) -> Option<String> {
    let sel = selector(css)?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(ToOwned::to_owned)
}

type TextStrategy = fn(&Html) -> Option<String>;

fn run_chain(doc: &Html, chain: &[TextStrategy]) -> Option<String> {
    chain.iter().find_map(|strategy| strategy(doc))
}

const NAME_STRATEGIES: &[TextStrategy] = &[
    |doc| first_text(doc, "h1"),
    |doc| first_text(doc, "h2, h3"),
    |doc| first_text(doc, r#"[class*="comp-name"], [class*="comp-title"]"#),
    |doc| first_text(doc, "title"),
];

const TIER_STRATEGIES: &[TextStrategy] = &[
    |doc| first_attr(doc, r#"img[class*="tier"]"#, "alt"),
    |doc| first_attr(doc, r#"[class*="tier"] img"#, "alt"),
    |doc| first_attr(doc, r#"img[src*="tier"]"#, "alt"),
    |doc| first_attr(doc, "[data-tier]", "data-tier"),
    |doc| first_attr(doc, r#"[class*="tier"]"#, "aria-label"),
];

const PLAN_STRATEGIES: &[TextStrategy] = &[
    |doc| first_attr(doc, "[data-plan]", "data-plan"),
    |doc| first_text(doc, r#"[class*="plan"]"#),
];

const DIFFICULTY_STRATEGIES: &[TextStrategy] = &[
    |doc| first_attr(doc, "[data-difficulty]", "data-difficulty"),
    |doc| first_text(doc, r#"[class*="difficulty"]"#),
];

const DESCRIPTION_STRATEGIES: &[TextStrategy] = &[
    |doc| first_attr(doc, r#"meta[name="description"]"#, "content"),
    |doc| first_attr(doc, r#"meta[property="og:description"]"#, "content"),
    |doc| first_text(doc, r#"[class*="description"]"#),
];

/// Ordered board parsers; later ones reconstruct less from the markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardStrategy {
    /// Nested board → row → cell structure.
    Grid,
    /// Absolutely positioned unit tiles inside a board container.
    Positioned,
    /// Degraded: unit reference links anywhere on the page, in order.
    UnitLinks,
}

pub const BOARD_STRATEGIES: &[BoardStrategy] = &[
    BoardStrategy::Grid,
    BoardStrategy::Positioned,
    BoardStrategy::UnitLinks,
];

impl BoardStrategy {
    pub fn extract(self, doc: &Html) -> Option<Vec<UnitSlot>> {
        let units = match self {
            BoardStrategy::Grid => grid_units(doc),
            BoardStrategy::Positioned => positioned_units(doc),
            BoardStrategy::UnitLinks => linked_units(doc),
        };
        (!units.is_empty()).then_some(units)
    }
}

fn class_contains(element: ElementRef, needle: &str) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|c| c.to_ascii_lowercase().contains(needle))
}

fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

fn images<'a>(element: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let own = (element.value().name() == "img").then_some(element);
    let nested = selector("img")
        .map(|sel| {
            element
                .select(&sel)
                .filter(|img| img.id() != element.id())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    own.into_iter().chain(nested).collect()
}

fn is_item_icon(img: ElementRef) -> bool {
    let src = img.value().attr("src").unwrap_or_default().to_ascii_lowercase();
    src.contains("/item") || class_contains(img, "item")
}

fn is_unit_icon(img: ElementRef) -> bool {
    if is_item_icon(img) {
        return false;
    }
    let src = img.value().attr("src").unwrap_or_default().to_ascii_lowercase();
    ["champion", "/unit", "/characters/"].iter().any(|m| src.contains(m))
        || class_contains(img, "champion")
        || class_contains(img, "unit")
}

/// Icon filename without directories, query or extension, lowercased.
pub fn slug_from_src(src: &str) -> Option<String> {
    let path = src.split(['?', '#']).next().unwrap_or_default();
    let file = path.rsplit('/').find(|seg| !seg.is_empty())?;
    let stem = match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    };
    let slug = stem.trim().to_lowercase();
    (!slug.is_empty()).then_some(slug)
}

fn icon_slug(img: ElementRef) -> Option<String> {
    img.value()
        .attr("src")
        .and_then(slug_from_src)
        .or_else(|| img.value().attr("alt").map(|a| a.trim().to_lowercase()).filter(|a| !a.is_empty()))
}

fn stars_of(elements: &[ElementRef]) -> u8 {
    elements
        .iter()
        .find_map(|el| el.value().attr("data-stars"))
        .and_then(|s| s.trim().parse::<u8>().ok())
        .filter(|s| (1..=4).contains(s))
        .unwrap_or(1)
}

fn parse_style(style: &str) -> Option<PositionHint> {
    let mut left = None;
    let mut top = None;
    let mut percent = true;
    for cap in STYLE_OFFSET.captures_iter(style) {
        let value: f32 = cap[2].parse().ok()?;
        if cap.get(3).is_none_or(|unit| unit.as_str() != "%") {
            percent = false;
        }
        match cap[1].to_ascii_lowercase().as_str() {
            "left" => left = Some(value),
            _ => top = Some(value),
        }
    }
    let (left, top) = (left?, top?);
    Some(if percent {
        PositionHint::Percent { left, top }
    } else {
        PositionHint::Pixel { left, top }
    })
}

fn explicit_attrs(element: ElementRef) -> Option<PositionHint> {
    let row = element.value().attr("data-row")?.trim().parse().ok()?;
    let col = element.value().attr("data-col")?.trim().parse().ok()?;
    Some(PositionHint::Explicit { row, col })
}

fn unit_from_cell(cell: ElementRef, fallback: PositionHint) -> Option<UnitSlot> {
    let imgs = images(cell);
    let unit_img = imgs.iter().copied().find(|img| is_unit_icon(*img))?;
    let slug = icon_slug(unit_img)?;
    let hint = explicit_attrs(cell)
        .or_else(|| cell.value().attr("style").and_then(parse_style))
        .unwrap_or(fallback);

    let mut slot = UnitSlot::new(slug, hint);
    slot.item_slugs = imgs
        .iter()
        .filter(|img| is_item_icon(**img))
        .filter_map(|img| icon_slug(*img))
        .collect();
    slot.stars = stars_of(&[cell, unit_img]);
    Some(slot)
}

fn grid_units(doc: &Html) -> Vec<UnitSlot> {
    let Some(board_sel) = selector(r#"[class*="board"]"#) else {
        return Vec::new();
    };
    for board in doc.select(&board_sel) {
        let rows: Vec<ElementRef> = child_elements(board).filter(|el| class_contains(*el, "row")).collect();
        if rows.is_empty() {
            continue;
        }
        let units: Vec<UnitSlot> = rows
            .iter()
            .enumerate()
            .flat_map(|(row_idx, row)| {
                child_elements(*row).enumerate().filter_map(move |(col_idx, cell)| {
                    let fallback = PositionHint::Explicit {
                        row: row_idx as i64,
                        col: col_idx as i64,
                    };
                    unit_from_cell(cell, fallback)
                })
            })
            .collect();
        if !units.is_empty() {
            return units;
        }
    }
    Vec::new()
}

fn positioned_units(doc: &Html) -> Vec<UnitSlot> {
    let Some(tile_sel) = selector(r#"[class*="board"] [style*="left"]"#) else {
        return Vec::new();
    };
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut units = Vec::new();
    for (index, tile) in doc.select(&tile_sel).enumerate() {
        let Some(unit_img) = images(tile).into_iter().find(|img| is_unit_icon(*img)) else {
            continue;
        };
        if !seen.insert(unit_img.id()) {
            continue;
        }
        if let Some(slot) = unit_from_cell(tile, PositionHint::Sequential { index }) {
            units.push(slot);
        }
    }
    units
}

/// Link-scanned units all go on one row, by occurrence; layout clamps the overflow.
const LINK_FALLBACK_ROW: i64 = 0;

fn linked_units(doc: &Html) -> Vec<UnitSlot> {
    let Some(link_sel) = selector(r#"a[href*="/champions/"], a[href*="/champion/"], a[href*="/units/"]"#) else {
        return Vec::new();
    };
    let mut seen = HashSet::new();
    let mut units = Vec::new();
    for link in doc.select(&link_sel) {
        let Some(slug) = link.value().attr("href").and_then(slug_from_src) else {
            continue;
        };
        if seen.insert(slug.clone()) {
            let col = units.len() as i64;
            units.push(UnitSlot::new(slug, PositionHint::Explicit { row: LINK_FALLBACK_ROW, col }));
        }
    }
    units
}

pub struct StructuralExtractor {
    resolver: Arc<Resolver>,
}

impl StructuralExtractor {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    /// Extractor over the bundled catalog; fails only if that catalog is broken.
    pub fn with_bundled_catalog() -> Result<Self, CatalogError> {
        let catalog = Catalog::bundled()?;
        Ok(Self::new(Arc::new(Resolver::new(Arc::new(catalog.clone())))))
    }

    pub fn resolver(&self) -> &Arc<Resolver> {
        &self.resolver
    }

    pub fn extract(&self, html: &str) -> CompositionSkeleton {
        let doc = Html::parse_document(html);

        let name = run_chain(&doc, NAME_STRATEGIES).unwrap_or_default();
        let tier = TIER_STRATEGIES
            .iter()
            .filter_map(|strategy| strategy(&doc))
            .find_map(|label| Tier::from_label(&label))
            .unwrap_or_default();

        let mut units = Vec::new();
        for strategy in BOARD_STRATEGIES {
            if let Some(found) = strategy.extract(&doc) {
                if *strategy == BoardStrategy::UnitLinks {
                    engine_info!("{:?}: no board markup, rebuilt {} units from links", name, found.len());
                } else {
                    engine_debug!("{:?}: {} units via {:?}", name, found.len(), strategy);
                }
                units = found;
                break;
            }
        }

        CompositionSkeleton {
            plan: run_chain(&doc, PLAN_STRATEGIES),
            difficulty: run_chain(&doc, DIFFICULTY_STRATEGIES),
            meta_description: run_chain(&doc, DESCRIPTION_STRATEGIES),
            augments: self.augments(&doc),
            name,
            tier,
            units,
        }
    }

    fn augments(&self, doc: &Html) -> Vec<ResolvedIdentifier> {
        let mut seen = HashSet::new();
        let mut augments = Vec::new();
        for node in doc.root_element().descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            if !AUGMENT_LABEL.is_match(text) {
                continue;
            }
            let group = node
                .ancestors()
                .take(MAX_GROUP_DEPTH)
                .filter_map(ElementRef::wrap)
                .map(images)
                .find(|imgs| !imgs.is_empty())
                .unwrap_or_default();
            for img in group {
                let token = img
                    .value()
                    .attr("alt")
                    .map(str::trim)
                    .filter(|alt| !alt.is_empty())
                    .map(ToOwned::to_owned)
                    .or_else(|| icon_slug(img));
                let Some(token) = token else {
                    continue;
                };
                let resolved = self.resolver.resolve_or_placeholder(&token, CatalogKind::Augments);
                if seen.insert(resolved.id.clone()) {
                    augments.push(resolved);
                }
            }
        }
        augments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_strips_path_query_and_extension() {
        assert_eq!(slug_from_src("https://cdn.example/champions/Jinx.png?v=3").as_deref(), Some("jinx"));
        assert_eq!(slug_from_src("/units/vi/").as_deref(), Some("vi"));
        assert_eq!(slug_from_src(""), None);
    }

    #[test]
    fn style_offsets_pick_mode() {
        assert_eq!(
            parse_style("position:absolute; left: 14%; top: 25%"),
            Some(PositionHint::Percent { left: 14.0, top: 25.0 })
        );
        assert_eq!(
            parse_style("top:40px;left:120px"),
            Some(PositionHint::Pixel { left: 120.0, top: 40.0 })
        );
        assert_eq!(parse_style("left: 10%"), None);
    }

    #[test]
    fn style_offsets_ignore_prefixed_properties() {
        assert_eq!(
            parse_style("left: 14%; top: 25%; margin-top: -12px"),
            Some(PositionHint::Percent { left: 14.0, top: 25.0 })
        );
        assert_eq!(
            parse_style("margin-left: 4px; top: 40%; left: 60%; padding-top: 2px"),
            Some(PositionHint::Percent { left: 60.0, top: 40.0 })
        );
        assert_eq!(parse_style("margin-left: 5%; margin-top: 5%"), None);
    }
}
