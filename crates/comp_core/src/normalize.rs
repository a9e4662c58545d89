use crate::arrange::arrange;
use crate::catalog::CatalogKind;
use crate::layout::infer_positions;
use crate::model::{BoardSize, CompositionRecord, CompositionSkeleton, PositionHint};
use crate::resolve::Resolver;
use crate::roles::ArrangeInput;

/// Where a record came from and when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSource {
    pub url: String,
    pub crawled_utc: String,
}

/// Resolves identifiers, infers original positions and auto-arranges a
/// skeleton into the record shape persistence expects.
pub fn build_record(
    skeleton: CompositionSkeleton,
    resolver: &Resolver,
    board: BoardSize,
    source: RecordSource,
) -> CompositionRecord {
    let hints: Vec<PositionHint> = skeleton.units.iter().map(|u| u.hint).collect();
    let originals = infer_positions(&hints, board);
    let core_slug = skeleton.core_champion().map(|u| u.slug.clone());
    let mut core_champion = None;

    let inputs: Vec<ArrangeInput> = skeleton
        .units
        .into_iter()
        .zip(originals)
        .map(|(slot, original)| {
            let resolved = resolver.resolve_or_placeholder(&slot.slug, CatalogKind::Units);
            let entry = resolver.catalog().unit(&resolved.id);
            if core_champion.is_none() && core_slug.as_deref() == Some(slot.slug.as_str()) {
                core_champion = Some(resolved.id.clone());
            }
            let items = slot
                .item_slugs
                .iter()
                .map(|item| resolver.resolve_or_placeholder(item, CatalogKind::Items).id)
                .collect();
            ArrangeInput {
                name: entry.map_or_else(|| slot.display_name.clone(), |e| e.name.clone()),
                stats: entry.and_then(|e| e.stats.clone()),
                id: resolved.id,
                items,
                stars: slot.stars,
                original,
            }
        })
        .collect();

    CompositionRecord {
        name: skeleton.name,
        tier: skeleton.tier,
        plan: skeleton.plan,
        difficulty: skeleton.difficulty,
        meta_description: skeleton.meta_description,
        board,
        units: arrange(inputs, board),
        augments: skeleton.augments.into_iter().map(|a| a.id).collect(),
        core_champion,
        source_url: source.url,
        crawled_utc: source.crawled_utc,
    }
}
