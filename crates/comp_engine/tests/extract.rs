use comp_core::{infer_position, BoardPosition, BoardSize, MatchMethod, PositionHint, Tier};
use comp_engine::StructuralExtractor;
use pretty_assertions::assert_eq;

const GRID_PAGE: &str = r#"
<html>
<head>
  <title>Rebel Jinx | Guide</title>
  <meta name="description" content="Reroll Jinx with Rebels.">
</head>
<body>
  <h1>Rebel Jinx</h1>
  <div class="tier-badge"><img alt="S" src="/img/tiers/s.png"></div>
  <span class="comp-plan">Fast 8</span>
  <span class="comp-difficulty" data-difficulty="Hard">Hard</span>
  <div class="board">
    <div class="board-row">
      <div class="cell"></div>
      <div class="cell" data-stars="2">
        <img class="unit" src="/champions/vi.png">
        <img class="item" src="/items/warmogsarmor.png">
      </div>
    </div>
    <div class="board-row"><div class="cell"></div></div>
    <div class="board-row"></div>
    <div class="board-row">
      <div class="cell"></div>
      <div class="cell">
        <img src="https://cdn.example/champions/jinx.png?v=2">
        <img src="/items/infinityedge.png">
        <img src="/items/lastwhisper.png">
      </div>
    </div>
  </div>
  <section class="augments">
    <div class="augment-group">
      <span>Tier 2</span>
      <img alt="Portable Forge" src="/augments/portable-forge.png">
      <img alt="Sniper Crest" src="/augments/sniper-crest.png">
    </div>
    <div class="augment-group">
      <span>Tier 3</span>
      <img alt="" src="/augments/zzqx.png">
    </div>
  </section>
</body>
</html>
"#;

fn extractor() -> StructuralExtractor {
    StructuralExtractor::with_bundled_catalog().expect("bundled catalog")
}

#[test]
fn grid_page_yields_full_skeleton() {
    let skeleton = extractor().extract(GRID_PAGE);

    assert_eq!(skeleton.name, "Rebel Jinx");
    assert_eq!(skeleton.tier, Tier::S);
    assert_eq!(skeleton.plan.as_deref(), Some("Fast 8"));
    assert_eq!(skeleton.difficulty.as_deref(), Some("Hard"));
    assert_eq!(skeleton.meta_description.as_deref(), Some("Reroll Jinx with Rebels."));

    assert_eq!(skeleton.units.len(), 2);
    let vi = &skeleton.units[0];
    assert_eq!(vi.slug, "vi");
    assert_eq!(vi.display_name, "Vi");
    assert_eq!(vi.hint, PositionHint::Explicit { row: 0, col: 1 });
    assert_eq!(vi.item_slugs, vec!["warmogsarmor"]);
    assert_eq!(vi.stars, 2);

    let jinx = &skeleton.units[1];
    assert_eq!(jinx.slug, "jinx");
    assert_eq!(jinx.hint, PositionHint::Explicit { row: 3, col: 1 });
    assert_eq!(jinx.item_slugs, vec!["infinityedge", "lastwhisper"]);
    assert_eq!(jinx.stars, 1);

    assert_eq!(skeleton.core_champion().map(|u| u.slug.as_str()), Some("jinx"));
}

#[test]
fn augments_are_resolved_with_placeholders() {
    let skeleton = extractor().extract(GRID_PAGE);
    let ids: Vec<&str> = skeleton.augments.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["TFT6_Augment_PortableForge", "TFT13_Augment_SniperCrest", "UNRESOLVED_zzqx"]
    );
    assert_eq!(skeleton.augments[0].method, MatchMethod::Exact);
    assert!(skeleton.augments[2].is_placeholder());
}

#[test]
fn positioned_tiles_keep_percent_offsets() {
    let html = r#"
        <h2>Sniper Squad</h2>
        <div class="comp-board">
          <div class="hex" style="position:absolute; left: 14%; top: 25%">
            <img class="champion-icon" src="/champions/caitlyn.png">
          </div>
          <div class="hex" style="left: 0%; top: 75%">
            <img class="champion-icon" src="/champions/vi.png">
          </div>
        </div>
    "#;
    let skeleton = extractor().extract(html);

    assert_eq!(skeleton.name, "Sniper Squad");
    assert_eq!(skeleton.tier, Tier::B);
    let hints: Vec<PositionHint> = skeleton.units.iter().map(|u| u.hint).collect();
    assert_eq!(
        hints,
        vec![
            PositionHint::Percent { left: 14.0, top: 25.0 },
            PositionHint::Percent { left: 0.0, top: 75.0 },
        ]
    );
}

#[test]
fn unit_links_are_a_degraded_fallback() {
    let slugs = ["jinx", "vi", "caitlyn", "jayce", "jhin", "ekko", "silco", "vander", "camille"];
    let mut links: String = slugs
        .iter()
        .map(|slug| format!(r#"<li><a href="/champions/{slug}/">{slug}</a></li>"#))
        .collect();
    links.push_str(r#"<li><a href="/champions/jinx#build">Jinx again</a></li>"#);
    let html = format!("<h1>Mystery Comp</h1><ul>{links}</ul>");
    let skeleton = extractor().extract(&html);

    let units: Vec<(&str, PositionHint)> =
        skeleton.units.iter().map(|u| (u.slug.as_str(), u.hint)).collect();
    let expected: Vec<(&str, PositionHint)> = slugs
        .iter()
        .enumerate()
        .map(|(col, slug)| (*slug, PositionHint::Explicit { row: 0, col: col as i64 }))
        .collect();
    assert_eq!(units, expected);

    // Past the board edge, link order keeps the row and piles up on the last column.
    let board = BoardSize::default();
    let positions: Vec<BoardPosition> =
        skeleton.units.iter().map(|u| infer_position(u.hint, board)).collect();
    assert!(positions.iter().all(|p| p.row == 0));
    assert_eq!(positions[6].col, 6);
    assert_eq!(positions[7].col, 6);
    assert_eq!(positions[8].col, 6);
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let skeleton = extractor().extract("<html><body><p>nothing here</p></body></html>");
    assert_eq!(skeleton.name, "");
    assert_eq!(skeleton.tier, Tier::B);
    assert_eq!(skeleton.plan, None);
    assert_eq!(skeleton.difficulty, None);
    assert_eq!(skeleton.meta_description, None);
    assert!(skeleton.units.is_empty());
    assert!(skeleton.augments.is_empty());
}

#[test]
fn explicit_cell_attributes_override_grid_indices() {
    let html = r#"
        <h1>Tanks</h1>
        <div class="board">
          <div class="row">
            <div data-row="2" data-col="5"><img class="unit" src="/champions/garen.png"></div>
          </div>
        </div>
    "#;
    let skeleton = extractor().extract(html);
    assert_eq!(skeleton.units[0].hint, PositionHint::Explicit { row: 2, col: 5 });
}
