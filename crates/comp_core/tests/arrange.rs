use std::collections::HashSet;

use comp_core::{
    arrange, choose_side, classify, ArrangeInput, BoardPosition, BoardSize, Side, UnitStats,
};
use pretty_assertions::assert_eq;

fn unit(id: &str, col: u8, items: usize, stats: UnitStats) -> ArrangeInput {
    ArrangeInput {
        id: id.to_string(),
        name: id.to_string(),
        items: (0..items).map(|i| format!("item{i}")).collect(),
        stars: 2,
        original: BoardPosition::new(0, col),
        stats: Some(stats),
    }
}

fn melee(hp: f32, armor: f32) -> UnitStats {
    UnitStats {
        cost: 3,
        hp,
        armor,
        range: 1,
        traits: Vec::new(),
    }
}

fn ranged(range: u8) -> UnitStats {
    UnitStats {
        cost: 3,
        hp: 600.0,
        armor: 20.0,
        range,
        traits: Vec::new(),
    }
}

fn position_of(arranged: &[comp_core::ArrangedUnit], id: &str) -> BoardPosition {
    arranged.iter().find(|u| u.id == id).unwrap().position
}

fn assert_valid(arranged: &[comp_core::ArrangedUnit], board: BoardSize) {
    let mut seen = HashSet::new();
    for unit in arranged {
        assert!(board.contains(unit.position), "{} out of bounds", unit.id);
        assert!(seen.insert(unit.position), "{} collides at {}", unit.id, unit.position);
    }
}

#[test]
fn melee_carry_takes_side_middle_and_tank_takes_corner() {
    let board = BoardSize::default();
    let units = vec![
        unit("carry", 1, 3, melee(700.0, 30.0)),
        unit("tank", 4, 0, melee(900.0, 50.0)),
    ];
    let arranged = arrange(units, board);

    assert_eq!(position_of(&arranged, "carry"), BoardPosition::new(0, 1));
    assert_eq!(position_of(&arranged, "tank"), BoardPosition::new(0, 0));
    assert_valid(&arranged, board);
}

#[test]
fn right_side_carry_mirrors_the_layout() {
    let board = BoardSize::default();
    let units = vec![
        unit("tank", 0, 0, melee(1000.0, 60.0)),
        unit("carry", 5, 2, melee(700.0, 30.0)),
        unit("second", 6, 1, melee(700.0, 30.0)),
    ];
    let arranged = arrange(units, board);

    assert_eq!(position_of(&arranged, "carry"), BoardPosition::new(0, 5));
    assert_eq!(position_of(&arranged, "second"), BoardPosition::new(0, 4));
    assert_eq!(position_of(&arranged, "tank"), BoardPosition::new(0, 6));
}

#[test]
fn ranged_carry_prefers_back_corner_on_its_side() {
    let board = BoardSize::default();
    let units = vec![
        unit("sniper", 6, 3, ranged(6)),
        unit("helper", 2, 0, ranged(4)),
        unit("brawler", 3, 0, melee(500.0, 20.0)),
    ];
    let arranged = arrange(units, board);

    assert_eq!(position_of(&arranged, "sniper"), BoardPosition::new(3, 6));
    assert_eq!(position_of(&arranged, "helper"), BoardPosition::new(3, 5));
    assert_eq!(position_of(&arranged, "brawler"), BoardPosition::new(1, 5));
}

#[test]
fn no_carry_defaults_to_left() {
    let units = vec![unit("a", 6, 0, melee(500.0, 20.0))];
    let tags: Vec<_> = units.iter().map(classify).collect();
    assert_eq!(choose_side(&units, &tags, BoardSize::default()), Side::Left);
}

#[test]
fn side_follows_primary_melee_carry_over_encounter_order() {
    let units = vec![
        unit("minor", 0, 1, melee(600.0, 20.0)),
        unit("major", 6, 3, melee(600.0, 20.0)),
    ];
    let tags: Vec<_> = units.iter().map(classify).collect();
    assert_eq!(choose_side(&units, &tags, BoardSize::default()), Side::Right);
}

#[test]
fn sturdiest_tank_gets_the_corner() {
    let board = BoardSize::default();
    let units = vec![
        unit("small", 0, 0, melee(850.0, 45.0)),
        unit("big", 0, 0, melee(1200.0, 45.0)),
    ];
    let arranged = arrange(units, board);
    assert_eq!(position_of(&arranged, "big"), BoardPosition::new(0, 0));
    assert_eq!(position_of(&arranged, "small"), BoardPosition::new(0, 1));
}

#[test]
fn crowded_back_row_spills_into_row_above() {
    let board = BoardSize::default();
    let units: Vec<_> = (0..9).map(|i| unit(&format!("r{i}"), 0, 0, ranged(4))).collect();
    let arranged = arrange(units, board);

    assert_valid(&arranged, board);
    let back = arranged.iter().filter(|u| u.position.row == 3).count();
    let above = arranged.iter().filter(|u| u.position.row == 2).count();
    assert_eq!((back, above), (7, 2));
}

#[test]
fn oversized_composition_is_capped_without_collisions() {
    let board = BoardSize::default();
    let units: Vec<_> = (0..35)
        .map(|i| unit(&format!("u{i}"), (i % 7) as u8, i % 3, melee(500.0 + i as f32, 20.0)))
        .collect();
    let arranged = arrange(units, board);

    assert_eq!(arranged.len(), board.cell_count());
    assert_valid(&arranged, board);
}

#[test]
fn mixed_composition_keeps_every_unit_distinct() {
    let board = BoardSize::default();
    let units = vec![
        unit("carry", 2, 3, melee(700.0, 30.0)),
        unit("carry2", 1, 2, melee(700.0, 30.0)),
        unit("tank", 0, 0, melee(1000.0, 60.0)),
        unit("tank2", 0, 0, melee(900.0, 50.0)),
        unit("sniper", 6, 3, ranged(6)),
        unit("mage", 5, 0, ranged(4)),
        unit("filler", 3, 0, melee(500.0, 20.0)),
        unit("filler2", 3, 0, melee(500.0, 20.0)),
    ];
    let arranged = arrange(units, board);
    assert_eq!(arranged.len(), 8);
    assert_valid(&arranged, board);
    assert_eq!(position_of(&arranged, "carry"), BoardPosition::new(0, 1));
    assert_eq!(position_of(&arranged, "carry2"), BoardPosition::new(0, 2));
    assert_eq!(position_of(&arranged, "tank"), BoardPosition::new(0, 0));
    assert_eq!(position_of(&arranged, "tank2"), BoardPosition::new(0, 3));
    assert_eq!(position_of(&arranged, "sniper"), BoardPosition::new(3, 0));
}

#[test]
fn classification_precedence() {
    let itemized_tank_stats = unit("a", 0, 2, melee(1000.0, 60.0));
    let tags = classify(&itemized_tank_stats);
    assert!(tags.carry && !tags.tank && !tags.ranged && !tags.melee);

    let ranged_carry = unit("b", 0, 1, ranged(4));
    let tags = classify(&ranged_carry);
    assert!(tags.carry && tags.ranged && !tags.melee);

    let mut trait_tank = unit("c", 0, 0, melee(500.0, 20.0));
    trait_tank.stats.as_mut().unwrap().traits = vec!["Bruiser".to_string()];
    let tags = classify(&trait_tank);
    assert!(tags.tank && !tags.melee);

    let mut unknown = unit("d", 0, 0, melee(0.0, 0.0));
    unknown.stats = None;
    let tags = classify(&unknown);
    assert!(tags.melee && !tags.tank && !tags.ranged && !tags.carry);
}

#[test]
fn items_survive_arrangement() {
    let arranged = arrange(vec![unit("carry", 1, 3, melee(700.0, 30.0))], BoardSize::default());
    assert_eq!(arranged[0].items, vec!["item0", "item1", "item2"]);
    assert_eq!(arranged[0].stars, 2);
}
