//! Deterministic auto-arrangement of a composition onto the board.
//!
//! Units are split into four placement groups (melee carries, tanks, ranged,
//! remaining melee) and each group walks its own preferred-position list.
//! When a list runs dry the unit takes the nearest open cell instead, so every
//! unit gets a distinct in-bounds position.

use std::cmp::Reverse;
use std::collections::HashSet;

use engine_logging::{engine_debug, engine_warn};

use crate::model::{ArrangedUnit, BoardPosition, BoardSize};
use crate::roles::{classify, ArrangeInput, RoleTags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Columns strictly right of centre belong to the right side.
    pub fn from_column(col: u8, board: BoardSize) -> Self {
        if (col as usize) * 2 < board.cols() as usize {
            Side::Left
        } else {
            Side::Right
        }
    }

    fn width(board: BoardSize) -> u8 {
        (board.cols() / 2).max(1)
    }

    pub fn corner(self, board: BoardSize) -> u8 {
        match self {
            Side::Left => 0,
            Side::Right => board.cols() - 1,
        }
    }

    pub fn middle(self, board: BoardSize) -> u8 {
        let half = Side::width(board) / 2;
        match self {
            Side::Left => half,
            Side::Right => board.cols() - 1 - half,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Columns of this side, corner first, moving toward the centre.
    fn columns_from_corner(self, board: BoardSize) -> Vec<u8> {
        let width = Side::width(board);
        match self {
            Side::Left => (0..width).collect(),
            Side::Right => (board.cols() - width..board.cols()).rev().collect(),
        }
    }

    fn is_toward_centre(self, from: u8, col: u8) -> bool {
        match self {
            Side::Left => col > from,
            Side::Right => col < from,
        }
    }
}

/// Side of the board the team's carries should stand on, read from the
/// original (scraped) column of the primary melee carry, else the first
/// ranged carry, else left.
pub fn choose_side(units: &[ArrangeInput], tags: &[RoleTags], board: BoardSize) -> Side {
    let melee_carry = rank_indices(units, indices_where(tags, |t| t.is_melee_carry()))
        .first()
        .map(|&i| &units[i]);
    if let Some(unit) = melee_carry {
        return Side::from_column(unit.original.col, board);
    }

    units
        .iter()
        .zip(tags)
        .find(|(_, t)| t.carry && t.ranged)
        .map_or(Side::Left, |(u, _)| Side::from_column(u.original.col, board))
}

struct Occupancy {
    board: BoardSize,
    taken: HashSet<BoardPosition>,
}

impl Occupancy {
    fn new(board: BoardSize) -> Self {
        Self {
            board,
            taken: HashSet::with_capacity(board.cell_count()),
        }
    }

    fn is_open(&self, pos: BoardPosition) -> bool {
        self.board.contains(pos) && !self.taken.contains(&pos)
    }

    fn place(&mut self, preferred: &[BoardPosition], group: &str, unit: &str) -> Option<BoardPosition> {
        let chosen = match preferred.iter().copied().find(|p| self.is_open(*p)) {
            Some(pos) => Some(pos),
            None => {
                engine_warn!(
                    "Preferred {} slots exhausted; placing {} at nearest open cell",
                    group,
                    unit
                );
                let anchor = preferred.first().copied().unwrap_or(BoardPosition::new(0, 0));
                self.nearest_open(anchor)
            }
        };
        if let Some(pos) = chosen {
            self.taken.insert(pos);
        }
        chosen
    }

    fn nearest_open(&self, anchor: BoardPosition) -> Option<BoardPosition> {
        self.board
            .cells()
            .filter(|p| !self.taken.contains(p))
            .min_by_key(|p| (p.distance(anchor), p.row, p.col))
    }
}

/// Every column of `row`, ordered by distance from `anchor`; ties go to the
/// column nearer the board centre, as seen from `side`.
fn row_around(row: u8, anchor: u8, side: Side, board: BoardSize) -> Vec<BoardPosition> {
    let mut cols: Vec<u8> = (0..board.cols()).collect();
    cols.sort_by_key(|&c| (c.abs_diff(anchor), !side.is_toward_centre(anchor, c)));
    cols.into_iter().map(|c| BoardPosition::new(row, c)).collect()
}

fn back_row_preferences(side: Side, board: BoardSize) -> Vec<BoardPosition> {
    let back = board.back_row();
    let mut prefs: Vec<BoardPosition> = side
        .columns_from_corner(board)
        .into_iter()
        .chain(side.opposite().columns_from_corner(board))
        .map(|c| BoardPosition::new(back, c))
        .collect();
    for pos in row_around(back, side.corner(board), side, board) {
        if !prefs.contains(&pos) {
            prefs.push(pos);
        }
    }
    if back > 0 {
        prefs.extend(row_around(back - 1, side.corner(board), side, board));
    }
    prefs
}

fn indices_where(tags: &[RoleTags], pred: impl Fn(&RoleTags) -> bool) -> Vec<usize> {
    tags.iter()
        .enumerate()
        .filter(|(_, t)| pred(t))
        .map(|(i, _)| i)
        .collect()
}

/// Most items first, then cost, then star level, then input order.
fn rank_indices(units: &[ArrangeInput], mut idx: Vec<usize>) -> Vec<usize> {
    idx.sort_by_key(|&i| {
        let u = &units[i];
        (Reverse(u.items.len()), Reverse(u.cost()), Reverse(u.stars), i)
    });
    idx
}

fn middle_row(board: BoardSize) -> u8 {
    if board.rows() >= 3 {
        1
    } else {
        0
    }
}

pub fn arrange(mut units: Vec<ArrangeInput>, board: BoardSize) -> Vec<ArrangedUnit> {
    let capacity = board.cell_count();
    if units.len() > capacity {
        engine_warn!(
            "Composition has {} units but board holds {}; dropping the overflow",
            units.len(),
            capacity
        );
        units.truncate(capacity);
    }

    let tags: Vec<RoleTags> = units.iter().map(classify).collect();
    let side = choose_side(&units, &tags, board);
    let mut grid = Occupancy::new(board);
    let mut placed: Vec<Option<BoardPosition>> = vec![None; units.len()];

    let front_carry = row_around(0, side.middle(board), side, board);
    for i in rank_indices(&units, indices_where(&tags, |t| t.is_melee_carry())) {
        placed[i] = grid.place(&front_carry, "melee carry", &units[i].name);
    }

    let mut tanks = indices_where(&tags, |t| t.tank);
    tanks.sort_by(|&a, &b| {
        let (ua, ub) = (&units[a], &units[b]);
        ub.hp()
            .total_cmp(&ua.hp())
            .then(ub.armor().total_cmp(&ua.armor()))
            .then(a.cmp(&b))
    });
    let front_tank = row_around(0, side.corner(board), side, board);
    for i in tanks {
        placed[i] = grid.place(&front_tank, "tank", &units[i].name);
    }

    let back = back_row_preferences(side, board);
    let mut ranged = rank_indices(&units, indices_where(&tags, |t| t.ranged && t.carry && !t.tank));
    ranged.extend(indices_where(&tags, |t| t.ranged && !t.carry && !t.tank));
    for i in ranged {
        placed[i] = grid.place(&back, "ranged", &units[i].name);
    }

    let middle = row_around(middle_row(board), side.middle(board), side, board);
    for i in indices_where(&tags, |t| t.melee) {
        placed[i] = grid.place(&middle, "melee", &units[i].name);
    }

    engine_debug!("Arranged {} units with carries on the {:?} side", units.len(), side);

    units
        .into_iter()
        .zip(placed)
        .filter_map(|(unit, pos)| {
            pos.map(|position| ArrangedUnit {
                id: unit.id,
                name: unit.name,
                position,
                items: unit.items,
                stars: unit.stars,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_side_geometry() {
        let board = BoardSize::default();
        assert_eq!(Side::Left.middle(board), 1);
        assert_eq!(Side::Left.corner(board), 0);
        assert_eq!(Side::Right.middle(board), 5);
        assert_eq!(Side::Right.corner(board), 6);
    }

    #[test]
    fn front_carry_preferences_fan_out_from_middle() {
        let board = BoardSize::default();
        let cols: Vec<u8> = row_around(0, 1, Side::Left, board).iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![1, 2, 0, 3, 4, 5, 6]);
        let cols: Vec<u8> = row_around(0, 5, Side::Right, board).iter().map(|p| p.col).collect();
        assert_eq!(cols, vec![5, 4, 6, 3, 2, 1, 0]);
    }

    #[test]
    fn ranged_preferences_cover_back_row_before_row_above() {
        let board = BoardSize::default();
        let prefs = back_row_preferences(Side::Left, board);
        let back: Vec<u8> = prefs.iter().take(7).map(|p| p.col).collect();
        assert_eq!(back, vec![0, 1, 2, 6, 5, 4, 3]);
        assert!(prefs.iter().take(7).all(|p| p.row == 3));
        assert!(prefs.iter().skip(7).all(|p| p.row == 2));
    }
}
