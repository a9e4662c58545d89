//! Board coordinates from whatever positional metadata a cell carried.
//!
//! Every function here is total: the result is always a position inside the
//! board, never an error.

use crate::model::{BoardPosition, BoardSize, PositionHint};

/// Absorbs rounding noise in `left`/`top` percentages, in percentage points.
pub const PERCENT_EPSILON: f32 = 2.0;
/// Units whose vertical pixel offsets differ by at most this much share a row.
pub const ROW_GROUP_TOLERANCE_PX: f32 = 20.0;

/// Position for a single hint. A lone pixel hint has no neighbours to group
/// with and lands in the first cell.
pub fn infer_position(hint: PositionHint, board: BoardSize) -> BoardPosition {
    match hint {
        PositionHint::Explicit { row, col } => board.clamp(row, col),
        PositionHint::Percent { left, top } => from_percent(left, top, board),
        PositionHint::Sequential { index } => from_sequence(index, board),
        PositionHint::Pixel { .. } => board.clamp(0, 0),
    }
}

/// Positions for a whole board. Pixel hints are grouped into rows by vertical
/// offset and ordered left to right inside each row; all other hints are
/// resolved independently.
pub fn infer_positions(hints: &[PositionHint], board: BoardSize) -> Vec<BoardPosition> {
    let mut positions: Vec<BoardPosition> =
        hints.iter().map(|hint| infer_position(*hint, board)).collect();

    let pixel: Vec<(usize, f32, f32)> = hints
        .iter()
        .enumerate()
        .filter_map(|(idx, hint)| match hint {
            PositionHint::Pixel { left, top } => Some((idx, *left, *top)),
            _ => None,
        })
        .collect();

    for (row, group) in group_rows(pixel).into_iter().enumerate() {
        for (col, (idx, _, _)) in group.into_iter().enumerate() {
            positions[idx] = board.clamp(row as i64, col as i64);
        }
    }
    positions
}

fn from_percent(left: f32, top: f32, board: BoardSize) -> BoardPosition {
    let cell_width = 100.0 / board.cols() as f32;
    let cell_height = 100.0 / board.rows() as f32;
    let col = ((left + PERCENT_EPSILON) / cell_width).floor();
    let row = ((top + PERCENT_EPSILON) / cell_height).floor();
    board.clamp(row as i64, col as i64)
}

fn from_sequence(index: usize, board: BoardSize) -> BoardPosition {
    let cols = board.cols() as usize;
    board.clamp((index / cols) as i64, (index % cols) as i64)
}

fn group_rows(mut units: Vec<(usize, f32, f32)>) -> Vec<Vec<(usize, f32, f32)>> {
    units.sort_by(|a, b| a.2.total_cmp(&b.2).then(a.0.cmp(&b.0)));

    let mut rows: Vec<Vec<(usize, f32, f32)>> = Vec::new();
    let mut anchor_top = f32::NEG_INFINITY;
    for unit in units {
        match rows.last_mut() {
            Some(row) if unit.2 - anchor_top <= ROW_GROUP_TOLERANCE_PX => row.push(unit),
            _ => {
                anchor_top = unit.2;
                rows.push(vec![unit]);
            }
        }
    }
    for row in &mut rows {
        row.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    }
    rows
}
