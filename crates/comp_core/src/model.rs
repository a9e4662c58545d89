use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_BOARD_ROWS: u8 = 4;
pub const DEFAULT_BOARD_COLS: u8 = 7;

/// Board dimensions, never smaller than 1x1. Deserialized sizes are clamped
/// the same way as [`BoardSize::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawBoardSize")]
pub struct BoardSize {
    rows: u8,
    cols: u8,
}

#[derive(Deserialize)]
#[serde(rename = "BoardSize")]
struct RawBoardSize {
    rows: u8,
    cols: u8,
}

impl From<RawBoardSize> for BoardSize {
    fn from(raw: RawBoardSize) -> Self {
        Self::new(raw.rows, raw.cols)
    }
}

impl BoardSize {
    pub fn new(rows: u8, cols: u8) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
        }
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }

    pub fn back_row(&self) -> u8 {
        self.rows - 1
    }

    pub fn contains(&self, pos: BoardPosition) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    /// Clamps signed coordinates into the board.
    pub fn clamp(&self, row: i64, col: i64) -> BoardPosition {
        BoardPosition {
            row: row.clamp(0, self.rows as i64 - 1) as u8,
            col: col.clamp(0, self.cols as i64 - 1) as u8,
        }
    }

    /// Row-major iteration over every cell.
    pub fn cells(&self) -> impl Iterator<Item = BoardPosition> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| BoardPosition { row, col }))
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self::new(DEFAULT_BOARD_ROWS, DEFAULT_BOARD_COLS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoardPosition {
    pub row: u8,
    pub col: u8,
}

impl BoardPosition {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn distance(&self, other: BoardPosition) -> u16 {
        let dr = (self.row as i16 - other.row as i16).unsigned_abs();
        let dc = (self.col as i16 - other.col as i16).unsigned_abs();
        dr + dc
    }
}

impl fmt::Display for BoardPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Tier {
    S,
    A,
    #[default]
    B,
    C,
    D,
}

impl Tier {
    /// Parses a badge label such as `"s"`, `"A tier"` or `"Tier-B"`. Anything
    /// but a lone letter, like `"Best"`, is rejected.
    pub fn from_label(label: &str) -> Option<Self> {
        let upper = label.trim().to_ascii_uppercase();
        let separator = |c: char| !c.is_ascii_alphanumeric();
        let core = upper.trim_matches(separator);
        let core = core
            .strip_prefix("TIER")
            .or_else(|| core.strip_suffix("TIER"))
            .unwrap_or(core)
            .trim_matches(separator);
        let mut chars = core.chars();
        let letter = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        match letter {
            'S' => Some(Tier::S),
            'A' => Some(Tier::A),
            'B' => Some(Tier::B),
            'C' => Some(Tier::C),
            'D' => Some(Tier::D),
            _ => None,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
        };
        f.write_str(letter)
    }
}

/// Whatever positional metadata a board cell carried in the markup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionHint {
    /// Row/column known from attributes or from the grid structure.
    Explicit { row: i64, col: i64 },
    /// `left: X%; top: Y%` offsets relative to the board container.
    Percent { left: f32, top: f32 },
    /// Absolute pixel offsets; rows are recovered by grouping.
    Pixel { left: f32, top: f32 },
    /// No metadata; only the enumeration order is known.
    Sequential { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnitSlot {
    pub slug: String,
    pub display_name: String,
    pub hint: PositionHint,
    pub item_slugs: Vec<String>,
    pub stars: u8,
}

impl UnitSlot {
    pub fn new(slug: impl Into<String>, hint: PositionHint) -> Self {
        let slug = slug.into();
        Self {
            display_name: display_name_from_slug(&slug),
            slug,
            hint,
            item_slugs: Vec::new(),
            stars: 1,
        }
    }

    pub fn is_carry(&self) -> bool {
        !self.item_slugs.is_empty()
    }
}

/// Capitalizes the first letter of a slug.
pub fn display_name_from_slug(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompositionSkeleton {
    pub name: String,
    pub tier: Tier,
    pub plan: Option<String>,
    pub difficulty: Option<String>,
    pub meta_description: Option<String>,
    pub units: Vec<UnitSlot>,
    pub augments: Vec<ResolvedIdentifier>,
}

impl CompositionSkeleton {
    /// The carry with the most items; ties go to the unit encountered first.
    pub fn core_champion(&self) -> Option<&UnitSlot> {
        self.units
            .iter()
            .filter(|u| u.is_carry())
            .fold(None, |best: Option<&UnitSlot>, unit| match best {
                Some(b) if b.item_slugs.len() >= unit.item_slugs.len() => Some(b),
                _ => Some(unit),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchMethod {
    Exact,
    Substring,
    Fuzzy,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedIdentifier {
    pub id: String,
    pub method: MatchMethod,
}

impl ResolvedIdentifier {
    pub fn new(id: impl Into<String>, method: MatchMethod) -> Self {
        Self {
            id: id.into(),
            method,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.method == MatchMethod::Placeholder
    }
}

/// A unit as handed to persistence: no roles, no stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrangedUnit {
    pub id: String,
    pub name: String,
    pub position: BoardPosition,
    pub items: Vec<String>,
    pub stars: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionRecord {
    pub name: String,
    pub tier: Tier,
    pub plan: Option<String>,
    pub difficulty: Option<String>,
    pub meta_description: Option<String>,
    pub board: BoardSize,
    pub units: Vec<ArrangedUnit>,
    pub augments: Vec<String>,
    pub core_champion: Option<String>,
    pub source_url: String,
    pub crawled_utc: String,
}
