//! Comp core: pure domain model, identifier resolution, layout inference and
//! board auto-arrangement. No IO lives here.
mod arrange;
mod catalog;
mod layout;
mod model;
mod normalize;
mod resolve;
mod roles;

pub use arrange::{arrange, choose_side, Side};
pub use catalog::{Catalog, CatalogEntry, CatalogError, CatalogKind, UnitStats};
pub use layout::{infer_position, infer_positions, PERCENT_EPSILON, ROW_GROUP_TOLERANCE_PX};
pub use model::{
    display_name_from_slug, ArrangedUnit, BoardPosition, BoardSize, CompositionRecord,
    CompositionSkeleton, MatchMethod, PositionHint, ResolvedIdentifier, Tier, UnitSlot,
    DEFAULT_BOARD_COLS, DEFAULT_BOARD_ROWS,
};
pub use normalize::{build_record, RecordSource};
pub use resolve::{normalize, placeholder_id, Resolver, FUZZY_THRESHOLD, PLACEHOLDER_PREFIX};
pub use roles::{classify, ArrangeInput, Role, RoleTags, ROLE_RULES, TANK_TRAITS};
