use std::fmt;

use crate::catalog::UnitStats;
use crate::model::BoardPosition;

/// Traits whose members are treated as frontline tanks regardless of stats.
pub const TANK_TRAITS: &[&str] = &[
    "Bastion",
    "Behemoth",
    "Brawler",
    "Bruiser",
    "Defender",
    "Guardian",
    "Juggernaut",
    "Protector",
    "Sentinel",
    "Vanguard",
    "Warden",
    "Watcher",
];

pub const TANK_MIN_HP: f32 = 800.0;
pub const TANK_MIN_ARMOR: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Carry,
    Tank,
    Ranged,
    Melee,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Carry => "carry",
            Role::Tank => "tank",
            Role::Ranged => "ranged",
            Role::Melee => "melee",
        };
        f.write_str(name)
    }
}

/// A resolved unit on its way into the arranger, with the transient fields
/// classification needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrangeInput {
    pub id: String,
    pub name: String,
    pub items: Vec<String>,
    pub stars: u8,
    pub original: BoardPosition,
    pub stats: Option<UnitStats>,
}

impl ArrangeInput {
    pub fn hp(&self) -> f32 {
        self.stats.as_ref().map_or(0.0, |s| s.hp)
    }

    pub fn armor(&self) -> f32 {
        self.stats.as_ref().map_or(0.0, |s| s.armor)
    }

    pub fn range(&self) -> u8 {
        self.stats.as_ref().map_or(1, |s| s.range)
    }

    pub fn cost(&self) -> u8 {
        self.stats.as_ref().map_or(0, |s| s.cost)
    }

    fn has_tank_trait(&self) -> bool {
        self.stats.as_ref().is_some_and(|s| {
            s.traits
                .iter()
                .any(|t| TANK_TRAITS.iter().any(|tank| tank.eq_ignore_ascii_case(t.trim())))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleTags {
    pub carry: bool,
    pub tank: bool,
    pub ranged: bool,
    pub melee: bool,
}

impl RoleTags {
    pub fn has(&self, role: Role) -> bool {
        match role {
            Role::Carry => self.carry,
            Role::Tank => self.tank,
            Role::Ranged => self.ranged,
            Role::Melee => self.melee,
        }
    }

    fn set(&mut self, role: Role) {
        match role {
            Role::Carry => self.carry = true,
            Role::Tank => self.tank = true,
            Role::Ranged => self.ranged = true,
            Role::Melee => self.melee = true,
        }
    }

    pub fn is_melee_carry(&self) -> bool {
        self.carry && !self.ranged
    }
}

type RoleRule = (Role, fn(&ArrangeInput, &RoleTags) -> bool);

/// Evaluated top to bottom; later rules see the tags set by earlier ones.
pub const ROLE_RULES: &[RoleRule] = &[
    (Role::Carry, |unit, _| !unit.items.is_empty()),
    (Role::Tank, |unit, tags| {
        !tags.carry
            && (unit.has_tank_trait() || (unit.hp() > TANK_MIN_HP && unit.armor() > TANK_MIN_ARMOR))
    }),
    (Role::Ranged, |unit, _| unit.range() > 1),
    (Role::Melee, |_, tags| !tags.carry && !tags.tank && !tags.ranged),
];

pub fn classify(unit: &ArrangeInput) -> RoleTags {
    let mut tags = RoleTags::default();
    for (role, applies) in ROLE_RULES {
        if applies(unit, &tags) {
            tags.set(*role);
        }
    }
    tags
}
