//! Fixed rules values for the FORWARD engine.
//!
//! Anything a balance pass might want to move lives in [`crate::RulesConfig`];
//! the values here are structural and only change with the rules themselves.

// Duel table ---------------------------------------------------------------
pub(crate) const DAMAGE_HIT: i32 = 1;
pub(crate) const DAMAGE_CRIT: i32 = 2;
pub(crate) const DAMAGE_COUNTER: i32 = 1;
/// Auxiliary block roll succeeds at or below this face.
pub(crate) const BLOCK_MAX_FACE: u8 = 2;
/// Face a "normal hit on 1" blessing turns a 1 into.
pub(crate) const NORMAL_HIT_FACE: u8 = 3;

// Inventory ----------------------------------------------------------------
/// Hard ceiling on both inventory bags.
pub const MAX_BAG_SLOTS: usize = 2;

// Board --------------------------------------------------------------------
pub(crate) const LOCATION_CLEAR_XP: i32 = 1;

// Catalog ------------------------------------------------------------------
/// A location pool smaller than this falls back to a random draw.
pub(crate) const MIN_LOCATION_POOL: usize = 5;
pub(crate) const FALLBACK_DECK_SIZE: usize = 60;
pub(crate) const FALLBACK_HEAL: i32 = 4;
/// Last location index that still rolls the princess into slot 9.
pub(crate) const PRINCESS_LAST_INDEX: usize = 2;
/// Location index window (inclusive) for the sage in slot 8.
pub(crate) const SAGE_FIRST_INDEX: usize = 2;
pub(crate) const SAGE_LAST_INDEX: usize = 5;

// Location hazards ---------------------------------------------------------
pub(crate) const SCORCH_DAMAGE: i32 = 1;
pub(crate) const MISTS_MAX_FACE: u8 = 2;
pub(crate) const THEFT_MAX_FACE: u8 = 3;
pub(crate) const ROT_MAX_FACE: u8 = 3;
pub(crate) const ROT_DAMAGE: i32 = 1;
pub(crate) const CLIMB_DAMAGE: i32 = 1;
