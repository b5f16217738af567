//! Per-location rule hooks.
//!
//! Each location may bend the core rules in one narrow way. The run driver
//! picks a strategy by location key before traversal starts and the resolver
//! calls the hooks at fixed points; with effects disabled every location gets
//! [`NoEffects`].

use std::fmt;

use crate::constants::{
    CLIMB_DAMAGE, MISTS_MAX_FACE, ROT_DAMAGE, ROT_MAX_FACE, SCORCH_DAMAGE, THEFT_MAX_FACE,
};
use crate::rng::{DiceSource, pick};
use crate::trace::DeathCause;

/// Damage a location inflicts outside of combat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hazard {
    pub damage: i32,
    pub cause: DeathCause,
}

/// What to do with the tile the player chose to reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealAction {
    Resolve(usize),
    /// Turn it over and bury it without resolving.
    Bury(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollAdjustment {
    pub roll: u8,
    pub hazard: Option<Hazard>,
}

impl RollAdjustment {
    #[must_use]
    pub const fn keep(roll: u8) -> Self {
        Self { roll, hazard: None }
    }
}

pub trait LocationEffects: fmt::Debug {
    fn name(&self) -> &'static str {
        "none"
    }

    /// Before every reveal after the start tile.
    fn on_turn_start(&mut self, _rng: &mut dyn DiceSource) -> Option<Hazard> {
        None
    }

    /// May redirect or bury the chosen tile. `legal` always contains `chosen`.
    fn on_reveal(
        &mut self,
        chosen: usize,
        _legal: &[usize],
        _rng: &mut dyn DiceSource,
    ) -> RevealAction {
        RevealAction::Resolve(chosen)
    }

    fn on_bury(&mut self) {}

    /// Returns `true` when the item is stolen (and its tile buried).
    fn on_pickup(&mut self, _rng: &mut dyn DiceSource) -> bool {
        false
    }

    /// Sees the raw player roll of `round` (1-based) before any snare or
    /// blessing modifier.
    fn adjust_player_roll(&mut self, roll: u8, _round: u32, _def: i32) -> RollAdjustment {
        RollAdjustment::keep(roll)
    }

    fn on_enemy_defeated(&mut self, _rng: &mut dyn DiceSource) -> Option<Hazard> {
        None
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl LocationEffects for NoEffects {}

/// Sicorro Wastes: the sun burns 1 HP every turn.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScorchingSun;

impl LocationEffects for ScorchingSun {
    fn name(&self) -> &'static str {
        "scorching-sun"
    }

    fn on_turn_start(&mut self, _rng: &mut dyn DiceSource) -> Option<Hazard> {
        Some(Hazard {
            damage: SCORCH_DAMAGE,
            cause: DeathCause::Scorch,
        })
    }
}

/// Darkwood Brume: mists may push the player onto another legal tile.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mists;

impl LocationEffects for Mists {
    fn name(&self) -> &'static str {
        "mists"
    }

    fn on_reveal(
        &mut self,
        chosen: usize,
        legal: &[usize],
        rng: &mut dyn DiceSource,
    ) -> RevealAction {
        if rng.d6() <= MISTS_MAX_FACE
            && let Some(&forced) = pick(rng, legal)
        {
            return RevealAction::Resolve(forced);
        }
        RevealAction::Resolve(chosen)
    }
}

/// Nightsea: every bury drags the next revealed card under too.
#[derive(Debug, Clone, Copy, Default)]
pub struct NightseaPull {
    primed: bool,
}

impl LocationEffects for NightseaPull {
    fn name(&self) -> &'static str {
        "nightsea-pull"
    }

    fn on_bury(&mut self) {
        self.primed = true;
    }

    // A pulled card does not prime the next pull.
    fn on_reveal(
        &mut self,
        chosen: usize,
        _legal: &[usize],
        _rng: &mut dyn DiceSource,
    ) -> RevealAction {
        if std::mem::take(&mut self.primed) {
            RevealAction::Bury(chosen)
        } else {
            RevealAction::Resolve(chosen)
        }
    }
}

/// Valthria: thieves try for the first item found here.
#[derive(Debug, Clone, Copy, Default)]
pub struct Thieves {
    tried: bool,
}

impl LocationEffects for Thieves {
    fn name(&self) -> &'static str {
        "thieves"
    }

    fn on_pickup(&mut self, rng: &mut dyn DiceSource) -> bool {
        if self.tried {
            return false;
        }
        self.tried = true;
        rng.d6() <= THEFT_MAX_FACE
    }
}

/// Caelith Spiremaze: a natural 1 is a fall unless armour absorbs it.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerilousClimb;

impl LocationEffects for PerilousClimb {
    fn name(&self) -> &'static str {
        "perilous-climb"
    }

    fn adjust_player_roll(&mut self, roll: u8, _round: u32, def: i32) -> RollAdjustment {
        let damage = (CLIMB_DAMAGE - def).max(0);
        let hazard = (roll == 1 && damage > 0).then_some(Hazard {
            damage,
            cause: DeathCause::Climb,
        });
        RollAdjustment { roll, hazard }
    }
}

/// Frozen Gaol: numb hands on the opening roll of each fight.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumbHands;

impl LocationEffects for NumbHands {
    fn name(&self) -> &'static str {
        "numb-hands"
    }

    fn adjust_player_roll(&mut self, roll: u8, round: u32, _def: i32) -> RollAdjustment {
        if round == 1 {
            RollAdjustment::keep(roll.saturating_sub(1).max(1))
        } else {
            RollAdjustment::keep(roll)
        }
    }
}

/// Amara Rot Glade: slain things leave rot behind.
#[derive(Debug, Clone, Copy, Default)]
pub struct CreepingRot;

impl LocationEffects for CreepingRot {
    fn name(&self) -> &'static str {
        "creeping-rot"
    }

    fn on_enemy_defeated(&mut self, rng: &mut dyn DiceSource) -> Option<Hazard> {
        (rng.d6() <= ROT_MAX_FACE).then_some(Hazard {
            damage: ROT_DAMAGE,
            cause: DeathCause::Rot,
        })
    }
}

/// Fresh hook state for one visit to `key`.
#[must_use]
pub fn for_location(key: &str, enabled: bool) -> Box<dyn LocationEffects> {
    if !enabled {
        return Box::new(NoEffects);
    }
    match key {
        "wastes" => Box::new(ScorchingSun),
        "brume" => Box::new(Mists),
        "nightsea" => Box::new(NightseaPull::default()),
        "valthria" => Box::new(Thieves::default()),
        "spiremaze" => Box::new(PerilousClimb),
        "frozengaol" => Box::new(NumbHands),
        "rotglade" => Box::new(CreepingRot),
        _ => Box::new(NoEffects),
    }
}
