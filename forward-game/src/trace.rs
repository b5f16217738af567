//! Per-run records produced by the run driver and consumed by the batch harness.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::boss::BossTrace;
use crate::card::CardKind;
use crate::player::QuestFlags;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeathCause {
    Combat,
    Pit,
    Terror,
    Dragon,
    Exhaustion,
    Scorch,
    Rot,
    Climb,
}

impl DeathCause {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::Pit => "pit",
            Self::Terror => "terror",
            Self::Dragon => "dragon",
            Self::Exhaustion => "exhaustion",
            Self::Scorch => "scorch",
            Self::Rot => "rot",
            Self::Climb => "climb",
        }
    }
}

impl fmt::Display for DeathCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a run ended when it did not end in victory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Death {
    pub cause: DeathCause,
    /// Kind of the tile that dealt the final blow, if any.
    pub tile_kind: Option<CardKind>,
    pub enemy: Option<String>,
    /// `None` for deaths at the dragon.
    pub location_index: Option<usize>,
    pub hp_before: i32,
}

/// Event counters for one location visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCounters {
    pub combat_starts: u32,
    pub combat_rounds: u32,
    pub combat_damage_taken: i64,
    pub stalemates: u32,
    pub pit_attempts: u32,
    pub pit_deaths: u32,
    pub terror_hp_choices: u32,
    pub terror_buries: u32,
    pub terror_deaths: u32,
    pub snare_tiles: u32,
    pub snare_applied: u32,
    pub buried: u32,
}

/// Stats captured when the player walks out of a location alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationExit {
    pub hp: i32,
    pub max_hp: i32,
    pub xp: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationTrace {
    pub index: usize,
    pub key: String,
    pub entry_hp: i32,
    pub exit: Option<LocationExit>,
    /// Traversal ran out of face-down tiles.
    pub cleared: bool,
    /// Traversal stopped with face-down tiles nobody could reach.
    pub stalled: bool,
    /// All nine tiles resolved; the clear bonus was paid.
    pub fully_resolved: bool,
    pub counters: LocationCounters,
}

impl LocationTrace {
    #[must_use]
    pub fn enter(index: usize, key: &str, entry_hp: i32) -> Self {
        Self {
            index,
            key: key.to_string(),
            entry_hp,
            exit: None,
            cleared: false,
            stalled: false,
            fully_resolved: false,
            counters: LocationCounters::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunOutcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub seed: i64,
    pub outcome: RunOutcome,
    pub reached_dragon: bool,
    pub hp: i32,
    pub max_hp: i32,
    pub xp: i32,
    pub atk: i32,
    pub def: i32,
    pub buried: u32,
    pub combats: u32,
    pub combat_rounds: u32,
    pub stalemates: u32,
    pub locations_cleared: u32,
    pub stalled_locations: u32,
    pub location_order: Vec<String>,
    pub locations: Vec<LocationTrace>,
    pub quest: QuestFlags,
    pub death: Option<Death>,
    pub boss: Option<BossTrace>,
}

impl RunResult {
    #[must_use]
    pub const fn won(&self) -> bool {
        matches!(self.outcome, RunOutcome::Victory)
    }

    #[must_use]
    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death.as_ref().map(|d| d.cause)
    }

    /// Reached the dragon holding both boss-unlock flags.
    #[must_use]
    pub const fn dragon_with_prereqs(&self) -> bool {
        self.reached_dragon && self.quest.boss_unlocked()
    }
}
