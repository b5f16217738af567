//! Tunable rules values, loaded from the embedded `rules.json`.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::MAX_BAG_SLOTS;

const DEFAULT_RULES_DATA: &str = include_str!("../data/rules.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "RulesConfig::default_start_hp")]
    pub start_hp: i32,
    #[serde(default = "RulesConfig::default_start_atk")]
    pub start_atk: i32,
    #[serde(default)]
    pub start_def: i32,
    #[serde(default = "RulesConfig::default_bag_cap")]
    pub item_cap: usize,
    #[serde(default = "RulesConfig::default_bag_cap")]
    pub equipment_cap: usize,
    #[serde(default = "RulesConfig::default_dragon_base_hp")]
    pub dragon_base_hp: i32,
    /// Gated boss fights end once HP drops below this.
    #[serde(default = "RulesConfig::default_exhaustion_hp")]
    pub exhaustion_hp: i32,
    #[serde(default = "RulesConfig::default_hollow_hp")]
    pub hollow_hp: i32,
    #[serde(default = "RulesConfig::default_beast_hp")]
    pub beast_hp: i32,
    #[serde(default = "RulesConfig::default_pit_target")]
    pub pit_target: u8,
    #[serde(default = "RulesConfig::default_pit_damage")]
    pub pit_damage: i32,
    #[serde(default = "RulesConfig::default_terror_hp_loss")]
    pub terror_hp_loss: i32,
    #[serde(default = "RulesConfig::default_phoenix_heal")]
    pub phoenix_heal: i32,
    #[serde(default = "RulesConfig::default_max_combat_rounds")]
    pub max_combat_rounds: u32,
    #[serde(default = "RulesConfig::default_max_boss_rounds")]
    pub max_boss_rounds: u32,
    /// Per-location hazards from the tabletop rules. Off for balance runs.
    #[serde(default)]
    pub location_effects: bool,
    #[serde(default = "RulesConfig::default_quest_injection")]
    pub quest_injection: bool,
}

/// Errors raised when rules configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RulesConfigError {
    #[error("{field} must be positive (got {value})")]
    NotPositive { field: &'static str, value: i64 },
    #[error("{field} must be between {min} and {max} (got {value})")]
    RangeViolation {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },
    #[error("failed to parse rules: {0}")]
    Parse(String),
}

impl RulesConfig {
    const fn default_start_hp() -> i32 {
        20
    }
    const fn default_start_atk() -> i32 {
        1
    }
    const fn default_bag_cap() -> usize {
        MAX_BAG_SLOTS
    }
    const fn default_dragon_base_hp() -> i32 {
        40
    }
    const fn default_exhaustion_hp() -> i32 {
        5
    }
    const fn default_hollow_hp() -> i32 {
        3
    }
    const fn default_beast_hp() -> i32 {
        5
    }
    const fn default_pit_target() -> u8 {
        4
    }
    const fn default_pit_damage() -> i32 {
        3
    }
    const fn default_terror_hp_loss() -> i32 {
        4
    }
    const fn default_phoenix_heal() -> i32 {
        10
    }
    const fn default_max_combat_rounds() -> u32 {
        200
    }
    const fn default_max_boss_rounds() -> u32 {
        500
    }
    const fn default_quest_injection() -> bool {
        true
    }

    /// Code defaults, used when the embedded data cannot be read.
    #[must_use]
    pub const fn builtin() -> Self {
        Self {
            start_hp: Self::default_start_hp(),
            start_atk: Self::default_start_atk(),
            start_def: 0,
            item_cap: Self::default_bag_cap(),
            equipment_cap: Self::default_bag_cap(),
            dragon_base_hp: Self::default_dragon_base_hp(),
            exhaustion_hp: Self::default_exhaustion_hp(),
            hollow_hp: Self::default_hollow_hp(),
            beast_hp: Self::default_beast_hp(),
            pit_target: Self::default_pit_target(),
            pit_damage: Self::default_pit_damage(),
            terror_hp_loss: Self::default_terror_hp_loss(),
            phoenix_heal: Self::default_phoenix_heal(),
            max_combat_rounds: Self::default_max_combat_rounds(),
            max_boss_rounds: Self::default_max_boss_rounds(),
            location_effects: false,
            quest_injection: Self::default_quest_injection(),
        }
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_RULES_DATA).unwrap_or_else(|_| Self::builtin())
    }

    /// Parse and validate a rules document.
    ///
    /// # Errors
    ///
    /// Returns [`RulesConfigError::Parse`] for malformed JSON and any
    /// validation error from [`RulesConfig::validate`].
    pub fn from_json(json: &str) -> Result<Self, RulesConfigError> {
        let cfg: Self =
            serde_json::from_str(json).map_err(|err| RulesConfigError::Parse(err.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    #[must_use]
    pub const fn with_location_effects(mut self, enabled: bool) -> Self {
        self.location_effects = enabled;
        self
    }

    /// Check the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns an error for non-positive HP pools or round caps, and for
    /// inventory caps outside `1..=2`.
    pub fn validate(&self) -> Result<(), RulesConfigError> {
        for (field, value) in [
            ("start_hp", self.start_hp),
            ("dragon_base_hp", self.dragon_base_hp),
            ("hollow_hp", self.hollow_hp),
            ("beast_hp", self.beast_hp),
        ] {
            if value <= 0 {
                return Err(RulesConfigError::NotPositive {
                    field,
                    value: i64::from(value),
                });
            }
        }
        for (field, value) in [
            ("max_combat_rounds", self.max_combat_rounds),
            ("max_boss_rounds", self.max_boss_rounds),
        ] {
            if value == 0 {
                return Err(RulesConfigError::NotPositive { field, value: 0 });
            }
        }
        for (field, value) in [
            ("item_cap", self.item_cap),
            ("equipment_cap", self.equipment_cap),
        ] {
            if !(1..=MAX_BAG_SLOTS).contains(&value) {
                return Err(RulesConfigError::RangeViolation {
                    field,
                    min: 1,
                    max: i64::try_from(MAX_BAG_SLOTS).unwrap_or(i64::MAX),
                    value: i64::try_from(value).unwrap_or(i64::MAX),
                });
            }
        }
        if !(1..=7).contains(&self.pit_target) {
            return Err(RulesConfigError::RangeViolation {
                field: "pit_target",
                min: 1,
                max: 7,
                value: i64::from(self.pit_target),
            });
        }
        Ok(())
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self::load_from_static()
    }
}
