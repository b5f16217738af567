//! Typed card records.
//!
//! Card text is decoded into [`Effect`] tags once, when the catalog is built.
//! The resolution engine only ever matches on these tags.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Hollow,
    Beast,
    Scene,
    Pit,
    Snare,
    Terror,
    Blessing,
    Item,
    Equipment,
    Special,
    Location,
}

impl CardKind {
    pub const ALL: [Self; 11] = [
        Self::Hollow,
        Self::Beast,
        Self::Scene,
        Self::Pit,
        Self::Snare,
        Self::Terror,
        Self::Blessing,
        Self::Item,
        Self::Equipment,
        Self::Special,
        Self::Location,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hollow => "hollow",
            Self::Beast => "beast",
            Self::Scene => "scene",
            Self::Pit => "pit",
            Self::Snare => "snare",
            Self::Terror => "terror",
            Self::Blessing => "blessing",
            Self::Item => "item",
            Self::Equipment => "equipment",
            Self::Special => "special",
            Self::Location => "location",
        }
    }

    #[must_use]
    pub const fn is_enemy(self) -> bool {
        matches!(self, Self::Hollow | Self::Beast)
    }
}

impl fmt::Display for CardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "value", rename_all = "camelCase")]
pub enum Effect {
    /// Enemy HP pool for hollow/beast cards.
    EnemyHp(i32),
    Atk(i32),
    Def(i32),
    Heal(i32),
    FullHeal,
    /// Force the next N player rolls to 1.
    SnareMissFirst(u8),
    /// Double the next nonzero incoming hit.
    SnareDoubleFirstIncoming,
    CleansesSnare,
    NormalHitOn1,
    BlockOn12,
    TerrorHpLoss(i32),
    /// Pit save target: a d6 below this fails.
    PitTarget(u8),
    PitDamage(i32),
    Xp(i32),
    /// Held item: heal when HP first hits 0.
    PhoenixTear,
}

/// Quest NPCs that accept one named piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestNpc {
    GhostlyPrincess,
    Sage,
}

impl QuestNpc {
    pub const ALL: [Self; 2] = [Self::GhostlyPrincess, Self::Sage];

    #[must_use]
    pub const fn card_name(self) -> &'static str {
        match self {
            Self::GhostlyPrincess => "Ghostly Princess",
            Self::Sage => "Sage",
        }
    }

    #[must_use]
    pub const fn wanted_item(self) -> &'static str {
        match self {
            Self::GhostlyPrincess => "Gilded Bangle",
            Self::Sage => "Ferryman's Bell",
        }
    }

    fn matches(self, name: &str) -> bool {
        let key = name_key(name);
        match self {
            Self::GhostlyPrincess => key.contains("ghostly princess"),
            Self::Sage => key == "sage",
        }
    }
}

pub const ANCIENT_SWORD: &str = "Ancient Sword";

/// Lowercased name with apostrophes stripped, so "Ferrymans Bell" and
/// "Ferryman's Bell" compare equal.
fn name_key(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '\'' && *c != '\u{2019}')
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub name: String,
    pub kind: CardKind,
    /// Location key this card belongs to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

impl Card {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: CardKind) -> Self {
        Self {
            name: name.into(),
            kind,
            location: None,
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Case-insensitive substring match on the card name.
    #[must_use]
    pub fn is_named(&self, needle: &str) -> bool {
        name_key(&self.name).contains(&name_key(needle))
    }

    #[must_use]
    pub fn quest_npc(&self) -> Option<QuestNpc> {
        QuestNpc::ALL.into_iter().find(|npc| npc.matches(&self.name))
    }

    fn first_positive(&self, pick: impl Fn(&Effect) -> Option<i32>) -> Option<i32> {
        self.effects.iter().filter_map(pick).find(|v| *v > 0)
    }

    fn has(&self, effect: Effect) -> bool {
        self.effects.contains(&effect)
    }

    #[must_use]
    pub fn enemy_hp(&self) -> Option<i32> {
        self.first_positive(|e| match e {
            Effect::EnemyHp(v) => Some(*v),
            _ => None,
        })
    }

    #[must_use]
    pub fn atk_bonus(&self) -> i32 {
        self.effects
            .iter()
            .map(|e| if let Effect::Atk(v) = e { *v } else { 0 })
            .sum()
    }

    #[must_use]
    pub fn def_bonus(&self) -> i32 {
        self.effects
            .iter()
            .map(|e| if let Effect::Def(v) = e { *v } else { 0 })
            .sum()
    }

    #[must_use]
    pub fn heal(&self) -> Option<i32> {
        self.first_positive(|e| match e {
            Effect::Heal(v) => Some(*v),
            _ => None,
        })
    }

    #[must_use]
    pub fn full_heal(&self) -> bool {
        self.has(Effect::FullHeal)
    }

    #[must_use]
    pub fn snare_miss_first(&self) -> u8 {
        self.effects
            .iter()
            .find_map(|e| match e {
                Effect::SnareMissFirst(n) if *n > 0 => Some(*n),
                _ => None,
            })
            .unwrap_or(0)
    }

    #[must_use]
    pub fn snare_double_first_incoming(&self) -> bool {
        self.has(Effect::SnareDoubleFirstIncoming)
    }

    #[must_use]
    pub fn cleanses_snare(&self) -> bool {
        self.has(Effect::CleansesSnare)
    }

    #[must_use]
    pub fn normal_hit_on_1(&self) -> bool {
        self.has(Effect::NormalHitOn1)
    }

    #[must_use]
    pub fn block_on_12(&self) -> bool {
        self.has(Effect::BlockOn12)
    }

    #[must_use]
    pub fn phoenix_tear(&self) -> bool {
        self.has(Effect::PhoenixTear)
    }

    #[must_use]
    pub fn terror_hp_loss(&self) -> Option<i32> {
        self.first_positive(|e| match e {
            Effect::TerrorHpLoss(v) => Some(*v),
            _ => None,
        })
    }

    #[must_use]
    pub fn pit_target(&self) -> Option<u8> {
        self.effects.iter().find_map(|e| match e {
            Effect::PitTarget(v) if *v > 0 => Some(*v),
            _ => None,
        })
    }

    #[must_use]
    pub fn pit_damage(&self) -> Option<i32> {
        self.first_positive(|e| match e {
            Effect::PitDamage(v) => Some(*v),
            _ => None,
        })
    }

    /// XP granted when this card goes to the XP pile. Absent or zero means 1.
    #[must_use]
    pub fn xp(&self) -> i32 {
        self.first_positive(|e| match e {
            Effect::Xp(v) => Some(*v),
            _ => None,
        })
        .unwrap_or(1)
    }
}
