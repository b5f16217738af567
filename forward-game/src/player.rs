//! Player state threaded through every resolver.
//!
//! One [`PlayerState`] exists per run. Inventory bags are capped by the rules
//! config and never grow past [`MAX_BAG_SLOTS`].

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::card::{ANCIENT_SWORD, Card, QuestNpc};
use crate::config::RulesConfig;
use crate::constants::MAX_BAG_SLOTS;

pub type Bag = SmallVec<[Card; MAX_BAG_SLOTS]>;

/// The three boss-gating flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestFlags {
    pub have_sword: bool,
    pub princess_delivered: bool,
    pub sage_delivered: bool,
}

impl QuestFlags {
    /// Player blows only land on the dragon with both of these.
    #[must_use]
    pub const fn boss_unlocked(self) -> bool {
        self.have_sword && self.princess_delivered
    }

    #[must_use]
    pub const fn delivered(self, npc: QuestNpc) -> bool {
        match npc {
            QuestNpc::GhostlyPrincess => self.princess_delivered,
            QuestNpc::Sage => self.sage_delivered,
        }
    }
}

/// What happened to an item card on pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pickup {
    Stored,
    /// Bag full; the item's heal was applied on the spot.
    AutoUsed,
    /// Bag full and nothing to use; converted to XP.
    Discarded,
}

/// Result of a damage application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hurt {
    pub dealt: i32,
    pub hp_before: i32,
    pub phoenix: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub hp: i32,
    pub max_hp: i32,
    pub xp: i32,
    pub atk: i32,
    pub def: i32,
    pub buried_count: u32,
    pub snare_misses: u8,
    pub snare_double: bool,
    pub normal_hit_on_1: bool,
    pub block_on_12: bool,
    pub quest: QuestFlags,
    equipment: Bag,
    items: Bag,
    item_cap: usize,
    equipment_cap: usize,
    phoenix_heal: i32,
}

impl PlayerState {
    #[must_use]
    pub fn new(cfg: &RulesConfig) -> Self {
        Self {
            hp: cfg.start_hp,
            max_hp: cfg.start_hp,
            xp: 0,
            atk: cfg.start_atk,
            def: cfg.start_def,
            buried_count: 0,
            snare_misses: 0,
            snare_double: false,
            normal_hit_on_1: false,
            block_on_12: false,
            quest: QuestFlags::default(),
            equipment: Bag::new(),
            items: Bag::new(),
            item_cap: cfg.item_cap.clamp(1, MAX_BAG_SLOTS),
            equipment_cap: cfg.equipment_cap.clamp(1, MAX_BAG_SLOTS),
            phoenix_heal: cfg.phoenix_heal,
        }
    }

    #[must_use]
    pub fn equipment(&self) -> &[Card] {
        &self.equipment
    }

    #[must_use]
    pub fn items(&self) -> &[Card] {
        &self.items
    }

    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.hp <= 0
    }

    #[must_use]
    pub fn has_phoenix_tear(&self) -> bool {
        self.items.iter().any(Card::phoenix_tear)
    }

    #[must_use]
    pub const fn snare_active(&self) -> bool {
        self.snare_misses > 0 || self.snare_double
    }

    /// Every XP award also raises max HP by the same amount.
    pub fn award_xp(&mut self, gain: i32) {
        let gain = gain.max(0);
        self.xp += gain;
        self.max_hp += gain;
    }

    pub fn heal(&mut self, amount: i32) {
        if amount > 0 {
            self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        }
    }

    pub fn full_heal(&mut self) {
        self.hp = self.max_hp;
    }

    /// Subtract `amount` (negative amounts are ignored). A held phoenix tear
    /// is spent the first time HP drops to zero or below.
    pub fn take_damage(&mut self, amount: i32) -> Hurt {
        let hp_before = self.hp;
        let dealt = amount.max(0);
        self.hp -= dealt;
        let mut phoenix = false;
        if self.hp <= 0
            && let Some(pos) = self.items.iter().position(Card::phoenix_tear)
        {
            self.items.remove(pos);
            self.hp = self.hp.saturating_add(self.phoenix_heal).min(self.max_hp);
            phoenix = true;
        }
        Hurt {
            dealt,
            hp_before,
            phoenix,
        }
    }

    /// Equip `card`. When the bag overflows the oldest piece is unequipped,
    /// loses its bonuses and goes to XP; it is returned.
    pub fn equip(&mut self, card: Card) -> Option<Card> {
        let evicted = if self.equipment.len() >= self.equipment_cap {
            let old = self.equipment.remove(0);
            self.atk -= old.atk_bonus();
            self.def -= old.def_bonus();
            self.award_xp(old.xp());
            Some(old)
        } else {
            None
        };
        self.atk += card.atk_bonus();
        self.def += card.def_bonus();
        if card.is_named(ANCIENT_SWORD) {
            self.quest.have_sword = true;
        }
        self.award_xp(card.xp());
        self.equipment.push(card);
        evicted
    }

    /// Put an item in the bag, or on overflow use/discard it for XP.
    pub fn pick_up(&mut self, card: Card) -> Pickup {
        if self.items.len() < self.item_cap {
            self.items.push(card);
            return Pickup::Stored;
        }
        let outcome = if let Some(heal) = card.heal() {
            self.heal(heal);
            Pickup::AutoUsed
        } else {
            Pickup::Discarded
        };
        self.award_xp(card.xp());
        outcome
    }

    /// Hand the wanted equipment to `npc` if it is equipped. Bonuses go with it.
    pub fn deliver(&mut self, npc: QuestNpc) -> bool {
        let Some(pos) = self
            .equipment
            .iter()
            .position(|card| card.is_named(npc.wanted_item()))
        else {
            return false;
        };
        let card = self.equipment.remove(pos);
        self.atk -= card.atk_bonus();
        self.def -= card.def_bonus();
        match npc {
            QuestNpc::GhostlyPrincess => self.quest.princess_delivered = true,
            QuestNpc::Sage => self.quest.sage_delivered = true,
        }
        true
    }

    /// Returns `true` if a snare debuff was armed.
    pub fn arm_snare(&mut self, card: &Card) -> bool {
        let misses = card.snare_miss_first();
        let double = card.snare_double_first_incoming();
        if misses > 0 {
            self.snare_misses = misses;
        }
        if double {
            self.snare_double = true;
        }
        misses > 0 || double
    }

    pub fn cleanse(&mut self) {
        self.snare_misses = 0;
        self.snare_double = false;
    }

    /// Apply a blessing card's flags. Healing is handled by the caller.
    pub fn bless(&mut self, card: &Card) {
        if card.cleanses_snare() {
            self.cleanse();
        }
        if card.normal_hit_on_1() {
            self.normal_hit_on_1 = true;
        }
        if card.block_on_12() {
            self.block_on_12 = true;
        }
    }
}
