//! Duel combat: both sides roll a d6 each round and read the duel table.
use serde::{Deserialize, Serialize};

use crate::constants::{BLOCK_MAX_FACE, DAMAGE_COUNTER, DAMAGE_CRIT, DAMAGE_HIT, NORMAL_HIT_FACE};
use crate::effects::{Hazard, LocationEffects};
use crate::player::PlayerState;
use crate::rng::DiceSource;
use crate::trace::DeathCause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Duel {
    Miss,
    Parry,
    Hit,
    Crit,
    Counter,
}

impl Duel {
    #[must_use]
    pub const fn from_roll(roll: u8) -> Self {
        match roll {
            0 | 1 => Self::Miss,
            2 => Self::Parry,
            3 | 4 => Self::Hit,
            5 => Self::Crit,
            _ => Self::Counter,
        }
    }

    #[must_use]
    pub const fn base_damage(self) -> i32 {
        match self {
            Self::Miss | Self::Parry => 0,
            Self::Hit => DAMAGE_HIT,
            Self::Crit => DAMAGE_CRIT,
            Self::Counter => DAMAGE_COUNTER,
        }
    }
}

/// One round of rolls after every modifier has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exchange {
    pub player_roll: u8,
    pub enemy_roll: u8,
    pub player: Duel,
    pub enemy: Duel,
    pub player_damage: i32,
    pub enemy_damage: i32,
    pub doubled: bool,
    pub blocked: bool,
}

/// Work out one round from already-rolled dice.
///
/// Modifier order: snare forced miss, normal hit on 1, duel table, ATK on a
/// landed blow, mutual counter clash, DEF, snare double, block on 1-2.
/// Consumes one-shot snare state on `player`; only the block roll draws
/// from `rng`.
pub fn exchange(
    player: &mut PlayerState,
    player_roll: u8,
    enemy_roll: u8,
    rng: &mut dyn DiceSource,
) -> Exchange {
    let mut roll = player_roll;
    if player.snare_misses > 0 {
        roll = 1;
        player.snare_misses -= 1;
    }
    if player.normal_hit_on_1 && roll == 1 {
        roll = NORMAL_HIT_FACE;
    }

    let mine = Duel::from_roll(roll);
    let theirs = Duel::from_roll(enemy_roll);
    let mut player_damage = mine.base_damage();
    let mut enemy_damage = theirs.base_damage();

    if player_damage > 0 {
        player_damage = (player_damage + player.atk).max(0);
    }
    if mine == Duel::Counter && theirs == Duel::Counter {
        player_damage = 0;
        enemy_damage = 0;
    }
    enemy_damage = (enemy_damage - player.def).max(0);

    let mut doubled = false;
    if player.snare_double && enemy_damage > 0 {
        enemy_damage *= 2;
        player.snare_double = false;
        doubled = true;
    }

    let mut blocked = false;
    if player.block_on_12 && enemy_damage > 0 && rng.d6() <= BLOCK_MAX_FACE {
        enemy_damage = 0;
        blocked = true;
    }

    Exchange {
        player_roll: roll,
        enemy_roll,
        player: mine,
        enemy: theirs,
        player_damage,
        enemy_damage,
        doubled,
        blocked,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CombatOutcome {
    Victory,
    Defeat,
    /// Round cap reached with both sides standing; the player withdraws.
    Stalemate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombatReport {
    pub outcome: CombatOutcome,
    pub rounds: u32,
    pub damage_taken: i64,
    pub enemy_hp_left: i32,
    /// Set on defeat: what landed the killing blow and HP just before it.
    pub fatal: Option<(DeathCause, i32)>,
}

/// Fight an enemy with `enemy_hp` until one side drops or `max_rounds` pass.
pub fn fight(
    player: &mut PlayerState,
    enemy_hp: i32,
    rng: &mut dyn DiceSource,
    effects: &mut dyn LocationEffects,
    max_rounds: u32,
) -> CombatReport {
    let mut enemy_hp = enemy_hp;
    let mut rounds = 0;
    let mut damage_taken = 0_i64;

    while rounds < max_rounds {
        rounds += 1;
        let raw = rng.d6();
        let enemy_roll = rng.d6();
        let adjusted = effects.adjust_player_roll(raw, rounds, player.def);
        let round = exchange(player, adjusted.roll, enemy_roll, rng);

        enemy_hp -= round.player_damage;
        if let Some(Hazard { damage, cause }) = adjusted.hazard {
            let hurt = player.take_damage(damage);
            if player.is_dead() {
                return CombatReport {
                    outcome: CombatOutcome::Defeat,
                    rounds,
                    damage_taken,
                    enemy_hp_left: enemy_hp,
                    fatal: Some((cause, hurt.hp_before)),
                };
            }
        }
        if round.enemy_damage > 0 {
            let hurt = player.take_damage(round.enemy_damage);
            damage_taken += i64::from(hurt.dealt);
            if player.is_dead() {
                return CombatReport {
                    outcome: CombatOutcome::Defeat,
                    rounds,
                    damage_taken,
                    enemy_hp_left: enemy_hp,
                    fatal: Some((DeathCause::Combat, hurt.hp_before)),
                };
            }
        }
        if enemy_hp <= 0 {
            return CombatReport {
                outcome: CombatOutcome::Victory,
                rounds,
                damage_taken,
                enemy_hp_left: enemy_hp,
                fatal: None,
            };
        }
    }

    log::debug!("combat stalemate after {rounds} rounds, enemy at {enemy_hp}");
    CombatReport {
        outcome: CombatOutcome::Stalemate,
        rounds,
        damage_taken,
        enemy_hp_left: enemy_hp,
        fatal: None,
    }
}
