//! Dragon fight
use serde::{Deserialize, Serialize};

use crate::combat::exchange;
use crate::config::RulesConfig;
use crate::player::PlayerState;
use crate::rng::DiceSource;
use crate::trace::DeathCause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DragonOutcome {
    Slain,
    Killed,
    Exhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossTrace {
    pub starting_hp: i32,
    pub hp_left: i32,
    pub rounds: u32,
    pub damage_dealt: i32,
    pub damage_taken: i64,
    /// Player blows could not land (missing sword or princess).
    pub gated: bool,
    pub sage_halved: bool,
    pub outcome: DragonOutcome,
}

/// `base + buried`, halved rounding up once the sage has been helped.
#[must_use]
pub fn dragon_hp(cfg: &RulesConfig, player: &PlayerState) -> i32 {
    let buried = i32::try_from(player.buried_count).unwrap_or(i32::MAX);
    let hp = cfg.dragon_base_hp.saturating_add(buried);
    if player.quest.sage_delivered {
        (hp + 1) / 2
    } else {
        hp
    }
}

/// Run the dragon fight to completion.
///
/// Returns the trace and, when the player did not survive, the cause and the
/// HP held just before the final blow.
pub fn fight_dragon(
    player: &mut PlayerState,
    rng: &mut dyn DiceSource,
    cfg: &RulesConfig,
) -> (BossTrace, Option<(DeathCause, i32)>) {
    let starting_hp = dragon_hp(cfg, player);
    let gated = !player.quest.boss_unlocked();
    let mut trace = BossTrace {
        starting_hp,
        hp_left: starting_hp,
        rounds: 0,
        damage_dealt: 0,
        damage_taken: 0,
        gated,
        sage_halved: player.quest.sage_delivered,
        outcome: DragonOutcome::Exhausted,
    };

    while trace.rounds < cfg.max_boss_rounds {
        trace.rounds += 1;
        let player_roll = rng.d6();
        let dragon_roll = rng.d6();
        let round = exchange(player, player_roll, dragon_roll, rng);

        let dealt = if gated { 0 } else { round.player_damage };
        trace.hp_left -= dealt;
        trace.damage_dealt += dealt;

        if round.enemy_damage > 0 {
            let hurt = player.take_damage(round.enemy_damage);
            trace.damage_taken += i64::from(hurt.dealt);
            if player.is_dead() {
                trace.outcome = DragonOutcome::Killed;
                return (trace, Some((DeathCause::Dragon, hurt.hp_before)));
            }
        }
        if trace.hp_left <= 0 {
            trace.outcome = DragonOutcome::Slain;
            return (trace, None);
        }
        if gated && player.hp < cfg.exhaustion_hp {
            let hp_before = player.hp;
            player.hp = 0;
            trace.outcome = DragonOutcome::Exhausted;
            return (trace, Some((DeathCause::Exhaustion, hp_before)));
        }
    }

    log::debug!(
        "dragon fight hit the {} round cap with dragon at {}",
        cfg.max_boss_rounds,
        trace.hp_left
    );
    let hp_before = player.hp;
    player.hp = 0;
    (trace, Some((DeathCause::Exhaustion, hp_before)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ParkMiller;

    fn player() -> PlayerState {
        PlayerState::new(&RulesConfig::builtin())
    }

    #[test]
    fn hp_scales_with_buried_and_sage() {
        let cfg = RulesConfig::builtin();
        let mut p = player();
        assert_eq!(dragon_hp(&cfg, &p), 40);
        p.buried_count = 3;
        assert_eq!(dragon_hp(&cfg, &p), 43);
        p.quest.sage_delivered = true;
        assert_eq!(dragon_hp(&cfg, &p), 22);
    }

    #[test]
    fn gated_fight_never_damages_dragon() {
        let cfg = RulesConfig::builtin();
        for seed in 1..50 {
            let mut p = player();
            p.atk = 50;
            p.quest.have_sword = true;
            let (trace, death) = fight_dragon(&mut p, &mut ParkMiller::new(seed), &cfg);
            assert!(trace.gated);
            assert_eq!(trace.damage_dealt, 0);
            assert_eq!(trace.hp_left, trace.starting_hp);
            assert_ne!(trace.outcome, DragonOutcome::Slain);
            assert!(death.is_some());
            assert!(p.is_dead());
        }
    }

    #[test]
    fn unlocked_fight_can_be_won() {
        let cfg = RulesConfig::builtin();
        let mut p = player();
        p.atk = 40;
        p.hp = 500;
        p.max_hp = 500;
        p.quest.have_sword = true;
        p.quest.princess_delivered = true;
        let (trace, death) = fight_dragon(&mut p, &mut ParkMiller::new(7), &cfg);
        assert_eq!(trace.outcome, DragonOutcome::Slain);
        assert!(death.is_none());
        assert!(trace.damage_dealt >= trace.starting_hp);
    }

    #[test]
    fn round_cap_ends_in_exhaustion() {
        let mut cfg = RulesConfig::builtin();
        cfg.max_boss_rounds = 1;
        let mut p = player();
        p.hp = 1_000;
        p.max_hp = 1_000;
        p.quest.have_sword = true;
        p.quest.princess_delivered = true;
        let (trace, death) = fight_dragon(&mut p, &mut ParkMiller::new(3), &cfg);
        assert_eq!(trace.rounds, 1);
        assert_eq!(trace.outcome, DragonOutcome::Exhausted);
        assert_eq!(death.map(|d| d.0), Some(DeathCause::Exhaustion));
        assert_eq!(p.hp, 0);
    }
}
