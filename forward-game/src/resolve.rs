//! Tile resolution: the card-kind dispatch table.
//!
//! Every handler works on a tile in state [`TileState::Revealed`] and leaves
//! it resolved, buried, or (for active snares and drawn-out fights) still
//! revealed. Anything else is already settled and resolving it again does
//! nothing.

use serde::{Deserialize, Serialize};

use crate::board::{Board, TileState};
use crate::card::{Card, CardKind};
use crate::combat::{CombatOutcome, fight};
use crate::config::RulesConfig;
use crate::constants::LOCATION_CLEAR_XP;
use crate::effects::{Hazard, LocationEffects, RevealAction};
use crate::player::PlayerState;
use crate::rng::DiceSource;
use crate::trace::{Death, DeathCause, LocationTrace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Resolution {
    /// Tile was not in the revealed state; nothing happened.
    AlreadySettled,
    Resolved,
    Buried,
    /// Tile stays revealed: an armed snare or a fight that hit the round cap.
    Pending,
    Died,
}

/// Everything a handler may touch while resolving one tile.
pub struct Encounter<'a> {
    pub player: &'a mut PlayerState,
    pub rng: &'a mut dyn DiceSource,
    pub config: &'a RulesConfig,
    pub effects: &'a mut dyn LocationEffects,
    pub trace: &'a mut LocationTrace,
    pub death: Option<Death>,
}

impl Encounter<'_> {
    /// Apply damage; records the first death. Returns `true` if the player died.
    fn hurt(&mut self, amount: i32, cause: DeathCause, card: Option<&Card>) -> bool {
        let hurt = self.player.take_damage(amount);
        if hurt.phoenix {
            log::debug!("phoenix tear spent at {}", self.trace.key);
        }
        if self.player.is_dead() {
            self.record_death(cause, card, hurt.hp_before);
            return true;
        }
        false
    }

    fn record_death(&mut self, cause: DeathCause, card: Option<&Card>, hp_before: i32) {
        if self.death.is_none() {
            self.death = Some(Death {
                cause,
                tile_kind: card.map(|c| c.kind),
                enemy: card.filter(|c| c.kind.is_enemy()).map(|c| c.name.clone()),
                location_index: Some(self.trace.index),
                hp_before,
            });
        }
    }

    fn apply_hazard(&mut self, hazard: Option<Hazard>, card: Option<&Card>) -> bool {
        hazard.is_some_and(|h| self.hurt(h.damage, h.cause, card))
    }

    fn bury(&mut self, board: &mut Board, idx: usize) -> Resolution {
        let Some(tile) = board.tile_mut(idx) else {
            return Resolution::AlreadySettled;
        };
        if !tile.advance(TileState::Buried) {
            return Resolution::AlreadySettled;
        }
        self.player.buried_count += 1;
        self.trace.counters.buried += 1;
        Resolution::Buried
    }
}

/// Take a player turn on face-down tile `chosen`: run turn-start hooks, turn
/// the (possibly redirected) tile over and resolve it.
pub fn reveal(
    board: &mut Board,
    chosen: usize,
    legal: &[usize],
    enc: &mut Encounter<'_>,
) -> Resolution {
    let hazard = enc.effects.on_turn_start(enc.rng);
    if enc.apply_hazard(hazard, None) {
        return Resolution::Died;
    }
    let action = enc.effects.on_reveal(chosen, legal, enc.rng);
    let (RevealAction::Resolve(idx) | RevealAction::Bury(idx)) = action;
    let turned = board
        .tile_mut(idx)
        .is_some_and(|tile| tile.advance(TileState::Revealed));
    if !turned {
        return Resolution::AlreadySettled;
    }
    match action {
        RevealAction::Bury(_) => {
            let outcome = enc.bury(board, idx);
            settle(board, enc);
            outcome
        }
        RevealAction::Resolve(_) => resolve_tile(board, idx, enc),
    }
}

/// Resolve the revealed tile at `idx`.
pub fn resolve_tile(board: &mut Board, idx: usize, enc: &mut Encounter<'_>) -> Resolution {
    let Some(tile) = board.tile(idx) else {
        return Resolution::AlreadySettled;
    };
    if tile.state() != TileState::Revealed {
        return Resolution::AlreadySettled;
    }
    let card = tile.card.clone();

    let outcome = if let Some(npc) = card.quest_npc() {
        if enc.player.deliver(npc) {
            log::debug!("delivered {} to {}", npc.wanted_item(), npc.card_name());
        }
        enc.player.award_xp(card.xp());
        Resolution::Resolved
    } else {
        match card.kind {
            CardKind::Hollow | CardKind::Beast => resolve_combat(&card, enc),
            CardKind::Scene => {
                if card.full_heal() {
                    enc.player.full_heal();
                } else if let Some(heal) = card.heal() {
                    enc.player.heal(heal);
                }
                enc.player.award_xp(card.xp());
                Resolution::Resolved
            }
            CardKind::Pit => resolve_pit(&card, enc),
            CardKind::Terror => resolve_terror(board, idx, &card, enc),
            CardKind::Snare => {
                enc.trace.counters.snare_tiles += 1;
                if enc.player.arm_snare(&card) {
                    enc.trace.counters.snare_applied += 1;
                }
                Resolution::Pending
            }
            CardKind::Blessing => {
                enc.player.bless(&card);
                if card.full_heal() {
                    enc.player.full_heal();
                } else if let Some(heal) = card.heal() {
                    enc.player.heal(heal);
                }
                enc.player.award_xp(card.xp());
                Resolution::Resolved
            }
            CardKind::Item => {
                if enc.effects.on_pickup(enc.rng) {
                    log::debug!("{} stolen at {}", card.name, enc.trace.key);
                    let buried = enc.bury(board, idx);
                    enc.effects.on_bury();
                    buried
                } else {
                    enc.player.pick_up(card);
                    Resolution::Resolved
                }
            }
            CardKind::Equipment => {
                enc.player.equip(card);
                Resolution::Resolved
            }
            CardKind::Special | CardKind::Location => {
                enc.player.award_xp(card.xp());
                Resolution::Resolved
            }
        }
    };

    if matches!(outcome, Resolution::Resolved | Resolution::Died)
        && let Some(tile) = board.tile_mut(idx)
    {
        tile.advance(TileState::Resolved);
    }
    if !enc.player.is_dead() {
        settle(board, enc);
    }
    if enc.player.is_dead() {
        Resolution::Died
    } else {
        outcome
    }
}

fn resolve_combat(card: &Card, enc: &mut Encounter<'_>) -> Resolution {
    let enemy_hp = card.enemy_hp().unwrap_or(match card.kind {
        CardKind::Beast => enc.config.beast_hp,
        _ => enc.config.hollow_hp,
    });
    enc.trace.counters.combat_starts += 1;
    let report = fight(
        enc.player,
        enemy_hp,
        enc.rng,
        enc.effects,
        enc.config.max_combat_rounds,
    );
    enc.trace.counters.combat_rounds += report.rounds;
    enc.trace.counters.combat_damage_taken += report.damage_taken;

    match report.outcome {
        CombatOutcome::Victory => {
            let hazard = enc.effects.on_enemy_defeated(enc.rng);
            if enc.apply_hazard(hazard, Some(card)) {
                return Resolution::Died;
            }
            enc.player.award_xp(card.xp());
            Resolution::Resolved
        }
        CombatOutcome::Defeat => {
            let (cause, hp_before) = report.fatal.unwrap_or((DeathCause::Combat, enc.player.hp));
            enc.record_death(cause, Some(card), hp_before);
            Resolution::Died
        }
        CombatOutcome::Stalemate => {
            enc.trace.counters.stalemates += 1;
            log::debug!(
                "{} left standing at {} after {} rounds",
                card.name,
                enc.trace.key,
                report.rounds
            );
            Resolution::Pending
        }
    }
}

fn resolve_pit(card: &Card, enc: &mut Encounter<'_>) -> Resolution {
    enc.trace.counters.pit_attempts += 1;
    let target = card.pit_target().unwrap_or(enc.config.pit_target);
    let roll = enc.rng.d6();
    if roll < target {
        let damage = card.pit_damage().unwrap_or(enc.config.pit_damage);
        if enc.hurt(damage, DeathCause::Pit, Some(card)) {
            enc.trace.counters.pit_deaths += 1;
        }
    }
    enc.player.award_xp(card.xp());
    if enc.player.is_dead() {
        Resolution::Died
    } else {
        Resolution::Resolved
    }
}

fn resolve_terror(
    board: &mut Board,
    idx: usize,
    card: &Card,
    enc: &mut Encounter<'_>,
) -> Resolution {
    let loss = card.terror_hp_loss().unwrap_or(enc.config.terror_hp_loss);
    if enc.player.hp > loss + 1 {
        enc.trace.counters.terror_hp_choices += 1;
        if enc.hurt(loss, DeathCause::Terror, Some(card)) {
            enc.trace.counters.terror_deaths += 1;
            return Resolution::Died;
        }
        enc.player.award_xp(card.xp());
        Resolution::Resolved
    } else {
        enc.trace.counters.terror_buries += 1;
        let buried = enc.bury(board, idx);
        enc.effects.on_bury();
        buried
    }
}

/// Promote spent snares and pay the clear bonus once the board is done.
fn settle(board: &mut Board, enc: &mut Encounter<'_>) {
    if !enc.player.snare_active() {
        for idx in board.open_snares() {
            if let Some(tile) = board.tile_mut(idx)
                && tile.advance(TileState::Resolved)
            {
                let xp = tile.card.xp();
                enc.player.award_xp(xp);
            }
        }
    }
    if !enc.trace.fully_resolved && board.all_resolved() {
        enc.trace.fully_resolved = true;
        enc.player.award_xp(LOCATION_CLEAR_XP);
        log::debug!("{} fully resolved", enc.trace.key);
    }
}
