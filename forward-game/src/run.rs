//! One full game for one seed: nine locations in shuffled order, then the dragon.
use crate::board::Board;
use crate::boss::fight_dragon;
use crate::catalog::CardCatalog;
use crate::config::RulesConfig;
use crate::effects;
use crate::location::{LocationTemplate, SHIPPED_LOCATIONS};
use crate::player::PlayerState;
use crate::resolve::{Encounter, Resolution, resolve_tile, reveal};
use crate::rng::{ParkMiller, pick, shuffle};
use crate::trace::{Death, LocationExit, LocationTrace, RunOutcome, RunResult};

/// Play a full run for `seed` with the default rules.
#[must_use]
pub fn run_game(seed: i64, catalog: &CardCatalog) -> RunResult {
    run_game_with(seed, catalog, &RulesConfig::default())
}

/// Play a full run for `seed` under `config`.
#[must_use]
pub fn run_game_with(seed: i64, catalog: &CardCatalog, config: &RulesConfig) -> RunResult {
    let mut rng = ParkMiller::new(seed);
    let mut player = PlayerState::new(config);

    let mut order: Vec<&'static LocationTemplate> = SHIPPED_LOCATIONS.iter().collect();
    shuffle(&mut rng, &mut order);

    let mut result = RunResult {
        seed,
        outcome: RunOutcome::Defeat,
        reached_dragon: false,
        hp: player.hp,
        max_hp: player.max_hp,
        xp: 0,
        atk: player.atk,
        def: player.def,
        buried: 0,
        combats: 0,
        combat_rounds: 0,
        stalemates: 0,
        locations_cleared: 0,
        stalled_locations: 0,
        location_order: order.iter().map(|loc| loc.key.to_string()).collect(),
        locations: Vec::with_capacity(order.len()),
        quest: player.quest,
        death: None,
        boss: None,
    };

    for (index, template) in order.into_iter().enumerate() {
        let (trace, death) = play_location(index, template, catalog, config, &mut player, &mut rng);
        result.combats += trace.counters.combat_starts;
        result.combat_rounds += trace.counters.combat_rounds;
        result.stalemates += trace.counters.stalemates;
        result.locations_cleared += u32::from(trace.cleared);
        result.stalled_locations += u32::from(trace.stalled);
        result.locations.push(trace);
        if death.is_some() || player.is_dead() {
            result.death = death;
            return finish(result, &player);
        }
    }

    result.reached_dragon = true;
    let (boss, fatal) = fight_dragon(&mut player, &mut rng, config);
    log::debug!(
        "seed {seed}: dragon {:?} after {} rounds (hp {} of {})",
        boss.outcome,
        boss.rounds,
        boss.hp_left.max(0),
        boss.starting_hp
    );
    result.combats += 1;
    result.combat_rounds += boss.rounds;
    result.boss = Some(boss);
    match fatal {
        Some((cause, hp_before)) => {
            result.death = Some(Death {
                cause,
                tile_kind: None,
                enemy: Some("Dragon of Chaos".to_string()),
                location_index: None,
                hp_before,
            });
        }
        None => result.outcome = RunOutcome::Victory,
    }
    finish(result, &player)
}

fn finish(mut result: RunResult, player: &PlayerState) -> RunResult {
    result.hp = player.hp;
    result.max_hp = player.max_hp;
    result.xp = player.xp;
    result.atk = player.atk;
    result.def = player.def;
    result.buried = player.buried_count;
    result.quest = player.quest;
    result
}

fn play_location(
    index: usize,
    template: &LocationTemplate,
    catalog: &CardCatalog,
    config: &RulesConfig,
    player: &mut PlayerState,
    rng: &mut ParkMiller,
) -> (LocationTrace, Option<Death>) {
    let mut trace = LocationTrace::enter(index, template.key, player.hp);

    let mut cards = catalog.cards_for_location(template.key, rng);
    if config.quest_injection {
        catalog.inject_quest_npcs(&mut cards, index, player.quest);
    }
    let mut board = Board::build(template, cards);
    let mut hooks = effects::for_location(template.key, config.location_effects);
    let start = board.choose_start(rng);
    log::debug!(
        "location {index} {} ({}): start tile {}",
        template.key,
        hooks.name(),
        start
    );

    let mut enc = Encounter {
        player,
        rng,
        config,
        effects: hooks.as_mut(),
        trace: &mut trace,
        death: None,
    };

    let mut last = resolve_tile(&mut board, start, &mut enc);
    while last != Resolution::Died {
        if !board.has_face_down() {
            enc.trace.cleared = true;
            break;
        }
        let legal = board.legal_moves();
        let Some(&chosen) = pick(enc.rng, &legal) else {
            enc.trace.stalled = true;
            log::warn!(
                "location {} stalled with {} face-down tiles",
                template.key,
                board.face_down_count()
            );
            break;
        };
        last = reveal(&mut board, chosen, &legal, &mut enc);
    }

    let death = enc.death.take();
    if !enc.player.is_dead() {
        enc.trace.exit = Some(LocationExit {
            hp: enc.player.hp,
            max_hp: enc.player.max_hp,
            xp: enc.player.xp,
        });
    }
    (trace, death)
}
