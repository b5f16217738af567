use forward_game::{
    CardCatalog, DeathCause, DragonOutcome, GameEngine, JsonSource, RulesConfig, RunOutcome,
    run_game, run_game_with,
};

const QUEST_CATALOG: &str = r#"[
    {"name":"Ghostly Princess","kind":"special"},
    {"name":"Sage","kind":"special"},
    {"name":"Ancient Sword","kind":"equipment","location":"termina","effects":[{"effect":"atk","value":2}]},
    {"name":"Gilded Bangle","kind":"equipment","location":"worship","effects":[{"effect":"def","value":1}]},
    {"name":"Ferryman's Bell","kind":"equipment","location":"nightsea"},
    {"name":"Hearth","kind":"scene","location":"termina","effects":[{"effect":"fullHeal"}]},
    {"name":"Ratling","kind":"hollow","location":"termina","effects":[{"effect":"enemyHp","value":2}]},
    {"name":"Sinkhole","kind":"pit","location":"termina","effects":[{"effect":"pitTarget","value":3}]},
    {"name":"Tonic","kind":"item","location":"termina","effects":[{"effect":"heal","value":5}]},
    {"name":"Phoenix Tear","kind":"item","effects":[{"effect":"phoenixTear"}]},
    {"name":"Web","kind":"snare","effects":[{"effect":"snareMissFirst","value":2}]},
    {"name":"Grace","kind":"blessing","effects":[{"effect":"normalHitOn1"},{"effect":"blockOn12"}]},
    {"name":"Wolf","kind":"beast"},
    {"name":"Dread","kind":"terror","effects":[{"effect":"terrorHpLoss","value":3}]}
]"#;

#[test]
fn fallback_seed_one_is_byte_identical() {
    let catalog = CardCatalog::fallback();
    let first = serde_json::to_string(&run_game(1, &catalog)).unwrap();
    let second = serde_json::to_string(&run_game(1, &catalog)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn fallback_runs_never_pass_the_dragon_gate() {
    let catalog = CardCatalog::fallback();
    for seed in 1..=150 {
        let result = run_game(seed, &catalog);
        assert_ne!(result.outcome, RunOutcome::Victory, "seed {seed}");
        assert!(result.death.is_some());
        if let Some(boss) = result.boss {
            assert!(result.reached_dragon);
            assert!(boss.gated);
            assert_eq!(boss.damage_dealt, 0);
            assert_eq!(boss.hp_left, boss.starting_hp);
            assert_ne!(boss.outcome, DragonOutcome::Slain);
        }
    }
}

#[test]
fn stalls_only_happen_in_spiremaze() {
    let catalog = CardCatalog::fallback();
    let mut spiremaze_exits = 0;
    for seed in 1..=200 {
        let result = run_game(seed, &catalog);
        let stalled = result.locations.iter().filter(|l| l.stalled).count();
        assert_eq!(u32::try_from(stalled).unwrap(), result.stalled_locations);
        for loc in &result.locations {
            if loc.exit.is_none() {
                continue;
            }
            if loc.key == "spiremaze" {
                spiremaze_exits += 1;
                assert!(loc.stalled && !loc.cleared, "seed {seed}");
                assert!(!loc.fully_resolved);
            } else {
                assert!(loc.cleared && !loc.stalled, "seed {seed} {}", loc.key);
            }
        }
        assert_eq!(
            result.locations_cleared + result.stalled_locations,
            u32::try_from(result.locations.iter().filter(|l| l.exit.is_some()).count()).unwrap()
        );
    }
    assert!(spiremaze_exits > 0);
}

#[test]
fn run_records_are_consistent() {
    let catalog = CardCatalog::fallback();
    for seed in 1..=100 {
        let r = run_game(seed, &catalog);
        assert_eq!(r.location_order.len(), 9);
        let mut sorted = r.location_order.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), 9);

        let location_combats: u32 = r.locations.iter().map(|l| l.counters.combat_starts).sum();
        assert_eq!(r.combats, location_combats + u32::from(r.reached_dragon));
        assert!(r.max_hp >= 20);
        assert_eq!(r.xp, r.max_hp - 20);

        match &r.death {
            Some(death) if !r.reached_dragon => {
                assert_eq!(death.location_index, Some(r.locations.len() - 1));
                assert!(r.hp <= 0);
            }
            Some(death) => {
                assert!(matches!(death.cause, DeathCause::Dragon | DeathCause::Exhaustion));
                assert_eq!(death.location_index, None);
            }
            None => assert!(r.won()),
        }
    }
}

#[test]
fn quest_catalog_runs_are_deterministic_and_sane() {
    let engine = GameEngine::from_source(&JsonSource::new(QUEST_CATALOG), RulesConfig::default())
        .unwrap();
    let mut unlocked = 0;
    for seed in 1..=300 {
        let a = engine.play(seed);
        assert_eq!(a, engine.play(seed));
        if a.quest.boss_unlocked() {
            unlocked += 1;
        }
        if a.dragon_with_prereqs() {
            let boss = a.boss.as_ref().unwrap();
            assert!(!boss.gated);
        }
        if a.won() {
            assert!(a.quest.have_sword && a.quest.princess_delivered);
        }
    }
    // sword and bangle are drawn often enough that some runs unlock the dragon
    assert!(unlocked > 0);
}

#[test]
fn location_effects_change_the_game_but_stay_deterministic() {
    let catalog = CardCatalog::fallback();
    let cfg = RulesConfig::default().with_location_effects(true);
    let mut differs = false;
    let mut hazard_deaths = 0;
    for seed in 1..=100 {
        let with = run_game_with(seed, &catalog, &cfg);
        assert_eq!(with, run_game_with(seed, &catalog, &cfg));
        differs |= with != run_game(seed, &catalog);
        if matches!(
            with.death_cause(),
            Some(DeathCause::Scorch | DeathCause::Rot | DeathCause::Climb)
        ) {
            hazard_deaths += 1;
        }
    }
    assert!(differs);
    assert!(hazard_deaths <= 100);
}
