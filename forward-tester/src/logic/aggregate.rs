use std::collections::BTreeMap;

use forward_game::numbers::{i64_to_f64, ratio, usize_to_f64};
use forward_game::{CardKind, DeathCause, RunResult};
use serde::{Deserialize, Serialize};

use super::stats::{
    Bin, Percentiles, ROUND_BUCKETS, distribution, mean, median, point_biserial, round_bucket,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentileSets {
    pub final_hp_wins: Percentiles,
    pub max_hp_all: Percentiles,
    pub combats_all: Percentiles,
    pub buried_all: Percentiles,
}

impl PercentileSets {
    #[must_use]
    pub fn all(&self) -> [(&'static str, &Percentiles); 4] {
        [
            ("Final HP (wins)", &self.final_hp_wins),
            ("Max HP (all)", &self.max_hp_all),
            ("Combats (all)", &self.combats_all),
            ("Buried (all)", &self.buried_all),
        ]
    }
}

/// Aggregates for one location slot (the n-th location visited in a run).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSummary {
    pub index: usize,
    pub entries: usize,
    pub clears: usize,
    pub clear_rate: f64,
    pub death_rate: f64,
    pub stall_rate: f64,
    pub avg_entry_hp: f64,
    pub avg_exit_hp: f64,
    pub avg_exit_max_hp: f64,
    pub avg_exit_xp: f64,
    pub avg_combat_starts: f64,
    pub avg_combat_rounds: f64,
    pub avg_combat_damage_taken: f64,
    pub pit_attempt_rate: f64,
    pub pit_death_rate: f64,
    pub terror_choice_rate: f64,
    pub terror_bury_rate: f64,
    pub terror_death_rate: f64,
    pub snare_tile_rate: f64,
    pub snare_apply_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distributions {
    pub buried: Vec<Bin<u32>>,
    pub combats: Vec<Bin<u32>>,
    pub locations_cleared: Vec<Bin<u32>>,
    pub combat_rounds: Vec<Bin<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlations {
    pub max_hp: f64,
    pub combats: f64,
    pub buried: f64,
    pub xp: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseCount {
    pub cause: String,
    pub count: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileTypeCount {
    #[serde(rename = "type")]
    pub kind: String,
    pub count: usize,
    pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestSummary {
    pub have_sword_runs: usize,
    pub princess_delivered_runs: usize,
    pub sage_delivered_runs: usize,
    pub dragon_reached_with_prereqs: usize,
    pub dragon_reached_without_prereqs: usize,
    pub pct_have_sword: f64,
    pub pct_princess_delivered: f64,
    pub pct_sage_delivered: f64,
    pub pct_dragon_with_prereqs: f64,
    pub pct_dragon_without_prereqs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub runs: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub dragon_reached: usize,
    pub reach_dragon_rate: f64,
    pub pre_dragon_deaths: usize,
    pub dragon_deaths: usize,
    pub stalled_locations: u64,
    pub avg_final_hp_all: f64,
    pub avg_final_hp_wins: f64,
    pub median_final_hp_wins: f64,
    pub avg_max_hp: f64,
    pub median_max_hp: f64,
    pub avg_xp: f64,
    pub avg_buried: f64,
    pub avg_locations_cleared: f64,
    pub median_locations_cleared: f64,
    pub avg_combats: f64,
    pub median_combats: f64,
    pub avg_combat_rounds_per_combat: f64,
    pub total_combat_rounds: u64,
    pub percentiles: PercentileSets,
    pub per_location: Vec<LocationSummary>,
    pub distributions: Distributions,
    pub correlations: Correlations,
    pub death_causes: Vec<CauseCount>,
    pub death_tile_types: Vec<TileTypeCount>,
    pub quest: QuestSummary,
}

#[derive(Debug, Default)]
struct LocationBuilder {
    entries: usize,
    clears: usize,
    exits: usize,
    deaths: usize,
    stalls: usize,
    entry_hp: f64,
    exit_hp: f64,
    exit_max_hp: f64,
    exit_xp: f64,
    combat_starts: u64,
    combat_rounds: u64,
    combat_damage_taken: i64,
    pit_attempts: u64,
    pit_deaths: u64,
    terror_hp_choices: u64,
    terror_buries: u64,
    terror_deaths: u64,
    snare_tiles: u64,
    snare_applied: u64,
}

impl LocationBuilder {
    fn ingest(&mut self, trace: &forward_game::LocationTrace) {
        self.entries += 1;
        self.clears += usize::from(trace.cleared);
        self.stalls += usize::from(trace.stalled);
        self.entry_hp += f64::from(trace.entry_hp);
        if let Some(exit) = &trace.exit {
            self.exits += 1;
            self.exit_hp += f64::from(exit.hp);
            self.exit_max_hp += f64::from(exit.max_hp);
            self.exit_xp += f64::from(exit.xp);
        }
        let c = &trace.counters;
        self.combat_starts += u64::from(c.combat_starts);
        self.combat_rounds += u64::from(c.combat_rounds);
        self.combat_damage_taken += c.combat_damage_taken;
        self.pit_attempts += u64::from(c.pit_attempts);
        self.pit_deaths += u64::from(c.pit_deaths);
        self.terror_hp_choices += u64::from(c.terror_hp_choices);
        self.terror_buries += u64::from(c.terror_buries);
        self.terror_deaths += u64::from(c.terror_deaths);
        self.snare_tiles += u64::from(c.snare_tiles);
        self.snare_applied += u64::from(c.snare_applied);
    }

    fn finish(self, index: usize) -> LocationSummary {
        let entries = usize_to_f64(self.entries);
        let exits = usize_to_f64(self.exits);
        // event rates fall back to a denominator of one
        let per_entry = |n: u64| u64_to_f64(n) / entries.max(1.0);
        let per = |n: u64, d: u64| u64_to_f64(n) / u64_to_f64(d.max(1));
        LocationSummary {
            index,
            entries: self.entries,
            clears: self.clears,
            clear_rate: ratio(usize_to_f64(self.clears), entries),
            death_rate: ratio(usize_to_f64(self.deaths), entries),
            stall_rate: ratio(usize_to_f64(self.stalls), entries),
            avg_entry_hp: ratio(self.entry_hp, entries),
            avg_exit_hp: ratio(self.exit_hp, exits),
            avg_exit_max_hp: ratio(self.exit_max_hp, exits),
            avg_exit_xp: ratio(self.exit_xp, exits),
            avg_combat_starts: per_entry(self.combat_starts),
            avg_combat_rounds: per_entry(self.combat_rounds),
            avg_combat_damage_taken: i64_to_f64(self.combat_damage_taken) / entries.max(1.0),
            pit_attempt_rate: per_entry(self.pit_attempts),
            pit_death_rate: per(self.pit_deaths, self.pit_attempts),
            terror_choice_rate: per_entry(self.terror_hp_choices),
            terror_bury_rate: per_entry(self.terror_buries),
            terror_death_rate: per(self.terror_deaths, self.terror_hp_choices),
            snare_tile_rate: per_entry(self.snare_tiles),
            snare_apply_rate: per(self.snare_applied, self.snare_tiles),
        }
    }
}

fn u64_to_f64(value: u64) -> f64 {
    i64_to_f64(i64::try_from(value).unwrap_or(i64::MAX))
}

fn tally<K: Ord>(keys: impl Iterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts = BTreeMap::<K, usize>::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    let mut out: Vec<(K, usize)> = counts.into_iter().collect();
    // most frequent first, ties by key
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

fn column(runs: &[RunResult], f: impl Fn(&RunResult) -> f64) -> Vec<f64> {
    runs.iter().map(f).collect()
}

/// Fold a batch of run results into a report.
#[must_use]
pub fn aggregate(runs: &[RunResult]) -> BatchReport {
    let n = runs.len();
    let total = usize_to_f64(n);
    let share = |count: usize| ratio(usize_to_f64(count), total);

    let winners: Vec<&RunResult> = runs.iter().filter(|r| r.won()).collect();
    let wins = winners.len();
    let dragon_reached = runs.iter().filter(|r| r.reached_dragon).count();
    let pre_dragon_deaths = runs.iter().filter(|r| !r.won() && !r.reached_dragon).count();
    let dragon_deaths = runs.iter().filter(|r| !r.won() && r.reached_dragon).count();

    let final_hp_wins: Vec<f64> = winners.iter().map(|r| f64::from(r.hp)).collect();
    let max_hp = column(runs, |r| f64::from(r.max_hp));
    let xp = column(runs, |r| f64::from(r.xp));
    let buried = column(runs, |r| f64::from(r.buried));
    let combats = column(runs, |r| f64::from(r.combats));
    let cleared = column(runs, |r| f64::from(r.locations_cleared));
    let rounds = column(runs, |r| f64::from(r.combat_rounds));
    let outcomes: Vec<bool> = runs.iter().map(RunResult::won).collect();

    let slots = runs.iter().map(|r| r.locations.len()).max().unwrap_or(0);
    let mut builders: Vec<LocationBuilder> =
        (0..slots).map(|_| LocationBuilder::default()).collect();
    for run in runs {
        for (builder, trace) in builders.iter_mut().zip(&run.locations) {
            builder.ingest(trace);
        }
        if let Some(idx) = run.death.as_ref().and_then(|d| d.location_index)
            && let Some(builder) = builders.get_mut(idx)
        {
            builder.deaths += 1;
        }
    }
    let per_location = builders
        .into_iter()
        .enumerate()
        .map(|(index, b)| b.finish(index))
        .collect();

    let losses = || runs.iter().filter(|r| !r.won());
    let death_causes = tally(
        losses().map(|r| r.death_cause().map_or("unknown", DeathCause::as_str)),
    )
    .into_iter()
    .map(|(cause, count)| CauseCount {
        cause: cause.to_string(),
        count,
        pct: share(count),
    })
    .collect();
    let death_tile_types = tally(
        losses().filter_map(|r| r.death.as_ref().and_then(|d| d.tile_kind).map(CardKind::as_str)),
    )
    .into_iter()
    .map(|(kind, count)| TileTypeCount {
        kind: kind.to_string(),
        count,
        pct: share(count),
    })
    .collect();

    let round_labels: Vec<&str> = runs.iter().map(|r| round_bucket(r.combat_rounds)).collect();
    let combat_rounds = ROUND_BUCKETS
        .iter()
        .map(|&label| {
            let count = round_labels.iter().filter(|&&l| l == label).count();
            Bin {
                value: label.to_string(),
                count,
                pct: share(count),
            }
        })
        .collect();

    let have_sword_runs = runs.iter().filter(|r| r.quest.have_sword).count();
    let princess_delivered_runs = runs.iter().filter(|r| r.quest.princess_delivered).count();
    let sage_delivered_runs = runs.iter().filter(|r| r.quest.sage_delivered).count();
    let with_prereqs = runs.iter().filter(|r| r.dragon_with_prereqs()).count();
    let without_prereqs = dragon_reached - with_prereqs;

    BatchReport {
        runs: n,
        wins,
        win_rate: share(wins),
        dragon_reached,
        reach_dragon_rate: share(dragon_reached),
        pre_dragon_deaths,
        dragon_deaths,
        stalled_locations: runs.iter().map(|r| u64::from(r.stalled_locations)).sum(),
        avg_final_hp_all: mean(&column(runs, |r| f64::from(r.hp.max(0)))),
        avg_final_hp_wins: mean(&final_hp_wins),
        median_final_hp_wins: median(&final_hp_wins),
        avg_max_hp: mean(&max_hp),
        median_max_hp: median(&max_hp),
        avg_xp: mean(&xp),
        avg_buried: mean(&buried),
        avg_locations_cleared: mean(&cleared),
        median_locations_cleared: median(&cleared),
        avg_combats: mean(&combats),
        median_combats: median(&combats),
        avg_combat_rounds_per_combat: {
            let avg_combats = mean(&combats);
            mean(&rounds) / if avg_combats == 0.0 { 1.0 } else { avg_combats }
        },
        total_combat_rounds: runs.iter().map(|r| u64::from(r.combat_rounds)).sum(),
        percentiles: PercentileSets {
            final_hp_wins: Percentiles::of(&final_hp_wins),
            max_hp_all: Percentiles::of(&max_hp),
            combats_all: Percentiles::of(&combats),
            buried_all: Percentiles::of(&buried),
        },
        per_location,
        distributions: Distributions {
            buried: distribution(&runs.iter().map(|r| r.buried).collect::<Vec<_>>()),
            combats: distribution(&runs.iter().map(|r| r.combats).collect::<Vec<_>>()),
            locations_cleared: distribution(
                &runs.iter().map(|r| r.locations_cleared).collect::<Vec<_>>(),
            ),
            combat_rounds,
        },
        correlations: Correlations {
            max_hp: point_biserial(&outcomes, &max_hp),
            combats: point_biserial(&outcomes, &combats),
            buried: point_biserial(&outcomes, &buried),
            xp: point_biserial(&outcomes, &xp),
        },
        death_causes,
        death_tile_types,
        quest: QuestSummary {
            have_sword_runs,
            princess_delivered_runs,
            sage_delivered_runs,
            dragon_reached_with_prereqs: with_prereqs,
            dragon_reached_without_prereqs: without_prereqs,
            pct_have_sword: share(have_sword_runs),
            pct_princess_delivered: share(princess_delivered_runs),
            pct_sage_delivered: share(sage_delivered_runs),
            pct_dragon_with_prereqs: share(with_prereqs),
            pct_dragon_without_prereqs: share(without_prereqs),
        },
    }
}
