use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use forward_game::RunResult;
use forward_game::numbers::{floor_to_usize, ratio, usize_to_f64};

use super::aggregate::BatchReport;
use super::stats::ROUND_BUCKETS;

const BAR_WIDTH: usize = 30;

fn pct(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

fn bar(share: f64) -> String {
    let cells = (share.clamp(0.0, 1.0) * usize_to_f64(BAR_WIDTH)).round();
    let filled = floor_to_usize(cells).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

/// Run end state keyed by locations cleared: `+` marks a win, `D` a dragon death.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearedKey {
    pub cleared: u32,
    pub suffix: &'static str,
}

impl ClearedKey {
    #[must_use]
    pub fn of(run: &RunResult) -> Self {
        let suffix = if run.won() {
            "+"
        } else if run.reached_dragon {
            "D"
        } else {
            ""
        };
        Self {
            cleared: run.locations_cleared,
            suffix,
        }
    }

    const fn suffix_rank(&self) -> u8 {
        match self.suffix.as_bytes() {
            [] => 0,
            [b'D'] => 1,
            _ => 2,
        }
    }

    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.cleared, self.suffix)
    }
}

impl Ord for ClearedKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cleared
            .cmp(&other.cleared)
            .then_with(|| self.suffix_rank().cmp(&other.suffix_rank()))
    }
}

impl PartialOrd for ClearedKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Heuristic balance warnings for the batch.
#[must_use]
pub fn balance_flags(report: &BatchReport) -> Vec<&'static str> {
    let mut flags = Vec::new();
    if report.win_rate > 0.75 {
        flags.push(
            "High win rate (>75%): consider reducing linear HP growth or increasing enemy HP.",
        );
    } else if report.win_rate < 0.25 {
        flags.push("Low win rate (<25%): consider +start HP or gentler scaling.");
    }
    if report.avg_combat_rounds_per_combat < 1.8 {
        flags.push(
            "Combats very short (<1.8 rounds): may lack tension; raise enemy HP or lower player ATK progression.",
        );
    }
    if report.avg_buried > 2.0 {
        flags.push("High buried average: terror decisions frequent; ensure intended.");
    }
    flags
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &BatchReport,
    runs: &[RunResult],
) -> Result<()> {
    let total = usize_to_f64(report.runs);
    let share = |count: usize| ratio(usize_to_f64(count), total);

    writeln!(out)?;
    writeln!(out, "{}", "📊 FORWARD Batch Report".bright_cyan().bold())?;
    writeln!(out, "{}", "=======================".cyan())?;
    writeln!(out, "Runs: {}", report.runs)?;
    writeln!(
        out,
        "Wins: {} ({})",
        report.wins.to_string().green(),
        pct(report.win_rate)
    )?;
    writeln!(
        out,
        "Reached Dragon: {} ({})",
        report.dragon_reached,
        pct(report.reach_dragon_rate)
    )?;
    writeln!(
        out,
        "Pre-Dragon Deaths: {} ({}) | Dragon Deaths: {} ({})",
        report.pre_dragon_deaths.to_string().red(),
        pct(share(report.pre_dragon_deaths)),
        report.dragon_deaths.to_string().red(),
        pct(share(report.dragon_deaths))
    )?;
    writeln!(out, "Stalled locations: {}", report.stalled_locations)?;

    writeln!(out)?;
    writeln!(out, "{}", "-- Averages / Medians --".bright_yellow())?;
    writeln!(
        out,
        "Max HP avg {:.2} | median {}",
        report.avg_max_hp, report.median_max_hp
    )?;
    writeln!(
        out,
        "Final HP (wins) avg {:.2} | median {}",
        report.avg_final_hp_wins, report.median_final_hp_wins
    )?;
    writeln!(
        out,
        "XP avg {:.2} | Buried avg {:.2}",
        report.avg_xp, report.avg_buried
    )?;
    writeln!(
        out,
        "Locations cleared avg {:.2} | median {}",
        report.avg_locations_cleared, report.median_locations_cleared
    )?;
    writeln!(
        out,
        "Combats per run avg {:.2} | median {}",
        report.avg_combats, report.median_combats
    )?;
    writeln!(
        out,
        "Rounds per combat avg {:.2}",
        report.avg_combat_rounds_per_combat
    )?;
    writeln!(out, "Total combat rounds {}", report.total_combat_rounds)?;

    writeln!(out)?;
    writeln!(out, "{}", "-- Locations Cleared Distribution --".bright_yellow())?;
    let mut cleared = BTreeMap::<ClearedKey, usize>::new();
    for run in runs {
        *cleared.entry(ClearedKey::of(run)).or_default() += 1;
    }
    for (key, count) in &cleared {
        let p = share(*count);
        writeln!(out, "{:>3} | {} {} ({count})", key.label(), bar(p), pct(p))?;
    }
    writeln!(
        out,
        "(Note: a trailing + means victory; D indicates death during dragon fight.)"
    )?;

    writeln!(out)?;
    writeln!(out, "{}", "-- Total Combat Rounds (All Runs) --".bright_yellow())?;
    for label in ROUND_BUCKETS {
        let count = report
            .distributions
            .combat_rounds
            .iter()
            .find(|b| b.value == label)
            .map_or(0, |b| b.count);
        let p = share(count);
        writeln!(out, "{label:>6} | {} {} ({count})", bar(p), pct(p))?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "-- Balance Flags (Heuristics) --".bright_yellow())?;
    for flag in balance_flags(report) {
        writeln!(out, "⚠️  {}", flag.yellow())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "-- Percentiles (selected) --".bright_yellow())?;
    for (label, set) in report.percentiles.all() {
        let values: Vec<String> = set.as_array().iter().map(|v| format!("{v:.1}")).collect();
        writeln!(out, "{label:<16} p5/p25/p50/p75/p95: {}", values.join(" / "))?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "-- Death Causes --".bright_yellow())?;
    for cause in &report.death_causes {
        writeln!(out, "{}: {} ({})", cause.cause, cause.count, pct(cause.pct))?;
    }
    writeln!(out)?;
    writeln!(out, "{}", "-- Death Tile Types --".bright_yellow())?;
    for tile in &report.death_tile_types {
        writeln!(out, "{}: {} ({})", tile.kind, tile.count, pct(tile.pct))?;
    }

    let q = &report.quest;
    writeln!(out)?;
    writeln!(out, "{}", "-- Quest Metrics --".bright_yellow())?;
    writeln!(
        out,
        "Ancient Sword acquired:        {} ({})",
        q.have_sword_runs,
        pct(q.pct_have_sword)
    )?;
    writeln!(
        out,
        "Princess delivered:            {} ({})",
        q.princess_delivered_runs,
        pct(q.pct_princess_delivered)
    )?;
    writeln!(
        out,
        "Sage delivered:                {} ({})",
        q.sage_delivered_runs,
        pct(q.pct_sage_delivered)
    )?;
    writeln!(
        out,
        "Dragon reached w/ prereqs:     {} ({})",
        q.dragon_reached_with_prereqs,
        pct(q.pct_dragon_with_prereqs)
    )?;
    writeln!(
        out,
        "Dragon reached w/o prereqs:    {} ({})",
        q.dragon_reached_without_prereqs,
        pct(q.pct_dragon_without_prereqs)
    )?;

    writeln!(out)?;
    writeln!(out, "{}", "-- Per-Location Summary --".bright_yellow())?;
    for loc in &report.per_location {
        writeln!(
            out,
            "Loc#{} ent:{} clr:{} clrRt:{} deathRt:{} stallRt:{} eHP:{:.1} xHP:{:.1} xMHP:{:.1} cmbSt:{:.2} cmbR:{:.2} dmg:{:.2} pitA:{:.2} pitD:{:.2} terrChoice:{:.2} terrBury:{:.2} terrD:{:.2} snareTiles:{:.2} snareApply:{:.2}",
            loc.index + 1,
            loc.entries,
            loc.clears,
            pct(loc.clear_rate),
            pct(loc.death_rate),
            pct(loc.stall_rate),
            loc.avg_entry_hp,
            loc.avg_exit_hp,
            loc.avg_exit_max_hp,
            loc.avg_combat_starts,
            loc.avg_combat_rounds,
            loc.avg_combat_damage_taken,
            loc.pit_attempt_rate,
            loc.pit_death_rate,
            loc.terror_choice_rate,
            loc.terror_bury_rate,
            loc.terror_death_rate,
            loc.snare_tile_rate,
            loc.snare_apply_rate
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", "-- Correlations (win vs variable) --".bright_yellow())?;
    let c = &report.correlations;
    let rows = [
        ("maxHp", c.max_hp),
        ("combats", c.combats),
        ("buried", c.buried),
        ("xp", c.xp),
    ];
    for (label, value) in rows {
        writeln!(out, "{label}: {value:.3}")?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &BatchReport) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}
