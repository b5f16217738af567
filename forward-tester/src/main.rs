mod logic;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::{BufWriter, Write, stdout};
use std::sync::Arc;
use std::time::Instant;

use forward_game::GameEngine;
use logic::{DEFAULT_RUNS, aggregate, run_batch_parallel};

#[derive(Debug, Parser)]
#[command(name = "forward-tester", version = "0.1.0")]
#[command(about = "Headless Monte-Carlo balance harness for the FORWARD card-crawl")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Print only the JSON report
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Play seeds 1..=COUNT and report balance statistics
    Run {
        /// Number of seeded runs; anything but a positive integer means 1000
        #[arg(allow_hyphen_values = true)]
        count: Option<String>,
    },
}

/// Lenient run count: malformed or non-positive input falls back to the default.
fn parse_count(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(DEFAULT_RUNS)
}

fn requested_count(args: &Args) -> usize {
    match &args.command {
        Some(Command::Run { count }) => parse_count(count.as_deref()),
        None => DEFAULT_RUNS,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let count = requested_count(&args);

    let engine = Arc::new(GameEngine::default());
    let start = Instant::now();
    let runs = run_batch_parallel(engine, count)
        .await
        .context("batch simulation failed")?;
    let report = aggregate(&runs);
    log::info!("{count} runs simulated in {:?}", start.elapsed());

    let mut out = BufWriter::new(stdout().lock());
    if !args.json {
        logic::reports::generate_console_report(&mut out, &report, &runs)?;
        writeln!(out)?;
        writeln!(out, "{}", "--- JSON (for tooling) ---".dimmed())?;
    }
    logic::reports::generate_json_report(&mut out, &report)?;
    out.flush().context("failed to flush report")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn count_parsing_is_lenient() {
        assert_eq!(parse_count(Some("25")), 25);
        assert_eq!(parse_count(Some(" 7 ")), 7);
        assert_eq!(parse_count(Some("0")), DEFAULT_RUNS);
        assert_eq!(parse_count(Some("-3")), DEFAULT_RUNS);
        assert_eq!(parse_count(Some("lots")), DEFAULT_RUNS);
        assert_eq!(parse_count(None), DEFAULT_RUNS);
    }

    #[test]
    fn bare_invocation_runs_defaults() {
        let args = parse(&["forward-tester"]);
        assert!(args.command.is_none());
        assert!(!args.json);
        assert_eq!(requested_count(&args), DEFAULT_RUNS);
    }

    #[test]
    fn run_subcommand_takes_count_and_json() {
        let args = parse(&["forward-tester", "run", "40", "--json"]);
        assert!(args.json);
        assert_eq!(requested_count(&args), 40);

        let args = parse(&["forward-tester", "run", "-12"]);
        assert_eq!(requested_count(&args), DEFAULT_RUNS);

        let args = parse(&["forward-tester", "--json"]);
        assert!(args.json);
    }

    #[test]
    fn unknown_flags_are_rejected() {
        assert!(Args::try_parse_from(["forward-tester", "run", "--seed", "4"]).is_err());
    }
}
