use std::num::NonZeroUsize;
use std::sync::Arc;

use anyhow::{Context, Result};
use forward_game::{GameEngine, RunResult};

pub const DEFAULT_RUNS: usize = 1_000;

fn seed_for(run: usize) -> i64 {
    i64::try_from(run).unwrap_or(i64::MAX)
}

/// Play seeds `1..=count` one after another.
#[must_use]
pub fn run_batch(engine: &GameEngine, count: usize) -> Vec<RunResult> {
    (1..=count).map(|run| engine.play(seed_for(run))).collect()
}

/// Same results as [`run_batch`], fanned out over blocking worker tasks.
///
/// Seeds are split into contiguous chunks, one per available core, and the
/// chunks are joined back in seed order.
pub async fn run_batch_parallel(engine: Arc<GameEngine>, count: usize) -> Result<Vec<RunResult>> {
    let workers = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
    if workers <= 1 || count < workers {
        return Ok(run_batch(&engine, count));
    }
    let chunk = count.div_ceil(workers);

    let mut handles = Vec::new();
    let mut first = 1;
    while first <= count {
        let last = (first + chunk - 1).min(count);
        let engine = Arc::clone(&engine);
        handles.push(tokio::task::spawn_blocking(move || {
            (first..=last)
                .map(|run| engine.play(seed_for(run)))
                .collect::<Vec<_>>()
        }));
        first = last + 1;
    }
    log::debug!("{count} runs over {} worker chunks", handles.len());

    let mut results = Vec::with_capacity(count);
    for handle in handles {
        results.extend(handle.await.context("simulation worker panicked")?);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_batch_uses_seeds_from_one() {
        let runs = run_batch(&GameEngine::default(), 5);
        let seeds: Vec<i64> = runs.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn parallel_batch_matches_sequential() {
        let engine = Arc::new(GameEngine::default());
        let parallel = run_batch_parallel(Arc::clone(&engine), 37).await.unwrap();
        assert_eq!(parallel, run_batch(&engine, 37));
    }

    #[tokio::test]
    async fn empty_batch_spawns_nothing() {
        let runs = run_batch_parallel(Arc::new(GameEngine::default()), 0).await.unwrap();
        assert!(runs.is_empty());
    }
}
