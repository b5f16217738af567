//! FORWARD Game Engine
//!
//! Deterministic rules engine for the FORWARD card-crawl: seeded dice, board
//! layering and the reveal frontier, card resolution, duel combat, the quest
//! gates and the dragon. No UI or platform dependencies.

pub mod board;
pub mod boss;
pub mod card;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod constants;
pub mod effects;
pub mod location;
pub mod numbers;
pub mod player;
pub mod resolve;
pub mod rng;
pub mod run;
pub mod trace;

// Re-export commonly used types
pub use board::{Board, Layer, Tile, TileState};
pub use boss::{BossTrace, DragonOutcome, dragon_hp, fight_dragon};
pub use card::{ANCIENT_SWORD, Card, CardKind, Effect, QuestNpc};
pub use catalog::{CardCatalog, CatalogError, CatalogSource, FallbackSource, JsonSource};
pub use combat::{CombatOutcome, CombatReport, Duel, Exchange, exchange, fight};
pub use config::{RulesConfig, RulesConfigError};
pub use effects::{LocationEffects, NoEffects, for_location};
pub use location::{LocationTemplate, SHIPPED_LOCATIONS, TILES_PER_LOCATION};
pub use player::{Pickup, PlayerState, QuestFlags};
pub use resolve::{Encounter, Resolution, resolve_tile, reveal};
pub use rng::{DiceSource, ParkMiller, pick, shuffle};
pub use run::{run_game, run_game_with};
pub use trace::{
    Death, DeathCause, LocationCounters, LocationExit, LocationTrace, RunOutcome, RunResult,
};

/// A loaded catalog plus the rules it is played under.
#[derive(Debug, Clone)]
pub struct GameEngine {
    catalog: CardCatalog,
    config: RulesConfig,
}

impl GameEngine {
    #[must_use]
    pub const fn new(catalog: CardCatalog, config: RulesConfig) -> Self {
        Self { catalog, config }
    }

    /// Load the catalog from `source`.
    ///
    /// # Errors
    ///
    /// Returns the source's error if the catalog cannot be loaded.
    pub fn from_source<C: CatalogSource>(
        source: &C,
        config: RulesConfig,
    ) -> Result<Self, C::Error> {
        let catalog = source.load_catalog()?;
        Ok(Self::new(catalog, config))
    }

    #[must_use]
    pub const fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    #[must_use]
    pub const fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Play one full run for `seed`.
    #[must_use]
    pub fn play(&self, seed: i64) -> RunResult {
        run_game_with(seed, &self.catalog, &self.config)
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(CardCatalog::fallback(), RulesConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;

    #[derive(Debug)]
    struct Unavailable;

    impl fmt::Display for Unavailable {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("catalog unavailable")
        }
    }

    impl std::error::Error for Unavailable {}

    struct BrokenSource;

    impl CatalogSource for BrokenSource {
        type Error = Unavailable;

        fn load_catalog(&self) -> Result<CardCatalog, Self::Error> {
            Err(Unavailable)
        }
    }

    #[test]
    fn engine_surfaces_source_errors() {
        let err = GameEngine::from_source(&BrokenSource, RulesConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "catalog unavailable");
    }

    #[test]
    fn default_engine_replays_seeds() {
        let engine = GameEngine::default();
        assert!(engine.catalog().is_fallback());
        assert_eq!(engine.play(11), engine.play(11));
        assert_eq!(engine.play(11).seed, 11);
    }
}
