//! Card catalog: where boards get their cards.
//!
//! The engine only sees typed [`Card`]s. A catalog is built once, either from
//! an in-memory list, from JSON, or from the synthetic fallback deck used when
//! no real card data is available.

use serde::Deserialize;
use serde_json::Value;
use std::convert::Infallible;
use thiserror::Error;

use crate::card::{Card, CardKind, Effect, QuestNpc};
use crate::constants::{
    FALLBACK_DECK_SIZE, FALLBACK_HEAL, MIN_LOCATION_POOL, PRINCESS_LAST_INDEX, SAGE_FIRST_INDEX,
    SAGE_LAST_INDEX,
};
use crate::location::TILES_PER_LOCATION;
use crate::player::QuestFlags;
use crate::rng::{DiceSource, pick, shuffle};

/// Preferred draw order for a location with its own card pool.
pub const DESIRED_KINDS: [CardKind; 9] = [
    CardKind::Scene,
    CardKind::Equipment,
    CardKind::Item,
    CardKind::Snare,
    CardKind::Hollow,
    CardKind::Pit,
    CardKind::Beast,
    CardKind::Terror,
    CardKind::Blessing,
];

const FALLBACK_KINDS: [CardKind; 9] = [
    CardKind::Hollow,
    CardKind::Scene,
    CardKind::Item,
    CardKind::Equipment,
    CardKind::Pit,
    CardKind::Snare,
    CardKind::Terror,
    CardKind::Blessing,
    CardKind::Beast,
];

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse card catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Loose card shape accepted from JSON; effects are decoded one by one.
#[derive(Debug, Deserialize)]
struct RawCard {
    name: String,
    kind: Value,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    effects: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardCatalog {
    cards: Vec<Card>,
    fallback: bool,
}

impl CardCatalog {
    /// Wrap a card list. An empty list gets the fallback deck instead.
    #[must_use]
    pub fn from_cards(cards: Vec<Card>) -> Self {
        if cards.is_empty() {
            log::warn!("empty card catalog, using the fallback deck");
            return Self::fallback();
        }
        Self {
            cards,
            fallback: false,
        }
    }

    /// Decode a JSON array of cards.
    ///
    /// Effects that do not decode are dropped with a warning and unknown kinds
    /// read as scenes, so a sloppy data file still yields a playable catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] if the document is not an array of
    /// objects with at least a `name` and `kind`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let raw: Vec<RawCard> = serde_json::from_str(json)?;
        let cards = raw.into_iter().map(decode_card).collect();
        Ok(Self::from_cards(cards))
    }

    /// Synthetic 60-card deck.
    #[must_use]
    pub fn fallback() -> Self {
        let cards = (0..FALLBACK_DECK_SIZE)
            .map(|i| {
                let hp = if i % 7 == 0 {
                    6
                } else if i % 5 == 0 {
                    5
                } else {
                    3
                };
                let card = Card::new(format!("Card {i}"), FALLBACK_KINDS[i % FALLBACK_KINDS.len()])
                    .with(Effect::EnemyHp(hp));
                if i % 11 == 0 {
                    card.with(Effect::Heal(FALLBACK_HEAL))
                } else {
                    card
                }
            })
            .collect();
        Self {
            cards,
            fallback: true,
        }
    }

    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    #[must_use]
    pub fn npc(&self, npc: QuestNpc) -> Option<&Card> {
        self.cards.iter().find(|card| card.quest_npc() == Some(npc))
    }

    /// Draw nine cards for location `key`.
    ///
    /// A location with at least five cards of its own takes one of each
    /// [`DESIRED_KINDS`] in order and fills up by random picks from its pool.
    /// Smaller pools draw from a shuffled copy of every card of a desired kind.
    pub fn cards_for_location(&self, key: &str, rng: &mut dyn DiceSource) -> Vec<Card> {
        let pool: Vec<&Card> = self
            .cards
            .iter()
            .filter(|card| card.kind != CardKind::Location && card.location.as_deref() == Some(key))
            .collect();

        if pool.len() < MIN_LOCATION_POOL {
            let mut allowed: Vec<&Card> = self
                .cards
                .iter()
                .filter(|card| DESIRED_KINDS.contains(&card.kind))
                .collect();
            shuffle(rng, &mut allowed);
            let mut drawn: Vec<Card> = allowed
                .iter()
                .take(TILES_PER_LOCATION)
                .map(|card| (*card).clone())
                .collect();
            while drawn.len() < TILES_PER_LOCATION {
                let Some(card) = pick(rng, &allowed) else { break };
                drawn.push((*card).clone());
            }
            return drawn;
        }

        let mut taken = Vec::with_capacity(TILES_PER_LOCATION);
        for kind in DESIRED_KINDS {
            if let Some(idx) =
                (0..pool.len()).find(|&i| pool[i].kind == kind && !taken.contains(&i))
            {
                taken.push(idx);
            }
        }
        let mut drawn: Vec<Card> = taken.iter().map(|&i| pool[i].clone()).collect();
        while drawn.len() < TILES_PER_LOCATION {
            let Some(card) = pick(rng, &pool) else { break };
            drawn.push((*card).clone());
        }
        drawn
    }

    /// Swap quest NPCs into the drawn cards for location `index`: the
    /// princess into the last slot early on, the sage into the one before it
    /// in the middle stretch, each only while still undelivered.
    pub fn inject_quest_npcs(&self, cards: &mut [Card], index: usize, quest: QuestFlags) {
        let len = cards.len();
        if !quest.princess_delivered
            && index <= PRINCESS_LAST_INDEX
            && let Some(princess) = self.npc(QuestNpc::GhostlyPrincess)
            && let Some(slot) = len.checked_sub(1)
        {
            cards[slot] = princess.clone();
        }
        if !quest.sage_delivered
            && (SAGE_FIRST_INDEX..=SAGE_LAST_INDEX).contains(&index)
            && let Some(sage) = self.npc(QuestNpc::Sage)
            && let Some(slot) = len.checked_sub(2)
        {
            cards[slot] = sage.clone();
        }
    }
}

impl Default for CardCatalog {
    fn default() -> Self {
        Self::fallback()
    }
}

fn decode_card(raw: RawCard) -> Card {
    let kind = serde_json::from_value::<CardKind>(raw.kind.clone()).unwrap_or_else(|_| {
        log::warn!("card {:?} has unknown kind {}, treating as scene", raw.name, raw.kind);
        CardKind::Scene
    });
    let effects = raw
        .effects
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Effect>(value.clone()) {
            Ok(effect) => Some(effect),
            Err(err) => {
                log::warn!("dropping effect {value} on {:?}: {err}", raw.name);
                None
            }
        })
        .collect();
    Card {
        name: raw.name,
        kind,
        location: raw.location,
        effects,
    }
}

/// Abstracts where a catalog comes from.
pub trait CatalogSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Build the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the source data cannot be read or decoded.
    fn load_catalog(&self) -> Result<CardCatalog, Self::Error>;
}

/// Always yields the synthetic fallback deck.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSource;

impl CatalogSource for FallbackSource {
    type Error = Infallible;

    fn load_catalog(&self) -> Result<CardCatalog, Self::Error> {
        Ok(CardCatalog::fallback())
    }
}

/// Catalog held as a JSON document.
#[derive(Debug, Clone, Default)]
pub struct JsonSource {
    pub json: String,
}

impl JsonSource {
    #[must_use]
    pub fn new(json: impl Into<String>) -> Self {
        Self { json: json.into() }
    }
}

impl CatalogSource for JsonSource {
    type Error = CatalogError;

    fn load_catalog(&self) -> Result<CardCatalog, Self::Error> {
        CardCatalog::from_json(&self.json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ParkMiller;

    fn local_pool(key: &str) -> Vec<Card> {
        let mut cards: Vec<Card> = DESIRED_KINDS
            .iter()
            .rev()
            .map(|kind| Card::new(format!("{key} {kind}"), *kind).at(key))
            .collect();
        cards.push(Card::new(key, CardKind::Location).at(key));
        cards
    }

    #[test]
    fn fallback_deck_shape() {
        let catalog = CardCatalog::fallback();
        assert!(catalog.is_fallback());
        assert_eq!(catalog.cards().len(), 60);
        let c0 = &catalog.cards()[0];
        assert_eq!((c0.kind, c0.enemy_hp(), c0.heal()), (CardKind::Hollow, Some(6), Some(4)));
        let c5 = &catalog.cards()[5];
        assert_eq!((c5.kind, c5.enemy_hp(), c5.heal()), (CardKind::Snare, Some(5), None));
        let c8 = &catalog.cards()[8];
        assert_eq!((c8.kind, c8.enemy_hp()), (CardKind::Beast, Some(3)));
        assert!(catalog.npc(QuestNpc::Sage).is_none());
    }

    #[test]
    fn empty_list_falls_back() {
        assert!(CardCatalog::from_cards(Vec::new()).is_fallback());
        assert!(CardCatalog::from_json("[]").unwrap().is_fallback());
    }

    #[test]
    fn small_pools_draw_nine_from_everything() {
        let catalog = CardCatalog::fallback();
        let mut rng = ParkMiller::new(1);
        let drawn = catalog.cards_for_location("termina", &mut rng);
        assert_eq!(drawn.len(), 9);
        assert!(drawn.iter().all(|c| DESIRED_KINDS.contains(&c.kind)));

        let tiny = CardCatalog::from_cards(vec![Card::new("Lone", CardKind::Scene)]);
        let drawn = tiny.cards_for_location("termina", &mut rng);
        assert_eq!(drawn.len(), 9);
    }

    #[test]
    fn local_pools_follow_desired_order() {
        let catalog = CardCatalog::from_cards(local_pool("wastes"));
        let drawn = catalog.cards_for_location("wastes", &mut ParkMiller::new(4));
        let kinds: Vec<CardKind> = drawn.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, DESIRED_KINDS.to_vec());
    }

    #[test]
    fn quest_npcs_are_injected_by_index() {
        let mut cards = local_pool("worship");
        cards.push(Card::new("Ghostly Princess", CardKind::Special));
        cards.push(Card::new("Sage", CardKind::Special));
        let catalog = CardCatalog::from_cards(cards);
        let mut rng = ParkMiller::new(2);

        let mut drawn = catalog.cards_for_location("worship", &mut rng);
        catalog.inject_quest_npcs(&mut drawn, 2, QuestFlags::default());
        assert_eq!(drawn[8].quest_npc(), Some(QuestNpc::GhostlyPrincess));
        assert_eq!(drawn[7].quest_npc(), Some(QuestNpc::Sage));

        let mut drawn = catalog.cards_for_location("worship", &mut rng);
        let delivered = QuestFlags {
            sage_delivered: true,
            ..QuestFlags::default()
        };
        catalog.inject_quest_npcs(&mut drawn, 4, delivered);
        assert!(drawn.iter().all(|c| c.quest_npc().is_none()));
    }

    #[test]
    fn json_drops_bad_effects_and_unknown_kinds() {
        let json = r#"[
            {"name":"Ghoul","kind":"hollow","location":"brume","effects":[{"effect":"enemyHp","value":4},{"effect":"teleport"}]},
            {"name":"Mystery","kind":"riddle"}
        ]"#;
        let catalog = CardCatalog::from_json(json).unwrap();
        assert_eq!(catalog.cards()[0].effects, vec![Effect::EnemyHp(4)]);
        assert_eq!(catalog.cards()[0].location.as_deref(), Some("brume"));
        assert_eq!(catalog.cards()[1].kind, CardKind::Scene);
        assert!(CardCatalog::from_json("{").is_err());
    }

    #[test]
    fn sources_load() {
        assert!(FallbackSource.load_catalog().unwrap().is_fallback());
        let source = JsonSource::new(r#"[{"name":"Sage","kind":"special"}]"#);
        let catalog = source.load_catalog().unwrap();
        assert!(catalog.npc(QuestNpc::Sage).is_some());
    }
}
