//! Board instantiation, BFS layering and the expanding-frontier reveal rule.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::card::{Card, CardKind};
use crate::location::{LocationTemplate, TILES_PER_LOCATION, adjacent};
use crate::rng::{DiceSource, pick};

/// BFS distance from the start tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Finite(u8),
    Unreached,
}

impl Layer {
    #[must_use]
    pub const fn is_finite(self) -> bool {
        matches!(self, Self::Finite(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TileState {
    FaceDown,
    Revealed,
    Resolved,
    Buried,
}

impl TileState {
    /// A tile that has been turned over at some point.
    #[must_use]
    pub const fn is_opened(self) -> bool {
        !matches!(self, Self::FaceDown)
    }

    /// Terminal states never change again.
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Resolved | Self::Buried)
    }

    const fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::FaceDown, Self::Revealed)
                | (Self::Revealed, Self::Resolved)
                | (Self::Revealed, Self::Buried)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub id: u8,
    pub x: i32,
    pub y: i32,
    pub card: Card,
    pub layer: Layer,
    pub start: bool,
    state: TileState,
}

impl Tile {
    #[must_use]
    pub fn new(id: u8, x: i32, y: i32, card: Card) -> Self {
        Self {
            id,
            x,
            y,
            card,
            layer: Layer::Unreached,
            start: false,
            state: TileState::FaceDown,
        }
    }

    #[must_use]
    pub const fn state(&self) -> TileState {
        self.state
    }

    /// Move the tile forward. Returns `false` (and changes nothing) for any
    /// transition that would go backwards or skip the reveal.
    pub fn advance(&mut self, next: TileState) -> bool {
        if self.state.can_become(next) {
            self.state = next;
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn is_adjacent(&self, other: &Self) -> bool {
        adjacent(self.x, self.y, other.x, other.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub key: String,
    tiles: Vec<Tile>,
}

impl Board {
    /// Lay `cards` over the template's cells in order. Missing cards are
    /// filled with blank wayside cards so the board always has nine tiles.
    #[must_use]
    pub fn build(template: &LocationTemplate, cards: Vec<Card>) -> Self {
        let mut cards = cards.into_iter();
        let tiles = template
            .cells
            .iter()
            .map(|cell| {
                let card = cards
                    .next()
                    .unwrap_or_else(|| Card::new("Wayside", CardKind::Location));
                Tile::new(cell.id, cell.x, cell.y, card)
            })
            .collect();
        Self {
            key: template.key.to_string(),
            tiles,
        }
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn tile(&self, idx: usize) -> Option<&Tile> {
        self.tiles.get(idx)
    }

    pub fn tile_mut(&mut self, idx: usize) -> Option<&mut Tile> {
        self.tiles.get_mut(idx)
    }

    /// Pick a start tile uniformly from the bottom row, reveal it and layer
    /// the board from it. Returns the start index.
    pub fn choose_start<R: DiceSource + ?Sized>(&mut self, rng: &mut R) -> usize {
        let bottom = self.tiles.iter().map(|t| t.y).max().unwrap_or(0);
        let candidates: Vec<usize> = self
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.y == bottom)
            .map(|(idx, _)| idx)
            .collect();
        let start = pick(rng, &candidates).copied().unwrap_or(0);
        if let Some(tile) = self.tiles.get_mut(start) {
            tile.advance(TileState::Revealed);
            tile.start = true;
        }
        self.assign_layers(start);
        start
    }

    /// Breadth-first layering from `start`.
    pub fn assign_layers(&mut self, start: usize) {
        for tile in &mut self.tiles {
            tile.layer = Layer::Unreached;
        }
        let Some(first) = self.tiles.get_mut(start) else {
            return;
        };
        first.layer = Layer::Finite(0);

        let mut queue = VecDeque::from([start]);
        while let Some(idx) = queue.pop_front() {
            let Some((x, y, Layer::Finite(depth))) =
                self.tiles.get(idx).map(|t| (t.x, t.y, t.layer))
            else {
                continue;
            };
            for (next, tile) in self.tiles.iter_mut().enumerate() {
                if tile.layer == Layer::Unreached && adjacent(tile.x, tile.y, x, y) {
                    tile.layer = Layer::Finite(depth.saturating_add(1));
                    queue.push_back(next);
                }
            }
        }
    }

    #[must_use]
    pub fn has_face_down(&self) -> bool {
        self.tiles
            .iter()
            .any(|t| t.state() == TileState::FaceDown)
    }

    #[must_use]
    pub fn face_down_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.state() == TileState::FaceDown)
            .count()
    }

    /// Smallest layer among the tiles that are still face down.
    #[must_use]
    pub fn min_face_down_layer(&self) -> Option<Layer> {
        self.tiles
            .iter()
            .filter(|t| t.state() == TileState::FaceDown)
            .map(|t| t.layer)
            .min()
    }

    fn touches_opened(&self, tile: &Tile) -> bool {
        self.tiles
            .iter()
            .any(|t| t.state().is_opened() && t.is_adjacent(tile))
    }

    /// Tiles that may be revealed next: face down, on the current minimum
    /// layer, and touching an opened tile.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<usize> {
        let Some(min_layer) = self.min_face_down_layer() else {
            return Vec::new();
        };
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, tile)| {
                tile.state() == TileState::FaceDown
                    && tile.layer == min_layer
                    && self.touches_opened(tile)
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    #[must_use]
    pub fn is_legal(&self, idx: usize) -> bool {
        self.legal_moves().contains(&idx)
    }

    /// Every tile resolved; buried tiles do not count.
    #[must_use]
    pub fn all_resolved(&self) -> bool {
        self.tiles.len() == TILES_PER_LOCATION
            && self
                .tiles
                .iter()
                .all(|t| t.state() == TileState::Resolved)
    }

    /// Indices of snare tiles still holding an active debuff.
    #[must_use]
    pub fn open_snares(&self) -> Vec<usize> {
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| t.card.kind == CardKind::Snare && t.state() == TileState::Revealed)
            .map(|(idx, _)| idx)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::SHIPPED_LOCATIONS;
    use crate::rng::ParkMiller;

    fn blank_cards() -> Vec<Card> {
        (0..9)
            .map(|i| Card::new(format!("Card {i}"), CardKind::Scene))
            .collect()
    }

    fn board_for(key: &str) -> Board {
        let template = crate::location::LocationTemplate::by_key(key).unwrap();
        Board::build(template, blank_cards())
    }

    #[test]
    fn tile_state_only_moves_forward() {
        let mut tile = Tile::new(1, 0, 0, Card::new("x", CardKind::Scene));
        assert!(!tile.advance(TileState::Resolved));
        assert!(tile.advance(TileState::Revealed));
        assert!(!tile.advance(TileState::FaceDown));
        assert!(tile.advance(TileState::Buried));
        assert!(!tile.advance(TileState::Resolved));
        assert!(!tile.advance(TileState::Revealed));
        assert_eq!(tile.state(), TileState::Buried);
    }

    #[test]
    fn start_comes_from_bottom_row() {
        for template in &SHIPPED_LOCATIONS {
            for seed in 1..20 {
                let mut board = Board::build(template, blank_cards());
                let start = board.choose_start(&mut ParkMiller::new(seed));
                let tile = board.tile(start).unwrap();
                assert_eq!(tile.y, template.bottom_row());
                assert_eq!(tile.state(), TileState::Revealed);
                assert_eq!(tile.layer, Layer::Finite(0));
                assert!(tile.start);
            }
        }
    }

    #[test]
    fn connected_layouts_layer_every_tile() {
        for template in SHIPPED_LOCATIONS.iter().filter(|t| t.is_connected()) {
            let mut board = Board::build(template, blank_cards());
            board.choose_start(&mut ParkMiller::new(5));
            let zeros = board
                .tiles()
                .iter()
                .filter(|t| t.layer == Layer::Finite(0))
                .count();
            assert_eq!(zeros, 1, "{}", template.key);
            assert!(
                board.tiles().iter().all(|t| t.layer.is_finite()),
                "{} left a tile unreached",
                template.key
            );
        }
    }

    #[test]
    fn frontier_clears_ring_by_ring() {
        let mut board = board_for("wastes");
        // bottom row of the 3x3 grid is y = 2; force the middle cell
        board.tiles[7].advance(TileState::Revealed);
        board.assign_layers(7);
        let legal = board.legal_moves();
        assert!(!legal.is_empty());
        assert!(legal.iter().all(|&i| board.tiles[i].layer == Layer::Finite(1)));

        for idx in legal {
            board.tiles[idx].advance(TileState::Revealed);
            board.tiles[idx].advance(TileState::Resolved);
        }
        let next = board.legal_moves();
        assert!(next.iter().all(|&i| board.tiles[i].layer == Layer::Finite(2)));
        assert_eq!(next.len(), 3);
    }

    #[test]
    fn diagonal_neighbours_share_a_layer() {
        let mut board = board_for("wastes");
        let at = |board: &Board, x: i32, y: i32| {
            board
                .tiles()
                .iter()
                .position(|t| (t.x, t.y) == (x, y))
                .unwrap()
        };
        let corner = at(&board, 0, 2);
        board.assign_layers(corner);
        assert_eq!(board.tiles()[at(&board, 1, 1)].layer, Layer::Finite(1));
        assert_eq!(board.tiles()[at(&board, 2, 0)].layer, Layer::Finite(2));
    }

    #[test]
    fn layering_from_a_missing_tile_is_a_no_op() {
        let mut board = board_for("wastes");
        board.assign_layers(42);
        assert!(board.tiles().iter().all(|t| t.layer == Layer::Unreached));
        assert!(board.legal_moves().is_empty());
    }

    #[test]
    fn buried_tiles_still_extend_the_frontier() {
        let mut board = board_for("rotglade");
        let start = 8; // (1,5), only bottom-row cell
        board.tiles[start].advance(TileState::Revealed);
        board.assign_layers(start);
        board.tiles[start].advance(TileState::Buried);
        assert_eq!(board.legal_moves(), vec![7]);
    }

    #[test]
    fn disconnected_spiremaze_stalls() {
        let mut board = board_for("spiremaze");
        let start = board.choose_start(&mut ParkMiller::new(1));
        assert_eq!(board.tile(start).map(|t| (t.x, t.y)), Some((0, 4)));
        loop {
            let legal = board.legal_moves();
            let Some(&idx) = legal.first() else { break };
            board.tiles[idx].advance(TileState::Revealed);
            board.tiles[idx].advance(TileState::Resolved);
        }
        assert_eq!(board.face_down_count(), 4);
        assert!(board.tiles().iter().filter(|t| t.x == 2).all(|t| !t.layer.is_finite()));
    }

    #[test]
    fn all_resolved_ignores_buried() {
        let mut board = board_for("wastes");
        for tile in &mut board.tiles {
            tile.advance(TileState::Revealed);
            tile.advance(TileState::Resolved);
        }
        assert!(board.all_resolved());

        let mut buried = board_for("wastes");
        for (idx, tile) in buried.tiles.iter_mut().enumerate() {
            tile.advance(TileState::Revealed);
            if idx == 0 {
                tile.advance(TileState::Buried);
            } else {
                tile.advance(TileState::Resolved);
            }
        }
        assert!(!buried.all_resolved());
    }

    #[test]
    fn short_card_lists_are_padded() {
        let template = &SHIPPED_LOCATIONS[0];
        let board = Board::build(template, vec![Card::new("Only", CardKind::Scene)]);
        assert_eq!(board.tiles().len(), 9);
        assert_eq!(board.tiles()[8].card.kind, CardKind::Location);
    }
}
