//! Fixed nine-cell layouts for every location.

use serde::Serialize;

pub const TILES_PER_LOCATION: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub id: u8,
    pub x: i32,
    pub y: i32,
}

const fn c(id: u8, x: i32, y: i32) -> Cell {
    Cell { id, x, y }
}

/// Rook or diagonal neighbour (Chebyshev distance 1).
#[must_use]
pub const fn adjacent(ax: i32, ay: i32, bx: i32, by: i32) -> bool {
    let dx = (ax - bx).abs();
    let dy = (ay - by).abs();
    dx + dy == 1 || (dx == 1 && dy == 1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LocationTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub cells: [Cell; TILES_PER_LOCATION],
}

impl LocationTemplate {
    /// Largest `y`; the start tile is drawn from this row.
    #[must_use]
    pub fn bottom_row(&self) -> i32 {
        self.cells.iter().map(|cell| cell.y).max().unwrap_or(0)
    }

    /// Whether every cell can be reached from every other cell.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let mut seen = [false; TILES_PER_LOCATION];
        let mut stack = vec![0usize];
        seen[0] = true;
        while let Some(idx) = stack.pop() {
            let Some(from) = self.cells.get(idx).copied() else {
                continue;
            };
            for (next, cell) in self.cells.iter().enumerate() {
                if !seen[next] && adjacent(from.x, from.y, cell.x, cell.y) {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        seen.iter().all(|s| *s)
    }

    #[must_use]
    pub fn by_key(key: &str) -> Option<&'static Self> {
        SHIPPED_LOCATIONS.iter().find(|loc| loc.key == key)
    }
}

pub static SHIPPED_LOCATIONS: [LocationTemplate; 9] = [
    LocationTemplate {
        key: "termina",
        name: "Home Village Termina",
        cells: [
            c(1, 0, 0),
            c(2, 1, 0),
            c(3, 2, 0),
            c(4, 1, 1),
            c(5, 0, 2),
            c(6, 1, 2),
            c(7, 2, 2),
            c(8, 1, 3),
            c(9, 1, 4),
        ],
    },
    LocationTemplate {
        key: "worship",
        name: "Shrine of Worship",
        cells: [
            c(1, 1, 0),
            c(2, 0, 1),
            c(3, 1, 1),
            c(4, 2, 1),
            c(5, 1, 2),
            c(6, 0, 3),
            c(7, 1, 3),
            c(8, 2, 3),
            c(9, 1, 4),
        ],
    },
    LocationTemplate {
        key: "valthria",
        name: "Bannered City Valthria",
        cells: [
            c(1, 0, 0),
            c(2, 1, 0),
            c(3, 2, 0),
            c(4, 3, 0),
            c(5, 2, 1),
            c(6, 0, 2),
            c(7, 1, 2),
            c(8, 2, 2),
            c(9, 3, 2),
        ],
    },
    LocationTemplate {
        key: "spiremaze",
        name: "Caelith Spiremaze",
        cells: [
            c(1, 0, 0),
            c(2, 2, 0),
            c(3, 0, 1),
            c(4, 2, 1),
            c(5, 0, 2),
            c(6, 2, 2),
            c(7, 0, 3),
            c(8, 2, 3),
            c(9, 0, 4),
        ],
    },
    LocationTemplate {
        key: "brume",
        name: "Darkwood Brume",
        cells: [
            c(1, 0, 0),
            c(2, 1, 0),
            c(3, 0, 1),
            c(4, 2, 1),
            c(5, 1, 2),
            c(6, 0, 3),
            c(7, 2, 3),
            c(8, 1, 4),
            c(9, 2, 4),
        ],
    },
    LocationTemplate {
        key: "wastes",
        name: "Sicorro Wastes",
        cells: [
            c(1, 0, 0),
            c(2, 1, 0),
            c(3, 2, 0),
            c(4, 0, 1),
            c(5, 1, 1),
            c(6, 2, 1),
            c(7, 0, 2),
            c(8, 1, 2),
            c(9, 2, 2),
        ],
    },
    LocationTemplate {
        key: "rotglade",
        name: "Amara Rot Glade",
        cells: [
            c(1, 1, 0),
            c(2, 0, 1),
            c(3, 2, 1),
            c(4, 1, 2),
            c(5, 2, 2),
            c(6, 0, 3),
            c(7, 2, 3),
            c(8, 1, 4),
            c(9, 1, 5),
        ],
    },
    LocationTemplate {
        key: "frozengaol",
        name: "Frozen Gaol",
        cells: [
            c(1, 0, 0),
            c(2, 1, 0),
            c(3, 0, 1),
            c(4, 1, 1),
            c(5, 2, 1),
            c(6, 1, 2),
            c(7, 2, 2),
            c(8, 2, 3),
            c(9, 3, 3),
        ],
    },
    LocationTemplate {
        key: "nightsea",
        name: "Nightsea Expanse",
        cells: [
            c(1, 0, 0),
            c(2, 2, 0),
            c(3, 1, 1),
            c(4, 0, 2),
            c(5, 1, 2),
            c(6, 2, 2),
            c(7, 1, 3),
            c(8, 0, 4),
            c(9, 2, 4),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacency_is_rook_plus_diagonal() {
        assert!(adjacent(0, 0, 1, 0));
        assert!(adjacent(0, 0, 1, 1));
        assert!(!adjacent(0, 0, 2, 0));
        assert!(!adjacent(0, 0, 0, 0));
        assert!(!adjacent(0, 0, 2, 1));
    }

    #[test]
    fn keys_are_unique_and_resolvable() {
        for loc in &SHIPPED_LOCATIONS {
            assert_eq!(LocationTemplate::by_key(loc.key).map(|l| l.name), Some(loc.name));
        }
        assert!(LocationTemplate::by_key("atlantis").is_none());
    }

    #[test]
    fn cell_ids_run_one_to_nine() {
        for loc in &SHIPPED_LOCATIONS {
            let ids: Vec<u8> = loc.cells.iter().map(|cell| cell.id).collect();
            assert_eq!(ids, (1..=9).collect::<Vec<u8>>(), "{}", loc.key);
        }
    }
}
