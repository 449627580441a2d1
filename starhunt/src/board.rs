use std::collections::BTreeSet;
use crate::graph::{GraphError, TileGraph};
use crate::tile::TileId;

const DEMO_WIDTH: u16 = 10;
const DEMO_HEIGHT: u16 = 8;

/// A board as handed over by whatever loaded it: tile ids, undirected edges, and the ids flagged
/// special or starting.
#[derive(Clone, Debug, Default)]
pub struct Board {
    pub tiles: Vec<TileId>,
    pub edges: Vec<(TileId, TileId)>,
    pub special: BTreeSet<TileId>,
    pub starting: BTreeSet<TileId>,
}

/// A player entry as handed over by whatever loaded the roster.
#[derive(Clone, Debug)]
pub struct Roster {
    pub name: String,
    pub colour: String,
    pub start: TileId,
}

impl Roster {
    pub fn new(name: impl Into<String>, colour: impl Into<String>, start: TileId) -> Self {
        Self {
            name: name.into(),
            colour: colour.into(),
            start,
        }
    }
}

impl Board {
    /// Builds the adjacency graph and checks that every flagged id is on it.
    pub fn build(&self) -> Result<TileGraph, GraphError> {
        let mut graph = TileGraph::new();

        for id in &self.tiles {
            graph.add_tile(*id)?;
        }

        for (a, b) in &self.edges {
            graph.connect(*a, *b)?;
        }

        if let Some(id) = self.special.iter().chain(&self.starting).find(|id| !graph.contains(**id)) {
            return Err(GraphError::UnknownTile(*id));
        }

        Ok(graph)
    }

    pub fn is_special(&self, tile: TileId) -> bool {
        self.special.contains(&tile)
    }

    pub fn is_starting(&self, tile: TileId) -> bool {
        self.starting.contains(&tile)
    }

    /// Special tiles that are not starting tiles; these receive the hidden markers.
    pub fn cities(&self) -> Vec<TileId> {
        self.special.difference(&self.starting).copied().collect()
    }

    /// A 10x8 grid with a few diagonal shortcuts. Every third tile is a city and the two
    /// opposite corners are the starting tiles.
    pub fn demo() -> Self {
        let id = |x: u16, y: u16| TileId(y * DEMO_WIDTH + x + 1);

        let mut board = Board::default();

        for y in 0..DEMO_HEIGHT {
            for x in 0..DEMO_WIDTH {
                board.tiles.push(id(x, y));

                if x + 1 < DEMO_WIDTH {
                    board.edges.push((id(x, y), id(x + 1, y)));
                }

                if y + 1 < DEMO_HEIGHT {
                    board.edges.push((id(x, y), id(x, y + 1)));
                }

                if (x + 2 * y) % 3 == 0 {
                    board.special.insert(id(x, y));
                }
            }
        }

        for (x, y) in [(2, 2), (6, 1), (4, 5), (7, 5)] {
            board.edges.push((id(x, y), id(x + 1, y + 1)));
        }

        let home = id(0, 0);
        let away = id(DEMO_WIDTH - 1, DEMO_HEIGHT - 1);

        board.starting.insert(home);
        board.starting.insert(away);
        board.special.insert(home);
        board.special.insert(away);

        board
    }
}
