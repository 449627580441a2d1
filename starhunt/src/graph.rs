use ahash::HashMap;
use itertools::Itertools;
use thiserror::Error;
use crate::tile::{Tile, TileId};

#[derive(Error, Debug, Eq, PartialEq)]
pub enum GraphError {
    #[error("tile {0} already exists")]
    DuplicateTileId(TileId),
    #[error("tile {0} does not exist")]
    UnknownTile(TileId),
}

/// Undirected adjacency graph of the board. Knows nothing about the game beyond
/// connectivity and id lookup.
#[derive(Clone, Default)]
pub struct TileGraph {
    tiles: HashMap<TileId, Tile>,
}

impl TileGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tile(&mut self, id: TileId) -> Result<(), GraphError> {
        if self.tiles.contains_key(&id) {
            return Err(GraphError::DuplicateTileId(id));
        }

        self.tiles.insert(id, Tile::new(id));

        Ok(())
    }

    /// Inserts the symmetric edge `a <-> b`. Connecting an already connected pair is a no-op.
    pub fn connect(&mut self, a: TileId, b: TileId) -> Result<(), GraphError> {
        for id in [a, b] {
            if !self.tiles.contains_key(&id) {
                return Err(GraphError::UnknownTile(id));
            }
        }

        if let Some(tile) = self.tiles.get_mut(&a) {
            tile.link(b);
        }

        if let Some(tile) = self.tiles.get_mut(&b) {
            tile.link(a);
        }

        Ok(())
    }

    pub fn tile_by_id(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    pub fn contains(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// All tile ids in ascending order.
    pub fn ids(&self) -> Vec<TileId> {
        self.tiles.keys().copied().sorted().collect()
    }

    pub fn num_edges(&self) -> usize {
        self.tiles.values().map(Tile::degree).sum::<usize>() / 2
    }
}

#[cfg(test)]
mod test {
    use crate::graph::{GraphError, TileGraph};
    use crate::tile;
    use crate::tile::TileId;

    fn path(n: u16) -> TileGraph {
        let mut graph = TileGraph::new();
        for id in 1..=n {
            graph.add_tile(TileId(id)).unwrap();
        }
        for id in 1..n {
            graph.connect(TileId(id), TileId(id + 1)).unwrap();
        }
        graph
    }

    #[test]
    fn test_duplicate_tile() {
        let mut graph = path(3);
        assert_eq!(graph.add_tile(tile!("2")), Err(GraphError::DuplicateTileId(TileId(2))));
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn test_connect_unknown() {
        let mut graph = path(3);
        assert_eq!(graph.connect(tile!("1"), tile!("9")), Err(GraphError::UnknownTile(TileId(9))));
        assert_eq!(graph.connect(tile!("8"), tile!("1")), Err(GraphError::UnknownTile(TileId(8))));

        // nothing was half-linked
        assert_eq!(graph.tile_by_id(tile!("1")).unwrap().degree(), 1);
    }

    #[test]
    fn test_connect_is_symmetric() {
        let graph = path(3);
        let middle = graph.tile_by_id(tile!("2")).unwrap();
        assert_eq!(middle.neighbours().collect::<Vec<_>>(), vec![TileId(1), TileId(3)]);
        assert!(graph.tile_by_id(tile!("1")).unwrap().is_adjacent(TileId(2)));
        assert!(graph.tile_by_id(tile!("3")).unwrap().is_adjacent(TileId(2)));
    }

    #[test]
    fn test_connect_twice() {
        let mut graph = path(3);
        graph.connect(tile!("1"), tile!("2")).unwrap();
        graph.connect(tile!("2"), tile!("1")).unwrap();
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.tile_by_id(tile!("2")).unwrap().degree(), 2);
    }

    #[test]
    fn test_lookup() {
        let graph = path(4);
        assert!(graph.tile_by_id(tile!("4")).is_some());
        assert!(graph.tile_by_id(tile!("5")).is_none());
        assert_eq!(graph.ids(), vec![TileId(1), TileId(2), TileId(3), TileId(4)]);
    }
}
