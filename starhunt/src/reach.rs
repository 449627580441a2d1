use std::collections::VecDeque;
use ahash::HashSet;
use crate::graph::TileGraph;
use crate::tile::TileId;

/// Computes the tiles a token on `start` may legally stop on after rolling `roll`.
///
/// Breadth-first from `start` with one visited set shared by the whole search, so every tile is
/// attributed to the depth at which it is first reached (its shortest distance). A special tile
/// is a valid stop at any depth up to `roll`; any other tile only when its depth equals `roll`.
/// Tiles whose shortest distance is below `roll` are never reconsidered via a longer path.
///
/// Returns an empty set when `roll < 1` or `start` is not on the board. The start tile is never
/// part of the result.
pub fn reachable_tiles<F>(graph: &TileGraph, start: TileId, roll: i32, is_special: F) -> HashSet<TileId>
where
    F: Fn(TileId) -> bool,
{
    let mut reachable: HashSet<TileId> = Default::default();

    if roll < 1 || !graph.contains(start) {
        return reachable;
    }

    let mut queue: VecDeque<(TileId, i32)> = Default::default();
    let mut visited: HashSet<TileId> = Default::default();

    visited.insert(start);
    queue.push_back((start, 0));

    while let Some((id, depth)) = queue.pop_front() {
        let Some(tile) = graph.tile_by_id(id) else {
            continue;
        };

        let next_depth = depth + 1;

        for neighbour in tile.neighbours() {
            if !visited.insert(neighbour) {
                continue;
            }

            if next_depth == roll || is_special(neighbour) {
                reachable.insert(neighbour);
            }

            if next_depth < roll {
                queue.push_back((neighbour, next_depth));
            }
        }
    }

    log::debug!("{} reaches {} tiles with a roll of {}", start, reachable.len(), roll);

    reachable
}
