use std::collections::BTreeSet;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum TileParseError {
    #[error("string is empty")]
    Empty,
    #[error("string starts with an invalid prefix")]
    InvalidPrefix,
    #[error("string end with an invalid number")]
    InvalidNumber,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TileId(pub u16);

/// A node of the board. Neighbours are kept in a set keyed by id, so connecting the same pair
/// twice leaves the adjacency unchanged and iteration order is stable.
#[derive(Clone, Debug)]
pub struct Tile {
    pub id: TileId,
    neighbours: BTreeSet<TileId>,
}

impl Tile {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            neighbours: BTreeSet::new(),
        }
    }

    pub fn neighbours(&self) -> impl Iterator<Item = TileId> + '_ {
        self.neighbours.iter().copied()
    }

    pub fn is_adjacent(&self, other: TileId) -> bool {
        self.neighbours.contains(&other)
    }

    pub fn degree(&self) -> usize {
        self.neighbours.len()
    }

    pub(crate) fn link(&mut self, other: TileId) -> bool {
        self.neighbours.insert(other)
    }
}

impl From<u16> for TileId {
    fn from(value: u16) -> Self {
        TileId(value)
    }
}

impl TryFrom<&str> for TileId {
    type Error = TileParseError;

    /// Accepts either the bare number (`"17"`) or the display form (`"T17"`).
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let value = value.trim();

        let Some(first) = value.chars().next() else {
            return Err(TileParseError::Empty);
        };

        let digits = match first {
            'T' | 't' => &value[1..],
            '0'..='9' => value,
            _ => return Err(TileParseError::InvalidPrefix),
        };

        let Ok(id) = u16::from_str(digits) else {
            return Err(TileParseError::InvalidNumber);
        };

        Ok(TileId(id))
    }
}

impl FromStr for TileId {
    type Err = TileParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TileId::try_from(s)
    }
}

impl Debug for TileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_string().as_str())
    }
}

impl Display for TileId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("T{}", self.0))
    }
}

#[macro_export]
macro_rules! tile {
    ($tile:literal) => {
        $crate::tile::TileId::try_from($tile).expect("a valid tile string")
    };
}
