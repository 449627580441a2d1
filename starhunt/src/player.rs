use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use crate::PlayerId;
use crate::tile::TileId;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Item {
    Prize,
    Visa,
}

impl Item {
    pub fn tag(&self) -> &'static str {
        match self {
            Item::Prize => "prize",
            Item::Visa => "visa",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "prize" => Some(Item::Prize),
            "visa" => Some(Item::Visa),
            _ => None,
        }
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub colour: String,
    pub tile: TileId,
    pub inventory: BTreeSet<Item>,
    pub skip_next_turn: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, colour: impl Into<String>, tile: TileId) -> Self {
        Self {
            id,
            name: name.into(),
            colour: colour.into(),
            tile,
            inventory: BTreeSet::new(),
            skip_next_turn: false,
        }
    }

    pub fn has(&self, item: Item) -> bool {
        self.inventory.contains(&item)
    }

    /// Adding an item the player already holds changes nothing.
    pub fn give(&mut self, item: Item) {
        self.inventory.insert(item);
    }
}
