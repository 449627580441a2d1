use std::fmt::{Display, Formatter};
use lazy_static::lazy_static;
use crate::tile::TileId;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum MarkerKind {
    Prize,
    GemRed(u32),
    GemGreen(u32),
    GemYellow(u32),
    Bandit,
    Visa,
    Blank,
}

impl Display for MarkerKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MarkerKind::Prize => f.write_str("the prize"),
            MarkerKind::GemRed(value) => f.write_fmt(format_args!("a red gem worth ${}", value)),
            MarkerKind::GemGreen(value) => f.write_fmt(format_args!("a green gem worth ${}", value)),
            MarkerKind::GemYellow(value) => f.write_fmt(format_args!("a yellow gem worth ${}", value)),
            MarkerKind::Bandit => f.write_str("a bandit"),
            MarkerKind::Visa => f.write_str("a visa"),
            MarkerKind::Blank => f.write_str("nothing"),
        }
    }
}

impl MarkerKind {
    pub fn initial(&self) -> char {
        match self {
            MarkerKind::Prize => 'P',
            MarkerKind::GemRed(_) => 'R',
            MarkerKind::GemGreen(_) => 'G',
            MarkerKind::GemYellow(_) => 'Y',
            MarkerKind::Bandit => 'B',
            MarkerKind::Visa => 'V',
            MarkerKind::Blank => '-',
        }
    }

    /// Money paid out on reveal, if any.
    pub fn gem_value(&self) -> Option<u32> {
        match self {
            MarkerKind::GemRed(value) |
            MarkerKind::GemGreen(value) |
            MarkerKind::GemYellow(value) => Some(*value),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub revealed: bool,
    /// Back-reference for lookup only; the economy owns the placement.
    pub location: Option<TileId>,
}

impl Marker {
    pub fn new(kind: MarkerKind) -> Self {
        Self {
            kind,
            revealed: false,
            location: None,
        }
    }
}

lazy_static! {
    static ref REFERENCE_MARKERS: Vec<(MarkerKind, usize)> = vec![
        (MarkerKind::Prize, 1),
        (MarkerKind::GemRed(1000), 5),
        (MarkerKind::GemGreen(600), 5),
        (MarkerKind::GemYellow(300), 5),
        (MarkerKind::Bandit, 4),
        (MarkerKind::Visa, 3),
    ];
}

/// How many markers of each kind go into the draw pile. Order is kept so that a seeded shuffle
/// always starts from the same pile.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Composition(pub Vec<(MarkerKind, usize)>);

impl Composition {
    /// The reference game: one prize, five gems of each colour, four bandits, three visas, and
    /// blanks to cover the remaining cities.
    pub fn reference(num_cities: usize) -> Self {
        let mut entries = REFERENCE_MARKERS.clone();
        let fixed: usize = entries.iter().map(|(_, count)| count).sum();

        if num_cities > fixed {
            entries.push((MarkerKind::Blank, num_cities - fixed));
        }

        Self(entries)
    }

    pub fn total(&self) -> usize {
        self.0.iter().map(|(_, count)| count).sum()
    }

    pub fn count(&self, kind: MarkerKind) -> usize {
        self.0
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, count)| count)
            .sum()
    }

    /// Expands the composition into unplaced, unrevealed markers.
    pub fn markers(&self) -> Vec<Marker> {
        self.0
            .iter()
            .flat_map(|(kind, count)| std::iter::repeat(*kind).take(*count))
            .map(Marker::new)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::marker::{Composition, MarkerKind};

    #[test]
    fn test_reference_composition() {
        let composition = Composition::reference(30);
        assert_eq!(composition.total(), 30);
        assert_eq!(composition.count(MarkerKind::Prize), 1);
        assert_eq!(composition.count(MarkerKind::GemRed(1000)), 5);
        assert_eq!(composition.count(MarkerKind::Bandit), 4);
        assert_eq!(composition.count(MarkerKind::Visa), 3);
        assert_eq!(composition.count(MarkerKind::Blank), 7);
    }

    #[test]
    fn test_reference_composition_small_board() {
        // fewer cities than fixed markers: no blanks, the pile is larger than the board
        let composition = Composition::reference(10);
        assert_eq!(composition.total(), 23);
        assert_eq!(composition.count(MarkerKind::Blank), 0);
    }

    #[test]
    fn test_markers() {
        let composition = Composition(vec![(MarkerKind::Visa, 2), (MarkerKind::Blank, 0), (MarkerKind::Prize, 1)]);
        let kinds: Vec<MarkerKind> = composition.markers().iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![MarkerKind::Visa, MarkerKind::Visa, MarkerKind::Prize]);
        assert!(composition.markers().iter().all(|m| !m.revealed && m.location.is_none()));
    }

    #[test]
    fn test_gem_value() {
        assert_eq!(MarkerKind::GemYellow(300).gem_value(), Some(300));
        assert_eq!(MarkerKind::Bandit.gem_value(), None);
        assert_eq!(MarkerKind::GemRed(1000).to_string(), "a red gem worth $1000");
    }
}
