use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use ahash::HashMap;
use itertools::Itertools;
use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;
use crate::marker::{Composition, Marker, MarkerKind};
use crate::money::{Ledger, LedgerError};
use crate::player::{Item, Player};
use crate::tile::TileId;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum EconomyError {
    #[error("there is no marker on tile {0}")]
    NoMarkerHere(TileId),
    #[error("a balance of ${balance} does not cover the cost of ${cost}")]
    InsufficientFunds {
        balance: u32,
        cost: u32,
    },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// What happened when a marker was turned over.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Reveal {
    pub kind: MarkerKind,
    pub gained: u32,
    pub lost: u32,
}

impl Display for Reveal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            MarkerKind::Bandit if self.lost > 0 => {
                f.write_fmt(format_args!("a bandit who steals ${}", self.lost))
            }
            MarkerKind::Bandit => f.write_str("a bandit, but there was nothing to steal"),
            kind => f.write_fmt(format_args!("{}", kind)),
        }
    }
}

/// Hidden markers on the board, the set of starting tiles, and whether the prize has been found.
#[derive(Clone, Debug, Default)]
pub struct MarkerEconomy {
    placements: HashMap<TileId, Marker>,
    starting_tiles: BTreeSet<TileId>,
    prize_found: bool,
}

impl MarkerEconomy {
    pub fn new(starting_tiles: impl IntoIterator<Item = TileId>) -> Self {
        Self {
            placements: Default::default(),
            starting_tiles: starting_tiles.into_iter().collect(),
            prize_found: false,
        }
    }

    /// Shuffles the markers of `composition` and deals one onto each city tile. Surplus markers
    /// are dropped when there are more markers than cities; surplus cities stay empty.
    ///
    /// Returns the number of markers placed.
    pub fn distribute<R: Rng>(&mut self, rng: &mut R, city_tiles: &[TileId], composition: &Composition) -> usize {
        let cities: Vec<TileId> = city_tiles.iter().copied().sorted().dedup().collect();

        let mut markers = composition.markers();
        markers.shuffle(rng);

        if markers.len() > cities.len() {
            log::warn!(
                "{} markers for {} cities, {} markers left off the board",
                markers.len(),
                cities.len(),
                markers.len() - cities.len()
            );
        }

        self.placements.clear();

        for (tile, mut marker) in cities.into_iter().zip(markers) {
            marker.location = Some(tile);
            self.placements.insert(tile, marker);
        }

        self.placements.len()
    }

    pub fn marker_at(&self, tile: TileId) -> Option<&Marker> {
        self.placements.get(&tile)
    }

    pub fn has_marker(&self, tile: TileId) -> bool {
        self.placements.contains_key(&tile)
    }

    /// Tiles still carrying a marker, in ascending order.
    pub fn marker_tiles(&self) -> Vec<TileId> {
        self.placements.keys().copied().sorted().collect()
    }

    pub fn num_markers(&self) -> usize {
        self.placements.len()
    }

    pub fn remove(&mut self, tile: TileId) -> Option<Marker> {
        let mut marker = self.placements.remove(&tile)?;
        marker.location = None;
        Some(marker)
    }

    /// Applies the effect of `marker` to `player` and flips it face up.
    pub fn resolve(&mut self, marker: &mut Marker, player: &mut Player, ledger: &mut Ledger) -> Result<Reveal, LedgerError> {
        let mut reveal = Reveal {
            kind: marker.kind,
            gained: 0,
            lost: 0,
        };

        match marker.kind {
            MarkerKind::Prize => {
                self.prize_found = true;
                player.give(Item::Prize);
            }
            MarkerKind::GemRed(value) |
            MarkerKind::GemGreen(value) |
            MarkerKind::GemYellow(value) => {
                ledger.deposit(player.id, value)?;
                reveal.gained = value;
            }
            MarkerKind::Bandit => {
                let balance = ledger.balance_of(player.id);
                if balance > 0 && ledger.withdraw(player.id, balance)? {
                    reveal.lost = balance;
                }
            }
            MarkerKind::Visa => {
                player.give(Item::Visa);
            }
            MarkerKind::Blank => {}
        }

        marker.revealed = true;

        Ok(reveal)
    }

    /// Takes the marker off `tile` and resolves it for `player`. `Ok(None)` if the tile is empty.
    pub fn reveal_at(&mut self, tile: TileId, player: &mut Player, ledger: &mut Ledger) -> Result<Option<Reveal>, LedgerError> {
        let Some(mut marker) = self.remove(tile) else {
            return Ok(None);
        };

        match self.resolve(&mut marker, player, ledger) {
            Ok(reveal) => Ok(Some(reveal)),
            Err(err) => {
                marker.location = Some(tile);
                self.placements.insert(tile, marker);
                Err(err)
            }
        }
    }

    /// Pays `cost` to turn over the marker on `tile`. Both checks happen before anything is
    /// mutated, and a failing reveal refunds the cost, so the balance only ever moves as a whole.
    pub fn buy_guaranteed_reveal(&mut self, player: &mut Player, tile: TileId, ledger: &mut Ledger, cost: u32) -> Result<Reveal, EconomyError> {
        if !self.has_marker(tile) {
            return Err(EconomyError::NoMarkerHere(tile));
        }

        let balance = ledger.balance_of(player.id);
        if balance < cost {
            return Err(EconomyError::InsufficientFunds { balance, cost });
        }

        if cost > 0 && !ledger.withdraw(player.id, cost)? {
            return Err(EconomyError::InsufficientFunds { balance, cost });
        }

        match self.reveal_at(tile, player, ledger) {
            Ok(Some(reveal)) => Ok(reveal),
            Ok(None) => Err(EconomyError::NoMarkerHere(tile)),
            Err(err) => {
                if cost > 0 {
                    ledger.deposit(player.id, cost)?;
                }
                Err(err.into())
            }
        }
    }

    pub fn is_starting_tile(&self, tile: TileId) -> bool {
        self.starting_tiles.contains(&tile)
    }

    pub fn starting_tiles(&self) -> impl Iterator<Item = TileId> + '_ {
        self.starting_tiles.iter().copied()
    }

    pub fn prize_found(&self) -> bool {
        self.prize_found
    }

    /// A player wins back on a starting tile, either carrying the prize or holding a visa once
    /// the prize is known to be found.
    pub fn check_victory(&self, player: &Player, tile: TileId) -> bool {
        self.is_starting_tile(tile) &&
            (player.has(Item::Prize) || (self.prize_found && player.has(Item::Visa)))
    }
}

#[cfg(test)]
mod test {
    use rand::SeedableRng;
    use crate::economy::{EconomyError, MarkerEconomy};
    use crate::marker::{Composition, Marker, MarkerKind};
    use crate::money::Ledger;
    use crate::player::{Item, Player};
    use crate::{tile, PlayerId};
    use crate::tile::TileId;

    fn setup(balance: u32) -> (MarkerEconomy, Player, Ledger) {
        let economy = MarkerEconomy::new([tile!("1"), tile!("2")]);
        let player = Player::new(PlayerId(0), "Ada", "red", tile!("1"));
        let mut ledger = Ledger::new(balance);
        ledger.open(player.id);
        (economy, player, ledger)
    }

    fn cities(n: u16) -> Vec<TileId> {
        (10..10 + n).map(TileId).collect()
    }

    fn place(economy: &mut MarkerEconomy, tile: TileId, kind: MarkerKind) {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(0);
        economy.distribute(&mut rng, &[tile], &Composition(vec![(kind, 1)]));
    }

    #[test]
    fn test_distribute_reference() {
        let (mut economy, _, _) = setup(0);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2);
        let cities = cities(30);

        let placed = economy.distribute(&mut rng, &cities, &Composition::reference(cities.len()));
        assert_eq!(placed, 30);

        let prizes = cities
            .iter()
            .filter(|tile| economy.marker_at(**tile).map(|m| m.kind) == Some(MarkerKind::Prize))
            .count();
        assert_eq!(prizes, 1);

        for tile in &cities {
            let marker = economy.marker_at(*tile).unwrap();
            assert_eq!(marker.location, Some(*tile));
            assert!(!marker.revealed);
        }
    }

    #[test]
    fn test_distribute_truncates() {
        let (mut economy, _, _) = setup(0);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2);
        let cities = cities(8);

        let placed = economy.distribute(&mut rng, &cities, &Composition::reference(cities.len()));
        assert_eq!(placed, 8);
        assert_eq!(economy.num_markers(), 8);
    }

    #[test]
    fn test_distribute_is_seeded() {
        let cities = cities(25);
        let layout = |seed: u64| {
            let (mut economy, _, _) = setup(0);
            let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
            economy.distribute(&mut rng, &cities, &Composition::reference(cities.len()));
            cities.iter().map(|t| economy.marker_at(*t).unwrap().kind).collect::<Vec<_>>()
        };

        assert_eq!(layout(7), layout(7));
    }

    #[test]
    fn test_distribute_empty_composition() {
        let (mut economy, _, _) = setup(0);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2);
        assert_eq!(economy.distribute(&mut rng, &cities(5), &Composition::default()), 0);
        assert!(economy.marker_tiles().is_empty());
    }

    #[test]
    fn test_resolve_effects() {
        let (mut economy, mut player, mut ledger) = setup(300);

        let mut gem = Marker::new(MarkerKind::GemGreen(600));
        let reveal = economy.resolve(&mut gem, &mut player, &mut ledger).unwrap();
        assert!(gem.revealed);
        assert_eq!(reveal.gained, 600);
        assert_eq!(ledger.balance_of(player.id), 900);

        let mut visa = Marker::new(MarkerKind::Visa);
        economy.resolve(&mut visa, &mut player, &mut ledger).unwrap();
        assert!(player.has(Item::Visa));
        assert!(!economy.prize_found());

        let mut blank = Marker::new(MarkerKind::Blank);
        economy.resolve(&mut blank, &mut player, &mut ledger).unwrap();
        assert!(blank.revealed);
        assert_eq!(ledger.balance_of(player.id), 900);

        let mut prize = Marker::new(MarkerKind::Prize);
        economy.resolve(&mut prize, &mut player, &mut ledger).unwrap();
        assert!(economy.prize_found());
        assert!(player.has(Item::Prize));
    }

    #[test]
    fn test_bandit_takes_everything() {
        let (mut economy, mut player, mut ledger) = setup(1000);

        let mut bandit = Marker::new(MarkerKind::Bandit);
        let reveal = economy.resolve(&mut bandit, &mut player, &mut ledger).unwrap();
        assert_eq!(reveal.lost, 1000);
        assert_eq!(ledger.balance_of(player.id), 0);

        // a second bandit on an empty purse is a no-op
        let mut bandit = Marker::new(MarkerKind::Bandit);
        let reveal = economy.resolve(&mut bandit, &mut player, &mut ledger).unwrap();
        assert_eq!(reveal.lost, 0);
        assert_eq!(ledger.balance_of(player.id), 0);
        assert_eq!(reveal.to_string(), "a bandit, but there was nothing to steal");
    }

    #[test]
    fn test_reveal_at_removes() {
        let (mut economy, mut player, mut ledger) = setup(300);
        place(&mut economy, tile!("10"), MarkerKind::GemYellow(300));

        let reveal = economy.reveal_at(tile!("10"), &mut player, &mut ledger).unwrap().unwrap();
        assert_eq!(reveal.kind, MarkerKind::GemYellow(300));
        assert!(!economy.has_marker(tile!("10")));
        assert_eq!(economy.reveal_at(tile!("10"), &mut player, &mut ledger), Ok(None));
    }

    #[test]
    fn test_buy_with_exact_balance() {
        let (mut economy, mut player, mut ledger) = setup(100);
        place(&mut economy, tile!("10"), MarkerKind::GemRed(1000));

        let reveal = economy.buy_guaranteed_reveal(&mut player, tile!("10"), &mut ledger, 100).unwrap();
        assert_eq!(reveal.gained, 1000);
        assert_eq!(ledger.balance_of(player.id), 1000);
        assert!(!economy.has_marker(tile!("10")));
    }

    #[test]
    fn test_buy_one_short() {
        let (mut economy, mut player, mut ledger) = setup(99);
        place(&mut economy, tile!("10"), MarkerKind::GemRed(1000));

        let result = economy.buy_guaranteed_reveal(&mut player, tile!("10"), &mut ledger, 100);
        assert_eq!(result, Err(EconomyError::InsufficientFunds { balance: 99, cost: 100 }));
        assert_eq!(ledger.balance_of(player.id), 99);
        assert!(economy.has_marker(tile!("10")));
        assert!(!economy.marker_at(tile!("10")).unwrap().revealed);
    }

    #[test]
    fn test_buy_without_marker() {
        let (mut economy, mut player, mut ledger) = setup(500);
        let result = economy.buy_guaranteed_reveal(&mut player, tile!("10"), &mut ledger, 100);
        assert_eq!(result, Err(EconomyError::NoMarkerHere(tile!("10"))));
        assert_eq!(ledger.balance_of(player.id), 500);
    }

    #[test]
    fn test_buy_bandit_after_cost() {
        let (mut economy, mut player, mut ledger) = setup(500);
        place(&mut economy, tile!("10"), MarkerKind::Bandit);

        let reveal = economy.buy_guaranteed_reveal(&mut player, tile!("10"), &mut ledger, 100).unwrap();
        assert_eq!(reveal.lost, 400);
        assert_eq!(ledger.balance_of(player.id), 0);
    }

    #[test]
    fn test_failed_reveal_refunds() {
        let (mut economy, mut player, mut ledger) = setup(500);
        place(&mut economy, tile!("10"), MarkerKind::GemRed(0));

        let result = economy.buy_guaranteed_reveal(&mut player, tile!("10"), &mut ledger, 100);
        assert!(matches!(result, Err(EconomyError::Ledger(_))));
        assert_eq!(ledger.balance_of(player.id), 500);
        assert_eq!(economy.marker_at(tile!("10")).unwrap().location, Some(tile!("10")));
    }

    #[test]
    fn test_victory() {
        let (mut economy, mut player, mut ledger) = setup(0);

        player.give(Item::Visa);
        assert!(!economy.check_victory(&player, tile!("1")));

        let mut other = Player::new(PlayerId(1), "Bo", "blue", tile!("12"));
        let mut prize = Marker::new(MarkerKind::Prize);
        economy.resolve(&mut prize, &mut other, &mut ledger).unwrap();

        assert!(economy.check_victory(&player, tile!("1")));
        assert!(economy.check_victory(&player, tile!("2")));
        assert!(!economy.check_victory(&player, tile!("3")));

        assert!(economy.check_victory(&other, tile!("2")));
        assert!(!economy.check_victory(&other, tile!("12")));
    }
}
