pub mod tile;
pub mod graph;
pub mod reach;
pub mod marker;
pub mod economy;
pub mod money;
pub mod player;
pub mod board;

use std::collections::BTreeSet;
use std::fmt::{Debug, Display, Formatter};
use ahash::HashSet;
use itertools::Itertools;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use board::{Board, Roster};
use economy::{EconomyError, MarkerEconomy, Reveal};
use graph::{GraphError, TileGraph};
use marker::Composition;
use money::{Ledger, LedgerError};
use player::{Item, Player};
use tile::TileId;

#[derive(Error, Debug, Eq, PartialEq)]
pub enum GameError {
    #[error("the die has not been rolled yet")]
    NotRolled,
    #[error("the die has already been rolled this turn")]
    AlreadyRolled,
    #[error("{0} cannot be reached with the current roll")]
    IllegalMove(TileId),
    #[error("a balance of ${balance} does not cover the cost of ${cost}")]
    InsufficientFunds {
        balance: u32,
        cost: u32,
    },
    #[error("there is no marker on tile {0}")]
    NoMarkerHere(TileId),
    #[error("the game is already over")]
    GameFinished,
    #[error("player index {0} is out of range")]
    IndexOutOfRange(usize),
    #[error("tile {0} is not on the board")]
    UnknownTile(TileId),
    #[error("tile {0} is on the board twice")]
    DuplicateTileId(TileId),
    #[error("a roll of {0} is not on the die")]
    InvalidRoll(u8),
    #[error("a game needs at least one player")]
    NoPlayers,
    #[error("a game supports at most 256 players")]
    TooManyPlayers,
    #[error("snapshot has {found} players but the game has {expected}")]
    SnapshotMismatch {
        expected: usize,
        found: usize,
    },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl GameError {
    /// True for refusals that are part of normal play (the caller shows the reason and carries
    /// on), false for misuse of the engine.
    pub fn is_rule_rejection(&self) -> bool {
        matches!(
            self,
            GameError::NotRolled |
            GameError::AlreadyRolled |
            GameError::IllegalMove(_) |
            GameError::InsufficientFunds { .. } |
            GameError::NoMarkerHere(_) |
            GameError::GameFinished
        )
    }
}

impl From<GraphError> for GameError {
    fn from(value: GraphError) -> Self {
        match value {
            GraphError::UnknownTile(tile) => GameError::UnknownTile(tile),
            GraphError::DuplicateTileId(tile) => GameError::DuplicateTileId(tile),
        }
    }
}

impl From<EconomyError> for GameError {
    fn from(value: EconomyError) -> Self {
        match value {
            EconomyError::NoMarkerHere(tile) => GameError::NoMarkerHere(tile),
            EconomyError::InsufficientFunds { balance, cost } => GameError::InsufficientFunds { balance, cost },
            EconomyError::Ledger(err) => GameError::Ledger(err),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Options {
    pub starting_money: u32,
    pub reveal_cost: u32,
    pub die_faces: u8,
    /// `None` deals the reference composition sized to the board's cities.
    pub composition: Option<Composition>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            starting_money: 300,
            reveal_cost: 100,
            die_faces: 6,
            composition: None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    AwaitingRoll,
    AwaitingMove,
    Finished,
}

#[derive(Clone)]
pub struct Game {
    phase: Phase,
    graph: TileGraph,
    special: HashSet<TileId>,
    economy: MarkerEconomy,
    ledger: Ledger,
    players: Vec<Player>,
    current_player: usize,
    roll: u8,
    reachable: HashSet<TileId>,
    winner: Option<PlayerId>,
    reveal_cost: u32,
    die_faces: u8,
    turn: u32,
    rng: ChaCha8Rng,
}

impl Game {
    pub fn new(mut rng: ChaCha8Rng, board: &Board, roster: &[Roster], options: &Options) -> Result<Self, GameError> {
        if roster.is_empty() {
            return Err(GameError::NoPlayers);
        }

        if roster.len() > u8::MAX as usize + 1 {
            return Err(GameError::TooManyPlayers);
        }

        let graph = board.build()?;

        if let Some(entry) = roster.iter().find(|entry| !graph.contains(entry.start)) {
            return Err(GameError::UnknownTile(entry.start));
        }

        let cities = board.cities();
        let composition = options
            .composition
            .clone()
            .unwrap_or_else(|| Composition::reference(cities.len()));

        if composition.0.iter().any(|(kind, _)| kind.gem_value() == Some(0)) {
            return Err(GameError::Ledger(LedgerError::InvalidAmount));
        }

        let mut economy = MarkerEconomy::new(board.starting.iter().copied());
        let placed = economy.distribute(&mut rng, &cities, &composition);

        let mut ledger = Ledger::new(options.starting_money);

        let players: Vec<Player> = roster
            .iter()
            .enumerate()
            .map(|(idx, entry)| Player::new(PlayerId(idx as u8), entry.name.clone(), entry.colour.clone(), entry.start))
            .collect();

        for player in &players {
            ledger.open(player.id);
        }

        log::info!(
            "new game: {} tiles, {} cities, {} markers placed, {} players",
            graph.len(),
            cities.len(),
            placed,
            players.len()
        );

        Ok(Self {
            phase: Phase::AwaitingRoll,
            graph,
            special: board.special.iter().copied().collect(),
            economy,
            ledger,
            players,
            current_player: 0,
            roll: 0,
            reachable: Default::default(),
            winner: None,
            reveal_cost: options.reveal_cost,
            die_faces: options.die_faces.max(1),
            turn: 1,
            rng,
        })
    }

    /// Turn actions open to the current player. Paid reveals are available at any point of a
    /// running game and are not listed.
    pub fn actions(&self) -> Vec<Action> {
        match self.phase {
            Phase::AwaitingRoll => vec![Action::Roll],
            Phase::AwaitingMove => self.reachable().into_iter().map(Action::Move).collect(),
            Phase::Finished => vec![],
        }
    }

    pub fn apply_action(&mut self, action: Action) -> Result<Outcome, GameError> {
        match action {
            Action::Roll => self.roll().map(Outcome::Roll),
            Action::Move(tile) => self.move_to(tile).map(Outcome::Move),
            Action::BuyReveal(tile) => self.buy_reveal(tile).map(Outcome::Purchase),
        }
    }

    pub fn roll(&mut self) -> Result<RollOutcome, GameError> {
        self.ensure_awaiting_roll()?;
        let value = self.rng.gen_range(1..=self.die_faces);
        self.roll_as(value)
    }

    /// Rolls a given value in `1..=die_faces` instead of drawing one. If nothing is reachable the
    /// turn passes straight to the next player and the game stays awaiting a roll.
    pub fn roll_as(&mut self, value: u8) -> Result<RollOutcome, GameError> {
        self.ensure_awaiting_roll()?;

        if value == 0 || value > self.die_faces {
            return Err(GameError::InvalidRoll(value));
        }

        let player = &self.players[self.current_player];
        let (player_id, name, start) = (player.id, player.name.clone(), player.tile);

        let reachable = reach::reachable_tiles(&self.graph, start, value as i32, |tile| self.special.contains(&tile));

        if reachable.is_empty() {
            log::warn!("{} rolled a {} on {} and has nowhere to go", name, value, start);

            self.next_player();

            return Ok(RollOutcome {
                player_id,
                name,
                roll: value,
                reachable: vec![],
                passed_to: Some(self.current_player().name.clone()),
            });
        }

        self.roll = value;
        self.reachable = reachable;
        self.phase = Phase::AwaitingMove;

        log::info!("{} rolled a {} on {}, {} tiles reachable", name, value, start, self.reachable.len());

        Ok(RollOutcome {
            player_id,
            name,
            roll: value,
            reachable: self.reachable(),
            passed_to: None,
        })
    }

    pub fn move_to(&mut self, tile: TileId) -> Result<MoveOutcome, GameError> {
        match self.phase {
            Phase::Finished => return Err(GameError::GameFinished),
            Phase::AwaitingRoll => return Err(GameError::NotRolled),
            Phase::AwaitingMove => {}
        }

        if !self.reachable.contains(&tile) {
            return Err(GameError::IllegalMove(tile));
        }

        let player = &mut self.players[self.current_player];
        let reveal = self.economy.reveal_at(tile, player, &mut self.ledger)?;

        player.tile = tile;
        self.roll = 0;
        self.reachable.clear();

        let victory = self.economy.check_victory(player, tile);

        let outcome = MoveOutcome {
            player_id: player.id,
            name: player.name.clone(),
            tile,
            reveal,
            victory,
        };

        log::info!("{}", outcome);

        if victory {
            self.finish();
        } else {
            self.next_player();
        }

        Ok(outcome)
    }

    /// The current player pays the reveal cost to turn over the marker on `tile`.
    pub fn buy_reveal(&mut self, tile: TileId) -> Result<PurchaseOutcome, GameError> {
        if self.phase == Phase::Finished {
            return Err(GameError::GameFinished);
        }

        if !self.graph.contains(tile) {
            return Err(GameError::UnknownTile(tile));
        }

        let cost = self.reveal_cost;
        let player = &mut self.players[self.current_player];
        let reveal = self.economy.buy_guaranteed_reveal(player, tile, &mut self.ledger, cost)?;
        let standing_on = player.tile;
        let victory = self.economy.check_victory(player, standing_on);

        let outcome = PurchaseOutcome {
            player_id: player.id,
            name: player.name.clone(),
            tile,
            cost,
            reveal,
            victory,
        };

        log::info!("{}", outcome);

        if victory {
            self.finish();
        }

        Ok(outcome)
    }

    /// Ends the current turn and hands the die to the next player, passing over (and clearing)
    /// anyone flagged to sit out a turn.
    pub fn next_player(&mut self) {
        if self.phase == Phase::Finished {
            return;
        }

        let mut skipped = 0;

        loop {
            self.current_player = (self.current_player + 1) % self.players.len();
            self.turn += 1;

            let player = &mut self.players[self.current_player];
            if !player.skip_next_turn {
                break;
            }

            player.skip_next_turn = false;
            skipped += 1;

            log::info!("{} sits out a turn", player.name);

            // flags are cleared as they are applied, so a full lap always finds a player
            if skipped > self.players.len() {
                panic!("skipped more players than are in the game");
            }
        }

        self.phase = Phase::AwaitingRoll;
        self.roll = 0;
        self.reachable.clear();
    }

    /// Used when restoring a saved session. The chosen player starts their turn from the roll and
    /// any roll already made by someone else is dropped.
    pub fn set_current_player_index(&mut self, idx: usize) -> Result<(), GameError> {
        if idx >= self.players.len() {
            return Err(GameError::IndexOutOfRange(idx));
        }

        if self.phase == Phase::Finished {
            return Err(GameError::GameFinished);
        }

        self.current_player = idx;
        self.phase = Phase::AwaitingRoll;
        self.roll = 0;
        self.reachable.clear();

        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            current_player: self.current_player,
            turn: self.turn,
            players: self.players.iter().map(|player| PlayerSnapshot {
                tile: player.tile,
                inventory: player.inventory.clone(),
                skip_next_turn: player.skip_next_turn,
            }).collect(),
        }
    }

    /// Puts players back where a snapshot left them and starts the restored player's turn.
    /// Markers and balances are not part of a snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), GameError> {
        if snapshot.players.len() != self.players.len() {
            return Err(GameError::SnapshotMismatch {
                expected: self.players.len(),
                found: snapshot.players.len(),
            });
        }

        if let Some(saved) = snapshot.players.iter().find(|saved| !self.graph.contains(saved.tile)) {
            return Err(GameError::UnknownTile(saved.tile));
        }

        if snapshot.current_player >= self.players.len() {
            return Err(GameError::IndexOutOfRange(snapshot.current_player));
        }

        self.phase = Phase::AwaitingRoll;
        self.winner = None;
        self.set_current_player_index(snapshot.current_player)?;
        self.turn = snapshot.turn;

        for (player, saved) in self.players.iter_mut().zip(&snapshot.players) {
            player.tile = saved.tile;
            player.inventory = saved.inventory.clone();
            player.skip_next_turn = saved.skip_next_turn;
        }

        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.map(|id| self.get_player_by_id(id))
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player]
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player
    }

    /// 0 until the current player has rolled.
    pub fn current_roll(&self) -> u8 {
        self.roll
    }

    /// The tiles the current roll allows, in ascending order.
    pub fn reachable(&self) -> Vec<TileId> {
        self.reachable.iter().copied().sorted().collect()
    }

    pub fn players(&self) -> &Vec<Player> {
        &self.players
    }

    pub fn get_player_by_id(&self, player_id: PlayerId) -> &Player {
        &self.players[player_id.0 as usize]
    }

    pub fn balance(&self, player_id: PlayerId) -> u32 {
        self.ledger.balance_of(player_id)
    }

    /// Whether a face-down marker sits on `tile`. Its kind stays hidden until revealed.
    pub fn has_marker(&self, tile: TileId) -> bool {
        self.economy.has_marker(tile)
    }

    pub fn marker_tiles(&self) -> Vec<TileId> {
        self.economy.marker_tiles()
    }

    pub fn prize_found(&self) -> bool {
        self.economy.prize_found()
    }

    pub fn is_special(&self, tile: TileId) -> bool {
        self.special.contains(&tile)
    }

    pub fn is_starting_tile(&self, tile: TileId) -> bool {
        self.economy.is_starting_tile(tile)
    }

    pub fn reveal_cost(&self) -> u32 {
        self.reveal_cost
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn graph(&self) -> &TileGraph {
        &self.graph
    }

    fn ensure_awaiting_roll(&self) -> Result<(), GameError> {
        match self.phase {
            Phase::AwaitingRoll => Ok(()),
            Phase::AwaitingMove => Err(GameError::AlreadyRolled),
            Phase::Finished => Err(GameError::GameFinished),
        }
    }

    fn finish(&mut self) {
        let player = &self.players[self.current_player];
        log::info!("{} wins on turn {}", player.name, self.turn);

        self.winner = Some(player.id);
        self.phase = Phase::Finished;
        self.roll = 0;
        self.reachable.clear();
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Action {
    Roll,
    Move(TileId),
    BuyReveal(TileId),
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Roll => f.write_str("roll the die"),
            Action::Move(tile) => f.write_fmt(format_args!("move to {}", tile)),
            Action::BuyReveal(tile) => f.write_fmt(format_args!("buy a reveal of {}", tile)),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Outcome {
    Roll(RollOutcome),
    Move(MoveOutcome),
    Purchase(PurchaseOutcome),
}

impl Display for Outcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Roll(outcome) => Display::fmt(outcome, f),
            Outcome::Move(outcome) => Display::fmt(outcome, f),
            Outcome::Purchase(outcome) => Display::fmt(outcome, f),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RollOutcome {
    pub player_id: PlayerId,
    pub name: String,
    pub roll: u8,
    pub reachable: Vec<TileId>,
    /// Set when nothing was reachable and the turn went to this player.
    pub passed_to: Option<String>,
}

impl Display for RollOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.passed_to {
            Some(next) => f.write_fmt(format_args!(
                "{} rolled a {} and cannot move, {} is up next.",
                self.name, self.roll, next
            )),
            None => f.write_fmt(format_args!(
                "{} rolled a {} and can reach {}.",
                self.name,
                self.roll,
                self.reachable.iter().join(", ")
            )),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MoveOutcome {
    pub player_id: PlayerId,
    pub name: String,
    pub tile: TileId,
    pub reveal: Option<Reveal>,
    pub victory: bool,
}

impl Display for MoveOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{} moved to {}", self.name, self.tile))?;

        if let Some(reveal) = &self.reveal {
            f.write_fmt(format_args!(" and found {}", reveal))?;
        }

        if self.victory {
            f.write_str(" and wins the game!")
        } else {
            f.write_str(".")
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PurchaseOutcome {
    pub player_id: PlayerId,
    pub name: String,
    pub tile: TileId,
    pub cost: u32,
    pub reveal: Reveal,
    pub victory: bool,
}

impl Display for PurchaseOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "{} paid ${} to reveal {} and found {}",
            self.name, self.cost, self.tile, self.reveal
        ))?;

        if self.victory {
            f.write_str(" and wins the game!")
        } else {
            f.write_str(".")
        }
    }
}

/// The part of a session that is saved and restored: whose turn it is and where everyone stands.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snapshot {
    pub current_player: usize,
    pub turn: u32,
    pub players: Vec<PlayerSnapshot>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PlayerSnapshot {
    pub tile: TileId,
    pub inventory: BTreeSet<Item>,
    pub skip_next_turn: bool,
}

#[allow(unused_must_use)]
impl Display for Game {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!(
            "  Starhunt: Turn {} | Markers Left {} | Prize {}",
            self.turn,
            self.economy.num_markers(),
            if self.prize_found() { "found" } else { "hidden" }
        ));
        writeln!(f);

        for (idx, player) in self.players.iter().enumerate() {
            if idx == self.current_player {
                write!(f, "*");
            } else {
                write!(f, " ");
            }

            f.write_fmt(format_args!(" {: <12}", player.name));
            f.write_fmt(format_args!("{: <6}", player.tile.to_string()));
            f.write_fmt(format_args!("${: <8}", self.balance(player.id)));
            f.write_fmt(format_args!("{}", player.inventory.iter().join(",")));

            if player.skip_next_turn {
                write!(f, " (skips)");
            }

            writeln!(f);
        }

        match self.phase {
            Phase::AwaitingRoll => writeln!(f, "awaiting roll"),
            Phase::AwaitingMove => writeln!(f, "rolled {}, reachable: {}", self.roll, self.reachable().iter().join(" ")),
            Phase::Finished => match self.winner() {
                Some(winner) => writeln!(f, "finished, {} wins", winner.name),
                None => writeln!(f, "finished"),
            },
        };

        Ok(())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PlayerId(pub u8);

impl Debug for PlayerId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("P_{}", self.0))
    }
}
