//! Core game state machine.
//!
//! This module contains the main `GameState` struct and all game logic.
//! Every intent either succeeds and returns the resulting events, or is
//! rejected with a `GameError` and leaves the state untouched.

use crate::actions::{GameAction, GameEvent};
use crate::board::{Board, BoardSnapshot, NodeBuilding, PlayerId, Resource};
use crate::config::{ConfigError, GameConfig};
use crate::player::{costs, Player, ResourceHand};
use crate::topology::{EdgeId, NodeId, Topology};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Players holding more cards than this must discard on a 7
const HAND_LIMIT: u32 = 7;

/// Dice total that triggers the robber
const ROBBER_ROLL: u8 = 7;

/// Game phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Initial placement, walking the setup order
    Setup {
        /// What we're currently placing
        placing: SetupPlacing,
    },

    /// Normal turn: roll, build, end turn
    Regular,

    /// A 7 was rolled and `player` holds too many cards
    Discard {
        /// Player who must discard now
        player: PlayerId,
        /// Cards this player has to give up in total
        to_discard: u32,
        /// Cards given up so far
        discarded: u32,
        /// Players still waiting to discard, in seat order
        queue: Vec<PlayerId>,
    },

    /// The roller must move the robber
    Robber,

    /// The roller must pick whom to steal from
    RobChoose {
        /// Opponents with a building on the robber's tile
        victims: Vec<PlayerId>,
    },
}

/// What we're placing during setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetupPlacing {
    Settlement,
    Road,
}

/// Broad category of a rejected intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The intent is not allowed in the current phase or turn state
    IllegalAction,
    /// The target location breaks a placement rule
    IllegalPlacement,
    /// The player cannot pay for it
    InsufficientResources,
}

/// Errors that can occur when applying actions
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("Invalid action for current phase")]
    InvalidPhase,

    #[error("Dice already rolled this turn")]
    DiceAlreadyRolled,

    #[error("Dice must be rolled first")]
    DiceNotRolled,

    #[error("Don't have that card")]
    NoSuchCard,

    #[error("Player cannot be robbed")]
    InvalidVictim,

    #[error("Dice values must be between 1 and 6")]
    InvalidRoll,

    #[error("No such node")]
    UnknownNode,

    #[error("No such edge")]
    UnknownEdge,

    #[error("No such tile")]
    UnknownTile,

    #[error("Node is already occupied")]
    NodeOccupied,

    #[error("Too close to another building")]
    DistanceRule,

    #[error("Not connected to your network")]
    NotConnected,

    #[error("No settlement of yours there")]
    NotYourSettlement,

    #[error("Edge already has a road")]
    EdgeOwned,

    #[error("Robber is already on that tile")]
    RobberAlreadyThere,

    #[error("Robber cannot go to the desert")]
    RobberOnDesert,

    #[error("Cannot afford this")]
    CannotAfford,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::InvalidPhase
            | GameError::DiceAlreadyRolled
            | GameError::DiceNotRolled
            | GameError::NoSuchCard
            | GameError::InvalidVictim
            | GameError::InvalidRoll => ErrorKind::IllegalAction,

            GameError::UnknownNode
            | GameError::UnknownEdge
            | GameError::UnknownTile
            | GameError::NodeOccupied
            | GameError::DistanceRule
            | GameError::NotConnected
            | GameError::NotYourSettlement
            | GameError::EdgeOwned
            | GameError::RobberAlreadyThere
            | GameError::RobberOnDesert => ErrorKind::IllegalPlacement,

            GameError::CannotAfford => ErrorKind::InsufficientResources,
        }
    }
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// The game board
    pub board: Board,
    /// All players, indexed by seat
    pub players: Vec<Player>,
    /// Seat whose turn it is (the roller during discard and robber phases)
    pub current_player: PlayerId,
    /// Current game phase
    pub phase: GamePhase,
    /// Dice rolled this turn
    pub dice_roll: Option<(u8, u8)>,
    /// Seats in setup placement order: forward then reverse
    setup_order: Vec<PlayerId>,
    /// Index into `setup_order`
    setup_step: usize,
    /// Settlement the current setup road must touch
    setup_settlement: Option<NodeId>,
    /// Source of all randomness after board creation
    rng: StdRng,
}

impl GameState {
    /// Create a new game with a randomized board
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let topology = Arc::new(Topology::build(&config.layout, config.tile_size)?);
        let board = Board::random(topology, config.harbors, &mut rng)?;

        info!(
            players = config.players,
            seed = ?config.seed,
            tiles = board.tiles().len(),
            "game created"
        );
        Ok(Self::assemble(board, config.players, rng))
    }

    /// Start a game on a prepared board. Only the player count and seed of
    /// `config` are used.
    pub fn with_board(board: Board, config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        info!(players = config.players, seed = ?config.seed, "game created on prepared board");
        Ok(Self::assemble(board, config.players, rng))
    }

    fn assemble(board: Board, player_count: u8, rng: StdRng) -> Self {
        let players = (0..player_count).map(Player::new).collect();
        let setup_order = (0..player_count).chain((0..player_count).rev()).collect();

        Self {
            board,
            players,
            current_player: 0,
            phase: GamePhase::Setup {
                placing: SetupPlacing::Settlement,
            },
            dice_roll: None,
            setup_order,
            setup_step: 0,
            setup_settlement: None,
            rng,
        }
    }

    /// Get the number of players
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Get a player by ID
    pub fn get_player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id as usize)
    }

    /// The player expected to act next: the discarding player during a
    /// discard, the current player otherwise.
    pub fn active_player(&self) -> PlayerId {
        match self.phase {
            GamePhase::Discard { player, .. } => player,
            _ => self.current_player,
        }
    }

    /// Seats in setup placement order
    pub fn setup_order(&self) -> &[PlayerId] {
        &self.setup_order
    }

    /// Whether setup is in its reverse leg
    fn is_second_setup_leg(&self) -> bool {
        self.setup_step >= self.players.len()
    }

    // ==================== Legality Queries ====================

    /// Check a settlement placement for the active player in the current phase
    pub fn check_settlement(&self, node: NodeId) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Setup {
                placing: SetupPlacing::Settlement,
            } => self.board.check_settlement_spot(node),
            GamePhase::Regular => {
                self.require_rolled()?;
                self.board.check_settlement_spot(node)?;
                if !self.board.touches_road_of(node, self.current_player) {
                    return Err(GameError::NotConnected);
                }
                Ok(())
            }
            _ => Err(GameError::InvalidPhase),
        }
    }

    /// Check a road placement for the active player in the current phase
    pub fn check_road(&self, edge: EdgeId) -> Result<(), GameError> {
        match self.phase {
            GamePhase::Setup {
                placing: SetupPlacing::Road,
            } => {
                self.board.check_road_spot(edge)?;
                match self.setup_settlement {
                    Some(anchor) if edge.touches(anchor) => Ok(()),
                    _ => Err(GameError::NotConnected),
                }
            }
            GamePhase::Regular => {
                self.require_rolled()?;
                self.board.check_road_spot(edge)?;
                if !self.board.is_connected_to_network(edge, self.current_player) {
                    return Err(GameError::NotConnected);
                }
                Ok(())
            }
            _ => Err(GameError::InvalidPhase),
        }
    }

    /// Check a city upgrade for the active player in the current phase
    pub fn check_city(&self, node: NodeId) -> Result<(), GameError> {
        if self.phase != GamePhase::Regular {
            return Err(GameError::InvalidPhase);
        }
        self.require_rolled()?;
        if self.board.topology().node(node).is_none() {
            return Err(GameError::UnknownNode);
        }
        if self.board.node_building(node) != NodeBuilding::Settlement(self.current_player) {
            return Err(GameError::NotYourSettlement);
        }
        Ok(())
    }

    pub fn is_valid_settlement(&self, node: NodeId) -> bool {
        self.check_settlement(node).is_ok()
    }

    pub fn is_valid_road(&self, edge: EdgeId) -> bool {
        self.check_road(edge).is_ok()
    }

    pub fn is_valid_city(&self, node: NodeId) -> bool {
        self.check_city(node).is_ok()
    }

    fn require_rolled(&self) -> Result<(), GameError> {
        if self.dice_roll.is_none() {
            return Err(GameError::DiceNotRolled);
        }
        Ok(())
    }

    /// Take `cost` from the current player's hand, leaving it untouched when short
    fn charge(&mut self, cost: &ResourceHand) -> Result<(), GameError> {
        if !self.players[self.current_player as usize].pay(cost) {
            return Err(GameError::CannotAfford);
        }
        Ok(())
    }

    /// Get all currently valid actions for the active player
    pub fn valid_actions(&self) -> Vec<GameAction> {
        let mut actions = Vec::new();
        let player = self.active_player();

        match &self.phase {
            GamePhase::Setup {
                placing: SetupPlacing::Settlement,
            } => {
                for node in self.board.valid_settlement_spots(player, true) {
                    actions.push(GameAction::PlaceSettlement(node));
                }
            }

            GamePhase::Setup {
                placing: SetupPlacing::Road,
            } => {
                if let Some(anchor) = self.setup_settlement {
                    for &edge in self.board.topology().node_edges(anchor) {
                        if self.board.check_road_spot(edge).is_ok() {
                            actions.push(GameAction::PlaceRoad(edge));
                        }
                    }
                }
            }

            GamePhase::Regular => {
                if self.dice_roll.is_none() {
                    actions.push(GameAction::RollDice);
                    return actions;
                }

                actions.push(GameAction::EndTurn);

                let p = &self.players[player as usize];
                if p.can_afford_road() {
                    for edge in self.board.valid_road_spots(player) {
                        actions.push(GameAction::PlaceRoad(edge));
                    }
                }
                if p.can_afford_settlement() {
                    for node in self.board.valid_settlement_spots(player, false) {
                        actions.push(GameAction::PlaceSettlement(node));
                    }
                }
                if p.can_afford_city() {
                    for node in self.board.valid_city_spots(player) {
                        actions.push(GameAction::PlaceCity(node));
                    }
                }
            }

            GamePhase::Discard { player, .. } => {
                for resource in self.players[*player as usize].resources.held_kinds() {
                    actions.push(GameAction::DiscardCard(resource));
                }
            }

            GamePhase::Robber => {
                for tile in self.board.valid_robber_tiles() {
                    actions.push(GameAction::MoveRobber(tile));
                }
            }

            GamePhase::RobChoose { victims } => {
                for &victim in victims {
                    actions.push(GameAction::ChooseVictim(victim));
                }
            }
        }

        actions
    }

    // ==================== Intents ====================

    pub fn roll_dice(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::RollDice)
    }

    pub fn place_settlement(&mut self, node: NodeId) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::PlaceSettlement(node))
    }

    pub fn place_road(&mut self, edge: EdgeId) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::PlaceRoad(edge))
    }

    pub fn place_city(&mut self, node: NodeId) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::PlaceCity(node))
    }

    pub fn end_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::EndTurn)
    }

    pub fn discard_card(&mut self, resource: Resource) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::DiscardCard(resource))
    }

    pub fn move_robber(&mut self, tile: usize) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::MoveRobber(tile))
    }

    pub fn choose_victim(&mut self, victim: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        self.apply_action(GameAction::ChooseVictim(victim))
    }

    /// Apply an intent for the active player
    pub fn apply_action(&mut self, action: GameAction) -> Result<Vec<GameEvent>, GameError> {
        let player = self.active_player();
        let result = match action {
            GameAction::RollDice => self.handle_roll(),
            GameAction::PlaceSettlement(node) => self.handle_settlement(node),
            GameAction::PlaceRoad(edge) => self.handle_road(edge),
            GameAction::PlaceCity(node) => self.handle_city(node),
            GameAction::EndTurn => self.handle_end_turn(),
            GameAction::DiscardCard(resource) => self.handle_discard(resource),
            GameAction::MoveRobber(tile) => self.handle_move_robber(tile),
            GameAction::ChooseVictim(victim) => self.handle_choose_victim(victim),
        };

        match &result {
            Ok(events) => debug!(player, ?action, events = events.len(), "action applied"),
            Err(err) => trace!(player, ?action, %err, "action rejected"),
        }
        result
    }

    /// Apply a known dice result, as if the current player had rolled it
    pub fn resolve_roll(&mut self, die1: u8, die2: u8) -> Result<Vec<GameEvent>, GameError> {
        if !(1..=6).contains(&die1) || !(1..=6).contains(&die2) {
            return Err(GameError::InvalidRoll);
        }
        self.check_can_roll()?;
        Ok(self.apply_roll(die1, die2))
    }

    // ==================== Handlers ====================

    fn check_can_roll(&self) -> Result<(), GameError> {
        if self.phase != GamePhase::Regular {
            return Err(GameError::InvalidPhase);
        }
        if self.dice_roll.is_some() {
            return Err(GameError::DiceAlreadyRolled);
        }
        Ok(())
    }

    fn handle_roll(&mut self) -> Result<Vec<GameEvent>, GameError> {
        self.check_can_roll()?;
        let die1 = self.rng.gen_range(1..=6);
        let die2 = self.rng.gen_range(1..=6);
        Ok(self.apply_roll(die1, die2))
    }

    fn apply_roll(&mut self, die1: u8, die2: u8) -> Vec<GameEvent> {
        let total = die1 + die2;
        self.dice_roll = Some((die1, die2));

        let mut events = vec![GameEvent::DiceRolled {
            player: self.current_player,
            roll: (die1, die2),
            total,
        }];

        if total == ROBBER_ROLL {
            let mut queue: Vec<PlayerId> = self
                .players
                .iter()
                .filter(|p| p.resources.total() > HAND_LIMIT)
                .map(|p| p.id)
                .collect();

            let next = if queue.is_empty() {
                GamePhase::Robber
            } else {
                let player = queue.remove(0);
                self.discard_phase_for(player, queue)
            };
            self.transition(next, &mut events);
        } else {
            events.extend(self.distribute_resources(total));
        }

        events
    }

    /// Credit production for a dice total. A 7 never produces.
    pub fn distribute_resources(&mut self, total: u8) -> Vec<GameEvent> {
        if total == ROBBER_ROLL {
            return Vec::new();
        }

        let distribution = self.board.resources_for_roll(total);
        for (&pid, hand) in &distribution {
            if let Some(player) = self.players.get_mut(pid as usize) {
                player.resources.add_hand(hand);
            }
        }

        if distribution.is_empty() {
            return Vec::new();
        }
        debug!(total, players = distribution.len(), "resources distributed");
        vec![GameEvent::ResourcesDistributed {
            distributions: distribution.into_iter().collect(),
        }]
    }

    fn handle_settlement(&mut self, node: NodeId) -> Result<Vec<GameEvent>, GameError> {
        self.check_settlement(node)?;
        let player = self.current_player;
        let mut events = Vec::new();

        if self.phase == GamePhase::Regular {
            self.charge(&costs::settlement())?;
        }

        self.board.place_settlement(node, player);
        self.players[player as usize].nodes.insert(node);
        events.push(GameEvent::SettlementBuilt { player, node });

        if let GamePhase::Setup { .. } = self.phase {
            if self.is_second_setup_leg() {
                let grant = self.board.setup_grant(node);
                if !grant.is_empty() {
                    self.players[player as usize].resources.add_hand(&grant);
                    events.push(GameEvent::ResourcesDistributed {
                        distributions: vec![(player, grant)],
                    });
                }
            }
            self.setup_settlement = Some(node);
            self.phase = GamePhase::Setup {
                placing: SetupPlacing::Road,
            };
        }

        Ok(events)
    }

    fn handle_road(&mut self, edge: EdgeId) -> Result<Vec<GameEvent>, GameError> {
        self.check_road(edge)?;
        let player = self.current_player;

        let in_setup = matches!(self.phase, GamePhase::Setup { .. });
        if !in_setup {
            self.charge(&costs::road())?;
        }

        self.board.place_road(edge, player);
        self.players[player as usize].roads.insert(edge);
        let mut events = vec![GameEvent::RoadBuilt { player, edge }];

        if in_setup {
            self.setup_settlement = None;
            self.advance_setup(&mut events);
        }

        Ok(events)
    }

    fn handle_city(&mut self, node: NodeId) -> Result<Vec<GameEvent>, GameError> {
        self.check_city(node)?;
        self.charge(&costs::city())?;

        let player = self.current_player;
        self.board.upgrade_to_city(node, player);
        Ok(vec![GameEvent::CityBuilt { player, node }])
    }

    fn handle_end_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != GamePhase::Regular {
            return Err(GameError::InvalidPhase);
        }
        self.require_rolled()?;

        let player = self.current_player;
        let next_player = (player + 1) % self.players.len() as PlayerId;
        self.current_player = next_player;
        self.dice_roll = None;
        debug!(player, next_player, "turn ended");

        Ok(vec![GameEvent::TurnEnded {
            player,
            next_player,
        }])
    }

    fn handle_discard(&mut self, resource: Resource) -> Result<Vec<GameEvent>, GameError> {
        let GamePhase::Discard {
            player,
            to_discard,
            discarded,
            queue,
        } = self.phase.clone()
        else {
            return Err(GameError::InvalidPhase);
        };

        let hand = &mut self.players[player as usize].resources;
        if !hand.remove_one(resource) {
            return Err(GameError::NoSuchCard);
        }
        let discarded = discarded + 1;
        let mut events = vec![GameEvent::CardDiscarded {
            player,
            resource,
            remaining: to_discard - discarded,
        }];

        if discarded < to_discard {
            self.phase = GamePhase::Discard {
                player,
                to_discard,
                discarded,
                queue,
            };
            return Ok(events);
        }

        let mut queue = queue;
        let next = if queue.is_empty() {
            GamePhase::Robber
        } else {
            let next_player = queue.remove(0);
            self.discard_phase_for(next_player, queue)
        };
        self.transition(next, &mut events);
        Ok(events)
    }

    /// Discard phase for a player, with the quota taken from their hand now
    fn discard_phase_for(&self, player: PlayerId, queue: Vec<PlayerId>) -> GamePhase {
        GamePhase::Discard {
            player,
            to_discard: self.players[player as usize].resources.total() / 2,
            discarded: 0,
            queue,
        }
    }

    fn handle_move_robber(&mut self, tile: usize) -> Result<Vec<GameEvent>, GameError> {
        if self.phase != GamePhase::Robber {
            return Err(GameError::InvalidPhase);
        }
        self.board.check_robber_target(tile)?;

        let player = self.current_player;
        let from = self.board.robber_tile();
        self.board.move_robber(tile);
        let mut events = vec![GameEvent::RobberMoved {
            player,
            from,
            to: tile,
        }];

        let victims: Vec<PlayerId> = self
            .board
            .players_adjacent_to_tile(tile)
            .into_iter()
            .filter(|&p| p != player)
            .collect();

        let next = if victims.is_empty() {
            GamePhase::Regular
        } else {
            GamePhase::RobChoose { victims }
        };
        self.transition(next, &mut events);
        Ok(events)
    }

    fn handle_choose_victim(&mut self, victim: PlayerId) -> Result<Vec<GameEvent>, GameError> {
        let GamePhase::RobChoose { victims } = &self.phase else {
            return Err(GameError::InvalidPhase);
        };
        if !victims.contains(&victim) {
            return Err(GameError::InvalidVictim);
        }

        let thief = self.current_player;
        let stolen = self.players[victim as usize]
            .resources
            .steal_random(&mut self.rng);
        if let Some(resource) = stolen {
            self.players[thief as usize].resources.add(resource, 1);
        }

        let mut events = vec![GameEvent::ResourceStolen {
            thief,
            victim,
            resource: stolen,
        }];
        self.transition(GamePhase::Regular, &mut events);
        Ok(events)
    }

    // ==================== Phase Bookkeeping ====================

    fn transition(&mut self, phase: GamePhase, events: &mut Vec<GameEvent>) {
        debug!(from = ?self.phase, to = ?phase, "phase changed");
        self.phase = phase.clone();
        events.push(GameEvent::PhaseChanged { phase });
    }

    fn advance_setup(&mut self, events: &mut Vec<GameEvent>) {
        self.setup_step += 1;

        match self.setup_order.get(self.setup_step) {
            Some(&next) => {
                self.current_player = next;
                self.phase = GamePhase::Setup {
                    placing: SetupPlacing::Settlement,
                };
            }
            None => {
                self.current_player = 0;
                self.dice_roll = None;
                self.transition(GamePhase::Regular, events);
            }
        }
    }

    // ==================== Snapshots ====================

    /// Read-only view of everything a renderer needs
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.snapshot(),
            players: self.players.clone(),
            phase: self.phase.clone(),
            current_player: self.current_player,
            active_player: self.active_player(),
            dice_roll: self.dice_roll,
        }
    }
}

/// Serializable view of a game between intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub board: BoardSnapshot,
    pub players: Vec<Player>,
    pub phase: GamePhase,
    pub current_player: PlayerId,
    pub active_player: PlayerId,
    pub dice_roll: Option<(u8, u8)>,
}

impl GameSnapshot {
    /// Resources of the player whose turn it is
    pub fn current_resources(&self) -> Option<ResourceHand> {
        self.players
            .get(self.current_player as usize)
            .map(|p| p.resources)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::TileType;

    fn fixture(players: u8) -> GameState {
        let topology = Arc::new(Topology::standard());
        let mut specs = vec![(TileType::Resource(Resource::Sheep), Some(12)); 19];
        specs[9] = (TileType::Desert, None);
        let board = Board::from_tiles(topology, specs).unwrap();
        GameState::with_board(board, GameConfig::seeded(players, 1)).unwrap()
    }

    fn complete_setup(game: &mut GameState) {
        while matches!(game.phase, GamePhase::Setup { .. }) {
            let action = game.valid_actions()[0];
            game.apply_action(action).unwrap();
        }
    }

    #[test]
    fn test_new_game_starts_in_setup() {
        let game = GameState::new(GameConfig::seeded(4, 9)).unwrap();
        assert_eq!(
            game.phase,
            GamePhase::Setup {
                placing: SetupPlacing::Settlement
            }
        );
        assert_eq!(game.current_player, 0);
        assert_eq!(game.player_count(), 4);
        assert!(game.players.iter().all(|p| p.resources.is_empty()));
    }

    #[test]
    fn test_bad_player_count() {
        assert_eq!(
            GameState::new(GameConfig::seeded(5, 0)).err(),
            Some(ConfigError::PlayerCount(5))
        );
    }

    #[test]
    fn test_setup_order() {
        let game = fixture(3);
        assert_eq!(game.setup_order(), &[0, 1, 2, 2, 1, 0]);
    }

    #[test]
    fn test_setup_valid_actions() {
        let game = fixture(4);
        let actions = game.valid_actions();
        assert!(!actions.is_empty());
        assert!(actions
            .iter()
            .all(|a| matches!(a, GameAction::PlaceSettlement(_))));
    }

    #[test]
    fn test_setup_road_must_touch_new_settlement() {
        let mut game = fixture(2);
        let node = game.board.topology().tile(4).unwrap().nodes[0];
        game.place_settlement(node).unwrap();

        let far_edge = game.board.topology().tile(18).unwrap().edges[0];
        assert_eq!(game.place_road(far_edge), Err(GameError::NotConnected));

        let actions = game.valid_actions();
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().all(|a| match a {
            GameAction::PlaceRoad(edge) => edge.touches(node),
            _ => false,
        }));
    }

    #[test]
    fn test_setup_rejects_other_intents() {
        let mut game = fixture(2);
        assert_eq!(game.roll_dice(), Err(GameError::InvalidPhase));
        assert_eq!(game.end_turn(), Err(GameError::InvalidPhase));
        assert_eq!(game.move_robber(0), Err(GameError::InvalidPhase));
        let edge = game.board.topology().tile(0).unwrap().edges[0];
        assert_eq!(game.place_road(edge), Err(GameError::InvalidPhase));
    }

    #[test]
    fn test_setup_completes_into_regular_play() {
        let mut game = fixture(3);
        complete_setup(&mut game);

        assert_eq!(game.phase, GamePhase::Regular);
        assert_eq!(game.current_player, 0);
        assert_eq!(game.dice_roll, None);
        for player in &game.players {
            assert_eq!(player.nodes.len(), 2);
            assert_eq!(player.roads.len(), 2);
        }
    }

    #[test]
    fn test_roll_gates() {
        let mut game = fixture(2);
        complete_setup(&mut game);

        assert_eq!(game.end_turn(), Err(GameError::DiceNotRolled));
        assert_eq!(game.valid_actions(), vec![GameAction::RollDice]);

        game.resolve_roll(2, 3).unwrap();
        assert_eq!(game.roll_dice(), Err(GameError::DiceAlreadyRolled));
        assert_eq!(game.resolve_roll(1, 1), Err(GameError::DiceAlreadyRolled));

        let events = game.end_turn().unwrap();
        assert_eq!(
            events,
            vec![GameEvent::TurnEnded {
                player: 0,
                next_player: 1
            }]
        );
        assert_eq!(game.current_player, 1);
        assert_eq!(game.dice_roll, None);
    }

    #[test]
    fn test_invalid_dice_values() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        assert_eq!(game.resolve_roll(0, 3), Err(GameError::InvalidRoll));
        assert_eq!(game.resolve_roll(3, 7), Err(GameError::InvalidRoll));
        assert_eq!(game.dice_roll, None);
    }

    #[test]
    fn test_rolled_dice_in_range() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        for _ in 0..50 {
            game.roll_dice().unwrap();
            let (a, b) = game.dice_roll.unwrap();
            assert!((1..=6).contains(&a) && (1..=6).contains(&b));
            // Leave any robber phases by resetting the turn directly
            game.phase = GamePhase::Regular;
            game.end_turn().unwrap();
        }
    }

    #[test]
    fn test_turn_order_wraps() {
        let mut game = fixture(3);
        complete_setup(&mut game);
        for expected in [1, 2, 0, 1] {
            game.resolve_roll(1, 2).unwrap();
            game.end_turn().unwrap();
            assert_eq!(game.current_player, expected);
        }
    }

    #[test]
    fn test_building_needs_roll_and_resources() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        let own = *game.players[0].nodes.iter().next().unwrap();

        assert_eq!(game.place_city(own), Err(GameError::DiceNotRolled));
        game.resolve_roll(1, 2).unwrap();
        assert_eq!(game.place_city(own), Err(GameError::CannotAfford));
        assert_eq!(game.place_city(own).unwrap_err().kind(), ErrorKind::InsufficientResources);

        game.players[0].resources = ResourceHand::with_amounts(0, 0, 2, 0, 3);
        let events = game.place_city(own).unwrap();
        assert_eq!(events, vec![GameEvent::CityBuilt { player: 0, node: own }]);
        assert!(game.players[0].resources.is_empty());
        assert_eq!(game.board.node_building(own), NodeBuilding::City(0));
        assert_eq!(game.place_city(own), Err(GameError::NotYourSettlement));
    }

    #[test]
    fn test_short_hand_is_not_charged() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        let own = *game.players[0].nodes.iter().next().unwrap();
        let theirs = *game.players[1].nodes.iter().next().unwrap();
        game.resolve_roll(1, 2).unwrap();

        assert!(game.is_valid_city(own));
        assert!(!game.is_valid_city(theirs));

        let short = ResourceHand::with_amounts(1, 1, 2, 0, 2);
        game.players[0].resources = short;
        assert_eq!(game.place_city(own), Err(GameError::CannotAfford));
        assert_eq!(game.players[0].resources, short);

        let spot = game.board.valid_road_spots(0)[0];
        assert_eq!(game.place_road(spot), Err(GameError::CannotAfford));
        assert_eq!(game.players[0].resources, short);
        assert_eq!(game.board.node_building(own), NodeBuilding::Settlement(0));
    }

    #[test]
    fn test_city_on_opponent_settlement() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        let theirs = *game.players[1].nodes.iter().next().unwrap();
        game.resolve_roll(1, 2).unwrap();
        game.players[0].resources = ResourceHand::with_amounts(0, 0, 2, 0, 3);
        assert_eq!(game.place_city(theirs), Err(GameError::NotYourSettlement));
        assert_eq!(game.players[0].resources.total(), 5);
    }

    #[test]
    fn test_road_build_deducts_cost() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        game.resolve_roll(1, 2).unwrap();
        game.players[0].resources = ResourceHand::with_amounts(1, 0, 0, 1, 0);

        let edge = game.board.valid_road_spots(0)[0];
        assert!(game.is_valid_road(edge));
        game.place_road(edge).unwrap();
        assert!(game.players[0].resources.is_empty());
        assert_eq!(game.board.road_owner(edge), Some(0));
        assert_eq!(game.place_road(edge), Err(GameError::EdgeOwned));
    }

    #[test]
    fn test_rejected_road_leaves_state_unchanged() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        game.resolve_roll(1, 2).unwrap();
        let edge = game.board.valid_road_spots(0)[0];

        let before = game.snapshot();
        assert_eq!(game.place_road(edge), Err(GameError::CannotAfford));
        assert_eq!(game.snapshot(), before);
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(GameError::InvalidPhase.kind(), ErrorKind::IllegalAction);
        assert_eq!(GameError::DistanceRule.kind(), ErrorKind::IllegalPlacement);
        assert_eq!(GameError::RobberAlreadyThere.kind(), ErrorKind::IllegalPlacement);
        assert_eq!(GameError::CannotAfford.kind(), ErrorKind::InsufficientResources);
    }

    #[test]
    fn test_seven_without_big_hands_goes_to_robber() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        let events = game.resolve_roll(3, 4).unwrap();
        assert_eq!(game.phase, GamePhase::Robber);
        assert!(events.contains(&GameEvent::PhaseChanged {
            phase: GamePhase::Robber
        }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::ResourcesDistributed { .. })));
    }

    #[test]
    fn test_discard_wrong_card() {
        let mut game = fixture(2);
        complete_setup(&mut game);
        game.players[1].resources = ResourceHand::with_amounts(8, 0, 0, 0, 0);
        game.resolve_roll(3, 4).unwrap();
        assert_eq!(game.active_player(), 1);
        assert_eq!(game.current_player, 0);
        assert_eq!(game.discard_card(Resource::Rock), Err(GameError::NoSuchCard));
        assert_eq!(
            game.valid_actions(),
            vec![GameAction::DiscardCard(Resource::Wood)]
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = GameState::new(GameConfig::seeded(3, 4)).unwrap();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.current_resources(), Some(ResourceHand::new()));

        let json = snapshot.to_json().unwrap();
        let back: GameSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.board.tiles.len(), 19);
        assert_eq!(back.phase, snapshot.phase);
        assert_eq!(back.players.len(), 3);
    }

    #[test]
    fn test_same_seed_same_game() {
        let play = |seed| {
            let mut game = GameState::new(GameConfig::seeded(2, seed)).unwrap();
            complete_setup(&mut game);
            let mut rolls = Vec::new();
            for _ in 0..10 {
                game.roll_dice().unwrap();
                rolls.push(game.dice_roll);
                game.phase = GamePhase::Regular;
                game.end_turn().unwrap();
            }
            (game.snapshot(), rolls)
        };
        assert_eq!(play(17), play(17));
    }
}
