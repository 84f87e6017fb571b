//! hexsettle - rules engine for a hex-grid settlement game
//!
//! This crate provides the core game logic, including:
//! - Board topology derived from a row layout of hex tiles
//! - Tile assignment, placement validation and resource production
//! - Player state and resource management
//! - Game state machine covering setup, regular turns, discards and the robber
//!
//! # Architecture
//!
//! The engine owns no I/O. A control loop feeds it discrete intents
//! (`GameAction`s or the matching `GameState` methods) and reads
//! `GameSnapshot`s back for rendering. All randomness comes from a seedable
//! RNG owned by the game, so a fixed seed replays a whole game.
//!
//! # Modules
//!
//! - [`topology`]: Node and edge identities and the tile/node/edge tables
//! - [`board`]: Tiles, buildings, harbors and placement rules
//! - [`player`]: Player state, resource hands and building costs
//! - [`game`]: Game state machine
//! - [`actions`]: Intents and the events they produce
//! - [`bot`]: Computer-controlled players
//! - [`config`]: Game configuration

pub mod actions;
pub mod board;
pub mod bot;
pub mod config;
pub mod game;
pub mod player;
pub mod topology;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{
    Board, BoardSnapshot, Harbor, HarborPlacement, NodeBuilding, PlayerId, Resource, Tile,
    TileType,
};
pub use bot::{Bot, BotDifficulty};
pub use config::{ConfigError, GameConfig};
pub use game::{ErrorKind, GameError, GamePhase, GameSnapshot, GameState, SetupPlacing};
pub use player::{costs, Player, PlayerColor, ResourceHand};
pub use topology::{EdgeId, NodeId, Point, Topology};
