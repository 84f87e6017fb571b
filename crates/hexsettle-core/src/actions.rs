//! Game actions that players can take.
//!
//! This module defines every intent the engine accepts and the events
//! that result from those intents.

use crate::board::{PlayerId, Resource};
use crate::game::GamePhase;
use crate::player::ResourceHand;
use crate::topology::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    // ==================== Turn Actions ====================
    /// Roll the dice (once per turn, before building)
    RollDice,
    /// End your turn
    EndTurn,

    // ==================== Building Actions ====================
    /// Place a settlement (free during setup)
    PlaceSettlement(NodeId),
    /// Place a road (free during setup)
    PlaceRoad(EdgeId),
    /// Upgrade an own settlement to a city
    PlaceCity(NodeId),

    // ==================== Robber Actions ====================
    /// Discard one card while over the hand limit after a 7
    DiscardCard(Resource),
    /// Move the robber to a tile
    MoveRobber(usize),
    /// Choose the player to steal from
    ChooseVictim(PlayerId),
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Dice were rolled
    DiceRolled {
        player: PlayerId,
        roll: (u8, u8),
        total: u8,
    },

    /// Resources were produced by a roll or granted by a setup settlement
    ResourcesDistributed {
        distributions: Vec<(PlayerId, ResourceHand)>,
    },

    /// A settlement was built
    SettlementBuilt { player: PlayerId, node: NodeId },

    /// A settlement was upgraded to a city
    CityBuilt { player: PlayerId, node: NodeId },

    /// A road was built
    RoadBuilt { player: PlayerId, edge: EdgeId },

    /// A player discarded a card
    CardDiscarded {
        player: PlayerId,
        resource: Resource,
        remaining: u32,
    },

    /// The robber was moved
    RobberMoved {
        player: PlayerId,
        from: usize,
        to: usize,
    },

    /// A resource was stolen (None when the victim had nothing)
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Option<Resource>,
    },

    /// The game moved to another phase
    PhaseChanged { phase: GamePhase },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },
}
