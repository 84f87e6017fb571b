//! Player state and resource management.
//!
//! This module contains:
//! - Player struct with resources and holdings
//! - ResourceHand for managing resource counts
//! - Building costs

use crate::board::{PlayerId, Resource};
use crate::topology::{EdgeId, NodeId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Player color for UI rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerColor {
    Red,
    Blue,
    Green,
    Orange,
}

impl PlayerColor {
    /// Get color for a seat
    pub fn for_player(id: PlayerId) -> Self {
        match id % 4 {
            0 => PlayerColor::Red,
            1 => PlayerColor::Blue,
            2 => PlayerColor::Green,
            _ => PlayerColor::Orange,
        }
    }

    /// Get hex color code for rendering
    pub fn hex_code(&self) -> u32 {
        match self {
            PlayerColor::Red => 0xE74C3C,
            PlayerColor::Blue => 0x3498DB,
            PlayerColor::Green => 0x27AE60,
            PlayerColor::Orange => 0xE67E22,
        }
    }
}

/// A hand of resources, one count per kind.
///
/// Counts are unsigned and only ever decrease through `try_subtract`,
/// `remove_one` or `steal_random`, all of which refuse to go below zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceHand {
    pub wood: u32,
    pub sheep: u32,
    pub wheat: u32,
    pub clay: u32,
    pub rock: u32,
}

impl ResourceHand {
    /// Create an empty hand
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a hand with specific amounts
    pub fn with_amounts(wood: u32, sheep: u32, wheat: u32, clay: u32, rock: u32) -> Self {
        Self {
            wood,
            sheep,
            wheat,
            clay,
            rock,
        }
    }

    /// Create a hand with a single resource
    pub fn single(resource: Resource, amount: u32) -> Self {
        let mut hand = Self::new();
        hand.add(resource, amount);
        hand
    }

    /// Total number of resource cards
    pub fn total(&self) -> u32 {
        self.wood + self.sheep + self.wheat + self.clay + self.rock
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Get count of a specific resource
    pub fn get(&self, resource: Resource) -> u32 {
        match resource {
            Resource::Wood => self.wood,
            Resource::Sheep => self.sheep,
            Resource::Wheat => self.wheat,
            Resource::Clay => self.clay,
            Resource::Rock => self.rock,
        }
    }

    fn slot(&mut self, resource: Resource) -> &mut u32 {
        match resource {
            Resource::Wood => &mut self.wood,
            Resource::Sheep => &mut self.sheep,
            Resource::Wheat => &mut self.wheat,
            Resource::Clay => &mut self.clay,
            Resource::Rock => &mut self.rock,
        }
    }

    /// Add resources to hand
    pub fn add(&mut self, resource: Resource, amount: u32) {
        *self.slot(resource) += amount;
    }

    /// Add another hand to this one
    pub fn add_hand(&mut self, other: &ResourceHand) {
        for resource in Resource::ALL {
            self.add(resource, other.get(resource));
        }
    }

    /// Check if can afford a cost
    pub fn can_afford(&self, cost: &ResourceHand) -> bool {
        Resource::ALL
            .iter()
            .all(|&resource| self.get(resource) >= cost.get(resource))
    }

    /// Subtract a cost if every kind is covered. Nothing is deducted otherwise.
    pub fn try_subtract(&mut self, cost: &ResourceHand) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        for resource in Resource::ALL {
            *self.slot(resource) -= cost.get(resource);
        }
        true
    }

    /// Remove one card of a kind, returning false if there is none
    pub fn remove_one(&mut self, resource: Resource) -> bool {
        let slot = self.slot(resource);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    /// Remove one card chosen uniformly among all held cards (for robber stealing)
    pub fn steal_random<R: Rng>(&mut self, rng: &mut R) -> Option<Resource> {
        let total = self.total();
        if total == 0 {
            return None;
        }

        let mut pick = rng.gen_range(0..total);
        for resource in Resource::ALL {
            let count = self.get(resource);
            if pick < count {
                self.remove_one(resource);
                return Some(resource);
            }
            pick -= count;
        }
        None
    }

    /// The kind held in the largest quantity (ties go to the first kind)
    pub fn most_plentiful(&self) -> Option<Resource> {
        Resource::ALL
            .into_iter()
            .filter(|&resource| self.get(resource) > 0)
            .fold(None, |best: Option<Resource>, resource| match best {
                Some(b) if self.get(b) >= self.get(resource) => Some(b),
                _ => Some(resource),
            })
    }

    /// Kinds with at least one card
    pub fn held_kinds(&self) -> impl Iterator<Item = Resource> + '_ {
        Resource::ALL
            .into_iter()
            .filter(move |&resource| self.get(resource) > 0)
    }
}

/// Building costs
pub mod costs {
    use super::ResourceHand;

    /// Cost to build a road: 1 clay, 1 wood
    pub fn road() -> ResourceHand {
        ResourceHand::with_amounts(1, 0, 0, 1, 0)
    }

    /// Cost to build a settlement: 1 sheep, 1 wheat, 1 clay, 1 wood
    pub fn settlement() -> ResourceHand {
        ResourceHand::with_amounts(1, 1, 1, 1, 0)
    }

    /// Cost to upgrade to city: 3 rock, 2 wheat
    pub fn city() -> ResourceHand {
        ResourceHand::with_amounts(0, 0, 2, 0, 3)
    }
}

/// A single player's state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Seat index
    pub id: PlayerId,
    /// Player color
    pub color: PlayerColor,
    /// Current resources
    pub resources: ResourceHand,
    /// Nodes holding this player's settlements and cities
    pub nodes: BTreeSet<NodeId>,
    /// Edges holding this player's roads
    pub roads: BTreeSet<EdgeId>,
}

impl Player {
    /// Create a new player with nothing
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            color: PlayerColor::for_player(id),
            resources: ResourceHand::new(),
            nodes: BTreeSet::new(),
            roads: BTreeSet::new(),
        }
    }

    pub fn can_afford_road(&self) -> bool {
        self.resources.can_afford(&costs::road())
    }

    pub fn can_afford_settlement(&self) -> bool {
        self.resources.can_afford(&costs::settlement())
    }

    pub fn can_afford_city(&self) -> bool {
        self.resources.can_afford(&costs::city())
    }

    /// Pay a cost in full, or leave the hand untouched and return false
    pub fn pay(&mut self, cost: &ResourceHand) -> bool {
        self.resources.try_subtract(cost)
    }
}
