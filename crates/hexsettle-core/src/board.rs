//! Game board representation including tiles, buildings, and harbors.
//!
//! This module contains:
//! - Resource and tile types
//! - Tile assignment (terrain and number shuffling along the spiral)
//! - Building types (settlements, cities, roads)
//! - Harbor placement on the coast
//! - Placement validation, production and robber queries

use crate::config::ConfigError;
use crate::game::GameError;
use crate::player::ResourceHand;
use crate::topology::{EdgeId, NodeId, Point, Topology};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Player identifier (seat index, 0-3)
pub type PlayerId = u8;

/// Number tokens: one each of 2 and 12, two each of 3-6 and 8-11, never 7
pub const NUMBER_POOL: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Terrain tiles: 4 wood, 4 sheep, 4 wheat, 3 clay, 3 rock, 1 desert
pub const TERRAIN_POOL: [(TileType, usize); 6] = [
    (TileType::Resource(Resource::Wood), 4),
    (TileType::Resource(Resource::Sheep), 4),
    (TileType::Resource(Resource::Wheat), 4),
    (TileType::Resource(Resource::Clay), 3),
    (TileType::Resource(Resource::Rock), 3),
    (TileType::Desert, 1),
];

/// Resource types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Resource {
    Wood,
    Sheep,
    Wheat,
    Clay,
    Rock,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Clay,
        Resource::Rock,
    ];
}

/// Type of hex tile on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileType {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Desert - no production, starts with the robber
    Desert,
}

/// Check whether a token value can appear on the board
pub fn is_valid_number(number: u8) -> bool {
    matches!(number, 2..=6 | 8..=12)
}

/// A single hex tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    /// Flat index into the topology
    pub index: usize,
    pub tile_type: TileType,
    /// Dice number that triggers production (None for desert)
    pub number: Option<u8>,
    /// Whether the robber is currently on this tile
    pub has_robber: bool,
}

impl Tile {
    /// Check if this tile produces resources
    pub fn is_productive(&self) -> bool {
        matches!(self.tile_type, TileType::Resource(_)) && !self.has_robber
    }

    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self.tile_type {
            TileType::Resource(r) => Some(r),
            TileType::Desert => None,
        }
    }

    pub fn is_desert(&self) -> bool {
        self.tile_type == TileType::Desert
    }
}

/// What's built on a node (corner)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NodeBuilding {
    /// Nothing built
    #[default]
    Empty,
    /// Settlement (1 resource per adjacent tile)
    Settlement(PlayerId),
    /// City (2 resources per adjacent tile)
    City(PlayerId),
}

impl NodeBuilding {
    /// Get the owner of this building, if any
    pub fn owner(&self) -> Option<PlayerId> {
        match self {
            NodeBuilding::Empty => None,
            NodeBuilding::Settlement(p) | NodeBuilding::City(p) => Some(*p),
        }
    }

    /// Building level: 0 empty, 1 settlement, 2 city
    pub fn level(&self) -> u8 {
        match self {
            NodeBuilding::Empty => 0,
            NodeBuilding::Settlement(_) => 1,
            NodeBuilding::City(_) => 2,
        }
    }

    /// Resource multiplier (how many resources per production)
    pub fn resource_multiplier(&self) -> u32 {
        u32::from(self.level())
    }
}

/// Harbor types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Harbor {
    /// 3:1 any resource
    Generic,
    /// 2:1 for a specific resource
    Specific(Resource),
}

impl Harbor {
    /// The exchange rate for this harbor
    pub fn rate(&self) -> u32 {
        match self {
            Harbor::Generic => 3,
            Harbor::Specific(_) => 2,
        }
    }

    /// 4 generic harbors and one per resource
    pub fn standard_set() -> Vec<Harbor> {
        let mut harbors = vec![Harbor::Generic; 4];
        harbors.extend(Resource::ALL.map(Harbor::Specific));
        harbors
    }
}

/// Harbor placement on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HarborPlacement {
    /// The coastal edge where ships dock
    pub edge: EdgeId,
    pub harbor_type: Harbor,
}

/// The complete game board
#[derive(Debug, Clone)]
pub struct Board {
    topology: Arc<Topology>,
    tiles: Vec<Tile>,
    nodes: BTreeMap<NodeId, NodeBuilding>,
    roads: BTreeMap<EdgeId, PlayerId>,
    harbors: Vec<HarborPlacement>,
    robber: usize,
}

impl Board {
    /// Create a randomized board: terrains and numbers are shuffled and dealt
    /// along the topology's spiral order.
    pub fn random<R: Rng>(
        topology: Arc<Topology>,
        with_harbors: bool,
        rng: &mut R,
    ) -> Result<Self, ConfigError> {
        let mut terrains: Vec<TileType> = TERRAIN_POOL
            .iter()
            .flat_map(|&(tile_type, count)| std::iter::repeat(tile_type).take(count))
            .collect();
        if terrains.len() != topology.tile_count() {
            return Err(ConfigError::PoolMismatch {
                tiles: topology.tile_count(),
                pool: terrains.len(),
            });
        }

        terrains.shuffle(rng);
        let mut numbers = NUMBER_POOL.to_vec();
        numbers.shuffle(rng);

        let mut specs = vec![(TileType::Desert, None); topology.tile_count()];
        let mut numbers = numbers.into_iter();
        for (&index, tile_type) in topology.spiral_order().iter().zip(terrains) {
            let number = match tile_type {
                TileType::Desert => None,
                TileType::Resource(_) => numbers.next(),
            };
            specs[index] = (tile_type, number);
        }

        let mut board = Self::from_tiles(topology, specs)?;
        if with_harbors {
            board.place_harbors(rng);
        }
        Ok(board)
    }

    /// Create a board from explicit (terrain, number) pairs in flat tile order.
    ///
    /// Requires exactly one desert without a number and a valid number on every
    /// other tile. The robber starts on the desert.
    pub fn from_tiles(
        topology: Arc<Topology>,
        specs: Vec<(TileType, Option<u8>)>,
    ) -> Result<Self, ConfigError> {
        if specs.len() != topology.tile_count() {
            return Err(ConfigError::InvalidTiles(format!(
                "expected {} tiles, got {}",
                topology.tile_count(),
                specs.len()
            )));
        }

        let deserts: Vec<usize> = specs
            .iter()
            .enumerate()
            .filter(|(_, (tile_type, _))| *tile_type == TileType::Desert)
            .map(|(index, _)| index)
            .collect();
        let robber = match deserts.as_slice() {
            [desert] => *desert,
            _ => {
                return Err(ConfigError::InvalidTiles(format!(
                    "expected exactly one desert, got {}",
                    deserts.len()
                )))
            }
        };

        let mut tiles = Vec::with_capacity(specs.len());
        for (index, (tile_type, number)) in specs.into_iter().enumerate() {
            match (tile_type, number) {
                (TileType::Desert, None) => {}
                (TileType::Desert, Some(n)) => {
                    return Err(ConfigError::InvalidTiles(format!(
                        "desert tile {index} carries number {n}"
                    )))
                }
                (TileType::Resource(_), Some(n)) if is_valid_number(n) => {}
                (TileType::Resource(_), number) => {
                    return Err(ConfigError::InvalidTiles(format!(
                        "tile {index} has invalid number {number:?}"
                    )))
                }
            }
            tiles.push(Tile {
                index,
                tile_type,
                number,
                has_robber: index == robber,
            });
        }

        Ok(Self {
            topology,
            tiles,
            nodes: BTreeMap::new(),
            roads: BTreeMap::new(),
            harbors: Vec::new(),
            robber,
        })
    }

    /// Put the standard harbor set on distinct random coastal edges
    fn place_harbors<R: Rng>(&mut self, rng: &mut R) {
        let coastal: Vec<EdgeId> = self.topology.coastal_edges().collect();
        let mut harbor_types = Harbor::standard_set();
        harbor_types.shuffle(rng);

        let selected: Vec<EdgeId> = coastal
            .choose_multiple(rng, harbor_types.len())
            .copied()
            .collect();
        self.harbors = selected
            .into_iter()
            .zip(harbor_types)
            .map(|(edge, harbor_type)| HarborPlacement { edge, harbor_type })
            .collect();
    }

    // ==================== Query Methods ====================

    pub fn topology(&self) -> &Arc<Topology> {
        &self.topology
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn harbors(&self) -> &[HarborPlacement] {
        &self.harbors
    }

    /// Index of the tile holding the robber
    pub fn robber_tile(&self) -> usize {
        self.robber
    }

    /// Get building at a node
    pub fn node_building(&self, node: NodeId) -> NodeBuilding {
        self.nodes.get(&node).copied().unwrap_or_default()
    }

    /// Get owner of the road on an edge
    pub fn road_owner(&self, edge: EdgeId) -> Option<PlayerId> {
        self.roads.get(&edge).copied()
    }

    /// All built nodes in id order
    pub fn buildings(&self) -> impl Iterator<Item = (NodeId, NodeBuilding)> + '_ {
        self.nodes.iter().map(|(node, building)| (*node, *building))
    }

    /// All roads in id order
    pub fn roads(&self) -> impl Iterator<Item = (EdgeId, PlayerId)> + '_ {
        self.roads.iter().map(|(edge, owner)| (*edge, *owner))
    }

    /// Tiles cornered at a node
    pub fn tiles_at_node(&self, node: NodeId) -> impl Iterator<Item = &Tile> + '_ {
        self.topology
            .node_tiles(node)
            .iter()
            .filter_map(|&index| self.tiles.get(index))
    }

    // ==================== Validation Methods ====================

    /// Check if a node satisfies the distance rule (no building one edge away)
    pub fn satisfies_distance_rule(&self, node: NodeId) -> bool {
        self.topology
            .neighbors(node)
            .iter()
            .all(|&adj| self.node_building(adj).owner().is_none())
    }

    /// Check that a settlement may stand on `node`, ignoring connectivity
    pub fn check_settlement_spot(&self, node: NodeId) -> Result<(), GameError> {
        if self.topology.node(node).is_none() {
            return Err(GameError::UnknownNode);
        }
        if self.node_building(node) != NodeBuilding::Empty {
            return Err(GameError::NodeOccupied);
        }
        if !self.satisfies_distance_rule(node) {
            return Err(GameError::DistanceRule);
        }
        Ok(())
    }

    /// Check that a road may go on `edge`, ignoring connectivity
    pub fn check_road_spot(&self, edge: EdgeId) -> Result<(), GameError> {
        if self.topology.edge(edge).is_none() {
            return Err(GameError::UnknownEdge);
        }
        if self.roads.contains_key(&edge) {
            return Err(GameError::EdgeOwned);
        }
        Ok(())
    }

    /// Check if a node is at the end of one of the player's roads
    pub fn touches_road_of(&self, node: NodeId, player: PlayerId) -> bool {
        self.topology
            .node_edges(node)
            .iter()
            .any(|&edge| self.road_owner(edge) == Some(player))
    }

    /// Check if an edge touches a player's building or another of their roads
    pub fn is_connected_to_network(&self, edge: EdgeId, player: PlayerId) -> bool {
        edge.endpoints().into_iter().any(|endpoint| {
            self.node_building(endpoint).owner() == Some(player)
                || self
                    .topology
                    .node_edges(endpoint)
                    .iter()
                    .any(|&adj| adj != edge && self.road_owner(adj) == Some(player))
        })
    }

    /// Get valid settlement spots for a player
    pub fn valid_settlement_spots(&self, player: PlayerId, is_setup: bool) -> Vec<NodeId> {
        self.topology
            .nodes()
            .map(|info| info.id)
            .filter(|&node| {
                self.check_settlement_spot(node).is_ok()
                    && (is_setup || self.touches_road_of(node, player))
            })
            .collect()
    }

    /// Get valid road spots for a player in regular play
    pub fn valid_road_spots(&self, player: PlayerId) -> Vec<EdgeId> {
        self.topology
            .edges()
            .map(|info| info.id)
            .filter(|&edge| {
                self.check_road_spot(edge).is_ok() && self.is_connected_to_network(edge, player)
            })
            .collect()
    }

    /// Get valid city upgrade spots for a player
    pub fn valid_city_spots(&self, player: PlayerId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, building)| **building == NodeBuilding::Settlement(player))
            .map(|(node, _)| *node)
            .collect()
    }

    /// Check that the robber may move to `tile`
    pub fn check_robber_target(&self, tile: usize) -> Result<(), GameError> {
        let target = self.tiles.get(tile).ok_or(GameError::UnknownTile)?;
        if tile == self.robber {
            return Err(GameError::RobberAlreadyThere);
        }
        if target.is_desert() {
            return Err(GameError::RobberOnDesert);
        }
        Ok(())
    }

    /// Tiles the robber may move to
    pub fn valid_robber_tiles(&self) -> Vec<usize> {
        (0..self.tiles.len())
            .filter(|&tile| self.check_robber_target(tile).is_ok())
            .collect()
    }

    // ==================== Mutation Methods ====================
    // Callers validate first.

    /// Place a settlement
    pub fn place_settlement(&mut self, node: NodeId, player: PlayerId) {
        self.nodes.insert(node, NodeBuilding::Settlement(player));
    }

    /// Upgrade a settlement to a city
    pub fn upgrade_to_city(&mut self, node: NodeId, player: PlayerId) {
        self.nodes.insert(node, NodeBuilding::City(player));
    }

    /// Place a road
    pub fn place_road(&mut self, edge: EdgeId, player: PlayerId) {
        self.roads.insert(edge, player);
    }

    /// Move the robber to a new tile
    pub fn move_robber(&mut self, tile: usize) {
        if let Some(old) = self.tiles.get_mut(self.robber) {
            old.has_robber = false;
        }
        if let Some(new) = self.tiles.get_mut(tile) {
            new.has_robber = true;
        }
        self.robber = tile;
    }

    // ==================== Resource Distribution ====================

    /// Calculate resources produced for a dice total.
    ///
    /// Each productive tile with that number credits every building on its
    /// corners; a building on two matching tiles is credited twice.
    pub fn resources_for_roll(&self, roll: u8) -> BTreeMap<PlayerId, ResourceHand> {
        let mut distribution: BTreeMap<PlayerId, ResourceHand> = BTreeMap::new();

        for tile in &self.tiles {
            if tile.number != Some(roll) || !tile.is_productive() {
                continue;
            }
            let Some(resource) = tile.resource() else {
                continue;
            };
            let Some(geometry) = self.topology.tile(tile.index) else {
                continue;
            };

            for node in geometry.nodes {
                let building = self.node_building(node);
                if let Some(owner) = building.owner() {
                    distribution
                        .entry(owner)
                        .or_default()
                        .add(resource, building.resource_multiplier());
                }
            }
        }

        distribution
    }

    /// One card per non-desert tile around a node (second setup settlement)
    pub fn setup_grant(&self, node: NodeId) -> ResourceHand {
        let mut grant = ResourceHand::new();
        for resource in self.tiles_at_node(node).filter_map(Tile::resource) {
            grant.add(resource, 1);
        }
        grant
    }

    /// Get players who have buildings on a tile's corners (for robber stealing)
    pub fn players_adjacent_to_tile(&self, tile: usize) -> BTreeSet<PlayerId> {
        self.topology
            .tile(tile)
            .map(|geometry| {
                geometry
                    .nodes
                    .iter()
                    .filter_map(|&node| self.node_building(node).owner())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Read-only view for rendering collaborators
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            tiles: self
                .tiles
                .iter()
                .filter_map(|tile| {
                    let geometry = self.topology.tile(tile.index)?;
                    Some(TileView {
                        index: tile.index,
                        row: geometry.row,
                        col: geometry.col,
                        tile_type: tile.tile_type,
                        number: tile.number,
                        center: geometry.center,
                        has_robber: tile.has_robber,
                    })
                })
                .collect(),
            nodes: self
                .buildings()
                .filter_map(|(node, building)| {
                    Some(NodeView {
                        node,
                        owner: building.owner()?,
                        level: building.level(),
                    })
                })
                .collect(),
            roads: self
                .roads()
                .map(|(edge, owner)| RoadView { edge, owner })
                .collect(),
            harbors: self.harbors.clone(),
            robber: self.robber,
        }
    }
}

/// Serializable board view with lists instead of keyed maps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<TileView>,
    pub nodes: Vec<NodeView>,
    pub roads: Vec<RoadView>,
    pub harbors: Vec<HarborPlacement>,
    pub robber: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileView {
    pub index: usize,
    pub row: usize,
    pub col: usize,
    pub tile_type: TileType,
    pub number: Option<u8>,
    pub center: Point,
    pub has_robber: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub node: NodeId,
    pub owner: PlayerId,
    pub level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadView {
    pub edge: EdgeId,
    pub owner: PlayerId,
}
