//! Board topology derived from a row layout.
//!
//! This module provides the identities the rest of the engine works with:
//! - `NodeId`: a tile corner, where settlements and cities are placed
//! - `EdgeId`: a tile side between two nodes, where roads are placed
//! - `Topology`: the tile -> node, tile -> edge and node -> neighbor tables
//!
//! Tiles are pointy-top hexagons laid out row by row. Every tile center and
//! every corner sits on an integer lattice (x counted in half tile widths, y in
//! half tile radii), so two tiles sharing a corner produce the exact same
//! lattice point and deduplication never depends on floating-point equality.
//! Pixel coordinates are derived once per unique node from its lattice point.

use crate::config::{validate_layout, ConfigError, DEFAULT_TILE_SIZE, STANDARD_LAYOUT};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Lattice offsets of the six corners, at angles 60k - 30 degrees
/// (upper-right, lower-right, bottom, lower-left, upper-left, top).
const CORNER_OFFSETS: [(i32, i32); 6] = [(1, -1), (1, 1), (0, 2), (-1, 1), (-1, -1), (0, -2)];

/// Node (corner) identifier.
///
/// `row` counts distinct corner heights from the top of the board, `col`
/// counts corners left to right within that row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct NodeId {
    pub row: u16,
    pub col: u16,
}

impl NodeId {
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// Edge identifier: an unordered node pair stored sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "[NodeId; 2]", into = "[NodeId; 2]")]
pub struct EdgeId {
    a: NodeId,
    b: NodeId,
}

impl EdgeId {
    /// Create an edge from its endpoints in either order
    pub fn new(x: NodeId, y: NodeId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    /// Both endpoints, smaller first
    pub fn endpoints(&self) -> [NodeId; 2] {
        [self.a, self.b]
    }

    /// Whether `node` is one of the endpoints
    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// The endpoint opposite to `node`
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }
}

impl From<[NodeId; 2]> for EdgeId {
    fn from([x, y]: [NodeId; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<EdgeId> for [NodeId; 2] {
    fn from(edge: EdgeId) -> Self {
        edge.endpoints()
    }
}

/// A position in board space, for rendering collaborators
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Geometry and incidence of one tile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGeometry {
    /// Flat index, row-major from the top-left tile
    pub index: usize,
    /// Layout row
    pub row: usize,
    /// Position within the row
    pub col: usize,
    /// Center in board space
    pub center: Point,
    /// Corners in angle order starting at upper-right
    pub nodes: [NodeId; 6],
    /// Sides, `edges[k]` joins `nodes[k]` and `nodes[k + 1]`
    pub edges: [EdgeId; 6],
}

/// Incidence data for one node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,
    pub position: Point,
    /// Tiles having this node as a corner (1 to 3)
    pub tiles: Vec<usize>,
    /// Nodes one edge away
    pub neighbors: Vec<NodeId>,
    /// Edges ending at this node
    pub edges: Vec<EdgeId>,
}

/// Incidence data for one edge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeInfo {
    pub id: EdgeId,
    /// Tiles having this edge as a side (1 on the coast, 2 inland)
    pub tiles: Vec<usize>,
}

impl EdgeInfo {
    pub fn is_coastal(&self) -> bool {
        self.tiles.len() == 1
    }
}

/// Immutable board topology, built once per game
#[derive(Debug, Clone)]
pub struct Topology {
    tile_size: f64,
    tiles: Vec<TileGeometry>,
    nodes: BTreeMap<NodeId, NodeInfo>,
    edges: BTreeMap<EdgeId, EdgeInfo>,
    spiral: Vec<usize>,
}

impl Topology {
    /// Build the topology for a row layout.
    ///
    /// Fails with `ConfigError` on a malformed layout or tile size.
    pub fn build(rows: &[u8], tile_size: f64) -> Result<Self, ConfigError> {
        validate_layout(rows)?;
        if !tile_size.is_finite() || tile_size <= 0.0 {
            return Err(ConfigError::InvalidTileSize(tile_size));
        }
        Ok(Self::construct(rows, tile_size))
    }

    /// The canonical 3-4-5-4-3 board
    pub fn standard() -> Self {
        Self::construct(&STANDARD_LAYOUT, DEFAULT_TILE_SIZE)
    }

    fn construct(rows: &[u8], tile_size: f64) -> Self {
        // Tile centers on the lattice
        let mut centers: Vec<(usize, usize, i32, i32)> = Vec::new();
        for (row, &count) in rows.iter().enumerate() {
            for col in 0..count as i32 {
                let lx = 2 * col - (count as i32 - 1);
                let ly = 3 * row as i32;
                centers.push((row, col as usize, lx, ly));
            }
        }

        // Unique corners, ordered top to bottom then left to right
        let corners: BTreeSet<(i32, i32)> = centers
            .iter()
            .flat_map(|&(_, _, lx, ly)| {
                CORNER_OFFSETS
                    .iter()
                    .map(move |&(dx, dy)| (ly + dy, lx + dx))
            })
            .collect();

        let half_width = tile_size * 3.0_f64.sqrt() / 2.0;
        let half_height = tile_size / 2.0;
        let y_mid = 1.5 * (rows.len() as f64 - 1.0);
        let to_point = |lx: i32, ly: i32| Point {
            x: lx as f64 * half_width,
            y: (ly as f64 - y_mid) * half_height,
        };

        let mut lattice: HashMap<(i32, i32), NodeId> = HashMap::with_capacity(corners.len());
        let mut nodes: BTreeMap<NodeId, NodeInfo> = BTreeMap::new();
        let mut row: u16 = 0;
        let mut col: u16 = 0;
        let mut current_y: Option<i32> = None;
        for &(ly, lx) in &corners {
            match current_y {
                Some(y) if y == ly => col += 1,
                Some(_) => {
                    row += 1;
                    col = 0;
                }
                None => {}
            }
            current_y = Some(ly);

            let id = NodeId::new(row, col);
            lattice.insert((lx, ly), id);
            nodes.insert(
                id,
                NodeInfo {
                    id,
                    position: to_point(lx, ly),
                    tiles: Vec::new(),
                    neighbors: Vec::new(),
                    edges: Vec::new(),
                },
            );
        }

        let mut edges: BTreeMap<EdgeId, EdgeInfo> = BTreeMap::new();
        let mut tiles = Vec::with_capacity(centers.len());
        for (index, &(row, col, lx, ly)) in centers.iter().enumerate() {
            let tile_nodes = CORNER_OFFSETS.map(|(dx, dy)| lattice[&(lx + dx, ly + dy)]);
            let tile_edges: [EdgeId; 6] =
                std::array::from_fn(|k| EdgeId::new(tile_nodes[k], tile_nodes[(k + 1) % 6]));

            for node in tile_nodes {
                if let Some(info) = nodes.get_mut(&node) {
                    info.tiles.push(index);
                }
            }
            for edge in tile_edges {
                edges
                    .entry(edge)
                    .or_insert_with(|| EdgeInfo {
                        id: edge,
                        tiles: Vec::new(),
                    })
                    .tiles
                    .push(index);
            }

            tiles.push(TileGeometry {
                index,
                row,
                col,
                center: to_point(lx, ly),
                nodes: tile_nodes,
                edges: tile_edges,
            });
        }

        for edge in edges.keys() {
            let [a, b] = edge.endpoints();
            for (from, to) in [(a, b), (b, a)] {
                if let Some(info) = nodes.get_mut(&from) {
                    info.edges.push(*edge);
                    info.neighbors.push(to);
                }
            }
        }

        Self {
            tile_size,
            tiles,
            nodes,
            edges,
            spiral: spiral_order(rows),
        }
    }

    // ==================== Query Methods ====================

    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn tiles(&self) -> &[TileGeometry] {
        &self.tiles
    }

    pub fn tile(&self, index: usize) -> Option<&TileGeometry> {
        self.tiles.get(index)
    }

    /// All nodes in id order
    pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &NodeInfo> {
        self.nodes.values()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeInfo> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All edges in id order
    pub fn edges(&self) -> impl DoubleEndedIterator<Item = &EdgeInfo> {
        self.edges.values()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&EdgeInfo> {
        self.edges.get(&id)
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes sharing an edge with `node` (empty for unknown nodes)
    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(&node).map_or(&[], |info| &info.neighbors)
    }

    /// Tiles cornered at `node` (empty for unknown nodes)
    pub fn node_tiles(&self, node: NodeId) -> &[usize] {
        self.nodes.get(&node).map_or(&[], |info| &info.tiles)
    }

    /// Edges ending at `node` (empty for unknown nodes)
    pub fn node_edges(&self, node: NodeId) -> &[EdgeId] {
        self.nodes.get(&node).map_or(&[], |info| &info.edges)
    }

    /// Edges on the outer boundary of the board
    pub fn coastal_edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        self.edges
            .values()
            .filter(|info| info.is_coastal())
            .map(|info| info.id)
    }

    /// Tile visiting order for terrain assignment: outer ring clockwise from
    /// the top-left tile, then each inner ring the same way.
    pub fn spiral_order(&self) -> &[usize] {
        &self.spiral
    }
}

/// Peel rings off the row grid. Each ring is the top row left to right, the
/// last tile of each middle row, the bottom row right to left, then the first
/// tile of each middle row going back up.
fn spiral_order(rows: &[u8]) -> Vec<usize> {
    let mut grid: Vec<Vec<usize>> = Vec::with_capacity(rows.len());
    let mut next = 0;
    for &count in rows {
        grid.push((next..next + count as usize).collect());
        next += count as usize;
    }

    let mut order = Vec::with_capacity(next);
    while !grid.is_empty() {
        if grid.len() == 1 {
            order.extend(grid.remove(0));
            break;
        }

        let last = grid.len() - 1;
        order.extend(grid[0].iter().copied());
        order.extend(grid[1..last].iter().filter_map(|row| row.last().copied()));
        order.extend(grid[last].iter().rev().copied());
        for row in grid[1..last].iter().rev() {
            if row.len() > 1 {
                order.push(row[0]);
            }
        }

        grid = grid[1..last]
            .iter()
            .filter(|row| row.len() > 2)
            .map(|row| row[1..row.len() - 1].to_vec())
            .collect();
    }
    order
}
