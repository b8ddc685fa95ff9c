//! Road network vocabulary shared by the generator, the router and the world.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Unique identifier assigned to a node of the stage graph.
///
/// Identifiers are dense: a stage with `n` nodes uses `0..n`, so the value
/// doubles as an index into per-node tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    /// Creates a new node identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the node inside dense per-node tables.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Location of a single grid node expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    column: u32,
    row: u32,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the node.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the node.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two grid coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: GridCoord) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the two coordinates share an edge of the grid.
    #[must_use]
    pub fn is_adjacent(self, other: GridCoord) -> bool {
        self.manhattan_distance(other) == 1
    }
}

/// Vertex of the stage graph.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Identifier of the node, equal to its row-major grid index.
    pub id: NodeId,
    /// Grid coordinate of the node.
    pub cell: GridCoord,
    /// Position of the node in world units.
    pub position: Vec2,
    /// Walkable road when `true`, buildable land otherwise.
    pub is_path: bool,
}

/// Directed edge of the stage graph.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Node the edge leaves.
    pub from: NodeId,
    /// Node the edge enters.
    pub to: NodeId,
    /// Static traversal cost; negative for warp shortcuts.
    pub weight: f32,
    /// Marks the single negative-weight tunnel of a stage.
    pub is_warp: bool,
}

impl Edge {
    /// Creates an ordinary adjacency edge.
    #[must_use]
    pub const fn adjacency(from: NodeId, to: NodeId, weight: f32) -> Self {
        Self {
            from,
            to,
            weight,
            is_warp: false,
        }
    }

    /// Creates a warp shortcut edge.
    #[must_use]
    pub const fn warp(from: NodeId, to: NodeId, weight: f32) -> Self {
        Self {
            from,
            to,
            weight,
            is_warp: true,
        }
    }
}

/// Complete topology of a single stage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StageLayout {
    stage: u32,
    side: u32,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    start: NodeId,
    goal: NodeId,
}

impl StageLayout {
    /// Assembles a layout from generated parts.
    ///
    /// `nodes` must be ordered by identifier so that `nodes[i].id == i`.
    #[must_use]
    pub fn new(
        stage: u32,
        side: u32,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        start: NodeId,
        goal: NodeId,
    ) -> Self {
        Self {
            stage,
            side,
            nodes,
            edges,
            start,
            goal,
        }
    }

    /// Stage number the layout was generated for.
    #[must_use]
    pub const fn stage(&self) -> u32 {
        self.stage
    }

    /// Number of nodes along each side of the square grid.
    #[must_use]
    pub const fn side(&self) -> u32 {
        self.side
    }

    /// All nodes ordered by identifier.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All directed edges, including the warp edge when present.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Node enemies spawn on.
    #[must_use]
    pub const fn start(&self) -> NodeId {
        self.start
    }

    /// Node enemies try to reach.
    #[must_use]
    pub const fn goal(&self) -> NodeId {
        self.goal
    }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Looks up the node at the provided grid coordinate.
    #[must_use]
    pub fn node_at(&self, cell: GridCoord) -> Option<&Node> {
        if cell.column() >= self.side || cell.row() >= self.side {
            return None;
        }
        let index = cell.row() as usize * self.side as usize + cell.column() as usize;
        self.nodes.get(index)
    }

    /// Reports whether the node is part of the road network.
    #[must_use]
    pub fn is_walkable(&self, id: NodeId) -> bool {
        self.node(id).is_some_and(|node| node.is_path)
    }

    /// The warp edge of the stage, if one was generated.
    #[must_use]
    pub fn warp(&self) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.is_warp)
    }
}
