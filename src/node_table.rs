//! Fixed-size table of search-tree nodes, replace-always on index collision.
//!
//! A node is identified by two independent keys: the full position hash and
//! the pawn-structure hash. The primary key picks the slot; both keys must
//! match for the slot to be considered the same position. On mismatch the
//! slot is reset for the new position, discarding whatever tree statistics
//! lived there.

use log::error;
use pleco::BitMove;

/// Hard cap on children per node; moves past this are dropped.
pub const MAX_EDGES: usize = 128;

/// One child of a tree node: the move, its prior from a shallow evaluation,
/// and the running statistics gathered by descents through it.
#[derive(Debug, Clone, Copy)]
pub struct Edge {
    pub mv: BitMove,
    pub visits: u64,
    pub prior: f64,
    pub action_value: f64,
    pub mean_action_value: f64,
}

#[derive(Debug, Default)]
pub struct Node {
    pub key1: u64,
    pub key2: u64,
    pub visits: u64,
    pub sons: u32,
    pub expanded_sons: u32,
    pub last_move: Option<BitMove>,
    pub edges: Vec<Edge>,
}

impl Node {
    pub fn is_expanded(&self) -> bool {
        self.visits > 0 && self.sons > 0
    }

    pub fn add_edge(&mut self, mv: BitMove, prior: f64) {
        if self.edges.len() >= MAX_EDGES {
            error!("node edge list full, dropping move {}", mv);
            return;
        }
        self.edges.push(Edge {
            mv,
            visits: 0,
            prior,
            action_value: 0.0,
            mean_action_value: 0.0,
        });
        self.sons = self.edges.len() as u32;
    }

    pub fn sort_edges_by_prior(&mut self) {
        self.edges
            .sort_by(|a, b| b.prior.partial_cmp(&a.prior).unwrap_or(std::cmp::Ordering::Equal));
    }
}

/// Opaque index into the table. Handles are only valid against the table
/// that produced them and may be recycled by later lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(usize);

pub struct NodeTable {
    slots: Vec<Node>,
    mask: u64,
}

impl NodeTable {
    /// Capacity is rounded up to the next power of two.
    pub fn new(capacity: usize) -> Self {
        let cap = capacity.max(1).next_power_of_two();
        let mut slots = Vec::with_capacity(cap);
        for _ in 0..cap {
            slots.push(Node::default());
        }
        Self { slots, mask: (cap - 1) as u64 }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Find or claim the slot for `(key1, key2)`. A slot holding a different
    /// position is reset in place (replace-always).
    pub fn lookup(&mut self, key1: u64, key2: u64) -> NodeHandle {
        let idx = (key1 & self.mask) as usize;
        let node = &mut self.slots[idx];
        if node.key1 != key1 || node.key2 != key2 {
            *node = Node::default();
            node.key1 = key1;
            node.key2 = key2;
        }
        NodeHandle(idx)
    }

    #[inline]
    pub fn node(&self, h: NodeHandle) -> &Node {
        &self.slots[h.0]
    }

    #[inline]
    pub fn node_mut(&mut self, h: NodeHandle) -> &mut Node {
        &mut self.slots[h.0]
    }
}
