//! Directed weighted graph with mutable edge costs.

use std::collections::HashMap;

use crate::error::{PlannerError, Result};

use super::SearchSpace;

/// A directed edge stored in an adjacency list.
///
/// Each edge remembers the cost it was added with so a changed cost can
/// be restored without the caller tracking the old value.
#[derive(Clone, Copy, Debug)]
struct Edge {
    peer: usize,
    cost: f64,
    original_cost: f64,
}

/// Directed weighted graph backed by an index arena.
///
/// Caller-facing vertex ids are opaque `u64` values; internally every
/// vertex is a dense `usize` index, and edges store indices rather than
/// ids. Vertices are created lazily when first referenced and never
/// removed. Re-adding an edge overwrites its cost; multi-edges between
/// the same pair are not permitted.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyGraph {
    /// Arena index -> caller-facing id
    ids: Vec<u64>,
    /// Caller-facing id -> arena index
    index_of: HashMap<u64, usize>,
    /// Outgoing edges per vertex
    outgoing: Vec<Vec<Edge>>,
    /// Incoming edges per vertex, mirrored from `outgoing`
    incoming: Vec<Vec<Edge>>,
}

impl AdjacencyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex, returning its arena index. Idempotent on re-add.
    pub fn add_node(&mut self, id: u64) -> usize {
        if let Some(&index) = self.index_of.get(&id) {
            return index;
        }
        let index = self.ids.len();
        self.ids.push(id);
        self.index_of.insert(id, index);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        index
    }

    /// Add a directed edge, creating missing endpoints. Re-adding an
    /// existing edge overwrites both its current and original cost.
    pub fn add_edge(&mut self, from: u64, to: u64, cost: f64) -> Result<()> {
        if cost < 0.0 {
            return Err(PlannerError::NegativeCost { from, to, cost });
        }
        let from_index = self.add_node(from);
        let to_index = self.add_node(to);

        if let Some(edge) = self.outgoing[from_index]
            .iter_mut()
            .find(|e| e.peer == to_index)
        {
            edge.cost = cost;
            edge.original_cost = cost;
            let mirror = self.incoming[to_index]
                .iter_mut()
                .find(|e| e.peer == from_index)
                .expect("incoming list mirrors outgoing list");
            mirror.cost = cost;
            mirror.original_cost = cost;
        } else {
            self.outgoing[from_index].push(Edge {
                peer: to_index,
                cost,
                original_cost: cost,
            });
            self.incoming[to_index].push(Edge {
                peer: from_index,
                cost,
                original_cost: cost,
            });
        }
        Ok(())
    }

    /// Arena index of an id, if the vertex exists
    #[inline]
    pub fn index(&self, id: u64) -> Option<usize> {
        self.index_of.get(&id).copied()
    }

    /// Caller-facing id of an arena index
    #[inline]
    pub fn id(&self, index: usize) -> u64 {
        self.ids[index]
    }

    /// Overwrite the current cost of an existing edge.
    ///
    /// Returns false (leaving the graph untouched) if the edge does not
    /// exist; changing an unknown edge is a silent no-op for callers.
    pub fn set_cost(&mut self, from: usize, to: usize, cost: f64) -> bool {
        let Some(edge) = self.outgoing[from].iter_mut().find(|e| e.peer == to) else {
            return false;
        };
        edge.cost = cost;
        let mirror = self.incoming[to]
            .iter_mut()
            .find(|e| e.peer == from)
            .expect("incoming list mirrors outgoing list");
        mirror.cost = cost;
        true
    }

    /// Reset an edge to the cost it was added with.
    ///
    /// Returns the restored cost, or None if the edge does not exist.
    pub fn restore_cost(&mut self, from: usize, to: usize) -> Option<f64> {
        let original = self.outgoing[from]
            .iter()
            .find(|e| e.peer == to)
            .map(|e| e.original_cost)?;
        self.set_cost(from, to, original);
        Some(original)
    }

    /// Snapshot of every edge as ((from id, to id), current cost)
    pub fn edge_states(&self) -> HashMap<(u64, u64), f64> {
        let mut states = HashMap::new();
        for (from, edges) in self.outgoing.iter().enumerate() {
            for edge in edges {
                states.insert((self.ids[from], self.ids[edge.peer]), edge.cost);
            }
        }
        states
    }
}

impl SearchSpace for AdjacencyGraph {
    #[inline]
    fn node_count(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    fn contains(&self, vertex: usize) -> bool {
        vertex < self.ids.len()
    }

    fn successors(&self, vertex: usize) -> Vec<(usize, f64)> {
        self.outgoing[vertex]
            .iter()
            .map(|e| (e.peer, e.cost))
            .collect()
    }

    fn predecessors(&self, vertex: usize) -> Vec<(usize, f64)> {
        self.incoming[vertex]
            .iter()
            .map(|e| (e.peer, e.cost))
            .collect()
    }

    fn cost(&self, from: usize, to: usize) -> f64 {
        self.outgoing[from]
            .iter()
            .find(|e| e.peer == to)
            .map_or(f64::INFINITY, |e| e.cost)
    }
}
