//! D* Lite incremental planner.
//!
//! Searches backward from the goal over a directed weighted graph and
//! repairs its solution when edge costs change or the start moves,
//! rather than recomputing from scratch. The moving start is handled
//! with a key-modifier accumulator so queued keys stay valid without
//! re-keying the whole open list.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::config::DStarLiteSettings;
use crate::core::Key;
use crate::error::{PlannerError, Result};
use crate::graph::{AdjacencyGraph, SearchSpace};
use crate::queue::IndexedHeap;

use super::types::{costs_equal, LiteState};

/// Caller-supplied heuristic over two vertex ids.
///
/// Must be pure, non-negative, and admissible and consistent with
/// respect to the graph's edge costs for the repaired solution to stay
/// optimal.
pub type Heuristic = Box<dyn Fn(u64, u64) -> f64>;

/// D* Lite planner over an [`AdjacencyGraph`].
///
/// Lifecycle: build the graph (`add_node` / `add_edge`), call
/// [`initialize`](Self::initialize), then
/// [`compute_shortest_path`](Self::compute_shortest_path). Afterwards
/// edge-cost updates and start moves repair the existing solution.
///
/// Vertex state persists for the planner's lifetime; vertices are
/// created lazily when first referenced and never destroyed.
pub struct DStarLitePlanner {
    graph: AdjacencyGraph,
    states: Vec<LiteState>,
    open: IndexedHeap<Key>,
    heuristic: Heuristic,
    start: Option<usize>,
    goal: Option<usize>,
    /// Key modifier: accumulated heuristic distance traveled by the start
    km: f64,
    settings: DStarLiteSettings,
}

impl DStarLitePlanner {
    /// Create a planner with the default heuristic `|a - b|` over ids.
    ///
    /// The default is only admissible for id spaces where id distance
    /// underestimates path cost; callers with domain metrics should
    /// supply their own via [`with_heuristic`](Self::with_heuristic).
    pub fn new() -> Self {
        Self::with_heuristic(|a, b| (a as f64 - b as f64).abs())
    }

    /// Create a planner with a caller-supplied heuristic
    pub fn with_heuristic(heuristic: impl Fn(u64, u64) -> f64 + 'static) -> Self {
        Self::with_config(DStarLiteSettings::default(), heuristic)
    }

    /// Create a planner with explicit settings and heuristic
    pub fn with_config(
        settings: DStarLiteSettings,
        heuristic: impl Fn(u64, u64) -> f64 + 'static,
    ) -> Self {
        Self {
            graph: AdjacencyGraph::new(),
            states: Vec::new(),
            open: IndexedHeap::new(),
            heuristic: Box::new(heuristic),
            start: None,
            goal: None,
            km: 0.0,
            settings,
        }
    }

    /// Add a vertex. Idempotent on re-add.
    pub fn add_node(&mut self, id: u64) {
        self.graph.add_node(id);
        self.sync_states();
    }

    /// Add a directed edge, creating missing endpoints. Re-adding
    /// overwrites the cost. Negative costs are rejected.
    pub fn add_edge(&mut self, from: u64, to: u64, cost: f64) -> Result<()> {
        self.graph.add_edge(from, to, cost)?;
        self.sync_states();
        Ok(())
    }

    /// Read-only view of the underlying graph
    pub fn graph(&self) -> &AdjacencyGraph {
        &self.graph
    }

    /// Current key modifier. Non-decreasing across start moves.
    pub fn key_modifier(&self) -> f64 {
        self.km
    }

    /// Reset all vertex state and root the search at `goal`.
    ///
    /// Both vertices must already exist in the graph.
    pub fn initialize(&mut self, start: u64, goal: u64) -> Result<()> {
        let start_index = self
            .graph
            .index(start)
            .ok_or(PlannerError::UnknownVertex(start))?;
        let goal_index = self
            .graph
            .index(goal)
            .ok_or(PlannerError::UnknownVertex(goal))?;

        self.states = vec![LiteState::default(); self.graph.node_count()];
        self.open.clear();
        self.km = 0.0;
        self.start = Some(start_index);
        self.goal = Some(goal_index);

        self.states[goal_index].rhs = 0.0;
        let key = self.calculate_key(goal_index);
        self.open.push(goal_index, key);

        trace!("[DStarLite] initialized: start={} goal={}", start, goal);
        Ok(())
    }

    /// Drain the open list until the start is locally consistent and no
    /// queued key is below the start's key.
    ///
    /// Returns true iff the goal is reachable from the start.
    pub fn compute_shortest_path(&mut self) -> bool {
        let Some(start) = self.start else {
            warn!("[DStarLite] compute_shortest_path called before initialize");
            return false;
        };

        let mut expanded = 0usize;
        loop {
            let Some((u, k_old)) = self.open.peek() else {
                break;
            };
            let start_key = self.calculate_key(start);
            if !(k_old < start_key || !self.locally_consistent(start)) {
                break;
            }

            let k_new = self.calculate_key(u);
            if k_old < k_new {
                // Stale key: the vertex's priority has risen since queueing
                self.open.remove(u);
                self.open.push(u, k_new);
            } else if self.states[u].g > self.states[u].rhs {
                // Overconsistent: settle and push the improvement outward
                self.states[u].g = self.states[u].rhs;
                self.open.remove(u);
                expanded += 1;
                for (p, _) in self.graph.predecessors(u) {
                    self.update_vertex(p);
                }
            } else {
                // Underconsistent (or settled at infinity): invalidate and
                // let the lookahead recompute through surviving routes
                self.states[u].g = f64::INFINITY;
                expanded += 1;
                self.update_vertex(u);
                for (p, _) in self.graph.predecessors(u) {
                    self.update_vertex(p);
                }
            }
        }

        let g_start = self.states[start].g;
        debug!(
            "[DStarLite] compute_shortest_path: {} expansions, g(start)={:.3}",
            expanded, g_start
        );
        g_start.is_finite()
    }

    /// Apply a single edge-cost change and repair the solution.
    ///
    /// Changing an edge that does not exist is a silent no-op.
    pub fn update_edge_cost(&mut self, from: u64, to: u64, new_cost: f64) -> Result<()> {
        self.update_edge_costs(&[(from, to, new_cost)])
    }

    /// Batch-apply edge-cost changes, then repair once.
    ///
    /// All costs are applied before any vertex is re-evaluated, so a
    /// batch behaves like one atomic graph mutation.
    pub fn update_edge_costs(&mut self, changes: &[(u64, u64, f64)]) -> Result<()> {
        for &(from, to, cost) in changes {
            if cost < 0.0 {
                return Err(PlannerError::NegativeCost { from, to, cost });
            }
        }

        let mut touched: Vec<usize> = Vec::new();
        for &(from, to, cost) in changes {
            let (Some(f), Some(t)) = (self.graph.index(from), self.graph.index(to)) else {
                continue;
            };
            if self.graph.set_cost(f, t, cost) && !touched.contains(&f) {
                touched.push(f);
            }
        }

        if self.start.is_none() || touched.is_empty() {
            return Ok(());
        }
        debug!("[DStarLite] repairing after {} edge change(s)", touched.len());
        for &f in &touched {
            self.update_vertex(f);
        }
        self.compute_shortest_path();
        Ok(())
    }

    /// Reset an edge to the cost it was added with and repair.
    ///
    /// Restoring an edge that does not exist is a silent no-op.
    pub fn restore_edge_cost(&mut self, from: u64, to: u64) {
        let (Some(f), Some(t)) = (self.graph.index(from), self.graph.index(to)) else {
            return;
        };
        if self.graph.restore_cost(f, t).is_none() {
            return;
        }
        if self.start.is_some() {
            self.update_vertex(f);
            self.compute_shortest_path();
        }
    }

    /// Move the start (robot traversal) and repair.
    ///
    /// Accumulates the heuristic distance traveled into the key
    /// modifier instead of re-keying the open list. Returns true iff
    /// the goal is reachable from the new start.
    pub fn update_start_and_replan(&mut self, new_start: u64) -> Result<bool> {
        let new_index = self
            .graph
            .index(new_start)
            .ok_or(PlannerError::UnknownVertex(new_start))?;
        let old_index = self.start.ok_or(PlannerError::NotInitialized)?;

        if new_index != old_index {
            let travel = (self.heuristic)(self.graph.id(old_index), self.graph.id(new_index));
            self.km += travel;
            self.start = Some(new_index);
            trace!(
                "[DStarLite] start moved {} -> {}, km={:.3}",
                self.graph.id(old_index),
                new_start,
                self.km
            );
        }
        Ok(self.compute_shortest_path())
    }

    /// Extract the current path from start to goal by greedy descent
    /// over `cost + g`, or None if the goal is unreachable.
    ///
    /// Aborts and returns None if the walk exceeds the configured
    /// multiple of the vertex count, which would indicate a corrupt
    /// search tree.
    pub fn get_path(&self) -> Option<Vec<u64>> {
        let start = self.start?;
        let goal = self.goal?;
        if !self.states[start].g.is_finite() {
            return None;
        }

        let max_steps = self.settings.path_step_factor * self.graph.node_count();
        let mut path = vec![self.graph.id(start)];
        let mut current = start;
        let mut steps = 0usize;

        while current != goal {
            if steps >= max_steps {
                warn!(
                    "[DStarLite] path extraction exceeded {} steps; no path reported",
                    max_steps
                );
                return None;
            }
            let mut best: Option<(usize, f64)> = None;
            for (s, cost) in self.graph.successors(current) {
                if s == current {
                    continue;
                }
                let through = cost + self.states[s].g;
                if best.map_or(true, |(_, b)| through < b) {
                    best = Some((s, through));
                }
            }
            let (next, through) = best?;
            if !through.is_finite() {
                return None;
            }
            path.push(self.graph.id(next));
            current = next;
            steps += 1;
        }
        Some(path)
    }

    /// Cost of the current path, or `INFINITY` if the goal is unreachable
    pub fn get_path_cost(&self) -> f64 {
        self.start.map_or(f64::INFINITY, |s| self.states[s].g)
    }

    /// Snapshot of every edge's current cost
    pub fn get_edge_states(&self) -> HashMap<(u64, u64), f64> {
        self.graph.edge_states()
    }

    /// Recompute the one-step lookahead of `v` and re-queue it iff it
    /// is locally inconsistent.
    fn update_vertex(&mut self, v: usize) {
        if Some(v) != self.goal {
            let mut rhs = f64::INFINITY;
            for (s, cost) in self.graph.successors(v) {
                // A vertex is not its own successor for the lookahead
                if s == v {
                    continue;
                }
                let through = cost + self.states[s].g;
                if through < rhs {
                    rhs = through;
                }
            }
            self.states[v].rhs = rhs;
        }
        self.open.remove(v);
        if !self.locally_consistent(v) {
            let key = self.calculate_key(v);
            self.open.push(v, key);
        }
    }

    fn calculate_key(&self, v: usize) -> Key {
        let state = self.states[v];
        let lookahead = state.g.min(state.rhs);
        let start = self.start.expect("key computation requires a start");
        let h = (self.heuristic)(self.graph.id(v), self.graph.id(start));
        Key::new(lookahead + h + self.km, lookahead)
    }

    #[inline]
    fn locally_consistent(&self, v: usize) -> bool {
        let state = self.states[v];
        costs_equal(state.g, state.rhs, self.settings.consistency_epsilon)
    }

    /// Grow the state table to cover lazily created vertices
    fn sync_states(&mut self) {
        if self.states.len() < self.graph.node_count() {
            self.states
                .resize(self.graph.node_count(), LiteState::default());
        }
    }
}

impl Default for DStarLitePlanner {
    fn default() -> Self {
        Self::new()
    }
}
