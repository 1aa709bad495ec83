//! Classic D* incremental planner.
//!
//! Searches backward from the goal with the two-phase RAISE/LOWER
//! propagation of the original D* formulation: cost increases are
//! pushed outward as RAISE states, cost decreases as LOWER states, and
//! every vertex carries a NEW/OPEN/CLOSED lifecycle tag plus a parent
//! pointer forming the tentative path tree.
//!
//! Works over any [`SearchSpace`]; frontends are provided for the
//! directed [`AdjacencyGraph`] and the 8-connected [`GridEnvironment`]
//! with dynamic obstacles.

use std::collections::HashMap;

use log::{debug, trace, warn};

use crate::config::DStarLiteSettings;
use crate::core::GridCoord;
use crate::error::{PlannerError, Result};
use crate::graph::{AdjacencyGraph, GridEnvironment, SearchSpace};
use crate::queue::IndexedHeap;

use super::types::{costs_equal, ProcessState, Tag};

/// Classic D* planner over a search space `S`.
///
/// Use [`DStarGraphPlanner`] for directed graphs and
/// [`DStarGridPlanner`] for grids; the search kernel is shared.
pub struct DStarPlanner<S: SearchSpace> {
    space: S,
    states: Vec<ProcessState>,
    open: IndexedHeap<f64>,
    start: Option<usize>,
    goal: Option<usize>,
    epsilon: f64,
    path_step_factor: usize,
}

/// Classic D* over a directed [`AdjacencyGraph`].
pub type DStarGraphPlanner = DStarPlanner<AdjacencyGraph>;

/// Classic D* over a [`GridEnvironment`] with dynamic obstacles.
pub type DStarGridPlanner = DStarPlanner<GridEnvironment>;

impl<S: SearchSpace> DStarPlanner<S> {
    fn with_space(space: S) -> Self {
        let settings = DStarLiteSettings::default();
        let states = vec![ProcessState::default(); space.node_count()];
        Self {
            space,
            states,
            open: IndexedHeap::new(),
            start: None,
            goal: None,
            epsilon: settings.consistency_epsilon,
            path_step_factor: settings.path_step_factor,
        }
    }

    /// Read-only view of the underlying search space
    pub fn space(&self) -> &S {
        &self.space
    }

    /// Drain the open list until the start's cost is settled: the top
    /// priority is no longer below `h(start)` and `h(start)` is finite.
    ///
    /// Returns true iff the goal is reachable from the start.
    pub fn compute_shortest_path(&mut self) -> bool {
        let Some(start) = self.start else {
            warn!("[DStar] compute_shortest_path called before initialize");
            return false;
        };

        let mut expanded = 0usize;
        loop {
            let Some((_, top)) = self.open.peek() else {
                break;
            };
            let h_start = self.states[start].h;
            if !(top < h_start || h_start.is_infinite()) {
                break;
            }
            self.process_state();
            expanded += 1;
        }

        let h_start = self.states[start].h;
        debug!(
            "[DStar] compute_shortest_path: {} expansions, h(start)={:.3}",
            expanded, h_start
        );
        h_start.is_finite()
    }

    /// Cost of the current path, or `INFINITY` if the goal is unreachable
    pub fn get_path_cost(&self) -> f64 {
        self.start.map_or(f64::INFINITY, |s| self.states[s].h)
    }

    /// Reset all vertex state and root the search at `goal`
    fn init_indices(&mut self, start: usize, goal: usize) {
        self.states = vec![ProcessState::default(); self.space.node_count()];
        self.open.clear();
        self.start = Some(start);
        self.goal = Some(goal);
        self.insert(goal, 0.0);
    }

    /// Expand the minimum-priority vertex.
    ///
    /// `k_old` is the priority the vertex was dequeued at, i.e.
    /// `min(h(u), h)` over its stay on the open list. `k_old < h(u)`
    /// marks a RAISE state, `k_old = h(u)` a LOWER state.
    fn process_state(&mut self) {
        let Some((u, k_old)) = self.open.pop() else {
            panic!("process_state on an empty open list");
        };
        self.states[u].tag = Tag::Closed;

        // RAISE: try to drop h(u) through an already-settled successor
        // before propagating the raise any further
        if k_old + self.epsilon < self.states[u].h {
            for (n, cost_un) in self.space.successors(u) {
                if n == u {
                    continue;
                }
                let neighbor = self.states[n];
                if neighbor.tag != Tag::New
                    && neighbor.h <= k_old + self.epsilon
                    && self.states[u].h > neighbor.h + cost_un
                {
                    self.states[u].parent = Some(n);
                    self.states[u].h = neighbor.h + cost_un;
                }
            }
        }

        let h_u = self.states[u].h;
        if costs_equal(k_old, h_u, self.epsilon) {
            // LOWER: offer the settled cost to every vertex that can
            // travel to u
            for (n, cost_nu) in self.space.predecessors(u) {
                if n == u {
                    continue;
                }
                let neighbor = self.states[n];
                let h_new = h_u + cost_nu;
                let improves = match neighbor.tag {
                    Tag::New => true,
                    _ => {
                        (neighbor.parent == Some(u) && !costs_equal(neighbor.h, h_new, self.epsilon))
                            || (neighbor.parent != Some(u) && neighbor.h > h_new + self.epsilon)
                    }
                };
                if improves {
                    self.states[n].parent = Some(u);
                    self.insert(n, h_new);
                }
            }
        } else {
            // Still raised: propagate the raise to descendants, defer u
            // when a predecessor might later lower through it, and
            // revive closed raised successors that could lower u
            for (n, cost_nu) in self.space.predecessors(u) {
                if n == u {
                    continue;
                }
                let neighbor = self.states[n];
                let h_new = h_u + cost_nu;
                if neighbor.tag == Tag::New
                    || (neighbor.parent == Some(u) && !costs_equal(neighbor.h, h_new, self.epsilon))
                {
                    self.states[n].parent = Some(u);
                    self.insert(n, h_new);
                } else if neighbor.parent != Some(u) && neighbor.h > h_new + self.epsilon {
                    self.insert(u, self.states[u].h);
                }
            }
            for (n, cost_un) in self.space.successors(u) {
                if n == u {
                    continue;
                }
                let neighbor = self.states[n];
                if neighbor.parent != Some(u)
                    && self.states[u].h > neighbor.h + cost_un + self.epsilon
                    && neighbor.tag == Tag::Closed
                    && neighbor.h > k_old + self.epsilon
                {
                    self.insert(n, neighbor.h);
                }
            }
        }
    }

    /// Put `v` on the open list at `h_new`, keeping its priority at the
    /// minimum `h` the vertex has held during its current stay so that
    /// raises never overtake pending lowers.
    fn insert(&mut self, v: usize, h_new: f64) {
        let state = self.states[v];
        let k = match state.tag {
            Tag::New => h_new,
            Tag::Open => {
                let current = self
                    .open
                    .priority_of(v)
                    .expect("open-tagged vertex is queued");
                self.open.remove(v);
                current.min(h_new)
            }
            Tag::Closed => state.h.min(h_new),
        };
        self.states[v].h = h_new;
        self.states[v].tag = Tag::Open;
        self.open.push(v, k);
    }

    /// Re-open a closed vertex after an incident arc changed, at its
    /// cost recomputed through its parent under the current arc costs.
    ///
    /// The recomputed value is what the vertex's stored cost claims to
    /// be; if the arc rose the vertex re-enters as a RAISE state, if it
    /// fell as a LOWER state. Re-inserting at the stored `h` instead
    /// would let a stale underestimate spread unchecked.
    fn modify_cost(&mut self, v: usize) {
        if self.states[v].tag != Tag::Closed {
            return;
        }
        let h_new = match self.states[v].parent {
            Some(p) => self.states[p].h + self.space.cost(v, p),
            None => self.states[v].h,
        };
        trace!("[DStar] modify_cost: reopening {} at h={:.3}", v, h_new);
        self.insert(v, h_new);
    }

    /// Follow parent pointers from start to goal.
    ///
    /// Returns None if the goal is unreachable, a traversed arc is
    /// severed, or the walk exceeds the configured multiple of the
    /// vertex count (a corrupt path tree).
    fn extract_indices(&self) -> Option<Vec<usize>> {
        let start = self.start?;
        let goal = self.goal?;
        if !self.states[start].h.is_finite() {
            return None;
        }

        let max_steps = self.path_step_factor * self.space.node_count();
        let mut path = vec![start];
        let mut current = start;
        let mut steps = 0usize;

        while current != goal {
            if steps >= max_steps {
                warn!(
                    "[DStar] path extraction exceeded {} steps; no path reported",
                    max_steps
                );
                return None;
            }
            let next = self.states[current].parent?;
            if !self.space.cost(current, next).is_finite() {
                return None;
            }
            path.push(next);
            current = next;
            steps += 1;
        }
        Some(path)
    }
}

impl DStarPlanner<AdjacencyGraph> {
    /// Create a planner over an empty directed graph rooted at `goal`.
    ///
    /// The goal vertex is created immediately; further vertices appear
    /// lazily as edges reference them.
    pub fn new(goal: u64) -> Self {
        let mut graph = AdjacencyGraph::new();
        let goal_index = graph.add_node(goal);
        let mut planner = Self::with_space(graph);
        planner.goal = Some(goal_index);
        planner
    }

    /// Add a vertex. Idempotent on re-add.
    pub fn add_node(&mut self, id: u64) {
        self.space.add_node(id);
        self.sync_states();
    }

    /// Add a directed edge, creating missing endpoints. Re-adding
    /// overwrites the cost. Negative costs are rejected.
    pub fn add_edge(&mut self, from: u64, to: u64, cost: f64) -> Result<()> {
        self.space.add_edge(from, to, cost)?;
        self.sync_states();
        Ok(())
    }

    /// Reset all vertex state and root the search at `goal`
    pub fn initialize(&mut self, start: u64, goal: u64) -> Result<()> {
        let start_index = self
            .space
            .index(start)
            .ok_or(PlannerError::UnknownVertex(start))?;
        let goal_index = self
            .space
            .index(goal)
            .ok_or(PlannerError::UnknownVertex(goal))?;
        self.init_indices(start_index, goal_index);
        trace!("[DStar] initialized: start={} goal={}", start, goal);
        Ok(())
    }

    /// Apply an edge-cost change and repair the solution.
    ///
    /// Changing an edge that does not exist is a silent no-op.
    pub fn update_edge_cost(&mut self, from: u64, to: u64, new_cost: f64) -> Result<()> {
        if new_cost < 0.0 {
            return Err(PlannerError::NegativeCost {
                from,
                to,
                cost: new_cost,
            });
        }
        let (Some(f), Some(t)) = (self.space.index(from), self.space.index(to)) else {
            return Ok(());
        };
        if !self.space.set_cost(f, t, new_cost) {
            return Ok(());
        }
        if self.start.is_some() {
            // Re-open the arc's head: expanding it re-evaluates every
            // predecessor through the changed arc, raising or lowering
            // the tail as needed
            self.modify_cost(t);
            self.compute_shortest_path();
        }
        Ok(())
    }

    /// Reset an edge to the cost it was added with and repair.
    pub fn restore_edge_cost(&mut self, from: u64, to: u64) {
        let (Some(f), Some(t)) = (self.space.index(from), self.space.index(to)) else {
            return;
        };
        if self.space.restore_cost(f, t).is_none() {
            return;
        }
        if self.start.is_some() {
            self.modify_cost(t);
            self.compute_shortest_path();
        }
    }

    /// Current path as vertex ids, or None if the goal is unreachable
    pub fn get_path(&self) -> Option<Vec<u64>> {
        let indices = self.extract_indices()?;
        Some(indices.into_iter().map(|i| self.space.id(i)).collect())
    }

    /// Snapshot of every edge's current cost
    pub fn get_edge_states(&self) -> HashMap<(u64, u64), f64> {
        self.space.edge_states()
    }

    /// Grow the state table to cover lazily created vertices
    fn sync_states(&mut self) {
        if self.states.len() < self.space.node_count() {
            self.states
                .resize(self.space.node_count(), ProcessState::default());
        }
    }
}

impl DStarPlanner<GridEnvironment> {
    /// Create a planner over an obstacle-free grid rooted at `goal`
    pub fn new(width: i32, height: i32, goal: GridCoord) -> Result<Self> {
        let space = GridEnvironment::new(width, height);
        let goal_index = space.checked_index(goal)?;
        let mut planner = Self::with_space(space);
        planner.goal = Some(goal_index);
        Ok(planner)
    }

    /// Reset all cell state and root the search at `goal`
    pub fn initialize(&mut self, start: GridCoord, goal: GridCoord) -> Result<()> {
        let start_index = self.space.checked_index(start)?;
        let goal_index = self.space.checked_index(goal)?;
        self.init_indices(start_index, goal_index);
        trace!(
            "[DStar] initialized: start=({},{}) goal=({},{})",
            start.x,
            start.y,
            goal.x,
            goal.y
        );
        Ok(())
    }

    /// Block a cell and repair the affected region of the path tree
    pub fn add_obstacle(&mut self, cell: GridCoord) -> Result<()> {
        self.space.set_obstacle(cell, true)?;
        debug!("[DStar] obstacle added at ({},{})", cell.x, cell.y);
        self.repair_around(cell);
        Ok(())
    }

    /// Unblock a cell and repair the affected region of the path tree
    pub fn remove_obstacle(&mut self, cell: GridCoord) -> Result<()> {
        self.space.set_obstacle(cell, false)?;
        debug!("[DStar] obstacle removed at ({},{})", cell.x, cell.y);
        self.repair_around(cell);
        Ok(())
    }

    /// True if the cell is blocked
    pub fn is_obstacle(&self, cell: GridCoord) -> bool {
        self.space.is_obstacle(cell)
    }

    /// Current path as grid coordinates, or None if the goal is
    /// unreachable
    pub fn get_path(&self) -> Option<Vec<GridCoord>> {
        let indices = self.extract_indices()?;
        Some(indices.into_iter().map(|i| self.space.coord(i)).collect())
    }

    /// Re-open every closed vertex incident to an arc whose cost the
    /// toggle changed, then drain the open list
    fn repair_around(&mut self, cell: GridCoord) {
        if self.start.is_none() {
            return;
        }
        let cell_index = self.space.index(cell);
        self.modify_cost(cell_index);
        for neighbor in cell.neighbors_8() {
            if self.space.in_bounds(neighbor) {
                let neighbor_index = self.space.index(neighbor);
                self.modify_cost(neighbor_index);
            }
        }
        self.compute_shortest_path();
    }
}
