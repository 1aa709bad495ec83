//! # Marga-Plan: Incremental Shortest-Path Replanning
//!
//! A library of incremental planners for dynamically changing weighted
//! graphs, designed for robot navigation where edge costs change as
//! obstacles appear and disappear. A planner computes a least-cost path
//! once, then **repairs** it after each change instead of searching from
//! scratch.
//!
//! Two planner families are provided:
//!
//! - [`DStarLitePlanner`]: D* Lite over an arbitrary directed weighted
//!   graph. Supports a moving start (robot traversal) through a
//!   key-modifier accumulator that keeps the open list valid without
//!   re-keying it.
//! - [`DStarPlanner`]: classic D* with RAISE/LOWER propagation, over a
//!   directed graph ([`DStarGraphPlanner`]) or an 8-connected grid with
//!   dynamic obstacles ([`DStarGridPlanner`]).
//!
//! ## Quick Start
//!
//! ```rust
//! use marga_plan::DStarLitePlanner;
//!
//! let mut planner = DStarLitePlanner::new();
//! planner.add_edge(1, 2, 1.0).unwrap();
//! planner.add_edge(1, 3, 5.0).unwrap();
//! planner.add_edge(2, 3, 2.0).unwrap();
//!
//! planner.initialize(1, 3).unwrap();
//! assert!(planner.compute_shortest_path());
//! assert_eq!(planner.get_path(), Some(vec![1, 2, 3]));
//!
//! // The cheap edge degrades; the planner repairs its solution
//! planner.update_edge_cost(2, 3, 10.0).unwrap();
//! assert_eq!(planner.get_path(), Some(vec![1, 3]));
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: value types ([`Key`], [`GridCoord`])
//! - [`graph`]: search spaces ([`AdjacencyGraph`], [`GridEnvironment`])
//!   behind the [`SearchSpace`] view
//! - [`queue`]: indexed min-heap with positional updates
//! - [`planner`]: the search kernels and repair APIs
//! - [`config`]: serde-backed settings sections
//!
//! ## Engine model
//!
//! Single-threaded and non-reentrant: a repair call must not trigger
//! another repair on the same instance, and caller-supplied heuristics
//! must be pure. Vertex state persists for the planner's lifetime to
//! amortize repair work; vertices are created lazily and never
//! destroyed. Costs are non-negative `f64` values, with `f64::INFINITY`
//! denoting an absent or blocked edge.

pub mod config;
pub mod core;
pub mod error;
pub mod graph;
pub mod planner;
pub mod queue;

pub use config::{DStarLiteSettings, GridSettings, PlannerConfig};
pub use core::{GridCoord, Key};
pub use error::{PlannerError, Result};
pub use graph::{AdjacencyGraph, GridEnvironment, SearchSpace};
pub use planner::{
    DStarGraphPlanner, DStarGridPlanner, DStarLitePlanner, DStarPlanner, Heuristic, Tag,
};
pub use queue::IndexedHeap;
