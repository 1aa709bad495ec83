//! Incremental path planners.
//!
//! This module provides the search kernels and their repair APIs:
//!
//! - [`DStarLitePlanner`]: D* Lite over a directed weighted graph with
//!   a moving start
//! - [`DStarPlanner`]: classic D* (RAISE/LOWER propagation) over a
//!   directed graph or an 8-connected grid
//! - [`dijkstra`]: non-incremental baseline over any search space
//!
//! ## D* Lite
//!
//! ```rust
//! use marga_plan::DStarLitePlanner;
//!
//! let mut planner = DStarLitePlanner::new();
//! planner.add_edge(1, 2, 1.0).unwrap();
//! planner.add_edge(2, 3, 2.0).unwrap();
//! planner.initialize(1, 3).unwrap();
//! assert!(planner.compute_shortest_path());
//!
//! // An obstacle appears: repair instead of replanning from scratch
//! planner.update_edge_cost(2, 3, f64::INFINITY).unwrap();
//! assert!(planner.get_path().is_none());
//! ```

pub mod dijkstra;
mod dstar;
mod dstar_lite;
mod types;

pub use dstar::{DStarGraphPlanner, DStarGridPlanner, DStarPlanner};
pub use dstar_lite::{DStarLitePlanner, Heuristic};
pub use types::Tag;
