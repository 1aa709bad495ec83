//! Planner configuration sections.

use serde::{Deserialize, Serialize};

fn consistency_epsilon() -> f64 {
    1e-10
}

fn path_step_factor() -> usize {
    2
}

fn diagonal_cost() -> f64 {
    std::f64::consts::SQRT_2
}

/// Top-level planner settings section
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PlannerConfig {
    /// D* Lite algorithm settings
    #[serde(default)]
    pub dstar_lite: DStarLiteSettings,

    /// Grid environment settings
    #[serde(default)]
    pub grid: GridSettings,
}

/// D* Lite algorithm settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DStarLiteSettings {
    /// Absolute tolerance for local-consistency tests (g vs rhs).
    /// Key comparisons always use strict ordering.
    #[serde(default = "consistency_epsilon")]
    pub consistency_epsilon: f64,

    /// Path extraction aborts after `path_step_factor * vertex_count`
    /// steps without reaching the goal
    #[serde(default = "path_step_factor")]
    pub path_step_factor: usize,
}

impl Default for DStarLiteSettings {
    fn default() -> Self {
        Self {
            consistency_epsilon: 1e-10,
            path_step_factor: 2,
        }
    }
}

/// Grid environment settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSettings {
    /// Cost multiplier for diagonal moves (sqrt(2))
    #[serde(default = "diagonal_cost")]
    pub diagonal_cost: f64,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            diagonal_cost: std::f64::consts::SQRT_2,
        }
    }
}
