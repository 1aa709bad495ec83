//! End-to-end replanning scenarios.
//!
//! Exercises the public planner APIs through full plan/repair cycles
//! and checks the incremental results against a fresh Dijkstra run on
//! the same graph state.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use marga_plan::planner::dijkstra;
use marga_plan::{DStarGridPlanner, DStarLitePlanner, GridCoord, SearchSpace};

/// Weighted six-node chain used by the graph scenarios
const CHAIN_EDGES: [(u64, u64, f64); 9] = [
    (1, 2, 1.0),
    (1, 3, 5.0),
    (2, 3, 2.0),
    (2, 4, 4.0),
    (3, 4, 1.0),
    (3, 5, 6.0),
    (4, 5, 3.0),
    (4, 6, 4.0),
    (5, 6, 2.0),
];

fn chain_planner() -> DStarLitePlanner {
    let mut planner = DStarLitePlanner::new();
    for &(from, to, cost) in &CHAIN_EDGES {
        planner.add_edge(from, to, cost).unwrap();
    }
    planner
}

/// Sum the edge costs along a path, asserting every edge exists
fn path_edge_cost(planner: &DStarLitePlanner, path: &[u64]) -> f64 {
    let graph = planner.graph();
    path.windows(2)
        .map(|w| {
            let from = graph.index(w[0]).expect("path vertex exists");
            let to = graph.index(w[1]).expect("path vertex exists");
            let cost = graph.cost(from, to);
            assert!(cost.is_finite(), "path uses missing edge ({}, {})", w[0], w[1]);
            cost
        })
        .sum()
}

/// Assert the planner's answer matches a fresh Dijkstra on the current
/// graph state
fn assert_matches_dijkstra(planner: &DStarLitePlanner, start: u64, goal: u64) {
    let graph = planner.graph();
    let start_index = graph.index(start).unwrap();
    let goal_index = graph.index(goal).unwrap();

    match dijkstra::shortest_path(graph, start_index, goal_index) {
        Some(reference) => {
            assert_relative_eq!(planner.get_path_cost(), reference.cost, epsilon = 1e-9);
            let path = planner.get_path().expect("reference found a path");
            assert_relative_eq!(
                path_edge_cost(planner, &path),
                reference.cost,
                epsilon = 1e-9
            );
            assert_eq!(path.first(), Some(&start));
            assert_eq!(path.last(), Some(&goal));
        }
        None => {
            assert!(planner.get_path_cost().is_infinite());
            assert_eq!(planner.get_path(), None);
        }
    }
}

#[test]
fn linear_chain_then_moving_start() {
    env_logger::try_init().ok();
    let mut planner = chain_planner();
    planner.initialize(1, 6).unwrap();
    assert!(planner.compute_shortest_path());
    assert_eq!(planner.get_path(), Some(vec![1, 2, 3, 4, 6]));
    assert_relative_eq!(planner.get_path_cost(), 8.0, epsilon = 1e-9);

    // The robot advances one step
    assert!(planner.update_start_and_replan(2).unwrap());
    assert_eq!(planner.get_path(), Some(vec![2, 3, 4, 6]));
    assert_relative_eq!(planner.get_path_cost(), 7.0, epsilon = 1e-9);

    // An edge on no current path worsens: nothing changes
    planner.update_edge_cost(3, 5, 10.0).unwrap();
    assert_eq!(planner.get_path(), Some(vec![2, 3, 4, 6]));
    assert_relative_eq!(planner.get_path_cost(), 7.0, epsilon = 1e-9);
    assert_matches_dijkstra(&planner, 2, 6);
}

#[test]
fn blocked_edge_forces_detour() {
    let mut planner = chain_planner();
    planner.initialize(1, 6).unwrap();
    planner.compute_shortest_path();

    planner.update_edge_cost(3, 4, f64::INFINITY).unwrap();
    assert_relative_eq!(planner.get_path_cost(), 9.0, epsilon = 1e-9);
    assert_matches_dijkstra(&planner, 1, 6);
}

#[test]
fn unreachable_goal_reports_absence() {
    let mut planner = DStarLitePlanner::new();
    planner.add_edge(1, 2, 1.0).unwrap();
    planner.add_edge(2, 3, 1.0).unwrap();
    planner.initialize(1, 3).unwrap();
    assert!(planner.compute_shortest_path());

    planner.update_edge_cost(1, 2, f64::INFINITY).unwrap();
    // (1, 3) was never added: the update is a silent no-op
    planner.update_edge_cost(1, 3, f64::INFINITY).unwrap();

    assert_eq!(planner.get_path(), None);
    assert!(planner.get_path_cost().is_infinite());
}

#[test]
fn repeated_updates_are_idempotent() {
    let mut planner = chain_planner();
    planner.initialize(1, 6).unwrap();
    planner.compute_shortest_path();

    planner.update_edge_cost(4, 6, 6.0).unwrap();
    let path = planner.get_path();
    let cost = planner.get_path_cost();
    let states = planner.get_edge_states();

    planner.update_edge_cost(4, 6, 6.0).unwrap();
    assert_eq!(planner.get_path(), path);
    assert_relative_eq!(planner.get_path_cost(), cost, epsilon = 1e-9);
    assert_eq!(planner.get_edge_states(), states);

    // Restoring after writing back the original cost is a no-op
    planner.update_edge_cost(4, 6, 4.0).unwrap();
    let cost = planner.get_path_cost();
    planner.restore_edge_cost(4, 6);
    assert_relative_eq!(planner.get_path_cost(), cost, epsilon = 1e-9);
}

#[test]
fn batched_changes_repair_once() {
    let mut planner = chain_planner();
    planner.initialize(1, 6).unwrap();
    planner.compute_shortest_path();

    planner
        .update_edge_costs(&[
            (3, 4, f64::INFINITY),
            (2, 4, 2.0),
            (4, 6, 5.0),
        ])
        .unwrap();
    // Best route is now 1 -> 2 -> 4 -> 6 at 1 + 2 + 5
    assert_relative_eq!(planner.get_path_cost(), 8.0, epsilon = 1e-9);
    assert_matches_dijkstra(&planner, 1, 6);
}

#[test]
fn key_modifier_is_monotone_while_traversing() {
    let mut planner = chain_planner();
    planner.initialize(1, 6).unwrap();
    planner.compute_shortest_path();

    let mut km_previous = planner.key_modifier();
    let mut current = 1u64;
    loop {
        let path = planner.get_path().expect("goal stays reachable");
        assert_eq!(path.first(), Some(&current));
        if path.len() < 2 {
            break;
        }
        current = path[1];
        planner.update_start_and_replan(current).unwrap();
        assert!(planner.key_modifier() >= km_previous);
        km_previous = planner.key_modifier();
        assert_matches_dijkstra(&planner, current, 6);
    }
    assert_eq!(current, 6);
}

#[test]
fn random_repairs_match_fresh_dijkstra() {
    // Dense-ish random digraph with a zero heuristic (always admissible)
    let mut rng = StdRng::seed_from_u64(7);
    let node_count = 30u64;
    let mut planner = DStarLitePlanner::with_heuristic(|_, _| 0.0);

    let mut edges = Vec::new();
    for from in 0..node_count {
        planner.add_node(from);
        for to in 0..node_count {
            if from != to && rng.gen_bool(0.15) {
                let cost = rng.gen_range(1.0..10.0);
                planner.add_edge(from, to, cost).unwrap();
                edges.push((from, to));
            }
        }
    }
    // Guarantee at least one edge to mutate
    planner.add_edge(0, 1, 3.0).unwrap();
    edges.push((0, 1));

    planner.initialize(0, node_count - 1).unwrap();
    planner.compute_shortest_path();
    assert_matches_dijkstra(&planner, 0, node_count - 1);

    for _ in 0..60 {
        let (from, to) = edges[rng.gen_range(0..edges.len())];
        let new_cost = if rng.gen_bool(0.25) {
            f64::INFINITY
        } else {
            rng.gen_range(1.0..10.0)
        };
        planner.update_edge_cost(from, to, new_cost).unwrap();
        assert_matches_dijkstra(&planner, 0, node_count - 1);
    }
}

#[test]
fn grid_replanning_with_dynamic_obstacles() {
    env_logger::try_init().ok();
    let start = GridCoord::new(2, 2);
    let goal = GridCoord::new(17, 7);
    let mut planner = DStarGridPlanner::new(20, 10, goal).unwrap();
    planner.initialize(start, goal).unwrap();
    assert!(planner.compute_shortest_path());

    let first = planner.get_path().expect("empty grid has a path");
    let first_cost = planner.get_path_cost();
    assert_grid_path_valid(&planner, &first, start, goal);

    planner.add_obstacle(GridCoord::new(5, 2)).unwrap();
    planner.add_obstacle(GridCoord::new(6, 2)).unwrap();

    let second = planner.get_path().expect("obstacles leave a detour");
    assert_grid_path_valid(&planner, &second, start, goal);
    assert!(planner.get_path_cost() >= first_cost - 1e-9);
}

#[test]
fn grid_obstacle_toggles_match_fresh_dijkstra() {
    let mut rng = StdRng::seed_from_u64(11);
    let start = GridCoord::new(0, 0);
    let goal = GridCoord::new(14, 9);
    let mut planner = DStarGridPlanner::new(15, 10, goal).unwrap();
    planner.initialize(start, goal).unwrap();
    planner.compute_shortest_path();

    for _ in 0..40 {
        let cell = GridCoord::new(rng.gen_range(0..15), rng.gen_range(0..10));
        if cell == start || cell == goal {
            continue;
        }
        if planner.is_obstacle(cell) {
            planner.remove_obstacle(cell).unwrap();
        } else {
            planner.add_obstacle(cell).unwrap();
        }

        let space = planner.space();
        let reference = dijkstra::shortest_path(
            space,
            space.index(start),
            space.index(goal),
        );
        match reference {
            Some(reference) => {
                assert_relative_eq!(planner.get_path_cost(), reference.cost, epsilon = 1e-9);
                let path = planner.get_path().expect("reference found a path");
                assert_grid_path_valid(&planner, &path, start, goal);
            }
            None => {
                assert!(planner.get_path_cost().is_infinite());
                assert_eq!(planner.get_path(), None);
            }
        }
    }
}

/// Assert a grid path is 8-connected, obstacle-free, begins at start,
/// and ends at goal
fn assert_grid_path_valid(
    planner: &DStarGridPlanner,
    path: &[GridCoord],
    start: GridCoord,
    goal: GridCoord,
) {
    assert_eq!(path.first(), Some(&start));
    assert_eq!(path.last(), Some(&goal));
    for window in path.windows(2) {
        assert!(
            window[0].is_adjacent_8(&window[1]),
            "{:?} and {:?} are not adjacent",
            window[0],
            window[1]
        );
    }
    for cell in path {
        assert!(!planner.is_obstacle(*cell), "path crosses obstacle {:?}", cell);
    }
}
