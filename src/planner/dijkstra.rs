//! Baseline Dijkstra shortest path.
//!
//! Non-incremental reference planner over any [`SearchSpace`]. Useful
//! for one-shot queries, and as the ground truth the incremental
//! planners are checked against.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::graph::SearchSpace;

/// State for the Dijkstra priority queue.
#[derive(Clone, Copy, Debug)]
struct DijkstraState {
    cost: f64,
    vertex: usize,
}

impl PartialEq for DijkstraState {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost && self.vertex == other.vertex
    }
}

impl Eq for DijkstraState {}

impl Ord for DijkstraState {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .cost
            .partial_cmp(&self.cost)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for DijkstraState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of a Dijkstra search.
#[derive(Clone, Debug)]
pub struct DijkstraResult {
    /// Vertex indices from start to goal
    pub path: Vec<usize>,
    /// Total path cost
    pub cost: f64,
}

/// Find the shortest path from `start` to `goal`, or None if unreachable.
pub fn shortest_path<S: SearchSpace>(
    space: &S,
    start: usize,
    goal: usize,
) -> Option<DijkstraResult> {
    if !space.contains(start) || !space.contains(goal) {
        return None;
    }
    if start == goal {
        return Some(DijkstraResult {
            path: vec![start],
            cost: 0.0,
        });
    }

    let n = space.node_count();
    let mut dist: Vec<f64> = vec![f64::INFINITY; n];
    let mut prev: Vec<Option<usize>> = vec![None; n];
    dist[start] = 0.0;

    let mut heap = BinaryHeap::new();
    heap.push(DijkstraState {
        cost: 0.0,
        vertex: start,
    });

    while let Some(DijkstraState { cost, vertex }) = heap.pop() {
        // Skip if a better path has already been found
        if cost > dist[vertex] {
            continue;
        }
        if vertex == goal {
            break;
        }

        for (neighbor, edge_cost) in space.successors(vertex) {
            if edge_cost.is_infinite() {
                continue;
            }
            let next = dist[vertex] + edge_cost;
            if next < dist[neighbor] {
                dist[neighbor] = next;
                prev[neighbor] = Some(vertex);
                heap.push(DijkstraState {
                    cost: next,
                    vertex: neighbor,
                });
            }
        }
    }

    prev[goal]?;

    let mut path = Vec::new();
    let mut current = goal;
    while current != start {
        path.push(current);
        current = prev[current]?;
    }
    path.push(start);
    path.reverse();

    Some(DijkstraResult {
        path,
        cost: dist[goal],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyGraph;
    use approx::assert_relative_eq;

    fn make_graph() -> AdjacencyGraph {
        // 0 --1.0-- 1 --1.0-- 2
        // |         |
        // 2.0       1.5
        // |         |
        // 3 --1.0-- 4
        let mut graph = AdjacencyGraph::new();
        for &(a, b, c) in &[
            (0u64, 1u64, 1.0),
            (1, 0, 1.0),
            (1, 2, 1.0),
            (2, 1, 1.0),
            (0, 3, 2.0),
            (3, 0, 2.0),
            (1, 4, 1.5),
            (4, 1, 1.5),
            (3, 4, 1.0),
            (4, 3, 1.0),
        ] {
            graph.add_edge(a, b, c).unwrap();
        }
        graph
    }

    #[test]
    fn test_shortest_path() {
        let graph = make_graph();
        let start = graph.index(0).unwrap();

        let result = shortest_path(&graph, start, graph.index(2).unwrap()).unwrap();
        assert_eq!(result.path.len(), 3);
        assert_relative_eq!(result.cost, 2.0);

        // 0 -> 4: through 1 (2.5) beats through 3 (3.0)
        let result = shortest_path(&graph, start, graph.index(4).unwrap()).unwrap();
        assert_relative_eq!(result.cost, 2.5);
    }

    #[test]
    fn test_same_vertex() {
        let graph = make_graph();
        let v = graph.index(3).unwrap();
        let result = shortest_path(&graph, v, v).unwrap();
        assert_eq!(result.path, vec![v]);
        assert_eq!(result.cost, 0.0);
    }

    #[test]
    fn test_unreachable() {
        let mut graph = make_graph();
        graph.add_node(9);
        let start = graph.index(0).unwrap();
        let island = graph.index(9).unwrap();
        assert!(shortest_path(&graph, start, island).is_none());
    }

    #[test]
    fn test_blocked_edges_skipped() {
        let mut graph = AdjacencyGraph::new();
        graph.add_edge(0, 1, 1.0).unwrap();
        graph.add_edge(1, 2, 1.0).unwrap();
        let a = graph.index(0).unwrap();
        let b = graph.index(1).unwrap();
        let c = graph.index(2).unwrap();

        graph.set_cost(b, c, f64::INFINITY);
        assert!(shortest_path(&graph, a, c).is_none());
    }
}
