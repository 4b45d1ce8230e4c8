// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::{BinaryHeap, HashMap};

use crate::{geo, Graph, RouteError, DEFAULT_STEP_LIMIT};

/// An ephemeral frontier entry for a single query. `cost` is the tentative
/// best-known cost from the source (g), `heuristic` the great-circle
/// estimate to the destination (h), and `score` their sum (f). Never stored
/// on the permanent [Vertex](crate::Vertex), so concurrent queries share no
/// mutable state.
#[derive(Debug, Clone, Copy)]
struct QueueItem {
    at: i64,
    cost: f64,
    heuristic: f64,
    score: f64,
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score && self.heuristic == other.heuristic
    }
}

impl Eq for QueueItem {}

impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // NOTE: We revert the order of comparison, as lower scores are
        // considered better ("higher"), and Rust's BinaryHeap is a max-heap.
        // Equal scores are ordered by the heuristic, so that on ties the
        // entry closer to the destination is popped first (deterministic).
        other
            .score
            .partial_cmp(&self.score)
            .unwrap()
            .then(other.heuristic.partial_cmp(&self.heuristic).unwrap())
    }
}

fn reconstruct_path(came_from: &HashMap<i64, i64>, mut last: i64) -> Vec<i64> {
    let mut path = vec![last];

    while let Some(&v) = came_from.get(&last) {
        path.push(v);
        last = v;
    }

    path.reverse();
    path
}

/// Uses the [A* algorithm](https://en.wikipedia.org/wiki/A*_search_algorithm)
/// to find the lowest-cost path between two vertices of the provided graph,
/// returned as an ordered vertex-id sequence (source first, destination
/// last). Edge costs and the heuristic both come from the great-circle
/// [distance](crate::distance), which never overestimates the remaining road
/// distance, so the returned path is optimal.
///
/// Returns [RouteError::NoPath] if the destination is unreachable.
///
/// `step_limit` limits how many vertices may be expanded during the search
/// before returning [RouteError::StepLimitExceeded]. Concluding that no path
/// exists requires expanding every vertex reachable from the source, which
/// can be very time-consuming on large datasets. The recommended value is
/// [DEFAULT_STEP_LIMIT].
pub fn find_route(
    g: &Graph,
    from_id: i64,
    to_id: i64,
    step_limit: usize,
) -> Result<Vec<i64>, RouteError> {
    let (to_lon, to_lat) = g
        .coordinate(to_id)
        .map_err(|_| RouteError::UnknownVertex(to_id))?;
    let (from_lon, from_lat) = g
        .coordinate(from_id)
        .map_err(|_| RouteError::UnknownVertex(from_id))?;

    if from_id == to_id {
        return Ok(vec![from_id]);
    }

    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::new();
    let mut came_from: HashMap<i64, i64> = HashMap::new();
    let mut known_costs: HashMap<i64, f64> = HashMap::new();
    let mut steps: usize = 0;

    let initial_heuristic = geo::distance(from_lon, from_lat, to_lon, to_lat);
    queue.push(QueueItem {
        at: from_id,
        cost: 0.0,
        heuristic: initial_heuristic,
        score: initial_heuristic,
    });
    known_costs.insert(from_id, 0.0);

    while let Some(item) = queue.pop() {
        // Termination is checked on the popped vertex id, never on the
        // heuristic reaching zero: distinct vertices can sit arbitrarily
        // close together.
        if item.at == to_id {
            return Ok(reconstruct_path(&came_from, to_id));
        }

        // Contrary to the wikipedia definition, we might keep multiple items
        // in the queue for the same vertex. Stale entries, whose cost has
        // since been beaten, are skipped instead of decrease-keyed.
        if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
            continue;
        }

        steps += 1;
        if steps > step_limit {
            return Err(RouteError::StepLimitExceeded);
        }

        let Ok(neighbors) = g.neighbors(item.at) else {
            continue; // a vertex that never received an edge has no entry
        };
        let (at_lon, at_lat) = g.coordinate(item.at)?;

        for &neighbor_id in neighbors {
            // Pruning only ever removes vertices no neighbor set references,
            // so the endpoint is guaranteed to exist.
            let (n_lon, n_lat) = g.coordinate(neighbor_id)?;

            // Check if this is the cheapest known way to the neighbor
            let neighbor_cost = item.cost + geo::distance(at_lon, at_lat, n_lon, n_lat);
            if neighbor_cost
                >= known_costs
                    .get(&neighbor_id)
                    .copied()
                    .unwrap_or(f64::INFINITY)
            {
                continue;
            }

            came_from.insert(neighbor_id, item.at);
            known_costs.insert(neighbor_id, neighbor_cost);
            let heuristic = geo::distance(n_lon, n_lat, to_lon, to_lat);
            queue.push(QueueItem {
                at: neighbor_id,
                cost: neighbor_cost,
                heuristic,
                score: neighbor_cost + heuristic,
            });
        }
    }

    Err(RouteError::NoPath)
}

/// Finds the lowest-cost path between the graph vertices nearest to the two
/// given coordinates, with the [DEFAULT_STEP_LIMIT].
///
/// If both coordinates resolve to the same vertex, the path is that single
/// vertex. Fails with [RouteError::EmptyGraph] if the graph has no vertices.
pub fn shortest_path(
    g: &Graph,
    start_lon: f64,
    start_lat: f64,
    dest_lon: f64,
    dest_lat: f64,
) -> Result<Vec<i64>, RouteError> {
    let from_id = g.closest(start_lon, start_lat)?;
    let to_id = g.closest(dest_lon, dest_lat)?;
    find_route(g, from_id, to_id, DEFAULT_STEP_LIMIT)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Plain Dijkstra used as the ground truth for the A* optimality check.
    fn dijkstra_cost(g: &Graph, from_id: i64, to_id: i64) -> Option<f64> {
        let mut queue: BinaryHeap<QueueItem> = BinaryHeap::new();
        let mut known_costs: HashMap<i64, f64> = HashMap::new();

        queue.push(QueueItem {
            at: from_id,
            cost: 0.0,
            heuristic: 0.0,
            score: 0.0,
        });
        known_costs.insert(from_id, 0.0);

        while let Some(item) = queue.pop() {
            if item.at == to_id {
                return Some(item.cost);
            }
            if item.cost > known_costs.get(&item.at).copied().unwrap_or(f64::INFINITY) {
                continue;
            }
            let Ok(neighbors) = g.neighbors(item.at) else {
                continue;
            };
            for &n in neighbors {
                let cost = item.cost + g.vertex_distance(item.at, n).unwrap();
                if cost >= known_costs.get(&n).copied().unwrap_or(f64::INFINITY) {
                    continue;
                }
                known_costs.insert(n, cost);
                queue.push(QueueItem {
                    at: n,
                    cost,
                    heuristic: 0.0,
                    score: cost,
                });
            }
        }
        None
    }

    fn path_cost(g: &Graph, path: &[i64]) -> f64 {
        path.windows(2)
            .map(|w| g.vertex_distance(w[0], w[1]).unwrap())
            .sum()
    }

    fn chain_graph() -> Graph {
        let mut g = Graph::new();
        g.add_vertex(1, 0.0, 0.0).unwrap();
        g.add_vertex(2, 0.0, 1.0).unwrap();
        g.add_vertex(3, 1.0, 1.0).unwrap();
        g.add_edge(1, 2).unwrap();
        g.add_edge(2, 3).unwrap();
        g
    }

    #[test]
    fn routes_along_a_chain() {
        let g = chain_graph();
        let route = shortest_path(&g, 0.1, -0.1, 1.1, 1.1).unwrap();
        assert_eq!(route, vec![1, 2, 3]);
    }

    #[test]
    fn same_start_and_destination() {
        let g = chain_graph();
        let route = shortest_path(&g, 0.0, 0.01, 0.01, 0.0).unwrap();
        assert_eq!(route, vec![1]);
        assert_eq!(path_cost(&g, &route), 0.0);
    }

    #[test]
    fn disconnected_components_have_no_path() {
        let mut g = Graph::new();
        g.add_vertex(1, 0.0, 0.0).unwrap();
        g.add_vertex(2, 0.0, 1.0).unwrap();
        g.add_vertex(3, 10.0, 10.0).unwrap();
        g.add_vertex(4, 10.0, 11.0).unwrap();
        g.add_edge(1, 2).unwrap();
        g.add_edge(3, 4).unwrap();

        assert_eq!(
            find_route(&g, 1, 3, DEFAULT_STEP_LIMIT),
            Err(RouteError::NoPath)
        );
    }

    #[test]
    fn unknown_endpoints_are_rejected() {
        let g = chain_graph();
        assert_eq!(
            find_route(&g, 1, 99, DEFAULT_STEP_LIMIT),
            Err(RouteError::UnknownVertex(99))
        );
        assert_eq!(
            find_route(&g, 99, 1, DEFAULT_STEP_LIMIT),
            Err(RouteError::UnknownVertex(99))
        );
    }

    #[test]
    fn empty_graph_is_rejected() {
        let g = Graph::new();
        assert_eq!(
            shortest_path(&g, 0.0, 0.0, 1.0, 1.0),
            Err(RouteError::EmptyGraph)
        );
    }

    #[test]
    fn step_limit_is_enforced() {
        let g = chain_graph();
        assert_eq!(find_route(&g, 1, 3, 1), Err(RouteError::StepLimitExceeded));
    }

    #[test]
    fn prefers_the_shorter_of_two_routes() {
        // Two routes from 1 to 4: direct-ish via 2, or a detour via 5 and 6.
        let mut g = Graph::new();
        g.add_vertex(1, 0.0, 0.0).unwrap();
        g.add_vertex(2, 0.5, 0.1).unwrap();
        g.add_vertex(4, 1.0, 0.0).unwrap();
        g.add_vertex(5, 0.3, 1.0).unwrap();
        g.add_vertex(6, 0.7, 1.0).unwrap();
        g.add_edge(1, 2).unwrap();
        g.add_edge(2, 4).unwrap();
        g.add_edge(1, 5).unwrap();
        g.add_edge(5, 6).unwrap();
        g.add_edge(6, 4).unwrap();

        let route = find_route(&g, 1, 4, DEFAULT_STEP_LIMIT).unwrap();
        assert_eq!(route, vec![1, 2, 4]);
    }

    #[test]
    fn never_worse_than_dijkstra() {
        // An irregular mesh with several competing routes.
        let mut g = Graph::new();
        let coords = [
            (1, 0.00, 0.00),
            (2, 0.10, 0.05),
            (3, 0.20, 0.00),
            (4, 0.05, 0.12),
            (5, 0.15, 0.15),
            (6, 0.25, 0.10),
            (7, 0.10, 0.25),
            (8, 0.22, 0.22),
        ];
        for &(id, lon, lat) in &coords {
            g.add_vertex(id, lon, lat).unwrap();
        }
        for &(a, b) in &[
            (1, 2),
            (2, 3),
            (1, 4),
            (2, 5),
            (3, 6),
            (4, 5),
            (5, 6),
            (4, 7),
            (5, 8),
            (6, 8),
            (7, 8),
        ] {
            g.add_edge(a, b).unwrap();
        }

        for &(from, to) in &[(1, 8), (3, 7), (4, 6), (1, 6), (7, 3)] {
            let route = find_route(&g, from, to, DEFAULT_STEP_LIMIT).unwrap();
            let optimal = dijkstra_cost(&g, from, to).unwrap();
            assert!(
                path_cost(&g, &route) <= optimal + 1e-9,
                "A* route {:?} costs more than Dijkstra's {}",
                route,
                optimal
            );
        }
    }
}
