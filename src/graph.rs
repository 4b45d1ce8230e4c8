// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use crate::{geo, Vertex};

/// Error conditions raised by [Graph] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// A vertex with this id was inserted twice during the build phase.
    #[error("duplicate vertex: {0}")]
    DuplicateId(i64),

    /// An operation referenced a vertex id not present in the graph.
    #[error("unknown vertex: {0}")]
    UnknownVertex(i64),

    /// A nearest-vertex query was issued against a graph with zero vertices.
    #[error("empty graph")]
    EmptyGraph,
}

/// Represents a street network as a set of [Vertices](Vertex) and an
/// undirected adjacency relation between them.
///
/// The graph goes through two phases: a single-threaded build phase
/// ([add_vertex](Self::add_vertex), [add_edge](Self::add_edge),
/// [set_vertex_name](Self::set_vertex_name)) followed by exactly one
/// [prune](Self::prune), after which the graph must be treated as read-only.
/// A read-only graph is safe to share across threads; every query allocates
/// its own scratch state.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Graph {
    vertices: BTreeMap<i64, Vertex>,
    adjacent: BTreeMap<i64, BTreeSet<i64>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of vertices in the graph.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns an iterator over all [Vertices](Vertex), in ascending id order.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Retrieves the [Vertex] with the provided id.
    pub fn vertex(&self, id: i64) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// Inserts a new [Vertex] without a name.
    ///
    /// Inserting an id that is already present is rejected with
    /// [GraphError::DuplicateId] rather than silently overwriting: an
    /// overwrite could move a vertex that already has edges, invalidating
    /// every previously computed edge cost.
    pub fn add_vertex(&mut self, id: i64, lon: f64, lat: f64) -> Result<(), GraphError> {
        match self.vertices.entry(id) {
            Entry::Vacant(e) => {
                e.insert(Vertex::new(id, lon, lat));
                Ok(())
            }
            Entry::Occupied(_) => Err(GraphError::DuplicateId(id)),
        }
    }

    /// Assigns a name to an existing [Vertex]. Build-phase only.
    pub fn set_vertex_name(&mut self, id: i64, name: String) -> Result<(), GraphError> {
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or(GraphError::UnknownVertex(id))?;
        vertex.name = Some(name);
        Ok(())
    }

    /// Records an undirected edge between two existing vertices.
    ///
    /// The adjacency relation is a set: re-adding an existing edge is a
    /// no-op. Both endpoints must already exist, which keeps the invariant
    /// that every id appearing in a neighbor set is also a vertex.
    pub fn add_edge(&mut self, a: i64, b: i64) -> Result<(), GraphError> {
        if !self.vertices.contains_key(&a) {
            return Err(GraphError::UnknownVertex(a));
        }
        if !self.vertices.contains_key(&b) {
            return Err(GraphError::UnknownVertex(b));
        }
        self.adjacent.entry(a).or_default().insert(b);
        self.adjacent.entry(b).or_default().insert(a);
        Ok(())
    }

    /// Deletes a [Vertex] and its own adjacency entry.
    ///
    /// Ids referencing the removed vertex in *other* neighbor sets are left
    /// in place (removing them would require a walk over the whole graph).
    /// Only vertices that no neighbor set references may therefore be safely
    /// removed; [prune](Self::prune) targets exactly those.
    pub fn remove_vertex(&mut self, id: i64) {
        self.vertices.remove(&id);
        self.adjacent.remove(&id);
    }

    /// Removes every vertex that never received an edge.
    ///
    /// This does not guarantee that any two remaining vertices are connected,
    /// but road networks are connected enough in practice. Must run after all
    /// edges are added and before any query. Idempotent: a vertex removed
    /// here was never referenced by another neighbor set, so no dangling ids
    /// are introduced and a second pass finds nothing to remove.
    pub fn prune(&mut self) {
        let isolated: Vec<i64> = self
            .vertices
            .keys()
            .filter(|id| self.adjacent.get(id).map_or(true, |n| n.is_empty()))
            .copied()
            .collect();
        for id in isolated {
            self.remove_vertex(id);
        }
    }

    /// Returns the ids of all vertices adjacent to `id`.
    pub fn neighbors(&self, id: i64) -> Result<&BTreeSet<i64>, GraphError> {
        self.adjacent.get(&id).ok_or(GraphError::UnknownVertex(id))
    }

    /// Returns the `(lon, lat)` coordinate of a vertex.
    pub fn coordinate(&self, id: i64) -> Result<(f64, f64), GraphError> {
        self.vertices
            .get(&id)
            .map(|v| (v.lon, v.lat))
            .ok_or(GraphError::UnknownVertex(id))
    }

    /// The great-circle distance in miles between two vertices of the graph.
    pub fn vertex_distance(&self, a: i64, b: i64) -> Result<f64, GraphError> {
        let (lon_a, lat_a) = self.coordinate(a)?;
        let (lon_b, lat_b) = self.coordinate(b)?;
        Ok(geo::distance(lon_a, lat_a, lon_b, lat_b))
    }

    /// The initial bearing in degrees from one vertex of the graph to another.
    pub fn vertex_bearing(&self, a: i64, b: i64) -> Result<f64, GraphError> {
        let (lon_a, lat_a) = self.coordinate(a)?;
        let (lon_b, lat_b) = self.coordinate(b)?;
        Ok(geo::bearing(lon_a, lat_a, lon_b, lat_b))
    }

    /// Finds the id of the vertex closest to the given position by
    /// great-circle distance. Ties are broken by the lowest id.
    ///
    /// This computes the distance to every vertex in the graph; for repeated
    /// lookups on a large graph, build a [KdTree](crate::KdTree) instead.
    pub fn closest(&self, lon: f64, lat: f64) -> Result<i64, GraphError> {
        let mut best: Option<(f64, i64)> = None;
        // Ascending id iteration plus a strict `<` keeps the lowest id on ties.
        for v in self.vertices.values() {
            let d = geo::distance(lon, lat, v.lon, v.lat);
            if best.map_or(true, |(best_d, _)| d < best_d) {
                best = Some((d, v.id));
            }
        }
        best.map(|(_, id)| id).ok_or(GraphError::EmptyGraph)
    }
}
