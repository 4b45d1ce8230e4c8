// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Turns already-structured node/way records into a routing [Graph].
//!
//! Parsing the raw map document is the job of an external collaborator;
//! this module only consumes its output: flat [NodeRecord]s and
//! [WayRecord]s. Consecutive node pairs of every way become undirected
//! edges, way names are remembered per edge for
//! [narration](crate::narrate), and the finished graph is
//! [pruned](Graph::prune) of vertices no way ever referenced.

use std::collections::HashMap;

use log::warn;

use crate::{Graph, GraphError};

/// A single map point, as handed over by the document parser.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub name: Option<String>,
}

/// One named road segment chain, as handed over by the document parser.
/// `nodes` is ordered; every consecutive pair becomes an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct WayRecord {
    pub id: i64,
    pub name: Option<String>,
    pub max_speed: Option<String>,
    pub nodes: Vec<i64>,
}

/// Lookup from an undirected edge to the name of the way it came from,
/// used by [narrate](crate::narrate) to label navigation steps.
#[derive(Debug, Default, Clone)]
pub struct WayNames {
    names: HashMap<(i64, i64), String>,
}

impl WayNames {
    fn key(a: i64, b: i64) -> (i64, i64) {
        (a.min(b), a.max(b))
    }

    fn insert(&mut self, a: i64, b: i64, name: &str) {
        self.names.insert(Self::key(a, b), name.to_string());
    }

    /// The name of the way owning the edge between `a` and `b`,
    /// or [None] for edges of unnamed ways.
    pub fn name_of(&self, a: i64, b: i64) -> Option<&str> {
        self.names.get(&Self::key(a, b)).map(String::as_str)
    }
}

/// Builds a pruned routing [Graph] plus its [WayNames] from parsed records.
///
/// Duplicate node ids are rejected with [GraphError::DuplicateId]. Way node
/// references that don't resolve to a known node are dropped with a warning,
/// and ways with fewer than two surviving nodes are skipped entirely.
pub fn build_graph<N, W>(nodes: N, ways: W) -> Result<(Graph, WayNames), GraphError>
where
    N: IntoIterator<Item = NodeRecord>,
    W: IntoIterator<Item = WayRecord>,
{
    let mut g = Graph::new();
    let mut way_names = WayNames::default();

    for node in nodes {
        g.add_vertex(node.id, node.lon, node.lat)?;
        if let Some(name) = node.name {
            g.set_vertex_name(node.id, name)?;
        }
    }

    for way in ways {
        let node_count = way.nodes.len();
        let known: Vec<i64> = way
            .nodes
            .into_iter()
            .filter(|&id| g.vertex(id).is_some())
            .collect();
        if known.len() < node_count {
            warn!(
                "way {} references {} unknown node(s)",
                way.id,
                node_count - known.len()
            );
        }
        if known.len() < 2 {
            warn!("way {} has fewer than 2 usable nodes, skipping", way.id);
            continue;
        }

        for pair in known.windows(2) {
            g.add_edge(pair[0], pair[1])?;
            if let Some(name) = &way.name {
                way_names.insert(pair[0], pair[1], name);
            }
        }
    }

    g.prune();
    Ok((g, way_names))
}
