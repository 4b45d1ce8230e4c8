// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Spatial queries over a street-network dataset: selecting pre-rendered map
//! tiles for a bounding box, and finding shortest paths between coordinates.
//!
//! The crate is built around a read-mostly [Graph]: an external collaborator
//! parses the raw map document into plain node/way records, [ingest] turns
//! those records into a pruned [Graph] plus a [WayNames](ingest::WayNames)
//! lookup, and from then on the graph only serves queries. [shortest_path]
//! runs A* between the vertices nearest to two coordinates, [narrate] turns
//! the resulting vertex sequence into turn-by-turn directions, and [raster]
//! picks the tile grid covering a bounding box at a requested pixel density.
//!
//! # Example
//!
//! ```no_run
//! # let (nodes, ways): (Vec<tilepath::ingest::NodeRecord>, Vec<tilepath::ingest::WayRecord>) = (vec![], vec![]);
//! let (g, way_names) = tilepath::ingest::build_graph(nodes, ways)
//!     .expect("failed to build graph");
//!
//! let route = tilepath::shortest_path(&g, -122.257, 37.871, -122.255, 37.868)
//!     .expect("failed to find route");
//!
//! for step in tilepath::narrate::directions(&g, &way_names, &route) {
//!     println!("{}", step);
//! }
//! ```

mod astar;
mod geo;
mod graph;
pub mod ingest;
mod kd;
pub mod narrate;
pub mod raster;

pub use astar::{find_route, shortest_path, RouteError, DEFAULT_STEP_LIMIT};
pub use geo::{bearing, distance};
pub use graph::{Graph, GraphError};
pub use kd::{KdPoint, KdTree};

/// Represents an intersection or road point of the [Graph].
///
/// Coordinates are degrees. `name` is only present for vertices that carry a
/// location name in the source dataset, and is assigned during the build
/// phase; after [Graph::prune] the graph is treated as immutable.
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub name: Option<String>,
}

impl Vertex {
    pub fn new(id: i64, lon: f64, lat: f64) -> Self {
        Self {
            id,
            lon,
            lat,
            name: None,
        }
    }
}
