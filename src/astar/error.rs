// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::GraphError;

/// Recommended number of allowed vertex expansions in
/// [find_route](crate::find_route) before [RouteError::StepLimitExceeded]
/// is returned.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Error conditions which may occur during [find_route](crate::find_route)
/// or [shortest_path](crate::shortest_path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    /// The start or destination vertex doesn't exist in the graph.
    #[error("unknown vertex: {0}")]
    UnknownVertex(i64),

    /// A path query was issued against a graph with zero vertices.
    #[error("empty graph")]
    EmptyGraph,

    /// The frontier was exhausted without reaching the destination:
    /// the two vertices lie in disconnected components.
    #[error("no path between the given vertices")]
    NoPath,

    /// Route search has exceeded its limit of steps.
    /// Either the vertices are really far apart, or no path exists.
    ///
    /// Concluding that no path exists requires traversing the whole
    /// component, which can result in a denial-of-service. The step limit
    /// protects against resource exhaustion.
    #[error("step limit exceeded")]
    StepLimitExceeded,
}

impl From<GraphError> for RouteError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::EmptyGraph => Self::EmptyGraph,
            GraphError::UnknownVertex(id) | GraphError::DuplicateId(id) => Self::UnknownVertex(id),
        }
    }
}
