// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{geo, Graph};

/// A vertex position held by the [KdTree]. Carries just enough of a
/// [Vertex](crate::Vertex) to answer nearest-vertex queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KdPoint {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
}

/// KdTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree),
/// which can be used to speed up nearest-vertex search for large datasets.
/// Practice shows that [Graph::closest] takes significantly more time than
/// [find_route](crate::find_route) when generating multiple routes; a k-d
/// tree helps with that, trading memory usage for CPU time.
///
/// This implementation assumes euclidean geometry, even though the distance
/// function used is the great-circle [distance](crate::distance). This
/// results in undefined behavior when points are close to the anti-meridian
/// (180°/-180° longitude) or poles (90°/-90° latitude), or when the data
/// spans multiple continents.
#[derive(Debug, Clone)]
pub struct KdTree {
    pivot: KdPoint,
    left: Option<Box<KdTree>>,
    right: Option<Box<KdTree>>,
}

impl KdTree {
    /// Builds a k-d tree over all vertices of a graph.
    /// Returns [None] for an empty graph.
    pub fn from_graph(g: &Graph) -> Option<Self> {
        let mut points: Vec<KdPoint> = g
            .vertices()
            .map(|v| KdPoint {
                id: v.id,
                lon: v.lon,
                lat: v.lat,
            })
            .collect();
        Self::build(points.as_mut_slice())
    }

    /// Builds a k-d tree from a mutable slice of points. Points will be
    /// reordered in the slice to facilitate building the tree.
    pub fn build(points: &mut [KdPoint]) -> Option<Self> {
        Self::build_impl(points, false)
    }

    fn build_impl(points: &mut [KdPoint], lon_divides: bool) -> Option<Self> {
        match points.len() {
            0 => None,
            1 => Some(Self {
                pivot: points[0],
                left: None,
                right: None,
            }),
            _ => {
                if lon_divides {
                    points.sort_by(|a, b| a.lon.partial_cmp(&b.lon).unwrap());
                } else {
                    points.sort_by(|a, b| a.lat.partial_cmp(&b.lat).unwrap());
                }
                let median = points.len() / 2;
                let pivot = points[median];
                let (left, right_and_pivot) = points.split_at_mut(median);
                let right = &mut right_and_pivot[1..];
                Some(Self {
                    pivot,
                    left: Self::build_impl(left, !lon_divides).map(Box::new),
                    right: Self::build_impl(right, !lon_divides).map(Box::new),
                })
            }
        }
    }

    /// Finds the id of the vertex closest to the given position.
    pub fn nearest(&self, lon: f64, lat: f64) -> i64 {
        self.nearest_impl(lon, lat, false).0.id
    }

    fn nearest_impl(&self, lon: f64, lat: f64, lon_divides: bool) -> (KdPoint, f64) {
        // Start by assuming that pivot is the closest
        let mut best = self.pivot;
        let mut best_dist = geo::distance(lon, lat, best.lon, best.lat);

        // Select which branch to recurse into first
        let first_left = if lon_divides {
            lon < best.lon
        } else {
            lat < best.lat
        };
        let (first, second) = if first_left {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(branch) = first {
            let (alt, alt_dist) = branch.nearest_impl(lon, lat, !lon_divides);
            if alt_dist < best_dist {
                best = alt;
                best_dist = alt_dist;
            }
        }

        // (Optionally) recurse into the second branch
        if let Some(branch) = second {
            // A closer vertex is possible in the second branch if and only if
            // the splitting axis is closer than the current best candidate.
            let (axis_lon, axis_lat) = if lon_divides {
                (self.pivot.lon, lat)
            } else {
                (lon, self.pivot.lat)
            };
            let dist_to_axis = geo::distance(lon, lat, axis_lon, axis_lat);

            if dist_to_axis < best_dist {
                let (alt, alt_dist) = branch.nearest_impl(lon, lat, !lon_divides);
                if alt_dist < best_dist {
                    best = alt;
                    best_dist = alt_dist;
                }
            }
        }

        (best, best_dist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kd_tree() {
        let tree = KdTree::build(&mut [
            KdPoint {
                id: 1,
                lat: 0.01,
                lon: 0.01,
            },
            KdPoint {
                id: 2,
                lat: 0.01,
                lon: 0.05,
            },
            KdPoint {
                id: 3,
                lat: 0.03,
                lon: 0.09,
            },
            KdPoint {
                id: 4,
                lat: 0.04,
                lon: 0.03,
            },
            KdPoint {
                id: 5,
                lat: 0.04,
                lon: 0.07,
            },
            KdPoint {
                id: 6,
                lat: 0.07,
                lon: 0.03,
            },
            KdPoint {
                id: 7,
                lat: 0.07,
                lon: 0.01,
            },
            KdPoint {
                id: 8,
                lat: 0.08,
                lon: 0.05,
            },
            KdPoint {
                id: 9,
                lat: 0.08,
                lon: 0.09,
            },
        ])
        .expect("k-d tree from non-empty slice must not be empty");

        assert_eq!(tree.nearest(0.02, 0.02), 1);
        assert_eq!(tree.nearest(0.03, 0.05), 4);
        assert_eq!(tree.nearest(0.08, 0.05), 5);
        assert_eq!(tree.nearest(0.06, 0.09), 8);
    }

    #[test]
    fn agrees_with_linear_scan() {
        let mut g = Graph::new();
        g.add_vertex(1, -122.27, 37.86).unwrap();
        g.add_vertex(2, -122.25, 37.87).unwrap();
        g.add_vertex(3, -122.23, 37.85).unwrap();
        g.add_vertex(4, -122.26, 37.84).unwrap();

        let tree = KdTree::from_graph(&g).unwrap();
        for &(lon, lat) in &[(-122.27, 37.855), (-122.24, 37.86), (-122.255, 37.845)] {
            assert_eq!(tree.nearest(lon, lat), g.closest(lon, lat).unwrap());
        }
    }

    #[test]
    fn empty_graph_has_no_tree() {
        assert!(KdTree::from_graph(&Graph::new()).is_none());
    }
}
