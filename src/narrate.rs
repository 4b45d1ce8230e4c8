// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Turn-by-turn directions for a computed route.
//!
//! [directions] walks an ordered vertex path, classifies the turn at every
//! intermediate vertex from the change in bearing, and merges stretches of
//! straight travel along the same way into single [NavigationStep]s. Steps
//! render to a fixed text line and parse back losslessly, so clients can
//! treat the textual form as the wire format.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::ingest::WayNames;
use crate::Graph;

/// Label used for edges whose way carries no name.
pub const UNKNOWN_ROAD: &str = "unknown road";

/// Classification of the maneuver at the start of a [NavigationStep].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    Start,
    Straight,
    SlightLeft,
    SlightRight,
    Right,
    Left,
    SharpLeft,
    SharpRight,
}

impl Turn {
    pub const ALL: [Turn; 8] = [
        Turn::Start,
        Turn::Straight,
        Turn::SlightLeft,
        Turn::SlightRight,
        Turn::Right,
        Turn::Left,
        Turn::SharpLeft,
        Turn::SharpRight,
    ];

    /// The human-readable label, as rendered into a step's text line.
    pub fn label(self) -> &'static str {
        match self {
            Turn::Start => "Start",
            Turn::Straight => "Go straight",
            Turn::SlightLeft => "Slight left",
            Turn::SlightRight => "Slight right",
            Turn::Right => "Turn right",
            Turn::Left => "Turn left",
            Turn::SharpLeft => "Sharp left",
            Turn::SharpRight => "Sharp right",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }

    /// Buckets a relative bearing (outgoing minus incoming, degrees) into a
    /// maneuver. The angle is first normalized into (-180, 180]; positive is
    /// a right turn, negative a left turn. Never returns [Turn::Start].
    pub fn classify(relative_bearing: f64) -> Self {
        let b = normalize_degrees(relative_bearing);
        match b.abs() {
            a if a <= 15.0 => Turn::Straight,
            a if a <= 30.0 => {
                if b > 0.0 {
                    Turn::SlightRight
                } else {
                    Turn::SlightLeft
                }
            }
            a if a <= 100.0 => {
                if b > 0.0 {
                    Turn::Right
                } else {
                    Turn::Left
                }
            }
            _ => {
                if b > 0.0 {
                    Turn::SharpRight
                } else {
                    Turn::SharpLeft
                }
            }
        }
    }
}

/// Wraps an angle in degrees into (-180, 180].
fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// One discrete navigation instruction: a maneuver, the way it leads onto,
/// and the distance traveled along that way, in miles.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationStep {
    pub turn: Turn,
    pub way: String,
    pub distance: f64,
}

impl fmt::Display for NavigationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {} and continue for {:.3} miles.",
            self.turn.label(),
            self.way,
            self.distance
        )
    }
}

/// A step's text line didn't match the expected fixed format.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed navigation step: {0:?}")]
pub struct ParseStepError(pub String);

impl FromStr for NavigationStep {
    type Err = ParseStepError;

    /// Parses the textual form produced by the `Display` impl back into a
    /// step. Together with the 3-decimal rendering of the distance, this
    /// makes `render -> parse` lossless up to 1e-3 miles.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        static PATTERN: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([a-zA-Z\s]+) on ([\w\s']*) and continue for ([0-9.]+) miles\.$")
                .unwrap()
        });

        let captures = PATTERN
            .captures(s)
            .ok_or_else(|| ParseStepError(s.to_string()))?;
        let turn = Turn::from_label(captures.get(1).unwrap().as_str())
            .ok_or_else(|| ParseStepError(s.to_string()))?;
        let distance: f64 = captures
            .get(3)
            .unwrap()
            .as_str()
            .parse()
            .map_err(|_| ParseStepError(s.to_string()))?;

        Ok(Self {
            turn,
            way: captures.get(2).unwrap().as_str().to_string(),
            distance,
        })
    }
}

/// Converts an ordered vertex path into discrete navigation steps.
///
/// The first step is always [Turn::Start] and accumulates distance along the
/// first way. A new step begins whenever the way name changes or the turn at
/// an intermediate vertex does not classify as straight; otherwise the
/// distance keeps accumulating into the current step. Edges of unnamed ways
/// are labeled [UNKNOWN_ROAD].
///
/// Routes shorter than two vertices yield a single zero-distance start step.
pub fn directions(g: &Graph, way_names: &WayNames, route: &[i64]) -> Vec<NavigationStep> {
    let edge_name = |a: i64, b: i64| -> String {
        way_names
            .name_of(a, b)
            .unwrap_or(UNKNOWN_ROAD)
            .to_string()
    };

    if route.len() < 2 {
        return vec![NavigationStep {
            turn: Turn::Start,
            way: UNKNOWN_ROAD.to_string(),
            distance: 0.0,
        }];
    }

    let mut steps = Vec::new();
    let mut current = NavigationStep {
        turn: Turn::Start,
        way: edge_name(route[0], route[1]),
        distance: edge_distance(g, route[0], route[1]),
    };

    for window in route.windows(3) {
        let (prev, mid, next) = (window[0], window[1], window[2]);
        let incoming = vertex_bearing(g, prev, mid);
        let outgoing = vertex_bearing(g, mid, next);
        let turn = Turn::classify(outgoing - incoming);
        let next_way = edge_name(mid, next);

        if next_way != current.way || turn != Turn::Straight {
            steps.push(current);
            current = NavigationStep {
                turn,
                way: next_way,
                distance: 0.0,
            };
        }
        current.distance += edge_distance(g, mid, next);
    }

    steps.push(current);
    steps
}

// The route only contains ids the search just resolved against the same
// graph, so the lookups cannot fail.
fn edge_distance(g: &Graph, a: i64, b: i64) -> f64 {
    g.vertex_distance(a, b).unwrap_or(0.0)
}

fn vertex_bearing(g: &Graph, a: i64, b: i64) -> f64 {
    g.vertex_bearing(a, b).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{build_graph, NodeRecord, WayRecord};
    use approx::assert_relative_eq;

    fn node(id: i64, lon: f64, lat: f64) -> NodeRecord {
        NodeRecord {
            id,
            lon,
            lat,
            name: None,
        }
    }

    fn way(id: i64, name: Option<&str>, nodes: &[i64]) -> WayRecord {
        WayRecord {
            id,
            name: name.map(String::from),
            max_speed: None,
            nodes: nodes.to_vec(),
        }
    }

    #[test]
    fn classify_buckets() {
        assert_eq!(Turn::classify(0.0), Turn::Straight);
        assert_eq!(Turn::classify(15.0), Turn::Straight);
        assert_eq!(Turn::classify(-15.0), Turn::Straight);
        assert_eq!(Turn::classify(20.0), Turn::SlightRight);
        assert_eq!(Turn::classify(-20.0), Turn::SlightLeft);
        assert_eq!(Turn::classify(60.0), Turn::Right);
        assert_eq!(Turn::classify(-60.0), Turn::Left);
        assert_eq!(Turn::classify(130.0), Turn::SharpRight);
        assert_eq!(Turn::classify(-130.0), Turn::SharpLeft);
    }

    #[test]
    fn classify_wraps_around() {
        // A bearing difference of 350° is really a 10° left turn.
        assert_eq!(Turn::classify(350.0), Turn::Straight);
        assert_eq!(Turn::classify(-350.0), Turn::Straight);
        assert_eq!(Turn::classify(250.0), Turn::SharpLeft);
    }

    #[test]
    fn render_parse_round_trip_for_every_label() {
        for turn in Turn::ALL {
            let step = NavigationStep {
                turn,
                way: "Shattuck Avenue".to_string(),
                distance: 1.234,
            };
            let parsed: NavigationStep = step.to_string().parse().unwrap();
            assert_eq!(parsed, step);
        }
    }

    #[test]
    fn parse_rejects_malformed_lines() {
        assert!("Proceed on Main and continue for 1.0 miles."
            .parse::<NavigationStep>()
            .is_err());
        assert!("Start on Main for 1.0 miles".parse::<NavigationStep>().is_err());
        assert!("".parse::<NavigationStep>().is_err());
    }

    /// L-shaped route: east along "Main Street", then north on "Oak Street".
    fn l_shaped() -> (crate::Graph, WayNames) {
        let nodes = vec![
            node(1, 0.0, 0.0),
            node(2, 0.1, 0.0),
            node(3, 0.2, 0.0),
            node(4, 0.2, 0.1),
        ];
        let ways = vec![
            way(10, Some("Main Street"), &[1, 2, 3]),
            way(11, Some("Oak Street"), &[3, 4]),
        ];
        build_graph(nodes, ways).unwrap()
    }

    #[test]
    fn straight_travel_merges_into_one_step() {
        let (g, names) = l_shaped();
        let steps = directions(&g, &names, &[1, 2, 3]);

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].turn, Turn::Start);
        assert_eq!(steps[0].way, "Main Street");
        let expected = g.vertex_distance(1, 2).unwrap() + g.vertex_distance(2, 3).unwrap();
        assert_relative_eq!(steps[0].distance, expected, epsilon = 1e-9);
    }

    #[test]
    fn way_change_with_turn_emits_a_new_step() {
        let (g, names) = l_shaped();
        let steps = directions(&g, &names, &[1, 2, 3, 4]);

        assert_eq!(steps.len(), 2);
        assert_eq!(steps[0].turn, Turn::Start);
        assert_eq!(steps[0].way, "Main Street");
        // Heading flips from due east to due north: a left turn onto Oak.
        assert_eq!(steps[1].turn, Turn::Left);
        assert_eq!(steps[1].way, "Oak Street");
        assert_relative_eq!(
            steps[1].distance,
            g.vertex_distance(3, 4).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn unnamed_ways_use_the_placeholder() {
        let nodes = vec![node(1, 0.0, 0.0), node(2, 0.1, 0.0)];
        let ways = vec![way(10, None, &[1, 2])];
        let (g, names) = build_graph(nodes, ways).unwrap();

        let steps = directions(&g, &names, &[1, 2]);
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].way, UNKNOWN_ROAD);
        // The placeholder survives the textual round trip too.
        let parsed: NavigationStep = steps[0].to_string().parse().unwrap();
        assert_eq!(parsed.way, UNKNOWN_ROAD);
    }

    #[test]
    fn degenerate_route_yields_a_start_placeholder() {
        let (g, names) = l_shaped();
        let steps = directions(&g, &names, &[2]);
        assert_eq!(
            steps,
            vec![NavigationStep {
                turn: Turn::Start,
                way: UNKNOWN_ROAD.to_string(),
                distance: 0.0,
            }]
        );
    }
}
