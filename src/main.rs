use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

use tilepath::ingest::{self, NodeRecord, WayRecord};

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error("line {0}: malformed record: {1:?}")]
    Malformed(usize, String),

    #[error(transparent)]
    Graph(#[from] tilepath::GraphError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Parser)]
struct Cli {
    /// Path to a node/way record dump, one record per line:
    /// `node <id> <lon> <lat> [name]` or `way <id> <id,id,...> [name]`
    dataset: PathBuf,

    /// Longitude of the start point
    start_lon: f64,

    /// Latitude of the start point
    start_lat: f64,

    /// Longitude of the destination point
    end_lon: f64,

    /// Latitude of the destination point
    end_lat: f64,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let (nodes, ways) = load_records(&cli.dataset)?;
    let (g, way_names) = ingest::build_graph(nodes, ways).map_err(LoadError::Graph)?;

    let route = tilepath::shortest_path(&g, cli.start_lon, cli.start_lat, cli.end_lon, cli.end_lat)?;

    for step in tilepath::narrate::directions(&g, &way_names, &route) {
        log::info!("{}", step);
    }

    println!("{{");
    println!("  \"type\": \"FeatureCollection\",");
    println!("  \"features\": [");
    println!("    {{");
    println!("      \"type\": \"Feature\",");
    println!("      \"properties\": {{}},");

    println!("      \"geometry\": {{");
    println!("        \"type\": \"LineString\",");
    println!("        \"coordinates\": [");

    let mut vertices = route
        .iter()
        .map(|&id| g.vertex(id).expect("route vertex must exist"))
        .peekable();
    while let Some(v) = vertices.next() {
        let suffix = if vertices.peek().is_some() { "," } else { "" };
        println!("          [{}, {}]{}", v.lon, v.lat, suffix);
    }

    println!("        ]");
    println!("      }}");
    println!("    }}");
    println!("  ]");
    println!("}}");

    Ok(())
}

fn load_records<P: AsRef<Path>>(path: P) -> Result<(Vec<NodeRecord>, Vec<WayRecord>), LoadError> {
    let mut nodes = Vec::new();
    let mut ways = Vec::new();

    for (index, line) in fs::read_to_string(path)?.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let malformed = || LoadError::Malformed(index + 1, line.to_string());
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[0] {
            "node" if fields.len() >= 4 => {
                nodes.push(NodeRecord {
                    id: fields[1].parse().map_err(|_| malformed())?,
                    lon: fields[2].parse().map_err(|_| malformed())?,
                    lat: fields[3].parse().map_err(|_| malformed())?,
                    name: join_name(&fields[4..]),
                });
            }
            "way" if fields.len() >= 3 => {
                let node_ids = fields[2]
                    .split(',')
                    .map(|id| id.parse().map_err(|_| malformed()))
                    .collect::<Result<Vec<i64>, _>>()?;
                ways.push(WayRecord {
                    id: fields[1].parse().map_err(|_| malformed())?,
                    name: join_name(&fields[3..]),
                    max_speed: None,
                    nodes: node_ids,
                });
            }
            _ => return Err(malformed()),
        }
    }

    Ok((nodes, ways))
}

fn join_name(fields: &[&str]) -> Option<String> {
    if fields.is_empty() {
        None
    } else {
        Some(fields.join(" "))
    }
}
