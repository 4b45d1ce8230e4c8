// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Selects the grid of pre-rendered tiles covering a bounding box.
//!
//! Tiles are named `d<depth>_x<col>_y<row>.png`. Depth 0 covers the whole
//! dataset [Extent] with a single tile; every further depth doubles the grid
//! dimension in both axes, up to [MAX_DEPTH]. A query asks for the coarsest
//! depth whose longitudinal distance per pixel (LonDPP) still meets the
//! requested pixel density.

/// Side length of every tile image, in pixels.
pub const TILE_SIZE: u32 = 256;

/// Deepest available resolution level.
pub const MAX_DEPTH: u32 = 7;

/// Geographic bounds covered by the tile dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Westernmost (minimum) longitude.
    pub west: f64,
    /// Easternmost (maximum) longitude.
    pub east: f64,
    /// Northernmost (maximum) latitude.
    pub north: f64,
    /// Southernmost (minimum) latitude.
    pub south: f64,
}

impl Extent {
    fn lon_width(&self) -> f64 {
        self.east - self.west
    }

    fn lat_height(&self) -> f64 {
        self.north - self.south
    }
}

/// A tile-selection query: the requested bounding box plus the width of the
/// viewport it will be drawn into, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterQuery {
    /// Upper-left (west) longitude of the query box.
    pub ullon: f64,
    /// Upper-left (north) latitude of the query box.
    pub ullat: f64,
    /// Lower-right (east) longitude of the query box.
    pub lrlon: f64,
    /// Lower-right (south) latitude of the query box.
    pub lrlat: f64,
    /// Viewport width in pixels.
    pub width: f64,
}

/// The tile grid answering a [RasterQuery].
///
/// `grid` is row-major, north-to-south then west-to-east, so that the rows
/// can be stitched top-down into one image. The `ul_*`/`lr_*` fields give
/// the geographic bounds actually covered by the selected tiles, which
/// contain (and usually exceed) the query box.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterResult {
    pub grid: Vec<Vec<String>>,
    pub ul_lon: f64,
    pub ul_lat: f64,
    pub lr_lon: f64,
    pub lr_lat: f64,
    pub depth: u32,
    /// False for inverted query boxes and boxes entirely outside the
    /// dataset extent; the rest of the result is unspecified then.
    pub success: bool,
}

impl RasterResult {
    fn failure() -> Self {
        Self {
            grid: Vec::new(),
            ul_lon: 0.0,
            ul_lat: 0.0,
            lr_lon: 0.0,
            lr_lat: 0.0,
            depth: 0,
            success: false,
        }
    }
}

/// Finds the grid of tiles that best matches a query: the coarsest depth
/// whose tiles still have a LonDPP less than or equal to the query's, and
/// every tile of that depth intersecting the query box (indices clamped to
/// the grid, so boxes partially outside the extent still succeed).
pub fn raster(extent: &Extent, query: &RasterQuery) -> RasterResult {
    if !query_is_valid(extent, query) {
        return RasterResult::failure();
    }

    let depth = select_depth(extent, query);
    let tiles_per_axis = 1u32 << depth;
    let last = (tiles_per_axis - 1) as f64;
    let tile_width = extent.lon_width() / tiles_per_axis as f64;
    let tile_height = extent.lat_height() / tiles_per_axis as f64;

    // Tile indices grow eastwards (x) and southwards (y).
    let clamp = |v: f64| v.clamp(0.0, last) as u32;
    let start_x = clamp(((query.ullon - extent.west) / tile_width).floor());
    let start_y = clamp(((extent.north - query.ullat) / tile_height).floor());
    let end_x = clamp(last - ((extent.east - query.lrlon) / tile_width).floor());
    let end_y = clamp(last - ((query.lrlat - extent.south) / tile_height).floor());

    let grid = (start_y..=end_y)
        .map(|y| {
            (start_x..=end_x)
                .map(|x| format!("d{}_x{}_y{}.png", depth, x, y))
                .collect()
        })
        .collect();

    RasterResult {
        grid,
        ul_lon: extent.west + tile_width * start_x as f64,
        ul_lat: extent.north - tile_height * start_y as f64,
        lr_lon: extent.west + tile_width * (end_x + 1) as f64,
        lr_lat: extent.north - tile_height * (end_y + 1) as f64,
        depth,
        success: true,
    }
}

fn query_is_valid(extent: &Extent, query: &RasterQuery) -> bool {
    // Inverted boxes are nonsensical.
    if query.ullon >= query.lrlon || query.ullat <= query.lrlat {
        return false;
    }
    // Boxes entirely outside the dataset cannot be served.
    query.ullon < extent.east
        && query.lrlon > extent.west
        && query.ullat > extent.south
        && query.lrlat < extent.north
}

/// Picks the smallest depth whose tile LonDPP does not exceed the query's,
/// capped at [MAX_DEPTH] when even the finest tiles are too coarse.
fn select_depth(extent: &Extent, query: &RasterQuery) -> u32 {
    let query_lon_dpp = (query.lrlon - query.ullon) / query.width;
    for depth in 0..=MAX_DEPTH {
        let tile_lon_dpp = extent.lon_width() / (1u32 << depth) as f64 / TILE_SIZE as f64;
        if tile_lon_dpp <= query_lon_dpp {
            return depth;
        }
    }
    MAX_DEPTH
}
