//! Coordinates, slippy-map tile addressing and the terminal map viewport
//!
//! The map is laid out the way a web tile map is: a world that is
//! `256 * 2^zoom` pixels wide, cut into `{z}/{x}/{y}` tiles. A terminal cell is
//! treated as an 8x16 pixel block, which is what makes a zoom level look
//! roughly the same in a terminal as it does in a browser.

use std::f64::consts::PI;
use std::fmt;

/// Largest latitude representable in Web Mercator
pub const MAX_LATITUDE: f64 = 85.051_128_78;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 18;

pub const OSM_TILE_URL: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";

const TILE_SIZE_PX: f64 = 256.0;
const CELL_WIDTH_PX: f64 = 8.0;
const CELL_HEIGHT_PX: f64 = 16.0;
const TILE_SUBDOMAINS: [&str; 3] = ["a", "b", "c"];

/// A latitude/longitude pair in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Round both axes to `precision` decimal places
    pub fn rounded(self, precision: u32) -> Self {
        let factor = 10f64.powi(precision as i32);
        Self {
            latitude: (self.latitude * factor).round() / factor,
            longitude: (self.longitude * factor).round() / factor,
        }
    }

    /// Clamp latitude to the Mercator range and wrap longitude into [-180, 180)
    pub fn normalized(self) -> Self {
        Self {
            latitude: self.latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE),
            longitude: (self.longitude + 180.0).rem_euclid(360.0) - 180.0,
        }
    }

    /// `lat,lon` as the measurements API expects it
    pub fn to_query(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.latitude >= 0.0 { 'N' } else { 'S' };
        let ew = if self.longitude >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{}, {:.4}°{}",
            self.latitude.abs(),
            ns,
            self.longitude.abs(),
            ew
        )
    }
}

/// Address of one map tile
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileId {
    /// The tile that contains `coordinate` at `zoom`
    pub fn containing(coordinate: Coordinate, zoom: u8) -> Self {
        let n = tiles_per_axis(zoom);
        let c = coordinate.normalized();
        let x = tile_x(c.longitude, zoom).floor().clamp(0.0, n - 1.0);
        let y = tile_y(c.latitude, zoom).floor().clamp(0.0, n - 1.0);
        Self {
            z: zoom,
            x: x as u32,
            y: y as u32,
        }
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// A raster tile server addressed by a `{s}`/`{z}`/`{x}`/`{y}` URL template
#[derive(Clone, Debug, PartialEq)]
pub struct TileSource {
    pub url_template: String,
    pub attribution: String,
}

impl TileSource {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: OSM_TILE_URL.into(),
            attribution: OSM_ATTRIBUTION.into(),
        }
    }

    pub fn with_template(url_template: impl Into<String>) -> Self {
        Self {
            url_template: url_template.into(),
            ..Self::openstreetmap()
        }
    }

    /// Fill in the template for one tile, rotating subdomains like Leaflet does
    pub fn tile_url(&self, tile: TileId) -> String {
        let subdomain = TILE_SUBDOMAINS[((tile.x + tile.y) % TILE_SUBDOMAINS.len() as u32) as usize];
        self.url_template
            .replace("{s}", subdomain)
            .replace("{z}", &tile.z.to_string())
            .replace("{x}", &tile.x.to_string())
            .replace("{y}", &tile.y.to_string())
    }
}

impl Default for TileSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

/// Degrees of longitude covered by one terminal column at `zoom`
pub fn degrees_per_column(zoom: u8) -> f64 {
    360.0 * CELL_WIDTH_PX / (TILE_SIZE_PX * tiles_per_axis(zoom))
}

/// Degrees of latitude covered by one terminal row at `zoom` near `latitude`
pub fn degrees_per_row(zoom: u8, latitude: f64) -> f64 {
    let stretch = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().cos();
    degrees_per_column(zoom) * (CELL_HEIGHT_PX / CELL_WIDTH_PX) * stretch
}

/// The geographic window shown by a map canvas of `columns` x `rows` cells
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
    pub columns: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(center: Coordinate, zoom: u8, columns: u16, rows: u16) -> Self {
        Self {
            center,
            zoom,
            columns,
            rows,
        }
    }

    pub fn x_bounds(&self) -> [f64; 2] {
        let half = f64::from(self.columns) / 2.0 * degrees_per_column(self.zoom);
        [self.center.longitude - half, self.center.longitude + half]
    }

    pub fn y_bounds(&self) -> [f64; 2] {
        let half = f64::from(self.rows) / 2.0 * degrees_per_row(self.zoom, self.center.latitude);
        [self.center.latitude - half, self.center.latitude + half]
    }

    /// Coordinate under the middle of the cell at (`column`, `row`),
    /// both relative to the top-left of the canvas
    pub fn coordinate_at(&self, column: u16, row: u16) -> Coordinate {
        let [west, _] = self.x_bounds();
        let [_, north] = self.y_bounds();
        Coordinate::new(
            north - (f64::from(row) + 0.5) * degrees_per_row(self.zoom, self.center.latitude),
            west + (f64::from(column) + 0.5) * degrees_per_column(self.zoom),
        )
        .normalized()
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();
        (west..=east).contains(&coordinate.longitude) && (south..=north).contains(&coordinate.latitude)
    }

    /// Tile boundaries crossing the viewport: (longitudes, latitudes)
    pub fn tile_grid(&self) -> (Vec<f64>, Vec<f64>) {
        let n = tiles_per_axis(self.zoom);
        let [west, east] = self.x_bounds();
        let [south, north] = self.y_bounds();

        let first_x = tile_x(west, self.zoom).ceil() as i64;
        let last_x = tile_x(east, self.zoom).floor() as i64;
        let longitudes = (first_x..=last_x)
            .map(|x| x as f64 / n * 360.0 - 180.0)
            .collect();

        // Tile rows count down from the north edge.
        let first_y = tile_y(north.min(MAX_LATITUDE), self.zoom).ceil().max(0.0) as i64;
        let last_y = tile_y(south.max(-MAX_LATITUDE), self.zoom).floor().min(n) as i64;
        let latitudes = (first_y..=last_y)
            .map(|y| tile_latitude(y as f64, self.zoom))
            .collect();

        (longitudes, latitudes)
    }
}

fn tiles_per_axis(zoom: u8) -> f64 {
    2f64.powi(i32::from(zoom))
}

/// Fractional tile column for a longitude (not wrapped)
fn tile_x(longitude: f64, zoom: u8) -> f64 {
    (longitude + 180.0) / 360.0 * tiles_per_axis(zoom)
}

/// Fractional tile row for a latitude
fn tile_y(latitude: f64, zoom: u8) -> f64 {
    let lat = latitude.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * tiles_per_axis(zoom)
}

/// Latitude of the north edge of tile row `y`
fn tile_latitude(y: f64, zoom: u8) -> f64 {
    (PI * (1.0 - 2.0 * y / tiles_per_axis(zoom)))
        .sinh()
        .atan()
        .to_degrees()
}
