//! Command-line configuration
//!
//! `Args` is what clap parses; `AppSettings` is what the app runs with.
//! The conversion is pure so it can be tested without a terminal.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::MEASUREMENTS_ENDPOINT;
use crate::geo::{Coordinate, MAX_ZOOM, MIN_ZOOM, OSM_TILE_URL, TileSource};
use crate::history::DEFAULT_HISTORY_SIZE;
use crate::location::{IP_LOOKUP_ENDPOINT, LocationProvider};
use crate::state::{DEFAULT_PRECISION, DEFAULT_ZOOM, MapSettings};

pub const APP_NAME: &str = "aqi-map";
pub const LOG_FILE_NAME: &str = "aqi-map.log";
pub const DEFAULT_REFRESH_SECS: u64 = 300;
pub const MAX_PRECISION: u32 = 10;
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// AQI Map - nearest PM2.5 reading on a terminal map
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "aqi-map")]
#[command(about = "Shows the nearest PM2.5 reading for your location; click the map to look elsewhere")]
pub struct Args {
    /// OpenAQ API key (sent as the `api_key` query parameter)
    #[arg(long, env = "OPENAQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Measurements endpoint
    #[arg(long, default_value = MEASUREMENTS_ENDPOINT)]
    pub endpoint: String,

    /// Start at this latitude instead of looking the location up
    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Start at this longitude instead of looking the location up
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Don't look up the location (behaves like a denied permission)
    #[arg(long, conflicts_with_all = ["lat", "lon"])]
    pub no_geolocation: bool,

    /// IP geolocation endpoint
    #[arg(long, default_value = IP_LOOKUP_ENDPOINT)]
    pub geolocation_endpoint: String,

    /// Initial map zoom level
    #[arg(long, short, default_value_t = DEFAULT_ZOOM)]
    pub zoom: u8,

    /// Decimal places kept for clicked coordinates (0-10)
    #[arg(
        long,
        default_value_t = DEFAULT_PRECISION,
        value_parser = clap::value_parser!(u32).range(0..=MAX_PRECISION as i64)
    )]
    pub precision: u32,

    /// Tile URL template with {s}, {z}, {x} and {y} placeholders
    #[arg(long, default_value = OSM_TILE_URL)]
    pub tile_url: String,

    /// Readings kept in the trend chart
    #[arg(long, default_value_t = DEFAULT_HISTORY_SIZE)]
    pub history_size: usize,

    /// Auto-refresh interval in seconds (0 disables)
    #[arg(long, short, default_value_t = DEFAULT_REFRESH_SECS)]
    pub refresh_interval: u64,

    /// Log file (default: <cache dir>/aqi-map/aqi-map.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug mode (F12 to toggle overlay)
    #[arg(long)]
    pub debug: bool,
}

/// AQI endpoint and credentials
#[derive(Clone, Debug, PartialEq)]
pub struct AqiSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppSettings {
    pub aqi: AqiSettings,
    pub location: LocationProvider,
    pub map: MapSettings,
    /// None = no auto-refresh
    pub refresh_interval: Option<Duration>,
    pub log_file: PathBuf,
    pub debug: bool,
}

impl From<Args> for AppSettings {
    fn from(args: Args) -> Self {
        let location = match (args.lat, args.lon) {
            (Some(lat), Some(lon)) => LocationProvider::Fixed(Coordinate::new(lat, lon)),
            _ if args.no_geolocation => LocationProvider::Disabled,
            _ => LocationProvider::IpLookup {
                endpoint: args.geolocation_endpoint,
            },
        };

        let tile_source = if args.tile_url == OSM_TILE_URL {
            TileSource::openstreetmap()
        } else {
            TileSource::with_template(args.tile_url)
        };

        Self {
            aqi: AqiSettings {
                endpoint: args.endpoint,
                api_key: args.api_key.filter(|key| !key.trim().is_empty()),
            },
            location,
            map: MapSettings {
                zoom: args.zoom.clamp(MIN_ZOOM, MAX_ZOOM),
                precision: args.precision,
                tile_source,
                history_size: args.history_size,
            },
            refresh_interval: (args.refresh_interval > 0)
                .then(|| Duration::from_secs(args.refresh_interval)),
            log_file: args.log_file.unwrap_or_else(default_log_file),
            debug: args.debug,
        }
    }
}

/// `<cache dir>/aqi-map/aqi-map.log`, or the working directory if there is none
pub fn default_log_file() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(LOG_FILE_NAME)
}
