//! Application state - single source of truth
//!
//! FRAMEWORK PATTERN: State is immutable from component perspective
//! - Components receive `&AppState` as props
//! - Only reducer can mutate state
//! - Readings reach the renderer only through `AppState::view()`

use tui_dispatch::debug::{DebugSection, DebugState};

use crate::geo::{self, Coordinate, MAX_ZOOM, MIN_ZOOM, TileSource, Viewport};
use crate::history::ReadingHistory;

pub const LOADING_ANIM_TICK_MS: u64 = 100;
pub const DEFAULT_ZOOM: u8 = 6;
pub const DEFAULT_PRECISION: u32 = 4;
pub const HOME_LABEL: &str = "Your Location";

/// One PM2.5 observation, as returned for the first search result
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reading {
    pub city: Option<String>,
    pub station: Option<String>,
    pub pm25: Option<f64>,
    pub unit: Option<String>,
    pub observed_at: Option<String>,
}

/// A reading together with the coordinate it was fetched for.
/// Always replaced as a whole.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub coordinate: Coordinate,
    pub reading: Reading,
}

/// Map configuration fixed at startup
#[derive(Clone, Debug, PartialEq)]
pub struct MapSettings {
    pub zoom: u8,
    /// Decimal places kept for clicked coordinates
    pub precision: u32,
    pub tile_source: TileSource,
    pub history_size: usize,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            precision: DEFAULT_PRECISION,
            tile_source: TileSource::default(),
            history_size: crate::history::DEFAULT_HISTORY_SIZE,
        }
    }
}

/// The map widget, created once the first reading arrives
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapState {
    pub center: Coordinate,
    pub zoom: u8,
    /// Where the "Your Location" marker sits
    pub marker: Coordinate,
}

impl MapState {
    pub fn centered(center: Coordinate, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            marker: center,
        }
    }

    pub fn viewport(&self, columns: u16, rows: u16) -> Viewport {
        Viewport::new(self.center, self.zoom, columns, rows)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_add(1))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom.saturating_sub(1))
    }

    fn set_zoom(&mut self, zoom: u8) -> bool {
        let zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        let changed = zoom != self.zoom;
        self.zoom = zoom;
        changed
    }

    /// Move the center by whole terminal cells (positive = east / south)
    pub fn pan(&mut self, columns: i32, rows: i32) {
        let dx = f64::from(columns) * geo::degrees_per_column(self.zoom);
        let dy = f64::from(rows) * geo::degrees_per_row(self.zoom, self.center.latitude);
        self.center = Coordinate::new(self.center.latitude - dy, self.center.longitude + dx)
            .normalized();
    }

    pub fn recenter(&mut self) -> bool {
        let changed = self.center != self.marker;
        self.center = self.marker;
        changed
    }
}

/// What the reading panel is allowed to show
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ReadingView<'a> {
    Loading,
    Ready(&'a Observation),
    NoData,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug)]
pub struct AppState {
    /// Located position of the user
    pub home: Option<Coordinate>,

    /// Last successful reading (None = never fetched)
    pub current: Option<Observation>,

    /// A location lookup or reading fetch is in flight
    pub is_loading: bool,

    /// Last lookup or fetch failed
    pub error: bool,

    /// Map widget (None until the first reading)
    pub map: Option<MapState>,

    /// Sequence number of the latest issued reading fetch
    pub request_seq: u64,

    pub history: ReadingHistory,
    pub show_history: bool,

    pub settings: MapSettings,

    /// Animation frame counter (for loading spinner)
    pub tick_count: u32,

    pub terminal_size: (u16, u16),
}

impl AppState {
    pub fn new(settings: MapSettings) -> Self {
        Self {
            home: None,
            current: None,
            is_loading: true,
            error: false,
            map: None,
            request_seq: 0,
            history: ReadingHistory::new(settings.history_size),
            show_history: false,
            settings,
            tick_count: 0,
            terminal_size: (80, 24),
        }
    }

    /// The only way a reading reaches the renderer: an error hides it.
    pub fn view(&self) -> ReadingView<'_> {
        if self.error {
            return ReadingView::NoData;
        }
        match &self.current {
            Some(observation) => ReadingView::Ready(observation),
            None if self.is_loading => ReadingView::Loading,
            None => ReadingView::NoData,
        }
    }

    /// Coordinate shown alongside the reading
    pub fn displayed_coordinate(&self) -> Option<Coordinate> {
        self.current.as_ref().map(|o| o.coordinate)
    }

    /// Coordinate a manual refresh should fetch for
    pub fn refresh_target(&self) -> Option<Coordinate> {
        self.displayed_coordinate().or(self.home)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(MapSettings::default())
    }
}

fn coordinate_entry(coordinate: Option<Coordinate>) -> String {
    coordinate.map_or_else(|| "(none)".to_string(), |c| c.to_string())
}

impl DebugState for AppState {
    fn debug_sections(&self) -> Vec<DebugSection> {
        let reading = self.current.as_ref().map(|o| &o.reading);
        vec![
            DebugSection::new("Fetch")
                .entry("loading", self.is_loading.to_string())
                .entry("error", self.error.to_string())
                .entry("request_seq", self.request_seq.to_string()),
            DebugSection::new("Reading")
                .entry("home", coordinate_entry(self.home))
                .entry("coordinate", coordinate_entry(self.displayed_coordinate()))
                .entry(
                    "city",
                    reading.and_then(|r| r.city.clone()).unwrap_or_default(),
                )
                .entry(
                    "station",
                    reading.and_then(|r| r.station.clone()).unwrap_or_default(),
                )
                .entry(
                    "pm25",
                    reading
                        .and_then(|r| r.pm25)
                        .map(|v| v.to_string())
                        .unwrap_or_default(),
                ),
            DebugSection::new("Map")
                .entry(
                    "center",
                    coordinate_entry(self.map.map(|m| m.center)),
                )
                .entry(
                    "zoom",
                    self.map
                        .map_or(self.settings.zoom, |m| m.zoom)
                        .to_string(),
                )
                .entry("history_points", self.history.len().to_string()),
        ]
    }
}
