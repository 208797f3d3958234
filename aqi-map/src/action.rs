//! Actions
//!
//! FRAMEWORK PATTERN: Action naming convention
//! - Prefix determines category: ReadingFetch, ReadingDidLoad -> "reading" category
//! - "Did" prefix indicates async result
//! - Verbs at end: Fetch, Resolve, Load, Toggle, Quit

use crate::geo::Coordinate;
use crate::state::Reading;
use tui_dispatch::ActionSummary;

/// Application actions with automatic category inference
///
/// # Categories (auto-inferred from naming):
/// - `location`: LocationFetch, LocationDidResolve, LocationDidError
/// - `reading`: ReadingFetch, ReadingRefresh, ReadingAutoRefresh, ReadingDidLoad, ReadingDidError
/// - `map`: MapZoomIn, MapZoomOut, MapPan, MapRecenter
/// - `ui`: UiToggleHistory, UiTerminalResize
/// - `uncategorized`: Tick, Quit
#[derive(tui_dispatch::Action, Clone, Debug, PartialEq)]
#[action(infer_categories)]
pub enum Action {
    // ===== Location category =====
    /// Intent: look up where the user is (triggers async task)
    LocationFetch,

    /// Result: position known
    LocationDidResolve(Coordinate),

    /// Result: position lookup failed
    LocationDidError(String),

    // ===== Reading category =====
    /// Intent: fetch the reading for a coordinate (map click)
    ReadingFetch(Coordinate),

    /// Intent: fetch again for whatever is on screen (manual)
    ReadingRefresh,

    /// Intent: periodic re-fetch of the displayed coordinate
    ReadingAutoRefresh,

    /// Result: reading loaded for request `seq`
    ReadingDidLoad {
        seq: u64,
        coordinate: Coordinate,
        reading: Reading,
    },

    /// Result: reading fetch `seq` failed
    ReadingDidError { seq: u64, error: String },

    // ===== Map category =====
    MapZoomIn,
    MapZoomOut,

    /// Pan by (columns, rows)
    MapPan(i32, i32),

    /// Jump back to the "Your Location" marker
    MapRecenter,

    // ===== UI category =====
    UiToggleHistory,

    UiTerminalResize(u16, u16),

    // ===== Uncategorized (global) =====
    /// Periodic tick for loading animation
    Tick,

    /// Exit the application
    Quit,
}

/// Concise summaries for the debug action log
impl ActionSummary for Action {
    fn summary(&self) -> String {
        match self {
            Action::ReadingDidLoad {
                seq,
                coordinate,
                reading,
            } => {
                let pm25 = reading
                    .pm25
                    .map_or_else(|| "-".to_string(), |v| format!("{v:.1}"));
                format!("ReadingDidLoad {{ seq: {seq}, at: {coordinate}, pm25: {pm25} }}")
            }
            Action::ReadingDidError { seq, error } => {
                let msg = if error.len() > 40 {
                    format!("{}...", &error.chars().take(37).collect::<String>())
                } else {
                    error.clone()
                };
                format!("ReadingDidError {{ seq: {seq}, {msg:?} }}")
            }
            _ => format!("{:?}", self),
        }
    }
}
