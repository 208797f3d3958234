//! Reducer - (state, action) -> (changed, effects)
//!
//! FRAMEWORK PATTERN: Effect reducer
//! - fn(state: &mut S, action: A) -> DispatchResult<E>
//! - All state mutations happen here
//! - Async work is requested as effects, never performed here
//!
//! Every reading fetch takes a new sequence number. A result whose number is
//! not the latest one issued is dropped, so the last request wins rather than
//! the last response.

use tui_dispatch::DispatchResult;

use crate::action::Action;
use crate::effect::Effect;
use crate::geo::Coordinate;
use crate::state::{AppState, MapState, Observation, ReadingView};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Location actions =====
        Action::LocationFetch => {
            state.is_loading = true;
            state.error = false;
            DispatchResult::changed_with(Effect::Locate)
        }

        Action::LocationDidResolve(coordinate) => {
            state.home = Some(coordinate);
            fetch_reading(state, coordinate)
        }

        Action::LocationDidError(_) => {
            state.is_loading = false;
            state.error = true;
            DispatchResult::changed()
        }

        // ===== Reading actions =====
        Action::ReadingFetch(coordinate) => fetch_reading(state, coordinate),

        Action::ReadingRefresh => match state.refresh_target() {
            Some(coordinate) => fetch_reading(state, coordinate),
            None => reducer(state, Action::LocationFetch),
        },

        // Never replaces "No Data Found" with an older reading
        Action::ReadingAutoRefresh => match state.view() {
            ReadingView::Ready(observation) => {
                let coordinate = observation.coordinate;
                fetch_reading(state, coordinate)
            }
            _ => DispatchResult::unchanged(),
        },

        Action::ReadingDidLoad {
            seq,
            coordinate,
            reading,
        } => {
            if seq != state.request_seq {
                tracing::debug!(seq, latest = state.request_seq, "dropping stale reading");
                return DispatchResult::unchanged();
            }

            state.history.record(coordinate, &reading);
            state.current = Some(Observation {
                coordinate,
                reading,
            });
            state.error = false;
            state.is_loading = false;

            if state.map.is_none() {
                let mut map = MapState::centered(coordinate, state.settings.zoom);
                map.marker = state.home.unwrap_or(coordinate);
                state.map = Some(map);
            }
            DispatchResult::changed()
        }

        Action::ReadingDidError { seq, .. } => {
            if seq != state.request_seq {
                tracing::debug!(seq, latest = state.request_seq, "dropping stale error");
                return DispatchResult::unchanged();
            }
            state.error = true;
            state.is_loading = false;
            DispatchResult::changed()
        }

        // ===== Map actions =====
        Action::MapZoomIn => map_changed(state, |map| map.zoom_in()),

        Action::MapZoomOut => map_changed(state, |map| map.zoom_out()),

        Action::MapPan(columns, rows) => map_changed(state, |map| {
            map.pan(columns, rows);
            columns != 0 || rows != 0
        }),

        Action::MapRecenter => map_changed(state, |map| map.recenter()),

        // ===== UI actions =====
        Action::UiToggleHistory => {
            state.show_history = !state.show_history;
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size != (width, height) {
                state.terminal_size = (width, height);
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        // ===== Global actions =====
        Action::Tick => {
            state.tick_count = state.tick_count.wrapping_add(1);
            // only re-render if loading (for spinner animation)
            if state.is_loading {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }

        Action::Quit => {
            // Quit is handled in main loop, not here
            DispatchResult::unchanged()
        }
    }
}

fn fetch_reading(state: &mut AppState, coordinate: Coordinate) -> DispatchResult<Effect> {
    state.request_seq += 1;
    state.is_loading = true;
    DispatchResult::changed_with(Effect::FetchReading {
        seq: state.request_seq,
        coordinate,
    })
}

fn map_changed(
    state: &mut AppState,
    update: impl FnOnce(&mut MapState) -> bool,
) -> DispatchResult<Effect> {
    match state.map.as_mut() {
        Some(map) => {
            if update(map) {
                DispatchResult::changed()
            } else {
                DispatchResult::unchanged()
            }
        }
        None => DispatchResult::unchanged(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Reading;

    fn springfield() -> Reading {
        Reading {
            city: Some("Springfield".into()),
            station: Some("Station A".into()),
            pm25: Some(12.3),
            ..Default::default()
        }
    }

    fn loaded(seq: u64, coordinate: Coordinate) -> Action {
        Action::ReadingDidLoad {
            seq,
            coordinate,
            reading: springfield(),
        }
    }

    #[test]
    fn test_location_fetch_requests_locate() {
        let mut state = AppState::default();
        state.error = true;

        let result = reducer(&mut state, Action::LocationFetch);

        assert!(result.changed);
        assert_eq!(result.effects, vec![Effect::Locate]);
        assert!(state.is_loading);
        assert!(!state.error);
    }

    #[test]
    fn test_location_resolve_fetches_reading_once() {
        let mut state = AppState::default();
        let here = Coordinate::new(37.0, -122.0);

        let result = reducer(&mut state, Action::LocationDidResolve(here));

        assert_eq!(
            result.effects,
            vec![Effect::FetchReading {
                seq: 1,
                coordinate: here
            }]
        );
        assert_eq!(state.home, Some(here));
        assert!(state.map.is_none());
        assert!(state.is_loading);
    }

    #[test]
    fn test_location_error_clears_loading() {
        let mut state = AppState::default();

        let result = reducer(&mut state, Action::LocationDidError("denied".into()));

        assert!(result.changed);
        assert!(result.effects.is_empty());
        assert!(!state.is_loading);
        assert!(state.error);
    }

    #[test]
    fn test_reading_load_populates_and_creates_map() {
        let mut state = AppState::default();
        let here = Coordinate::new(37.0, -122.0);
        reducer(&mut state, Action::LocationDidResolve(here));

        let result = reducer(&mut state, loaded(1, here));

        assert!(result.changed);
        assert!(!state.is_loading);
        assert!(!state.error);
        let map = state.map.expect("map created");
        assert_eq!(map.center, here);
        assert_eq!(map.marker, here);
        assert_eq!(map.zoom, state.settings.zoom);
        assert!(matches!(state.view(), ReadingView::Ready(o) if o.reading == springfield()));
    }

    #[test]
    fn test_map_created_only_once() {
        let mut state = AppState::default();
        let home = Coordinate::new(10.0, 10.0);
        let clicked = Coordinate::new(20.0, 20.0);

        reducer(&mut state, Action::LocationDidResolve(home));
        reducer(&mut state, loaded(1, home));
        reducer(&mut state, Action::ReadingFetch(clicked));
        reducer(&mut state, loaded(2, clicked));

        let map = state.map.unwrap();
        assert_eq!(map.center, home);
        assert_eq!(map.marker, home);
        assert_eq!(state.displayed_coordinate(), Some(clicked));
    }

    #[test]
    fn test_click_sets_loading_and_new_seq() {
        let mut state = AppState::default();
        state.is_loading = false;
        state.request_seq = 3;

        let clicked = Coordinate::new(20.0, 20.0);
        let result = reducer(&mut state, Action::ReadingFetch(clicked));

        assert!(state.is_loading);
        assert_eq!(
            result.effects,
            vec![Effect::FetchReading {
                seq: 4,
                coordinate: clicked
            }]
        );
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut state = AppState::default();
        let first = Coordinate::new(1.0, 1.0);
        let second = Coordinate::new(2.0, 2.0);

        reducer(&mut state, Action::ReadingFetch(first));
        reducer(&mut state, Action::ReadingFetch(second));

        // Second response arrives first
        reducer(&mut state, loaded(2, second));
        let result = reducer(&mut state, loaded(1, first));

        assert!(!result.changed);
        assert_eq!(state.displayed_coordinate(), Some(second));

        let result = reducer(
            &mut state,
            Action::ReadingDidError {
                seq: 1,
                error: "late".into(),
            },
        );
        assert!(!result.changed);
        assert!(!state.error);
    }

    #[test]
    fn test_older_fetch_keeps_loading_until_latest_resolves() {
        let mut state = AppState::default();
        reducer(&mut state, Action::ReadingFetch(Coordinate::new(1.0, 1.0)));
        reducer(&mut state, Action::ReadingFetch(Coordinate::new(2.0, 2.0)));

        reducer(&mut state, loaded(1, Coordinate::new(1.0, 1.0)));
        assert!(state.is_loading);

        reducer(&mut state, loaded(2, Coordinate::new(2.0, 2.0)));
        assert!(!state.is_loading);
    }

    #[test]
    fn test_reading_error_hides_reading() {
        let mut state = AppState::default();
        let here = Coordinate::new(1.0, 1.0);
        reducer(&mut state, Action::ReadingFetch(here));
        reducer(&mut state, loaded(1, here));

        reducer(&mut state, Action::ReadingFetch(Coordinate::new(5.0, 5.0)));
        reducer(
            &mut state,
            Action::ReadingDidError {
                seq: 2,
                error: "no data".into(),
            },
        );

        assert!(state.error);
        assert!(!state.is_loading);
        assert_eq!(state.view(), ReadingView::NoData);
        // The old reading is kept but not shown
        assert_eq!(state.displayed_coordinate(), Some(here));
    }

    #[test]
    fn test_error_then_click_recovers() {
        let mut state = AppState::default();
        reducer(&mut state, Action::ReadingFetch(Coordinate::new(1.0, 1.0)));
        reducer(
            &mut state,
            Action::ReadingDidError {
                seq: 1,
                error: "boom".into(),
            },
        );
        assert!(state.error);

        let there = Coordinate::new(3.0, 3.0);
        reducer(&mut state, Action::ReadingFetch(there));
        reducer(&mut state, loaded(2, there));

        assert!(!state.error);
        assert!(matches!(state.view(), ReadingView::Ready(_)));
    }

    #[test]
    fn test_refresh_without_position_restarts_location() {
        let mut state = AppState::default();
        state.is_loading = false;

        let result = reducer(&mut state, Action::ReadingRefresh);
        assert_eq!(result.effects, vec![Effect::Locate]);
    }

    #[test]
    fn test_refresh_uses_home_when_nothing_displayed() {
        let mut state = AppState::default();
        let home = Coordinate::new(1.0, 1.0);
        reducer(&mut state, Action::LocationDidResolve(home));
        reducer(
            &mut state,
            Action::ReadingDidError {
                seq: 1,
                error: "no data".into(),
            },
        );

        let result = reducer(&mut state, Action::ReadingRefresh);
        assert_eq!(
            result.effects,
            vec![Effect::FetchReading {
                seq: 2,
                coordinate: home
            }]
        );
    }

    #[test]
    fn test_auto_refresh_needs_displayed_reading() {
        let mut state = AppState::default();
        let result = reducer(&mut state, Action::ReadingAutoRefresh);
        assert!(!result.changed);
        assert!(!result.has_effects());

        let here = Coordinate::new(1.0, 1.0);
        reducer(&mut state, Action::ReadingFetch(here));
        reducer(&mut state, loaded(1, here));

        let result = reducer(&mut state, Action::ReadingAutoRefresh);
        assert_eq!(
            result.effects,
            vec![Effect::FetchReading {
                seq: 2,
                coordinate: here
            }]
        );
    }

    #[test]
    fn test_auto_refresh_skips_failed_click() {
        let mut state = AppState::default();
        let first = Coordinate::new(10.0, 10.0);
        let clicked = Coordinate::new(20.0, 20.0);
        reducer(&mut state, Action::ReadingFetch(first));
        reducer(&mut state, loaded(1, first));
        reducer(&mut state, Action::ReadingFetch(clicked));
        reducer(
            &mut state,
            Action::ReadingDidError {
                seq: 2,
                error: "no data".into(),
            },
        );

        let result = reducer(&mut state, Action::ReadingAutoRefresh);
        assert!(!result.changed);
        assert!(!result.has_effects());
        assert!(state.error);
        assert_eq!(state.request_seq, 2);
    }

    #[test]
    fn test_map_zoom_at_limit_is_unchanged() {
        let mut state = AppState::default();
        let here = Coordinate::new(1.0, 1.0);
        reducer(&mut state, Action::ReadingFetch(here));
        reducer(&mut state, loaded(1, here));
        state.map = Some(MapState::centered(here, crate::geo::MAX_ZOOM));

        assert!(!reducer(&mut state, Action::MapZoomIn).changed);
        assert!(reducer(&mut state, Action::MapZoomOut).changed);
    }

    #[test]
    fn test_repeat_loads_build_history() {
        let mut state = AppState::default();
        let here = Coordinate::new(1.0, 1.0);

        for seq in 1..=3 {
            reducer(&mut state, Action::ReadingFetch(here));
            reducer(&mut state, loaded(seq, here));
        }

        assert_eq!(state.history.len(), 3);
    }

    #[test]
    fn test_map_actions_without_map_are_noops() {
        let mut state = AppState::default();
        assert!(!reducer(&mut state, Action::MapZoomIn).changed);
        assert!(!reducer(&mut state, Action::MapPan(1, 0)).changed);
        assert!(!reducer(&mut state, Action::MapRecenter).changed);
    }

    #[test]
    fn test_map_zoom_and_pan() {
        let mut state = AppState::default();
        let here = Coordinate::new(1.0, 1.0);
        reducer(&mut state, Action::ReadingFetch(here));
        reducer(&mut state, loaded(1, here));

        assert!(reducer(&mut state, Action::MapZoomIn).changed);
        assert_eq!(state.map.unwrap().zoom, state.settings.zoom + 1);

        assert!(reducer(&mut state, Action::MapPan(8, 0)).changed);
        assert_ne!(state.map.unwrap().center, here);

        assert!(reducer(&mut state, Action::MapRecenter).changed);
        assert_eq!(state.map.unwrap().center, here);
    }

    #[test]
    fn test_toggle_history() {
        let mut state = AppState::default();
        reducer(&mut state, Action::UiToggleHistory);
        assert!(state.show_history);
        reducer(&mut state, Action::UiToggleHistory);
        assert!(!state.show_history);
    }

    #[test]
    fn test_terminal_resize() {
        let mut state = AppState::default();
        assert!(reducer(&mut state, Action::UiTerminalResize(100, 40)).changed);
        assert!(!reducer(&mut state, Action::UiTerminalResize(100, 40)).changed);
    }

    #[test]
    fn test_tick_only_rerenders_when_loading() {
        let mut state = AppState::default();
        assert!(reducer(&mut state, Action::Tick).changed);

        state.is_loading = false;
        assert!(!reducer(&mut state, Action::Tick).changed);
    }
}
