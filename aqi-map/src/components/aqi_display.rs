//! Root display: map, reading panel, optional trend chart
//!
//! FRAMEWORK PATTERN: Component Trait
//! - Props<'a>: Read-only data for rendering (borrowed from state)
//! - handle_event: Receives EventKind, returns `Vec<Action>`
//! - Mouse and scroll events are routed to the map
//! - Focus handled via props, not event context

use crossterm::event::KeyCode;
use ratatui::prelude::{Frame, Rect};
use ratatui::{
    layout::{Alignment, Constraint, Layout},
    style::{Color, Style, Stylize},
    widgets::{Block, Borders},
};
use tui_dispatch::EventKind;

use super::{
    Component, HelpBar, HelpBarProps, HistoryChart, HistoryChartProps, MapView, MapViewProps,
    ReadingPanel, ReadingPanelProps,
};
use crate::action::Action;
use crate::state::AppState;

pub const LOCATION_ICON: &str = "📍 ";
pub const ERROR_ICON: &str = "⚠️";
pub const SPINNERS: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Cells moved per arrow key press
pub const PAN_COLUMNS: i32 = 8;
pub const PAN_ROWS: i32 = 4;

pub struct AqiDisplayProps<'a> {
    pub state: &'a AppState,
    pub is_focused: bool,
}

#[derive(Default)]
pub struct AqiDisplay {
    map: MapView,
}

impl AqiDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for AqiDisplay {
    type Props<'a> = AqiDisplayProps<'a>;

    fn handle_event(&mut self, event: &EventKind, props: AqiDisplayProps<'_>) -> Vec<Action> {
        if !props.is_focused {
            return vec![];
        }
        let state = props.state;

        if let EventKind::Key(key) = event {
            return match key.code {
                KeyCode::Char('r') | KeyCode::F(5) => vec![Action::ReadingRefresh],
                KeyCode::Char('q') | KeyCode::Esc => vec![Action::Quit],
                _ if state.map.is_none() => vec![],
                KeyCode::Char('h') => vec![Action::UiToggleHistory],
                KeyCode::Char('+') | KeyCode::Char('=') => vec![Action::MapZoomIn],
                KeyCode::Char('-') => vec![Action::MapZoomOut],
                KeyCode::Char('c') => vec![Action::MapRecenter],
                KeyCode::Left => vec![Action::MapPan(-PAN_COLUMNS, 0)],
                KeyCode::Right => vec![Action::MapPan(PAN_COLUMNS, 0)],
                KeyCode::Up => vec![Action::MapPan(0, -PAN_ROWS)],
                KeyCode::Down => vec![Action::MapPan(0, PAN_ROWS)],
                _ => vec![],
            };
        }

        match &state.map {
            Some(map) => self.map.handle_event(
                event,
                MapViewProps {
                    map,
                    tile_source: &state.settings.tile_source,
                    selected: state.displayed_coordinate(),
                    precision: state.settings.precision,
                    is_focused: true,
                },
            ),
            None => vec![],
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: AqiDisplayProps<'_>) {
        let state = props.state;

        let loading_indicator = if state.is_loading {
            let spinner = SPINNERS[(state.tick_count as usize / 2) % SPINNERS.len()];
            format!(" {} ", spinner)
        } else {
            String::new()
        };

        let outer_block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(format!(" ☁ Air Quality (AQI){}", loading_indicator))
            .title_style(Style::default().fg(Color::Cyan).bold())
            .title_alignment(Alignment::Center);

        frame.render_widget(outer_block.clone(), area);
        let inner = outer_block.inner(area);

        let help = HelpBarProps {
            has_map: state.map.is_some(),
        };

        let Some(map) = &state.map else {
            // Before the first reading there is nothing to click on
            let chunks = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);
            ReadingPanel.render(frame, chunks[0], ReadingPanelProps { state });
            HelpBar.render(frame, chunks[1], help);
            return;
        };

        let chart_height = if state.show_history {
            HistoryChart::HEIGHT
        } else {
            0
        };
        let chunks = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(ReadingPanel::HEIGHT),
            Constraint::Length(chart_height),
            Constraint::Length(1),
        ])
        .split(inner);

        self.map.render(
            frame,
            chunks[0],
            MapViewProps {
                map,
                tile_source: &state.settings.tile_source,
                selected: state.displayed_coordinate(),
                precision: state.settings.precision,
                is_focused: props.is_focused,
            },
        );
        ReadingPanel.render(frame, chunks[1], ReadingPanelProps { state });
        if state.show_history {
            HistoryChart.render(
                frame,
                chunks[2],
                HistoryChartProps {
                    history: &state.history,
                },
            );
        }
        HelpBar.render(frame, chunks[3], help);
    }
}
