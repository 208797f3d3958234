//! Tile map with the "Your Location" marker
//!
//! FRAMEWORK PATTERN: Component with internal UI state
//! - The canvas area from the last render is kept in `&mut self`
//! - Clicks are translated to coordinates against that area
//! - Everything else comes from props

use crossterm::event::{MouseButton, MouseEventKind};
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Style, Stylize},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders,
        canvas::{Canvas, Line as CanvasLine, Map as WorldMap, MapResolution},
    },
};
use tui_dispatch::EventKind;

use super::Component;
use crate::action::Action;
use crate::geo::{Coordinate, TileId, TileSource};
use crate::state::{HOME_LABEL, MapState};

pub const MARKER_ICON: &str = "●";
pub const SELECTED_ICON: &str = "✚";

const GRID_COLOR: Color = Color::Rgb(45, 45, 60);
const LAND_COLOR: Color = Color::Rgb(110, 140, 110);

pub struct MapViewProps<'a> {
    pub map: &'a MapState,
    pub tile_source: &'a TileSource,
    /// Coordinate of the reading on screen, if any
    pub selected: Option<Coordinate>,
    /// Decimal places kept for clicked coordinates
    pub precision: u32,
    pub is_focused: bool,
}

#[derive(Default)]
pub struct MapView {
    canvas_area: Option<Rect>,
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coordinate under a terminal cell, if the cell is on the map canvas
    pub fn coordinate_at(&self, column: u16, row: u16, map: &MapState) -> Option<Coordinate> {
        let area = self.canvas_area?;
        if !area.contains(Position::new(column, row)) {
            return None;
        }
        let viewport = map.viewport(area.width, area.height);
        Some(viewport.coordinate_at(column - area.x, row - area.y))
    }

    fn on_canvas(&self, column: u16, row: u16) -> bool {
        self.canvas_area
            .is_some_and(|area| area.contains(Position::new(column, row)))
    }
}

impl Component<Action> for MapView {
    type Props<'a> = MapViewProps<'a>;

    fn handle_event(&mut self, event: &EventKind, props: MapViewProps<'_>) -> Vec<Action> {
        if !props.is_focused {
            return vec![];
        }

        match event {
            EventKind::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => self
                .coordinate_at(mouse.column, mouse.row, props.map)
                .map(|c| Action::ReadingFetch(c.rounded(props.precision)))
                .into_iter()
                .collect(),
            EventKind::Scroll { column, row, delta } if self.on_canvas(*column, *row) => {
                if *delta < 0 {
                    vec![Action::MapZoomIn]
                } else {
                    vec![Action::MapZoomOut]
                }
            }
            _ => vec![],
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: MapViewProps<'_>) {
        let map = *props.map;
        let center_tile = TileId::containing(map.center, map.zoom);
        let tile_url = format!(" {} ", props.tile_source.tile_url(center_tile));
        let attribution = format!(" {} ", props.tile_source.attribution);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(format!(" Map · zoom {} ", map.zoom))
            .title_style(Style::default().fg(Color::Gray))
            .title_bottom(Line::from(attribution).right_aligned().fg(Color::DarkGray))
            .title_bottom(Line::from(tile_url).left_aligned().fg(Color::DarkGray));

        let inner = block.inner(area);
        self.canvas_area = Some(inner);

        let viewport = map.viewport(inner.width, inner.height);
        let [west, east] = viewport.x_bounds();
        let [south, north] = viewport.y_bounds();
        let (grid_longitudes, grid_latitudes) = viewport.tile_grid();
        let selected = props.selected.filter(|c| *c != map.marker);

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds([west, east])
            .y_bounds([south, north])
            .paint(move |ctx| {
                // Base layer: tile boundaries
                for lon in &grid_longitudes {
                    ctx.draw(&CanvasLine {
                        x1: *lon,
                        y1: south,
                        x2: *lon,
                        y2: north,
                        color: GRID_COLOR,
                    });
                }
                for lat in &grid_latitudes {
                    ctx.draw(&CanvasLine {
                        x1: west,
                        y1: *lat,
                        x2: east,
                        y2: *lat,
                        color: GRID_COLOR,
                    });
                }
                ctx.layer();

                ctx.draw(&WorldMap {
                    color: LAND_COLOR,
                    resolution: MapResolution::High,
                });
                ctx.layer();

                if let Some(c) = selected {
                    ctx.print(
                        c.longitude,
                        c.latitude,
                        Span::styled(SELECTED_ICON, Style::default().fg(Color::Yellow).bold()),
                    );
                }

                ctx.print(
                    map.marker.longitude,
                    map.marker.latitude,
                    Line::from(vec![
                        Span::styled(MARKER_ICON, Style::default().fg(Color::Red).bold()),
                        Span::styled(
                            format!(" {HOME_LABEL}"),
                            Style::default().fg(Color::White).bold(),
                        ),
                    ]),
                );
            });

        frame.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyModifiers, MouseEvent};
    use tui_dispatch::testing::*;

    fn click(column: u16, row: u16) -> EventKind {
        EventKind::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn props<'a>(map: &'a MapState, source: &'a TileSource) -> MapViewProps<'a> {
        MapViewProps {
            map,
            tile_source: source,
            selected: None,
            precision: 4,
            is_focused: true,
        }
    }

    fn rendered(map: &MapState, source: &TileSource) -> (MapView, String) {
        let mut render = RenderHarness::new(60, 20);
        let mut view = MapView::new();
        let output = render.render_to_string_plain(|frame| {
            view.render(frame, frame.area(), props(map, source));
        });
        (view, output)
    }

    #[test]
    fn test_render_marker_and_attribution() {
        let map = MapState::centered(Coordinate::new(10.0, 10.0), 6);
        let source = TileSource::openstreetmap();
        let (_, output) = rendered(&map, &source);

        assert!(output.contains("Your Location"));
        assert!(output.contains("OpenStreetMap"));
        assert!(output.contains("zoom 6"));
    }

    #[test]
    fn test_click_before_render_is_ignored() {
        let map = MapState::centered(Coordinate::new(10.0, 10.0), 6);
        let source = TileSource::openstreetmap();
        let mut view = MapView::new();

        let actions = view.handle_event(&click(10, 10), props(&map, &source));
        actions.assert_empty();
    }

    #[test]
    fn test_click_center_fetches_rounded_coordinate() {
        let map = MapState::centered(Coordinate::new(10.0, 10.0), 6);
        let source = TileSource::openstreetmap();
        let (mut view, _) = rendered(&map, &source);

        // 60x20 area, 58x18 canvas starting at (1, 1)
        let actions = view.handle_event(&click(30, 10), props(&map, &source));
        actions.assert_count(1);

        let Action::ReadingFetch(c) = &actions[0] else {
            panic!("expected ReadingFetch, got {:?}", actions[0]);
        };
        assert_eq!(*c, c.rounded(4));
        assert!((c.latitude - 10.0).abs() < 0.5);
        assert!((c.longitude - 10.0).abs() < 0.5);
    }

    #[test]
    fn test_click_west_of_center_is_west() {
        let map = MapState::centered(Coordinate::new(10.0, 10.0), 6);
        let source = TileSource::openstreetmap();
        let (mut view, _) = rendered(&map, &source);

        let actions = view.handle_event(&click(2, 2), props(&map, &source));
        let Some(Action::ReadingFetch(c)) = actions.first() else {
            panic!("expected ReadingFetch");
        };
        assert!(c.longitude < 10.0);
        assert!(c.latitude > 10.0);
    }

    #[test]
    fn test_click_on_border_is_ignored() {
        let map = MapState::centered(Coordinate::new(10.0, 10.0), 6);
        let source = TileSource::openstreetmap();
        let (mut view, _) = rendered(&map, &source);

        view.handle_event(&click(0, 0), props(&map, &source))
            .assert_empty();
    }

    #[test]
    fn test_scroll_zooms() {
        let map = MapState::centered(Coordinate::new(10.0, 10.0), 6);
        let source = TileSource::openstreetmap();
        let (mut view, _) = rendered(&map, &source);

        let up = EventKind::Scroll {
            column: 20,
            row: 5,
            delta: -1,
        };
        view.handle_event(&up, props(&map, &source))
            .assert_first(Action::MapZoomIn);

        let down = EventKind::Scroll {
            column: 20,
            row: 5,
            delta: 1,
        };
        view.handle_event(&down, props(&map, &source))
            .assert_first(Action::MapZoomOut);
    }

    #[test]
    fn test_unfocused_ignores_clicks() {
        let map = MapState::centered(Coordinate::new(10.0, 10.0), 6);
        let source = TileSource::openstreetmap();
        let (mut view, _) = rendered(&map, &source);

        let props = MapViewProps {
            is_focused: false,
            ..props(&map, &source)
        };
        view.handle_event(&click(30, 10), props).assert_empty();
    }
}
