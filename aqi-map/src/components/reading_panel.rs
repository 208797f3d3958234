use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::{Component, ERROR_ICON, LocationHeader, LocationHeaderProps, SPINNERS};
use crate::action::Action;
use crate::state::{AppState, Observation, ReadingView};

pub const NO_DATA_TEXT: &str = "No Data Found";

pub struct ReadingPanel;

pub struct ReadingPanelProps<'a> {
    pub state: &'a AppState,
}

impl ReadingPanel {
    pub const HEIGHT: u16 = LocationHeader::HEIGHT + 4;
}

impl Component<Action> for ReadingPanel {
    type Props<'a> = ReadingPanelProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let state = props.state;

        match state.view() {
            ReadingView::Ready(observation) => {
                let chunks = Layout::vertical([
                    Constraint::Length(LocationHeader::HEIGHT),
                    Constraint::Length(1),
                    Constraint::Length(1),
                    Constraint::Length(1),
                ])
                .flex(Flex::Center)
                .split(area);

                let mut header = LocationHeader;
                header.render(
                    frame,
                    chunks[0],
                    LocationHeaderProps {
                        city: observation.reading.city.as_deref(),
                        station: observation.reading.station.as_deref(),
                        coordinate: observation.coordinate,
                    },
                );

                for (line, area) in reading_lines(observation, state.is_loading, state.tick_count)
                    .into_iter()
                    .zip(chunks[1..].iter().copied())
                {
                    frame.render_widget(Paragraph::new(line), area);
                }
            }
            ReadingView::Loading => {
                let spinner = SPINNERS[(state.tick_count as usize / 2) % SPINNERS.len()];
                let dots = ".".repeat((state.tick_count as usize / 3) % 4);
                let line = Line::from(vec![
                    Span::styled(spinner, Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!(" Loading{:<3}", dots),
                        Style::default().fg(Color::Gray),
                    ),
                ])
                .centered();
                render_centered(frame, area, vec![line]);
            }
            ReadingView::NoData => {
                let hint = if state.map.is_some() {
                    "click the map or press r to try again"
                } else {
                    "press r to try again"
                };
                let lines = vec![
                    Line::from(ERROR_ICON).centered(),
                    Line::from(Span::styled(
                        NO_DATA_TEXT,
                        Style::default().fg(Color::Red).bold(),
                    ))
                    .centered(),
                    Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))).centered(),
                ];
                render_centered(frame, area, lines);
            }
        }
    }
}

fn reading_lines(observation: &Observation, is_loading: bool, tick_count: u32) -> Vec<Line<'static>> {
    let reading = &observation.reading;
    let unit = reading.unit.clone().unwrap_or_else(|| "µg/m³".into());

    let value = match reading.pm25 {
        Some(pm25) => Span::styled(
            format!("{pm25} {unit}"),
            Style::default().fg(pm25_to_color(pm25)).bold(),
        ),
        None => Span::styled("-", Style::default().fg(Color::DarkGray)),
    };

    let mut pm_line = vec![
        Span::styled("PM2.5 levels  ", Style::default().fg(Color::Gray)),
        value,
    ];
    if is_loading {
        let spinner = SPINNERS[(tick_count as usize / 2) % SPINNERS.len()];
        pm_line.push(Span::styled(format!("  {spinner}"), Style::default().fg(Color::Cyan)));
    }

    let observed = reading
        .observed_at
        .as_deref()
        .map(|at| format!("observed {at}"))
        .unwrap_or_default();

    vec![
        Line::from("").centered(),
        Line::from(pm_line).centered(),
        Line::from(Span::styled(observed, Style::default().fg(Color::DarkGray))).centered(),
    ]
}

fn render_centered(frame: &mut Frame, area: Rect, lines: Vec<Line<'static>>) {
    let chunks = Layout::vertical(vec![Constraint::Length(1); lines.len()])
        .flex(Flex::Center)
        .split(area);
    for (line, area) in lines.into_iter().zip(chunks.iter().copied()) {
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// Color by US EPA PM2.5 breakpoints (µg/m³)
pub fn pm25_to_color(pm25: f64) -> Color {
    match pm25 {
        v if v <= 12.0 => Color::Rgb(120, 220, 120),  // Good
        v if v <= 35.4 => Color::Rgb(255, 220, 100),  // Moderate
        v if v <= 55.4 => Color::Rgb(255, 160, 80),   // Unhealthy for sensitive groups
        v if v <= 150.4 => Color::Rgb(255, 100, 100), // Unhealthy
        v if v <= 250.4 => Color::Rgb(190, 110, 220), // Very unhealthy
        _ => Color::Rgb(160, 60, 80),                 // Hazardous
    }
}
