use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::{Component, LOCATION_ICON};
use crate::action::Action;
use crate::geo::Coordinate;

pub struct LocationHeader;

pub struct LocationHeaderProps<'a> {
    pub city: Option<&'a str>,
    pub station: Option<&'a str>,
    pub coordinate: Coordinate,
}

impl LocationHeader {
    pub const HEIGHT: u16 = 2;
}

impl Component<Action> for LocationHeader {
    type Props<'a> = LocationHeaderProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let chunks = Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).split(area);

        let mut spans = vec![
            Span::styled(LOCATION_ICON, Style::default()),
            Span::styled(
                props.city.unwrap_or("Unknown city").to_string(),
                Style::default().fg(Color::White).bold(),
            ),
        ];
        if let Some(station) = props.station {
            spans.push(Span::styled("  ·  ", Style::default().fg(Color::DarkGray)));
            spans.push(Span::styled(
                station.to_string(),
                Style::default().fg(Color::Gray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(spans).centered()), chunks[0]);

        let coords_line = Line::from(vec![Span::styled(
            props.coordinate.to_string(),
            Style::default().fg(Color::DarkGray),
        )])
        .centered();
        frame.render_widget(Paragraph::new(coords_line), chunks[1]);
    }
}
