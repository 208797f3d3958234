use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

use super::Component;
use crate::action::Action;

pub struct HelpBar;

pub struct HelpBarProps {
    /// Map controls are only listed once the map exists
    pub has_map: bool,
}

impl Component<Action> for HelpBar {
    type Props<'a> = HelpBarProps;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let mut hints = vec![("r", "refresh")];
        if props.has_map {
            hints.extend([
                ("click", "select"),
                ("+/-", "zoom"),
                ("←↑↓→", "pan"),
                ("c", "center"),
                ("h", "history"),
            ]);
        }
        hints.push(("q", "quit"));

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Cyan).bold()),
                    Span::styled(format!(" {label} "), Style::default().fg(Color::DarkGray)),
                ]
            })
            .collect();

        frame.render_widget(Paragraph::new(Line::from(spans).centered()), area);
    }
}
