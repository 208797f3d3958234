//! PM2.5 trend for the displayed coordinate

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style, Stylize},
    symbols::Marker,
    text::Line,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

use super::Component;
use crate::action::Action;
use crate::history::ReadingHistory;

pub const DATASET_NAME: &str = "PM2.5 levels";

pub struct HistoryChart;

pub struct HistoryChartProps<'a> {
    pub history: &'a ReadingHistory,
}

impl HistoryChart {
    pub const HEIGHT: u16 = 10;
}

impl Component<Action> for HistoryChart {
    type Props<'a> = HistoryChartProps<'a>;

    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>) {
        let history = props.history;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(format!(" PM2.5 trend · {}/{} ", history.len(), history.capacity()))
            .title_style(Style::default().fg(Color::Gray));

        if history.is_empty() {
            let empty = Paragraph::new(
                Line::from("no readings yet".fg(Color::DarkGray)).centered(),
            )
            .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let data = history.series();
        let x_max = (data.len().saturating_sub(1) as f64).max(1.0);
        // Axis starts at zero so small swings don't look dramatic
        let y_max = history.max_pm25().unwrap_or(0.0).max(1.0) * 1.2;

        let datasets = vec![
            Dataset::default()
                .name(DATASET_NAME)
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(Color::Cyan))
                .data(&data),
        ];

        let chart = Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(Color::DarkGray))
                    .bounds([0.0, x_max]),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(Color::DarkGray))
                    .bounds([0.0, y_max])
                    .labels(["0".to_string(), format!("{:.0}", y_max)]),
            );

        frame.render_widget(chart, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Coordinate;
    use crate::state::Reading;
    use tui_dispatch::testing::*;

    fn render(history: &ReadingHistory) -> String {
        let mut render = RenderHarness::new(60, HistoryChart::HEIGHT);
        let mut chart = HistoryChart;
        render.render_to_string_plain(|frame| {
            chart.render(frame, frame.area(), HistoryChartProps { history });
        })
    }

    #[test]
    fn test_render_empty_history() {
        let output = render(&ReadingHistory::new(24));
        assert!(output.contains("no readings yet"));
        assert!(output.contains("0/24"));
    }

    #[test]
    fn test_render_series_from_zero() {
        let here = Coordinate::new(1.0, 1.0);
        let mut history = ReadingHistory::new(24);
        for pm25 in [10.0, 20.0, 50.0] {
            history.record(
                here,
                &Reading {
                    pm25: Some(pm25),
                    ..Default::default()
                },
            );
        }

        let output = render(&history);
        assert!(output.contains("3/24"));
        // 50 is the peak; the axis tops out 20% above it
        assert!(output.contains("60"));
    }
}
