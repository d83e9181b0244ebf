use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Sparkline};

use crate::app::App;
use crate::format::{format_rate, truncate_unicode};
use crate::metrics::registry::Channel;

const VALUE_BAR_CELLS: usize = 8;

/// Per-series breakdown of the selected chart: current value, a bar of the
/// series' own normalized level, and a normalized sparkline of the busiest
/// series.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let chart = app.selected_config();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.selected_border))
        .title(Span::styled(
            format!(" {} \u{2022} series ", chart.title),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(4)])
        .split(inner);

    let mut lines = Vec::new();
    let mut busiest: Option<(String, f64, Vec<u64>)> = None;

    for entity in app.registry.entities_of(chart.class) {
        for &channel in chart.class.channels() {
            let Some(buf) = entity.buffer(channel) else {
                continue;
            };
            let label = match channel {
                Channel::Usage => entity.key.clone(),
                _ => format!("{} {}", entity.key, channel.label()),
            };
            let normalized = buf.normalized_values();
            let level = normalized.last().copied().unwrap_or(0.0);
            let filled = (level * VALUE_BAR_CELLS as f64).round() as usize;
            let bar: String = "\u{25b0}".repeat(filled.min(VALUE_BAR_CELLS))
                + &"\u{25b1}".repeat(VALUE_BAR_CELLS - filled.min(VALUE_BAR_CELLS));

            let value = buf.latest().map(|p| p.value);
            let value_text = value
                .map(|v| format_rate(v, chart.unit))
                .unwrap_or_else(|| "\u{2014}".to_string());

            lines.push(Line::from(vec![
                Span::styled(
                    "\u{25a0} ",
                    Style::default().fg(theme.series_color(entity.color_index)),
                ),
                Span::styled(
                    format!("{:<14}", truncate_unicode(&label, 14)),
                    Style::default().fg(theme.pill_desc_fg),
                ),
                Span::styled(bar, Style::default().fg(theme.series_color(entity.color_index))),
                Span::styled(
                    format!(" {value_text}"),
                    Style::default().fg(theme.text_secondary),
                ),
            ]));

            if let Some(v) = value
                && busiest.as_ref().is_none_or(|(_, best, _)| v > *best)
            {
                let history: Vec<u64> = normalized
                    .iter()
                    .map(|n| (n * 100.0).round() as u64)
                    .collect();
                busiest = Some((label, v, history));
            }
        }
    }

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(
            "no series yet",
            Style::default().fg(theme.text_secondary),
        )));
    }
    frame.render_widget(Paragraph::new(lines), chunks[0]);

    if let Some((label, _, history)) = busiest {
        let spark_block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(theme.chart_border))
            .title(Span::styled(
                format!(" {} ", truncate_unicode(&label, 20)),
                Style::default().fg(theme.text_secondary),
            ));
        let sparkline = Sparkline::default()
            .block(spark_block)
            .data(&history)
            .max(100)
            .style(Style::default().fg(theme.sparkline_color));
        frame.render_widget(sparkline, chunks[1]);
    }
}
