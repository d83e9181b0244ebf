use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Gauge, Paragraph, Sparkline};

use crate::app::App;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(40),
            Constraint::Percentage(30),
            Constraint::Percentage(30),
        ])
        .split(area);

    render_branding(frame, chunks[0], app);
    render_ram_gauge(frame, chunks[1], app);
    render_cpu_sparkline(frame, chunks[2], app);
}

fn render_branding(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.chart_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut spans = vec![Span::styled(
        " sysdash ",
        Style::default()
            .fg(theme.header_accent_fg)
            .bg(theme.header_accent_bg)
            .add_modifier(Modifier::BOLD),
    )];

    spans.extend([
        Span::raw("  "),
        Span::styled(
            format!("Entities: {}", app.registry.len()),
            Style::default().fg(theme.text_secondary),
        ),
        Span::raw("  "),
        Span::styled(
            format!("t+{:.0}s", app.last_sample_secs),
            Style::default().fg(theme.text_secondary),
        ),
    ]);

    if app.paused {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            "PAUSED",
            Style::default()
                .fg(theme.status_paused)
                .add_modifier(Modifier::BOLD),
        ));
    }

    let line = Line::from(spans);
    frame.render_widget(Paragraph::new(line), inner);
}

fn render_ram_gauge(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let ram_used_mb = app.memory_used / 1_048_576;
    let ram_total_mb = app.memory_total / 1_048_576;
    let ram_ratio = if app.memory_total > 0 {
        (app.memory_used as f64 / app.memory_total as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let ram_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.chart_border))
        .title(Span::styled(
            " RAM ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let gauge = Gauge::default()
        .block(ram_block)
        .gauge_style(
            Style::default()
                .fg(theme.gauge_filled)
                .bg(theme.gauge_unfilled),
        )
        .ratio(ram_ratio)
        .label(format!(
            "{}/{} MB ({:.0}%)",
            ram_used_mb,
            ram_total_mb,
            ram_ratio * 100.0
        ));

    frame.render_widget(gauge, area);
}

fn render_cpu_sparkline(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let cpu_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.chart_border))
        .title(Span::styled(
            format!(" CPU {}% ", app.cpu_mean_usage()),
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let cpu_data: Vec<u64> = app.cpu_mean_history.iter().copied().collect();
    let sparkline = Sparkline::default()
        .block(cpu_block)
        .data(&cpu_data)
        .max(100)
        .style(Style::default().fg(theme.sparkline_color));

    frame.render_widget(sparkline, area);
}
