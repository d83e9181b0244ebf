use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::format::format_bytes;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let bg_style = Style::default().bg(theme.statusbar_bg);

    let mut spans = Vec::new();
    spans.extend(pill_spans("q", "Quit", theme));
    spans.extend(pill_spans("\u{2191}\u{2193}", "Chart", theme));
    spans.extend(pill_spans("d", "Detail", theme));
    spans.extend(pill_spans("p", if app.paused { "Resume" } else { "Pause" }, theme));

    if app.disk_read_total > 0 || app.disk_write_total > 0 {
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!(
                "disk R {} / W {}",
                format_bytes(app.disk_read_total),
                format_bytes(app.disk_write_total)
            ),
            Style::default().fg(theme.pill_desc_fg),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!(" {desc}"), Style::default().fg(theme.pill_desc_fg)),
    ]
}
