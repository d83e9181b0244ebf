pub mod chart_widget;
pub mod detail_panel;
pub mod header;
pub mod statusbar;
pub mod theme;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};

use crate::app::App;
use crate::chart::{build_draw_list, build_snapshot};

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(frame, chunks[0], app);

    let content_area = chunks[1];
    let (charts_area, detail_area) = if app.show_detail {
        let h_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(20), Constraint::Length(36)])
            .split(content_area);
        (h_chunks[0], Some(h_chunks[1]))
    } else {
        (content_area, None)
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Ratio(1, app.charts.len() as u32);
            app.charts.len()
        ])
        .split(charts_area);

    for (i, chart) in app.charts.iter().enumerate() {
        let snapshot = build_snapshot(&app.registry, chart);
        let ops = build_draw_list(&snapshot);
        chart_widget::render(
            frame,
            rows[i],
            &snapshot,
            &ops,
            i == app.selected_chart,
            &app.theme,
        );
    }

    if let Some(detail) = detail_area {
        detail_panel::render(frame, detail, app);
    }

    statusbar::render(frame, chunks[2], app);
}
