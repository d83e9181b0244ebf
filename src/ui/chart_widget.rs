use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine, Points};
use ratatui::widgets::{Block, BorderType, Borders};

use crate::chart::{ChartSnapshot, DrawOp, LineStyle};
use crate::format::{format_value, truncate_unicode};
use crate::ui::theme::Theme;

const LEGEND_MAX_LABEL: usize = 14;

/// Rasterizes the renderer's draw list onto the terminal. The braille
/// canvas is the "drawing surface": ops arrive in chart data coordinates
/// and the canvas maps them onto cells.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    snapshot: &ChartSnapshot,
    ops: &[DrawOp],
    selected: bool,
    theme: &Theme,
) {
    let border_style = if selected {
        Style::default().fg(theme.selected_border)
    } else {
        Style::default().fg(theme.chart_border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .title(Span::styled(
            format!(" {} ", snapshot.title),
            Style::default()
                .fg(theme.text_primary)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_rows = block.inner(area).height.max(1) as f64;
    let x_max = snapshot.capacity.saturating_sub(1).max(1) as f64;
    let y_max = snapshot.y_max;

    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, x_max])
        .y_bounds([0.0, y_max])
        .paint(|ctx| paint_ops(ctx, ops, theme, x_max, y_max, inner_rows));

    frame.render_widget(canvas, area);
}

fn paint_ops(
    ctx: &mut Context,
    ops: &[DrawOp],
    theme: &Theme,
    x_max: f64,
    y_max: f64,
    inner_rows: f64,
) {
    let mut legend_row = 0usize;
    let legend_capacity = (inner_rows as usize).saturating_sub(2);
    let legend_total = ops
        .iter()
        .filter(|op| matches!(op, DrawOp::LegendEntry { .. }))
        .count();
    let row_height = y_max / inner_rows.max(1.0);
    let legend_x = x_max * 0.55;

    for op in ops {
        match op {
            DrawOp::GridLine { from, to } => {
                ctx.draw(&CanvasLine {
                    x1: from.0,
                    y1: from.1,
                    x2: to.0,
                    y2: to.1,
                    color: theme.grid_line,
                });
            }
            DrawOp::AxisLabel { at, text } => {
                ctx.print(
                    at.0,
                    at.1,
                    Line::from(Span::styled(
                        text.clone(),
                        Style::default().fg(theme.axis_label),
                    )),
                );
            }
            DrawOp::AreaFill {
                color_index,
                points,
            } => {
                let color = dim_color(theme.series_color(*color_index));
                for step in 0..=(x_max as usize) {
                    let x = step as f64;
                    if let Some(y) = interpolate_y(points, x)
                        && y > 0.0
                    {
                        ctx.draw(&CanvasLine {
                            x1: x,
                            y1: 0.0,
                            x2: x,
                            y2: y,
                            color,
                        });
                    }
                }
            }
            DrawOp::Polyline {
                color_index,
                style,
                points,
            } => {
                let color = theme.series_color(*color_index);
                for (i, pair) in points.windows(2).enumerate() {
                    if *style == LineStyle::Dashed && i % 2 == 1 {
                        continue;
                    }
                    ctx.draw(&CanvasLine {
                        x1: pair[0].0,
                        y1: pair[0].1,
                        x2: pair[1].0,
                        y2: pair[1].1,
                        color,
                    });
                }
            }
            DrawOp::Marker { color_index, at } => {
                ctx.draw(&Points {
                    coords: &[*at],
                    color: theme.series_color(*color_index),
                });
            }
            DrawOp::LegendEntry {
                color_index,
                style,
                label,
                current_value,
            } => {
                if legend_row >= legend_capacity {
                    continue;
                }
                let y = y_max - row_height * (legend_row + 1) as f64;
                if legend_row + 1 == legend_capacity && legend_total > legend_capacity {
                    let hidden = legend_total - legend_capacity + 1;
                    ctx.print(
                        legend_x,
                        y,
                        Line::from(Span::styled(
                            format!("+{hidden} more"),
                            Style::default().fg(theme.text_secondary),
                        )),
                    );
                    legend_row += 1;
                    continue;
                }
                let swatch = match style {
                    LineStyle::Solid => "\u{2500}\u{2500}",
                    LineStyle::Dashed => "\u{254c}\u{254c}",
                };
                let mut spans = vec![
                    Span::styled(
                        swatch.to_string(),
                        Style::default().fg(theme.series_color(*color_index)),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        truncate_unicode(label, LEGEND_MAX_LABEL),
                        Style::default().fg(theme.pill_desc_fg),
                    ),
                ];
                if let Some(value) = current_value {
                    spans.push(Span::styled(
                        format!(" {}", format_value(*value)),
                        Style::default().fg(theme.text_secondary),
                    ));
                }
                ctx.print(legend_x, y, Line::from(spans));
                legend_row += 1;
            }
        }
    }
}

/// Linear interpolation of a polyline at column `x`; `None` outside the
/// covered range.
fn interpolate_y(points: &[(f64, f64)], x: f64) -> Option<f64> {
    match points {
        [] => None,
        [only] => ((only.0 - x).abs() < 0.5).then_some(only.1),
        _ => {
            for pair in points.windows(2) {
                let (x0, y0) = pair[0];
                let (x1, y1) = pair[1];
                if x >= x0 && x <= x1 {
                    if (x1 - x0).abs() < f64::EPSILON {
                        return Some(y0.max(y1));
                    }
                    let t = (x - x0) / (x1 - x0);
                    return Some(y0 + t * (y1 - y0));
                }
            }
            None
        }
    }
}

/// Area fills sit under the stroke at reduced intensity, approximating the
/// reference charts' translucent fill.
fn dim_color(color: Color) -> Color {
    match color {
        Color::Rgb(r, g, b) => Color::Rgb(r / 2, g / 2, b / 2),
        other => other,
    }
}
