use crate::chart::snapshot::{ChartSnapshot, ChartConfig, LineStyle, SeriesSnapshot};
use crate::format::format_value;
use crate::metrics::registry::EntityRegistry;

/// Guide lines per axis, matching the reference four-way split.
const GRID_DIVISIONS: usize = 4;

/// One toolkit-free draw instruction in chart data coordinates
/// (x in [0, capacity-1], y in [0, y_max]). The drawing surface maps these
/// onto its own pixel or cell grid.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    GridLine {
        from: (f64, f64),
        to: (f64, f64),
    },
    AxisLabel {
        at: (f64, f64),
        text: String,
    },
    /// Area between the polyline and the chart floor, painted under the
    /// stroke in the series color.
    AreaFill {
        color_index: usize,
        points: Vec<(f64, f64)>,
    },
    Polyline {
        color_index: usize,
        style: LineStyle,
        points: Vec<(f64, f64)>,
    },
    /// Dot on the most recent point of a series.
    Marker {
        color_index: usize,
        at: (f64, f64),
    },
    LegendEntry {
        color_index: usize,
        style: LineStyle,
        label: String,
        current_value: Option<f64>,
    },
}

/// Collect a read-only view of every series the chart subscribes to and
/// compute the shared Y scale `[0, max across all series]`. Normalizing
/// per entity would make interfaces and cores incomparable, so one chart
/// gets exactly one scale.
pub fn build_snapshot(registry: &EntityRegistry, config: &ChartConfig) -> ChartSnapshot {
    let mut series = Vec::new();
    for entity in registry.entities_of(config.class) {
        for &channel in config.class.channels() {
            let Some(buf) = entity.buffer(channel) else {
                continue;
            };
            series.push(SeriesSnapshot {
                entity_key: entity.key.clone(),
                channel,
                color_index: entity.color_index,
                style: LineStyle::for_channel(channel),
                points: buf.values().collect(),
                current_value: buf.latest().map(|p| p.value),
            });
        }
    }

    let observed = series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .fold(0.0_f64, f64::max);
    let y_max = if observed > 0.0 { observed } else { 1.0 };

    ChartSnapshot {
        title: config.title,
        unit: config.unit,
        capacity: config.capacity,
        y_max,
        series,
    }
}

/// Produce the deterministic draw sequence for one chart: grid, axis
/// labels, per-series fill then stroke, latest-point markers, legend.
pub fn build_draw_list(snapshot: &ChartSnapshot) -> Vec<DrawOp> {
    let x_max = snapshot.capacity.saturating_sub(1).max(1) as f64;
    let y_max = snapshot.y_max;
    let mut ops = Vec::new();

    for i in 0..=GRID_DIVISIONS {
        let y = y_max * i as f64 / GRID_DIVISIONS as f64;
        ops.push(DrawOp::GridLine {
            from: (0.0, y),
            to: (x_max, y),
        });
    }
    for i in 0..=GRID_DIVISIONS {
        let x = x_max * i as f64 / GRID_DIVISIONS as f64;
        ops.push(DrawOp::GridLine {
            from: (x, 0.0),
            to: (x, y_max),
        });
    }

    ops.push(DrawOp::AxisLabel {
        at: (0.0, y_max),
        text: format!("{} {}", format_value(y_max), snapshot.unit),
    });
    ops.push(DrawOp::AxisLabel {
        at: (0.0, 0.0),
        text: "0".to_string(),
    });

    let polylines: Vec<Vec<(f64, f64)>> = snapshot
        .series
        .iter()
        .map(|s| series_coords(&s.points, x_max))
        .collect();

    for (series, points) in snapshot.series.iter().zip(&polylines) {
        if points.is_empty() {
            continue;
        }
        ops.push(DrawOp::AreaFill {
            color_index: series.color_index,
            points: points.clone(),
        });
    }
    for (series, points) in snapshot.series.iter().zip(&polylines) {
        if points.is_empty() {
            continue;
        }
        ops.push(DrawOp::Polyline {
            color_index: series.color_index,
            style: series.style,
            points: points.clone(),
        });
    }
    for (series, points) in snapshot.series.iter().zip(&polylines) {
        let Some(&last) = points.last() else {
            continue;
        };
        ops.push(DrawOp::Marker {
            color_index: series.color_index,
            at: last,
        });
    }
    for series in &snapshot.series {
        ops.push(DrawOp::LegendEntry {
            color_index: series.color_index,
            style: series.style,
            label: series.label(),
            current_value: series.current_value,
        });
    }

    ops
}

/// Spread the buffered values across the full X range, oldest left. A
/// part-filled buffer stretches rather than hugging one edge, matching the
/// reference charts.
fn series_coords(points: &[f64], x_max: f64) -> Vec<(f64, f64)> {
    match points.len() {
        0 => Vec::new(),
        1 => vec![(0.0, points[0])],
        len => {
            let step = x_max / (len - 1) as f64;
            points
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64 * step, v))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::rate::RatePoint;
    use crate::metrics::registry::{Channel, EntityClass, SeriesCapacities};

    fn config() -> ChartConfig {
        ChartConfig {
            title: "Network",
            class: EntityClass::Network,
            capacity: 15,
            unit: "Mbps",
        }
    }

    fn registry_with_data() -> EntityRegistry {
        let mut reg = EntityRegistry::new(
            8,
            SeriesCapacities {
                cpu: 20,
                disk: 60,
                network: 15,
            },
        );
        reg.ensure_entity("eth0", EntityClass::Network, 0.0);
        reg.ensure_entity("wlan0", EntityClass::Network, 0.0);
        for (i, v) in [1.0, 3.0, 2.0].iter().enumerate() {
            reg.append_rate(
                "eth0",
                Channel::In,
                RatePoint {
                    at_secs: i as f64,
                    value: *v,
                },
            )
            .unwrap();
        }
        reg.append_rate(
            "wlan0",
            Channel::Out,
            RatePoint {
                at_secs: 0.0,
                value: 9.0,
            },
        )
        .unwrap();
        reg
    }

    fn rank(op: &DrawOp) -> usize {
        match op {
            DrawOp::GridLine { .. } => 0,
            DrawOp::AxisLabel { .. } => 1,
            DrawOp::AreaFill { .. } => 2,
            DrawOp::Polyline { .. } => 3,
            DrawOp::Marker { .. } => 4,
            DrawOp::LegendEntry { .. } => 5,
        }
    }

    #[test]
    fn all_series_share_one_y_scale() {
        let reg = registry_with_data();
        let snapshot = build_snapshot(&reg, &config());
        assert_eq!(snapshot.y_max, 9.0);
        // Four buffers exist (in/out for both interfaces).
        assert_eq!(snapshot.series.len(), 4);
    }

    #[test]
    fn empty_registry_still_has_a_positive_scale() {
        let reg = EntityRegistry::new(
            8,
            SeriesCapacities {
                cpu: 20,
                disk: 60,
                network: 15,
            },
        );
        let snapshot = build_snapshot(&reg, &config());
        assert_eq!(snapshot.y_max, 1.0);
        assert!(snapshot.series.is_empty());
    }

    #[test]
    fn draw_sequence_is_layered_and_deterministic() {
        let reg = registry_with_data();
        let snapshot = build_snapshot(&reg, &config());
        let ops = build_draw_list(&snapshot);
        let ranks: Vec<usize> = ops.iter().map(rank).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted, "ops must be grouped grid→axis→fill→stroke→marker→legend");
        // 5 horizontal + 5 vertical guide lines, two axis labels.
        assert_eq!(ranks.iter().filter(|&&r| r == 0).count(), 10);
        assert_eq!(ranks.iter().filter(|&&r| r == 1).count(), 2);
        // Legend lists every subscribed series, drawn or not.
        assert_eq!(ranks.iter().filter(|&&r| r == 5).count(), 4);
    }

    #[test]
    fn part_filled_series_stretch_across_the_x_range() {
        let reg = registry_with_data();
        let snapshot = build_snapshot(&reg, &config());
        let ops = build_draw_list(&snapshot);
        let line = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Polyline { points, .. } if points.len() == 3 => Some(points),
                _ => None,
            })
            .unwrap();
        assert_eq!(line[0].0, 0.0);
        assert!((line[1].0 - 7.0).abs() < 1e-9);
        assert!((line[2].0 - 14.0).abs() < 1e-9);
    }

    #[test]
    fn dashed_style_follows_the_channel() {
        let reg = registry_with_data();
        let snapshot = build_snapshot(&reg, &config());
        let ops = build_draw_list(&snapshot);
        let style = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Polyline { style, points, .. } if points.len() == 1 => Some(*style),
                _ => None,
            })
            .unwrap();
        assert_eq!(style, LineStyle::Dashed);
    }

    #[test]
    fn markers_sit_on_the_newest_point() {
        let reg = registry_with_data();
        let snapshot = build_snapshot(&reg, &config());
        let ops = build_draw_list(&snapshot);
        let marker = ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Marker { at, .. } if (at.1 - 2.0).abs() < 1e-9 => Some(*at),
                _ => None,
            })
            .unwrap();
        assert!((marker.0 - 14.0).abs() < 1e-9);
    }
}
