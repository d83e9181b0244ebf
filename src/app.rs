use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::error;

use crate::action::Action;
use crate::chart::{ChartConfig, RedrawGate};
use crate::config::Config;
use crate::metrics::collector::TickSummary;
use crate::metrics::registry::{Channel, EntityClass, SeriesCapacities};
use crate::metrics::EntityRegistry;
use crate::ui::theme::{resolve_color_support, ColorSupport, Theme};

/// Aggregate-CPU sparkline length in the header.
const CPU_SPARKLINE_CAPACITY: usize = 60;

pub struct App {
    pub running: bool,
    pub paused: bool,
    /// Single-writer arena for all entities and their buffers. Only
    /// `apply_samples` mutates it; rendering reads between appends.
    pub registry: EntityRegistry,
    pub charts: Vec<ChartConfig>,
    pub selected_chart: usize,
    pub show_detail: bool,
    pub gate: RedrawGate,
    pub theme: Theme,
    pub color_support: ColorSupport,
    pub memory_total: u64,
    pub memory_used: u64,
    pub cpu_mean_history: VecDeque<u64>,
    pub disk_read_total: u64,
    pub disk_write_total: u64,
    pub last_sample_secs: f64,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let color_support = resolve_color_support(&config.general.color_support);
        let theme = Theme::from_config(&config.colors, color_support);
        let registry = EntityRegistry::new(
            theme.palette.len(),
            SeriesCapacities {
                cpu: config.charts.cpu_points,
                disk: config.charts.disk_points,
                network: config.charts.network_points,
            },
        );
        let charts = vec![
            ChartConfig {
                title: "CPU Cores",
                class: EntityClass::Cpu,
                capacity: config.charts.cpu_points,
                unit: "%",
            },
            ChartConfig {
                title: "Disk IOPS",
                class: EntityClass::Disk,
                capacity: config.charts.disk_points,
                unit: "IOPS",
            },
            ChartConfig {
                title: "Network",
                class: EntityClass::Network,
                capacity: config.charts.network_points,
                unit: "Mbps",
            },
        ];

        Self {
            running: true,
            paused: false,
            registry,
            charts,
            selected_chart: 0,
            show_detail: false,
            gate: RedrawGate::new(Duration::from_millis(config.general.render_throttle_ms)),
            theme,
            color_support,
            memory_total: 0,
            memory_used: 0,
            cpu_mean_history: VecDeque::with_capacity(CPU_SPARKLINE_CAPACITY),
            disk_read_total: 0,
            disk_write_total: 0,
            last_sample_secs: 0.0,
        }
    }

    pub fn map_key(&self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        match key.code {
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Esc => {
                if self.show_detail {
                    Action::ToggleDetail
                } else {
                    Action::Quit
                }
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => Action::SelectPrevChart,
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => Action::SelectNextChart,
            KeyCode::Char('d') => Action::ToggleDetail,
            KeyCode::Char('p') => Action::TogglePause,
            _ => Action::None,
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::Quit => self.running = false,
            Action::SelectPrevChart => {
                let n = self.charts.len();
                self.selected_chart = (self.selected_chart + n - 1) % n;
            }
            Action::SelectNextChart => {
                self.selected_chart = (self.selected_chart + 1) % self.charts.len();
            }
            Action::ToggleDetail => self.show_detail = !self.show_detail,
            Action::TogglePause => self.paused = !self.paused,
            Action::None => return,
        }
        self.gate.request();
    }

    /// Registry-owner side of the pipeline: registers newly observed
    /// entities first, then appends their rates. Runs on the main loop; the
    /// sampler never touches the registry directly.
    pub fn apply_samples(&mut self, summary: TickSummary) {
        if self.paused {
            // Charts freeze at their last values; history is kept.
            return;
        }
        self.last_sample_secs = summary.at_secs;
        if let Some(mem) = summary.memory {
            self.memory_total = mem.total;
            self.memory_used = mem.used;
        }
        if summary.disk_read_total > 0 || summary.disk_write_total > 0 {
            self.disk_read_total = summary.disk_read_total;
            self.disk_write_total = summary.disk_write_total;
        }

        for (key, class) in &summary.seen {
            self.registry.ensure_entity(key, *class, summary.at_secs);
        }

        let mut usage_sum = 0.0;
        let mut usage_count = 0usize;
        for rate in &summary.rates {
            if rate.channel == Channel::Usage {
                usage_sum += rate.point.value;
                usage_count += 1;
            }
            if let Err(err) = self.registry.append_rate(&rate.entity, rate.channel, rate.point) {
                debug_assert!(false, "sampler sequencing bug: {err}");
                error!("dropping rate point: {err}");
            }
        }
        if usage_count > 0 {
            if self.cpu_mean_history.len() == CPU_SPARKLINE_CAPACITY {
                self.cpu_mean_history.pop_front();
            }
            self.cpu_mean_history
                .push_back((usage_sum / usage_count as f64).round() as u64);
        }

        self.gate.request();
    }

    pub fn selected_config(&self) -> &ChartConfig {
        &self.charts[self.selected_chart]
    }

    pub fn should_render(&mut self, now: Instant) -> bool {
        self.gate.try_begin(now)
    }

    pub fn cpu_mean_usage(&self) -> u64 {
        self.cpu_mean_history.back().copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::collector::{MemoryCounters, SampledRate};
    use crate::metrics::rate::RatePoint;

    fn summary_with_rate(value: f64) -> TickSummary {
        TickSummary {
            at_secs: 1.0,
            seen: vec![("cpu0".to_string(), EntityClass::Cpu)],
            rates: vec![SampledRate {
                entity: "cpu0".to_string(),
                class: EntityClass::Cpu,
                channel: Channel::Usage,
                point: RatePoint {
                    at_secs: 1.0,
                    value,
                },
            }],
            memory: Some(MemoryCounters {
                total: 1000,
                used: 400,
            }),
            disk_read_total: 0,
            disk_write_total: 0,
        }
    }

    #[test]
    fn samples_register_entities_and_fill_buffers() {
        let mut app = App::new(&Config::default());
        app.apply_samples(summary_with_rate(42.0));
        let entity = app.registry.get("cpu0").unwrap();
        assert_eq!(
            entity.buffer(Channel::Usage).unwrap().latest().unwrap().value,
            42.0
        );
        assert_eq!(app.memory_total, 1000);
        assert_eq!(app.cpu_mean_usage(), 42);
    }

    #[test]
    fn samples_request_a_redraw_through_the_gate() {
        let mut app = App::new(&Config::default());
        let t0 = Instant::now();
        assert!(!app.should_render(t0));
        app.apply_samples(summary_with_rate(10.0));
        assert!(app.should_render(t0));
    }

    #[test]
    fn paused_app_freezes_chart_state() {
        let mut app = App::new(&Config::default());
        app.apply_samples(summary_with_rate(10.0));
        app.dispatch(Action::TogglePause);
        app.apply_samples(summary_with_rate(99.0));
        let entity = app.registry.get("cpu0").unwrap();
        assert_eq!(
            entity.buffer(Channel::Usage).unwrap().latest().unwrap().value,
            10.0
        );
    }

    #[test]
    fn chart_selection_wraps_both_ways() {
        let mut app = App::new(&Config::default());
        assert_eq!(app.selected_chart, 0);
        app.dispatch(Action::SelectPrevChart);
        assert_eq!(app.selected_chart, app.charts.len() - 1);
        app.dispatch(Action::SelectNextChart);
        assert_eq!(app.selected_chart, 0);
    }

    #[test]
    fn quit_keys_stop_the_app() {
        let mut app = App::new(&Config::default());
        let action = app.map_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE));
        app.dispatch(action);
        assert!(!app.running);
    }

    #[test]
    fn escape_closes_the_detail_panel_before_quitting() {
        let mut app = App::new(&Config::default());
        app.dispatch(Action::ToggleDetail);
        let action = app.map_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(action, Action::ToggleDetail);
    }
}
