use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Parser;
use color_eyre::Result;
use crossterm::event::KeyEventKind;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sysdash::app::App;
use sysdash::config::{self, Config};
use sysdash::event::{Event, EventHandler, spawn_sampler};
use sysdash::metrics::source::SystemCounterSource;
use sysdash::metrics::{ResetPolicy, SampleCollector};
use sysdash::ui;

#[derive(Parser)]
#[command(
    name = "sysdash",
    about = "Terminal system-health dashboard with live CPU, disk and network charts"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling period in milliseconds
    #[arg(long)]
    sample_rate: Option<u64>,

    /// Minimum interval between redraws in milliseconds
    #[arg(long)]
    render_throttle: Option<u64>,

    /// Color support: auto, 256, truecolor, mono
    #[arg(long)]
    color: Option<String>,

    /// Write structured logs to this file (the TUI owns stdout)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    init_tracing(cli.log_file.as_deref())?;

    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let result = run(&mut terminal, config).await;

    ratatui::restore();

    result
}

async fn run(terminal: &mut ratatui::DefaultTerminal, config: Config) -> Result<()> {
    // The render heartbeat runs faster than the throttle so a coalesced
    // request is served soon after its window opens.
    let render_tick = Duration::from_millis((config.general.render_throttle_ms / 2).clamp(50, 1000));
    let mut app = App::new(&config);
    let mut events = EventHandler::new(render_tick);

    let collector = SampleCollector::new(
        Box::new(SystemCounterSource::new()),
        ResetPolicy::from_str_config(&config.sampling.reset_policy),
    );
    let sampler = spawn_sampler(
        collector,
        Duration::from_millis(config.general.sample_rate_ms.max(100)),
        Duration::from_millis(config.sampling.read_timeout_ms.max(50)),
        events.sender(),
    );

    terminal.draw(|frame| ui::draw(frame, &app))?;

    while app.running {
        let Some(event) = events.next().await else {
            break;
        };
        match event {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Press {
                    let action = app.map_key(key);
                    app.dispatch(action);
                }
            }
            Event::Resize => app.gate.request(),
            Event::Samples(summary) => app.apply_samples(summary),
            Event::Render => {
                if app.should_render(Instant::now())
                    && let Err(err) = terminal.draw(|frame| ui::draw(frame, &app))
                {
                    // Surface not ready (e.g. mid-teardown): skip this pass
                    // and retry on the next allowed tick.
                    warn!("draw failed, retrying next tick: {err}");
                    app.gate.request();
                }
            }
        }
    }

    sampler.abort();
    Ok(())
}

fn load_config_for_cli(cli: &Cli) -> Config {
    let mut config = match &cli.config {
        Some(path) => config::load_config_from_path(path),
        None => config::load_config(),
    };

    if let Some(rate) = cli.sample_rate {
        config.general.sample_rate_ms = rate;
    }
    if let Some(throttle) = cli.render_throttle {
        config.general.render_throttle_ms = throttle;
    }
    if let Some(ref support) = cli.color {
        config.general.color_support = support.clone();
    }

    config
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    let make_writer = move || file.try_clone().expect("failed to clone log file handle");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(make_writer)
        .init();
    Ok(())
}
