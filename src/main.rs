#![forbid(unsafe_code)]

mod category;
mod cli;
mod color;
mod config;
mod constants;
mod engine;
mod hotkeys;
mod input;
mod persistence;
mod poi;
mod render;
mod style;
mod types;
mod x11_utils;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Command};
use color::Rgb;
use config::ConfigStore;
use constants::timing;
use engine::OverlayEngine;
use hotkeys::EvdevKeyboard;
use persistence::{load_required_json, DataPaths};
use poi::Dataset;
use render::{Frame, LogSurface, OverlaySurface};
use style::build_type_specs;
use x11_utils::X11Pointer;

fn init_logging() -> Result<()> {
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Keyboards are optional: without them the loop runs with no keys pressed
fn open_keyboard() -> Option<EvdevKeyboard> {
    if !hotkeys::check_permissions() {
        hotkeys::print_permission_error();
        return None;
    }
    match EvdevKeyboard::open() {
        Ok(keyboard) => {
            info!("Hotkey support enabled (` Tab H 1-4, Ctrl+Alt+Shift+Delete)");
            Some(keyboard)
        }
        Err(e) => {
            error!(error = %e, "Failed to open keyboard devices");
            hotkeys::print_permission_error();
            None
        }
    }
}

/// Flags raised by SIGINT/SIGTERM (shutdown) and SIGHUP (reload the dataset)
#[derive(Default)]
struct SignalFlags {
    shutdown: Arc<AtomicBool>,
    reload: Arc<AtomicBool>,
}

#[cfg(unix)]
fn register_signals(flags: &SignalFlags) -> Result<()> {
    use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
    for (signal, flag) in [(SIGINT, &flags.shutdown), (SIGTERM, &flags.shutdown), (SIGHUP, &flags.reload)] {
        signal_hook::flag::register(signal, Arc::clone(flag))
            .with_context(|| format!("Failed to register handler for signal {signal}"))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn register_signals(_flags: &SignalFlags) -> Result<()> {
    Ok(())
}

fn load_dataset(path: &Path) -> Result<Dataset> {
    Dataset::from_json(load_required_json(path, "data")?)
}

fn run(mut engine: OverlayEngine, mut pointer: X11Pointer, data_path: &Path, period: Duration) -> Result<()> {
    let signals = SignalFlags::default();
    register_signals(&signals)?;

    let mut keyboard = open_keyboard();
    let mut surface = LogSurface::default();

    info!(
        period_ms = period.as_millis() as u64,
        map = %engine.current_map(),
        master_on = engine.settings().master_on,
        visible = engine.settings().visible_overlay,
        "Starting overlay loop"
    );

    let mut next = Instant::now();
    let mut last_screen_check = next;
    while !signals.shutdown.load(Ordering::Relaxed) {
        if signals.reload.swap(false, Ordering::Relaxed) {
            match load_dataset(data_path) {
                Ok(dataset) => engine.rebuild_cache(&dataset),
                Err(e) => error!(error = ?e, "Failed to reload dataset, keeping the current one"),
            }
        }
        if last_screen_check.elapsed() >= timing::SCREEN_CHECK_INTERVAL {
            last_screen_check = Instant::now();
            check_screen_size(&mut engine, &mut pointer);
        }

        let keys = keyboard.as_mut().map(EvdevKeyboard::sample).unwrap_or_default();
        engine.tick_safe(&keys, &pointer);
        surface.present(Frame::capture(&engine).as_ref());

        next += period;
        let now = Instant::now();
        if next > now {
            thread::sleep(next - now);
        } else {
            // Fell behind; don't try to catch up with a burst of ticks
            next = now;
        }
    }

    info!("Shutdown requested, saving state");
    engine.flush();
    Ok(())
}

fn check_screen_size(engine: &mut OverlayEngine, pointer: &mut X11Pointer) {
    let before = pointer.screen_size();
    match pointer.refresh_screen_size() {
        Ok(size) if size != before => {
            info!(width = size.0, height = size.1, "Display resolution changed");
            engine.set_screen_size(size.0, size.1);
        }
        Ok(_) => {}
        Err(e) => error!(error = ?e, "Failed to query display size"),
    }
}

/// One-shot action against the persisted state, without touching the display
fn apply_command(engine: &mut OverlayEngine, command: Command) {
    match command {
        Command::Run => {}
        Command::SelectMap { map } => {
            engine.switch_map(map);
        }
        Command::Scale { value, step } => {
            let applied = match (value, step) {
                (_, Some(steps)) => engine.nudge_scale(steps),
                (Some(value), None) => engine.set_global_scale(value),
                (None, None) => engine.settings().global_scale,
            };
            println!("global_scale = {applied:.2}");
        }
        Command::ToggleType { category, state } => engine.set_type_enabled(category, state.enabled()),
        Command::Color { category, r, g, b } => engine.set_type_color(category, Rgb::new(r, g, b)),
        Command::ResetColors => engine.reset_type_defaults(),
        Command::ResetHidden => engine.reset_hidden(),
        Command::Unhide { category, id } => {
            if !engine.unhide(category, &id) {
                println!("{category} '{id}' was not hidden");
            }
        }
        Command::NumSwitch { state } => engine.set_num_switch(state.enabled()),
        Command::Show => {}
    }
}

fn main() -> Result<()> {
    init_logging()?;
    let cli = Cli::parse();

    let paths = DataPaths::resolve(cli.dir, cli.data, cli.style, cli.config);
    info!(data = %paths.data.display(), style = %paths.style.display(), config = %paths.config.display(), "Resolved file locations");

    let dataset = load_dataset(&paths.data)?;
    let specs = build_type_specs(&load_required_json(&paths.style, "style")?);
    let store = ConfigStore::load(paths.config, &specs);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            let pointer = X11Pointer::connect()?;
            let engine = OverlayEngine::new(&dataset, specs, store, pointer.screen_size());
            run(engine, pointer, &paths.data, Duration::from_millis(cli.tick_ms.max(1)))
        }
        Command::Show => {
            let json = serde_json::to_string_pretty(&store.config).context("Failed to serialize config")?;
            println!("{json}");
            Ok(())
        }
        command => {
            let mut engine = OverlayEngine::new(&dataset, specs, store, (0, 0));
            apply_command(&mut engine, command);
            Ok(())
        }
    }
}
