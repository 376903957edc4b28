/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod sim;
mod ui;

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use config::GameConfig;
use domain::classify::validate_tables;
use error::AppError;
use sim::controller::Controller;
use sim::event::ScreenEvent;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Four trials in the terminal. Your answers decide your visa.
#[derive(Parser, Debug)]
#[command(name = "borderland", version, about)]
struct Args {
    /// Read settings from this file instead of searching for config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for the simulated players (overrides the config file).
    #[arg(long)]
    seed: Option<u64>,

    /// Start at the trial selection screen.
    #[arg(long)]
    skip_intro: bool,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("borderland: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load_from(path)?,
        None => GameConfig::load(),
    };

    init_logging(&config)?;
    for warning in &config.warnings {
        tracing::warn!("{warning}");
    }

    validate_tables()?;

    let seed = args
        .seed
        .or(config.general.seed)
        .unwrap_or_else(rand::random::<u64>);
    let skip_intro = args.skip_intro || config.general.skip_intro;
    tracing::info!(seed, skip_intro, tick_rate_ms = config.speed.tick_rate_ms, "starting");

    let mut controller = Controller::new(seed, skip_intro)?;

    let mut renderer = Renderer::new();
    renderer.init()?;

    let sound = SoundEngine::new();

    let result = game_loop(&mut controller, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    result?;

    println!();
    match controller.result() {
        Some(r) => println!("Last trial: {} ({}/200). Seed {seed}.", r.profile(), r.score()),
        None => println!("No trial finished. Seed {seed}."),
    }
    tracing::info!("exit");
    Ok(())
}

/// Log to a file: the terminal is busy with the alternate screen.
/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &GameConfig) -> Result<(), AppError> {
    let path = &config.general.log_file;
    let file = File::create(path).map_err(|source| AppError::LogFile {
        path: path.clone(),
        source,
    })?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(AppError::Log)
}

fn game_loop(
    controller: &mut Controller,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> Result<(), AppError> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let mut events: Vec<ScreenEvent> = Vec::with_capacity(16);

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() {
            tracing::info!("interrupted");
            break;
        }

        for cmd in kb.commands().into_iter().chain(gp.commands()) {
            controller.command(cmd, &mut events)?;
        }

        if last_tick.elapsed() >= tick_rate {
            if controller.continuous_input() {
                if let Some(dir) = kb.repeat_direction().or_else(|| gp.repeat_direction()) {
                    controller.command(dir, &mut events)?;
                }
            }
            controller.tick(config.speed.tick_rate_ms, &mut events)?;
            last_tick = Instant::now();
        }

        process_sound_events(sound, &events);
        events.clear();

        if controller.should_quit() {
            break;
        }

        renderer.render(controller, gp.connected)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[ScreenEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            ScreenEvent::AmbientStart => sfx.play_ambient(),
            ScreenEvent::Beam { index, total } => sfx.play_beam(*index, *total),
            ScreenEvent::Hit => sfx.play_hit(),
            ScreenEvent::Miss => sfx.play_miss(),
            ScreenEvent::Cue => sfx.play_cue(),
            ScreenEvent::Completed => sfx.play_complete(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_parse() {
        let args = Args::try_parse_from(["borderland", "--seed", "7", "--skip-intro"]).unwrap();
        assert_eq!(args.seed, Some(7));
        assert!(args.skip_intro);
        assert!(args.config.is_none());
    }

    #[test]
    fn bad_seed_is_rejected() {
        assert!(Args::try_parse_from(["borderland", "--seed", "soon"]).is_err());
    }
}
