//! Planet Defender entry point
//!
//! Runs one headless session with the autopilot at the controls and prints a
//! JSON summary when it ends.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use planet_defender::Settings;
use planet_defender::platform::{
    AutopilotInput, Clock, LogRenderer, ManualClock, SessionReport, SystemClock, run_session,
};
use planet_defender::sim::GameState;

#[derive(Parser, Debug)]
#[command(name = "planet-defender", about = "Defend the planet from timed bombs")]
struct Args {
    /// RNG seed (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// JSON settings file
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Pace frames with the wall clock instead of simulated time
    #[arg(long)]
    realtime: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Planet Defender starting...");

    let args = Args::parse();

    let mut settings = match &args.settings {
        Some(path) => match Settings::load(path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    if args.max_frames.is_some() {
        settings.max_frames = args.max_frames;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("Game initialized with seed: {}", seed);

    let mut state = GameState::new(seed);
    let mut input = AutopilotInput;
    let mut renderer = LogRenderer::new(settings.hud_interval, settings.timer_warning);

    let report = if args.realtime {
        play(&mut state, SystemClock::new(), &mut input, &mut renderer, &settings)
    } else {
        play(&mut state, ManualClock::default(), &mut input, &mut renderer, &settings)
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Failed to encode session report: {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn play<C: Clock>(
    state: &mut GameState,
    mut clock: C,
    input: &mut AutopilotInput,
    renderer: &mut LogRenderer,
    settings: &Settings,
) -> SessionReport {
    run_session(state, &mut clock, input, renderer, settings)
}
