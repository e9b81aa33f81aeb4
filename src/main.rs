//! Brick Breaker entry point
//!
//! Runs a headless game on a virtual clock with a simple autopilot on the
//! paddle, replaying simulation events onto a logging frontend, and prints
//! the final report as JSON. Pass a settings JSON path as the first
//! argument to override defaults.

#[cfg(not(target_arch = "wasm32"))]
use brick_breaker::{
    Settings,
    platform::{LogFrontend, Scheduler, present},
    sim::{GameState, Key, RandomSource},
};

/// How often the autopilot gets to press a key
#[cfg(not(target_arch = "wasm32"))]
const INPUT_POLL_MS: u64 = 25;

/// Give up after this much game time
#[cfg(not(target_arch = "wasm32"))]
const MAX_RUN_MS: u64 = 30 * 60 * 1000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Brick Breaker (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(err) => {
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => Settings::default(),
    };

    let mut state = match GameState::with_settings(settings) {
        Ok(state) => state,
        Err(err) => {
            log::error!("{err}");
            std::process::exit(1);
        }
    };
    let mut scheduler = Scheduler::new();
    let mut frontend = LogFrontend::new();
    present(state.drain_events(), &mut frontend);

    let mut now = 0;
    while !scheduler.is_halted() && now < MAX_RUN_MS {
        if frontend.is_bound(Key::Start) {
            scheduler.press(Key::Start, &mut state);
        } else if let Some(key) = autopilot(&state) {
            scheduler.press(key, &mut state);
        }
        present(state.drain_events(), &mut frontend);

        now += INPUT_POLL_MS;
        scheduler.run_until(now, &mut state);
        present(state.drain_events(), &mut frontend);
    }

    if !scheduler.is_halted() {
        log::warn!("Stopped after {} ms without finishing", now);
    }

    let report = state.report();
    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("Failed to serialize report: {err}"),
    }
}

/// Chase the primary ball's x with the paddle centre
#[cfg(not(target_arch = "wasm32"))]
fn autopilot<R: RandomSource>(state: &GameState<R>) -> Option<Key> {
    let paddle = state.paddle_bounds()?.center().x;
    let ball = state.ball_bounds()?.center().x;
    let slack = state.settings.paddle_step / 2.0;
    if ball < paddle - slack {
        Some(Key::Left)
    } else if ball > paddle + slack {
        Some(Key::Right)
    } else {
        None
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser frontend; the library is the deliverable on wasm
}
