/// Entry point and frame loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::fs::File;
use std::time::{Duration, Instant};

use env_logger::{Env, Target};

use config::GameConfig;
use sim::event::GameEvent;
use sim::level::load_level;
use sim::session::{Session, SessionConfig};
use sim::step::step;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// How long a HUD message stays up, in ticks.
const MESSAGE_TICKS: u32 = 120;

fn main() {
    let config = GameConfig::load();
    init_logging(&config);

    let level = match load_level(config.level_file.as_deref()) {
        Ok(level) => level,
        Err(e) => {
            log::error!("Level load failed: {e}");
            eprintln!("Could not load level: {e}");
            return;
        }
    };
    let mut session = match Session::new(&level, SessionConfig::from(&config)) {
        Ok(session) => session,
        Err(e) => {
            log::error!("Level rejected: {e}");
            eprintln!("Invalid level: {e}");
            return;
        }
    };

    let mut renderer = Renderer::new(&config.display);
    let release_events = match renderer.init() {
        Ok(flag) => flag,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };

    let sound = SoundEngine::new();

    let result = game_loop(&mut session, &mut renderer, sound.as_ref(), &config, release_events);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("Game error: {e}");
        eprintln!("Game error: {e}");
    }

    log::info!(
        "Session ended after {} ticks, {}/{} coins",
        session.tick,
        session.world.coins_collected(),
        session.world.coins_total,
    );
    println!();
    println!("Thanks for playing Skyhop!");
    println!("Coins: {}/{}", session.world.coins_collected(), session.world.coins_total);
}

/// The terminal is in raw alternate-screen mode while playing, so log
/// records go to a file. `RUST_LOG` overrides the default `info` filter.
/// Returns whether logging is active; failures are reported on stderr.
fn init_logging(config: &GameConfig) -> bool {
    let file = match File::create(&config.log_file) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: could not open log file {}: {e}", config.log_file.display());
            eprintln!("Continuing without logging.");
            return false;
        }
    };
    if let Err(e) = env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()
    {
        eprintln!("Warning: logger init failed: {e}");
        eprintln!("Continuing without logging.");
        return false;
    }
    true
}

fn game_loop(
    session: &mut Session,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
    release_events: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = release_events;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let tick_rate = config.tick_duration();
    let mut last_tick = Instant::now();
    let mut message = String::new();
    let mut message_timer: u32 = 0;

    loop {
        kb.drain_events();
        gp.update();

        if kb.quit_requested() {
            break;
        }

        if last_tick.elapsed() >= tick_rate {
            let input = kb.take_frame(&gp);
            gp.clear_edges();
            if input.quit {
                break;
            }

            let events = step(session, input);
            process_sound_events(sound, &events);

            if events.contains(&GameEvent::AllCoinsCollected) {
                message = "All coins collected!".to_string();
                message_timer = MESSAGE_TICKS;
            }
            if message_timer > 0 {
                message_timer -= 1;
                if message_timer == 0 { message.clear(); }
            }

            last_tick = Instant::now();
        }

        renderer.render(&session.snapshot(), &message)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

fn process_sound_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::CoinCollected { .. } => sfx.play_coin(),
            GameEvent::AllCoinsCollected => sfx.play_all_coins(),
            GameEvent::PlayerJumped => sfx.play_jump(),
            GameEvent::PlayerLanded => sfx.play_land(),
            GameEvent::EnemyReversed { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_logging_to(path: std::path::PathBuf) -> GameConfig {
        GameConfig { log_file: path, ..GameConfig::default() }
    }

    #[test]
    fn unwritable_log_file_disables_logging() {
        let cfg = config_logging_to("/definitely/not/here/skyhop.log".into());
        assert!(!init_logging(&cfg));
    }

    #[test]
    fn second_logger_init_is_reported() {
        let cfg = config_logging_to(std::env::temp_dir().join("skyhop-test.log"));
        init_logging(&cfg);
        // The global logger is already set after the first call.
        assert!(!init_logging(&cfg));
    }
}
