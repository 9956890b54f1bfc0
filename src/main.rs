//! Brick Breaker entry point
//!
//! Parses flags, wires the terminal renderer, audio and keyboard input into a
//! [`GameLoop`] and runs one session.

use std::io::stdout;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread::Builder;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{cursor, execute, terminal};

use brick_breaker::assets::{AssetLoader, DirectoryLoader, ProceduralLoader};
use brick_breaker::audio::{AudioManager, AudioSink, BellSink, LogSink};
use brick_breaker::game_loop::ManualClock;
use brick_breaker::input::{InputSender, Key, input_channel};
use brick_breaker::render::{NullRenderer, Renderer, TextRenderer};
use brick_breaker::{EngineError, GameConfig, GameLoop, Result};

/// Terminals that never report key releases: a held key counts as released
/// once its auto-repeat stops for this long
const HOLD_TIMEOUT: Duration = Duration::from_millis(500);

/// Classic brick breaker in the terminal. Arrow keys move, space launches,
/// Esc or Ctrl-C quits.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Load settings from a JSON file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// RNG seed for the launch angle
    #[arg(long)]
    seed: Option<u64>,
    /// Let the paddle play itself
    #[arg(long)]
    autoplay: bool,
    /// Require sprites and sounds from DIR before starting
    #[arg(long, value_name = "DIR")]
    assets: Option<PathBuf>,
    /// Don't draw anything
    #[arg(long)]
    headless: bool,
    /// Disable sound
    #[arg(long)]
    mute: bool,
    /// Master volume, 0.0 - 1.0
    #[arg(long)]
    volume: Option<f32>,
}

/// Seed from the wall clock when none is given
fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn key_for(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Char(' ') => Some(Key::Fire),
        _ => None,
    }
}

/// Restores the terminal however the session ends
struct TerminalGuard {
    screen: bool,
    raw: bool,
    enhanced: bool,
}

impl TerminalGuard {
    fn enter(screen: bool, raw: bool) -> std::io::Result<Self> {
        let mut guard = Self {
            screen: false,
            raw: false,
            enhanced: false,
        };
        if screen {
            execute!(
                stdout(),
                terminal::EnterAlternateScreen,
                cursor::Hide,
                terminal::Clear(terminal::ClearType::All)
            )?;
            guard.screen = true;
        }
        if raw {
            terminal::enable_raw_mode()?;
            guard.raw = true;
            // Ask for release events; terminals without the protocol ignore it
            guard.enhanced = execute!(
                stdout(),
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )
            .is_ok();
        }
        Ok(guard)
    }

    /// For exits that skip destructors
    fn restore() {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        let _ = terminal::disable_raw_mode();
        let _ = execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show);
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.enhanced {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
        if self.raw {
            let _ = terminal::disable_raw_mode();
        }
        if self.screen {
            let _ = execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show);
        }
    }
}

/// Forward arrow and space presses to the game as key-down/key-up events
fn spawn_key_listener(sender: InputSender) -> std::io::Result<()> {
    Builder::new()
        .name("key_listener".to_owned())
        .spawn(move || {
            let mut held: Option<(Key, Instant)> = None;
            let mut releases_reported = false;
            loop {
                match event::poll(Duration::from_millis(20)) {
                    Ok(true) => {}
                    Ok(false) => {
                        let expired = held
                            .filter(|(_, at)| !releases_reported && at.elapsed() >= HOLD_TIMEOUT)
                            .map(|(key, _)| key);
                        if let Some(key) = expired {
                            held = None;
                            if !sender.key_up(key) {
                                return;
                            }
                        }
                        continue;
                    }
                    Err(e) => {
                        log::warn!("Keyboard read failed: {e}");
                        return;
                    }
                }

                let Ok(Event::Key(key_event)) = event::read() else {
                    continue;
                };
                let quit = key_event.code == KeyCode::Esc
                    || (key_event.modifiers.contains(KeyModifiers::CONTROL)
                        && key_event.code == KeyCode::Char('c'));
                if quit {
                    TerminalGuard::restore();
                    println!("Quit");
                    std::process::exit(130);
                }

                let Some(key) = key_for(key_event.code) else {
                    continue;
                };
                let sent = match key_event.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        held = Some((key, Instant::now()));
                        sender.key_down(key)
                    }
                    KeyEventKind::Release => {
                        releases_reported = true;
                        held = None;
                        sender.key_up(key)
                    }
                };
                if !sent {
                    return;
                }
            }
        })?;
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    config.autoplay |= cli.autoplay;
    config.audio.muted |= cli.mute;
    config.validate()?;

    let seed = cli.seed.or(config.seed).unwrap_or_else(clock_seed);

    let renderer: Box<dyn Renderer> = if cli.headless {
        Box::new(NullRenderer)
    } else {
        Box::new(TextRenderer::new(stdout(), true))
    };
    let sink: Box<dyn AudioSink> = if cli.headless {
        Box::new(LogSink)
    } else {
        Box::new(BellSink)
    };
    let mut audio = AudioManager::new(sink, &config.audio);
    if let Some(volume) = cli.volume {
        audio.set_master_volume(volume);
    }

    let (sender, reader) = input_channel();
    let mut game = GameLoop::new(&config, seed, reader)?
        .with_renderer(renderer)
        .with_audio(audio);
    if cli.headless && config.autoplay {
        // Nobody is watching or playing, so don't pace frames
        game = game.with_clock(Box::new(ManualClock::new(config.timing.frame_interval())));
    }

    let loader: Box<dyn AssetLoader> = match &cli.assets {
        Some(dir) => Box::new(DirectoryLoader::new(dir)),
        None => Box::new(ProceduralLoader),
    };
    let terminal =
        TerminalGuard::enter(!cli.headless, !config.autoplay).map_err(EngineError::Terminal)?;
    game.start(loader.as_ref())?;
    if config.autoplay {
        drop(sender);
    } else {
        spawn_key_listener(sender).map_err(EngineError::Terminal)?;
    }

    let outcome = game.run()?;
    drop(terminal);
    println!("{outcome}");
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            match e {
                EngineError::InvalidConfig { .. } | EngineError::ConfigParse(_) => {
                    ExitCode::from(2)
                }
                _ => ExitCode::FAILURE,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrow_keys_and_space_map_to_game_keys() {
        assert_eq!(key_for(KeyCode::Left), Some(Key::Left));
        assert_eq!(key_for(KeyCode::Right), Some(Key::Right));
        assert_eq!(key_for(KeyCode::Char(' ')), Some(Key::Fire));
        assert_eq!(key_for(KeyCode::Char('a')), None);
        assert_eq!(key_for(KeyCode::Up), None);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "brick-breaker",
            "--seed",
            "42",
            "--autoplay",
            "--headless",
            "--volume",
            "0.5",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(42));
        assert!(cli.autoplay && cli.headless);
        assert!(!cli.mute);
        assert_eq!(cli.volume, Some(0.5));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(Cli::try_parse_from(["brick-breaker", "--seed", "many"]).is_err());
        assert!(Cli::try_parse_from(["brick-breaker", "--bogus"]).is_err());
    }
}
