//! Command line configuration.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser};
use tracing::Level;

use crate::types::{Action, Key};

/// Runtime configuration of the application.
///
/// Every field has a default, so running without arguments opens the bundled maze.
#[derive(Clone, Debug, Parser)]
#[command(version, about)]
pub struct Config {
    /// Start from an empty walled grid with this many rows instead of the bundled maze.
    #[arg(long, requires = "cols")]
    pub rows: Option<usize>,
    /// Start from an empty walled grid with this many columns instead of the bundled maze.
    #[arg(long, requires = "rows")]
    pub cols: Option<usize>,
    /// Milliseconds between two automatic search levels.
    #[arg(long, default_value_t = 120)]
    pub cadence_ms: u64,
    /// Milliseconds the found path stays on screen before the agent starts walking.
    #[arg(long, default_value_t = 800)]
    pub linger_ms: u64,
    /// Agent speed in cells per second. Must be a finite number above zero.
    #[arg(long, default_value_t = 6.0, value_parser = parse_velocity)]
    pub velocity: f64,
    /// Write logs to this file. Nothing is logged otherwise, since the terminal is in use.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
    /// Most verbose level written to the log file.
    #[arg(long, default_value_t = Level::INFO)]
    pub log_level: Level,
    /// Key bindings.
    #[command(flatten)]
    pub keymap: Keymap,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rows: None,
            cols: None,
            cadence_ms: 120,
            linger_ms: 800,
            velocity: 6.0,
            log_file: None,
            log_level: Level::INFO,
            keymap: Keymap::default(),
        }
    }
}

impl Config {
    /// Returns the time between two automatic search levels.
    pub const fn cadence(&self) -> Duration {
        Duration::from_millis(self.cadence_ms)
    }

    /// Returns the time the found path stays on screen before the agent starts walking.
    pub const fn linger(&self) -> Duration {
        Duration::from_millis(self.linger_ms)
    }
}

/// Returns whether an agent moving at `velocity` cells per second ever reaches its target.
pub fn is_valid_velocity(velocity: f64) -> bool {
    velocity.is_finite() && velocity > 0.0
}

/// Parses the `--velocity` argument, rejecting speeds the agent could never arrive with.
fn parse_velocity(value: &str) -> Result<f64, String> {
    let velocity: f64 = value
        .parse()
        .map_err(|err| format!("`{value}` is not a number: {err}"))?;

    if is_valid_velocity(velocity) {
        Ok(velocity)
    } else {
        Err(format!("`{value}` is not a finite speed above zero"))
    }
}

/// Letter keys bound to user actions.
///
/// Enter, escape and the arrow keys are fixed: they start solving, abort, and move the design
/// cursor. The `hjkl` keys move the cursor as well unless they are bound to something else.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Args)]
pub struct Keymap {
    /// Key that expands one search level.
    #[arg(long, default_value_t = 'n')]
    pub advance_key: char,
    /// Key that toggles automatic search expansion.
    #[arg(long, default_value_t = 'p')]
    pub play_key: char,
    /// Key that toggles the wall under the cursor.
    #[arg(long, default_value_t = 'w')]
    pub wall_key: char,
    /// Key that toggles the exit under the cursor.
    #[arg(long, default_value_t = 'e')]
    pub exit_key: char,
    /// Key that moves the agent's start to the cursor.
    #[arg(long, default_value_t = 's')]
    pub start_key: char,
    /// Key that quits the application.
    #[arg(long, default_value_t = 'q')]
    pub quit_key: char,
}

impl Default for Keymap {
    fn default() -> Self {
        Self {
            advance_key: 'n',
            play_key: 'p',
            wall_key: 'w',
            exit_key: 'e',
            start_key: 's',
            quit_key: 'q',
        }
    }
}

impl Keymap {
    /// Returns the action bound to a key.
    pub fn action(&self, key: Key) -> Option<Action> {
        match key {
            Key::Enter => Some(Action::StartSolving),
            Key::Esc => Some(Action::Abort),
            Key::Up => Some(Action::CursorUp),
            Key::Down => Some(Action::CursorDown),
            Key::Left => Some(Action::CursorLeft),
            Key::Right => Some(Action::CursorRight),
            Key::Char(ch) => self.char_action(ch),
        }
    }

    /// Returns the action bound to a character key.
    fn char_action(&self, ch: char) -> Option<Action> {
        let bindings = [
            (self.quit_key, Action::Quit),
            (self.advance_key, Action::Advance),
            (self.play_key, Action::TogglePlay),
            (self.wall_key, Action::ToggleWall),
            (self.exit_key, Action::ToggleExit),
            (self.start_key, Action::PlaceStart),
            ('k', Action::CursorUp),
            ('j', Action::CursorDown),
            ('h', Action::CursorLeft),
            ('l', Action::CursorRight),
        ];

        bindings
            .into_iter()
            .find_map(|(bound, action)| (bound == ch).then_some(action))
    }
}
