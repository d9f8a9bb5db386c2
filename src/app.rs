//! Core application state and the frame loop.

use std::time::{Duration, Instant};

use color_eyre::eyre::{ensure, Result};
use ratatui::{layout::Rect, DefaultTerminal};
use tracing::{debug, info};

use crate::{
    agent::Agent,
    config::{is_valid_velocity, Config},
    controller::{Context, ModeController},
    events,
    maze::{Maze, DEFAULT_LAYOUT},
    pathfinding::SearchState,
    types::{Action, InputEvent},
    ui,
};

/// Application state container.
///
/// This structure owns everything the mode controller works on. The controller only ever sees a
/// [`Context`] borrowing these fields for the duration of one call, so the maze outlives the
/// search and the agent that refer to its cells.
pub struct App {
    /// Application exit flag.
    ///
    /// This field is set when the user presses the quit key. The frame loop checks it before
    /// every frame.
    pub(crate) exit: bool,
    /// The maze being edited, searched and walked.
    pub(crate) maze: Maze,
    /// The agent walking from its home cell to the exit.
    pub(crate) agent: Agent,
    /// Breadth-first search state, advanced in Path mode.
    pub(crate) search: SearchState,
    /// Mode state machine.
    pub(crate) controller: ModeController,
    /// Terminal area the maze was drawn in during the last frame.
    ///
    /// Mouse positions are converted into maze space relative to this area.
    pub(crate) viewport: Rect,
}

impl App {
    /// Creates the application from its configuration.
    ///
    /// With both `rows` and `cols` set, the maze is an empty walled grid of that size; otherwise
    /// it is the bundled layout. The agent starts on the entry cell.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - The agent's velocity is not a finite number above zero
    /// - [`crate::error::LayoutError`]: the maze cannot be built
    pub fn new(config: &Config) -> Result<Self> {
        ensure!(
            is_valid_velocity(config.velocity),
            "agent velocity must be a finite number above zero, got {}",
            config.velocity
        );
        let (maze, home) = match (config.rows, config.cols) {
            (Some(rows), Some(cols)) => Maze::walled(rows, cols)?,
            _ => Maze::parse(DEFAULT_LAYOUT)?,
        };
        let agent = Agent::new(home, &maze, config.velocity);
        let controller = ModeController::new(config, &agent);

        let (rows, cols) = maze.dimension();
        info!(rows, cols, start = home, exit = ?maze.exit(), "maze loaded");

        Ok(Self {
            exit: false,
            maze,
            agent,
            search: SearchState::default(),
            controller,
            viewport: Rect::default(),
        })
    }

    /// Runs the main loop of the application.
    ///
    /// Each iteration writes the marks of the active mode, draws the frame, handles at most one
    /// terminal event, and advances the active mode by the time elapsed since the previous
    /// iteration. The loop continues until the exit flag is set.
    ///
    /// # Errors
    ///
    /// - [`std::io::Error`] if the terminal cannot be drawn to or read from
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let mut last_frame = Instant::now();

        while !self.exit {
            self.prepare_frame();
            let _ = terminal
                .try_draw(|frame| ui::draw(self, frame).map_err(std::io::Error::other))?;
            events::handle_events(self)?;

            let now = Instant::now();
            self.tick(now.saturating_duration_since(last_frame));
            last_frame = now;
        }

        info!("quitting");

        Ok(())
    }

    /// Forwards one input event to the active mode.
    ///
    /// The quit key is handled here since it applies to every mode. Rejected mode changes are not
    /// fatal: the controller keeps them as a notice for the status line.
    pub(crate) fn dispatch(&mut self, input: InputEvent) {
        if let InputEvent::KeyPressed(key) = input {
            if self.controller.keymap().action(key) == Some(Action::Quit) {
                self.exit = true;
                return;
            }
        }

        let mut ctx = Context {
            maze: &mut self.maze,
            agent: &mut self.agent,
            search: &mut self.search,
        };
        if let Err(err) = self.controller.process_event(&mut ctx, input) {
            debug!(%err, ?input, "input rejected");
        }
    }

    /// Polls held input and advances the active mode by `delta`.
    pub(crate) fn tick(&mut self, delta: Duration) {
        let mut ctx = Context {
            maze: &mut self.maze,
            agent: &mut self.agent,
            search: &mut self.search,
        };
        self.controller.check_input(&mut ctx);
        if let Err(err) = self.controller.update(&mut ctx, delta) {
            debug!(%err, "automatic mode change rejected");
        }
    }

    /// Writes the marks of the active mode into the maze before rendering.
    pub(crate) fn prepare_frame(&mut self) {
        let mut ctx = Context {
            maze: &mut self.maze,
            agent: &mut self.agent,
            search: &mut self.search,
        };
        self.controller.draw(&mut ctx);
    }
}
