//! Mode controller.
//!
//! This module contains the three-state machine that sequences maze editing, the animated search
//! and the agent's walk. The states never own the maze, the agent or the search state: the
//! application lends them through a [`Context`] for the duration of each call.

use std::time::Duration;

use ratatui::style::Color;
use tracing::{debug, info, warn};

use crate::{
    agent::Agent,
    config::{Config, Keymap},
    error::ModeError,
    maze::Maze,
    pathfinding::{PathComputer, SearchState},
    types::{Action, CellId, CellType, InputEvent, ModeId, Point, PointerButton},
};

/// Highlight of the design cursor.
pub const CURSOR_COLOR: Color = Color::Yellow;
/// Highlight of the cells visited by the search.
pub const VISITED_COLOR: Color = Color::Blue;
/// Highlight of the current search layer.
pub const FRONTIER_COLOR: Color = Color::Cyan;
/// Highlight of the found path.
pub const PATH_COLOR: Color = Color::Red;

/// Legal mode changes as `(from, to)` pairs.
///
/// This table holds the Design, Path, Run cycle plus one extra entry. Path to Design is not part
/// of that cycle: it is only reached through the abort key, and it is the way back to editing
/// from a search that cannot reach the exit.
pub const TRANSITIONS: [(ModeId, ModeId); 4] = [
    (ModeId::Design, ModeId::Path),
    (ModeId::Path, ModeId::Run),
    (ModeId::Path, ModeId::Design),
    (ModeId::Run, ModeId::Design),
];

/// Returns whether the transition table contains `from -> to`.
pub fn is_legal(from: ModeId, to: ModeId) -> bool {
    TRANSITIONS.contains(&(from, to))
}

/// Borrowed view of the application state handed to the active mode.
///
/// This structure is built by the application for a single call and dropped right after, so the
/// modes can edit the maze, move the agent and advance the search without owning any of them.
pub struct Context<'ctx> {
    /// The maze being edited, searched and walked.
    pub maze: &'ctx mut Maze,
    /// The agent walking the found path.
    pub agent: &'ctx mut Agent,
    /// The breadth-first search state.
    pub search: &'ctx mut SearchState,
}

/// Maze editing state.
///
/// This structure holds the keyboard cursor and the state of an ongoing pointer drag. The maze
/// itself is only reached through the [`Context`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DesignState {
    /// Cell edited by keyboard actions.
    cursor: CellId,
    /// Type painted while the primary pointer button is held.
    drag: Option<CellType>,
    /// Last known pointer position.
    pointer: Option<Point>,
}

impl DesignState {
    /// Builds the editing state with the cursor on `cursor`.
    pub const fn new(cursor: CellId) -> Self {
        Self {
            cursor,
            drag: None,
            pointer: None,
        }
    }

    /// Returns the cell under the keyboard cursor.
    pub const fn cursor(&self) -> CellId {
        self.cursor
    }

    /// Returns the editable cell under the pointer.
    ///
    /// This function returns `None` when the pointer lies outside the grid or over the exit or
    /// the agent's home. Those two cells are not editable by dragging; they have their own
    /// gestures.
    pub fn pick_draggable(maze: &Maze, agent: &Agent, pointer: Point) -> Option<CellId> {
        maze.cell_num(pointer)
            .filter(|&cell| cell != agent.home() && maze.exit() != Some(cell))
    }

    /// Handles a discrete input event and returns the mode to switch to, if any.
    fn process_event(
        &mut self,
        ctx: &mut Context<'_>,
        event: InputEvent,
        keymap: &Keymap,
    ) -> Option<ModeId> {
        match event {
            InputEvent::PointerPressed {
                position,
                button: PointerButton::Primary,
            } => {
                self.pointer = Some(position);
                if let Some(cell) = ctx.maze.cell_num(position) {
                    self.cursor = cell;
                }
                self.drag = Self::pick_draggable(ctx.maze, ctx.agent, position)
                    .map(|cell| ctx.maze.cell_type(cell).toggled());
            }
            InputEvent::PointerPressed {
                position,
                button: PointerButton::Secondary,
            } => {
                if let Some(cell) = ctx.maze.cell_num(position) {
                    self.cursor = cell;
                    toggle_exit(ctx, cell);
                }
            }
            InputEvent::PointerMoved { position } => self.pointer = Some(position),
            InputEvent::PointerReleased {
                button: PointerButton::Primary,
            } => self.drag = None,
            InputEvent::PointerReleased { .. } => {}
            InputEvent::KeyPressed(key) => match keymap.action(key)? {
                Action::StartSolving => return Some(ModeId::Path),
                Action::ToggleWall => toggle_wall(ctx, self.cursor),
                Action::ToggleExit => toggle_exit(ctx, self.cursor),
                Action::PlaceStart => place_start(ctx, self.cursor),
                Action::CursorUp => self.move_cursor(ctx.maze, -1, 0),
                Action::CursorDown => self.move_cursor(ctx.maze, 1, 0),
                Action::CursorLeft => self.move_cursor(ctx.maze, 0, -1),
                Action::CursorRight => self.move_cursor(ctx.maze, 0, 1),
                Action::Advance | Action::TogglePlay | Action::Abort | Action::Quit => {}
            },
        }

        None
    }

    /// Paints the dragged type onto the cell under the pointer while the button is held.
    fn check_input(&self, ctx: &mut Context<'_>) {
        let (Some(kind), Some(pointer)) = (self.drag, self.pointer) else {
            return;
        };
        let Some(cell) = Self::pick_draggable(ctx.maze, ctx.agent, pointer) else {
            return;
        };

        if ctx.maze.cell_type(cell) != kind {
            ctx.maze.change_type(cell, kind);
            debug!(cell, ?kind, "cell painted");
        }
    }

    /// Moves the cursor by one step, staying inside the grid.
    fn move_cursor(&mut self, maze: &Maze, d_row: isize, d_col: isize) {
        let (row, col) = maze.position_of(self.cursor);
        let target = (row.checked_add_signed(d_row), col.checked_add_signed(d_col));
        if let (Some(row), Some(col)) = target {
            if let Some(cell) = maze.cell_at(row, col) {
                self.cursor = cell;
            }
        }
    }
}

/// Flips a cell between wall and corridor, leaving the exit and the agent's home alone.
fn toggle_wall(ctx: &mut Context<'_>, cell: CellId) {
    if cell == ctx.agent.home() || ctx.maze.exit() == Some(cell) {
        debug!(cell, "wall toggle ignored on the start or the exit");
        return;
    }

    let kind = ctx.maze.cell_type(cell).toggled();
    ctx.maze.change_type(cell, kind);
}

/// Makes a cell the exit, or removes the exit if the cell already is one.
fn toggle_exit(ctx: &mut Context<'_>, cell: CellId) {
    if ctx.maze.exit() == Some(cell) {
        ctx.maze.remove_exit();
        debug!(cell, "exit removed");
    } else if cell == ctx.agent.home() {
        debug!(cell, "exit cannot be placed on the start");
    } else {
        ctx.maze.set_exit(cell);
        debug!(cell, "exit placed");
    }
}

/// Moves the agent's home onto a corridor.
fn place_start(ctx: &mut Context<'_>, cell: CellId) {
    if ctx.maze.cell_type(cell) != CellType::Corridor {
        debug!(cell, "start can only be placed on a corridor");
        return;
    }

    ctx.agent.set_home(cell, ctx.maze);
    debug!(cell, "start moved");
}

/// Animated search state.
///
/// This structure holds the timers driving the search animation. The search itself lives in the
/// application's [`SearchState`] and is advanced through a [`PathComputer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathState {
    /// Time accumulated toward the next automatic level.
    elapsed: Duration,
    /// Time spent showing the found path.
    lingering: Duration,
    /// Whether levels are expanded automatically.
    auto_play: bool,
}

impl Default for PathState {
    fn default() -> Self {
        Self::new()
    }
}

impl PathState {
    /// Builds the search animation state with auto-play on.
    ///
    /// This function is called on every entry into Path mode, so each search starts with fresh
    /// timers.
    pub const fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            lingering: Duration::ZERO,
            auto_play: true,
        }
    }

    /// Returns whether levels are expanded automatically.
    pub const fn auto_play(&self) -> bool {
        self.auto_play
    }

    /// Handles a discrete input event and returns the mode to switch to, if any.
    fn process_event(
        &mut self,
        ctx: &mut Context<'_>,
        event: InputEvent,
        keymap: &Keymap,
    ) -> Option<ModeId> {
        let InputEvent::KeyPressed(key) = event else {
            return None;
        };

        match keymap.action(key)? {
            Action::Advance => {
                let _ = PathComputer::new(ctx.maze, ctx.search).next_level();
            }
            Action::TogglePlay => {
                self.auto_play = !self.auto_play;
                self.elapsed = Duration::ZERO;
            }
            Action::Abort => return Some(ModeId::Design),
            _ => {}
        }

        None
    }

    /// Expands one level per elapsed cadence and asks for Run mode once the path has been shown
    /// for `linger`.
    fn update(
        &mut self,
        ctx: &mut Context<'_>,
        delta: Duration,
        cadence: Duration,
        linger: Duration,
    ) -> Option<ModeId> {
        if ctx.search.found() {
            self.lingering = self.lingering.saturating_add(delta);
            return (self.lingering >= linger).then_some(ModeId::Run);
        }
        if !self.auto_play || ctx.search.is_finished() {
            return None;
        }

        self.elapsed = self.elapsed.saturating_add(delta);
        let mut computer = PathComputer::new(ctx.maze, ctx.search);
        while self.elapsed >= cadence && !computer.found() && !computer.is_exhausted() {
            self.elapsed = self.elapsed.saturating_sub(cadence);
            let _ = computer.next_level();
        }

        None
    }
}

/// The active mode and its private state.
///
/// This enumeration is closed: exactly one mode is active at any time, and only
/// [`ModeController::transition`] replaces it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    /// Maze editing.
    Design(DesignState),
    /// Animated breadth-first search.
    Path(PathState),
    /// Agent walking the found path.
    Run,
}

impl Mode {
    /// Returns the identifier of the mode.
    pub const fn id(&self) -> ModeId {
        match self {
            Self::Design(_) => ModeId::Design,
            Self::Path(_) => ModeId::Path,
            Self::Run => ModeId::Run,
        }
    }
}

/// Dispatches per-frame calls to the active mode and performs mode changes.
///
/// This structure is the only owner of the active [`Mode`]. The application calls
/// [`ModeController::process_event`] for every input event, then [`ModeController::check_input`],
/// [`ModeController::update`] and [`ModeController::draw`] once per frame.
#[derive(Clone, Debug)]
pub struct ModeController {
    /// The active mode.
    mode: Mode,
    /// Key bindings.
    keymap: Keymap,
    /// Time between two automatic search levels.
    cadence: Duration,
    /// Time the found path is shown before the agent walks it.
    linger: Duration,
    /// Last rejected mode change, cleared by the next successful one.
    notice: Option<ModeError>,
}

impl ModeController {
    /// Builds a controller in Design mode with the cursor on the agent's home.
    ///
    /// This function copies the key bindings and the animation timings out of the configuration.
    pub fn new(config: &Config, agent: &Agent) -> Self {
        Self {
            mode: Mode::Design(DesignState::new(agent.home())),
            keymap: config.keymap,
            cadence: config.cadence(),
            linger: config.linger(),
            notice: None,
        }
    }

    /// Returns the active mode.
    pub const fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Returns the identifier of the active mode.
    pub const fn mode_id(&self) -> ModeId {
        self.mode.id()
    }

    /// Returns the last rejected mode change.
    ///
    /// This function returns the error of the most recent failed transition until a later
    /// transition succeeds. The status line shows it to the user.
    pub const fn notice(&self) -> Option<&ModeError> {
        self.notice.as_ref()
    }

    /// Returns the key bindings.
    pub const fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    /// Routes a discrete input event to the active mode.
    ///
    /// This function lets the active mode react to the event and performs the mode change it
    /// requests, if any. Events that mean nothing in the active mode are ignored.
    ///
    /// # Errors
    ///
    /// This function returns the [`ModeError`] of a mode change requested by the event and
    /// rejected. The active mode is unchanged in that case.
    pub fn process_event(
        &mut self,
        ctx: &mut Context<'_>,
        event: InputEvent,
    ) -> Result<(), ModeError> {
        let request = match &mut self.mode {
            Mode::Design(state) => state.process_event(ctx, event, &self.keymap),
            Mode::Path(state) => state.process_event(ctx, event, &self.keymap),
            Mode::Run => match event {
                InputEvent::KeyPressed(key) => self
                    .keymap
                    .action(key)
                    .filter(|&action| action == Action::Abort)
                    .map(|_| ModeId::Design),
                _ => None,
            },
        };

        self.request(ctx, request)
    }

    /// Polls held input.
    ///
    /// This function only matters in Design mode, where a held primary button keeps painting the
    /// cell under the pointer.
    pub fn check_input(&self, ctx: &mut Context<'_>) {
        if let Mode::Design(state) = &self.mode {
            state.check_input(ctx);
        }
    }

    /// Advances the active mode by `delta`.
    ///
    /// This function expands search levels at the configured cadence in Path mode and moves the
    /// agent in Run mode. It performs the automatic changes to Run mode once the path has lingered
    /// on screen, and back to Design mode once the agent arrives.
    ///
    /// # Errors
    ///
    /// This function returns the [`ModeError`] of an automatic mode change that was rejected.
    pub fn update(&mut self, ctx: &mut Context<'_>, delta: Duration) -> Result<(), ModeError> {
        let request = match &mut self.mode {
            Mode::Design(_) => None,
            Mode::Path(state) => state.update(ctx, delta, self.cadence, self.linger),
            Mode::Run => ctx
                .agent
                .update(delta, ctx.maze)
                .then_some(ModeId::Design),
        };

        self.request(ctx, request)
    }

    /// Writes the marks the renderer needs for the active mode into the maze.
    ///
    /// This function clears every mark first. Design mode then marks the cursor, Path mode marks
    /// the visited levels, the frontier and the found path, and Run mode marks the remaining
    /// waypoints.
    pub fn draw(&self, ctx: &mut Context<'_>) {
        ctx.maze.clear_marks();

        match &self.mode {
            Mode::Design(state) => ctx.maze.mark_cells([state.cursor], CURSOR_COLOR),
            Mode::Path(_) => {
                ctx.maze.mark_levels(ctx.search.level(), VISITED_COLOR);
                ctx.maze
                    .mark_cells(ctx.search.frontier().iter().copied(), FRONTIER_COLOR);
                ctx.maze
                    .mark_cells(ctx.search.path().iter().copied(), PATH_COLOR);
            }
            Mode::Run => ctx
                .maze
                .mark_cells(ctx.agent.waypoints().iter().copied(), PATH_COLOR),
        }
    }

    /// Switches to another mode if the transition table allows it.
    ///
    /// This function records the outcome as the notice and logs it. Entering Path mode starts a search from the agent's home to the exit. Entering Run mode
    /// hands the found path to the agent. Entering Design mode discards the search and puts the
    /// agent back home.
    ///
    /// # Errors
    ///
    /// This function may return errors if:
    /// - [`ModeError::InvalidTransition`]: the change is not in [`TRANSITIONS`], or Run mode is
    ///   requested before the path is found
    /// - [`ModeError::MissingExit`]: Path mode is requested on a maze without an exit
    /// - [`ModeError::Search`]: the pathfinder rejects the start or the exit
    pub fn transition(&mut self, ctx: &mut Context<'_>, to: ModeId) -> Result<(), ModeError> {
        let from = self.mode_id();
        let result = self.switch(ctx, to);

        match result {
            Ok(()) => {
                self.notice = None;
                info!(%from, %to, "mode changed");
            }
            Err(err) => {
                self.notice = Some(err);
                warn!(%from, %to, %err, "mode change rejected");
            }
        }

        result
    }

    /// Forwards an optional mode request to [`ModeController::transition`].
    fn request(&mut self, ctx: &mut Context<'_>, request: Option<ModeId>) -> Result<(), ModeError> {
        request.map_or(Ok(()), |to| self.transition(ctx, to))
    }

    /// Performs a mode change without bookkeeping.
    fn switch(&mut self, ctx: &mut Context<'_>, to: ModeId) -> Result<(), ModeError> {
        let from = self.mode_id();
        if !is_legal(from, to) {
            return Err(ModeError::InvalidTransition { from, to });
        }

        match to {
            ModeId::Path => {
                let exit = ctx.maze.exit().ok_or(ModeError::MissingExit)?;
                PathComputer::new(ctx.maze, ctx.search).reset(ctx.agent.home(), exit)?;
                self.mode = Mode::Path(PathState::new());
            }
            ModeId::Run => {
                if !ctx.search.found() {
                    return Err(ModeError::InvalidTransition { from, to });
                }
                let path = ctx.search.path().to_vec();
                ctx.search.clear();
                ctx.agent.follow_path(&path);
                self.mode = Mode::Run;
            }
            ModeId::Design => {
                ctx.search.clear();
                let home = ctx.agent.home();
                ctx.agent.place(home, ctx.maze);
                self.mode = Mode::Design(DesignState::new(home));
            }
        }

        Ok(())
    }
}
