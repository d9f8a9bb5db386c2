//! User interface rendering for the maze and the status line.

use color_eyre::eyre::{OptionExt as _, Result};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph},
    Frame,
};

use crate::{
    config::Keymap,
    controller::Mode,
    types::{CellId, CellType},
    App,
};

/// Terminal columns used by one maze cell, so cells look roughly square.
pub(crate) const CELL_WIDTH: u16 = 2;

/// Background of wall cells.
const WALL_COLOR: Color = Color::Green;

/// Background of the exit cell.
const EXIT_COLOR: Color = Color::Magenta;

/// Renders the maze and the status block, and records where the maze was drawn.
///
/// The recorded viewport is what mouse positions are measured against on the next event.
///
/// # Errors
///
/// This function may return errors if the maze dimensions do not fit in a terminal coordinate or
/// the layout does not produce the expected areas.
pub(crate) fn draw(app: &mut App, frame: &mut Frame) -> Result<()> {
    frame.render_widget(Clear, frame.area());

    let (rows, cols) = app.maze.dimension();
    let width = u16::try_from(cols)?.saturating_mul(CELL_WIDTH);
    let height = u16::try_from(rows)?;

    let overall_layout =
        Layout::vertical([Constraint::Min(1), Constraint::Length(4)]).split(frame.area());
    let maze_content_area = *overall_layout
        .first()
        .ok_or_eyre("failed to get maze content area from layout")?;
    let status_area = *overall_layout
        .last()
        .ok_or_eyre("failed to get status area from layout")?;

    let maze_area = centered(maze_content_area, width, height)?;
    app.viewport = maze_area;

    frame.render_widget(Paragraph::new(maze_lines(app)), maze_area);
    status(app, frame, status_area);

    Ok(())
}

/// Returns an area of at most `width` by `height` centered inside `area`.
fn centered(area: Rect, width: u16, height: u16) -> Result<Rect> {
    let row = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .split(area)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get maze row from vertical layout")?;

    Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(width),
        Constraint::Min(0),
    ])
    .split(row)
    .get(1)
    .copied()
    .ok_or_eyre("failed to get maze area from horizontal layout")
}

/// Builds one line of spans per maze row.
fn maze_lines(app: &App) -> Vec<Line<'static>> {
    let (rows, cols) = app.maze.dimension();
    let agent_cell = app.maze.cell_num(app.agent.position());

    (0..rows)
        .map(|row| {
            (0..cols)
                .filter_map(|col| app.maze.cell_at(row, col))
                .map(|id| cell_span(app, id, agent_cell))
                .collect::<Line<'static>>()
        })
        .collect()
}

/// Builds the span drawn for one cell.
///
/// The agent is drawn over everything else. Marks replace the background of the cell type and
/// show their level label, if any.
fn cell_span(app: &App, id: CellId, agent_cell: Option<CellId>) -> Span<'static> {
    let kind = app.maze.cell_type(id);
    let mut style = match kind {
        CellType::Wall => Style::default().bg(WALL_COLOR),
        CellType::Exit => Style::default().bg(EXIT_COLOR).fg(Color::White),
        CellType::Corridor => Style::default(),
    };
    let mut text = match kind {
        CellType::Exit => "<>".to_owned(),
        CellType::Wall | CellType::Corridor => "  ".to_owned(),
    };

    if let Some(mark) = app.maze.mark(id) {
        style = style.bg(mark.color).fg(Color::Black);
        if let Some(level) = mark.level {
            text = format!("{:>2}", level % 100);
        }
    }

    if agent_cell == Some(id) {
        text = format!("{} ", app.agent.glyph());
        style = style.fg(Color::White).add_modifier(Modifier::BOLD);
    } else if id == app.agent.home() && kind == CellType::Corridor && app.maze.mark(id).is_none()
    {
        text = "()".to_owned();
        style = style.fg(Color::DarkGray);
    }

    Span::styled(text, style)
}

/// Renders the status block: the active mode, a progress line and the key hints.
fn status(app: &App, frame: &mut Frame, area: Rect) {
    let mode = app.controller.mode();
    let block = Block::bordered()
        .title(format!(" {} mode ", mode.id()))
        .title_bottom(hints(mode, app.controller.keymap()))
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green))
        .border_type(BorderType::Rounded);

    let progress = Line::raw(progress(app)).centered();
    let notice = app.controller.notice().map_or_else(Line::default, |err| {
        Line::styled(err.to_string(), Style::default().fg(Color::Yellow)).centered()
    });

    frame.render_widget(Paragraph::new(vec![progress, notice]).block(block), area);
}

/// Describes what the active mode is doing.
fn progress(app: &App) -> String {
    match app.controller.mode() {
        Mode::Design(state) => {
            let (row, col) = app.maze.position_of(state.cursor());
            let exit = app
                .maze
                .exit()
                .map_or_else(|| "no exit".to_owned(), |exit| format!("exit {exit}"));
            format!("cursor ({row}, {col}) / start {} / {exit}", app.agent.home())
        }
        Mode::Path(state) => {
            if app.search.found() {
                format!(
                    "path found: {} steps",
                    app.search.path().len().saturating_sub(1)
                )
            } else if app.search.is_exhausted() {
                "exit unreachable".to_owned()
            } else {
                let level = app.search.level().values().max().copied().unwrap_or_default();
                let play = if state.auto_play() { "playing" } else { "paused" };
                format!(
                    "level {level} / frontier {} / {play}",
                    app.search.frontier().len()
                )
            }
        }
        Mode::Run => format!("walking / {} cells left", app.agent.waypoints().len()),
    }
}

/// Returns the key hints of a mode.
fn hints(mode: &Mode, keymap: &Keymap) -> String {
    let quit = keymap.quit_key;
    match mode {
        Mode::Design(_) => format!(
            " (enter) solve / ({}) wall / ({}) exit / ({}) start / ({quit}) quit ",
            keymap.wall_key, keymap.exit_key, keymap.start_key
        ),
        Mode::Path(_) => format!(
            " ({}) next level / ({}) play / (esc) edit / ({quit}) quit ",
            keymap.advance_key, keymap.play_key
        ),
        Mode::Run => format!(" (esc) stop / ({quit}) quit "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        error::ModeError,
        types::{InputEvent, Key},
    };
    use ratatui::{backend::TestBackend, Terminal};

    /// Creates a test terminal with known dimensions for UI testing.
    fn create_test_terminal() -> Terminal<TestBackend> {
        let backend = TestBackend::new(80, 24);
        Terminal::new(backend).expect("failed to create test terminal")
    }

    /// Creates an app on a walled 5x5 grid: start at 6, exit at 18.
    fn create_small_app() -> App {
        let config = Config {
            rows: Some(5),
            cols: Some(5),
            ..Config::default()
        };
        App::new(&config).expect("walled grid is valid")
    }

    /// Draws the app once and returns the rendered text, one string per terminal row.
    fn render(app: &mut App, terminal: &mut Terminal<TestBackend>) -> Vec<String> {
        let _ = terminal
            .draw(|frame| draw(app, frame).expect("drawing should succeed in test"))
            .expect("test backend should not fail");

        let buffer = terminal.backend().buffer();
        (0..buffer.area.height)
            .map(|row| {
                (0..buffer.area.width)
                    .filter_map(|col| buffer.cell((col, row)))
                    .map(ratatui::buffer::Cell::symbol)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_draw_default_layout() {
        let mut app = App::new(&Config::default()).expect("bundled layout is valid");
        let mut terminal = create_test_terminal();

        let screen = render(&mut app, &mut terminal);

        assert_eq!(app.viewport.width, 50, "25 cells of two columns");
        assert_eq!(app.viewport.height, 15, "one row per maze row");
        assert!(
            screen.iter().any(|line| line.contains("Design mode")),
            "status block should name the mode"
        );
        assert!(
            screen.iter().any(|line| line.contains("<>")),
            "exit should be drawn"
        );
    }

    #[test]
    fn test_draw_marks_walls_and_agent() {
        let mut app = create_small_app();
        let mut terminal = create_test_terminal();

        let _ = render(&mut app, &mut terminal);
        let viewport = app.viewport;
        let buffer = terminal.backend().buffer();

        let wall = buffer
            .cell((viewport.x, viewport.y))
            .expect("top-left wall is on screen");
        assert_eq!(wall.bg, WALL_COLOR, "walls should use the wall background");

        let agent = buffer
            .cell((viewport.x + CELL_WIDTH, viewport.y + 1))
            .expect("start cell is on screen");
        assert_eq!(agent.symbol(), "@", "idle agent glyph on its start");
    }

    #[test]
    fn test_draw_level_labels_in_path_mode() {
        let mut app = create_small_app();
        let mut terminal = create_test_terminal();

        app.dispatch(InputEvent::KeyPressed(Key::Enter));
        app.dispatch(InputEvent::KeyPressed(Key::Char('p')));
        app.dispatch(InputEvent::KeyPressed(Key::Char('n')));
        app.dispatch(InputEvent::KeyPressed(Key::Char('n')));
        app.prepare_frame();
        let screen = render(&mut app, &mut terminal);

        assert!(
            screen.iter().any(|line| line.contains("Path mode")),
            "status block should name the mode"
        );
        assert!(
            screen.iter().any(|line| line.contains("level 2 / frontier 3 / paused")),
            "progress line should show the search level"
        );
        let row = screen
            .get(usize::from(app.viewport.y) + 1)
            .expect("first interior row is on screen");
        assert!(row.contains(" 1"), "first layer should be labelled with level 1");
    }

    #[test]
    fn test_draw_notice() {
        let mut app = create_small_app();
        let mut terminal = create_test_terminal();

        // Remove the exit so solving is rejected.
        app.dispatch(InputEvent::KeyPressed(Key::Down));
        app.dispatch(InputEvent::KeyPressed(Key::Down));
        app.dispatch(InputEvent::KeyPressed(Key::Right));
        app.dispatch(InputEvent::KeyPressed(Key::Right));
        app.dispatch(InputEvent::KeyPressed(Key::Char('e')));
        app.dispatch(InputEvent::KeyPressed(Key::Enter));
        let screen = render(&mut app, &mut terminal);

        assert!(
            screen.iter().any(|line| line.contains("no exit")),
            "progress line should report the missing exit"
        );
        assert!(
            screen
                .iter()
                .any(|line| line.contains(&ModeError::MissingExit.to_string())),
            "rejected transition should be shown"
        );
    }

    #[test]
    fn test_draw_large_maze_in_small_terminal() {
        let config = Config {
            rows: Some(60),
            cols: Some(90),
            ..Config::default()
        };
        let mut app = App::new(&config).expect("walled grid is valid");
        let mut terminal = Terminal::new(TestBackend::new(20, 10)).expect("test terminal");

        let _ = render(&mut app, &mut terminal);

        assert!(app.viewport.width <= 20, "viewport is clipped to the terminal");
    }

    #[test]
    fn test_hints_follow_keymap() {
        let keymap = Keymap {
            advance_key: 'x',
            ..Keymap::default()
        };

        assert!(hints(&Mode::Path(crate::controller::PathState::new()), &keymap).contains("(x)"));
        assert!(hints(&Mode::Run, &keymap).contains("(q) quit"));
    }
}
