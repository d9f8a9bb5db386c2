//! Translation of terminal events into maze input.
//!
//! Crossterm reports keys and mouse positions in terminal cells. This module turns them into the
//! abstract [`InputEvent`] values the mode controller understands, converting mouse positions into
//! maze space through the viewport the grid was last drawn in.

use std::time::Duration;

use color_eyre::eyre::Result;
use ratatui::{
    crossterm::event::{
        self, Event, KeyCode, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
    },
    layout::Rect,
};

use crate::{
    types::{InputEvent, Key, Point, PointerButton},
    ui::CELL_WIDTH,
    App,
};

/// Longest time to wait for a terminal event before the next frame.
pub(crate) const FRAME_BUDGET: Duration = Duration::from_millis(16);

/// Waits for one terminal event and forwards it to the application.
///
/// This function returns early when no event arrives within [`FRAME_BUDGET`], so the animations
/// keep running while the user is idle. Key releases and repeats are ignored.
///
/// # Errors
///
/// - [`std::io::Error`] if the terminal cannot be polled or read
pub(crate) fn handle_events(app: &mut App) -> Result<()> {
    if !event::poll(FRAME_BUDGET)? {
        return Ok(());
    }

    let input = match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            translate_key(key.code).map(InputEvent::KeyPressed)
        }
        Event::Mouse(mouse) => translate_mouse(mouse, app.viewport),
        _ => None,
    };

    if let Some(input) = input {
        app.dispatch(input);
    }

    Ok(())
}

/// Maps a crossterm key code to a maze key.
pub(crate) const fn translate_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(ch) => Some(Key::Char(ch)),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Esc),
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        _ => None,
    }
}

/// Maps a crossterm mouse event to a pointer event in maze space.
///
/// Only the left and right buttons are used; scrolling and the middle button are dropped.
pub(crate) fn translate_mouse(mouse: MouseEvent, viewport: Rect) -> Option<InputEvent> {
    let position = to_maze_space(mouse.column, mouse.row, viewport);

    match mouse.kind {
        MouseEventKind::Down(button) => Some(InputEvent::PointerPressed {
            position,
            button: pointer_button(button)?,
        }),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => {
            Some(InputEvent::PointerMoved { position })
        }
        MouseEventKind::Up(button) => Some(InputEvent::PointerReleased {
            button: pointer_button(button)?,
        }),
        _ => None,
    }
}

/// Converts a terminal cell position into maze space, where every maze cell is one unit wide.
///
/// The result is the center of the terminal cell, so the column halves of a maze cell land on
/// either side of its center.
fn to_maze_space(column: u16, row: u16, viewport: Rect) -> Point {
    let x = f64::from(column) - f64::from(viewport.x) + 0.5;
    let y = f64::from(row) - f64::from(viewport.y) + 0.5;

    Point::new(x / f64::from(CELL_WIDTH), y)
}

/// Maps a mouse button to a pointer button.
const fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_translate_key() {
        assert_eq!(translate_key(KeyCode::Char('w')), Some(Key::Char('w')));
        assert_eq!(translate_key(KeyCode::Enter), Some(Key::Enter));
        assert_eq!(translate_key(KeyCode::Esc), Some(Key::Esc));
        assert_eq!(translate_key(KeyCode::Left), Some(Key::Left));
        assert_eq!(translate_key(KeyCode::Tab), None);
    }

    #[test]
    fn test_translate_mouse_press() {
        let viewport = Rect::new(4, 2, 10, 5);

        assert_eq!(
            translate_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 7, 3), viewport),
            Some(InputEvent::PointerPressed {
                position: Point::new(1.75, 1.5),
                button: PointerButton::Primary,
            })
        );
        assert_eq!(
            translate_mouse(mouse(MouseEventKind::Down(MouseButton::Right), 4, 2), viewport),
            Some(InputEvent::PointerPressed {
                position: Point::new(0.25, 0.5),
                button: PointerButton::Secondary,
            })
        );
        assert_eq!(
            translate_mouse(mouse(MouseEventKind::Down(MouseButton::Middle), 4, 2), viewport),
            None
        );
    }

    #[test]
    fn test_translate_mouse_motion() {
        let viewport = Rect::new(0, 0, 10, 5);

        assert_eq!(
            translate_mouse(mouse(MouseEventKind::Drag(MouseButton::Left), 2, 1), viewport),
            Some(InputEvent::PointerMoved {
                position: Point::new(1.25, 1.5)
            })
        );
        assert_eq!(
            translate_mouse(mouse(MouseEventKind::Up(MouseButton::Left), 2, 1), viewport),
            Some(InputEvent::PointerReleased {
                button: PointerButton::Primary
            })
        );
        assert_eq!(
            translate_mouse(mouse(MouseEventKind::ScrollDown, 2, 1), viewport),
            None
        );
    }

    #[test]
    fn test_both_halves_of_a_cell_hit_it() {
        let viewport = Rect::new(3, 1, 10, 5);
        let maze = crate::maze::Maze::new(5, 5);

        for column in [5, 6] {
            let position = to_maze_space(column, 2, viewport);
            assert_eq!(maze.cell_num(position), Some(6));
        }
        assert_eq!(maze.cell_num(to_maze_space(2, 2, viewport)), None);
    }
}
