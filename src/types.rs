//! Type definitions shared by the maze model, the mode controller and the user interface.

use std::{
    fmt,
    ops::{Add, Mul, Sub},
};

/// Identifier of a maze cell.
///
/// Cells are numbered in row-major order, so the cell at `(row, col)` in a maze with `cols`
/// columns has the identifier `row * cols + col`.
pub type CellId = usize;

/// Enumeration of the kinds of cell a maze is made of.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CellType {
    /// Blocking cell.
    ///
    /// This variant represents a cell that can neither be entered by the agent nor crossed by the
    /// search.
    Wall,
    /// Walkable cell.
    ///
    /// This variant represents a cell the agent and the search can freely move through.
    #[default]
    Corridor,
    /// The target cell of the maze.
    ///
    /// This variant represents the single cell the search is looking for. It is walkable.
    Exit,
}

impl CellType {
    /// Returns whether a cell of this type can be entered.
    pub const fn is_enterable(self) -> bool {
        !matches!(self, Self::Wall)
    }

    /// Returns the type a drag gesture paints when it starts on a cell of this type.
    ///
    /// Starting on a wall carves corridors; starting anywhere else raises walls.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Wall => Self::Corridor,
            Self::Corridor | Self::Exit => Self::Wall,
        }
    }
}

/// Point or vector in maze geometry space.
///
/// The `x` axis grows with the column index and the `y` axis grows with the row index, so the
/// origin sits on the top-left corner of the first cell when the maze has no offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Builds a point from its coordinates.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the euclidean length of the vector.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Returns the euclidean distance between two points.
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// Identifier of an application mode.
///
/// This enumeration names the phases of the application state machine without carrying any of
/// their state, which makes it usable as a key in the transition table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModeId {
    /// Maze editing.
    Design,
    /// Animated breadth-first search.
    Path,
    /// Agent walking the found path.
    Run,
}

impl ModeId {
    /// Returns the display name of the mode.
    ///
    /// This name is shown as the title of the status line while the mode is active.
    pub const fn repr(self) -> &'static str {
        match self {
            Self::Design => "Design",
            Self::Path => "Path",
            Self::Run => "Run",
        }
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.repr())
    }
}

/// Keys the application reacts to, independent of the terminal backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// A printable character.
    Char(char),
    /// The return key.
    Enter,
    /// The escape key.
    Esc,
    /// The up arrow.
    Up,
    /// The down arrow.
    Down,
    /// The left arrow.
    Left,
    /// The right arrow.
    Right,
}

/// Pointer buttons the application distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    /// Usually the left mouse button.
    Primary,
    /// Usually the right mouse button.
    Secondary,
}

/// Discrete input event routed to the active mode.
///
/// Pointer positions are already expressed in maze geometry space; the conversion from terminal
/// cells happens in the event loop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    /// A pointer button went down.
    PointerPressed {
        /// Pointer position in maze space.
        position: Point,
        /// Button that was pressed.
        button: PointerButton,
    },
    /// The pointer moved, with or without a button held.
    PointerMoved {
        /// Pointer position in maze space.
        position: Point,
    },
    /// A pointer button went up.
    PointerReleased {
        /// Button that was released.
        button: PointerButton,
    },
    /// A key was pressed.
    KeyPressed(Key),
}

/// User-level actions that keys are bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Leave Design mode and start the search.
    StartSolving,
    /// Expand one more search level.
    Advance,
    /// Toggle automatic expansion of search levels.
    TogglePlay,
    /// Return to Design mode.
    Abort,
    /// Toggle the wall under the design cursor.
    ToggleWall,
    /// Toggle the exit under the design cursor.
    ToggleExit,
    /// Move the agent's home to the design cursor.
    PlaceStart,
    /// Move the design cursor one row up.
    CursorUp,
    /// Move the design cursor one row down.
    CursorDown,
    /// Move the design cursor one column left.
    CursorLeft,
    /// Move the design cursor one column right.
    CursorRight,
    /// Leave the application.
    Quit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_type_enterable() {
        assert!(!CellType::Wall.is_enterable());
        assert!(CellType::Corridor.is_enterable());
        assert!(CellType::Exit.is_enterable());
    }

    #[test]
    fn test_cell_type_toggled() {
        assert_eq!(CellType::Wall.toggled(), CellType::Corridor);
        assert_eq!(CellType::Corridor.toggled(), CellType::Wall);
        assert_eq!(CellType::Exit.toggled(), CellType::Wall);
    }

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);

        assert_eq!(a + b, Point::new(5.0, 8.0));
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert!((a.distance(b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_mode_id_repr() {
        assert_eq!(ModeId::Design.repr(), "Design");
        assert_eq!(ModeId::Path.repr(), "Path");
        assert_eq!(format!("{}", ModeId::Run), "Run");
    }
}
