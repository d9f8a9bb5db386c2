//! Typed errors of the maze model, the pathfinder and the mode controller.
//!
//! Out-of-range cell indices are not represented here: they are contract violations and panic
//! where they happen. An unreachable exit is not represented either, since it is a normal outcome
//! of the search observed through [`SearchState::found`](crate::pathfinding::SearchState::found).

use thiserror::Error;

use crate::types::{CellId, ModeId};

/// Reasons a textual layout is rejected by [`Maze::parse`](crate::maze::Maze::parse).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout has no rows or no columns.
    #[error("layout is empty")]
    Empty,
    /// A row does not have the same width as the first one.
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row index.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        found: usize,
    },
    /// A character outside of the `1`-`4` cell codes.
    #[error("unknown cell code {code:?} at row {row}, column {col}")]
    UnknownCode {
        /// Offending character.
        code: char,
        /// Zero-based row index.
        row: usize,
        /// Zero-based column index.
        col: usize,
    },
    /// No cell is marked as the entry.
    #[error("layout has no entry cell")]
    MissingEntry,
    /// More than one cell is marked as the entry.
    #[error("layout has more than one entry cell")]
    DuplicateEntry,
    /// More than one cell is marked as the exit.
    #[error("layout has more than one exit cell")]
    DuplicateExit,
    /// The requested grid is too small to hold a walled border around an entry.
    #[error("a walled maze needs at least 3x3 cells, got {rows}x{cols}")]
    TooSmall {
        /// Requested number of rows.
        rows: usize,
        /// Requested number of columns.
        cols: usize,
    },
}

/// Errors returned when (re)starting a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchError {
    /// The start or the end of the search is a wall.
    #[error("cannot search from cell {start} to cell {end}: both must be enterable")]
    InvalidStartOrEnd {
        /// Requested start cell.
        start: CellId,
        /// Requested end cell.
        end: CellId,
    },
}

/// Errors reported by the mode controller.
///
/// None of these leave the controller in a different mode than before the failing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModeError {
    /// The requested mode change is not part of the transition table, or its guard does not hold.
    #[error("cannot switch from {from} mode to {to} mode")]
    InvalidTransition {
        /// Active mode when the request was made.
        from: ModeId,
        /// Requested mode.
        to: ModeId,
    },
    /// Solving was requested on a maze without an exit.
    #[error("place an exit before solving the maze")]
    MissingExit,
    /// The pathfinder rejected the start or the end cell.
    #[error(transparent)]
    Search(#[from] SearchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ModeError::InvalidTransition {
            from: ModeId::Design,
            to: ModeId::Run,
        };
        assert_eq!(err.to_string(), "cannot switch from Design mode to Run mode");

        let err = ModeError::from(SearchError::InvalidStartOrEnd { start: 0, end: 3 });
        assert_eq!(
            err.to_string(),
            "cannot search from cell 0 to cell 3: both must be enterable"
        );

        let err = LayoutError::RaggedRow {
            row: 2,
            expected: 4,
            found: 3,
        };
        assert_eq!(err.to_string(), "row 2 has 3 cells, expected 4");
    }
}
