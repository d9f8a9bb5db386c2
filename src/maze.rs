//! Grid maze model.
//!
//! This module contains the [`Maze`] structure, which owns the cells of a rectangular grid, their
//! geometry and the single exit of the labyrinth. It also contains the bundled default layout and
//! the parser for the digit-based layout notation.

use std::collections::BTreeMap;

use ratatui::style::Color;

use crate::{
    error::LayoutError,
    types::{CellId, CellType, Point},
};

/// Orthogonal steps as `(row, column)` deltas, in the order neighbours are reported.
///
/// The order is up, right, down, left. The pathfinder relies on it to break ties between shortest
/// paths, so changing it changes which of several equally long paths is found.
const DIRECTIONS: [(isize, isize); 4] = [(-1, 0), (0, 1), (1, 0), (0, -1)];

/// Default labyrinth used when no grid size is requested on the command line.
///
/// Codes are `1` for the entry, `2` for walls, `3` for corridors and `4` for the exit.
pub(crate) static DEFAULT_LAYOUT: &str = "\
2222222222222222222222222
2133333333322233333333332
2232222223323232222222232
2232333323323232333333232
2232322323333332322223232
2233322323222222322323232
2222322333333333322323332
2333322222222232222323222
2322233333333232333323332
2323232222222332322222232
2323233333332222323333232
2323222222233333323223232
2333333333232222223223232
2222222223333333333223334
2222222222222222222222222";

/// One unit of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    /// What the cell is made of.
    kind: CellType,
}

impl Cell {
    /// Builds a cell of the given type.
    pub const fn new(kind: CellType) -> Self {
        Self { kind }
    }

    /// Returns the type of the cell.
    pub const fn kind(self) -> CellType {
        self.kind
    }

    /// Returns whether the agent and the search may enter the cell.
    pub const fn can_enter(self) -> bool {
        self.kind.is_enterable()
    }
}

/// Visualization mark attached to a cell.
///
/// Marks carry no meaning for the model itself; they are written every frame by the active mode
/// and read back by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Mark {
    /// Highlight color of the cell.
    pub color: Color,
    /// Search level to print inside the cell, if any.
    pub level: Option<usize>,
}

/// Rectangular grid maze.
///
/// Cells are stored in row-major order. At most one cell is an [`CellType::Exit`] and the `exit`
/// field always points at it; every mutating method keeps that invariant.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    /// Row-major cell storage.
    cells: Vec<Cell>,
    /// Number of rows.
    rows: usize,
    /// Number of columns.
    cols: usize,
    /// Position of the top-left corner of the first cell.
    topleft: Point,
    /// Width and height of a single cell.
    cell_size: Point,
    /// The single exit cell, if one has been placed.
    exit: Option<CellId>,
    /// Per-cell visualization marks.
    marks: Vec<Option<Mark>>,
}

impl Maze {
    /// Builds an all-corridor maze with unit cells.
    ///
    /// This function places the top-left corner of the first cell at the origin, so the center of
    /// the cell at `(row, col)` is `(col + 0.5, row + 0.5)`. The maze starts without an exit.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_geometry(rows, cols, Point::default(), Point::new(1.0, 1.0))
    }

    /// Builds an all-corridor maze with the given geometry.
    ///
    /// This function only differs from [`Maze::new`] in where the grid sits and how large each
    /// cell is. Geometry affects coordinate queries, never adjacency.
    pub fn with_geometry(rows: usize, cols: usize, topleft: Point, cell_size: Point) -> Self {
        let len = rows * cols;

        Self {
            cells: vec![Cell::default(); len],
            rows,
            cols,
            topleft,
            cell_size,
            exit: None,
            marks: vec![None; len],
        }
    }

    /// Builds a maze with a wall border around a corridor interior.
    ///
    /// The entry is the top-left interior cell and the exit, when the interior has room for it,
    /// is the bottom-right interior cell.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::TooSmall`] if either dimension is below 3.
    pub fn walled(rows: usize, cols: usize) -> Result<(Self, CellId), LayoutError> {
        if rows < 3 || cols < 3 {
            return Err(LayoutError::TooSmall { rows, cols });
        }

        let mut maze = Self::new(rows, cols);
        for id in 0..maze.len() {
            let (row, col) = maze.position_of(id);
            if row == 0 || col == 0 || row == rows - 1 || col == cols - 1 {
                maze.change_type(id, CellType::Wall);
            }
        }

        let entry = cols + 1;
        let exit = (rows - 2) * cols + cols - 2;
        if exit != entry {
            maze.set_exit(exit);
        }

        Ok((maze, entry))
    }

    /// Builds a maze from a layout where each line is a row and each character a cell.
    ///
    /// Codes are `1` for the entry, `2` for walls, `3` for corridors and `4` for the exit. Blank
    /// lines and trailing whitespace are ignored. The entry is a corridor; its identifier is
    /// returned next to the maze.
    ///
    /// # Errors
    ///
    /// This function returns a [`LayoutError`] if:
    /// - The layout has no cells
    /// - Rows have different widths
    /// - A character is not one of the four cell codes
    /// - There is not exactly one entry
    /// - There is more than one exit
    pub fn parse(data: &str) -> Result<(Self, CellId), LayoutError> {
        let lines: Vec<&str> = data
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let width = lines.first().map_or(0, |line| line.chars().count());
        if width == 0 {
            return Err(LayoutError::Empty);
        }

        let mut maze = Self::new(lines.len(), width);
        let mut entry = None;

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LayoutError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }

            for (col, code) in line.chars().enumerate() {
                let id = row * width + col;
                match code {
                    '1' => {
                        if entry.replace(id).is_some() {
                            return Err(LayoutError::DuplicateEntry);
                        }
                    }
                    '2' => maze.change_type(id, CellType::Wall),
                    '3' => {}
                    '4' => {
                        if maze.exit.is_some() {
                            return Err(LayoutError::DuplicateExit);
                        }
                        maze.set_exit(id);
                    }
                    _ => return Err(LayoutError::UnknownCode { code, row, col }),
                }
            }
        }

        let entry = entry.ok_or(LayoutError::MissingEntry)?;

        Ok((maze, entry))
    }

    /// Returns the dimension of the maze as `(rows, cols)`.
    pub const fn dimension(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns whether the maze has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the size of a single cell.
    pub const fn cell_size(&self) -> Point {
        self.cell_size
    }

    /// Returns the position of the top-left corner of the maze.
    pub const fn topleft(&self) -> Point {
        self.topleft
    }

    /// Returns the `(row, col)` position of a cell.
    ///
    /// This function does not check the identifier; the position of an out-of-range identifier
    /// lies outside the grid.
    pub const fn position_of(&self, id: CellId) -> (usize, usize) {
        (id / self.cols, id % self.cols)
    }

    /// Returns whether the given signed grid position lies inside the maze.
    ///
    /// This function takes signed coordinates so that positions one step past the top or left
    /// border can be tested without underflow.
    pub fn inside_maze(&self, row: isize, col: isize) -> bool {
        match (usize::try_from(row), usize::try_from(col)) {
            (Ok(row), Ok(col)) => self.cell_at(row, col).is_some(),
            _ => false,
        }
    }

    /// Returns whether the cell can be entered.
    ///
    /// This function holds for corridors and the exit, and fails for walls. Both the search and
    /// the agent rely on it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn can_enter(&self, id: CellId) -> bool {
        self.cell(id).can_enter()
    }

    /// Returns the type of the cell.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn cell_type(&self, id: CellId) -> CellType {
        self.cell(id).kind()
    }

    /// Iterates over the types of all cells in row-major order.
    pub fn cell_types(&self) -> impl Iterator<Item = CellType> + '_ {
        self.cells.iter().map(|cell| cell.kind())
    }

    /// Changes the type of a cell.
    ///
    /// This function keeps the single exit invariant. Turning a cell into an exit goes through
    /// [`Maze::set_exit`], so any previous exit is demoted. Turning the current exit into
    /// something else clears the exit.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn change_type(&mut self, id: CellId, kind: CellType) {
        if kind == CellType::Exit {
            self.set_exit(id);
            return;
        }

        if self.exit == Some(id) {
            self.exit = None;
        }
        *self.cell_mut(id) = Cell::new(kind);
    }

    /// Returns the center of a cell in maze space.
    ///
    /// This function computes `topleft + (col, row) * cell_size + cell_size / 2`, with `x`
    /// following the columns and `y` following the rows. The agent walks between these points.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn center_of(&self, id: CellId) -> Point {
        let _ = self.cell(id);
        let (row, col) = self.position_of(id);

        Point::new(
            self.topleft.x + to_f64(col) * self.cell_size.x + self.cell_size.x / 2.,
            self.topleft.y + to_f64(row) * self.cell_size.y + self.cell_size.y / 2.,
        )
    }

    /// Returns the cell containing the given point.
    ///
    /// This function floors the offset of the point from the top-left corner, measured in cells,
    /// and returns `None` when the result lies outside the grid or the point is not finite. It
    /// is the inverse of [`Maze::center_of`] and turns pointer positions into cells.
    pub fn cell_num(&self, coords: Point) -> Option<CellId> {
        let offset = coords - self.topleft;
        let col = (offset.x / self.cell_size.x).floor();
        let row = (offset.y / self.cell_size.y).floor();
        if !(col.is_finite() && row.is_finite()) {
            return None;
        }

        let (row, col) = (to_isize(row), to_isize(col));
        if !self.inside_maze(row, col) {
            return None;
        }

        self.cell_at(usize::try_from(row).ok()?, usize::try_from(col).ok()?)
    }

    /// Returns the orthogonal neighbours of a cell inside the grid.
    ///
    /// This function lists the neighbours up, right, down, left, skipping those that fall outside
    /// the grid, so corners have two, edges three and interior cells four. Walls are not filtered
    /// out; callers check [`Maze::can_enter`] themselves.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn neighbours(&self, id: CellId) -> Vec<CellId> {
        let _ = self.cell(id);
        let (row, col) = self.position_of(id);

        DIRECTIONS
            .into_iter()
            .filter_map(|(d_row, d_col)| {
                let row = row.checked_add_signed(d_row)?;
                let col = col.checked_add_signed(d_col)?;
                self.cell_at(row, col)
            })
            .collect()
    }

    /// Returns the exit cell, if one has been placed.
    pub const fn exit(&self) -> Option<CellId> {
        self.exit
    }

    /// Makes the cell the exit of the maze.
    ///
    /// This function turns the previous exit, if any, into a corridor. The new exit replaces
    /// whatever type the cell had before, walls included.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range.
    pub fn set_exit(&mut self, id: CellId) {
        let _ = self.cell(id);

        if let Some(previous) = self.exit.filter(|&previous| previous != id) {
            *self.cell_mut(previous) = Cell::new(CellType::Corridor);
        }
        *self.cell_mut(id) = Cell::new(CellType::Exit);
        self.exit = Some(id);
    }

    /// Turns the current exit back into a corridor.
    ///
    /// This function does nothing when the maze has no exit.
    pub fn remove_exit(&mut self) {
        if let Some(exit) = self.exit.take() {
            *self.cell_mut(exit) = Cell::new(CellType::Corridor);
        }
    }

    /// Highlights the given cells.
    ///
    /// This function overwrites any mark the cells already had, labels included. Marks are
    /// written for the renderer and have no effect on the model.
    ///
    /// # Panics
    ///
    /// Panics if any identifier is out of range.
    pub fn mark_cells<I>(&mut self, cells: I, color: Color)
    where
        I: IntoIterator<Item = CellId>,
    {
        for id in cells {
            *self.mark_mut(id) = Some(Mark { color, level: None });
        }
    }

    /// Highlights the cells of a level map and labels each one with its level.
    ///
    /// This function is how the search wavefront becomes visible: the renderer prints the label
    /// inside each marked cell.
    ///
    /// # Panics
    ///
    /// Panics if any identifier is out of range.
    pub fn mark_levels(&mut self, levels: &BTreeMap<CellId, usize>, color: Color) {
        for (&id, &level) in levels {
            *self.mark_mut(id) = Some(Mark {
                color,
                level: Some(level),
            });
        }
    }

    /// Removes every mark.
    pub fn clear_marks(&mut self) {
        self.marks.fill(None);
    }

    /// Returns the mark of a cell.
    pub fn mark(&self, id: CellId) -> Option<Mark> {
        self.marks.get(id).copied().flatten()
    }

    /// Returns the identifier of the cell at `(row, col)` if it lies inside the grid.
    pub const fn cell_at(&self, row: usize, col: usize) -> Option<CellId> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Returns a cell, failing fast on out-of-range identifiers.
    fn cell(&self, id: CellId) -> &Cell {
        let (rows, cols) = self.dimension();
        self.cells
            .get(id)
            .unwrap_or_else(|| panic!("cell index {id} is out of range for a {rows}x{cols} maze"))
    }

    /// Returns a mutable cell, failing fast on out-of-range identifiers.
    fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        let (rows, cols) = self.dimension();
        self.cells
            .get_mut(id)
            .unwrap_or_else(|| panic!("cell index {id} is out of range for a {rows}x{cols} maze"))
    }

    /// Returns a mutable mark slot, failing fast on out-of-range identifiers.
    fn mark_mut(&mut self, id: CellId) -> &mut Option<Mark> {
        let (rows, cols) = self.dimension();
        self.marks
            .get_mut(id)
            .unwrap_or_else(|| panic!("cell index {id} is out of range for a {rows}x{cols} maze"))
    }
}

/// Converts a grid index into a coordinate.
#[expect(
    clippy::cast_precision_loss,
    reason = "Grid indices are far below the 2^52 limit of exact float integers."
)]
fn to_f64(value: usize) -> f64 {
    value as f64
}

/// Converts an already floored, finite coordinate into a signed grid index.
#[expect(
    clippy::cast_possible_truncation,
    reason = "Out-of-range values saturate and are rejected by the bounds check that follows."
)]
fn to_isize(value: f64) -> isize {
    value as isize
}
