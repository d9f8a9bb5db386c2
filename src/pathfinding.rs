//! Level-synchronous breadth-first pathfinder.
//!
//! This module contains the search state and the [`PathComputer`] view that advances it one
//! breadth-first layer per call. Keeping the state outside of the view lets the application own it
//! across frames while the maze is only borrowed for the duration of each call.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::{error::SearchError, maze::Maze, types::CellId};

/// Persistent state of a breadth-first search.
///
/// This structure holds everything the search needs to resume on the next call to
/// [`PathComputer::next_level`]. Its accessors are read-only snapshots meant for visualization.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchState {
    /// Endpoints of the current search.
    ///
    /// This field holds the `(start, end)` pair given to the last successful
    /// [`PathComputer::reset`], or `None` when no search has been started since the last clear.
    endpoints: Option<(CellId, CellId)>,
    /// Current breadth-first layer.
    ///
    /// This field holds the cells discovered by the last expanded layer, in the order they were
    /// discovered. It only holds the start right after a reset and is empty once exhausted.
    frontier: Vec<CellId>,
    /// Level of every visited cell.
    ///
    /// This field maps each visited cell to its distance from the start, measured in edges. Its
    /// keys double as the visited set.
    level: BTreeMap<CellId, usize>,
    /// Breadth-first tree.
    ///
    /// This field maps every visited cell except the start to the cell that discovered it.
    parent: BTreeMap<CellId, CellId>,
    /// Whether the end cell has been reached.
    found: bool,
    /// Start to end sequence, filled once the end is reached.
    path: Vec<CellId>,
}

impl SearchState {
    /// Returns whether the end cell has been reached.
    ///
    /// This function becomes `true` on the call to [`PathComputer::next_level`] that discovers
    /// the end, or right away when a search is reset with the same start and end.
    pub const fn found(&self) -> bool {
        self.found
    }

    /// Returns the current layer of the search.
    pub fn frontier(&self) -> &[CellId] {
        &self.frontier
    }

    /// Returns the level of every visited cell.
    ///
    /// This function exposes the visited set together with the distance of each cell from the
    /// start. The renderer uses it to label cells with their level.
    pub const fn level(&self) -> &BTreeMap<CellId, usize> {
        &self.level
    }

    /// Returns the breadth-first tree built so far.
    pub const fn parent(&self) -> &BTreeMap<CellId, CellId> {
        &self.parent
    }

    /// Returns the found path.
    ///
    /// This function returns the start to end sequence, both inclusive, once the end has been
    /// reached. Before that it returns an empty slice.
    pub fn path(&self) -> &[CellId] {
        &self.path
    }

    /// Returns the `(start, end)` pair of the current search.
    pub const fn endpoints(&self) -> Option<(CellId, CellId)> {
        self.endpoints
    }

    /// Returns whether the search ran out of cells without reaching the end.
    ///
    /// This is the unreachable outcome. It is a normal terminal state, not an error.
    pub fn is_exhausted(&self) -> bool {
        self.endpoints.is_some() && !self.found && self.frontier.is_empty()
    }

    /// Returns whether further calls to [`PathComputer::next_level`] can change anything.
    pub fn is_finished(&self) -> bool {
        self.found || self.frontier.is_empty()
    }

    /// Discards the current search.
    ///
    /// This function brings the state back to its default, as if no search had ever been started.
    /// The mode controller calls it whenever Path mode is left.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Stepwise breadth-first search over a borrowed maze.
///
/// This structure is a short-lived view: it borrows the maze immutably and the search state
/// mutably, so the maze cannot be edited while a step is running and the state survives between
/// frames. A new computer is built for every call the application makes.
pub struct PathComputer<'maze> {
    /// Maze the search runs on.
    maze: &'maze Maze,
    /// State advanced by each call.
    state: &'maze mut SearchState,
}

impl<'maze> PathComputer<'maze> {
    /// Binds a search state to a maze.
    ///
    /// This function does not touch the state; use [`PathComputer::reset`] to start a search.
    pub fn new(maze: &'maze Maze, state: &'maze mut SearchState) -> Self {
        Self { maze, state }
    }

    /// Starts a new search from `start` to `end`.
    ///
    /// This function discards any previous search and leaves the state with the start as the
    /// only visited cell and the only member of the frontier. Starting on the end is allowed and
    /// is found right away, with a path made of the start alone.
    ///
    /// # Errors
    ///
    /// - [`SearchError::InvalidStartOrEnd`] if either cell is a wall. The state is left untouched.
    ///
    /// # Panics
    ///
    /// Panics if either cell is out of range.
    pub fn reset(&mut self, start: CellId, end: CellId) -> Result<(), SearchError> {
        if !(self.maze.can_enter(start) && self.maze.can_enter(end)) {
            return Err(SearchError::InvalidStartOrEnd { start, end });
        }

        let state = &mut *self.state;
        state.endpoints = Some((start, end));
        state.frontier.clear();
        state.frontier.push(start);
        state.level.clear();
        let _ = state.level.insert(start, 0);
        state.parent.clear();
        state.found = start == end;
        state.path.clear();
        if state.found {
            state.path.push(start);
        }

        debug!(start, end, "search reset");

        Ok(())
    }

    /// Expands the whole current layer and returns whether the end has been reached.
    ///
    /// This function visits every enterable, unvisited neighbour of every frontier cell and makes
    /// those neighbours the new frontier. Neighbours are scanned up, right, down, left, and the
    /// first cell to discover another one becomes its parent, which makes the found path
    /// deterministic. Once the search is found or exhausted, further calls change nothing and keep
    /// returning the same value.
    pub fn next_level(&mut self) -> bool {
        let state = &mut *self.state;
        let Some((start, end)) = state.endpoints else {
            return state.found;
        };
        if state.is_finished() {
            return state.found;
        }

        let mut frontier = Vec::new();
        for &cell in &state.frontier {
            let level = state.level.get(&cell).copied().unwrap_or_default();
            for next in self.maze.neighbours(cell) {
                if !self.maze.can_enter(next) || state.level.contains_key(&next) {
                    continue;
                }

                let _ = state.parent.insert(next, cell);
                let _ = state.level.insert(next, level + 1);
                frontier.push(next);
                if next == end {
                    state.found = true;
                }
            }
        }
        state.frontier = frontier;

        if state.found {
            state.path = reconstruct(&state.parent, start, end);
            info!(start, end, length = state.path.len(), "path found");
        } else if state.frontier.is_empty() {
            info!(start, end, visited = state.level.len(), "end is unreachable");
        } else {
            debug!(layer = state.frontier.len(), "search level expanded");
        }

        state.found
    }

    /// Returns whether the end cell has been reached.
    pub fn found(&self) -> bool {
        self.state.found()
    }

    /// Returns the current layer of the search.
    pub fn frontier(&self) -> &[CellId] {
        self.state.frontier()
    }

    /// Returns the level of every visited cell.
    pub fn level(&self) -> &BTreeMap<CellId, usize> {
        self.state.level()
    }

    /// Returns the found path, or an empty slice while the end has not been reached.
    pub fn path(&self) -> &[CellId] {
        self.state.path()
    }

    /// Returns whether the search ran out of cells without reaching the end.
    pub fn is_exhausted(&self) -> bool {
        self.state.is_exhausted()
    }
}

/// Follows the breadth-first tree from `end` back to `start` and returns the forward path.
fn reconstruct(parent: &BTreeMap<CellId, CellId>, start: CellId, end: CellId) -> Vec<CellId> {
    let mut path = vec![end];
    let mut current = end;

    while current != start {
        let Some(&previous) = parent.get(&current) else {
            break;
        };
        path.push(previous);
        current = previous;
    }
    path.reverse();

    path
}

/// Runs a whole search at once.
///
/// This function drains [`PathComputer::next_level`] on a scratch state and returns the shortest
/// path from `start` to `end`, or `None` if the end is unreachable.
///
/// # Errors
///
/// - [`SearchError::InvalidStartOrEnd`] if either cell is a wall.
pub fn compute_path(
    maze: &Maze,
    start: CellId,
    end: CellId,
) -> Result<Option<Vec<CellId>>, SearchError> {
    let mut state = SearchState::default();
    let mut computer = PathComputer::new(maze, &mut state);
    computer.reset(start, end)?;
    while !computer.next_level() && !computer.is_exhausted() {}

    Ok(state.found.then_some(state.path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{maze::DEFAULT_LAYOUT, types::CellType};

    /// Tiny deterministic generator for random mazes.
    fn lcg(state: &mut u64) -> usize {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        usize::try_from(*state >> 33).expect("shifted value fits in usize")
    }

    fn random_maze(rows: usize, cols: usize, seed: u64) -> Maze {
        let mut maze = Maze::new(rows, cols);
        let mut state = seed;
        for id in 0..maze.len() {
            if lcg(&mut state) % 10 < 3 {
                maze.change_type(id, CellType::Wall);
            }
        }
        maze
    }

    /// Calls `next_level` until the search settles and returns how many calls it took.
    fn drain(computer: &mut PathComputer<'_>) -> usize {
        let mut calls = 0;
        while !computer.found() && !computer.is_exhausted() {
            let _ = computer.next_level();
            calls += 1;
        }
        calls
    }

    #[test]
    fn test_unreachable_scenario() {
        let mut maze = Maze::new(3, 3);
        for id in [3, 4, 5] {
            maze.change_type(id, CellType::Wall);
        }
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);

        computer.reset(0, 8).expect("both cells are corridors");
        let calls = drain(&mut computer);

        assert!(!computer.found());
        assert!(computer.frontier().is_empty());
        assert!(computer.path().is_empty());
        assert!(computer.is_exhausted());
        assert!(calls <= maze.len());
        assert_eq!(computer.level().keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
    }

    #[test]
    fn test_deterministic_shortest_path_scenario() {
        let maze = Maze::new(2, 2);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);
        computer.reset(0, 3).expect("both cells are corridors");

        assert!(!computer.next_level());
        assert_eq!(computer.frontier(), &[1, 2]);
        assert!(computer.path().is_empty());

        assert!(computer.next_level());
        assert_eq!(computer.path(), &[0, 1, 3]);
        assert_eq!(computer.frontier(), &[3]);
        assert_eq!(state.parent().get(&3), Some(&1));
    }

    #[test]
    fn test_reset_state() {
        let maze = Maze::new(3, 3);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);
        computer.reset(4, 0).expect("both cells are corridors");

        assert!(!computer.found());
        assert_eq!(computer.frontier(), &[4]);
        assert_eq!(computer.level(), &BTreeMap::from([(4, 0)]));
        assert!(computer.path().is_empty());
        assert!(state.parent().is_empty());
        assert_eq!(state.endpoints(), Some((4, 0)));
    }

    #[test]
    fn test_start_equals_end() {
        let maze = Maze::new(2, 2);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);
        computer.reset(2, 2).expect("cell is a corridor");

        assert!(computer.found());
        assert_eq!(computer.path(), &[2]);

        assert!(computer.next_level());
        assert_eq!(computer.frontier(), &[2]);
        assert_eq!(computer.path(), &[2]);
    }

    #[test]
    fn test_reset_rejects_walls_without_mutation() {
        let mut maze = Maze::new(2, 2);
        maze.change_type(3, CellType::Wall);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);
        computer.reset(0, 1).expect("both cells are corridors");
        let _ = computer.next_level();

        let before = computer.state.clone();
        assert_eq!(
            computer.reset(0, 3),
            Err(SearchError::InvalidStartOrEnd { start: 0, end: 3 })
        );
        assert_eq!(
            computer.reset(3, 0),
            Err(SearchError::InvalidStartOrEnd { start: 3, end: 0 })
        );
        assert_eq!(*computer.state, before);
    }

    #[test]
    fn test_next_level_without_reset() {
        let maze = Maze::new(2, 2);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);

        assert!(!computer.next_level());
        assert!(!computer.is_exhausted());
        assert_eq!(state, SearchState::default());
    }

    #[test]
    fn test_idempotent_after_found() {
        let maze = Maze::new(3, 3);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);
        computer.reset(0, 8).expect("both cells are corridors");
        let _ = drain(&mut computer);
        assert!(computer.found());

        let before = computer.state.clone();
        for _ in 0..3 {
            assert!(computer.next_level());
        }
        assert_eq!(*computer.state, before);
    }

    #[test]
    fn test_idempotent_after_exhaustion() {
        let mut maze = Maze::new(1, 3);
        maze.change_type(1, CellType::Wall);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);
        computer.reset(0, 2).expect("both cells are corridors");
        let _ = drain(&mut computer);
        assert!(computer.is_exhausted());

        let before = computer.state.clone();
        for _ in 0..3 {
            assert!(!computer.next_level());
        }
        assert_eq!(*computer.state, before);
    }

    #[test]
    fn test_reset_discards_search_in_progress() {
        let maze = Maze::new(4, 4);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);
        computer.reset(0, 15).expect("both cells are corridors");
        let _ = computer.next_level();
        let _ = computer.next_level();

        computer.reset(15, 0).expect("both cells are corridors");
        assert_eq!(computer.frontier(), &[15]);
        assert_eq!(computer.level().len(), 1);
        assert!(computer.state.parent().is_empty());
    }

    #[test]
    fn test_determinism_across_resets() {
        let maze = Maze::new(5, 5);
        let mut state = SearchState::default();
        let mut computer = PathComputer::new(&maze, &mut state);

        computer.reset(0, 24).expect("both cells are corridors");
        let _ = drain(&mut computer);
        let first = computer.path().to_vec();

        computer.reset(0, 24).expect("both cells are corridors");
        let _ = drain(&mut computer);

        assert_eq!(computer.path(), first.as_slice());
        // Right is scanned before down, so the path hugs the top row first.
        assert_eq!(first, vec![0, 1, 2, 3, 4, 9, 14, 19, 24]);
    }

    #[test]
    fn test_paths_are_consistent_on_random_mazes() {
        for seed in 1..=20 {
            let maze = random_maze(6, 7, seed);
            let enterable: Vec<CellId> = (0..maze.len()).filter(|&id| maze.can_enter(id)).collect();

            for &start in enterable.iter().step_by(3) {
                for &end in enterable.iter().step_by(5) {
                    let mut state = SearchState::default();
                    let mut computer = PathComputer::new(&maze, &mut state);
                    computer.reset(start, end).expect("cells are enterable");
                    let calls = drain(&mut computer);
                    assert!(calls <= maze.len(), "search did not terminate in time");

                    assert_eq!(computer.level().get(&start), Some(&0));
                    assert!(!state.parent().contains_key(&start));

                    if !state.found() {
                        assert!(state.path().is_empty());
                        assert!(!state.level().contains_key(&end));
                        continue;
                    }

                    let path = state.path();
                    let end_level = *state.level().get(&end).expect("end is visited");
                    assert_eq!(path.len() - 1, end_level);
                    assert_eq!(path.first(), Some(&start));
                    assert_eq!(path.last(), Some(&end));
                    for pair in path.windows(2) {
                        if let [from, to] = pair {
                            assert!(maze.neighbours(*from).contains(to));
                            assert!(maze.can_enter(*to));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_compute_path() {
        let (maze, entry) = Maze::parse(DEFAULT_LAYOUT).expect("default layout is valid");
        let exit = maze.exit().expect("default layout has an exit");

        let path = compute_path(&maze, entry, exit)
            .expect("entry and exit are enterable")
            .expect("exit is reachable");

        assert_eq!(path.len(), 42);
        assert_eq!(path.first(), Some(&entry));
        assert_eq!(path.last(), Some(&exit));
    }

    #[test]
    fn test_compute_path_unreachable() {
        let mut maze = Maze::new(1, 3);
        maze.change_type(1, CellType::Wall);

        assert_eq!(compute_path(&maze, 0, 2), Ok(None));
        assert!(compute_path(&maze, 0, 1).is_err());
    }
}
