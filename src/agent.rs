//! Agent that walks a found path cell by cell.

use std::{collections::VecDeque, time::Duration};

use tracing::{debug, info};

use crate::{
    animation::{Clip, SpriteAnimator},
    maze::Maze,
    types::{CellId, Point},
};

/// Distance under which the agent counts as standing on a point.
pub const ARRIVAL_EPSILON: f64 = 1e-6;

/// Clip played while the agent walks.
const WALK_CLIP: &str = "walk";

/// Clip played while the agent stands still.
const IDLE_CLIP: &str = "idle";

/// Time each glyph of the agent's clips stays on screen.
const FRAME_DURATION: Duration = Duration::from_millis(150);

/// Path-following agent.
///
/// The agent moves toward the center of the first waypoint at a fixed velocity. When it gets
/// there it snaps onto the center and targets the next waypoint. Running out of waypoints is
/// reported once by [`Agent::update`].
#[derive(Clone, Debug)]
pub struct Agent {
    /// Cell the agent starts from and returns to.
    home: CellId,
    /// Current position in maze space.
    position: Point,
    /// Remaining cells to visit; the front is the current target.
    waypoints: VecDeque<CellId>,
    /// Speed in maze units per second.
    velocity: f64,
    /// Whether a path is being followed and its completion is still to be reported.
    moving: bool,
    /// Last waypoint the agent arrived at.
    reached: Option<CellId>,
    /// Glyph animation of the agent.
    sprite: SpriteAnimator,
}

impl Agent {
    /// Builds an agent standing on `home`.
    ///
    /// The velocity is in maze units per second and must be finite and above zero for the agent
    /// to ever arrive; [`crate::config::is_valid_velocity`] checks it.
    ///
    /// # Panics
    ///
    /// Panics if `home` is out of range for the maze.
    pub fn new(home: CellId, maze: &Maze, velocity: f64) -> Self {
        let mut sprite = SpriteAnimator::new();
        sprite.add_clip(WALK_CLIP, Clip::new(&['o', 'O', '0', 'O'], FRAME_DURATION));
        sprite.add_clip(IDLE_CLIP, Clip::new(&['@'], FRAME_DURATION));
        sprite.activate(IDLE_CLIP);

        Self {
            home,
            position: maze.center_of(home),
            waypoints: VecDeque::new(),
            velocity,
            moving: false,
            reached: Some(home),
            sprite,
        }
    }

    /// Starts following `path`; the first element is the first target.
    pub fn follow_path(&mut self, path: &[CellId]) {
        self.waypoints = path.iter().copied().collect();
        self.moving = true;
        self.sprite.play(WALK_CLIP, true);

        debug!(waypoints = path.len(), "agent follows a new path");
    }

    /// Advances the agent by `delta` and returns `true` on the update where the path is finished.
    ///
    /// This function spends a movement budget of `velocity * delta` along the waypoints. Every
    /// waypoint reached within the budget is snapped onto and dropped, and whatever is left of the
    /// budget carries on toward the next one, so a long frame can cover several cells. Later
    /// updates return `false` until a new path is given.
    ///
    /// # Panics
    ///
    /// Panics if a waypoint is out of range for the maze.
    pub fn update(&mut self, delta: Duration, maze: &Maze) -> bool {
        self.sprite.update(delta);
        if !self.moving {
            return false;
        }

        let mut budget = self.velocity * delta.as_secs_f64();
        while let Some(&target) = self.waypoints.front() {
            let goal = maze.center_of(target);
            let distance = self.position.distance(goal);

            if distance > budget + ARRIVAL_EPSILON {
                self.position = self.position + (goal - self.position) * (budget / distance);
                return false;
            }

            budget = (budget - distance).max(0.0);
            self.position = goal;
            self.reached = Some(target);
            let _ = self.waypoints.pop_front();
            debug!(cell = target, "agent reached waypoint");
        }

        self.moving = false;
        self.sprite.play(IDLE_CLIP, false);
        info!(cell = ?self.reached, "agent arrived");

        true
    }

    /// Returns whether the agent stands on the center of `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for the maze.
    pub fn at_pos(&self, id: CellId, maze: &Maze) -> bool {
        self.position.distance(maze.center_of(id)) < ARRIVAL_EPSILON
    }

    /// Puts the agent on a cell, dropping any path being followed.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for the maze.
    pub fn place(&mut self, id: CellId, maze: &Maze) {
        self.position = maze.center_of(id);
        self.waypoints.clear();
        self.moving = false;
        self.reached = Some(id);
        self.sprite.activate(IDLE_CLIP);
    }

    /// Moves the agent's home and puts the agent there.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range for the maze.
    pub fn set_home(&mut self, id: CellId, maze: &Maze) {
        self.home = id;
        self.place(id, maze);
    }

    /// Returns the cell the agent starts from.
    pub const fn home(&self) -> CellId {
        self.home
    }

    /// Returns the position of the agent in maze space.
    pub const fn position(&self) -> Point {
        self.position
    }

    /// Returns the last waypoint the agent arrived at.
    pub const fn reached(&self) -> Option<CellId> {
        self.reached
    }

    /// Returns the waypoints still ahead of the agent.
    pub const fn waypoints(&self) -> &VecDeque<CellId> {
        &self.waypoints
    }

    /// Returns whether the agent is following a path.
    pub const fn is_moving(&self) -> bool {
        self.moving
    }

    /// Returns the glyph to draw for the agent.
    pub fn glyph(&self) -> char {
        self.sprite.frame().unwrap_or('@')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELTA: Duration = Duration::from_millis(50);

    #[test]
    fn test_new_agent_stands_home() {
        let maze = Maze::new(2, 2);
        let agent = Agent::new(3, &maze, 4.0);

        assert!(agent.at_pos(3, &maze));
        assert!(!agent.at_pos(2, &maze));
        assert_eq!(agent.home(), 3);
        assert!(!agent.is_moving());
        assert_eq!(agent.glyph(), '@');
    }

    #[test]
    fn test_follows_path_and_arrives_once() {
        let maze = Maze::new(1, 3);
        let mut agent = Agent::new(0, &maze, 4.0);
        agent.follow_path(&[0, 1, 2]);

        let mut visited = Vec::new();
        let mut arrivals = 0;
        for _ in 0..200 {
            if agent.update(DELTA, &maze) {
                arrivals += 1;
            }
            if let Some(cell) = agent.reached() {
                if visited.last() != Some(&cell) {
                    visited.push(cell);
                }
            }
        }

        assert_eq!(arrivals, 1);
        assert_eq!(visited, vec![0, 1, 2]);
        assert!(agent.at_pos(2, &maze));
        assert!(!agent.is_moving());
        assert!(agent.waypoints().is_empty());
    }

    #[test]
    fn test_moves_at_fixed_velocity() {
        let maze = Maze::new(1, 3);
        let mut agent = Agent::new(0, &maze, 4.0);
        agent.follow_path(&[1]);

        assert!(!agent.update(DELTA, &maze));
        // 4 units per second for 50ms.
        assert!((agent.position().x - 0.7).abs() < 1e-9);
        assert!((agent.position().y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_long_frame_covers_several_cells() {
        let maze = Maze::new(1, 5);
        let mut agent = Agent::new(0, &maze, 4.0);
        agent.follow_path(&[0, 1, 2, 3, 4]);

        // 4 cells per second for one second reaches the last cell in a single update.
        assert!(agent.update(Duration::from_secs(1), &maze));
        assert!(agent.at_pos(4, &maze));
        assert_eq!(agent.reached(), Some(4));
        assert!(agent.waypoints().is_empty());
        assert!(!agent.update(DELTA, &maze));
    }

    #[test]
    fn test_leftover_budget_carries_past_waypoints() {
        let maze = Maze::new(1, 5);
        let mut agent = Agent::new(0, &maze, 4.0);
        agent.follow_path(&[0, 1, 2, 3, 4]);

        assert!(!agent.update(Duration::from_millis(625), &maze));
        // 2.5 cells travelled from the center of cell 0.
        assert!((agent.position().x - 3.0).abs() < 1e-9);
        assert_eq!(agent.reached(), Some(2));
        assert_eq!(agent.waypoints().len(), 2);
    }

    #[test]
    fn test_empty_path_completes_once() {
        let maze = Maze::new(1, 2);
        let mut agent = Agent::new(0, &maze, 4.0);
        agent.follow_path(&[]);

        assert!(agent.update(DELTA, &maze));
        assert!(!agent.update(DELTA, &maze));
        assert!(agent.at_pos(0, &maze));
    }

    #[test]
    fn test_idle_agent_never_reports_arrival() {
        let maze = Maze::new(1, 2);
        let mut agent = Agent::new(0, &maze, 4.0);

        for _ in 0..10 {
            assert!(!agent.update(DELTA, &maze));
        }
    }

    #[test]
    fn test_place_drops_path() {
        let maze = Maze::new(2, 2);
        let mut agent = Agent::new(0, &maze, 4.0);
        agent.follow_path(&[1, 3]);
        let _ = agent.update(DELTA, &maze);

        agent.place(2, &maze);
        assert!(agent.at_pos(2, &maze));
        assert!(!agent.is_moving());
        assert!(agent.waypoints().is_empty());
        assert_eq!(agent.home(), 0);

        agent.set_home(3, &maze);
        assert_eq!(agent.home(), 3);
        assert!(agent.at_pos(3, &maze));
    }

    #[test]
    fn test_walk_animation_plays_while_moving() {
        let maze = Maze::new(1, 3);
        let mut agent = Agent::new(0, &maze, 4.0);
        agent.follow_path(&[1, 2]);

        assert_eq!(agent.glyph(), 'o');
        let _ = agent.update(Duration::from_millis(160), &maze);
        assert_eq!(agent.glyph(), 'O');
    }
}
