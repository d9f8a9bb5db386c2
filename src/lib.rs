//! Interactive maze solver for the terminal.
//!
//! The user edits a grid maze, watches a breadth-first search expand one level at a time from the
//! agent's start to the exit, and then watches the agent walk the shortest path it found. The
//! library is split between the model ([`maze`], [`pathfinding`], [`agent`], [`animation`]), the
//! [`controller`] sequencing the three modes, and a private ratatui front end driven by [`App`].

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]

pub mod agent;
pub mod animation;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod maze;
pub mod pathfinding;
pub mod types;

mod app;
mod events;
mod ui;

pub use app::App;
