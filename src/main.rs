//! This crate contains the source code for the mazewalk binary.

#![expect(
    clippy::cargo_common_metadata,
    reason = "Temporary allow during development."
)]
#![expect(
    unused_crate_dependencies,
    reason = "The dependencies are used in the library crate."
)]

use std::io::stdout;

use clap::Parser as _;
use color_eyre::{eyre::Result, install};
use mazewalk::{config::Config, logging, App};
use ratatui::crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};

fn main() -> Result<()> {
    install()?;

    let config = Config::parse();
    if let Some(path) = &config.log_file {
        logging::init(path, config.log_level)?;
    }
    let mut app = App::new(&config)?;

    let mut terminal = ratatui::init();
    execute!(stdout(), EnableMouseCapture)?;
    let result = app.run(&mut terminal);
    let released = execute!(stdout(), DisableMouseCapture);
    ratatui::restore();

    released?;
    result
}
