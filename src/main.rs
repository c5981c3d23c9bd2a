mod app;
mod config;
mod db;
mod editor;
mod error;
mod gesture;
mod home;
mod image_loader;
mod logging;
mod models;
mod profile;
mod state;
mod view_model;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};

use crate::{
    app::App,
    config::{Cli, Config},
    db::Database,
    view_model::HomeViewModel,
};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let config = Config::from_cli(Cli::parse());
    config.ensure_dirs()?;
    logging::init(&config.log_file)?;

    let db = Database::new(&config.db_path)?;
    let view_model = HomeViewModel::new(db)?;
    let mut app = App::new(view_model, config);

    crossterm::execute!(std::io::stdout(), EnableMouseCapture)?;
    let result = ratatui::run(|t| app.run(t));
    crossterm::execute!(std::io::stdout(), DisableMouseCapture)?;
    result?;

    Ok(())
}
