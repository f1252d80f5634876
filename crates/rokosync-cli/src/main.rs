mod app;
mod args;
mod commands;
mod ipc;
mod ui;

use anyhow::Result;
use clap::Parser;

use args::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        ui::error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    rokosync_core::set_verbose(cli.verbose);

    match cli.command {
        None => commands::session::run(cli.config, false),
        Some(Commands::Session { start }) => commands::session::run(cli.config, start),
        Some(Commands::Config(args)) => commands::config::run(cli.config, args),
        Some(Commands::Setup) => commands::setup::run(cli.config),
        Some(Commands::Toggle) => commands::toggle::run(),
        Some(Commands::Check) => commands::check::run(cli.config),
    }
}
