mod archive;
mod banner;
mod builtins;
mod cli;
mod commands;
mod config;
mod constants;
mod dispatch;
mod errors;
mod fs;
mod help;
mod history;
mod logging;
mod paths;
mod shell;
mod state;
mod trash;
mod ui;
mod undo;
mod version;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::{handle_run, handle_settings, handle_usage, handle_version};
use crate::config::Config;

fn main() {
    let cli = Cli::parse();

    let config = match config::load_config() {
        Ok(cfg) => cfg,
        Err(err) => {
            config::print_config_error(&err);
            Config::default()
        }
    };

    let command = cli.command.unwrap_or(Commands::Run);

    let result = match command {
        Commands::Run => handle_run(&config),
        Commands::Usage => {
            handle_usage();
            Ok(())
        }
        Commands::Settings(args) => handle_settings(&args),
        Commands::Version => {
            handle_version();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("❌ {err:#}");
        std::process::exit(1);
    }
}
