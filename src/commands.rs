use anyhow::Result;

use crate::cli::{SettingsArgs, SettingsCommand};
use crate::config::{self, Config};
use crate::dispatch::CommandRegistry;
use crate::help::usage_text;
use crate::logging;
use crate::paths::PathResolver;
use crate::shell::Shell;
use crate::state::{Session, StdinConfirm};
use crate::ui;
use crate::version::VERSION;

pub fn handle_run(config: &Config) -> Result<()> {
    let resolver = PathResolver::from_env()?;
    let home = resolver.home();

    let log_file = resolver.resolve(&config.logging.file, home);
    if let Err(err) = logging::init(&log_file, &config.logging.level) {
        eprintln!("⚠️ Logging disabled: {err:#}");
    }

    let session = Session::new(config, home, Box::new(StdinConfirm));
    let mut shell = Shell::new(CommandRegistry::with_builtins(), session);
    ui::repl::run(&mut shell, config.quiet)
}

pub fn handle_usage() {
    println!("{}", usage_text());
}

pub fn handle_settings(args: &SettingsArgs) -> Result<()> {
    match args.command {
        SettingsCommand::List => {
            config::display_settings()?;
        }
    }
    Ok(())
}

pub fn handle_version() {
    println!("{}", VERSION);
}
