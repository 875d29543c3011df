use crate::version::VERSION;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "minishell",
    version = VERSION,
    about = "Interactive shell with undoable file management and safe archives",
    arg_required_else_help = false,
    disable_help_subcommand = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default)
    Run,
    /// Print the minishell usage guide
    Usage,
    /// Manage minishell configuration settings
    Settings(SettingsArgs),
    /// Print the current minishell version
    Version,
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// List current configuration settings
    List,
}
