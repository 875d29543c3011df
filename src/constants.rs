pub const GREEN: &str = "\x1b[32m";
pub const RESET: &str = "\x1b[0m";

pub const CONFIG_FILE_NAME: &str = ".minishell.yaml";
pub const HOME_MARKER: &str = "~";
