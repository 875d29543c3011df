use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_FILE_NAME, GREEN, RESET};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_trash_dir")]
    pub trash_dir: String,
    #[serde(default = "default_history_file")]
    pub history_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_limit")]
    pub default_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: String,
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub quiet: bool,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            trash_dir: default_trash_dir(),
            history_file: default_history_file(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            default_limit: default_history_limit(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            quiet: false,
            storage: StorageConfig::default(),
            history: HistoryConfig::default(),
            archive: ArchiveConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_trash_dir() -> String {
    "~/.minishell/trash".to_string()
}

fn default_history_file() -> String {
    "~/.minishell/history.log".to_string()
}

const fn default_history_limit() -> usize {
    10
}

fn default_excluded_dirs() -> Vec<String> {
    vec![".git".to_string()]
}

fn default_log_file() -> String {
    "~/.minishell/shell.log".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn load_config() -> Result<Config> {
    let (cfg, _) = load_config_with_status()?;
    Ok(cfg)
}

pub fn load_config_with_status() -> Result<(Config, bool)> {
    let path = config_path()?;
    if !path.exists() {
        return Ok((Config::default(), false));
    }

    let data = fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let cfg = parse_config(&data)?;
    Ok((cfg, true))
}

pub fn parse_config(data: &str) -> Result<Config> {
    if data.trim().is_empty() {
        return Ok(Config::default());
    }
    let mut cfg: Config = serde_yaml::from_str(data)
        .with_context(|| "failed to parse configuration from YAML".to_string())?;
    if cfg.history.default_limit == 0 {
        cfg.history.default_limit = default_history_limit();
    }
    Ok(cfg)
}

pub fn config_path() -> Result<PathBuf> {
    let base = BaseDirs::new().context("failed to determine home directory")?;
    Ok(base.home_dir().join(CONFIG_FILE_NAME))
}

pub fn create_default_config_file() -> Result<PathBuf> {
    let path = config_path()?;
    let cfg = Config::default();
    let yaml = serde_yaml::to_string(&cfg)?;
    fs::write(&path, yaml)
        .with_context(|| format!("failed to write default config to {}", path.display()))?;
    Ok(path)
}

pub fn display_settings() -> Result<()> {
    let path = config_path()?;
    let (config, existed) = load_config_with_status()?;

    if !existed {
        println!("📝 Configuration file not found. Creating default configuration...\n");
        let created_path = create_default_config_file()?;
        println!(
            "✅ Created default configuration at: {}\n",
            created_path.display()
        );
    }

    println!("🔧 minishell Configuration Settings");
    println!("═══════════════════════════════════\n");

    if existed {
        println!("📍 Config file: {}", path.display());
    } else {
        println!("📍 Config file: {} (newly created)", path.display());
    }

    println!("Current settings:\n");

    println!("🔘 {green}Verbosity:{reset}", green = GREEN, reset = RESET);
    println!(
        "  • {green}quiet{reset}: {}",
        config.quiet,
        green = GREEN,
        reset = RESET
    );
    println!("    Suppresses the start-up banner\n");

    println!("🗑️ {green}Storage:{reset}", green = GREEN, reset = RESET);
    println!(
        "  • {green}trash_dir{reset}: {}",
        config.storage.trash_dir,
        green = GREEN,
        reset = RESET
    );
    println!(
        "  • {green}history_file{reset}: {}\n",
        config.storage.history_file,
        green = GREEN,
        reset = RESET
    );

    println!("📜 {green}History:{reset}", green = GREEN, reset = RESET);
    println!(
        "  • {green}default_limit{reset}: {}",
        config.history.default_limit,
        green = GREEN,
        reset = RESET
    );
    println!("    Entries shown by 'history' without an argument\n");

    println!("📦 {green}Archives:{reset}", green = GREEN, reset = RESET);
    println!(
        "  • {green}excluded_dirs{reset}: {:?}",
        config.archive.excluded_dirs,
        green = GREEN,
        reset = RESET
    );
    println!("    Directory names skipped by zip, tar, unzip and untar\n");

    println!("📝 {green}Logging:{reset}", green = GREEN, reset = RESET);
    println!(
        "  • {green}file{reset}: {}",
        config.logging.file,
        green = GREEN,
        reset = RESET
    );
    println!(
        "  • {green}level{reset}: {}\n",
        config.logging.level,
        green = GREEN,
        reset = RESET
    );

    println!("💡 To change a setting, edit {}:", path.display());
    println!("   history:\n     default_limit: 25\n");
    Ok(())
}

pub fn print_config_error(err: &anyhow::Error) {
    eprintln!("❌ Failed to load configuration: {err:#}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let cfg = parse_config("quiet: true\nhistory:\n  default_limit: 3\n").unwrap();
        assert!(cfg.quiet);
        assert_eq!(cfg.history.default_limit, 3);
        assert_eq!(cfg.archive.excluded_dirs, vec![".git".to_string()]);
        assert_eq!(cfg.storage.trash_dir, "~/.minishell/trash");
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn zero_limit_is_replaced_by_default() {
        let cfg = parse_config("history:\n  default_limit: 0\n").unwrap();
        assert_eq!(cfg.history.default_limit, 10);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(parse_config("quiet: [unterminated").is_err());
    }

    #[test]
    fn default_config_round_trips_through_yaml() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        let cfg = parse_config(&yaml).unwrap();
        assert_eq!(cfg.storage.history_file, "~/.minishell/history.log");
        assert_eq!(cfg.logging.file, "~/.minishell/shell.log");
    }
}
