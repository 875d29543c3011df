use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use env_logger::{Builder as LogBuilder, Target};
use log::LevelFilter;

/// Sends every log record to `file`, one `[%Y-%m-%d %H:%M:%S] message` line
/// per record. Unknown level names fall back to `info`.
pub fn init(file: &Path, level: &str) -> Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let sink = OpenOptions::new()
        .create(true)
        .append(true)
        .open(file)
        .with_context(|| format!("failed to open log file {}", file.display()))?;

    LogBuilder::new()
        .filter_level(parse_level(level))
        .target(Target::Pipe(Box::new(sink)))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .try_init()
        .context("failed to install logger")
}

fn parse_level(level: &str) -> LevelFilter {
    LevelFilter::from_str(level.trim()).unwrap_or(LevelFilter::Info)
}
