use anyhow::{Context, Result};
use env_logger::{Builder, Target, WriteStyle};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Where log records go
pub enum LogTarget<'a> {
    /// Append to a file; the terminal UI owns stderr
    File(&'a Path),
    Stderr,
}

/// Initialise the global logger.
///
/// `RUST_LOG` wins when set; otherwise this crate logs at info and
/// everything else at warn.
pub fn init(target: LogTarget<'_>) -> Result<()> {
    let mut builder = Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("hoopchat", LevelFilter::Info);
    }

    match target {
        LogTarget::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            builder
                .target(Target::Pipe(Box::new(file)))
                .write_style(WriteStyle::Never);
        }
        LogTarget::Stderr => {
            builder.target(Target::Stderr);
        }
    }

    builder.try_init().context("Failed to initialise logger")?;
    Ok(())
}
