// acishell - interactive shell for Cisco ACI APIC inventory queries
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Console and rolling-file logging.
//!
//! The console layer follows the configured level (raised by `-v`); the file
//! layer always records `info` and above so every login, logout and
//! controller error leaves a durable entry.

use crate::config::{EffectiveLogging, LogRotation};
use anyhow::{Context, Result};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

pub fn init(config: &EffectiveLogging, verbosity: u8) -> Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_directive(&config.level, verbosity)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(console_filter);

    let file = fmt::layer()
        .with_writer(file_appender(config)?)
        .with_ansi(false)
        .with_target(true)
        .with_filter(LevelFilter::INFO);

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .context("initializing logging")?;
    Ok(())
}

fn file_appender(config: &EffectiveLogging) -> Result<RollingFileAppender> {
    let (prefix, suffix) = match config.file.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), Some(ext.to_string())),
        _ => (config.file.clone(), None),
    };
    let mut builder = RollingFileAppender::builder()
        .rotation(rotation(config.rotation))
        .filename_prefix(prefix);
    if let Some(suffix) = suffix {
        builder = builder.filename_suffix(suffix);
    }
    if config.backup > 0 {
        builder = builder.max_log_files(config.backup);
    }
    builder
        .build(&config.dir)
        .with_context(|| format!("opening log directory {:?}", config.dir))
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}

/// Each `-v` raises the configured console level by one step.
fn console_directive(level: &str, verbosity: u8) -> String {
    const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    let base = LEVELS
        .iter()
        .position(|l| l.eq_ignore_ascii_case(level.trim()))
        .unwrap_or(2);
    let idx = (base + verbosity as usize).min(LEVELS.len() - 1);
    format!("acishell={}", LEVELS[idx])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn verbosity_raises_console_level() {
        assert_eq!(console_directive("warn", 0), "acishell=warn");
        assert_eq!(console_directive("WARN", 1), "acishell=info");
        assert_eq!(console_directive("info", 5), "acishell=trace");
        assert_eq!(console_directive("bogus", 0), "acishell=info");
    }

    #[test]
    fn builds_appender_in_configured_directory() {
        let dir = tempdir().unwrap();
        let config = EffectiveLogging {
            dir: dir.path().join("log"),
            file: "acishell.log".into(),
            level: "info".into(),
            rotation: LogRotation::Never,
            backup: 2,
        };
        file_appender(&config).unwrap();
        assert!(dir.path().join("log").is_dir());
    }
}
