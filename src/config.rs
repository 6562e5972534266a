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

use crate::client::HttpSettings;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

pub const DEFAULT_REPORT_DIR: &str = "reports";
pub const DEFAULT_LOG_DIR: &str = "log";
pub const DEFAULT_LOG_FILE: &str = "acishell.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_BACKUP: usize = 7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    pub apic: Option<String>,
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct CommonConfig {
    pub report_dir: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct SecurityConfig {
    pub verify_tls: Option<bool>,
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub dir: Option<PathBuf>,
    pub file: Option<String>,
    pub level: Option<String>,
    pub rotation: Option<LogRotation>,
    pub backup: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[serde(alias = "m")]
    Minutely,
    #[serde(alias = "h")]
    Hourly,
    #[default]
    #[serde(alias = "d", alias = "midnight")]
    Daily,
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Local,
    User,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate a writable config directory for the current user")]
    MissingConfigDir,
    #[error("config file {0:?} does not exist")]
    MissingFile(PathBuf),
}

/// Fully defaulted settings the rest of the program runs with.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub apic: Option<String>,
    pub common: EffectiveCommon,
    pub security: EffectiveSecurity,
    pub logging: EffectiveLogging,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EffectiveCommon {
    pub report_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EffectiveSecurity {
    pub verify_tls: bool,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EffectiveLogging {
    pub dir: PathBuf,
    pub file: String,
    pub level: String,
    pub rotation: LogRotation,
    pub backup: usize,
}

impl EffectiveConfig {
    /// String view of a single setting, e.g. `get("common", "report_dir")`.
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        let tree = serde_yaml::to_value(self).ok()?;
        match tree.get(section)?.get(key)? {
            serde_yaml::Value::String(s) => Some(s.clone()),
            serde_yaml::Value::Bool(b) => Some(b.to_string()),
            serde_yaml::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            verify_tls: self.security.verify_tls,
            timeout: Duration::from_secs(self.security.timeout_secs),
        }
    }
}

pub fn config_path(scope: Scope, cwd: &Path) -> Result<PathBuf> {
    match scope {
        Scope::Local => Ok(cwd.join(".acishell.yaml")),
        Scope::User => {
            if let Ok(custom) = env::var("ACISHELL_CONFIG_DIR") {
                return Ok(PathBuf::from(custom).join("config.yaml"));
            }
            let base = config_dir().ok_or(ConfigError::MissingConfigDir)?;
            Ok(base.join("acishell").join("config.yaml"))
        }
    }
}

pub fn load(cwd: &Path) -> Result<Config> {
    let user = read_if_exists(&config_path(Scope::User, cwd)?)?.unwrap_or_default();
    let local = read_if_exists(&config_path(Scope::Local, cwd)?)?.unwrap_or_default();
    Ok(merge(user, local))
}

pub fn load_scope(scope: Scope, cwd: &Path) -> Result<Config> {
    Ok(read_if_exists(&config_path(scope, cwd)?)?.unwrap_or_default())
}

pub fn save(scope: Scope, config: &Config, cwd: &Path) -> Result<PathBuf> {
    let path = config_path(scope, cwd)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(config).context("serializing config")?;
    fs::write(&path, serialized).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

/// Loads either the explicit `--config` file or the merged user/project
/// files, then applies defaults.
pub fn resolve(
    cwd: &Path,
    explicit: Option<&Path>,
    apic_override: Option<String>,
) -> Result<EffectiveConfig> {
    let mut merged = match explicit {
        Some(path) => {
            read_if_exists(path)?.ok_or_else(|| ConfigError::MissingFile(path.to_path_buf()))?
        }
        None => load(cwd)?,
    };
    if let Some(apic) = apic_override {
        merged.apic = Some(apic);
    }
    Ok(apply_defaults(merged))
}

fn apply_defaults(config: Config) -> EffectiveConfig {
    let Config {
        apic,
        common,
        security,
        logging,
    } = config;
    EffectiveConfig {
        apic: apic.map(|a| a.trim().to_string()).filter(|a| !a.is_empty()),
        common: EffectiveCommon {
            report_dir: common
                .report_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_DIR)),
        },
        security: EffectiveSecurity {
            verify_tls: security.verify_tls.unwrap_or(true),
            timeout_secs: security.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS),
        },
        logging: EffectiveLogging {
            dir: logging.dir.unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            file: logging.file.unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
            level: logging
                .level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            rotation: logging.rotation.unwrap_or_default(),
            backup: logging.backup.unwrap_or(DEFAULT_LOG_BACKUP),
        },
    }
}

fn read_if_exists(path: &Path) -> Result<Option<Config>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let config = serde_yaml::from_str(&contents).with_context(|| format!("parsing {:?}", path))?;
    Ok(Some(config))
}

fn merge(user: Config, local: Config) -> Config {
    Config {
        apic: local.apic.or(user.apic),
        common: CommonConfig {
            report_dir: local.common.report_dir.or(user.common.report_dir),
        },
        security: SecurityConfig {
            verify_tls: local.security.verify_tls.or(user.security.verify_tls),
            timeout_secs: local.security.timeout_secs.or(user.security.timeout_secs),
        },
        logging: LoggingConfig {
            dir: local.logging.dir.or(user.logging.dir),
            file: local.logging.file.or(user.logging.file),
            level: local.logging.level.or(user.logging.level),
            rotation: local.logging.rotation.or(user.logging.rotation),
            backup: local.logging.backup.or(user.logging.backup),
        },
    }
}
