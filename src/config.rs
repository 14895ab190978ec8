//! YAML configuration for the import command.
//!
//! Every setting can also be given on the command line; CLI values win over
//! the file, and the file wins over built-in defaults.

use crate::augment::{default_anchor, parse_timestamp, AugmentOptions};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_DUMP: &str = "data.sql";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DATABASE: &str = "heartcare.duckdb";
pub const DEFAULT_AUGMENT_TABLE: &str = "HeartRecords";

/// Synthetic padding section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentYamlConfig {
    pub enabled: bool,
    /// Source table to pad
    pub table: String,
    /// First synthetic timestamp when the real rows have none
    pub anchor: Option<String>,
    /// Hours between consecutive synthetic rows
    pub step_hours: Option<i64>,
}

impl Default for AugmentYamlConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            table: DEFAULT_AUGMENT_TABLE.to_string(),
            anchor: None,
            step_hours: None,
        }
    }
}

/// Root of the YAML file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportYamlConfig {
    pub dump: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub seed: Option<u64>,
    pub augment: AugmentYamlConfig,
}

impl ImportYamlConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ImportYamlConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

/// Values taken from the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub dump: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub seed: Option<u64>,
    pub no_augment: bool,
}

/// Synthetic padding, resolved
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentSettings {
    pub table: String,
    pub options: AugmentOptions,
}

/// Fully resolved import settings
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSettings {
    pub dump: PathBuf,
    pub data_dir: PathBuf,
    pub database: PathBuf,
    pub seed: u64,
    pub augment: Option<AugmentSettings>,
}

impl ImportSettings {
    /// Merge CLI values, the optional file and defaults
    pub fn resolve(cli: CliOverrides, file: Option<ImportYamlConfig>) -> anyhow::Result<Self> {
        let file = file.unwrap_or_default();

        let augment = if cli.no_augment || !file.augment.enabled {
            None
        } else {
            let anchor = match file.augment.anchor.as_deref() {
                Some(raw) => parse_timestamp(raw)
                    .ok_or_else(|| anyhow::anyhow!("invalid augment anchor timestamp: {}", raw))?,
                None => default_anchor(),
            };
            let step = match file.augment.step_hours {
                Some(h) if h <= 0 => anyhow::bail!("augment.step_hours must be positive"),
                Some(h) => Duration::try_hours(h)
                    .ok_or_else(|| anyhow::anyhow!("augment.step_hours is too large: {}", h))?,
                None => AugmentOptions::default().step,
            };
            Some(AugmentSettings {
                table: file.augment.table,
                options: AugmentOptions { anchor, step },
            })
        };

        Ok(Self {
            dump: cli
                .dump
                .or(file.dump)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DUMP)),
            data_dir: cli
                .data_dir
                .or(file.data_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            database: cli
                .database
                .or(file.database)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
            seed: cli.seed.or(file.seed).unwrap_or_else(rand::random),
            augment,
        })
    }
}
