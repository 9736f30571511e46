use serde::{Deserialize, Serialize};
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::app_dirs::AppDirs;
use crate::error::ConfigError;

/// Allowed total warmup/cooldown length in seconds
pub const SEGMENT_RANGE: RangeInclusive<u32> = 10..=300;
pub const INTERVAL_RANGE: RangeInclusive<u32> = 1..=3600;
pub const ROUNDS_RANGE: RangeInclusive<u32> = 1..=99;
pub const EXERCISE_COUNT_RANGE: RangeInclusive<u32> = 0..=10;

/// Persisted workout preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub warmup_duration: u32,
    pub cooldown_duration: u32,
    pub work_seconds: u32,
    pub rest_seconds: u32,
    pub rounds: u32,
    pub warmup_exercises: u32,
    pub cooldown_exercises: u32,
    pub sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            warmup_duration: 60,
            cooldown_duration: 60,
            work_seconds: 40,
            rest_seconds: 20,
            rounds: 8,
            warmup_exercises: 3,
            cooldown_exercises: 3,
            sound: true,
        }
    }
}

fn check(field: &'static str, value: u32, range: &RangeInclusive<u32>) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

fn clamp(value: u32, range: &RangeInclusive<u32>) -> u32 {
    value.clamp(*range.start(), *range.end())
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("warmup_duration", self.warmup_duration, &SEGMENT_RANGE)?;
        check("cooldown_duration", self.cooldown_duration, &SEGMENT_RANGE)?;
        check("work_seconds", self.work_seconds, &INTERVAL_RANGE)?;
        check("rest_seconds", self.rest_seconds, &INTERVAL_RANGE)?;
        check("rounds", self.rounds, &ROUNDS_RANGE)?;
        check("warmup_exercises", self.warmup_exercises, &EXERCISE_COUNT_RANGE)?;
        check("cooldown_exercises", self.cooldown_exercises, &EXERCISE_COUNT_RANGE)?;
        Ok(())
    }

    /// Copy with every field independently clamped into its valid range
    pub fn clamped(&self) -> Self {
        Self {
            warmup_duration: clamp(self.warmup_duration, &SEGMENT_RANGE),
            cooldown_duration: clamp(self.cooldown_duration, &SEGMENT_RANGE),
            work_seconds: clamp(self.work_seconds, &INTERVAL_RANGE),
            rest_seconds: clamp(self.rest_seconds, &INTERVAL_RANGE),
            rounds: clamp(self.rounds, &ROUNDS_RANGE),
            warmup_exercises: clamp(self.warmup_exercises, &EXERCISE_COUNT_RANGE),
            cooldown_exercises: clamp(self.cooldown_exercises, &EXERCISE_COUNT_RANGE),
            sound: self.sound,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("puls_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        let cfg = match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "unreadable config, using defaults");
                return Config::default();
            }
        };
        if let Err(err) = cfg.validate() {
            warn!(path = %self.path.display(), error = %err, "clamping out-of-range config");
            return cfg.clamped();
        }
        cfg
    }

    fn save(&self, cfg: &Config) -> Result<(), ConfigError> {
        cfg.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
