//! Sandbox settings with persistence
//!
//! Settings are read from the path given on the command line, or from
//! `~/.config/lumen/sandbox.toml`.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::Level;

/// World that receives the per-tick statistics entity.
pub const STATS_WORLD: &str = "stats";

/// Everything the sandbox run can be tuned with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxSettings {
    /// Named worlds registered next to the default one
    pub worlds: Vec<String>,
    /// Entities spawned into the default world at start-up
    pub entities: u32,
    /// Number of ticks to run before shutting down
    pub ticks: u32,
    /// Seconds advanced per tick
    pub time_step: f32,
    /// Freeze one more entity every this many ticks (0 = never)
    pub freeze_interval: u32,
    /// Acceleration applied to every unfrozen entity
    pub gravity: Vec2,
    /// Maximum log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for SandboxSettings {
    fn default() -> Self {
        Self {
            worlds: vec![STATS_WORLD.to_string()],
            entities: 64,
            ticks: 120,
            time_step: 1.0 / 60.0,
            freeze_interval: 10,
            gravity: Vec2::new(0.0, -9.81),
            log_level: "info".to_string(),
        }
    }
}

/// Where the loaded settings came from
#[derive(Debug, Clone, PartialEq)]
pub enum SettingsOrigin {
    File(PathBuf),
    Missing(PathBuf),
    Unreadable { path: PathBuf, error: String },
    NoConfigDir,
}

impl fmt::Display for SettingsOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "loaded from {:?}", path),
            Self::Missing(path) => write!(f, "no settings at {:?}, using defaults", path),
            Self::Unreadable { path, error } => {
                write!(f, "failed to load {:?}: {}, using defaults", path, error)
            }
            Self::NoConfigDir => write!(f, "could not determine config directory, using defaults"),
        }
    }
}

impl SettingsOrigin {
    /// Whether the defaults were used because something went wrong
    pub fn is_fallback(&self) -> bool {
        !matches!(self, Self::File(_) | Self::Missing(_))
    }
}

impl SandboxSettings {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lumen"))
    }

    /// Default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("sandbox.toml"))
    }

    /// Load settings from `path` (or the default path), falling back to
    /// defaults. Nothing is logged here since this runs before the
    /// subscriber is installed; the origin is returned for the caller.
    pub fn load(path: Option<&Path>) -> (Self, SettingsOrigin) {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::settings_path() {
                Some(path) => path,
                None => return (Self::default(), SettingsOrigin::NoConfigDir),
            },
        };

        if !path.exists() {
            return (Self::default(), SettingsOrigin::Missing(path));
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => (settings, SettingsOrigin::File(path)),
                Err(e) => (
                    Self::default(),
                    SettingsOrigin::Unreadable {
                        path,
                        error: e.to_string(),
                    },
                ),
            },
            Err(e) => (
                Self::default(),
                SettingsOrigin::Unreadable {
                    path,
                    error: e.to_string(),
                },
            ),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save settings to `path`, creating parent directories as needed
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// The configured log level, or `INFO` when it does not parse
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}
