//! Startup configuration
//!
//! Everything has a default matching the shipped game, so an empty YAML
//! document is a valid configuration. Values are validated once after
//! parsing; a bad value is a startup error, never a runtime one.

use std::str::FromStr;

use derive_more::{Display, Error, From};
use serde::{Deserialize, Serialize};
use tracing::Level;

/// Configuration errors, all detected before the first frame
#[derive(Debug, Display, Error, From)]
pub enum ConfigError {
    #[display("YAML parse error: {source}")]
    #[from]
    Parse { source: serde_yaml::Error },
    #[display("gravity must be positive and finite, got {value}")]
    Gravity { value: f64 },
    #[display("restitution must be strictly between 0 and 1, got {value}")]
    Restitution { value: f64 },
    #[display("settle speed must be positive, got {value}")]
    SettleSpeed { value: f64 },
    #[display("max step must be positive, got {value}")]
    MaxStep { value: f64 },
    #[display("piece scale must be in (0, 1], got {value}")]
    PieceScale { value: f64 },
    #[display("unknown log level '{value}'")]
    LogLevel { value: String },
}

/// Falling-piece physics, in pixels and seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (px/s^2)
    pub gravity: f64,
    /// Fraction of speed kept on each bounce
    pub restitution: f64,
    /// Rebound speed (px/s) below which the piece comes to rest
    pub settle_speed: f64,
    /// Longest time step (s) integrated in one frame
    pub max_step: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 3000.0,
            restitution: 0.45,
            settle_speed: 80.0,
            max_step: 0.05,
        }
    }
}

impl PhysicsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.gravity.is_finite() && self.gravity > 0.0) {
            return Err(ConfigError::Gravity { value: self.gravity });
        }
        if !(self.restitution > 0.0 && self.restitution < 1.0) {
            return Err(ConfigError::Restitution {
                value: self.restitution,
            });
        }
        if !(self.settle_speed.is_finite() && self.settle_speed > 0.0) {
            return Err(ConfigError::SettleSpeed {
                value: self.settle_speed,
            });
        }
        if !(self.max_step.is_finite() && self.max_step > 0.0) {
            return Err(ConfigError::MaxStep {
                value: self.max_step,
            });
        }
        Ok(())
    }
}

/// Size and lifetime of the falling piece relative to its cell
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PieceConfig {
    /// Piece edge as a fraction of the cell edge
    pub scale: f64,
    /// Gap (px) between the piece's bottom edge and the board top at spawn
    pub start_gap: f64,
    /// Glyph size as a fraction of the piece width
    pub font_scale: f64,
    /// How long (ms) a settled piece stays on screen before removal
    pub linger_ms: f64,
}

impl Default for PieceConfig {
    fn default() -> Self {
        Self {
            scale: 0.9,
            start_gap: 20.0,
            font_scale: 0.55,
            linger_ms: 50.0,
        }
    }
}

impl PieceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale > 0.0 && self.scale <= 1.0) {
            return Err(ConfigError::PieceScale { value: self.scale });
        }
        Ok(())
    }
}

/// Top-level game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub piece: PieceConfig,
    /// `trace`, `debug`, `info`, `warn` or `error`
    pub log_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            piece: PieceConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse and validate from YAML. Blank input gives the defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: GameConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.physics.validate()?;
        self.piece.validate()?;
        self.level()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(self.log_level.trim()).map_err(|_| ConfigError::LogLevel {
            value: self.log_level.clone(),
        })
    }
}
