//! Game configuration
//!
//! Canvas geometry, radii and sampling parameters. Defaults match the
//! classic board; a JSON override can be supplied by the host page.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How a trace segment is tested against the blockade circle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CollisionMode {
    /// Infinite line through both samples (classic behavior, stricter)
    #[default]
    InfiniteLine,
    /// Bounded segment between the samples
    Segment,
}

impl CollisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionMode::InfiniteLine => "infinite_line",
            CollisionMode::Segment => "segment",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "infinite_line" | "line" => Some(CollisionMode::InfiniteLine),
            "segment" | "seg" => Some(CollisionMode::Segment),
            _ => None,
        }
    }
}

/// Invalid configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("start margin {margin} leaves no room on a canvas {width} wide")]
    MarginTooLarge { margin: f64, width: f64 },

    #[error("sample step {step} needs {samples} samples to cross the board (max {max})")]
    TooManySamples { step: f64, samples: f64, max: usize },

    #[error("unknown collision mode '{0}' (expected 'infinite_line' or 'segment')")]
    UnknownCollision(String),
}

/// Board and sampling configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub width: f64,
    pub height: f64,
    /// Distance of the player above the bottom edge
    pub player_offset: f64,
    pub player_radius: f64,
    pub target_radius: f64,
    pub obstacle_radius: f64,
    /// Horizontal step between trace samples
    pub sample_step: f64,
    /// Start X keeps this far from either side
    pub start_margin: f64,
    pub collision: CollisionMode,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
            player_offset: PLAYER_OFFSET,
            player_radius: PLAYER_RADIUS,
            target_radius: TARGET_RADIUS,
            obstacle_radius: OBSTACLE_RADIUS,
            sample_step: SAMPLE_STEP,
            start_margin: START_MARGIN,
            collision: CollisionMode::InfiniteLine,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded config: {}x{}, step {}, collision {}",
            config.width,
            config.height,
            config.sample_step,
            config.collision.as_str()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("width", self.width),
            ("height", self.height),
            ("sample_step", self.sample_step),
            ("target_radius", self.target_radius),
            ("obstacle_radius", self.obstacle_radius),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.start_margin >= 0.0 && 2.0 * self.start_margin < self.width) {
            return Err(ConfigError::MarginTooLarge {
                margin: self.start_margin,
                width: self.width,
            });
        }
        let samples = (self.width / self.sample_step).ceil();
        if samples > MAX_SAMPLES as f64 {
            return Err(ConfigError::TooManySamples {
                step: self.sample_step,
                samples,
                max: MAX_SAMPLES,
            });
        }
        Ok(())
    }

    /// Override the collision mode by name (`line`, `segment`, ...)
    pub fn with_collision_name(mut self, name: &str) -> Result<Self, ConfigError> {
        self.collision = CollisionMode::from_str(name.trim())
            .ok_or_else(|| ConfigError::UnknownCollision(name.to_string()))?;
        log::info!("Collision mode set to {}", self.collision.as_str());
        Ok(self)
    }

    /// Vertical position of the player (canvas Y grows downward)
    #[inline]
    pub fn start_y(&self) -> f64 {
        self.height - self.player_offset
    }

    /// Range start X is drawn from
    pub fn start_x_range(&self) -> std::ops::RangeInclusive<f64> {
        self.start_margin..=(self.width - self.start_margin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_classic_board() {
        let config = GameConfig::default();
        assert_eq!(config.start_y(), 550.0);
        assert_eq!(config.start_x_range(), 50.0..=750.0);
        assert_eq!(config.collision, CollisionMode::InfiniteLine);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "sample_step": 2.5, "collision": "segment" }"#)
            .unwrap();
        assert_eq!(config.sample_step, 2.5);
        assert_eq!(config.collision, CollisionMode::Segment);
        assert_eq!(config.width, 800.0);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "sample_step": 0 }"#),
            Err(ConfigError::NotPositive { field: "sample_step", .. })
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{ "start_margin": 400 }"#),
            Err(ConfigError::MarginTooLarge { .. })
        ));
        assert!(matches!(GameConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_rejects_tiny_sample_step() {
        assert!(matches!(
            GameConfig::from_json(r#"{ "sample_step": 1e-9 }"#),
            Err(ConfigError::TooManySamples { max: MAX_SAMPLES, .. })
        ));
        assert!(GameConfig::from_json(r#"{ "sample_step": 0.1 }"#).is_ok());
    }

    #[test]
    fn test_collision_mode_from_str() {
        assert_eq!(CollisionMode::from_str("Segment"), Some(CollisionMode::Segment));
        assert_eq!(CollisionMode::from_str("line"), Some(CollisionMode::InfiniteLine));
        assert_eq!(CollisionMode::from_str("circle"), None);
    }

    #[test]
    fn test_collision_name_override() {
        let config = GameConfig::default().with_collision_name(" Segment ").unwrap();
        assert_eq!(config.collision, CollisionMode::Segment);
        assert!(matches!(
            GameConfig::default().with_collision_name("circle"),
            Err(ConfigError::UnknownCollision(name)) if name == "circle"
        ));
    }
}
