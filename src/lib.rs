//! Function Aim - type a function, dodge the blockade, hit the target
//!
//! Core modules:
//! - `sim`: Expression evaluation, collision geometry, trajectory tracing and game state
//! - `settings`: Data-driven game configuration

pub mod settings;
pub mod sim;

pub use settings::{CollisionMode, ConfigError, GameConfig};
pub use sim::{GameController, GameState, LevelCatalog, Status};

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions (logical units)
    pub const CANVAS_WIDTH: f64 = 800.0;
    pub const CANVAS_HEIGHT: f64 = 600.0;

    /// Player sits this far above the bottom edge
    pub const PLAYER_OFFSET: f64 = 50.0;
    pub const PLAYER_RADIUS: f64 = 20.0;

    pub const TARGET_RADIUS: f64 = 20.0;
    /// Blockade (obstacle) radius
    pub const OBSTACLE_RADIUS: f64 = 40.0;

    /// Horizontal distance between trace samples
    pub const SAMPLE_STEP: f64 = 5.0;
    /// Start X is drawn from [START_MARGIN, CANVAS_WIDTH - START_MARGIN]
    pub const START_MARGIN: f64 = 50.0;

    /// Upper bound on samples in one trace
    pub const MAX_SAMPLES: usize = 10_000;
}
