//! Trajectory simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - No rendering or platform dependencies
//! - Randomness only through the controller's seeded RNG
//! - Evaluation errors are values, never panics

pub mod controller;
pub mod expr;
pub mod geometry;
pub mod level;
pub mod state;
pub mod trajectory;

pub use controller::{Circle, GameController, Scene, SubscriptionId};
pub use expr::{EvalError, Expr, evaluate};
pub use geometry::{blockade_collision, distance_to_segment, segment_circle_contact, segment_intersects_circle};
pub use level::{CatalogError, Level, LevelCatalog};
pub use state::{GameState, Status};
pub use trajectory::{Shot, ShotOutcome, Trace, check_target, evaluate_shot, to_canvas, trace};
