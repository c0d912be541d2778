//! Game state and status messages
//!
//! The controller is the only writer of [`GameState`]; the UI layer reads it
//! through subscriptions or `GameController::state`.

use serde::Serialize;

use super::expr::EvalError;

/// Outcome shown to the player after the latest action
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Status {
    /// Level just loaded, nothing submitted yet
    Ready,
    Missed { distance: f64 },
    /// Target hit; `next_level` is 1-based
    LevelCleared { distance: f64, next_level: usize },
    ObstacleHit,
    /// Final level cleared (terminal)
    Completed,
    TraceFailed { error: String },
    TargetCheckFailed { error: String },
}

impl Status {
    pub(crate) fn trace_failed(err: &EvalError) -> Self {
        Status::TraceFailed {
            error: err.to_string(),
        }
    }

    pub(crate) fn target_check_failed(err: &EvalError) -> Self {
        Status::TargetCheckFailed {
            error: err.to_string(),
        }
    }

    /// Human-readable message for the status line
    pub fn message(&self) -> String {
        match self {
            Status::Ready => "Enter a function and press Submit.".to_string(),
            Status::Missed { distance } => format!("Distance to target: {:.2}", distance),
            Status::LevelCleared {
                distance,
                next_level,
            } => format!(
                "Distance to target: {:.2} Target hit! Level {}.",
                distance, next_level
            ),
            Status::ObstacleHit => "Blockade hit! Try a different function.".to_string(),
            Status::Completed => "Congratulations! You've completed all levels!".to_string(),
            Status::TraceFailed { error } => format!("Error evaluating function: {}", error),
            Status::TargetCheckFailed { error } => format!("Error checking target hit: {}", error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Status::TraceFailed { .. } | Status::TargetCheckFailed { .. }
        )
    }
}

/// Single mutable state record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameState {
    /// Player X; Y is fixed by the config
    pub start_x: f64,
    /// 0-based, only increases
    pub level_index: usize,
    /// Current contents of the function input
    pub expression: String,
    pub status: Status,
}

impl GameState {
    pub fn status_message(&self) -> String {
        self.status.message()
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }
}
