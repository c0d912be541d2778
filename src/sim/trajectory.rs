//! Trajectory tracing and target check
//!
//! A trace samples the player's function from the start point to the right
//! edge of the board, stopping at the first sample whose segment touches the
//! blockade. The target check runs only for traces that got past the
//! blockade.

use glam::DVec2;
use serde::Serialize;

use super::expr::{EvalError, Expr};
use super::geometry::blockade_collision;
use super::level::Level;
use crate::consts::MAX_SAMPLES;
use crate::settings::GameConfig;

/// Sampled polyline of the player's function (canvas coordinates)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Starts at the player's position
    pub points: Vec<DVec2>,
    pub obstacle_hit: bool,
    /// Index into `points` of the sample that hit the blockade
    pub hit_index: Option<usize>,
}

impl Trace {
    /// Last plotted point
    pub fn end(&self) -> Option<DVec2> {
        self.points.last().copied()
    }
}

/// Map function space (`x` offset, height `y`) to canvas coordinates
#[inline]
pub fn to_canvas(start: DVec2, x: f64, y: f64) -> DVec2 {
    DVec2::new(start.x + x, start.y - y)
}

/// Sample `expr` from `start` to the right edge of the board
///
/// Any evaluation failure aborts the whole trace; no partial trace is
/// returned. At most `MAX_SAMPLES` samples are taken, even for a config
/// that skipped validation.
pub fn trace(level: &Level, start: DVec2, expr: &Expr, config: &GameConfig) -> Result<Trace, EvalError> {
    let span = config.width - start.x;
    let steps = if span >= 0.0 {
        // NaN and infinity saturate in the cast
        ((span / config.sample_step).floor() as usize).min(MAX_SAMPLES)
    } else {
        0
    };

    let mut points = Vec::with_capacity(steps + 2);
    points.push(start);
    let mut prev = start;

    // Integer step counter keeps sample positions free of accumulated error
    for i in 0..=steps {
        let x = i as f64 * config.sample_step;
        let y = expr.eval(x)?;
        let point = to_canvas(start, x, y);

        let hit = blockade_collision(
            config.collision,
            prev,
            point,
            level.obstacle,
            config.obstacle_radius,
        );
        points.push(point);

        if hit {
            let hit_index = points.len() - 1;
            return Ok(Trace {
                points,
                obstacle_hit: true,
                hit_index: Some(hit_index),
            });
        }
        prev = point;
    }

    Ok(Trace {
        points,
        obstacle_hit: false,
        hit_index: None,
    })
}

/// Vertical distance between the function and the target center at the
/// target's horizontal offset
pub fn check_target(level: &Level, start: DVec2, expr: &Expr) -> Result<f64, EvalError> {
    let y = expr.eval(level.target.x - start.x)?;
    Ok((start.y - y - level.target.y).abs())
}

/// What a submitted function did
#[derive(Debug, Clone, PartialEq)]
pub enum ShotOutcome {
    /// Trace touched the blockade; the target was not checked
    ObstacleHit,
    /// Landed within the target radius
    TargetHit { distance: f64 },
    Missed { distance: f64 },
    /// Expression failed to parse or evaluate while tracing
    TraceFailed(EvalError),
    /// Expression failed at the target offset
    TargetCheckFailed(EvalError),
}

impl ShotOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ShotOutcome::TargetHit { .. })
    }
}

/// Full result of one submission
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    /// None when the expression could not be traced
    pub trace: Option<Trace>,
    pub outcome: ShotOutcome,
}

/// Parse, trace and check a single shot
///
/// Never panics on bad input: every failure becomes a `ShotOutcome`.
pub fn evaluate_shot(level: &Level, start: DVec2, expression: &str, config: &GameConfig) -> Shot {
    let expr = match Expr::parse(expression) {
        Ok(expr) => expr,
        Err(err) => {
            log::warn!("Could not parse '{}': {}", expression, err);
            return Shot {
                trace: None,
                outcome: ShotOutcome::TraceFailed(err),
            };
        }
    };

    let trace = match trace(level, start, &expr, config) {
        Ok(trace) => trace,
        Err(err) => {
            log::warn!("Trace of '{}' failed: {}", expression, err);
            return Shot {
                trace: None,
                outcome: ShotOutcome::TraceFailed(err),
            };
        }
    };

    if trace.obstacle_hit {
        log::debug!(
            "'{}' hit the blockade at sample {:?}",
            expression,
            trace.hit_index
        );
        return Shot {
            trace: Some(trace),
            outcome: ShotOutcome::ObstacleHit,
        };
    }

    let outcome = match check_target(level, start, &expr) {
        Ok(distance) if distance < config.target_radius => ShotOutcome::TargetHit { distance },
        Ok(distance) => ShotOutcome::Missed { distance },
        Err(err) => {
            log::warn!("Target check of '{}' failed: {}", expression, err);
            ShotOutcome::TargetCheckFailed(err)
        }
    };
    log::debug!("'{}' from x={:.1}: {:?}", expression, start.x, outcome);

    Shot {
        trace: Some(trace),
        outcome,
    }
}
