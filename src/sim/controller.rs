//! Game state controller
//!
//! Owns the level catalog, configuration and the single [`GameState`]
//! record. Every mutation goes through `load_level`, `submit` or `restart`,
//! and each one notifies subscribers afterwards so the UI can re-query and
//! redraw.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use super::expr::{EvalError, Expr};
use super::level::{Level, LevelCatalog};
use super::state::{GameState, Status};
use super::trajectory::{Shot, ShotOutcome, Trace, evaluate_shot, trace};
use crate::settings::{ConfigError, GameConfig};

/// Handle returned by [`GameController::subscribe`]
pub type SubscriptionId = u32;

/// State-change callback. The trace is present only when it belongs to the
/// level currently on the board.
type Listener = Box<dyn FnMut(&GameState, Option<&Trace>)>;

pub struct GameController {
    catalog: LevelCatalog,
    config: GameConfig,
    state: GameState,
    rng: Pcg32,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: SubscriptionId,
}

impl GameController {
    /// Create a controller positioned on the first level
    ///
    /// The config is validated here, so a hand-built config with a zero step
    /// or an empty start range is rejected before any level loads.
    pub fn new(catalog: LevelCatalog, config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut controller = Self {
            catalog,
            config,
            state: GameState {
                start_x: 0.0,
                level_index: 0,
                expression: String::new(),
                status: Status::Ready,
            },
            rng: Pcg32::seed_from_u64(seed),
            listeners: Vec::new(),
            next_subscription: 1,
        };
        controller.enter_level(0);
        log::info!(
            "Game initialized with seed {} ({} levels)",
            seed,
            controller.catalog.len()
        );
        Ok(controller)
    }

    /// Create a controller with a non-reproducible seed
    pub fn with_random_seed(catalog: LevelCatalog, config: GameConfig) -> Result<Self, ConfigError> {
        Self::new(catalog, config, rand::random())
    }

    // === Accessors ===

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &LevelCatalog {
        &self.catalog
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Active level
    pub fn level(&self) -> &Level {
        self.catalog.clamped(self.state.level_index)
    }

    pub fn hint(&self) -> &str {
        &self.level().hint
    }

    pub fn status_message(&self) -> String {
        self.state.status.message()
    }

    /// Player position in canvas coordinates
    pub fn start(&self) -> DVec2 {
        DVec2::new(self.state.start_x, self.config.start_y())
    }

    // === Subscriptions ===

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&GameState, Option<&Trace>) + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, trace: Option<&Trace>) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&self.state, trace);
        }
    }

    // === Operations ===

    /// Load a level: new random start, input reset to the level's example
    ///
    /// The index is clamped to the catalog and never moves backwards. A
    /// completed game keeps its `Completed` status; only `restart` clears it.
    pub fn load_level(&mut self, index: usize) {
        let index = index.clamp(self.state.level_index, self.catalog.last_index());
        self.enter_level(index);
        if !self.state.is_completed() {
            self.state.status = Status::Ready;
        }
        self.notify(None);
    }

    /// Start over from the first level with a fresh board
    pub fn restart(&mut self) {
        self.state.level_index = 0;
        self.enter_level(0);
        self.state.status = Status::Ready;
        log::info!("Game restarted");
        self.notify(None);
    }

    /// Submit a function: re-roll the start, trace it and update the status
    ///
    /// Clearing a level advances to the next one; clearing the last level
    /// sets the terminal `Completed` status. Once completed, shots are still
    /// traced but the status no longer changes.
    pub fn submit(&mut self, expression: &str) -> Shot {
        self.state.expression = expression.to_string();
        self.state.start_x = self.roll_start_x();

        let index = self.state.level_index;
        let shot = evaluate_shot(
            self.catalog.clamped(index),
            self.start(),
            expression,
            &self.config,
        );

        if self.state.is_completed() {
            self.notify(shot.trace.as_ref());
            return shot;
        }

        let mut advanced = false;
        self.state.status = match &shot.outcome {
            ShotOutcome::ObstacleHit => Status::ObstacleHit,
            ShotOutcome::Missed { distance } => Status::Missed {
                distance: *distance,
            },
            ShotOutcome::TraceFailed(err) => Status::trace_failed(err),
            ShotOutcome::TargetCheckFailed(err) => Status::target_check_failed(err),
            ShotOutcome::TargetHit { distance } if index < self.catalog.last_index() => {
                let next = index + 1;
                self.enter_level(next);
                advanced = true;
                log::info!("Level {} cleared (distance {:.2})", index + 1, distance);
                Status::LevelCleared {
                    distance: *distance,
                    next_level: next + 1,
                }
            }
            ShotOutcome::TargetHit { .. } => {
                log::info!("All {} levels completed", self.catalog.len());
                Status::Completed
            }
        };

        // A trace from the previous level does not belong on the new board
        let trace = if advanced { None } else { shot.trace.as_ref() };
        self.notify(trace);
        shot
    }

    /// Trace `expression` from the current start without changing any state
    pub fn preview(&self, expression: &str) -> Result<Trace, EvalError> {
        let expr = Expr::parse(expression)?;
        trace(self.level(), self.start(), &expr, &self.config)
    }

    /// Snapshot of everything the renderer draws
    pub fn scene(&self, trace: Option<&Trace>) -> Scene {
        let level = self.level();
        Scene {
            width: self.config.width,
            height: self.config.height,
            player: Circle::new(self.start(), self.config.player_radius),
            target: Circle::new(level.target, self.config.target_radius),
            obstacle: Circle::new(level.obstacle, self.config.obstacle_radius),
            trace: trace.map(|t| t.points.clone()).unwrap_or_default(),
            obstacle_hit: trace.is_some_and(|t| t.obstacle_hit),
            level: self.state.level_index + 1,
            level_count: self.catalog.len(),
            hint: level.hint.clone(),
            status: self.state.status.message(),
        }
    }

    fn enter_level(&mut self, index: usize) {
        self.state.level_index = index;
        self.state.start_x = self.roll_start_x();
        self.state.expression = self.catalog.clamped(index).example_expression().to_string();
        log::info!(
            "Level {}/{} loaded, start x = {:.1}",
            index + 1,
            self.catalog.len(),
            self.state.start_x
        );
    }

    fn roll_start_x(&mut self) -> f64 {
        self.rng.random_range(self.config.start_x_range())
    }
}

/// A filled circle on the board
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub center: DVec2,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: DVec2, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Render snapshot handed to the drawing layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub player: Circle,
    pub target: Circle,
    pub obstacle: Circle,
    /// Polyline of the latest trace (empty when none)
    pub trace: Vec<DVec2>,
    pub obstacle_hit: bool,
    /// 1-based
    pub level: usize,
    pub level_count: usize,
    pub hint: String,
    pub status: String,
}

impl Scene {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
