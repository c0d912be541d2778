//! Level catalog
//!
//! Each level places a target and a blockade on the board and suggests a
//! starting function. The catalog is immutable once built and always holds at
//! least one level.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of every hint; the rest is the example expression
const HINT_PREFIX: &str = "Try: ";

/// A single level definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub target: DVec2,
    /// Blockade center
    pub obstacle: DVec2,
    /// Hint shown under the board, e.g. `Try: x * 0.5`
    pub hint: String,
}

impl Level {
    pub fn new(target: (f64, f64), obstacle: (f64, f64), example: &str) -> Self {
        Self {
            target: DVec2::new(target.0, target.1),
            obstacle: DVec2::new(obstacle.0, obstacle.1),
            hint: format!("{HINT_PREFIX}{example}"),
        }
    }

    /// Expression the input box is reset to when the level loads
    pub fn example_expression(&self) -> &str {
        match self.hint.split_once(": ") {
            Some((_, example)) => example,
            None => &self.hint,
        }
    }
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("level catalog must contain at least one level")]
    Empty,

    #[error("invalid level catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Ordered, non-empty list of levels
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<Level>) -> Result<Self, CatalogError> {
        if levels.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { levels })
    }

    /// Load a catalog from a JSON array of levels
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let levels: Vec<Level> = serde_json::from_str(json)?;
        let catalog = Self::new(levels)?;
        log::info!("Loaded level catalog ({} levels)", catalog.len());
        Ok(catalog)
    }

    /// The ten classic levels
    pub fn standard() -> Self {
        Self {
            levels: vec![
                Level::new((200.0, 300.0), (400.0, 200.0), "x * 0.5"),
                Level::new((600.0, 200.0), (300.0, 300.0), "x * 0.75"),
                Level::new((400.0, 100.0), (200.0, 400.0), "sin(x / 50) * 100"),
                Level::new((700.0, 400.0), (500.0, 200.0), "cos(x / 30) * 50 + 100"),
                Level::new((300.0, 500.0), (600.0, 300.0), "sqrt(x) * 10"),
                // log(x) is -inf at the start sample
                Level::new((500.0, 150.0), (300.0, 400.0), "log(x + 1) * 30"),
                Level::new((200.0, 450.0), (400.0, 200.0), "tan(x / 100) * 50 + 200"),
                Level::new((600.0, 300.0), (400.0, 400.0), "x * sin(x / 20)"),
                Level::new((400.0, 200.0), (200.0, 300.0), "pow(x / 100, 2) * 50"),
                Level::new((700.0, 100.0), (500.0, 400.0), "sin(x / 20) * x / 5"),
            ],
        }
    }

    /// Number of levels (always >= 1)
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Catalogs are never empty
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Index of the final level
    #[inline]
    pub fn last_index(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Level at `index`, clamped to the last level
    pub fn clamped(&self, index: usize) -> &Level {
        &self.levels[index.min(self.last_index())]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

impl Default for LevelCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
