// Bar input: JSON loading, validation and synthetic generation
pub mod synthetic;
pub mod validator;

pub use synthetic::{MarketScenario, SyntheticDataGenerator};
pub use validator::BarValidator;

use std::path::Path;

use crate::models::Bar;
use crate::Result;

/// Load a JSON array of bars
pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let bars: Vec<Bar> = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse bars from {}: {}", path.display(), e))?;

    tracing::info!("Loaded {} bars from {}", bars.len(), path.display());
    Ok(bars)
}
