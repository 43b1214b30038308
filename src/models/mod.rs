use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV price bar
///
/// Bars handed to the pipeline must be sorted by timestamp with no duplicates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(
        timestamp: DateTime<Utc>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Close minus open
    pub fn spread(&self) -> f64 {
        self.close - self.open
    }
}

/// Chart marker emitted by an event detector
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Marker {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Marker {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp,
            value,
            price: None,
        }
    }

    pub fn with_price(timestamp: DateTime<Utc>, value: f64, price: f64) -> Self {
        Self {
            timestamp,
            value,
            price: Some(price),
        }
    }
}

/// Reds and greens from one regime detector variant
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RegimeMarkers {
    /// Flips into buyer dominance
    pub reds: Vec<Marker>,
    /// Flips into seller dominance
    pub greens: Vec<Marker>,
}

impl RegimeMarkers {
    pub fn len(&self) -> usize {
        self.reds.len() + self.greens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reds.is_empty() && self.greens.is_empty()
    }
}

/// All marker collections produced by one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarkerSet {
    /// Regime flips valued at the smoothed pressure
    pub ema: RegimeMarkers,
    /// Regime flips valued at the close price
    pub price: RegimeMarkers,
    /// Correlation-gradient inversions
    pub blues: Vec<Marker>,
}
