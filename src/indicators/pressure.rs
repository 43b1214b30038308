/// Buyer/seller pressure accumulator
///
/// Each bar's spread (close - open) feeds one side of an exponentially
/// decayed accumulator:
/// - spread > 0: buyer = buyer * ratio + (1 - ratio) * spread^power
/// - spread <= 0: seller = seller * ratio + (1 - ratio) * (-spread)^power
///
/// The other side is carried forward unchanged. Closeness is |buyer - seller|.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::pipeline::{Column, SeriesTable, Stage};

/// Decayed pressure carried from one bar to the next
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PressureState {
    pub seller: f64,
    pub buyer: f64,
}

impl PressureState {
    /// Fold one spread into the state
    pub fn step(self, spread: f64, power: f64, ratio: f64) -> Self {
        if spread > 0.0 {
            Self {
                buyer: self.buyer * ratio + (1.0 - ratio) * spread.powf(power),
                ..self
            }
        } else {
            Self {
                seller: self.seller * ratio + (1.0 - ratio) * (-spread).powf(power),
                ..self
            }
        }
    }

    pub fn closeness(&self) -> f64 {
        (self.buyer - self.seller).abs()
    }
}

/// Per-bar pressure columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PressureSeries {
    pub seller: Vec<f64>,
    pub buyer: Vec<f64>,
    pub closeness: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureAccumulator {
    power: f64,
    ratio: f64,
}

impl Default for PressureAccumulator {
    fn default() -> Self {
        Self {
            power: 1.0,
            ratio: 0.96,
        }
    }
}

impl PressureAccumulator {
    pub fn new(power: f64, ratio: f64) -> Self {
        Self { power, ratio }
    }

    /// Scan spreads left to right starting from a zero state
    pub fn accumulate(&self, spreads: &[f64]) -> PressureSeries {
        let mut series = PressureSeries {
            seller: Vec::with_capacity(spreads.len()),
            buyer: Vec::with_capacity(spreads.len()),
            closeness: Vec::with_capacity(spreads.len()),
        };

        let mut state = PressureState::default();
        for spread in spreads {
            state = state.step(*spread, self.power, self.ratio);
            series.seller.push(state.seller);
            series.buyer.push(state.buyer);
            series.closeness.push(state.closeness());
        }

        series
    }
}

impl Stage for PressureAccumulator {
    fn name(&self) -> &'static str {
        "pressure"
    }

    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError> {
        let series = self.accumulate(table.get(Column::Spread)?);

        table.insert(Column::Seller, series.seller)?;
        table.insert(Column::Buyer, series.buyer)?;
        table.insert(Column::Closeness, series.closeness)?;
        Ok(())
    }
}
