/// Lookback Bollinger bands over the closeness SMA
///
/// For every position `c + t` past the warm-up:
/// - mid = value at `c + t`
/// - upper/lower = mid ± f * stdev(values[c .. c + t])
///
/// The deviation comes from the `t` values *before* the band position, not
/// from a window centred on or ending at it. The first `t` positions are 0.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::pipeline::{Column, SeriesTable, Stage};

/// Band triplet aligned with the input series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BandSeries {
    pub mid: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

/// Sample standard deviation (n - 1); 0 when undefined
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    let std_dev = variance.sqrt();

    if std_dev.is_finite() {
        std_dev
    } else {
        0.0
    }
}

pub fn calculate_bollinger_bands(values: &[f64], window: usize, width: f64) -> BandSeries {
    let n = values.len();
    let mut bands = BandSeries {
        mid: vec![0.0; n],
        upper: vec![0.0; n],
        lower: vec![0.0; n],
    };

    let mut c = 0;
    while c + window < n {
        let mid = values[c + window];
        let spread = width * sample_std_dev(&values[c..c + window]);

        bands.mid[c + window] = mid;
        bands.upper[c + window] = mid + spread;
        bands.lower[c + window] = mid - spread;
        c += 1;
    }

    bands
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBandCalculator {
    window: usize,
    width: f64,
}

impl Default for BollingerBandCalculator {
    fn default() -> Self {
        Self {
            window: 5,
            width: 2.0,
        }
    }
}

impl BollingerBandCalculator {
    pub fn new(window: usize, width: f64) -> Self {
        Self { window, width }
    }
}

impl Stage for BollingerBandCalculator {
    fn name(&self) -> &'static str {
        "bollinger_bands"
    }

    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError> {
        let bands =
            calculate_bollinger_bands(table.get(Column::ClosenessSma)?, self.window, self.width);

        table.insert(Column::MidBand, bands.mid)?;
        table.insert(Column::UpperBand, bands.upper)?;
        table.insert(Column::LowerBand, bands.lower)?;
        Ok(())
    }
}
