/// Smoothing and whole-series normalization of the pressure columns
///
/// Two passes that must run in order:
/// 1. `SmoothingStage`: windowed EMA of `s` and `b`, SMA of `closeness`
/// 2. `NormalizationStage`: eta = max(b_ema) + max(s_ema) over the whole
///    series, then `b_ema`, `s_ema` and `closeness_sma` become `x / eta * 100`

use crate::error::PipelineError;
use crate::indicators::moving_average::{cumulative_mean, rolling_ema, rolling_sma};
use crate::pipeline::{Column, SeriesTable, Stage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingStage {
    window: usize,
    with_closeness_avg: bool,
}

impl Default for SmoothingStage {
    fn default() -> Self {
        Self {
            window: 5,
            with_closeness_avg: false,
        }
    }
}

impl SmoothingStage {
    pub fn new(window: usize, with_closeness_avg: bool) -> Self {
        Self {
            window,
            with_closeness_avg,
        }
    }
}

impl Stage for SmoothingStage {
    fn name(&self) -> &'static str {
        "smoothing"
    }

    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError> {
        let s_ema = rolling_ema(table.get(Column::Seller)?, self.window);
        let b_ema = rolling_ema(table.get(Column::Buyer)?, self.window);
        let closeness = table.get(Column::Closeness)?;
        let closeness_sma = rolling_sma(closeness, self.window);
        let closeness_avg = self.with_closeness_avg.then(|| cumulative_mean(closeness));

        table.insert(Column::SellerEma, s_ema)?;
        table.insert(Column::BuyerEma, b_ema)?;
        table.insert(Column::ClosenessSma, closeness_sma)?;
        if let Some(avg) = closeness_avg {
            table.insert(Column::ClosenessAvg, avg)?;
        }

        Ok(())
    }
}

fn column_max(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Sum of the buyer and seller EMA maxima; 0 for an empty series
pub fn compute_eta(b_ema: &[f64], s_ema: &[f64]) -> f64 {
    if b_ema.is_empty() || s_ema.is_empty() {
        return 0.0;
    }
    column_max(b_ema) + column_max(s_ema)
}

/// Rescale into percent of eta; everything is 0 when eta is 0
pub fn rescale(values: &mut [f64], eta: f64) {
    for v in values.iter_mut() {
        *v = if eta == 0.0 { 0.0 } else { (*v / eta) * 100.0 };
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizationStage;

impl Stage for NormalizationStage {
    fn name(&self) -> &'static str {
        "normalization"
    }

    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError> {
        let eta = compute_eta(table.get(Column::BuyerEma)?, table.get(Column::SellerEma)?);
        if eta == 0.0 && !table.is_empty() {
            tracing::warn!("Normalization constant is 0, smoothed pressure zeroed");
        }

        for column in [Column::BuyerEma, Column::SellerEma, Column::ClosenessSma] {
            rescale(table.get_mut(column)?, eta);
        }
        table.set_eta(eta);

        tracing::debug!("Normalized smoothed pressure with eta={:.6}", eta);
        Ok(())
    }
}
