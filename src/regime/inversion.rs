use chrono::{DateTime, Utc};

use crate::error::PipelineError;
use crate::models::Marker;
use crate::pipeline::{Column, SeriesTable};

/// Gradient level whose crossing marks a correlation inversion
pub const INVERSION_THRESHOLD: f64 = -50.0;

/// Horizontal reference levels drawn with the correlation panel
pub const REFERENCE_LEVELS: [f64; 3] = [0.0, 50.0, INVERSION_THRESHOLD];

fn crosses(before: f64, after: f64, threshold: f64) -> bool {
    (before > threshold && after < threshold) || (before < threshold && after > threshold)
}

/// Scan the correlation gradient for threshold crossings ("blues").
///
/// Position `i` compares its neighbours `gradient[i - 1]` and
/// `gradient[i + 1]`, never `gradient[i]` itself. The marker carries the
/// correlation and close price at `i`. Values sitting exactly on the
/// threshold do not count as either side.
pub fn detect_inversions(
    timestamps: &[DateTime<Utc>],
    gradients: &[f64],
    correlation: &[f64],
    close: &[f64],
) -> Vec<Marker> {
    let n = timestamps
        .len()
        .min(gradients.len())
        .min(correlation.len())
        .min(close.len());
    let mut blues = Vec::new();
    if n < 3 {
        return blues;
    }

    for i in 1..n - 1 {
        if crosses(gradients[i - 1], gradients[i + 1], INVERSION_THRESHOLD) {
            blues.push(Marker::with_price(timestamps[i], correlation[i], close[i]));
        }
    }

    blues
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InversionEventDetector;

impl InversionEventDetector {
    pub fn detect(&self, table: &SeriesTable) -> Result<Vec<Marker>, PipelineError> {
        let close = table.bar_values(|b| b.close);
        let blues = detect_inversions(
            &table.timestamps(),
            table.get(Column::RollingCorrGradients)?,
            table.get(Column::RollingCorrelation)?,
            &close,
        );

        tracing::debug!("Correlation inversions: {}", blues.len());
        Ok(blues)
    }
}
