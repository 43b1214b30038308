/// Correlation between the river line and the closeness SMA
///
/// `rolling_correlation` follows the same lookback layout as the Bollinger
/// bands: the correlation of window `[c, c + t)` lands at position `c + t`,
/// and the first `t` positions are 0. Values are scaled to [-100, 100].
///
/// `rolling_corr_gradients` is `tanh(gradient(rolling_correlation)) * 100`
/// with a central-difference gradient.

use crate::error::PipelineError;
use crate::pipeline::{Column, SeriesTable, Stage};

/// Pearson correlation coefficient
///
/// Returns None for fewer than two samples or a constant input.
pub fn pearson_correlation(x: &[f64], y: &[f64]) -> Option<f64> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }
    let (x, y) = (&x[..n], &y[..n]);

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (a, b) in x.iter().zip(y) {
        let dx = a - mean_x;
        let dy = b - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let r = cov / (var_x * var_y).sqrt();
    if !r.is_finite() {
        return None;
    }

    // Rounding can push |r| a hair past 1
    Some(r.clamp(-1.0, 1.0))
}

pub fn calculate_rolling_correlation(x: &[f64], y: &[f64], window: usize) -> Vec<f64> {
    let n = x.len().min(y.len());
    let mut out = vec![0.0; n];

    let mut c = 0;
    while c + window < n {
        let r = pearson_correlation(&x[c..c + window], &y[c..c + window]).unwrap_or(0.0);
        out[c + window] = r * 100.0;
        c += 1;
    }

    out
}

/// Correlation over the whole history before each position
///
/// Position `i` correlates rows `[0, i)`; positions 0 and 1 are 0.
pub fn calculate_expanding_correlation(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len().min(y.len());
    let mut out = vec![0.0; n];

    for i in 2..n {
        out[i] = pearson_correlation(&x[..i], &y[..i]).unwrap_or(0.0) * 100.0;
    }

    out
}

/// Central differences in the interior, one-sided at both ends
pub fn numeric_gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut out = Vec::with_capacity(n);
            out.push(values[1] - values[0]);
            for i in 1..n - 1 {
                out.push((values[i + 1] - values[i - 1]) / 2.0);
            }
            out.push(values[n - 1] - values[n - 2]);
            out
        }
    }
}

/// tanh-compressed gradient, scaled to [-100, 100]
pub fn calculate_gradients(correlation: &[f64]) -> Vec<f64> {
    numeric_gradient(correlation)
        .into_iter()
        .map(|g| g.tanh() * 100.0)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingCorrelation {
    window: usize,
    with_expanding: bool,
}

impl Default for RollingCorrelation {
    fn default() -> Self {
        Self {
            window: 40,
            with_expanding: false,
        }
    }
}

impl RollingCorrelation {
    pub fn new(window: usize, with_expanding: bool) -> Self {
        Self {
            window,
            with_expanding,
        }
    }
}

impl Stage for RollingCorrelation {
    fn name(&self) -> &'static str {
        "rolling_correlation"
    }

    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError> {
        let river_up = table.get(Column::RiverUp)?;
        let closeness_sma = table.get(Column::ClosenessSma)?;

        let rolling = calculate_rolling_correlation(river_up, closeness_sma, self.window);
        let expanding = self
            .with_expanding
            .then(|| calculate_expanding_correlation(river_up, closeness_sma));
        let gradients = calculate_gradients(&rolling);

        if let Some(cor) = expanding {
            table.insert(Column::Correlation, cor)?;
        }
        table.insert(Column::RollingCorrelation, rolling)?;
        table.insert(Column::RollingCorrGradients, gradients)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pearson_perfect_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [2.0, 4.0, 6.0, 8.0];
        let z = [8.0, 6.0, 4.0, 2.0];

        assert!((pearson_correlation(&x, &y).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson_correlation(&x, &z).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_degenerate_inputs() {
        assert!(pearson_correlation(&[1.0], &[2.0]).is_none());
        assert!(pearson_correlation(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_none());
    }

    #[test]
    fn test_rolling_correlation_layout() {
        let x: Vec<f64> = (0..8).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..8).map(|i| (i * i) as f64).collect();
        let corr = calculate_rolling_correlation(&x, &y, 4);

        assert_eq!(corr.len(), 8);
        assert_eq!(&corr[..4], &[0.0; 4]);

        let expected = pearson_correlation(&x[0..4], &y[0..4]).unwrap() * 100.0;
        assert!((corr[4] - expected).abs() < 1e-9);
        for v in &corr[4..] {
            assert!(*v > 90.0 && *v <= 100.0);
        }
    }

    #[test]
    fn test_rolling_correlation_constant_window_is_zero() {
        let x = vec![5.0; 10];
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let corr = calculate_rolling_correlation(&x, &y, 3);
        assert!(corr.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_expanding_correlation() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 3.0, 2.0, 5.0, 4.0];
        let cor = calculate_expanding_correlation(&x, &y);

        assert_eq!(cor[0], 0.0);
        assert_eq!(cor[1], 0.0);
        // Rows [0, 2): two points are always perfectly correlated
        assert!((cor[2] - 100.0).abs() < 1e-9);
        let expected = pearson_correlation(&x[..4], &y[..4]).unwrap() * 100.0;
        assert!((cor[4] - expected).abs() < 1e-9);
    }

    #[test]
    fn test_numeric_gradient() {
        let grad = numeric_gradient(&[1.0, 2.0, 4.0, 7.0, 11.0]);
        assert_eq!(grad, vec![1.0, 1.5, 2.5, 3.5, 4.0]);
        assert_eq!(numeric_gradient(&[3.0]), vec![0.0]);
        assert!(numeric_gradient(&[]).is_empty());
    }

    #[test]
    fn test_gradients_are_bounded() {
        let corr = vec![0.0, 100.0, -100.0, 100.0, 0.0, 0.5];
        let grads = calculate_gradients(&corr);

        assert_eq!(grads.len(), corr.len());
        for g in &grads {
            assert!(*g >= -100.0 && *g <= 100.0);
        }
        assert!((grads[5] - 0.5f64.tanh() * 100.0).abs() < 1e-9);
    }
}
