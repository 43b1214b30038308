/// Calculate Simple Moving Average (SMA) of the last `period` values
pub fn calculate_sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }

    let sum: f64 = values.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// Exponential moving average of a single window, seeded by its first value
///
/// With `k = 2 / (len + 1)` the window is folded left:
/// `acc = w[0]; acc = k * w[j] + (1 - k) * acc`.
pub fn windowed_ema(window: &[f64]) -> Option<f64> {
    let (first, rest) = window.split_first()?;
    let k = 2.0 / (window.len() as f64 + 1.0);

    Some(rest.iter().fold(*first, |acc, v| k * v + (1.0 - k) * acc))
}

/// Apply `f` to every trailing window of `period` values.
///
/// The first `period - 1` positions have no full window and are 0, as is
/// any non-finite result.
pub fn rolling_apply<F>(values: &[f64], period: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    let mut out = vec![0.0; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    for end in period..=values.len() {
        let value = f(&values[end - period..end]);
        out[end - 1] = if value.is_finite() { value } else { 0.0 };
    }

    out
}

/// Windowed EMA at every position, reseeded per window
pub fn rolling_ema(values: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(values, period, |w| windowed_ema(w).unwrap_or(0.0))
}

/// Trailing SMA at every position
pub fn rolling_sma(values: &[f64], period: usize) -> Vec<f64> {
    rolling_apply(values, period, |w| calculate_sma(w, period).unwrap_or(0.0))
}

/// Running mean of everything seen so far
pub fn cumulative_mean(values: &[f64]) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for (i, value) in values.iter().enumerate() {
        let avg = match out.last() {
            None => *value,
            Some(prev) => (i as f64 * prev + value) / (i as f64 + 1.0),
        };
        out.push(avg);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma() {
        let prices = vec![100.0, 102.0, 104.0, 106.0, 108.0];
        let sma = calculate_sma(&prices, 5);
        assert_eq!(sma, Some(104.0));
    }

    #[test]
    fn test_sma_insufficient_data() {
        let prices = vec![100.0, 102.0];
        let sma = calculate_sma(&prices, 5);
        assert!(sma.is_none());
    }

    #[test]
    fn test_rolling_sma_matches_trailing_sma() {
        let values = vec![3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        let rolling = rolling_sma(&values, 3);

        for end in 3..=values.len() {
            let expected = calculate_sma(&values[..end], 3).unwrap();
            assert!((rolling[end - 1] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_windowed_ema_fold() {
        // k = 2 / 4 = 0.5
        // acc = 1 -> 0.5*2 + 0.5*1 = 1.5 -> 0.5*4 + 0.5*1.5 = 2.75
        let ema = windowed_ema(&[1.0, 2.0, 4.0]).unwrap();
        assert!((ema - 2.75).abs() < 1e-12);
    }

    #[test]
    fn test_windowed_ema_empty() {
        assert!(windowed_ema(&[]).is_none());
    }

    #[test]
    fn test_rolling_ema_constant_input() {
        let values = vec![7.5; 12];
        let ema = rolling_ema(&values, 5);

        assert_eq!(ema.len(), 12);
        for v in &ema[..4] {
            assert_eq!(*v, 0.0);
        }
        for v in &ema[4..] {
            assert!((v - 7.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rolling_ema_is_reseeded_per_window() {
        // A spike that has left the window must not influence later values.
        let mut values = vec![1.0; 10];
        values[2] = 100.0;
        let ema = rolling_ema(&values, 3);

        assert!(ema[4] > 1.0);
        assert!((ema[5] - 1.0).abs() < 1e-12);
        assert!((ema[9] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rolling_sma() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let sma = rolling_sma(&values, 2);
        assert_eq!(sma, vec![0.0, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn test_rolling_window_longer_than_series() {
        let sma = rolling_sma(&[1.0, 2.0], 5);
        assert_eq!(sma, vec![0.0, 0.0]);
    }

    #[test]
    fn test_cumulative_mean() {
        let avg = cumulative_mean(&[2.0, 4.0, 6.0]);
        assert_eq!(avg, vec![2.0, 3.0, 4.0]);
    }
}
