/// Single-bar percentage rate of change
///
/// Appends `open_rate`, `high_rate`, `low_rate`, `close_rate`, `volume_rate`,
/// plus `spread` (close - open) and `spread_rate` (close_rate - open_rate).

use crate::error::PipelineError;
use crate::models::Bar;
use crate::pipeline::{Column, SeriesTable, Stage};

/// Rate of change against the previous value
///
/// The first element is 0, and so is any step whose previous value is 0.
pub fn calculate_rate_series(values: &[f64]) -> Vec<f64> {
    let mut rates = Vec::with_capacity(values.len());
    if values.is_empty() {
        return rates;
    }

    rates.push(0.0);
    for pair in values.windows(2) {
        let rate = (pair[1] - pair[0]) / pair[0];
        rates.push(if rate.is_finite() { rate } else { 0.0 });
    }

    rates
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RateSeries;

impl RateSeries {
    fn rate_of(table: &SeriesTable, field: fn(&Bar) -> f64) -> Vec<f64> {
        calculate_rate_series(&table.bar_values(field))
    }
}

impl Stage for RateSeries {
    fn name(&self) -> &'static str {
        "rate_series"
    }

    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError> {
        let open_rate = Self::rate_of(table, |b| b.open);
        let close_rate = Self::rate_of(table, |b| b.close);
        let spread_rate: Vec<f64> = close_rate
            .iter()
            .zip(&open_rate)
            .map(|(c, o)| c - o)
            .collect();

        table.insert(Column::HighRate, Self::rate_of(table, |b| b.high))?;
        table.insert(Column::LowRate, Self::rate_of(table, |b| b.low))?;
        table.insert(Column::VolumeRate, Self::rate_of(table, |b| b.volume))?;
        table.insert(Column::OpenRate, open_rate)?;
        table.insert(Column::CloseRate, close_rate)?;
        table.insert(Column::Spread, table.bar_values(Bar::spread))?;
        table.insert(Column::SpreadRate, spread_rate)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_rate_series() {
        let rates = calculate_rate_series(&[100.0, 110.0, 99.0]);

        assert_eq!(rates.len(), 3);
        assert_eq!(rates[0], 0.0);
        assert!((rates[1] - 0.10).abs() < 1e-12);
        assert!((rates[2] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_rate_series_zero_previous_value() {
        // 0 -> 5 is an infinite rate, 0 -> 0 is NaN; both become 0
        let rates = calculate_rate_series(&[0.0, 5.0, 0.0, 0.0]);
        assert_eq!(rates, vec![0.0, 0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_rate_series_empty() {
        assert!(calculate_rate_series(&[]).is_empty());
    }

    #[test]
    fn test_rate_stage_appends_columns() {
        let start = Utc::now();
        let bars = vec![
            Bar::new(start, 100.0, 102.0, 99.0, 101.0, 1000.0),
            Bar::new(start + Duration::minutes(5), 101.0, 104.0, 100.0, 103.0, 0.0),
            Bar::new(start + Duration::minutes(10), 103.0, 103.0, 95.0, 96.0, 500.0),
        ];
        let mut table = SeriesTable::new(bars);
        RateSeries.apply(&mut table).unwrap();

        assert_eq!(table.get(Column::Spread).unwrap(), &[1.0, 2.0, -7.0]);
        // volume 1000 -> 0 -> 500: second step divides by zero
        assert_eq!(table.get(Column::VolumeRate).unwrap(), &[0.0, -1.0, 0.0]);

        let close_rate = table.get(Column::CloseRate).unwrap();
        let open_rate = table.get(Column::OpenRate).unwrap();
        let spread_rate = table.get(Column::SpreadRate).unwrap();
        for i in 0..3 {
            assert!((spread_rate[i] - (close_rate[i] - open_rate[i])).abs() < 1e-12);
        }
        assert!(table.contains(Column::HighRate));
        assert!(table.contains(Column::LowRate));
    }
}
