use crate::models::Bar;
use crate::Result;

/// Validates OHLCV bars before they are handed to the indicator pipeline
///
/// The pipeline itself assumes sorted, sane input and never re-checks it.
pub struct BarValidator;

impl BarValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a single bar for correctness
    pub fn validate(&self, bar: &Bar) -> Result<()> {
        self.validate_prices(bar)?;
        self.validate_ohlc_relationship(bar)?;
        Ok(())
    }

    /// Validate every bar plus chronological order
    pub fn validate_series(&self, bars: &[Bar]) -> Result<()> {
        for bar in bars {
            self.validate(bar)?;
        }

        for (i, pair) in bars.windows(2).enumerate() {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(format!(
                    "Bar {} at {} is not after bar {} at {}",
                    i + 1,
                    pair[1].timestamp,
                    i,
                    pair[0].timestamp
                )
                .into());
            }
        }

        Ok(())
    }

    /// Validate that all prices are positive and finite
    fn validate_prices(&self, bar: &Bar) -> Result<()> {
        for (name, value) in [
            ("open", bar.open),
            ("high", bar.high),
            ("low", bar.low),
            ("close", bar.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("Invalid {} price: {}", name, value).into());
            }
        }
        // Volume can be 0.0
        if !bar.volume.is_finite() || bar.volume < 0.0 {
            return Err(format!("Invalid volume: {}", bar.volume).into());
        }
        Ok(())
    }

    /// Validate OHLC relationships (high >= low, etc.)
    fn validate_ohlc_relationship(&self, bar: &Bar) -> Result<()> {
        if bar.high < bar.low {
            return Err(format!("High ({}) is less than low ({})", bar.high, bar.low).into());
        }

        if bar.high < bar.open.max(bar.close) {
            return Err(format!(
                "High ({}) is below open/close ({}/{})",
                bar.high, bar.open, bar.close
            )
            .into());
        }

        if bar.low > bar.open.min(bar.close) {
            return Err(format!(
                "Low ({}) is above open/close ({}/{})",
                bar.low, bar.open, bar.close
            )
            .into());
        }

        Ok(())
    }
}

impl Default for BarValidator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn make_valid_bar() -> Bar {
        Bar::new(
            Utc::now() - Duration::hours(1),
            100.0,
            102.0,
            99.0,
            101.0,
            1000000.0,
        )
    }

    #[test]
    fn test_valid_bar() {
        let validator = BarValidator::new();
        assert!(validator.validate(&make_valid_bar()).is_ok());
    }

    #[test]
    fn test_invalid_price() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.close = -1.0;
        assert!(validator.validate(&bar).is_err());

        let mut bar = make_valid_bar();
        bar.open = f64::NAN;
        assert!(validator.validate(&bar).is_err());
    }

    #[test]
    fn test_zero_volume_is_allowed() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.volume = 0.0;
        assert!(validator.validate(&bar).is_ok());
    }

    #[test]
    fn test_high_below_close() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.high = 100.5;
        assert!(validator.validate(&bar).is_err());
    }

    #[test]
    fn test_low_above_open() {
        let validator = BarValidator::new();
        let mut bar = make_valid_bar();
        bar.low = 100.5;
        assert!(validator.validate(&bar).is_err());
    }

    #[test]
    fn test_series_must_be_increasing() {
        let validator = BarValidator::new();
        let first = make_valid_bar();
        let mut second = make_valid_bar();
        second.timestamp = first.timestamp + Duration::minutes(5);

        assert!(validator
            .validate_series(&[first.clone(), second.clone()])
            .is_ok());
        assert!(validator
            .validate_series(&[second.clone(), first.clone()])
            .is_err());
        // Duplicate timestamps
        assert!(validator.validate_series(&[first.clone(), first]).is_err());
    }
}
