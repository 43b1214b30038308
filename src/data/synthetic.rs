use chrono::{DateTime, Duration, Utc};
use clap::ValueEnum;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Bar;

/// Market shapes for synthetic bar generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketScenario {
    /// Steady drift up (+2% per day) with small noise
    Uptrend,
    /// Steady drift down (-2% per day) with small noise
    Downtrend,
    /// Mean-reverting walk around the base price
    Sideways,
    /// Large ±5% swings
    Volatile,
}

/// Seeded generator of OHLCV bars
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticDataGenerator {
    /// Create a new generator with a seed for reproducibility
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    /// Generate `num_bars` bars ending now, `interval_minutes` apart
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<Bar> {
        let start_time = Utc::now() - Duration::minutes(num_bars as i64 * interval_minutes);
        self.generate_from(scenario, start_time, num_bars, interval_minutes)
    }

    pub fn generate_from(
        &mut self,
        scenario: MarketScenario,
        start_time: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<Bar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut price = self.base_price;
        let drift = 0.02 / (24.0 * 60.0 / interval_minutes as f64);

        for i in 0..num_bars {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            price += match scenario {
                MarketScenario::Uptrend => price * (drift + self.rng.gen_range(-0.001..0.001)),
                MarketScenario::Downtrend => price * (-drift + self.rng.gen_range(-0.001..0.001)),
                MarketScenario::Sideways => {
                    (self.base_price - price) * 0.1 + price * self.rng.gen_range(-0.01..0.01)
                }
                MarketScenario::Volatile => price * self.rng.gen_range(-0.05..0.05),
            };

            // Keep volatile walks from collapsing
            price = price.max(self.base_price * 0.5);

            bars.push(self.create_bar(price, timestamp));
        }

        bars
    }

    /// Build a consistent OHLCV bar around a close price
    fn create_bar(&mut self, close: f64, timestamp: DateTime<Utc>) -> Bar {
        let noise_pct = 0.002;

        let high = close * (1.0 + self.rng.gen_range(0.0..noise_pct));
        let low = close * (1.0 - self.rng.gen_range(0.0..noise_pct));
        let open = (close * (1.0 + self.rng.gen_range(-noise_pct..noise_pct))).clamp(low, high);

        // Vary volume ±30%
        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Bar::new(timestamp, open, high, low, close, volume)
    }
}
