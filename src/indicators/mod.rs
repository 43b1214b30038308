// Technical indicators module
// Rate of change, pressure, smoothing, river line, bands and correlation

pub mod bollinger;
pub mod correlation;
pub mod moving_average;
pub mod pressure;
pub mod rate;
pub mod river;
pub mod smoothing;

pub use bollinger::{calculate_bollinger_bands, sample_std_dev, BandSeries, BollingerBandCalculator};
pub use correlation::{
    calculate_expanding_correlation, calculate_gradients, calculate_rolling_correlation,
    numeric_gradient, pearson_correlation, RollingCorrelation,
};
pub use moving_average::{
    calculate_sma, cumulative_mean, rolling_ema, rolling_sma, windowed_ema,
};
pub use pressure::{PressureAccumulator, PressureSeries, PressureState};
pub use rate::{calculate_rate_series, RateSeries};
pub use river::{calculate_river, RiverLine};
pub use smoothing::{compute_eta, rescale, NormalizationStage, SmoothingStage};
