// Regime and inversion event detection module
pub mod detector;
pub mod inversion;

pub use detector::{
    detect_ema_regimes, detect_price_regimes, AngleSample, EmaRegimeOutput, Mode,
    RegimeEventDetector, RegimeFlip, RegimeInputs,
};
pub use inversion::{detect_inversions, InversionEventDetector, INVERSION_THRESHOLD, REFERENCE_LEVELS};
