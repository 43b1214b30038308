// Indicator pipeline module
pub mod table;

pub use table::{Column, SeriesRow, SeriesTable};

use serde::{Deserialize, Serialize};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::indicators::{
    BollingerBandCalculator, NormalizationStage, PressureAccumulator, RateSeries, RiverLine,
    RollingCorrelation, SmoothingStage,
};
use crate::models::{Bar, MarkerSet};
use crate::regime::{AngleSample, InversionEventDetector, RegimeEventDetector};

/// One step of the pipeline, appending columns to the shared table
pub trait Stage: Send + Sync {
    /// Stage name for logging
    fn name(&self) -> &'static str;

    /// Read earlier columns and append this stage's columns
    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError>;
}

/// Augmented series plus every marker collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorReport {
    pub table: SeriesTable,
    pub markers: MarkerSet,
    /// Diagnostic divergence angles from the EMA regime detector
    pub angles: Vec<AngleSample>,
}

impl IndicatorReport {
    /// Normalization constant used for the smoothed pressure
    pub fn eta(&self) -> f64 {
        self.table.eta().unwrap_or(0.0)
    }
}

/// Runs the stages in dependency order over a full bar sequence
///
/// rates -> pressure -> smoothing -> normalization -> river line -> bands
/// -> rolling correlation, then the regime and inversion detectors.
/// Every run starts from a fresh table.
pub struct IndicatorPipeline {
    stages: Vec<Box<dyn Stage>>,
    regime: RegimeEventDetector,
    inversion: InversionEventDetector,
}

impl Default for IndicatorPipeline {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl IndicatorPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(RateSeries),
            Box::new(PressureAccumulator::new(config.power, config.ratio)),
            Box::new(SmoothingStage::new(config.smoothing_window, config.closeness_avg)),
            Box::new(NormalizationStage),
            Box::new(RiverLine),
            Box::new(BollingerBandCalculator::new(config.band_window, config.band_width)),
            Box::new(RollingCorrelation::new(
                config.correlation_window,
                config.expanding_correlation,
            )),
        ];

        Self {
            stages,
            regime: RegimeEventDetector,
            inversion: InversionEventDetector,
        }
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Compute every derived column and marker for `bars`
    ///
    /// Bars must already be sorted by timestamp; they are not re-validated.
    pub fn run(&self, bars: Vec<Bar>) -> Result<IndicatorReport, PipelineError> {
        let mut table = SeriesTable::new(bars);

        for stage in &self.stages {
            stage.apply(&mut table)?;
            tracing::debug!("Stage {} done ({} bars)", stage.name(), table.len());
        }

        let (ema, price) = self.regime.detect(&table)?;
        let blues = self.inversion.detect(&table)?;

        let markers = MarkerSet {
            ema: ema.markers,
            price,
            blues,
        };

        tracing::info!(
            "Indicator pipeline complete: {} bars, {} ema flips, {} price flips, {} blues",
            table.len(),
            markers.ema.len(),
            markers.price.len(),
            markers.blues.len()
        );

        Ok(IndicatorReport {
            table,
            markers,
            angles: ema.angles,
        })
    }
}
