use crate::error::PipelineError;
use crate::pipeline::{Column, SeriesTable, Stage};

/// Upper envelope of the smoothed pressure: max(b_ema, s_ema) per bar
pub fn calculate_river(b_ema: &[f64], s_ema: &[f64]) -> Vec<f64> {
    b_ema.iter().zip(s_ema).map(|(b, s)| b.max(*s)).collect()
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RiverLine;

impl Stage for RiverLine {
    fn name(&self) -> &'static str {
        "river_line"
    }

    fn apply(&self, table: &mut SeriesTable) -> Result<(), PipelineError> {
        let river_up = calculate_river(table.get(Column::BuyerEma)?, table.get(Column::SellerEma)?);
        table.insert(Column::RiverUp, river_up)
    }
}
