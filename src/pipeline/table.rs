use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::models::Bar;

/// Derived columns, declared in the order the pipeline produces them
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    OpenRate,
    HighRate,
    LowRate,
    CloseRate,
    VolumeRate,
    Spread,
    SpreadRate,
    #[serde(rename = "s")]
    Seller,
    #[serde(rename = "b")]
    Buyer,
    Closeness,
    #[serde(rename = "s_ema")]
    SellerEma,
    #[serde(rename = "b_ema")]
    BuyerEma,
    ClosenessSma,
    ClosenessAvg,
    RiverUp,
    MidBand,
    UpperBand,
    LowerBand,
    #[serde(rename = "cor")]
    Correlation,
    RollingCorrelation,
    RollingCorrGradients,
}

impl Column {
    pub const ALL: [Column; 21] = [
        Column::OpenRate,
        Column::HighRate,
        Column::LowRate,
        Column::CloseRate,
        Column::VolumeRate,
        Column::Spread,
        Column::SpreadRate,
        Column::Seller,
        Column::Buyer,
        Column::Closeness,
        Column::SellerEma,
        Column::BuyerEma,
        Column::ClosenessSma,
        Column::ClosenessAvg,
        Column::RiverUp,
        Column::MidBand,
        Column::UpperBand,
        Column::LowerBand,
        Column::Correlation,
        Column::RollingCorrelation,
        Column::RollingCorrGradients,
    ];

    /// Name the charting layer uses for this column
    pub fn name(&self) -> &'static str {
        match self {
            Column::OpenRate => "open_rate",
            Column::HighRate => "high_rate",
            Column::LowRate => "low_rate",
            Column::CloseRate => "close_rate",
            Column::VolumeRate => "volume_rate",
            Column::Spread => "spread",
            Column::SpreadRate => "spread_rate",
            Column::Seller => "s",
            Column::Buyer => "b",
            Column::Closeness => "closeness",
            Column::SellerEma => "s_ema",
            Column::BuyerEma => "b_ema",
            Column::ClosenessSma => "closeness_sma",
            Column::ClosenessAvg => "closeness_avg",
            Column::RiverUp => "river_up",
            Column::MidBand => "mid_band",
            Column::UpperBand => "upper_band",
            Column::LowerBand => "lower_band",
            Column::Correlation => "cor",
            Column::RollingCorrelation => "rolling_correlation",
            Column::RollingCorrGradients => "rolling_corr_gradients",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.iter().copied().find(|c| c.name() == name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One bar with every derived value at its position, keyed by column name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRow {
    #[serde(flatten)]
    pub bar: Bar,
    #[serde(flatten)]
    pub values: BTreeMap<&'static str, f64>,
}

impl SeriesRow {
    pub fn get(&self, column: Column) -> Option<f64> {
        self.values.get(column.name()).copied()
    }
}

/// Bars plus the derived columns appended by each stage
///
/// Every column holds exactly one value per bar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeriesTable {
    bars: Vec<Bar>,
    columns: BTreeMap<Column, Vec<f64>>,
    /// Normalization constant, known once the smoothed series is complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    eta: Option<f64>,
}

impl SeriesTable {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self {
            bars,
            columns: BTreeMap::new(),
            eta: None,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// Extract one raw bar field as a column
    pub fn bar_values<F>(&self, field: F) -> Vec<f64>
    where
        F: Fn(&Bar) -> f64,
    {
        self.bars.iter().map(field).collect()
    }

    /// Append (or replace) a column
    pub fn insert(&mut self, column: Column, values: Vec<f64>) -> Result<(), PipelineError> {
        if values.len() != self.bars.len() {
            return Err(PipelineError::LengthMismatch {
                column,
                expected: self.bars.len(),
                actual: values.len(),
            });
        }
        self.columns.insert(column, values);
        Ok(())
    }

    pub fn get(&self, column: Column) -> Result<&[f64], PipelineError> {
        self.columns
            .get(&column)
            .map(|v| v.as_slice())
            .ok_or(PipelineError::MissingColumn(column))
    }

    pub fn get_mut(&mut self, column: Column) -> Result<&mut [f64], PipelineError> {
        self.columns
            .get_mut(&column)
            .map(|v| v.as_mut_slice())
            .ok_or(PipelineError::MissingColumn(column))
    }

    pub fn eta(&self) -> Option<f64> {
        self.eta
    }

    pub fn set_eta(&mut self, eta: f64) {
        self.eta = Some(eta);
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains_key(&column)
    }

    /// Look a column up by its chart name
    pub fn column_by_name(&self, name: &str) -> Option<&[f64]> {
        Column::from_name(name).and_then(|c| self.get(c).ok())
    }

    pub fn columns(&self) -> impl Iterator<Item = (Column, &[f64])> {
        self.columns.iter().map(|(c, v)| (*c, v.as_slice()))
    }

    /// Row view of bar `i`, `None` past the end
    pub fn row(&self, i: usize) -> Option<SeriesRow> {
        let bar = self.bars.get(i)?.clone();
        let values = self
            .columns
            .iter()
            .map(|(column, values)| (column.name(), values[i]))
            .collect();
        Some(SeriesRow { bar, values })
    }

    /// Flatten the table into one record per bar
    pub fn rows(&self) -> Vec<SeriesRow> {
        (0..self.len()).filter_map(|i| self.row(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn make_table(n: usize) -> SeriesTable {
        let start = Utc::now();
        let bars = (0..n)
            .map(|i| {
                Bar::new(
                    start + Duration::minutes(i as i64),
                    100.0,
                    101.0,
                    99.0,
                    100.5,
                    1000.0,
                )
            })
            .collect();
        SeriesTable::new(bars)
    }

    #[test]
    fn test_insert_and_get() {
        let mut table = make_table(3);
        table.insert(Column::Spread, vec![0.5, 0.5, 0.5]).unwrap();

        assert!(table.contains(Column::Spread));
        assert_eq!(table.get(Column::Spread).unwrap(), &[0.5, 0.5, 0.5]);
        assert_eq!(table.column_by_name("spread").unwrap().len(), 3);
    }

    #[test]
    fn test_insert_rejects_wrong_length() {
        let mut table = make_table(3);
        let err = table.insert(Column::RiverUp, vec![1.0]).unwrap_err();

        assert_eq!(
            err,
            PipelineError::LengthMismatch {
                column: Column::RiverUp,
                expected: 3,
                actual: 1,
            }
        );
    }

    #[test]
    fn test_missing_column() {
        let table = make_table(2);
        assert_eq!(
            table.get(Column::BuyerEma).unwrap_err(),
            PipelineError::MissingColumn(Column::BuyerEma)
        );
    }

    #[test]
    fn test_column_names_round_trip() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("angle"), None);
    }

    #[test]
    fn test_rows_merge_bar_and_columns() {
        let mut table = make_table(3);
        table.insert(Column::BuyerEma, vec![1.0, 2.0, 3.0]).unwrap();
        table.insert(Column::Spread, vec![0.5, 0.6, 0.7]).unwrap();

        let rows = table.rows();
        assert_eq!(rows.len(), 3);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.bar, table.bars()[i]);
            assert_eq!(row.values["b_ema"], table.get(Column::BuyerEma).unwrap()[i]);
            assert_eq!(row.get(Column::Spread), Some(table.get(Column::Spread).unwrap()[i]));
            assert_eq!(row.get(Column::RiverUp), None);
        }
        assert!(table.row(3).is_none());

        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["close"], 100.5);
        assert_eq!(json["b_ema"], 2.0);
        assert_eq!(json["spread"], 0.6);
    }

    #[test]
    fn test_serialized_column_keys_match_names() {
        let mut table = make_table(1);
        table.insert(Column::BuyerEma, vec![1.0]).unwrap();
        table.insert(Column::Correlation, vec![0.0]).unwrap();

        let json = serde_json::to_value(&table).unwrap();
        let columns = json["columns"].as_object().unwrap();
        assert!(columns.contains_key("b_ema"));
        assert!(columns.contains_key("cor"));
    }
}
