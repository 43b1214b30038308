// Core modules
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod pipeline;
pub mod regime;

// Re-export commonly used types
pub use crate::config::PipelineConfig;
pub use error::{ConfigError, PipelineError};
pub use models::*;
pub use pipeline::{Column, IndicatorPipeline, IndicatorReport, SeriesRow, SeriesTable, Stage};

// Error handling
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;
