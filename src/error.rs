use thiserror::Error;

use crate::core::ChartId;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Error)]
pub enum ChartError {
    /// Raised by `render` only; configuration calls never produce it.
    #[error("mandatory attribute `{attribute}` is not set on chart anchored at `{anchor}`")]
    MissingMandatoryAttribute {
        anchor: String,
        attribute: &'static str,
    },

    #[error("no chart with id {0} is anchored in this dashboard")]
    UnknownChart(ChartId),

    #[error("chart {chart} does not support {capability}")]
    CapabilityMissing {
        chart: ChartId,
        capability: &'static str,
    },

    #[error("invalid chart size: width={width}, height={height}")]
    InvalidSize { width: f64, height: f64 },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("render backend failure: {0}")]
    Render(String),
}
