use crate::core::Size;
use crate::error::{ChartError, ChartResult};

use super::base_chart::MandatoryAttribute;
use super::chart::Chart;

/// First attribute the chart declares mandatory but does not have.
pub(super) fn missing_mandatory_attribute(chart: &dyn Chart) -> Option<MandatoryAttribute> {
    chart
        .base()
        .mandatory_attributes()
        .iter()
        .copied()
        .find(|attribute| !chart.has_attribute(*attribute))
}

pub(super) fn validate_size(size: Size) -> ChartResult<()> {
    if !size.is_valid() {
        return Err(ChartError::InvalidSize {
            width: size.width,
            height: size.height,
        });
    }
    Ok(())
}

pub(super) fn validate_zoom_domain(domain: (f64, f64)) -> ChartResult<(f64, f64)> {
    if !domain.0.is_finite() || !domain.1.is_finite() {
        return Err(ChartError::InvalidData(
            "zoom domain must be finite".to_owned(),
        ));
    }
    if domain.0 <= domain.1 {
        Ok(domain)
    } else {
        Ok((domain.1, domain.0))
    }
}
