use serde::{Deserialize, Serialize};

use crate::core::Key;
use crate::error::{ChartError, ChartResult};

/// Continuous domain mapped linearly onto a pixel extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl Default for LinearScale {
    fn default() -> Self {
        Self {
            domain_start: 0.0,
            domain_end: 1.0,
        }
    }
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    /// Domain spanning `values`; a single value widens to `[v - 0.5, v + 0.5]`.
    #[must_use]
    pub fn from_extent(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (min, max) = values
            .into_iter()
            .filter(|value| value.is_finite())
            .fold(None, |extent: Option<(f64, f64)>, value| match extent {
                None => Some((value, value)),
                Some((min, max)) => Some((min.min(value), max.max(value))),
            })?;
        if min == max {
            return Some(Self {
                domain_start: min - 0.5,
                domain_end: max + 0.5,
            });
        }
        Some(Self {
            domain_start: min,
            domain_end: max,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn span(self) -> f64 {
        self.domain_end - self.domain_start
    }

    /// Maps `value` onto `[0, extent_px]`. A zero-width domain maps to the middle.
    #[must_use]
    pub fn to_pixel(self, value: f64, extent_px: f64) -> f64 {
        let span = self.span();
        if span == 0.0 || !span.is_finite() {
            return extent_px / 2.0;
        }
        let pixel = (value - self.domain_start) / span * extent_px;
        if pixel.is_finite() { pixel } else { 0.0 }
    }

    /// Maps `value` onto an inverted vertical extent (domain start at the bottom).
    #[must_use]
    pub fn to_pixel_inverted(self, value: f64, extent_px: f64) -> f64 {
        extent_px - self.to_pixel(value, extent_px)
    }

    pub fn from_pixel(self, pixel: f64, extent_px: f64) -> ChartResult<f64> {
        if !extent_px.is_finite() || extent_px <= 0.0 {
            return Err(ChartError::InvalidData(
                "pixel extent must be finite and > 0".to_owned(),
            ));
        }
        if !pixel.is_finite() {
            return Err(ChartError::InvalidData("pixel must be finite".to_owned()));
        }
        Ok(self.domain_start + pixel / extent_px * self.span())
    }

    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        let (low, high) = if self.domain_start <= self.domain_end {
            (self.domain_start, self.domain_end)
        } else {
            (self.domain_end, self.domain_start)
        };
        (low..=high).contains(&value)
    }
}

/// Discrete categories laid out as equal bands.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrdinalScale {
    domain: Vec<Key>,
}

impl OrdinalScale {
    #[must_use]
    pub fn new(domain: Vec<Key>) -> Self {
        Self { domain }
    }

    #[must_use]
    pub fn domain(&self) -> &[Key] {
        &self.domain
    }

    pub fn set_domain(&mut self, domain: Vec<Key>) {
        self.domain = domain;
    }

    #[must_use]
    pub fn band_width(&self, extent_px: f64) -> f64 {
        if self.domain.is_empty() {
            0.0
        } else {
            extent_px / self.domain.len() as f64
        }
    }

    /// Left edge of the band holding `key`.
    #[must_use]
    pub fn to_pixel(&self, key: &Key, extent_px: f64) -> Option<f64> {
        let index = self.domain.iter().position(|candidate| candidate == key)?;
        Some(index as f64 * self.band_width(extent_px))
    }

    /// Band under `pixel`, clamped to the first/last band.
    #[must_use]
    pub fn from_pixel(&self, pixel: f64, extent_px: f64) -> Option<&Key> {
        let width = self.band_width(extent_px);
        if width <= 0.0 || !pixel.is_finite() {
            return None;
        }
        let index = (pixel / width).floor().max(0.0) as usize;
        self.domain.get(index.min(self.domain.len() - 1))
    }
}

/// Primary x scale of a coordinate-grid chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum XScale {
    Linear(LinearScale),
    /// Continuous scale over unix-second timestamps.
    Time(LinearScale),
    Ordinal(OrdinalScale),
}

impl XScale {
    #[must_use]
    pub fn is_ordinal(&self) -> bool {
        matches!(self, Self::Ordinal(_))
    }

    #[must_use]
    pub fn continuous(&self) -> Option<LinearScale> {
        match self {
            Self::Linear(scale) | Self::Time(scale) => Some(*scale),
            Self::Ordinal(_) => None,
        }
    }

    /// Pixel position of `key`; ordinal keys map to band centers.
    #[must_use]
    pub fn key_to_pixel(&self, key: &Key, extent_px: f64) -> Option<f64> {
        match self {
            Self::Linear(scale) | Self::Time(scale) => {
                Some(scale.to_pixel(key.as_f64()?, extent_px))
            }
            Self::Ordinal(scale) => scale
                .to_pixel(key, extent_px)
                .map(|left| left + scale.band_width(extent_px) / 2.0),
        }
    }

    /// Domain key for a continuous position, of the class this scale produces.
    #[must_use]
    pub fn numeric_key(&self, value: f64) -> Key {
        match self {
            Self::Time(_) => crate::core::key::numeric_time_key(value),
            _ => Key::number(value),
        }
    }

    pub(crate) fn replace_continuous_domain(&mut self, domain: (f64, f64)) -> ChartResult<()> {
        match self {
            Self::Linear(scale) | Self::Time(scale) => {
                *scale = LinearScale::new(domain.0, domain.1)?;
                Ok(())
            }
            Self::Ordinal(_) => Err(ChartError::InvalidData(
                "ordinal scales have no continuous domain".to_owned(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{LinearScale, OrdinalScale};
    use crate::core::Key;

    #[test]
    fn linear_scale_round_trips_pixels() {
        let scale = LinearScale::new(10.0, 110.0).expect("scale");
        let px = scale.to_pixel(60.0, 400.0);
        assert_relative_eq!(px, 200.0);
        assert_relative_eq!(scale.from_pixel(px, 400.0).expect("domain"), 60.0);
    }

    #[test]
    fn zero_width_domain_maps_to_center_instead_of_nan() {
        let scale = LinearScale::new(5.0, 5.0).expect("scale");
        assert_relative_eq!(scale.to_pixel(5.0, 100.0), 50.0);
    }

    #[test]
    fn single_value_extent_is_widened() {
        let scale = LinearScale::from_extent([3.0]).expect("scale");
        assert_eq!(scale.domain(), (2.5, 3.5));
        assert!(LinearScale::from_extent([f64::NAN]).is_none());
    }

    #[test]
    fn ordinal_scale_clamps_pixels_to_bands() {
        let scale = OrdinalScale::new(vec![Key::text("a"), Key::text("b")]);
        assert_eq!(scale.from_pixel(-5.0, 100.0), Some(&Key::text("a")));
        assert_eq!(scale.from_pixel(99.0, 100.0), Some(&Key::text("b")));
        assert_eq!(scale.from_pixel(500.0, 100.0), Some(&Key::text("b")));
    }
}
