use indexmap::IndexMap;

use crate::core::{GroupRow, Key, KeyAccessor, LinearScale};
use crate::render::Color;

/// Ten-color categorical palette.
pub const DEFAULT_PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, PartialEq)]
pub enum ColorScale {
    /// Palette entries handed out in first-seen key order, cycling.
    Ordinal {
        palette: Vec<Color>,
        assigned: IndexMap<Key, usize>,
    },
    /// Interpolates between two colors over a numeric domain.
    Linear {
        domain: (f64, f64),
        range: (Color, Color),
    },
    Fixed(Color),
}

impl Default for ColorScale {
    fn default() -> Self {
        Self::ordinal(DEFAULT_PALETTE.iter().map(|hex| Color::from_hex(hex)).collect())
    }
}

impl ColorScale {
    #[must_use]
    pub fn ordinal(palette: Vec<Color>) -> Self {
        Self::Ordinal {
            palette,
            assigned: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn linear(domain: (f64, f64), range: (Color, Color)) -> Self {
        Self::Linear { domain, range }
    }

    fn color_for(&mut self, key: &Key) -> Color {
        match self {
            Self::Ordinal { palette, assigned } => {
                if palette.is_empty() {
                    return Color::rgb(0.0, 0.0, 0.0);
                }
                let next = assigned.len();
                let index = *assigned.entry(key.clone()).or_insert(next);
                palette[index % palette.len()]
            }
            Self::Linear { domain, range } => {
                let Some(value) = key.as_f64() else {
                    return range.0;
                };
                let span = domain.1 - domain.0;
                let t = if span == 0.0 { 0.0 } else { (value - domain.0) / span };
                range.0.lerp(range.1, t)
            }
            Self::Fixed(color) => *color,
        }
    }
}

/// Maps rows to colors through an accessor and a color scale.
#[derive(Debug, Clone, Default)]
pub struct ColorMixin {
    scale: ColorScale,
    accessor: KeyAccessor,
}

impl ColorMixin {
    #[must_use]
    pub fn scale(&self) -> &ColorScale {
        &self.scale
    }

    pub fn set_scale(&mut self, scale: ColorScale) -> &mut Self {
        self.scale = scale;
        self
    }

    pub fn set_accessor(&mut self, accessor: KeyAccessor) -> &mut Self {
        self.accessor = accessor;
        self
    }

    /// Switches to an ordinal scale over `palette`.
    pub fn set_ordinal_colors(&mut self, palette: Vec<Color>) -> &mut Self {
        self.scale = ColorScale::ordinal(palette);
        self
    }

    /// Switches to a linear scale between `low` and `high` colors.
    pub fn set_linear_colors(&mut self, low: Color, high: Color) -> &mut Self {
        let domain = match &self.scale {
            ColorScale::Linear { domain, .. } => *domain,
            _ => (0.0, 1.0),
        };
        self.scale = ColorScale::linear(domain, (low, high));
        self
    }

    pub fn color(&mut self, row: &GroupRow) -> Color {
        let key = self.accessor.get(row);
        self.scale.color_for(&key)
    }

    /// Color for a key that is not tied to a row (stack layers, legend items).
    pub fn color_for_key(&mut self, key: &Key) -> Color {
        self.scale.color_for(key)
    }

    /// Fits a linear scale's domain to the accessor's numeric extent over `rows`.
    pub fn calculate_color_domain(&mut self, rows: &[GroupRow]) {
        let ColorScale::Linear { domain, .. } = &mut self.scale else {
            return;
        };
        let values = rows.iter().filter_map(|row| self.accessor.get(row).as_f64());
        if let Some(extent) = LinearScale::from_extent(values) {
            *domain = extent.domain();
        }
    }
}
