//! Coordinate-grid behavior: x/y scales, elastic axes, brushing and the
//! zoom/focus state shared with linked range and focus charts.
//!
//! The cross-chart parts of the protocol (throttled filter apply, range
//! chart propagation, focus linkage) live on `Dashboard`; this type only
//! holds per-chart state and the pure geometry.

use std::fmt;
use std::rc::Rc;

use crate::core::arithmetic::{self, Step};
use crate::core::{ChartId, Filter, Key, LinearScale, Size, XScale};
use crate::error::ChartResult;
use crate::interaction::BrushX;
use crate::mixins::Margins;

/// Quantizes a brushed domain value (e.g. round to whole days).
#[derive(Clone)]
pub struct Rounding(Rc<dyn Fn(f64) -> f64>);

impl Rounding {
    #[must_use]
    pub fn new(round: impl Fn(f64) -> f64 + 'static) -> Self {
        Self(Rc::new(round))
    }

    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        (self.0)(value)
    }
}

impl fmt::Debug for Rounding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Rounding(..)")
    }
}

#[derive(Debug, Clone)]
pub struct CoordinateGrid {
    margins: Margins,
    x: Option<XScale>,
    x_original_domain: Option<(f64, f64)>,
    y: LinearScale,
    elastic_x: bool,
    elastic_y: bool,
    x_axis_padding: Step,
    y_axis_padding: Step,
    brush_on: bool,
    pub(crate) brush: BrushX,
    rounding: Option<Rounding>,
    mouse_zoomable: bool,
    zoom_out_restrict: bool,
    zoom_scale_extent: (f64, f64),
    wheel_zoom_step_ratio: f64,
    range_chart: Option<ChartId>,
    focus_chart: Option<ChartId>,
    x_unit: f64,
    x_units_cache: Option<usize>,
    render_horizontal_grid_lines: bool,
}

impl Default for CoordinateGrid {
    fn default() -> Self {
        Self {
            margins: Margins::default(),
            x: None,
            x_original_domain: None,
            y: LinearScale::default(),
            elastic_x: false,
            elastic_y: false,
            x_axis_padding: Step::Absolute(0.0),
            y_axis_padding: Step::Absolute(0.0),
            brush_on: true,
            brush: BrushX::default(),
            rounding: None,
            mouse_zoomable: false,
            zoom_out_restrict: true,
            zoom_scale_extent: (1.0, f64::INFINITY),
            wheel_zoom_step_ratio: 0.1,
            range_chart: None,
            focus_chart: None,
            x_unit: 1.0,
            x_units_cache: None,
            render_horizontal_grid_lines: false,
        }
    }
}

impl CoordinateGrid {
    #[must_use]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn set_margins(&mut self, margins: Margins) -> &mut Self {
        self.margins = margins;
        self
    }

    #[must_use]
    pub fn x(&self) -> Option<&XScale> {
        self.x.as_ref()
    }

    /// Sets the x scale and records its domain as the original (zoom-reset) domain.
    pub fn set_x(&mut self, x: XScale) -> &mut Self {
        self.x_original_domain = x.continuous().map(LinearScale::domain);
        self.x = Some(x);
        self.expire_cache();
        self
    }

    #[must_use]
    pub fn x_original_domain(&self) -> Option<(f64, f64)> {
        self.x_original_domain
    }

    #[must_use]
    pub fn x_domain(&self) -> Option<(f64, f64)> {
        self.x
            .as_ref()
            .and_then(XScale::continuous)
            .map(LinearScale::domain)
    }

    /// Replaces the visible continuous domain without touching the original.
    pub(crate) fn set_x_domain(&mut self, domain: (f64, f64)) -> ChartResult<()> {
        if let Some(x) = &mut self.x {
            x.replace_continuous_domain(domain)?;
            self.expire_cache();
        }
        Ok(())
    }

    #[must_use]
    pub fn is_ordinal(&self) -> bool {
        self.x.as_ref().is_some_and(XScale::is_ordinal)
    }

    #[must_use]
    pub fn y(&self) -> LinearScale {
        self.y
    }

    pub fn set_y_domain(&mut self, low: f64, high: f64) -> ChartResult<&mut Self> {
        self.y = LinearScale::new(low, high)?;
        Ok(self)
    }

    #[must_use]
    pub fn elastic_x(&self) -> bool {
        self.elastic_x
    }

    pub fn set_elastic_x(&mut self, elastic: bool) -> &mut Self {
        self.elastic_x = elastic;
        self
    }

    #[must_use]
    pub fn elastic_y(&self) -> bool {
        self.elastic_y
    }

    pub fn set_elastic_y(&mut self, elastic: bool) -> &mut Self {
        self.elastic_y = elastic;
        self
    }

    pub fn set_x_axis_padding(&mut self, padding: Step) -> &mut Self {
        self.x_axis_padding = padding;
        self
    }

    pub fn set_y_axis_padding(&mut self, padding: Step) -> &mut Self {
        self.y_axis_padding = padding;
        self
    }

    #[must_use]
    pub fn brush_on(&self) -> bool {
        self.brush_on
    }

    pub fn set_brush_on(&mut self, brush_on: bool) -> &mut Self {
        self.brush_on = brush_on;
        self
    }

    pub fn set_rounding(&mut self, rounding: Option<Rounding>) -> &mut Self {
        self.rounding = rounding;
        self
    }

    #[must_use]
    pub fn mouse_zoomable(&self) -> bool {
        self.mouse_zoomable
    }

    pub fn set_mouse_zoomable(&mut self, zoomable: bool) -> &mut Self {
        self.mouse_zoomable = zoomable;
        self
    }

    #[must_use]
    pub fn zoom_out_restrict(&self) -> bool {
        self.zoom_out_restrict
    }

    pub fn set_zoom_out_restrict(&mut self, restrict: bool) -> &mut Self {
        self.zoom_out_restrict = restrict;
        self
    }

    #[must_use]
    pub fn zoom_scale_extent(&self) -> (f64, f64) {
        self.zoom_scale_extent
    }

    /// Allowed zoom factors relative to the original domain, `(min, max)`.
    pub fn set_zoom_scale_extent(&mut self, min: f64, max: f64) -> &mut Self {
        self.zoom_scale_extent = (min.min(max), max.max(min));
        self
    }

    #[must_use]
    pub fn wheel_zoom_step_ratio(&self) -> f64 {
        self.wheel_zoom_step_ratio
    }

    pub fn set_wheel_zoom_step_ratio(&mut self, ratio: f64) -> &mut Self {
        self.wheel_zoom_step_ratio = ratio;
        self
    }

    #[must_use]
    pub fn range_chart(&self) -> Option<ChartId> {
        self.range_chart
    }

    pub(crate) fn set_range_chart(&mut self, chart: Option<ChartId>) {
        self.range_chart = chart;
    }

    #[must_use]
    pub fn focus_chart(&self) -> Option<ChartId> {
        self.focus_chart
    }

    pub(crate) fn set_focus_chart(&mut self, chart: Option<ChartId>) {
        self.focus_chart = chart;
    }

    /// Width of one x unit in domain terms, used to size bars.
    pub fn set_x_unit(&mut self, unit: f64) -> &mut Self {
        if unit.is_finite() && unit > 0.0 {
            self.x_unit = unit;
            self.expire_cache();
        }
        self
    }

    #[must_use]
    pub fn render_horizontal_grid_lines(&self) -> bool {
        self.render_horizontal_grid_lines
    }

    pub fn set_render_horizontal_grid_lines(&mut self, render: bool) -> &mut Self {
        self.render_horizontal_grid_lines = render;
        self
    }

    pub fn expire_cache(&mut self) {
        self.x_units_cache = None;
    }

    /// Number of x units across the visible domain; cached until the domain changes.
    pub fn x_units_count(&mut self) -> usize {
        if let Some(count) = self.x_units_cache {
            return count;
        }
        let count = match &self.x {
            Some(XScale::Ordinal(scale)) => scale.domain().len(),
            Some(XScale::Linear(scale) | XScale::Time(scale)) => {
                let units = (scale.span().abs() / self.x_unit).ceil();
                if units.is_finite() { units.max(1.0) as usize } else { 1 }
            }
            None => 0,
        };
        self.x_units_cache = Some(count);
        count
    }

    #[must_use]
    pub fn plot_size(&self, size: Size) -> Size {
        Size::new(
            self.margins.effective_width(size.width),
            self.margins.effective_height(size.height),
        )
    }

    /// Applies elastic/ordinal x domain rules to the keys about to be drawn.
    pub fn rescale_x(&mut self, keys: &[Key]) -> ChartResult<()> {
        match &mut self.x {
            Some(XScale::Ordinal(scale)) => {
                if self.elastic_x || scale.domain().is_empty() {
                    let mut domain: Vec<Key> = Vec::with_capacity(keys.len());
                    for key in keys {
                        if !domain.contains(key) {
                            domain.push(key.clone());
                        }
                    }
                    scale.set_domain(domain);
                    self.x_units_cache = None;
                }
            }
            Some(x) if self.elastic_x => {
                let Some(extent) = LinearScale::from_extent(keys.iter().filter_map(Key::as_f64))
                else {
                    return Ok(());
                };
                let (low, high) = extent.domain();
                let low = arithmetic::subtract(&Key::number(low), self.x_axis_padding)
                    .as_f64()
                    .unwrap_or(low);
                let high = arithmetic::add(&Key::number(high), self.x_axis_padding)
                    .as_f64()
                    .unwrap_or(high);
                x.replace_continuous_domain((low, high))?;
                self.x_original_domain = Some((low, high));
                self.x_units_cache = None;
            }
            _ => {}
        }
        Ok(())
    }

    /// Applies elastic y rules; the domain always includes zero.
    pub fn rescale_y(&mut self, values: impl IntoIterator<Item = f64>) -> ChartResult<()> {
        if !self.elastic_y {
            return Ok(());
        }
        let Some(extent) = LinearScale::from_extent(values) else {
            return Ok(());
        };
        let (low, high) = extent.domain();
        let low = arithmetic::subtract(&Key::number(low.min(0.0)), self.y_axis_padding)
            .as_f64()
            .unwrap_or(low);
        let high = arithmetic::add(&Key::number(high.max(0.0)), self.y_axis_padding)
            .as_f64()
            .unwrap_or(high);
        self.y = LinearScale::new(low, high)?;
        Ok(())
    }

    /// `true` when `key` falls inside the visible x domain; ordinal and
    /// elastic grids accept every key.
    #[must_use]
    pub fn in_visible_domain(&self, key: &Key) -> bool {
        if self.elastic_x || self.is_ordinal() {
            return true;
        }
        match (self.x_domain(), key.as_f64()) {
            (Some((low, high)), Some(value)) => value >= low && value <= high,
            _ => true,
        }
    }

    /// Current brush extent inverted into domain space, rounded when configured.
    #[must_use]
    pub fn brush_extent(&self, plot_width: f64) -> Option<(f64, f64)> {
        let (start_px, end_px) = self.brush.range_px()?;
        self.pixel_extent_to_domain((start_px, end_px), plot_width)
    }

    pub(crate) fn pixel_extent_to_domain(
        &self,
        (start_px, end_px): (f64, f64),
        plot_width: f64,
    ) -> Option<(f64, f64)> {
        let scale = self.x.as_ref()?.continuous()?;
        let start = scale.from_pixel(start_px, plot_width).ok()?;
        let end = scale.from_pixel(end_px, plot_width).ok()?;
        Some(match &self.rounding {
            Some(rounding) => (rounding.apply(start), rounding.apply(end)),
            None => (start, end),
        })
    }

    /// Ranged filter spanning `extent`, with keys of the x scale's class.
    #[must_use]
    pub fn extent_filter(&self, (low, high): (f64, f64)) -> Filter {
        match &self.x {
            Some(x) => Filter::range(x.numeric_key(low), x.numeric_key(high)),
            None => Filter::range(low, high),
        }
    }

    /// Domain the zoom may not leave: the linked range chart's, else the original.
    #[must_use]
    pub fn zoom_bounds(&self, range_chart_domain: Option<(f64, f64)>) -> Option<(f64, f64)> {
        range_chart_domain.or(self.x_original_domain)
    }
}

/// Degenerate-brush rule: missing, non-finite, zero or negative width extents
/// all count as empty.
#[must_use]
pub fn is_empty_extent(extent: Option<(f64, f64)>) -> bool {
    match extent {
        None => true,
        Some((low, high)) => !low.is_finite() || !high.is_finite() || high - low <= 0.0,
    }
}

/// Clamps `domain` into `bounds`, preserving its span when it fits.
#[must_use]
pub fn constrain_domain(domain: (f64, f64), bounds: (f64, f64)) -> (f64, f64) {
    let span = domain.1 - domain.0;
    let bounds_span = bounds.1 - bounds.0;
    if span >= bounds_span {
        return bounds;
    }
    if domain.0 < bounds.0 {
        return (bounds.0, bounds.0 + span);
    }
    if domain.1 > bounds.1 {
        return (bounds.1 - span, bounds.1);
    }
    domain
}

/// Zooms `current` by `factor` about `anchor`, keeping the anchor's relative
/// position and the resulting scale inside `scale_extent` of `original`.
#[must_use]
pub fn zoom_domain(
    current: (f64, f64),
    anchor: f64,
    factor: f64,
    original: (f64, f64),
    scale_extent: (f64, f64),
) -> (f64, f64) {
    let current_span = current.1 - current.0;
    let original_span = original.1 - original.0;
    let mut target_span = current_span / factor;
    if original_span > 0.0 && target_span > 0.0 {
        let scale = (original_span / target_span).clamp(scale_extent.0, scale_extent.1);
        target_span = original_span / scale;
    }
    let ratio = if current_span == 0.0 {
        0.5
    } else {
        (anchor - current.0) / current_span
    };
    let start = anchor - ratio * target_span;
    (start, start + target_span)
}

/// Range equality between two optional filters, as used by the focus
/// linkage to suppress redundant updates.
#[must_use]
pub fn ranges_equal(left: Option<&Filter>, right: Option<&Filter>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(Filter::Ranged(left)), Some(Filter::Ranged(right))) => {
            match (left.numeric_extent(), right.numeric_extent()) {
                (Some(left), Some(right)) => {
                    (left.0 - right.0).abs() <= f64::EPSILON
                        && (left.1 - right.1).abs() <= f64::EPSILON
                }
                _ => left == right,
            }
        }
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}
