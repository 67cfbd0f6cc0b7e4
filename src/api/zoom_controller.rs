use tracing::{debug, trace};

use crate::core::ChartId;
use crate::error::{ChartError, ChartResult};
use crate::mixins::CoordinateGrid;
use crate::mixins::coordinate_grid::{constrain_domain, ranges_equal, zoom_domain};
use crate::render::Renderer;

use super::Dashboard;
use super::dashboard::ThrottledAction;
use super::listeners::ChartEvent;
use super::pan_delta_resolver::resolve_pixel_pan_delta;
use super::validation::validate_zoom_domain;
use super::zoom_factor_resolver::resolve_wheel_zoom_factor;

const GRID_CAPABILITY: &str = "coordinate grid";

impl<R: Renderer> Dashboard<R> {
    pub(super) fn grid(&self, id: ChartId) -> ChartResult<&CoordinateGrid> {
        self.chart(id)?
            .coordinate_grid()
            .ok_or(ChartError::CapabilityMissing {
                chart: id,
                capability: GRID_CAPABILITY,
            })
    }

    pub(super) fn grid_mut(&mut self, id: ChartId) -> ChartResult<&mut CoordinateGrid> {
        self.chart_mut(id)?
            .coordinate_grid_mut()
            .ok_or(ChartError::CapabilityMissing {
                chart: id,
                capability: GRID_CAPABILITY,
            })
    }

    /// Links `focus` (detail) and `range` (overview) charts both ways.
    pub fn set_range_chart(&mut self, focus: ChartId, range: ChartId) -> ChartResult<()> {
        self.grid(range)?;
        self.grid_mut(focus)?.set_range_chart(Some(range));
        self.grid_mut(range)?.set_focus_chart(Some(focus));
        Ok(())
    }

    /// Zooms the chart to `range`, or back to its original domain.
    ///
    /// The new domain becomes the chart's ranged filter (cleared at the
    /// original domain), the chart redraws, a linked range chart follows
    /// immediately, and the chart group redraws after the event delay.
    pub fn focus(&mut self, id: ChartId, range: Option<(f64, f64)>) -> ChartResult<()> {
        let range = range.map(validate_zoom_domain).transpose()?;
        let grid = self.grid(id)?;
        let original = grid.x_original_domain();
        let range_chart = grid.range_chart();
        let range_chart_domain = match range_chart {
            Some(linked) => self.grid(linked)?.x_original_domain(),
            None => None,
        };
        let bounds = grid.zoom_bounds(range_chart_domain);
        let domain = match (range, bounds) {
            (Some(range), Some(bounds)) if grid.zoom_out_restrict() => {
                Some(constrain_domain(range, bounds))
            }
            (Some(range), _) => Some(range),
            (None, _) => original,
        };
        let Some(domain) = domain else {
            trace!(chart = %id, "focus ignored: no continuous x domain");
            return Ok(());
        };
        let at_original = original.is_some_and(|original| {
            (original.0 - domain.0).abs() <= f64::EPSILON
                && (original.1 - domain.1).abs() <= f64::EPSILON
        });

        let grid = self.grid_mut(id)?;
        grid.set_x_domain(domain)?;
        let filter = (!at_original).then(|| grid.extent_filter(domain));
        if self.settings.debug {
            debug!(chart = %id, low = domain.0, high = domain.1, "focus");
        }

        let chart = self.chart_mut(id)?;
        chart.base_mut().replace_filter(filter.clone());
        self.redraw(id)?;
        self.chart_mut(id)?
            .base_mut()
            .emit(&ChartEvent::Zoomed { domain });

        if let Some(linked) = range_chart {
            let linked_filter = self.chart(linked)?.base().filter_value().cloned();
            if !ranges_equal(filter.as_ref(), linked_filter.as_ref()) {
                self.chart_mut(linked)?.base_mut().replace_filter(filter);
                self.redraw(linked)?;
            }
        }

        let delay = Some(self.settings.event_delay_ms);
        self.trigger(ThrottledAction::RedrawGroup { chart: id }, delay)
    }

    /// Wheel zoom about `anchor_px` (plot-local). No-op unless the chart
    /// is mouse zoomable.
    pub fn zoom(&mut self, id: ChartId, wheel_delta_y: f64, anchor_px: f64) -> ChartResult<()> {
        let size = self.chart(id)?.base().size();
        let grid = self.grid(id)?;
        if !grid.mouse_zoomable() {
            return Ok(());
        }
        let step_ratio = grid.wheel_zoom_step_ratio();
        let Some(factor) = resolve_wheel_zoom_factor(wheel_delta_y, step_ratio)? else {
            return Ok(());
        };
        let Some(scale) = grid.x().and_then(|x| x.continuous()) else {
            return Ok(());
        };
        let current = scale.domain();
        let plot_width = grid.plot_size(size).width;
        let anchor = scale.from_pixel(anchor_px, plot_width)?;
        let original = grid.x_original_domain().unwrap_or(current);
        let target = zoom_domain(current, anchor, factor, original, grid.zoom_scale_extent());
        trace!(chart = %id, factor, "wheel zoom");
        self.focus(id, Some(target))
    }

    /// Pans by a plot-local pixel drag. No-op unless mouse zoomable.
    pub fn pan(&mut self, id: ChartId, delta_px: f64) -> ChartResult<()> {
        let size = self.chart(id)?.base().size();
        let grid = self.grid(id)?;
        if !grid.mouse_zoomable() || delta_px == 0.0 {
            return Ok(());
        }
        let Some(current) = grid.x_domain() else {
            return Ok(());
        };
        let plot_width = grid.plot_size(size).width;
        let delta = resolve_pixel_pan_delta(delta_px, plot_width, current.1 - current.0)?;
        self.focus(id, Some((current.0 + delta, current.1 + delta)))
    }
}
