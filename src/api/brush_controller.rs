//! Brush gestures on coordinate-grid charts.
//!
//! Pixel positions are plot-local (margins already subtracted). Moves give
//! instant visual feedback on the last frame without touching data; the
//! filter is applied on brush end through the event throttle.

use tracing::trace;

use crate::charts::ScatterPlot;
use crate::core::{ChartId, Filter};
use crate::error::{ChartError, ChartResult};
use crate::mixins::coordinate_grid::is_empty_extent;
use crate::render::Renderer;

use super::Dashboard;
use super::chart::Chart;
use super::dashboard::ThrottledAction;
use super::render_coordinator::RenderCoordinator;

impl<R: Renderer> Dashboard<R> {
    /// Starts a 1D brush. Ignored when brushing is off or x is ordinal.
    pub fn brush_start(&mut self, id: ChartId, x_px: f64) -> ChartResult<()> {
        let grid = self.grid_mut(id)?;
        if !grid.brush_on() || grid.is_ordinal() {
            return Ok(());
        }
        grid.brush.begin(x_px);
        Ok(())
    }

    pub fn brush_move(&mut self, id: ChartId, x_px: f64) -> ChartResult<()> {
        let size = self.chart(id)?.base().size();
        let grid = self.grid_mut(id)?;
        if !grid.brush.is_active() {
            return Ok(());
        }
        grid.brush.update(x_px);
        let plot_width = grid.plot_size(size).width;
        let extent = grid.brush_extent(plot_width);
        let selection = if is_empty_extent(extent) {
            None
        } else {
            extent.map(|extent| grid.extent_filter(extent))
        };
        self.chart_mut(id)?.brush_feedback(selection.as_ref());
        RenderCoordinator::render_feedback(self, id)
    }

    /// Ends the brush. A degenerate extent clears the filter; otherwise
    /// the extent becomes the chart's only filter. Either way the update
    /// is debounced and followed by a group redraw.
    pub fn brush_end(&mut self, id: ChartId, x_px: f64) -> ChartResult<()> {
        let size = self.chart(id)?.base().size();
        let grid = self.grid_mut(id)?;
        if !grid.brush.is_active() {
            return Ok(());
        }
        grid.brush.update(x_px);
        let plot_width = grid.plot_size(size).width;
        let extent = grid
            .brush
            .take_final_px()
            .and_then(|pixels| grid.pixel_extent_to_domain(pixels, plot_width));
        let filter = if is_empty_extent(extent) {
            None
        } else {
            extent.map(|extent| grid.extent_filter(extent))
        };
        trace!(chart = %id, filter = ?filter, "brush end");
        if filter.is_none() {
            self.chart_mut(id)?.brush_feedback(None);
        }
        let delay = Some(self.settings.event_delay_ms);
        self.trigger(ThrottledAction::ApplyFilter { chart: id, filter }, delay)
    }

    fn scatter_mut(&mut self, id: ChartId) -> ChartResult<&mut ScatterPlot> {
        if !self.contains(id) {
            return Err(ChartError::UnknownChart(id));
        }
        self.downcast_mut::<ScatterPlot>(id)
            .ok_or(ChartError::CapabilityMissing {
                chart: id,
                capability: "2d brush",
            })
    }

    /// Starts a rectangular brush on a scatter plot.
    pub fn brush_rect_start(&mut self, id: ChartId, x_px: f64, y_px: f64) -> ChartResult<()> {
        let scatter = self.scatter_mut(id)?;
        if scatter.grid().brush_on() {
            scatter.rect_brush.begin(x_px, y_px);
        }
        Ok(())
    }

    pub fn brush_rect_move(&mut self, id: ChartId, x_px: f64, y_px: f64) -> ChartResult<()> {
        let scatter = self.scatter_mut(id)?;
        if !scatter.rect_brush.is_active() {
            return Ok(());
        }
        scatter.rect_brush.update(x_px, y_px);
        let selection = scatter
            .rect_brush
            .rect_px()
            .and_then(|rect| scatter.rect_filter(rect));
        scatter.brush_feedback(selection.as_ref());
        RenderCoordinator::render_feedback(self, id)
    }

    /// Ends a rectangular brush; empty rectangles clear the filter.
    pub fn brush_rect_end(&mut self, id: ChartId, x_px: f64, y_px: f64) -> ChartResult<()> {
        let scatter = self.scatter_mut(id)?;
        if !scatter.rect_brush.is_active() {
            return Ok(());
        }
        scatter.rect_brush.update(x_px, y_px);
        let filter: Option<Filter> = scatter
            .rect_brush
            .take_final_px()
            .and_then(|rect| scatter.rect_filter(rect));
        let delay = Some(self.settings.event_delay_ms);
        self.trigger(ThrottledAction::ApplyFilter { chart: id, filter }, delay)
    }
}
