use tracing::trace;

use crate::charts::{HeatMap, HeatMapAxis};
use crate::core::{ChartId, Filter, GroupRow, Key};
use crate::error::{ChartError, ChartResult};
use crate::mixins::coordinate_grid::ranges_equal;
use crate::render::Renderer;

use super::Dashboard;
use super::dashboard::ThrottledAction;

impl<R: Renderer> Dashboard<R> {
    /// Toggles `filter` on the chart (`None` clears it) and updates a
    /// linked focus chart.
    pub fn filter(&mut self, id: ChartId, filter: Option<Filter>) -> ChartResult<()> {
        self.chart_mut(id)?.base_mut().filter(filter);
        self.sync_focus_chart(id)
    }

    /// Clears every filter of one chart.
    pub fn clear_filter(&mut self, id: ChartId) -> ChartResult<()> {
        self.filter(id, None)
    }

    pub fn replace_filter(&mut self, id: ChartId, filter: Option<Filter>) -> ChartResult<()> {
        self.chart_mut(id)?.base_mut().replace_filter(filter);
        self.sync_focus_chart(id)
    }

    pub fn toggle_filters(&mut self, id: ChartId, filters: Vec<Filter>) -> ChartResult<()> {
        self.chart_mut(id)?.base_mut().toggle_filters(filters);
        self.sync_focus_chart(id)
    }

    pub fn has_filter(&self, id: ChartId, filter: Option<&Filter>) -> ChartResult<bool> {
        Ok(self.chart(id)?.base().has_filter(filter))
    }

    pub fn filters(&self, id: ChartId) -> ChartResult<Vec<Filter>> {
        Ok(self.chart(id)?.base().filters().to_vec())
    }

    /// Click on a drawn row: toggles the row's filters, then redraws the
    /// chart's group. An "others" row toggles every folded key.
    pub fn click(&mut self, id: ChartId, row: &GroupRow) -> ChartResult<()> {
        let filters = self.chart(id)?.click_filters(row);
        trace!(chart = %id, count = filters.len(), "click filter");
        self.toggle_filters(id, filters)?;
        self.trigger(ThrottledAction::RedrawGroup { chart: id }, None)
    }

    /// Heat map column or row click: selects every cell on that line, or
    /// clears the line when all of its cells are already selected.
    pub fn toggle_heat_map_axis(
        &mut self,
        id: ChartId,
        axis: HeatMapAxis,
        value: &Key,
    ) -> ChartResult<()> {
        let filters = self
            .downcast::<HeatMap>(id)
            .ok_or(ChartError::CapabilityMissing {
                chart: id,
                capability: "heat map axis",
            })?
            .axis_toggle_filters(axis, value);
        trace!(chart = %id, ?axis, count = filters.len(), "heat map axis toggle");
        self.toggle_filters(id, filters)?;
        self.redraw_group(id)
    }

    /// Keeps a linked focus chart in step with this chart's filter: a
    /// cleared filter resets the focus chart, a changed range refocuses it
    /// after the event delay.
    pub(super) fn sync_focus_chart(&mut self, id: ChartId) -> ChartResult<()> {
        let chart = self.chart(id)?;
        let Some(focus) = chart.coordinate_grid().and_then(|grid| grid.focus_chart()) else {
            return Ok(());
        };
        let filter = chart.base().filter_value().cloned();
        let focus_filter = self.chart(focus)?.base().filter_value().cloned();

        match filter {
            None => self.trigger(
                ThrottledAction::Focus {
                    chart: focus,
                    range: None,
                },
                None,
            ),
            Some(filter) if !ranges_equal(Some(&filter), focus_filter.as_ref()) => {
                let range = filter
                    .as_range()
                    .and_then(|range| range.numeric_extent());
                let delay = Some(self.settings.event_delay_ms);
                self.trigger(ThrottledAction::Focus { chart: focus, range }, delay)
            }
            Some(_) => Ok(()),
        }
    }
}
