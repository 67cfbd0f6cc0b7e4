use tracing::trace;

use crate::core::{ChartId, Filter, Key};
use crate::error::{ChartError, ChartResult};
use crate::mixins::HierarchyMixin;
use crate::render::Renderer;

use super::Dashboard;
use super::listeners::ChartEvent;

const HIERARCHY_CAPABILITY: &str = "hierarchy";

impl<R: Renderer> Dashboard<R> {
    fn hierarchy_of(&self, id: ChartId) -> ChartResult<&HierarchyMixin> {
        self.chart(id)?
            .hierarchy()
            .ok_or(ChartError::CapabilityMissing {
                chart: id,
                capability: HIERARCHY_CAPABILITY,
            })
    }

    /// Runs `mutate` on the chart's hierarchy, then refreshes the controls
    /// flag and notifies filter listeners with `delta`.
    fn mutate_hierarchy(
        &mut self,
        id: ChartId,
        delta: Vec<Filter>,
        mutate: impl FnOnce(&mut HierarchyMixin),
    ) -> ChartResult<()> {
        let chart = self.chart_mut(id)?;
        let hierarchy = chart
            .hierarchy_mut()
            .ok_or(ChartError::CapabilityMissing {
                chart: id,
                capability: HIERARCHY_CAPABILITY,
            })?;
        mutate(hierarchy);
        let any = hierarchy.has_any_filter();
        let base = chart.base_mut();
        base.set_controls_visible(any);
        base.emit(&ChartEvent::Filtered { delta });
        trace!(chart = %id, any_filter = any, "hierarchy filters changed");
        Ok(())
    }

    /// Toggles `value` in `column` only; other columns keep their filters.
    pub fn hierarchy_filter(
        &mut self,
        id: ChartId,
        column: &str,
        value: impl Into<Key>,
    ) -> ChartResult<()> {
        let value = value.into();
        let delta = vec![Filter::Value(value.clone())];
        self.mutate_hierarchy(id, delta, |hierarchy| {
            hierarchy.filter(column, value);
        })
    }

    /// Clears `column`, then adds `value`.
    pub fn hierarchy_replace_filter(
        &mut self,
        id: ChartId,
        column: &str,
        value: impl Into<Key>,
    ) -> ChartResult<()> {
        let value = value.into();
        let delta = vec![Filter::Value(value.clone())];
        self.mutate_hierarchy(id, delta, |hierarchy| {
            hierarchy.replace_filter(column, value);
        })
    }

    pub fn hierarchy_filter_all(&mut self, id: ChartId) -> ChartResult<()> {
        self.mutate_hierarchy(id, Vec::new(), HierarchyMixin::filter_all)
    }

    pub fn hierarchy_filter_all_for_level(&mut self, id: ChartId, column: &str) -> ChartResult<()> {
        self.mutate_hierarchy(id, Vec::new(), |hierarchy| {
            hierarchy.filter_all_for_level(column);
        })
    }

    pub fn hierarchy_has_filter(&self, id: ChartId, column: &str, value: &Key) -> ChartResult<bool> {
        Ok(self.hierarchy_of(id)?.has_filter(column, value))
    }

    pub fn hierarchy_has_any_filter(&self, id: ChartId) -> ChartResult<bool> {
        Ok(self.hierarchy_of(id)?.has_any_filter())
    }

    pub fn hierarchy_filters(&self, id: ChartId, column: &str) -> ChartResult<Vec<Key>> {
        Ok(self.hierarchy_of(id)?.filters_for(column).to_vec())
    }

    /// Click on a node at hierarchy `level`: toggles `value` in that level's
    /// column, then redraws the chart's group.
    pub fn hierarchy_click(&mut self, id: ChartId, level: usize, value: Key) -> ChartResult<()> {
        let column = self
            .hierarchy_of(id)?
            .levels()
            .get(level)
            .map(|level| level.column.clone())
            .ok_or_else(|| {
                ChartError::InvalidData(format!("chart {id} has no hierarchy level {level}"))
            })?;
        self.hierarchy_filter(id, &column, value)?;
        self.redraw_group(id)
    }
}
