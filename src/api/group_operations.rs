//! Operations over every chart of a chart group, in registration order.

use tracing::{debug, warn};

use crate::core::{ChartId, Filter};
use crate::error::ChartResult;
use crate::render::Renderer;

use super::Dashboard;
use super::chart::DrawPass;
use super::dashboard::GroupHook;
use super::render_coordinator::RenderCoordinator;

impl<R: Renderer> Dashboard<R> {
    pub fn set_render_hook(&mut self, hook: Option<GroupHook>) {
        self.render_hook = hook;
    }

    pub fn set_redraw_hook(&mut self, hook: Option<GroupHook>) {
        self.redraw_hook = hook;
    }

    /// Renders every chart of `group` (the default group for `None`), then
    /// runs the render hook. A failing chart does not stop the others; the
    /// first error is returned.
    pub fn render_all(&mut self, group: Option<&str>) -> ChartResult<()> {
        self.draw_all(group, DrawPass::Render)
    }

    pub fn redraw_all(&mut self, group: Option<&str>) -> ChartResult<()> {
        self.draw_all(group, DrawPass::Redraw)
    }

    fn draw_all(&mut self, group: Option<&str>, pass: DrawPass) -> ChartResult<()> {
        let group_name = self.registry.resolve_group(group).to_owned();
        let ids = self.registry.ids(Some(&group_name));
        if self.settings.debug {
            debug!(group = %group_name, charts = ids.len(), pass = ?pass, "draw chart group");
        }
        let mut first_error = None;
        for id in ids {
            if let Err(err) = RenderCoordinator::draw(self, id, pass) {
                warn!(chart = %id, error = %err, "chart draw failed");
                first_error.get_or_insert(err);
            }
        }
        let hook = match pass {
            DrawPass::Render => self.render_hook.as_mut(),
            DrawPass::Redraw => self.redraw_hook.as_mut(),
        };
        if let Some(hook) = hook {
            hook(&group_name);
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Renders the chart group `id` belongs to.
    pub fn render_group(&mut self, id: ChartId) -> ChartResult<()> {
        let group = self.group_of(id)?;
        self.render_all(group.as_deref())
    }

    pub fn redraw_group(&mut self, id: ChartId) -> ChartResult<()> {
        let group = self.group_of(id)?;
        self.redraw_all(group.as_deref())
    }

    fn group_of(&self, id: ChartId) -> ChartResult<Option<String>> {
        Ok(self.chart(id)?.base().chart_group().map(str::to_owned))
    }

    /// Clears the filters of every chart in `group`, hierarchy columns
    /// included. Does not redraw.
    pub fn filter_all(&mut self, group: Option<&str>) -> ChartResult<()> {
        let group_name = self.registry.resolve_group(group).to_owned();
        for id in self.registry.ids(Some(&group_name)) {
            self.filter(id, None)?;
            if self.chart(id)?.hierarchy().is_some() {
                self.hierarchy_filter_all(id)?;
            }
        }
        Ok(())
    }

    /// Resets every coordinate-grid chart of `group` to its original x domain.
    pub fn refocus_all(&mut self, group: Option<&str>) -> ChartResult<()> {
        let group_name = self.registry.resolve_group(group).to_owned();
        for id in self.registry.ids(Some(&group_name)) {
            if self.chart(id)?.coordinate_grid().is_some() {
                self.focus(id, None)?;
            }
        }
        Ok(())
    }

    /// Legend click. Stacked charts hide or show the named layer and
    /// re-render; other charts toggle a filter on the row whose key reads
    /// as `name`, then redraw their group.
    pub fn legend_toggle(&mut self, id: ChartId, name: &str) -> ChartResult<()> {
        let chart = self.chart_mut(id)?;
        if let Some(stack) = chart.stack_mut() {
            if !stack.show_stack(name) {
                stack.hide_stack(name);
            }
            return self.render(id);
        }
        let Some(key) = chart
            .data()
            .into_iter()
            .map(|row| row.key)
            .find(|key| key.to_string() == name)
        else {
            warn!(chart = %id, name, "legend item matches no data row");
            return Ok(());
        };
        self.filter(id, Some(Filter::Value(key)))?;
        self.redraw_group(id)
    }
}
