use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::core::{Anchor, ChartId, EventThrottle, Filter, ThrottleToken, Timeline, Triggered};
use crate::error::{ChartError, ChartResult};
use crate::render::Renderer;

use super::chart::{Chart, DrawPass};
use super::registry::{ChartRegistry, RegistryEntry};
use super::render_coordinator::RenderCoordinator;
use super::settings::DashboardSettings;

/// Work parked on the dashboard timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScheduledTask {
    Throttled(ThrottleToken),
    /// A transition finished; `cycle` guards against superseded draws.
    DrawSettled {
        chart: ChartId,
        pass: DrawPass,
        cycle: u64,
    },
}

/// Deferred cross-chart work routed through the event throttle.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ThrottledAction {
    ApplyFilter {
        chart: ChartId,
        filter: Option<Filter>,
    },
    Focus {
        chart: ChartId,
        range: Option<(f64, f64)>,
    },
    RedrawGroup {
        chart: ChartId,
    },
}

/// Hook run after a group-wide render or redraw, with the group name.
pub type GroupHook = Box<dyn FnMut(&str)>;

/// Owner of every anchored chart, the chart registry and the virtual clock.
///
/// Charts live in an arena keyed by `ChartId`; cross-chart links (range
/// and focus charts, chart groups) are ids, resolved on use. Hosts drive
/// delayed work (debounced filters, transition completion) with
/// `advance_by`.
pub struct Dashboard<R: Renderer> {
    pub(super) renderer: R,
    pub(super) settings: DashboardSettings,
    pub(super) registry: ChartRegistry,
    pub(super) charts: IndexMap<ChartId, Box<dyn Chart>>,
    pub(super) timeline: Timeline<ScheduledTask>,
    pub(super) throttle: EventThrottle<ThrottledAction>,
    pub(super) render_hook: Option<GroupHook>,
    pub(super) redraw_hook: Option<GroupHook>,
}

impl<R: Renderer> Dashboard<R> {
    #[must_use]
    pub fn new(renderer: R) -> Self {
        Self::with_settings(renderer, DashboardSettings::default())
    }

    #[must_use]
    pub fn with_settings(renderer: R, settings: DashboardSettings) -> Self {
        Self {
            renderer,
            registry: ChartRegistry::new(settings.default_chart_group.clone()),
            settings,
            charts: IndexMap::new(),
            timeline: Timeline::default(),
            throttle: EventThrottle::default(),
            render_hook: None,
            redraw_hook: None,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn set_disable_transitions(&mut self, disable: bool) {
        self.settings.disable_transitions = disable;
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.settings.debug = debug;
    }

    pub fn set_event_delay_ms(&mut self, delay_ms: u64) {
        self.settings.event_delay_ms = delay_ms;
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    #[must_use]
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    #[must_use]
    pub fn registry(&self) -> &ChartRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ChartRegistry {
        &mut self.registry
    }

    /// Anchors `chart` at `anchor` and registers it into `group` (the
    /// default group when `None` or empty).
    pub fn anchor<C: Chart>(
        &mut self,
        mut chart: C,
        anchor: Anchor,
        group: Option<&str>,
    ) -> ChartId {
        let id = chart.base().id();
        let group_name = self.registry.resolve_group(group).to_owned();
        chart
            .base_mut()
            .set_anchor(anchor.clone(), Some(group_name.clone()));
        self.registry
            .register(RegistryEntry { id, anchor }, Some(&group_name));
        if self.settings.debug {
            debug!(chart = %id, kind = chart.kind(), group = %group_name, "anchor chart");
        }
        self.charts.insert(id, Box::new(chart));
        id
    }

    /// Removes the chart from its group and from the dashboard. Other charts
    /// sharing its anchor stay registered. Range/focus links pointing at it
    /// are cleared.
    pub fn deregister(&mut self, id: ChartId) -> ChartResult<Box<dyn Chart>> {
        let chart = self
            .charts
            .shift_remove(&id)
            .ok_or(ChartError::UnknownChart(id))?;
        if let Some(anchor) = chart.base().anchor() {
            self.registry
                .deregister_id(anchor, id, chart.base().chart_group());
        }
        for other in self.charts.values_mut() {
            if let Some(grid) = other.coordinate_grid_mut() {
                if grid.range_chart() == Some(id) {
                    grid.set_range_chart(None);
                }
                if grid.focus_chart() == Some(id) {
                    grid.set_focus_chart(None);
                }
            }
        }
        Ok(chart)
    }

    #[must_use]
    pub fn contains(&self, id: ChartId) -> bool {
        self.charts.contains_key(&id)
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = ChartId> + '_ {
        self.charts.keys().copied()
    }

    pub fn chart(&self, id: ChartId) -> ChartResult<&dyn Chart> {
        self.charts
            .get(&id)
            .map(|chart| &**chart)
            .ok_or(ChartError::UnknownChart(id))
    }

    pub fn chart_mut(&mut self, id: ChartId) -> ChartResult<&mut dyn Chart> {
        match self.charts.get_mut(&id) {
            Some(chart) => Ok(&mut **chart),
            None => Err(ChartError::UnknownChart(id)),
        }
    }

    /// Typed access to an anchored chart.
    #[must_use]
    pub fn downcast<C: Chart>(&self, id: ChartId) -> Option<&C> {
        self.charts.get(&id)?.as_any().downcast_ref::<C>()
    }

    pub fn downcast_mut<C: Chart>(&mut self, id: ChartId) -> Option<&mut C> {
        self.charts.get_mut(&id)?.as_any_mut().downcast_mut::<C>()
    }

    pub fn render(&mut self, id: ChartId) -> ChartResult<()> {
        RenderCoordinator::draw(self, id, DrawPass::Render)
    }

    pub fn redraw(&mut self, id: ChartId) -> ChartResult<()> {
        RenderCoordinator::draw(self, id, DrawPass::Redraw)
    }

    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.timeline.pending_count()
    }

    /// Advances the virtual clock, running every task that comes due,
    /// including follow-ups scheduled inside the window. A failing task is
    /// logged and the rest still run; the first error is returned.
    pub fn advance_by(&mut self, delta_ms: u64) -> ChartResult<()> {
        let until = self.timeline.now_ms().saturating_add(delta_ms);
        let mut first_error = None;
        while let Some(task) = self.timeline.pop_due(until) {
            if let Err(err) = self.dispatch(task) {
                warn!(error = %err, "scheduled dashboard task failed");
                first_error.get_or_insert(err);
            }
        }
        self.timeline.settle(until);
        first_error.map_or(Ok(()), Err)
    }

    fn dispatch(&mut self, task: ScheduledTask) -> ChartResult<()> {
        match task {
            ScheduledTask::Throttled(token) => match self.throttle.fire(token) {
                Some(action) => self.run_throttled(action),
                None => Ok(()),
            },
            ScheduledTask::DrawSettled { chart, pass, cycle } => {
                RenderCoordinator::settle(self, chart, pass, cycle);
                Ok(())
            }
        }
    }

    /// Runs `action` now without a delay, otherwise parks it on the
    /// timeline where a newer trigger supersedes it.
    pub(super) fn trigger(
        &mut self,
        action: ThrottledAction,
        delay_ms: Option<u64>,
    ) -> ChartResult<()> {
        match self.throttle.trigger(action, delay_ms) {
            Triggered::RunNow(action) => self.run_throttled(action),
            Triggered::Scheduled { token, delay_ms } => {
                self.timeline
                    .schedule(delay_ms, ScheduledTask::Throttled(token));
                Ok(())
            }
        }
    }

    fn run_throttled(&mut self, action: ThrottledAction) -> ChartResult<()> {
        match action {
            ThrottledAction::ApplyFilter { chart, filter } => {
                self.chart_mut(chart)?.base_mut().replace_filter(filter);
                self.sync_focus_chart(chart)?;
                self.redraw_group(chart)
            }
            ThrottledAction::Focus { chart, range } => self.focus(chart, range),
            ThrottledAction::RedrawGroup { chart } => self.redraw_group(chart),
        }
    }
}
