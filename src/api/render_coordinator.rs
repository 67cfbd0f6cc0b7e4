use tracing::{debug, trace};

use crate::core::ChartId;
use crate::error::{ChartError, ChartResult};
use crate::render::{Renderer, Transition};

use super::Dashboard;
use super::chart::DrawPass;
use super::dashboard::ScheduledTask;
use super::listeners::ChartEvent;
use super::validation::{missing_mandatory_attribute, validate_size};

pub(super) struct RenderCoordinator;

impl RenderCoordinator {
    /// Runs one render or redraw cycle for `id`.
    ///
    /// Post hooks (renderlets, post listeners) run before returning when
    /// the draw is instant; otherwise they are parked on the timeline for
    /// the transition duration and skipped if a newer draw supersedes them.
    pub(super) fn draw<R: Renderer>(
        dashboard: &mut Dashboard<R>,
        id: ChartId,
        pass: DrawPass,
    ) -> ChartResult<()> {
        let debug_enabled = dashboard.settings.debug;
        let disable_transitions = dashboard.settings.disable_transitions;
        let chart = dashboard
            .charts
            .get_mut(&id)
            .ok_or(ChartError::UnknownChart(id))?;

        let pre = match pass {
            DrawPass::Render => ChartEvent::PreRender,
            DrawPass::Redraw => ChartEvent::PreRedraw,
        };
        chart.base_mut().emit(&pre);

        if pass == DrawPass::Render {
            if let Some(attribute) = missing_mandatory_attribute(&**chart) {
                return Err(ChartError::MissingMandatoryAttribute {
                    anchor: chart.base().anchor_name(),
                    attribute: attribute.name(),
                });
            }
        }
        if chart.base_mut().take_stale_revision() {
            trace!(chart = %id, "expire cached chart data");
            chart.expire_cache();
        }

        let size = chart.base().size();
        validate_size(size)?;
        let mut frame = chart.draw(pass, size)?;
        frame.controls_visible = chart.base().controls_visible();
        if let Some(legend) = chart.base().legend().copied() {
            let items = chart.legendables();
            legend.draw(&items, &mut frame);
        }

        let duration_ms = chart.base().transition_duration_ms();
        let transition = if disable_transitions {
            Transition::instant()
        } else {
            Transition::over(duration_ms)
        };
        let anchor = chart
            .base()
            .anchor()
            .cloned()
            .ok_or_else(|| ChartError::InvalidData(format!("chart {id} is not anchored")))?;
        dashboard.renderer.render(&anchor, &frame, transition)?;

        let base = chart.base_mut();
        base.last_frame = Some(frame);
        base.draw_cycle += 1;
        let cycle = base.draw_cycle;
        if debug_enabled {
            debug!(
                chart = %id,
                kind = chart.kind(),
                pass = ?pass,
                duration_ms = transition.duration_ms,
                "chart drawn"
            );
        }

        if transition.is_instant() {
            chart.base_mut().settle_draw(pass);
        } else {
            dashboard.timeline.schedule(
                transition.duration_ms,
                ScheduledTask::DrawSettled {
                    chart: id,
                    pass,
                    cycle,
                },
            );
        }
        Ok(())
    }

    /// Transition finished; only the latest draw cycle fires post hooks.
    pub(super) fn settle<R: Renderer>(
        dashboard: &mut Dashboard<R>,
        id: ChartId,
        pass: DrawPass,
        cycle: u64,
    ) {
        let Some(chart) = dashboard.charts.get_mut(&id) else {
            return;
        };
        if chart.base().draw_cycle != cycle {
            trace!(chart = %id, cycle, "superseded draw settled");
            return;
        }
        chart.base_mut().settle_draw(pass);
    }

    /// Re-sends the last frame with its current selection marks, instantly
    /// and without lifecycle events. Used for brush feedback.
    pub(super) fn render_feedback<R: Renderer>(
        dashboard: &mut Dashboard<R>,
        id: ChartId,
    ) -> ChartResult<()> {
        let chart = dashboard
            .charts
            .get(&id)
            .ok_or(ChartError::UnknownChart(id))?;
        let (Some(anchor), Some(frame)) = (chart.base().anchor(), chart.base().last_frame())
        else {
            return Ok(());
        };
        dashboard
            .renderer
            .render(anchor, frame, Transition::instant())
    }
}
