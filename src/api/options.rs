use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::core::{ChartId, LinearScale, XScale};
use crate::error::{ChartError, ChartResult};
use crate::mixins::Margins;
use crate::render::Renderer;

use super::Dashboard;

/// Declarative chart configuration. Absent fields leave the chart as is;
/// keys not listed here are kept in `unknown` and reported when applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<Margins>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elastic_x: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elastic_y: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brush_on: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouse_zoomable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_out_restrict: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cap: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub others_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_label: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_title: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controls_use_visibility: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_domain: Option<(f64, f64)>,
    #[serde(flatten)]
    pub unknown: IndexMap<String, serde_json::Value>,
}

impl ChartOptions {
    pub fn from_json(value: &serde_json::Value) -> ChartResult<Self> {
        serde_json::from_value(value.clone())
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart options: {e}")))
    }

    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse chart options: {e}")))
    }
}

impl<R: Renderer> Dashboard<R> {
    /// Applies every present option to the chart. Unknown keys and options
    /// the chart kind has no use for are logged and skipped.
    pub fn apply_options(&mut self, id: ChartId, options: &ChartOptions) -> ChartResult<()> {
        let chart = self.chart_mut(id)?;
        let kind = chart.kind();
        for key in options.unknown.keys() {
            warn!(chart = %id, kind, option = %key, "unknown chart option");
        }

        let base = chart.base_mut();
        if let Some(width) = options.width {
            base.set_width(Some(width));
        }
        if let Some(height) = options.height {
            base.set_height(Some(height));
        }
        if let Some(min_width) = options.min_width {
            base.set_min_width(min_width);
        }
        if let Some(min_height) = options.min_height {
            base.set_min_height(min_height);
        }
        if let Some(duration_ms) = options.transition_duration_ms {
            base.set_transition_duration_ms(duration_ms);
        }
        if let Some(render) = options.render_label {
            base.set_render_label(render);
        }
        if let Some(render) = options.render_title {
            base.set_render_title(render);
        }
        if let Some(use_visibility) = options.controls_use_visibility {
            base.set_controls_use_visibility(use_visibility);
        }

        if let Some(margins) = options.margins {
            if !chart.set_margins(margins) {
                warn!(chart = %id, kind, option = "margins", "option does not apply");
            }
        }

        let cap_options = [
            ("cap", options.cap.is_some()),
            ("others_label", options.others_label.is_some()),
        ];
        match chart.cap_mut() {
            Some(cap) => {
                if let Some(limit) = options.cap {
                    cap.set_cap(Some(limit));
                }
                if let Some(label) = &options.others_label {
                    cap.set_others_label(label.clone());
                }
            }
            None => not_applicable(id, kind, &cap_options),
        }

        let grid_options = [
            ("elastic_x", options.elastic_x.is_some()),
            ("elastic_y", options.elastic_y.is_some()),
            ("brush_on", options.brush_on.is_some()),
            ("mouse_zoomable", options.mouse_zoomable.is_some()),
            ("zoom_out_restrict", options.zoom_out_restrict.is_some()),
            ("x_domain", options.x_domain.is_some()),
        ];
        match chart.coordinate_grid_mut() {
            Some(grid) => {
                if let Some(elastic) = options.elastic_x {
                    grid.set_elastic_x(elastic);
                }
                if let Some(elastic) = options.elastic_y {
                    grid.set_elastic_y(elastic);
                }
                if let Some(brush_on) = options.brush_on {
                    grid.set_brush_on(brush_on);
                }
                if let Some(zoomable) = options.mouse_zoomable {
                    grid.set_mouse_zoomable(zoomable);
                }
                if let Some(restrict) = options.zoom_out_restrict {
                    grid.set_zoom_out_restrict(restrict);
                }
                if let Some((low, high)) = options.x_domain {
                    let scale = LinearScale::new(low, high)?;
                    let is_time = matches!(grid.x(), Some(XScale::Time(_)));
                    if grid.is_ordinal() {
                        warn!(chart = %id, kind, option = "x_domain", "ordinal x has no domain");
                    } else if is_time {
                        grid.set_x(XScale::Time(scale));
                    } else {
                        grid.set_x(XScale::Linear(scale));
                    }
                }
            }
            None => not_applicable(id, kind, &grid_options),
        }

        trace!(chart = %id, kind, "chart options applied");
        Ok(())
    }
}

fn not_applicable(id: ChartId, kind: &'static str, options: &[(&'static str, bool)]) {
    for (option, _) in options.iter().filter(|(_, present)| *present) {
        warn!(chart = %id, kind, option, "option does not apply");
    }
}
