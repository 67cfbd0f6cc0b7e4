use crate::error::{ChartError, ChartResult};

/// Domain shift for a pixel drag: dragging right moves the window left.
pub(super) fn resolve_pixel_pan_delta(
    delta_px: f64,
    plot_width_px: f64,
    visible_span: f64,
) -> ChartResult<f64> {
    if !plot_width_px.is_finite() || plot_width_px <= 0.0 {
        return Err(ChartError::InvalidData(
            "pan plot width must be finite and > 0".to_owned(),
        ));
    }
    let delta = -(delta_px / plot_width_px) * visible_span;
    if !delta.is_finite() {
        return Err(ChartError::InvalidData(
            "computed pixel pan delta must be finite".to_owned(),
        ));
    }
    Ok(delta)
}
