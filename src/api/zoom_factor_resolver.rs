use crate::error::{ChartError, ChartResult};

/// Delta reported by one notch of a typical mouse wheel.
const NOTCH_DELTA: f64 = 120.0;

/// Scale factor for a wheel event: each notch multiplies the zoom by
/// `1 + step_ratio`, wheel-up (negative delta) zooming in. `None` for a
/// zero delta.
pub(super) fn resolve_wheel_zoom_factor(
    wheel_delta_y: f64,
    step_ratio: f64,
) -> ChartResult<Option<f64>> {
    if wheel_delta_y == 0.0 {
        return Ok(None);
    }
    if !wheel_delta_y.is_finite() {
        return Err(ChartError::InvalidData("wheel delta must be finite".to_owned()));
    }
    let notches = -wheel_delta_y / NOTCH_DELTA;
    let factor = (1.0 + step_ratio).powf(notches);
    if factor.is_finite() && factor > 0.0 {
        Ok(Some(factor))
    } else {
        Err(ChartError::InvalidData(format!(
            "wheel zoom factor {factor} is not a positive finite number"
        )))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::resolve_wheel_zoom_factor;

    #[test]
    fn zero_delta_is_no_zoom() {
        assert_eq!(resolve_wheel_zoom_factor(0.0, 0.1).expect("factor"), None);
    }

    #[test]
    fn one_notch_up_zooms_in_by_the_step() {
        let factor = resolve_wheel_zoom_factor(-120.0, 0.1)
            .expect("factor")
            .expect("some");
        assert_relative_eq!(factor, 1.1, epsilon = 1e-12);
        let back = resolve_wheel_zoom_factor(120.0, 0.1)
            .expect("factor")
            .expect("some");
        assert_relative_eq!(factor * back, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn nan_step_is_rejected() {
        let err = resolve_wheel_zoom_factor(120.0, f64::NAN).expect_err("nan ratio");
        assert!(format!("{err}").contains("wheel zoom factor"));
    }
}
