mod frame;
mod null_renderer;
mod primitives;
mod svg_renderer;

pub use frame::RenderFrame;
pub use null_renderer::{NullRenderer, RenderCall};
pub use primitives::{
    CirclePrimitive, Color, LinePrimitive, MarkTag, PathPrimitive, RectPrimitive, TextHAlign,
    TextPrimitive,
};
pub use svg_renderer::SvgRenderer;

use serde::{Deserialize, Serialize};

use crate::core::Anchor;
use crate::error::ChartResult;

/// Animation request attached to a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub duration_ms: u64,
}

impl Transition {
    #[must_use]
    pub const fn instant() -> Self {
        Self { duration_ms: 0 }
    }

    #[must_use]
    pub const fn over(duration_ms: u64) -> Self {
        Self { duration_ms }
    }

    #[must_use]
    pub const fn is_instant(self) -> bool {
        self.duration_ms == 0
    }
}

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized `RenderFrame` for the chart's
/// anchor; drawing code stays isolated from filter and interaction logic.
/// A non-instant transition asks the backend to animate from the previous
/// frame; the dashboard assumes the animation lasts `duration_ms`.
pub trait Renderer {
    fn render(
        &mut self,
        anchor: &Anchor,
        frame: &RenderFrame,
        transition: Transition,
    ) -> ChartResult<()>;
}
