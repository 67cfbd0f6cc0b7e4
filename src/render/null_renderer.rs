use crate::core::Anchor;
use crate::error::ChartResult;
use crate::render::{RenderFrame, Renderer, Transition};

/// One call received by `NullRenderer`.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub anchor: String,
    pub transition: Transition,
    pub rect_count: usize,
    pub path_count: usize,
    pub circle_count: usize,
    pub deselected_count: usize,
}

/// No-op renderer used by tests and headless usage.
///
/// It still validates frame content so tests catch invalid geometry before
/// a real backend is involved, and records every call.
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub calls: Vec<RenderCall>,
}

impl NullRenderer {
    /// Calls received for `selector`, oldest first.
    #[must_use]
    pub fn calls_for(&self, selector: &str) -> Vec<&RenderCall> {
        self.calls
            .iter()
            .filter(|call| call.anchor == selector)
            .collect()
    }
}

impl Renderer for NullRenderer {
    fn render(
        &mut self,
        anchor: &Anchor,
        frame: &RenderFrame,
        transition: Transition,
    ) -> ChartResult<()> {
        frame.validate()?;
        self.calls.push(RenderCall {
            anchor: anchor.selector().to_owned(),
            transition,
            rect_count: frame.rects.len(),
            path_count: frame.paths.len(),
            circle_count: frame.circles.len(),
            deselected_count: frame.deselected_keys().len(),
        });
        Ok(())
    }
}
