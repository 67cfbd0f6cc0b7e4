use serde::{Deserialize, Serialize};

use crate::core::{Key, Size};
use crate::error::{ChartError, ChartResult};
use crate::render::{
    CirclePrimitive, LinePrimitive, MarkTag, PathPrimitive, RectPrimitive, TextPrimitive,
};

/// Backend-agnostic scene for one chart draw pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub size: Size,
    pub rects: Vec<RectPrimitive>,
    pub lines: Vec<LinePrimitive>,
    pub paths: Vec<PathPrimitive>,
    pub circles: Vec<CirclePrimitive>,
    pub texts: Vec<TextPrimitive>,
    /// Whether the reset/filter controls are shown for this chart.
    pub controls_visible: bool,
}

impl RenderFrame {
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            size,
            rects: Vec::new(),
            lines: Vec::new(),
            paths: Vec::new(),
            circles: Vec::new(),
            texts: Vec::new(),
            controls_visible: false,
        }
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    /// Appends every primitive of `other`, translated by `(dx, dy)`.
    pub fn extend_translated(&mut self, other: RenderFrame, dx: f64, dy: f64) {
        self.rects.extend(other.rects.into_iter().map(|mut rect| {
            rect.x += dx;
            rect.y += dy;
            rect
        }));
        self.lines.extend(other.lines.into_iter().map(|mut line| {
            line.x1 += dx;
            line.x2 += dx;
            line.y1 += dy;
            line.y2 += dy;
            line
        }));
        self.circles.extend(other.circles.into_iter().map(|mut circle| {
            circle.cx += dx;
            circle.cy += dy;
            circle
        }));
        self.texts.extend(other.texts.into_iter().map(|mut text| {
            text.x += dx;
            text.y += dy;
            text
        }));
        // Paths keep absolute coordinates; callers build them pre-translated.
        self.paths.extend(other.paths);
    }

    fn tags_mut(&mut self) -> impl Iterator<Item = &mut MarkTag> {
        self.rects
            .iter_mut()
            .map(|rect| &mut rect.tag)
            .chain(self.paths.iter_mut().map(|path| &mut path.tag))
            .chain(self.circles.iter_mut().map(|circle| &mut circle.tag))
    }

    /// Marks every keyed primitive as deselected unless `selected` accepts its key.
    pub fn apply_selection(&mut self, selected: impl Fn(&Key) -> bool) {
        for tag in self.tags_mut() {
            if let Some(key) = &tag.key {
                tag.deselected = !selected(key);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        for tag in self.tags_mut() {
            tag.deselected = false;
        }
    }

    /// Keys of keyed primitives currently flagged as deselected.
    #[must_use]
    pub fn deselected_keys(&self) -> Vec<&Key> {
        self.rects
            .iter()
            .map(|rect| &rect.tag)
            .chain(self.paths.iter().map(|path| &path.tag))
            .chain(self.circles.iter().map(|circle| &circle.tag))
            .filter(|tag| tag.deselected)
            .filter_map(|tag| tag.key.as_ref())
            .collect()
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.size.is_valid() {
            return Err(ChartError::InvalidSize {
                width: self.size.width,
                height: self.size.height,
            });
        }

        for rect in &self.rects {
            rect.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
            && self.lines.is_empty()
            && self.paths.is_empty()
            && self.circles.is_empty()
            && self.texts.is_empty()
    }
}
