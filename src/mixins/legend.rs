//! Swatch legend attached to a chart.

use serde::{Deserialize, Serialize};

use crate::core::Key;
use crate::render::{Color, MarkTag, RectPrimitive, RenderFrame, TextPrimitive};

/// One entry a chart exposes to its legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendItem {
    pub name: String,
    pub color: Color,
    /// Hidden stack layers are drawn dimmed.
    pub hidden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub x: f64,
    pub y: f64,
    pub item_height: f64,
    pub gap: f64,
    pub horizontal: bool,
    pub item_width: f64,
}

impl Default for Legend {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            item_height: 12.0,
            gap: 5.0,
            horizontal: false,
            item_width: 70.0,
        }
    }
}

impl Legend {
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn horizontal(mut self, item_width: f64) -> Self {
        self.horizontal = true;
        self.item_width = item_width;
        self
    }

    /// Appends one swatch and label per item. Swatches are tagged with the
    /// item name so hosts can route clicks back to `legend_toggle`.
    pub fn draw(&self, items: &[LegendItem], frame: &mut RenderFrame) {
        for (index, item) in items.iter().enumerate() {
            let offset = index as f64;
            let (x, y) = if self.horizontal {
                (self.x + offset * (self.item_width + self.gap), self.y)
            } else {
                (self.x, self.y + offset * (self.item_height + self.gap))
            };
            let fill = if item.hidden {
                Color::rgba(item.color.red, item.color.green, item.color.blue, 0.3)
            } else {
                item.color
            };
            let tag = MarkTag {
                key: Some(Key::text(item.name.clone())),
                deselected: item.hidden,
            };
            frame.rects.push(
                RectPrimitive::new(x, y, self.item_height, self.item_height, fill).with_tag(tag),
            );
            frame.texts.push(TextPrimitive::label(
                item.name.clone(),
                x + self.item_height + self.gap,
                y + self.item_height - 1.0,
            ));
        }
    }
}
