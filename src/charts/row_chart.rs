use std::any::Any;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{GroupRow, LinearScale, Size};
use crate::error::ChartResult;
use crate::mixins::cap::sort_by_descending_value;
use crate::mixins::{CapMixin, ColorMixin, LegendItem, Margins};
use crate::render::{MarkTag, RectPrimitive, RenderFrame, TextHAlign, TextPrimitive};

use super::is_row_selected;

const DEFAULT_GAP: f64 = 5.0;
const LABEL_OFFSET_X: f64 = 10.0;

/// Horizontal bars, one row per group key, always elastic along x.
#[derive(Debug)]
pub struct RowChart {
    base: BaseChart,
    cap: CapMixin,
    colors: ColorMixin,
    margins: Margins,
    gap: f64,
    fixed_bar_height: Option<f64>,
    x: LinearScale,
}

impl Default for RowChart {
    fn default() -> Self {
        Self::new()
    }
}

impl RowChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[MandatoryAttribute::Dimension, MandatoryAttribute::Group]),
            cap: CapMixin::default(),
            colors: ColorMixin::default(),
            margins: Margins::default(),
            gap: DEFAULT_GAP,
            fixed_bar_height: None,
            x: LinearScale::default(),
        }
    }

    pub fn cap_mixin_mut(&mut self) -> &mut CapMixin {
        &mut self.cap
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }

    #[must_use]
    pub fn margins(&self) -> Margins {
        self.margins
    }

    pub fn set_gap(&mut self, gap: f64) -> &mut Self {
        self.gap = gap.max(0.0);
        self
    }

    pub fn set_fixed_bar_height(&mut self, height: Option<f64>) -> &mut Self {
        self.fixed_bar_height = height;
        self
    }

    /// x scale fitted by the last draw.
    #[must_use]
    pub fn x(&self) -> LinearScale {
        self.x
    }

    fn rows(&self) -> Vec<GroupRow> {
        let value = self.base.value_accessor();
        let mut rows = self.base.data();
        sort_by_descending_value(&mut rows, value);
        let rows = self.base.compute_ordered_groups(rows);
        self.cap.capped(rows, self.base.key_accessor(), value)
    }
}

impl Chart for RowChart {
    fn kind(&self) -> &'static str {
        "row"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let rows = self.rows();
        let value = self.base.value_accessor().clone();
        let values: Vec<f64> = rows.iter().map(|row| value.get(row)).collect();
        if let Some(extent) =
            LinearScale::from_extent(values.iter().copied().chain(std::iter::once(0.0)))
        {
            self.x = extent;
        }

        let mut frame = RenderFrame::new(size);
        let width = self.margins.effective_width(size.width);
        let height = self.margins.effective_height(size.height);
        let count = rows.len().max(1) as f64;
        let bar_height = self
            .fixed_bar_height
            .unwrap_or_else(|| ((height - (count + 1.0) * self.gap) / count).max(0.0));
        let zero_px = self.x.to_pixel(0.0, width);

        for (index, (row, row_value)) in rows.iter().zip(values).enumerate() {
            let key = if row.is_others() {
                row.key.clone()
            } else {
                self.base.key_accessor().get(row)
            };
            let value_px = self.x.to_pixel(row_value, width);
            let y = self.margins.top + self.gap + index as f64 * (bar_height + self.gap);
            let x = self.margins.left + zero_px.min(value_px);
            let tag = MarkTag {
                key: Some(key.clone()),
                deselected: !is_row_selected(&self.base, row, &key),
            };
            frame.rects.push(
                RectPrimitive::new(x, y, (value_px - zero_px).abs(), bar_height, self.colors.color(row))
                    .with_tag(tag),
            );
            let label_y = y + bar_height / 2.0;
            if self.base.render_label() {
                frame.texts.push(TextPrimitive {
                    h_align: TextHAlign::Left,
                    ..TextPrimitive::label(
                        self.base.label().get(row),
                        self.margins.left + LABEL_OFFSET_X,
                        label_y,
                    )
                });
            }
            if self.base.render_title() {
                frame.texts.push(TextPrimitive::title(
                    self.base.title().get(row),
                    self.margins.left,
                    label_y,
                ));
            }
        }
        Ok(frame)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn cap(&self) -> Option<&CapMixin> {
        Some(&self.cap)
    }

    fn cap_mut(&mut self) -> Option<&mut CapMixin> {
        Some(&mut self.cap)
    }

    fn set_margins(&mut self, margins: Margins) -> bool {
        self.margins = margins;
        true
    }

    fn legendables(&mut self) -> Vec<LegendItem> {
        let rows = self.rows();
        rows.iter()
            .map(|row| LegendItem {
                name: row.key.to_string(),
                color: self.colors.color(row),
                hidden: false,
            })
            .collect()
    }
}
