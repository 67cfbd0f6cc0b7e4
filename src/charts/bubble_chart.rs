use std::any::Any;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{Filter, GroupRow, Key, Size};
use crate::error::ChartResult;
use crate::mixins::{BubbleMixin, ColorMixin, CoordinateGrid};
use crate::render::{CirclePrimitive, RenderFrame, TextPrimitive};

use super::{append_axes, mark_tag};

/// Bubbles positioned by the key (x) and value (y) accessors, sized by the
/// bubble radius accessor. Marks and click filters use the row key.
#[derive(Debug)]
pub struct BubbleChart {
    base: BaseChart,
    grid: CoordinateGrid,
    bubble: BubbleMixin,
    colors: ColorMixin,
}

impl Default for BubbleChart {
    fn default() -> Self {
        Self::new()
    }
}

impl BubbleChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[
                MandatoryAttribute::Dimension,
                MandatoryAttribute::Group,
                MandatoryAttribute::XScale,
            ]),
            grid: CoordinateGrid::default(),
            bubble: BubbleMixin::default(),
            colors: ColorMixin::default(),
        }
    }

    pub fn grid_mut(&mut self) -> &mut CoordinateGrid {
        &mut self.grid
    }

    pub fn bubble_mixin_mut(&mut self) -> &mut BubbleMixin {
        &mut self.bubble
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }
}

impl Chart for BubbleChart {
    fn kind(&self) -> &'static str {
        "bubble"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let mut rows: Vec<GroupRow> = self.base.data();
        let key_accessor = self.base.key_accessor().clone();
        let value_accessor = self.base.value_accessor().clone();
        let x_keys: Vec<Key> = rows.iter().map(|row| key_accessor.get(row)).collect();
        self.grid.rescale_x(&x_keys)?;
        self.grid
            .rescale_y(rows.iter().map(|row| value_accessor.get(row)))?;
        self.bubble.calculate_radius_domain(&rows);
        self.colors.calculate_color_domain(&rows);
        self.bubble.order_for_drawing(&mut rows);

        let plot = self.grid.plot_size(size);
        let margins = self.grid.margins();
        let y = self.grid.y();
        let mut frame = RenderFrame::new(size);
        append_axes(&self.grid, size, &mut frame);
        let Some(x) = self.grid.x().cloned() else {
            return Ok(frame);
        };

        let extent = plot.width.min(plot.height);
        for row in &rows {
            let Some(px) = x.key_to_pixel(&key_accessor.get(row), plot.width) else {
                continue;
            };
            let cx = margins.left + px;
            let cy = margins.top + y.to_pixel_inverted(value_accessor.get(row), plot.height);
            let radius = self.bubble.bubble_radius(row, extent);
            frame.circles.push(
                CirclePrimitive::new(cx, cy, radius, self.colors.color(row))
                    .with_tag(mark_tag(&self.base, &row.key)),
            );
            if self.base.render_label() && self.bubble.is_label_visible(radius) {
                frame
                    .texts
                    .push(TextPrimitive::label(self.base.label().get(row), cx, cy));
            }
            if self.base.render_title() {
                frame
                    .texts
                    .push(TextPrimitive::title(self.base.title().get(row), cx, cy));
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

    fn coordinate_grid(&self) -> Option<&CoordinateGrid> {
        Some(&self.grid)
    }

    fn coordinate_grid_mut(&mut self) -> Option<&mut CoordinateGrid> {
        Some(&mut self.grid)
    }

    fn bubble(&self) -> Option<&BubbleMixin> {
        Some(&self.bubble)
    }

    fn bubble_mut(&mut self) -> Option<&mut BubbleMixin> {
        Some(&mut self.bubble)
    }

    fn click_filters(&self, row: &GroupRow) -> Vec<Filter> {
        vec![Filter::Value(row.key.clone())]
    }
}
