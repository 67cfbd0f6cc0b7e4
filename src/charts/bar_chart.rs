use std::any::Any;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{Key, Size, XScale};
use crate::error::ChartResult;
use crate::mixins::{ColorMixin, CoordinateGrid, LegendItem, StackMixin, StackedLayer};
use crate::render::{RectPrimitive, RenderFrame, TextPrimitive};

use super::{append_axes, layout_stack, mark_tag};

const DEFAULT_BAR_PADDING: f64 = 0.1;
const MIN_BAR_WIDTH: f64 = 1.0;

/// Stacked vertical bars on a coordinate grid.
#[derive(Debug)]
pub struct BarChart {
    base: BaseChart,
    grid: CoordinateGrid,
    stack: StackMixin,
    colors: ColorMixin,
    bar_padding: f64,
    centered: bool,
    layers: Vec<StackedLayer>,
}

impl Default for BarChart {
    fn default() -> Self {
        Self::new()
    }
}

impl BarChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[
                MandatoryAttribute::Dimension,
                MandatoryAttribute::Group,
                MandatoryAttribute::XScale,
            ]),
            grid: CoordinateGrid::default(),
            stack: StackMixin::default(),
            colors: ColorMixin::default(),
            bar_padding: DEFAULT_BAR_PADDING,
            centered: false,
            layers: Vec::new(),
        }
    }

    pub fn grid_mut(&mut self) -> &mut CoordinateGrid {
        &mut self.grid
    }

    pub fn stack_mixin_mut(&mut self) -> &mut StackMixin {
        &mut self.stack
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }

    /// Fraction of each x unit left empty between bars.
    pub fn set_bar_padding(&mut self, padding: f64) -> &mut Self {
        self.bar_padding = padding.clamp(0.0, 1.0);
        self
    }

    /// Centers continuous bars on their key instead of starting at it.
    pub fn set_centered(&mut self, centered: bool) -> &mut Self {
        self.centered = centered;
        self
    }

    /// Stacked layers of the last draw.
    #[must_use]
    pub fn layers(&self) -> &[StackedLayer] {
        &self.layers
    }

    fn bar_width(&mut self, plot_width: f64) -> f64 {
        let units = self.grid.x_units_count().max(1) as f64;
        let width = plot_width / units * (1.0 - self.bar_padding);
        if width.is_finite() { width.max(MIN_BAR_WIDTH) } else { MIN_BAR_WIDTH }
    }

    fn bar_left(&self, x: &XScale, key: &Key, plot_width: f64, bar_width: f64) -> Option<f64> {
        let position = x.key_to_pixel(key, plot_width)?;
        Some(if x.is_ordinal() || self.centered {
            position - bar_width / 2.0
        } else {
            position
        })
    }
}

impl Chart for BarChart {
    fn kind(&self) -> &'static str {
        "bar"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let layers = layout_stack(&self.base, &mut self.grid, &self.stack)?;
        let plot = self.grid.plot_size(size);
        let margins = self.grid.margins();
        let bar_width = self.bar_width(plot.width);
        let y = self.grid.y();

        let mut frame = RenderFrame::new(size);
        append_axes(&self.grid, size, &mut frame);
        let Some(x) = self.grid.x().cloned() else {
            self.layers = layers;
            return Ok(frame);
        };

        for layer in layers.iter().filter(|layer| !layer.hidden) {
            let fill = self.colors.color_for_key(&Key::text(layer.name.clone()));
            for point in &layer.points {
                let Some(left) = self.bar_left(&x, &point.key, plot.width, bar_width) else {
                    continue;
                };
                let top = y.to_pixel_inverted(point.top(), plot.height);
                let bottom = y.to_pixel_inverted(point.y0, plot.height);
                frame.rects.push(
                    RectPrimitive::new(
                        margins.left + left,
                        margins.top + top.min(bottom),
                        bar_width,
                        (bottom - top).abs(),
                        fill,
                    )
                    .with_tag(mark_tag(&self.base, &point.key)),
                );
                if self.base.render_title() {
                    frame.texts.push(TextPrimitive::title(
                        format!("{}: {}", point.key, point.y),
                        margins.left + left + bar_width / 2.0,
                        margins.top + top,
                    ));
                }
            }
        }
        self.layers = layers;
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

    fn stack(&self) -> Option<&StackMixin> {
        Some(&self.stack)
    }

    fn stack_mut(&mut self) -> Option<&mut StackMixin> {
        Some(&mut self.stack)
    }

    fn legendables(&mut self) -> Vec<LegendItem> {
        self.stack
            .layer_names(self.base.group_name())
            .into_iter()
            .map(|name| LegendItem {
                color: self.colors.color_for_key(&Key::text(name.clone())),
                hidden: self.stack.is_hidden(&name),
                name,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use approx::assert_relative_eq;

    use super::BarChart;
    use crate::api::{Chart, DrawPass};
    use crate::core::{Group, GroupRow, Key, LinearScale, MemoryCrossfilter, Size, XScale};
    use crate::mixins::Margins;

    fn bar_chart() -> BarChart {
        let data = MemoryCrossfilter::new(vec![(1.0, 2.0, 1.0), (2.0, 4.0, 2.0), (3.0, 1.0, 3.0)]);
        let dimension = data.dimension(|(x, _, _): &(f64, f64, f64)| Key::number(*x));
        let low = dimension.group_sum(|(_, value, _): &(f64, f64, f64)| *value);
        let high = dimension.group_sum(|(_, _, value): &(f64, f64, f64)| *value);
        let mut chart = BarChart::new();
        chart
            .grid_mut()
            .set_margins(Margins::uniform(0.0))
            .set_x(XScale::Linear(LinearScale::new(0.0, 4.0).expect("scale")))
            .set_elastic_y(true);
        chart.stack_mixin_mut().stack(high, "high", None);
        chart
            .base_mut()
            .set_dimension(dimension)
            .set_group(low, "low");
        chart
    }

    #[test]
    fn layers_stack_on_the_base_group() {
        let mut chart = bar_chart();
        let frame = chart
            .draw(DrawPass::Render, Size::new(400.0, 100.0))
            .expect("draw");
        assert_eq!(frame.rects.len(), 6);
        let high = &chart.layers()[1];
        assert_eq!(high.name, "high");
        assert_relative_eq!(high.points[1].y0, 4.0);
        assert_relative_eq!(high.points[1].top(), 6.0);
        assert_eq!(chart.grid_mut().y().domain(), (0.0, 6.0));
    }

    #[test]
    fn hidden_layer_is_skipped_and_listed_dimmed() {
        let mut chart = bar_chart();
        chart.stack_mixin_mut().hide_stack("high");
        let frame = chart
            .draw(DrawPass::Render, Size::new(400.0, 100.0))
            .expect("draw");
        assert_eq!(frame.rects.len(), 3);
        let legend = chart.legendables();
        assert_eq!(legend.len(), 2);
        assert!(legend[1].hidden);
    }

    #[test]
    fn base_layer_reads_the_data_callback() {
        let mut chart = bar_chart();
        chart.base_mut().set_data_callback(Some(Rc::new(|group: &dyn Group| -> Vec<GroupRow> {
            group
                .all()
                .into_iter()
                .filter(|row| row.key != Key::number(2.0))
                .collect()
        })));
        let frame = chart
            .draw(DrawPass::Render, Size::new(400.0, 100.0))
            .expect("draw");
        assert_eq!(frame.rects.len(), 5);
        assert_eq!(chart.layers()[0].points.len(), 2);
        let high = &chart.layers()[1];
        assert_eq!(high.points[1].key, Key::number(2.0));
        assert_relative_eq!(high.points[1].y0, 0.0);

        chart
            .base_mut()
            .set_data_callback(Some(Rc::new(|_: &dyn Group| -> Vec<GroupRow> { Vec::new() })));
        let frame = chart
            .draw(DrawPass::Render, Size::new(400.0, 100.0))
            .expect("draw");
        assert!(chart.layers()[0].points.is_empty());
        assert_eq!(frame.rects.len(), 3);
    }
}
