use std::any::Any;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{Key, Size};
use crate::error::ChartResult;
use crate::mixins::{ColorMixin, CoordinateGrid, LegendItem, StackMixin, StackedLayer};
use crate::render::{CirclePrimitive, Color, PathPrimitive, RenderFrame};

use super::{append_axes, layout_stack, mark_tag};

const DEFAULT_DOT_RADIUS: f64 = 3.0;
const AREA_ALPHA: f64 = 0.3;

/// Stacked lines, optionally filled down to the layer below.
#[derive(Debug)]
pub struct LineChart {
    base: BaseChart,
    grid: CoordinateGrid,
    stack: StackMixin,
    colors: ColorMixin,
    render_area: bool,
    dot_radius: Option<f64>,
    stroke_width: f64,
    layers: Vec<StackedLayer>,
}

impl Default for LineChart {
    fn default() -> Self {
        Self::new()
    }
}

impl LineChart {
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
            render_area: false,
            dot_radius: Some(DEFAULT_DOT_RADIUS),
            stroke_width: 1.5,
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

    pub fn set_render_area(&mut self, render_area: bool) -> &mut Self {
        self.render_area = render_area;
        self
    }

    /// `None` draws no data points.
    pub fn set_dot_radius(&mut self, radius: Option<f64>) -> &mut Self {
        self.dot_radius = radius;
        self
    }

    pub fn set_stroke_width(&mut self, width: f64) -> &mut Self {
        self.stroke_width = width;
        self
    }

    #[must_use]
    pub fn layers(&self) -> &[StackedLayer] {
        &self.layers
    }
}

fn area_path(tops: &[(f64, f64)], bottoms: &[(f64, f64)]) -> PathPrimitive {
    let outline: Vec<(f64, f64)> = tops
        .iter()
        .copied()
        .chain(bottoms.iter().rev().copied())
        .collect();
    let mut path = PathPrimitive::polyline(&outline);
    if !path.is_empty() {
        path.data.push('Z');
    }
    path
}

impl Chart for LineChart {
    fn kind(&self) -> &'static str {
        "line"
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
        let y = self.grid.y();

        let mut frame = RenderFrame::new(size);
        append_axes(&self.grid, size, &mut frame);
        let Some(x) = self.grid.x().cloned() else {
            self.layers = layers;
            return Ok(frame);
        };

        for layer in layers.iter().filter(|layer| !layer.hidden) {
            let color = self.colors.color_for_key(&Key::text(layer.name.clone()));
            let mut tops = Vec::with_capacity(layer.points.len());
            let mut bottoms = Vec::with_capacity(layer.points.len());
            for point in &layer.points {
                let Some(px) = x.key_to_pixel(&point.key, plot.width) else {
                    continue;
                };
                let px = margins.left + px;
                let top = margins.top + y.to_pixel_inverted(point.top(), plot.height);
                tops.push((px, top));
                bottoms.push((px, margins.top + y.to_pixel_inverted(point.y0, plot.height)));
                if let Some(radius) = self.dot_radius {
                    frame.circles.push(
                        CirclePrimitive::new(px, top, radius, color)
                            .with_tag(mark_tag(&self.base, &point.key)),
                    );
                }
            }
            if self.render_area && tops.len() > 1 {
                let fill = Color::rgba(color.red, color.green, color.blue, AREA_ALPHA);
                frame.paths.push(area_path(&tops, &bottoms).with_fill(fill));
            }
            frame
                .paths
                .push(PathPrimitive::polyline(&tops).with_stroke(color, self.stroke_width));
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
    use super::LineChart;
    use crate::api::{Chart, DrawPass};
    use crate::core::{Key, LinearScale, MemoryCrossfilter, Size, XScale};
    use crate::mixins::Margins;
    use crate::render::PathPrimitive;

    fn line_chart(values: Vec<f64>) -> LineChart {
        let data = MemoryCrossfilter::new(values);
        let dimension = data.dimension(|value: &f64| Key::number(*value));
        let group = dimension.group_count();
        let mut chart = LineChart::new();
        chart
            .grid_mut()
            .set_margins(Margins::uniform(0.0))
            .set_x(XScale::Linear(LinearScale::new(0.0, 10.0).expect("scale")));
        chart
            .base_mut()
            .set_dimension(dimension)
            .set_group(group, "count");
        chart
    }

    #[test]
    fn one_dot_per_point_and_one_line_per_layer() {
        let mut chart = line_chart(vec![1.0, 2.0, 2.0, 5.0]);
        chart.set_render_area(true);
        let frame = chart
            .draw(DrawPass::Render, Size::new(100.0, 100.0))
            .expect("draw");
        assert_eq!(frame.circles.len(), 3);
        assert_eq!(frame.paths.len(), 2);
        assert!(frame.paths[0].data.ends_with('Z'));
    }

    #[test]
    fn empty_group_draws_degenerate_line() {
        let mut chart = line_chart(Vec::new());
        let frame = chart
            .draw(DrawPass::Render, Size::new(100.0, 100.0))
            .expect("draw");
        assert!(frame.circles.is_empty());
        assert_eq!(frame.paths[0].data, PathPrimitive::EMPTY);
    }
}
