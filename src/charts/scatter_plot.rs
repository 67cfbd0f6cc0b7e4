use std::any::Any;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{Filter, GroupRow, Key, RangedTwoDimensionalFilter, Size};
use crate::error::ChartResult;
use crate::interaction::BrushRect;
use crate::mixins::{ColorMixin, CoordinateGrid};
use crate::render::{CirclePrimitive, RenderFrame};

use super::{append_axes, mark_tag};

const DEFAULT_SYMBOL_SIZE: f64 = 3.0;

/// Points over composite `[x, y]` keys. Rows with a zero value are hidden.
///
/// Brushing is two dimensional and filters with a
/// `RangedTwoDimensionalFilter` over the brushed rectangle.
#[derive(Debug)]
pub struct ScatterPlot {
    base: BaseChart,
    grid: CoordinateGrid,
    colors: ColorMixin,
    symbol_size: f64,
    pub(crate) rect_brush: BrushRect,
}

impl Default for ScatterPlot {
    fn default() -> Self {
        Self::new()
    }
}

fn point_of(key: &Key) -> Option<(f64, f64)> {
    Some((key.component(0)?.as_f64()?, key.component(1)?.as_f64()?))
}

impl ScatterPlot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[
                MandatoryAttribute::Dimension,
                MandatoryAttribute::Group,
                MandatoryAttribute::XScale,
            ]),
            grid: CoordinateGrid::default(),
            colors: ColorMixin::default(),
            symbol_size: DEFAULT_SYMBOL_SIZE,
            rect_brush: BrushRect::default(),
        }
    }

    #[must_use]
    pub fn grid(&self) -> &CoordinateGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut CoordinateGrid {
        &mut self.grid
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }

    pub fn set_symbol_size(&mut self, size: f64) -> &mut Self {
        self.symbol_size = size.max(0.0);
        self
    }

    /// Filter for a plot-local pixel rectangle `(x0, y0, x1, y1)`, y growing
    /// downwards. Degenerate rectangles yield `None`.
    #[must_use]
    pub fn rect_filter(&self, (x0, y0, x1, y1): (f64, f64, f64, f64)) -> Option<Filter> {
        if !(x1 - x0 > 0.0 && y1 - y0 > 0.0) {
            return None;
        }
        let plot = self.grid.plot_size(self.base.size());
        let x = self.grid.x()?;
        let x_scale = x.continuous()?;
        let y = self.grid.y();
        let left = x_scale.from_pixel(x0, plot.width).ok()?;
        let right = x_scale.from_pixel(x1, plot.width).ok()?;
        let low = y.from_pixel(plot.height - y1, plot.height).ok()?;
        let high = y.from_pixel(plot.height - y0, plot.height).ok()?;
        Some(Filter::RangedTwoDimensional(RangedTwoDimensionalFilter::new(
            (x.numeric_key(left), Key::number(low)),
            (x.numeric_key(right), Key::number(high)),
        )))
    }

    fn visible_rows(&self) -> Vec<GroupRow> {
        let value = self.base.value_accessor();
        self.base
            .data()
            .into_iter()
            .filter(|row| value.get(row) != 0.0)
            .collect()
    }
}

impl Chart for ScatterPlot {
    fn kind(&self) -> &'static str {
        "scatter"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let rows = self.visible_rows();
        let key_accessor = self.base.key_accessor().clone();
        let points: Vec<(GroupRow, Key, (f64, f64))> = rows
            .into_iter()
            .filter_map(|row| {
                let key = key_accessor.get(&row);
                let point = point_of(&key)?;
                Some((row, key, point))
            })
            .collect();
        let x_keys: Vec<Key> = points.iter().map(|(_, _, (x, _))| Key::number(*x)).collect();
        self.grid.rescale_x(&x_keys)?;
        self.grid.rescale_y(points.iter().map(|(_, _, (_, y))| *y))?;

        let plot = self.grid.plot_size(size);
        let margins = self.grid.margins();
        let y = self.grid.y();
        let mut frame = RenderFrame::new(size);
        append_axes(&self.grid, size, &mut frame);
        let Some(x) = self.grid.x().and_then(|x| x.continuous()) else {
            return Ok(frame);
        };

        for (row, key, (px, py)) in &points {
            let cx = margins.left + x.to_pixel(*px, plot.width);
            let cy = margins.top + y.to_pixel_inverted(*py, plot.height);
            frame.circles.push(
                CirclePrimitive::new(cx, cy, self.symbol_size, self.colors.color(row))
                    .with_tag(mark_tag(&self.base, key)),
            );
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

    fn click_filters(&self, row: &GroupRow) -> Vec<Filter> {
        vec![Filter::Value(self.base.key_accessor().get(row))]
    }
}

#[cfg(test)]
mod tests {
    use super::ScatterPlot;
    use crate::api::{Chart, DrawPass};
    use crate::core::{Filter, Key, LinearScale, MemoryCrossfilter, Size, XScale};
    use crate::mixins::Margins;

    fn scatter() -> ScatterPlot {
        let data = MemoryCrossfilter::new(vec![(1.0, 1.0), (5.0, 5.0), (9.0, 9.0)]);
        let dimension =
            data.dimension(|(x, y): &(f64, f64)| Key::pair(Key::number(*x), Key::number(*y)));
        let group = dimension.group_count();
        let mut chart = ScatterPlot::new();
        chart
            .grid_mut()
            .set_margins(Margins::uniform(0.0))
            .set_x(XScale::Linear(LinearScale::new(0.0, 10.0).expect("scale")))
            .set_y_domain(0.0, 10.0)
            .expect("y domain");
        chart
            .base_mut()
            .set_width(Some(100.0))
            .set_height(Some(100.0))
            .set_dimension(dimension)
            .set_group(group, "points");
        chart
    }

    #[test]
    fn draws_one_symbol_per_point() {
        let mut chart = scatter();
        let frame = chart
            .draw(DrawPass::Render, Size::new(100.0, 100.0))
            .expect("draw");
        assert_eq!(frame.circles.len(), 3);
    }

    #[test]
    fn rect_filter_covers_brushed_area() {
        let chart = scatter();
        let filter = chart.rect_filter((0.0, 0.0, 60.0, 60.0)).expect("filter");
        let Filter::RangedTwoDimensional(range) = &filter else {
            panic!("expected a 2d range, got {filter:?}");
        };
        assert!(range.is_filtered(&Key::pair(Key::number(5.0), Key::number(5.0))));
        assert!(!range.is_filtered(&Key::pair(Key::number(1.0), Key::number(1.0))));
        assert!(chart.rect_filter((10.0, 10.0, 10.0, 40.0)).is_none());
    }
}
