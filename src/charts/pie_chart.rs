use std::any::Any;
use std::f64::consts::TAU;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{GroupRow, Key, Size};
use crate::error::ChartResult;
use crate::mixins::cap::sort_by_descending_value;
use crate::mixins::{CapMixin, ColorMixin, LegendItem};
use crate::render::{Color, MarkTag, PathPrimitive, RenderFrame, TextPrimitive};

use super::is_row_selected;

const EMPTY_SLICE_COLOR: Color = Color::rgb(0.8, 0.8, 0.8);
/// Slices narrower than this (radians) get no label.
const DEFAULT_MIN_ANGLE_FOR_LABEL: f64 = 0.5;

/// Pie or donut over a capped, value-ordered group.
#[derive(Debug)]
pub struct PieChart {
    base: BaseChart,
    cap: CapMixin,
    colors: ColorMixin,
    radius: Option<f64>,
    inner_radius: f64,
    min_angle_for_label: f64,
    drawn_rows: Vec<GroupRow>,
}

impl Default for PieChart {
    fn default() -> Self {
        Self::new()
    }
}

impl PieChart {
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: BaseChart::new(&[MandatoryAttribute::Dimension, MandatoryAttribute::Group]),
            cap: CapMixin::default(),
            colors: ColorMixin::default(),
            radius: None,
            inner_radius: 0.0,
            min_angle_for_label: DEFAULT_MIN_ANGLE_FOR_LABEL,
            drawn_rows: Vec::new(),
        }
    }

    pub fn cap_mixin_mut(&mut self) -> &mut CapMixin {
        &mut self.cap
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }

    /// Outer radius; defaults to half the shorter side.
    pub fn set_radius(&mut self, radius: Option<f64>) -> &mut Self {
        self.radius = radius;
        self
    }

    /// Non-zero draws a donut.
    pub fn set_inner_radius(&mut self, inner_radius: f64) -> &mut Self {
        self.inner_radius = inner_radius.max(0.0);
        self
    }

    pub fn set_min_angle_for_label(&mut self, angle: f64) -> &mut Self {
        self.min_angle_for_label = angle;
        self
    }

    /// Rows of the last draw, "others" row included.
    #[must_use]
    pub fn drawn_rows(&self) -> &[GroupRow] {
        &self.drawn_rows
    }

    fn slice_rows(&self) -> Vec<GroupRow> {
        let value = self.base.value_accessor();
        let mut rows = self.base.data();
        sort_by_descending_value(&mut rows, value);
        let rows = self.base.compute_ordered_groups(rows);
        self.cap.capped(rows, self.base.key_accessor(), value)
    }
}

/// Sweeps within this much of a full turn are drawn as a closed ring.
const FULL_TURN: f64 = TAU - 1e-6;

fn arc_path(center: (f64, f64), outer: f64, inner: f64, start: f64, end: f64) -> String {
    let point = |radius: f64, angle: f64| {
        (
            center.0 + radius * angle.sin(),
            center.1 - radius * angle.cos(),
        )
    };
    // A single arc whose endpoints coincide draws nothing; close full turns
    // with two half arcs instead.
    if end - start >= FULL_TURN {
        let half = start + TAU / 2.0;
        let (ox0, oy0) = point(outer, start);
        let (ox1, oy1) = point(outer, half);
        let ring = format!(
            "M{ox0:.2},{oy0:.2}A{outer:.2},{outer:.2} 0 1,1 {ox1:.2},{oy1:.2}\
             A{outer:.2},{outer:.2} 0 1,1 {ox0:.2},{oy0:.2}Z"
        );
        if inner <= 0.0 {
            return ring;
        }
        let (ix0, iy0) = point(inner, start);
        let (ix1, iy1) = point(inner, half);
        return format!(
            "{ring}M{ix0:.2},{iy0:.2}A{inner:.2},{inner:.2} 0 1,0 {ix1:.2},{iy1:.2}\
             A{inner:.2},{inner:.2} 0 1,0 {ix0:.2},{iy0:.2}Z"
        );
    }
    let large_arc = u8::from(end - start > TAU / 2.0);
    let (ox0, oy0) = point(outer, start);
    let (ox1, oy1) = point(outer, end);
    if inner <= 0.0 {
        return format!(
            "M{:.2},{:.2}L{ox0:.2},{oy0:.2}A{outer:.2},{outer:.2} 0 {large_arc},1 {ox1:.2},{oy1:.2}Z",
            center.0, center.1
        );
    }
    let (ix0, iy0) = point(inner, start);
    let (ix1, iy1) = point(inner, end);
    format!(
        "M{ox0:.2},{oy0:.2}A{outer:.2},{outer:.2} 0 {large_arc},1 {ox1:.2},{oy1:.2}\
         L{ix1:.2},{iy1:.2}A{inner:.2},{inner:.2} 0 {large_arc},0 {ix0:.2},{iy0:.2}Z"
    )
}

impl Chart for PieChart {
    fn kind(&self) -> &'static str {
        "pie"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let rows = self.slice_rows();
        let mut frame = RenderFrame::new(size);
        let center = (size.width / 2.0, size.height / 2.0);
        let outer = self
            .radius
            .unwrap_or_else(|| size.width.min(size.height) / 2.0);
        let value = self.base.value_accessor().clone();
        let total: f64 = rows
            .iter()
            .map(|row| value.get(row))
            .filter(|v| v.is_finite() && *v > 0.0)
            .sum();

        if total <= 0.0 {
            let path = arc_path(center, outer, self.inner_radius, 0.0, TAU);
            frame
                .paths
                .push(PathPrimitive::new(path).with_fill(EMPTY_SLICE_COLOR));
            self.drawn_rows = rows;
            return Ok(frame);
        }

        let mut start = 0.0;
        for row in &rows {
            let slice_value = value.get(row);
            if !slice_value.is_finite() || slice_value <= 0.0 {
                continue;
            }
            let end = start + slice_value / total * TAU;
            let key = if row.is_others() {
                row.key.clone()
            } else {
                self.base.key_accessor().get(row)
            };
            let tag = MarkTag {
                key: Some(key.clone()),
                deselected: !is_row_selected(&self.base, row, &key),
            };
            let fill = self.colors.color(row);
            frame.paths.push(
                PathPrimitive::new(arc_path(center, outer, self.inner_radius, start, end))
                    .with_fill(fill)
                    .with_tag(tag),
            );

            let mid = (start + end) / 2.0;
            let label_radius = (outer + self.inner_radius) / 2.0;
            let (lx, ly) = (
                center.0 + label_radius * mid.sin(),
                center.1 - label_radius * mid.cos(),
            );
            if self.base.render_label() && end - start >= self.min_angle_for_label {
                frame
                    .texts
                    .push(TextPrimitive::label(self.base.label().get(row), lx, ly));
            }
            if self.base.render_title() {
                frame
                    .texts
                    .push(TextPrimitive::title(self.base.title().get(row), lx, ly));
            }
            start = end;
        }
        self.drawn_rows = rows;
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

    fn legendables(&mut self) -> Vec<LegendItem> {
        let rows = self.slice_rows();
        rows.iter()
            .map(|row| LegendItem {
                name: row.key.to_string(),
                color: self.colors.color(row),
                hidden: false,
            })
            .collect()
    }
}

impl PieChart {
    /// Slice row whose key reads as `name`, as produced by the last draw.
    #[must_use]
    pub fn slice(&self, name: &str) -> Option<&GroupRow> {
        self.drawn_rows
            .iter()
            .find(|row| row.key == Key::text(name) || row.key.to_string() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::PieChart;
    use crate::api::{Chart, DrawPass};
    use crate::core::{Key, MemoryCrossfilter, Size};

    fn pie(values: &[(&'static str, f64)], cap: Option<usize>) -> PieChart {
        let data = MemoryCrossfilter::new(values.to_vec());
        let dimension = data.dimension(|(name, _): &(&str, f64)| Key::text(*name));
        let group = dimension.group_sum(|(_, value): &(&str, f64)| *value);
        let mut chart = PieChart::new();
        chart
            .base_mut()
            .set_dimension(dimension)
            .set_group(group, "sales");
        chart.cap_mixin_mut().set_cap(cap);
        chart
    }

    #[test]
    fn capped_pie_draws_others_slice() {
        let mut chart = pie(&[("a", 5.0), ("b", 3.0), ("c", 1.0)], Some(2));
        let frame = chart
            .draw(DrawPass::Render, Size::new(200.0, 200.0))
            .expect("draw");
        assert_eq!(frame.paths.len(), 3);
        let others = chart.slice("Others").expect("others slice");
        assert_eq!(others.others.as_deref(), Some(&[Key::text("c")][..]));
        assert_eq!(others.value.number(), 1.0);
    }

    #[test]
    fn single_slice_closes_the_full_circle() {
        let mut chart = pie(&[("a", 5.0)], None);
        let frame = chart
            .draw(DrawPass::Render, Size::new(200.0, 200.0))
            .expect("draw");
        assert_eq!(frame.paths.len(), 1);
        let path = &frame.paths[0].data;
        assert_eq!(
            path,
            "M100.00,0.00A100.00,100.00 0 1,1 100.00,200.00\
             A100.00,100.00 0 1,1 100.00,0.00Z"
        );
        assert_eq!(frame.paths[0].tag.key, Some(Key::text("a")));
    }

    #[test]
    fn single_donut_slice_keeps_the_hole() {
        let mut chart = pie(&[("a", 5.0)], None);
        chart.set_inner_radius(50.0);
        let frame = chart
            .draw(DrawPass::Render, Size::new(200.0, 200.0))
            .expect("draw");
        let path = &frame.paths[0].data;
        assert_eq!(path.matches('A').count(), 4);
        assert!(path.contains("M100.00,50.00A50.00,50.00 0 1,0 100.00,150.00"));
    }

    #[test]
    fn empty_pie_draws_placeholder() {
        let mut chart = pie(&[], None);
        let frame = chart
            .draw(DrawPass::Render, Size::new(100.0, 100.0))
            .expect("draw");
        assert_eq!(frame.paths.len(), 1);
        assert!(frame.paths[0].tag.key.is_none());
    }

    #[test]
    fn legend_lists_every_slice() {
        let mut chart = pie(&[("a", 5.0), ("b", 3.0)], None);
        let names: Vec<String> = chart.legendables().into_iter().map(|item| item.name).collect();
        assert_eq!(names, vec!["a".to_owned(), "b".to_owned()]);
    }
}
