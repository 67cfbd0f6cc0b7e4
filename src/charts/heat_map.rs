use std::any::Any;

use indexmap::IndexSet;

use crate::api::{BaseChart, Chart, DrawPass, MandatoryAttribute};
use crate::core::{Filter, GroupRow, Key, Size, TwoDimensionalFilter};
use crate::error::ChartResult;
use crate::mixins::{ColorMixin, ColorScale, Margins};
use crate::render::{Color, RectPrimitive, RenderFrame, TextPrimitive};

use super::mark_tag;

/// Which component of a `[column, row]` key an axis click addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatMapAxis {
    Column,
    Row,
}

impl HeatMapAxis {
    fn index(self) -> usize {
        match self {
            Self::Column => 0,
            Self::Row => 1,
        }
    }
}

/// Grid of cells over composite `[column, row]` keys, colored by value.
/// Clicking a cell toggles a `TwoDimensionalFilter` on it.
#[derive(Debug)]
pub struct HeatMap {
    base: BaseChart,
    colors: ColorMixin,
    margins: Margins,
    columns: Vec<Key>,
    rows: Vec<Key>,
}

impl Default for HeatMap {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_filter(key: &Key) -> Option<Filter> {
    Some(Filter::TwoDimensional(TwoDimensionalFilter::new(
        key.component(0)?.clone(),
        key.component(1)?.clone(),
    )))
}

impl HeatMap {
    #[must_use]
    pub fn new() -> Self {
        let mut colors = ColorMixin::default();
        colors.set_scale(ColorScale::linear(
            (0.0, 1.0),
            (Color::rgb(1.0, 1.0, 1.0), Color::rgb(0.12, 0.47, 0.71)),
        ));
        Self {
            base: BaseChart::new(&[MandatoryAttribute::Dimension, MandatoryAttribute::Group]),
            colors,
            margins: Margins::default(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn colors_mut(&mut self) -> &mut ColorMixin {
        &mut self.colors
    }

    /// Column keys of the last draw, in first-seen order.
    #[must_use]
    pub fn columns(&self) -> &[Key] {
        &self.columns
    }

    #[must_use]
    pub fn rows(&self) -> &[Key] {
        &self.rows
    }

    /// Cell filters an axis click on `value` toggles: when every cell of
    /// that column (or row) is already filtered, all of them; otherwise
    /// only the cells not yet filtered, so the whole line ends up selected.
    #[must_use]
    pub fn axis_toggle_filters(&self, axis: HeatMapAxis, value: &Key) -> Vec<Filter> {
        let cells: Vec<Filter> = self
            .base
            .data()
            .iter()
            .map(|row| self.base.key_accessor().get(row))
            .filter(|key| key.component(axis.index()) == Some(value))
            .filter_map(|key| cell_filter(&key))
            .collect();
        let all_filtered = cells
            .iter()
            .all(|filter| self.base.has_filter(Some(filter)));
        if all_filtered {
            return cells;
        }
        cells
            .into_iter()
            .filter(|filter| !self.base.has_filter(Some(filter)))
            .collect()
    }
}

impl Chart for HeatMap {
    fn kind(&self) -> &'static str {
        "heat-map"
    }

    fn base(&self) -> &BaseChart {
        &self.base
    }

    fn base_mut(&mut self) -> &mut BaseChart {
        &mut self.base
    }

    fn draw(&mut self, _pass: DrawPass, size: Size) -> ChartResult<RenderFrame> {
        let data: Vec<GroupRow> = self.base.data();
        let key_accessor = self.base.key_accessor().clone();
        let cells: Vec<(GroupRow, Key)> = data
            .into_iter()
            .map(|row| {
                let key = key_accessor.get(&row);
                (row, key)
            })
            .filter(|(_, key)| key.component(1).is_some())
            .collect();
        let columns: IndexSet<Key> = cells
            .iter()
            .filter_map(|(_, key)| key.component(0).cloned())
            .collect();
        let rows: IndexSet<Key> = cells
            .iter()
            .filter_map(|(_, key)| key.component(1).cloned())
            .collect();
        let value_rows: Vec<GroupRow> = cells.iter().map(|(row, _)| row.clone()).collect();
        self.colors.calculate_color_domain(&value_rows);

        let mut frame = RenderFrame::new(size);
        let width = self.margins.effective_width(size.width);
        let height = self.margins.effective_height(size.height);
        let cell_width = width / columns.len().max(1) as f64;
        let cell_height = height / rows.len().max(1) as f64;

        for (row, key) in &cells {
            let (Some(column_index), Some(row_index)) = (
                key.component(0).and_then(|column| columns.get_index_of(column)),
                key.component(1).and_then(|line| rows.get_index_of(line)),
            ) else {
                continue;
            };
            let x = self.margins.left + column_index as f64 * cell_width;
            let y = self.margins.top + height - (row_index as f64 + 1.0) * cell_height;
            frame.rects.push(
                RectPrimitive::new(x, y, cell_width, cell_height, self.colors.color(row))
                    .with_tag(mark_tag(&self.base, key)),
            );
            if self.base.render_title() {
                frame.texts.push(TextPrimitive::title(
                    self.base.title().get(row),
                    x + cell_width / 2.0,
                    y + cell_height / 2.0,
                ));
            }
        }
        self.columns = columns.into_iter().collect();
        self.rows = rows.into_iter().collect();
        Ok(frame)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn set_margins(&mut self, margins: Margins) -> bool {
        self.margins = margins;
        true
    }

    fn click_filters(&self, row: &GroupRow) -> Vec<Filter> {
        cell_filter(&self.base.key_accessor().get(row))
            .into_iter()
            .collect()
    }
}
