//! Concrete chart kinds composed from `BaseChart` and the mixins.

mod bar_chart;
mod bubble_chart;
mod data_count;
mod heat_map;
mod line_chart;
mod number_display;
mod pie_chart;
mod row_chart;
mod sankey_chart;
mod scatter_plot;
mod tree_map;

pub use bar_chart::BarChart;
pub use bubble_chart::BubbleChart;
pub use data_count::DataCount;
pub use heat_map::{HeatMap, HeatMapAxis};
pub use line_chart::LineChart;
pub use number_display::{NumberDisplay, NumberFormatter, NumberTemplates};
pub use pie_chart::PieChart;
pub use row_chart::RowChart;
pub use sankey_chart::{SankeyChart, SankeyLink, SankeyNode, node_tag_key};
pub use scatter_plot::ScatterPlot;
pub use tree_map::{TreeMap, TreeMapNode};

use crate::api::BaseChart;
use crate::core::{GroupRow, Key, Size};
use crate::error::ChartResult;
use crate::mixins::stack::{x_keys, y_extent_values};
use crate::mixins::{CoordinateGrid, StackMixin, StackedLayer};
use crate::render::{Color, LinePrimitive, MarkTag, RenderFrame};

const AXIS_COLOR: Color = Color::rgb(0.2, 0.2, 0.2);
const GRID_LINE_COLOR: Color = Color::rgba(0.8, 0.8, 0.8, 1.0);
const HORIZONTAL_GRID_LINES: usize = 5;

/// With no filter set every key reads as selected.
pub(crate) fn is_selected(base: &BaseChart, key: &Key) -> bool {
    !base.has_filter(None) || base.filters().iter().any(|filter| filter.is_filtered(key))
}

/// An "others" row is selected when any key folded into it is.
pub(crate) fn is_row_selected(base: &BaseChart, row: &GroupRow, key: &Key) -> bool {
    match &row.others {
        Some(keys) => !base.has_filter(None) || keys.iter().any(|key| is_selected(base, key)),
        None => is_selected(base, key),
    }
}

pub(crate) fn mark_tag(base: &BaseChart, key: &Key) -> MarkTag {
    MarkTag {
        key: Some(key.clone()),
        deselected: !is_selected(base, key),
    }
}

/// Axis lines along the plot's left and bottom edges, plus horizontal grid
/// lines when enabled. Coordinates include the grid margins.
pub(crate) fn append_axes(grid: &CoordinateGrid, size: Size, frame: &mut RenderFrame) {
    let margins = grid.margins();
    let plot = grid.plot_size(size);
    let (left, top) = (margins.left, margins.top);
    let (right, bottom) = (left + plot.width, top + plot.height);

    if grid.render_horizontal_grid_lines() {
        for step in 1..=HORIZONTAL_GRID_LINES {
            let y = bottom - plot.height * step as f64 / HORIZONTAL_GRID_LINES as f64;
            frame
                .lines
                .push(LinePrimitive::new(left, y, right, y, 1.0, GRID_LINE_COLOR));
        }
    }
    frame
        .lines
        .push(LinePrimitive::new(left, bottom, right, bottom, 1.0, AXIS_COLOR));
    frame
        .lines
        .push(LinePrimitive::new(left, top, left, bottom, 1.0, AXIS_COLOR));
}

/// Stacks the chart's `data()` with the extra layers and fits the grid to
/// the result. Charts without a bound group stack nothing.
pub(crate) fn layout_stack(
    base: &BaseChart,
    grid: &mut CoordinateGrid,
    stack: &StackMixin,
) -> ChartResult<Vec<StackedLayer>> {
    if base.group().is_none() {
        return Ok(Vec::new());
    }
    // The domain check reads the pre-rescale x domain: elastic and ordinal
    // grids accept every key, fixed domains do not move on rescale.
    let layers = stack.stacked_layers(
        base.data(),
        base.group_name(),
        base.value_accessor(),
        base.key_accessor(),
        |key| grid.in_visible_domain(key),
    );
    grid.rescale_x(&x_keys(&layers))?;
    grid.rescale_y(y_extent_values(&layers))?;
    Ok(layers)
}
