use std::any::Any;

use crate::core::{Filter, GroupRow, Size};
use crate::error::ChartResult;
use crate::mixins::{
    BubbleMixin, CapMixin, CoordinateGrid, HierarchyMixin, LegendItem, Margins, StackMixin,
};
use crate::render::RenderFrame;

use super::base_chart::{BaseChart, MandatoryAttribute};

/// Full draw (`Render`) or incremental update (`Redraw`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DrawPass {
    Render,
    Redraw,
}

/// A chart kind composed from `BaseChart` and optional behavior slices.
///
/// Capability accessors return `None` for behaviors a kind does not carry;
/// dashboard operations aimed at a missing capability fail with
/// `ChartError::CapabilityMissing`.
pub trait Chart: Any {
    fn kind(&self) -> &'static str;

    fn base(&self) -> &BaseChart;

    fn base_mut(&mut self) -> &mut BaseChart;

    /// Builds the frame for one pass. Must tolerate being called with no
    /// data change.
    fn draw(&mut self, pass: DrawPass, size: Size) -> ChartResult<RenderFrame>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn data(&self) -> Vec<GroupRow> {
        self.base().data()
    }

    fn coordinate_grid(&self) -> Option<&CoordinateGrid> {
        None
    }

    fn coordinate_grid_mut(&mut self) -> Option<&mut CoordinateGrid> {
        None
    }

    fn stack(&self) -> Option<&StackMixin> {
        None
    }

    fn stack_mut(&mut self) -> Option<&mut StackMixin> {
        None
    }

    fn cap(&self) -> Option<&CapMixin> {
        None
    }

    fn cap_mut(&mut self) -> Option<&mut CapMixin> {
        None
    }

    fn hierarchy(&self) -> Option<&HierarchyMixin> {
        None
    }

    fn hierarchy_mut(&mut self) -> Option<&mut HierarchyMixin> {
        None
    }

    fn bubble(&self) -> Option<&BubbleMixin> {
        None
    }

    fn bubble_mut(&mut self) -> Option<&mut BubbleMixin> {
        None
    }

    /// Whether `attribute` is configured; consulted by the render gate.
    fn has_attribute(&self, attribute: MandatoryAttribute) -> bool {
        match attribute {
            MandatoryAttribute::Dimension => self.base().dimension().is_some(),
            MandatoryAttribute::Group => self.base().group().is_some(),
            MandatoryAttribute::XScale => self
                .coordinate_grid()
                .is_some_and(|grid| grid.x().is_some()),
            MandatoryAttribute::Levels => self
                .hierarchy()
                .is_some_and(|hierarchy| !hierarchy.levels().is_empty()),
            MandatoryAttribute::Counter => false,
        }
    }

    /// Drops cached derived data after binding changes.
    fn expire_cache(&mut self) {
        if let Some(grid) = self.coordinate_grid_mut() {
            grid.expire_cache();
        }
    }

    /// Applies plot margins; `false` when the kind draws without margins.
    fn set_margins(&mut self, margins: Margins) -> bool {
        match self.coordinate_grid_mut() {
            Some(grid) => {
                grid.set_margins(margins);
                true
            }
            None => false,
        }
    }

    fn legendables(&mut self) -> Vec<LegendItem> {
        Vec::new()
    }

    /// Filters a click on `row` toggles: the folded keys of an "others"
    /// row, otherwise the row's key.
    fn click_filters(&self, row: &GroupRow) -> Vec<Filter> {
        match &row.others {
            Some(keys) => keys.iter().cloned().map(Filter::Value).collect(),
            None => vec![Filter::Value(self.base().key_accessor().get(row))],
        }
    }

    /// Dims marks of the last frame outside `selection` without a data query.
    fn brush_feedback(&mut self, selection: Option<&Filter>) {
        let Some(frame) = self.base_mut().last_frame.as_mut() else {
            return;
        };
        match selection {
            Some(filter) => frame.apply_selection(|key| filter.is_filtered(key)),
            None => frame.clear_selection(),
        }
    }
}
