pub mod bubble;
pub mod cap;
pub mod color;
pub mod coordinate_grid;
pub mod hierarchy;
pub mod legend;
pub mod margins;
pub mod stack;

pub use bubble::BubbleMixin;
pub use cap::CapMixin;
pub use color::{ColorMixin, ColorScale, DEFAULT_PALETTE};
pub use coordinate_grid::{CoordinateGrid, Rounding};
pub use hierarchy::{HierarchyLevel, HierarchyMixin};
pub use legend::{Legend, LegendItem};
pub use margins::Margins;
pub use stack::{StackLayer, StackMixin, StackedLayer, StackedPoint};
