pub mod arithmetic;
pub mod data;
pub mod filters;
pub mod key;
pub mod memory;
pub mod scale;
pub mod throttle;
pub mod timeline;
pub mod types;

pub use arithmetic::Step;
pub use data::{
    Dimension, DimensionHandle, FilterPredicate, Group, GroupHandle, GroupRow, KeyAccessor,
    Reduced, TextAccessor, ValueAccessor,
};
pub use filters::{Filter, RangedFilter, RangedTwoDimensionalFilter, TwoDimensionalFilter};
pub use key::Key;
pub use memory::{MemoryCrossfilter, MemoryDimension, MemoryGroup, RecordCount};
pub use scale::{LinearScale, OrdinalScale, XScale};
pub use throttle::{EventThrottle, ThrottleToken, Triggered};
pub use timeline::{Timeline, TimerId};
pub use types::{Anchor, ChartId, Size};
