//! linked-charts: cross-filtered dashboard charts.
//!
//! Charts bind to dimensions and groups of a shared data engine. Filtering
//! one chart re-queries every chart in its group; brushing, zooming and
//! hierarchical filters go through the same `Dashboard` facade. Drawing is
//! split from behavior: charts produce a `RenderFrame` and a `Renderer`
//! backend paints it.

pub mod api;
pub mod charts;
pub mod core;
pub mod error;
pub mod interaction;
pub mod mixins;
pub mod render;
pub mod telemetry;

pub use api::{ChartOptions, Dashboard, DashboardSettings};
pub use error::{ChartError, ChartResult};
