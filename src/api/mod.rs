mod base_chart;
mod brush_controller;
mod chart;
mod dashboard;
mod filter_controller;
mod group_operations;
mod hierarchy_controller;
mod listeners;
mod options;
mod pan_delta_resolver;
mod registry;
mod render_coordinator;
mod settings;
mod validation;
mod zoom_controller;
mod zoom_factor_resolver;

pub use base_chart::{
    BaseChart, DEFAULT_MIN_HEIGHT, DEFAULT_MIN_WIDTH, DEFAULT_TRANSITION_MS, DataCallback,
    DefaultFilterPolicy, FilterPolicy, FilterSet, MandatoryAttribute, Renderlet,
    RenderletContext,
};
pub use chart::{Chart, DrawPass};
pub use dashboard::{Dashboard, GroupHook};
pub use listeners::{ChartEvent, ChartEventKind, Listener, Listeners};
pub use options::ChartOptions;
pub use registry::{ChartRegistry, DEFAULT_CHART_GROUP, RegistryEntry};
pub use settings::{DEFAULT_EVENT_DELAY_MS, DashboardSettings};
