use serde::{Deserialize, Serialize};

use super::registry::DEFAULT_CHART_GROUP;

/// Debounce applied to brush and zoom driven filter updates.
pub const DEFAULT_EVENT_DELAY_MS: u64 = 40;

/// Dashboard-wide switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Every draw is instant and post hooks run synchronously.
    pub disable_transitions: bool,
    /// Enables per-chart lifecycle `debug!` events.
    pub debug: bool,
    pub default_chart_group: String,
    pub event_delay_ms: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            disable_transitions: false,
            debug: false,
            default_chart_group: DEFAULT_CHART_GROUP.to_owned(),
            event_delay_ms: DEFAULT_EVENT_DELAY_MS,
        }
    }
}

impl DashboardSettings {
    #[must_use]
    pub fn with_disable_transitions(mut self, disable: bool) -> Self {
        self.disable_transitions = disable;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_default_chart_group(mut self, group: impl Into<String>) -> Self {
        self.default_chart_group = group.into();
        self
    }

    #[must_use]
    pub fn with_event_delay_ms(mut self, delay_ms: u64) -> Self {
        self.event_delay_ms = delay_ms;
        self
    }
}
