//! Opt-in tracing setup for hosts embedding `linked-charts`.
//!
//! The crate only emits `tracing` events; nothing is printed unless a
//! subscriber is installed, either by the host or through the helpers below
//! (feature `telemetry`). Per-chart lifecycle events are additionally gated
//! by `DashboardSettings::debug`.

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "linked_charts=info";

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`, falling back
/// to [`DEFAULT_FILTER`].
///
/// Returns `false` without the `telemetry` feature or when the host already
/// installed a global subscriber.
#[must_use]
pub fn init_default_tracing() -> bool {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_owned());
    init_tracing_with_filter(&directives)
}

/// Installs a compact `fmt` subscriber with explicit filter directives,
/// e.g. `"linked_charts::api=trace"`.
#[must_use]
pub fn init_tracing_with_filter(directives: &str) -> bool {
    #[cfg(feature = "telemetry")]
    {
        let Ok(filter) = tracing_subscriber::EnvFilter::try_new(directives) else {
            return false;
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = directives;
        false
    }
}

#[cfg(all(test, not(feature = "telemetry")))]
mod tests {
    #[test]
    fn helpers_are_inert_without_the_feature() {
        assert!(!super::init_tracing_with_filter("linked_charts=trace"));
        assert!(!super::init_default_tracing());
    }
}
