use std::fmt;

use serde::{Deserialize, Serialize};

/// Process-unique chart identity within one dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChartId(pub u64);

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Host node a chart renders into.
///
/// Identity is the selector; the size hint stands in for the host node's
/// measured size and is used when no explicit width/height is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    selector: String,
    #[serde(default)]
    size_hint: Option<Size>,
}

impl Anchor {
    #[must_use]
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            size_hint: None,
        }
    }

    #[must_use]
    pub fn with_size_hint(mut self, width: f64, height: f64) -> Self {
        self.size_hint = Some(Size::new(width, height));
        self
    }

    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    #[must_use]
    pub fn size_hint(&self) -> Option<Size> {
        self.size_hint
    }

    /// Anchor identity used by registry deregistration.
    #[must_use]
    pub fn same_node(&self, other: &Anchor) -> bool {
        self.selector == other.selector
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}
