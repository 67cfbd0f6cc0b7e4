use serde::{Deserialize, Serialize};

/// Plot-area insets in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 10.0,
            right: 50.0,
            bottom: 30.0,
            left: 30.0,
        }
    }
}

impl Margins {
    #[must_use]
    pub const fn uniform(value: f64) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    #[must_use]
    pub fn effective_width(self, width: f64) -> f64 {
        (width - self.left - self.right).max(0.0)
    }

    #[must_use]
    pub fn effective_height(self, height: f64) -> f64 {
        (height - self.top - self.bottom).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::Margins;

    #[test]
    fn effective_size_never_goes_negative() {
        let margins = Margins::default();
        assert_eq!(margins.effective_width(200.0), 120.0);
        assert_eq!(margins.effective_height(20.0), 0.0);
    }
}
