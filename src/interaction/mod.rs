//! Pixel-space gesture state for brushing.
//!
//! Brushes are tracked in plot-local pixels; converting to domain values
//! depends on the chart's current x scale and happens in the grid mixin.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Brushing,
    Panning,
}

/// 1D brush along x.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrushX {
    active: bool,
    start_px: f64,
    current_px: f64,
}

impl BrushX {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn begin(&mut self, x_px: f64) {
        self.active = true;
        self.start_px = x_px;
        self.current_px = x_px;
    }

    pub fn update(&mut self, x_px: f64) {
        if self.active {
            self.current_px = x_px;
        }
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// Current extent, ordered low to high.
    #[must_use]
    pub fn range_px(&self) -> Option<(f64, f64)> {
        if !self.active {
            return None;
        }
        let (a, b) = (self.start_px, self.current_px);
        Some(if a <= b { (a, b) } else { (b, a) })
    }

    pub fn take_final_px(&mut self) -> Option<(f64, f64)> {
        let range = self.range_px();
        self.active = false;
        range
    }
}

/// 2D brush (rectangle), for scatter-style charts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BrushRect {
    active: bool,
    start: (f64, f64),
    current: (f64, f64),
}

impl BrushRect {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn begin(&mut self, x_px: f64, y_px: f64) {
        self.active = true;
        self.start = (x_px, y_px);
        self.current = (x_px, y_px);
    }

    pub fn update(&mut self, x_px: f64, y_px: f64) {
        if self.active {
            self.current = (x_px, y_px);
        }
    }

    pub fn cancel(&mut self) {
        self.active = false;
    }

    /// `(x0, y0, x1, y1)` with `x0 <= x1` and `y0 <= y1`.
    #[must_use]
    pub fn rect_px(&self) -> Option<(f64, f64, f64, f64)> {
        if !self.active {
            return None;
        }
        Some((
            self.start.0.min(self.current.0),
            self.start.1.min(self.current.1),
            self.start.0.max(self.current.0),
            self.start.1.max(self.current.1),
        ))
    }

    pub fn take_final_px(&mut self) -> Option<(f64, f64, f64, f64)> {
        let rect = self.rect_px();
        self.active = false;
        rect
    }
}
