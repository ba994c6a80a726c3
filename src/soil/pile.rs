use serde::{Deserialize, Serialize};

use crate::types::*;

/// Pile cross-section, shared by every position and layer of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PileGeometry {
    /// Width b (face loaded by the horizontal force)
    pub width: Length,

    /// Perimeter U (shaft friction acts on it)
    pub perimeter: Length,
}

impl PileGeometry {
    pub fn new(width: Length, perimeter: Length) -> Self {
        Self { width, perimeter }
    }

    pub fn width_m(&self) -> f64 {
        self.width.get::<meter>()
    }

    pub fn perimeter_m(&self) -> f64 {
        self.perimeter.get::<meter>()
    }
}
