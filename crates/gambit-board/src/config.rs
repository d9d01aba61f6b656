//! Board configuration.

use serde::{Deserialize, Serialize};

/// Size and spacing of the board built at match setup.
///
/// `#[serde(default)]` lets a config file name only the fields it wants to
/// change; everything else falls back to [`BoardConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Number of columns (x runs `0..width`).
    pub width: u32,

    /// Number of rows (y runs `0..height`).
    pub height: u32,

    /// World-space distance between neighbouring cell anchors.
    pub cell_spacing: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            cell_spacing: 1.0,
        }
    }
}

impl BoardConfig {
    /// Largest allowed width or height.
    pub const MAX_SIDE: u32 = 256;

    /// Returns a config that is safe to build a board from.
    ///
    /// - `width` and `height` capped to [`Self::MAX_SIDE`].
    /// - A spacing that isn't a positive finite number falls back to `1.0`.
    pub fn validated(mut self) -> Self {
        for (axis, side) in [("width", &mut self.width), ("height", &mut self.height)] {
            if *side > Self::MAX_SIDE {
                tracing::warn!(
                    axis,
                    requested = *side,
                    max = Self::MAX_SIDE,
                    "board side exceeds maximum, clamping"
                );
                *side = Self::MAX_SIDE;
            }
        }
        if !(self.cell_spacing.is_finite() && self.cell_spacing > 0.0) {
            tracing::warn!(spacing = self.cell_spacing, "invalid cell spacing, using 1.0");
            self.cell_spacing = 1.0;
        }
        self
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
