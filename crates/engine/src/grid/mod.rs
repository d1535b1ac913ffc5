mod stepper;
mod tilemap;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use stepper::line_steps;
pub use tilemap::{Tilemap, TilemapError};

/// Integer tile coordinates on the isometric grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `max(|dx|, |dy|)`, the metric used for melee and detection range.
    pub fn chebyshev_distance(self, other: TileCoord) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
