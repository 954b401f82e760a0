use serde::{Deserialize, Serialize};

use crate::color::Color;

/// Which faces of a surface get shaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    /// Value handed to the fragment shader.
    pub(crate) fn shader_code(self) -> f32 {
        match self {
            Self::Front => 0.0,
            Self::Back => 1.0,
            Self::Double => 2.0,
        }
    }
}

/// Diffuse-only material lit per fragment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LambertMaterial {
    pub color: Color,
    pub side: Side,
}

impl LambertMaterial {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            side: Side::Front,
        }
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }
}

impl Default for LambertMaterial {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}
