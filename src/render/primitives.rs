use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f64,
    pub green: f64,
    pub blue: f64,
    pub alpha: f64,
}

impl Color {
    #[must_use]
    pub const fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f64, green: f64, blue: f64) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds a color from 8-bit channel values.
    #[must_use]
    pub const fn from_u8(red: u8, green: u8, blue: u8) -> Self {
        Self::rgb(red as f64 / 255.0, green as f64 / 255.0, blue as f64 / 255.0)
    }

    pub fn validate(self) -> ChartResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ChartError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

/// Stroke dash pattern matching the three supported line styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// SVG-style `stroke-dasharray` value, `None` for solid strokes.
    #[must_use]
    pub fn dash_array(self) -> Option<&'static str> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("10 7"),
            Self::Dotted => Some("2 4"),
        }
    }
}
