use crate::core::ScaleModel;
use crate::error::ChartResult;
use crate::render::axes::{linear_ticks, time_ticks};

/// Pixel positions of grid lines spanning the full plot area.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridFrame {
    /// Vertical lines, one x pixel per visible time tick.
    pub x_lines: Vec<f64>,
    /// Horizontal lines, one y pixel per price tick.
    pub y_lines: Vec<f64>,
}

/// Generates unlabeled grid lines from the current scales.
///
/// The grid is sparser than the axes: one horizontal line per ~80px against
/// the price axis's ~40px tick spacing.
#[derive(Debug, Default)]
pub struct GridRenderer;

impl GridRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    pub fn draw(&self, scales: &ScaleModel) -> ChartResult<GridFrame> {
        let scaled_x = scales.scaled_x();
        let y = scales.y();

        let (range_start, range_end) = scaled_x.range();
        let width = (range_end - range_start).abs();
        let height = y.height();

        let x_count = (width / 50.0).round().max(1.0) as usize;
        let y_count = (height / 80.0).max(1.0) as usize;

        let (time_start, time_end) = scaled_x.domain();
        let mut x_lines = Vec::new();
        for value in time_ticks(time_start, time_end, x_count) {
            x_lines.push(scaled_x.time_to_pixel(value)?);
        }

        let (price_min, price_max) = y.domain();
        let mut y_lines = Vec::new();
        for value in linear_ticks(price_min, price_max, y_count) {
            y_lines.push(y.price_to_pixel(value)?);
        }

        Ok(GridFrame { x_lines, y_lines })
    }
}
