use serde::{Deserialize, Serialize};

use crate::core::scale::{PriceScale, ScaleKind, TimeScale, ZoomTransform};
use crate::core::windowing::candles_in_time_window;
use crate::core::{Candle, ScaleType, Viewport};
use crate::error::ChartResult;

/// Coordinate scales for one chart instance.
///
/// `x` spans the full fitted time domain; `scaled_x` is `x` composed with the
/// current zoom transform and is the scale everything visible is drawn with.
/// `y` is recomputed on every draw from the candles visible under
/// `scaled_x`'s domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleModel {
    x: TimeScale,
    scaled_x: TimeScale,
    y: PriceScale,
    zoom: ZoomTransform,
    scale_type: ScaleType,
    width: f64,
    height: f64,
}

impl ScaleModel {
    pub fn new(viewport: Viewport, scale_type: ScaleType, now_ms: f64) -> ChartResult<Self> {
        let width = f64::from(viewport.width);
        let height = f64::from(viewport.height);
        let x = TimeScale::new(0.0, now_ms.max(1.0), width)?;
        let y = PriceScale::new(0.0, 1.0, height, kind_for(scale_type, 1.0))?;

        Ok(Self {
            x,
            scaled_x: x,
            y,
            zoom: ZoomTransform::default(),
            scale_type,
            width,
            height,
        })
    }

    #[must_use]
    pub fn x(&self) -> TimeScale {
        self.x
    }

    #[must_use]
    pub fn scaled_x(&self) -> TimeScale {
        self.scaled_x
    }

    #[must_use]
    pub fn y(&self) -> PriceScale {
        self.y
    }

    #[must_use]
    pub fn zoom(&self) -> ZoomTransform {
        self.zoom
    }

    #[must_use]
    pub fn scale_type(&self) -> ScaleType {
        self.scale_type
    }

    /// Applies a new zoom transform and rederives the visible-window scale.
    pub fn set_zoom(&mut self, zoom: ZoomTransform) -> ChartResult<()> {
        self.zoom = zoom;
        self.scaled_x = zoom.rescale_x(self.x)?;
        Ok(())
    }

    /// Rebuilds the y scale for a different mapping, keeping the domain.
    pub fn set_scale_type(&mut self, scale_type: ScaleType) -> ChartResult<()> {
        self.scale_type = scale_type;
        let (min, max) = self.y.domain();
        self.y = PriceScale::new(min, max, self.height, kind_for(scale_type, min))?;
        Ok(())
    }

    /// Updates pixel ranges after a container resize.
    pub fn resize(&mut self, viewport: Viewport) -> ChartResult<()> {
        self.width = f64::from(viewport.width);
        self.height = f64::from(viewport.height);
        self.x = self.x.with_width(self.width)?;
        self.scaled_x = self.zoom.rescale_x(self.x)?;
        self.y = self.y.with_height(self.height)?;
        Ok(())
    }

    /// Fits the full x domain to the candles that fit at current density.
    ///
    /// The domain covers the last `width / 3` candles (one candle per ~3px);
    /// an empty series falls back to `[epoch, now]`.
    pub fn recompute_x_domain(&mut self, candles: &[Candle], now_ms: f64) -> ChartResult<()> {
        let visible_count = (self.width / 3.0).round().max(0.0) as usize;
        let tail_start = candles.len().saturating_sub(visible_count);
        let tail = &candles[tail_start..];

        let (start, end) = match (tail.first(), tail.last()) {
            (Some(first), Some(last)) => (first.time, last.time),
            _ => (0.0, now_ms),
        };

        self.x = self.x.with_domain(start, end)?;
        self.scaled_x = self.zoom.rescale_x(self.x)?;
        Ok(())
    }

    /// Low/high envelope of the candles visible under `scaled_x`'s domain,
    /// before any padding. Empty window falls back to `[0, 1]`.
    #[must_use]
    pub fn visible_price_extent(&self, candles: &[Candle]) -> (f64, f64) {
        let (start, end) = self.scaled_x.domain();
        let visible = candles_in_time_window(candles, start, end);
        if visible.is_empty() {
            return (0.0, 1.0);
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for candle in &visible {
            min = min.min(candle.low);
            max = max.max(candle.high);
        }
        (min, max)
    }

    /// Refits the y domain from the visible candle window.
    ///
    /// For the symlog mapping the constant is lowered one decade per
    /// threshold below the domain minimum so small prices keep resolution.
    /// Top/bottom pixel paddings are converted to price units through the
    /// unpadded scale's inverse and rounded to `price_precision` digits.
    pub fn recompute_y_domain(
        &mut self,
        candles: &[Candle],
        price_precision: u32,
        padding_top_px: f64,
        padding_bottom_px: f64,
    ) -> ChartResult<()> {
        let (mut min, mut max) = self.visible_price_extent(candles);

        let kind = kind_for(self.scale_type, min);
        self.y = PriceScale::new(min, max, self.height, kind)?;

        let padding_top = self.y.pixel_to_price(-padding_top_px)? - self.y.pixel_to_price(0.0)?;
        let padding_bottom = self.y.pixel_to_price(self.height)?
            - self.y.pixel_to_price(self.height + padding_bottom_px)?;

        max += round_to_precision(padding_top, price_precision);
        min -= round_to_precision(padding_bottom, price_precision);

        self.y = PriceScale::new(min, max, self.height, kind)?;
        Ok(())
    }

    /// Formats a y tick as a percentage over the visible candle window.
    ///
    /// The offset is relative to the window's domain minimum, so labels swing
    /// with the visible window; that sensitivity is part of the contract.
    #[must_use]
    pub fn percent_tick_label(&self, value: f64, candles: &[Candle]) -> String {
        let (min, _) = self.visible_price_extent(candles);
        if min == 0.0 {
            return String::from("0.0%");
        }
        format!("{:.1}%", (value - min) / min * 100.0)
    }
}

fn kind_for(scale_type: ScaleType, domain_min: f64) -> ScaleKind {
    match scale_type {
        ScaleType::Linear => ScaleKind::Linear,
        ScaleType::Log => ScaleKind::Symlog {
            constant: symlog_constant(domain_min),
        },
    }
}

/// Largest power-of-ten decade below the domain minimum, floored at 0.001.
fn symlog_constant(domain_min: f64) -> f64 {
    if domain_min == 0.0 {
        return 1.0;
    }

    let mut constant = 1.0;
    if domain_min < 1.0 {
        constant = 0.1;
    }
    if domain_min < 0.1 {
        constant = 0.01;
    }
    if domain_min < 0.01 {
        constant = 0.001;
    }
    constant
}

pub(crate) fn round_to_precision(value: f64, precision: u32) -> f64 {
    let factor = 10_f64.powi(precision as i32);
    (value * factor).round() / factor
}
