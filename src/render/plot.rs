use tracing::trace;

#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;

use crate::core::scale::{PriceScale, TimeScale, ZoomTransform};
use crate::core::{Candle, ChartType, Direction, ScaleModel};
use crate::error::ChartResult;

/// SVG-style path data for one draw pass, split by direction and by
/// historical-versus-live candle so the hot path can update one element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CandlePaths {
    pub bodies_up: String,
    pub bodies_down: String,
    pub wicks_up: String,
    pub wicks_down: String,
    pub last_body_up: String,
    pub last_body_down: String,
    pub last_wick_up: String,
    pub last_wick_down: String,
}

#[derive(Debug, Clone, PartialEq)]
struct PlotMemo {
    width: f64,
    last_time: f64,
    last_symbol: String,
    last_interval: String,
    zoom: ZoomTransform,
    chart_type: ChartType,
    y_domain: (f64, f64),
}

/// Projects transformed candles into body/wick path strings.
///
/// The live candle (the last element) is redrawn on every call; historical
/// candles are reprojected only when the memoized draw inputs actually
/// changed, which bounds the cost of high-frequency streaming updates.
#[derive(Debug, Default)]
pub struct PlotRenderer {
    paths: CandlePaths,
    memo: Option<PlotMemo>,
}

impl PlotRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn paths(&self) -> &CandlePaths {
        &self.paths
    }

    /// Body width in pixels as a step function of the zoom factor.
    ///
    /// Bodies stay visible when zoomed far out and grow proportionally once
    /// the factor passes 3.
    #[must_use]
    pub fn body_width(zoom_k: f64) -> f64 {
        if zoom_k < 0.3 {
            1.0
        } else if zoom_k < 0.8 {
            1.5
        } else if zoom_k < 1.5 {
            2.0
        } else if zoom_k < 3.0 {
            3.0
        } else {
            zoom_k
        }
    }

    /// Redraws the live candle and, when draw inputs changed, the history.
    ///
    /// Returns `true` when the historical paths were rebuilt.
    pub fn draw(
        &mut self,
        candles: &[Candle],
        scales: &ScaleModel,
        chart_type: ChartType,
    ) -> ChartResult<bool> {
        let Some(last_candle) = candles.last() else {
            return Ok(false);
        };

        let scaled_x = scales.scaled_x();
        let y = scales.y();
        let zoom = scales.zoom();
        let width = Self::body_width(zoom.k);

        self.paths.last_body_up.clear();
        self.paths.last_body_down.clear();
        self.paths.last_wick_up.clear();
        self.paths.last_wick_down.clear();
        match last_candle.direction {
            Direction::Up => {
                self.paths.last_body_up = body_path(last_candle, width, scaled_x, y)?;
                self.paths.last_wick_up = wick_path(last_candle, scaled_x, y)?;
            }
            Direction::Down => {
                self.paths.last_body_down = body_path(last_candle, width, scaled_x, y)?;
                self.paths.last_wick_down = wick_path(last_candle, scaled_x, y)?;
            }
        }

        let memo = PlotMemo {
            width: scaled_x.range().1,
            last_time: last_candle.time,
            last_symbol: last_candle.symbol.clone(),
            last_interval: last_candle.interval.clone(),
            zoom,
            chart_type,
            y_domain: y.domain(),
        };

        if self.memo.as_ref() == Some(&memo) {
            return Ok(false);
        }

        let history = &candles[..candles.len() - 1];
        let (up, down) = partition_by_direction(history);

        self.paths.bodies_up = join_paths(&up, |c| body_path(c, width, scaled_x, y))?;
        self.paths.bodies_down = join_paths(&down, |c| body_path(c, width, scaled_x, y))?;
        self.paths.wicks_up = join_paths(&up, |c| wick_path(c, scaled_x, y))?;
        self.paths.wicks_down = join_paths(&down, |c| wick_path(c, scaled_x, y))?;

        trace!(candles = history.len(), "historical candle paths rebuilt");
        self.memo = Some(memo);
        Ok(true)
    }
}

fn join_paths<F>(candles: &[&Candle], project: F) -> ChartResult<String>
where
    F: Fn(&Candle) -> ChartResult<String> + Sync,
{
    // For large series, optional parallel projection keeps output identical
    // while reducing wall-clock projection time.
    #[cfg(feature = "parallel-projection")]
    {
        let segments: Vec<ChartResult<String>> =
            candles.par_iter().map(|candle| project(candle)).collect();
        let mut path = String::new();
        for segment in segments {
            path.push_str(&segment?);
        }
        Ok(path)
    }

    #[cfg(not(feature = "parallel-projection"))]
    {
        let mut path = String::new();
        for candle in candles {
            path.push_str(&project(candle)?);
        }
        Ok(path)
    }
}

fn partition_by_direction<'a>(
    history: &'a [Candle],
) -> (Vec<&'a Candle>, Vec<&'a Candle>) {
    history
        .iter()
        .partition(|candle| candle.direction == Direction::Up)
}

fn body_path(
    candle: &Candle,
    width: f64,
    scaled_x: TimeScale,
    y: PriceScale,
) -> ChartResult<String> {
    let open = y.price_to_pixel(candle.open)?.round();
    let close = y.price_to_pixel(candle.close)?.round();

    // Pixel Y grows downward, so the close sits on top of an up candle.
    let (top, bottom) = match candle.direction {
        Direction::Up => (close, open),
        Direction::Down => (open, close),
    };

    let x = scaled_x.time_to_pixel(candle.time)?.round() - width / 2.0;
    let drop = bottom - top;

    Ok(format!("M{x},{top} h{width}v{drop}h{neg}z", neg = -width))
}

fn wick_path(candle: &Candle, scaled_x: TimeScale, y: PriceScale) -> ChartResult<String> {
    let x = scaled_x.time_to_pixel(candle.time)?.round();
    let y1 = y.price_to_pixel(candle.high)?.round();
    let y2 = y.price_to_pixel(candle.low)?.round();

    Ok(format!("M{x},{y1} v{delta}", delta = y2 - y1))
}
