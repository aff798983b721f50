use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{datetime_to_unix_millis, decimal_to_f64};
use crate::error::{ChartError, ChartResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Outer margin reserved for the axis gutters around the plot area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for ChartMargin {
    fn default() -> Self {
        Self {
            top: 0.0,
            right: 55.0,
            bottom: 30.0,
            left: -1.0,
        }
    }
}

/// Inner padding keeping candles clear of the plot edges, in pixels.
///
/// Top/bottom are converted into price units through the active y scale
/// when the price domain is recomputed; right drives the initial scroll.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPadding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Default for ChartPadding {
    fn default() -> Self {
        Self {
            top: 65.0,
            right: 30.0,
            bottom: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    #[default]
    Candlestick,
    HeikinAshi,
    HeikinAshiActualPrice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    #[default]
    Linear,
    Log,
}

/// One futures chart candle.
///
/// `time` is the bucket open time in unix milliseconds. The market-data
/// collaborator mutates the last element of a series in place while its
/// interval bucket is open; this core only ever receives read-only snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub direction: Direction,
    pub symbol: String,
    pub interval: String,
}

impl Candle {
    /// Builds a validated candle from raw values.
    ///
    /// Invariants:
    /// - all numeric values are finite
    /// - `low <= high`
    /// - `open` and `close` are within `[low, high]`
    ///
    /// Direction is derived: `close >= open` is `Up`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        time: f64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
        symbol: impl Into<String>,
        interval: impl Into<String>,
    ) -> ChartResult<Self> {
        if !time.is_finite()
            || !open.is_finite()
            || !high.is_finite()
            || !low.is_finite()
            || !close.is_finite()
            || !volume.is_finite()
        {
            return Err(ChartError::InvalidData(
                "candle values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(ChartError::InvalidData(
                "candle low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "candle open/close must be within low/high range".to_owned(),
            ));
        }

        Ok(Self {
            time,
            open,
            high,
            low,
            close,
            volume,
            direction: if close >= open {
                Direction::Up
            } else {
                Direction::Down
            },
            symbol: symbol.into(),
            interval: interval.into(),
        })
    }

    /// Converts strongly-typed temporal/decimal input into a validated candle.
    #[allow(clippy::too_many_arguments)]
    pub fn from_decimal_time(
        time: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
        symbol: impl Into<String>,
        interval: impl Into<String>,
    ) -> ChartResult<Self> {
        Self::new(
            datetime_to_unix_millis(time),
            decimal_to_f64(open, "open")?,
            decimal_to_f64(high, "high")?,
            decimal_to_f64(low, "low")?,
            decimal_to_f64(close, "close")?,
            decimal_to_f64(volume, "volume")?,
            symbol,
            interval,
        )
    }

    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.direction == Direction::Up
    }
}
