use serde::{Deserialize, Serialize};

use crate::core::{Candle, ScaleModel};
use crate::error::ChartResult;
use crate::render::format::{format_price, format_time};

/// One positioned axis tick with its rendered label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    pub value: f64,
    pub pixel: f64,
    pub label: String,
}

/// Tick lists for one draw pass: time axis at the bottom, price axis at the
/// right edge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxesFrame {
    pub x_ticks: Vec<AxisTick>,
    pub y_ticks: Vec<AxisTick>,
}

/// Generates and formats axis ticks from the current scales.
///
/// Tick density follows pixel size: one x tick per ~50px, one y tick per
/// ~40px. In percentage mode y labels are expressed relative to the visible
/// candle window instead of raw prices.
#[derive(Debug, Default)]
pub struct AxesRenderer {
    price_precision: u32,
    percent_mode: bool,
    candles: Vec<Candle>,
}

impl AxesRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            price_precision: 1,
            percent_mode: false,
            candles: Vec::new(),
        }
    }

    pub fn set_price_precision(&mut self, price_precision: u32) {
        self.price_precision = price_precision;
    }

    pub fn set_percent_mode(&mut self, percent_mode: bool) {
        self.percent_mode = percent_mode;
    }

    pub fn set_candles(&mut self, candles: Vec<Candle>) {
        self.candles = candles;
    }

    pub fn draw(&self, scales: &ScaleModel) -> ChartResult<AxesFrame> {
        let scaled_x = scales.scaled_x();
        let y = scales.y();

        let (width_start, width_end) = scaled_x.range();
        let width = (width_end - width_start).abs();
        let height = y.height();

        let x_count = (width / 50.0).round().max(1.0) as usize;
        let y_count = (height / 40.0).max(1.0) as usize;

        let (time_start, time_end) = scaled_x.domain();
        let mut x_ticks = Vec::new();
        for value in time_ticks(time_start, time_end, x_count) {
            x_ticks.push(AxisTick {
                value,
                pixel: scaled_x.time_to_pixel(value)?,
                label: time_tick_label(value),
            });
        }

        let (price_min, price_max) = y.domain();
        let mut y_ticks = Vec::new();
        for value in linear_ticks(price_min, price_max, y_count) {
            let label = if self.percent_mode {
                scales.percent_tick_label(value, &self.candles)
            } else {
                format_price(value, self.price_precision)
            };
            y_ticks.push(AxisTick {
                value,
                pixel: y.price_to_pixel(value)?,
                label,
            });
        }

        Ok(AxesFrame { x_ticks, y_ticks })
    }
}

/// "Nice" tick values over a linear domain, at most roughly `count` of them.
///
/// Steps are 1/2/5 multiples of a power of ten, selected the way d3 selects
/// them, and ticks land on step multiples inside the domain.
#[must_use]
pub fn linear_ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() || start == stop {
        return Vec::new();
    }

    let (lo, hi) = if start <= stop {
        (start, stop)
    } else {
        (stop, start)
    };

    let step = (hi - lo) / count.max(1) as f64;
    let power = step.log10().floor();
    let error = step / 10_f64.powf(power);
    let factor = if error >= 50_f64.sqrt() {
        10.0
    } else if error >= 10_f64.sqrt() {
        5.0
    } else if error >= 2_f64.sqrt() {
        2.0
    } else {
        1.0
    };

    let mut ticks = Vec::new();
    if power >= 0.0 {
        let increment = factor * 10_f64.powf(power);
        if !increment.is_finite() || increment <= 0.0 {
            return ticks;
        }
        let mut from = (lo / increment).round();
        let mut to = (hi / increment).round();
        if from * increment < lo {
            from += 1.0;
        }
        if to * increment > hi {
            to -= 1.0;
        }
        let mut index = from;
        while index <= to {
            ticks.push(index * increment);
            index += 1.0;
        }
    } else {
        // Sub-unit steps divide by an integer reciprocal so ticks stay exact.
        let increment = 10_f64.powf(-power) / factor;
        if !increment.is_finite() || increment <= 0.0 {
            return ticks;
        }
        let mut from = (lo * increment).round();
        let mut to = (hi * increment).round();
        if from / increment < lo {
            from += 1.0;
        }
        if to / increment > hi {
            to -= 1.0;
        }
        let mut index = from;
        while index <= to {
            ticks.push(index / increment);
            index += 1.0;
        }
    }

    if start > stop {
        ticks.reverse();
    }
    ticks
}

const SECOND_MS: f64 = 1000.0;
const MINUTE_MS: f64 = 60.0 * SECOND_MS;
const HOUR_MS: f64 = 60.0 * MINUTE_MS;
const DAY_MS: f64 = 24.0 * HOUR_MS;

/// Tick interval ladder for the time axis, smallest to largest.
const TIME_STEPS_MS: [f64; 16] = [
    SECOND_MS,
    5.0 * SECOND_MS,
    15.0 * SECOND_MS,
    30.0 * SECOND_MS,
    MINUTE_MS,
    5.0 * MINUTE_MS,
    15.0 * MINUTE_MS,
    30.0 * MINUTE_MS,
    HOUR_MS,
    3.0 * HOUR_MS,
    6.0 * HOUR_MS,
    12.0 * HOUR_MS,
    DAY_MS,
    2.0 * DAY_MS,
    7.0 * DAY_MS,
    30.0 * DAY_MS,
];

/// Epoch-aligned time ticks using the smallest ladder step that keeps the
/// tick count at or below `count`.
#[must_use]
pub fn time_ticks(start_ms: f64, end_ms: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start_ms.is_finite() || !end_ms.is_finite() || start_ms >= end_ms {
        return Vec::new();
    }

    let span = end_ms - start_ms;
    let target = span / count as f64;
    let step = TIME_STEPS_MS
        .iter()
        .copied()
        .find(|step| *step >= target)
        .unwrap_or_else(|| {
            // Beyond the ladder, fall back to whole multiples of 30 days.
            (target / (30.0 * DAY_MS)).ceil() * 30.0 * DAY_MS
        });

    let mut ticks = Vec::new();
    let mut tick = (start_ms / step).ceil() * step;
    while tick <= end_ms {
        ticks.push(tick);
        tick += step;
    }
    ticks
}

/// Short context-dependent time label: date at midnight, clock time otherwise.
#[must_use]
pub fn time_tick_label(time_ms: f64) -> String {
    if time_ms.rem_euclid(DAY_MS) == 0.0 {
        let full = format_time(time_ms);
        full.split_whitespace().next().unwrap_or_default().to_owned()
    } else {
        let full = format_time(time_ms);
        full.split_whitespace().nth(1).unwrap_or_default().to_owned()
    }
}
