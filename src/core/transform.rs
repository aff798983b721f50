use crate::core::{Candle, ChartType, Direction};

/// Applies the aggregation selected by `chart_type` to a raw candle series.
///
/// Every variant is a pure function of its input, safe to run on a worker
/// thread; see [`crate::core::TransformWorker`] for the offload path.
#[must_use]
pub fn transform_candles(chart_type: ChartType, candles: &[Candle]) -> Vec<Candle> {
    match chart_type {
        ChartType::Candlestick => identity(candles),
        ChartType::HeikinAshi => heikin_ashi(candles),
        ChartType::HeikinAshiActualPrice => heikin_ashi_actual_price(candles),
    }
}

#[must_use]
pub fn identity(candles: &[Candle]) -> Vec<Candle> {
    candles.to_vec()
}

/// Classic Heikin-Ashi smoothing.
///
/// `close' = avg(o, c, h, l)`, `open' = avg(prev open', prev close')` (first
/// candle uses `avg(o, c)`), high/low are widened to cover the derived body.
#[must_use]
pub fn heikin_ashi(candles: &[Candle]) -> Vec<Candle> {
    let mut derived: Vec<Candle> = Vec::with_capacity(candles.len());

    for candle in candles {
        let new_close = (candle.open + candle.close + candle.high + candle.low) / 4.0;
        let new_open = match derived.last() {
            Some(previous) => (previous.open + previous.close) / 2.0,
            None => (candle.open + candle.close) / 2.0,
        };

        let mut next = candle.clone();
        next.open = new_open;
        next.close = new_close;
        next.high = candle.high.max(new_open).max(new_close);
        next.low = candle.low.min(new_open).min(new_close);
        next.direction = direction_of(new_open, new_close);
        derived.push(next);
    }

    derived
}

/// Heikin-Ashi with the displayed price kept honest.
///
/// The derived open is clamped into the candle's raw low/high per direction
/// so bodies never float clear of the wick range, the last candle's close is
/// overridden with the real close, and each new candle back-patches its
/// predecessor to close the gap that appears when the derived open moves:
/// same direction extends the previous close, a direction flip extends the
/// previous open.
#[must_use]
pub fn heikin_ashi_actual_price(candles: &[Candle]) -> Vec<Candle> {
    let mut derived: Vec<Candle> = Vec::with_capacity(candles.len());

    for (index, candle) in candles.iter().enumerate() {
        let mut new_open = match derived.last() {
            Some(previous) => (previous.open + previous.close) / 2.0,
            None => (candle.open + candle.close) / 2.0,
        };
        let mut new_close = (candle.open + candle.close + candle.high + candle.low) / 4.0;

        let new_direction = direction_of(new_open, new_close);

        new_open = match new_direction {
            Direction::Up => new_open.max(candle.low),
            Direction::Down => new_open.min(candle.high),
        };

        // Keep the most recent displayed price accurate.
        if index == candles.len() - 1 {
            new_close = candle.close;
        }

        if let Some(previous) = derived.last_mut() {
            if new_direction == previous.direction {
                previous.close = match previous.direction {
                    Direction::Up => previous.close.max(new_open),
                    Direction::Down => previous.close.min(new_open),
                };
            } else {
                previous.open = match previous.direction {
                    Direction::Down => previous.open.max(new_open),
                    Direction::Up => previous.open.min(new_open),
                };
            }
        }

        let mut next = candle.clone();
        next.open = new_open;
        next.close = new_close;
        next.direction = new_direction;
        derived.push(next);
    }

    derived
}

fn direction_of(open: f64, close: f64) -> Direction {
    if open <= close {
        Direction::Up
    } else {
        Direction::Down
    }
}
