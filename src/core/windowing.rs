use crate::core::Candle;

/// Returns candles whose open time falls inside an inclusive time window.
#[must_use]
pub fn candles_in_time_window(candles: &[Candle], start: f64, end: f64) -> Vec<Candle> {
    let (min_t, max_t) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };

    candles
        .iter()
        .filter(|candle| candle.time >= min_t && candle.time <= max_t)
        .cloned()
        .collect()
}
