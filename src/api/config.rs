use serde::{Deserialize, Serialize};

use crate::core::{ChartMargin, ChartPadding, ChartType, ScaleType};
use crate::error::{ChartError, ChartResult};

/// Volume-anomaly alerting thresholds.
///
/// Injected configuration: the live candle's volume is compared against
/// `ratio` times the mean volume of the preceding `window` candles, and each
/// candle bucket can flag at most once.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeAnomalyConfig {
    pub ratio: f64,
    pub window: usize,
}

/// Public chart bootstrap configuration.
///
/// This type is serializable so host applications can persist/load chart
/// setup without inventing their own ad-hoc format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinichartConfig {
    #[serde(default)]
    pub chart_type: ChartType,
    #[serde(default)]
    pub scale_type: ScaleType,
    #[serde(default = "default_price_precision")]
    pub price_precision: u32,
    /// Format y ticks as percentages over the visible candle window.
    #[serde(default)]
    pub percent_scale: bool,
    #[serde(default)]
    pub margin: ChartMargin,
    #[serde(default)]
    pub padding: ChartPadding,
    /// Resize recomputes are coalesced to at most one per this interval.
    #[serde(default = "default_resize_debounce_ms")]
    pub resize_debounce_ms: i64,
    /// Cadence of the alert expiry/label sweep.
    #[serde(default = "default_alert_sweep_interval_ms")]
    pub alert_sweep_interval_ms: i64,
    #[serde(default)]
    pub volume_anomaly: Option<VolumeAnomalyConfig>,
    /// Run Heikin-Ashi transforms on a background worker thread.
    #[serde(default = "default_use_transform_worker")]
    pub use_transform_worker: bool,
}

impl Default for MinichartConfig {
    fn default() -> Self {
        Self {
            chart_type: ChartType::default(),
            scale_type: ScaleType::default(),
            price_precision: default_price_precision(),
            percent_scale: false,
            margin: ChartMargin::default(),
            padding: ChartPadding::default(),
            resize_debounce_ms: default_resize_debounce_ms(),
            alert_sweep_interval_ms: default_alert_sweep_interval_ms(),
            volume_anomaly: None,
            use_transform_worker: default_use_transform_worker(),
        }
    }
}

impl MinichartConfig {
    pub fn validate(self) -> ChartResult<Self> {
        if self.resize_debounce_ms < 0 || self.alert_sweep_interval_ms <= 0 {
            return Err(ChartError::InvalidData(
                "config intervals must be non-negative (sweep > 0)".to_owned(),
            ));
        }

        if let Some(anomaly) = self.volume_anomaly {
            if !anomaly.ratio.is_finite() || anomaly.ratio <= 0.0 {
                return Err(ChartError::InvalidData(
                    "volume anomaly ratio must be finite and > 0".to_owned(),
                ));
            }
        }

        Ok(self)
    }

    /// Serializes for the host's settings store.
    pub fn to_json_pretty(&self) -> ChartResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ChartError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Parses a persisted settings payload; omitted fields take defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse config json: {e}")))?;
        config.validate()
    }
}

fn default_price_precision() -> u32 {
    1
}

fn default_resize_debounce_ms() -> i64 {
    500
}

fn default_alert_sweep_interval_ms() -> i64 {
    1000
}

fn default_use_transform_worker() -> bool {
    true
}
