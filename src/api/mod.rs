pub mod chart;
pub mod config;

pub use chart::{
    AlertLogHandler, AlertLogItem, ChartUpdate, MAX_ALERT_LOG_SIZE, Minichart, MinichartHandlers,
};
pub use config::{MinichartConfig, VolumeAnomalyConfig};
