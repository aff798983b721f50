//! minichart-rs: geometry and interaction engine for live candlestick
//! mini-charts.
//!
//! The crate owns the chart math (scale transforms under zoom/pan, derived
//! candle series, reconciling price-line collections, liquidation estimates)
//! and emits backend-agnostic path strings and scene nodes. Market data,
//! persistence and the widget shell stay with the host.

pub mod api;
pub mod core;
pub mod error;
pub mod lines;
pub mod render;
pub mod telemetry;
pub mod trade;

pub use api::{Minichart, MinichartConfig, MinichartHandlers};
pub use error::{ChartError, ChartResult};
