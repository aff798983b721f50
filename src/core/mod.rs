pub mod primitives;
pub mod scale;
pub mod scale_model;
pub mod transform;
pub mod types;
pub mod windowing;
pub mod worker;

pub use scale::{LinearScale, PriceScale, ScaleKind, TimeScale, ZoomTransform};
pub use scale_model::ScaleModel;
pub use types::{Candle, ChartMargin, ChartPadding, ChartType, Direction, ScaleType, Viewport};
pub use worker::{TransformResult, TransformWorker};
