pub mod axes;
pub mod format;
pub mod grid;
pub mod plot;
pub mod primitives;

pub use axes::{AxesFrame, AxesRenderer, AxisTick};
pub use grid::{GridFrame, GridRenderer};
pub use plot::{CandlePaths, PlotRenderer};
pub use primitives::{Color, LineStyle};
