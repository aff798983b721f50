use crate::error::ChartResult;
use crate::lines::engine::{ChartAxis, PriceLineItem, PriceLinePatch, PriceLines, PriceLinesConfig, ReconcileStats};
use crate::lines::palette;
use crate::render::primitives::LineStyle;

const CROSSHAIR_ID: &str = "crosshair";

/// Dotted crosshair pair following the pointer.
///
/// Pointer events are disabled for the whole collection so the crosshair
/// never shadows hit-testing on interactive lines underneath it.
pub struct CrosshairPriceLines {
    lines: PriceLines<()>,
}

impl Default for CrosshairPriceLines {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosshairPriceLines {
    #[must_use]
    pub fn new() -> Self {
        let config = PriceLinesConfig {
            show_x: true,
            color: palette::CROSSHAIR,
            line_style: LineStyle::Dotted,
            pointer_events_none: true,
            ..PriceLinesConfig::default()
        };

        Self {
            lines: PriceLines::new(
                config,
                vec![PriceLineItem::new(CROSSHAIR_ID, ()).with_visible(false)],
            ),
        }
    }

    pub fn mount(&mut self, axis: ChartAxis) -> ChartResult<ReconcileStats> {
        self.lines.mount(axis)
    }

    pub fn sync_axis(&mut self, axis: ChartAxis) -> ChartResult<ReconcileStats> {
        self.lines.sync_axis(axis)
    }

    pub fn set_price_precision(&mut self, price_precision: u32) -> ChartResult<ReconcileStats> {
        self.lines.update(None, Some(price_precision))
    }

    /// Moves the crosshair to a pointer position given in pixels.
    pub fn show(&mut self, x: f64, y: f64) -> ChartResult<ReconcileStats> {
        let x_value = self.lines.invert_x(x)?;
        let y_value = self.lines.invert_y(y)?;
        self.lines.update_item(
            CROSSHAIR_ID,
            PriceLinePatch::new()
                .visible(true)
                .x_value(x_value)
                .y_value(y_value),
        )
    }

    pub fn hide(&mut self) -> ChartResult<ReconcileStats> {
        self.lines
            .update_item(CROSSHAIR_ID, PriceLinePatch::new().visible(false))
    }

    #[must_use]
    pub fn lines(&self) -> &PriceLines<()> {
        &self.lines
    }
}
