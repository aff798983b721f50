use crate::error::ChartResult;
use crate::lines::engine::{ChartAxis, PriceLineItem, PriceLinePatch, PriceLines, PriceLinesConfig, ReconcileStats};
use crate::lines::palette;

const LAST_PRICE_ID: &str = "lastPrice";

/// Single non-draggable line tracking the last traded price.
pub struct CurrentPriceLines {
    lines: PriceLines<()>,
}

impl Default for CurrentPriceLines {
    fn default() -> Self {
        Self::new()
    }
}

impl CurrentPriceLines {
    #[must_use]
    pub fn new() -> Self {
        let config = PriceLinesConfig {
            color: palette::LAST_PRICE,
            pointer_events_none: true,
            ..PriceLinesConfig::default()
        };

        Self {
            lines: PriceLines::new(config, vec![PriceLineItem::new(LAST_PRICE_ID, ())]),
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

    /// Repositions the line, skipping the redraw when the price is unchanged.
    pub fn update_price(&mut self, last_price: f64) -> ChartResult<ReconcileStats> {
        if self.lines.items()[0].y_value == Some(last_price) {
            return Ok(ReconcileStats::default());
        }
        self.lines
            .update_item(LAST_PRICE_ID, PriceLinePatch::new().y_value(last_price))
    }

    #[must_use]
    pub fn lines(&self) -> &PriceLines<()> {
        &self.lines
    }
}
