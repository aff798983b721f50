use crate::error::ChartResult;
use crate::lines::engine::{
    ChartAxis, PriceLineItem, PriceLinePatch, PriceLines, PriceLinesConfig, ReconcileStats,
    TitleVisibility,
};
use crate::lines::palette;
use crate::trade::{Side, TradingPosition};

const LIQUIDATION_ID: &str = "liquidation";
const POSITION_ID: &str = "position";

/// Fixed pair of lines for the open position: its entry price and the
/// exchange-reported liquidation price. Both hidden while flat.
pub struct PositionPriceLines {
    lines: PriceLines<()>,
}

impl Default for PositionPriceLines {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionPriceLines {
    #[must_use]
    pub fn new() -> Self {
        let config = PriceLinesConfig {
            title_visibility: TitleVisibility::Always,
            is_background_fill: true,
            ..PriceLinesConfig::default()
        };

        let items = vec![
            PriceLineItem::new(LIQUIDATION_ID, ())
                .with_visible(false)
                .with_title("Pos. liquidation")
                .with_title_visibility(TitleVisibility::OnHover)
                .with_color(palette::LIQUIDATION),
            PriceLineItem::new(POSITION_ID, ()).with_visible(false),
        ];

        Self {
            lines: PriceLines::new(config, items),
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

    #[must_use]
    pub fn lines(&self) -> &PriceLines<()> {
        &self.lines
    }

    /// Shows or hides the pair for the current position snapshot.
    pub fn update_position(&mut self, position: Option<&TradingPosition>) -> ChartResult<()> {
        let Some(position) = position else {
            self.lines
                .update_item(POSITION_ID, PriceLinePatch::new().visible(false))?;
            self.lines
                .update_item(LIQUIDATION_ID, PriceLinePatch::new().visible(false))?;
            return Ok(());
        };

        let color = if position.is_closed {
            palette::CANCELED
        } else {
            match position.side {
                Side::Buy => palette::BUY,
                Side::Sell => palette::SELL,
            }
        };

        self.lines.update_item(
            POSITION_ID,
            PriceLinePatch::new()
                .visible(true)
                .y_value(position.entry_price)
                .color(color)
                .title(format!("{} {}", position.position_amt, position.base_asset))
                .opacity(if position.is_closed { 0.8 } else { 1.0 }),
        )?;

        self.lines.update_item(
            LIQUIDATION_ID,
            PriceLinePatch::new()
                .visible(true)
                .y_value(position.liquidation_price),
        )?;
        Ok(())
    }
}
