use crate::error::ChartResult;
use crate::lines::engine::{
    ChartAxis, PriceLineItem, PriceLinePatch, PriceLines, PriceLinesConfig, ReconcileStats,
    TitleVisibility,
};
use crate::lines::palette;
use crate::render::primitives::LineStyle;
use crate::trade::{LeverageBracket, Side, TradingOrder, TradingPosition, estimate_liquidation};

const BUY_ID: &str = "BUY";
const SELL_ID: &str = "SELL";

/// Estimated liquidation lines, one fixed line per side.
///
/// Driven by the incremental estimator in [`crate::trade::liquidation`];
/// a side with no size hides its line.
pub struct LiquidationPriceLines {
    lines: PriceLines<()>,
    orders: Vec<TradingOrder>,
    position: Option<TradingPosition>,
    brackets: Vec<LeverageBracket>,
    leverage: f64,
}

impl Default for LiquidationPriceLines {
    fn default() -> Self {
        Self::new()
    }
}

impl LiquidationPriceLines {
    #[must_use]
    pub fn new() -> Self {
        let config = PriceLinesConfig {
            color: palette::LIQUIDATION,
            title_visibility: TitleVisibility::OnHover,
            ..PriceLinesConfig::default()
        };

        let items = vec![
            PriceLineItem::new(BUY_ID, ())
                .with_visible(false)
                .with_line_style(LineStyle::Dashed)
                .with_title("Buy liquidation"),
            PriceLineItem::new(SELL_ID, ())
                .with_visible(false)
                .with_line_style(LineStyle::Dashed)
                .with_title("Sell liquidation"),
        ];

        Self {
            lines: PriceLines::new(config, items),
            orders: Vec::new(),
            position: None,
            brackets: Vec::new(),
            leverage: 1.0,
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

    pub fn set_orders(&mut self, orders: Option<&[TradingOrder]>) -> ChartResult<()> {
        self.orders = orders.map(<[_]>::to_vec).unwrap_or_default();
        if let Some(first) = self.orders.first() {
            self.leverage = first.leverage;
        }
        self.recompute()
    }

    pub fn set_position(&mut self, position: Option<&TradingPosition>) -> ChartResult<()> {
        self.position = position.cloned();
        if let Some(position) = &self.position {
            self.leverage = position.leverage;
        }
        self.recompute()
    }

    pub fn set_leverage_brackets(&mut self, brackets: &[LeverageBracket]) -> ChartResult<()> {
        self.brackets = brackets.to_vec();
        self.recompute()
    }

    fn recompute(&mut self) -> ChartResult<()> {
        for (id, side) in [(BUY_ID, Side::Buy), (SELL_ID, Side::Sell)] {
            let estimate = estimate_liquidation(
                side,
                self.position.as_ref(),
                &self.orders,
                &self.brackets,
                self.leverage,
            );

            self.lines.update_item(
                id,
                PriceLinePatch::new()
                    .visible(estimate.is_some())
                    .y_value(estimate.unwrap_or(0.0)),
            )?;
        }
        Ok(())
    }
}
