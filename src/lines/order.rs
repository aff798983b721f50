use std::collections::HashMap;

use crate::error::ChartResult;
use crate::lines::engine::{
    ChartAxis, PriceLineItem, PriceLines, PriceLinesConfig, ReconcileStats, TitleVisibility,
};
use crate::lines::palette;
use crate::trade::{Side, TradingOrder};

/// One line per open order's limit price plus one per stop price.
///
/// Orders are externally managed, so the lines are never draggable. A
/// transient "forced price" can be retained per order id right after a drag
/// in the host UI so the line does not snap back before the exchange echoes
/// the updated order.
pub struct OrderPriceLines {
    lines: PriceLines<Option<TradingOrder>>,
    forced_prices: HashMap<String, f64>,
}

impl Default for OrderPriceLines {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderPriceLines {
    #[must_use]
    pub fn new() -> Self {
        let config = PriceLinesConfig {
            title_visibility: TitleVisibility::Always,
            is_background_fill: true,
            ..PriceLinesConfig::default()
        };

        Self {
            lines: PriceLines::new(config, Vec::new()),
            forced_prices: HashMap::new(),
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
    pub fn lines(&self) -> &PriceLines<Option<TradingOrder>> {
        &self.lines
    }

    /// Pins an order line at a just-dragged price until the next update that
    /// carries the order's real price.
    pub fn force_price(&mut self, order_id: impl Into<String>, price: f64) {
        self.forced_prices.insert(order_id.into(), price);
    }

    pub fn clear_forced_price(&mut self, order_id: &str) {
        self.forced_prices.remove(order_id);
    }

    /// Rebuilds the line set from the current order snapshot.
    pub fn update_orders(&mut self, orders: Option<&[TradingOrder]>) -> ChartResult<ReconcileStats> {
        let orders = orders.unwrap_or_default();

        let mut items: Vec<PriceLineItem<Option<TradingOrder>>> =
            Vec::with_capacity(orders.len() * 2);

        for order in orders {
            let color = if order.is_canceled {
                palette::CANCELED
            } else {
                match order.side {
                    Side::Buy => palette::BUY,
                    Side::Sell => palette::SELL,
                }
            };
            let y_value = self
                .forced_prices
                .get(&order.client_order_id)
                .copied()
                .unwrap_or(order.price);

            items.push(
                PriceLineItem::new(order.client_order_id.clone(), Some(order.clone()))
                    .with_y_value(y_value)
                    .with_color(color)
                    .with_opacity(if order.is_canceled { 0.8 } else { 1.0 })
                    .with_title(format!(
                        "Limit {} {}",
                        order.orig_qty - order.executed_qty,
                        base_asset_of(&order.symbol),
                    ))
                    .with_pointer_events_none(order.is_canceled),
            );
        }

        for order in orders {
            let Some(stop_price) = order.stop_price else {
                continue;
            };
            items.push(
                PriceLineItem::new(format!("{}_stop", order.client_order_id), None)
                    .with_y_value(stop_price)
                    .with_color(match order.side {
                        Side::Buy => palette::STOP_BUY,
                        Side::Sell => palette::STOP_SELL,
                    })
                    .with_title("Stop price"),
            );
        }

        self.lines.update(Some(items), None)
    }
}

// TODO BNB/BUSD-style pairs need the exchange's asset metadata instead of a
// suffix strip; the symbol alone is ambiguous for them.
fn base_asset_of(symbol: &str) -> &str {
    symbol.strip_suffix("USDT").unwrap_or(symbol)
}
