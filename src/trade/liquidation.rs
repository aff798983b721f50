use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::trade::{LeverageBracket, Side, TradingOrder, TradingPosition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SizeEntryKind {
    Position,
    Order,
}

/// One contribution to a side's liquidation estimate, built fresh per
/// computation from the current position/order snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeEntry {
    pub kind: SizeEntryKind,
    pub side: Side,
    pub price: f64,
    pub amount: f64,
}

/// Collects the same-side size list: the position entry (if any) plus one
/// entry per same-side open order.
#[must_use]
pub fn size_entries(
    side: Side,
    position: Option<&TradingPosition>,
    orders: &[TradingOrder],
) -> SmallVec<[SizeEntry; 8]> {
    let mut sizes = SmallVec::new();

    if let Some(position) = position {
        if position.side == side {
            sizes.push(SizeEntry {
                kind: SizeEntryKind::Position,
                side,
                price: position.entry_price,
                amount: position.position_amt.abs(),
            });
        }
    }

    for order in orders.iter().filter(|order| order.side == side) {
        sizes.push(SizeEntry {
            kind: SizeEntryKind::Order,
            side,
            price: order.price,
            amount: order.orig_qty.abs(),
        });
    }

    sizes
}

/// Estimates the liquidation price for one side.
///
/// Entries are added worst-case-first (farthest from the liquidation
/// threshold), re-deriving a weighted-average entry price, the accumulated
/// margin and the candidate liquidation price after each addition. Entries
/// at or past the current candidate cannot move it and stop the scan.
///
/// Returns `None` when the side has no size at all. Returns `0.0` when the
/// bracket table is missing or empty ("not yet ready", not an error), so
/// callers must treat `<= 0` distinctly from `None`.
#[must_use]
pub fn estimate_liquidation(
    side: Side,
    position: Option<&TradingPosition>,
    orders: &[TradingOrder],
    brackets: &[LeverageBracket],
    leverage: f64,
) -> Option<f64> {
    let mut sizes = size_entries(side, position, orders);
    if sizes.is_empty() {
        return None;
    }

    let direction = side.direction();

    // Worst-case-first: descending price for longs, ascending for shorts.
    match side {
        Side::Buy => sizes.sort_by_key(|size| std::cmp::Reverse(OrderedFloat(size.price))),
        Side::Sell => sizes.sort_by_key(|size| OrderedFloat(size.price)),
    }

    if brackets.is_empty() {
        return Some(0.0);
    }

    let mut margin = 0.0;
    let mut average_price = 0.0;
    let mut amount = 0.0;
    let mut liquidation = 0.0;

    for size in &sizes {
        if liquidation != 0.0 && direction * size.price <= liquidation * direction {
            break;
        }

        let weighted_total_price = size.price * size.amount + average_price * amount;
        let total_amount = size.amount + amount;

        average_price = weighted_total_price / total_amount;
        margin += size.amount * size.price / leverage;
        amount = total_amount;

        let position_value = direction * amount * average_price;

        let bracket = brackets
            .iter()
            .find(|bracket| bracket.notional_cap > amount * average_price)
            .unwrap_or(&brackets[0]);

        liquidation = (margin + bracket.cum - position_value)
            / (amount * (bracket.maint_margin_ratio - direction));
    }

    Some(liquidation)
}
