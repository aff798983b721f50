pub mod liquidation;

use serde::{Deserialize, Serialize};

pub use liquidation::{SizeEntry, SizeEntryKind, estimate_liquidation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Sign convention used throughout liquidation math: long +1, short -1.
    #[must_use]
    pub fn direction(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

/// Open futures order as handed over by the host trading platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingOrder {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub price: f64,
    pub stop_price: Option<f64>,
    pub orig_qty: f64,
    pub executed_qty: f64,
    pub leverage: f64,
    pub is_canceled: bool,
}

/// Open futures position as handed over by the host trading platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPosition {
    pub symbol: String,
    pub base_asset: String,
    pub side: Side,
    pub entry_price: f64,
    /// Signed position size; the sign duplicates `side`.
    pub position_amt: f64,
    pub liquidation_price: f64,
    pub leverage: f64,
    pub is_closed: bool,
}

/// One tier of the exchange's leverage bracket table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeverageBracket {
    pub notional_cap: f64,
    pub cum: f64,
    pub maint_margin_ratio: f64,
}
