pub mod alert;
pub mod crosshair;
pub mod current_price;
pub mod engine;
pub mod liquidation;
pub mod order;
pub mod position;

pub use alert::{AlertItem, AlertKind, AlertPriceLines};
pub use crosshair::CrosshairPriceLines;
pub use current_price::CurrentPriceLines;
pub use engine::{
    ChartAxis, GestureOrigin, LineHandler, LineHooks, LineKey, LineNode, Orient, PriceLineItem,
    PriceLinePatch, PriceLines, PriceLinesConfig, ReconcileStats, TitleVisibility,
    label_background_path,
};
pub use liquidation::LiquidationPriceLines;
pub use order::OrderPriceLines;
pub use position::PositionPriceLines;

use crate::render::primitives::Color;

/// Line palette shared by the specialized collections.
pub mod palette {
    use super::Color;

    pub const LAST_PRICE: Color = Color::from_u8(0x0d, 0xca, 0xf0);
    pub const CROSSHAIR: Color = Color::from_u8(0x0d, 0xca, 0xf0);
    pub const ALERT: Color = Color::from_u8(0x82, 0x82, 0x82);
    pub const LIQUIDATION: Color = Color::from_u8(0xdc, 0x35, 0x45);
    pub const BUY: Color = Color::from_u8(0x30, 0xb3, 0x32);
    pub const SELL: Color = Color::from_u8(0xab, 0x25, 0x7c);
    pub const STOP_BUY: Color = Color::from_u8(0x5a, 0xd8, 0x5c);
    pub const STOP_SELL: Color = Color::from_u8(0xd8, 0x5c, 0xa8);
    pub const CANCELED: Color = Color::from_u8(0x6c, 0x75, 0x7d);
}
