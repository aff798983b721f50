use minichart_rs::core::{PriceScale, ScaleKind, TimeScale};
use minichart_rs::lines::{ChartAxis, LiquidationPriceLines, OrderPriceLines, PositionPriceLines};
use minichart_rs::trade::{LeverageBracket, Side, TradingOrder, TradingPosition};

fn axis() -> ChartAxis {
    ChartAxis {
        x: TimeScale::new(0.0, 1000.0, 500.0).expect("time scale"),
        y: PriceScale::new(0.0, 200.0, 500.0, ScaleKind::Linear).expect("price scale"),
    }
}

fn order(id: &str, side: Side, price: f64) -> TradingOrder {
    TradingOrder {
        client_order_id: id.to_owned(),
        symbol: String::from("ETHUSDT"),
        side,
        price,
        stop_price: None,
        orig_qty: 2.0,
        executed_qty: 0.5,
        leverage: 10.0,
        is_canceled: false,
    }
}

fn long_position() -> TradingPosition {
    TradingPosition {
        symbol: String::from("ETHUSDT"),
        base_asset: String::from("ETH"),
        side: Side::Buy,
        entry_price: 100.0,
        position_amt: 1.5,
        liquidation_price: 91.0,
        leverage: 10.0,
        is_closed: false,
    }
}

#[test]
fn order_lines_render_limit_and_stop_levels() {
    let mut lines = OrderPriceLines::new();
    lines.mount(axis()).expect("mount");

    let mut with_stop = order("o1", Side::Buy, 90.0);
    with_stop.stop_price = Some(85.0);
    let orders = vec![with_stop, order("o2", Side::Sell, 120.0)];

    lines.update_orders(Some(&orders)).expect("update");

    let items = lines.lines().items();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "o1");
    assert_eq!(items[0].y_value, Some(90.0));
    assert_eq!(items[0].title, "Limit 1.5 ETH");
    assert!(!items[0].is_draggable);
    assert_eq!(items[1].id, "o2");
    assert_eq!(items[2].id, "o1_stop");
    assert_eq!(items[2].y_value, Some(85.0));
    assert_eq!(items[2].title, "Stop price");
}

#[test]
fn canceled_orders_render_dimmed_and_inert() {
    let mut lines = OrderPriceLines::new();
    lines.mount(axis()).expect("mount");

    let mut canceled = order("o1", Side::Buy, 90.0);
    canceled.is_canceled = true;
    lines.update_orders(Some(&[canceled])).expect("update");

    let node = &lines.lines().nodes()["o1"];
    assert_eq!(node.opacity, 0.8);
    assert!(!node.pointer_events_enabled);
}

#[test]
fn no_orders_clears_the_collection() {
    let mut lines = OrderPriceLines::new();
    lines.mount(axis()).expect("mount");

    lines
        .update_orders(Some(&[order("o1", Side::Buy, 90.0)]))
        .expect("update");
    assert_eq!(lines.lines().items().len(), 1);

    lines.update_orders(None).expect("update");
    assert!(lines.lines().items().is_empty());
}

#[test]
fn forced_price_overrides_until_cleared() {
    let mut lines = OrderPriceLines::new();
    lines.mount(axis()).expect("mount");

    lines.force_price("o1", 95.0);
    lines
        .update_orders(Some(&[order("o1", Side::Buy, 90.0)]))
        .expect("update");
    assert_eq!(lines.lines().items()[0].y_value, Some(95.0));

    lines.clear_forced_price("o1");
    lines
        .update_orders(Some(&[order("o1", Side::Buy, 90.0)]))
        .expect("update");
    assert_eq!(lines.lines().items()[0].y_value, Some(90.0));
}

#[test]
fn position_lines_toggle_with_the_position() {
    let mut lines = PositionPriceLines::new();
    lines.mount(axis()).expect("mount");

    assert!(!lines.lines().nodes()["position"].visible);
    assert!(!lines.lines().nodes()["liquidation"].visible);

    lines
        .update_position(Some(&long_position()))
        .expect("update");

    let position_node = &lines.lines().nodes()["position"];
    assert!(position_node.visible);
    assert_eq!(position_node.title, "1.5 ETH");

    let liquidation_node = &lines.lines().nodes()["liquidation"];
    assert!(liquidation_node.visible);

    let items = lines.lines().items();
    assert_eq!(items.iter().find(|i| i.id == "position").and_then(|i| i.y_value), Some(100.0));
    assert_eq!(
        items.iter().find(|i| i.id == "liquidation").and_then(|i| i.y_value),
        Some(91.0)
    );

    lines.update_position(None).expect("update");
    assert!(!lines.lines().nodes()["position"].visible);
    assert!(!lines.lines().nodes()["liquidation"].visible);
}

#[test]
fn closed_positions_render_dimmed() {
    let mut lines = PositionPriceLines::new();
    lines.mount(axis()).expect("mount");

    let mut closed = long_position();
    closed.is_closed = true;
    lines.update_position(Some(&closed)).expect("update");

    assert_eq!(lines.lines().nodes()["position"].opacity, 0.8);
}

#[test]
fn liquidation_lines_follow_the_estimator() {
    let mut lines = LiquidationPriceLines::new();
    lines.mount(axis()).expect("mount");

    assert!(!lines.lines().nodes()["BUY"].visible);
    assert!(!lines.lines().nodes()["SELL"].visible);

    lines
        .set_leverage_brackets(&[LeverageBracket {
            notional_cap: 1e9,
            cum: 0.0,
            maint_margin_ratio: 0.01,
        }])
        .expect("brackets");
    lines
        .set_position(Some(&long_position()))
        .expect("position");

    let buy_node = &lines.lines().nodes()["BUY"];
    assert!(buy_node.visible);

    let buy_value = lines
        .lines()
        .items()
        .iter()
        .find(|i| i.id == "BUY")
        .and_then(|i| i.y_value)
        .expect("buy estimate");
    assert!(buy_value > 0.0 && buy_value < 100.0);

    // No short-side size: the SELL line stays hidden.
    assert!(!lines.lines().nodes()["SELL"].visible);

    lines.set_position(None).expect("position");
    assert!(!lines.lines().nodes()["BUY"].visible);
}

#[test]
fn liquidation_without_brackets_shows_the_degenerate_zero() {
    let mut lines = LiquidationPriceLines::new();
    lines.mount(axis()).expect("mount");

    lines
        .set_position(Some(&long_position()))
        .expect("position");

    // Bracket table not loaded yet: the line is visible at the 0 sentinel.
    let buy = lines
        .lines()
        .items()
        .iter()
        .find(|i| i.id == "BUY")
        .expect("buy line");
    assert!(buy.is_visible);
    assert_eq!(buy.y_value, Some(0.0));
}
