use std::cell::RefCell;
use std::rc::Rc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use minichart_rs::api::{AlertLogItem, ChartUpdate, Minichart, MinichartConfig, MinichartHandlers, VolumeAnomalyConfig};
use minichart_rs::core::{Candle, ChartType, ScaleType, Viewport, ZoomTransform};
use minichart_rs::lines::{AlertItem, AlertKind};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

fn candle(time: f64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle::new(time, open, high, low, close, volume, "BTCUSDT", "1m").expect("valid candle")
}

fn series(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let open = if i == 0 { *close } else { closes[i - 1] };
            let high = open.max(*close) + 1.0;
            let low = open.min(*close) - 1.0;
            candle(i as f64 * 60_000.0, open, high, low, *close, 10.0)
        })
        .collect()
}

fn test_config() -> MinichartConfig {
    MinichartConfig {
        // Keep transforms on the calling thread so tests stay deterministic.
        use_transform_worker: false,
        ..MinichartConfig::default()
    }
}

fn chart_with(config: MinichartConfig) -> Minichart {
    Minichart::new(
        Viewport::new(300, 200),
        config,
        MinichartHandlers::default(),
        t0(),
    )
    .expect("chart")
}

#[test]
fn empty_chart_renders_placeholder_domains() {
    let mut chart = chart_with(test_config());
    chart.update(ChartUpdate::default(), t0()).expect("update");

    let (x_start, x_end) = chart.scales().x().domain();
    assert_eq!(x_start, 0.0);
    assert_eq!(x_end, t0().timestamp_millis() as f64);
    assert!(chart.candle_paths().bodies_up.is_empty());
    assert!(!chart.axes_frame().y_ticks.is_empty());
}

#[test]
fn candle_update_draws_plot_axes_grid_and_price_line() {
    let mut chart = chart_with(test_config());
    let candles = series(&[100.0, 101.0, 102.0, 101.5]);

    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");

    let paths = chart.candle_paths();
    assert!(!paths.bodies_up.is_empty() || !paths.last_body_down.is_empty());
    assert!(!chart.axes_frame().x_ticks.is_empty());
    assert!(!chart.grid_frame().y_lines.is_empty());

    let last_price_item = &chart.current_price_lines().lines().items()[0];
    assert_eq!(last_price_item.y_value, Some(101.5));
}

#[test]
fn heikin_ashi_chart_type_feeds_transformed_candles_to_the_plot() {
    let mut chart = chart_with(test_config());
    let candles = series(&[100.0, 110.0, 105.0, 120.0]);

    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                chart_type: Some(ChartType::HeikinAshiActualPrice),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");

    // The current-price line still tracks the raw close.
    let last_price_item = &chart.current_price_lines().lines().items()[0];
    assert_eq!(last_price_item.y_value, Some(120.0));
}

#[test]
fn zoom_gesture_filter_requires_shift_for_wheel() {
    assert!(Minichart::accepts_zoom_gesture(true, true));
    assert!(!Minichart::accepts_zoom_gesture(true, false));
    assert!(Minichart::accepts_zoom_gesture(false, false));
}

#[test]
fn apply_zoom_rescales_the_visible_window() {
    let mut chart = chart_with(test_config());
    let candles = series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");

    let before = chart.scales().scaled_x().domain();
    chart
        .apply_zoom(ZoomTransform::new(2.0, 0.0, 0.0), t0())
        .expect("zoom");
    let after = chart.scales().scaled_x().domain();

    assert!(after.1 - after.0 < before.1 - before.0);
}

#[test]
fn resize_is_debounced_until_tick() {
    let mut chart = chart_with(test_config());
    let candles = series(&[100.0, 101.0]);
    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");

    chart.request_resize(Viewport::new(600, 400), t0());
    assert_eq!(chart.scales().y().height(), 200.0);

    // Within the debounce window nothing happens.
    chart.tick(t0() + Duration::milliseconds(100)).expect("tick");
    assert_eq!(chart.scales().y().height(), 200.0);

    // Past the window the resize applies.
    chart.tick(t0() + Duration::milliseconds(600)).expect("tick");
    assert_eq!(chart.scales().y().height(), 400.0);
    assert_eq!(chart.scales().x().range(), (0.0, 600.0));
}

#[test]
fn alert_cross_fires_callbacks_and_persists_the_list() {
    let updates: Rc<RefCell<Vec<Vec<AlertItem>>>> = Rc::default();
    let log: Rc<RefCell<Vec<AlertLogItem>>> = Rc::default();

    let handlers = MinichartHandlers {
        on_update_alerts: Some(Box::new({
            let updates = updates.clone();
            move |alerts: &[AlertItem]| updates.borrow_mut().push(alerts.to_vec())
        })),
        on_alert: Some(Box::new({
            let log = log.clone();
            move |item: &AlertLogItem| log.borrow_mut().push(item.clone())
        })),
    };

    let mut chart = Minichart::new(Viewport::new(300, 200), test_config(), handlers, t0())
        .expect("chart");

    let below = series(&[98.0, 99.0]);
    chart
        .update(
            ChartUpdate {
                candles: Some(&below),
                alerts: Some(&[AlertItem::pending(100.0)]),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");
    assert!(log.borrow().is_empty());

    let above = series(&[98.0, 101.0]);
    chart
        .update(
            ChartUpdate {
                candles: Some(&above),
                ..ChartUpdate::default()
            },
            t0() + Duration::seconds(1),
        )
        .expect("update");

    let log = log.borrow();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].kind, AlertKind::PriceUp);
    assert_eq!(log[0].symbol, "BTCUSDT");
    assert_eq!(log[0].price, 101.0);

    let updates = updates.borrow();
    let last = updates.last().expect("alert list emitted");
    assert!(last[0].triggered_time.is_some());
}

#[test]
fn volume_anomaly_flags_once_per_bucket() {
    let log: Rc<RefCell<Vec<AlertLogItem>>> = Rc::default();
    let handlers = MinichartHandlers {
        on_update_alerts: None,
        on_alert: Some(Box::new({
            let log = log.clone();
            move |item: &AlertLogItem| log.borrow_mut().push(item.clone())
        })),
    };

    let config = MinichartConfig {
        volume_anomaly: Some(VolumeAnomalyConfig {
            ratio: 3.0,
            window: 3,
        }),
        ..test_config()
    };
    let mut chart =
        Minichart::new(Viewport::new(300, 200), config, handlers, t0()).expect("chart");

    let mut candles = series(&[100.0, 101.0, 102.0, 103.0, 104.0]);
    candles.last_mut().expect("non-empty").volume = 100.0;

    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");
    assert_eq!(log.borrow().len(), 1);
    assert_eq!(log.borrow()[0].kind, AlertKind::VolumeAnomaly);

    // The same candle bucket must not flag twice.
    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                ..ChartUpdate::default()
            },
            t0() + Duration::seconds(1),
        )
        .expect("update");
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn scale_type_switch_rebuilds_the_price_scale() {
    let mut chart = chart_with(test_config());
    let candles = series(&[0.5, 0.6, 0.55]);

    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                scale_type: Some(ScaleType::Log),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");

    // Sub-unit prices get a lowered symlog constant.
    match chart.scales().y().kind() {
        minichart_rs::core::ScaleKind::Symlog { constant } => assert!(constant < 1.0),
        minichart_rs::core::ScaleKind::Linear => panic!("expected symlog price scale"),
    }
}

#[test]
fn crosshair_follows_pointer_and_hides_on_leave() {
    let mut chart = chart_with(test_config());
    let candles = series(&[100.0, 101.0]);
    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");

    chart.pointer_move(150.0, 100.0).expect("move");
    let node = &chart.crosshair_lines().lines().nodes()["crosshair"];
    assert!(node.visible);

    chart.pointer_leave().expect("leave");
    let node = &chart.crosshair_lines().lines().nodes()["crosshair"];
    assert!(!node.visible);
}

#[test]
fn context_click_creates_an_alert_line() {
    let updates: Rc<RefCell<Vec<Vec<AlertItem>>>> = Rc::default();
    let handlers = MinichartHandlers {
        on_update_alerts: Some(Box::new({
            let updates = updates.clone();
            move |alerts: &[AlertItem]| updates.borrow_mut().push(alerts.to_vec())
        })),
        on_alert: None,
    };
    let mut chart = Minichart::new(Viewport::new(300, 200), test_config(), handlers, t0())
        .expect("chart");
    let candles = series(&[100.0, 101.0]);
    chart
        .update(
            ChartUpdate {
                candles: Some(&candles),
                ..ChartUpdate::default()
            },
            t0(),
        )
        .expect("update");

    chart.context_click(100.0, t0()).expect("context click");

    assert_eq!(chart.alert_lines().lines().items().len(), 1);
    assert_eq!(updates.borrow().len(), 1);
}

#[test]
fn container_viewport_reserves_axis_gutters() {
    let chart = chart_with(test_config());

    // Default margins: top 0, right 55, bottom 30, left -1.
    let viewport = chart.container_viewport(400.0, 230.0);
    assert_eq!(viewport, Viewport::new(346, 200));

    // Collapsed containers clamp to the 10px floor.
    let collapsed = chart.container_viewport(20.0, 5.0);
    assert_eq!(collapsed, Viewport::new(10, 10));
}

#[test]
fn config_round_trips_through_serde() {
    let config = MinichartConfig {
        chart_type: ChartType::HeikinAshi,
        scale_type: ScaleType::Log,
        price_precision: 4,
        percent_scale: true,
        volume_anomaly: Some(VolumeAnomalyConfig {
            ratio: 2.5,
            window: 10,
        }),
        ..MinichartConfig::default()
    };

    let json = config.to_json_pretty().expect("serialize");
    let parsed = MinichartConfig::from_json_str(&json).expect("deserialize");
    assert_eq!(parsed, config);

    // Defaults fill omitted fields.
    let minimal = MinichartConfig::from_json_str("{}").expect("deserialize empty");
    assert_eq!(minimal, MinichartConfig::default());

    assert!(MinichartConfig::from_json_str("{\"alert_sweep_interval_ms\": -5}").is_err());
}
