use minichart_rs::core::{Candle, ScaleKind, ScaleModel, ScaleType, Viewport, ZoomTransform};

fn candle(time: f64, low: f64, high: f64) -> Candle {
    let mid = (low + high) / 2.0;
    Candle::new(time, mid, high, low, mid, 1.0, "BTCUSDT", "1m").expect("valid candle")
}

fn model(scale_type: ScaleType) -> ScaleModel {
    ScaleModel::new(Viewport::new(300, 200), scale_type, 1_000_000.0).expect("model")
}

#[test]
fn empty_series_x_domain_falls_back_to_epoch_now() {
    let mut model = model(ScaleType::Linear);
    model.recompute_x_domain(&[], 1_000_000.0).expect("x domain");

    assert_eq!(model.x().domain(), (0.0, 1_000_000.0));
}

#[test]
fn x_domain_covers_the_density_tail() {
    let mut model = model(ScaleType::Linear);
    // Width 300 → last 100 candles fit.
    let candles: Vec<Candle> = (0..500)
        .map(|i| candle(i as f64 * 60_000.0, 10.0, 20.0))
        .collect();

    model.recompute_x_domain(&candles, 0.0).expect("x domain");

    let (start, end) = model.x().domain();
    assert_eq!(start, 400.0 * 60_000.0);
    assert_eq!(end, 499.0 * 60_000.0);
}

#[test]
fn empty_visible_window_extent_is_unit_interval() {
    let mut model = model(ScaleType::Linear);
    model.recompute_x_domain(&[], 1_000_000.0).expect("x domain");

    assert_eq!(model.visible_price_extent(&[]), (0.0, 1.0));
}

#[test]
fn y_domain_spans_visible_low_high_envelope() {
    let mut model = model(ScaleType::Linear);
    let candles = vec![
        candle(0.0, 10.0, 20.0),
        candle(60_000.0, 8.0, 18.0),
        candle(120_000.0, 12.0, 30.0),
    ];

    model.recompute_x_domain(&candles, 0.0).expect("x domain");
    assert_eq!(model.visible_price_extent(&candles), (8.0, 30.0));

    model
        .recompute_y_domain(&candles, 2, 0.0, 0.0)
        .expect("y domain");
    assert_eq!(model.y().domain(), (8.0, 30.0));
}

#[test]
fn y_domain_padding_is_rounded_to_price_precision() {
    let mut model = model(ScaleType::Linear);
    let candles = vec![candle(0.0, 10.0, 20.0)];

    model.recompute_x_domain(&candles, 0.0).expect("x domain");
    model
        .recompute_y_domain(&candles, 0, 20.0, 40.0)
        .expect("y domain");

    // Height 200, domain span 10: 20px ≈ 1 price unit up, 40px ≈ 2 down.
    let (min, max) = model.y().domain();
    assert_eq!(max, 21.0);
    assert_eq!(min, 8.0);
}

#[test]
fn symlog_constant_follows_domain_minimum_decade() {
    for (low, expected) in [(5.0, 1.0), (0.5, 0.1), (0.05, 0.01), (0.005, 0.001)] {
        let mut model = model(ScaleType::Log);
        let candles = vec![candle(0.0, low, low * 10.0)];

        model.recompute_x_domain(&candles, 0.0).expect("x domain");
        model
            .recompute_y_domain(&candles, 8, 0.0, 0.0)
            .expect("y domain");

        match model.y().kind() {
            ScaleKind::Symlog { constant } => assert_eq!(constant, expected, "low={low}"),
            ScaleKind::Linear => panic!("expected symlog for log scale type"),
        }
    }
}

#[test]
fn zoomed_window_filters_the_y_envelope() {
    let mut model = model(ScaleType::Linear);
    let candles: Vec<Candle> = (0..100)
        .map(|i| candle(i as f64 * 1000.0, 10.0 + i as f64, 20.0 + i as f64))
        .collect();

    model.recompute_x_domain(&candles, 0.0).expect("x domain");
    // Zoom into the left half of the visible window.
    model
        .set_zoom(ZoomTransform::new(2.0, 0.0, 0.0))
        .expect("zoom");

    let (_, window_end) = model.scaled_x().domain();
    let (full_start, full_end) = model.x().domain();
    assert!(window_end < full_end);
    assert!(window_end > full_start);

    let (min, max) = model.visible_price_extent(&candles);
    let full_max = 20.0 + 99.0;
    assert!(max < full_max);
    assert!(min >= 10.0);
}

#[test]
fn percent_labels_are_relative_to_window_minimum() {
    let mut model = model(ScaleType::Linear);
    let candles = vec![candle(0.0, 100.0, 110.0), candle(60_000.0, 100.0, 120.0)];

    model.recompute_x_domain(&candles, 0.0).expect("x domain");

    assert_eq!(model.percent_tick_label(100.0, &candles), "0.0%");
    assert_eq!(model.percent_tick_label(110.0, &candles), "10.0%");
    assert_eq!(model.percent_tick_label(95.0, &candles), "-5.0%");
}

#[test]
fn resize_updates_both_pixel_ranges() {
    let mut model = model(ScaleType::Linear);
    model.resize(Viewport::new(600, 400)).expect("resize");

    assert_eq!(model.x().range(), (0.0, 600.0));
    assert_eq!(model.y().height(), 400.0);
}
