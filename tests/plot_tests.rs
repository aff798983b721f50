use minichart_rs::core::{Candle, ChartType, ScaleModel, ScaleType, Viewport, ZoomTransform};
use minichart_rs::render::PlotRenderer;

fn candle(time: f64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle::new(time, open, high, low, close, 1.0, "BTCUSDT", "1m").expect("valid candle")
}

fn model_with(candles: &[Candle]) -> ScaleModel {
    let mut model =
        ScaleModel::new(Viewport::new(300, 200), ScaleType::Linear, 1_000_000.0).expect("model");
    model.recompute_x_domain(candles, 1_000_000.0).expect("x");
    model.recompute_y_domain(candles, 2, 0.0, 0.0).expect("y");
    model
}

#[test]
fn body_width_step_function_matches_contract() {
    let cases = [(0.2, 1.0), (0.5, 1.5), (1.0, 2.0), (2.0, 3.0), (4.0, 4.0)];
    for (zoom_k, expected) in cases {
        assert_eq!(PlotRenderer::body_width(zoom_k), expected, "k={zoom_k}");
    }
}

#[test]
fn draw_with_no_candles_is_a_no_op() {
    let mut plot = PlotRenderer::new();
    let model = model_with(&[]);

    let redrew = plot
        .draw(&[], &model, ChartType::Candlestick)
        .expect("draw");
    assert!(!redrew);
    assert!(plot.paths().bodies_up.is_empty());
    assert!(plot.paths().last_body_up.is_empty());
}

#[test]
fn live_candle_renders_separately_from_history() {
    let candles = vec![
        candle(0.0, 10.0, 20.0, 5.0, 15.0),
        candle(60_000.0, 15.0, 30.0, 10.0, 12.0),
    ];
    let model = model_with(&candles);
    let mut plot = PlotRenderer::new();

    let redrew = plot
        .draw(&candles, &model, ChartType::Candlestick)
        .expect("draw");
    assert!(redrew);

    let paths = plot.paths();
    // First candle is bullish history, last candle is a bearish live element.
    assert!(paths.bodies_up.starts_with('M'));
    assert!(paths.bodies_down.is_empty());
    assert!(paths.last_body_down.starts_with('M'));
    assert!(paths.last_body_up.is_empty());
    assert!(paths.wicks_up.contains('v'));
    assert!(paths.last_wick_down.contains('v'));
}

#[test]
fn unchanged_inputs_skip_the_historical_redraw() {
    let candles = vec![
        candle(0.0, 10.0, 20.0, 5.0, 15.0),
        candle(60_000.0, 15.0, 30.0, 10.0, 25.0),
    ];
    let model = model_with(&candles);
    let mut plot = PlotRenderer::new();

    assert!(
        plot.draw(&candles, &model, ChartType::Candlestick)
            .expect("draw")
    );
    assert!(
        !plot
            .draw(&candles, &model, ChartType::Candlestick)
            .expect("draw")
    );
}

#[test]
fn live_price_change_updates_only_the_live_paths() {
    let mut candles = vec![
        candle(0.0, 10.0, 20.0, 5.0, 15.0),
        candle(60_000.0, 15.0, 30.0, 10.0, 25.0),
    ];
    let model = model_with(&candles);
    let mut plot = PlotRenderer::new();
    plot.draw(&candles, &model, ChartType::Candlestick)
        .expect("draw");
    let history_before = plot.paths().bodies_up.clone();
    let live_before = plot.paths().last_body_up.clone();

    // Stream a new close into the open bucket; the y-domain is kept fixed.
    candles[1].close = 26.0;
    let redrew = plot
        .draw(&candles, &model, ChartType::Candlestick)
        .expect("draw");

    assert!(!redrew);
    assert_eq!(plot.paths().bodies_up, history_before);
    assert_ne!(plot.paths().last_body_up, live_before);
}

#[test]
fn memo_guard_reacts_to_zoom_chart_type_and_new_buckets() {
    let candles = vec![
        candle(0.0, 10.0, 20.0, 5.0, 15.0),
        candle(60_000.0, 15.0, 30.0, 10.0, 25.0),
    ];
    let mut model = model_with(&candles);
    let mut plot = PlotRenderer::new();
    plot.draw(&candles, &model, ChartType::Candlestick)
        .expect("draw");

    // Zoom change forces a historical redraw.
    model
        .set_zoom(ZoomTransform::new(2.0, -10.0, 0.0))
        .expect("zoom");
    assert!(
        plot.draw(&candles, &model, ChartType::Candlestick)
            .expect("draw")
    );

    // Chart type change forces another.
    assert!(
        plot.draw(&candles, &model, ChartType::HeikinAshi)
            .expect("draw")
    );

    // A new interval bucket (new last time) forces another.
    let mut extended = candles.clone();
    extended.push(candle(120_000.0, 25.0, 35.0, 20.0, 30.0));
    assert!(
        plot.draw(&extended, &model, ChartType::HeikinAshi)
            .expect("draw")
    );
}

#[test]
fn body_path_emits_closed_rectangle_commands() {
    let candles = vec![candle(0.0, 10.0, 20.0, 5.0, 15.0)];
    let model = model_with(&candles);
    let mut plot = PlotRenderer::new();
    plot.draw(&candles, &model, ChartType::Candlestick)
        .expect("draw");

    let live = &plot.paths().last_body_up;
    assert!(live.starts_with('M'));
    assert!(live.contains('h'));
    assert!(live.contains('v'));
    assert!(live.ends_with('z'));

    let wick = &plot.paths().last_wick_up;
    assert!(wick.starts_with('M'));
    assert!(wick.contains(" v"));
}
