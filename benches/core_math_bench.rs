use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use minichart_rs::core::transform::{heikin_ashi, heikin_ashi_actual_price};
use minichart_rs::core::{Candle, ChartType, ScaleModel, ScaleType, Viewport};
use minichart_rs::render::PlotRenderer;
use minichart_rs::trade::{LeverageBracket, Side, TradingOrder, estimate_liquidation};

fn series(len: usize) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let base = 100.0 + ((i * 37) % 50) as f64 / 10.0;
            Candle::new(
                i as f64 * 60_000.0,
                base,
                base + 1.5,
                base - 1.5,
                base + if i % 2 == 0 { 0.7 } else { -0.7 },
                10.0 + (i % 13) as f64,
                "BTCUSDT",
                "1m",
            )
            .expect("valid candle")
        })
        .collect()
}

fn bench_transforms(c: &mut Criterion) {
    let candles = series(5000);

    c.bench_function("heikin_ashi_5000", |b| {
        b.iter(|| heikin_ashi(black_box(&candles)))
    });
    c.bench_function("heikin_ashi_actual_price_5000", |b| {
        b.iter(|| heikin_ashi_actual_price(black_box(&candles)))
    });
}

fn bench_plot_paths(c: &mut Criterion) {
    let candles = series(2000);
    let mut model =
        ScaleModel::new(Viewport::new(1920, 1080), ScaleType::Linear, 0.0).expect("model");
    model.recompute_x_domain(&candles, 0.0).expect("x domain");
    model
        .recompute_y_domain(&candles, 2, 65.0, 20.0)
        .expect("y domain");

    c.bench_function("plot_full_redraw_2000", |b| {
        b.iter(|| {
            let mut plot = PlotRenderer::new();
            plot.draw(black_box(&candles), &model, ChartType::Candlestick)
                .expect("draw")
        })
    });
}

fn bench_liquidation(c: &mut Criterion) {
    let orders: Vec<TradingOrder> = (0..64)
        .map(|i| TradingOrder {
            client_order_id: format!("o{i}"),
            symbol: String::from("BTCUSDT"),
            side: Side::Buy,
            price: 100.0 - i as f64 * 0.5,
            stop_price: None,
            orig_qty: 1.0 + (i % 5) as f64,
            executed_qty: 0.0,
            leverage: 10.0,
            is_canceled: false,
        })
        .collect();
    let brackets = vec![
        LeverageBracket {
            notional_cap: 1000.0,
            cum: 0.0,
            maint_margin_ratio: 0.004,
        },
        LeverageBracket {
            notional_cap: 1e9,
            cum: 10.0,
            maint_margin_ratio: 0.01,
        },
    ];

    c.bench_function("liquidation_64_orders", |b| {
        b.iter(|| {
            estimate_liquidation(
                Side::Buy,
                None,
                black_box(&orders),
                black_box(&brackets),
                10.0,
            )
        })
    });
}

criterion_group!(benches, bench_transforms, bench_plot_paths, bench_liquidation);
criterion_main!(benches);
