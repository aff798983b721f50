use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::config::MinichartConfig;
use crate::core::worker::TransformWorker;
use crate::core::{Candle, ChartType, ScaleModel, ScaleType, Viewport, ZoomTransform, transform};
use crate::error::ChartResult;
use crate::lines::alert::AlertListHandler;
use crate::lines::{
    AlertItem, AlertKind, AlertPriceLines, ChartAxis, CrosshairPriceLines, CurrentPriceLines,
    GestureOrigin, LiquidationPriceLines, OrderPriceLines, PositionPriceLines,
};
use crate::render::{AxesFrame, AxesRenderer, CandlePaths, GridFrame, GridRenderer, PlotRenderer};
use crate::trade::{LeverageBracket, TradingOrder, TradingPosition};

/// Hosts keep at most this many entries in their alert log.
pub const MAX_ALERT_LOG_SIZE: usize = 100;

/// One entry for the host's alert log dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertLogItem {
    #[serde(rename = "type")]
    pub kind: AlertKind,
    pub symbol: String,
    pub price: f64,
    pub volume: f64,
    #[serde(rename = "timeISO")]
    pub time: DateTime<Utc>,
}

pub type AlertLogHandler = Box<dyn FnMut(&AlertLogItem)>;

/// Callbacks the chart produces for its host.
#[derive(Default)]
pub struct MinichartHandlers {
    /// Fired whenever the user adds/drags/removes an alert line, or a trigger
    /// mutates the list; the host persists the list and hands it back on the
    /// next `update`.
    pub on_update_alerts: Option<AlertListHandler>,
    /// Fired when a price alert or volume anomaly goes off.
    pub on_alert: Option<AlertLogHandler>,
}

/// Partial update: only the provided fields are applied.
///
/// `orders` and `position` are double-optional so "field not part of this
/// update" stays distinct from "provided, but the account has none".
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartUpdate<'a> {
    pub candles: Option<&'a [Candle]>,
    pub price_precision: Option<u32>,
    pub chart_type: Option<ChartType>,
    pub scale_type: Option<ScaleType>,
    pub alerts: Option<&'a [AlertItem]>,
    pub orders: Option<Option<&'a [TradingOrder]>>,
    pub position: Option<Option<&'a TradingPosition>>,
    pub leverage_brackets: Option<&'a [LeverageBracket]>,
}

/// Top-level minichart orchestrator.
///
/// Wires data updates, zoom/pan gestures, debounced resizes and timer ticks
/// across the scale model, the candle renderers and the price-line sets.
/// All mutation happens on discrete calls from the host's event loop; the
/// only off-thread work is the candle transform.
pub struct Minichart {
    config: MinichartConfig,
    scales: ScaleModel,
    viewport: Viewport,
    plot: PlotRenderer,
    axes: AxesRenderer,
    grid: GridRenderer,
    current_price_lines: CurrentPriceLines,
    crosshair_lines: CrosshairPriceLines,
    alert_lines: AlertPriceLines,
    order_lines: OrderPriceLines,
    position_lines: PositionPriceLines,
    liquidation_lines: LiquidationPriceLines,
    on_alert: Option<AlertLogHandler>,
    worker: Option<TransformWorker>,
    candles: Vec<Candle>,
    transformed: Vec<Candle>,
    chart_type: ChartType,
    price_precision: u32,
    axes_frame: AxesFrame,
    grid_frame: GridFrame,
    has_initial_scroll: bool,
    pending_resize: Option<(Viewport, DateTime<Utc>)>,
    last_sweep: Option<DateTime<Utc>>,
    volume_anomaly_key: Option<String>,
}

impl Minichart {
    pub fn new(
        viewport: Viewport,
        config: MinichartConfig,
        handlers: MinichartHandlers,
        now: DateTime<Utc>,
    ) -> ChartResult<Self> {
        let config = config.validate()?;
        let scales = ScaleModel::new(viewport, config.scale_type, now.timestamp_millis() as f64)?;

        let on_update_alerts = handlers
            .on_update_alerts
            .unwrap_or_else(|| Box::new(|_: &[AlertItem]| {}));

        let mut chart = Self {
            config,
            scales,
            viewport,
            plot: PlotRenderer::new(),
            axes: AxesRenderer::new(),
            grid: GridRenderer::new(),
            current_price_lines: CurrentPriceLines::new(),
            crosshair_lines: CrosshairPriceLines::new(),
            alert_lines: AlertPriceLines::new(on_update_alerts),
            order_lines: OrderPriceLines::new(),
            position_lines: PositionPriceLines::new(),
            liquidation_lines: LiquidationPriceLines::new(),
            on_alert: handlers.on_alert,
            worker: config.use_transform_worker.then(TransformWorker::spawn),
            candles: Vec::new(),
            transformed: Vec::new(),
            chart_type: config.chart_type,
            price_precision: config.price_precision,
            axes_frame: AxesFrame::default(),
            grid_frame: GridFrame::default(),
            has_initial_scroll: false,
            pending_resize: None,
            last_sweep: None,
            volume_anomaly_key: None,
        };

        chart.axes.set_price_precision(chart.price_precision);
        chart.axes.set_percent_mode(chart.config.percent_scale);

        let axis = chart.axis();
        chart.current_price_lines.mount(axis)?;
        chart.crosshair_lines.mount(axis)?;
        chart.alert_lines.mount(axis)?;
        chart.order_lines.mount(axis)?;
        chart.position_lines.mount(axis)?;
        chart.liquidation_lines.mount(axis)?;
        chart.set_lines_precision(chart.price_precision)?;

        debug!(?viewport, "minichart created");
        Ok(chart)
    }

    #[must_use]
    pub fn axis(&self) -> ChartAxis {
        ChartAxis {
            x: self.scales.scaled_x(),
            y: self.scales.y(),
        }
    }

    #[must_use]
    pub fn scales(&self) -> &ScaleModel {
        &self.scales
    }

    #[must_use]
    pub fn candle_paths(&self) -> &CandlePaths {
        self.plot.paths()
    }

    #[must_use]
    pub fn axes_frame(&self) -> &AxesFrame {
        &self.axes_frame
    }

    #[must_use]
    pub fn grid_frame(&self) -> &GridFrame {
        &self.grid_frame
    }

    #[must_use]
    pub fn alert_lines(&self) -> &AlertPriceLines {
        &self.alert_lines
    }

    #[must_use]
    pub fn current_price_lines(&self) -> &CurrentPriceLines {
        &self.current_price_lines
    }

    #[must_use]
    pub fn crosshair_lines(&self) -> &CrosshairPriceLines {
        &self.crosshair_lines
    }

    #[must_use]
    pub fn order_lines(&self) -> &OrderPriceLines {
        &self.order_lines
    }

    #[must_use]
    pub fn position_lines(&self) -> &PositionPriceLines {
        &self.position_lines
    }

    #[must_use]
    pub fn liquidation_lines(&self) -> &LiquidationPriceLines {
        &self.liquidation_lines
    }

    /// Applies a partial update and redraws.
    pub fn update(&mut self, update: ChartUpdate<'_>, now: DateTime<Utc>) -> ChartResult<()> {
        if let Some(candles) = update.candles {
            let is_new_symbol = self.candles.first().map(|c| c.symbol.as_str())
                != candles.first().map(|c| c.symbol.as_str());
            let is_new_interval = self.candles.first().map(|c| c.interval.as_str())
                != candles.first().map(|c| c.interval.as_str());
            let is_new_candle = !is_new_symbol
                && !is_new_interval
                && !self.candles.is_empty()
                && self.candles.last().map(|c| c.time) != candles.last().map(|c| c.time);

            self.candles = candles.to_vec();
            self.axes.set_candles(self.candles.clone());

            self.draw(now)?;

            if is_new_interval {
                self.resize_now(self.viewport, now)?;
            } else if is_new_candle {
                // Keep the pan position glued to the live edge when a new
                // interval bucket opens.
                self.translate_by(0.0, now)?;
            }

            if let Some(price) = self.candles.last().map(|c| c.close) {
                if let Some(kind) = self.alert_lines.check_price(price, now)? {
                    self.emit_alert(kind, now);
                }
            }
            self.check_volume_anomaly(now);
        }

        if let Some(price_precision) = update.price_precision {
            if self.price_precision != price_precision {
                self.price_precision = price_precision;
                self.axes.set_price_precision(price_precision);
                self.set_lines_precision(price_precision)?;
            }
        }

        if let Some(chart_type) = update.chart_type {
            self.chart_type = chart_type;
        }

        if let Some(alerts) = update.alerts {
            self.alert_lines.set_alerts(alerts, now)?;
        }

        if let Some(orders) = update.orders {
            self.order_lines.update_orders(orders)?;
            self.liquidation_lines.set_orders(orders)?;
        }

        if let Some(position) = update.position {
            self.position_lines.update_position(position)?;
            self.liquidation_lines.set_position(position)?;
        }

        if let Some(brackets) = update.leverage_brackets {
            self.liquidation_lines.set_leverage_brackets(brackets)?;
        }

        if let Some(scale_type) = update.scale_type {
            self.scales.set_scale_type(scale_type)?;
            self.resize_now(self.viewport, now)?;
        }

        self.draw(now)
    }

    /// Applies a pointer/wheel zoom transform and redraws everything that
    /// reads the visible window.
    pub fn apply_zoom(&mut self, zoom: ZoomTransform, now: DateTime<Utc>) -> ChartResult<()> {
        trace!(k = zoom.k, x = zoom.x, "zoom transform applied");
        self.scales.set_zoom(zoom)?;
        self.draw(now)
    }

    /// Wheel gestures zoom only while shift is held; drags always pan.
    #[must_use]
    pub fn accepts_zoom_gesture(is_wheel: bool, shift_key: bool) -> bool {
        shift_key || !is_wheel
    }

    /// Derives the plot viewport from the host container size, reserving the
    /// configured axis gutters. Collapsed containers clamp to 10px.
    #[must_use]
    pub fn container_viewport(&self, container_width: f64, container_height: f64) -> Viewport {
        let margin = self.config.margin;
        let width = (container_width - margin.left - margin.right).max(10.0);
        let height = (container_height - margin.top - margin.bottom).max(10.0);
        Viewport::new(width.round() as u32, height.round() as u32)
    }

    /// Queues a debounced resize; `tick` applies it once the debounce window
    /// has passed.
    pub fn request_resize(&mut self, viewport: Viewport, now: DateTime<Utc>) {
        let deadline = now + chrono::Duration::milliseconds(self.config.resize_debounce_ms);
        self.pending_resize = Some((viewport, deadline));
    }

    /// Periodic driver for the debounced resize and the 1 Hz alert sweep.
    ///
    /// Owned by the chart lifecycle: the host calls this from its own timer
    /// and simply stops calling on teardown.
    pub fn tick(&mut self, now: DateTime<Utc>) -> ChartResult<()> {
        if let Some((viewport, deadline)) = self.pending_resize {
            if now >= deadline {
                self.pending_resize = None;
                self.resize_now(viewport, now)?;
            }
        }

        let sweep_due = self.last_sweep.is_none_or(|last| {
            (now - last).num_milliseconds() >= self.config.alert_sweep_interval_ms
        });
        if sweep_due {
            self.last_sweep = Some(now);
            self.alert_lines.sweep(now)?;
        }
        Ok(())
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> ChartResult<()> {
        self.crosshair_lines.show(x, y)?;
        Ok(())
    }

    pub fn pointer_leave(&mut self) -> ChartResult<()> {
        self.crosshair_lines.hide()?;
        Ok(())
    }

    /// Right-click on the plot drops a new pending alert at the pointer.
    pub fn context_click(&mut self, y: f64, now: DateTime<Utc>) -> ChartResult<()> {
        self.alert_lines.add_alert_at(y, now)?;
        Ok(())
    }

    pub fn alert_drag_start(&mut self, index: usize, origin: GestureOrigin) {
        self.alert_lines.drag_start(index, origin);
    }

    pub fn alert_drag_move(&mut self, offset_y: f64) -> ChartResult<()> {
        self.alert_lines.drag_move(offset_y)?;
        Ok(())
    }

    pub fn alert_drag_end(&mut self) {
        self.alert_lines.drag_end();
    }

    pub fn alert_click_close(&mut self, id: &str) -> ChartResult<()> {
        self.alert_lines.click_close(id)
    }

    fn set_lines_precision(&mut self, price_precision: u32) -> ChartResult<()> {
        self.current_price_lines.set_price_precision(price_precision)?;
        self.crosshair_lines.set_price_precision(price_precision)?;
        self.alert_lines.set_price_precision(price_precision)?;
        self.order_lines.set_price_precision(price_precision)?;
        self.position_lines.set_price_precision(price_precision)?;
        self.liquidation_lines.set_price_precision(price_precision)?;
        Ok(())
    }

    fn draw(&mut self, now: DateTime<Utc>) -> ChartResult<()> {
        self.scales
            .recompute_x_domain(&self.candles, now.timestamp_millis() as f64)?;
        self.scales.recompute_y_domain(
            &self.candles,
            self.price_precision,
            self.config.padding.top,
            self.config.padding.bottom,
        )?;

        self.refresh_transformed();

        self.plot
            .draw(&self.transformed, &self.scales, self.chart_type)?;

        self.axes_frame = self.axes.draw(&self.scales)?;
        self.grid_frame = self.grid.draw(&self.scales)?;

        let axis = self.axis();
        self.current_price_lines.sync_axis(axis)?;
        self.crosshair_lines.sync_axis(axis)?;
        self.alert_lines.sync_axis(axis)?;
        self.order_lines.sync_axis(axis)?;
        self.position_lines.sync_axis(axis)?;
        self.liquidation_lines.sync_axis(axis)?;

        if let Some(last) = self.candles.last() {
            self.current_price_lines.update_price(last.close)?;
        }

        if !self.has_initial_scroll && !self.candles.is_empty() {
            self.has_initial_scroll = true;
            self.translate_by(-self.config.padding.right, now)?;
        }
        Ok(())
    }

    /// Picks the candle series the plot should render.
    ///
    /// With a worker the newest completed transform is used even when it lags
    /// behind the submitted generation; a stale series is tolerated because
    /// the next tick resubmits and corrects it.
    fn refresh_transformed(&mut self) {
        if self.chart_type == ChartType::Candlestick {
            self.transformed = self.candles.clone();
            return;
        }

        let Some(worker) = self.worker.as_mut() else {
            self.transformed = transform::transform_candles(self.chart_type, &self.candles);
            return;
        };

        worker.submit(self.chart_type, self.candles.clone());
        match worker.poll() {
            Some(result) if result.chart_type == self.chart_type => {
                self.transformed = result.candles.clone();
            }
            _ => {
                // No completed series for this chart type yet.
                self.transformed = transform::transform_candles(self.chart_type, &self.candles);
            }
        }
    }

    fn translate_by(&mut self, dx: f64, now: DateTime<Utc>) -> ChartResult<()> {
        let zoom = self.scales.zoom().translated_by(dx);
        self.apply_zoom(zoom, now)
    }

    fn resize_now(&mut self, viewport: Viewport, now: DateTime<Utc>) -> ChartResult<()> {
        debug!(?viewport, "minichart resized");
        self.viewport = viewport;
        self.scales.resize(viewport)?;

        if !self.candles.is_empty() {
            self.draw(now)?;
            self.translate_by(0.0, now)?;
        }
        Ok(())
    }

    /// Volume anomaly: live candle volume exceeding `ratio` times the mean of
    /// the preceding window flags once per candle bucket.
    fn check_volume_anomaly(&mut self, now: DateTime<Utc>) {
        let Some(anomaly) = self.config.volume_anomaly else {
            return;
        };
        let Some(last) = self.candles.last() else {
            return;
        };

        let key = format!("{}_{}", last.interval, last.time);
        if self.volume_anomaly_key.as_deref() == Some(key.as_str()) {
            return;
        }

        let window_start = self
            .candles
            .len()
            .saturating_sub(anomaly.window.saturating_add(1));
        let considered = &self.candles[window_start..self.candles.len() - 1];
        if considered.is_empty() {
            return;
        }

        let mean =
            considered.iter().map(|c| c.volume).sum::<f64>() / considered.len() as f64;
        if mean * anomaly.ratio < last.volume {
            self.volume_anomaly_key = Some(key);
            self.emit_alert(AlertKind::VolumeAnomaly, now);
        }
    }

    fn emit_alert(&mut self, kind: AlertKind, now: DateTime<Utc>) {
        let (price, volume, symbol) = self
            .candles
            .last()
            .map(|c| (c.close, c.volume, c.symbol.clone()))
            .unwrap_or((0.0, 0.0, String::new()));

        debug!(?kind, symbol, price, "alert emitted");

        if let Some(on_alert) = self.on_alert.as_mut() {
            on_alert(&AlertLogItem {
                kind,
                symbol,
                price,
                volume,
                time: now,
            });
        }
    }
}
