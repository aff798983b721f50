use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChartResult;
use crate::lines::engine::{
    ChartAxis, GestureOrigin, PriceLineItem, PriceLinePatch, PriceLines, PriceLinesConfig,
    ReconcileStats, TitleVisibility,
};
use crate::lines::palette;
use crate::render::primitives::LineStyle;

/// Triggered alerts are kept on the chart for two hours before the sweep
/// removes them.
pub const ALERT_RETENTION_SECONDS: i64 = 2 * 60 * 60;

/// Alert event kinds reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    PriceUp,
    PriceDown,
    VolumeAnomaly,
}

/// One user-created price alert.
///
/// `triggered_time = None` means pending. A triggered alert keeps its
/// timestamp until the retention sweep removes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertItem {
    pub price: f64,
    #[serde(rename = "triggeredTimeISO")]
    pub triggered_time: Option<DateTime<Utc>>,
}

impl AlertItem {
    #[must_use]
    pub fn pending(price: f64) -> Self {
        Self {
            price,
            triggered_time: None,
        }
    }

    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.triggered_time.is_some()
    }
}

pub type AlertListHandler = Box<dyn FnMut(&[AlertItem])>;

/// User price-alert lines: dashed, draggable while pending, created from a
/// right-click, triggered by realtime price crosses and expired by a 1 Hz
/// sweep after [`ALERT_RETENTION_SECONDS`].
pub struct AlertPriceLines {
    lines: PriceLines<AlertItem>,
    on_update_alerts: AlertListHandler,
    synced_alerts: Vec<AlertItem>,
    last_price: Option<f64>,
    id_counter: u64,
}

impl AlertPriceLines {
    #[must_use]
    pub fn new(on_update_alerts: AlertListHandler) -> Self {
        let config = PriceLinesConfig {
            color: palette::ALERT,
            line_style: LineStyle::Dashed,
            title_visibility: TitleVisibility::Always,
            has_close_control: true,
            ..PriceLinesConfig::default()
        };

        Self {
            lines: PriceLines::new(config, Vec::new()),
            on_update_alerts,
            synced_alerts: Vec::new(),
            last_price: None,
            id_counter: 0,
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
    pub fn lines(&self) -> &PriceLines<AlertItem> {
        &self.lines
    }

    #[must_use]
    pub fn alerts(&self) -> Vec<AlertItem> {
        self.lines
            .items()
            .iter()
            .map(|item| AlertItem {
                price: item.y_value.unwrap_or(0.0),
                triggered_time: item.data.triggered_time,
            })
            .collect()
    }

    /// Replaces the line set from an externally persisted alert list.
    ///
    /// A list identical to the last synced one is ignored so host re-renders
    /// do not rebuild the lines.
    pub fn set_alerts(&mut self, alerts: &[AlertItem], now: DateTime<Utc>) -> ChartResult<ReconcileStats> {
        if self.synced_alerts == alerts {
            return Ok(ReconcileStats::default());
        }

        self.synced_alerts = alerts.to_vec();
        let items = alerts
            .iter()
            .map(|alert| self.make_line(*alert, now))
            .collect();
        self.lines.update(Some(items), None)
    }

    /// Creates a pending alert from a right-click's vertical pixel offset.
    pub fn add_alert_at(&mut self, pixel_y: f64, now: DateTime<Utc>) -> ChartResult<ReconcileStats> {
        let price = self.lines.invert_y(pixel_y)?;
        let item = self.make_line(AlertItem::pending(price), now);
        let stats = self.lines.add_item(item)?;
        self.emit();
        Ok(stats)
    }

    /// Removes the alert behind a clicked close affordance.
    pub fn click_close(&mut self, id: &str) -> ChartResult<()> {
        self.lines.remove_item(id)?;
        self.emit();
        Ok(())
    }

    pub fn drag_start(&mut self, index: usize, origin: GestureOrigin) {
        self.lines.drag_start(index, origin);
    }

    pub fn drag_move(&mut self, offset_y: f64) -> ChartResult<ReconcileStats> {
        self.lines.drag_move(offset_y)
    }

    /// Ends a drag and publishes the repriced alert list.
    pub fn drag_end(&mut self) {
        let was_dragging = self.lines.dragged_index().is_some();
        self.lines.drag_end();
        if was_dragging {
            self.emit();
        }
    }

    /// Runs the pending-to-triggered transition for one realtime price tick.
    ///
    /// At most one alert fires per tick: the first matching upward cross
    /// wins, otherwise the first matching downward cross. A triggered alert
    /// matching the cross again blocks re-firing, which makes the transition
    /// exactly-once.
    pub fn check_price(&mut self, price: f64, now: DateTime<Utc>) -> ChartResult<Option<AlertKind>> {
        let previous = self.last_price.replace(price);
        let Some(previous) = previous else {
            return Ok(None);
        };
        if price == 0.0 || previous == 0.0 {
            return Ok(None);
        }

        let crossed = |y: f64| {
            if previous < y && y <= price {
                Some(AlertKind::PriceUp)
            } else if previous > y && y >= price {
                Some(AlertKind::PriceDown)
            } else {
                None
            }
        };

        let up = self.lines.items().iter().enumerate().find(|(_, item)| {
            item.y_value
                .is_some_and(|y| crossed(y) == Some(AlertKind::PriceUp))
        });
        let down = self.lines.items().iter().enumerate().find(|(_, item)| {
            item.y_value
                .is_some_and(|y| crossed(y) == Some(AlertKind::PriceDown))
        });

        let Some((index, item, kind)) = up
            .map(|(index, item)| (index, item, AlertKind::PriceUp))
            .or(down.map(|(index, item)| (index, item, AlertKind::PriceDown)))
        else {
            return Ok(None);
        };

        if item.data.is_triggered() {
            return Ok(None);
        }

        debug!(price, alert = item.y_value, ?kind, "price alert triggered");

        let triggered = AlertItem {
            price: item.y_value.unwrap_or(0.0),
            triggered_time: Some(now),
        };
        self.lines.update_item(
            index,
            PriceLinePatch::new()
                .draggable(false)
                .title(triggered_title(now, now))
                .title_visibility(TitleVisibility::Always)
                .data(triggered),
        )?;
        self.emit();
        Ok(Some(kind))
    }

    /// 1 Hz sweep: expires triggered alerts past the retention window and
    /// refreshes the "time ago" titles of the rest.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> ChartResult<()> {
        let triggered: Vec<(String, DateTime<Utc>)> = self
            .lines
            .items()
            .iter()
            .filter_map(|item| {
                item.data
                    .triggered_time
                    .map(|time| (item.id.clone(), time))
            })
            .collect();

        if triggered.is_empty() {
            return Ok(());
        }

        for (id, triggered_time) in triggered {
            if (now - triggered_time).num_seconds() > ALERT_RETENTION_SECONDS {
                self.lines.remove_item(id.as_str())?;
                self.emit();
            } else {
                self.lines.update_item(
                    id.as_str(),
                    PriceLinePatch::new()
                        .title_visibility(TitleVisibility::Always)
                        .title(triggered_title(triggered_time, now)),
                )?;
            }
        }
        Ok(())
    }

    fn make_line(&mut self, alert: AlertItem, now: DateTime<Utc>) -> PriceLineItem<AlertItem> {
        self.id_counter += 1;
        let id = format!("alert_{}_{}", now.to_rfc3339(), self.id_counter);

        let (title, title_visibility) = match alert.triggered_time {
            Some(triggered_time) => (triggered_title(triggered_time, now), TitleVisibility::Always),
            None => (String::from("Alert"), TitleVisibility::OnHover),
        };

        PriceLineItem::new(id, alert)
            .with_y_value(alert.price)
            .with_title(title)
            .with_title_visibility(title_visibility)
            .with_draggable(!alert.is_triggered())
            .with_color(palette::ALERT)
    }

    fn emit(&mut self) {
        let alerts = self.alerts();
        self.synced_alerts = alerts.clone();
        (self.on_update_alerts)(&alerts);
    }
}

/// Humanized elapsed label: `1h 2m 3s ago`, omitting zero leading units.
fn triggered_title(triggered_time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - triggered_time).max(Duration::zero());
    let hours = elapsed.num_hours();
    let minutes = elapsed.num_minutes() - hours * 60;
    let seconds = elapsed.num_seconds() - elapsed.num_minutes() * 60;

    let mut title = String::new();
    if hours > 0 {
        title.push_str(&format!("{hours}h "));
    }
    if minutes > 0 {
        title.push_str(&format!("{minutes}m "));
    }
    title.push_str(&format!("{seconds}s ago"));
    title
}
