use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::scale::{PriceScale, TimeScale};
use crate::error::{ChartError, ChartResult};
use crate::render::format::{format_price, format_time};
use crate::render::primitives::{Color, LineStyle};

/// Scales the line collection positions against: the visible-window time
/// scale and the current price scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartAxis {
    pub x: TimeScale,
    pub y: PriceScale,
}

/// Selects one item: by stable id or by positional index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineKey<'a> {
    Id(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for LineKey<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl From<usize> for LineKey<'_> {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl std::fmt::Display for LineKey<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

/// When an item's title annotation is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TitleVisibility {
    Always,
    #[default]
    Never,
    OnHover,
}

/// One annotated reference line.
///
/// `id` is the reconciliation join key and must be unique within its owning
/// collection. `y_value` positions a horizontal line in price space,
/// `x_value` a vertical line in time space (only rendered when the
/// collection shows vertical lines).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLineItem<T> {
    pub id: String,
    pub y_value: Option<f64>,
    pub x_value: Option<f64>,
    pub title: String,
    pub color: Option<Color>,
    pub opacity: Option<f64>,
    pub is_visible: bool,
    pub is_draggable: bool,
    pub is_closable: bool,
    pub is_checkable: bool,
    pub is_hovered: bool,
    pub title_visibility: Option<TitleVisibility>,
    pub line_style: Option<LineStyle>,
    pub pointer_events_none: Option<bool>,
    pub data: T,
}

impl<T> PriceLineItem<T> {
    #[must_use]
    pub fn new(id: impl Into<String>, data: T) -> Self {
        Self {
            id: id.into(),
            y_value: None,
            x_value: None,
            title: String::new(),
            color: None,
            opacity: None,
            is_visible: true,
            is_draggable: false,
            is_closable: true,
            is_checkable: true,
            is_hovered: false,
            title_visibility: None,
            line_style: None,
            pointer_events_none: None,
            data,
        }
    }

    #[must_use]
    pub fn with_y_value(mut self, y_value: f64) -> Self {
        self.y_value = Some(y_value);
        self
    }

    #[must_use]
    pub fn with_x_value(mut self, x_value: f64) -> Self {
        self.x_value = Some(x_value);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    #[must_use]
    pub fn with_visible(mut self, is_visible: bool) -> Self {
        self.is_visible = is_visible;
        self
    }

    #[must_use]
    pub fn with_draggable(mut self, is_draggable: bool) -> Self {
        self.is_draggable = is_draggable;
        self
    }

    #[must_use]
    pub fn with_title_visibility(mut self, title_visibility: TitleVisibility) -> Self {
        self.title_visibility = Some(title_visibility);
        self
    }

    #[must_use]
    pub fn with_line_style(mut self, line_style: LineStyle) -> Self {
        self.line_style = Some(line_style);
        self
    }

    #[must_use]
    pub fn with_pointer_events_none(mut self, pointer_events_none: bool) -> Self {
        self.pointer_events_none = Some(pointer_events_none);
        self
    }
}

/// Partial update merged into an item by [`PriceLines::update_item`].
///
/// Application is immutable: a new record is produced with the same id, so
/// no caller ever aliases a half-patched item.
#[derive(Debug, Clone, Default)]
pub struct PriceLinePatch<T> {
    pub y_value: Option<f64>,
    pub x_value: Option<f64>,
    pub title: Option<String>,
    pub color: Option<Color>,
    pub opacity: Option<f64>,
    pub is_visible: Option<bool>,
    pub is_draggable: Option<bool>,
    pub is_hovered: Option<bool>,
    pub title_visibility: Option<TitleVisibility>,
    pub line_style: Option<LineStyle>,
    pub data: Option<T>,
}

impl<T> PriceLinePatch<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            y_value: None,
            x_value: None,
            title: None,
            color: None,
            opacity: None,
            is_visible: None,
            is_draggable: None,
            is_hovered: None,
            title_visibility: None,
            line_style: None,
            data: None,
        }
    }

    #[must_use]
    pub fn y_value(mut self, y_value: f64) -> Self {
        self.y_value = Some(y_value);
        self
    }

    #[must_use]
    pub fn x_value(mut self, x_value: f64) -> Self {
        self.x_value = Some(x_value);
        self
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    #[must_use]
    pub fn visible(mut self, is_visible: bool) -> Self {
        self.is_visible = Some(is_visible);
        self
    }

    #[must_use]
    pub fn draggable(mut self, is_draggable: bool) -> Self {
        self.is_draggable = Some(is_draggable);
        self
    }

    #[must_use]
    pub fn hovered(mut self, is_hovered: bool) -> Self {
        self.is_hovered = Some(is_hovered);
        self
    }

    #[must_use]
    pub fn title_visibility(mut self, title_visibility: TitleVisibility) -> Self {
        self.title_visibility = Some(title_visibility);
        self
    }

    #[must_use]
    pub fn data(mut self, data: T) -> Self {
        self.data = Some(data);
        self
    }

    fn apply(self, item: &PriceLineItem<T>) -> PriceLineItem<T>
    where
        T: Clone,
    {
        PriceLineItem {
            id: item.id.clone(),
            y_value: self.y_value.or(item.y_value),
            x_value: self.x_value.or(item.x_value),
            title: self.title.unwrap_or_else(|| item.title.clone()),
            color: self.color.or(item.color),
            opacity: self.opacity.or(item.opacity),
            is_visible: self.is_visible.unwrap_or(item.is_visible),
            is_draggable: self.is_draggable.unwrap_or(item.is_draggable),
            is_closable: item.is_closable,
            is_checkable: item.is_checkable,
            is_hovered: self.is_hovered.unwrap_or(item.is_hovered),
            title_visibility: self.title_visibility.or(item.title_visibility),
            line_style: self.line_style.or(item.line_style),
            pointer_events_none: item.pointer_events_none,
            data: self.data.unwrap_or_else(|| item.data.clone()),
        }
    }
}

/// Collection-level configuration shared by all items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceLinesConfig {
    pub show_x: bool,
    pub color: Color,
    pub line_style: LineStyle,
    pub title_visibility: TitleVisibility,
    pub is_background_fill: bool,
    pub pointer_events_none: bool,
    pub has_close_control: bool,
    pub has_check_control: bool,
}

impl Default for PriceLinesConfig {
    fn default() -> Self {
        Self {
            show_x: false,
            color: Color::from_u8(0xff, 0x00, 0xff),
            line_style: LineStyle::Solid,
            title_visibility: TitleVisibility::Never,
            is_background_fill: false,
            pointer_events_none: false,
            has_close_control: false,
            has_check_control: false,
        }
    }
}

/// Where a pointer gesture started, as resolved by the host's hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOrigin {
    Line,
    /// The close affordance; never starts a drag. Without this guard a click
    /// on the close control would be read as a drag to pixel zero.
    CloseControl,
    CheckControl,
}

/// Rendered scene node for one line, matched to its item by id.
#[derive(Debug, Clone, PartialEq)]
pub struct LineNode {
    pub id: String,
    pub y_pixel: f64,
    pub x_pixel: Option<f64>,
    pub color: Color,
    pub opacity: f64,
    pub visible: bool,
    pub dash_array: Option<&'static str>,
    pub drag_cursor: bool,
    pub pointer_events_enabled: bool,
    pub has_drag_handle: bool,
    pub title: String,
    pub title_shown: bool,
    pub title_background: Option<Color>,
    pub show_close: bool,
    pub show_check: bool,
    pub price_label: String,
    pub time_label: String,
    pub right_background_path: String,
    pub bottom_background_path: Option<String>,
}

/// Enter/update/exit counts of one reconciliation pass.
///
/// `updated` counts only nodes whose recomputed attributes actually differ,
/// so a pass over unchanged inputs reports all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconcileStats {
    pub entered: usize,
    pub updated: usize,
    pub exited: usize,
}

impl ReconcileStats {
    #[must_use]
    pub fn is_noop(self) -> bool {
        self.entered == 0 && self.updated == 0 && self.exited == 0
    }
}

/// Notification hooks invoked after collection mutations.
pub type LineHandler<T> = Box<dyn FnMut(&PriceLineItem<T>, &[PriceLineItem<T>])>;

pub struct LineHooks<T> {
    pub on_add: Option<LineHandler<T>>,
    pub on_remove: Option<LineHandler<T>>,
    pub on_drag: Option<LineHandler<T>>,
    pub on_drag_end: Option<LineHandler<T>>,
}

impl<T> Default for LineHooks<T> {
    fn default() -> Self {
        Self {
            on_add: None,
            on_remove: None,
            on_drag: None,
            on_drag_end: None,
        }
    }
}

/// Generic reconciling collection of annotated reference lines.
///
/// Items are matched to scene nodes by id: entering items produce new nodes,
/// persisting items get attribute updates, exiting items drop their nodes.
/// Running the same update twice is idempotent. Specialized line sets
/// (current price, crosshair, alerts, orders, position, liquidation) each
/// own one instance and are its sole mutator.
pub struct PriceLines<T> {
    config: PriceLinesConfig,
    hooks: LineHooks<T>,
    items: Vec<PriceLineItem<T>>,
    nodes: IndexMap<String, LineNode>,
    axis: Option<ChartAxis>,
    price_precision: u32,
    dragged_index: Option<usize>,
}

impl<T: Clone + PartialEq> PriceLines<T> {
    #[must_use]
    pub fn new(config: PriceLinesConfig, items: Vec<PriceLineItem<T>>) -> Self {
        Self::with_hooks(config, items, LineHooks::default())
    }

    #[must_use]
    pub fn with_hooks(
        config: PriceLinesConfig,
        items: Vec<PriceLineItem<T>>,
        hooks: LineHooks<T>,
    ) -> Self {
        Self {
            config,
            hooks,
            items,
            nodes: IndexMap::new(),
            axis: None,
            price_precision: 1,
            dragged_index: None,
        }
    }

    /// One-time mount: binds the axis scales and renders the initial items.
    pub fn mount(&mut self, axis: ChartAxis) -> ChartResult<ReconcileStats> {
        self.axis = Some(axis);
        self.reconcile()
    }

    /// Refreshes the axis binding after zoom/pan/resize and re-renders.
    pub fn sync_axis(&mut self, axis: ChartAxis) -> ChartResult<ReconcileStats> {
        if self.axis.is_none() {
            return Ok(ReconcileStats::default());
        }
        self.axis = Some(axis);
        self.reconcile()
    }

    #[must_use]
    pub fn items(&self) -> &[PriceLineItem<T>] {
        &self.items
    }

    #[must_use]
    pub fn nodes(&self) -> &IndexMap<String, LineNode> {
        &self.nodes
    }

    #[must_use]
    pub fn price_precision(&self) -> u32 {
        self.price_precision
    }

    /// Replaces the item list and/or the price formatting precision.
    ///
    /// Duplicate ids in the incoming list are rejected: id uniqueness is the
    /// reconciliation join key.
    pub fn update(
        &mut self,
        items: Option<Vec<PriceLineItem<T>>>,
        price_precision: Option<u32>,
    ) -> ChartResult<ReconcileStats> {
        let mut changed = false;

        if let Some(price_precision) = price_precision {
            self.price_precision = price_precision;
            changed = true;
        }

        if let Some(items) = items {
            ensure_unique_ids(&items)?;
            self.items = items;
            changed = true;
        }

        if changed {
            self.reconcile()
        } else {
            Ok(ReconcileStats::default())
        }
    }

    /// Removes every item.
    pub fn clear(&mut self) -> ChartResult<ReconcileStats> {
        self.update(Some(Vec::new()), None)
    }

    /// Merges a partial patch into the item selected by `key`.
    ///
    /// Fails when no item matches: callers are internal code that must know
    /// the key exists.
    pub fn update_item<'k>(
        &mut self,
        key: impl Into<LineKey<'k>>,
        patch: PriceLinePatch<T>,
    ) -> ChartResult<ReconcileStats> {
        let key = key.into();
        let index = self
            .find_index(key)
            .ok_or_else(|| ChartError::UnknownLineItem {
                key: key.to_string(),
            })?;

        self.items[index] = patch.apply(&self.items[index]);
        self.reconcile()
    }

    /// Appends an item and notifies the `on_add` hook.
    pub fn add_item(&mut self, item: PriceLineItem<T>) -> ChartResult<ReconcileStats> {
        if self.items.iter().any(|existing| existing.id == item.id) {
            return Err(ChartError::InvalidData(format!(
                "price line id `{}` already exists",
                item.id
            )));
        }

        self.items.push(item);
        let stats = self.reconcile()?;

        if let Some(on_add) = self.hooks.on_add.as_mut() {
            if let Some(added) = self.items.last() {
                on_add(added, &self.items);
            }
        }
        Ok(stats)
    }

    /// Removes the item selected by `key` and notifies the `on_remove` hook.
    pub fn remove_item<'k>(
        &mut self,
        key: impl Into<LineKey<'k>>,
    ) -> ChartResult<PriceLineItem<T>> {
        let key = key.into();
        let index = self
            .find_index(key)
            .ok_or_else(|| ChartError::UnknownLineItem {
                key: key.to_string(),
            })?;

        let removed = self.items.remove(index);
        self.reconcile()?;

        if let Some(on_remove) = self.hooks.on_remove.as_mut() {
            on_remove(&removed, &self.items);
        }
        Ok(removed)
    }

    /// Maps a pixel x back to domain time via the visible-window scale.
    pub fn invert_x(&self, pixel: f64) -> ChartResult<f64> {
        self.bound_axis()?.x.pixel_to_time(pixel)
    }

    /// Maps a pixel y back to a price via the current price scale.
    pub fn invert_y(&self, pixel: f64) -> ChartResult<f64> {
        self.bound_axis()?.y.pixel_to_price(pixel)
    }

    /// Records the dragged item unless the gesture started on a no-drag
    /// sub-element or the item is not draggable.
    pub fn drag_start(&mut self, index: usize, origin: GestureOrigin) {
        if origin != GestureOrigin::Line {
            return;
        }
        let draggable = self
            .items
            .get(index)
            .map(|item| item.is_draggable)
            .unwrap_or(false);
        if draggable {
            self.dragged_index = Some(index);
        }
    }

    #[must_use]
    pub fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    /// Reprices the dragged item from the pointer's vertical offset.
    pub fn drag_move(&mut self, offset_y: f64) -> ChartResult<ReconcileStats> {
        let Some(index) = self.dragged_index else {
            return Ok(ReconcileStats::default());
        };

        if let Some(on_drag) = self.hooks.on_drag.as_mut() {
            on_drag(&self.items[index], &self.items);
        }

        let y_value = self.invert_y(offset_y)?;
        self.update_item(index, PriceLinePatch::new().y_value(y_value))
    }

    /// Clears the dragged item and notifies the `on_drag_end` hook.
    pub fn drag_end(&mut self) {
        let Some(index) = self.dragged_index.take() else {
            return;
        };
        if let Some(on_drag_end) = self.hooks.on_drag_end.as_mut() {
            if let Some(item) = self.items.get(index) {
                on_drag_end(item, &self.items);
            }
        }
    }

    /// Marks an item hovered when its title is hover-gated.
    pub fn pointer_enter<'k>(&mut self, key: impl Into<LineKey<'k>>) -> ChartResult<ReconcileStats> {
        self.set_hovered(key.into(), true)
    }

    pub fn pointer_leave<'k>(&mut self, key: impl Into<LineKey<'k>>) -> ChartResult<ReconcileStats> {
        self.set_hovered(key.into(), false)
    }

    fn set_hovered(&mut self, key: LineKey<'_>, hovered: bool) -> ChartResult<ReconcileStats> {
        let index = self
            .find_index(key)
            .ok_or_else(|| ChartError::UnknownLineItem {
                key: key.to_string(),
            })?;

        let hover_gated = self.config.title_visibility == TitleVisibility::OnHover
            || self.items[index].title_visibility == Some(TitleVisibility::OnHover);
        if !hover_gated {
            return Ok(ReconcileStats::default());
        }

        self.update_item(index, PriceLinePatch::new().hovered(hovered))
    }

    fn find_index(&self, key: LineKey<'_>) -> Option<usize> {
        match key {
            LineKey::Id(id) => self.items.iter().position(|item| item.id == id),
            LineKey::Index(index) => (index < self.items.len()).then_some(index),
        }
    }

    fn bound_axis(&self) -> ChartResult<ChartAxis> {
        self.axis.ok_or_else(|| {
            ChartError::InvalidData("price lines are not mounted to an axis".to_owned())
        })
    }

    /// Rebuilds the node map from the items, by id.
    fn reconcile(&mut self) -> ChartResult<ReconcileStats> {
        let Some(axis) = self.axis else {
            return Ok(ReconcileStats::default());
        };

        let mut stats = ReconcileStats::default();
        let mut next: IndexMap<String, LineNode> = IndexMap::with_capacity(self.items.len());

        for item in &self.items {
            let node = self.build_node(item, axis)?;
            match self.nodes.get(&item.id) {
                Some(previous) if *previous == node => {}
                Some(_) => stats.updated += 1,
                None => stats.entered += 1,
            }
            next.insert(item.id.clone(), node);
        }

        stats.exited = self
            .nodes
            .keys()
            .filter(|id| !next.contains_key(*id))
            .count();
        self.nodes = next;
        Ok(stats)
    }

    fn build_node(&self, item: &PriceLineItem<T>, axis: ChartAxis) -> ChartResult<LineNode> {
        let y_value = item.y_value.unwrap_or(0.0);
        let y_pixel = axis.y.price_to_pixel(y_value)?;

        let x_pixel = if self.config.show_x {
            Some(axis.x.time_to_pixel(item.x_value.unwrap_or(0.0))?)
        } else {
            None
        };

        let pointer_events_none = item
            .pointer_events_none
            .unwrap_or(self.config.pointer_events_none);

        let title_shown = !matches!(
            (self.config.title_visibility, item.is_hovered),
            (TitleVisibility::Never, _) | (TitleVisibility::OnHover, false)
        ) && !matches!(
            (item.title_visibility, item.is_hovered),
            (Some(TitleVisibility::Never), _) | (Some(TitleVisibility::OnHover), false)
        );

        let title_background = if self.config.is_background_fill {
            item.color
        } else {
            None
        };

        Ok(LineNode {
            id: item.id.clone(),
            y_pixel,
            x_pixel,
            color: item.color.unwrap_or(self.config.color),
            opacity: item.opacity.unwrap_or(1.0),
            visible: item.is_visible,
            dash_array: item
                .line_style
                .unwrap_or(self.config.line_style)
                .dash_array(),
            drag_cursor: item.is_draggable,
            pointer_events_enabled: !pointer_events_none,
            has_drag_handle: item.is_draggable,
            title: item.title.clone(),
            title_shown,
            title_background,
            show_close: self.config.has_close_control && item.is_closable,
            show_check: self.config.has_check_control && item.is_checkable,
            price_label: format_price(y_value, self.price_precision),
            time_label: item
                .x_value
                .filter(|_| self.config.show_x)
                .map(format_time)
                .unwrap_or_default(),
            right_background_path: label_background_path(Orient::Right, AXIS_TICK_SIZE),
            bottom_background_path: self
                .config
                .show_x
                .then(|| label_background_path(Orient::Bottom, AXIS_TICK_SIZE)),
        })
    }
}

fn ensure_unique_ids<T>(items: &[PriceLineItem<T>]) -> ChartResult<()> {
    for (index, item) in items.iter().enumerate() {
        if items[..index].iter().any(|other| other.id == item.id) {
            return Err(ChartError::InvalidData(format!(
                "price line id `{}` appears more than once",
                item.id
            )));
        }
    }
    Ok(())
}

/// Axis edge a label background is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orient {
    Top,
    Bottom,
    Left,
    Right,
}

/// Inner tick length of the axis the labels sit on.
pub const AXIS_TICK_SIZE: f64 = 6.0;
/// Gap between the tick and the label text.
pub const AXIS_TICK_PADDING: f64 = 3.0;

const LABEL_BOX_HEIGHT: f64 = 14.0;
const LABEL_NOTCH: f64 = 4.0;
const SIDE_LABEL_BOX_WIDTH: f64 = 50.0;
const EDGE_LABEL_BOX_WIDTH: f64 = 100.0;

/// Notch polygon behind an axis-edge label.
///
/// A pointer of `tick_size` length leads into a fixed-size box (50×14 px on
/// the left/right edges, 100×14 px on the top/bottom edges); the sign of the
/// leading segment flips with the anchored edge.
#[must_use]
pub fn label_background_path(orient: Orient, tick_size: f64) -> String {
    let height = LABEL_BOX_HEIGHT;
    let point = LABEL_NOTCH;
    let neg = match orient {
        Orient::Left | Orient::Top => -1.0,
        Orient::Right | Orient::Bottom => 1.0,
    };
    let value = 1.0;

    match orient {
        Orient::Left | Orient::Right => {
            let width = SIDE_LABEL_BOX_WIDTH;
            let (pt, h) = if height / 2.0 < point {
                (height / 2.0, 0.0)
            } else {
                (point, height / 2.0 - point)
            };

            format!(
                "M 0 {value} l {lead} {pt_neg} l 0 {h_neg} l {w} 0 l 0 {height} l {w_back} 0 l 0 {h_neg}",
                lead = neg * tick_size.max(1.0),
                pt_neg = -pt,
                h_neg = -h,
                w = neg * width,
                w_back = neg * -width,
            )
        }
        Orient::Top | Orient::Bottom => {
            let width = EDGE_LABEL_BOX_WIDTH;
            let (pt, w) = if width / 2.0 < point {
                (width / 2.0, 0.0)
            } else {
                (point, width / 2.0 - point)
            };

            format!(
                "M {value} 0 l {pt_neg} {lead} l {w_neg} 0 l 0 {h} l {width} 0 l 0 {h_back} l {w_neg} 0",
                pt_neg = -pt,
                lead = neg * tick_size.max(1.0),
                w_neg = -w,
                h = neg * height,
                h_back = neg * -height,
            )
        }
    }
}
