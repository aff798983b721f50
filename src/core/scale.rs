use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Linear domain-to-range mapping with an explicit pixel range.
///
/// The range may be inverted (`range_start > range_end`), which is how the
/// price axis maps larger prices to smaller pixel Y values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
}

impl LinearScale {
    pub fn new(
        domain_start: f64,
        domain_end: f64,
        range_start: f64,
        range_end: f64,
    ) -> ChartResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(ChartError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }
        if !range_start.is_finite() || !range_end.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
            range_start,
            range_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    pub fn scale(self, value: f64) -> ChartResult<f64> {
        if !value.is_finite() {
            return Err(ChartError::InvalidData("value must be finite".to_owned()));
        }

        let normalized = (value - self.domain_start) / (self.domain_end - self.domain_start);
        Ok(self.range_start + normalized * (self.range_end - self.range_start))
    }

    pub fn invert(self, pixel: f64) -> ChartResult<f64> {
        if !pixel.is_finite() {
            return Err(ChartError::InvalidData("pixel must be finite".to_owned()));
        }

        let range_span = self.range_end - self.range_start;
        if range_span == 0.0 {
            return Err(ChartError::InvalidData(
                "scale range must be non-zero to invert".to_owned(),
            ));
        }

        let normalized = (pixel - self.range_start) / range_span;
        Ok(self.domain_start + normalized * (self.domain_end - self.domain_start))
    }
}

/// Time axis scale: unix-millisecond domain mapped onto `[0, width]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    linear: LinearScale,
}

impl TimeScale {
    pub fn new(time_start: f64, time_end: f64, width: f64) -> ChartResult<Self> {
        let (time_start, time_end) = normalize_range(time_start, time_end, 1.0)?;
        Ok(Self {
            linear: LinearScale::new(time_start, time_end, 0.0, width)?,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.linear.domain()
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.linear.range()
    }

    pub fn with_domain(self, time_start: f64, time_end: f64) -> ChartResult<Self> {
        let (time_start, time_end) = normalize_range(time_start, time_end, 1.0)?;
        Ok(Self {
            linear: LinearScale::new(time_start, time_end, self.linear.range().0, self.linear.range().1)?,
        })
    }

    pub fn with_width(self, width: f64) -> ChartResult<Self> {
        let (domain_start, domain_end) = self.linear.domain();
        Ok(Self {
            linear: LinearScale::new(domain_start, domain_end, 0.0, width)?,
        })
    }

    pub fn time_to_pixel(self, time: f64) -> ChartResult<f64> {
        self.linear.scale(time)
    }

    pub fn pixel_to_time(self, pixel: f64) -> ChartResult<f64> {
        self.linear.invert(pixel)
    }
}

/// Mapping mode used by the price scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScaleKind {
    /// Uniform spacing in raw price units.
    Linear,
    /// Symmetric-log spacing: `sign(v) * ln(1 + |v| / constant)`.
    ///
    /// Unlike a plain log scale this stays defined through zero; `constant`
    /// picks the decade where the mapping transitions to near-linear.
    Symlog { constant: f64 },
}

/// Price axis scale mapped onto an inverted pixel range (`[height, 0]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceScale {
    domain_start: f64,
    domain_end: f64,
    height: f64,
    kind: ScaleKind,
}

impl PriceScale {
    pub fn new(price_min: f64, price_max: f64, height: f64, kind: ScaleKind) -> ChartResult<Self> {
        let (price_min, price_max) = normalize_range(price_min, price_max, 1e-9)?;
        if !height.is_finite() || height < 0.0 {
            return Err(ChartError::InvalidData(
                "price scale height must be finite and >= 0".to_owned(),
            ));
        }
        if let ScaleKind::Symlog { constant } = kind {
            if !constant.is_finite() || constant <= 0.0 {
                return Err(ChartError::InvalidData(
                    "symlog constant must be finite and > 0".to_owned(),
                ));
            }
        }

        Ok(Self {
            domain_start: price_min,
            domain_end: price_max,
            height,
            kind,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn kind(self) -> ScaleKind {
        self.kind
    }

    #[must_use]
    pub fn height(self) -> f64 {
        self.height
    }

    pub fn with_domain(self, price_min: f64, price_max: f64) -> ChartResult<Self> {
        Self::new(price_min, price_max, self.height, self.kind)
    }

    pub fn with_height(self, height: f64) -> ChartResult<Self> {
        Self::new(self.domain_start, self.domain_end, height, self.kind)
    }

    pub fn with_kind(self, kind: ScaleKind) -> ChartResult<Self> {
        Self::new(self.domain_start, self.domain_end, self.height, kind)
    }

    /// Maps a raw price to pixel Y (larger prices to smaller Y).
    pub fn price_to_pixel(self, price: f64) -> ChartResult<f64> {
        self.transformed_linear()?.scale(self.to_transformed(price)?)
    }

    pub fn pixel_to_price(self, pixel: f64) -> ChartResult<f64> {
        self.from_transformed(self.transformed_linear()?.invert(pixel)?)
    }

    fn transformed_linear(self) -> ChartResult<LinearScale> {
        let start = self.to_transformed(self.domain_start)?;
        let end = self.to_transformed(self.domain_end)?;
        LinearScale::new(start, end, self.height, 0.0)
    }

    fn to_transformed(self, value: f64) -> ChartResult<f64> {
        if !value.is_finite() {
            return Err(ChartError::InvalidData("price must be finite".to_owned()));
        }

        match self.kind {
            ScaleKind::Linear => Ok(value),
            ScaleKind::Symlog { constant } => {
                Ok(value.signum() * (1.0 + value.abs() / constant).ln())
            }
        }
    }

    fn from_transformed(self, value: f64) -> ChartResult<f64> {
        if !value.is_finite() {
            return Err(ChartError::InvalidData(
                "mapped scale value must be finite".to_owned(),
            ));
        }

        match self.kind {
            ScaleKind::Linear => Ok(value),
            ScaleKind::Symlog { constant } => {
                Ok(value.signum() * constant * (value.abs().exp() - 1.0))
            }
        }
    }
}

/// Pan/zoom state applied to the x axis.
///
/// `k` is the scale factor, `x`/`y` the pixel offsets. One transform exists
/// per chart instance and is updated by pointer/wheel gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self {
            k: 1.0,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl ZoomTransform {
    #[must_use]
    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    #[must_use]
    pub fn is_identity(self) -> bool {
        self.k == 1.0 && self.x == 0.0 && self.y == 0.0
    }

    /// Shifts the transform by a pixel delta, preserving the scale factor.
    #[must_use]
    pub fn translated_by(self, dx: f64) -> Self {
        Self {
            k: self.k,
            x: self.x + dx * self.k,
            y: self.y,
        }
    }

    /// Produces the visible-window time scale from the full-domain scale.
    ///
    /// The rescaled domain is the preimage of the pixel range under this
    /// transform, so `rescale_x` composed with the identity transform is the
    /// input scale itself.
    pub fn rescale_x(self, scale: TimeScale) -> ChartResult<TimeScale> {
        if !self.k.is_finite() || self.k <= 0.0 || !self.x.is_finite() {
            return Err(ChartError::InvalidData(
                "zoom transform must have finite offsets and k > 0".to_owned(),
            ));
        }

        let (range_start, range_end) = scale.range();
        let domain_start = scale.pixel_to_time((range_start - self.x) / self.k)?;
        let domain_end = scale.pixel_to_time((range_end - self.x) / self.k)?;
        scale.with_domain(domain_start, domain_end)
    }
}

pub(crate) fn normalize_range(start: f64, end: f64, min_span: f64) -> ChartResult<(f64, f64)> {
    if !start.is_finite() || !end.is_finite() {
        return Err(ChartError::InvalidData(
            "scale range must be finite".to_owned(),
        ));
    }

    if start == end {
        let half = min_span / 2.0;
        return Ok((start - half, end + half));
    }

    Ok((start.min(end), start.max(end)))
}
