//! Map viewport fitting.
//!
//! A viewport is the region a map camera frames: a center plus latitude and
//! longitude spans in degrees. Spans are padded around the points' bounding
//! box and floored at a minimum so that a single stop, or a tight cluster,
//! still produces a usable zoomed-in region.

use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result, RouteError};
use crate::{Bounds, GeoPoint};

/// Padding factor applied to the points' extent.
pub const DEFAULT_PADDING: f64 = 1.5;

/// Minimum span in degrees on either axis.
pub const DEFAULT_MIN_SPAN: f64 = 0.05;

/// Region framed by a map camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Viewport {
    pub center: GeoPoint,
    /// Latitude span in degrees (> 0)
    pub latitude_span: f64,
    /// Longitude span in degrees (> 0)
    pub longitude_span: f64,
}

impl Viewport {
    /// Whether a point lies inside the framed region (edges inclusive).
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let half_lat = self.latitude_span / 2.0;
        let half_lng = self.longitude_span / 2.0;
        point.latitude >= self.center.latitude - half_lat
            && point.latitude <= self.center.latitude + half_lat
            && point.longitude >= self.center.longitude - half_lng
            && point.longitude <= self.center.longitude + half_lng
    }

    /// The framed region as a bounding box.
    pub fn bounds(&self) -> Bounds {
        let half_lat = self.latitude_span / 2.0;
        let half_lng = self.longitude_span / 2.0;
        Bounds {
            min_lat: self.center.latitude - half_lat,
            max_lat: self.center.latitude + half_lat,
            min_lng: self.center.longitude - half_lng,
            max_lng: self.center.longitude + half_lng,
        }
    }
}

/// Viewport fitting constants, injected rather than global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct ViewportConfig {
    /// Multiplier on the points' extent. Default: 1.5
    pub padding: f64,
    /// Floor for each span in degrees. Default: 0.05
    pub min_span: f64,
    /// Region shown when there is nothing to frame.
    pub default_region: Viewport,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            min_span: DEFAULT_MIN_SPAN,
            // Sydney CBD
            default_region: Viewport {
                center: GeoPoint::new(-33.8688, 151.2093),
                latitude_span: 0.0922,
                longitude_span: 0.0421,
            },
        }
    }
}

impl ViewportConfig {
    /// Check the constants are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.padding.is_finite() && self.padding >= 1.0) {
            return Err(RouteError::Config {
                message: format!("viewport padding must be >= 1.0, got {}", self.padding),
            });
        }
        if !(self.min_span.is_finite() && self.min_span > 0.0) {
            return Err(RouteError::Config {
                message: format!("viewport min_span must be > 0, got {}", self.min_span),
            });
        }
        let region = &self.default_region;
        if !region.center.is_valid() || region.latitude_span <= 0.0 || region.longitude_span <= 0.0
        {
            return Err(RouteError::Config {
                message: "default region must have a valid center and positive spans".to_string(),
            });
        }
        Ok(())
    }
}

/// Fit a viewport around a non-empty set of points.
///
/// Returns [`RouteError::EmptyInput`] when `points` is empty: there is no
/// center to frame. Use [`fit_viewport_or_default`] to fall back to the
/// configured default region instead.
///
/// # Example
/// ```
/// use route_geometry::{fit_viewport, GeoPoint, ViewportConfig};
///
/// let depot = GeoPoint::new(-33.87, 151.21);
/// let viewport = fit_viewport(&[depot], &ViewportConfig::default()).unwrap();
/// assert_eq!(viewport.latitude_span, 0.05);
/// assert_eq!(viewport.center, depot);
/// ```
pub fn fit_viewport(points: &[GeoPoint], config: &ViewportConfig) -> Result<Viewport> {
    let bounds = Bounds::from_points(points).ok_or_empty("fit_viewport")?;

    Ok(Viewport {
        center: bounds.center(),
        latitude_span: (bounds.latitude_extent() * config.padding).max(config.min_span),
        longitude_span: (bounds.longitude_extent() * config.padding).max(config.min_span),
    })
}

/// Fit a viewport, or return the configured default region for empty input.
pub fn fit_viewport_or_default(points: &[GeoPoint], config: &ViewportConfig) -> Viewport {
    fit_viewport(points, config).unwrap_or(config.default_region)
}
