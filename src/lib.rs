//! # Route Geometry
//!
//! Shared delivery-route geometry core for the fleet mobile client.
//!
//! This library provides:
//! - Encoded polyline decoding (and encoding) at 1e-5 degree precision
//! - Map viewport fitting with padding and a minimum span
//! - Delivery stop sequencing (explicit order or nearest-first)
//! - Route resolution against a routing provider with straight-line fallback
//!
//! ## Features
//!
//! - **`http`** - Enable the HTTP directions client
//! - **`ffi`** - Enable FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use route_geometry::{decode_polyline, fit_viewport, ViewportConfig};
//!
//! let path = decode_polyline("_p~iF~ps|U_ulLnnqC_mqNvxq`@");
//! assert_eq!(path.len(), 3);
//!
//! let viewport = fit_viewport(&path, &ViewportConfig::default()).unwrap();
//! assert!(path.iter().all(|p| viewport.contains(p)));
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{DecodeError, OptionExt, Result, RouteError};

// Geographic utilities (distance, path length)
pub mod geo_utils;

// Encoded polyline wire format
pub mod codec;
pub use codec::{decode_polyline, encode_polyline, try_decode_polyline};

// Map viewport fitting
pub mod viewport;
pub use viewport::{fit_viewport, fit_viewport_or_default, Viewport, ViewportConfig};

// Delivery stop ordering
pub mod sequencer;
pub use sequencer::{reorder_by_distance, sort_by_order, DeliveryState, Stop};

// Routing provider resolution with fallback
pub mod resolver;
pub use resolver::{
    ProviderRoute, ResolverConfig, RouteLeg, RouteRequest, RouteResolver, RoutingProvider,
    TripRoutes,
};

// Per-screen resolution state and stop focus
pub mod session;
pub use session::{LoadState, RequestToken, RouteSession, StopSelection};

// Distance and duration presentation
pub mod format;
pub use format::{format_distance, format_duration, format_duration_minutes, LegSummary};

// Injected configuration (viewport constants, palette, resolver policy)
pub mod config;
pub use config::{MapStyle, RouteCoreConfig, Stroke};

// HTTP directions client
#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{DirectionsClient, DirectionsConfig};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("RouteGeometryRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A WGS-84 coordinate in decimal degrees.
///
/// # Example
/// ```
/// use route_geometry::GeoPoint;
/// let point = GeoPoint::new(-33.8688, 151.2093); // Sydney depot
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Axis-aligned bounding box over a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from points. Returns `None` for an empty slice.
    pub fn from_points(points: &[GeoPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center point of the bounds.
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }

    /// Latitude extent in degrees.
    pub fn latitude_extent(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    /// Longitude extent in degrees.
    pub fn longitude_extent(&self) -> f64 {
        self.max_lng - self.min_lng
    }
}

// ============================================================================
// Tests
// ============================================================================
