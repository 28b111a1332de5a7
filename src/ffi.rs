//! FFI bindings for mobile platforms (iOS/Android).
//!
//! This module provides the UniFFI bindings that expose the route core
//! to Kotlin and Swift screens. All FFI functions are prefixed with `ffi_` to
//! avoid naming conflicts with the internal API.

use async_trait::async_trait;
use log::{info, warn};

use crate::config::{MapStyle, RouteCoreConfig, Stroke};
use crate::format::LegSummary;
use crate::http::{DirectionsClient, DirectionsConfig};
use crate::resolver::{
    ProviderRoute, RouteLeg, RouteRequest, RouteResolver, RoutingProvider, TripRoutes,
};
use crate::sequencer::Stop;
use crate::viewport::{fit_viewport_or_default, Viewport, ViewportConfig};
use crate::{
    decode_polyline, encode_polyline, format_distance, format_duration, init_logging,
    reorder_by_distance, sort_by_order, GeoPoint, Result, RouteError,
};

// ============================================================================
// Geometry
// ============================================================================

/// Decode an encoded polyline. Truncated input yields the intact prefix.
#[uniffi::export]
pub fn ffi_decode_polyline(encoded: String) -> Vec<GeoPoint> {
    init_logging();
    decode_polyline(&encoded)
}

/// Encode points as a polyline. Returns None for invalid coordinates.
#[uniffi::export]
pub fn ffi_encode_polyline(points: Vec<GeoPoint>) -> Option<String> {
    init_logging();
    match encode_polyline(&points) {
        Ok(encoded) => Some(encoded),
        Err(e) => {
            warn!("[RouteGeometryRust] encode_polyline failed: {}", e);
            None
        }
    }
}

/// Fit a viewport; empty input yields the configured default region.
#[uniffi::export]
pub fn ffi_fit_viewport(points: Vec<GeoPoint>, config: ViewportConfig) -> Viewport {
    init_logging();
    fit_viewport_or_default(&points, &config)
}

// ============================================================================
// Stops
// ============================================================================

/// Reorder stops nearest-first from the origin.
#[uniffi::export]
pub fn ffi_reorder_stops(origin: GeoPoint, stops: Vec<Stop>) -> Vec<Stop> {
    init_logging();
    info!(
        "[RouteGeometryRust] reorder_stops called with {} stops",
        stops.len()
    );
    reorder_by_distance(origin, &stops)
}

/// Sort stops by their existing order.
#[uniffi::export]
pub fn ffi_sort_stops(stops: Vec<Stop>) -> Vec<Stop> {
    init_logging();
    sort_by_order(&stops)
}

// ============================================================================
// Presentation
// ============================================================================

#[uniffi::export]
pub fn ffi_format_distance(meters: f64) -> String {
    init_logging();
    format_distance(meters)
}

#[uniffi::export]
pub fn ffi_format_duration(seconds: f64) -> String {
    init_logging();
    format_duration(seconds)
}

#[uniffi::export]
pub fn ffi_leg_summary(leg: RouteLeg) -> LegSummary {
    init_logging();
    leg.summary()
}

#[uniffi::export]
pub fn ffi_stroke_for_leg(style: MapStyle, leg: RouteLeg) -> Stroke {
    init_logging();
    style.stroke_for(&leg)
}

/// Default configuration as JSON, for screens to tweak and pass back.
#[uniffi::export]
pub fn ffi_default_config_json() -> String {
    init_logging();
    RouteCoreConfig::default().to_json().unwrap_or_else(|_| "{}".to_string())
}

// ============================================================================
// Route Resolution
// ============================================================================

/// Provider used when the real one cannot be constructed.
struct Unavailable(String);

#[async_trait]
impl RoutingProvider for Unavailable {
    async fn route(&self, _request: &RouteRequest) -> Result<ProviderRoute> {
        Err(RouteError::provider(self.0.clone()))
    }
}

/// Resolve the trip path and per-stop legs (blocking).
///
/// Never fails: configuration, runtime or network problems all surface as
/// fallback legs.
#[uniffi::export]
pub fn ffi_resolve_trip_detail(
    api_key: String,
    config_json: String,
    origin: GeoPoint,
    stops: Vec<Stop>,
) -> TripRoutes {
    use tokio::runtime::Runtime;

    init_logging();
    info!(
        "[RouteGeometryRust] resolve_trip_detail called with {} stops",
        stops.len()
    );

    let config = RouteCoreConfig::from_json(&config_json).unwrap_or_else(|e| {
        warn!("[RouteGeometryRust] {}, using defaults", e);
        RouteCoreConfig::default()
    });

    let client = DirectionsClient::new(DirectionsConfig::with_api_key(api_key));
    let rt = Runtime::new();

    match (client, rt) {
        (Ok(client), Ok(rt)) => {
            let resolver = RouteResolver::with_config(client, config.resolver);
            rt.block_on(resolver.resolve_trip_detail(origin, &stops))
        }
        (Err(e), _) => {
            warn!("[RouteGeometryRust] Failed to create client: {}", e);
            offline_detail(e.to_string(), config, origin, &stops)
        }
        (_, Err(e)) => {
            warn!("[RouteGeometryRust] Failed to create tokio runtime: {}", e);
            offline_detail(format!("Runtime error: {}", e), config, origin, &stops)
        }
    }
}

fn offline_detail(
    reason: String,
    config: RouteCoreConfig,
    origin: GeoPoint,
    stops: &[Stop],
) -> TripRoutes {
    let resolver = RouteResolver::with_config(Unavailable(reason), config.resolver);
    futures::executor::block_on(resolver.resolve_trip_detail(origin, stops))
}
