//! Route resolution against an external routing provider.
//!
//! The resolver asks a [`RoutingProvider`] for a routed path and decodes the
//! provider's encoded polyline into a [`RouteLeg`]. Any provider failure
//! (network, status, malformed body, no routes, empty geometry) degrades to a
//! deterministic straight-line leg marked `is_fallback`, so a screen always
//! has something to draw. There are no retries and no caching: one attempt
//! per request, and the caller owns the results.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::codec::try_decode_polyline;
use crate::error::{Result, RouteError};
use crate::geo_utils::path_length;
use crate::sequencer::{sort_by_order, stop_locations, Stop};
use crate::GeoPoint;

// ============================================================================
// Provider Interface
// ============================================================================

/// A routing request: origin, ordered intermediate waypoints, destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub origin: GeoPoint,
    pub destination: GeoPoint,
    pub waypoints: Vec<GeoPoint>,
}

impl RouteRequest {
    /// Single origin/destination request.
    pub fn leg(origin: GeoPoint, destination: GeoPoint) -> Self {
        Self {
            origin,
            destination,
            waypoints: Vec::new(),
        }
    }

    /// The request's points joined by straight lines.
    pub fn straight_path(&self) -> Vec<GeoPoint> {
        let mut path = Vec::with_capacity(self.waypoints.len() + 2);
        path.push(self.origin);
        path.extend_from_slice(&self.waypoints);
        path.push(self.destination);
        path
    }
}

/// What a provider returns for a successful request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRoute {
    /// Encoded polyline of the whole route
    pub encoded_path: String,
    /// Total distance in meters
    pub distance_meters: f64,
    /// Total duration in seconds
    pub duration_seconds: f64,
}

/// An external routing service.
///
/// Implementations report every failure as an `Err`; the resolver decides
/// how to degrade.
#[async_trait]
pub trait RoutingProvider: Send + Sync {
    async fn route(&self, request: &RouteRequest) -> Result<ProviderRoute>;
}

#[async_trait]
impl<P: RoutingProvider + ?Sized> RoutingProvider for Arc<P> {
    async fn route(&self, request: &RouteRequest) -> Result<ProviderRoute> {
        (**self).route(request).await
    }
}

// ============================================================================
// Resolved Types
// ============================================================================

/// A routed (or straight-line fallback) path with its totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct RouteLeg {
    pub path: Vec<GeoPoint>,
    /// Distance in meters
    pub distance_meters: f64,
    /// Duration in seconds
    pub duration_seconds: f64,
    /// True when `path` is a straight-line approximation, not a provider route
    pub is_fallback: bool,
}

/// Trip-level route plus one leg per stop, keyed by stop id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
pub struct TripRoutes {
    pub trip: RouteLeg,
    pub legs: HashMap<String, RouteLeg>,
}

impl TripRoutes {
    /// The origin-to-stop leg for a stop.
    pub fn leg(&self, stop_id: &str) -> Option<&RouteLeg> {
        self.legs.get(stop_id)
    }

    /// Number of per-stop legs that fell back to straight lines.
    pub fn fallback_leg_count(&self) -> usize {
        self.legs.values().filter(|l| l.is_fallback).count()
    }
}

/// Resolver policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(default)]
pub struct ResolverConfig {
    /// Request per-stop legs concurrently instead of one after another.
    /// Default: false
    pub concurrent_legs: bool,
    /// Speed used to estimate fallback durations, in m/s.
    /// Default: None (fallback duration is 0)
    pub fallback_speed_mps: Option<f64>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            concurrent_legs: false,
            fallback_speed_mps: None,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<()> {
        if let Some(speed) = self.fallback_speed_mps {
            if !(speed.is_finite() && speed > 0.0) {
                return Err(RouteError::Config {
                    message: format!("fallback_speed_mps must be > 0, got {}", speed),
                });
            }
        }
        Ok(())
    }
}

// ============================================================================
// Route Resolver
// ============================================================================

/// Resolves trips and legs through a provider, falling back to straight lines.
pub struct RouteResolver<P> {
    provider: P,
    config: ResolverConfig,
}

impl<P: RoutingProvider> RouteResolver<P> {
    /// Create a resolver with default policy.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    pub fn with_config(provider: P, config: ResolverConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a multi-stop trip from `origin` through `stops` in order.
    ///
    /// The last stop is the destination, the rest are waypoints. With no
    /// stops there is nothing to route and the result is a fallback leg
    /// holding only the origin.
    pub async fn resolve_trip(&self, origin: GeoPoint, stops: &[GeoPoint]) -> RouteLeg {
        let Some((destination, waypoints)) = stops.split_last() else {
            debug!("[RouteResolver] Trip has no stops, nothing to route");
            return self.fallback(vec![origin]);
        };

        let request = RouteRequest {
            origin,
            destination: *destination,
            waypoints: waypoints.to_vec(),
        };
        self.resolve(&request).await
    }

    /// Resolve a single origin-to-destination leg.
    pub async fn resolve_leg(&self, origin: GeoPoint, destination: GeoPoint) -> RouteLeg {
        self.resolve(&RouteRequest::leg(origin, destination)).await
    }

    /// Resolve one leg from `origin` to each stop, keyed by stop id.
    ///
    /// Legs fail independently. Requests go out in slice order, one at a
    /// time unless `concurrent_legs` is set. If two stops share an id the
    /// later one's leg is kept.
    pub async fn resolve_stop_legs(
        &self,
        origin: GeoPoint,
        stops: &[Stop],
    ) -> HashMap<String, RouteLeg> {
        let mut legs = HashMap::with_capacity(stops.len());

        if self.config.concurrent_legs {
            let resolved = join_all(stops.iter().map(|stop| async move {
                (stop.id.clone(), self.resolve_leg(origin, stop.location).await)
            }))
            .await;
            legs.extend(resolved);
        } else {
            for stop in stops {
                let leg = self.resolve_leg(origin, stop.location).await;
                legs.insert(stop.id.clone(), leg);
            }
        }

        let fallbacks = legs.values().filter(|l| l.is_fallback).count();
        info!(
            "[RouteResolver] Resolved {} stop legs ({} fallback)",
            legs.len(),
            fallbacks
        );
        legs
    }

    /// Resolve the trip path and every per-stop leg for a detail view.
    ///
    /// The trip visits stops in ascending `order`. Per-stop legs keep input
    /// order, so duplicate ids resolve the same way as in
    /// [`resolve_stop_legs`](Self::resolve_stop_legs). The trip call and the
    /// leg calls are independent: a failure in one never affects the others.
    pub async fn resolve_trip_detail(&self, origin: GeoPoint, stops: &[Stop]) -> TripRoutes {
        let ordered = sort_by_order(stops);
        let locations = stop_locations(&ordered);

        let (trip, legs) = futures::join!(
            self.resolve_trip(origin, &locations),
            self.resolve_stop_legs(origin, stops)
        );

        TripRoutes { trip, legs }
    }

    async fn resolve(&self, request: &RouteRequest) -> RouteLeg {
        match self.try_route(request).await {
            Ok(leg) => {
                debug!(
                    "[RouteResolver] Routed {} waypoints: {} points, {:.0}m, {:.0}s",
                    request.waypoints.len(),
                    leg.path.len(),
                    leg.distance_meters,
                    leg.duration_seconds
                );
                leg
            }
            Err(e) => {
                warn!("[RouteResolver] {}, using straight-line fallback", e);
                self.fallback(request.straight_path())
            }
        }
    }

    async fn try_route(&self, request: &RouteRequest) -> Result<RouteLeg> {
        let route = self.provider.route(request).await?;

        if !is_non_negative(route.distance_meters) || !is_non_negative(route.duration_seconds) {
            return Err(RouteError::provider(format!(
                "invalid totals: {}m, {}s",
                route.distance_meters, route.duration_seconds
            )));
        }

        let path = match try_decode_polyline(&route.encoded_path) {
            Ok(path) => path,
            Err(e) => {
                warn!("[RouteResolver] {}, keeping partial path", e);
                e.into_partial()
            }
        };

        if path.is_empty() {
            return Err(RouteError::provider("route has no geometry"));
        }

        Ok(RouteLeg {
            path,
            distance_meters: route.distance_meters,
            duration_seconds: route.duration_seconds,
            is_fallback: false,
        })
    }

    /// Straight-line leg with a great-circle distance estimate.
    fn fallback(&self, path: Vec<GeoPoint>) -> RouteLeg {
        let distance_meters = path_length(&path);
        let duration_seconds = self
            .config
            .fallback_speed_mps
            .filter(|s| *s > 0.0)
            .map_or(0.0, |speed| distance_meters / speed);

        RouteLeg {
            path,
            distance_meters,
            duration_seconds,
            is_fallback: true,
        }
    }
}

fn is_non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode_polyline;
    use std::sync::Mutex;

    /// Provider that answers by destination and records every request.
    #[derive(Default)]
    struct ScriptedProvider {
        routes: HashMap<String, Result<ProviderRoute>>,
        requests: Mutex<Vec<RouteRequest>>,
    }

    fn key(p: &GeoPoint) -> String {
        format!("{:.5},{:.5}", p.latitude, p.longitude)
    }

    impl ScriptedProvider {
        fn answer(mut self, destination: GeoPoint, result: Result<ProviderRoute>) -> Self {
            self.routes.insert(key(&destination), result);
            self
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl RoutingProvider for ScriptedProvider {
        async fn route(&self, request: &RouteRequest) -> Result<ProviderRoute> {
            self.requests.lock().unwrap().push(request.clone());
            self.routes
                .get(&key(&request.destination))
                .cloned()
                .unwrap_or_else(|| Err(RouteError::provider("connection refused")))
        }
    }

    fn routed(path: &[GeoPoint], distance: f64, duration: f64) -> Result<ProviderRoute> {
        Ok(ProviderRoute {
            encoded_path: encode_polyline(path).unwrap(),
            distance_meters: distance,
            duration_seconds: duration,
        })
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(-33.86880, 151.20930)
    }

    fn s1() -> GeoPoint {
        GeoPoint::new(-33.87500, 151.21500)
    }

    fn s2() -> GeoPoint {
        GeoPoint::new(-33.88800, 151.19000)
    }

    #[tokio::test]
    async fn test_trip_success_decodes_path() {
        let road = vec![origin(), GeoPoint::new(-33.87, 151.21), s1(), s2()];
        let provider = ScriptedProvider::default().answer(s2(), routed(&road, 4200.0, 600.0));
        let resolver = RouteResolver::new(provider);

        let leg = resolver.resolve_trip(origin(), &[s1(), s2()]).await;
        assert!(!leg.is_fallback);
        assert_eq!(leg.path.len(), 4);
        assert_eq!(leg.distance_meters, 4200.0);
        assert_eq!(leg.duration_seconds, 600.0);

        let requests = resolver.provider().requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].origin, origin());
        assert_eq!(requests[0].waypoints, vec![s1()]);
        assert_eq!(requests[0].destination, s2());
    }

    #[tokio::test]
    async fn test_trip_network_failure_falls_back() {
        let resolver = RouteResolver::new(ScriptedProvider::default());

        let leg = resolver.resolve_trip(origin(), &[s1(), s2()]).await;
        assert!(leg.is_fallback);
        assert_eq!(leg.path, vec![origin(), s1(), s2()]);
        assert!(leg.distance_meters > 0.0);
        assert_eq!(leg.duration_seconds, 0.0);
    }

    #[tokio::test]
    async fn test_trip_no_routes_falls_back() {
        let provider = ScriptedProvider::default().answer(
            s2(),
            Err(RouteError::provider("response contained no routes")),
        );
        let resolver = RouteResolver::new(provider);

        let leg = resolver.resolve_trip(origin(), &[s1(), s2()]).await;
        assert!(leg.is_fallback);
        assert_eq!(leg.path, vec![origin(), s1(), s2()]);
    }

    #[tokio::test]
    async fn test_empty_geometry_falls_back() {
        let provider = ScriptedProvider::default().answer(
            s1(),
            Ok(ProviderRoute {
                encoded_path: String::new(),
                distance_meters: 100.0,
                duration_seconds: 30.0,
            }),
        );
        let resolver = RouteResolver::new(provider);

        let leg = resolver.resolve_leg(origin(), s1()).await;
        assert!(leg.is_fallback);
        assert_eq!(leg.path, vec![origin(), s1()]);
    }

    #[tokio::test]
    async fn test_invalid_totals_fall_back() {
        let provider = ScriptedProvider::default().answer(
            s1(),
            routed(&[origin(), s1()], f64::NAN, 30.0),
        );
        let resolver = RouteResolver::new(provider);
        assert!(resolver.resolve_leg(origin(), s1()).await.is_fallback);
    }

    #[tokio::test]
    async fn test_truncated_geometry_keeps_partial_path() {
        let mut encoded = encode_polyline(&[origin(), s1()]).unwrap();
        encoded.push('_'); // dangling continuation chunk
        let provider = ScriptedProvider::default().answer(
            s1(),
            Ok(ProviderRoute {
                encoded_path: encoded,
                distance_meters: 900.0,
                duration_seconds: 120.0,
            }),
        );
        let resolver = RouteResolver::new(provider);

        let leg = resolver.resolve_leg(origin(), s1()).await;
        assert!(!leg.is_fallback);
        assert_eq!(leg.path.len(), 2);
        assert_eq!(leg.distance_meters, 900.0);
    }

    #[tokio::test]
    async fn test_trip_without_stops_skips_provider() {
        let resolver = RouteResolver::new(ScriptedProvider::default());

        let leg = resolver.resolve_trip(origin(), &[]).await;
        assert!(leg.is_fallback);
        assert_eq!(leg.path, vec![origin()]);
        assert_eq!(leg.distance_meters, 0.0);
        assert_eq!(resolver.provider().request_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_duration_from_speed() {
        let config = ResolverConfig {
            fallback_speed_mps: Some(10.0),
            ..ResolverConfig::default()
        };
        let resolver = RouteResolver::with_config(ScriptedProvider::default(), config);

        let leg = resolver.resolve_leg(origin(), s1()).await;
        assert!(leg.is_fallback);
        assert!((leg.duration_seconds - leg.distance_meters / 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_leg_failures_are_independent() {
        let stops = vec![Stop::new("a", s1(), 1), Stop::new("b", s2(), 2)];

        for concurrent in [false, true] {
            let provider = ScriptedProvider::default()
                .answer(s1(), routed(&[origin(), s1()], 900.0, 120.0));
            let config = ResolverConfig {
                concurrent_legs: concurrent,
                ..ResolverConfig::default()
            };
            let resolver = RouteResolver::with_config(provider, config);
            let legs = resolver.resolve_stop_legs(origin(), &stops).await;

            assert_eq!(legs.len(), 2);
            assert!(!legs["a"].is_fallback);
            assert_eq!(legs["a"].distance_meters, 900.0);
            assert!(legs["b"].is_fallback);
            assert_eq!(legs["b"].path, vec![origin(), s2()]);
        }
    }

    #[tokio::test]
    async fn test_stop_legs_requested_in_stop_order() {
        let stops = vec![
            Stop::new("a", s2(), 1),
            Stop::new("b", s1(), 2),
            Stop::new("c", origin(), 3),
        ];
        let resolver = RouteResolver::new(ScriptedProvider::default());
        resolver.resolve_stop_legs(origin(), &stops).await;

        let requests = resolver.provider().requests.lock().unwrap();
        let destinations: Vec<GeoPoint> = requests.iter().map(|r| r.destination).collect();
        assert_eq!(destinations, vec![s2(), s1(), origin()]);
        assert!(requests.iter().all(|r| r.waypoints.is_empty()));
    }

    #[tokio::test]
    async fn test_trip_detail_orders_stops() {
        let road = vec![origin(), s1(), s2()];
        let provider = ScriptedProvider::default()
            .answer(s2(), routed(&road, 5000.0, 700.0))
            .answer(s1(), routed(&[origin(), s1()], 900.0, 120.0));
        let resolver = RouteResolver::new(provider);
        let stops = vec![Stop::new("second", s2(), 2), Stop::new("first", s1(), 1)];

        let routes = resolver.resolve_trip_detail(origin(), &stops).await;
        assert!(!routes.trip.is_fallback);
        assert_eq!(routes.legs.len(), 2);
        // s2's leg shares the trip answer since the script keys by destination
        assert!(!routes.leg("first").unwrap().is_fallback);
        assert!(!routes.leg("second").unwrap().is_fallback);
        assert_eq!(routes.fallback_leg_count(), 0);

        let requests = resolver.provider().requests.lock().unwrap();
        let trip_request = requests.iter().find(|r| !r.waypoints.is_empty()).unwrap();
        assert_eq!(trip_request.waypoints, vec![s1()]);
        assert_eq!(trip_request.destination, s2());
    }

    #[tokio::test]
    async fn test_duplicate_stop_ids_keep_later_input() {
        let near = GeoPoint::new(0.0, 0.1);
        let far = GeoPoint::new(0.0, 0.2);
        let start = GeoPoint::new(0.0, 0.0);
        let stops = vec![Stop::new("dup", far, 2), Stop::new("dup", near, 1)];

        let provider = ScriptedProvider::default()
            .answer(near, routed(&[start, near], 100.0, 10.0))
            .answer(far, routed(&[start, far], 200.0, 20.0));
        let resolver = RouteResolver::new(provider);

        let legs = resolver.resolve_stop_legs(start, &stops).await;
        let detail = resolver.resolve_trip_detail(start, &stops).await;

        assert_eq!(legs["dup"].distance_meters, 100.0);
        assert_eq!(detail.legs.len(), 1);
        assert_eq!(detail.legs["dup"], legs["dup"]);
        assert_eq!(*detail.legs["dup"].path.last().unwrap(), near);
        // Trip still follows `order`, ending at the higher-ordered stop
        assert_eq!(*detail.trip.path.last().unwrap(), far);
    }

    #[test]
    fn test_straight_path() {
        let request = RouteRequest {
            origin: origin(),
            destination: s2(),
            waypoints: vec![s1()],
        };
        assert_eq!(request.straight_path(), vec![origin(), s1(), s2()]);
    }

    #[test]
    fn test_config_validate() {
        assert!(ResolverConfig::default().validate().is_ok());
        let bad = ResolverConfig {
            fallback_speed_mps: Some(-1.0),
            ..ResolverConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
