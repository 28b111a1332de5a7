//! Per-screen route state.
//!
//! A [`RouteSession`] is owned by one screen and tracks the resolution of
//! the current origin and stop set: `Idle -> Loading -> Resolved | Fallback`
//! for the trip path and for each stop's leg. Every `begin` supersedes the
//! previous request; completions carry the [`RequestToken`] they were started
//! with and are discarded when the token is stale, so a slow response for an
//! old stop set can never overwrite the current one.
//!
//! [`StopSelection`] is the "focus one stop / show all" selector layered on
//! top of the resolved legs.

use std::collections::HashMap;

use log::debug;

use crate::resolver::{RouteLeg, RouteResolver, RoutingProvider, TripRoutes};
use crate::sequencer::Stop;
use crate::viewport::{fit_viewport_or_default, Viewport, ViewportConfig};
use crate::GeoPoint;

/// Resolution state of one route.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Resolved(RouteLeg),
    Fallback(RouteLeg),
}

impl LoadState {
    fn settled(leg: RouteLeg) -> Self {
        if leg.is_fallback {
            LoadState::Fallback(leg)
        } else {
            LoadState::Resolved(leg)
        }
    }

    /// The leg, once settled.
    pub fn leg(&self) -> Option<&RouteLeg> {
        match self {
            LoadState::Resolved(leg) | LoadState::Fallback(leg) => Some(leg),
            LoadState::Idle | LoadState::Loading => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Identifies one `begin` call. Completions must present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    generation: u64,
}

/// Route resolution state for the lifetime of one screen.
#[derive(Debug, Default)]
pub struct RouteSession {
    generation: u64,
    origin: Option<GeoPoint>,
    stops: Vec<Stop>,
    trip: LoadState,
    legs: HashMap<String, LoadState>,
}

impl RouteSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start resolving a new origin and stop set, superseding any request
    /// still in flight.
    pub fn begin(&mut self, origin: GeoPoint, stops: &[Stop]) -> RequestToken {
        self.generation += 1;
        self.origin = Some(origin);
        self.stops = stops.to_vec();
        self.trip = LoadState::Loading;
        self.legs = stops
            .iter()
            .map(|s| (s.id.clone(), LoadState::Loading))
            .collect();

        debug!(
            "[RouteSession] Generation {} loading {} stops",
            self.generation,
            stops.len()
        );
        RequestToken {
            generation: self.generation,
        }
    }

    /// Whether the token belongs to the latest `begin`.
    pub fn is_current(&self, token: RequestToken) -> bool {
        token.generation == self.generation && self.origin.is_some()
    }

    /// Store the trip-level result. Returns false if it was discarded.
    pub fn apply_trip(&mut self, token: RequestToken, leg: RouteLeg) -> bool {
        if !self.is_current(token) {
            debug!(
                "[RouteSession] Discarding stale trip result (generation {} != {})",
                token.generation, self.generation
            );
            return false;
        }
        self.trip = LoadState::settled(leg);
        true
    }

    /// Store one stop's leg. Returns false if stale or the stop is unknown.
    pub fn apply_leg(&mut self, token: RequestToken, stop_id: &str, leg: RouteLeg) -> bool {
        if !self.is_current(token) {
            debug!(
                "[RouteSession] Discarding stale leg for {} (generation {} != {})",
                stop_id, token.generation, self.generation
            );
            return false;
        }
        match self.legs.get_mut(stop_id) {
            Some(state) => {
                *state = LoadState::settled(leg);
                true
            }
            None => false,
        }
    }

    /// Store a full trip-detail result. Returns false if it was discarded.
    pub fn apply_routes(&mut self, token: RequestToken, routes: TripRoutes) -> bool {
        if !self.apply_trip(token, routes.trip) {
            return false;
        }
        for (stop_id, leg) in routes.legs {
            self.apply_leg(token, &stop_id, leg);
        }
        true
    }

    /// Begin, resolve and apply in one go.
    pub async fn refresh<P: RoutingProvider>(
        &mut self,
        resolver: &RouteResolver<P>,
        origin: GeoPoint,
        stops: &[Stop],
    ) -> bool {
        let token = self.begin(origin, stops);
        let routes = resolver.resolve_trip_detail(origin, stops).await;
        self.apply_routes(token, routes)
    }

    /// Back to idle; in-flight results will be discarded.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.origin = None;
        self.stops.clear();
        self.trip = LoadState::Idle;
        self.legs.clear();
    }

    /// Whether `origin` or `stops` differ from what is currently loaded.
    pub fn needs_refresh(&self, origin: GeoPoint, stops: &[Stop]) -> bool {
        self.origin != Some(origin) || self.stops != stops
    }

    pub fn origin(&self) -> Option<GeoPoint> {
        self.origin
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn trip_state(&self) -> &LoadState {
        &self.trip
    }

    pub fn leg_state(&self, stop_id: &str) -> Option<&LoadState> {
        self.legs.get(stop_id)
    }

    /// True once the trip and every leg have a result.
    pub fn is_settled(&self) -> bool {
        self.trip.leg().is_some() && self.legs.values().all(|s| s.leg().is_some())
    }

    /// Everything resolved so far; unresolved legs are left out.
    pub fn routes(&self) -> Option<TripRoutes> {
        let trip = self.trip.leg()?.clone();
        let legs = self
            .legs
            .iter()
            .filter_map(|(id, state)| state.leg().map(|leg| (id.clone(), leg.clone())))
            .collect();
        Some(TripRoutes { trip, legs })
    }
}

/// Which stop, if any, the map is focused on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopSelection {
    selected_stop_id: Option<String>,
}

impl StopSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(&mut self, stop_id: impl Into<String>) {
        self.selected_stop_id = Some(stop_id.into());
    }

    /// Show all stops again.
    pub fn clear(&mut self) {
        self.selected_stop_id = None;
    }

    /// Select a stop, or clear if it is already selected.
    pub fn toggle(&mut self, stop_id: &str) {
        if self.selected() == Some(stop_id) {
            self.clear();
        } else {
            self.select(stop_id);
        }
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected_stop_id.as_deref()
    }

    /// The path to highlight: the selected stop's leg, else the trip path.
    pub fn focused_path<'a>(&self, routes: &'a TripRoutes) -> &'a [GeoPoint] {
        self.selected()
            .and_then(|id| routes.leg(id))
            .unwrap_or(&routes.trip)
            .path
            .as_slice()
    }

    /// Frame the origin plus the selected stop and its leg, or every stop
    /// and the trip path when nothing (or an unknown stop) is selected.
    pub fn viewport(
        &self,
        origin: Option<GeoPoint>,
        routes: Option<&TripRoutes>,
        stops: &[Stop],
        config: &ViewportConfig,
    ) -> Viewport {
        let mut points: Vec<GeoPoint> = origin.into_iter().collect();

        let selected = self
            .selected()
            .and_then(|id| stops.iter().find(|s| s.id == id));

        match selected {
            Some(stop) => {
                points.push(stop.location);
                if let Some(leg) = routes.and_then(|r| r.leg(&stop.id)) {
                    points.extend_from_slice(&leg.path);
                }
            }
            None => {
                points.extend(stops.iter().map(|s| s.location));
                if let Some(routes) = routes {
                    points.extend_from_slice(&routes.trip.path);
                }
            }
        }

        fit_viewport_or_default(&points, config)
    }
}
