//! HTTP routing provider for a Directions-style API.
//!
//! This module provides the concrete [`RoutingProvider`] used by the app:
//! - Connection pooling through a shared `reqwest` client
//! - One request per route, no retries (the resolver falls back instead)
//! - No timeout of its own unless one is configured
//!
//! The response shape is the common Directions JSON:
//! `{status, routes: [{overview_polyline: {points}, legs: [{distance: {value},
//! duration: {value}}]}]}`. Totals are summed across the route's legs.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{OptionExt, Result, RouteError};
use crate::resolver::{ProviderRoute, RouteRequest, RoutingProvider};
use crate::GeoPoint;

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";
const DEFAULT_MODE: &str = "driving";

// Connection pool size (one screen resolves at most a trip plus its stops)
const MAX_IDLE_PER_HOST: usize = 8;

/// Directions endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Travel mode query value. Default: "driving"
    pub mode: String,
    /// Per-request timeout. Default: None (client default)
    pub request_timeout: Option<Duration>,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            mode: DEFAULT_MODE.to_string(),
            request_timeout: None,
        }
    }
}

impl DirectionsConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }
}

/// API response for the directions endpoint
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<ApiRoute>,
}

#[derive(Debug, Deserialize)]
struct ApiRoute {
    overview_polyline: Option<ApiPolyline>,
    #[serde(default)]
    legs: Vec<ApiLeg>,
}

#[derive(Debug, Deserialize)]
struct ApiPolyline {
    points: String,
}

#[derive(Debug, Deserialize)]
struct ApiLeg {
    distance: Option<ApiValue>,
    duration: Option<ApiValue>,
}

#[derive(Debug, Deserialize)]
struct ApiValue {
    value: f64,
}

/// Routing provider backed by a Directions HTTP API.
pub struct DirectionsClient {
    client: Client,
    config: DirectionsConfig,
}

impl DirectionsClient {
    /// Create a new client for the given endpoint settings
    pub fn new(config: DirectionsConfig) -> Result<Self> {
        let mut builder = Client::builder().pool_max_idle_per_host(MAX_IDLE_PER_HOST);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(|e| RouteError::Config {
            message: format!("Failed to create HTTP client: {}", e),
        })?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    /// Query parameters for a request, in a stable order.
    fn query(&self, request: &RouteRequest) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("origin", format_point(&request.origin)),
            ("destination", format_point(&request.destination)),
        ];
        if !request.waypoints.is_empty() {
            let waypoints: Vec<String> = request.waypoints.iter().map(format_point).collect();
            query.push(("waypoints", waypoints.join("|")));
        }
        query.push(("mode", self.config.mode.clone()));
        if !self.config.api_key.is_empty() {
            query.push(("key", self.config.api_key.clone()));
        }
        query
    }
}

#[async_trait]
impl RoutingProvider for DirectionsClient {
    async fn route(&self, request: &RouteRequest) -> Result<ProviderRoute> {
        let start = Instant::now();

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&self.query(request))
            .send()
            .await
            .map_err(|e| RouteError::provider(format!("Request error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "[DirectionsClient] HTTP {} for {} waypoints",
                status,
                request.waypoints.len()
            );
            return Err(RouteError::provider_status(
                status.as_u16(),
                status.canonical_reason().unwrap_or("non-success status"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| RouteError::provider(format!("Body error: {}", e)))?;

        let route = parse_directions_response(&body)?;
        debug!(
            "[DirectionsClient] Routed in {}ms: {:.0}m, {:.0}s",
            start.elapsed().as_millis(),
            route.distance_meters,
            route.duration_seconds
        );
        Ok(route)
    }
}

/// `lat,lng` with the wire format's precision.
fn format_point(p: &GeoPoint) -> String {
    format!("{:.5},{:.5}", p.latitude, p.longitude)
}

/// Extract the first route from a Directions JSON body.
pub fn parse_directions_response(body: &str) -> Result<ProviderRoute> {
    let data: DirectionsResponse = serde_json::from_str(body)
        .map_err(|e| RouteError::provider(format!("Parse error: {}", e)))?;

    if let Some(status) = data.status.as_deref() {
        if status != "OK" {
            let message = match data.error_message {
                Some(detail) => format!("{}: {}", status, detail),
                None => status.to_string(),
            };
            return Err(RouteError::provider(message));
        }
    }

    let route = data
        .routes
        .into_iter()
        .next()
        .ok_or_provider("response contained no routes")?;

    let encoded_path = route
        .overview_polyline
        .map(|p| p.points)
        .filter(|p| !p.is_empty())
        .ok_or_provider("route has no overview polyline")?;

    let distance_meters = route
        .legs
        .iter()
        .filter_map(|l| l.distance.as_ref())
        .map(|v| v.value)
        .sum();
    let duration_seconds = route
        .legs
        .iter()
        .filter_map(|l| l.duration.as_ref())
        .map(|v| v.value)
        .sum();

    Ok(ProviderRoute {
        encoded_path,
        distance_meters,
        duration_seconds,
    })
}
