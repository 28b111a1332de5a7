//! Delivery stop sequencing.
//!
//! Stops are visited either in their explicit `order`, or reordered
//! nearest-first from an origin. Both paths use a stable sort, so duplicate
//! orders and equidistant stops keep their input position. Neither path
//! mutates the caller's slice; callers persist the returned sequence.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::geo_utils::planar_distance;
use crate::GeoPoint;

/// Delivery progress of a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Enum))]
#[serde(rename_all = "camelCase")]
pub enum DeliveryState {
    #[default]
    Pending,
    Delivered,
}

/// A delivery stop within a trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ffi", derive(uniffi::Record))]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    /// Opaque identifier from the trip data source
    pub id: String,
    pub location: GeoPoint,
    /// Visiting position, 1-based. Not guaranteed unique.
    pub order: u32,
    #[serde(default)]
    pub delivery_state: DeliveryState,
}

impl Stop {
    /// Create a pending stop.
    pub fn new(id: impl Into<String>, location: GeoPoint, order: u32) -> Self {
        Self {
            id: id.into(),
            location,
            order,
            delivery_state: DeliveryState::Pending,
        }
    }

    /// Mark this stop as delivered.
    pub fn mark_delivered(&mut self) {
        self.delivery_state = DeliveryState::Delivered;
    }

    pub fn is_pending(&self) -> bool {
        self.delivery_state == DeliveryState::Pending
    }
}

/// Reorder stops nearest-first from `origin` and reassign `order` from 1.
///
/// Distance is planar Euclidean on raw degrees, not geodesic: this ranks
/// stops around one origin, it does not solve for a shortest route.
/// Equidistant stops keep their input order.
///
/// # Example
/// ```
/// use route_geometry::{reorder_by_distance, GeoPoint, Stop};
///
/// let depot = GeoPoint::new(0.0, 0.0);
/// let stops = vec![
///     Stop::new("far", GeoPoint::new(0.0, 0.3), 1),
///     Stop::new("near", GeoPoint::new(0.0, 0.1), 2),
/// ];
/// let ordered = reorder_by_distance(depot, &stops);
/// assert_eq!(ordered[0].id, "near");
/// assert_eq!(ordered[0].order, 1);
/// ```
pub fn reorder_by_distance(origin: GeoPoint, stops: &[Stop]) -> Vec<Stop> {
    let mut ranked: Vec<(f64, &Stop)> = stops
        .iter()
        .map(|s| (planar_distance(&origin, &s.location), s))
        .collect();

    // sort_by is stable; NaN distances sink to the end
    ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or_else(|| nan_last(a.0, b.0)));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (_, stop))| Stop {
            order: i as u32 + 1,
            ..stop.clone()
        })
        .collect()
}

fn nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Sort stops ascending by their existing `order`, keeping input order for
/// duplicates. `order` values are left as they are.
pub fn sort_by_order(stops: &[Stop]) -> Vec<Stop> {
    let mut sorted = stops.to_vec();
    sorted.sort_by_key(|s| s.order);
    sorted
}

/// The pending stop with the lowest `order`, first in input order on ties.
pub fn next_pending(stops: &[Stop]) -> Option<&Stop> {
    stops
        .iter()
        .filter(|s| s.is_pending())
        .min_by_key(|s| s.order)
}

/// Locations of the stops, in slice order.
pub fn stop_locations(stops: &[Stop]) -> Vec<GeoPoint> {
    stops.iter().map(|s| s.location).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depot() -> GeoPoint {
        GeoPoint::new(-33.8688, 151.2093)
    }

    fn ids(stops: &[Stop]) -> Vec<&str> {
        stops.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn test_reorder_by_increasing_distance() {
        let origin = depot();
        let stops = vec![
            Stop::new("c", GeoPoint::new(origin.latitude + 0.30, origin.longitude), 1),
            Stop::new("a", GeoPoint::new(origin.latitude, origin.longitude + 0.01), 2),
            Stop::new("d", GeoPoint::new(origin.latitude - 0.50, origin.longitude), 3),
            Stop::new("b", GeoPoint::new(origin.latitude + 0.05, origin.longitude - 0.05), 4),
        ];

        let ordered = reorder_by_distance(origin, &stops);
        assert_eq!(ids(&ordered), vec!["a", "b", "c", "d"]);
        assert_eq!(
            ordered.iter().map(|s| s.order).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );

        let distances: Vec<f64> = ordered
            .iter()
            .map(|s| planar_distance(&origin, &s.location))
            .collect();
        assert!(distances.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_reorder_is_stable_for_equidistant_stops() {
        let origin = GeoPoint::new(0.0, 0.0);
        let stops = vec![
            Stop::new("east", GeoPoint::new(0.0, 0.1), 7),
            Stop::new("north", GeoPoint::new(0.1, 0.0), 3),
            Stop::new("west", GeoPoint::new(0.0, -0.1), 3),
        ];

        let ordered = reorder_by_distance(origin, &stops);
        assert_eq!(ids(&ordered), vec!["east", "north", "west"]);
    }

    #[test]
    fn test_reorder_does_not_mutate_input() {
        let origin = GeoPoint::new(0.0, 0.0);
        let stops = vec![
            Stop::new("far", GeoPoint::new(0.0, 1.0), 1),
            Stop::new("near", GeoPoint::new(0.0, 0.5), 2),
        ];
        let snapshot = stops.clone();
        let _ = reorder_by_distance(origin, &stops);
        assert_eq!(stops, snapshot);
    }

    #[test]
    fn test_reorder_keeps_delivery_state() {
        let origin = GeoPoint::new(0.0, 0.0);
        let mut done = Stop::new("done", GeoPoint::new(0.0, 0.2), 1);
        done.mark_delivered();
        let stops = vec![done, Stop::new("todo", GeoPoint::new(0.0, 0.1), 2)];

        let ordered = reorder_by_distance(origin, &stops);
        assert_eq!(ordered[1].id, "done");
        assert_eq!(ordered[1].delivery_state, DeliveryState::Delivered);
    }

    #[test]
    fn test_reorder_empty() {
        assert!(reorder_by_distance(depot(), &[]).is_empty());
    }

    #[test]
    fn test_sort_by_order_with_duplicates_and_gaps() {
        let p = depot();
        let stops = vec![
            Stop::new("x", p, 5),
            Stop::new("y", p, 2),
            Stop::new("z", p, 5),
            Stop::new("w", p, 9),
            Stop::new("v", p, 2),
        ];

        let sorted = sort_by_order(&stops);
        assert_eq!(ids(&sorted), vec!["y", "v", "x", "z", "w"]);
        assert_eq!(
            sorted.iter().map(|s| s.order).collect::<Vec<_>>(),
            vec![2, 2, 5, 5, 9]
        );
    }

    #[test]
    fn test_next_pending() {
        let p = depot();
        let mut first = Stop::new("first", p, 1);
        first.mark_delivered();
        let stops = vec![Stop::new("third", p, 3), first, Stop::new("second", p, 2)];

        assert_eq!(next_pending(&stops).map(|s| s.id.as_str()), Some("second"));

        let mut all_done = stops.clone();
        all_done.iter_mut().for_each(Stop::mark_delivered);
        assert!(next_pending(&all_done).is_none());
    }

    #[test]
    fn test_stop_deserialize_defaults_pending() {
        let json = r#"{"id":"s1","location":{"latitude":1.0,"longitude":2.0},"order":1}"#;
        let stop: Stop = serde_json::from_str(json).unwrap();
        assert!(stop.is_pending());
        assert_eq!(stop.location, GeoPoint::new(1.0, 2.0));
    }
}
