//! Geographic utilities: great-circle and planar distances, path length.

use geo::{Distance, Haversine, Point};

use crate::GeoPoint;

/// Haversine distance between two points in meters.
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Euclidean distance on raw degree coordinates.
///
/// Not a geographic distance. Only meaningful for ranking points that are
/// close together relative to one origin.
pub fn planar_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let dlat = p2.latitude - p1.latitude;
    let dlng = p2.longitude - p1.longitude;
    (dlat * dlat + dlng * dlng).sqrt()
}

/// Total great-circle length of a path in meters.
pub fn path_length(points: &[GeoPoint]) -> f64 {
    points
        .windows(2)
        .fold(0.0, |total, w| total + haversine_distance(&w[0], &w[1]))
}
