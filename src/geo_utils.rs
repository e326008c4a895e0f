//! # Geographic Utilities
//!
//! Core geographic computation utilities for route tracking.
//!
//! This module provides the fundamental geographic operations used throughout the
//! guidance core. All functions are designed to be efficient and accurate for the
//! short distances that matter in turn-by-turn navigation (meters to kilometers).
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`haversine_distance`] | Great-circle distance between two GPS points |
//! | [`polyline_length`] | Total length of a polyline in meters |
//! | [`point_to_segment_distance`] | Distance from a fix to a polyline segment |
//! | [`min_distance_to_polyline`] | Minimum corridor distance from a fix to a track |
//! | [`compute_bounds`] | Bounding box of a polyline |
//! | [`meters_to_degrees`] | Convert meters to approximate degrees at a latitude |
//!
//! ## Example
//!
//! ```rust
//! use route_tracker::{GeoPoint, geo_utils};
//!
//! let path = vec![
//!     GeoPoint::new(51.5074, -0.1278),  // London
//!     GeoPoint::new(51.5080, -0.1290),
//!     GeoPoint::new(51.5090, -0.1300),
//! ];
//!
//! let length = geo_utils::polyline_length(&path);
//! println!("Path length: {:.0}m", length);
//!
//! let fix = GeoPoint::new(51.5082, -0.1295);
//! let deviation = geo_utils::min_distance_to_polyline(&fix, &path);
//! println!("Deviation from path: {:.0}m", deviation);
//! ```
//!
//! ## Algorithm Notes
//!
//! ### Haversine Formula
//!
//! The haversine formula calculates the great-circle distance between two points on a
//! sphere. It's the standard method for GPS distance calculation, accurate to within
//! 0.3% for most practical applications.
//!
//! ### Point-to-Segment Distance
//!
//! Corridor checks project the fix and segment endpoints onto a local tangent plane
//! (equirectangular approximation centered on the segment start) and compute a planar
//! point-to-segment distance. At navigation scales (segments of tens to hundreds of
//! meters) the projection error is negligible compared to GPS noise.
//!
//! ### Coordinate System
//!
//! All functions expect WGS84 coordinates (latitude/longitude in degrees), the
//! standard used by GPS receivers and mapping services.

use geo::{Point, Haversine, Distance};
use crate::{GeoPoint, Bounds};

// Meters per degree of latitude on the WGS84 ellipsoid (mean value).
const METERS_PER_DEGREE_LAT: f64 = 110_574.0;
// Meters per degree of longitude at the equator.
const METERS_PER_DEGREE_LNG: f64 = 111_320.0;

// =============================================================================
// Distance Functions
// =============================================================================

/// Calculate the great-circle distance between two GPS points using the Haversine formula.
///
/// Returns the distance in meters along the Earth's surface (assuming a spherical Earth
/// with radius 6,371 km).
///
/// # Example
///
/// ```rust
/// use route_tracker::{GeoPoint, geo_utils};
///
/// let london = GeoPoint::new(51.5074, -0.1278);
/// let paris = GeoPoint::new(48.8566, 2.3522);
///
/// let distance = geo_utils::haversine_distance(&london, &paris);
/// assert!((distance - 343_560.0).abs() < 1000.0); // ~344 km
/// ```
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Calculate the total length of a polyline in meters.
///
/// Sums the haversine distance between consecutive points. Empty or single-point
/// polylines return 0.0.
pub fn polyline_length(points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

/// Distance in meters from a fix to the segment between `a` and `b`.
///
/// The fix and segment are projected onto a local tangent plane centered on `a`
/// before computing a planar point-to-segment distance. Degenerate segments
/// (`a == b`) fall back to point distance.
///
/// # Example
///
/// ```rust
/// use route_tracker::{GeoPoint, geo_utils};
///
/// let a = GeoPoint::new(51.5000, -0.1300);
/// let b = GeoPoint::new(51.5000, -0.1200);
/// let fix = GeoPoint::new(51.5001, -0.1250); // ~11m north of the segment
///
/// let dist = geo_utils::point_to_segment_distance(&fix, &a, &b);
/// assert!(dist > 5.0 && dist < 20.0);
/// ```
pub fn point_to_segment_distance(fix: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat_rad = a.latitude.to_radians();
    let mx = METERS_PER_DEGREE_LNG * lat_rad.cos().max(0.01);
    let my = METERS_PER_DEGREE_LAT;

    let px = (fix.longitude - a.longitude) * mx;
    let py = (fix.latitude - a.latitude) * my;
    let bx = (b.longitude - a.longitude) * mx;
    let by = (b.latitude - a.latitude) * my;

    let seg_len_sq = bx * bx + by * by;
    if seg_len_sq == 0.0 {
        return haversine_distance(fix, a);
    }

    let t = ((px * bx + py * by) / seg_len_sq).clamp(0.0, 1.0);
    let dx = px - t * bx;
    let dy = py - t * by;
    (dx * dx + dy * dy).sqrt()
}

/// Minimum distance in meters from a fix to any segment of a polyline.
///
/// This is the corridor check used by off-route detection: a fix farther than the
/// corridor threshold from every segment is off the path. Returns `f64::INFINITY`
/// for polylines with fewer than two points.
pub fn min_distance_to_polyline(fix: &GeoPoint, points: &[GeoPoint]) -> f64 {
    if points.len() < 2 {
        return f64::INFINITY;
    }

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        points
            .par_windows(2)
            .map(|w| point_to_segment_distance(fix, &w[0], &w[1]))
            .reduce(|| f64::INFINITY, f64::min)
    }

    #[cfg(not(feature = "parallel"))]
    {
        points
            .windows(2)
            .map(|w| point_to_segment_distance(fix, &w[0], &w[1]))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Convert meters to approximate degrees at a given latitude.
///
/// At the equator, 1 degree ≈ 111,320 meters; the longitude scale shrinks with
/// cos(latitude). Returns a single conservative value suitable for bounding box
/// calculations where a square search area is acceptable.
#[inline]
pub fn meters_to_degrees(meters: f64, latitude: f64) -> f64 {
    let lat_rad = latitude.to_radians();
    let meters_per_degree = METERS_PER_DEGREE_LNG * lat_rad.cos().max(0.1);
    meters / meters_per_degree
}

// =============================================================================
// Bounding Box Functions
// =============================================================================

/// Compute the bounding box of a polyline.
///
/// Returns a [`Bounds`] struct containing the minimum and maximum latitude/longitude
/// values that enclose all points. For empty input, returns a bounds with MIN/MAX
/// values that will fail any containment check.
pub fn compute_bounds(points: &[GeoPoint]) -> Bounds {
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

    Bounds { min_lat, max_lat, min_lng, max_lng }
}

// =============================================================================
// Unit Tests
// =============================================================================
