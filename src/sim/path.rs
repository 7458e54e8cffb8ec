//! Movement corridor geometry
//!
//! A `MovementPath` is an immutable polyline. Enemies are positioned by a
//! single scalar: distance traveled from the spawn point. Precomputed
//! cumulative segment lengths make `position_at` a segment lookup plus a
//! lerp.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Rejected path construction
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// A corridor needs at least two waypoints
    TooFewWaypoints(usize),
    /// Spawn and base endpoints must not coincide
    CoincidentEndpoints,
    /// Total arc length must be positive
    ZeroLength,
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::TooFewWaypoints(n) => {
                write!(f, "movement path needs at least 2 waypoints, got {n}")
            }
            PathError::CoincidentEndpoints => {
                write!(f, "movement path spawn and base points coincide")
            }
            PathError::ZeroLength => write!(f, "movement path has zero length"),
        }
    }
}

impl std::error::Error for PathError {}

/// A fixed route from spawn point to base point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementPath {
    waypoints: Vec<Vec2>,
    /// Arc length from the spawn point to each waypoint
    cumulative: Vec<f32>,
    total_length: f32,
}

impl MovementPath {
    pub fn new(waypoints: Vec<Vec2>) -> Result<Self, PathError> {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints(waypoints.len()));
        }
        if waypoints[0].distance_squared(waypoints[waypoints.len() - 1]) < f32::EPSILON {
            return Err(PathError::CoincidentEndpoints);
        }

        let mut cumulative = Vec::with_capacity(waypoints.len());
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in waypoints.windows(2) {
            total += pair[0].distance(pair[1]);
            cumulative.push(total);
        }
        if total <= 0.0 {
            return Err(PathError::ZeroLength);
        }

        Ok(Self {
            waypoints,
            cumulative,
            total_length: total,
        })
    }

    /// Where enemies enter the corridor
    #[inline]
    pub fn spawn_point(&self) -> Vec2 {
        self.waypoints[0]
    }

    /// Where the base sits
    #[inline]
    pub fn base_point(&self) -> Vec2 {
        self.waypoints[self.waypoints.len() - 1]
    }

    #[inline]
    pub fn total_length(&self) -> f32 {
        self.total_length
    }

    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }

    /// World position at the given distance along the path (clamped)
    pub fn position_at(&self, progress: f32) -> Vec2 {
        let progress = progress.clamp(0.0, self.total_length);

        // Find the segment containing `progress`
        let seg = match self
            .cumulative
            .iter()
            .position(|&c| c >= progress)
        {
            Some(0) | None => return self.waypoints[0],
            Some(i) => i - 1,
        };

        let seg_start = self.cumulative[seg];
        let seg_len = self.cumulative[seg + 1] - seg_start;
        if seg_len <= 0.0 {
            return self.waypoints[seg];
        }
        let t = (progress - seg_start) / seg_len;
        self.waypoints[seg].lerp(self.waypoints[seg + 1], t)
    }

    /// Shortest distance from a point to the corridor polyline
    pub fn distance_to(&self, point: Vec2) -> f32 {
        self.waypoints
            .windows(2)
            .map(|pair| dist_point_segment(point, pair[0], pair[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Built-in corridor candidates for a field of the given size.
    ///
    /// One is chosen at random per session.
    pub fn standard_corridors(width: f32, height: f32) -> Vec<Self> {
        let w = width;
        let h = height;
        let routes = [
            // Straight shot across the middle
            vec![Vec2::new(0.0, h * 0.5), Vec2::new(w, h * 0.5)],
            // S-bend
            vec![
                Vec2::new(0.0, h * 0.2),
                Vec2::new(w * 0.4, h * 0.2),
                Vec2::new(w * 0.4, h * 0.8),
                Vec2::new(w * 0.8, h * 0.8),
                Vec2::new(w * 0.8, h * 0.4),
                Vec2::new(w, h * 0.4),
            ],
            // Descending zig-zag
            vec![
                Vec2::new(0.0, h * 0.85),
                Vec2::new(w * 0.3, h * 0.85),
                Vec2::new(w * 0.5, h * 0.3),
                Vec2::new(w * 0.75, h * 0.6),
                Vec2::new(w, h * 0.6),
            ],
        ];
        routes
            .into_iter()
            .filter_map(|wps| Self::new(wps).ok())
            .collect()
    }
}

/// Distance from `p` to the segment `a`-`b`
fn dist_point_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_path() -> MovementPath {
        MovementPath::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(100.0, 0.0),
            Vec2::new(100.0, 50.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_construction_validates() {
        assert_eq!(
            MovementPath::new(vec![Vec2::ZERO]),
            Err(PathError::TooFewWaypoints(1))
        );
        assert_eq!(
            MovementPath::new(vec![Vec2::new(5.0, 5.0), Vec2::new(5.0, 5.0)]),
            Err(PathError::CoincidentEndpoints)
        );
        assert!(MovementPath::new(vec![Vec2::ZERO, Vec2::new(10.0, 0.0)]).is_ok());
    }

    #[test]
    fn test_endpoints_and_length() {
        let path = l_path();
        assert_eq!(path.spawn_point(), Vec2::new(0.0, 0.0));
        assert_eq!(path.base_point(), Vec2::new(100.0, 50.0));
        assert!((path.total_length() - 150.0).abs() < 0.001);
    }

    #[test]
    fn test_position_at_walks_segments() {
        let path = l_path();
        assert_eq!(path.position_at(0.0), Vec2::new(0.0, 0.0));
        assert_eq!(path.position_at(50.0), Vec2::new(50.0, 0.0));
        // Past the corner onto the second segment
        let p = path.position_at(125.0);
        assert!((p.x - 100.0).abs() < 0.001);
        assert!((p.y - 25.0).abs() < 0.001);
        // Clamped at both ends
        assert_eq!(path.position_at(-10.0), path.spawn_point());
        assert_eq!(path.position_at(1e6), path.base_point());
    }

    #[test]
    fn test_distance_to_polyline() {
        let path = l_path();
        assert!((path.distance_to(Vec2::new(50.0, 30.0)) - 30.0).abs() < 0.001);
        assert!((path.distance_to(Vec2::new(100.0, 25.0)) - 0.0).abs() < 0.001);
        // Beyond the base endpoint, distance is to the endpoint itself
        assert!((path.distance_to(Vec2::new(100.0, 60.0)) - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_standard_corridors_are_valid() {
        let corridors = MovementPath::standard_corridors(960.0, 540.0);
        assert!(!corridors.is_empty());
        for path in corridors {
            assert!(path.total_length() > 0.0);
            assert!(path.waypoints().len() >= 2);
        }
    }
}
