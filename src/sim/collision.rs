//! Stateless spatial predicates
//!
//! Two consumers: tower placement validation (field bounds, footprint
//! overlap, corridor clearance) and tower targeting (enemies in range under
//! a total deterministic order, so target selection is reproducible).

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use std::fmt;

use super::path::MovementPath;
use super::units::{Enemy, EnemyId, Tower, TowerId};

/// A circular footprint or range
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        self.center.distance_squared(point) <= self.radius * self.radius
    }

    pub fn overlaps(&self, other: &Circle) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) < reach * reach
    }
}

/// Axis-aligned field bounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub fn from_size(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True if the whole circle lies inside the bounds
    pub fn contains_circle(&self, circle: &Circle) -> bool {
        circle.center.x - circle.radius >= self.min.x
            && circle.center.x + circle.radius <= self.max.x
            && circle.center.y - circle.radius >= self.min.y
            && circle.center.y + circle.radius <= self.max.y
    }
}

/// Why a candidate tower position was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementError {
    /// Footprint extends past the playable field
    OutOfBounds,
    /// Footprint overlaps an already-placed tower
    OverlapsTower,
    /// Too close to the movement corridor
    TooCloseToPath,
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "position is outside the playable field"),
            PlacementError::OverlapsTower => write!(f, "position overlaps an existing tower"),
            PlacementError::TooCloseToPath => {
                write!(f, "position is too close to the movement path")
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Validate a candidate tower position.
///
/// Valid iff the footprint lies within the field bounds, overlaps no
/// existing tower footprint, and keeps `clearance` distance from the path.
pub fn validate_placement(
    position: Vec2,
    footprint: f32,
    bounds: &Rect,
    towers: &SlotMap<TowerId, Tower>,
    path: &MovementPath,
    clearance: f32,
) -> Result<(), PlacementError> {
    let candidate = Circle::new(position, footprint);
    if !bounds.contains_circle(&candidate) {
        return Err(PlacementError::OutOfBounds);
    }
    for tower in towers.values() {
        if candidate.overlaps(&Circle::new(tower.position, footprint)) {
            return Err(PlacementError::OverlapsTower);
        }
    }
    if path.distance_to(position) < clearance {
        return Err(PlacementError::TooCloseToPath);
    }
    Ok(())
}

/// Enemies within a circular range, in firing-priority order.
///
/// Order is total and deterministic: closest-to-base first, then lowest
/// remaining health, then spawn order.
pub fn enemies_in_range(
    center: Vec2,
    range: f32,
    enemies: &SlotMap<EnemyId, Enemy>,
    path: &MovementPath,
) -> Vec<EnemyId> {
    let reach = Circle::new(center, range);
    let mut hits: Vec<(f32, f32, u64, EnemyId)> = enemies
        .iter()
        .filter(|(_, e)| reach.contains(e.position(path)))
        .map(|(id, e)| (e.remaining_distance(path), e.health, e.spawn_seq, id))
        .collect();
    hits.sort_by(|a, b| {
        a.0.total_cmp(&b.0)
            .then(a.1.total_cmp(&b.1))
            .then(a.2.cmp(&b.2))
    });
    hits.into_iter().map(|(_, _, _, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::units::{EnemyKind, TowerKind};

    fn straight_path() -> MovementPath {
        MovementPath::new(vec![Vec2::new(0.0, 100.0), Vec2::new(400.0, 100.0)]).unwrap()
    }

    fn place_tower(towers: &mut SlotMap<TowerId, Tower>, pos: Vec2) -> TowerId {
        let seq = towers.len() as u64;
        towers.insert(Tower::new(TowerKind::Arrow, TowerKind::Arrow.stats(), pos, seq))
    }

    fn spawn_at(
        enemies: &mut SlotMap<EnemyId, Enemy>,
        progress: f32,
        health: f32,
        seq: u64,
    ) -> EnemyId {
        let mut e = Enemy::spawn(EnemyKind::Grunt, 1, 0.0, seq);
        e.progress = progress;
        e.health = health;
        enemies.insert(e)
    }

    #[test]
    fn test_placement_rejects_out_of_bounds() {
        let bounds = Rect::from_size(400.0, 200.0);
        let towers = SlotMap::with_key();
        let path = straight_path();
        // Center inside but footprint pokes past the edge
        let err = validate_placement(Vec2::new(5.0, 50.0), 16.0, &bounds, &towers, &path, 24.0);
        assert_eq!(err, Err(PlacementError::OutOfBounds));
    }

    #[test]
    fn test_placement_rejects_tower_overlap() {
        let bounds = Rect::from_size(400.0, 200.0);
        let mut towers = SlotMap::with_key();
        let path = straight_path();
        place_tower(&mut towers, Vec2::new(200.0, 40.0));
        let err = validate_placement(Vec2::new(220.0, 40.0), 16.0, &bounds, &towers, &path, 24.0);
        assert_eq!(err, Err(PlacementError::OverlapsTower));
        // Far enough away is fine
        assert!(validate_placement(Vec2::new(300.0, 40.0), 16.0, &bounds, &towers, &path, 24.0).is_ok());
    }

    #[test]
    fn test_placement_rejects_path_proximity() {
        let bounds = Rect::from_size(400.0, 200.0);
        let towers = SlotMap::with_key();
        let path = straight_path();
        // 10 units from the corridor centerline
        let err = validate_placement(Vec2::new(200.0, 110.0), 16.0, &bounds, &towers, &path, 24.0);
        assert_eq!(err, Err(PlacementError::TooCloseToPath));
        assert!(validate_placement(Vec2::new(200.0, 150.0), 16.0, &bounds, &towers, &path, 24.0).is_ok());
    }

    #[test]
    fn test_targeting_orders_by_base_proximity() {
        let path = straight_path();
        let mut enemies = SlotMap::with_key();
        let near_base = spawn_at(&mut enemies, 300.0, 10.0, 0);
        let far = spawn_at(&mut enemies, 100.0, 10.0, 1);
        // Tower at the middle of the corridor sees both
        let order = enemies_in_range(Vec2::new(200.0, 100.0), 400.0, &enemies, &path);
        assert_eq!(order, vec![near_base, far]);
    }

    #[test]
    fn test_targeting_tie_breaks_are_deterministic() {
        let path = straight_path();
        let mut enemies = SlotMap::with_key();
        // Same progress: lower health wins
        let weak = spawn_at(&mut enemies, 200.0, 3.0, 1);
        let strong = spawn_at(&mut enemies, 200.0, 9.0, 0);
        // Same progress and health: earlier spawn wins
        let early = spawn_at(&mut enemies, 200.0, 3.0, 2);
        let order = enemies_in_range(Vec2::new(200.0, 100.0), 400.0, &enemies, &path);
        assert_eq!(order[0], weak);
        assert_eq!(order[1], early);
        assert_eq!(order[2], strong);
    }

    #[test]
    fn test_targeting_respects_range() {
        let path = straight_path();
        let mut enemies = SlotMap::with_key();
        spawn_at(&mut enemies, 0.0, 10.0, 0);
        let order = enemies_in_range(Vec2::new(400.0, 100.0), 50.0, &enemies, &path);
        assert!(order.is_empty());
    }
}
