//! Hostile units and defensive structures
//!
//! Enemies travel the corridor by scalar progress; towers are static emplacements
//! with a range/damage/cooldown profile. Both live in generation-tagged arenas so
//! stale handles held by collaborators can never resolve to a recycled slot.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use super::path::MovementPath;

new_key_type! {
    /// Stable handle for a live enemy
    pub struct EnemyId;
    /// Stable handle for a placed tower
    pub struct TowerId;
}

/// Enemy tiers, weakest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Grunt,
    Runner,
    Brute,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Grunt, EnemyKind::Runner, EnemyKind::Brute];
    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub fn index(self) -> usize {
        match self {
            EnemyKind::Grunt => 0,
            EnemyKind::Runner => 1,
            EnemyKind::Brute => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::Grunt => "grunt",
            EnemyKind::Runner => "runner",
            EnemyKind::Brute => "brute",
        }
    }

    /// Hit points before wave scaling
    pub fn base_health(self) -> f32 {
        match self {
            EnemyKind::Grunt => 10.0,
            EnemyKind::Runner => 6.0,
            EnemyKind::Brute => 30.0,
        }
    }

    /// Corridor units per second
    pub fn speed(self) -> f32 {
        match self {
            EnemyKind::Grunt => 40.0,
            EnemyKind::Runner => 70.0,
            EnemyKind::Brute => 25.0,
        }
    }

    /// Damage dealt to the base on arrival
    pub fn attack_power(self) -> u32 {
        match self {
            EnemyKind::Grunt => 1,
            EnemyKind::Runner => 1,
            EnemyKind::Brute => 3,
        }
    }

    /// Score awarded when defeated
    pub fn score_value(self) -> u64 {
        match self {
            EnemyKind::Grunt => 10,
            EnemyKind::Runner => 15,
            EnemyKind::Brute => 40,
        }
    }
}

/// One hostile unit walking the corridor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub health: f32,
    pub max_health: f32,
    /// Distance traveled from the spawn point, in `[0, path.total_length()]`
    pub progress: f32,
    /// Global spawn order; the deterministic iteration and tie-break key
    pub spawn_seq: u64,
}

impl Enemy {
    /// Spawn at the corridor entrance, health scaled by wave number
    pub fn spawn(kind: EnemyKind, wave_number: u32, growth_per_wave: f32, spawn_seq: u64) -> Self {
        let scale = 1.0 + growth_per_wave * wave_number.saturating_sub(1) as f32;
        let health = kind.base_health() * scale;
        Self {
            kind,
            health,
            max_health: health,
            progress: 0.0,
            spawn_seq,
        }
    }

    /// Advance along the path; returns true on reaching the base
    pub fn advance(&mut self, dt: f32, path: &MovementPath) -> bool {
        self.progress += self.kind.speed() * dt;
        if self.progress >= path.total_length() {
            self.progress = path.total_length();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn position(&self, path: &MovementPath) -> Vec2 {
        path.position_at(self.progress)
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.health = (self.health - amount).max(0.0);
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health <= 0.0
    }

    /// Corridor distance still to walk before reaching the base
    #[inline]
    pub fn remaining_distance(&self, path: &MovementPath) -> f32 {
        path.total_length() - self.progress
    }
}

/// Tower archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    Arrow,
    Cannon,
    Sniper,
}

impl TowerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TowerKind::Arrow => "arrow",
            TowerKind::Cannon => "cannon",
            TowerKind::Sniper => "sniper",
        }
    }

    /// Baseline combat profile, before card abilities apply
    pub fn stats(self) -> TowerStats {
        match self {
            TowerKind::Arrow => TowerStats {
                range: 120.0,
                damage: 3.0,
                cooldown_secs: 0.7,
            },
            TowerKind::Cannon => TowerStats {
                range: 90.0,
                damage: 8.0,
                cooldown_secs: 1.8,
            },
            TowerKind::Sniper => TowerStats {
                range: 200.0,
                damage: 12.0,
                cooldown_secs: 2.5,
            },
        }
    }
}

/// Range/damage/cooldown profile of a placed tower
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TowerStats {
    pub range: f32,
    pub damage: f32,
    pub cooldown_secs: f32,
}

/// A placed defensive structure. Kind and position never change after placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub kind: TowerKind,
    pub position: Vec2,
    pub stats: TowerStats,
    /// Seconds until the tower may fire again
    pub cooldown: f32,
    /// Global placement order; the deterministic iteration key
    pub place_seq: u64,
}

impl Tower {
    pub fn new(kind: TowerKind, stats: TowerStats, position: Vec2, place_seq: u64) -> Self {
        Self {
            kind,
            position,
            stats,
            cooldown: 0.0,
            place_seq,
        }
    }

    pub fn advance_cooldown(&mut self, dt: f32) {
        self.cooldown = (self.cooldown - dt).max(0.0);
    }

    #[inline]
    pub fn ready(&self) -> bool {
        self.cooldown <= 0.0
    }

    /// Record a shot and start the cooldown
    pub fn fire(&mut self) {
        self.cooldown = self.stats.cooldown_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_path() -> MovementPath {
        MovementPath::new(vec![Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)]).unwrap()
    }

    #[test]
    fn test_enemy_spawns_at_entrance_with_scaled_health() {
        let e = Enemy::spawn(EnemyKind::Grunt, 1, 0.15, 0);
        assert_eq!(e.progress, 0.0);
        assert_eq!(e.health, EnemyKind::Grunt.base_health());

        // Wave 3 grunts carry two growth steps
        let e3 = Enemy::spawn(EnemyKind::Grunt, 3, 0.15, 1);
        assert!((e3.health - 13.0).abs() < 0.001);
        assert_eq!(e3.max_health, e3.health);
    }

    #[test]
    fn test_enemy_advance_reports_arrival() {
        let path = straight_path();
        let mut e = Enemy::spawn(EnemyKind::Runner, 1, 0.0, 0);
        assert!(!e.advance(1.0, &path)); // 70 of 100 units
        assert!(e.advance(1.0, &path)); // past the end
        assert_eq!(e.progress, path.total_length());
    }

    #[test]
    fn test_enemy_damage_floors_at_zero() {
        let mut e = Enemy::spawn(EnemyKind::Grunt, 1, 0.0, 0);
        e.take_damage(4.0);
        assert!(!e.is_dead());
        e.take_damage(100.0);
        assert!(e.is_dead());
        assert_eq!(e.health, 0.0);
    }

    #[test]
    fn test_tower_cooldown_cycle() {
        let mut t = Tower::new(
            TowerKind::Arrow,
            TowerKind::Arrow.stats(),
            Vec2::new(10.0, 10.0),
            0,
        );
        assert!(t.ready());
        t.fire();
        assert!(!t.ready());
        t.advance_cooldown(0.5);
        assert!(!t.ready());
        t.advance_cooldown(0.5);
        assert!(t.ready());
    }

    #[test]
    fn test_kind_tables_are_consistent() {
        for kind in EnemyKind::ALL {
            assert!(kind.base_health() > 0.0);
            assert!(kind.speed() > 0.0);
            assert!(kind.attack_power() > 0);
            assert_eq!(EnemyKind::ALL[kind.index()], kind);
        }
    }
}
