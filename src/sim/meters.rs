//! Run-scoped counters: the countdown clock, base integrity, and score
//!
//! All three are recreated at game start; none survives a session reset.

use serde::{Deserialize, Serialize};

use super::units::EnemyKind;

/// Countdown clock. Reaching zero is terminal (time-up).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameTimer {
    duration_secs: f32,
    remaining_secs: f32,
}

impl GameTimer {
    pub fn new(duration_secs: f32) -> Self {
        Self {
            duration_secs,
            remaining_secs: duration_secs,
        }
    }

    /// Count down, clamped at zero
    pub fn advance(&mut self, dt: f32) {
        self.remaining_secs = (self.remaining_secs - dt).max(0.0);
    }

    #[inline]
    pub fn remaining_secs(&self) -> f32 {
        self.remaining_secs
    }

    #[inline]
    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    #[inline]
    pub fn is_expired(&self) -> bool {
        self.remaining_secs <= 0.0
    }
}

/// Base structure integrity. `is_dead` is terminal (player-death).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseHealth {
    max_health: u32,
    current_health: u32,
}

impl BaseHealth {
    pub fn new(max_health: u32) -> Self {
        Self {
            max_health,
            current_health: max_health,
        }
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current_health = self.current_health.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.current_health = self.current_health.saturating_add(amount).min(self.max_health);
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current_health
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max_health
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.current_health == 0
    }

    /// Remaining health as a fraction of max, for display
    pub fn fraction(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.current_health as f32 / self.max_health as f32
        }
    }
}

/// Cumulative run score and per-tier kill counts. Monotonically non-decreasing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameScore {
    total: u64,
    kills: [u32; EnemyKind::COUNT],
}

impl GameScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_kill(&mut self, kind: EnemyKind) {
        self.total += kind.score_value();
        self.kills[kind.index()] += 1;
    }

    #[inline]
    pub fn total(&self) -> u64 {
        self.total
    }

    #[inline]
    pub fn kills_of(&self, kind: EnemyKind) -> u32 {
        self.kills[kind.index()]
    }

    pub fn total_kills(&self) -> u32 {
        self.kills.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_timer_counts_down_and_clamps() {
        let mut timer = GameTimer::new(10.0);
        assert_eq!(timer.remaining_secs(), 10.0);
        assert!(!timer.is_expired());

        timer.advance(4.0);
        assert!((timer.remaining_secs() - 6.0).abs() < 0.001);

        timer.advance(100.0);
        assert_eq!(timer.remaining_secs(), 0.0);
        assert!(timer.is_expired());
    }

    #[test]
    fn test_fresh_base_is_full_and_alive() {
        for max in [1, 7, 500] {
            let base = BaseHealth::new(max);
            assert_eq!(base.current(), max);
            assert!(!base.is_dead());
        }
    }

    #[test]
    fn test_base_death_at_zero() {
        let mut base = BaseHealth::new(3);
        base.take_damage(2);
        assert!(!base.is_dead());
        base.take_damage(5);
        assert_eq!(base.current(), 0);
        assert!(base.is_dead());
    }

    #[test]
    fn test_score_accumulates_per_tier() {
        let mut score = GameScore::new();
        score.record_kill(EnemyKind::Grunt);
        score.record_kill(EnemyKind::Grunt);
        score.record_kill(EnemyKind::Brute);
        assert_eq!(score.kills_of(EnemyKind::Grunt), 2);
        assert_eq!(score.kills_of(EnemyKind::Runner), 0);
        assert_eq!(score.kills_of(EnemyKind::Brute), 1);
        assert_eq!(
            score.total(),
            2 * EnemyKind::Grunt.score_value() + EnemyKind::Brute.score_value()
        );
        assert_eq!(score.total_kills(), 3);
    }

    proptest! {
        // Damage then heal by the same amount restores prior health, for
        // damage not exceeding current health.
        #[test]
        fn prop_damage_heal_inverse(max in 1u32..10_000, d in 0u32..10_000) {
            let mut base = BaseHealth::new(max);
            let d = d.min(base.current());
            let before = base.current();
            base.take_damage(d);
            base.heal(d);
            prop_assert_eq!(base.current(), before);
        }

        // Health stays within [0, max] under any operation sequence.
        #[test]
        fn prop_health_stays_bounded(max in 1u32..1_000, ops in proptest::collection::vec((any::<bool>(), 0u32..2_000), 0..50)) {
            let mut base = BaseHealth::new(max);
            for (damage, amount) in ops {
                if damage {
                    base.take_damage(amount);
                } else {
                    base.heal(amount);
                }
                prop_assert!(base.current() <= max);
                prop_assert_eq!(base.is_dead(), base.current() == 0);
            }
        }
    }
}
