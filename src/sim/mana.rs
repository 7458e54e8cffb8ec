//! Mana pool and discrete regeneration
//!
//! Generation happens in whole fixed-size intervals. The generator keeps a
//! last-generation marker and advances it by exactly `count × interval`, so
//! sub-interval remainders carry over and the cadence never drifts.
//! A decreasing clock is reported as an error, not clamped: it means the time
//! source upstream is misbehaving.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ManaTuning;

/// Mana subsystem failures
#[derive(Debug, Clone, PartialEq)]
pub enum ManaError {
    /// Pool ids must be non-empty
    EmptyId,
    /// The clock handed to the generator moved backwards
    TimeRegression { current: f64, last: f64 },
}

impl fmt::Display for ManaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManaError::EmptyId => write!(f, "mana pool id must not be empty"),
            ManaError::TimeRegression { current, last } => write!(
                f,
                "game time regressed: current {current:.3} < last generation {last:.3}"
            ),
        }
    }
}

impl std::error::Error for ManaError {}

/// The spendable resource. `0 <= current <= max` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManaPool {
    id: String,
    current: u32,
    max: u32,
}

impl ManaPool {
    pub fn new(id: impl Into<String>, max: u32, starting: u32) -> Result<Self, ManaError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ManaError::EmptyId);
        }
        Ok(Self {
            id,
            current: starting.min(max),
            max,
        })
    }

    /// Add mana, clamped at the ceiling. Returns how much was actually
    /// banked; the excess is discarded, not held over.
    pub fn add(&mut self, amount: u32) -> u32 {
        let before = self.current;
        self.current = self.current.saturating_add(amount).min(self.max);
        self.current - before
    }

    #[inline]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.current >= cost
    }

    /// Deduct `cost` if affordable; no partial spend
    pub fn try_spend(&mut self, cost: u32) -> bool {
        if self.can_afford(cost) {
            self.current -= cost;
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Drift-free interval generator for a mana pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManaGenerator {
    interval_secs: f64,
    unit_amount: u32,
    last_generation: f64,
}

impl ManaGenerator {
    pub fn new(tuning: &ManaTuning) -> Self {
        Self {
            interval_secs: tuning.generation_interval_secs,
            unit_amount: tuning.unit_amount,
            last_generation: 0.0,
        }
    }

    /// Reject a clock that moved behind the last generation marker
    pub fn validate_game_time(&self, now: f64) -> Result<(), ManaError> {
        if now < self.last_generation {
            return Err(ManaError::TimeRegression {
                current: now,
                last: self.last_generation,
            });
        }
        Ok(())
    }

    /// Whole generation intervals elapsed since the marker
    pub fn due_ticks(&self, now: f64) -> u32 {
        if now <= self.last_generation {
            return 0;
        }
        ((now - self.last_generation) / self.interval_secs) as u32
    }

    pub fn should_generate(&self, now: f64) -> bool {
        self.due_ticks(now) > 0
    }

    /// When the next generation tick becomes due
    pub fn next_generation_time(&self) -> f64 {
        self.last_generation + self.interval_secs
    }

    #[inline]
    pub fn last_generation(&self) -> f64 {
        self.last_generation
    }

    /// Validate the clock, bank any due generation ticks, and move the
    /// marker by exactly the intervals consumed. Returns the mana banked.
    ///
    /// Callers must skip this entirely while the session is paused; the
    /// marker then stays untouched and no time is considered elapsed.
    pub fn advance(&mut self, pool: &mut ManaPool, now: f64) -> Result<u32, ManaError> {
        self.validate_game_time(now)?;
        let count = self.due_ticks(now);
        if count == 0 {
            return Ok(0);
        }
        let added = pool.add(count.saturating_mul(self.unit_amount));
        self.last_generation += count as f64 * self.interval_secs;
        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn tuning() -> ManaTuning {
        ManaTuning {
            max_mana: 10,
            starting_mana: 0,
            generation_interval_secs: 1.0,
            unit_amount: 1,
        }
    }

    fn pool() -> ManaPool {
        ManaPool::new("test", 10, 0).unwrap()
    }

    #[test]
    fn test_empty_id_is_rejected() {
        assert!(matches!(ManaPool::new("", 10, 0), Err(ManaError::EmptyId)));
    }

    #[test]
    fn test_add_clamps_at_max() {
        let mut p = pool();
        assert_eq!(p.add(4), 4);
        assert_eq!(p.add(100), 6);
        assert_eq!(p.current(), 10);
    }

    #[test]
    fn test_spend_is_atomic() {
        let mut p = pool();
        p.add(5);
        assert!(!p.try_spend(6));
        assert_eq!(p.current(), 5);
        assert!(p.try_spend(5));
        assert_eq!(p.current(), 0);
    }

    #[test]
    fn test_due_ticks_counts_whole_intervals() {
        let g = ManaGenerator::new(&tuning());
        assert_eq!(g.due_ticks(0.0), 0);
        assert_eq!(g.due_ticks(0.99), 0);
        assert!(!g.should_generate(0.99));
        assert_eq!(g.due_ticks(1.0), 1);
        assert_eq!(g.due_ticks(3.7), 3);
        assert!(g.should_generate(3.7));
    }

    #[test]
    fn test_advance_preserves_remainder() {
        let mut g = ManaGenerator::new(&tuning());
        let mut p = pool();
        assert_eq!(g.advance(&mut p, 2.6).unwrap(), 2);
        // Marker moved by whole intervals only; the 0.6s remainder carries
        assert!((g.last_generation() - 2.0).abs() < 1e-9);
        assert_eq!(g.advance(&mut p, 3.1).unwrap(), 1);
        assert!((g.last_generation() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_time_regression_is_an_error() {
        let mut g = ManaGenerator::new(&tuning());
        let mut p = pool();
        g.advance(&mut p, 5.0).unwrap();
        let err = g.advance(&mut p, 4.0).unwrap_err();
        assert!(matches!(err, ManaError::TimeRegression { .. }));
        // Marker and pool untouched by the rejected call
        assert!((g.last_generation() - 5.0).abs() < 1e-9);
        assert_eq!(p.current(), 5);
    }

    #[test]
    fn test_excess_generation_is_discarded() {
        let mut g = ManaGenerator::new(&tuning());
        let mut p = pool();
        // 50 intervals elapsed but the pool holds 10 at most
        assert_eq!(g.advance(&mut p, 50.0).unwrap(), 10);
        assert_eq!(p.current(), 10);
        assert_eq!(g.advance(&mut p, 51.0).unwrap(), 0);
        assert_eq!(p.current(), 10);
    }

    proptest! {
        // currentMana <= maxMana after any sequence of generation calls.
        #[test]
        fn prop_generation_never_exceeds_max(times in proptest::collection::vec(0.0f64..500.0, 1..40)) {
            let mut g = ManaGenerator::new(&tuning());
            let mut p = pool();
            let mut sorted = times;
            sorted.sort_by(f64::total_cmp);
            for now in sorted {
                let _ = g.advance(&mut p, now);
                prop_assert!(p.current() <= p.max());
            }
        }
    }
}
