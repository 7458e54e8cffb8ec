//! Game balance configuration
//!
//! Every knob the simulation treats as opaque tuning data lives here.
//! External collaborators may persist this as JSON; the defaults below are
//! the shipped balance.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::sim::end::EndPriority;

/// Countdown clock tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TimerTuning {
    /// Run length in seconds; reaching zero ends the run
    pub duration_secs: f32,
}

/// Base structure tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BaseTuning {
    /// Hit points the base starts with
    pub max_health: u32,
}

/// Mana regeneration tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ManaTuning {
    /// Pool ceiling; generation past this is discarded
    pub max_mana: u32,
    /// Mana held at game start
    pub starting_mana: u32,
    /// Seconds between generation ticks
    pub generation_interval_secs: f64,
    /// Mana added per generation tick
    pub unit_amount: u32,
}

/// Wave cadence and composition tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WaveTuning {
    /// Delay before wave 1 starts
    pub first_wave_delay_secs: f64,
    /// Gap between a wave completing and the next one starting
    pub wave_interval_secs: f64,
    /// Delay between consecutive spawns within a wave
    pub spawn_stagger_secs: f64,
    /// Enemy count of wave 1
    pub base_enemy_count: u32,
    /// Extra enemies per subsequent wave
    pub enemies_added_per_wave: u32,
    /// Hard cap on enemies in a single wave
    pub max_enemies_per_wave: u32,
    /// Fractional enemy health increase per wave past the first
    pub health_growth_per_wave: f32,
}

/// Playable field geometry tuning
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FieldTuning {
    /// Field width in world units
    pub width: f32,
    /// Field height in world units
    pub height: f32,
    /// Minimum distance between a tower center and the movement path
    pub path_clearance: f32,
    /// Tower footprint radius, used for overlap and bounds checks
    pub tower_footprint: f32,
}

/// Complete balance configuration for a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    pub timer: TimerTuning,
    pub base: BaseTuning,
    pub mana: ManaTuning,
    pub waves: WaveTuning,
    pub field: FieldTuning,
    /// Cards held at once; the opening draw fills the hand
    pub hand_size: usize,
    /// Which end condition wins when both hold on the same tick
    pub end_priority: EndPriority,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            timer: TimerTuning {
                duration_secs: 180.0,
            },
            base: BaseTuning { max_health: 20 },
            mana: ManaTuning {
                max_mana: 10,
                starting_mana: 4,
                generation_interval_secs: 1.0,
                unit_amount: 1,
            },
            waves: WaveTuning {
                first_wave_delay_secs: 5.0,
                wave_interval_secs: 30.0,
                spawn_stagger_secs: 0.8,
                base_enemy_count: 4,
                enemies_added_per_wave: 2,
                max_enemies_per_wave: 24,
                health_growth_per_wave: 0.15,
            },
            field: FieldTuning {
                width: 960.0,
                height: 540.0,
                path_clearance: 24.0,
                tower_footprint: 16.0,
            },
            hand_size: 8,
            end_priority: EndPriority::default(),
        }
    }
}

/// Rejected configuration
#[derive(Debug, Clone, PartialEq)]
pub enum TuningError {
    /// A knob that must be strictly positive was zero or negative
    NonPositive(&'static str),
    /// The worst-case spawn phase cannot finish before the next wave is due
    SpawnPhaseTooLong { worst_case_secs: f64, interval_secs: f64 },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::NonPositive(name) => {
                write!(f, "tuning value `{name}` must be positive")
            }
            TuningError::SpawnPhaseTooLong {
                worst_case_secs,
                interval_secs,
            } => write!(
                f,
                "worst-case spawn phase ({worst_case_secs:.1}s) does not fit \
                 inside the wave interval ({interval_secs:.1}s)"
            ),
        }
    }
}

impl std::error::Error for TuningError {}

impl Tuning {
    /// Reject configurations the scheduler cannot honor.
    ///
    /// A wave's spawn phase must always finish before the next wave could be
    /// due, otherwise the one-spawning-wave invariant would be violated.
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.timer.duration_secs <= 0.0 {
            return Err(TuningError::NonPositive("timer.duration_secs"));
        }
        if self.base.max_health == 0 {
            return Err(TuningError::NonPositive("base.max_health"));
        }
        if self.mana.max_mana == 0 {
            return Err(TuningError::NonPositive("mana.max_mana"));
        }
        if self.mana.generation_interval_secs <= 0.0 {
            return Err(TuningError::NonPositive("mana.generation_interval_secs"));
        }
        if self.waves.wave_interval_secs <= 0.0 {
            return Err(TuningError::NonPositive("waves.wave_interval_secs"));
        }
        if self.waves.spawn_stagger_secs <= 0.0 {
            return Err(TuningError::NonPositive("waves.spawn_stagger_secs"));
        }
        if self.waves.base_enemy_count == 0 {
            return Err(TuningError::NonPositive("waves.base_enemy_count"));
        }
        if self.waves.max_enemies_per_wave == 0 {
            return Err(TuningError::NonPositive("waves.max_enemies_per_wave"));
        }
        if self.field.width <= 0.0 || self.field.height <= 0.0 {
            return Err(TuningError::NonPositive("field dimensions"));
        }
        if self.field.tower_footprint <= 0.0 {
            return Err(TuningError::NonPositive("field.tower_footprint"));
        }
        if self.hand_size == 0 {
            return Err(TuningError::NonPositive("hand_size"));
        }

        let worst_case_secs =
            self.waves.max_enemies_per_wave as f64 * self.waves.spawn_stagger_secs;
        if worst_case_secs >= self.waves.wave_interval_secs {
            return Err(TuningError::SpawnPhaseTooLong {
                worst_case_secs,
                interval_secs: self.waves.wave_interval_secs,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tuning_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_spawn_phase_overflow_is_rejected() {
        let mut tuning = Tuning::default();
        // 24 enemies at 2s apiece cannot fit in a 30s interval
        tuning.waves.spawn_stagger_secs = 2.0;
        let err = tuning.validate().unwrap_err();
        assert!(matches!(err, TuningError::SpawnPhaseTooLong { .. }));
    }

    #[test]
    fn test_zero_knobs_are_rejected() {
        let mut tuning = Tuning::default();
        tuning.base.max_health = 0;
        assert_eq!(
            tuning.validate(),
            Err(TuningError::NonPositive("base.max_health"))
        );

        let mut tuning = Tuning::default();
        tuning.hand_size = 0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_tuning_roundtrips_through_json() {
        let tuning = Tuning::default();
        let json = serde_json::to_string(&tuning).unwrap();
        let restored: Tuning = serde_json::from_str(&json).unwrap();
        assert!((restored.timer.duration_secs - tuning.timer.duration_secs).abs() < f32::EPSILON);
        assert_eq!(restored.hand_size, tuning.hand_size);
    }
}
