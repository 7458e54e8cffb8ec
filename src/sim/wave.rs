//! Wave cadence and composition
//!
//! The scheduler is a three-state machine:
//! `Idle → Spawning → Settling → Idle (next wave scheduled)`.
//! Wave numbers are strictly increasing and at most one wave is ever in its
//! spawn phase. Stagger timestamps are anchored to the wave's scheduled
//! start, not to when the scheduler observed it, so spawn cadence never
//! drifts.

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use super::event::GameEvent;
use super::units::{Enemy, EnemyId, EnemyKind};
use crate::config::WaveTuning;

/// One planned spawn within a wave
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub kind: EnemyKind,
    /// Seconds after the wave's start time
    pub delay: f64,
}

/// Decide a wave's composition from its number.
///
/// Counts grow linearly up to the configured cap. Runners appear from wave
/// 2, brutes from wave 4; the mix is deterministic in the wave number.
pub fn compose_wave(wave_number: u32, tuning: &WaveTuning) -> Vec<SpawnEntry> {
    let count = tuning
        .base_enemy_count
        .saturating_add(
            tuning
                .enemies_added_per_wave
                .saturating_mul(wave_number.saturating_sub(1)),
        )
        .min(tuning.max_enemies_per_wave);

    (0..count)
        .map(|i| {
            let kind = if wave_number >= 4 && i % 5 == 4 {
                EnemyKind::Brute
            } else if wave_number >= 2 && i % 3 == 2 {
                EnemyKind::Runner
            } else {
                EnemyKind::Grunt
            };
            SpawnEntry {
                kind,
                delay: i as f64 * tuning.spawn_stagger_secs,
            }
        })
        .collect()
}

/// A scheduled batch of enemy spawns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyWave {
    entries: Vec<SpawnEntry>,
    /// The wave's scheduled start time; stagger delays are relative to this
    started_at: f64,
    spawned: usize,
    /// Handles of everything this wave released, for the settling check
    spawned_ids: Vec<EnemyId>,
}

impl EnemyWave {
    pub fn new(entries: Vec<SpawnEntry>, started_at: f64) -> Self {
        let capacity = entries.len();
        Self {
            entries,
            started_at,
            spawned: 0,
            spawned_ids: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn spawned(&self) -> usize {
        self.spawned
    }

    pub fn fully_spawned(&self) -> bool {
        self.spawned >= self.entries.len()
    }

    /// Fraction of the wave released so far
    pub fn progress(&self) -> f32 {
        if self.entries.is_empty() {
            1.0
        } else {
            self.spawned as f32 / self.entries.len() as f32
        }
    }
}

/// Scheduler phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Waiting for the next wave's start time
    Idle,
    /// Releasing staggered spawns
    Spawning,
    /// Fully spawned; waiting for the wave's enemies to be gone
    Settling,
}

/// Read-only scheduler statistics for presentation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveStats {
    pub wave_number: u32,
    pub is_active: bool,
    pub next_wave_time: f64,
    /// Within-wave spawn progress, 0..=1
    pub spawn_progress: f32,
}

/// Orchestrates wave cadence over the session clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaveScheduler {
    phase: WavePhase,
    /// The wave currently running, or the next to start while idle
    wave_number: u32,
    next_wave_time: f64,
    current: Option<EnemyWave>,
}

impl WaveScheduler {
    pub fn new(tuning: &WaveTuning) -> Self {
        Self {
            phase: WavePhase::Idle,
            wave_number: 1,
            next_wave_time: tuning.first_wave_delay_secs,
            current: None,
        }
    }

    #[inline]
    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    #[inline]
    pub fn wave_number(&self) -> u32 {
        self.wave_number
    }

    #[inline]
    pub fn next_wave_time(&self) -> f64 {
        self.next_wave_time
    }

    pub fn is_active(&self) -> bool {
        self.phase != WavePhase::Idle
    }

    pub fn stats(&self) -> WaveStats {
        WaveStats {
            wave_number: self.wave_number,
            is_active: self.is_active(),
            next_wave_time: self.next_wave_time,
            spawn_progress: self.current.as_ref().map_or(0.0, EnemyWave::progress),
        }
    }

    /// Advance the state machine to `now`, releasing due spawns into the
    /// enemy arena. Callers skip this entirely while paused, which freezes
    /// the machine without resetting it.
    pub fn update(
        &mut self,
        now: f64,
        tuning: &WaveTuning,
        enemies: &mut SlotMap<EnemyId, Enemy>,
        next_spawn_seq: &mut u64,
        events: &mut Vec<GameEvent>,
    ) {
        if self.phase == WavePhase::Idle && now >= self.next_wave_time {
            let entries = compose_wave(self.wave_number, tuning);
            log::info!(
                "wave {} starting with {} enemies",
                self.wave_number,
                entries.len()
            );
            events.push(GameEvent::WaveStarted {
                wave_number: self.wave_number,
                enemy_count: entries.len() as u32,
            });
            // Anchor stagger to the scheduled start time, not `now`
            self.current = Some(EnemyWave::new(entries, self.next_wave_time));
            self.phase = WavePhase::Spawning;
        }

        if self.phase == WavePhase::Spawning {
            if let Some(wave) = self.current.as_mut() {
                while wave.spawned < wave.entries.len() {
                    let entry = wave.entries[wave.spawned];
                    if wave.started_at + entry.delay > now {
                        break;
                    }
                    let seq = *next_spawn_seq;
                    *next_spawn_seq += 1;
                    let id = enemies.insert(Enemy::spawn(
                        entry.kind,
                        self.wave_number,
                        tuning.health_growth_per_wave,
                        seq,
                    ));
                    wave.spawned_ids.push(id);
                    wave.spawned += 1;
                    log::debug!("spawned {} ({} of {})", entry.kind.as_str(), wave.spawned, wave.total());
                    events.push(GameEvent::EnemySpawned {
                        id,
                        kind: entry.kind,
                    });
                }
                if wave.fully_spawned() {
                    self.phase = WavePhase::Settling;
                }
            }
        }

        if self.phase == WavePhase::Settling {
            let cleared = self
                .current
                .as_ref()
                .is_none_or(|w| w.spawned_ids.iter().all(|id| !enemies.contains_key(*id)));
            if cleared {
                log::info!("wave {} cleared", self.wave_number);
                events.push(GameEvent::WaveCompleted {
                    wave_number: self.wave_number,
                });
                self.wave_number += 1;
                self.next_wave_time = now + tuning.wave_interval_secs;
                self.current = None;
                self.phase = WavePhase::Idle;
            }
        }
    }
}
