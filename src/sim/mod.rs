//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed per-tick subsystem ordering (timer, mana, waves, motion, combat,
//!   bookkeeping, end condition)
//! - Seeded RNG only
//! - Stable iteration order (by spawn sequence)
//! - No rendering, storage, or platform dependencies

pub mod collision;
pub mod end;
pub mod event;
pub mod mana;
pub mod meters;
pub mod path;
pub mod session;
pub mod units;
pub mod wave;

pub use collision::{Circle, PlacementError, Rect};
pub use end::{EndConditionPolicy, EndPriority, EndReason};
pub use event::{GameEvent, HoverInfo, HoverTarget};
pub use mana::{ManaError, ManaGenerator, ManaPool};
pub use meters::{BaseHealth, GameScore, GameTimer};
pub use path::{MovementPath, PathError};
pub use session::{CommandError, GameSession, Snapshot};
pub use units::{Enemy, EnemyId, EnemyKind, Tower, TowerId, TowerKind, TowerStats};
pub use wave::{EnemyWave, WaveScheduler, WaveStats};
