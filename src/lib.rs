//! Wardline - a corridor tower-defense simulation engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (session, waves, combat, end conditions)
//! - `cards`: Card economy (hand, pool, discovery library)
//! - `catalog`: Collaborator seams (card catalog, library store, time source)
//! - `config`: Data-driven game balance
//!
//! The crate performs no I/O inside the tick path. An external driver (see
//! `main.rs`) calls `GameSession::update` once per tick, issues commands
//! between ticks, and reads snapshots for display.

pub mod cards;
pub mod catalog;
pub mod config;
pub mod sim;

pub use cards::{Card, CardAbility, CardEffect, CardLibrary, CardPool, Hand};
pub use catalog::{CardCatalog, LibraryStore, TimeSource};
pub use config::Tuning;
pub use sim::session::{CommandError, GameSession, Snapshot};
pub use sim::{EndReason, GameEvent, HoverTarget};

/// Fixed-step defaults shared by the driver and tests
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
}
