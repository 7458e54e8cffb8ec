//! Collaborator seams: card catalog, discovery store, time source
//!
//! The simulation core never does I/O. Everything here runs strictly before
//! `start_game` or after `end_game`, outside the tick path. Corrupt or
//! missing persisted data is recovered by defaulting and logging, never by
//! failing the simulation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cards::{Card, CardAbility, CardLibrary, CardPool};
use crate::sim::units::TowerKind;

/// Monotonic-enough wall clock, injectable for deterministic testing.
/// Only card discovery timestamps consume this; the simulation clock is
/// the accumulated tick time.
pub trait TimeSource {
    /// Seconds since the epoch
    fn now(&self) -> f64;
}

/// Real wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> f64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0)
    }
}

/// Frozen clock for tests and reproducible runs
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub f64);

impl TimeSource for FixedClock {
    fn now(&self) -> f64 {
        self.0
    }
}

/// Catalog loading failures
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    Unavailable,
    Corrupt(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Unavailable => write!(f, "card catalog is unavailable"),
            CatalogError::Corrupt(detail) => write!(f, "card catalog is corrupt: {detail}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Supplies the card pool a session starts from
pub trait CardCatalog {
    fn load(&self) -> Result<CardPool, CatalogError>;
    fn is_available(&self) -> bool;
}

/// The shipped starter catalog
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog;

/// (id, name, cost, kind, ability)
const TOWER_CARDS: &[(&str, &str, u32, TowerKind, CardAbility)] = &[
    ("arrow-basic", "Arrow Tower", 2, TowerKind::Arrow, CardAbility::None),
    ("arrow-reach", "Longbow Post", 3, TowerKind::Arrow, CardAbility::LongReach),
    ("arrow-rapid", "Quickshot Post", 3, TowerKind::Arrow, CardAbility::RapidFire),
    ("arrow-heavy", "Warbow Post", 4, TowerKind::Arrow, CardAbility::HeavyShot),
    ("cannon-basic", "Cannon Mount", 4, TowerKind::Cannon, CardAbility::None),
    ("cannon-reach", "Long Cannon", 5, TowerKind::Cannon, CardAbility::LongReach),
    ("cannon-rapid", "Autoloader", 5, TowerKind::Cannon, CardAbility::RapidFire),
    ("cannon-heavy", "Siege Cannon", 6, TowerKind::Cannon, CardAbility::HeavyShot),
    ("sniper-basic", "Sniper Nest", 5, TowerKind::Sniper, CardAbility::None),
    ("sniper-reach", "Eagle Eye", 6, TowerKind::Sniper, CardAbility::LongReach),
    ("sniper-rapid", "Marksman Pair", 6, TowerKind::Sniper, CardAbility::RapidFire),
    ("sniper-heavy", "Railgun Nest", 7, TowerKind::Sniper, CardAbility::HeavyShot),
];

/// (id, name, cost)
const UTILITY_CARDS: &[(&str, &str, u32)] = &[
    ("scout-report", "Scout Report", 0),
    ("war-chest", "War Chest", 1),
    ("rally-cry", "Rally Cry", 1),
    ("field-repairs", "Field Repairs", 2),
];

impl StaticCatalog {
    pub fn starter_cards() -> Vec<Card> {
        let mut cards: Vec<Card> = TOWER_CARDS
            .iter()
            .map(|&(id, name, cost, kind, ability)| Card::tower(id, name, cost, kind, ability))
            .collect();
        cards.extend(
            UTILITY_CARDS
                .iter()
                .map(|&(id, name, cost)| Card::utility(id, name, cost)),
        );
        cards
    }
}

impl CardCatalog for StaticCatalog {
    fn load(&self) -> Result<CardPool, CatalogError> {
        CardPool::from_cards(Self::starter_cards())
            .map_err(|err| CatalogError::Corrupt(err.to_string()))
    }

    fn is_available(&self) -> bool {
        true
    }
}

/// Persists the discovery library between plays
pub trait LibraryStore {
    /// Load the persisted library. Corrupt or missing data recovers to an
    /// empty library; this never fails.
    fn load(&self) -> CardLibrary;
    fn save(&self, library: &CardLibrary) -> io::Result<()>;
    fn exists(&self) -> bool;
    fn delete(&self) -> io::Result<()>;
}

/// Serialized library entry
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredEntry {
    card: Card,
    discovered_at: f64,
}

/// JSON-file-backed discovery store
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LibraryStore for JsonFileStore {
    fn load(&self) -> CardLibrary {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("no card library at {}, starting fresh", self.path.display());
                return CardLibrary::new();
            }
            Err(err) => {
                log::warn!(
                    "failed to read card library {}: {err}; starting fresh",
                    self.path.display()
                );
                return CardLibrary::new();
            }
        };
        match serde_json::from_str::<Vec<StoredEntry>>(&json) {
            Ok(entries) => {
                let library = CardLibrary::from_entries(
                    entries.into_iter().map(|e| (e.card, e.discovered_at)),
                );
                log::info!(
                    "loaded card library ({} discovered) from {}",
                    library.len(),
                    self.path.display()
                );
                library
            }
            Err(err) => {
                log::warn!(
                    "card library {} is corrupt: {err}; starting fresh",
                    self.path.display()
                );
                CardLibrary::new()
            }
        }
    }

    fn save(&self, library: &CardLibrary) -> io::Result<()> {
        let entries: Vec<StoredEntry> = library
            .entries()
            .map(|e| StoredEntry {
                card: e.card.clone(),
                discovered_at: e.discovered_at,
            })
            .collect();
        let json = serde_json::to_string_pretty(&entries).map_err(io::Error::other)?;
        fs::write(&self.path, json)?;
        log::info!(
            "saved card library ({} discovered) to {}",
            entries.len(),
            self.path.display()
        );
        Ok(())
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn delete(&self) -> io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
