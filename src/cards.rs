//! Card economy: hand, catalog pool, and the discovery library
//!
//! Independent of combat. Cards reference tower archetypes, but nothing in
//! here touches the live simulation; the session wires the two together.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::sim::units::{TowerKind, TowerStats};

/// Stat modifier a card grants its tower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CardAbility {
    #[default]
    None,
    /// +25% range
    LongReach,
    /// -30% cooldown
    RapidFire,
    /// +50% damage
    HeavyShot,
}

impl CardAbility {
    pub fn as_str(self) -> &'static str {
        match self {
            CardAbility::None => "none",
            CardAbility::LongReach => "long-reach",
            CardAbility::RapidFire => "rapid-fire",
            CardAbility::HeavyShot => "heavy-shot",
        }
    }

    /// Apply the modifier to a tower's baseline stats
    pub fn apply(self, stats: &mut TowerStats) {
        match self {
            CardAbility::None => {}
            CardAbility::LongReach => stats.range *= 1.25,
            CardAbility::RapidFire => stats.cooldown_secs *= 0.7,
            CardAbility::HeavyShot => stats.damage *= 1.5,
        }
    }
}

/// What playing a card does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardEffect {
    /// Places a tower at a chosen position
    Tower {
        kind: TowerKind,
        ability: CardAbility,
    },
    /// No combat effect; playable without a placement
    Utility,
}

/// A playable card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub cost: u32,
    pub effect: CardEffect,
}

impl Card {
    pub fn tower(
        id: impl Into<String>,
        name: impl Into<String>,
        cost: u32,
        kind: TowerKind,
        ability: CardAbility,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            effect: CardEffect::Tower { kind, ability },
        }
    }

    pub fn utility(id: impl Into<String>, name: impl Into<String>, cost: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cost,
            effect: CardEffect::Utility,
        }
    }
}

/// Hand mutation failures. Loud, with no partial mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandError {
    Full { capacity: usize },
    Duplicate(String),
    NotFound(String),
}

impl fmt::Display for HandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandError::Full { capacity } => write!(f, "hand is full ({capacity} cards)"),
            HandError::Duplicate(id) => write!(f, "hand already holds card `{id}`"),
            HandError::NotFound(id) => write!(f, "card `{id}` is not in hand"),
        }
    }
}

impl std::error::Error for HandError {}

/// The player's drawable cards: bounded, unique by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hand {
    capacity: usize,
    cards: Vec<Card>,
}

impl Hand {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            cards: Vec::with_capacity(capacity),
        }
    }

    pub fn add_card(&mut self, card: Card) -> Result<(), HandError> {
        if self.cards.len() >= self.capacity {
            return Err(HandError::Full {
                capacity: self.capacity,
            });
        }
        if self.contains(&card.id) {
            return Err(HandError::Duplicate(card.id));
        }
        self.cards.push(card);
        Ok(())
    }

    pub fn remove_card(&mut self, id: &str) -> Result<Card, HandError> {
        match self.cards.iter().position(|c| c.id == id) {
            Some(i) => Ok(self.cards.remove(i)),
            None => Err(HandError::NotFound(id.to_string())),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.cards.iter().any(|c| c.id == id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Empty the hand, returning its cards
    pub fn drain(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.cards)
    }
}

/// Pool construction/sampling failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    DuplicateId(String),
    NotEnoughCards { have: usize, need: usize },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::DuplicateId(id) => write!(f, "card pool has duplicate id `{id}`"),
            PoolError::NotEnoughCards { have, need } => {
                write!(f, "card pool holds {have} cards but {need} were requested")
            }
        }
    }
}

impl std::error::Error for PoolError {}

/// Immutable catalog of obtainable cards
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardPool {
    cards: BTreeMap<String, Card>,
}

impl CardPool {
    pub fn from_cards(cards: impl IntoIterator<Item = Card>) -> Result<Self, PoolError> {
        let mut map = BTreeMap::new();
        for card in cards {
            if map.contains_key(&card.id) {
                return Err(PoolError::DuplicateId(card.id));
            }
            map.insert(card.id.clone(), card);
        }
        Ok(Self { cards: map })
    }

    pub fn get(&self, id: &str) -> Option<&Card> {
        self.cards.get(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Uniform sample of `n` distinct cards, without replacement
    pub fn sample_distinct<R: Rng + ?Sized>(
        &self,
        n: usize,
        rng: &mut R,
    ) -> Result<Vec<Card>, PoolError> {
        if self.cards.len() < n {
            return Err(PoolError::NotEnoughCards {
                have: self.cards.len(),
                need: n,
            });
        }
        let all: Vec<&Card> = self.cards.values().collect();
        let picks = rand::seq::index::sample(rng, all.len(), n);
        Ok(picks.iter().map(|i| all[i].clone()).collect())
    }
}

/// One first-discovery record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveredCard {
    pub card: Card,
    /// Seconds since the epoch, from the injected time source
    pub discovered_at: f64,
}

/// Cross-play discovery log. Grows monotonically; a card is never
/// un-discovered and rediscovery keeps the original date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardLibrary {
    entries: BTreeMap<String, DiscoveredCard>,
}

impl CardLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a library from persisted `(card, discovered_at)` pairs.
    /// The first record per id wins.
    pub fn from_entries(entries: impl IntoIterator<Item = (Card, f64)>) -> Self {
        let mut library = Self::new();
        for (card, discovered_at) in entries {
            library.discover(card, discovered_at);
        }
        library
    }

    /// Record a first discovery. Rediscovery is a no-op; returns whether
    /// the card was new.
    pub fn discover(&mut self, card: Card, at: f64) -> bool {
        if self.entries.contains_key(&card.id) {
            return false;
        }
        self.entries.insert(
            card.id.clone(),
            DiscoveredCard {
                card,
                discovered_at: at,
            },
        );
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn discovered_at(&self, id: &str) -> Option<f64> {
        self.entries.get(id).map(|e| e.discovered_at)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DiscoveredCard> {
        self.entries.values()
    }
}
