//! The game session orchestrator
//!
//! `GameSession` exclusively owns every live subsystem and is the only type
//! external collaborators talk to. One `update(dt)` call advances the whole
//! simulation in a fixed order:
//!
//! 1. countdown timer
//! 2. mana generation
//! 3. wave scheduling (may spawn enemies)
//! 4. enemy motion and base damage
//! 5. tower combat
//! 6. bookkeeping
//! 7. end-condition check
//!
//! The order is a correctness requirement: enemies that reach the base this
//! tick damage it before the end condition is evaluated, and mana generated
//! this tick is visible before any later card play is validated.
//!
//! Commands are atomic: every check runs before the first mutation, so a
//! rejected command leaves no partial state behind.

use glam::Vec2;
use rand::SeedableRng;
use rand::seq::IndexedRandom;
use rand_pcg::Pcg32;
use serde::Serialize;
use slotmap::SlotMap;
use std::fmt;

use super::collision::{self, PlacementError, Rect};
use super::end::{EndConditionPolicy, EndReason};
use super::event::{GameEvent, HoverInfo, HoverTarget};
use super::mana::{ManaGenerator, ManaPool};
use super::meters::{BaseHealth, GameScore, GameTimer};
use super::path::MovementPath;
use super::units::{Enemy, EnemyId, EnemyKind, Tower, TowerId, TowerKind};
use super::wave::{WaveScheduler, WaveStats};
use crate::cards::{CardEffect, CardLibrary, CardPool, Hand, HandError};
use crate::catalog::TimeSource;
use crate::config::{Tuning, TuningError};

/// Structured rejection of a session command. Never panics, never partial.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Session ids must be non-empty
    EmptyId,
    /// The configuration failed validation
    Tuning(TuningError),
    /// `start_game` while a game is already running
    AlreadyActive,
    /// A command that requires an active game
    NotActive,
    /// The card pool cannot fill an opening hand
    PoolTooSmall { have: usize, need: usize },
    /// The named card is not in hand
    CardNotInHand(String),
    /// Placement was requested for a card with no tower effect
    NotATowerCard(String),
    /// The card costs more mana than is held
    InsufficientMana { have: u32, need: u32 },
    /// The placement position was rejected
    InvalidPlacement(PlacementError),
    /// A hand mutation failed
    Hand(HandError),
    /// No movement corridor fits the configured field
    NoCorridor,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::EmptyId => write!(f, "session id must not be empty"),
            CommandError::Tuning(err) => write!(f, "invalid tuning: {err}"),
            CommandError::AlreadyActive => write!(f, "a game is already active"),
            CommandError::NotActive => write!(f, "no game is active"),
            CommandError::PoolTooSmall { have, need } => {
                write!(f, "card pool holds {have} cards, need at least {need}")
            }
            CommandError::CardNotInHand(id) => write!(f, "card `{id}` is not in hand"),
            CommandError::NotATowerCard(id) => {
                write!(f, "card `{id}` does not place a tower")
            }
            CommandError::InsufficientMana { have, need } => {
                write!(f, "not enough mana: have {have}, need {need}")
            }
            CommandError::InvalidPlacement(err) => write!(f, "invalid placement: {err}"),
            CommandError::Hand(err) => write!(f, "hand error: {err}"),
            CommandError::NoCorridor => write!(f, "no movement corridor available"),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<HandError> for CommandError {
    fn from(err: HandError) -> Self {
        CommandError::Hand(err)
    }
}

/// Hand entry as presented to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub cost: u32,
}

/// Live enemy as presented to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnemyView {
    pub id: EnemyId,
    pub kind: EnemyKind,
    pub position: Vec2,
    pub health: f32,
    pub max_health: f32,
}

/// Placed tower as presented to collaborators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TowerView {
    pub id: TowerId,
    pub kind: TowerKind,
    pub position: Vec2,
    pub range: f32,
}

/// Read-only per-tick snapshot of everything presentation needs
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub remaining_secs: f32,
    pub score: u64,
    pub base_current: u32,
    pub base_max: u32,
    pub mana_current: u32,
    pub mana_max: u32,
    pub hand: Vec<CardView>,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    pub wave: WaveStats,
    pub active: bool,
    pub paused: bool,
    pub presentation_ticks: u64,
}

/// One playthrough. Owns all mutable simulation state exclusively.
pub struct GameSession {
    id: String,
    tuning: Tuning,
    rng: Pcg32,
    clock: Box<dyn TimeSource>,

    // Card economy
    pool: CardPool,
    library: CardLibrary,
    hand: Hand,
    cards_played: u32,

    // Run state
    active: bool,
    paused: bool,
    sim_time: f64,
    /// Advances every update call, paused or not; for presentation only
    presentation_ticks: u64,
    timer: GameTimer,
    base: BaseHealth,
    score: GameScore,
    mana: ManaPool,
    generator: ManaGenerator,
    scheduler: WaveScheduler,
    corridors: Vec<MovementPath>,
    path: MovementPath,
    bounds: Rect,
    enemies: SlotMap<EnemyId, Enemy>,
    towers: SlotMap<TowerId, Tower>,
    /// Shared spawn/placement sequence; the deterministic ordering key
    next_seq: u64,
    end_policy: EndConditionPolicy,
    hovered: HoverTarget,
    events: Vec<GameEvent>,
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("active", &self.active)
            .field("paused", &self.paused)
            .finish_non_exhaustive()
    }
}

impl GameSession {
    /// Build an inactive session. The pool and library are supplied by
    /// external collaborators; the session only references and mutates them.
    pub fn new(
        id: impl Into<String>,
        pool: CardPool,
        library: CardLibrary,
        tuning: Tuning,
        seed: u64,
        clock: Box<dyn TimeSource>,
    ) -> Result<Self, CommandError> {
        let id = id.into();
        if id.is_empty() {
            return Err(CommandError::EmptyId);
        }
        tuning.validate().map_err(CommandError::Tuning)?;

        let corridors =
            MovementPath::standard_corridors(tuning.field.width, tuning.field.height);
        let path = corridors.first().cloned().ok_or(CommandError::NoCorridor)?;
        let bounds = Rect::from_size(tuning.field.width, tuning.field.height);
        let mana = ManaPool::new(
            format!("{id}:mana"),
            tuning.mana.max_mana,
            tuning.mana.starting_mana,
        )
        .map_err(|_| CommandError::EmptyId)?;

        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            clock,
            hand: Hand::new(tuning.hand_size),
            cards_played: 0,
            active: false,
            paused: false,
            sim_time: 0.0,
            presentation_ticks: 0,
            timer: GameTimer::new(tuning.timer.duration_secs),
            base: BaseHealth::new(tuning.base.max_health),
            score: GameScore::new(),
            mana,
            generator: ManaGenerator::new(&tuning.mana),
            scheduler: WaveScheduler::new(&tuning.waves),
            corridors,
            path,
            bounds,
            enemies: SlotMap::with_key(),
            towers: SlotMap::with_key(),
            next_seq: 0,
            end_policy: EndConditionPolicy::new(tuning.end_priority),
            hovered: HoverTarget::None,
            events: Vec::new(),
            pool,
            library,
            id,
            tuning,
        })
    }

    // ------------------------------------------------------------------
    // Command surface
    // ------------------------------------------------------------------

    /// Begin a fresh run: draw a new hand, reset every subsystem, activate.
    pub fn start_game(&mut self) -> Result<(), CommandError> {
        if self.active {
            return Err(CommandError::AlreadyActive);
        }
        let need = self.tuning.hand_size;
        if self.pool.len() < need {
            return Err(CommandError::PoolTooSmall {
                have: self.pool.len(),
                need,
            });
        }

        let drawn = self
            .pool
            .sample_distinct(need, &mut self.rng)
            .map_err(|_| CommandError::PoolTooSmall {
                have: self.pool.len(),
                need,
            })?;
        self.hand.clear();
        for card in drawn {
            self.hand.add_card(card)?;
        }

        self.sim_time = 0.0;
        self.presentation_ticks = 0;
        self.cards_played = 0;
        self.timer = GameTimer::new(self.tuning.timer.duration_secs);
        self.base = BaseHealth::new(self.tuning.base.max_health);
        self.score = GameScore::new();
        self.mana = ManaPool::new(
            format!("{}:mana", self.id),
            self.tuning.mana.max_mana,
            self.tuning.mana.starting_mana,
        )
        .map_err(|_| CommandError::EmptyId)?;
        self.generator = ManaGenerator::new(&self.tuning.mana);
        self.scheduler = WaveScheduler::new(&self.tuning.waves);
        self.enemies.clear();
        self.towers.clear();
        self.next_seq = 0;
        self.paused = false;
        self.hovered = HoverTarget::None;
        self.events.clear();

        if let Some(chosen) = self.corridors.choose(&mut self.rng) {
            self.path = chosen.clone();
        }

        self.active = true;
        log::info!(
            "session {}: game started, hand of {} drawn from pool of {}",
            self.id,
            self.hand.len(),
            self.pool.len()
        );
        Ok(())
    }

    /// Play a tower card at a position. All checks run before any mutation;
    /// card removal, discovery, mana spend and tower creation are atomic.
    pub fn play_card_and_place_tower(
        &mut self,
        card_id: &str,
        position: Vec2,
    ) -> Result<TowerId, CommandError> {
        if !self.active {
            return Err(CommandError::NotActive);
        }
        let card = self
            .hand
            .get(card_id)
            .ok_or_else(|| CommandError::CardNotInHand(card_id.to_string()))?;
        let CardEffect::Tower { kind, ability } = card.effect else {
            return Err(CommandError::NotATowerCard(card_id.to_string()));
        };
        let cost = card.cost;
        if !self.mana.can_afford(cost) {
            return Err(CommandError::InsufficientMana {
                have: self.mana.current(),
                need: cost,
            });
        }
        collision::validate_placement(
            position,
            self.tuning.field.tower_footprint,
            &self.bounds,
            &self.towers,
            &self.path,
            self.tuning.field.path_clearance,
        )
        .map_err(CommandError::InvalidPlacement)?;

        // Checks done; commit.
        let card = self.hand.remove_card(card_id)?;
        self.library.discover(card.clone(), self.clock.now());
        let spent = self.mana.try_spend(cost);
        debug_assert!(spent);

        let mut stats = kind.stats();
        ability.apply(&mut stats);
        let seq = self.next_seq;
        self.next_seq += 1;
        let tower_id = self.towers.insert(Tower::new(kind, stats, position, seq));
        self.cards_played += 1;

        log::info!(
            "session {}: placed {} tower at ({:.0}, {:.0}) for {} mana",
            self.id,
            kind.as_str(),
            position.x,
            position.y,
            cost
        );
        self.events.push(GameEvent::TowerPlaced {
            id: tower_id,
            kind,
            position,
        });
        Ok(tower_id)
    }

    /// Play a card without a placement: it moves from hand to library with
    /// no mana or combat effect. Used for utility cards.
    pub fn play_card(&mut self, card_id: &str) -> Result<(), CommandError> {
        if !self.active {
            return Err(CommandError::NotActive);
        }
        let card = self
            .hand
            .remove_card(card_id)
            .map_err(|_| CommandError::CardNotInHand(card_id.to_string()))?;
        self.library.discover(card.clone(), self.clock.now());
        self.cards_played += 1;
        log::debug!("session {}: played card `{}`", self.id, card.id);
        self.events.push(GameEvent::CardPlayed { card_id: card.id });
        Ok(())
    }

    /// Flip the pause flag. While paused every simulation clock freezes
    /// uniformly; only presentation counters keep advancing. Safe to call
    /// repeatedly.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::debug!(
            "session {}: {}",
            self.id,
            if self.paused { "paused" } else { "resumed" }
        );
        self.paused
    }

    /// Abandon the run: remaining hand cards are discovered into the
    /// library, the hand empties, and the session deactivates.
    pub fn end_game(&mut self) -> Result<(), CommandError> {
        if !self.active {
            return Err(CommandError::NotActive);
        }
        log::info!("session {}: game ended by command", self.id);
        self.flush_hand();
        self.active = false;
        Ok(())
    }

    // ------------------------------------------------------------------
    // The tick
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds. Returns the end reason if
    /// the run ended on this tick.
    pub fn update(&mut self, dt: f32) -> Option<EndReason> {
        if !self.active {
            return None;
        }
        self.presentation_ticks += 1;
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("session {}: ignoring invalid tick delta {dt}", self.id);
            return None;
        }
        if self.paused {
            return None;
        }

        self.sim_time += dt as f64;
        let now = self.sim_time;

        // 1. Countdown
        self.timer.advance(dt);

        // 2. Mana generation
        match self.generator.advance(&mut self.mana, now) {
            Ok(added) => {
                if added > 0 {
                    log::debug!("session {}: +{added} mana", self.id);
                }
            }
            Err(err) => log::error!("session {}: mana generation rejected: {err}", self.id),
        }

        // 3. Waves
        self.scheduler.update(
            now,
            &self.tuning.waves,
            &mut self.enemies,
            &mut self.next_seq,
            &mut self.events,
        );

        // 4. Enemy motion and base damage
        self.move_enemies(dt);

        // 5. Tower combat
        self.resolve_combat(dt);

        // 6. Bookkeeping: drop hover references to removed elements
        self.refresh_hover();

        // 7. End condition
        if let Some(reason) = self.end_policy.check(&self.timer, &self.base, self.active) {
            self.finish_run(reason);
            return Some(reason);
        }
        None
    }

    /// Walk every enemy in spawn order; arrivals damage the base and leave
    /// the field on the same tick.
    fn move_enemies(&mut self, dt: f32) {
        let mut order: Vec<(u64, EnemyId)> = self
            .enemies
            .iter()
            .map(|(id, e)| (e.spawn_seq, id))
            .collect();
        order.sort_unstable();

        for (_, id) in order {
            let reached = match self.enemies.get_mut(id) {
                Some(enemy) => enemy.advance(dt, &self.path),
                None => continue,
            };
            if reached {
                if let Some(enemy) = self.enemies.remove(id) {
                    let damage = enemy.kind.attack_power();
                    self.base.take_damage(damage);
                    log::debug!(
                        "session {}: {} reached the base, -{damage} health",
                        self.id,
                        enemy.kind.as_str()
                    );
                    self.events.push(GameEvent::EnemyReachedBase { id, damage });
                }
            }
        }
    }

    /// Each ready tower fires once at its highest-priority target.
    fn resolve_combat(&mut self, dt: f32) {
        let mut order: Vec<(u64, TowerId)> = self
            .towers
            .iter()
            .map(|(id, t)| (t.place_seq, id))
            .collect();
        order.sort_unstable();

        for (_, tower_id) in order {
            let (center, range, damage) = {
                let Some(tower) = self.towers.get_mut(tower_id) else {
                    continue;
                };
                tower.advance_cooldown(dt);
                if !tower.ready() {
                    continue;
                }
                (tower.position, tower.stats.range, tower.stats.damage)
            };

            let targets = collision::enemies_in_range(center, range, &self.enemies, &self.path);
            let Some(&target) = targets.first() else {
                continue;
            };
            if let Some(tower) = self.towers.get_mut(tower_id) {
                tower.fire();
            }

            let killed = match self.enemies.get_mut(target) {
                Some(enemy) => {
                    enemy.take_damage(damage);
                    enemy.is_dead()
                }
                None => false,
            };
            if killed {
                if let Some(enemy) = self.enemies.remove(target) {
                    self.score.record_kill(enemy.kind);
                    self.events.push(GameEvent::EnemyDestroyed {
                        id: target,
                        kind: enemy.kind,
                        score_value: enemy.kind.score_value(),
                    });
                }
            }
        }
    }

    fn refresh_hover(&mut self) {
        let stale = match &self.hovered {
            HoverTarget::None => false,
            HoverTarget::Card(id) => !self.hand.contains(id),
            HoverTarget::Tower(id) => !self.towers.contains_key(*id),
            HoverTarget::Enemy(id) => !self.enemies.contains_key(*id),
        };
        if stale {
            self.hovered = HoverTarget::None;
        }
    }

    /// Finalize a condition-ended run the same way `end_game` would.
    fn finish_run(&mut self, reason: EndReason) {
        log::info!(
            "session {}: game over ({reason}), score {}",
            self.id,
            self.score.total()
        );
        self.events.push(GameEvent::GameEnded {
            reason,
            score: self.score.total(),
        });
        self.flush_hand();
        self.active = false;
    }

    fn flush_hand(&mut self) {
        let now = self.clock.now();
        for card in self.hand.drain() {
            self.library.discover(card, now);
        }
    }

    // ------------------------------------------------------------------
    // Read surface
    // ------------------------------------------------------------------

    /// Read-only state for presentation collaborators
    pub fn snapshot(&self) -> Snapshot {
        let mut enemies: Vec<EnemyView> = self
            .enemies
            .iter()
            .map(|(id, e)| EnemyView {
                id,
                kind: e.kind,
                position: e.position(&self.path),
                health: e.health,
                max_health: e.max_health,
            })
            .collect();
        enemies.sort_by_key(|v| v.id);

        let mut towers: Vec<TowerView> = self
            .towers
            .iter()
            .map(|(id, t)| TowerView {
                id,
                kind: t.kind,
                position: t.position,
                range: t.stats.range,
            })
            .collect();
        towers.sort_by_key(|v| v.id);

        Snapshot {
            remaining_secs: self.timer.remaining_secs(),
            score: self.score.total(),
            base_current: self.base.current(),
            base_max: self.base.max(),
            mana_current: self.mana.current(),
            mana_max: self.mana.max(),
            hand: self
                .hand
                .cards()
                .iter()
                .map(|c| CardView {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    cost: c.cost,
                })
                .collect(),
            enemies,
            towers,
            wave: self.scheduler.stats(),
            active: self.active,
            paused: self.paused,
            presentation_ticks: self.presentation_ticks,
        }
    }

    /// Take all events buffered since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn set_hovered(&mut self, target: HoverTarget) {
        self.hovered = target;
    }

    pub fn hovered(&self) -> &HoverTarget {
        &self.hovered
    }

    /// Resolve a hovered element to typed details. Stale handles resolve
    /// to `None`.
    pub fn describe(&self, target: &HoverTarget) -> Option<HoverInfo> {
        match target {
            HoverTarget::None => None,
            HoverTarget::Card(id) => self.hand.get(id).map(|c| HoverInfo::Card {
                id: c.id.clone(),
                name: c.name.clone(),
                cost: c.cost,
            }),
            HoverTarget::Tower(id) => self.towers.get(*id).map(|t| HoverInfo::Tower {
                kind: t.kind,
                position: t.position,
                range: t.stats.range,
            }),
            HoverTarget::Enemy(id) => self.enemies.get(*id).map(|e| HoverInfo::Enemy {
                kind: e.kind,
                position: e.position(&self.path),
                health: e.health,
                max_health: e.max_health,
            }),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[inline]
    pub fn cards_played(&self) -> u32 {
        self.cards_played
    }

    pub fn library(&self) -> &CardLibrary {
        &self.library
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn path(&self) -> &MovementPath {
        &self.path
    }

    pub fn wave_stats(&self) -> WaveStats {
        self.scheduler.stats()
    }
}
