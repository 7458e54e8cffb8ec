//! Domain events and selectable-element tagging
//!
//! The session buffers typed events in an owned, lifecycle-scoped queue;
//! presentation drains them once per frame. There is no ambient event bus.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::end::EndReason;
use super::units::{EnemyId, EnemyKind, TowerId, TowerKind};

/// Something observable happened inside the simulation this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    WaveStarted {
        wave_number: u32,
        enemy_count: u32,
    },
    WaveCompleted {
        wave_number: u32,
    },
    EnemySpawned {
        id: EnemyId,
        kind: EnemyKind,
    },
    EnemyDestroyed {
        id: EnemyId,
        kind: EnemyKind,
        score_value: u64,
    },
    EnemyReachedBase {
        id: EnemyId,
        damage: u32,
    },
    TowerPlaced {
        id: TowerId,
        kind: TowerKind,
        position: Vec2,
    },
    CardPlayed {
        card_id: String,
    },
    GameEnded {
        reason: EndReason,
        score: u64,
    },
}

/// The element the presentation layer is pointing at.
///
/// A closed variant set instead of an untyped reference: stale handles
/// simply fail to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HoverTarget {
    #[default]
    None,
    Card(String),
    Tower(TowerId),
    Enemy(EnemyId),
}

/// Resolved details for a hovered element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HoverInfo {
    Card {
        id: String,
        name: String,
        cost: u32,
    },
    Tower {
        kind: TowerKind,
        position: Vec2,
        range: f32,
    },
    Enemy {
        kind: EnemyKind,
        position: Vec2,
        health: f32,
        max_health: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_roundtrip_through_json() {
        let events = vec![
            GameEvent::WaveStarted {
                wave_number: 3,
                enemy_count: 8,
            },
            GameEvent::CardPlayed {
                card_id: "arrow-basic".into(),
            },
            GameEvent::GameEnded {
                reason: EndReason::TimeUp,
                score: 420,
            },
        ];
        let json = serde_json::to_string(&events).unwrap();
        let restored: Vec<GameEvent> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, events);
    }

    #[test]
    fn test_hover_target_defaults_to_none() {
        assert_eq!(HoverTarget::default(), HoverTarget::None);
    }
}
