//! End-of-run arbitration
//!
//! A pure policy: timer + base health + run state in, end reason out.
//! When time-up and base-destroyed land on the same tick, the configured
//! priority decides which one is reported.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::meters::{BaseHealth, GameTimer};

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// The countdown reached zero
    TimeUp,
    /// The base was destroyed
    BaseDestroyed,
}

impl EndReason {
    pub fn as_str(self) -> &'static str {
        match self {
            EndReason::TimeUp => "time-up",
            EndReason::BaseDestroyed => "base-destroyed",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which condition wins a same-tick tie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EndPriority {
    #[default]
    TimeUp,
    BaseDestroyed,
}

/// End-condition checker with a fixed tie-break policy
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EndConditionPolicy {
    priority: EndPriority,
}

impl EndConditionPolicy {
    pub fn new(priority: EndPriority) -> Self {
        Self { priority }
    }

    /// Evaluate the end condition. Returns `None` while the run is inactive
    /// or neither condition holds.
    pub fn check(&self, timer: &GameTimer, base: &BaseHealth, active: bool) -> Option<EndReason> {
        if !active {
            return None;
        }
        match (timer.is_expired(), base.is_dead()) {
            (true, true) => Some(match self.priority {
                EndPriority::TimeUp => EndReason::TimeUp,
                EndPriority::BaseDestroyed => EndReason::BaseDestroyed,
            }),
            (true, false) => Some(EndReason::TimeUp),
            (false, true) => Some(EndReason::BaseDestroyed),
            (false, false) => None,
        }
    }
}
