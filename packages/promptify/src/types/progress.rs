//! Batch progress and observer events.

use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// Batch progress as `completed / total`. The idle value is `0 / 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self { completed, total }
    }

    /// No run active.
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.total == 0
    }

    /// Completion ratio in `[0.0, 1.0]`; `0.0` when idle.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    /// Whole-number percentage, rounded down.
    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).floor() as u8
    }
}

/// State changes pushed to observers.
#[derive(Debug, Clone, PartialEq)]
pub enum ControllerEvent {
    ItemAdded(ItemId),
    ItemRemoved(ItemId),
    ItemUpdated(ItemId),
    Progress(Progress),
}
