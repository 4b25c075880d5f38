//! Audit field population
//!
//! Records expose their timestamp / actor slots through [`Stamped`]; callers
//! run [`stamp`] right before the write.

use crate::db::repository::order::TransitionPatch;
use shared::models::{CartLine, Order};

/// Kind of write about to happen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Insert,
    Update,
}

/// Typed setters for a record's audit fields
pub trait Stamped {
    /// Records that never get inserted (patches) keep the no-op default
    fn set_created_at(&mut self, _now: i64) {}
    fn set_updated(&mut self, now: i64, actor: Option<i64>);
}

/// Set audit fields for `op`. `actor = None` means the system.
pub fn stamp<T: Stamped>(record: &mut T, op: Operation, actor: Option<i64>, now: i64) {
    if op == Operation::Insert {
        record.set_created_at(now);
    }
    record.set_updated(now, actor);
}

impl Stamped for Order {
    fn set_created_at(&mut self, now: i64) {
        self.created_at = now;
    }

    fn set_updated(&mut self, now: i64, actor: Option<i64>) {
        self.updated_at = now;
        self.updated_by = actor;
    }
}

impl Stamped for CartLine {
    fn set_created_at(&mut self, now: i64) {
        self.created_at = now;
    }

    // No actor column: a cart only ever belongs to its user
    fn set_updated(&mut self, now: i64, _actor: Option<i64>) {
        self.updated_at = now;
    }
}

impl Stamped for TransitionPatch {
    fn set_updated(&mut self, now: i64, actor: Option<i64>) {
        self.updated_at = now;
        self.updated_by = actor;
    }
}
