//! Chore task domain model.
//!
//! # Invariants
//! - `id` is immutable and unique across the store.
//! - `member_ids` is a set; assignment order carries no meaning.
//! - `due_at` is Unix epoch milliseconds.

use crate::model::member::MemberId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Stable identifier for a task.
pub type TaskId = Uuid;

/// A household chore assigned to zero or more members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub due_at: i64,
    pub is_checked: bool,
    pub member_ids: BTreeSet<MemberId>,
}

impl Task {
    /// Creates an unchecked, unassigned task with a fresh id.
    pub fn new(title: impl Into<String>, description: impl Into<String>, due_at: i64) -> Self {
        Self::with_id(Uuid::new_v4(), title, description, due_at)
    }

    /// Creates an unchecked, unassigned task with a caller-provided id.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        description: impl Into<String>,
        due_at: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            due_at,
            is_checked: false,
            member_ids: BTreeSet::new(),
        }
    }

    pub fn is_assigned_to(&self, member_id: MemberId) -> bool {
        self.member_ids.contains(&member_id)
    }
}
