//! Domain model for family members and chores.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Define the input checks callers run before touching the store.
//!
//! # Invariants
//! - Every record is identified by a stable UUID that is never reused.
//! - Member -> task back-references are queries, never stored fields.

pub mod input;
pub mod member;
pub mod task;
