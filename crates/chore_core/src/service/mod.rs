//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository reads into screen-level answers.
//! - Keep callers decoupled from storage details.

pub mod chore_service;
