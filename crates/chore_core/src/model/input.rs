//! Checks applied to user input before any store operation runs.
//!
//! # Responsibility
//! - Turn raw form values into typed member/task input.
//! - Report problems as [`InputError`] so callers can show inline messages.

use crate::model::member::Member;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Validation failure for user-provided form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Member name is empty or whitespace.
    BlankName,
    /// Age is not a non-negative integer.
    InvalidAge(String),
    /// Task title is empty or whitespace.
    BlankTitle,
    /// A task needs at least one assigned member.
    NoMembersSelected,
}

impl Display for InputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "please provide a valid name"),
            Self::InvalidAge(value) => write!(f, "please provide a valid age, got `{value}`"),
            Self::BlankTitle => write!(f, "please provide a task title"),
            Self::NoMembersSelected => write!(f, "please select at least one family member"),
        }
    }
}

impl Error for InputError {}

/// Parsed member form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInput {
    pub name: String,
    pub age: u32,
}

/// Parses the member form: trimmed non-blank name and numeric age.
pub fn parse_member_input(name: &str, age_text: &str) -> Result<MemberInput, InputError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(InputError::BlankName);
    }

    let age_text = age_text.trim();
    let age = age_text
        .parse::<u32>()
        .map_err(|_| InputError::InvalidAge(age_text.to_string()))?;

    Ok(MemberInput {
        name: name.to_string(),
        age,
    })
}

/// Checks the task form before create/update.
pub fn validate_task_input(title: &str, members: &[Member]) -> Result<(), InputError> {
    if members.is_empty() {
        return Err(InputError::NoMembersSelected);
    }
    if title.trim().is_empty() {
        return Err(InputError::BlankTitle);
    }
    Ok(())
}
