//! Core data-access and state-sync logic for the family chore app.
//! This crate is the single source of truth for roster and task invariants.

pub mod config;
pub mod controller;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod transfer;

pub use config::{ConfigError, CoreConfig};
pub use controller::member_controller::MemberController;
pub use controller::task_controller::TaskController;
pub use db::{DbError, DbResult, Store};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::input::{parse_member_input, validate_task_input, InputError, MemberInput};
pub use model::member::{Member, MemberId, ProfilePicture};
pub use model::task::{Task, TaskId};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{LiveQuery, RepoError, RepoResult, Revisioned, WriteOutcome};
pub use service::chore_service::{ChoreService, ChoreServiceError, MemberHistory};
pub use transfer::{MemberTransfer, TaskTransfer, TransferError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
