//! Flat transfer records for the navigation boundary.
//!
//! # Responsibility
//! - Copy members/tasks into relationship-free values that serialize to JSON.
//! - Turn a transfer record back into a full entity by identity.
//!
//! # Invariants
//! - Transfer ids are hyphenated UUID strings.
//! - Resolving never writes to the store: a found record is overlaid with the
//!   transfer values, a missing one is re-created in memory with the same id.

use crate::model::member::{Member, MemberId, ProfilePicture};
use crate::model::task::{Task, TaskId};
use crate::repo::member_repo::MemberRepository;
use crate::repo::task_repo::TaskRepository;
use crate::repo::RepoError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Error raised while encoding, decoding or resolving transfer records.
#[derive(Debug)]
pub enum TransferError {
    Json(serde_json::Error),
    InvalidId(String),
    Repo(RepoError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid transfer payload: {err}"),
            Self::InvalidId(value) => write!(f, "invalid transfer id `{value}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::InvalidId(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for TransferError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Flat copy of a [`Member`], passed to the member history screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberTransfer {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub profile_picture: ProfilePicture,
}

impl From<&Member> for MemberTransfer {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.to_string(),
            name: member.name.clone(),
            age: member.age,
            profile_picture: member.profile_picture,
        }
    }
}

impl MemberTransfer {
    /// Encodes this record as the single route parameter.
    pub fn to_json(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TransferError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn member_id(&self) -> Result<MemberId, TransferError> {
        parse_id(&self.id)
    }

    /// Looks the member up by id and overlays the transfer values, or
    /// re-creates it with the same id when the store no longer has it.
    pub fn resolve<R: MemberRepository + ?Sized>(&self, repo: &R) -> Result<Member, TransferError> {
        let id = self.member_id()?;
        let resolved = match repo.get_member(id)? {
            Some(mut existing) => {
                existing.name.clone_from(&self.name);
                existing.age = self.age;
                existing.profile_picture = self.profile_picture;
                existing
            }
            None => {
                debug!("event=transfer_resolve module=transfer status=recreated kind=member id={id}");
                Member::with_id(id, self.name.clone(), self.age, self.profile_picture)
            }
        };
        Ok(resolved)
    }
}

/// Flat copy of a [`Task`] without its member associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTransfer {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Unix epoch milliseconds.
    pub date: i64,
    pub is_checked: bool,
}

impl From<&Task> for TaskTransfer {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            date: task.due_at,
            is_checked: task.is_checked,
        }
    }
}

impl TaskTransfer {
    pub fn to_json(&self) -> Result<String, TransferError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, TransferError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn task_id(&self) -> Result<TaskId, TransferError> {
        parse_id(&self.id)
    }

    /// Looks the task up by id and overlays the transfer values, keeping the
    /// stored member associations. A missing task is re-created unassigned.
    pub fn resolve<R: TaskRepository + ?Sized>(&self, repo: &R) -> Result<Task, TransferError> {
        let id = self.task_id()?;
        let resolved = match repo.get_task(id)? {
            Some(mut existing) => {
                existing.title.clone_from(&self.title);
                existing.description.clone_from(&self.description);
                existing.due_at = self.date;
                existing.is_checked = self.is_checked;
                existing
            }
            None => {
                debug!("event=transfer_resolve module=transfer status=recreated kind=task id={id}");
                let mut task =
                    Task::with_id(id, self.title.clone(), self.description.clone(), self.date);
                task.is_checked = self.is_checked;
                task
            }
        };
        Ok(resolved)
    }
}

/// Resolves a batch of task transfer records in order.
pub fn resolve_tasks<R: TaskRepository + ?Sized>(
    records: &[TaskTransfer],
    repo: &R,
) -> Result<Vec<Task>, TransferError> {
    records.iter().map(|record| record.resolve(repo)).collect()
}

fn parse_id(value: &str) -> Result<Uuid, TransferError> {
    Uuid::parse_str(value).map_err(|_| TransferError::InvalidId(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{MemberTransfer, TaskTransfer, TransferError};
    use crate::model::member::{Member, ProfilePicture};
    use crate::model::task::Task;

    #[test]
    fn member_transfer_uses_camel_case_keys() {
        let member = Member::new("Alex", 10, ProfilePicture::Fox);
        let json = MemberTransfer::from(&member).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["id"], member.id.to_string());
        assert_eq!(value["profilePicture"], "fox");
        assert_eq!(value["age"], 10);
    }

    #[test]
    fn task_transfer_carries_flat_fields_only() {
        let mut task = Task::new("Dishes", "after dinner", 1_700_000_000_000);
        task.is_checked = true;
        let json = TaskTransfer::from(&task).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["date"], 1_700_000_000_000_i64);
        assert_eq!(value["isChecked"], true);
        assert!(value.get("memberIds").is_none());
    }

    #[test]
    fn malformed_payload_and_id_are_rejected() {
        assert!(matches!(
            MemberTransfer::from_json("{not json"),
            Err(TransferError::Json(_))
        ));

        let record = MemberTransfer {
            id: "not-a-uuid".to_string(),
            name: "Alex".to_string(),
            age: 10,
            profile_picture: ProfilePicture::Fox,
        };
        assert!(matches!(
            record.member_id(),
            Err(TransferError::InvalidId(value)) if value == "not-a-uuid"
        ));
    }
}
