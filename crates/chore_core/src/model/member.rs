//! Family member domain model.
//!
//! # Responsibility
//! - Define the roster record and its fixed set of profile pictures.
//!
//! # Invariants
//! - `id` is stable and never reused for another member.
//! - `(name, age, profile_picture)` is unique across the roster; enforced by
//!   the member repository inside its write transaction.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier for a family member.
pub type MemberId = Uuid;

/// Profile picture selector. Closed set of bundled avatars.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfilePicture {
    #[default]
    Fox,
    Bull,
    Cheek,
    Crab,
    Kipod,
    Kuala,
    Pig,
    Tiger,
    Whale,
}

impl ProfilePicture {
    /// All selectable avatars in picker order.
    pub const ALL: [ProfilePicture; 9] = [
        Self::Fox,
        Self::Bull,
        Self::Cheek,
        Self::Crab,
        Self::Kipod,
        Self::Kuala,
        Self::Pig,
        Self::Tiger,
        Self::Whale,
    ];

    /// Storage/wire name of this avatar.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fox => "fox",
            Self::Bull => "bull",
            Self::Cheek => "cheek",
            Self::Crab => "crab",
            Self::Kipod => "kipod",
            Self::Kuala => "kuala",
            Self::Pig => "pig",
            Self::Tiger => "tiger",
            Self::Whale => "whale",
        }
    }
}

impl Display for ProfilePicture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a known avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProfilePicture(pub String);

impl Display for UnknownProfilePicture {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown profile picture `{}`", self.0)
    }
}

impl Error for UnknownProfilePicture {}

impl FromStr for ProfilePicture {
    type Err = UnknownProfilePicture;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|picture| picture.as_str() == value)
            .ok_or_else(|| UnknownProfilePicture(value.to_string()))
    }
}

/// One family member on the roster.
///
/// Tasks assigned to a member are fetched with
/// `TaskRepository::list_tasks_for_member`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    pub age: u32,
    pub profile_picture: ProfilePicture,
}

impl Member {
    /// Creates a member with a freshly generated id.
    pub fn new(name: impl Into<String>, age: u32, profile_picture: ProfilePicture) -> Self {
        Self::with_id(Uuid::new_v4(), name, age, profile_picture)
    }

    /// Creates a member with a caller-provided id.
    ///
    /// Used when re-creating a member from a transfer record.
    pub fn with_id(
        id: MemberId,
        name: impl Into<String>,
        age: u32,
        profile_picture: ProfilePicture,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            age,
            profile_picture,
        }
    }
}
