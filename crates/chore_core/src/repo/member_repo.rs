//! Member repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `members` table.
//! - Enforce the `(name, age, profile_picture)` uniqueness rule on writes.
//!
//! # Invariants
//! - Duplicate checks and the write they guard share one transaction.
//! - `create_member`/`update_member` never propagate store errors; failures
//!   are logged and reported as `false`.
//! - `delete_member` returns store errors so callers can tell "already gone"
//!   from "failed"; the member controller folds both into `false`.
//! - Deleting a member detaches it from tasks through `ON DELETE CASCADE`;
//!   tasks themselves are untouched.

use crate::db::Store;
use crate::model::member::{Member, MemberId, ProfilePicture};
use crate::repo::{
    parse_uuid, LiveQuery, RepoError, RepoResult, Revisioned, WriteOutcome,
};
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    age,
    profile_picture
FROM members";

/// Repository interface for family member operations.
pub trait MemberRepository {
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    fn list_members(&self) -> RepoResult<Vec<Member>>;
    /// Live list of all members, re-emitted after every committed write.
    fn watch_members(&self) -> LiveQuery<Member>;
    /// Removes the member if still present. `Ok(false)` when already gone.
    ///
    /// Store failures are returned as `Err`, unlike create and update.
    fn delete_member(&self, member: &Member) -> RepoResult<bool>;
    /// Returns `false` on duplicate tuple, vanished target, or store failure.
    fn update_member(
        &self,
        member: &Member,
        name: &str,
        age: u32,
        picture: ProfilePicture,
    ) -> bool;
    /// Returns `false` on duplicate tuple or store failure.
    fn create_member(&self, name: &str, age: u32, picture: ProfilePicture) -> bool;
}

/// SQLite-backed member repository.
#[derive(Debug, Clone)]
pub struct SqliteMemberRepository {
    store: Store,
}

impl SqliteMemberRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Inserts a member unless the tuple is taken.
    ///
    /// Unlike [`MemberRepository::create_member`], this reports store errors
    /// and the refusal reason to the caller.
    pub fn try_create_member(
        &self,
        name: &str,
        age: u32,
        picture: ProfilePicture,
    ) -> RepoResult<(WriteOutcome, Option<MemberId>)> {
        self.store.write(|tx| -> RepoResult<(WriteOutcome, Option<MemberId>)> {
            if tuple_taken(tx, name, age, picture, None)? {
                return Ok((WriteOutcome::Duplicate, None));
            }

            let member = Member::new(name, age, picture);
            tx.execute(
                "INSERT INTO members (uuid, name, age, profile_picture)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    member.id.to_string(),
                    member.name.as_str(),
                    member.age,
                    member.profile_picture.as_str(),
                ],
            )?;
            Ok((WriteOutcome::Applied, Some(member.id)))
        })
    }

    /// Re-resolves `member` by id and applies new values unless refused.
    pub fn try_update_member(
        &self,
        member: &Member,
        name: &str,
        age: u32,
        picture: ProfilePicture,
    ) -> RepoResult<WriteOutcome> {
        self.store.write(|tx| -> RepoResult<WriteOutcome> {
            if tuple_taken(tx, name, age, picture, Some(member.id))? {
                return Ok(WriteOutcome::Duplicate);
            }

            let changed = tx.execute(
                "UPDATE members
                 SET
                    name = ?2,
                    age = ?3,
                    profile_picture = ?4,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![member.id.to_string(), name, age, picture.as_str()],
            )?;

            if changed == 0 {
                return Ok(WriteOutcome::Missing);
            }
            Ok(WriteOutcome::Applied)
        })
    }
}

impl MemberRepository for SqliteMemberRepository {
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.store.read(|conn| load_member(conn, id))
    }

    fn list_members(&self) -> RepoResult<Vec<Member>> {
        self.store.read(load_members)
    }

    fn watch_members(&self) -> LiveQuery<Member> {
        let store = self.store.clone();
        LiveQuery::new(self.store.subscribe(), move || {
            let (revision, items) = store.read_at(load_members)?;
            Ok(Revisioned::new(revision, items))
        })
    }

    fn delete_member(&self, member: &Member) -> RepoResult<bool> {
        let removed = self.store.write(|tx| -> RepoResult<bool> {
            let changed = tx.execute(
                "DELETE FROM members WHERE uuid = ?1;",
                [member.id.to_string()],
            )?;
            Ok(changed > 0)
        })?;

        info!(
            "event=member_delete module=repo status={} member_id={}",
            if removed { "ok" } else { "missing" },
            member.id
        );
        Ok(removed)
    }

    fn update_member(
        &self,
        member: &Member,
        name: &str,
        age: u32,
        picture: ProfilePicture,
    ) -> bool {
        match self.try_update_member(member, name, age, picture) {
            Ok(outcome) => {
                info!(
                    "event=member_update module=repo status={} member_id={}",
                    outcome.as_status(),
                    member.id
                );
                outcome.is_applied()
            }
            Err(err) => {
                error!(
                    "event=member_update module=repo status=error member_id={} error={}",
                    member.id, err
                );
                false
            }
        }
    }

    fn create_member(&self, name: &str, age: u32, picture: ProfilePicture) -> bool {
        match self.try_create_member(name, age, picture) {
            Ok((outcome, id)) => {
                if outcome.is_applied() {
                    info!(
                        "event=member_create module=repo status=ok member_id={}",
                        id.map(|id| id.to_string()).unwrap_or_default()
                    );
                } else {
                    warn!(
                        "event=member_create module=repo status={}",
                        outcome.as_status()
                    );
                }
                outcome.is_applied()
            }
            Err(err) => {
                error!("event=member_create module=repo status=error error={err}");
                false
            }
        }
    }
}

fn tuple_taken(
    conn: &Connection,
    name: &str,
    age: u32,
    picture: ProfilePicture,
    exclude: Option<MemberId>,
) -> RepoResult<bool> {
    let exclude = exclude.map(|id| id.to_string());
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM members
            WHERE name = ?1
              AND age = ?2
              AND profile_picture = ?3
              AND (?4 IS NULL OR uuid <> ?4)
        );",
        params![name, age, picture.as_str(), exclude],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn load_member(conn: &Connection, id: MemberId) -> RepoResult<Option<Member>> {
    let mut stmt = conn.prepare(&format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1;"))?;
    let row = stmt
        .query_row([id.to_string()], |row| Ok(parse_member_row(row)))
        .optional()?;
    row.transpose()
}

fn load_members(conn: &Connection) -> RepoResult<Vec<Member>> {
    let mut stmt = conn.prepare(&format!("{MEMBER_SELECT_SQL} ORDER BY rowid ASC;"))?;
    let mut rows = stmt.query([])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        members.push(parse_member_row(row)?);
    }
    Ok(members)
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "members.uuid")?;

    let age = match row.get::<_, i64>("age")? {
        value if value >= 0 => u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("age `{value}` out of range in members.age"))
        })?,
        other => {
            return Err(RepoError::InvalidData(format!(
                "negative age `{other}` in members.age"
            )));
        }
    };

    let picture_text: String = row.get("profile_picture")?;
    let profile_picture = picture_text
        .parse::<ProfilePicture>()
        .map_err(|err| RepoError::InvalidData(format!("{err} in members.profile_picture")))?;

    Ok(Member {
        id,
        name: row.get("name")?,
        age,
        profile_picture,
    })
}
