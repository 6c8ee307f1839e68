//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over `tasks` and the `task_members` association.
//! - Answer the member -> tasks back-reference as an explicit query.
//!
//! # Invariants
//! - The association set is replaced as a whole inside the task write.
//! - Members are resolved by id inside the transaction; members deleted in
//!   the meantime are dropped from the association set.
//! - Task rows are never removed by member deletion.

use crate::db::Store;
use crate::model::member::{Member, MemberId};
use crate::model::task::{Task, TaskId};
use crate::repo::{bool_to_int, parse_uuid, LiveQuery, RepoError, RepoResult, Revisioned};
use log::{info, warn};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeSet;

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    description,
    due_at,
    is_checked
FROM tasks";

/// Repository interface for task operations.
pub trait TaskRepository {
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self) -> RepoResult<Vec<Task>>;
    /// Live list of all tasks, re-emitted after every committed write.
    fn watch_tasks(&self) -> LiveQuery<Task>;
    /// Tasks whose association set contains `member_id`, by due date.
    fn list_tasks_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Task>>;
    /// Tasks with `start_ms <= due_at < end_ms`, by due date.
    fn list_tasks_due_between(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<Task>>;
    /// Removes the task if still present. `Ok(false)` when already gone.
    fn delete_task(&self, task: &Task) -> RepoResult<bool>;
    /// Replaces title, description, due date and members. `Ok(false)` when
    /// the task no longer exists.
    fn update_task(
        &self,
        task: &Task,
        title: &str,
        description: &str,
        due_at: i64,
        members: &[Member],
    ) -> RepoResult<bool>;
    /// Sets the completion flag. `Ok(false)` when the task no longer exists.
    fn update_task_completion(&self, task: &Task, is_checked: bool) -> RepoResult<bool>;
    /// Inserts an unchecked task with a fresh id and the given members.
    fn create_task(
        &self,
        title: &str,
        description: &str,
        due_at: i64,
        members: &[Member],
    ) -> RepoResult<TaskId>;
}

/// SQLite-backed task repository.
#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    store: Store,
}

impl SqliteTaskRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Writes `task` as-is, overwriting any record that shares its id.
    ///
    /// The stored association set becomes `task.member_ids` minus members
    /// that no longer exist.
    pub fn upsert_task(&self, task: &Task) -> RepoResult<()> {
        self.store.write(|tx| -> RepoResult<()> {
            tx.execute(
                "INSERT INTO tasks (uuid, title, description, due_at, is_checked)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(uuid) DO UPDATE SET
                    title = excluded.title,
                    description = excluded.description,
                    due_at = excluded.due_at,
                    is_checked = excluded.is_checked,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    task.id.to_string(),
                    task.title.as_str(),
                    task.description.as_str(),
                    task.due_at,
                    bool_to_int(task.is_checked),
                ],
            )?;
            replace_task_members(tx, task.id, &task.member_ids)
        })
    }
}

impl TaskRepository for SqliteTaskRepository {
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.store.read(|conn| -> RepoResult<Option<Task>> {
            let mut tasks = query_tasks(
                conn,
                "WHERE uuid = ?",
                vec![Value::Text(id.to_string())],
            )?;
            Ok(tasks.pop())
        })
    }

    fn list_tasks(&self) -> RepoResult<Vec<Task>> {
        self.store.read(load_tasks)
    }

    fn watch_tasks(&self) -> LiveQuery<Task> {
        let store = self.store.clone();
        LiveQuery::new(self.store.subscribe(), move || {
            let (revision, items) = store.read_at(load_tasks)?;
            Ok(Revisioned::new(revision, items))
        })
    }

    fn list_tasks_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Task>> {
        self.store.read(|conn| {
            query_tasks(
                conn,
                "WHERE EXISTS (
                    SELECT 1
                    FROM task_members tm
                    WHERE tm.task_uuid = tasks.uuid
                      AND tm.member_uuid = ?
                 )
                 ORDER BY due_at ASC, rowid ASC",
                vec![Value::Text(member_id.to_string())],
            )
        })
    }

    fn list_tasks_due_between(&self, start_ms: i64, end_ms: i64) -> RepoResult<Vec<Task>> {
        self.store.read(|conn| {
            query_tasks(
                conn,
                "WHERE due_at >= ? AND due_at < ? ORDER BY due_at ASC, rowid ASC",
                vec![Value::Integer(start_ms), Value::Integer(end_ms)],
            )
        })
    }

    fn delete_task(&self, task: &Task) -> RepoResult<bool> {
        let removed = self.store.write(|tx| -> RepoResult<bool> {
            let changed = tx.execute("DELETE FROM tasks WHERE uuid = ?1;", [task.id.to_string()])?;
            Ok(changed > 0)
        })?;

        info!(
            "event=task_delete module=repo status={} task_id={}",
            if removed { "ok" } else { "missing" },
            task.id
        );
        Ok(removed)
    }

    fn update_task(
        &self,
        task: &Task,
        title: &str,
        description: &str,
        due_at: i64,
        members: &[Member],
    ) -> RepoResult<bool> {
        let applied = self.store.write(|tx| -> RepoResult<bool> {
            let changed = tx.execute(
                "UPDATE tasks
                 SET
                    title = ?2,
                    description = ?3,
                    due_at = ?4,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![task.id.to_string(), title, description, due_at],
            )?;
            if changed == 0 {
                return Ok(false);
            }

            let member_ids = members.iter().map(|member| member.id).collect();
            replace_task_members(tx, task.id, &member_ids)?;
            Ok(true)
        })?;

        info!(
            "event=task_update module=repo status={} task_id={} members={}",
            if applied { "ok" } else { "missing" },
            task.id,
            members.len()
        );
        Ok(applied)
    }

    fn update_task_completion(&self, task: &Task, is_checked: bool) -> RepoResult<bool> {
        let applied = self.store.write(|tx| -> RepoResult<bool> {
            let changed = tx.execute(
                "UPDATE tasks
                 SET
                    is_checked = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE uuid = ?1;",
                params![task.id.to_string(), bool_to_int(is_checked)],
            )?;
            Ok(changed > 0)
        })?;

        info!(
            "event=task_completion module=repo status={} task_id={} is_checked={}",
            if applied { "ok" } else { "missing" },
            task.id,
            is_checked
        );
        Ok(applied)
    }

    fn create_task(
        &self,
        title: &str,
        description: &str,
        due_at: i64,
        members: &[Member],
    ) -> RepoResult<TaskId> {
        let mut task = Task::new(title, description, due_at);
        task.member_ids = members.iter().map(|member| member.id).collect();
        self.upsert_task(&task)?;

        info!(
            "event=task_create module=repo status=ok task_id={} members={}",
            task.id,
            task.member_ids.len()
        );
        Ok(task.id)
    }
}

/// Replaces the association set, skipping members that no longer exist.
fn replace_task_members(
    conn: &Connection,
    task_id: TaskId,
    member_ids: &BTreeSet<MemberId>,
) -> RepoResult<()> {
    let task_uuid = task_id.to_string();
    conn.execute(
        "DELETE FROM task_members WHERE task_uuid = ?1;",
        [task_uuid.as_str()],
    )?;

    let mut dropped = 0usize;
    for member_id in member_ids {
        let inserted = conn.execute(
            "INSERT INTO task_members (task_uuid, member_uuid)
             SELECT ?1, uuid
             FROM members
             WHERE uuid = ?2;",
            params![task_uuid.as_str(), member_id.to_string()],
        )?;
        if inserted == 0 {
            dropped += 1;
        }
    }

    if dropped > 0 {
        warn!(
            "event=task_members_resolve module=repo status=partial task_id={} dropped={}",
            task_uuid, dropped
        );
    }
    Ok(())
}

fn load_tasks(conn: &Connection) -> RepoResult<Vec<Task>> {
    query_tasks(conn, "ORDER BY rowid ASC", Vec::new())
}

fn query_tasks(conn: &Connection, clause: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Task>> {
    let mut stmt = conn.prepare(&format!("{TASK_SELECT_SQL} {clause};"))?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut tasks = Vec::new();
    while let Some(row) = rows.next()? {
        let mut task = parse_task_row(row)?;
        task.member_ids = load_member_ids(conn, task.id)?;
        tasks.push(task);
    }
    Ok(tasks)
}

fn load_member_ids(conn: &Connection, task_id: TaskId) -> RepoResult<BTreeSet<MemberId>> {
    let mut stmt = conn.prepare(
        "SELECT member_uuid
         FROM task_members
         WHERE task_uuid = ?1;",
    )?;
    let mut rows = stmt.query([task_id.to_string()])?;
    let mut member_ids = BTreeSet::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        member_ids.insert(parse_uuid(&value, "task_members.member_uuid")?);
    }
    Ok(member_ids)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "tasks.uuid")?;

    let is_checked = match row.get::<_, i64>("is_checked")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_checked value `{other}` in tasks.is_checked"
            )));
        }
    };

    Ok(Task {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        due_at: row.get("due_at")?,
        is_checked,
        member_ids: BTreeSet::new(),
    })
}
