//! Schema steps for the chore database.
//!
//! Steps run in order inside one transaction; the highest applied step is
//! recorded in `PRAGMA user_version`. A database stamped with a newer
//! version than this build knows is refused rather than touched.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// One schema step: its `user_version`, a short label and the SQL batch.
type SchemaStep = (u32, &'static str, &'static str);

const SCHEMA_STEPS: &[SchemaStep] = &[
    (1, "roster_and_tasks", include_str!("0001_init.sql")),
    (2, "task_members", include_str!("0002_task_members.sql")),
];

/// Highest schema version this build can create or read.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Brings the schema up to [`latest_version`].
///
/// Returns how many steps ran; `0` when the schema was already current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from = current_user_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|(version, _, _)| *version > from)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for &&(version, label, sql) in &pending {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version,
                label,
                source,
            })?;
        info!("event=db_migrate module=db status=ok version={version} step={label}");
    }
    tx.commit()?;

    Ok(pending.len())
}

/// Reads the schema version recorded on the connection.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
