//! Shared store handle over one migrated SQLite connection.
//!
//! # Responsibility
//! - Own the connection behind a mutex so repositories and controllers can
//!   share it across threads.
//! - Run writes inside scoped `IMMEDIATE` transactions.
//! - Publish a change revision that live queries observe.
//!
//! # Invariants
//! - A write closure returning `Err` rolls back; nothing partial is visible.
//! - The revision is bumped only after a successful commit, while the
//!   connection lock is still held.

use super::{open_db, open_db_in_memory, DbResult};
use log::debug;
use parking_lot::Mutex;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::fmt::{Debug, Formatter};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::watch;

/// Cloneable handle to the embedded database.
///
/// Clones share the same connection and revision channel.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    conn: Mutex<Connection>,
    revision: watch::Sender<u64>,
}

impl Store {
    /// Opens (or creates) a database file and wraps it in a store handle.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database, mainly for tests.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already bootstrapped connection.
    ///
    /// Callers must pass a connection returned by [`open_db`] or
    /// [`open_db_in_memory`] so migrations and pragmas are in place.
    pub fn from_connection(conn: Connection) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(conn),
                revision,
            }),
        }
    }

    /// Runs a read-only closure against the connection.
    pub fn read<T, E>(&self, f: impl FnOnce(&Connection) -> Result<T, E>) -> Result<T, E> {
        let conn = self.inner.conn.lock();
        f(&conn)
    }

    /// Runs a read-only closure and returns the revision it observed.
    ///
    /// The revision is read under the connection lock, so the result
    /// reflects exactly the commits counted by it.
    pub fn read_at<T, E>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, E>,
    ) -> Result<(u64, T), E> {
        let conn = self.inner.conn.lock();
        let revision = *self.inner.revision.borrow();
        f(&conn).map(|value| (revision, value))
    }

    /// Runs `f` inside one `IMMEDIATE` transaction and commits on `Ok`.
    ///
    /// # Side effects
    /// - Bumps the store revision after commit, waking live queries.
    pub fn write<T, E>(&self, f: impl FnOnce(&Transaction<'_>) -> Result<T, E>) -> Result<T, E>
    where
        E: From<rusqlite::Error>,
    {
        let mut conn = self.inner.conn.lock();
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let value = f(&tx)?;
        tx.commit()?;
        self.inner
            .revision
            .send_modify(|revision| *revision = revision.wrapping_add(1));
        drop(conn);

        debug!(
            "event=store_commit module=db status=ok revision={}",
            self.revision()
        );
        Ok(value)
    }

    /// Returns the current change revision.
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Subscribes to revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}
