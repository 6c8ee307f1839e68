//! Live query: a re-emitting view over a repository list.
//!
//! # Invariants
//! - The first `next()` yields the current list without waiting.
//! - Later `next()` calls wait for a store revision bump, then re-fetch.
//! - Every emission carries the revision it was read at; bursts of commits
//!   may collapse into one emission.
//! - `next()` runs the fetch on the blocking pool; the awaiting task never
//!   holds the connection lock.

use crate::repo::RepoResult;
use std::sync::Arc;
use tokio::sync::watch;

/// A list read together with the store revision it reflects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revisioned<T> {
    pub revision: u64,
    pub items: Vec<T>,
}

impl<T> Revisioned<T> {
    pub fn new(revision: u64, items: Vec<T>) -> Self {
        Self { revision, items }
    }
}

impl<T> Default for Revisioned<T> {
    fn default() -> Self {
        Self::new(0, Vec::new())
    }
}

type Fetch<T> = Arc<dyn Fn() -> RepoResult<Revisioned<T>> + Send + Sync>;

/// Stream of list snapshots, re-fetched whenever the store changes.
pub struct LiveQuery<T> {
    changes: watch::Receiver<u64>,
    fetch: Fetch<T>,
    primed: bool,
}

impl<T: Send + 'static> LiveQuery<T> {
    /// Builds a live query from a change feed and a fetch function.
    ///
    /// Any repository implementation (including test doubles) can supply its
    /// own pair.
    pub fn new(
        changes: watch::Receiver<u64>,
        fetch: impl Fn() -> RepoResult<Revisioned<T>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            changes,
            fetch: Arc::new(fetch),
            primed: false,
        }
    }

    /// Fetches the currently available list without waiting.
    pub fn first(&self) -> RepoResult<Revisioned<T>> {
        (self.fetch)()
    }

    /// Waits for the next emission.
    ///
    /// Returns `None` once the change feed is closed.
    pub async fn next(&mut self) -> Option<RepoResult<Revisioned<T>>> {
        if self.primed {
            self.changes.changed().await.ok()?;
        } else {
            self.primed = true;
            let _ = self.changes.borrow_and_update();
        }

        let fetch = Arc::clone(&self.fetch);
        match tokio::task::spawn_blocking(move || fetch()).await {
            Ok(result) => Some(result),
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => None,
        }
    }
}
