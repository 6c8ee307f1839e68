//! State controllers that keep in-memory snapshots in step with the store.
//!
//! # Responsibility
//! - Subscribe to repository live queries and republish list snapshots.
//! - Run mutations off the caller's task and refresh the snapshot afterwards.
//!
//! # Invariants
//! - Snapshots start empty and are only ever replaced wholesale.
//! - A mutation is followed by an explicit re-read; the live subscription
//!   may deliver the same state again.
//! - A list read at an older store revision never replaces a newer one, so
//!   a slow subscription fetch cannot undo a refresh.
//! - Dropping a controller stops its subscription; in-flight writes finish.

use crate::repo::{LiveQuery, Revisioned};
use log::warn;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub mod member_controller;
pub mod task_controller;

/// Latest published list, observable through `watch` receivers.
#[derive(Debug)]
pub struct Snapshot<T> {
    tx: watch::Sender<Revisioned<T>>,
}

impl<T: Clone> Snapshot<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(Revisioned::default());
        Self { tx }
    }

    /// Replaces the snapshot unless `next` was read at an older revision.
    pub(crate) fn publish(&self, next: Revisioned<T>) -> bool {
        self.tx.send_if_modified(|current| {
            if next.revision < current.revision {
                return false;
            }
            *current = next;
            true
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Revisioned<T>> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> Vec<T> {
        self.tx.borrow().items.clone()
    }
}

/// Forwards every live-query emission to `publish` until `cancel` fires.
pub(crate) fn spawn_subscription<T>(
    mut live: LiveQuery<T>,
    cancel: CancellationToken,
    kind: &'static str,
    publish: impl Fn(Revisioned<T>) + Send + 'static,
) -> JoinHandle<()>
where
    T: Send + 'static,
{
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                next = live.next() => match next {
                    Some(Ok(next)) => publish(next),
                    Some(Err(err)) => {
                        warn!("event=live_query module=controller status=error kind={kind} error={err}");
                    }
                    None => break,
                },
            }
        }
    })
}
