//! Member state controller.

use crate::controller::{spawn_subscription, Snapshot};
use crate::model::member::{Member, ProfilePicture};
use crate::repo::member_repo::MemberRepository;
use crate::repo::Revisioned;
use log::warn;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Publishes the member roster and forwards member mutations.
pub struct MemberController<R> {
    shared: Arc<Shared<R>>,
    cancel: CancellationToken,
}

struct Shared<R> {
    repo: R,
    members: Snapshot<Member>,
}

impl<R> Shared<R>
where
    R: MemberRepository,
{
    fn refresh(&self) {
        match self.repo.watch_members().first() {
            Ok(next) => {
                self.members.publish(next);
            }
            Err(err) => {
                warn!("event=member_refresh module=controller status=error error={err}");
            }
        }
    }
}

impl<R> MemberController<R>
where
    R: MemberRepository + Send + Sync + 'static,
{
    /// Creates the controller and starts its live subscription.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(repo: R) -> Self {
        let shared = Arc::new(Shared {
            repo,
            members: Snapshot::new(),
        });
        let cancel = CancellationToken::new();

        let live = shared.repo.watch_members();
        let target = Arc::clone(&shared);
        spawn_subscription(live, cancel.clone(), "member", move |next| {
            target.members.publish(next);
        });

        Self { shared, cancel }
    }

    /// Receiver over the roster snapshot.
    pub fn members(&self) -> watch::Receiver<Revisioned<Member>> {
        self.shared.members.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Member> {
        self.shared.members.current()
    }

    pub fn delete_member(&self, member: Member) -> JoinHandle<bool> {
        self.dispatch(move |repo| match repo.delete_member(&member) {
            Ok(removed) => removed,
            Err(err) => {
                warn!(
                    "event=member_delete module=controller status=error member_id={} error={}",
                    member.id, err
                );
                false
            }
        })
    }

    pub fn update_member(
        &self,
        member: Member,
        name: impl Into<String>,
        age: u32,
        picture: ProfilePicture,
    ) -> JoinHandle<bool> {
        let name = name.into();
        self.dispatch(move |repo| repo.update_member(&member, &name, age, picture))
    }

    pub fn create_member(
        &self,
        name: impl Into<String>,
        age: u32,
        picture: ProfilePicture,
    ) -> JoinHandle<bool> {
        let name = name.into();
        self.dispatch(move |repo| repo.create_member(&name, age, picture))
    }

    fn dispatch(&self, op: impl FnOnce(&R) -> bool + Send + 'static) -> JoinHandle<bool> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || {
            let applied = op(&shared.repo);
            shared.refresh();
            applied
        })
    }
}

impl<R> Drop for MemberController<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
