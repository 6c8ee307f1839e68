//! Task state controller.

use crate::controller::{spawn_subscription, Snapshot};
use crate::model::member::Member;
use crate::model::task::Task;
use crate::repo::task_repo::TaskRepository;
use crate::repo::{RepoResult, Revisioned};
use log::warn;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Publishes the task list and forwards task mutations.
///
/// Store errors are logged and reported as `false`.
pub struct TaskController<R> {
    shared: Arc<Shared<R>>,
    cancel: CancellationToken,
}

struct Shared<R> {
    repo: R,
    tasks: Snapshot<Task>,
}

impl<R> Shared<R>
where
    R: TaskRepository,
{
    fn refresh(&self) {
        match self.repo.watch_tasks().first() {
            Ok(next) => {
                self.tasks.publish(next);
            }
            Err(err) => {
                warn!("event=task_refresh module=controller status=error error={err}");
            }
        }
    }
}

impl<R> TaskController<R>
where
    R: TaskRepository + Send + Sync + 'static,
{
    /// Creates the controller and starts its live subscription.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(repo: R) -> Self {
        let shared = Arc::new(Shared {
            repo,
            tasks: Snapshot::new(),
        });
        let cancel = CancellationToken::new();

        let live = shared.repo.watch_tasks();
        let target = Arc::clone(&shared);
        spawn_subscription(live, cancel.clone(), "task", move |next| {
            target.tasks.publish(next);
        });

        Self { shared, cancel }
    }

    pub fn tasks(&self) -> watch::Receiver<Revisioned<Task>> {
        self.shared.tasks.subscribe()
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.shared.tasks.current()
    }

    pub fn delete_task(&self, task: Task) -> JoinHandle<bool> {
        self.dispatch("delete", move |repo| repo.delete_task(&task))
    }

    pub fn update_task(
        &self,
        task: Task,
        title: impl Into<String>,
        description: impl Into<String>,
        due_at: i64,
        members: Vec<Member>,
    ) -> JoinHandle<bool> {
        let title = title.into();
        let description = description.into();
        self.dispatch("update", move |repo| {
            repo.update_task(&task, &title, &description, due_at, &members)
        })
    }

    pub fn update_task_completion(&self, task: Task, is_checked: bool) -> JoinHandle<bool> {
        self.dispatch("completion", move |repo| {
            repo.update_task_completion(&task, is_checked)
        })
    }

    pub fn create_task(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        due_at: i64,
        members: Vec<Member>,
    ) -> JoinHandle<bool> {
        let title = title.into();
        let description = description.into();
        self.dispatch("create", move |repo| {
            repo.create_task(&title, &description, due_at, &members)
                .map(|_| true)
        })
    }

    fn dispatch(
        &self,
        action: &'static str,
        op: impl FnOnce(&R) -> RepoResult<bool> + Send + 'static,
    ) -> JoinHandle<bool> {
        let shared = Arc::clone(&self.shared);
        tokio::task::spawn_blocking(move || {
            let applied = op(&shared.repo).unwrap_or_else(|err| {
                warn!("event=task_{action} module=controller status=error error={err}");
                false
            });
            shared.refresh();
            applied
        })
    }
}

impl<R> Drop for TaskController<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
