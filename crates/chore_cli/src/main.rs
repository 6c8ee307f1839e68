//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `chore_core` linkage and store bootstrap from environment config.
//! - Keep output deterministic for quick local sanity checks.

use chore_core::{
    CoreConfig, MemberRepository, SqliteMemberRepository, SqliteTaskRepository, TaskRepository,
};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("chore_core version={}", chore_core::core_version());

    let config = CoreConfig::from_env();
    match run(&config) {
        Ok((members, tasks, completed)) => {
            println!("members={members} tasks={tasks} completed={completed}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CoreConfig) -> Result<(usize, usize, usize), Box<dyn std::error::Error>> {
    let store = config.bootstrap()?;
    let members = SqliteMemberRepository::new(store.clone()).list_members()?;
    let tasks = SqliteTaskRepository::new(store).list_tasks()?;
    let completed = tasks.iter().filter(|task| task.is_checked).count();
    Ok((members.len(), tasks.len(), completed))
}
