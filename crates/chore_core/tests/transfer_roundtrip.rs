use chore_core::{
    MemberRepository, MemberTransfer, ProfilePicture, SqliteMemberRepository,
    SqliteTaskRepository, Store, Task, TaskRepository, TaskTransfer,
};
use chore_core::transfer::resolve_tasks;

#[test]
fn task_round_trip_by_identity_keeps_flat_fields() {
    let store = Store::open_in_memory().unwrap();
    let members = SqliteMemberRepository::new(store.clone());
    let tasks = SqliteTaskRepository::new(store);
    assert!(members.create_member("Alex", 10, ProfilePicture::Fox));
    let alex = members.list_members().unwrap().remove(0);

    let id = tasks
        .create_task("Dishes", "after dinner", 1_717_200_000_000, &[alex.clone()])
        .unwrap();
    let original = tasks.get_task(id).unwrap().unwrap();

    let json = TaskTransfer::from(&original).to_json().unwrap();
    let restored = TaskTransfer::from_json(&json)
        .unwrap()
        .resolve(&tasks)
        .unwrap();

    assert_eq!(restored.id, original.id);
    assert_eq!(restored.title, original.title);
    assert_eq!(restored.description, original.description);
    assert_eq!(restored.due_at, original.due_at);
    assert_eq!(restored.is_checked, original.is_checked);
    assert!(restored.is_assigned_to(alex.id));
}

#[test]
fn missing_task_is_recreated_with_same_identity() {
    let tasks = SqliteTaskRepository::new(Store::open_in_memory().unwrap());
    let mut detached = Task::new("Sweep", "porch", 42);
    detached.is_checked = true;

    let restored = TaskTransfer::from(&detached).resolve(&tasks).unwrap();
    assert_eq!(restored.id, detached.id);
    assert_eq!(restored.title, "Sweep");
    assert!(restored.is_checked);
    assert!(restored.member_ids.is_empty());
    assert!(tasks.list_tasks().unwrap().is_empty());
}

#[test]
fn member_route_parameter_resolves_back_to_member() {
    let members = SqliteMemberRepository::new(Store::open_in_memory().unwrap());
    assert!(members.create_member("Noa", 8, ProfilePicture::Whale));
    let noa = members.list_members().unwrap().remove(0);

    let param = MemberTransfer::from(&noa).to_json().unwrap();
    let restored = MemberTransfer::from_json(&param)
        .unwrap()
        .resolve(&members)
        .unwrap();
    assert_eq!(restored, noa);
}

#[test]
fn batch_resolution_preserves_order() {
    let tasks = SqliteTaskRepository::new(Store::open_in_memory().unwrap());
    let first = tasks.create_task("first", "", 1, &[]).unwrap();
    let second = tasks.create_task("second", "", 2, &[]).unwrap();

    let records: Vec<TaskTransfer> = [second, first]
        .into_iter()
        .map(|id| TaskTransfer::from(&tasks.get_task(id).unwrap().unwrap()))
        .collect();

    let resolved = resolve_tasks(&records, &tasks).unwrap();
    assert_eq!(resolved[0].id, second);
    assert_eq!(resolved[1].id, first);
}
