use chore_core::{
    Member, MemberRepository, ProfilePicture, SqliteMemberRepository, SqliteTaskRepository, Store,
    Task, TaskRepository,
};

const TODAY_MS: i64 = 1_717_200_000_000;

struct Fixture {
    members: SqliteMemberRepository,
    tasks: SqliteTaskRepository,
}

fn fixture() -> Fixture {
    let store = Store::open_in_memory().unwrap();
    Fixture {
        members: SqliteMemberRepository::new(store.clone()),
        tasks: SqliteTaskRepository::new(store),
    }
}

impl Fixture {
    fn member(&self, name: &str, picture: ProfilePicture) -> Member {
        assert!(self.members.create_member(name, 10, picture));
        self.members
            .list_members()
            .unwrap()
            .into_iter()
            .find(|member| member.name == name)
            .unwrap()
    }
}

#[test]
fn created_task_is_listed_unchecked_with_its_members() {
    let fx = fixture();
    let alex = fx.member("Alex", ProfilePicture::Fox);

    let id = fx
        .tasks
        .create_task("Dishes", "", TODAY_MS, std::slice::from_ref(&alex))
        .unwrap();

    let all = fx.tasks.list_tasks().unwrap();
    let dishes: Vec<&Task> = all.iter().filter(|task| task.title == "Dishes").collect();
    assert_eq!(dishes.len(), 1);
    assert_eq!(dishes[0].id, id);
    assert!(!dishes[0].is_checked);
    assert_eq!(dishes[0].due_at, TODAY_MS);
    assert!(dishes[0].is_assigned_to(alex.id));
}

#[test]
fn toggling_completion_persists_across_fresh_reads() {
    let fx = fixture();
    let alex = fx.member("Alex", ProfilePicture::Fox);
    fx.tasks
        .create_task("Dishes", "", TODAY_MS, &[alex])
        .unwrap();
    let dishes = fx.tasks.list_tasks().unwrap().remove(0);

    assert!(fx.tasks.update_task_completion(&dishes, true).unwrap());

    let reread = fx.tasks.list_tasks().unwrap();
    assert_eq!(reread.len(), 1);
    assert!(reread[0].is_checked);

    assert!(fx.tasks.update_task_completion(&dishes, false).unwrap());
    assert!(!fx.tasks.get_task(dishes.id).unwrap().unwrap().is_checked);
}

#[test]
fn update_replaces_fields_and_association_set() {
    let fx = fixture();
    let alex = fx.member("Alex", ProfilePicture::Fox);
    let sam = fx.member("Sam", ProfilePicture::Tiger);
    let noa = fx.member("Noa", ProfilePicture::Pig);
    let id = fx
        .tasks
        .create_task("Trash", "bins out", TODAY_MS, &[alex.clone(), sam.clone()])
        .unwrap();
    let task = fx.tasks.get_task(id).unwrap().unwrap();

    let applied = fx
        .tasks
        .update_task(&task, "Recycling", "blue bin", TODAY_MS + 86_400_000, &[noa.clone()])
        .unwrap();
    assert!(applied);

    let updated = fx.tasks.get_task(id).unwrap().unwrap();
    assert_eq!(updated.title, "Recycling");
    assert_eq!(updated.description, "blue bin");
    assert_eq!(updated.due_at, TODAY_MS + 86_400_000);
    assert_eq!(updated.member_ids.len(), 1);
    assert!(updated.is_assigned_to(noa.id));
    assert!(!updated.is_checked);
}

#[test]
fn update_drops_members_deleted_in_the_meantime() {
    let fx = fixture();
    let alex = fx.member("Alex", ProfilePicture::Fox);
    let sam = fx.member("Sam", ProfilePicture::Tiger);
    let id = fx
        .tasks
        .create_task("Vacuum", "", TODAY_MS, std::slice::from_ref(&alex))
        .unwrap();
    let task = fx.tasks.get_task(id).unwrap().unwrap();

    assert!(fx.members.delete_member(&sam).unwrap());
    assert!(fx
        .tasks
        .update_task(&task, "Vacuum", "", TODAY_MS, &[alex.clone(), sam.clone()])
        .unwrap());

    let updated = fx.tasks.get_task(id).unwrap().unwrap();
    assert_eq!(updated.member_ids.len(), 1);
    assert!(updated.is_assigned_to(alex.id));
}

#[test]
fn update_and_completion_of_vanished_task_are_no_ops() {
    let fx = fixture();
    let alex = fx.member("Alex", ProfilePicture::Fox);
    let id = fx
        .tasks
        .create_task("Dust", "", TODAY_MS, std::slice::from_ref(&alex))
        .unwrap();
    let task = fx.tasks.get_task(id).unwrap().unwrap();
    assert!(fx.tasks.delete_task(&task).unwrap());

    assert!(!fx
        .tasks
        .update_task(&task, "Dust", "", TODAY_MS, &[alex])
        .unwrap());
    assert!(!fx.tasks.update_task_completion(&task, true).unwrap());
    assert!(fx.tasks.list_tasks().unwrap().is_empty());
}

#[test]
fn delete_twice_is_a_no_op() {
    let fx = fixture();
    let id = fx.tasks.create_task("Mop", "", TODAY_MS, &[]).unwrap();
    let task = fx.tasks.get_task(id).unwrap().unwrap();

    assert!(fx.tasks.delete_task(&task).unwrap());
    assert!(!fx.tasks.delete_task(&task).unwrap());
}

#[test]
fn upsert_overwrites_record_with_same_id() {
    let fx = fixture();
    let alex = fx.member("Alex", ProfilePicture::Fox);
    let sam = fx.member("Sam", ProfilePicture::Tiger);

    let mut task = Task::new("Cook", "pasta", TODAY_MS);
    task.member_ids.insert(alex.id);
    fx.tasks.upsert_task(&task).unwrap();

    task.title = "Cook dinner".to_string();
    task.is_checked = true;
    task.member_ids.clear();
    task.member_ids.insert(sam.id);
    fx.tasks.upsert_task(&task).unwrap();

    let all = fx.tasks.list_tasks().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0], task);
}

#[test]
fn tasks_for_member_is_an_explicit_reverse_query() {
    let fx = fixture();
    let alex = fx.member("Alex", ProfilePicture::Fox);
    let sam = fx.member("Sam", ProfilePicture::Tiger);

    fx.tasks
        .create_task("Later", "", TODAY_MS + 10, std::slice::from_ref(&alex))
        .unwrap();
    fx.tasks
        .create_task("Shared", "", TODAY_MS, &[alex.clone(), sam.clone()])
        .unwrap();
    fx.tasks
        .create_task("Sam only", "", TODAY_MS, std::slice::from_ref(&sam))
        .unwrap();

    let titles: Vec<String> = fx
        .tasks
        .list_tasks_for_member(alex.id)
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["Shared", "Later"]);
}

#[test]
fn due_between_is_half_open() {
    let fx = fixture();
    fx.tasks.create_task("start", "", 1_000, &[]).unwrap();
    fx.tasks.create_task("inside", "", 1_500, &[]).unwrap();
    fx.tasks.create_task("end", "", 2_000, &[]).unwrap();

    let titles: Vec<String> = fx
        .tasks
        .list_tasks_due_between(1_000, 2_000)
        .unwrap()
        .into_iter()
        .map(|task| task.title)
        .collect();
    assert_eq!(titles, vec!["start", "inside"]);
}
