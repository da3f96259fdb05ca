// Integration tests for the task store against the in-memory adapter.

use std::sync::Arc;

use chrono::{Duration, Utc};

use taskpilot::error::StoreError;
use taskpilot::memory::InMemoryStore;
use taskpilot::models::{NewTask, Priority, Status};
use taskpilot::remote::RemoteStore;
use taskpilot::store::TaskStore;

async fn signed_in_store() -> (Arc<InMemoryStore>, TaskStore) {
    let remote = Arc::new(InMemoryStore::with_demo_data());
    let mut events = remote.session_events();
    let mut store = TaskStore::new(remote.clone() as Arc<dyn RemoteStore>);

    let ok = store.login("alice@example.com", "password").await.unwrap();
    assert!(ok);
    let event = events.recv().await.unwrap();
    store.handle_session_event(event).await;
    (remote, store)
}

fn new_task(title: &str, assignee: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: String::new(),
        status: Status::ToDo,
        priority: Priority::Medium,
        assignee_id: assignee.to_string(),
        due_date: None,
    }
}

#[tokio::test]
async fn login_loads_all_collections() {
    let (_remote, store) = signed_in_store().await;

    let current = store.current_user().expect("profile loaded");
    assert_eq!(current.id, "1");
    assert_eq!(current.name, "Alice Johnson");
    assert_eq!(current.initials, "AJ");
    assert_eq!(store.users().len(), 3);
    assert_eq!(store.tasks().len(), 5);
    assert!(!store.loading());
}

#[tokio::test]
async fn tasks_for_user_filters_in_cache_order() {
    let (_remote, store) = signed_in_store().await;

    let mine = store.tasks_for_user("1");
    let ids: Vec<&str> = mine.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["T1", "T5"]);
    assert!(mine.iter().all(|t| t.assignee_id == "1"));

    assert!(store.tasks_for_user("nobody").is_empty());
}

#[tokio::test]
async fn invalid_credentials_return_false_without_error() {
    let remote = Arc::new(InMemoryStore::with_demo_data());
    let mut store = TaskStore::new(remote as Arc<dyn RemoteStore>);

    let ok = store.login("alice@example.com", "wrong").await.unwrap();
    assert!(!ok);
    assert!(store.current_user().is_none());
}

#[tokio::test]
async fn logout_clears_session_and_cache() {
    let (remote, mut store) = signed_in_store().await;
    let mut events = remote.session_events();

    store.logout().await.unwrap();
    let event = events.recv().await.unwrap();
    store.handle_session_event(event).await;

    assert!(store.current_user().is_none());
    assert!(store.tasks().is_empty());
    assert!(store.users().is_empty());
    assert!(store.teams().is_empty());
}

#[tokio::test]
async fn create_task_round_trips_through_the_cache() {
    let (_remote, mut store) = signed_in_store().await;

    let due = Utc::now() + Duration::days(2);
    let created = store
        .add_task(NewTask {
            title: "Write spec".to_string(),
            description: "Outline the v2 API".to_string(),
            status: Status::ToDo,
            priority: Priority::Medium,
            assignee_id: "2".to_string(),
            due_date: Some(due),
        })
        .await
        .unwrap();

    assert_eq!(store.tasks().len(), 6);
    let fetched = store.task_by_id(&created.id).expect("cached after create");
    assert_eq!(fetched.title, "Write spec");
    assert_eq!(fetched.description, "Outline the v2 API");
    assert_eq!(fetched.status, Status::ToDo);
    assert_eq!(fetched.priority, Priority::Medium);
    assert_eq!(fetched.assignee_id, "2");
    // Due date compared by calendar date, not instant.
    assert_eq!(
        fetched.due_date.map(|d| d.date_naive()),
        Some(due.date_naive())
    );
}

#[tokio::test]
async fn add_task_requires_a_signed_in_user() {
    let remote = Arc::new(InMemoryStore::with_demo_data());
    let mut store = TaskStore::new(remote as Arc<dyn RemoteStore>);

    let result = store.add_task(new_task("Orphan", "1")).await;
    assert!(matches!(result, Err(StoreError::NotSignedIn)));
    assert!(store.tasks().is_empty());
}

#[tokio::test]
async fn add_task_rejects_blank_title_before_remote_call() {
    let (_remote, mut store) = signed_in_store().await;

    let result = store.add_task(new_task("   ", "1")).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert_eq!(store.tasks().len(), 5);
}

#[tokio::test]
async fn update_task_is_idempotent() {
    let (_remote, mut store) = signed_in_store().await;

    let mut task = store.task_by_id("T2").unwrap().clone();
    task.title = "Develop the whole authentication flow".to_string();
    task.priority = Priority::Medium;

    store.update_task(task.clone()).await.unwrap();
    let after_first: Vec<_> = store.tasks().to_vec();

    store.update_task(task).await.unwrap();
    assert_eq!(store.tasks(), after_first.as_slice());
    assert_eq!(
        store.task_by_id("T2").unwrap().title,
        "Develop the whole authentication flow"
    );
}

#[tokio::test]
async fn failed_update_leaves_the_cache_untouched() {
    let (remote, mut store) = signed_in_store().await;
    let before = store.task_by_id("T2").unwrap().clone();

    remote.set_fail_updates(true);
    let mut changed = before.clone();
    changed.title = "Should not stick".to_string();
    assert!(store.update_task(changed).await.is_err());

    assert_eq!(store.task_by_id("T2").unwrap(), &before);
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn delete_task_removes_the_record() {
    let (_remote, mut store) = signed_in_store().await;

    store.delete_task("T1").await.unwrap();
    assert!(store.task_by_id("T1").is_none());
    assert_eq!(store.tasks().len(), 4);
}

#[tokio::test]
async fn failed_delete_keeps_the_record() {
    let (remote, mut store) = signed_in_store().await;

    remote.set_fail_deletes(true);
    assert!(store.delete_task("T1").await.is_err());
    assert!(store.task_by_id("T1").is_some());
    assert_eq!(store.tasks().len(), 5);
}

#[tokio::test]
async fn empty_member_list_is_rejected_before_any_remote_call() {
    let (remote, mut store) = signed_in_store().await;

    let result = store.add_team("QA", "", &[]).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert_eq!(remote.team_count(), 0);
    assert!(store.teams().is_empty());
}

#[tokio::test]
async fn add_team_creates_record_and_memberships() {
    let (remote, mut store) = signed_in_store().await;

    store
        .add_team("Platform", "Infra and tooling", &["1".to_string(), "2".to_string()])
        .await
        .unwrap();

    assert_eq!(remote.team_count(), 1);
    assert_eq!(remote.membership_count(), 2);
    assert_eq!(store.teams().len(), 1);
    let team = &store.teams()[0];
    assert_eq!(team.name, "Platform");
    assert_eq!(team.created_by, "1");
    let mut members = team.member_ids.clone();
    members.sort();
    assert_eq!(members, ["1", "2"]);
}

#[tokio::test]
async fn membership_failure_leaves_the_orphaned_team_record() {
    let (remote, mut store) = signed_in_store().await;

    remote.set_fail_memberships(true);
    let result = store.add_team("Ghost", "", &["1".to_string()]).await;
    assert!(result.is_err());

    // No compensating delete: the team row stays, memberless, and the
    // refreshed list shows it.
    assert_eq!(remote.team_count(), 1);
    assert_eq!(remote.membership_count(), 0);
    assert_eq!(store.teams().len(), 1);
    assert!(store.teams()[0].member_ids.is_empty());
}

#[tokio::test]
async fn signup_with_taken_email_is_distinguishable() {
    let (_remote, mut store) = signed_in_store().await;

    let result = store.signup("Dora", "alice@example.com", "hunter2").await;
    assert!(matches!(result, Err(StoreError::EmailTaken)));
}

#[tokio::test]
async fn signup_rejects_malformed_email_before_remote_call() {
    let remote = Arc::new(InMemoryStore::with_demo_data());
    let mut store = TaskStore::new(remote as Arc<dyn RemoteStore>);

    let result = store.signup("Dana", "not-an-email", "hunter2").await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let result = store.signup("Dana", "dana@example.com", "").await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn signup_backfills_the_missing_profile_row() {
    let remote = Arc::new(InMemoryStore::with_demo_data());
    let mut events = remote.session_events();
    let mut store = TaskStore::new(remote.clone() as Arc<dyn RemoteStore>);

    store
        .signup("Dana Smith", "dana@example.com", "hunter2")
        .await
        .unwrap();
    let event = events.recv().await.unwrap();
    store.handle_session_event(event).await;

    let current = store.current_user().expect("profile backfilled");
    assert_eq!(current.name, "Dana Smith");
    assert_eq!(current.initials, "DS");
    assert_eq!(store.users().len(), 4);
}

#[tokio::test]
async fn change_current_user_prefers_the_cache() {
    let (_remote, mut store) = signed_in_store().await;

    store.change_current_user("2").await;
    assert_eq!(store.current_user().unwrap().name, "Bob Williams");

    // Unknown id: current user is kept and the failure is recorded.
    store.change_current_user("missing").await;
    assert_eq!(store.current_user().unwrap().id, "2");
    assert!(store.last_error().is_some());
}

#[tokio::test]
async fn refresh_picks_up_external_changes() {
    let (remote, mut store) = signed_in_store().await;

    remote.insert_task(&new_task("Added elsewhere", "3")).await.unwrap();
    assert_eq!(store.tasks().len(), 5);

    store.refresh().await;
    assert_eq!(store.tasks().len(), 6);
}
