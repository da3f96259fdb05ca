// src/memory.rs
//
// In-memory implementation of the remote store adapter, used by the test
// suites and by the demo binary when no backend is configured. Mutations
// emit change events the way the real change feed would, and update/delete
// failures can be injected to exercise the rollback paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{NewTask, NewTeam, Priority, Status, Task, Team, TeamMember, User};
use crate::remote::{ChangeEvent, Collection, RemoteStore, SessionEvent, SessionUser};

struct Account {
    password: String,
    user_id: String,
    name: String,
}

#[derive(Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    session: Option<SessionUser>,
    users: Vec<User>,
    tasks: Vec<Task>,
    teams: Vec<Team>,
    members: Vec<TeamMember>,
}

pub struct InMemoryStore {
    inner: Mutex<Inner>,
    session_tx: broadcast::Sender<SessionEvent>,
    change_tx: broadcast::Sender<ChangeEvent>,
    fail_updates: AtomicBool,
    fail_deletes: AtomicBool,
    fail_memberships: AtomicBool,
    update_calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        let (session_tx, _) = broadcast::channel(16);
        let (change_tx, _) = broadcast::channel(16);
        InMemoryStore {
            inner: Mutex::new(Inner::default()),
            session_tx,
            change_tx,
            fail_updates: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
            fail_memberships: AtomicBool::new(false),
            update_calls: AtomicUsize::new(0),
        }
    }

    /// Seeds the fixtures the product demo ships with: Alice, Bob and
    /// Charlie, five tasks, and a password of "password" for every account.
    pub fn with_demo_data() -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            let seed_users = [
                ("1", "Alice Johnson", "alice@example.com"),
                ("2", "Bob Williams", "bob@example.com"),
                ("3", "Charlie Brown", "charlie@example.com"),
            ];
            for (id, name, email) in seed_users {
                inner.users.push(
                    User {
                        id: id.to_string(),
                        name: name.to_string(),
                        email: email.to_string(),
                        avatar: format!(
                            "https://placehold.co/32x32.png?text={}",
                            User::derive_initials(name)
                        ),
                        initials: String::new(),
                    }
                    .refresh_initials(),
                );
                inner.accounts.insert(
                    email.to_string(),
                    Account {
                        password: "password".to_string(),
                        user_id: id.to_string(),
                        name: name.to_string(),
                    },
                );
            }

            let now = Utc::now();
            let seed_tasks = [
                (
                    "T1",
                    "Design the new landing page",
                    "Create a mockup in Figma for the new marketing landing page.",
                    Status::InProgress,
                    Priority::High,
                    "1",
                    Some(now + Duration::days(3)),
                ),
                (
                    "T2",
                    "Develop the authentication flow",
                    "Implement email/password login against the backend.",
                    Status::ToDo,
                    Priority::High,
                    "2",
                    Some(now + Duration::days(5)),
                ),
                (
                    "T3",
                    "Set up the database schema",
                    "Define and create the tables for tasks and users.",
                    Status::Done,
                    Priority::Medium,
                    "2",
                    Some(now - Duration::days(2)),
                ),
                (
                    "T4",
                    "Write API documentation",
                    "Document the endpoints for the task management API.",
                    Status::ToDo,
                    Priority::Low,
                    "3",
                    Some(now + Duration::days(7)),
                ),
                (
                    "T5",
                    "Test the application on mobile devices",
                    "Ensure the app is responsive and functional on iOS and Android.",
                    Status::ToDo,
                    Priority::Medium,
                    "1",
                    Some(now + Duration::days(4)),
                ),
            ];
            for (id, title, description, status, priority, assignee, due) in seed_tasks {
                inner.tasks.push(Task {
                    id: id.to_string(),
                    title: title.to_string(),
                    description: description.to_string(),
                    status,
                    priority,
                    assignee_id: assignee.to_string(),
                    due_date: due,
                });
            }
        }
        store
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn notify(&self, collection: Collection) {
        let _ = self.change_tx.send(ChangeEvent { collection });
    }

    // ── test controls ─────────────────────────────────────────────────────

    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_memberships(&self, fail: bool) {
        self.fail_memberships.store(fail, Ordering::SeqCst);
    }

    /// Number of `update_task` calls received, including rejected ones.
    pub fn update_call_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    pub fn team_count(&self) -> usize {
        self.lock().teams.len()
    }

    pub fn membership_count(&self) -> usize {
        self.lock().members.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), StoreError> {
        let session_user = {
            let mut inner = self.lock();
            if inner.accounts.contains_key(email) {
                return Err(StoreError::EmailTaken);
            }
            let user_id = Uuid::new_v4().to_string();
            inner.accounts.insert(
                email.to_string(),
                Account {
                    password: password.to_string(),
                    user_id: user_id.clone(),
                    name: name.to_string(),
                },
            );
            // No profile row here: the backend trigger may be missing, and
            // the store is expected to backfill it on the session event.
            let session_user = SessionUser {
                id: user_id,
                email: email.to_string(),
                name: Some(name.to_string()),
                avatar: None,
            };
            inner.session = Some(session_user.clone());
            session_user
        };
        let _ = self.session_tx.send(SessionEvent::SignedIn(session_user));
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<bool, StoreError> {
        let session_user = {
            let mut inner = self.lock();
            let account = match inner.accounts.get(email) {
                Some(account) if account.password == password => account,
                _ => return Ok(false),
            };
            let session_user = SessionUser {
                id: account.user_id.clone(),
                email: email.to_string(),
                name: Some(account.name.clone()),
                avatar: None,
            };
            inner.session = Some(session_user.clone());
            session_user
        };
        let _ = self.session_tx.send(SessionEvent::SignedIn(session_user));
        Ok(true)
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        self.lock().session = None;
        let _ = self.session_tx.send(SessionEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<SessionUser>, StoreError> {
        Ok(self.lock().session.clone())
    }

    fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.lock().users.clone())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<User, StoreError> {
        let user = user.clone().refresh_initials();
        self.lock().users.push(user.clone());
        self.notify(Collection::Users);
        Ok(user)
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.lock().tasks.clone())
    }

    async fn insert_task(&self, task: &NewTask) -> Result<Task, StoreError> {
        let record = Task {
            id: Uuid::new_v4().to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            assignee_id: task.assignee_id.clone(),
            due_date: task.due_date,
        };
        self.lock().tasks.push(record.clone());
        self.notify(Collection::Tasks);
        Ok(record)
    }

    async fn update_task(&self, task: &Task) -> Result<Task, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("simulated update failure".to_string()));
        }
        let mut inner = self.lock();
        match inner.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => {
                *existing = task.clone();
            }
            None => return Err(StoreError::Rejected(format!("task {} not found", task.id))),
        }
        drop(inner);
        self.notify(Collection::Tasks);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("simulated delete failure".to_string()));
        }
        self.lock().tasks.retain(|t| t.id != id);
        self.notify(Collection::Tasks);
        Ok(())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let inner = self.lock();
        let mut teams = inner.teams.clone();
        for team in &mut teams {
            team.member_ids = inner
                .members
                .iter()
                .filter(|m| m.team_id == team.id)
                .map(|m| m.user_id.clone())
                .collect();
        }
        Ok(teams)
    }

    async fn insert_team(&self, team: &NewTeam) -> Result<Team, StoreError> {
        let record = Team {
            id: Uuid::new_v4().to_string(),
            name: team.name.clone(),
            description: team.description.clone(),
            created_by: team.created_by.clone(),
            member_ids: Vec::new(),
        };
        self.lock().teams.push(record.clone());
        self.notify(Collection::Teams);
        Ok(record)
    }

    async fn insert_team_members(
        &self,
        team_id: &str,
        member_ids: &[String],
    ) -> Result<(), StoreError> {
        if self.fail_memberships.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(
                "simulated membership failure".to_string(),
            ));
        }
        let mut inner = self.lock();
        for user_id in member_ids {
            inner.members.push(TeamMember {
                team_id: team_id.to_string(),
                user_id: user_id.clone(),
            });
        }
        drop(inner);
        self.notify(Collection::Teams);
        Ok(())
    }

    fn change_events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.change_tx.subscribe()
    }
}
