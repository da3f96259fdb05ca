// src/store.rs
//
// The task store: single in-memory source of truth for the signed-in
// session's view of users, tasks and teams. Every mutation goes through the
// remote store adapter; no other component may write to the cache.

use std::sync::Arc;

use log::{debug, error, info};
use regex::Regex;

use crate::error::StoreError;
use crate::models::{NewTask, NewTeam, Status, Task, Team, User};
use crate::remote::{RemoteStore, SessionEvent, SessionUser};

const PLACEHOLDER_AVATAR: &str = "https://placehold.co/128x128.png";

fn email_looks_valid(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$")
        .map(|re| re.is_match(email))
        .unwrap_or(false)
}

pub struct TaskStore {
    remote: Arc<dyn RemoteStore>,
    tasks: Vec<Task>,
    users: Vec<User>,
    teams: Vec<Team>,
    current_user: Option<User>,
    loading: bool,
    last_error: Option<String>,
}

impl TaskStore {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Self {
        TaskStore {
            remote,
            tasks: Vec::new(),
            users: Vec::new(),
            teams: Vec::new(),
            current_user: None,
            loading: false,
            last_error: None,
        }
    }

    // ── read-only views ───────────────────────────────────────────────────

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Pure filter over the cache, preserving cache order.
    pub fn tasks_for_user(&self, user_id: &str) -> Vec<&Task> {
        self.tasks
            .iter()
            .filter(|t| t.assignee_id == user_id)
            .collect()
    }

    pub fn task_by_id(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    fn record_error(&mut self, context: &str, err: &StoreError) {
        error!("{}: {}", context, err);
        self.last_error = Some(format!("{}: {}", context, err));
    }

    // ── session lifecycle ─────────────────────────────────────────────────

    /// Delegates to remote auth. Returns `false` on invalid credentials;
    /// configuration and transport errors propagate. The data load is
    /// performed by the session-change path, not here.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<bool, StoreError> {
        self.loading = true;
        match self.remote.sign_in(email, password).await {
            Ok(true) => Ok(true),
            Ok(false) => {
                debug!("login rejected for {}", email);
                self.loading = false;
                Ok(false)
            }
            Err(e) => {
                self.loading = false;
                self.record_error("login failed", &e);
                Err(e)
            }
        }
    }

    /// Creates a remote identity. `EmailTaken` is distinguishable from
    /// other failures so the caller can word the notification.
    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), StoreError> {
        if password.is_empty() {
            return Err(StoreError::Validation(
                "Password is required for signup".to_string(),
            ));
        }
        if !email_looks_valid(email) {
            return Err(StoreError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        self.loading = true;
        let result = self.remote.sign_up(name, email, password).await;
        if let Err(e) = &result {
            self.loading = false;
            self.record_error("signup failed", e);
        }
        result
    }

    /// Clears the remote session; the session-change path resets the cache.
    pub async fn logout(&mut self) -> Result<(), StoreError> {
        self.loading = true;
        self.remote.sign_out().await
    }

    /// Entry point for session-change notifications: sign-in, sign-out and
    /// token refresh all land here and re-run the full data load.
    pub async fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::SignedIn(session) => self.handle_session_change(Some(session)).await,
            SessionEvent::SignedOut => self.handle_session_change(None).await,
        }
    }

    pub async fn handle_session_change(&mut self, session: Option<SessionUser>) {
        match session {
            Some(session) => {
                self.loading = true;
                if let Some(profile) = self.load_or_create_profile(&session).await {
                    info!("session ready for {}", profile.email);
                    self.current_user = Some(profile);
                    self.fetch_tasks().await;
                    self.fetch_users().await;
                    self.fetch_teams().await;
                } else {
                    self.current_user = None;
                }
            }
            None => {
                info!("session ended, clearing cache");
                self.current_user = None;
                self.tasks.clear();
                self.users.clear();
                self.teams.clear();
            }
        }
        self.loading = false;
    }

    /// Fetches the profile row for the session identity, creating it from
    /// session metadata when the backend did not. Name falls back to the
    /// email local part, avatar to a placeholder.
    async fn load_or_create_profile(&mut self, session: &SessionUser) -> Option<User> {
        match self.remote.get_user(&session.id).await {
            Ok(Some(profile)) => Some(profile),
            Ok(None) => {
                debug!("no profile row for {}, creating one", session.id);
                let fallback_name = session.name.clone().unwrap_or_else(|| {
                    session
                        .email
                        .split('@')
                        .next()
                        .unwrap_or(session.email.as_str())
                        .to_string()
                });
                let profile = User {
                    id: session.id.clone(),
                    name: fallback_name,
                    email: session.email.clone(),
                    avatar: session
                        .avatar
                        .clone()
                        .unwrap_or_else(|| PLACEHOLDER_AVATAR.to_string()),
                    initials: String::new(),
                }
                .refresh_initials();
                match self.remote.insert_user(&profile).await {
                    Ok(created) => Some(created),
                    Err(e) => {
                        self.record_error("failed to create missing user profile", &e);
                        None
                    }
                }
            }
            Err(e) => {
                self.record_error("could not fetch user profile", &e);
                None
            }
        }
    }

    // ── cache refresh ─────────────────────────────────────────────────────

    /// Unconditional full re-fetch of every collection. This is the handler
    /// for change-feed notifications: simple rather than incremental.
    pub async fn refresh(&mut self) {
        self.fetch_tasks().await;
        self.fetch_users().await;
        self.fetch_teams().await;
    }

    async fn fetch_tasks(&mut self) {
        match self.remote.list_tasks().await {
            Ok(tasks) => self.tasks = tasks,
            Err(e) => self.record_error("error fetching tasks", &e),
        }
    }

    async fn fetch_users(&mut self) {
        match self.remote.list_users().await {
            Ok(users) => self.users = users,
            Err(e) => {
                self.record_error("error fetching users", &e);
                self.users.clear();
            }
        }
    }

    async fn fetch_teams(&mut self) {
        match self.remote.list_teams().await {
            Ok(teams) => self.teams = teams,
            Err(e) => self.record_error("error fetching teams", &e),
        }
    }

    // ── current-user switching (demo affordance, not an auth boundary) ────

    /// Switches the locally displayed user without re-authentication:
    /// cache lookup first, direct fetch as a fallback.
    pub async fn change_current_user(&mut self, user_id: &str) {
        if let Some(user) = self.users.iter().find(|u| u.id == user_id) {
            self.current_user = Some(user.clone());
            return;
        }
        match self.remote.get_user(user_id).await {
            Ok(Some(user)) => self.current_user = Some(user),
            Ok(None) => {
                error!("could not switch to user {}: not found", user_id);
                self.last_error = Some(format!("could not switch to user {}", user_id));
            }
            Err(e) => self.record_error("could not switch user", &e),
        }
    }

    // ── task mutations ────────────────────────────────────────────────────

    /// Creates a task remotely and appends the backend-assigned record to
    /// the cache.
    pub async fn add_task(&mut self, task: NewTask) -> Result<Task, StoreError> {
        if self.current_user.is_none() {
            return Err(StoreError::NotSignedIn);
        }
        task.validate()?;
        match self.remote.insert_task(&task).await {
            Ok(created) => {
                self.tasks.push(created.clone());
                Ok(created)
            }
            Err(e) => {
                self.record_error("error adding task", &e);
                Err(e)
            }
        }
    }

    /// Full-record update keyed by id. On success the cached record is
    /// replaced; on failure the cache is left exactly as it was.
    pub async fn update_task(&mut self, task: Task) -> Result<(), StoreError> {
        match self.remote.update_task(&task).await {
            Ok(updated) => {
                if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
                    *existing = updated;
                }
                Ok(())
            }
            Err(e) => {
                self.record_error("error updating task", &e);
                Err(e)
            }
        }
    }

    /// Local-only status change, used to apply an optimistic board move
    /// before the remote confirmation arrives. No remote call.
    pub fn set_task_status(&mut self, task_id: &str, status: Status) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == task_id) {
            task.status = status;
        }
    }

    /// Remote delete followed by local removal. On failure the local record
    /// stays (stale until the next refresh).
    pub async fn delete_task(&mut self, task_id: &str) -> Result<(), StoreError> {
        match self.remote.delete_task(task_id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != task_id);
                Ok(())
            }
            Err(e) => {
                self.record_error("error deleting task", &e);
                Err(e)
            }
        }
    }

    // ── team mutations ────────────────────────────────────────────────────

    /// Creates a team record, then the membership rows. A membership
    /// failure surfaces as an error with no compensating delete of the team
    /// record; the team list is re-fetched from the backend afterward
    /// either way.
    pub async fn add_team(
        &mut self,
        name: &str,
        description: &str,
        member_ids: &[String],
    ) -> Result<(), StoreError> {
        let current_user = match &self.current_user {
            Some(user) => user.clone(),
            None => return Err(StoreError::NotSignedIn),
        };
        if name.trim().is_empty() {
            return Err(StoreError::Validation("Team name is required".to_string()));
        }
        if member_ids.is_empty() {
            return Err(StoreError::Validation(
                "At least one member is required".to_string(),
            ));
        }

        let new_team = NewTeam {
            name: name.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            created_by: current_user.id,
        };
        let team = match self.remote.insert_team(&new_team).await {
            Ok(team) => team,
            Err(e) => {
                self.record_error("error creating team", &e);
                return Err(e);
            }
        };

        let membership_result = self.remote.insert_team_members(&team.id, member_ids).await;
        if let Err(e) = &membership_result {
            // The orphaned team record is left for manual cleanup.
            self.record_error("error assigning team members", e);
        }
        self.fetch_teams().await;
        membership_result
    }
}
