// src/remote.rs
//
// The remote store adapter boundary: the only component permitted to talk
// to the backend. Everything else goes through this trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::models::{NewTask, NewTeam, Task, Team, User};

/// The authenticated identity as reported by the auth collaborator, before
/// the matching profile row has been loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    /// Display name from signup metadata, when the backend recorded one.
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Emitted by the auth collaborator whenever sign-in, sign-out or a token
/// refresh occurs.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(SessionUser),
    SignedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Tasks,
    Teams,
}

/// A change notification for one collection. Carries no row data: the
/// store responds with an unconditional full re-fetch.
#[derive(Debug, Clone, Copy)]
pub struct ChangeEvent {
    pub collection: Collection,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    // ── auth ──────────────────────────────────────────────────────────────

    /// Creates a remote identity. The profile row is backfilled by the
    /// store on the first session event when the backend did not create it.
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), StoreError>;

    /// Returns `Ok(false)` on invalid credentials; configuration and
    /// transport failures are errors.
    async fn sign_in(&self, email: &str, password: &str) -> Result<bool, StoreError>;

    async fn sign_out(&self) -> Result<(), StoreError>;

    async fn current_session(&self) -> Result<Option<SessionUser>, StoreError>;

    fn session_events(&self) -> broadcast::Receiver<SessionEvent>;

    // ── record storage ────────────────────────────────────────────────────

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn insert_user(&self, user: &User) -> Result<User, StoreError>;

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError>;

    /// Inserts a task and returns the backend-assigned record.
    async fn insert_task(&self, task: &NewTask) -> Result<Task, StoreError>;

    /// Full-record update keyed by id. Unconditional overwrite: the last
    /// write wins.
    async fn update_task(&self, task: &Task) -> Result<Task, StoreError>;

    async fn delete_task(&self, id: &str) -> Result<(), StoreError>;

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError>;

    async fn insert_team(&self, team: &NewTeam) -> Result<Team, StoreError>;

    async fn insert_team_members(
        &self,
        team_id: &str,
        member_ids: &[String],
    ) -> Result<(), StoreError>;

    // ── change feed ───────────────────────────────────────────────────────

    fn change_events(&self) -> broadcast::Receiver<ChangeEvent>;
}
