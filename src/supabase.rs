// src/supabase.rs
//
// HTTP implementation of the remote store adapter against a Supabase-style
// backend: GoTrue auth endpoints plus PostgREST row storage.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error, warn};
use serde::Deserialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::error::StoreError;
use crate::models::{NewTask, NewTeam, Task, Team, TeamMember, User};
use crate::remote::{ChangeEvent, Collection, RemoteStore, SessionEvent, SessionUser};

#[derive(Debug, Clone)]
struct Session {
    access_token: String,
    user: SessionUser,
}

#[derive(Debug, Deserialize)]
struct AuthUserMetadata {
    full_name: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUser {
    id: String,
    email: String,
    user_metadata: Option<AuthUserMetadata>,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    access_token: Option<String>,
    user: Option<AuthUser>,
}

impl AuthUser {
    fn into_session_user(self) -> SessionUser {
        let metadata = self.user_metadata.unwrap_or(AuthUserMetadata {
            full_name: None,
            avatar_url: None,
        });
        SessionUser {
            id: self.id,
            email: self.email,
            name: metadata.full_name,
            avatar: metadata.avatar_url,
        }
    }
}

pub struct SupabaseStore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    session: RwLock<Option<Session>>,
    session_tx: broadcast::Sender<SessionEvent>,
    change_tx: broadcast::Sender<ChangeEvent>,
    fingerprints: Mutex<HashMap<Collection, u64>>,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let (session_tx, _) = broadcast::channel(16);
        let (change_tx, _) = broadcast::channel(16);
        SupabaseStore {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session: RwLock::new(None),
            session_tx,
            change_tx,
            fingerprints: Mutex::new(HashMap::new()),
        }
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn bearer_token(&self) -> String {
        self.session
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.access_token.clone()))
            .unwrap_or_else(|| self.api_key.clone())
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(self.bearer_token())
    }

    fn set_session(&self, session: Option<Session>) {
        if let Ok(mut guard) = self.session.write() {
            *guard = session;
        }
    }

    async fn fetch_rows<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Vec<T>, StoreError> {
        let resp = self.request(reqwest::Method::GET, url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!("{}: {}", status, body)));
        }
        Ok(resp.json().await?)
    }

    async fn insert_row<T, B>(&self, table: &str, body: &B) -> Result<T, StoreError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let resp = self
            .request(reqwest::Method::POST, &self.table_url(table))
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!("{}: {}", status, body)));
        }
        let mut rows: Vec<T> = resp.json().await?;
        if rows.is_empty() {
            return Err(StoreError::Rejected(format!(
                "insert into {} returned no representation",
                table
            )));
        }
        Ok(rows.remove(0))
    }

    /// Spawns the change-feed watcher: polls the record collections and
    /// emits a change event whenever a collection's payload fingerprint
    /// moves. The first observation of a collection only records the
    /// baseline.
    pub fn spawn_change_poller(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                for (collection, table) in [
                    (Collection::Tasks, "tasks"),
                    (Collection::Users, "users"),
                    (Collection::Teams, "teams"),
                ] {
                    if let Err(e) = store.poll_collection(collection, table).await {
                        warn!("change poll for {} failed: {}", table, e);
                    }
                }
            }
        })
    }

    async fn poll_collection(&self, collection: Collection, table: &str) -> Result<(), StoreError> {
        let url = format!("{}?select=*", self.table_url(table));
        let resp = self.request(reqwest::Method::GET, &url).send().await?;
        if !resp.status().is_success() {
            return Err(StoreError::Rejected(resp.status().to_string()));
        }
        let body = resp.text().await?;

        let mut hasher = DefaultHasher::new();
        body.hash(&mut hasher);
        let fingerprint = hasher.finish();

        let changed = {
            let mut guard = match self.fingerprints.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            match guard.insert(collection, fingerprint) {
                Some(previous) => previous != fingerprint,
                None => false,
            }
        };
        if changed {
            debug!("{} collection changed, notifying subscribers", table);
            let _ = self.change_tx.send(ChangeEvent { collection });
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for SupabaseStore {
    async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<(), StoreError> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "data": { "full_name": name },
        });
        let resp = self
            .request(reqwest::Method::POST, &self.auth_url("signup"))
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            if body.to_lowercase().contains("already registered") {
                return Err(StoreError::EmailTaken);
            }
            return Err(StoreError::Rejected(format!("{}: {}", status, body)));
        }

        // Supabase signs the new identity in immediately; mirror that by
        // recording the session and notifying listeners.
        let auth: AuthResponse = resp.json().await?;
        if let (Some(token), Some(user)) = (auth.access_token, auth.user) {
            let session_user = user.into_session_user();
            self.set_session(Some(Session {
                access_token: token,
                user: session_user.clone(),
            }));
            let _ = self.session_tx.send(SessionEvent::SignedIn(session_user));
        }
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<bool, StoreError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let url = format!("{}?grant_type=password", self.auth_url("token"));
        let resp = self
            .request(reqwest::Method::POST, &url)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::UNAUTHORIZED
        {
            debug!("sign-in rejected for {}", email);
            return Ok(false);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!("{}: {}", status, body)));
        }

        let auth: AuthResponse = resp.json().await?;
        match (auth.access_token, auth.user) {
            (Some(token), Some(user)) => {
                let session_user = user.into_session_user();
                self.set_session(Some(Session {
                    access_token: token,
                    user: session_user.clone(),
                }));
                let _ = self.session_tx.send(SessionEvent::SignedIn(session_user));
                Ok(true)
            }
            _ => Err(StoreError::Rejected(
                "auth response missing token or user".to_string(),
            )),
        }
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        let resp = self
            .request(reqwest::Method::POST, &self.auth_url("logout"))
            .send()
            .await;
        if let Err(e) = resp {
            // The local session is cleared regardless; a dead backend must
            // not leave the client stuck signed in.
            error!("remote sign-out failed: {}", e);
        }
        self.set_session(None);
        let _ = self.session_tx.send(SessionEvent::SignedOut);
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<SessionUser>, StoreError> {
        Ok(self
            .session
            .read()
            .ok()
            .and_then(|guard| guard.as_ref().map(|s| s.user.clone())))
    }

    fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let url = format!("{}?select=*", self.table_url("users"));
        let users: Vec<User> = self.fetch_rows(&url).await?;
        Ok(users.into_iter().map(User::refresh_initials).collect())
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        let url = format!("{}?id=eq.{}&select=*", self.table_url("users"), id);
        let mut users: Vec<User> = self.fetch_rows(&url).await?;
        if users.is_empty() {
            return Ok(None);
        }
        Ok(Some(users.remove(0).refresh_initials()))
    }

    async fn insert_user(&self, user: &User) -> Result<User, StoreError> {
        let row: User = self.insert_row("users", user).await?;
        Ok(row.refresh_initials())
    }

    async fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let url = format!("{}?select=*", self.table_url("tasks"));
        self.fetch_rows(&url).await
    }

    async fn insert_task(&self, task: &NewTask) -> Result<Task, StoreError> {
        self.insert_row("tasks", task).await
    }

    async fn update_task(&self, task: &Task) -> Result<Task, StoreError> {
        let url = format!("{}?id=eq.{}", self.table_url("tasks"), task.id);
        let resp = self
            .request(reqwest::Method::PATCH, &url)
            .header("Prefer", "return=representation")
            .json(task)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!("{}: {}", status, body)));
        }
        let mut rows: Vec<Task> = resp.json().await?;
        if rows.is_empty() {
            return Err(StoreError::Rejected(format!("task {} not found", task.id)));
        }
        Ok(rows.remove(0))
    }

    async fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let url = format!("{}?id=eq.{}", self.table_url("tasks"), id);
        let resp = self.request(reqwest::Method::DELETE, &url).send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!("{}: {}", status, body)));
        }
        Ok(())
    }

    async fn list_teams(&self) -> Result<Vec<Team>, StoreError> {
        let teams_url = format!("{}?select=*", self.table_url("teams"));
        let members_url = format!("{}?select=*", self.table_url("team_members"));
        let mut teams: Vec<Team> = self.fetch_rows(&teams_url).await?;
        let members: Vec<TeamMember> = self.fetch_rows(&members_url).await?;

        for team in &mut teams {
            team.member_ids = members
                .iter()
                .filter(|m| m.team_id == team.id)
                .map(|m| m.user_id.clone())
                .collect();
        }
        Ok(teams)
    }

    async fn insert_team(&self, team: &NewTeam) -> Result<Team, StoreError> {
        self.insert_row("teams", team).await
    }

    async fn insert_team_members(
        &self,
        team_id: &str,
        member_ids: &[String],
    ) -> Result<(), StoreError> {
        let rows: Vec<TeamMember> = member_ids
            .iter()
            .map(|user_id| TeamMember {
                team_id: team_id.to_string(),
                user_id: user_id.clone(),
            })
            .collect();
        let resp = self
            .request(reqwest::Method::POST, &self.table_url("team_members"))
            .json(&rows)
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!("{}: {}", status, body)));
        }
        Ok(())
    }

    fn change_events(&self) -> broadcast::Receiver<ChangeEvent> {
        self.change_tx.subscribe()
    }
}
