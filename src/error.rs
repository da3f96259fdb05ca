use thiserror::Error;

/// Errors surfaced by the store, the remote adapter and the AI client.
///
/// Nothing here is fatal to the process: every failure is reported to the
/// caller and leaves the cache in a usable (if possibly stale) state.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A required form field was missing or malformed. Raised before any
    /// remote call is attempted.
    #[error("{0}")]
    Validation(String),

    /// Signup was rejected because the email is already registered.
    #[error("email is already registered")]
    EmailTaken,

    /// An operation that requires an authenticated user was called without
    /// one.
    #[error("no user is signed in")]
    NotSignedIn,

    /// The backend accepted the connection but rejected the request.
    #[error("backend rejected the request: {0}")]
    Rejected(String),

    /// Transport-level failure talking to the backend.
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The AI suggestion service failed or returned something unusable.
    #[error("AI service error: {0}")]
    Ai(String),
}

impl StoreError {
    /// True for the auth failures a caller should present as "try again"
    /// rather than as a configuration problem.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, StoreError::EmailTaken | StoreError::NotSignedIn)
    }
}
