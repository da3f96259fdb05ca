use serde::{Deserialize, Serialize};

/// A team record. Teams are created with at least one member; there is no
/// update or delete path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
    /// Member user ids, resolved from the membership join collection.
    /// Set semantics; ordering is irrelevant.
    #[serde(default)]
    pub member_ids: Vec<String>,
}

/// Creation payload for a team record (membership rows are inserted
/// separately against the join collection).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
    pub name: String,
    pub description: Option<String>,
    pub created_by: String,
}

/// One row of the `team_members` join collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub team_id: String,
    pub user_id: String,
}
