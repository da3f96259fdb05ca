use serde::{Deserialize, Serialize};

/// A user profile as stored in the `users` collection. Read-only from the
/// client apart from the one-time backfill at first sign-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    /// Derived from `name`, never persisted. Recomputed whenever a record
    /// enters the cache so it cannot drift from the name.
    #[serde(skip)]
    pub initials: String,
}

impl User {
    /// Single derivation point for initials: first letter of every
    /// whitespace-separated name part, uppercased.
    pub fn derive_initials(name: &str) -> String {
        name.split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(|c| c.to_uppercase())
            .collect()
    }

    pub fn refresh_initials(mut self) -> Self {
        self.initials = Self::derive_initials(&self.name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_from_full_name() {
        assert_eq!(User::derive_initials("Alice Johnson"), "AJ");
        assert_eq!(User::derive_initials("bob"), "B");
        assert_eq!(User::derive_initials("  Charlie  Brown "), "CB");
        assert_eq!(User::derive_initials(""), "");
    }

    #[test]
    fn refresh_initials_tracks_name() {
        let user = User {
            id: "1".to_string(),
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            avatar: String::new(),
            initials: String::new(),
        };
        assert_eq!(user.refresh_initials().initials, "AJ");
    }
}
