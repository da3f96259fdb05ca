use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Task status, in 1:1 correspondence with the three board lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
}

impl Status {
    pub const ALL: [Status; 3] = [Status::ToDo, Status::InProgress, Status::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::ToDo => "To Do",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }
}

impl TryFrom<&str> for Status {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "to do" | "todo" => Ok(Status::ToDo),
            "in progress" => Ok(Status::InProgress),
            "done" => Ok(Status::Done),
            other => Err(StoreError::Validation(format!("unknown status: {}", other))),
        }
    }
}

/// Task priority. Ordered so that `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = StoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(StoreError::Validation(format!("unknown priority: {}", other))),
        }
    }
}

/// A task record. The authoritative copy lives in the backend; the client
/// holds a cached, eventually-consistent copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub assignee_id: String,
    pub due_date: Option<DateTime<Utc>>,
}

/// Creation payload: everything except the backend-assigned id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: Status,
    pub priority: Priority,
    pub assignee_id: String,
    pub due_date: Option<DateTime<Utc>>,
}

impl NewTask {
    /// Form-layer validation, run before any remote call is attempted.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() {
            return Err(StoreError::Validation("Title is required".to_string()));
        }
        if self.assignee_id.trim().is_empty() {
            return Err(StoreError::Validation("Assignee is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_wire_spelling_round_trips() {
        let json = serde_json::to_string(&Status::InProgress).unwrap();
        assert_eq!(json, "\"In Progress\"");
        let back: Status = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Status::InProgress);
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!(Status::try_from("to do").unwrap(), Status::ToDo);
        assert_eq!(Status::try_from(" DONE ").unwrap(), Status::Done);
        assert!(Status::try_from("archived").is_err());
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Medium);
        assert!(Priority::Medium < Priority::High);
    }

    #[test]
    fn new_task_requires_title_and_assignee() {
        let base = NewTask {
            title: "  ".to_string(),
            description: String::new(),
            status: Status::ToDo,
            priority: Priority::Medium,
            assignee_id: "1".to_string(),
            due_date: None,
        };
        assert!(base.validate().is_err());

        let no_assignee = NewTask {
            title: "Write spec".to_string(),
            assignee_id: String::new(),
            ..base.clone()
        };
        assert!(no_assignee.validate().is_err());

        let ok = NewTask {
            title: "Write spec".to_string(),
            assignee_id: "2".to_string(),
            ..base
        };
        assert!(ok.validate().is_ok());
    }
}
