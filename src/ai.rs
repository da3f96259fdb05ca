// src/ai.rs
//
// Client for the AI priority-suggestion service: a stateless text-in /
// text-out request consumed by the task-creation form. No retries; a
// failure is surfaced to the caller as a notification only.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::StoreError;
use crate::models::Priority;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionRequest<'a> {
    task_description: &'a str,
    recent_activity: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuggestionResponse {
    priority_suggestion: String,
    reasoning: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrioritySuggestion {
    pub priority: Priority,
    pub reasoning: String,
}

pub struct PriorityClient {
    http: reqwest::Client,
    endpoint: String,
}

impl PriorityClient {
    pub fn new(config: &Config) -> Self {
        PriorityClient {
            http: reqwest::Client::new(),
            endpoint: config.ai_endpoint().trim_end_matches('/').to_string(),
        }
    }

    /// Asks the service for a priority label and a short rationale, given
    /// the task description and a recent-activity summary.
    pub async fn suggest(
        &self,
        task_description: &str,
        recent_activity: &str,
    ) -> Result<PrioritySuggestion, StoreError> {
        let url = format!("{}/suggest-priority", self.endpoint);
        let resp = self
            .http
            .post(&url)
            .json(&SuggestionRequest {
                task_description,
                recent_activity,
            })
            .send()
            .await
            .map_err(|e| StoreError::Ai(format!("service unreachable: {}", e)))?;

        if !resp.status().is_success() {
            return Err(StoreError::Ai(format!("service error: {}", resp.status())));
        }

        let body: SuggestionResponse = resp
            .json()
            .await
            .map_err(|e| StoreError::Ai(format!("response parse error: {}", e)))?;
        debug!("priority suggestion: {}", body.priority_suggestion);

        let priority = Priority::try_from(body.priority_suggestion.as_str())
            .map_err(|_| StoreError::Ai(format!("unusable label: {}", body.priority_suggestion)))?;
        Ok(PrioritySuggestion {
            priority,
            reasoning: body.reasoning,
        })
    }
}
