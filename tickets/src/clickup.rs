//! # ClickUp
//!
//! Typed access to the ClickUp v2 task API, the system of record for all
//! ticket state.
//!
//! ## Schema
//! - One list holds every web-form ticket
//! - Task fields we touch: name (**string**), description (**string**),
//!   priority (**1-4**), status (**string**), tags (**list**)
//! - `priority` and `assignees` are frequently absent on real tasks, so
//!   they decode as explicit absent states instead of failing
//!
//! ## Commands
//!
//! List the raw tasks.
//! ```sh
//! curl -H "Authorization: $CLICKUP_API_TOKEN" \
//!   "https://api.clickup.com/api/v2/list/$CLICKUP_LIST_ID/task?include_closed=false"
//! ```

use reqwest::{Client, header::AUTHORIZATION};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const BASE_URL: &str = "https://api.clickup.com/api/v2";

#[derive(Error, Debug)]
pub enum ClickUpError {
    #[error("ClickUp API Error: {status} - {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Status object on a ClickUp task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: String,
}

/// Priority object on a ClickUp task. `id` is the numeric rank as a
/// string, `priority` the english label ("urgent", "high", ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPriority {
    #[serde(default)]
    pub id: Option<String>,
    pub priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignee {
    pub username: String,
}

/// A task as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub assignees: Vec<Assignee>,
    /// Epoch millis, as a string, the way ClickUp ships it.
    #[serde(default)]
    pub date_created: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TasksResponse {
    tasks: Vec<Task>,
}

/// Payload for task creation.
#[derive(Debug, Clone, Serialize)]
pub struct CreateTask {
    pub name: String,
    pub description: String,
    pub priority: u8,
    pub status: String,
    pub tags: Vec<String>,
}

/// Minimal shape of a freshly created task.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedTask {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    pub name: String,
}

/// Bearer-authenticated handle on one ClickUp list.
#[derive(Debug, Clone)]
pub struct Api {
    http: Client,
    base_url: String,
    token: String,
    list_id: String,
}

impl Api {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, list_id: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token: token.into(),
            list_id: list_id.into(),
        }
    }

    /// Open tasks on the list, closed ones excluded.
    pub async fn list_tasks(&self) -> Result<Vec<Task>, ClickUpError> {
        let url = format!(
            "{}/list/{}/task?include_closed=false",
            self.base_url, self.list_id
        );
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.token.as_str())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClickUpError::Api { status, body });
        }

        let parsed: TasksResponse = response.json().await?;
        debug!("fetched {} tasks", parsed.tasks.len());

        Ok(parsed.tasks)
    }

    pub async fn create_task(&self, task: &CreateTask) -> Result<CreatedTask, ClickUpError> {
        let url = format!("{}/list/{}/task", self.base_url, self.list_id);
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.token.as_str())
            .json(task)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ClickUpError::Api { status, body });
        }

        let created: CreatedTask = response.json().await?;
        debug!("created task {}", created.id);

        Ok(created)
    }
}
