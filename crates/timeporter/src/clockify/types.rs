//! Clockify API data types.
//!
//! Clockify speaks camelCase JSON; only the fields the engine needs are
//! declared here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Clockify workspace.
#[derive(Debug, Clone, Deserialize)]
pub struct CwWorkspace {
    /// Workspace id (hex string).
    pub id: String,
    /// Workspace name.
    pub name: String,
}

/// A Clockify client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwClient {
    /// Client id.
    pub id: String,
    /// Client name.
    pub name: String,
    /// Owning workspace id.
    pub workspace_id: String,
    /// Whether the client is archived.
    #[serde(default)]
    pub archived: bool,
}

/// A Clockify project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwProject {
    /// Project id.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Owning workspace id.
    pub workspace_id: String,
    /// Owning client id; the API sends an empty string for "no client".
    #[serde(default)]
    pub client_id: Option<String>,
    /// Whether the project is archived.
    #[serde(default)]
    pub archived: bool,
    /// Whether the project is billable by default.
    #[serde(default)]
    pub billable: bool,
}

/// A Clockify tag.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwTag {
    /// Tag id.
    pub id: String,
    /// Tag name.
    pub name: String,
    /// Owning workspace id.
    pub workspace_id: String,
}

/// A Clockify task (always project-scoped).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwTask {
    /// Task id.
    pub id: String,
    /// Task name.
    pub name: String,
    /// Owning project id.
    pub project_id: String,
    /// Task status, `ACTIVE` or `DONE`.
    #[serde(default)]
    pub status: Option<String>,
}

/// A Clockify workspace member.
#[derive(Debug, Clone, Deserialize)]
pub struct CwUser {
    /// User id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Membership status, e.g. `ACTIVE`.
    #[serde(default)]
    pub status: Option<String>,
}

/// A Clockify user group.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwUserGroup {
    /// Group id.
    pub id: String,
    /// Group name.
    pub name: String,
    /// Member user ids.
    #[serde(default)]
    pub user_ids: Vec<String>,
}

/// Start/end pair of a time entry.
#[derive(Debug, Clone, Deserialize)]
pub struct CwTimeInterval {
    /// Start timestamp.
    pub start: DateTime<Utc>,
    /// End timestamp; absent while the timer is running.
    pub end: Option<DateTime<Utc>>,
}

/// A Clockify time entry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwTimeEntry {
    /// Entry id.
    pub id: String,
    /// Entry description (may be empty).
    #[serde(default)]
    pub description: String,
    /// Owning user id.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Project id.
    #[serde(default)]
    pub project_id: Option<String>,
    /// Task id.
    #[serde(default)]
    pub task_id: Option<String>,
    /// Attached tag ids.
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// Whether the entry is billable.
    #[serde(default)]
    pub billable: bool,
    /// Start/end timestamps.
    pub time_interval: CwTimeInterval,
}

// ---------- Create request bodies ----------

/// Body for creating a workspace.
#[derive(Debug, Serialize)]
pub struct CwNewWorkspace<'a> {
    pub name: &'a str,
}

/// Body for creating a client.
#[derive(Debug, Serialize)]
pub struct CwNewClient<'a> {
    pub name: &'a str,
}

/// Body for creating a project.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CwNewProject<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<&'a str>,
    pub is_public: bool,
    pub billable: bool,
}

/// Body for creating a tag.
#[derive(Debug, Serialize)]
pub struct CwNewTag<'a> {
    pub name: &'a str,
}

/// Body for creating a task.
#[derive(Debug, Serialize)]
pub struct CwNewTask<'a> {
    pub name: &'a str,
}

/// Body for inviting a workspace member.
#[derive(Debug, Serialize)]
pub struct CwNewUser<'a> {
    pub email: &'a str,
}

/// Body for creating a user group.
#[derive(Debug, Serialize)]
pub struct CwNewUserGroup<'a> {
    pub name: &'a str,
}

/// Body for creating a time entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CwNewTimeEntry<'a> {
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
    pub description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<&'a str>,
    pub billable: bool,
}
