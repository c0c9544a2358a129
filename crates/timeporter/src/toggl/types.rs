//! Toggl API data types.
//!
//! These structs deserialize Toggl track (api/v9) and reports (api/v2)
//! responses. Only the fields the engine needs are declared, which keeps the
//! code resilient to API additions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Toggl workspace.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglWorkspace {
    /// Workspace id.
    pub id: i64,
    /// Workspace name.
    pub name: String,
}

/// A Toggl client (a customer, not an API client).
#[derive(Debug, Clone, Deserialize)]
pub struct TogglClientRecord {
    /// Client id.
    pub id: i64,
    /// Owning workspace id.
    pub wid: i64,
    /// Client name.
    pub name: String,
    /// Whether the client is archived.
    #[serde(default)]
    pub archived: bool,
}

/// A Toggl project.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglProject {
    /// Project id.
    pub id: i64,
    /// Owning workspace id.
    pub workspace_id: i64,
    /// Owning client id, if any.
    pub client_id: Option<i64>,
    /// Project name.
    pub name: String,
    /// Whether the project is active (not archived).
    #[serde(default = "default_true")]
    pub active: bool,
    /// Whether the project is billable by default.
    #[serde(default)]
    pub billable: bool,
}

/// A Toggl tag.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglTag {
    /// Tag id.
    pub id: i64,
    /// Owning workspace id.
    pub workspace_id: i64,
    /// Tag name.
    pub name: String,
}

/// A Toggl task.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglTask {
    /// Task id.
    pub id: i64,
    /// Owning workspace id.
    pub workspace_id: i64,
    /// Owning project id.
    pub project_id: i64,
    /// Task name.
    pub name: String,
    /// Whether the task is active.
    #[serde(default = "default_true")]
    pub active: bool,
}

/// A Toggl workspace user.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglUser {
    /// User id.
    pub id: i64,
    /// Display name.
    pub fullname: String,
    /// Email address.
    pub email: String,
    /// Whether the user has deactivated their membership.
    #[serde(default)]
    pub inactive: bool,
}

/// A Toggl user group.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglGroup {
    /// Group id.
    pub id: i64,
    /// Group name.
    pub name: String,
}

/// Envelope of the paginated detailed report endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglReportEnvelope {
    /// Total number of entries matching the report query.
    pub total_count: usize,
    /// Page size the server used.
    pub per_page: usize,
    /// Entries on this page.
    pub data: Vec<TogglReportEntry>,
}

/// One time entry from the detailed report.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglReportEntry {
    /// Entry id.
    pub id: i64,
    /// Entry description (may be empty).
    #[serde(default)]
    pub description: String,
    /// Start timestamp.
    pub start: DateTime<Utc>,
    /// End timestamp; absent while the timer is running.
    pub end: Option<DateTime<Utc>>,
    /// Project id.
    pub pid: Option<i64>,
    /// Task id.
    pub tid: Option<i64>,
    /// User id.
    pub uid: Option<i64>,
    /// Whether the entry is billable.
    #[serde(default)]
    pub billable: bool,
    /// Attached tag ids.
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

/// A time entry from the track API (create responses).
///
/// The reports API names its foreign keys `pid`/`tid`/`uid`; the track API
/// spells them out. Both shapes exist in the wild, so both get a type.
#[derive(Debug, Clone, Deserialize)]
pub struct TogglTimeEntry {
    /// Entry id.
    pub id: i64,
    /// Owning workspace id.
    pub workspace_id: i64,
    /// Entry description (may be empty).
    #[serde(default)]
    pub description: String,
    /// Start timestamp.
    pub start: DateTime<Utc>,
    /// End timestamp; absent while the timer is running.
    pub stop: Option<DateTime<Utc>>,
    /// Project id.
    pub project_id: Option<i64>,
    /// Task id.
    pub task_id: Option<i64>,
    /// Owning user id.
    pub user_id: Option<i64>,
    /// Whether the entry is billable.
    #[serde(default)]
    pub billable: bool,
    /// Attached tag ids.
    #[serde(default)]
    pub tag_ids: Vec<i64>,
}

fn default_true() -> bool {
    true
}

// ---------- Create request bodies ----------

/// Body for creating a workspace.
#[derive(Debug, Serialize)]
pub struct NewWorkspace<'a> {
    pub name: &'a str,
}

/// Body for creating a client.
#[derive(Debug, Serialize)]
pub struct NewClient<'a> {
    pub name: &'a str,
}

/// Body for creating a project.
#[derive(Debug, Serialize)]
pub struct NewProject<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    pub active: bool,
    pub billable: bool,
}

/// Body for creating a tag.
#[derive(Debug, Serialize)]
pub struct NewTag<'a> {
    pub name: &'a str,
}

/// Body for creating a task.
#[derive(Debug, Serialize)]
pub struct NewTask<'a> {
    pub name: &'a str,
    pub active: bool,
}

/// Body for inviting a workspace user.
#[derive(Debug, Serialize)]
pub struct NewUser<'a> {
    pub email: &'a str,
    pub fullname: &'a str,
}

/// Body for creating a user group.
#[derive(Debug, Serialize)]
pub struct NewGroup<'a> {
    pub name: &'a str,
}

/// Body for creating a time entry.
#[derive(Debug, Serialize)]
pub struct NewTimeEntry<'a> {
    pub description: &'a str,
    pub start: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<DateTime<Utc>>,
    pub billable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<i64>,
    pub created_with: &'a str,
}
