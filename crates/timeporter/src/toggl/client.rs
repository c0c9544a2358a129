//! Toggl API client creation and management.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cancel::CancelToken;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpTransport};
use crate::model::{EntityGroup, EntityRecord};
use crate::retry::with_retry;
use crate::service::{self, ApiRateLimiter, ServiceError, ToolName, TrackerClient};
use crate::sync::MAX_RATE_LIMIT_ATTEMPTS;
use crate::sync::progress::{ProgressCallback, SyncProgress, emit};

use super::convert::{
    to_client_record, to_group_record, to_project_record, to_tag_record, to_task_record,
    to_time_entry_record, to_track_time_entry_record, to_user_record, to_workspace_record,
};
use super::error::{TogglError, is_rate_limit_error};
use super::types::{
    NewClient, NewGroup, NewProject, NewTag, NewTask, NewTimeEntry, NewUser, NewWorkspace,
    TogglClientRecord, TogglGroup, TogglProject, TogglReportEnvelope, TogglTag, TogglTask,
    TogglTimeEntry, TogglUser, TogglWorkspace,
};

/// Toggl track API base URL.
const API_BASE: &str = "https://api.track.toggl.com/api/v9";

/// Toggl reports API base URL.
const REPORTS_BASE: &str = "https://api.track.toggl.com/reports/api/v2";

/// Per-request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Toggl API client.
///
/// Speaks both the track API (api/v9, workspace-scoped lists and creates)
/// and the reports API (api/v2, the paginated detailed report the time
/// entries come from).
#[derive(Clone)]
pub struct TogglClient {
    transport: Arc<dyn HttpTransport>,
    api_token: String,
    /// Identifies the caller to the reports API, as it requires.
    user_agent: String,
    rate_limiter: Option<ApiRateLimiter>,
    cancel: CancelToken,
}

impl TogglClient {
    /// Create a new Toggl client.
    ///
    /// # Arguments
    ///
    /// * `api_token` - Personal API token (Profile → API Token)
    /// * `email` - Account email, passed to the reports API as `user_agent`
    /// * `rate_limiter` - Optional limiter shared by every request this
    ///   client makes
    /// * `cancel` - Cancellation token checked before each request
    pub fn new(
        api_token: &str,
        email: &str,
        rate_limiter: Option<ApiRateLimiter>,
        cancel: CancelToken,
    ) -> Result<Self, TogglError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .map_err(|e| TogglError::Http(e.to_string()))?;

        Ok(Self::new_with_transport(
            api_token,
            email,
            rate_limiter,
            cancel,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        api_token: &str,
        email: &str,
        rate_limiter: Option<ApiRateLimiter>,
        cancel: CancelToken,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let user_agent = if email.trim().is_empty() {
            env!("CARGO_PKG_NAME").to_string()
        } else {
            email.trim().to_string()
        };
        Self {
            transport,
            api_token: api_token.to_string(),
            user_agent,
            rate_limiter,
            cancel,
        }
    }

    /// Wait for the rate limiter if one is configured.
    async fn wait_for_rate_limit(&self) {
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }
    }

    fn headers(&self) -> Vec<(String, String)> {
        // Toggl's token scheme is basic auth with the literal password
        // "api_token".
        let credentials = BASE64.encode(format!("{}:api_token", self.api_token));
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "User-Agent".to_string(),
                env!("CARGO_PKG_NAME").to_string(),
            ),
            ("Authorization".to_string(), format!("Basic {credentials}")),
        ]
    }

    /// Make an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, TogglError> {
        if self.cancel.is_cancelled() {
            return Err(TogglError::Cancelled);
        }
        self.wait_for_rate_limit().await;

        let request = HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: self.headers(),
            body: Vec::new(),
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| TogglError::Http(e.to_string()))?;

        match response.status {
            429 => Err(TogglError::RateLimited),
            s if (200..300).contains(&s) => {
                serde_json::from_slice(&response.body).map_err(TogglError::Json)
            }
            s => Err(TogglError::Api {
                status: s,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }),
        }
    }

    /// Make an authenticated POST request with a JSON body.
    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, TogglError> {
        if self.cancel.is_cancelled() {
            return Err(TogglError::Cancelled);
        }
        self.wait_for_rate_limit().await;

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: url.to_string(),
            headers: self.headers(),
            body: serde_json::to_vec(body)?,
        };

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| TogglError::Http(e.to_string()))?;

        match response.status {
            429 => Err(TogglError::RateLimited),
            s if (200..300).contains(&s) => {
                serde_json::from_slice(&response.body).map_err(TogglError::Json)
            }
            s => Err(TogglError::Api {
                status: s,
                message: String::from_utf8_lossy(&response.body).to_string(),
            }),
        }
    }

    /// GET with the shared rate-limit retry policy.
    async fn get_retry<T: DeserializeOwned>(
        &self,
        url: &str,
        label: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<T, TogglError> {
        let result = with_retry(
            || self.get(url),
            is_rate_limit_error,
            |e: &TogglError| e.to_string(),
            label,
            on_progress,
        )
        .await;

        match result {
            Err(e) if is_rate_limit_error(&e) => Err(TogglError::RateLimitExhausted {
                attempts: MAX_RATE_LIMIT_ATTEMPTS,
            }),
            other => other,
        }
    }

    /// POST with the shared rate-limit retry policy.
    async fn post_retry<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        label: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<T, TogglError> {
        let result = with_retry(
            || self.post(url, body),
            is_rate_limit_error,
            |e: &TogglError| e.to_string(),
            label,
            on_progress,
        )
        .await;

        match result {
            Err(e) if is_rate_limit_error(&e) => Err(TogglError::RateLimitExhausted {
                attempts: MAX_RATE_LIMIT_ATTEMPTS,
            }),
            other => other,
        }
    }

    // ---------- Fetching ----------

    async fn list_workspaces(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<EntityRecord>, TogglError> {
        emit(
            on_progress,
            SyncProgress::FetchingRecords {
                tool: ToolName::Toggl,
                group: EntityGroup::Workspaces,
                workspace_id: String::new(),
            },
        );

        let url = format!("{API_BASE}/me/workspaces");
        let workspaces: Vec<TogglWorkspace> = self
            .get_retry(&url, "toggl workspaces", on_progress)
            .await?;

        emit(
            on_progress,
            SyncProgress::FetchComplete {
                tool: ToolName::Toggl,
                group: EntityGroup::Workspaces,
                workspace_id: String::new(),
                total: workspaces.len(),
            },
        );

        Ok(workspaces.iter().map(to_workspace_record).collect())
    }

    /// Fetch one plain (unpaginated) workspace-scoped list.
    async fn list_group<T, F>(
        &self,
        group: EntityGroup,
        workspace_id: &str,
        path: &str,
        convert: F,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<EntityRecord>, TogglError>
    where
        T: DeserializeOwned,
        F: Fn(&T) -> EntityRecord,
    {
        emit(
            on_progress,
            SyncProgress::FetchingRecords {
                tool: ToolName::Toggl,
                group,
                workspace_id: workspace_id.to_string(),
            },
        );

        let url = format!("{API_BASE}/workspaces/{workspace_id}/{path}");
        let label = format!("toggl {group}");
        let items: Vec<T> = self.get_retry(&url, &label, on_progress).await?;

        emit(
            on_progress,
            SyncProgress::FetchComplete {
                tool: ToolName::Toggl,
                group,
                workspace_id: workspace_id.to_string(),
                total: items.len(),
            },
        );

        Ok(items.iter().map(convert).collect())
    }

    /// Fetch all time entries of a workspace from the detailed report.
    ///
    /// The report pages through an envelope: keep requesting pages while the
    /// accumulated count is below `total_count`.
    async fn list_time_entries(
        &self,
        workspace_id: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<EntityRecord>, TogglError> {
        let wid = parse_id(workspace_id)?;

        emit(
            on_progress,
            SyncProgress::FetchingRecords {
                tool: ToolName::Toggl,
                group: EntityGroup::TimeEntries,
                workspace_id: workspace_id.to_string(),
            },
        );

        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{REPORTS_BASE}/details?workspace_id={wid}&user_agent={}&page={page}",
                self.user_agent
            );
            let label = format!("toggl time-entries page {page}");
            let envelope: TogglReportEnvelope = self.get_retry(&url, &label, on_progress).await?;

            let count = envelope.data.len();
            for entry in &envelope.data {
                all.push(to_time_entry_record(entry, wid));
            }

            emit(
                on_progress,
                SyncProgress::FetchedPage {
                    tool: ToolName::Toggl,
                    group: EntityGroup::TimeEntries,
                    page,
                    count,
                    total_so_far: all.len(),
                },
            );

            // An empty page means the server disagrees with its own
            // total_count; stop rather than loop forever.
            if count == 0 || all.len() >= envelope.total_count {
                break;
            }
            page += 1;
        }

        emit(
            on_progress,
            SyncProgress::FetchComplete {
                tool: ToolName::Toggl,
                group: EntityGroup::TimeEntries,
                workspace_id: workspace_id.to_string(),
                total: all.len(),
            },
        );

        Ok(all)
    }

    // ---------- Creating ----------

    async fn create_in_workspace(
        &self,
        workspace_id: &str,
        record: &EntityRecord,
    ) -> Result<EntityRecord, TogglError> {
        let wid = parse_id(workspace_id)?;
        let label = format!("toggl create {}", record.group);

        match record.group {
            EntityGroup::Clients => {
                let url = format!("{API_BASE}/workspaces/{wid}/clients");
                let body = NewClient { name: &record.name };
                let created: TogglClientRecord =
                    self.post_retry(&url, &body, &label, None).await?;
                Ok(to_client_record(&created))
            }
            EntityGroup::Projects => {
                let url = format!("{API_BASE}/workspaces/{wid}/projects");
                let client_id = record
                    .client_id
                    .as_deref()
                    .map(parse_id)
                    .transpose()?;
                let body = NewProject {
                    name: &record.name,
                    client_id,
                    active: record.is_active,
                    billable: record.is_billable,
                };
                let created: TogglProject = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_project_record(&created))
            }
            EntityGroup::Tags => {
                let url = format!("{API_BASE}/workspaces/{wid}/tags");
                let body = NewTag { name: &record.name };
                let created: TogglTag = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_tag_record(&created))
            }
            EntityGroup::Tasks => {
                let project_id = record
                    .project_id
                    .as_deref()
                    .ok_or(TogglError::MissingField("project id"))?;
                let pid = parse_id(project_id)?;
                let url = format!("{API_BASE}/workspaces/{wid}/projects/{pid}/tasks");
                let body = NewTask {
                    name: &record.name,
                    active: record.is_active,
                };
                let created: TogglTask = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_task_record(&created))
            }
            EntityGroup::Users => {
                let email = record
                    .email
                    .as_deref()
                    .ok_or(TogglError::MissingField("email"))?;
                let url = format!("{API_BASE}/workspaces/{wid}/users");
                let body = NewUser {
                    email,
                    fullname: &record.name,
                };
                let created: TogglUser = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_user_record(&created, wid))
            }
            EntityGroup::UserGroups => {
                let url = format!("{API_BASE}/workspaces/{wid}/groups");
                let body = NewGroup { name: &record.name };
                let created: TogglGroup = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_group_record(&created, wid))
            }
            EntityGroup::TimeEntries => {
                let start = record.start.ok_or(TogglError::MissingField("start"))?;
                let url = format!("{API_BASE}/workspaces/{wid}/time_entries");
                let body = NewTimeEntry {
                    description: &record.name,
                    start,
                    stop: record.end,
                    billable: record.is_billable,
                    project_id: record.project_id.as_deref().map(parse_id).transpose()?,
                    task_id: record.task_id.as_deref().map(parse_id).transpose()?,
                    tag_ids: record
                        .tag_ids
                        .iter()
                        .map(|id| parse_id(id))
                        .collect::<Result<Vec<_>, _>>()?,
                    created_with: env!("CARGO_PKG_NAME"),
                };
                let created: TogglTimeEntry = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_track_time_entry_record(&created))
            }
            EntityGroup::Workspaces => {
                // Routed through create_workspace; reaching this arm is a
                // coordinator bug.
                Err(TogglError::MissingField("workspace id"))
            }
        }
    }
}

fn parse_id(id: &str) -> Result<i64, TogglError> {
    id.parse()
        .map_err(|_| TogglError::InvalidId(id.to_string()))
}

#[async_trait]
impl TrackerClient for TogglClient {
    fn tool(&self) -> ToolName {
        ToolName::Toggl
    }

    async fn fetch_workspaces(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> service::Result<Vec<EntityRecord>> {
        self.list_workspaces(on_progress)
            .await
            .map_err(ServiceError::from)
    }

    async fn fetch(
        &self,
        group: EntityGroup,
        workspace_id: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> service::Result<Vec<EntityRecord>> {
        let result = match group {
            EntityGroup::Workspaces => self.list_workspaces(on_progress).await,
            EntityGroup::Clients => {
                self.list_group(group, workspace_id, "clients", to_client_record, on_progress)
                    .await
            }
            EntityGroup::Projects => {
                self.list_group(group, workspace_id, "projects", to_project_record, on_progress)
                    .await
            }
            EntityGroup::Tags => {
                self.list_group(group, workspace_id, "tags", to_tag_record, on_progress)
                    .await
            }
            EntityGroup::Tasks => {
                self.list_group(group, workspace_id, "tasks", to_task_record, on_progress)
                    .await
            }
            EntityGroup::Users => match parse_id(workspace_id) {
                Ok(wid) => {
                    self.list_group(
                        group,
                        workspace_id,
                        "users",
                        |user: &TogglUser| to_user_record(user, wid),
                        on_progress,
                    )
                    .await
                }
                Err(e) => Err(e),
            },
            EntityGroup::UserGroups => match parse_id(workspace_id) {
                Ok(wid) => {
                    self.list_group(
                        group,
                        workspace_id,
                        "groups",
                        |g: &TogglGroup| to_group_record(g, wid),
                        on_progress,
                    )
                    .await
                }
                Err(e) => Err(e),
            },
            EntityGroup::TimeEntries => self.list_time_entries(workspace_id, on_progress).await,
        };
        result.map_err(ServiceError::from)
    }

    async fn create_workspace(&self, record: &EntityRecord) -> service::Result<EntityRecord> {
        let url = format!("{API_BASE}/workspaces");
        let body = NewWorkspace { name: &record.name };
        let created: TogglWorkspace = self
            .post_retry(&url, &body, "toggl create workspace", None)
            .await
            .map_err(ServiceError::from)?;
        Ok(to_workspace_record(&created))
    }

    async fn create(
        &self,
        workspace_id: &str,
        record: &EntityRecord,
    ) -> service::Result<EntityRecord> {
        self.create_in_workspace(workspace_id, record)
            .await
            .map_err(ServiceError::from)
    }
}
