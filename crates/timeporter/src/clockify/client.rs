//! Clockify API client creation and management.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
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
    to_client_record, to_project_record, to_tag_record, to_task_record, to_time_entry_record,
    to_user_group_record, to_user_record, to_workspace_record,
};
use super::error::{ClockifyError, is_rate_limit_error};
use super::types::{
    CwClient, CwNewClient, CwNewProject, CwNewTag, CwNewTask, CwNewTimeEntry, CwNewUser,
    CwNewUserGroup, CwNewWorkspace, CwProject, CwTag, CwTask, CwTimeEntry, CwUser, CwUserGroup,
    CwWorkspace,
};

/// Clockify API base URL.
const API_BASE: &str = "https://api.clockify.me/api/v1";

/// Page size for paginated list endpoints.
///
/// A short page (fewer than this many records) terminates pagination.
const PAGE_SIZE: u32 = 100;

/// Per-request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Clockify API client.
///
/// All list endpoints page with `page`/`page-size` query parameters; a full
/// page means there may be more, a short page ends the walk.
#[derive(Clone)]
pub struct ClockifyClient {
    transport: Arc<dyn HttpTransport>,
    api_key: String,
    /// Id of the authenticated user; time entries are listed per-user.
    user_id: String,
    rate_limiter: Option<ApiRateLimiter>,
    cancel: CancelToken,
}

impl ClockifyClient {
    /// Create a new Clockify client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - API key (Profile → API → Generate)
    /// * `user_id` - Id of the authenticated user
    /// * `rate_limiter` - Optional limiter shared by every request this
    ///   client makes
    /// * `cancel` - Cancellation token checked before each request
    pub fn new(
        api_key: &str,
        user_id: &str,
        rate_limiter: Option<ApiRateLimiter>,
        cancel: CancelToken,
    ) -> Result<Self, ClockifyError> {
        let transport = ReqwestTransport::with_timeout(StdDuration::from_secs(REQUEST_TIMEOUT_SECS))
            .map_err(|e| ClockifyError::Http(e.to_string()))?;

        Ok(Self::new_with_transport(
            api_key,
            user_id,
            rate_limiter,
            cancel,
            Arc::new(transport),
        ))
    }

    pub fn new_with_transport(
        api_key: &str,
        user_id: &str,
        rate_limiter: Option<ApiRateLimiter>,
        cancel: CancelToken,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            api_key: api_key.to_string(),
            user_id: user_id.to_string(),
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
        vec![
            ("Content-Type".to_string(), "application/json".to_string()),
            (
                "User-Agent".to_string(),
                env!("CARGO_PKG_NAME").to_string(),
            ),
            ("X-Api-Key".to_string(), self.api_key.clone()),
        ]
    }

    /// Make an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClockifyError> {
        if self.cancel.is_cancelled() {
            return Err(ClockifyError::Cancelled);
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
            .map_err(|e| ClockifyError::Http(e.to_string()))?;

        match response.status {
            429 => Err(ClockifyError::RateLimited),
            s if (200..300).contains(&s) => {
                serde_json::from_slice(&response.body).map_err(ClockifyError::Json)
            }
            s => Err(ClockifyError::Api {
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
    ) -> Result<T, ClockifyError> {
        if self.cancel.is_cancelled() {
            return Err(ClockifyError::Cancelled);
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
            .map_err(|e| ClockifyError::Http(e.to_string()))?;

        match response.status {
            429 => Err(ClockifyError::RateLimited),
            s if (200..300).contains(&s) => {
                serde_json::from_slice(&response.body).map_err(ClockifyError::Json)
            }
            s => Err(ClockifyError::Api {
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
    ) -> Result<T, ClockifyError> {
        let result = with_retry(
            || self.get(url),
            is_rate_limit_error,
            |e: &ClockifyError| e.to_string(),
            label,
            on_progress,
        )
        .await;

        match result {
            Err(e) if is_rate_limit_error(&e) => Err(ClockifyError::RateLimitExhausted {
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
    ) -> Result<T, ClockifyError> {
        let result = with_retry(
            || self.post(url, body),
            is_rate_limit_error,
            |e: &ClockifyError| e.to_string(),
            label,
            on_progress,
        )
        .await;

        match result {
            Err(e) if is_rate_limit_error(&e) => Err(ClockifyError::RateLimitExhausted {
                attempts: MAX_RATE_LIMIT_ATTEMPTS,
            }),
            other => other,
        }
    }

    // ---------- Fetching ----------

    /// Walk every page of a list endpoint.
    ///
    /// Issues `base_path?page=N&page-size=PAGE_SIZE` starting at page 1 and
    /// stops as soon as a page comes back short.
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        group: EntityGroup,
        base_path: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<T>, ClockifyError> {
        let mut all = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!("{base_path}?page={page}&page-size={PAGE_SIZE}");
            let label = format!("clockify {group} page {page}");
            let items: Vec<T> = self.get_retry(&url, &label, on_progress).await?;

            let count = items.len();
            all.extend(items);

            emit(
                on_progress,
                SyncProgress::FetchedPage {
                    tool: ToolName::Clockify,
                    group,
                    page,
                    count,
                    total_so_far: all.len(),
                },
            );

            if count < PAGE_SIZE as usize {
                break;
            }
            page += 1;
        }

        Ok(all)
    }

    async fn list_workspaces(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<EntityRecord>, ClockifyError> {
        emit(
            on_progress,
            SyncProgress::FetchingRecords {
                tool: ToolName::Clockify,
                group: EntityGroup::Workspaces,
                workspace_id: String::new(),
            },
        );

        let url = format!("{API_BASE}/workspaces");
        let workspaces: Vec<CwWorkspace> = self
            .get_retry(&url, "clockify workspaces", on_progress)
            .await?;

        emit(
            on_progress,
            SyncProgress::FetchComplete {
                tool: ToolName::Clockify,
                group: EntityGroup::Workspaces,
                workspace_id: String::new(),
                total: workspaces.len(),
            },
        );

        Ok(workspaces.iter().map(to_workspace_record).collect())
    }

    async fn list_records(
        &self,
        group: EntityGroup,
        workspace_id: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<EntityRecord>, ClockifyError> {
        emit(
            on_progress,
            SyncProgress::FetchingRecords {
                tool: ToolName::Clockify,
                group,
                workspace_id: workspace_id.to_string(),
            },
        );

        let records = match group {
            EntityGroup::Clients => {
                let path = format!("{API_BASE}/workspaces/{workspace_id}/clients");
                let items: Vec<CwClient> = self.get_all_pages(group, &path, on_progress).await?;
                items.iter().map(to_client_record).collect()
            }
            EntityGroup::Projects => {
                let path = format!("{API_BASE}/workspaces/{workspace_id}/projects");
                let items: Vec<CwProject> = self.get_all_pages(group, &path, on_progress).await?;
                items.iter().map(to_project_record).collect()
            }
            EntityGroup::Tags => {
                let path = format!("{API_BASE}/workspaces/{workspace_id}/tags");
                let items: Vec<CwTag> = self.get_all_pages(group, &path, on_progress).await?;
                items.iter().map(to_tag_record).collect()
            }
            EntityGroup::Tasks => {
                // Tasks only exist per project; list projects first, then
                // walk each project's tasks.
                let projects_path = format!("{API_BASE}/workspaces/{workspace_id}/projects");
                let projects: Vec<CwProject> = self
                    .get_all_pages(EntityGroup::Projects, &projects_path, None)
                    .await?;

                let mut all = Vec::new();
                for project in &projects {
                    let path = format!(
                        "{API_BASE}/workspaces/{workspace_id}/projects/{}/tasks",
                        project.id
                    );
                    let tasks: Vec<CwTask> = self.get_all_pages(group, &path, on_progress).await?;
                    all.extend(tasks.iter().map(|t| to_task_record(t, workspace_id)));
                }
                all
            }
            EntityGroup::Users => {
                let path = format!("{API_BASE}/workspaces/{workspace_id}/users");
                let items: Vec<CwUser> = self.get_all_pages(group, &path, on_progress).await?;
                items
                    .iter()
                    .map(|u| to_user_record(u, workspace_id))
                    .collect()
            }
            EntityGroup::UserGroups => {
                let path = format!("{API_BASE}/workspaces/{workspace_id}/user-groups");
                let items: Vec<CwUserGroup> =
                    self.get_all_pages(group, &path, on_progress).await?;
                items
                    .iter()
                    .map(|g| to_user_group_record(g, workspace_id))
                    .collect()
            }
            EntityGroup::TimeEntries => {
                let path = format!(
                    "{API_BASE}/workspaces/{workspace_id}/user/{}/time-entries",
                    self.user_id
                );
                let items: Vec<CwTimeEntry> =
                    self.get_all_pages(group, &path, on_progress).await?;
                items
                    .iter()
                    .map(|e| to_time_entry_record(e, workspace_id))
                    .collect()
            }
            EntityGroup::Workspaces => return self.list_workspaces(on_progress).await,
        };

        emit(
            on_progress,
            SyncProgress::FetchComplete {
                tool: ToolName::Clockify,
                group,
                workspace_id: workspace_id.to_string(),
                total: records.len(),
            },
        );

        Ok(records)
    }

    // ---------- Creating ----------

    async fn create_in_workspace(
        &self,
        workspace_id: &str,
        record: &EntityRecord,
    ) -> Result<EntityRecord, ClockifyError> {
        let label = format!("clockify create {}", record.group);

        match record.group {
            EntityGroup::Clients => {
                let url = format!("{API_BASE}/workspaces/{workspace_id}/clients");
                let body = CwNewClient { name: &record.name };
                let created: CwClient = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_client_record(&created))
            }
            EntityGroup::Projects => {
                let url = format!("{API_BASE}/workspaces/{workspace_id}/projects");
                let body = CwNewProject {
                    name: &record.name,
                    client_id: record.client_id.as_deref(),
                    is_public: true,
                    billable: record.is_billable,
                };
                let created: CwProject = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_project_record(&created))
            }
            EntityGroup::Tags => {
                let url = format!("{API_BASE}/workspaces/{workspace_id}/tags");
                let body = CwNewTag { name: &record.name };
                let created: CwTag = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_tag_record(&created))
            }
            EntityGroup::Tasks => {
                let project_id = record
                    .project_id
                    .as_deref()
                    .ok_or(ClockifyError::MissingField("project id"))?;
                let url =
                    format!("{API_BASE}/workspaces/{workspace_id}/projects/{project_id}/tasks");
                let body = CwNewTask { name: &record.name };
                let created: CwTask = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_task_record(&created, workspace_id))
            }
            EntityGroup::Users => {
                let email = record
                    .email
                    .as_deref()
                    .ok_or(ClockifyError::MissingField("email"))?;
                let url = format!("{API_BASE}/workspaces/{workspace_id}/users");
                let body = CwNewUser { email };
                let created: CwUser = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_user_record(&created, workspace_id))
            }
            EntityGroup::UserGroups => {
                let url = format!("{API_BASE}/workspaces/{workspace_id}/user-groups");
                let body = CwNewUserGroup { name: &record.name };
                let created: CwUserGroup = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_user_group_record(&created, workspace_id))
            }
            EntityGroup::TimeEntries => {
                let start = record.start.ok_or(ClockifyError::MissingField("start"))?;
                let url = format!("{API_BASE}/workspaces/{workspace_id}/time-entries");
                let body = CwNewTimeEntry {
                    start,
                    end: record.end,
                    description: &record.name,
                    project_id: record.project_id.as_deref(),
                    task_id: record.task_id.as_deref(),
                    tag_ids: record.tag_ids.iter().map(String::as_str).collect(),
                    billable: record.is_billable,
                };
                let created: CwTimeEntry = self.post_retry(&url, &body, &label, None).await?;
                Ok(to_time_entry_record(&created, workspace_id))
            }
            EntityGroup::Workspaces => Err(ClockifyError::MissingField("workspace id")),
        }
    }
}

#[async_trait]
impl TrackerClient for ClockifyClient {
    fn tool(&self) -> ToolName {
        ToolName::Clockify
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
        self.list_records(group, workspace_id, on_progress)
            .await
            .map_err(ServiceError::from)
    }

    async fn create_workspace(&self, record: &EntityRecord) -> service::Result<EntityRecord> {
        let url = format!("{API_BASE}/workspaces");
        let body = CwNewWorkspace { name: &record.name };
        let created: CwWorkspace = self
            .post_retry(&url, &body, "clockify create workspace", None)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpMethod, MockTransport};

    fn client_with(transport: &MockTransport) -> ClockifyClient {
        ClockifyClient::new_with_transport(
            "api-key",
            "me-1",
            None,
            CancelToken::new(),
            Arc::new(transport.clone()),
        )
    }

    fn clients_page(ids: std::ops::Range<u32>) -> String {
        let items: Vec<String> = ids
            .map(|i| format!(r#"{{"id": "c{i}", "name": "Client {i}", "workspaceId": "ws1"}}"#))
            .collect();
        format!("[{}]", items.join(","))
    }

    fn page_url(path: &str, page: u32) -> String {
        format!("{API_BASE}{path}?page={page}&page-size={PAGE_SIZE}")
    }

    #[tokio::test]
    async fn test_pagination_stops_after_short_page() {
        // 250 records at page size 100: three requests of 100, 100, 50.
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/clients", 1),
            &clients_page(0..100),
        );
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/clients", 2),
            &clients_page(100..200),
        );
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/clients", 3),
            &clients_page(200..250),
        );

        let client = client_with(&transport);
        let records = client
            .fetch(EntityGroup::Clients, "ws1", None)
            .await
            .expect("fetch");

        assert_eq!(records.len(), 250);
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn test_single_short_page_is_one_request() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/tags", 1),
            r#"[{"id": "t1", "name": "meeting", "workspaceId": "ws1"}]"#,
        );

        let client = client_with(&transport);
        let records = client
            .fetch(EntityGroup::Tags, "ws1", None)
            .await
            .expect("fetch");

        assert_eq!(records.len(), 1);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_requests_carry_api_key() {
        let transport = MockTransport::new();
        transport.push_json(HttpMethod::Get, format!("{API_BASE}/workspaces"), "[]");

        let client = client_with(&transport);
        client.fetch_workspaces(None).await.expect("fetch");

        let requests = transport.requests();
        let key = requests[0]
            .headers
            .iter()
            .find(|(k, _)| k == "X-Api-Key")
            .map(|(_, v)| v.clone());
        assert_eq!(key.as_deref(), Some("api-key"));
    }

    #[tokio::test]
    async fn test_time_entries_are_listed_for_the_configured_user() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/user/me-1/time-entries", 1),
            r#"[{
                "id": "te1",
                "description": "Standup",
                "timeInterval": {"start": "2024-03-11T09:00:00Z", "end": "2024-03-11T09:15:00Z"}
            }]"#,
        );

        let client = client_with(&transport);
        let records = client
            .fetch(EntityGroup::TimeEntries, "ws1", None)
            .await
            .expect("fetch");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Standup");
        assert_eq!(records[0].workspace_id, "ws1");
    }

    #[tokio::test]
    async fn test_tasks_walk_every_project() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/projects", 1),
            r#"[
                {"id": "p1", "name": "Apollo", "workspaceId": "ws1"},
                {"id": "p2", "name": "Borealis", "workspaceId": "ws1"}
            ]"#,
        );
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/projects/p1/tasks", 1),
            r#"[{"id": "k1", "name": "Design", "projectId": "p1", "status": "ACTIVE"}]"#,
        );
        transport.push_json(
            HttpMethod::Get,
            page_url("/workspaces/ws1/projects/p2/tasks", 1),
            r#"[{"id": "k2", "name": "Review", "projectId": "p2", "status": "DONE"}]"#,
        );

        let client = client_with(&transport);
        let records = client
            .fetch(EntityGroup::Tasks, "ws1", None)
            .await
            .expect("fetch");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].project_id.as_deref(), Some("p1"));
        assert!(!records[1].is_active);
    }

    #[tokio::test]
    async fn test_create_project_posts_remapped_client_id() {
        let transport = MockTransport::new();
        transport.push_json(
            HttpMethod::Post,
            format!("{API_BASE}/workspaces/ws1/projects"),
            r#"{"id": "p9", "name": "Apollo", "workspaceId": "ws1", "clientId": "c7"}"#,
        );

        let client = client_with(&transport);
        let mut record = EntityRecord::new(EntityGroup::Projects, "42", "Apollo", "1");
        record.client_id = Some("c7".to_string());

        let created = client.create("ws1", &record).await.expect("create");

        assert_eq!(created.id, "p9");
        assert_eq!(created.client_id.as_deref(), Some("c7"));

        let body: serde_json::Value =
            serde_json::from_slice(&transport.requests()[0].body).unwrap();
        assert_eq!(body["clientId"], "c7");
        assert_eq!(body["isPublic"], true);
    }

    #[tokio::test(start_paused = true)]
    async fn test_429_on_create_is_retried() {
        let transport = MockTransport::new();
        let url = format!("{API_BASE}/workspaces/ws1/clients");
        transport.push_status(HttpMethod::Post, &url, 429);
        transport.push_json(
            HttpMethod::Post,
            &url,
            r#"{"id": "c9", "name": "Acme", "workspaceId": "ws1"}"#,
        );

        let client = client_with(&transport);
        let record = EntityRecord::new(EntityGroup::Clients, "3", "Acme", "1");
        let created = client.create("ws1", &record).await.expect("create");

        assert_eq!(created.id, "c9");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_task_create_without_project_is_rejected() {
        let transport = MockTransport::new();
        let client = client_with(&transport);
        let record = EntityRecord::new(EntityGroup::Tasks, "t1", "Design", "1");

        let err = client.create("ws1", &record).await.expect_err("no project");

        assert!(matches!(err, ServiceError::Internal { .. }));
        assert_eq!(transport.request_count(), 0);
    }
}
