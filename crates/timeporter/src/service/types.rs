use std::fmt;

use async_trait::async_trait;

use crate::model::{EntityGroup, EntityRecord};
use crate::sync::progress::ProgressCallback;

use super::errors::Result;

/// The time-tracking services the engine knows how to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    Toggl,
    Clockify,
}

impl ToolName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ToolName::Toggl => "toggl",
            ToolName::Clockify => "clockify",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for time-tracking service clients.
///
/// This trait provides a unified interface for fetching and creating records
/// on Toggl and Clockify, so the linker and the sync coordinator never see a
/// service-specific payload.
///
/// # Implementation Notes
///
/// Implementors should:
/// - Handle pagination internally for list operations
/// - Report progress via the optional callback
/// - Retry HTTP 429 with the shared constant backoff, surfacing
///   `RateLimitExhausted` when attempts run out
/// - Wait on their injected rate limiter before every request
/// - Check the cancellation token before every request
/// - Convert wire payloads to [`EntityRecord`] through their typed adapters
#[async_trait]
pub trait TrackerClient: Send + Sync {
    /// Which service this client connects to.
    fn tool(&self) -> ToolName;

    /// Fetch all workspaces visible to the authenticated user.
    async fn fetch_workspaces(
        &self,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<EntityRecord>>;

    /// Fetch all records of a workspace-scoped entity group.
    ///
    /// This handles pagination internally and returns all records of the
    /// group within the given workspace. `EntityGroup::Workspaces` is not a
    /// valid argument here; use [`TrackerClient::fetch_workspaces`].
    async fn fetch(
        &self,
        group: EntityGroup,
        workspace_id: &str,
        on_progress: Option<&ProgressCallback>,
    ) -> Result<Vec<EntityRecord>>;

    /// Create a workspace and return its canonical record.
    async fn create_workspace(&self, record: &EntityRecord) -> Result<EntityRecord>;

    /// Create a record of a workspace-scoped group in the given workspace.
    ///
    /// `record` must already carry ids valid on *this* service (the caller
    /// remaps parent references through the link tables before calling).
    /// Returns the canonical record for the newly created entity.
    async fn create(&self, workspace_id: &str, record: &EntityRecord) -> Result<EntityRecord>;
}
