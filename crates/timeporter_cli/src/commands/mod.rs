//! CLI command implementations.

pub mod sync;
pub mod workspaces;

use std::sync::Arc;

use timeporter::service::{ApiRateLimiter, ToolName};
use timeporter::{CancelToken, ClockifyClient, Credentials, TogglClient};

/// Build both clients from validated credentials.
///
/// Each client gets its own rate limiter at the service's default ceiling
/// and a clone of the run's cancellation token.
pub(crate) fn build_clients(
    credentials: &Credentials,
    cancel: &CancelToken,
) -> Result<(Arc<TogglClient>, Arc<ClockifyClient>), Box<dyn std::error::Error>> {
    let toggl = TogglClient::new(
        &credentials.toggl_api_token,
        &credentials.toggl_email,
        Some(ApiRateLimiter::for_tool(ToolName::Toggl)),
        cancel.clone(),
    )?;
    let clockify = ClockifyClient::new(
        &credentials.clockify_api_key,
        &credentials.clockify_user_id,
        Some(ApiRateLimiter::for_tool(ToolName::Clockify)),
        cancel.clone(),
    )?;
    Ok((Arc::new(toggl), Arc::new(clockify)))
}
