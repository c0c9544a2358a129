//! The workspaces command: list both sides with link state.

use console::style;
use timeporter::link::{LinkTable, link_records};
use timeporter::model::EntityGroup;
use timeporter::service::TrackerClient;
use timeporter::CancelToken;

use crate::config::Config;
use crate::shutdown::setup_shutdown_handler;

pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let credentials = config.credentials();
    credentials.validate()?;

    let cancel = CancelToken::new();
    setup_shutdown_handler(cancel.clone());

    let (toggl, clockify) = super::build_clients(&credentials, &cancel)?;

    let mut source = toggl.fetch_workspaces(None).await?;
    let mut target = clockify.fetch_workspaces(None).await?;
    link_records(
        EntityGroup::Workspaces,
        &mut source,
        &mut target,
        &LinkTable::new(),
    );

    println!("{}", style("Toggl").bold());
    for workspace in &source {
        let state = match &workspace.linked_id {
            Some(linked) => format!("linked to clockify {linked}"),
            None => "no counterpart".to_string(),
        };
        println!("  {:<30} {}", workspace.name, style(state).dim());
    }

    println!("{}", style("Clockify").bold());
    for workspace in &target {
        let state = match &workspace.linked_id {
            Some(linked) => format!("linked to toggl {linked}"),
            None => "no counterpart".to_string(),
        };
        println!("  {:<30} {}", workspace.name, style(state).dim());
    }

    Ok(())
}
