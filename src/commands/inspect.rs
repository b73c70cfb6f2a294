//! Implementation of the `inspect` command

use crate::config::Context;
use crate::errors::GhdeployError;
use crate::http::client::ApiClient;
use crate::http::deployments::DeploymentsApi;
use crate::models::deployment::StatusEvent;
use crate::output::{self, Table};

pub async fn run(context: Context, deployment_id: u64) -> Result<(), GhdeployError> {
    let api = ApiClient::new(&context)?;
    let events = api.list_statuses(deployment_id).await?;

    if events.is_empty() {
        output::print_info("No status events recorded for this deployment");
        return Ok(());
    }

    println!("{}", render_table(&events));
    Ok(())
}

fn render_table(events: &[StatusEvent]) -> String {
    let mut table = Table::new(&["state", "environment", "creator", "created", "description"]);
    for event in events {
        table.add_row(vec![
            output::color_state(event.state),
            event.environment.clone().unwrap_or_default(),
            event.creator.login.clone(),
            event.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            event.description.clone().unwrap_or_default(),
        ]);
    }
    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_status_rows() {
        let events: Vec<StatusEvent> = serde_json::from_value(serde_json::json!([
            {
                "id": 1,
                "state": "pending",
                "created_at": "2024-07-20T01:19:13Z",
                "creator": { "login": "octocat" },
                "environment": "test",
                "description": "Queued by CI",
            },
            {
                "id": 2,
                "state": "success",
                "created_at": "2024-07-20T01:25:00Z",
                "creator": { "login": "octocat" },
                "environment": "test",
            },
        ]))
        .unwrap();

        let rendered = render_table(&events);
        assert!(rendered.contains("pending"));
        assert!(rendered.contains("success"));
        assert!(rendered.contains("Queued by CI"));
        assert!(rendered.contains("2024-07-20 01:25:00"));
    }
}
