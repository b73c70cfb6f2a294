//! Implementation of the `list` command

use std::sync::Arc;

use chrono::Utc;

use crate::config::Context;
use crate::deploy::history::{self, ListOptions};
use crate::errors::GhdeployError;
use crate::http::client::ApiClient;
use crate::models::deployment::{DeploymentState, EnrichedDeployment};
use crate::output::{self, Table};

pub async fn run(
    context: Context,
    limit: usize,
    environment: Option<String>,
    verbose: bool,
    concurrency: usize,
) -> Result<(), GhdeployError> {
    if limit == 0 {
        return Err(GhdeployError::Validation {
            field: "limit",
            message: "must be greater than zero".into(),
        });
    }

    let api = Arc::new(ApiClient::new(&context)?);
    let options = ListOptions {
        limit,
        environment,
        detailed: verbose,
        max_in_flight: concurrency,
    };
    let rows = history::list(&api, &options).await?;

    println!("{}", render_table(&rows));
    Ok(())
}

fn render_table(rows: &[EnrichedDeployment]) -> String {
    let mut table = Table::new(&[
        "id",
        "ref",
        "task",
        "environment",
        "creator",
        "created",
        "status_changed",
        "transient",
        "production",
        "state",
        "description",
    ]);

    let now = Utc::now();
    for row in rows {
        let deployment = &row.deployment;

        let environment = if !deployment.original_environment.is_empty()
            && deployment.original_environment != deployment.environment
        {
            format!(
                "{} <- {}",
                deployment.environment, deployment.original_environment
            )
        } else {
            deployment.environment.clone()
        };

        let state = match &row.detail_error {
            Some(reason) => format!(
                "{} ({})",
                output::color_state(DeploymentState::Unknown),
                reason
            ),
            None => output::color_state(row.state),
        };

        let status_changed = match row.status_changed_at {
            Some(at) => format!(
                "{} ({})",
                at.format("%Y-%m-%d %H:%M"),
                output::human_age(now - at)
            ),
            None => output::color_unknown("unknown"),
        };

        table.add_row(vec![
            deployment.id.to_string(),
            output::short_sha(&deployment.git_ref).to_string(),
            deployment.task.clone(),
            environment,
            deployment.creator.login.clone(),
            deployment.created_at.format("%Y-%m-%d %H:%M").to_string(),
            status_changed,
            output::bool_str(deployment.transient_environment),
            output::bool_str(deployment.production_environment),
            state,
            deployment.description.clone().unwrap_or_default(),
        ]);
    }

    table.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::deployment::Deployment;

    fn deployment(id: u64, environment: &str, original: &str) -> Deployment {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "ref": "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3",
            "task": "deploy",
            "environment": environment,
            "original_environment": original,
            "created_at": "2024-07-20T01:19:13Z",
            "creator": { "login": "octocat" },
        }))
        .unwrap()
    }

    #[test]
    fn table_shows_promoted_environment() {
        let rows = vec![EnrichedDeployment::bare(deployment(1, "live", "staging"))];
        let rendered = render_table(&rows);
        assert!(rendered.contains("live <- staging"));
        assert!(rendered.contains("a94a8fe"));
        assert!(!rendered.contains("a94a8fe5ccb"));
    }

    #[test]
    fn table_shows_plain_environment_when_not_promoted() {
        let rows = vec![EnrichedDeployment::bare(deployment(1, "test", "test"))];
        let rendered = render_table(&rows);
        assert!(rendered.contains("test"));
        assert!(!rendered.contains("<-"));
    }

    #[test]
    fn failed_enrichment_reason_is_shown() {
        let rows = vec![EnrichedDeployment::unavailable(
            deployment(1, "test", "test"),
            "rate limited: slow down".to_string(),
        )];
        let rendered = render_table(&rows);
        assert!(rendered.contains("rate limited: slow down"));
    }
}
