//! Implementation of the `set-state` command

use crate::config::Context;
use crate::deploy;
use crate::errors::GhdeployError;
use crate::http::client::ApiClient;
use crate::models::deployment::DeploymentState;
use crate::output;

pub async fn run(
    context: Context,
    deployment_id: u64,
    environment: String,
    state: DeploymentState,
    description: String,
) -> Result<(), GhdeployError> {
    let api = ApiClient::new(&context)?;
    let event = deploy::set_state(&api, deployment_id, state, &environment, &description).await?;

    output::print_success(&format!(
        "Deployment {} marked {} in {}",
        deployment_id, event.state, environment
    ));
    Ok(())
}
