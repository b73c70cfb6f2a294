//! Deployment lifecycle operations

pub mod creator;
pub mod history;
pub mod poller;

use crate::errors::GhdeployError;
use crate::http::deployments::DeploymentsApi;
use crate::models::deployment::{DeploymentState, StatusEvent};

/// Mark a deployment with a new state in an environment, e.g. `inactive`
/// when the environment is torn down. Single remote mutation, no polling,
/// no retries; errors are surfaced verbatim.
pub async fn set_state<A>(
    api: &A,
    deployment_id: u64,
    state: DeploymentState,
    environment: &str,
    description: &str,
) -> Result<StatusEvent, GhdeployError>
where
    A: DeploymentsApi + ?Sized,
{
    if state == DeploymentState::Unknown {
        return Err(GhdeployError::Validation {
            field: "state",
            message: "cannot set a deployment to unknown".into(),
        });
    }
    if environment.trim().is_empty() {
        return Err(GhdeployError::Validation {
            field: "environment",
            message: "must not be empty".into(),
        });
    }

    api.create_status(deployment_id, state, environment, description)
        .await
}
