//! Status polling until a terminal state

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::errors::GhdeployError;
use crate::http::deployments::DeploymentsApi;
use crate::models::deployment::{current_state, DeploymentState, StatusEvent};

/// Poller tunables
#[derive(Debug, Clone)]
pub struct PollerSettings {
    /// Fixed delay between poll ticks
    pub interval: Duration,

    /// Overall wait budget before the poll gives up
    pub max_wait: Duration,
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_wait: Duration::from_secs(900),
        }
    }
}

/// Final outcome of polling one deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Success,
    Failure,
    Error,
    Inactive,

    /// The wait budget elapsed before any terminal state was observed.
    /// A local verdict, not a remote error.
    TimedOut,
}

impl PollOutcome {
    fn from_state(state: DeploymentState) -> Option<Self> {
        match state {
            DeploymentState::Success => Some(PollOutcome::Success),
            DeploymentState::Failure => Some(PollOutcome::Failure),
            DeploymentState::Error => Some(PollOutcome::Error),
            DeploymentState::Inactive => Some(PollOutcome::Inactive),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Success)
    }
}

/// Result of polling one deployment
#[derive(Debug, Clone)]
pub struct PollReport {
    pub outcome: PollOutcome,

    /// Status history as of the last completed tick
    pub history: Vec<StatusEvent>,
}

/// Poll `deployment_id` until it reaches a terminal state or the wait
/// budget runs out. `on_tick` receives the current state after every tick;
/// rendering it is the caller's concern.
///
/// A tick whose fetch fails with a transport error yields no new
/// information and the poll continues; other errors propagate.
pub async fn poll<A, F>(
    api: &A,
    deployment_id: u64,
    settings: &PollerSettings,
    mut on_tick: F,
) -> Result<PollReport, GhdeployError>
where
    A: DeploymentsApi + ?Sized,
    F: FnMut(DeploymentState),
{
    let deadline = Instant::now() + settings.max_wait;
    let mut history: Vec<StatusEvent> = Vec::new();

    loop {
        match api.list_statuses(deployment_id).await {
            Ok(events) => history = events,
            Err(e) if e.is_transport() => {
                warn!(
                    "status fetch for deployment {} failed, keeping last observation: {}",
                    deployment_id, e
                );
            }
            Err(e) => return Err(e),
        }

        let state = current_state(&history);
        debug!("deployment {} is {}", deployment_id, state);
        on_tick(state);

        if let Some(outcome) = PollOutcome::from_state(state) {
            return Ok(PollReport { outcome, history });
        }

        tokio::time::sleep(settings.interval).await;

        if Instant::now() >= deadline {
            return Ok(PollReport {
                outcome: PollOutcome::TimedOut,
                history,
            });
        }
    }
}
