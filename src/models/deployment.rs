//! Deployment and status models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status state of a deployment as reported by the remote API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentState {
    Queued,
    Pending,
    InProgress,
    Success,
    Failure,
    Error,
    Inactive,

    /// Local fallback for unrecognized remote values and for deployments
    /// without any status event yet
    #[serde(other)]
    Unknown,
}

impl DeploymentState {
    /// Wire name of the state
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentState::Queued => "queued",
            DeploymentState::Pending => "pending",
            DeploymentState::InProgress => "in_progress",
            DeploymentState::Success => "success",
            DeploymentState::Failure => "failure",
            DeploymentState::Error => "error",
            DeploymentState::Inactive => "inactive",
            DeploymentState::Unknown => "unknown",
        }
    }

    /// Whether no further transitions are expected after this state
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeploymentState::Success
                | DeploymentState::Failure
                | DeploymentState::Error
                | DeploymentState::Inactive
        )
    }
}

impl std::fmt::Display for DeploymentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeploymentState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(DeploymentState::Queued),
            "pending" => Ok(DeploymentState::Pending),
            "in_progress" => Ok(DeploymentState::InProgress),
            "success" => Ok(DeploymentState::Success),
            "failure" => Ok(DeploymentState::Failure),
            "error" => Ok(DeploymentState::Error),
            "inactive" => Ok(DeploymentState::Inactive),
            _ => Err(format!(
                "unrecognized state: {} (expected one of queued, pending, in_progress, \
                 success, failure, error, inactive)",
                s
            )),
        }
    }
}

/// Identity of the actor who created a deployment or status event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

/// One deployment record as returned by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deployment {
    /// Identifier assigned by the remote API at creation time
    pub id: u64,

    /// Source revision that was deployed (commit SHA or symbolic ref)
    #[serde(rename = "ref")]
    pub git_ref: String,

    /// Logical task name, usually "deploy"
    pub task: String,

    /// Target environment name
    pub environment: String,

    /// Environment the deployment was originally created for, when it has
    /// since been transitioned to another one
    #[serde(default)]
    pub original_environment: String,

    #[serde(default)]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,

    pub creator: Actor,

    #[serde(default)]
    pub transient_environment: Option<bool>,

    #[serde(default)]
    pub production_environment: Option<bool>,
}

/// One immutable state-transition fact attached to a deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEvent {
    pub id: u64,

    pub state: DeploymentState,

    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub description: Option<String>,

    pub creator: Actor,

    #[serde(default)]
    pub environment: Option<String>,
}

/// The status event with the highest `created_at`. The remote API does not
/// guarantee chronological return order, so list position is not trusted.
pub fn latest_event(events: &[StatusEvent]) -> Option<&StatusEvent> {
    events.iter().max_by_key(|event| event.created_at)
}

/// Current state of a deployment: the state of its newest status event,
/// or `Unknown` when no event exists.
pub fn current_state(events: &[StatusEvent]) -> DeploymentState {
    latest_event(events)
        .map(|event| event.state)
        .unwrap_or(DeploymentState::Unknown)
}

/// A deployment summary together with the outcome of status enrichment
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedDeployment {
    pub deployment: Deployment,

    /// Current state; `Unknown` when no enrichment was requested, the
    /// history is empty, or the enrichment fetch failed
    pub state: DeploymentState,

    /// Timestamp of the newest status event
    pub status_changed_at: Option<DateTime<Utc>>,

    /// Reason the enrichment fetch failed, kept for display
    pub detail_error: Option<String>,
}

impl EnrichedDeployment {
    /// Summary without enrichment
    pub fn bare(deployment: Deployment) -> Self {
        Self {
            deployment,
            state: DeploymentState::Unknown,
            status_changed_at: None,
            detail_error: None,
        }
    }

    /// Summary enriched from its fetched status history
    pub fn enriched(deployment: Deployment, events: &[StatusEvent]) -> Self {
        match latest_event(events) {
            Some(event) => Self {
                deployment,
                state: event.state,
                status_changed_at: Some(event.created_at),
                detail_error: None,
            },
            None => Self::bare(deployment),
        }
    }

    /// Summary whose enrichment failed
    pub fn unavailable(deployment: Deployment, reason: String) -> Self {
        Self {
            deployment,
            state: DeploymentState::Unknown,
            status_changed_at: None,
            detail_error: Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: u64, state: DeploymentState, timestamp: i64) -> StatusEvent {
        StatusEvent {
            id,
            state,
            created_at: Utc.timestamp_opt(timestamp, 0).unwrap(),
            description: None,
            creator: Actor {
                login: "octocat".to_string(),
            },
            environment: None,
        }
    }

    #[test]
    fn current_state_uses_newest_timestamp_not_position() {
        let events = vec![
            event(1, DeploymentState::Pending, 1),
            event(3, DeploymentState::Success, 3),
            event(2, DeploymentState::InProgress, 2),
        ];
        assert_eq!(current_state(&events), DeploymentState::Success);
    }

    #[test]
    fn current_state_of_empty_history_is_unknown() {
        assert_eq!(current_state(&[]), DeploymentState::Unknown);
    }

    #[test]
    fn terminal_states() {
        assert!(DeploymentState::Success.is_terminal());
        assert!(DeploymentState::Failure.is_terminal());
        assert!(DeploymentState::Error.is_terminal());
        assert!(DeploymentState::Inactive.is_terminal());
        assert!(!DeploymentState::Queued.is_terminal());
        assert!(!DeploymentState::Pending.is_terminal());
        assert!(!DeploymentState::InProgress.is_terminal());
        assert!(!DeploymentState::Unknown.is_terminal());
    }

    #[test]
    fn unrecognized_state_deserializes_to_unknown() {
        let state: DeploymentState = serde_json::from_str("\"paused\"").unwrap();
        assert_eq!(state, DeploymentState::Unknown);

        let state: DeploymentState = serde_json::from_str("\"in_progress\"").unwrap();
        assert_eq!(state, DeploymentState::InProgress);
    }

    #[test]
    fn state_parses_from_wire_name() {
        assert_eq!(
            "in_progress".parse::<DeploymentState>().unwrap(),
            DeploymentState::InProgress
        );
        assert!("unknown".parse::<DeploymentState>().is_err());
        assert!("deployed".parse::<DeploymentState>().is_err());
    }

    #[test]
    fn deployment_parses_remote_payload() {
        let payload = serde_json::json!({
            "url": "https://api.github.com/repos/acme/widget/deployments/42",
            "id": 42,
            "ref": "topic-branch",
            "task": "deploy",
            "environment": "production",
            "original_environment": "staging",
            "description": "Deploy request",
            "created_at": "2024-07-20T01:19:13Z",
            "creator": { "login": "octocat", "id": 1 },
            "transient_environment": false,
            "production_environment": true,
        });

        let deployment: Deployment = serde_json::from_value(payload).unwrap();
        assert_eq!(deployment.id, 42);
        assert_eq!(deployment.git_ref, "topic-branch");
        assert_eq!(deployment.original_environment, "staging");
        assert_eq!(deployment.creator.login, "octocat");
        assert_eq!(deployment.production_environment, Some(true));
    }

    #[test]
    fn enrichment_of_empty_history_stays_unknown() {
        let deployment: Deployment = serde_json::from_value(serde_json::json!({
            "id": 1,
            "ref": "main",
            "task": "deploy",
            "environment": "test",
            "created_at": "2024-07-20T01:19:13Z",
            "creator": { "login": "octocat" },
        }))
        .unwrap();

        let row = EnrichedDeployment::enriched(deployment, &[]);
        assert_eq!(row.state, DeploymentState::Unknown);
        assert!(row.status_changed_at.is_none());
        assert!(row.detail_error.is_none());
    }

    #[test]
    fn enrichment_picks_newest_event() {
        let deployment: Deployment = serde_json::from_value(serde_json::json!({
            "id": 1,
            "ref": "main",
            "task": "deploy",
            "environment": "test",
            "created_at": "2024-07-20T01:19:13Z",
            "creator": { "login": "octocat" },
        }))
        .unwrap();

        let events = vec![
            event(1, DeploymentState::Success, 10),
            event(2, DeploymentState::Pending, 5),
        ];
        let row = EnrichedDeployment::enriched(deployment, &events);
        assert_eq!(row.state, DeploymentState::Success);
        assert_eq!(row.status_changed_at, Some(Utc.timestamp_opt(10, 0).unwrap()));
    }
}
