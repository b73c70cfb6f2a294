//! Deployment creation

use tracing::info;

use crate::errors::GhdeployError;
use crate::http::deployments::{CreateDeploymentRequest, DeploymentsApi};
use crate::models::deployment::Deployment;

/// Default logical task name for new deployments
pub const DEFAULT_TASK: &str = "deploy";

/// Validated operator input for one deployment creation
#[derive(Debug, Clone)]
pub struct CreateSpec {
    pub git_ref: String,
    pub environment: String,
    pub task: String,
    pub transient: bool,
    pub production: bool,
    pub description: String,

    /// `None` leaves enforcement of every remote status check in place;
    /// an explicit empty list disables checking.
    pub required_contexts: Option<Vec<String>>,
}

impl CreateSpec {
    /// Translate the operator's check-constraints choice into the wire
    /// form: enforce all remote checks, or none.
    pub fn contexts_for(check_constraints: bool) -> Option<Vec<String>> {
        if check_constraints {
            None
        } else {
            Some(vec![])
        }
    }

    fn validate(&self) -> Result<(), GhdeployError> {
        if self.environment.trim().is_empty() {
            return Err(GhdeployError::Validation {
                field: "environment",
                message: "must not be empty".into(),
            });
        }
        if self.git_ref.trim().is_empty() {
            return Err(GhdeployError::Validation {
                field: "ref",
                message: "must not be empty".into(),
            });
        }
        Ok(())
    }

    fn to_request(&self) -> CreateDeploymentRequest {
        CreateDeploymentRequest {
            git_ref: self.git_ref.clone(),
            auto_merge: false,
            environment: self.environment.clone(),
            transient_environment: self.transient,
            production_environment: self.production,
            task: self.task.clone(),
            description: self.description.clone(),
            required_contexts: self.required_contexts.clone(),
        }
    }
}

/// Issue exactly one creation request and return the new record.
///
/// Not idempotent: calling twice creates two distinct deployments.
/// Constraint enforcement happens remotely; rejections (unmet required
/// contexts, unresolvable refs) are surfaced verbatim and never retried.
pub async fn create<A>(api: &A, spec: &CreateSpec) -> Result<Deployment, GhdeployError>
where
    A: DeploymentsApi + ?Sized,
{
    spec.validate()?;

    let deployment = api.create_deployment(&spec.to_request()).await?;
    info!(
        "created deployment {} for {}@{}",
        deployment.id, deployment.environment, deployment.git_ref
    );
    Ok(deployment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::models::deployment::{DeploymentState, StatusEvent};

    fn spec() -> CreateSpec {
        CreateSpec {
            git_ref: "4f2d91c".to_string(),
            environment: "test".to_string(),
            task: DEFAULT_TASK.to_string(),
            transient: false,
            production: false,
            description: "release".to_string(),
            required_contexts: None,
        }
    }

    struct CapturingApi {
        seen: Mutex<Option<CreateDeploymentRequest>>,
    }

    #[async_trait]
    impl DeploymentsApi for CapturingApi {
        async fn list_deployments(
            &self,
            _environment: Option<&str>,
            _per_page: usize,
        ) -> Result<Vec<Deployment>, GhdeployError> {
            unreachable!()
        }

        async fn list_statuses(
            &self,
            _deployment_id: u64,
        ) -> Result<Vec<StatusEvent>, GhdeployError> {
            unreachable!()
        }

        async fn create_deployment(
            &self,
            request: &CreateDeploymentRequest,
        ) -> Result<Deployment, GhdeployError> {
            *self.seen.lock().unwrap() = Some(request.clone());
            Ok(serde_json::from_value(serde_json::json!({
                "id": 42,
                "ref": request.git_ref,
                "task": request.task,
                "environment": request.environment,
                "created_at": "2024-07-20T01:19:13Z",
                "creator": { "login": "octocat" },
            }))
            .unwrap())
        }

        async fn create_status(
            &self,
            _deployment_id: u64,
            _state: DeploymentState,
            _environment: &str,
            _description: &str,
        ) -> Result<StatusEvent, GhdeployError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn create_issues_single_request() {
        let api = CapturingApi {
            seen: Mutex::new(None),
        };
        let deployment = create(&api, &spec()).await.unwrap();
        assert_eq!(deployment.id, 42);

        let request = api.seen.lock().unwrap().clone().unwrap();
        assert_eq!(request.git_ref, "4f2d91c");
        assert!(!request.auto_merge);
        assert!(request.required_contexts.is_none());
    }

    #[tokio::test]
    async fn empty_environment_is_rejected_locally() {
        let api = CapturingApi {
            seen: Mutex::new(None),
        };
        let result = create(
            &api,
            &CreateSpec {
                environment: "  ".to_string(),
                ..spec()
            },
        )
        .await;

        assert!(matches!(
            result,
            Err(GhdeployError::Validation {
                field: "environment",
                ..
            })
        ));
        assert!(api.seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn remote_rejection_is_not_retried() {
        struct RejectingApi {
            calls: Mutex<usize>,
        }

        #[async_trait]
        impl DeploymentsApi for RejectingApi {
            async fn list_deployments(
                &self,
                _environment: Option<&str>,
                _per_page: usize,
            ) -> Result<Vec<Deployment>, GhdeployError> {
                unreachable!()
            }

            async fn list_statuses(
                &self,
                _deployment_id: u64,
            ) -> Result<Vec<StatusEvent>, GhdeployError> {
                unreachable!()
            }

            async fn create_deployment(
                &self,
                _request: &CreateDeploymentRequest,
            ) -> Result<Deployment, GhdeployError> {
                *self.calls.lock().unwrap() += 1;
                Err(GhdeployError::Rejected(
                    "Required status check \"ci\" is failing".into(),
                ))
            }

            async fn create_status(
                &self,
                _deployment_id: u64,
                _state: DeploymentState,
                _environment: &str,
                _description: &str,
            ) -> Result<StatusEvent, GhdeployError> {
                unreachable!()
            }
        }

        let api = RejectingApi {
            calls: Mutex::new(0),
        };
        let result = create(&api, &spec()).await;
        assert!(matches!(result, Err(GhdeployError::Rejected(_))));
        assert_eq!(*api.calls.lock().unwrap(), 1);
    }

    #[test]
    fn contexts_for_check_constraints() {
        assert!(CreateSpec::contexts_for(true).is_none());
        assert_eq!(CreateSpec::contexts_for(false), Some(vec![]));
    }
}
