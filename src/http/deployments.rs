//! Typed operations of the Deployments API

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::GhdeployError;
use crate::http::client::ApiClient;
use crate::models::deployment::{Deployment, DeploymentState, StatusEvent};

/// Request body for deployment creation
#[derive(Debug, Clone, Serialize)]
pub struct CreateDeploymentRequest {
    #[serde(rename = "ref")]
    pub git_ref: String,

    pub auto_merge: bool,

    pub environment: String,

    pub transient_environment: bool,

    pub production_environment: bool,

    pub task: String,

    pub description: String,

    /// Status contexts that must pass before the remote accepts the
    /// deployment. Omitted entirely (`None`) to enforce every check; an
    /// explicit empty list disables checking.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_contexts: Option<Vec<String>>,
}

/// Gateway contract consumed by the creator, poller and history aggregator
#[async_trait]
pub trait DeploymentsApi: Send + Sync {
    /// List deployment records, most recent first as delivered by the
    /// remote API. Callers never re-sort.
    async fn list_deployments(
        &self,
        environment: Option<&str>,
        per_page: usize,
    ) -> Result<Vec<Deployment>, GhdeployError>;

    /// List the status events of one deployment
    async fn list_statuses(&self, deployment_id: u64) -> Result<Vec<StatusEvent>, GhdeployError>;

    /// Create a new deployment
    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<Deployment, GhdeployError>;

    /// Attach a new status event to a deployment
    async fn create_status(
        &self,
        deployment_id: u64,
        state: DeploymentState,
        environment: &str,
        description: &str,
    ) -> Result<StatusEvent, GhdeployError>;
}

#[async_trait]
impl DeploymentsApi for ApiClient {
    async fn list_deployments(
        &self,
        environment: Option<&str>,
        per_page: usize,
    ) -> Result<Vec<Deployment>, GhdeployError> {
        let path = format!("/repos/{}/deployments", self.repository());
        let mut query = vec![("per_page", per_page.to_string())];
        if let Some(environment) = environment {
            query.push(("environment", environment.to_string()));
        }
        self.get(&path, &query).await
    }

    async fn list_statuses(&self, deployment_id: u64) -> Result<Vec<StatusEvent>, GhdeployError> {
        let path = format!(
            "/repos/{}/deployments/{}/statuses",
            self.repository(),
            deployment_id
        );
        self.get(&path, &[]).await
    }

    async fn create_deployment(
        &self,
        request: &CreateDeploymentRequest,
    ) -> Result<Deployment, GhdeployError> {
        let path = format!("/repos/{}/deployments", self.repository());
        self.post(&path, request).await
    }

    async fn create_status(
        &self,
        deployment_id: u64,
        state: DeploymentState,
        environment: &str,
        description: &str,
    ) -> Result<StatusEvent, GhdeployError> {
        let path = format!(
            "/repos/{}/deployments/{}/statuses",
            self.repository(),
            deployment_id
        );
        let body = serde_json::json!({
            "state": state,
            "environment": environment,
            "description": description,
        });
        self.post(&path, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_contexts_are_omitted_when_unset() {
        let request = CreateDeploymentRequest {
            git_ref: "main".to_string(),
            auto_merge: false,
            environment: "test".to_string(),
            transient_environment: false,
            production_environment: false,
            task: "deploy".to_string(),
            description: "release".to_string(),
            required_contexts: None,
        };

        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("required_contexts").is_none());
        assert_eq!(body["ref"], "main");
        assert_eq!(body["auto_merge"], false);
    }

    #[test]
    fn empty_required_contexts_are_sent_explicitly() {
        let request = CreateDeploymentRequest {
            git_ref: "main".to_string(),
            auto_merge: false,
            environment: "test".to_string(),
            transient_environment: false,
            production_environment: false,
            task: "deploy".to_string(),
            description: "release".to_string(),
            required_contexts: Some(vec![]),
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["required_contexts"], serde_json::json!([]));
    }
}
