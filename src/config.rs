//! Execution context and tunables

use std::env;

use crate::errors::GhdeployError;
use crate::git;

/// Default base URL of the remote Deployments API
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Environment names treated as production when the operator does not say
pub const PRODUCTION_ENVIRONMENTS: &[&str] = &["production", "prod", "live"];

/// Whether an environment name should default to the production flag
pub fn is_production_environment(environment: &str) -> bool {
    PRODUCTION_ENVIRONMENTS.contains(&environment)
}

/// Execution context threaded into the API gateway. Credential and
/// repository are explicit, never ambient globals.
#[derive(Debug, Clone)]
pub struct Context {
    /// `owner/name` repository the invocation operates on
    pub repository: String,

    /// Access credential for the remote API
    pub credential: String,

    /// Base URL of the remote API
    pub api_base_url: String,
}

impl Context {
    /// Resolve the context from CLI input and the process environment.
    ///
    /// A missing credential is a fatal configuration error raised before
    /// any remote call is attempted.
    pub async fn resolve(repository: Option<String>) -> Result<Self, GhdeployError> {
        let credential = env::var("GITHUB_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| GhdeployError::Config("GITHUB_TOKEN is not set".into()))?;

        let repository = match repository {
            Some(repository) => repository,
            None => git::repo_from_remote().await.ok_or_else(|| {
                GhdeployError::Config(
                    "repository not given and none detected from git remotes (use --repo)".into(),
                )
            })?,
        };

        let api_base_url =
            env::var("GITHUB_API_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        Ok(Self {
            repository,
            credential,
            api_base_url,
        })
    }
}
