//! Historical deployment listing with concurrent status enrichment

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::errors::GhdeployError;
use crate::http::deployments::DeploymentsApi;
use crate::models::deployment::EnrichedDeployment;

/// Listing tunables
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// Maximum number of deployments to return
    pub limit: usize,

    /// Restrict the listing to one environment
    pub environment: Option<String>,

    /// Fetch each record's latest status (one extra request per record)
    pub detailed: bool,

    /// Cap on simultaneous status fetches, shared across the whole call
    pub max_in_flight: usize,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            environment: None,
            detailed: false,
            max_in_flight: 4,
        }
    }
}

/// List up to `limit` deployments, optionally enriched with their latest
/// status.
///
/// The output order always matches the order the summaries were delivered
/// in, regardless of fetch completion order. A failed enrichment degrades
/// that record to `unknown` with the reason attached; only the summary
/// fetch itself fails the call. Enrichment failures are reported once and
/// never retried.
pub async fn list<A>(
    api: &Arc<A>,
    options: &ListOptions,
) -> Result<Vec<EnrichedDeployment>, GhdeployError>
where
    A: DeploymentsApi + 'static,
{
    let mut deployments = api
        .list_deployments(options.environment.as_deref(), options.limit)
        .await?;
    deployments.truncate(options.limit);
    debug!("listing {} deployments", deployments.len());

    if !options.detailed {
        return Ok(deployments.into_iter().map(EnrichedDeployment::bare).collect());
    }

    let semaphore = Arc::new(Semaphore::new(options.max_in_flight.max(1)));
    let fetches: Vec<_> = deployments
        .iter()
        .map(|deployment| {
            let api = Arc::clone(api);
            let semaphore = Arc::clone(&semaphore);
            let deployment_id = deployment.id;
            tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|_| {
                    GhdeployError::Internal("status fetch limiter closed".into())
                })?;
                api.list_statuses(deployment_id).await
            })
        })
        .collect();

    // Joining in spawn order keys every result to its summary slot.
    let mut results = Vec::with_capacity(deployments.len());
    for (deployment, fetch) in deployments.into_iter().zip(fetches) {
        let row = match fetch.await {
            Ok(Ok(events)) => EnrichedDeployment::enriched(deployment, &events),
            Ok(Err(e)) => {
                warn!("status fetch for deployment {} failed: {}", deployment.id, e);
                EnrichedDeployment::unavailable(deployment, e.to_string())
            }
            Err(e) => {
                warn!("status fetch for deployment {} died: {}", deployment.id, e);
                EnrichedDeployment::unavailable(deployment, e.to_string())
            }
        };
        results.push(row);
    }

    Ok(results)
}
