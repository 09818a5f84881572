//! Asynchronous image enrichment
//!
//! Runs outside the commit pipeline. The outcome only touches the target
//! node's visual sub-state through `GraphStore::apply_visual`.

use super::OrchestratorError;
use crate::models::VisualUpdate;
use crate::providers::{EnrichmentProvider, ProviderError};
use crate::store::{GraphEvent, GraphStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub(crate) struct EnrichmentJob {
    pub node_id: String,
    pub prompt: String,
    pub timeout: Duration,
}

/// Spawn enrichment for a freshly committed node
pub(crate) fn spawn(
    store: Arc<GraphStore>,
    provider: Arc<dyn EnrichmentProvider>,
    job: EnrichmentJob,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let node_id = job.node_id.clone();
        match fetch(provider.as_ref(), job).await {
            Ok(image_url) => {
                if store.apply_visual(&node_id, &VisualUpdate::loaded(image_url)) {
                    tracing::info!("Enrichment landed for node {}", node_id);
                } else {
                    tracing::debug!("Dropping enrichment for vanished node {}", node_id);
                }
            }
            Err(err) => {
                tracing::warn!("{}", err);
                if store.apply_visual(&node_id, &VisualUpdate::failed()) {
                    let reason = match err {
                        OrchestratorError::EnrichmentFailure { reason, .. } => reason,
                        other => other.to_string(),
                    };
                    store.emit(GraphEvent::EnrichmentFailed { node_id, reason });
                } else {
                    tracing::debug!("Enrichment failed for vanished node {}", node_id);
                }
            }
        }
    })
}

async fn fetch(
    provider: &dyn EnrichmentProvider,
    job: EnrichmentJob,
) -> Result<String, OrchestratorError> {
    match tokio::time::timeout(job.timeout, provider.enrich(&job.prompt)).await {
        Ok(Ok(image_url)) => Ok(image_url),
        Ok(Err(err)) => Err(OrchestratorError::enrichment_failure(
            job.node_id,
            err.to_string(),
        )),
        Err(_) => Err(OrchestratorError::enrichment_failure(
            job.node_id,
            ProviderError::timeout(job.timeout.as_secs()).to_string(),
        )),
    }
}
