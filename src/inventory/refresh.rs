// ABOUTME: Refresh driver: lists an engine, normalizes, commits under a ticket.
// ABOUTME: Engines refresh concurrently; a failing engine doesn't block the others.

use super::{CommitOutcome, Inventory};
use crate::engine::{EngineClient, EngineError};
use crate::normalize::{NormalizeError, Normalizer};
use crate::types::{EngineId, PodRef};
use std::sync::Arc;

/// Summary of one engine refresh.
#[derive(Debug)]
pub struct RefreshReport {
    pub engine_id: EngineId,
    /// Containers committed to the inventory.
    pub containers: usize,
    /// Pods committed to the inventory.
    pub pods: usize,
    /// Native records that could not be normalized and were skipped.
    pub failures: Vec<NormalizeError>,
    /// The engine was evicted or re-registered during the refresh; nothing
    /// was committed.
    pub stale: bool,
}

impl RefreshReport {
    fn stale(engine_id: EngineId) -> Self {
        Self {
            engine_id,
            containers: 0,
            pods: 0,
            failures: Vec::new(),
            stale: true,
        }
    }
}

/// Refresh one engine's containers and pods.
///
/// Records that fail normalization are skipped and reported. The commit is
/// dropped if the engine was unregistered or evicted while listing.
pub async fn refresh_engine<C>(
    inventory: &Inventory,
    engine_id: &EngineId,
    client: &C,
) -> Result<RefreshReport, EngineError>
where
    C: EngineClient + ?Sized,
{
    let ticket = match inventory.begin_refresh(engine_id) {
        Ok(ticket) => ticket,
        Err(e) => {
            tracing::debug!("skipping refresh: {}", e);
            return Ok(RefreshReport::stale(engine_id.clone()));
        }
    };

    let native_pods = client.list_pods().await?;
    let native_containers = client.list_containers().await?;

    let engine = ticket.engine();
    let normalizer = Normalizer::new(engine);
    let pods: Vec<PodRef> = native_pods.into_iter().map(|p| normalizer.pod(p)).collect();
    let normalizer = normalizer.with_pods(pods.iter().cloned());

    let mut records = Vec::with_capacity(native_containers.len());
    let mut failures = Vec::new();
    for native in native_containers {
        match normalizer.container(native) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!("engine {}: skipping container: {}", engine.id, e);
                failures.push(e);
            }
        }
    }

    match inventory.commit_refresh(&ticket, records, pods) {
        CommitOutcome::Committed { containers, pods } => {
            tracing::debug!(
                "refreshed engine {}: {} container(s), {} pod(s)",
                engine_id,
                containers,
                pods
            );
            Ok(RefreshReport {
                engine_id: engine_id.clone(),
                containers,
                pods,
                failures,
                stale: false,
            })
        }
        CommitOutcome::Stale => Ok(RefreshReport {
            failures,
            ..RefreshReport::stale(engine_id.clone())
        }),
    }
}

/// Refresh several engines concurrently.
///
/// Results come back in the order the clients were given.
pub async fn refresh_all(
    inventory: &Inventory,
    clients: &[(EngineId, Arc<dyn EngineClient>)],
) -> Vec<Result<RefreshReport, EngineError>> {
    let refreshes = clients
        .iter()
        .map(|(id, client)| refresh_engine(inventory, id, client.as_ref()));
    let results = futures::future::join_all(refreshes).await;

    for ((id, _), result) in clients.iter().zip(&results) {
        if let Err(e) = result {
            tracing::warn!("failed to refresh engine {}: {}", id, e);
        }
    }

    results
}
