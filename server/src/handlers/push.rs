//! Push handler - applies a device's records to the shared store.

use crate::error::Result;
use todosync_engine::{ReconcileReport, Reconciler, RecordStore, RemoteRecord};

/// Reconcile a pushed batch into `store`.
///
/// With a `device`, the batch is that device's complete record set: records
/// it no longer holds are pruned, even when the batch is empty. Without one,
/// every owner appearing in the batch is reconciled.
pub async fn handle_push<S: RecordStore>(
    store: &S,
    device: Option<&str>,
    entries: Vec<serde_json::Value>,
) -> Result<ReconcileReport> {
    let batch: Vec<RemoteRecord> = entries.into_iter().map(RemoteRecord::from).collect();
    let reconciler = Reconciler::new(store);

    let report = match device {
        Some(device) => {
            tracing::info!(device = %device, count = batch.len(), "processing push");
            reconciler.reconcile_owner(device, batch).await?
        }
        None => {
            tracing::info!(count = batch.len(), "processing push without device");
            reconciler.reconcile(batch).await
        }
    };

    Ok(report)
}
