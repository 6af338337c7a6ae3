//! Pull handler - serves the full record set to devices.

use crate::error::Result;
use todosync_engine::{Record, RecordStore};

/// Every stored record, across all devices, in listing order.
pub async fn handle_pull<S: RecordStore>(store: &S) -> Result<Vec<Record>> {
    let records = store.list_all().await?;
    tracing::debug!(count = records.len(), "serving pull");
    Ok(records)
}
