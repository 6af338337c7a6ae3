//! Todo service - the operations behind the todo screen.
//!
//! Every call re-reads the store; the service holds no record state.

use crate::remote::SyncClient;
use todosync_engine::{
    next_local_id, normalize_text, OwnerId, ReconcileReport, Reconciler, Record, RecordId,
    RecordStore, Result,
};

/// Local todo operations for one device, plus push/pull sync.
pub struct TodoService<S> {
    store: S,
    remote: SyncClient,
    owner: OwnerId,
}

impl<S: RecordStore> TodoService<S> {
    pub fn new(store: S, remote: SyncClient, owner: impl Into<OwnerId>) -> Self {
        Self {
            store,
            remote,
            owner: owner.into(),
        }
    }

    /// This device's owner id.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every record on the device, own and pulled.
    pub async fn all_todos(&self) -> Result<Vec<Record>> {
        self.store.list_all().await
    }

    /// Records created on this device.
    pub async fn my_todos(&self) -> Result<Vec<Record>> {
        self.store.list_by_owner(&self.owner).await
    }

    /// Create a todo with the next free id for this device.
    pub async fn add(&self, title: &str, content: &str) -> Result<Record> {
        let title = normalize_text("title", title)?;
        let content = normalize_text("content", content)?;

        let mine = self.my_todos().await?;
        let record = Record::new(next_local_id(&mine), self.owner.clone(), title, content)?;
        self.store.insert(&record).await?;

        tracing::info!(owner = %self.owner, id = record.id, "todo added");
        Ok(record)
    }

    /// Edit one of this device's todos.
    pub async fn edit(&self, id: RecordId, title: &str, content: &str) -> Result<()> {
        let title = normalize_text("title", title)?;
        let content = normalize_text("content", content)?;

        self.store.update(id, &self.owner, &title, &content).await?;

        tracing::info!(owner = %self.owner, id, "todo updated");
        Ok(())
    }

    /// Delete one of this device's todos.
    pub async fn remove(&self, id: RecordId) -> Result<()> {
        self.store.delete(id, &self.owner).await?;

        tracing::info!(owner = %self.owner, id, "todo deleted");
        Ok(())
    }

    /// Edit and delete are only offered on records this device owns.
    pub fn can_modify(&self, record: &Record) -> bool {
        record.is_owned_by(&self.owner)
    }

    /// Upload this device's records. Returns how many were sent.
    pub async fn push(&self) -> Result<usize> {
        let mine = self.my_todos().await?;
        self.remote.push(&self.owner, &mine).await?;

        tracing::info!(owner = %self.owner, count = mine.len(), "push complete");
        Ok(mine.len())
    }

    /// Download the server's records and reconcile them into the store.
    pub async fn pull(&self) -> Result<ReconcileReport> {
        let batch = self.remote.pull().await?;
        Ok(Reconciler::new(&self.store).reconcile(batch).await)
    }
}
