//! Pull reconciliation: converge the local store to a remote batch.
//!
//! The remote side wins. For every owner present in the batch the local
//! record set ends up holding exactly the batch's ids for that owner.
//!
//! # Algorithm
//!
//! 1. Validate entries, skipping invalid ones, and group them by owner in
//!    first-seen order
//! 2. For each owner, upsert the valid entries in batch order: update when
//!    (id, owner) exists, insert otherwise
//! 3. Re-read the owner's records and delete those whose id is absent from
//!    the batch slice
//!
//! Failures are per record. They are logged and counted but never abort the
//! pass, and nothing is rolled back. Owners absent from the batch are left
//! untouched.

use crate::store::{require_owner, RecordStore};
use crate::{error::Result, OwnerId, Record, RecordId, RemoteRecord};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Summary of a reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    /// Remote records inserted locally
    pub inserted: usize,
    /// Existing records overwritten from the batch
    pub updated: usize,
    /// Local records pruned because the batch no longer has them
    pub deleted: usize,
    /// Batch entries that failed validation
    pub skipped: usize,
    /// Store operations that failed
    pub failed: usize,
}

impl ReconcileReport {
    /// True when every entry was valid and every store call succeeded.
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && self.failed == 0
    }
}

/// Outcome of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Upsert {
    Inserted,
    Updated,
}

/// The part of a batch belonging to one owner.
#[derive(Debug)]
struct OwnerSlice {
    owner: OwnerId,
    records: Vec<Record>,
    /// Ids kept by the prune step, including those of skipped entries
    keep: HashSet<RecordId>,
}

impl OwnerSlice {
    fn new(owner: impl Into<OwnerId>) -> Self {
        Self {
            owner: owner.into(),
            records: Vec::new(),
            keep: HashSet::new(),
        }
    }
}

/// Applies remote batches to a [`RecordStore`].
pub struct Reconciler<'a, S> {
    store: &'a S,
}

impl<'a, S: RecordStore> Reconciler<'a, S> {
    /// Create a reconciler writing through `store`.
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Reconcile every owner present in `batch`.
    ///
    /// An empty batch is a no-op.
    pub async fn reconcile(&self, batch: Vec<RemoteRecord>) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        if batch.is_empty() {
            tracing::debug!("empty batch, nothing to reconcile");
            return report;
        }

        let slices = partition(batch, None, &mut report);
        for slice in slices {
            self.apply_slice(slice, &mut report).await;
        }

        log_summary(&report);
        report
    }

    /// Reconcile a batch that describes the complete record set of `owner`.
    ///
    /// Unlike [`Reconciler::reconcile`], the owner is always treated as
    /// present: an empty batch removes every record it holds. Entries of
    /// other owners are skipped.
    pub async fn reconcile_owner(
        &self,
        owner: &str,
        batch: Vec<RemoteRecord>,
    ) -> Result<ReconcileReport> {
        require_owner(owner)?;

        let mut report = ReconcileReport::default();
        let mut slices = partition(batch, Some(owner), &mut report);
        if slices.is_empty() {
            slices.push(OwnerSlice::new(owner));
        }
        for slice in slices {
            self.apply_slice(slice, &mut report).await;
        }

        log_summary(&report);
        Ok(report)
    }

    async fn apply_slice(&self, slice: OwnerSlice, report: &mut ReconcileReport) {
        let owner = slice.owner;

        for record in &slice.records {
            match self.upsert(record).await {
                Ok(Upsert::Inserted) => {
                    report.inserted += 1;
                    tracing::debug!(owner = %owner, id = record.id, "inserted record");
                }
                Ok(Upsert::Updated) => {
                    report.updated += 1;
                    tracing::debug!(owner = %owner, id = record.id, "updated record");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(owner = %owner, id = record.id, "upsert failed: {}", e);
                }
            }
        }

        // Prune against a fresh read, after every upsert was attempted
        let local = match self.store.list_by_owner(&owner).await {
            Ok(local) => local,
            Err(e) => {
                report.failed += 1;
                tracing::warn!(owner = %owner, "could not read records to prune: {}", e);
                return;
            }
        };

        let stale: Vec<RecordId> = local
            .iter()
            .map(|r| r.id)
            .filter(|id| !slice.keep.contains(id))
            .collect();

        for id in stale {
            match self.store.delete(id, &owner).await {
                Ok(()) => {
                    report.deleted += 1;
                    tracing::debug!(owner = %owner, id, "pruned record");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(owner = %owner, id, "prune failed: {}", e);
                }
            }
        }
    }

    async fn upsert(&self, record: &Record) -> Result<Upsert> {
        match self.store.get(record.id, &record.owner).await? {
            Some(_) => {
                self.store
                    .update(record.id, &record.owner, &record.title, &record.content)
                    .await?;
                Ok(Upsert::Updated)
            }
            None => {
                self.store.insert(record).await?;
                Ok(Upsert::Inserted)
            }
        }
    }
}

/// Validate entries and group them by owner, preserving first-seen order.
fn partition(
    batch: Vec<RemoteRecord>,
    scope: Option<&str>,
    report: &mut ReconcileReport,
) -> Vec<OwnerSlice> {
    let mut slices: Vec<OwnerSlice> = Vec::new();
    let mut index: HashMap<OwnerId, usize> = HashMap::new();

    let mut slice_for = |owner: &str, slices: &mut Vec<OwnerSlice>| -> usize {
        *index.entry(owner.to_string()).or_insert_with(|| {
            slices.push(OwnerSlice::new(owner));
            slices.len() - 1
        })
    };

    for entry in batch {
        let key = entry.key();

        if let (Some(scope), Some(key)) = (scope, &key) {
            if key.owner != scope {
                report.skipped += 1;
                tracing::warn!(owner = %key.owner, id = key.id, "entry belongs to another owner");
                continue;
            }
        }

        match Record::try_from(entry) {
            Ok(record) => {
                let i = slice_for(&record.owner, &mut slices);
                slices[i].keep.insert(record.id);
                slices[i].records.push(record);
            }
            Err(e) => {
                report.skipped += 1;
                match key {
                    // Keep the local copy of a record whose remote entry is malformed
                    Some(key) => {
                        tracing::warn!(owner = %key.owner, id = key.id, "skipping entry: {}", e);
                        let i = slice_for(&key.owner, &mut slices);
                        slices[i].keep.insert(key.id);
                    }
                    None => tracing::warn!("skipping entry: {}", e),
                }
            }
        }
    }

    slices
}

fn log_summary(report: &ReconcileReport) {
    tracing::info!(
        inserted = report.inserted,
        updated = report.updated,
        deleted = report.deleted,
        skipped = report.skipped,
        failed = report.failed,
        "reconciliation finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, MemoryStore, RecordKey};

    fn entry(id: i64, owner: &str, title: &str, content: &str) -> RemoteRecord {
        RemoteRecord {
            id: Some(id),
            owner: Some(owner.to_string()),
            title: Some(title.to_string()),
            content: Some(content.to_string()),
        }
    }

    fn record(id: i64, owner: &str, title: &str) -> Record {
        Record::new(id, owner, title, "content").unwrap()
    }

    #[tokio::test]
    async fn inserts_into_empty_store() {
        let store = MemoryStore::new();
        let report = Reconciler::new(&store)
            .reconcile(vec![entry(1, "dev1", "T", "C")])
            .await;

        assert_eq!(report.inserted, 1);
        assert!(report.is_clean());
        assert_eq!(
            store.list_by_owner("dev1").await.unwrap(),
            vec![Record::new(1, "dev1", "T", "C").unwrap()]
        );
    }

    #[tokio::test]
    async fn updates_in_place() {
        let store = MemoryStore::with_records(vec![Record::new(1, "dev1", "T", "C").unwrap()]);
        let report = Reconciler::new(&store)
            .reconcile(vec![entry(1, "dev1", "T2", "C2")])
            .await;

        assert_eq!(report.updated, 1);
        assert_eq!(report.inserted, 0);
        assert_eq!(
            store.list_all().await.unwrap(),
            vec![Record::new(1, "dev1", "T2", "C2").unwrap()]
        );
    }

    #[tokio::test]
    async fn prunes_records_missing_from_batch() {
        let store = MemoryStore::with_records(vec![record(1, "dev1", "a"), record(2, "dev1", "b")]);
        let report = Reconciler::new(&store)
            .reconcile(vec![entry(1, "dev1", "a", "content")])
            .await;

        assert_eq!(report.deleted, 1);
        let ids: Vec<_> = store
            .list_by_owner("dev1")
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1]);
    }

    #[tokio::test]
    async fn prune_is_scoped_to_owner() {
        let store = MemoryStore::with_records(vec![
            record(1, "dev1", "a"),
            record(2, "dev1", "b"),
            record(2, "dev2", "other"),
            record(5, "dev3", "untouched"),
        ]);
        Reconciler::new(&store)
            .reconcile(vec![entry(1, "dev1", "a", "c"), entry(1, "dev2", "x", "y")])
            .await;

        let keys: Vec<_> = store
            .list_all()
            .await
            .unwrap()
            .iter()
            .map(|r| r.key())
            .collect();
        assert_eq!(
            keys,
            vec![
                RecordKey::new(5, "dev3"),
                RecordKey::new(1, "dev1"),
                RecordKey::new(1, "dev2"),
            ]
        );
    }

    #[tokio::test]
    async fn skips_invalid_entries() {
        let store = MemoryStore::new();
        let mut missing_title = entry(2, "dev1", "", "C");
        missing_title.title = None;

        let report = Reconciler::new(&store)
            .reconcile(vec![
                entry(1, "dev1", "T", "C"),
                missing_title,
                entry(3, "dev1", "T3", "C3"),
            ])
            .await;

        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 1);
        assert!(!report.is_clean());
        assert!(store.get(2, "dev1").await.unwrap().is_none());
        assert!(store.get(3, "dev1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn malformed_entry_keeps_local_copy() {
        let store = MemoryStore::with_records(vec![record(1, "dev1", "a"), record(2, "dev1", "b")]);
        let mut malformed = entry(2, "dev1", "", "");
        malformed.content = None;

        let report = Reconciler::new(&store)
            .reconcile(vec![entry(1, "dev1", "a", "c"), malformed])
            .await;

        assert_eq!(report.deleted, 0);
        assert_eq!(report.skipped, 1);
        assert_eq!(store.get(2, "dev1").await.unwrap().unwrap().title, "b");
    }

    #[tokio::test]
    async fn empty_batch_is_noop() {
        let store = MemoryStore::with_records(vec![record(1, "dev1", "a")]);
        let report = Reconciler::new(&store).reconcile(vec![]).await;

        assert_eq!(report, ReconcileReport::default());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_entries_update_the_first() {
        let store = MemoryStore::new();
        let report = Reconciler::new(&store)
            .reconcile(vec![entry(1, "dev1", "first", "c"), entry(1, "dev1", "second", "c")])
            .await;

        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);
        assert_eq!(store.get(1, "dev1").await.unwrap().unwrap().title, "second");
    }

    #[tokio::test]
    async fn reconcile_owner_with_empty_batch_clears_owner() {
        let store = MemoryStore::with_records(vec![record(1, "dev1", "a"), record(1, "dev2", "b")]);
        let report = Reconciler::new(&store)
            .reconcile_owner("dev1", vec![])
            .await
            .unwrap();

        assert_eq!(report.deleted, 1);
        assert!(store.list_by_owner("dev1").await.unwrap().is_empty());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn reconcile_owner_skips_foreign_entries() {
        let store = MemoryStore::new();
        let report = Reconciler::new(&store)
            .reconcile_owner(
                "dev1",
                vec![entry(1, "dev1", "mine", "c"), entry(1, "dev2", "theirs", "c")],
            )
            .await
            .unwrap();

        assert_eq!(report.inserted, 1);
        assert_eq!(report.skipped, 1);
        assert!(store.get(1, "dev2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reconcile_owner_requires_owner() {
        let store = MemoryStore::new();
        let err = Reconciler::new(&store)
            .reconcile_owner(" ", vec![])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidArgument(_)));
    }
}
