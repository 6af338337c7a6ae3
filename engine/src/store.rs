//! Record store contract and the in-memory implementation.
//!
//! Every backend orders listings by id descending, ties broken by owner.
//! Mutations are scoped by (id, owner): `update` on a missing pair fails
//! with [`Error::NotFound`], `delete` on a missing pair is a no-op, and both
//! refuse a blank owner with [`Error::InvalidArgument`].

use crate::{error::Result, Error, Record, RecordId, RecordKey};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};

/// Persistence for to-do records keyed by (id, owner).
pub trait RecordStore: Send + Sync {
    /// All records of all owners.
    fn list_all(&self) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Records belonging to `owner`.
    fn list_by_owner(&self, owner: &str) -> impl Future<Output = Result<Vec<Record>>> + Send;

    /// Look up a single record.
    fn get(
        &self,
        id: RecordId,
        owner: &str,
    ) -> impl Future<Output = Result<Option<Record>>> + Send;

    /// Persist a new record. Fails with [`Error::ConstraintViolation`] if
    /// the (id, owner) pair is taken.
    fn insert(&self, record: &Record) -> impl Future<Output = Result<()>> + Send;

    /// Overwrite title and content of an existing record.
    fn update(
        &self,
        id: RecordId,
        owner: &str,
        title: &str,
        content: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Remove a record.
    fn delete(&self, id: RecordId, owner: &str) -> impl Future<Output = Result<()>> + Send;

    /// Check that the backend can serve requests.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }
}

/// Reject mutations that carry no owner.
pub fn require_owner(owner: &str) -> Result<()> {
    if owner.trim().is_empty() {
        return Err(Error::InvalidArgument("owner is required".into()));
    }
    Ok(())
}

/// Sort records by id descending, then owner ascending.
pub fn sort_for_listing(records: &mut [Record]) {
    records.sort_by(|a, b| (Reverse(a.id), &a.owner).cmp(&(Reverse(b.id), &b.owner)));
}

/// In-memory record store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<BTreeMap<RecordKey, Record>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `records`. Later duplicates replace earlier ones.
    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        let map = records.into_iter().map(|r| (r.key(), r)).collect();
        Self {
            records: Mutex::new(map),
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Check if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<RecordKey, Record>>> {
        self.records
            .lock()
            .map_err(|_| Error::StorageUnavailable("memory store lock poisoned".into()))
    }

    fn listing(&self, owner: Option<&str>) -> Result<Vec<Record>> {
        let records = self.lock()?;
        let mut out: Vec<Record> = records
            .values()
            .filter(|r| owner.map_or(true, |o| r.owner == o))
            .cloned()
            .collect();
        sort_for_listing(&mut out);
        Ok(out)
    }
}

impl RecordStore for MemoryStore {
    async fn list_all(&self) -> Result<Vec<Record>> {
        self.listing(None)
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Record>> {
        self.listing(Some(owner))
    }

    async fn get(&self, id: RecordId, owner: &str) -> Result<Option<Record>> {
        let records = self.lock()?;
        Ok(records.get(&RecordKey::new(id, owner)).cloned())
    }

    async fn insert(&self, record: &Record) -> Result<()> {
        record.validate()?;
        let mut records = self.lock()?;
        let key = record.key();
        if records.contains_key(&key) {
            return Err(Error::ConstraintViolation(key));
        }
        records.insert(key, record.clone());
        Ok(())
    }

    async fn update(&self, id: RecordId, owner: &str, title: &str, content: &str) -> Result<()> {
        require_owner(owner)?;
        let mut records = self.lock()?;
        let key = RecordKey::new(id, owner);
        let record = records
            .get_mut(&key)
            .ok_or_else(|| Error::NotFound(key.clone()))?;
        record.title = title.to_string();
        record.content = content.to_string();
        Ok(())
    }

    async fn delete(&self, id: RecordId, owner: &str) -> Result<()> {
        require_owner(owner)?;
        let mut records = self.lock()?;
        records.remove(&RecordKey::new(id, owner));
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.lock().map(|_| ())
    }
}
