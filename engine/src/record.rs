//! Record types for to-do entries.

use crate::{Error, OwnerId, RecordId, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Composite identity of a record. `id` alone is only unique per owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub id: RecordId,
    pub owner: OwnerId,
}

impl RecordKey {
    pub fn new(id: RecordId, owner: impl Into<OwnerId>) -> Self {
        Self {
            id,
            owner: owner.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.id)
    }
}

/// A to-do record.
///
/// On the wire and in storage the owner is carried as `device`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// Caller-assigned id, unique together with `owner`
    pub id: RecordId,
    /// Opaque identifier of the device that created the record
    #[serde(rename = "device")]
    pub owner: OwnerId,
    pub title: String,
    pub content: String,
}

impl Record {
    /// Create a validated record.
    pub fn new(
        id: RecordId,
        owner: impl Into<OwnerId>,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self> {
        let record = Self {
            id,
            owner: owner.into(),
            title: title.into(),
            content: content.into(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the field rules every persisted record must satisfy.
    pub fn validate(&self) -> Result<()> {
        check_id(self.id)?;
        check_owner(&self.owner)?;
        check_text("title", &self.title)?;
        check_text("content", &self.content)?;
        Ok(())
    }

    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.id, self.owner.clone())
    }

    /// Whether `owner` may edit or delete this record.
    pub fn is_owned_by(&self, owner: &str) -> bool {
        self.owner == owner
    }
}

/// A batch entry as received from the remote side.
///
/// Every field is optional; [`Record::try_from`] is the validation boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default, rename = "device")]
    pub owner: Option<OwnerId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl RemoteRecord {
    /// The entry's identity, when both id and owner are usable.
    pub fn key(&self) -> Option<RecordKey> {
        let id = self.id.filter(|id| *id >= 1)?;
        let owner = self.owner.as_deref().filter(|o| !o.trim().is_empty())?;
        Some(RecordKey::new(id, owner))
    }
}

impl From<Record> for RemoteRecord {
    fn from(record: Record) -> Self {
        Self {
            id: Some(record.id),
            owner: Some(record.owner),
            title: Some(record.title),
            content: Some(record.content),
        }
    }
}

/// Lenient decoding: fields that are missing or of the wrong type become
/// `None` instead of failing the whole batch.
impl From<serde_json::Value> for RemoteRecord {
    fn from(value: serde_json::Value) -> Self {
        let text = |name: &str| value.get(name).and_then(|v| v.as_str()).map(String::from);
        Self {
            id: value.get("id").and_then(|v| v.as_i64()),
            owner: text("device"),
            title: text("title"),
            content: text("content"),
        }
    }
}

impl TryFrom<RemoteRecord> for Record {
    type Error = Error;

    fn try_from(remote: RemoteRecord) -> Result<Self> {
        let id = remote.id.ok_or_else(|| missing("id"))?;
        let owner = remote.owner.ok_or_else(|| missing("device"))?;
        let title = remote.title.ok_or_else(|| missing("title"))?;
        let content = remote.content.ok_or_else(|| missing("content"))?;
        Record::new(id, owner, title, content)
    }
}

/// Next id for a locally created record: one past the owner's maximum.
pub fn next_local_id(owned: &[Record]) -> RecordId {
    owned.iter().map(|r| r.id).max().map_or(1, |max| max + 1)
}

/// Trim user input, rejecting values that are empty afterwards.
pub fn normalize_text(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}

fn missing(field: &str) -> Error {
    Error::Validation(format!("missing field '{field}'"))
}

fn check_id(id: RecordId) -> Result<()> {
    if id < 1 {
        return Err(Error::Validation(format!("id must be positive, got {id}")));
    }
    Ok(())
}

fn check_owner(owner: &str) -> Result<()> {
    if owner.trim().is_empty() {
        return Err(Error::Validation("device must not be empty".into()));
    }
    Ok(())
}

fn check_text(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}
