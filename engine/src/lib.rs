//! # todosync engine
//!
//! The core of a device-scoped to-do list that syncs through a server.
//!
//! This crate defines the record model, the [`RecordStore`] contract and the
//! [`Reconciler`] that merges a remote batch into local state. It performs no
//! IO itself: storage backends implement [`RecordStore`], and the caller
//! fetches remote batches.
//!
//! ## Core Concepts
//!
//! ### Records
//!
//! A [`Record`] is identified by the pair (id, owner). The owner is an opaque
//! device identifier (see [`derive_owner_id`]); ids are only unique per owner.
//! Records can be edited and deleted only through their owner.
//!
//! ### Reconciliation
//!
//! A pull returns the server's full record set. [`Reconciler::reconcile`]
//! upserts every valid entry and prunes local records the batch no longer
//! holds, owner by owner. The server wins; there is no conflict resolution.
//!
//! ## Quick Start
//!
//! ```rust
//! use todosync_engine::{MemoryStore, Reconciler, RecordStore, RemoteRecord};
//! use serde_json::json;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let store = MemoryStore::new();
//!
//! let batch = vec![RemoteRecord::from(json!({
//!     "id": 1,
//!     "device": "pixel-7",
//!     "title": "Groceries",
//!     "content": "Milk, eggs",
//! }))];
//!
//! let report = Reconciler::new(&store).reconcile(batch).await;
//! assert_eq!(report.inserted, 1);
//!
//! let mine = store.list_by_owner("pixel-7").await.unwrap();
//! assert_eq!(mine[0].title, "Groceries");
//! # });
//! # }
//! ```

pub mod error;
pub mod owner;
pub mod reconcile;
pub mod record;
pub mod store;

// Re-export main types at crate root
pub use error::{Error, Result};
pub use owner::{derive_owner_id, DeviceMetadata};
pub use reconcile::{ReconcileReport, Reconciler};
pub use record::{next_local_id, normalize_text, Record, RecordKey, RemoteRecord};
pub use store::{MemoryStore, RecordStore};

/// Type aliases for clarity
pub type RecordId = i64;
pub type OwnerId = String;
