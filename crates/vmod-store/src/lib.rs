//! Video record persistence seam.
//!
//! The pipeline reads and writes records only through [`VideoStore`];
//! upload handling and deletion belong to external collaborators.
//! [`MemoryStore`] is the reference implementation used by tests and the
//! self-check binary.

pub mod error;
pub mod memory;

use async_trait::async_trait;

use vmod_models::{VideoId, VideoRecord};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

/// In-place mutation applied to a stored record by [`VideoStore::update`].
pub type RecordMutation = Box<dyn FnOnce(&mut VideoRecord) + Send>;

/// Persistent video record store.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Fetch a record by id, `None` when it does not exist.
    async fn get(&self, id: &VideoId) -> StoreResult<Option<VideoRecord>>;

    /// Persist a record, overwriting the full document.
    async fn save(&self, record: &VideoRecord) -> StoreResult<()>;

    /// Atomically mutate the stored record and return the result, `None`
    /// when it does not exist.
    ///
    /// Unlike `get` + `save`, no other writer can interleave between the
    /// read and the write, so concurrent single-field updates (thumbnail)
    /// and lifecycle writes cannot lose each other's changes. Backends
    /// without native read-modify-write implement this with a masked merge
    /// or an update precondition.
    async fn update(&self, id: &VideoId, mutate: RecordMutation)
        -> StoreResult<Option<VideoRecord>>;
}
