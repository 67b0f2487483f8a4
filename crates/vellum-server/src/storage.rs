//! Storage collaborator interface.
//!
//! The room needs exactly one thing from storage: the persisted document a
//! first joiner brings to life. Persistence of edits runs through the
//! clients' save path and never involves the room.

use async_trait::async_trait;
use thiserror::Error;

/// A document as persisted: identity plus the serialized block array.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub title: String,
    /// Serialized block array; parsed by the room at creation, with a
    /// fallback to one empty paragraph when unparseable.
    pub content: String,
    pub owner_id: Option<String>,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("document not found")]
    NotFound,

    #[error("storage backend: {0}")]
    Backend(String),
}

/// The storage collaborator.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<StoredDocument, StoreError>;
}
