//! In-memory collaborator implementations.
//!
//! Back the server binary and the test suite. A deployment swaps these for
//! real storage/auth behind the same traits.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::auth::{Authenticator, Permission, SessionUser};
use crate::storage::{DocumentStore, StoreError, StoredDocument};

/// In-memory document table.
#[derive(Default)]
pub struct MemoryStore {
    documents: DashMap<String, StoredDocument>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, doc: StoredDocument) {
        self.documents.insert(doc.id.clone(), doc);
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn fetch(&self, id: &str) -> Result<StoredDocument, StoreError> {
        self.documents
            .get(id)
            .map(|entry| entry.clone())
            .ok_or(StoreError::NotFound)
    }
}

/// In-memory token and permission tables implementing the standard rules:
/// the owner gets `Owner`, ownerless documents are editable by anyone, a
/// valid share token grants its configured level, otherwise no access.
#[derive(Default)]
pub struct MemoryAuth {
    tokens: DashMap<String, SessionUser>,
    owners: DashMap<String, String>,
    shares: DashMap<String, (String, Permission)>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&self, token: impl Into<String>, user: SessionUser) {
        self.tokens.insert(token.into(), user);
    }

    pub fn set_owner(&self, document_id: impl Into<String>, user_id: impl Into<String>) {
        self.owners.insert(document_id.into(), user_id.into());
    }

    pub fn add_share(
        &self,
        share_token: impl Into<String>,
        document_id: impl Into<String>,
        level: Permission,
    ) {
        self.shares
            .insert(share_token.into(), (document_id.into(), level));
    }
}

#[async_trait]
impl Authenticator for MemoryAuth {
    async fn session_user(&self, token: &str) -> Option<SessionUser> {
        self.tokens.get(token).map(|entry| entry.clone())
    }

    async fn permission(
        &self,
        user_id: &str,
        document_id: &str,
        share_token: Option<&str>,
    ) -> Permission {
        match self.owners.get(document_id) {
            Some(owner) if owner.value() == user_id => Permission::Owner,
            None => Permission::Edit,
            Some(_) => {
                if let Some((doc, level)) = share_token.and_then(|t| {
                    self.shares.get(t).map(|entry| entry.clone())
                }) {
                    if doc == document_id {
                        return level;
                    }
                }
                Permission::None
            }
        }
    }
}
