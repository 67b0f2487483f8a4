//! Authentication and permission collaborator interface.
//!
//! The core never stores credentials; it consumes two capabilities:
//! resolving a connection token to a user, and resolving a
//! (user, document, share token) triple to a permission level.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Access level a participant holds on a document.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// No access; join is refused.
    #[default]
    None,
    /// May watch and send cursors, but not edit.
    View,
    /// May edit.
    Edit,
    /// Owner; edit plus administrative rights outside this crate's scope.
    Owner,
}

impl Permission {
    pub fn can_view(&self) -> bool {
        *self != Permission::None
    }

    pub fn can_edit(&self) -> bool {
        matches!(self, Permission::Edit | Permission::Owner)
    }
}

/// Identity attached to an authenticated connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: String,
    pub display_name: String,
    /// Presence color assigned at signup; carried into cursor broadcasts.
    pub color: String,
}

/// The auth/permission collaborator.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Resolve a bearer session token to a user, or `None` when the token
    /// is missing, expired, or unknown.
    async fn session_user(&self, token: &str) -> Option<SessionUser>;

    /// Resolve the permission `user_id` holds on `document_id`, taking an
    /// optional share token into account.
    async fn permission(
        &self,
        user_id: &str,
        document_id: &str,
        share_token: Option<&str>,
    ) -> Permission;
}
