//! Session-level errors.
//!
//! The `Display` strings are protocol surface: they travel to clients in
//! `error` frames, so changing them breaks client matching.

use thiserror::Error;

/// Everything a session can reject. Only [`SessionError::AuthFailure`]
/// closes the connection; the rest are replied and the connection stays.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Missing or invalid session token at connect time. Fatal.
    #[error("Authentication failed")]
    AuthFailure,

    /// The joined document does not exist.
    #[error("Document not found")]
    DocumentNotFound,

    /// The document exists but permission resolved to none.
    #[error("Access denied")]
    AccessDenied,

    /// Operation or cursor sent without a successful join.
    #[error("Not in a document room")]
    NotInRoom,

    /// Operation from a view-only participant.
    #[error("Read-only access")]
    ReadOnly,

    /// Malformed JSON or schema violation on an inbound frame.
    #[error("Invalid message format")]
    InvalidMessage,
}

impl SessionError {
    /// Whether this error terminates the connection.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::AuthFailure)
    }
}
