//! Per-connection protocol session.
//!
//! A session owns one authenticated connection's view of the world: its
//! identity, its optional share token, and the room it currently sits in.
//! It consumes decoded frames and produces messages on the connection's
//! bounded outbound queue. The transport is elsewhere (see [`crate::ws`]);
//! tests drive sessions with plain channels.

use std::sync::Arc;

use tracing::{debug, trace};

use vellum_model::Document;
use vellum_protocol::{decode_client, ClientMessage, Decoded, ServerMessage};

use crate::auth::{Authenticator, SessionUser};
use crate::error::SessionError;
use crate::registry::RoomRegistry;
use crate::room::OutboundSender;
use crate::storage::DocumentStore;

struct CurrentRoom {
    document_id: String,
    client_id: String,
    room: Arc<parking_lot::Mutex<crate::room::Room>>,
}

/// Protocol driver for one authenticated connection.
pub struct Session {
    registry: Arc<RoomRegistry>,
    store: Arc<dyn DocumentStore>,
    auth: Arc<dyn Authenticator>,
    user: SessionUser,
    share_token: Option<String>,
    outbound: OutboundSender,
    current: Option<CurrentRoom>,
}

impl Session {
    pub fn new(
        registry: Arc<RoomRegistry>,
        store: Arc<dyn DocumentStore>,
        auth: Arc<dyn Authenticator>,
        user: SessionUser,
        share_token: Option<String>,
        outbound: OutboundSender,
    ) -> Self {
        Self {
            registry,
            store,
            auth,
            user,
            share_token,
            outbound,
            current: None,
        }
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    /// The client id assigned by the current room, if joined.
    pub fn client_id(&self) -> Option<&str> {
        self.current.as_ref().map(|c| c.client_id.as_str())
    }

    /// Decode and dispatch one inbound text frame.
    pub async fn handle_frame(&mut self, frame: &str) {
        match decode_client(frame) {
            Ok(Decoded::Message(message)) => self.handle_message(message).await,
            Ok(Decoded::Ignored) => {
                trace!(user_id = %self.user.user_id, "ignoring unknown message type");
            }
            Err(err) => {
                debug!(user_id = %self.user.user_id, %err, "undecodable frame");
                self.send_error(&SessionError::InvalidMessage);
            }
        }
    }

    pub async fn handle_message(&mut self, message: ClientMessage) {
        let result = match message {
            ClientMessage::Join { document_id } => self.handle_join(&document_id).await,
            ClientMessage::Operation {
                document_id,
                version,
                operation,
                ..
            } => self.handle_operation(&document_id, version, operation),
            ClientMessage::Cursor {
                document_id,
                cursor,
                anchor,
            } => self.handle_cursor(&document_id, cursor, anchor),
        };
        if let Err(err) = result {
            self.send_error(&err);
        }
    }

    /// Join a document's room, implicitly leaving the previous one.
    async fn handle_join(&mut self, document_id: &str) -> Result<(), SessionError> {
        let stored = self
            .store
            .fetch(document_id)
            .await
            .map_err(|_| SessionError::DocumentNotFound)?;
        let permission = self
            .auth
            .permission(&self.user.user_id, document_id, self.share_token.as_deref())
            .await;
        if !permission.can_view() {
            return Err(SessionError::AccessDenied);
        }

        self.leave_current();

        let room = self.registry.get_or_create(document_id, || {
            Document::from_content_or_default(&stored.id, &stored.title, &stored.content)
        });
        let (client_id, users, version) = {
            let mut room = room.lock();
            let (client_id, users) = room.join(&self.user, permission, self.outbound.clone());
            (client_id, users, room.version())
        };
        self.current = Some(CurrentRoom {
            document_id: document_id.to_string(),
            client_id,
            room,
        });
        self.send(ServerMessage::Joined {
            document_id: document_id.to_string(),
            version,
            users,
        });
        Ok(())
    }

    fn handle_operation(
        &mut self,
        document_id: &str,
        base_version: u64,
        operation: vellum_model::Operation,
    ) -> Result<(), SessionError> {
        let current = self
            .current
            .as_ref()
            .filter(|c| c.document_id == document_id)
            .ok_or(SessionError::NotInRoom)?;
        current
            .room
            .lock()
            .handle_operation(&current.client_id, base_version, &operation)
    }

    fn handle_cursor(
        &mut self,
        document_id: &str,
        cursor: Option<vellum_model::Position>,
        anchor: Option<vellum_model::Position>,
    ) -> Result<(), SessionError> {
        let current = self
            .current
            .as_ref()
            .filter(|c| c.document_id == document_id)
            .ok_or(SessionError::NotInRoom)?;
        current
            .room
            .lock()
            .handle_cursor(&current.client_id, cursor, anchor)
    }

    /// Leave the current room, destroying it if this was the last
    /// participant. Also the disconnect path.
    pub fn leave_current(&mut self) {
        if let Some(current) = self.current.take() {
            let now_empty = current.room.lock().leave(&current.client_id);
            if now_empty {
                self.registry.remove_if_empty(&current.document_id);
            }
        }
    }

    fn send(&self, message: ServerMessage) {
        // Bounded queue: a stalled connection loses frames here and is
        // dropped by the room on its next broadcast.
        let _ = self.outbound.try_send(message);
    }

    fn send_error(&self, err: &SessionError) {
        self.send(ServerMessage::Error {
            message: err.to_string(),
        });
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.leave_current();
    }
}
