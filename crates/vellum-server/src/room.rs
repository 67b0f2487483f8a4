//! The per-document room.
//!
//! A room is the authority for one live document: it owns the document
//! state, assigns versions, rebases incoming operations against the
//! history a client had not yet seen, and fans results out to the other
//! participants. Everything here is synchronous and runs under the
//! registry's per-room mutex — transform and apply never yield, so a
//! version is assigned atomically with its application.

use std::collections::{HashMap, VecDeque};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use vellum_model::{apply, Document, Operation, Position};
use vellum_ot::{transform_single, OpContext};
use vellum_protocol::{Participant, ServerMessage};

use crate::auth::{Permission, SessionUser};
use crate::constants::MAX_HISTORY_LENGTH;
use crate::error::SessionError;

/// Outbound queue handle for one connection. Bounded: a client that stops
/// draining gets dropped rather than buffering without limit.
pub type OutboundSender = mpsc::Sender<ServerMessage>;

/// One sequenced operation, as applied, with its apply-time context.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub op: Operation,
    pub ctx: OpContext,
    pub client_id: String,
    pub version: u64,
}

struct RoomClient {
    user_id: String,
    display_name: String,
    color: String,
    permission: Permission,
    sender: OutboundSender,
}

/// Authoritative state for one live document.
pub struct Room {
    document_id: String,
    version: u64,
    document: Document,
    history: VecDeque<HistoryEntry>,
    clients: HashMap<String, RoomClient>,
    client_seq: u64,
}

impl Room {
    pub fn new(document_id: impl Into<String>, document: Document) -> Self {
        let document_id = document_id.into();
        info!(document_id = %document_id, "room created");
        Self {
            document_id,
            version: 0,
            document,
            history: VecDeque::new(),
            clients: HashMap::new(),
            client_seq: 0,
        }
    }

    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Add a participant. Returns the room-unique client id and the other
    /// participants for the `joined` reply; announces the newcomer to the
    /// rest of the room.
    pub fn join(
        &mut self,
        user: &SessionUser,
        permission: Permission,
        sender: OutboundSender,
    ) -> (String, Vec<Participant>) {
        self.client_seq += 1;
        let client_id = format!("{}#{}", user.user_id, self.client_seq);

        let others: Vec<Participant> = self
            .clients
            .values()
            .map(|c| Participant {
                user_id: c.user_id.clone(),
                display_name: c.display_name.clone(),
                color: c.color.clone(),
            })
            .collect();

        self.broadcast_except(
            &client_id,
            &ServerMessage::UserJoined {
                document_id: self.document_id.clone(),
                user_id: user.user_id.clone(),
                display_name: user.display_name.clone(),
                color: user.color.clone(),
            },
        );

        self.clients.insert(
            client_id.clone(),
            RoomClient {
                user_id: user.user_id.clone(),
                display_name: user.display_name.clone(),
                color: user.color.clone(),
                permission,
                sender,
            },
        );
        info!(
            document_id = %self.document_id,
            client_id = %client_id,
            participants = self.clients.len(),
            "participant joined"
        );
        (client_id, others)
    }

    /// Remove a participant and announce it. Returns true when the room is
    /// now empty and should be destroyed.
    pub fn leave(&mut self, client_id: &str) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!(
                document_id = %self.document_id,
                client_id = %client_id,
                participants = self.clients.len(),
                "participant left"
            );
            self.broadcast_except(
                client_id,
                &ServerMessage::UserLeft {
                    document_id: self.document_id.clone(),
                    user_id: client.user_id,
                },
            );
        }
        self.clients.is_empty()
    }

    /// Sequence one client operation: rebase it over every history entry
    /// past the client's base version, apply it, assign the next version,
    /// ack the sender, and broadcast to everyone else.
    pub fn handle_operation(
        &mut self,
        client_id: &str,
        base_version: u64,
        op: &Operation,
    ) -> Result<(), SessionError> {
        let client = self
            .clients
            .get(client_id)
            .ok_or(SessionError::NotInRoom)?;
        if !client.permission.can_edit() {
            return Err(SessionError::ReadOnly);
        }

        if self
            .history
            .front()
            .is_some_and(|oldest| base_version + 1 < oldest.version)
        {
            // Base fell out of the history window: rebase over what
            // remains, best effort. The client detects divergence and
            // rejoins.
            warn!(
                document_id = %self.document_id,
                client_id = %client_id,
                base_version,
                "stale base version, applying best-effort"
            );
        }

        let mut transformed = op.clone();
        for entry in self.history.iter().filter(|e| e.version > base_version) {
            transformed = transform_single(&transformed, &entry.op, entry.ctx);
        }

        let ctx = OpContext::capture(&self.document, &transformed);
        self.document = apply(&self.document, &transformed);
        self.version += 1;
        debug!(
            document_id = %self.document_id,
            client_id = %client_id,
            version = self.version,
            kind = transformed.kind(),
            noop = transformed.is_noop(),
            "operation applied"
        );

        self.history.push_back(HistoryEntry {
            op: transformed.clone(),
            ctx,
            client_id: client_id.to_string(),
            version: self.version,
        });
        while self.history.len() > MAX_HISTORY_LENGTH {
            self.history.pop_front();
        }

        let user_id = client.user_id.clone();
        self.send_to(
            client_id,
            &ServerMessage::Ack {
                document_id: self.document_id.clone(),
                version: self.version,
            },
        );
        self.broadcast_except(
            client_id,
            &ServerMessage::Operation {
                document_id: self.document_id.clone(),
                client_id: client_id.to_string(),
                user_id,
                version: self.version,
                operation: transformed,
            },
        );
        Ok(())
    }

    /// Relay ephemeral cursor state to the other participants. Nothing is
    /// stored; presence dies with the connection.
    pub fn handle_cursor(
        &mut self,
        client_id: &str,
        cursor: Option<Position>,
        anchor: Option<Position>,
    ) -> Result<(), SessionError> {
        let client = self
            .clients
            .get(client_id)
            .ok_or(SessionError::NotInRoom)?;
        let message = ServerMessage::Cursor {
            document_id: self.document_id.clone(),
            user_id: client.user_id.clone(),
            display_name: client.display_name.clone(),
            color: client.color.clone(),
            cursor,
            anchor,
        };
        self.broadcast_except(client_id, &message);
        Ok(())
    }

    fn send_to(&mut self, client_id: &str, message: &ServerMessage) {
        let Some(client) = self.clients.get(client_id) else {
            return;
        };
        if client.sender.try_send(message.clone()).is_err() {
            warn!(
                document_id = %self.document_id,
                client_id = %client_id,
                "outbound queue full or closed, dropping participant"
            );
            self.clients.remove(client_id);
        }
    }

    fn broadcast_except(&mut self, except: &str, message: &ServerMessage) {
        let mut stalled: Vec<String> = Vec::new();
        for (client_id, client) in &self.clients {
            if client_id == except {
                continue;
            }
            if client.sender.try_send(message.clone()).is_err() {
                stalled.push(client_id.clone());
            }
        }
        for client_id in stalled {
            warn!(
                document_id = %self.document_id,
                client_id = %client_id,
                "outbound queue full or closed, dropping participant"
            );
            self.clients.remove(&client_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::Receiver;
    use vellum_model::Range;

    fn user(n: &str) -> SessionUser {
        SessionUser {
            user_id: format!("u-{n}"),
            display_name: n.to_string(),
            color: "#336699".into(),
        }
    }

    fn test_room(text: &str) -> Room {
        Room::new("doc-1", Document::with_text("doc-1", "T", text))
    }

    fn join(room: &mut Room, name: &str, permission: Permission) -> (String, Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(64);
        let (client_id, _) = room.join(&user(name), permission, tx);
        (client_id, rx)
    }

    fn ins(b: u32, o: u32, text: &str) -> Operation {
        Operation::InsertText {
            position: Position::new(b, o),
            text: text.into(),
        }
    }

    fn drain(rx: &mut Receiver<ServerMessage>) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            out.push(msg);
        }
        out
    }

    // ── sequencing ──────────────────────────────────────────────────────

    #[test]
    fn test_operation_acks_sender_and_broadcasts_peers() {
        let mut room = test_room("AB");
        let (amy, mut amy_rx) = join(&mut room, "amy", Permission::Edit);
        let (_bob, mut bob_rx) = join(&mut room, "bob", Permission::Edit);
        drain(&mut amy_rx);

        room.handle_operation(&amy, 0, &ins(0, 1, "X")).unwrap();

        assert_eq!(room.version(), 1);
        assert_eq!(room.document().block_text(0).unwrap(), "AXB");

        let amy_msgs = drain(&mut amy_rx);
        assert!(matches!(
            amy_msgs.as_slice(),
            [ServerMessage::Ack { version: 1, .. }]
        ));
        let bob_msgs = drain(&mut bob_rx);
        assert!(matches!(
            bob_msgs.as_slice(),
            [ServerMessage::Operation { version: 1, .. }]
        ));
    }

    #[test]
    fn test_same_base_ops_are_rebased() {
        // Two clients at base 0 insert at the head; the second is
        // transformed over the first and the document reads "AB".
        let mut room = test_room("...");
        let (amy, mut amy_rx) = join(&mut room, "amy", Permission::Edit);
        let (bob, mut bob_rx) = join(&mut room, "bob", Permission::Edit);

        room.handle_operation(&amy, 0, &ins(0, 0, "A")).unwrap();
        room.handle_operation(&bob, 0, &ins(0, 0, "B")).unwrap();

        assert_eq!(room.document().block_text(0).unwrap(), "AB...");

        // Bob's broadcast copy of Amy's op plus his own ack.
        let bob_msgs = drain(&mut bob_rx);
        assert_eq!(bob_msgs.len(), 2);
        // Amy saw Bob join, got her ack, then Bob's op already transformed
        // to offset 1.
        let amy_msgs = drain(&mut amy_rx);
        assert_eq!(amy_msgs.len(), 3);
        let ServerMessage::Operation { operation, version, .. } = &amy_msgs[2] else {
            panic!("expected bob's operation, got {amy_msgs:?}");
        };
        assert_eq!(*version, 2);
        assert_eq!(operation, &ins(0, 1, "B"));
    }

    #[test]
    fn test_view_permission_cannot_edit() {
        let mut room = test_room("AB");
        let (viewer, mut rx) = join(&mut room, "viewer", Permission::View);
        let err = room.handle_operation(&viewer, 0, &ins(0, 0, "X"));
        assert_eq!(err, Err(SessionError::ReadOnly));
        assert_eq!(room.version(), 0);
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_unknown_client_is_rejected() {
        let mut room = test_room("AB");
        let err = room.handle_operation("ghost#1", 0, &ins(0, 0, "X"));
        assert_eq!(err, Err(SessionError::NotInRoom));
    }

    #[test]
    fn test_version_is_strictly_increasing_and_history_contiguous() {
        let mut room = test_room("");
        let (amy, _rx) = join(&mut room, "amy", Permission::Edit);
        for i in 0..10 {
            room.handle_operation(&amy, i, &ins(0, 0, "x")).unwrap();
        }
        assert_eq!(room.version(), 10);
        let versions: Vec<u64> = room.history.iter().map(|e| e.version).collect();
        assert_eq!(versions, (1..=10).collect::<Vec<_>>());
    }

    #[test]
    fn test_history_is_pruned() {
        let mut room = test_room("");
        let (amy, mut rx) = join(&mut room, "amy", Permission::Edit);
        for i in 0..(MAX_HISTORY_LENGTH as u64 + 50) {
            room.handle_operation(&amy, i, &ins(0, 0, "x")).unwrap();
            drain(&mut rx);
        }
        assert_eq!(room.history_len(), MAX_HISTORY_LENGTH);
        assert_eq!(room.version(), MAX_HISTORY_LENGTH as u64 + 50);
    }

    #[test]
    fn test_stale_base_still_applies_best_effort() {
        let mut room = test_room("");
        let (amy, mut rx) = join(&mut room, "amy", Permission::Edit);
        for i in 0..(MAX_HISTORY_LENGTH as u64 + 10) {
            room.handle_operation(&amy, i, &ins(0, 0, "x")).unwrap();
            drain(&mut rx);
        }
        // Base 0 predates the oldest retained entry; the op is transformed
        // against the surviving tail and the version still advances.
        let before = room.version();
        room.handle_operation(&amy, 0, &ins(0, 0, "y")).unwrap();
        assert_eq!(room.version(), before + 1);
    }

    #[test]
    fn test_transformed_noop_still_increments_version() {
        let mut room = test_room("abcdef");
        let (amy, _arx) = join(&mut room, "amy", Permission::Edit);
        let (bob, _brx) = join(&mut room, "bob", Permission::Edit);
        room.handle_operation(&amy, 0, &Operation::DeleteText {
            range: Range::new(Position::new(0, 0), Position::new(0, 6)),
        })
        .unwrap();
        // Bob's insert was strictly inside the deleted range: it applies
        // as a no-op but still gets a version and an ack.
        room.handle_operation(&bob, 0, &ins(0, 3, "Z")).unwrap();
        assert_eq!(room.version(), 2);
        assert_eq!(room.document().block_text(0).unwrap(), "");
    }

    // ── presence ────────────────────────────────────────────────────────

    #[test]
    fn test_join_announces_to_existing_participants() {
        let mut room = test_room("AB");
        let (_amy, mut amy_rx) = join(&mut room, "amy", Permission::Edit);
        let ((_bob_id, others), _) = {
            let (tx, rx) = mpsc::channel(8);
            (room.join(&user("bob"), Permission::Edit, tx), rx)
        };
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].display_name, "amy");
        let msgs = drain(&mut amy_rx);
        assert!(matches!(msgs.as_slice(), [ServerMessage::UserJoined { .. }]));
    }

    #[test]
    fn test_leave_announces_and_reports_empty() {
        let mut room = test_room("AB");
        let (amy, _amy_rx) = join(&mut room, "amy", Permission::Edit);
        let (bob, mut bob_rx) = join(&mut room, "bob", Permission::Edit);

        assert!(!room.leave(&amy));
        let msgs = drain(&mut bob_rx);
        assert!(matches!(msgs.as_slice(), [ServerMessage::UserLeft { .. }]));
        assert!(room.leave(&bob));
    }

    #[test]
    fn test_cursor_is_broadcast_not_stored() {
        let mut room = test_room("AB");
        let (amy, mut amy_rx) = join(&mut room, "amy", Permission::Edit);
        let (_bob, mut bob_rx) = join(&mut room, "bob", Permission::View);
        drain(&mut amy_rx);

        room.handle_cursor(&amy, Some(Position::new(0, 1)), None)
            .unwrap();

        assert!(drain(&mut amy_rx).is_empty());
        let msgs = drain(&mut bob_rx);
        let [ServerMessage::Cursor { cursor, anchor, display_name, .. }] = msgs.as_slice() else {
            panic!("expected cursor broadcast, got {msgs:?}");
        };
        assert_eq!(*cursor, Some(Position::new(0, 1)));
        assert_eq!(*anchor, None);
        assert_eq!(display_name, "amy");
    }

    #[test]
    fn test_client_ids_are_room_unique_per_user() {
        let mut room = test_room("AB");
        let (a1, _r1) = join(&mut room, "amy", Permission::Edit);
        let (a2, _r2) = join(&mut room, "amy", Permission::Edit);
        assert_ne!(a1, a2);
        assert!(a1.starts_with("u-amy#"));
    }

    // ── backpressure ────────────────────────────────────────────────────

    #[test]
    fn test_stalled_client_is_dropped() {
        let mut room = test_room("");
        let (amy, mut amy_rx) = join(&mut room, "amy", Permission::Edit);
        // Bob's queue holds a single message and he never drains it.
        let (tx, _bob_rx) = mpsc::channel(1);
        let (_bob, _) = room.join(&user("bob"), Permission::Edit, tx);
        drain(&mut amy_rx);
        assert_eq!(room.client_count(), 2);

        room.handle_operation(&amy, 0, &ins(0, 0, "a")).unwrap();
        room.handle_operation(&amy, 1, &ins(0, 0, "b")).unwrap();

        assert_eq!(room.client_count(), 1);
    }
}
