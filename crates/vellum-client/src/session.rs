//! The per-document sync session.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use vellum_model::{apply, Document, Operation};
use vellum_ot::{transform_pair, OpContext};
use vellum_protocol::ClientMessage;

/// A locally applied operation the server has not acknowledged yet,
/// together with the context measured when it was applied.
#[derive(Clone, Debug)]
pub struct PendingOp {
    pub op: Operation,
    pub ctx: OpContext,
}

/// Sync state for one document on one client.
///
/// The session keeps two documents: `document` is what the editor renders
/// (confirmed state plus unacknowledged local edits), `confirmed` is the
/// server's state at `base_version` and is what incoming operations and
/// their contexts are measured against.
#[derive(Clone, Debug)]
pub struct SyncSession {
    document_id: String,
    client_id: String,
    document: Document,
    confirmed: Document,
    base_version: u64,
    in_flight: Option<PendingOp>,
    queue: VecDeque<PendingOp>,
}

impl SyncSession {
    /// New detached session; call [`SyncSession::joined`] with the server
    /// snapshot before editing.
    pub fn new(document_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        let document_id = document_id.into();
        let empty = Document::new(document_id.clone(), String::new());
        Self {
            document_id,
            client_id: client_id.into(),
            document: empty.clone(),
            confirmed: empty,
            base_version: 0,
            in_flight: None,
            queue: VecDeque::new(),
        }
    }

    /// Reset to the server snapshot delivered by `joined`. Unacknowledged
    /// local edits are discarded — rejoin is a resync, not a merge.
    pub fn joined(&mut self, version: u64, document: Document) {
        if self.in_flight.is_some() || !self.queue.is_empty() {
            warn!(
                document_id = %self.document_id,
                dropped = self.pending_count(),
                "rejoin discards unacknowledged local edits"
            );
        }
        self.document = document.clone();
        self.confirmed = document;
        self.base_version = version;
        self.in_flight = None;
        self.queue.clear();
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Unacknowledged local operations (in flight plus queued).
    pub fn pending_count(&self) -> usize {
        usize::from(self.in_flight.is_some()) + self.queue.len()
    }

    /// Apply a local edit and return the wire message to send now, if the
    /// send slot is free.
    pub fn local_edit(&mut self, op: Operation) -> Option<ClientMessage> {
        let ctx = OpContext::capture(&self.document, &op);
        self.document = apply(&self.document, &op);
        self.queue.push_back(PendingOp { op, ctx });
        self.next_outgoing()
    }

    /// Server acknowledged our in-flight operation at `version`. Returns
    /// the next queued operation to send, if any.
    pub fn server_ack(&mut self, version: u64) -> Option<ClientMessage> {
        let Some(acked) = self.in_flight.take() else {
            warn!(version, "ack with nothing in flight");
            return None;
        };
        // Everything sequenced before this version was already delivered
        // and folded into the pending chain, so the in-flight op as we
        // hold it now is exactly what the server applied.
        self.confirmed = apply(&self.confirmed, &acked.op);
        self.base_version = version;
        trace!(version, "operation acknowledged");
        self.next_outgoing()
    }

    /// Fold in a sequenced operation from another participant.
    pub fn remote_operation(&mut self, version: u64, op: &Operation) {
        debug!(version, kind = op.kind(), "incoming remote operation");

        // Rebase the pending chain over the incoming op, stair-stepping:
        // at each step `base` is the document the pending op was generated
        // against, `incoming` is the server op transformed over the
        // pendings consumed so far. The server op wins ties.
        let mut base = self.confirmed.clone();
        let mut incoming = op.clone();
        let had_in_flight = self.in_flight.is_some();
        let pending: Vec<PendingOp> = self
            .in_flight
            .take()
            .into_iter()
            .chain(self.queue.drain(..))
            .collect();

        let mut rebased: Vec<Operation> = Vec::with_capacity(pending.len());
        for p in &pending {
            let (incoming_next, p_next) = transform_pair(&incoming, &p.op, &base);
            base = apply(&base, &p.op);
            incoming = incoming_next;
            rebased.push(p_next);
        }

        // Advance the confirmed state and rebuild the visible document
        // from it plus the rebased pendings, recapturing their contexts.
        self.confirmed = apply(&self.confirmed, op);
        self.base_version = version;

        let mut roll = self.confirmed.clone();
        let mut new_pending = VecDeque::with_capacity(rebased.len());
        for op in rebased {
            let ctx = OpContext::capture(&roll, &op);
            roll = apply(&roll, &op);
            new_pending.push_back(PendingOp { op, ctx });
        }
        self.document = roll;
        self.queue = new_pending;
        if had_in_flight {
            // The previously sent op stays in flight in its rebased form;
            // the server will transform it the same way on its side.
            self.in_flight = self.queue.pop_front();
        }
    }

    fn next_outgoing(&mut self) -> Option<ClientMessage> {
        if self.in_flight.is_some() {
            return None;
        }
        let next = self.queue.pop_front()?;
        let message = ClientMessage::Operation {
            document_id: self.document_id.clone(),
            client_id: self.client_id.clone(),
            version: self.base_version,
            operation: next.op.clone(),
        };
        self.in_flight = Some(next);
        Some(message)
    }
}
