//! Client-side sync session.
//!
//! A [`SyncSession`] owns the local copy of one document and the
//! optimistic-concurrency state around it:
//!
//! - local edits apply immediately and queue for the server, at most one
//!   in flight at a time;
//! - incoming server operations are rebased over the unacknowledged local
//!   ops (the server side wins ties — it is already sequenced) while the
//!   local ops are re-based over them in turn;
//! - an ack confirms the in-flight op and releases the next queued one.
//!
//! # State machine
//!
//! ```text
//! +-----------+  joined(version, doc)   +--------+
//! | Detached  | ----------------------> | Synced |<---------+
//! +-----------+                         +--------+          |
//!       ^                                |   |  local_edit  |
//!       | joined() after rejoin          |   +--------------+
//!       |                                | remote_operation / server_ack
//!       +--------------------------------+   (rebase pending, apply)
//! ```

mod session;

pub use session::{PendingOp, SyncSession};
