//! Vellum collaboration server library.
//!
//! One [`Room`] per live document holds the authoritative state, a
//! monotonically versioned operation log, and the participant set. The
//! [`RoomRegistry`] maps document ids to rooms; a [`Session`] drives the
//! protocol for one connection and talks to the storage and auth
//! collaborators through the narrow traits in [`storage`] and [`auth`].
//! The WebSocket transport in [`ws`] is one possible front; sessions only
//! ever see decoded frames and an outbound queue, so tests drive them with
//! channels directly.

pub mod auth;
pub mod constants;
pub mod error;
pub mod memory;
pub mod registry;
pub mod room;
pub mod session;
pub mod storage;
pub mod ws;

pub use auth::{Authenticator, Permission, SessionUser};
pub use error::SessionError;
pub use memory::{MemoryAuth, MemoryStore};
pub use registry::RoomRegistry;
pub use room::{HistoryEntry, Room};
pub use session::Session;
pub use storage::{DocumentStore, StoreError, StoredDocument};
pub use ws::{run_server, ServerConfig};
