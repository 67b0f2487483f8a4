//! The room registry.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::info;

use vellum_model::Document;

use crate::room::Room;

/// Concurrent map from document id to live room.
///
/// Per-room serialization is the mutex; the dashmap only guards the
/// mapping itself. Rooms are created by the first joiner and removed when
/// the last participant leaves.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, Arc<Mutex<Room>>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, document_id: &str) -> Option<Arc<Mutex<Room>>> {
        self.rooms.get(document_id).map(|entry| entry.clone())
    }

    /// Fetch the room for `document_id`, creating it from `make_document`
    /// if no room is live. Two racing first joiners resolve to one room.
    pub fn get_or_create(
        &self,
        document_id: &str,
        make_document: impl FnOnce() -> Document,
    ) -> Arc<Mutex<Room>> {
        self.rooms
            .entry(document_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(Room::new(document_id, make_document()))))
            .clone()
    }

    /// Drop the room if it has no participants. Atomic with respect to
    /// concurrent joins through the same registry.
    pub fn remove_if_empty(&self, document_id: &str) -> bool {
        let removed = self
            .rooms
            .remove_if(document_id, |_, room| room.lock().is_empty())
            .is_some();
        if removed {
            info!(document_id = %document_id, "room destroyed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
