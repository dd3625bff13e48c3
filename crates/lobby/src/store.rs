use crate::{Clock, LobbyError, RoomRecord, RoomSummary, SystemClock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Rooms idle for longer than this are gone.
pub const ROOM_TTL_MILLIS: u64 = 10 * 60 * 1000;

/// Shared room records keyed by code. Reads never return expired records.
/// Writes are last-write-wins on `last_update`; there is no locking beyond
/// what the owner of the store provides.
pub trait RoomStore {
    fn now_millis(&self) -> u64;
    fn get(&mut self, code: &str) -> Option<RoomRecord>;
    /// Stores the record unless a newer one is already present.
    fn put(&mut self, record: RoomRecord) -> Result<(), LobbyError>;
    fn remove(&mut self, code: &str) -> Option<RoomRecord>;
    /// Live records, ordered by code.
    fn list(&mut self) -> Vec<RoomRecord>;

    fn contains(&mut self, code: &str) -> bool {
        self.get(code).is_some()
    }

    fn summaries(&mut self) -> Vec<RoomSummary> {
        self.list().iter().map(RoomRecord::summary).collect()
    }
}

pub struct MemoryRoomStore {
    rooms: HashMap<String, RoomRecord>,
    ttl_millis: u64,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for MemoryRoomStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRoomStore")
            .field("rooms", &self.rooms.len())
            .field("ttl_millis", &self.ttl_millis)
            .finish()
    }
}

impl Default for MemoryRoomStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl MemoryRoomStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, ROOM_TTL_MILLIS)
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl_millis: u64) -> Self {
        Self {
            rooms: HashMap::new(),
            ttl_millis,
            clock,
        }
    }

    fn is_expired(&self, record: &RoomRecord, now: u64) -> bool {
        now.saturating_sub(record.last_update) > self.ttl_millis
    }

    /// Drops every expired record. Returns how many were removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        let before = self.rooms.len();
        let ttl = self.ttl_millis;
        self.rooms
            .retain(|_, record| now.saturating_sub(record.last_update) <= ttl);
        let purged = before - self.rooms.len();
        if purged > 0 {
            debug!(purged, "expired rooms removed");
        }
        purged
    }
}

impl RoomStore for MemoryRoomStore {
    fn now_millis(&self) -> u64 {
        self.clock.now_millis()
    }

    fn get(&mut self, code: &str) -> Option<RoomRecord> {
        let now = self.clock.now_millis();
        let expired = self.is_expired(self.rooms.get(code)?, now);
        if expired {
            self.rooms.remove(code);
            debug!(code, "room expired");
            return None;
        }
        self.rooms.get(code).cloned()
    }

    fn put(&mut self, record: RoomRecord) -> Result<(), LobbyError> {
        if let Some(existing) = self.rooms.get(&record.code) {
            if existing.last_update > record.last_update {
                return Err(LobbyError::StaleWrite(record.code));
            }
        }
        self.rooms.insert(record.code.clone(), record);
        Ok(())
    }

    fn remove(&mut self, code: &str) -> Option<RoomRecord> {
        let now = self.clock.now_millis();
        let record = self.rooms.remove(code)?;
        if self.is_expired(&record, now) {
            debug!(code, "room expired");
            return None;
        }
        Some(record)
    }

    fn list(&mut self) -> Vec<RoomRecord> {
        self.purge_expired();
        let mut rooms: Vec<RoomRecord> = self.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.code.cmp(&b.code));
        rooms
    }
}
