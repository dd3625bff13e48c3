//! One participant's view of the lobby.
//!
//! Every operation reads the current record from the store, applies a
//! change and writes it back with a fresh timestamp. Other participants see
//! the change on their next [`LobbySession::poll`].

use crate::{
    is_valid_code, LobbyError, Participant, RoomRecord, RoomStage, RoomStore, RoomSummary, Seat,
    CODE_ALPHABET, CODE_LENGTH, SLOT_COUNT,
};
use deepdig_core::RngState;
use tracing::{debug, info};

const CODE_ATTEMPTS: usize = 64;

pub fn list_rooms(store: &mut dyn RoomStore) -> Vec<RoomSummary> {
    store.summaries()
}

pub fn generate_code(rng: &mut RngState) -> String {
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.below(CODE_ALPHABET.len())]))
        .collect()
}

#[derive(Debug)]
pub struct LobbySession {
    id: String,
    name: String,
    room: Option<String>,
    is_host: bool,
    rng: RngState,
}

impl LobbySession {
    pub fn new(name: &str, seed: u64) -> Self {
        let mut rng = RngState::from_seed(seed);
        let id = format!("{:016x}", rng.next_u64());
        Self {
            id,
            name: name.trim().to_string(),
            room: None,
            is_host: false,
            rng,
        }
    }

    pub fn with_entropy(name: &str) -> Self {
        Self::new(name, RngState::from_entropy().next_u64())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    pub fn is_host(&self) -> bool {
        self.is_host
    }

    fn me(&self, is_host: bool) -> Result<Participant, LobbyError> {
        if self.name.is_empty() {
            return Err(LobbyError::EmptyName);
        }
        Ok(Participant {
            id: self.id.clone(),
            name: self.name.clone(),
            is_host,
        })
    }

    fn current_code(&self) -> Result<String, LobbyError> {
        self.room.clone().ok_or(LobbyError::NotInRoom)
    }

    /// Loads the current room. A missing or expired room drops the session
    /// back to room selection.
    fn load(&mut self, store: &mut dyn RoomStore) -> Result<RoomRecord, LobbyError> {
        let code = self.current_code()?;
        match store.get(&code) {
            Some(record) => Ok(record),
            None => {
                self.room = None;
                self.is_host = false;
                Err(LobbyError::RoomUnavailable(code))
            }
        }
    }

    fn save(store: &mut dyn RoomStore, mut record: RoomRecord) -> Result<RoomRecord, LobbyError> {
        record.last_update = store.now_millis().max(record.last_update);
        store.put(record.clone())?;
        Ok(record)
    }

    fn require_host(&self) -> Result<(), LobbyError> {
        if !self.is_host {
            return Err(LobbyError::NotHost);
        }
        Ok(())
    }

    pub fn create_room(&mut self, store: &mut dyn RoomStore) -> Result<String, LobbyError> {
        if let Some(code) = &self.room {
            return Err(LobbyError::AlreadyInRoom(code.clone()));
        }
        let host = self.me(true)?;
        let code = (0..CODE_ATTEMPTS)
            .map(|_| generate_code(&mut self.rng))
            .find(|code| !store.contains(code))
            .ok_or(LobbyError::CodesExhausted)?;
        let record = RoomRecord::new(code.clone(), host, store.now_millis());
        store.put(record)?;
        self.room = Some(code.clone());
        self.is_host = true;
        info!(%code, host = %self.name, "room created");
        Ok(code)
    }

    pub fn join_room(
        &mut self,
        store: &mut dyn RoomStore,
        code: &str,
    ) -> Result<RoomRecord, LobbyError> {
        if let Some(current) = &self.room {
            return Err(LobbyError::AlreadyInRoom(current.clone()));
        }
        let code = code.trim().to_ascii_uppercase();
        if !is_valid_code(&code) {
            return Err(LobbyError::RoomUnavailable(code));
        }
        let mut record = store
            .get(&code)
            .ok_or_else(|| LobbyError::RoomUnavailable(code.clone()))?;
        if record.game_state == RoomStage::Playing {
            return Err(LobbyError::WrongStage(record.game_state));
        }
        if record.participant(&self.id).is_none() {
            if record.players.len() >= usize::from(SLOT_COUNT) {
                return Err(LobbyError::RoomFull);
            }
            record.players.push(self.me(false)?);
        }
        let record = Self::save(store, record)?;
        self.room = Some(code.clone());
        self.is_host = false;
        info!(%code, player = %self.name, "joined room");
        Ok(record)
    }

    /// Leaves the room. A departing host takes the room down with them.
    pub fn leave_room(&mut self, store: &mut dyn RoomStore) -> Result<(), LobbyError> {
        let code = self.current_code()?;
        if self.is_host {
            store.remove(&code);
            info!(%code, "room closed by host");
        } else if let Some(mut record) = store.get(&code) {
            record.players.retain(|player| player.id != self.id);
            record.release_slots_of(&self.id);
            Self::save(store, record)?;
            debug!(%code, player = %self.name, "left room");
        }
        self.room = None;
        self.is_host = false;
        Ok(())
    }

    /// Refreshes the local view of the room.
    pub fn poll(&mut self, store: &mut dyn RoomStore) -> Result<RoomRecord, LobbyError> {
        self.load(store)
    }

    pub fn start_selection(&mut self, store: &mut dyn RoomStore) -> Result<RoomRecord, LobbyError> {
        self.require_host()?;
        let mut record = self.load(store)?;
        if record.game_state != RoomStage::Waiting {
            return Err(LobbyError::WrongStage(record.game_state));
        }
        record.game_state = RoomStage::CharacterSelection;
        Self::save(store, record)
    }

    fn selecting(&mut self, store: &mut dyn RoomStore, slot: u8) -> Result<RoomRecord, LobbyError> {
        let record = self.load(store)?;
        if record.game_state != RoomStage::CharacterSelection {
            return Err(LobbyError::WrongStage(record.game_state));
        }
        if record.slot(slot).is_none() {
            return Err(LobbyError::NoSuchSlot(slot));
        }
        Ok(record)
    }

    /// Claims a free slot. Each participant holds at most one slot.
    pub fn select_slot(
        &mut self,
        store: &mut dyn RoomStore,
        slot: u8,
    ) -> Result<RoomRecord, LobbyError> {
        let mut record = self.selecting(store, slot)?;
        match record.held_by(&self.id) {
            Some(held) if held == slot => return Ok(record),
            Some(held) => return Err(LobbyError::AlreadyHoldingSlot(held)),
            None => {}
        }
        let state = record
            .character_states
            .get_mut(&slot)
            .ok_or(LobbyError::NoSuchSlot(slot))?;
        if !state.is_free() {
            return Err(LobbyError::SlotTaken(slot));
        }
        state.selected = true;
        state.claimed_by = Some(self.id.clone());
        debug!(slot, player = %self.name, "slot selected");
        Self::save(store, record)
    }

    pub fn cancel_slot(
        &mut self,
        store: &mut dyn RoomStore,
        slot: u8,
    ) -> Result<RoomRecord, LobbyError> {
        let mut record = self.selecting(store, slot)?;
        if record.held_by(&self.id) != Some(slot) {
            return Err(LobbyError::SlotNotHeld(slot));
        }
        record.release_slots_of(&self.id);
        Self::save(store, record)
    }

    /// Names the character in a held slot and marks it ready.
    pub fn confirm_slot(
        &mut self,
        store: &mut dyn RoomStore,
        slot: u8,
        name: &str,
    ) -> Result<RoomRecord, LobbyError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LobbyError::EmptyName);
        }
        let mut record = self.selecting(store, slot)?;
        if record.held_by(&self.id) != Some(slot) {
            return Err(LobbyError::SlotNotHeld(slot));
        }
        let state = record
            .character_states
            .get_mut(&slot)
            .ok_or(LobbyError::NoSuchSlot(slot))?;
        state.ready = true;
        state.player_name = name.to_string();
        debug!(slot, name, "slot ready");
        Self::save(store, record)
    }

    pub fn reset_selections(
        &mut self,
        store: &mut dyn RoomStore,
    ) -> Result<RoomRecord, LobbyError> {
        self.require_host()?;
        let mut record = self.load(store)?;
        record.clear_slots();
        Self::save(store, record)
    }

    pub fn seats(&mut self, store: &mut dyn RoomStore) -> Result<Vec<Seat>, LobbyError> {
        Ok(self.load(store)?.seats())
    }

    /// Locks the room and returns the final seating.
    pub fn begin_game(&mut self, store: &mut dyn RoomStore) -> Result<Vec<Seat>, LobbyError> {
        self.require_host()?;
        let mut record = self.load(store)?;
        if record.game_state != RoomStage::CharacterSelection {
            return Err(LobbyError::WrongStage(record.game_state));
        }
        let seats = record.seats();
        if seats.is_empty() {
            return Err(LobbyError::NoSeats);
        }
        record.game_state = RoomStage::Playing;
        Self::save(store, record)?;
        info!(code = ?self.room, seats = seats.len(), "game starting");
        Ok(seats)
    }
}
