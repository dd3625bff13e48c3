use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SLOT_COUNT: u8 = 4;
pub const CODE_LENGTH: usize = 6;
pub const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStage {
    #[default]
    Waiting,
    CharacterSelection,
    Playing,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    pub is_host: bool,
}

/// One character slot. `claimed_by` names the participant holding it and is
/// stored as `player_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotState {
    pub selected: bool,
    pub ready: bool,
    #[serde(default)]
    pub player_name: String,
    #[serde(default, rename = "player_id")]
    pub claimed_by: Option<String>,
}

impl SlotState {
    pub fn is_free(&self) -> bool {
        self.claimed_by.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRecord {
    pub code: String,
    pub host_name: String,
    pub room_name: String,
    pub players: Vec<Participant>,
    pub game_state: RoomStage,
    pub character_states: BTreeMap<u8, SlotState>,
    /// Milliseconds since the epoch of the last write.
    pub last_update: u64,
}

impl RoomRecord {
    pub fn new(code: String, host: Participant, now: u64) -> Self {
        Self {
            code,
            host_name: host.name.clone(),
            room_name: format!("{}'s room", host.name),
            players: vec![host],
            game_state: RoomStage::Waiting,
            character_states: empty_slots(),
            last_update: now,
        }
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn slot(&self, slot: u8) -> Option<&SlotState> {
        self.character_states.get(&slot)
    }

    /// The slot this participant currently holds, if any.
    pub fn held_by(&self, id: &str) -> Option<u8> {
        self.character_states
            .iter()
            .find(|(_, state)| state.claimed_by.as_deref() == Some(id))
            .map(|(slot, _)| *slot)
    }

    pub fn release_slots_of(&mut self, id: &str) {
        for state in self.character_states.values_mut() {
            if state.claimed_by.as_deref() == Some(id) {
                *state = SlotState::default();
            }
        }
    }

    pub fn clear_slots(&mut self) {
        self.character_states = empty_slots();
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            code: self.code.clone(),
            room_name: self.room_name.clone(),
            host_name: self.host_name.clone(),
            players: self.players.len(),
            game_state: self.game_state,
        }
    }

    /// Ready slots in slot order. The first seat is played by a human,
    /// the rest by the computer.
    pub fn seats(&self) -> Vec<Seat> {
        self.character_states
            .iter()
            .filter(|(_, state)| state.ready)
            .enumerate()
            .map(|(order, (slot, state))| Seat {
                slot: *slot,
                name: state.player_name.clone(),
                is_human: order == 0,
            })
            .collect()
    }
}

fn empty_slots() -> BTreeMap<u8, SlotState> {
    (1..=SLOT_COUNT)
        .map(|slot| (slot, SlotState::default()))
        .collect()
}

/// Row in the public room list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomSummary {
    pub code: String,
    pub room_name: String,
    pub host_name: String,
    pub players: usize,
    pub game_state: RoomStage,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub slot: u8,
    pub name: String,
    pub is_human: bool,
}

pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|byte| CODE_ALPHABET.contains(&byte))
}
