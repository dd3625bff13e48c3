use crate::RoomStage;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LobbyError {
    #[error("room {0} does not exist or has expired")]
    RoomUnavailable(String),
    #[error("not in a room")]
    NotInRoom,
    #[error("already in room {0}")]
    AlreadyInRoom(String),
    #[error("only the host can do that")]
    NotHost,
    #[error("room is full")]
    RoomFull,
    #[error("room is {0:?}")]
    WrongStage(RoomStage),
    #[error("slot {0} does not exist")]
    NoSuchSlot(u8),
    #[error("slot {0} is taken")]
    SlotTaken(u8),
    #[error("already holding slot {0}")]
    AlreadyHoldingSlot(u8),
    #[error("slot {0} is not yours")]
    SlotNotHeld(u8),
    #[error("name is empty")]
    EmptyName,
    #[error("no seat is ready")]
    NoSeats,
    #[error("could not find a free room code")]
    CodesExhausted,
    #[error("record for room {0} is older than the stored one")]
    StaleWrite(String),
}
