use crate::Pickaxes;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Camp,
    Mine(usize),
}

impl Position {
    pub fn is_camp(self) -> bool {
        self == Self::Camp
    }

    pub fn card_index(self) -> Option<usize> {
        match self {
            Self::Camp => None,
            Self::Mine(index) => Some(index),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub is_human: bool,
    pub camp_gems: u32,
    pub mine_gems: u32,
    pub health: u8,
    pub pickaxes: Pickaxes,
    pub is_alive: bool,
    pub position: Position,
}

impl Player {
    pub fn new(id: PlayerId, name: String, is_human: bool, health: u8, camp_gems: u32) -> Self {
        Self {
            id,
            name,
            is_human,
            camp_gems,
            mine_gems: 0,
            health,
            pickaxes: Pickaxes::default(),
            is_alive: true,
            position: Position::Camp,
        }
    }

    /// Alive and somewhere in the mine.
    pub fn is_active(&self) -> bool {
        self.is_alive && !self.position.is_camp()
    }
}
