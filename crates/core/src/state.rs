use crate::{MineSequence, PlayerId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Preparation,
    Shopping,
    Expedition,
    Results,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundState {
    pub current_round: u8,
    pub max_rounds: u8,
    pub current_card_index: usize,
    pub phase: Phase,
    pub sequence: MineSequence,
    /// Highest round whose ending transition has already run.
    #[serde(default)]
    pub ended_round: Option<u8>,
}

impl RoundState {
    pub fn new(max_rounds: u8) -> Self {
        Self {
            current_round: 1,
            max_rounds,
            current_card_index: 0,
            phase: Phase::Preparation,
            sequence: MineSequence::default(),
            ended_round: None,
        }
    }

    pub fn is_final_round(&self) -> bool {
        self.current_round >= self.max_rounds
    }

    pub fn round_has_ended(&self) -> bool {
        self.ended_round == Some(self.current_round)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Standing {
    pub rank: usize,
    pub player: PlayerId,
    pub name: String,
    pub camp_gems: u32,
}
