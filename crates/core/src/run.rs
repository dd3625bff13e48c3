use crate::{
    ChoiceError, ChoiceWindow, DamageTracker, Deck, DeckError, GameConfig, Phase, PickaxeGrade,
    PlayerId, PlayerRegistry, RegistryError, Resolution, RngState, RoundState,
};
use thiserror::Error;

mod expedition;
mod round;
mod setup;
mod shop;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid phase: {0:?}")]
    InvalidPhase(Phase),
    #[error("no players registered")]
    NoPlayers,
    #[error("rules cannot be played: {0}")]
    InvalidRules(String),
    #[error("table is full ({0} players)")]
    TableFull(usize),
    #[error("player name is empty")]
    EmptyName,
    #[error("{0} pickaxes are not for sale")]
    NotForSale(PickaxeGrade),
    #[error("no choice window is open")]
    NoOpenWindow,
    #[error("card {0} is outside the mine sequence")]
    CardOutOfRange(usize),
    #[error("choice rejected: {0}")]
    Choice(#[from] ChoiceError),
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("deck error: {0}")]
    Deck(#[from] DeckError),
}

/// Result of feeding a choice into the engine: every card that resolved as a
/// consequence, and who the engine is now waiting on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Progress {
    pub resolved: Vec<Resolution>,
    pub waiting_on: Vec<PlayerId>,
}

/// One game session. Owns every piece of mutable game state; front ends
/// drive it through its methods and read it through [`Game::snapshot`].
#[derive(Debug)]
pub struct Game {
    config: GameConfig,
    rng: RngState,
    deck: Deck,
    registry: PlayerRegistry,
    tracker: DamageTracker,
    round: RoundState,
    window: Option<ChoiceWindow>,
    resolutions: Vec<Resolution>,
}

impl Game {
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn players(&self) -> &PlayerRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &DamageTracker {
        &self.tracker
    }

    pub fn round(&self) -> &RoundState {
        &self.round
    }

    pub fn phase(&self) -> Phase {
        self.round.phase
    }

    pub fn window(&self) -> Option<&ChoiceWindow> {
        self.window.as_ref()
    }

    /// Cards resolved so far in the current (or just finished) round.
    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.resolutions.last()
    }

    fn require_phase(&self, phase: Phase) -> Result<(), GameError> {
        if self.round.phase != phase {
            return Err(GameError::InvalidPhase(self.round.phase));
        }
        Ok(())
    }
}
