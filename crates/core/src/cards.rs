use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum CardKind {
    #[default]
    Fixed,
    Dice,
}

/// One hazard/reward card in a mine sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MineCard {
    pub damage: u8,
    pub gems: u32,
    #[serde(default)]
    pub kind: CardKind,
}

impl MineCard {
    pub const MAX_DAMAGE: u8 = 3;

    pub fn fixed(damage: u8, gems: u32) -> Self {
        Self {
            damage,
            gems,
            kind: CardKind::Fixed,
        }
    }

    pub fn dice(damage: u8) -> Self {
        Self {
            damage,
            gems: 0,
            kind: CardKind::Dice,
        }
    }

    pub fn is_dice(&self) -> bool {
        self.kind == CardKind::Dice
    }

    /// Gems known before resolution; dice cards have none.
    pub fn fixed_gems(&self) -> Option<u32> {
        match self.kind {
            CardKind::Fixed => Some(self.gems),
            CardKind::Dice => None,
        }
    }

    pub fn is_hazard(&self) -> bool {
        self.damage > 0
    }
}

/// A configured card template, expanded into `count` identical cards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardTemplate {
    pub damage: u8,
    #[serde(default)]
    pub gems: u32,
    pub count: u32,
    #[serde(default)]
    pub kind: CardKind,
}

impl CardTemplate {
    pub fn card(&self) -> MineCard {
        MineCard {
            damage: self.damage,
            gems: self.gems,
            kind: self.kind,
        }
    }
}
