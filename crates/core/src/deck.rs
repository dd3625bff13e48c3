use crate::{CardTemplate, MineCard, RngState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeckError {
    #[error("card pool holds {pool} cards, sequence needs {wanted}")]
    PoolTooSmall { pool: usize, wanted: usize },
}

/// The full template pool. Every round samples from the whole pool again.
#[derive(Debug, Default, Clone)]
pub struct Deck {
    pool: Vec<MineCard>,
}

impl Deck {
    pub fn from_templates(templates: &[CardTemplate]) -> Self {
        let size = templates.iter().map(|t| t.count as usize).sum();
        let mut pool = Vec::with_capacity(size);
        for template in templates {
            for _ in 0..template.count {
                pool.push(template.card());
            }
        }
        Self { pool }
    }

    pub fn pool(&self) -> &[MineCard] {
        &self.pool
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Draws `length` cards without replacement and fixes their order.
    pub fn sample_round(
        &self,
        length: usize,
        rng: &mut RngState,
    ) -> Result<MineSequence, DeckError> {
        if self.pool.len() < length {
            return Err(DeckError::PoolTooSmall {
                pool: self.pool.len(),
                wanted: length,
            });
        }
        let mut draw = self.pool.clone();
        rng.shuffle(&mut draw);
        draw.truncate(length);
        Ok(MineSequence { cards: draw })
    }
}

/// A round's card sequence, consumed front to back.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MineSequence {
    cards: Vec<MineCard>,
}

impl MineSequence {
    pub fn new(cards: Vec<MineCard>) -> Self {
        Self { cards }
    }

    pub fn get(&self, index: usize) -> Option<MineCard> {
        self.cards.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn is_last(&self, index: usize) -> bool {
        index + 1 >= self.cards.len()
    }

    pub fn cards(&self) -> &[MineCard] {
        &self.cards
    }
}
