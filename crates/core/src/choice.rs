use crate::{PickaxeGrade, Player, PlayerId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Retreat,
    Mine,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Choice {
    pub action: Action,
    #[serde(default)]
    pub pickaxe: Option<PickaxeGrade>,
}

impl Choice {
    pub fn retreat() -> Self {
        Self {
            action: Action::Retreat,
            pickaxe: None,
        }
    }

    pub fn mine(grade: PickaxeGrade) -> Self {
        Self {
            action: Action::Mine,
            pickaxe: Some(grade),
        }
    }

    /// Grade swung by a miner; a mine choice without a grade digs with bronze.
    pub fn grade(&self) -> Option<PickaxeGrade> {
        match self.action {
            Action::Retreat => None,
            Action::Mine => Some(self.pickaxe.unwrap_or(PickaxeGrade::Bronze)),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChoiceError {
    #[error("choice window is closed")]
    WindowClosed,
    #[error("player {0} is not choosing for this card")]
    NotInWindow(PlayerId),
    #[error("player {0} already chose for this card")]
    AlreadyChosen(PlayerId),
    #[error("player {player} holds no {grade} pickaxe")]
    PickaxeNotHeld {
        player: PlayerId,
        grade: PickaxeGrade,
    },
}

/// Every commitment for one card, in registration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChoiceSet {
    pub card_index: usize,
    pub entries: Vec<(PlayerId, Choice)>,
}

impl ChoiceSet {
    pub fn get(&self, player: PlayerId) -> Option<Choice> {
        self.entries
            .iter()
            .find(|(id, _)| *id == player)
            .map(|(_, choice)| *choice)
    }

    pub fn miners(&self) -> impl Iterator<Item = (PlayerId, PickaxeGrade)> + '_ {
        self.entries
            .iter()
            .filter_map(|(id, choice)| choice.grade().map(|grade| (*id, grade)))
    }

    pub fn retreaters(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.entries
            .iter()
            .filter(|(_, choice)| choice.action == Action::Retreat)
            .map(|(id, _)| *id)
    }
}

/// Collects one choice per player who was active when the window opened.
#[derive(Debug, Clone)]
pub struct ChoiceWindow {
    card_index: usize,
    expected: Vec<PlayerId>,
    choices: Vec<(PlayerId, Choice)>,
    closed: bool,
}

impl ChoiceWindow {
    pub fn open(card_index: usize, expected: Vec<PlayerId>) -> Self {
        Self {
            card_index,
            expected,
            choices: Vec::new(),
            closed: false,
        }
    }

    pub fn card_index(&self) -> usize {
        self.card_index
    }

    pub fn expected(&self) -> &[PlayerId] {
        &self.expected
    }

    pub fn has_chosen(&self, player: PlayerId) -> bool {
        self.choices.iter().any(|(id, _)| *id == player)
    }

    pub fn pending(&self) -> Vec<PlayerId> {
        self.expected
            .iter()
            .copied()
            .filter(|id| !self.has_chosen(*id))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.expected.iter().all(|id| self.has_chosen(*id))
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Records a choice and returns how many players are still deciding.
    pub fn submit(&mut self, player: &Player, choice: Choice) -> Result<usize, ChoiceError> {
        if self.closed {
            return Err(ChoiceError::WindowClosed);
        }
        if !self.expected.contains(&player.id) {
            return Err(ChoiceError::NotInWindow(player.id));
        }
        if self.has_chosen(player.id) {
            return Err(ChoiceError::AlreadyChosen(player.id));
        }
        if let Some(grade) = choice.grade() {
            if !player.pickaxes.has(grade) {
                return Err(ChoiceError::PickaxeNotHeld {
                    player: player.id,
                    grade,
                });
            }
        }
        let normalized = match choice.grade() {
            Some(grade) => Choice::mine(grade),
            None => Choice::retreat(),
        };
        self.choices.push((player.id, normalized));
        Ok(self.expected.len() - self.choices.len())
    }

    /// Closes a complete window. Returns the choice set the first time only.
    pub fn close(&mut self) -> Option<ChoiceSet> {
        if self.closed || !self.is_complete() {
            return None;
        }
        self.closed = true;
        let entries = self
            .expected
            .iter()
            .filter_map(|id| {
                self.choices
                    .iter()
                    .find(|(chosen, _)| chosen == id)
                    .copied()
            })
            .collect();
        Some(ChoiceSet {
            card_index: self.card_index,
            entries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: u32) -> Player {
        Player::new(PlayerId(id), format!("p{id}"), true, 3, 10)
    }

    #[test]
    fn closes_once_everyone_has_chosen() {
        let (a, b) = (player(1), player(2));
        let mut window = ChoiceWindow::open(0, vec![a.id, b.id]);
        assert_eq!(window.submit(&b, Choice::retreat()), Ok(1));
        assert!(window.close().is_none());
        assert_eq!(window.pending(), vec![a.id]);
        assert_eq!(window.submit(&a, Choice::mine(PickaxeGrade::Bronze)), Ok(0));
        let set = window.close().expect("complete window closes");
        assert_eq!(set.entries[0].0, a.id);
        assert_eq!(set.entries[1].0, b.id);
        assert!(window.close().is_none());
        assert_eq!(
            window.submit(&a, Choice::retreat()),
            Err(ChoiceError::WindowClosed)
        );
    }

    #[test]
    fn rejects_outsiders_repeats_and_missing_pickaxes() {
        let (a, outsider) = (player(1), player(9));
        let mut window = ChoiceWindow::open(2, vec![a.id]);
        assert_eq!(
            window.submit(&outsider, Choice::retreat()),
            Err(ChoiceError::NotInWindow(outsider.id))
        );
        assert_eq!(
            window.submit(&a, Choice::mine(PickaxeGrade::Gold)),
            Err(ChoiceError::PickaxeNotHeld {
                player: a.id,
                grade: PickaxeGrade::Gold
            })
        );
        window
            .submit(
                &a,
                Choice {
                    action: Action::Mine,
                    pickaxe: None,
                },
            )
            .expect("bronze by default");
        assert_eq!(
            window.submit(&a, Choice::retreat()),
            Err(ChoiceError::AlreadyChosen(a.id))
        );
        let set = window.close().expect("close");
        assert_eq!(set.get(a.id), Some(Choice::mine(PickaxeGrade::Bronze)));
    }

    #[test]
    fn empty_window_is_immediately_complete() {
        let mut window = ChoiceWindow::open(0, Vec::new());
        assert!(window.is_complete());
        assert!(window.close().is_some());
        assert!(window.close().is_none());
    }
}
