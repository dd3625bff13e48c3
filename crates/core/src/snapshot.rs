//! Read-only views handed to front ends.

use crate::{Game, MineCard, Phase, PickaxeGrade, Player, PlayerId, Position};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub is_human: bool,
    pub camp_gems: u32,
    pub mine_gems: u32,
    pub health: u8,
    pub silver: u32,
    pub gold: u32,
    pub is_alive: bool,
    pub position: Position,
    /// Committed for the open card. The choice itself stays hidden.
    pub has_chosen: bool,
}

impl PlayerView {
    fn from_player(player: &Player, has_chosen: bool) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            is_human: player.is_human,
            camp_gems: player.camp_gems,
            mine_gems: player.mine_gems,
            health: player.health,
            silver: player.pickaxes.count(PickaxeGrade::Silver).unwrap_or(0),
            gold: player.pickaxes.count(PickaxeGrade::Gold).unwrap_or(0),
            is_alive: player.is_alive,
            position: player.position,
            has_chosen,
        }
    }
}

/// One slot of the round's sequence. Unresolved cards are face down.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardView {
    pub index: usize,
    pub face: Option<MineCard>,
    /// Gems actually paid out, which for dice cards is the rolled total.
    pub payout: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSnapshot {
    pub round: u8,
    pub max_rounds: u8,
    pub phase: Phase,
    pub card_index: usize,
    pub cards: Vec<CardView>,
    pub players: Vec<PlayerView>,
    pub waiting_on: Vec<PlayerId>,
}

impl GameSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|view| view.id == id)
    }

    pub fn revealed(&self) -> impl Iterator<Item = &CardView> {
        self.cards.iter().filter(|card| card.face.is_some())
    }
}

impl Game {
    pub fn snapshot(&self) -> GameSnapshot {
        let window = self.window();
        let players = self
            .players()
            .iter()
            .map(|player| {
                let chosen = window.is_some_and(|window| window.has_chosen(player.id));
                PlayerView::from_player(player, chosen)
            })
            .collect();
        let round = self.round();
        let cards = (0..round.sequence.len())
            .map(|index| {
                let resolved = self
                    .resolutions()
                    .iter()
                    .find(|resolution| resolution.card_index == index);
                CardView {
                    index,
                    face: resolved.map(|resolution| resolution.card),
                    payout: resolved.map(|resolution| resolution.total_gems),
                }
            })
            .collect();
        GameSnapshot {
            round: round.current_round,
            max_rounds: round.max_rounds,
            phase: round.phase,
            card_index: round.current_card_index,
            cards,
            players,
            waiting_on: self.pending_choices(),
        }
    }
}
