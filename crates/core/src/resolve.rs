//! Card resolution: dice, damage, retreats, then the gem split.
//!
//! Resolution is a synchronous function of the revealed card, the closed
//! choice set and the current player state. Front ends replay the returned
//! [`Resolution`] (or the matching events) at whatever pace they like.

use crate::{
    ChoiceSet, DamageOutcome, DamageTracker, DeathReport, Event, EventBus, MineCard,
    PickaxeGrade, PlayerId, PlayerRegistry, RegistryError, RngState,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceRoll {
    pub player: PlayerId,
    pub first: u8,
    pub second: u8,
}

impl DiceRoll {
    pub fn total(&self) -> u32 {
        u32::from(self.first) + u32::from(self.second)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DamageReport {
    pub player: PlayerId,
    pub encountered: u8,
    pub applied: u8,
    pub health: u8,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RetreatReport {
    pub player: PlayerId,
    pub banked: u32,
    pub camp_gems: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct GemAward {
    pub player: PlayerId,
    pub grade: PickaxeGrade,
    pub gems: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub card_index: usize,
    pub card: MineCard,
    pub total_gems: u32,
    pub dice: Vec<DiceRoll>,
    pub damage: Vec<DamageReport>,
    pub deaths: Vec<DeathReport>,
    pub retreats: Vec<RetreatReport>,
    pub awards: Vec<GemAward>,
}

impl Resolution {
    pub fn award_for(&self, player: PlayerId) -> Option<u32> {
        self.awards
            .iter()
            .find(|award| award.player == player)
            .map(|award| award.gems)
    }

    pub fn died(&self, player: PlayerId) -> bool {
        self.deaths.iter().any(|death| death.player == player)
    }
}

/// `floor(total * w / W)` for every weighted entry. Leftover gems are dropped.
pub fn split_gems(total: u32, weights: &[(PlayerId, u32)]) -> Vec<(PlayerId, u32)> {
    let sum: u64 = weights.iter().map(|(_, weight)| u64::from(*weight)).sum();
    weights
        .iter()
        .map(|(id, weight)| {
            let share = if sum == 0 {
                0
            } else {
                u64::from(total) * u64::from(*weight) / sum
            };
            (*id, share as u32)
        })
        .collect()
}

pub fn resolve_card(
    card: MineCard,
    choices: &ChoiceSet,
    registry: &mut PlayerRegistry,
    tracker: &mut DamageTracker,
    rng: &mut RngState,
    events: &mut EventBus,
) -> Result<Resolution, RegistryError> {
    let card_index = choices.card_index;
    let miners: Vec<(PlayerId, PickaxeGrade)> = choices.miners().collect();
    events.push(Event::CardRevealed {
        card_index,
        damage: card.damage,
        gems: card.fixed_gems(),
    });

    let mut dice = Vec::new();
    let total_gems = if card.is_dice() {
        for (player, _) in &miners {
            let roll = DiceRoll {
                player: *player,
                first: rng.roll_die(6),
                second: rng.roll_die(6),
            };
            events.push(Event::DiceRolled {
                player: roll.player,
                first: roll.first,
                second: roll.second,
            });
            dice.push(roll);
        }
        dice.iter().map(DiceRoll::total).sum()
    } else {
        card.gems
    };

    let mut damage = Vec::new();
    let mut deaths = Vec::new();
    for (player, _) in &miners {
        if !registry.player(*player)?.is_alive {
            continue;
        }
        let applied = tracker.check_and_record(*player, card.damage);
        if card.damage > 0 && applied == 0 {
            events.push(Event::DamageEvaded {
                player: *player,
                damage: card.damage,
            });
        }
        let health = match registry.apply_damage(*player, applied)? {
            DamageOutcome::Unharmed => registry.player(*player)?.health,
            DamageOutcome::Hurt { health } => {
                events.push(Event::DamageTaken {
                    player: *player,
                    amount: applied,
                    health,
                });
                health
            }
            DamageOutcome::Died(report) => {
                events.push(Event::DamageTaken {
                    player: *player,
                    amount: applied,
                    health: 0,
                });
                events.push(Event::PlayerDied {
                    player: *player,
                    mine_gems: report.mine_gems,
                });
                if report.mine_gems > 0 {
                    events.push(Event::GemsRedistributed {
                        from: *player,
                        to: report.heirs.clone(),
                        each: report.each,
                        discarded: report.discarded,
                    });
                }
                deaths.push(report);
                0
            }
        };
        damage.push(DamageReport {
            player: *player,
            encountered: card.damage,
            applied,
            health,
        });
    }

    let mut retreats = Vec::new();
    for player in choices.retreaters() {
        let banked = registry.bank(player)?;
        let camp_gems = registry.player(player)?.camp_gems;
        events.push(Event::PlayerRetreated {
            player,
            banked,
            camp_gems,
        });
        retreats.push(RetreatReport {
            player,
            banked,
            camp_gems,
        });
    }

    let mut survivors = Vec::new();
    for (player, grade) in &miners {
        if registry.player(*player)?.is_alive {
            survivors.push((*player, *grade));
        }
    }
    let weights: Vec<(PlayerId, u32)> = survivors
        .iter()
        .map(|(player, grade)| (*player, grade.share_weight()))
        .collect();
    let shares = split_gems(total_gems, &weights);
    let mut awards = Vec::new();
    for ((player, grade), (_, gems)) in survivors.iter().zip(shares) {
        if *grade != PickaxeGrade::Bronze && registry.consume_pickaxe(*player, *grade)? {
            events.push(Event::PickaxeConsumed {
                player: *player,
                grade: *grade,
            });
        }
        registry.credit(*player, 0, i64::from(gems))?;
        events.push(Event::GemsAwarded {
            player: *player,
            grade: *grade,
            gems,
            mine_gems: registry.player(*player)?.mine_gems,
        });
        awards.push(GemAward {
            player: *player,
            grade: *grade,
            gems,
        });
    }

    debug!(
        card_index,
        damage = card.damage,
        total_gems,
        miners = miners.len(),
        deaths = deaths.len(),
        retreats = retreats.len(),
        "card resolved"
    );
    Ok(Resolution {
        card_index,
        card,
        total_gems,
        dice,
        damage,
        deaths,
        retreats,
        awards,
    })
}
