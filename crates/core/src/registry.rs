use crate::{PickaxeGrade, Player, PlayerId, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),
    #[error("player {0} does not have enough gems")]
    InsufficientGems(PlayerId),
    #[error("player {0} is not alive")]
    NotAlive(PlayerId),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeathReport {
    pub player: PlayerId,
    pub mine_gems: u32,
    pub heirs: Vec<PlayerId>,
    pub each: u32,
    pub discarded: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DamageOutcome {
    Unharmed,
    Hurt { health: u8 },
    Died(DeathReport),
}

/// Owner of all per-player mutable state. Every change to health, gems,
/// pickaxes or position goes through here so the dead-player invariant
/// (camp, no mine gems, no pickaxes) holds everywhere.
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
    next_id: u32,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        is_human: bool,
        health: u8,
        camp_gems: u32,
    ) -> PlayerId {
        self.next_id += 1;
        let id = PlayerId(self.next_id);
        self.players
            .push(Player::new(id, name.into(), is_human, health, camp_gems));
        id
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Players in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player, RegistryError> {
        self.get(id).ok_or(RegistryError::UnknownPlayer(id))
    }

    fn player_mut(&mut self, id: PlayerId) -> Result<&mut Player, RegistryError> {
        self.players
            .iter_mut()
            .find(|player| player.id == id)
            .ok_or(RegistryError::UnknownPlayer(id))
    }

    pub fn list_active(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .filter(|player| player.is_active())
            .map(|player| player.id)
            .collect()
    }

    pub fn move_to(&mut self, id: PlayerId, position: Position) -> Result<(), RegistryError> {
        let player = self.player_mut(id)?;
        if !player.is_alive && !position.is_camp() {
            return Err(RegistryError::NotAlive(id));
        }
        player.position = position;
        Ok(())
    }

    /// Applies signed deltas to both balances, or neither if either would go negative.
    pub fn credit(
        &mut self,
        id: PlayerId,
        camp_delta: i64,
        mine_delta: i64,
    ) -> Result<(), RegistryError> {
        let player = self.player_mut(id)?;
        if mine_delta > 0 && !player.is_alive {
            return Err(RegistryError::NotAlive(id));
        }
        let camp = apply_delta(player.camp_gems, camp_delta)
            .ok_or(RegistryError::InsufficientGems(id))?;
        let mine = apply_delta(player.mine_gems, mine_delta)
            .ok_or(RegistryError::InsufficientGems(id))?;
        player.camp_gems = camp;
        player.mine_gems = mine;
        Ok(())
    }

    /// Moves all mine gems into camp and sends the player home. Returns the banked amount.
    pub fn bank(&mut self, id: PlayerId) -> Result<u32, RegistryError> {
        let player = self.player_mut(id)?;
        let banked = player.mine_gems;
        player.camp_gems = player.camp_gems.saturating_add(banked);
        player.mine_gems = 0;
        player.position = Position::Camp;
        Ok(banked)
    }

    pub fn add_pickaxe(&mut self, id: PlayerId, grade: PickaxeGrade) -> Result<(), RegistryError> {
        let player = self.player_mut(id)?;
        if !player.is_alive {
            return Err(RegistryError::NotAlive(id));
        }
        player.pickaxes.add(grade);
        Ok(())
    }

    pub fn consume_pickaxe(
        &mut self,
        id: PlayerId,
        grade: PickaxeGrade,
    ) -> Result<bool, RegistryError> {
        Ok(self.player_mut(id)?.pickaxes.consume(grade))
    }

    pub fn apply_damage(
        &mut self,
        id: PlayerId,
        amount: u8,
    ) -> Result<DamageOutcome, RegistryError> {
        let player = self.player_mut(id)?;
        if !player.is_alive {
            return Err(RegistryError::NotAlive(id));
        }
        if amount == 0 {
            return Ok(DamageOutcome::Unharmed);
        }
        player.health = player.health.saturating_sub(amount);
        if player.health > 0 {
            return Ok(DamageOutcome::Hurt {
                health: player.health,
            });
        }
        Ok(DamageOutcome::Died(self.kill(id)?))
    }

    /// Splits the dead player's mine gems evenly between the other living
    /// players at the same position; the remainder is discarded.
    fn kill(&mut self, id: PlayerId) -> Result<DeathReport, RegistryError> {
        let position = self.player(id)?.position;
        let heirs: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|other| other.id != id && other.is_alive && !other.position.is_camp())
            .filter(|other| other.position == position)
            .map(|other| other.id)
            .collect();

        let dead = self.player_mut(id)?;
        let mine_gems = dead.mine_gems;
        dead.mine_gems = 0;
        dead.pickaxes.clear();
        dead.is_alive = false;
        dead.position = Position::Camp;

        let (each, discarded) = if heirs.is_empty() {
            (0, mine_gems)
        } else {
            let count = heirs.len() as u32;
            (mine_gems / count, mine_gems % count)
        };
        for heir in &heirs {
            let player = self.player_mut(*heir)?;
            player.mine_gems = player.mine_gems.saturating_add(each);
        }
        debug!(%id, mine_gems, heirs = heirs.len(), each, discarded, "player died");
        Ok(DeathReport {
            player: id,
            mine_gems,
            heirs,
            each,
            discarded,
        })
    }

    /// Living camp players walk into the first card with empty pockets.
    pub fn enter_expedition(&mut self) -> usize {
        let mut entered = 0;
        for player in self.players.iter_mut() {
            if player.is_alive && player.position.is_camp() {
                player.position = Position::Mine(0);
                player.mine_gems = 0;
                entered += 1;
            }
        }
        entered
    }

    pub fn advance_active(&mut self, index: usize) -> usize {
        let mut moved = 0;
        for player in self.players.iter_mut().filter(|player| player.is_active()) {
            player.position = Position::Mine(index);
            moved += 1;
        }
        moved
    }

    /// Banks every player still in the mine. Returns `(player, banked)` pairs.
    pub fn bank_all_active(&mut self) -> Vec<(PlayerId, u32)> {
        let mut banked = Vec::new();
        for id in self.list_active() {
            if let Ok(amount) = self.bank(id) {
                banked.push((id, amount));
            }
        }
        banked
    }

    pub fn reset_for_round(&mut self, health: u8) {
        for player in self.players.iter_mut() {
            player.health = health;
            player.is_alive = true;
            player.mine_gems = 0;
            player.position = Position::Camp;
        }
    }
}

fn apply_delta(value: u32, delta: i64) -> Option<u32> {
    let next = i64::from(value).checked_add(delta)?;
    u32::try_from(next).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry_with(n: usize) -> (PlayerRegistry, Vec<PlayerId>) {
        let mut registry = PlayerRegistry::new();
        let ids = (0..n)
            .map(|i| registry.register(format!("p{i}"), i == 0, 3, 10))
            .collect();
        (registry, ids)
    }

    #[test]
    fn ids_follow_registration_order() {
        let (registry, ids) = registry_with(3);
        assert_eq!(ids, vec![PlayerId(1), PlayerId(2), PlayerId(3)]);
        let names: Vec<_> = registry.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["p0", "p1", "p2"]);
    }

    #[test]
    fn credit_rejects_overdraft_without_mutation() {
        let (mut registry, ids) = registry_with(1);
        assert_eq!(
            registry.credit(ids[0], -11, 0),
            Err(RegistryError::InsufficientGems(ids[0]))
        );
        assert_eq!(registry.player(ids[0]).map(|p| p.camp_gems), Ok(10));
        registry.credit(ids[0], -4, 7).expect("credit");
        let player = registry.player(ids[0]).expect("player");
        assert_eq!((player.camp_gems, player.mine_gems), (6, 7));
    }

    #[test]
    fn active_means_alive_and_in_the_mine() {
        let (mut registry, ids) = registry_with(3);
        assert!(registry.list_active().is_empty());
        assert_eq!(registry.enter_expedition(), 3);
        registry.bank(ids[1]).expect("bank");
        assert_eq!(registry.list_active(), vec![ids[0], ids[2]]);
        assert_eq!(registry.advance_active(4), 2);
        assert_eq!(
            registry.player(ids[2]).map(|p| p.position),
            Ok(Position::Mine(4))
        );
    }

    #[test]
    fn death_splits_mine_gems_between_co_located_survivors() {
        let (mut registry, ids) = registry_with(3);
        registry.enter_expedition();
        registry.credit(ids[0], 0, 7).expect("credit");
        registry.add_pickaxe(ids[0], PickaxeGrade::Gold).expect("add");
        let outcome = registry.apply_damage(ids[0], 3).expect("damage");
        let DamageOutcome::Died(report) = outcome else {
            panic!("expected death, got {outcome:?}");
        };
        assert_eq!(report.heirs, vec![ids[1], ids[2]]);
        assert_eq!((report.each, report.discarded), (3, 1));
        let dead = registry.player(ids[0]).expect("player");
        assert!(!dead.is_alive);
        assert_eq!(dead.position, Position::Camp);
        assert_eq!(dead.mine_gems, 0);
        assert!(dead.pickaxes.is_empty());
        assert_eq!(registry.player(ids[1]).map(|p| p.mine_gems), Ok(3));
    }

    #[test]
    fn death_without_company_loses_everything() {
        let (mut registry, ids) = registry_with(2);
        registry.enter_expedition();
        registry.bank(ids[1]).expect("bank");
        registry.credit(ids[0], 0, 9).expect("credit");
        let outcome = registry.apply_damage(ids[0], 3).expect("damage");
        let DamageOutcome::Died(report) = outcome else {
            panic!("expected death, got {outcome:?}");
        };
        assert!(report.heirs.is_empty());
        assert_eq!(report.discarded, 9);
        let survivor = registry.player(ids[1]).expect("player");
        assert_eq!((survivor.camp_gems, survivor.mine_gems), (10, 0));
    }

    #[test]
    fn dead_players_cannot_reenter() {
        let (mut registry, ids) = registry_with(1);
        registry.enter_expedition();
        registry.apply_damage(ids[0], 3).expect("damage");
        assert_eq!(
            registry.move_to(ids[0], Position::Mine(1)),
            Err(RegistryError::NotAlive(ids[0]))
        );
        assert_eq!(
            registry.apply_damage(ids[0], 1),
            Err(RegistryError::NotAlive(ids[0]))
        );
        registry.reset_for_round(3);
        assert!(registry.player(ids[0]).map(|p| p.is_alive).unwrap_or(false));
    }

    proptest! {
        #[test]
        fn dropped_gems_are_split_or_lost(gems in 0u32..500, others in 0usize..4) {
            let (mut registry, ids) = registry_with(others + 1);
            registry.enter_expedition();
            registry.credit(ids[0], 0, i64::from(gems)).expect("credit");
            let DamageOutcome::Died(report) = registry.apply_damage(ids[0], 3).expect("damage") else {
                panic!("expected death");
            };
            let heirs = others as u32;
            prop_assert_eq!(report.heirs.len(), others);
            if heirs == 0 {
                prop_assert_eq!(report.discarded, gems);
            } else {
                prop_assert_eq!(report.each, gems / heirs);
                prop_assert_eq!(report.each * heirs + report.discarded, gems);
            }
            for id in &ids[1..] {
                prop_assert_eq!(registry.player(*id).map(|p| p.mine_gems), Ok(report.each));
            }
            prop_assert_eq!(registry.player(ids[0]).map(|p| p.mine_gems), Ok(0));
        }
    }
}
