use super::*;
use crate::*;
use tracing::{debug, info};

impl Game {
    /// Ends the running expedition: banks whoever is still underground, then
    /// either starts the next round's shopping or finishes the game.
    /// Returns `false` without touching anything when there is no round to end.
    pub fn end_round(&mut self, events: &mut EventBus) -> Result<bool, GameError> {
        if self.round.phase != Phase::Expedition || self.round.round_has_ended() {
            debug!(phase = ?self.round.phase, "end_round ignored");
            return Ok(false);
        }
        let round = self.round.current_round;
        self.round.ended_round = Some(round);
        self.window = None;

        for (player, gems) in self.registry.bank_all_active() {
            let camp_gems = self.registry.player(player)?.camp_gems;
            events.push(Event::GemsBanked {
                player,
                gems,
                camp_gems,
            });
        }
        events.push(Event::RoundEnded { round });
        info!(round, "round ended");

        if self.round.is_final_round() {
            self.round.phase = Phase::Results;
            let standings = self.standings();
            info!(
                winner = standings.first().map(|s| s.name.as_str()).unwrap_or("-"),
                "game finished"
            );
            events.push(Event::GameFinished { standings });
            return Ok(true);
        }

        self.registry
            .reset_for_round(self.config.rounds.starting_health);
        self.tracker.reset();
        self.round.current_round += 1;
        self.round.current_card_index = 0;
        self.round.sequence = MineSequence::default();
        self.round.phase = Phase::Shopping;
        events.push(Event::RoundStarted {
            round: self.round.current_round,
            max_rounds: self.round.max_rounds,
        });
        Ok(true)
    }

    /// Moves the game forward from wherever it is waiting on the host.
    pub fn advance_phase(&mut self, events: &mut EventBus) -> Result<Phase, GameError> {
        match self.round.phase {
            Phase::Preparation => self.start_game(events)?,
            Phase::Shopping => {
                self.finish_shopping(events)?;
            }
            Phase::Expedition => {
                if self.close_window(events)?.is_none() {
                    return Err(GameError::InvalidPhase(Phase::Expedition));
                }
            }
            Phase::Results => return Err(GameError::InvalidPhase(Phase::Results)),
        }
        Ok(self.round.phase)
    }

    /// Players ranked by camp gems. Ties keep registration order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut players: Vec<&Player> = self.registry.iter().collect();
        players.sort_by(|a, b| b.camp_gems.cmp(&a.camp_gems));
        players
            .into_iter()
            .enumerate()
            .map(|(index, player)| Standing {
                rank: index + 1,
                player: player.id,
                name: player.name.clone(),
                camp_gems: player.camp_gems,
            })
            .collect()
    }

    pub fn winner(&self) -> Option<Standing> {
        if self.round.phase != Phase::Results {
            return None;
        }
        self.standings().into_iter().next()
    }
}
