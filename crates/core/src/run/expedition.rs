use super::*;
use crate::*;
use tracing::{debug, info, warn};

impl Game {
    pub(super) fn begin_expedition(
        &mut self,
        events: &mut EventBus,
    ) -> Result<Progress, GameError> {
        let length = self.config.rounds.sequence_length;
        self.round.sequence = self.deck.sample_round(length, &mut self.rng)?;
        self.round.current_card_index = 0;
        self.round.phase = Phase::Expedition;
        self.resolutions.clear();
        self.tracker.reset();
        let explorers = self.registry.enter_expedition();
        events.push(Event::ExpeditionStarted {
            round: self.round.current_round,
            cards: self.round.sequence.len(),
            explorers,
        });
        info!(round = self.round.current_round, explorers, "expedition started");
        self.open_window(events)?;
        self.pump(events)
    }

    /// Records a human choice for the open card. Complete windows resolve
    /// immediately, and play continues until a human decision is needed.
    pub fn submit_choice(
        &mut self,
        player: PlayerId,
        choice: Choice,
        events: &mut EventBus,
    ) -> Result<Progress, GameError> {
        self.require_phase(Phase::Expedition)?;
        let window = self.window.as_mut().ok_or(GameError::NoOpenWindow)?;
        let chooser = self.registry.player(player)?;
        let remaining = match window.submit(chooser, choice) {
            Ok(remaining) => remaining,
            Err(err) => {
                warn!(%player, %err, "choice rejected");
                return Err(err.into());
            }
        };
        let card_index = window.card_index();
        events.push(Event::ChoiceSubmitted { player, card_index });
        debug!(%player, card_index, remaining, "choice submitted");
        self.pump(events)
    }

    /// Closes a complete window by hand. Returns `None` when there is nothing
    /// to close, so repeated calls are harmless.
    pub fn close_window(&mut self, events: &mut EventBus) -> Result<Option<Resolution>, GameError> {
        if self.round.phase != Phase::Expedition {
            return Ok(None);
        }
        let first = self.resolve_window(events)?;
        if first.is_some() {
            self.pump(events)?;
        }
        Ok(first)
    }

    /// Players the open window is still waiting on.
    pub fn pending_choices(&self) -> Vec<PlayerId> {
        self.window
            .as_ref()
            .map(ChoiceWindow::pending)
            .unwrap_or_default()
    }

    fn open_window(&mut self, events: &mut EventBus) -> Result<(), GameError> {
        let active = self.registry.list_active();
        if active.is_empty() {
            self.end_round(events)?;
            return Ok(());
        }
        let card_index = self.round.current_card_index;
        let mut window = ChoiceWindow::open(card_index, active.clone());
        events.push(Event::ChoiceWindowOpened {
            card_index,
            players: active.clone(),
        });
        let max_health = self.config.rounds.starting_health;
        for id in active {
            let player = self.registry.player(id)?;
            if player.is_human {
                continue;
            }
            let choice = ai_choice(
                player,
                max_health,
                card_index,
                &self.config.ai.choice,
                &mut self.rng,
            );
            window.submit(player, choice)?;
            events.push(Event::ChoiceSubmitted {
                player: id,
                card_index,
            });
        }
        self.window = Some(window);
        Ok(())
    }

    fn pump(&mut self, events: &mut EventBus) -> Result<Progress, GameError> {
        let mut resolved = Vec::new();
        while self.round.phase == Phase::Expedition {
            match self.window.as_ref().map(ChoiceWindow::is_complete) {
                None => self.open_window(events)?,
                Some(true) => {
                    if let Some(resolution) = self.resolve_window(events)? {
                        resolved.push(resolution);
                    }
                }
                Some(false) => break,
            }
        }
        Ok(Progress {
            resolved,
            waiting_on: self.pending_choices(),
        })
    }

    fn resolve_window(&mut self, events: &mut EventBus) -> Result<Option<Resolution>, GameError> {
        let Some(set) = self.window.as_mut().and_then(ChoiceWindow::close) else {
            return Ok(None);
        };
        self.window = None;
        events.push(Event::ChoicesRevealed {
            card_index: set.card_index,
            choices: set.entries.clone(),
        });
        let card = self
            .round
            .sequence
            .get(set.card_index)
            .ok_or(GameError::CardOutOfRange(set.card_index))?;
        let resolution = resolve_card(
            card,
            &set,
            &mut self.registry,
            &mut self.tracker,
            &mut self.rng,
            events,
        )?;
        self.resolutions.push(resolution.clone());
        self.advance_card(events)?;
        Ok(Some(resolution))
    }

    fn advance_card(&mut self, events: &mut EventBus) -> Result<(), GameError> {
        let index = self.round.current_card_index;
        let explorers = self.registry.list_active().len();
        if explorers == 0 || self.round.sequence.is_last(index) {
            self.end_round(events)?;
            return Ok(());
        }
        let next = index + 1;
        self.round.current_card_index = next;
        self.registry.advance_active(next);
        events.push(Event::ExpeditionAdvanced {
            card_index: next,
            explorers,
        });
        Ok(())
    }
}
