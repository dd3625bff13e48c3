use super::*;
use crate::*;
use tracing::{info, warn};

impl Game {
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let deck = Deck::from_templates(&config.cards);
        let round = RoundState::new(config.rounds.max_rounds);
        Self {
            rng: RngState::from_seed(seed),
            deck,
            registry: PlayerRegistry::new(),
            tracker: DamageTracker::new(),
            round,
            window: None,
            resolutions: Vec::new(),
            config,
        }
    }

    pub fn with_entropy(config: GameConfig) -> Self {
        Self::new(config, rand::random())
    }

    pub fn register_player(
        &mut self,
        name: &str,
        is_human: bool,
        events: &mut EventBus,
    ) -> Result<PlayerId, GameError> {
        self.require_phase(Phase::Preparation)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyName);
        }
        let limit = self.config.rounds.max_players;
        if self.registry.len() >= limit {
            warn!(limit, "table is full");
            return Err(GameError::TableFull(limit));
        }
        let rules = &self.config.rounds;
        let id = self.registry.register(
            name,
            is_human,
            rules.starting_health,
            rules.starting_camp_gems,
        );
        events.push(Event::PlayerRegistered {
            player: id,
            name: name.to_string(),
            human: is_human,
        });
        Ok(id)
    }

    /// Leaves preparation and opens the first shopping phase. Rules that
    /// could never finish a round are rejected here and the game stays in
    /// preparation.
    pub fn start_game(&mut self, events: &mut EventBus) -> Result<(), GameError> {
        self.require_phase(Phase::Preparation)?;
        if self.registry.is_empty() {
            return Err(GameError::NoPlayers);
        }
        if let Err(err) = playable(&self.config) {
            warn!(%err, "unplayable rules");
            return Err(err);
        }
        self.round.phase = Phase::Shopping;
        events.push(Event::GameStarted {
            players: self.registry.len(),
            max_rounds: self.round.max_rounds,
        });
        events.push(Event::RoundStarted {
            round: self.round.current_round,
            max_rounds: self.round.max_rounds,
        });
        info!(
            players = self.registry.len(),
            seed = self.rng.seed(),
            "game started"
        );
        Ok(())
    }
}

fn playable(config: &GameConfig) -> Result<(), GameError> {
    let rules = &config.rounds;
    if rules.max_rounds == 0 {
        return Err(GameError::InvalidRules("no rounds".to_string()));
    }
    if rules.starting_health == 0 {
        return Err(GameError::InvalidRules("players start dead".to_string()));
    }
    if rules.sequence_length == 0 {
        return Err(GameError::InvalidRules("empty mine sequence".to_string()));
    }
    let pool = config.pool_size();
    if pool < rules.sequence_length {
        return Err(DeckError::PoolTooSmall {
            pool,
            wanted: rules.sequence_length,
        }
        .into());
    }
    Ok(())
}
