use crate::{
    AutoplayConfig, AutoplayError, AutoplayResult, GameRecord, RoundRecord, RunStatus, SeatTally,
    SummaryStats,
};
use deepdig_core::{Event, EventBus, Game, GameConfig, Phase};
use std::time::Instant;
use tracing::{debug, info};

#[derive(Debug)]
pub struct Simulator {
    pub game: Game,
    pub events: EventBus,
    rounds: Vec<RoundRecord>,
    event_count: usize,
    steps: u32,
}

impl Simulator {
    /// A fresh game with `players` computer players, still in preparation.
    pub fn new(config: GameConfig, seed: u64, players: usize) -> Result<Self, AutoplayError> {
        if players == 0 {
            return Err(AutoplayError::Setup("at least one player".to_string()));
        }
        if players > config.rounds.max_players {
            return Err(AutoplayError::Setup(format!(
                "{players} players but the table seats {}",
                config.rounds.max_players
            )));
        }
        let mut game = Game::new(config, seed);
        let mut events = EventBus::default();
        for seat in 1..=players {
            game.register_player(&format!("AI {seat}"), false, &mut events)?;
        }
        let mut sim = Self {
            game,
            events,
            rounds: Vec::new(),
            event_count: 0,
            steps: 0,
        };
        sim.absorb_events();
        Ok(sim)
    }

    pub fn is_finished(&self) -> bool {
        self.game.phase() == Phase::Results
    }

    pub fn rounds(&self) -> &[RoundRecord] {
        &self.rounds
    }

    /// Advances one phase. Computer players never wait on input, so a whole
    /// expedition resolves inside a single step.
    pub fn step(&mut self) -> Result<Phase, AutoplayError> {
        let phase = self.game.advance_phase(&mut self.events)?;
        self.steps += 1;
        self.absorb_events();
        Ok(phase)
    }

    pub fn run(mut self, max_steps: u32) -> Result<GameRecord, AutoplayError> {
        while !self.is_finished() && self.steps < max_steps {
            self.step()?;
        }
        let status = if self.is_finished() {
            RunStatus::Finished
        } else {
            RunStatus::MaxSteps
        };
        Ok(GameRecord {
            seed: self.game.seed(),
            status,
            steps: self.steps,
            event_count: self.event_count,
            standings: self.game.standings(),
            rounds: self.rounds,
        })
    }

    fn absorb_events(&mut self) {
        for event in self.events.drain() {
            self.event_count += 1;
            if let Event::ExpeditionStarted { round, .. } = event {
                self.rounds.push(RoundRecord {
                    round,
                    ..RoundRecord::default()
                });
                continue;
            }
            let Some(record) = self.rounds.last_mut() else {
                continue;
            };
            match event {
                Event::CardRevealed { .. } => record.cards_resolved += 1,
                Event::PlayerDied { .. } => record.deaths += 1,
                Event::PlayerRetreated { .. } => record.retreats += 1,
                Event::GemsAwarded { gems, .. } => record.gems_awarded += gems,
                Event::GemsBanked { gems, .. } => record.banked_at_end += gems,
                _ => {}
            }
        }
    }
}

/// Plays `autoplay.games` seeded games and tallies wins per seat.
pub fn simulate_many(
    config: &GameConfig,
    autoplay: &AutoplayConfig,
) -> Result<AutoplayResult, AutoplayError> {
    let started = Instant::now();
    let mut seats: Vec<SeatTally> = (0..autoplay.players)
        .map(|seat| SeatTally {
            seat,
            name: format!("AI {}", seat + 1),
            wins: 0,
            average_gems: 0.0,
        })
        .collect();
    let mut gem_totals = vec![0u64; autoplay.players];
    let mut games = Vec::new();
    let mut finished = 0u32;
    let mut deaths = 0u64;
    let mut winning_gems = 0u64;

    for index in 0..autoplay.games {
        let seed = autoplay.seed.wrapping_add(u64::from(index));
        let record =
            Simulator::new(config.clone(), seed, autoplay.players)?.run(autoplay.max_steps)?;
        if record.status == RunStatus::Finished {
            finished += 1;
        }
        deaths += record.deaths() as u64;
        for standing in &record.standings {
            let seat = seat_of(standing.player.0);
            if let Some(total) = seat.and_then(|seat| gem_totals.get_mut(seat)) {
                *total += u64::from(standing.camp_gems);
            }
        }
        if let Some(winner) = record.winner() {
            winning_gems += u64::from(winner.camp_gems);
            if let Some(tally) = seat_of(winner.player.0).and_then(|seat| seats.get_mut(seat)) {
                tally.wins += 1;
            }
            debug!(seed, winner = %winner.name, gems = winner.camp_gems, "game finished");
        }
        if autoplay.keep_games {
            games.push(record);
        }
    }

    let played = f64::from(autoplay.games.max(1));
    for (tally, total) in seats.iter_mut().zip(&gem_totals) {
        tally.average_gems = *total as f64 / played;
    }
    let summary = SummaryStats {
        games: autoplay.games,
        finished,
        deaths,
        average_winning_gems: winning_gems as f64 / played,
        wall_time_ms: started.elapsed().as_millis() as u64,
    };
    info!(
        games = summary.games,
        finished = summary.finished,
        "autoplay complete"
    );
    Ok(AutoplayResult {
        seats,
        summary,
        games,
    })
}

/// Players are registered in seat order and numbered from 1.
fn seat_of(id: u32) -> Option<usize> {
    (id as usize).checked_sub(1)
}
