use crate::AutoplayError;
use deepdig_core::Standing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RunStatus {
    Finished,
    MaxSteps,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundRecord {
    pub round: u8,
    pub cards_resolved: usize,
    pub deaths: usize,
    pub retreats: usize,
    pub gems_awarded: u32,
    /// Gems carried out by players still underground when the round ended.
    pub banked_at_end: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub seed: u64,
    pub status: RunStatus,
    pub steps: u32,
    pub event_count: usize,
    pub rounds: Vec<RoundRecord>,
    pub standings: Vec<Standing>,
}

impl GameRecord {
    pub fn winner(&self) -> Option<&Standing> {
        self.standings.first()
    }

    pub fn deaths(&self) -> usize {
        self.rounds.iter().map(|round| round.deaths).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatTally {
    pub seat: usize,
    pub name: String,
    pub wins: u32,
    pub average_gems: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStats {
    pub games: u32,
    pub finished: u32,
    pub deaths: u64,
    pub average_winning_gems: f64,
    pub wall_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoplayResult {
    pub seats: Vec<SeatTally>,
    pub summary: SummaryStats,
    #[serde(default)]
    pub games: Vec<GameRecord>,
}

impl AutoplayResult {
    pub fn to_text_report(&self) -> String {
        let mut lines = vec![
            format!(
                "summary/汇总: games/局数={} finished/完成={} deaths/死亡={} wall_ms/耗时毫秒={}",
                self.summary.games,
                self.summary.finished,
                self.summary.deaths,
                self.summary.wall_time_ms
            ),
            format!(
                "winning gems/获胜宝石: avg/平均={:.1}",
                self.summary.average_winning_gems
            ),
            String::new(),
            "seats/座位:".to_string(),
        ];
        for seat in &self.seats {
            let share = if self.summary.games == 0 {
                0.0
            } else {
                f64::from(seat.wins) * 100.0 / f64::from(self.summary.games)
            };
            lines.push(format!(
                "  seat/座位 {} {:<8} wins/胜场={:>4} ({share:>5.1}%) avg gems/平均宝石={:.1}",
                seat.seat + 1,
                seat.name,
                seat.wins,
                seat.average_gems
            ));
        }
        if !self.games.is_empty() {
            lines.push(String::new());
            lines.push("games/对局:".to_string());
        }
        for game in &self.games {
            let winner = game
                .winner()
                .map(|standing| format!("{} ({})", standing.name, standing.camp_gems))
                .unwrap_or_else(|| "-".to_string());
            lines.push(format!(
                "  seed/种子 {} | {} | winner/胜者 {} | steps/步数 {} events/事件 {}",
                game.seed,
                run_status_label(game.status),
                winner,
                game.steps,
                game.event_count
            ));
            for round in &game.rounds {
                lines.push(format!(
                    "    round/轮 {}: cards/卡牌={} deaths/死亡={} retreats/撤退={} awarded/获得={} banked/带出={}",
                    round.round,
                    round.cards_resolved,
                    round.deaths,
                    round.retreats,
                    round.gems_awarded,
                    round.banked_at_end
                ));
            }
        }
        lines.join("\n")
    }
}

fn run_status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Finished => "Finished/完成",
        RunStatus::MaxSteps => "MaxSteps/达到最大步数",
    }
}

pub fn write_json(path: &Path, result: &AutoplayResult) -> Result<(), AutoplayError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string_pretty(result)?;
    fs::write(path, body)?;
    Ok(())
}

pub fn write_text(path: &Path, result: &AutoplayResult) -> Result<(), AutoplayError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, result.to_text_report())?;
    Ok(())
}
