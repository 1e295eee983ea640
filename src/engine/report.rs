//! Game results and serialization

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{Game, PlayerRecord, VoidAttempt};
use crate::core::error::Result;
use crate::core::types::{PlayerState, Position};
use crate::shot::Shot;

/// Complete result of one game
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameReport {
    pub seed: u64,
    pub start: Position,
    pub target: Position,
    pub game_over: bool,
    pub players: Vec<PlayerSummary>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub name: String,
    pub kind: String,
    pub skill: u32,
    pub state: PlayerState,
    pub score: u32,
    pub final_location: Position,
    /// Seconds per decision, one list per turn
    pub turn_timings: Vec<Vec<f64>>,
    pub total_time_secs: f64,
    pub timeouts: u32,
    pub errors: u32,
    pub voids: Vec<VoidAttempt>,
    pub shots: Vec<Shot>,
}

impl From<&PlayerRecord> for PlayerSummary {
    fn from(record: &PlayerRecord) -> Self {
        let turn_timings: Vec<Vec<f64>> = record
            .turn_timings
            .iter()
            .map(|turn| turn.iter().map(|d| d.as_secs_f64()).collect())
            .collect();
        let total_time_secs = turn_timings.iter().flatten().sum();

        Self {
            name: record.name.clone(),
            kind: record.kind.clone(),
            skill: record.skill,
            state: record.state,
            score: record.score,
            final_location: record.location,
            turn_timings,
            total_time_secs,
            timeouts: record.timeouts,
            errors: record.errors,
            voids: record.voids.clone(),
            shots: record.shots.clone(),
        }
    }
}

impl GameReport {
    pub fn from_game(game: &Game) -> Self {
        Self {
            seed: game.seed(),
            start: game.course().start(),
            target: game.course().target(),
            game_over: game.is_game_over(),
            players: game.players().iter().map(PlayerSummary::from).collect(),
        }
    }

    pub fn player(&self, name: &str) -> Option<&PlayerSummary> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(&self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Plain-text score table
    pub fn summary(&self) -> String {
        let mut out = format!("Game (seed {})\n", self.seed);
        out.push_str(&format!(
            "{:<16} {:>5} {:>5} {:>5} {:>9} {:>8} {:>6}\n",
            "Player", "Skill", "State", "Score", "Time (s)", "Timeouts", "Errors"
        ));
        for p in &self.players {
            out.push_str(&format!(
                "{:<16} {:>5} {:>5} {:>5} {:>9.3} {:>8} {:>6}\n",
                p.name,
                p.skill,
                p.state.code(),
                p.score,
                p.total_time_secs,
                p.timeouts,
                p.errors
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::DirectFactory;
    use crate::core::config::GameConfig;
    use crate::course::Course;

    fn played_game() -> Game {
        let config = GameConfig {
            use_timeout: false,
            ..GameConfig::default()
        };
        let course =
            Course::rectangle(100.0, 100.0, Position::new(10.0, 50.0), Position::new(60.0, 50.0))
                .unwrap();
        let mut game = Game::new(course, config.clone(), 11).unwrap();
        game.add_player_with_skill("ace", &DirectFactory::new(&config), 10_000)
            .unwrap();
        game.play_all();
        game
    }

    #[test]
    fn test_summary_mirrors_records() {
        let game = played_game();
        let report = game.report();
        let ace = report.player("ace").unwrap();

        assert_eq!(report.seed, 11);
        assert!(report.game_over);
        assert_eq!(ace.state, PlayerState::Succeeded);
        assert_eq!(ace.score, 1);
        assert_eq!(ace.shots.len(), 1);
        assert_eq!(ace.turn_timings.len(), 1);
        assert!(ace.total_time_secs >= 0.0);
    }

    #[test]
    fn test_json_round_trip() {
        let report = played_game().report();
        let parsed: GameReport = serde_json::from_str(&report.to_json()).unwrap();
        assert_eq!(parsed.players.len(), 1);
        assert_eq!(parsed.players[0].name, "ace");
        assert_eq!(parsed.players[0].state, PlayerState::Succeeded);
    }

    #[test]
    fn test_text_summary_lists_players() {
        let summary = played_game().report().summary();
        assert!(summary.contains("seed 11"));
        assert!(summary.lines().any(|l| l.starts_with("ace") && l.contains(" S ")));
    }
}
