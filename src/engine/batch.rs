//! Batch evaluation over many seeds
//!
//! Games are independent, so they run in parallel; each one is still
//! strictly sequential inside.

use ahash::AHashMap;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::{Game, GameReport};
use crate::agent::AgentKind;
use crate::core::config::GameConfig;
use crate::core::error::{FairwayError, Result};
use crate::core::types::PlayerState;
use crate::course::Course;

/// Per-player aggregate over a batch
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub games: u32,
    pub successes: u32,
    pub success_rate: f64,
    /// Attempts used, averaged over every game
    pub mean_score: f64,
    /// Attempts used, averaged over successful games only
    pub mean_score_on_success: Option<f64>,
    pub timeouts: u32,
    pub errors: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BatchReport {
    pub first_seed: u64,
    pub games: usize,
    pub players: Vec<PlayerStats>,
}

impl BatchReport {
    pub fn from_reports(first_seed: u64, reports: &[GameReport]) -> Self {
        let mut index: AHashMap<String, usize> = AHashMap::new();
        let mut players: Vec<PlayerStats> = Vec::new();
        let mut score_sums: Vec<(u64, u64)> = Vec::new(); // (all games, successes)

        for summary in reports.iter().flat_map(|r| r.players.iter()) {
            let i = *index.entry(summary.name.clone()).or_insert_with(|| {
                players.push(PlayerStats {
                    name: summary.name.clone(),
                    ..PlayerStats::default()
                });
                score_sums.push((0, 0));
                players.len() - 1
            });

            let stats = &mut players[i];
            stats.games += 1;
            stats.timeouts += summary.timeouts;
            stats.errors += summary.errors;
            score_sums[i].0 += summary.score as u64;
            if summary.state == PlayerState::Succeeded {
                stats.successes += 1;
                score_sums[i].1 += summary.score as u64;
            }
        }

        for (stats, (all, won)) in players.iter_mut().zip(score_sums) {
            if stats.games > 0 {
                stats.success_rate = stats.successes as f64 / stats.games as f64;
                stats.mean_score = all as f64 / stats.games as f64;
            }
            if stats.successes > 0 {
                stats.mean_score_on_success = Some(won as f64 / stats.successes as f64);
            }
        }

        Self {
            first_seed,
            games: reports.len(),
            players,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn summary(&self) -> String {
        let mut out = format!("{} games from seed {}\n", self.games, self.first_seed);
        out.push_str(&format!(
            "{:<16} {:>8} {:>10} {:>10} {:>8} {:>6}\n",
            "Player", "Success", "Mean score", "Mean (S)", "Timeouts", "Errors"
        ));
        for p in &self.players {
            let on_success = p
                .mean_score_on_success
                .map_or_else(|| "-".to_string(), |m| format!("{:.2}", m));
            out.push_str(&format!(
                "{:<16} {:>7.1}% {:>10.2} {:>10} {:>8} {:>6}\n",
                p.name,
                p.success_rate * 100.0,
                p.mean_score,
                on_success,
                p.timeouts,
                p.errors
            ));
        }
        out
    }
}

/// Play `games` full games of `roster`, seeded `first_seed`, `first_seed + 1`, ...
///
/// A `first_seed` of 0 draws one for the whole batch; the report carries
/// the seed actually used.
pub fn run_batch(
    course: &Course,
    config: &GameConfig,
    roster: &[AgentKind],
    first_seed: u64,
    games: usize,
) -> Result<BatchReport> {
    let first_seed = resolve_first_seed(first_seed, games)?;
    tracing::info!(
        "Running {} games of {} players from seed {}",
        games,
        roster.len(),
        first_seed
    );

    let reports = (0..games as u64)
        .into_par_iter()
        .map(|i| -> Result<GameReport> {
            let mut game = Game::new(course.clone(), config.clone(), first_seed + i)?;
            game.add_roster(roster)?;
            game.play_all();
            Ok(game.report())
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BatchReport::from_reports(first_seed, &reports))
}

/// Every game seed must be non-zero, so the run may not wrap past `u64::MAX`
fn resolve_first_seed(first_seed: u64, games: usize) -> Result<u64> {
    let span = games.saturating_sub(1) as u64;
    if first_seed == 0 {
        let drawn = rand::thread_rng().gen_range(1..=u64::MAX - span);
        tracing::info!("Batch has no seed, drew {}", drawn);
        return Ok(drawn);
    }
    first_seed.checked_add(span).map(|_| first_seed).ok_or_else(|| {
        FairwayError::InvalidConfig(format!(
            "{} games from seed {} overflow the seed range",
            games, first_seed
        ))
    })
}
