//! Turn engine
//!
//! Owns the players, their agents and the single game generator. Play is
//! strictly sequential: one player's decision and shot are resolved at a
//! time, and the only place the engine waits is the agent's decision.
//!
//! Turn order: a turn belongs to the first non-terminal player in
//! registration order and lasts until that player passes, which only
//! happens once it succeeds or fails.

pub mod batch;
mod decision;
pub mod report;

pub use batch::{run_batch, BatchReport, PlayerStats};
pub use report::{GameReport, PlayerSummary};

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::agent::{AgentError, AgentFactory, AgentKind, CancelToken, DecisionRequest};
use crate::core::config::{GameConfig, VoidPolicy};
use crate::core::error::{FairwayError, Result};
use crate::core::types::{PlayerId, PlayerState, Position};
use crate::course::Course;
use crate::shot::{simulate, Shot, ShotRules};
use decision::{AgentSlot, DecisionOutcome};

/// Why an attempt produced no shot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoidReason {
    /// Not two finite numbers with a non-negative distance, or no action at all
    InvalidAction,
    Timeout,
    /// The agent panicked or reported a fault
    DecisionFault,
    PlanningExhausted,
}

/// An attempt that was spent without simulating a shot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidAttempt {
    pub attempt: u32,
    pub reason: VoidReason,
    pub detail: String,
}

/// Everything the engine tracks for one player
#[derive(Debug, Clone, Serialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    /// Name of the factory that built the agent
    pub kind: String,
    pub skill: u32,
    pub state: PlayerState,
    pub location: Position,
    /// Attempts used so far
    pub score: u32,
    pub shots: Vec<Shot>,
    pub voids: Vec<VoidAttempt>,
    /// Decision wall time, one list per turn
    pub turn_timings: Vec<Vec<Duration>>,
    pub timeouts: u32,
    pub errors: u32,
}

/// One line of the score table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub name: String,
    pub skill: u32,
    pub state: PlayerState,
    pub score: u32,
}

/// Presentation hook; sees every resolved attempt, never mutates the game
pub trait GameObserver {
    fn on_shot(&mut self, player: &PlayerRecord, shot: &Shot);

    fn on_void(&mut self, _player: &PlayerRecord, _void: &VoidAttempt) {}

    fn on_scores(&mut self, _table: &[ScoreRow]) {}
}

pub struct Game {
    config: GameConfig,
    rules: ShotRules,
    course: Arc<Course>,
    rng: ChaCha8Rng,
    seed: u64,
    players: Vec<PlayerRecord>,
    slots: Vec<AgentSlot>,
    next_player: Option<PlayerId>,
    processing_turn: bool,
    last_shot: Option<(PlayerId, Shot)>,
    observer: Option<Box<dyn GameObserver>>,
    end_logged: bool,
}

impl Game {
    /// New game on `course`; a `seed` of 0 draws a fresh one
    pub fn new(course: Course, config: GameConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let seed = if seed == 0 {
            let drawn = rand::random::<u64>();
            tracing::info!("Initialise random number generator with no seed (drew {})", drawn);
            drawn
        } else {
            tracing::info!("Initialise random number generator with {} seed", seed);
            seed
        };

        Ok(Self {
            rules: ShotRules::from(&config),
            config,
            course: Arc::new(course),
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            players: Vec::new(),
            slots: Vec::new(),
            next_player: None,
            processing_turn: false,
            last_shot: None,
            observer: None,
            end_logged: false,
        })
    }

    pub fn set_observer(&mut self, observer: Box<dyn GameObserver>) {
        self.observer = Some(observer);
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    /// The seed the game generator was built from
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.get(id.0)
    }

    pub fn player_by_name(&self, name: &str) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.name == name)
    }

    /// Player whose turn is next, if any
    pub fn next_player(&self) -> Option<PlayerId> {
        self.next_player
    }

    /// Most recently resolved shot and who played it
    pub fn last_shot(&self) -> Option<(PlayerId, &Shot)> {
        self.last_shot.as_ref().map(|(id, shot)| (*id, shot))
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    /// Register a player with a skill drawn from the game generator
    pub fn add_player(&mut self, name: &str, factory: &dyn AgentFactory) -> Result<PlayerId> {
        if self.player_by_name(name).is_some() {
            return Err(FairwayError::DuplicatePlayer(name.to_string()));
        }
        let skill = self.rng.gen_range(self.config.min_skill..=self.config.max_skill);
        self.add_player_with_skill(name, factory, skill)
    }

    /// Register a player with a fixed skill
    pub fn add_player_with_skill(
        &mut self,
        name: &str,
        factory: &dyn AgentFactory,
        skill: u32,
    ) -> Result<PlayerId> {
        if self.player_by_name(name).is_some() {
            return Err(FairwayError::DuplicatePlayer(name.to_string()));
        }
        if skill == 0 {
            return Err(FairwayError::InvalidConfig(format!("skill of {} must be positive", name)));
        }

        let id = PlayerId(self.players.len());
        let agent_rng = ChaCha8Rng::seed_from_u64(self.rng.gen());
        let agent = factory.create(skill, agent_rng);
        tracing::info!("Adding player {} ({}) with skill {}", name, factory.name(), skill);

        self.players.push(PlayerRecord {
            id,
            name: name.to_string(),
            kind: factory.name().to_string(),
            skill,
            state: PlayerState::NotStarted,
            location: self.course.start(),
            score: 0,
            shots: Vec::new(),
            voids: Vec::new(),
            turn_timings: Vec::new(),
            timeouts: 0,
            errors: 0,
        });
        self.slots.push(AgentSlot::new(agent));

        if self.next_player.is_none() {
            self.next_player = self.advance_turn();
        }
        Ok(id)
    }

    /// Register one player per roster entry
    ///
    /// Kinds that appear more than once are numbered `name.1`, `name.2`, ...
    pub fn add_roster(&mut self, roster: &[AgentKind]) -> Result<Vec<PlayerId>> {
        let mut ids = Vec::with_capacity(roster.len());
        for (i, kind) in roster.iter().enumerate() {
            let factory = kind.factory(&self.config);
            let total = roster.iter().filter(|k| *k == kind).count();
            let name = if total == 1 {
                factory.name().to_string()
            } else {
                let nth = roster[..=i].iter().filter(|k| *k == kind).count();
                format!("{}.{}", factory.name(), nth)
            };
            ids.push(self.add_player(&name, factory.as_ref())?);
        }
        Ok(ids)
    }

    // =========================================================================
    // TURN FLOW
    // =========================================================================

    /// True once every player is terminal
    pub fn is_game_over(&self) -> bool {
        self.players.iter().all(|p| p.state.is_terminal())
    }

    /// First non-terminal player in registration order
    pub fn advance_turn(&self) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| !p.state.is_terminal())
            .map(|p| p.id)
    }

    /// Resolve exactly one attempt for `player`
    ///
    /// Returns true when control should pass to the next player.
    pub fn step(&mut self, player: PlayerId) -> bool {
        let idx = player.0;
        let Some(record) = self.players.get(idx) else {
            return true;
        };
        if record.state.is_terminal() || record.score >= self.config.max_tries {
            return true;
        }

        let span = tracing::info_span!("player", name = %record.name);
        let _enter = span.enter();

        let record = &mut self.players[idx];
        if record.state == PlayerState::NotStarted {
            record.state = PlayerState::InProgress;
        }
        record.score += 1;
        let attempt = record.score;

        let request = DecisionRequest {
            course: Arc::clone(&self.course),
            current: record.location,
            attempt,
            cancel: CancelToken::new(),
        };
        let budget = self.config.use_timeout.then(|| self.config.decision_timeout());

        let started = Instant::now();
        let outcome = self.slots[idx].decide(request, budget);
        let elapsed = started.elapsed();
        match record.turn_timings.last_mut() {
            Some(turn) => turn.push(elapsed),
            None => record.turn_timings.push(vec![elapsed]),
        }

        let action = match outcome {
            DecisionOutcome::Decided(Ok(request)) if request.is_valid() => Ok(request),
            DecisionOutcome::Decided(Ok(request)) => Err((
                VoidReason::InvalidAction,
                format!("invalid action ({}, {})", request.distance, request.angle),
            )),
            DecisionOutcome::Decided(Err(AgentError::NoAction)) => {
                Err((VoidReason::InvalidAction, AgentError::NoAction.to_string()))
            }
            DecisionOutcome::Decided(Err(e @ AgentError::PlanningExhausted { .. })) => {
                Err((VoidReason::PlanningExhausted, e.to_string()))
            }
            DecisionOutcome::Decided(Err(AgentError::Cancelled)) | DecisionOutcome::TimedOut => {
                record.timeouts += 1;
                tracing::error!(
                    "Timeout {} since {:.3}s reached",
                    record.name,
                    self.config.decision_timeout_secs
                );
                Err((
                    VoidReason::Timeout,
                    format!("no decision within {:.3}s", self.config.decision_timeout_secs),
                ))
            }
            DecisionOutcome::Decided(Err(e @ AgentError::Fault(_))) => {
                record.errors += 1;
                tracing::error!("{}: {}", record.name, e);
                Err((VoidReason::DecisionFault, e.to_string()))
            }
            DecisionOutcome::Panicked(msg) | DecisionOutcome::Lost(msg) => {
                record.errors += 1;
                tracing::error!("{}: decision failed: {}", record.name, msg);
                Err((VoidReason::DecisionFault, msg))
            }
        };

        match action {
            Ok(request) => {
                let shot = simulate(
                    request,
                    record.skill,
                    record.location,
                    &self.course,
                    &self.rules,
                    &mut self.rng,
                );
                if shot.admissible {
                    record.location = shot.final_point;
                }
                record.shots.push(shot.clone());
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_shot(record, &shot);
                }

                let pass = if shot.reached_target {
                    tracing::info!("{} reached target with score {}", record.name, record.score);
                    record.state = PlayerState::Succeeded;
                    true
                } else if record.score >= self.config.max_tries {
                    tracing::info!(
                        "{} failed since it used {} max tries",
                        record.name,
                        self.config.max_tries
                    );
                    record.state = PlayerState::Failed;
                    true
                } else {
                    false
                };
                self.last_shot = Some((player, shot));
                pass
            }
            Err((reason, detail)) => {
                let void = VoidAttempt {
                    attempt,
                    reason,
                    detail,
                };
                record.voids.push(void.clone());
                if let Some(observer) = self.observer.as_mut() {
                    observer.on_void(record, &void);
                }

                let forfeit = match self.config.void_policy {
                    VoidPolicy::Forfeit => true,
                    VoidPolicy::ConsumeAttempt => record.score >= self.config.max_tries,
                };
                if forfeit {
                    tracing::info!("{} failed: {:?} on attempt {}", record.name, reason, attempt);
                    record.state = PlayerState::Failed;
                }
                forfeit
            }
        }
    }

    /// One attempt of the current turn; the turn ends when the player passes
    ///
    /// Returns the player that played, or None once the game is over.
    pub fn play_step(&mut self) -> Option<PlayerId> {
        let player = self.begin_turn()?;
        if self.step(player) {
            self.end_turn();
        }
        self.notify_scores();
        Some(player)
    }

    /// Play the current player's turn to completion
    pub fn play_turn(&mut self) -> Option<PlayerId> {
        let player = self.begin_turn()?;
        while !self.step(player) {}
        self.notify_scores();
        self.end_turn();
        Some(player)
    }

    /// Play until every player is terminal
    pub fn play_all(&mut self) {
        if self.is_game_over() {
            self.log_game_end();
            return;
        }
        tracing::debug!("Playing all turns");
        while !self.is_game_over() {
            if self.play_turn().is_none() {
                break;
            }
        }
        self.log_game_end();
    }

    pub fn score_table(&self) -> Vec<ScoreRow> {
        self.players
            .iter()
            .map(|p| ScoreRow {
                name: p.name.clone(),
                skill: p.skill,
                state: p.state,
                score: p.score,
            })
            .collect()
    }

    pub fn report(&self) -> GameReport {
        GameReport::from_game(self)
    }

    fn begin_turn(&mut self) -> Option<PlayerId> {
        if self.processing_turn {
            return self.next_player;
        }
        if self.is_game_over() {
            self.log_game_end();
            return None;
        }

        let stale = self
            .next_player
            .and_then(|id| self.players.get(id.0))
            .map_or(true, |p| p.state.is_terminal());
        if stale {
            self.next_player = self.advance_turn();
            tracing::debug!("Reassigned turn to the first unfinished player");
        }

        let player = self.next_player?;
        let record = &mut self.players[player.0];
        tracing::debug!("Current turn {}", record.name);
        record.state = PlayerState::InProgress;
        record.turn_timings.push(Vec::new());
        self.processing_turn = true;
        Some(player)
    }

    fn end_turn(&mut self) {
        self.processing_turn = false;
        self.next_player = self.advance_turn();
        if let Some(next) = self.next_player {
            tracing::debug!("Next turn {}", self.players[next.0].name);
        }
    }

    fn notify_scores(&mut self) {
        if self.observer.is_some() {
            let table = self.score_table();
            if let Some(observer) = self.observer.as_mut() {
                observer.on_scores(&table);
            }
        }
    }

    fn log_game_end(&mut self) {
        if !self.end_logged && self.is_game_over() {
            self.end_logged = true;
            tracing::info!("Game ended as each player finished playing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, DirectFactory};
    use crate::shot::ShotRequest;
    use std::sync::Mutex;

    type Decision = std::result::Result<ShotRequest, AgentError>;

    /// Replays a fixed script of decisions, then repeats the last one
    struct Scripted(Vec<Decision>);

    impl Agent for Scripted {
        fn decide(&mut self, _request: &DecisionRequest) -> Decision {
            if self.0.len() > 1 {
                self.0.remove(0)
            } else {
                self.0[0].clone()
            }
        }
    }

    struct ScriptFactory(Vec<Decision>);

    impl AgentFactory for ScriptFactory {
        fn name(&self) -> &str {
            "scripted"
        }

        fn create(&self, _skill: u32, _rng: ChaCha8Rng) -> Box<dyn Agent> {
            Box::new(Scripted(self.0.clone()))
        }
    }

    fn square_game(config: GameConfig) -> Game {
        let course =
            Course::rectangle(100.0, 100.0, Position::new(10.0, 50.0), Position::new(60.0, 50.0))
                .unwrap();
        Game::new(course, config, 7).unwrap()
    }

    fn untimed() -> GameConfig {
        GameConfig {
            use_timeout: false,
            ..GameConfig::default()
        }
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut game = square_game(untimed());
        let factory = DirectFactory::new(game.config());
        game.add_player("alice", &factory).unwrap();
        let result = game.add_player("alice", &factory);
        assert!(matches!(result, Err(FairwayError::DuplicatePlayer(_))));
        assert_eq!(game.players().len(), 1);
    }

    #[test]
    fn test_skill_drawn_in_range() {
        let mut game = square_game(untimed());
        let factory = DirectFactory::new(game.config());
        for i in 0..20 {
            let id = game.add_player(&format!("p{}", i), &factory).unwrap();
            let skill = game.player(id).unwrap().skill;
            assert!((10..=100).contains(&skill));
        }
    }

    #[test]
    fn test_roster_names_are_numbered() {
        let mut game = square_game(untimed());
        game.add_roster(&[AgentKind::Direct, AgentKind::Planner, AgentKind::Direct])
            .unwrap();
        let names: Vec<&str> = game.players().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["direct.1", "planner", "direct.2"]);
    }

    #[test]
    fn test_invalid_action_forfeits() {
        let mut game = square_game(untimed());
        let factory = ScriptFactory(vec![Ok(ShotRequest::new(f64::NAN, 0.0))]);
        let id = game.add_player_with_skill("nan", &factory, 50).unwrap();

        assert!(game.step(id));
        let record = game.player(id).unwrap();
        assert_eq!(record.state, PlayerState::Failed);
        assert_eq!(record.score, 1);
        assert!(record.shots.is_empty());
        assert_eq!(record.voids[0].reason, VoidReason::InvalidAction);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_void_consumes_attempt_under_policy() {
        let mut game = square_game(GameConfig {
            void_policy: VoidPolicy::ConsumeAttempt,
            max_tries: 3,
            ..untimed()
        });
        let factory = ScriptFactory(vec![Err(AgentError::NoAction)]);
        let id = game.add_player_with_skill("idle", &factory, 50).unwrap();

        assert!(!game.step(id));
        assert!(!game.step(id));
        assert_eq!(game.player(id).unwrap().state, PlayerState::InProgress);
        assert!(game.step(id));
        let record = game.player(id).unwrap();
        assert_eq!(record.state, PlayerState::Failed);
        assert_eq!(record.voids.len(), 3);
        // Further steps are no-ops
        assert!(game.step(id));
        assert_eq!(game.player(id).unwrap().score, 3);
    }

    #[test]
    fn test_panicking_agent_counts_error() {
        struct Boom;
        impl Agent for Boom {
            fn decide(&mut self, _r: &DecisionRequest) -> Decision {
                panic!("boom");
            }
        }
        struct BoomFactory;
        impl AgentFactory for BoomFactory {
            fn name(&self) -> &str {
                "boom"
            }
            fn create(&self, _skill: u32, _rng: ChaCha8Rng) -> Box<dyn Agent> {
                Box::new(Boom)
            }
        }

        let mut game = square_game(untimed());
        let boom = game.add_player_with_skill("boom", &BoomFactory, 50).unwrap();
        let steady = game
            .add_player_with_skill("steady", &DirectFactory::new(&untimed()), 10_000)
            .unwrap();
        game.play_all();

        let boom = game.player(boom).unwrap();
        assert_eq!(boom.errors, 1);
        assert_eq!(boom.state, PlayerState::Failed);
        assert_eq!(boom.voids[0].reason, VoidReason::DecisionFault);
        // The other player is unaffected
        assert_eq!(game.player(steady).unwrap().state, PlayerState::Succeeded);
    }

    #[test]
    fn test_inadmissible_shot_keeps_location() {
        let mut game = square_game(GameConfig {
            max_tries: 2,
            ..untimed()
        });
        // Straight out of the left edge
        let factory = ScriptFactory(vec![Ok(ShotRequest::new(50.0, std::f64::consts::PI))]);
        let id = game.add_player_with_skill("wild", &factory, 100_000).unwrap();

        assert!(!game.step(id));
        let record = game.player(id).unwrap();
        assert!(!record.shots[0].admissible);
        assert_eq!(record.location, Position::new(10.0, 50.0));
        assert!(game.step(id));
        assert_eq!(game.player(id).unwrap().state, PlayerState::Failed);
    }

    #[test]
    fn test_turn_goes_to_first_unfinished_player() {
        let mut game = square_game(untimed());
        let factory = ScriptFactory(vec![Ok(ShotRequest::new(50.0, std::f64::consts::PI))]);
        let first = game.add_player_with_skill("first", &factory, 50).unwrap();
        let second = game.add_player_with_skill("second", &factory, 50).unwrap();

        assert_eq!(game.next_player(), Some(first));
        assert_eq!(game.play_turn(), Some(first));
        assert_eq!(game.player(first).unwrap().score, 10);
        assert_eq!(game.next_player(), Some(second));
        assert_eq!(game.play_turn(), Some(second));
        assert_eq!(game.play_turn(), None);
        assert!(game.is_game_over());
    }

    #[test]
    fn test_stepwise_play_keeps_turn_until_pass() {
        let mut game = square_game(GameConfig {
            max_tries: 3,
            ..untimed()
        });
        let factory = ScriptFactory(vec![Ok(ShotRequest::new(50.0, std::f64::consts::PI))]);
        let first = game.add_player_with_skill("first", &factory, 50).unwrap();
        let second = game.add_player_with_skill("second", &factory, 50).unwrap();

        let order: Vec<PlayerId> = std::iter::from_fn(|| game.play_step()).collect();
        assert_eq!(order, vec![first, first, first, second, second, second]);
        let record = game.player(first).unwrap();
        assert_eq!(record.turn_timings.len(), 1);
        assert_eq!(record.turn_timings[0].len(), 3);
    }

    #[test]
    fn test_observer_sees_every_shot() {
        #[derive(Clone, Default)]
        struct Recorder(Arc<Mutex<(usize, usize)>>);
        impl GameObserver for Recorder {
            fn on_shot(&mut self, _player: &PlayerRecord, _shot: &Shot) {
                if let Ok(mut seen) = self.0.lock() {
                    seen.0 += 1;
                }
            }
            fn on_scores(&mut self, _table: &[ScoreRow]) {
                if let Ok(mut seen) = self.0.lock() {
                    seen.1 += 1;
                }
            }
        }

        let recorder = Recorder::default();
        let mut game = square_game(GameConfig {
            max_tries: 4,
            ..untimed()
        });
        game.set_observer(Box::new(recorder.clone()));
        let factory = ScriptFactory(vec![Ok(ShotRequest::new(50.0, std::f64::consts::PI))]);
        game.add_player_with_skill("wild", &factory, 50).unwrap();
        game.play_all();

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.0, 4);
        assert_eq!(seen.1, 1);
        assert!(game.last_shot().is_some());
    }
}
