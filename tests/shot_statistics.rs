//! Statistical check of one-shot success against an independent model
//!
//! A putt from 10 units is resolved by the engine over many seeds, and
//! the success rate is compared with a Monte Carlo estimate computed
//! here directly from the perturbation model.

use fairway::agent::DirectFactory;
use fairway::core::config::GameConfig;
use fairway::core::types::{PlayerState, Position};
use fairway::course::Course;
use fairway::engine::Game;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

const SKILL: u32 = 20;
const PUTT: f64 = 10.0;
const RADIUS: f64 = 0.054;

/// Distance from the target (at `PUTT` along angle 0) to a roll of
/// length `d` at angle `a` from the origin
fn miss_distance(d: f64, a: f64) -> f64 {
    let (dx, dy) = (a.cos(), a.sin());
    let along = (PUTT * dx).clamp(0.0, d);
    let (px, py) = (along * dx, along * dy);
    ((PUTT - px).powi(2) + py.powi(2)).sqrt()
}

fn model_success_rate(samples: usize) -> f64 {
    let mut rng = ChaCha8Rng::seed_from_u64(0xfa1a);
    let skill = SKILL as f64;
    let distance = Normal::new(PUTT, PUTT / skill).unwrap();
    let angle = Normal::new(0.0, 1.0 / (2.0 * skill)).unwrap();

    let hits = (0..samples)
        .filter(|_| {
            let d = distance.sample(&mut rng);
            let a = angle.sample(&mut rng);
            miss_distance(d, a) <= RADIUS
        })
        .count();
    hits as f64 / samples as f64
}

fn engine_success_rate(games: u64) -> f64 {
    let config = GameConfig {
        use_timeout: false,
        max_tries: 1,
        ..GameConfig::default()
    };
    let course =
        Course::rectangle(100.0, 100.0, Position::new(40.0, 50.0), Position::new(50.0, 50.0)).unwrap();
    let factory = DirectFactory::new(&config);

    let hits = (1..=games)
        .filter(|seed| {
            let mut game = Game::new(course.clone(), config.clone(), *seed).unwrap();
            let id = game.add_player_with_skill("putter", &factory, SKILL).unwrap();
            game.play_all();
            game.player(id).unwrap().state == PlayerState::Succeeded
        })
        .count();
    hits as f64 / games as f64
}

#[test]
fn test_putt_success_matches_perturbation_model() {
    let expected = model_success_rate(50_000);
    let observed = engine_success_rate(2_000);

    assert!(expected > 0.02 && expected < 0.3, "model rate {}", expected);
    assert!(
        (observed - expected).abs() < 0.03,
        "engine {} vs model {}",
        observed,
        expected
    );
}

#[test]
fn test_precision_grows_with_skill() {
    let config = GameConfig {
        use_timeout: false,
        max_tries: 1,
        ..GameConfig::default()
    };
    let course =
        Course::rectangle(100.0, 100.0, Position::new(40.0, 50.0), Position::new(50.0, 50.0)).unwrap();
    let factory = DirectFactory::new(&config);

    let rate = |skill: u32| {
        let hits = (1..=400u64)
            .filter(|seed| {
                let mut game = Game::new(course.clone(), config.clone(), *seed).unwrap();
                let id = game.add_player_with_skill("p", &factory, skill).unwrap();
                game.play_all();
                game.player(id).unwrap().state == PlayerState::Succeeded
            })
            .count();
        hits as f64 / 400.0
    };

    assert!(rate(200) > rate(10));
}
