//! Fairway - command line runner
//!
//! Plays one game (or a batch of games over consecutive seeds) headless
//! and prints the results.

use std::fs::File;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fairway::agent::AgentKind;
use fairway::core::config::GameConfig;
use fairway::core::error::Result;
use fairway::course::load_or_default;
use fairway::engine::{run_batch, Game, GameObserver, PlayerRecord, ScoreRow, VoidAttempt};
use fairway::shot::Shot;

#[derive(Parser, Debug)]
#[command(name = "fairway")]
#[command(about = "Play the target-approach game with built-in agents")]
struct Args {
    /// Path to a course JSON file; the default course is used if missing
    #[arg(long, short = 'm')]
    map: Option<PathBuf>,

    /// Seed for the game generator, 0 for a fresh seed on every launch
    #[arg(long, short = 's', default_value_t = 2021)]
    seed: u64,

    /// Players: d (direct) or g2 (planner), space or comma separated
    #[arg(long, short = 'p', num_args = 1.., value_delimiter = ',', default_value = "d")]
    players: Vec<String>,

    /// TOML file overriding game constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Do not enforce the decision time budget
    #[arg(long)]
    no_timeout: bool,

    /// Step through the game one shot at a time
    #[arg(long)]
    interactive: bool,

    /// Play this many games over consecutive seeds and report aggregates
    #[arg(long, default_value_t = 1)]
    games: usize,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,

    /// Log filter directive, e.g. "fairway=debug"
    #[arg(long)]
    log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Write the JSON report of the game to this file
    #[arg(long)]
    results: Option<PathBuf>,
}

/// Prints each resolved attempt for interactive play
struct ShotPrinter;

impl GameObserver for ShotPrinter {
    fn on_shot(&mut self, player: &PlayerRecord, shot: &Shot) {
        println!(
            "{} #{}: {:?} {:.2} @ {:.3} rad -> ({:.2}, {:.2}){}{}",
            player.name,
            player.score,
            shot.kind,
            shot.actual_distance,
            shot.actual_angle,
            shot.final_point.x,
            shot.final_point.y,
            if shot.admissible { "" } else { " out of bounds" },
            if shot.reached_target { " IN" } else { "" },
        );
    }

    fn on_void(&mut self, player: &PlayerRecord, void: &VoidAttempt) {
        println!("{} #{}: void ({:?}: {})", player.name, void.attempt, void.reason, void.detail);
    }

    fn on_scores(&mut self, table: &[ScoreRow]) {
        let line: Vec<String> = table
            .iter()
            .map(|row| format!("{} {} {}", row.name, row.state.code(), row.score))
            .collect();
        println!("[{}]", line.join(" | "));
    }
}

fn init_logging(args: &Args) -> Result<()> {
    let filter = match &args.log_level {
        Some(directive) => EnvFilter::new(directive),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fairway=info")),
    };

    match &args.log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    if args.no_timeout || args.interactive {
        config.use_timeout = false;
    }

    let roster = AgentKind::parse_roster(&args.players)?;
    let course = load_or_default(args.map.as_deref());

    if args.games > 1 {
        let report = run_batch(&course, &config, &roster, args.seed, args.games)?;
        match args.format.as_str() {
            "json" => println!("{}", report.to_json()),
            _ => print!("{}", report.summary()),
        }
        return Ok(());
    }

    let mut game = Game::new(course, config, args.seed)?;
    game.add_roster(&roster)?;

    if args.interactive {
        play_interactive(&mut game)?;
    } else {
        game.play_all();
    }

    let report = game.report();
    match args.format.as_str() {
        "json" => println!("{}", report.to_json()),
        _ => print!("{}", report.summary()),
    }
    if let Some(path) = &args.results {
        report.write_json(path)?;
        tracing::info!("Results written to {}", path.display());
    }
    Ok(())
}

fn play_interactive(game: &mut Game) -> Result<()> {
    game.set_observer(Box::new(ShotPrinter));
    println!("Enter: next shot | t: finish turn | a: play all | q: quit");

    let stdin = io::stdin();
    let mut input = String::new();
    while !game.is_game_over() {
        print!("> ");
        io::stdout().flush()?;
        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }
        match input.trim() {
            "q" | "quit" => break,
            "a" | "all" => game.play_all(),
            "t" | "turn" => {
                game.play_turn();
            }
            _ => {
                game.play_step();
            }
        }
    }
    Ok(())
}
