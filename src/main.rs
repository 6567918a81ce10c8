//! Xiangqi-Engine command line.
//!
//! ## Usage
//!
//! - `xiangqi-engine` - Start the text protocol on stdin/stdout
//! - `xiangqi-engine protocol` - Same as above
//! - `xiangqi-engine demo` - Let the engine play itself for a few plies
//! - `xiangqi-engine analyze <board> <side>` - Search one position and report

use std::io;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

use xiangqi_engine::board::{Board, Side};
use xiangqi_engine::game::{Game, GameStatus};
use xiangqi_engine::protocol::Protocol;
use xiangqi_engine::search::{Difficulty, Engine, SearchConfig};

/// Xiangqi-Engine: Chinese chess rules and alpha-beta AI
#[derive(Parser)]
#[command(name = "xiangqi-engine")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level for messages written to stderr
    #[arg(long, global = true, default_value = "warn")]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Read protocol commands from stdin and answer on stdout
    Protocol {
        #[arg(long, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,
    },
    /// Let the engine play both sides from the opening
    Demo {
        /// Number of plies to play
        #[arg(long, default_value_t = 10)]
        plies: usize,
        #[arg(long, default_value_t = Difficulty::Easy)]
        difficulty: Difficulty,
        /// Seed for the engine's random source
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Search a single position and print the report
    Analyze {
        /// Board text, rank 0 first, e.g. the opening array
        board: String,
        /// Side to move
        #[arg(default_value = "red")]
        side: Side,
        #[arg(long, default_value_t = Difficulty::Medium)]
        difficulty: Difficulty,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(cli.log_level)
        .init()
        .context("failed to install logger")?;

    match cli.command {
        Some(Commands::Protocol { difficulty }) => run_protocol(difficulty),
        None => run_protocol(Difficulty::default()),
        Some(Commands::Demo {
            plies,
            difficulty,
            seed,
        }) => run_demo(plies, engine(difficulty, seed)),
        Some(Commands::Analyze {
            board,
            side,
            difficulty,
            seed,
        }) => run_analyze(&board, side, engine(difficulty, seed)),
    }
}

fn engine(difficulty: Difficulty, seed: Option<u64>) -> Engine {
    let config = SearchConfig::from(difficulty);
    match seed {
        Some(seed) => Engine::with_seed(config, seed),
        None => Engine::new(config),
    }
}

fn run_protocol(difficulty: Difficulty) -> Result<()> {
    let mut protocol = Protocol::new(Engine::new(difficulty.into()));
    protocol.run(io::stdin().lock(), io::stdout().lock())
}

fn run_demo(plies: usize, engine: Engine) -> Result<()> {
    println!("Xiangqi-Engine self-play, depth {}\n", engine.config().depth);
    let mut game = Game::new(engine);
    println!("{}", game.board());

    for ply in 1..=plies {
        if game.status() != GameStatus::Playing {
            break;
        }
        let side = game.to_move();
        let Some(record) = game.engine_move()? else {
            break;
        };
        match record.captured {
            Some(captured) => println!("{ply:>3}. {side:<5} {} x {:?}", record.mv, captured.kind),
            None => println!("{ply:>3}. {side:<5} {}", record.mv),
        }
    }

    println!("\n{}", game.board());
    println!("Status: {}", game.status());
    let stats = game.engine().cache_stats();
    println!(
        "Cache: {} hits, {} misses, {} move entries, {} score entries",
        stats.hits, stats.misses, stats.move_entries, stats.score_entries
    );
    Ok(())
}

fn run_analyze(text: &str, side: Side, mut engine: Engine) -> Result<()> {
    let board = Board::from_text(text).context("invalid board text")?;
    println!("{board}");

    let Some(report) = engine.search(&board, side) else {
        println!("{side} has no legal move");
        return Ok(());
    };
    println!("Best move: {} (score {:.1})", report.mv, report.score);
    let tied: Vec<String> = report.best_moves.iter().map(|mv| mv.to_string()).collect();
    println!("Tied best: {}", tied.join(" "));
    println!(
        "Candidates: {}, nodes: {}, cached: {}, random: {}",
        report.candidates, report.nodes, report.from_cache, report.randomized
    );
    Ok(())
}
