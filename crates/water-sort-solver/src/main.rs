//! CLI entry point for the water sort solver.
//!
//! Usage:
//!   water-sort solve <puzzle.json> [options]
//!   water-sort solve --stdin [options]
//!   water-sort generate [--bottles n] [--empty n] [--length n] [--seed n]
//!   water-sort verify <puzzle.json> --moves 0>2,1>0
//!
//! Puzzles are JSON arrays of `{ "colors": [...], "freeSpace": n }`.
//! Reports go to stdout as JSON; logs go to stderr (set `RUST_LOG`).

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use log::info;
use serde::Serialize;

use water_sort_solver::pruning::is_deadlock;
use water_sort_solver::{
    apply_move, export_bottles, generate, is_goal, parse_bottles, solve_with, BottleData,
    ColorTable, Configuration, Move, PuzzleSettings, SolveOutcome, SolverConfig,
};

/// Exit code for unreadable or malformed input
const EXIT_BAD_INPUT: i32 = 2;

#[derive(Parser)]
#[command(name = "water-sort")]
#[command(about = "Breadth-first solver for water sort puzzles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a shortest sequence of pours that sorts the puzzle
    Solve {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Number of bottles that must end empty
        #[arg(long, default_value = "2")]
        empty: usize,

        /// Give up after this many distinct states
        #[arg(long)]
        max_states: Option<usize>,

        /// Only search solutions up to this many moves
        #[arg(long)]
        max_depth: Option<usize>,

        /// Maximum search time in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Print a random puzzle as JSON
    Generate {
        /// Total number of bottles
        #[arg(long, default_value = "12")]
        bottles: usize,

        /// Number of bottles that start empty
        #[arg(long, default_value = "2")]
        empty: usize,

        /// Units per bottle
        #[arg(long, default_value = "4")]
        length: usize,

        /// Seed for reproducible puzzles (random if omitted)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Apply a list of moves and report whether it sorts the puzzle
    Verify {
        /// Path to puzzle JSON file (use --stdin to read from stdin)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Read puzzle from stdin instead of file
        #[arg(long)]
        stdin: bool,

        /// Number of bottles that must end empty
        #[arg(long, default_value = "2")]
        empty: usize,

        /// Comma-separated pours, e.g. `0>2,1>0`
        #[arg(long)]
        moves: String,
    },
}

/// Output format for a solve run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveOutput {
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    move_count: Option<usize>,
    moves: Vec<Move>,
    states: Vec<Vec<BottleData>>,
    states_visited: usize,
    nodes_expanded: usize,
    max_depth_reached: usize,
    time_elapsed_ms: u64,
}

/// Output format for a verify run
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOutput {
    solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    moves_applied: usize,
    deadlock: bool,
    final_state: Vec<BottleData>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let code = match cli.command {
        Commands::Solve {
            file,
            stdin,
            empty,
            max_states,
            max_depth,
            timeout,
        } => {
            let (puzzle, table) = load_puzzle(file, stdin, empty);
            let config = SolverConfig {
                max_states,
                max_depth,
                timeout: timeout.map(Duration::from_secs),
                cancel: None,
            };
            run_solve(&puzzle, &table, &config)
        }
        Commands::Generate {
            bottles,
            empty,
            length,
            seed,
        } => {
            let settings = PuzzleSettings {
                num_bottles: bottles,
                empty_bottles: empty,
                bottle_length: length,
            };
            run_generate(&settings, seed.unwrap_or_else(rand::random))
        }
        Commands::Verify {
            file,
            stdin,
            empty,
            moves,
        } => {
            let (puzzle, table) = load_puzzle(file, stdin, empty);
            run_verify(&puzzle, &table, &moves)
        }
    };
    process::exit(code);
}

fn run_solve(puzzle: &Configuration, table: &ColorTable, config: &SolverConfig) -> i32 {
    let result = solve_with(puzzle, config);

    let (reason, moves, states) = match &result.outcome {
        SolveOutcome::Solved(solution) => {
            let states = solution
                .states()
                .iter()
                .map(|state| export_or_exit(state, table))
                .collect();
            (None, solution.moves().to_vec(), states)
        }
        SolveOutcome::Exhausted => (Some("no_solution".to_string()), Vec::new(), Vec::new()),
        SolveOutcome::Aborted(reason) => {
            (Some(reason.as_str().to_string()), Vec::new(), Vec::new())
        }
    };

    let output = SolveOutput {
        solved: result.is_solved(),
        reason,
        move_count: result.solution().map(|s| s.move_count()),
        moves,
        states,
        states_visited: result.states_visited,
        nodes_expanded: result.nodes_expanded,
        max_depth_reached: result.max_depth_reached,
        time_elapsed_ms: result.time_elapsed_ms,
    };
    print_json(&output);

    if result.is_solved() {
        0
    } else {
        1
    }
}

fn run_generate(settings: &PuzzleSettings, seed: u64) -> i32 {
    info!("generating puzzle with seed {seed}");
    match generate(settings, seed) {
        Ok((puzzle, table)) => {
            print_json(&export_or_exit(&puzzle, &table));
            0
        }
        Err(e) => {
            eprintln!("Error generating puzzle: {}", e);
            EXIT_BAD_INPUT
        }
    }
}

fn run_verify(puzzle: &Configuration, table: &ColorTable, moves: &str) -> i32 {
    let mut state = puzzle.clone();
    let mut moves_applied = 0;
    let mut reason = None;

    for token in moves.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let applied = token
            .parse::<Move>()
            .map_err(|e| e.to_string())
            .and_then(|mv| apply_move(&state, mv).map_err(|e| e.to_string()));
        match applied {
            Ok(next) => {
                state = next;
                moves_applied += 1;
            }
            Err(e) => {
                reason = Some(format!("step {}: {}", moves_applied + 1, e));
                break;
            }
        }
    }

    let solved = reason.is_none() && is_goal(&state);
    if reason.is_none() && !solved {
        reason = Some("not_solved".to_string());
    }

    let output = VerifyOutput {
        solved,
        reason,
        moves_applied,
        deadlock: is_deadlock(&state),
        final_state: export_or_exit(&state, table),
    };
    print_json(&output);

    if solved {
        0
    } else {
        1
    }
}

/// Read and parse the puzzle, exiting on failure
fn load_puzzle(file: Option<PathBuf>, stdin: bool, empty: usize) -> (Configuration, ColorTable) {
    let json_content = if stdin {
        let mut buffer = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buffer) {
            eprintln!("Error reading stdin: {}", e);
            process::exit(EXIT_BAD_INPUT);
        }
        buffer
    } else if let Some(path) = file {
        match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file {:?}: {}", path, e);
                process::exit(EXIT_BAD_INPUT);
            }
        }
    } else {
        eprintln!("Error: Must provide either a file path or --stdin");
        process::exit(EXIT_BAD_INPUT);
    };

    match parse_bottles(&json_content, empty) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("Error parsing puzzle: {}", e);
            process::exit(EXIT_BAD_INPUT);
        }
    }
}

fn export_or_exit(state: &Configuration, table: &ColorTable) -> Vec<BottleData> {
    match export_bottles(state, table) {
        Ok(bottles) => bottles,
        Err(e) => {
            eprintln!("Error exporting puzzle: {}", e);
            process::exit(EXIT_BAD_INPUT);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(EXIT_BAD_INPUT);
        }
    }
}
