//! Water sort puzzle solver.
//!
//! This crate models a "sort the coloured liquid" puzzle and finds a
//! shortest sequence of pours to a sorted state with a breadth-first
//! search. Puzzles are exchanged with the host game as JSON bottle arrays.

pub mod canonical;
pub mod executor;
pub mod game;
pub mod generator;
pub mod pruning;
pub mod puzzle;
pub mod solver;
pub mod state;

// Re-export main types
pub use canonical::{canonical_key, CanonicalKey};
pub use executor::{
    apply_move, available_moves, is_goal, is_valid_move, moves_along, replay, MoveError,
};
pub use game::{is_win, GameSession};
pub use generator::{empty_layout, generate};
pub use puzzle::{
    export_bottles, import_bottles, parse_bottles, BottleData, ColorTable, PuzzleError,
    PuzzleSettings,
};
pub use solver::{
    solve, solve_with, AbortReason, Solution, SolveOutcome, SolverConfig, SolverResult,
};
pub use state::{ColorId, Configuration, ConfigurationError, Container, Move, PuzzleParameters};
