//! Headless play session: pour, undo and restart over a move history.

use log::{debug, trace};

use crate::executor::{apply_move, is_goal, MoveError};
use crate::solver::solve;
use crate::state::{Configuration, Move};

/// Win check used during play.
///
/// Stricter than the search goal: exactly `required_empty` containers must
/// be empty as well.
pub fn is_win(config: &Configuration) -> bool {
    let empty = config.containers().iter().filter(|c| c.is_empty()).count();
    empty == config.params().required_empty && is_goal(config)
}

/// One game in progress
#[derive(Debug, Clone)]
pub struct GameSession {
    /// Starting layout first, current layout last; never empty
    history: Vec<Configuration>,
}

impl GameSession {
    pub fn new(start: Configuration) -> Self {
        Self {
            history: vec![start],
        }
    }

    pub fn start(&self) -> &Configuration {
        &self.history[0]
    }

    pub fn current(&self) -> &Configuration {
        &self.history[self.history.len() - 1]
    }

    pub fn history(&self) -> &[Configuration] {
        &self.history
    }

    /// Pours made since the start, not counting undone ones
    pub fn move_count(&self) -> usize {
        self.history.len() - 1
    }

    pub fn can_undo(&self) -> bool {
        self.history.len() > 1
    }

    /// Pour and record the new layout; an illegal move changes nothing
    pub fn play(&mut self, mv: Move) -> Result<&Configuration, MoveError> {
        let next = apply_move(self.current(), mv)?;
        trace!("played {mv} (move {})", self.history.len());
        self.history.push(next);
        Ok(self.current())
    }

    /// Step back one pour. Returns false at the starting layout.
    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        self.history.pop();
        true
    }

    /// Back to the starting layout, dropping the history
    pub fn restart(&mut self) {
        debug!("restarting after {} moves", self.move_count());
        self.history.truncate(1);
    }

    /// Replace the game with a fresh layout
    pub fn new_game(&mut self, start: Configuration) {
        self.history.clear();
        self.history.push(start);
    }

    pub fn is_win(&self) -> bool {
        is_win(self.current())
    }

    /// First pour of a shortest solution from the current layout
    pub fn hint(&self) -> Option<Move> {
        solve(self.current())?.moves().first().copied()
    }
}
