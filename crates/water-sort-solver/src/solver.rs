//! Breadth-first search for a shortest pour sequence.
//!
//! Nodes live in an arena and point at their parent by index, so the winning
//! path is rebuilt by walking back from the goal and replaying its moves.
//! Visited states are kept only as canonical keys; full configurations are
//! held just for the frontier.
//!
//! The search is unbounded by default. [`SolverConfig`] can cap it by
//! visited states, depth or wall-clock time, or stop it through a shared
//! cancel flag.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use rustc_hash::FxHashSet;

use crate::canonical::{canonical_key, CanonicalKey};
use crate::executor::{available_moves, is_goal, pour};
use crate::pruning::goal_is_reachable;
use crate::state::{Configuration, Move};

/// Configuration for the solver
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Stop once this many distinct states have been seen. Checked between
    /// expansions, so the final count may overshoot by one node's successors.
    pub max_states: Option<usize>,
    /// Do not expand nodes at this depth or deeper
    pub max_depth: Option<usize>,
    /// Maximum time to search
    pub timeout: Option<Duration>,
    /// Checked between node expansions
    pub cancel: Option<Arc<AtomicBool>>,
}

impl SolverConfig {
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Why a bounded search stopped early
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    StateLimit,
    Timeout,
    Cancelled,
}

impl AbortReason {
    pub fn as_str(self) -> &'static str {
        match self {
            AbortReason::StateLimit => "state_limit",
            AbortReason::Timeout => "timeout",
            AbortReason::Cancelled => "cancelled",
        }
    }
}

/// A shortest path from the initial state to a goal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    states: Vec<Configuration>,
    moves: Vec<Move>,
}

impl Solution {
    /// Every state from the initial one to the goal; `move_count() + 1` long
    pub fn states(&self) -> &[Configuration] {
        &self.states
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    pub fn goal(&self) -> &Configuration {
        // Never empty: the initial state is always present
        &self.states[self.states.len() - 1]
    }
}

/// How the search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// A goal was reached
    Solved(Solution),
    /// Every reachable state (within `max_depth`, if set) was explored
    /// without finding a goal
    Exhausted,
    /// A configured bound stopped the search first
    Aborted(AbortReason),
}

/// Result of the solver search
#[derive(Debug, Clone)]
pub struct SolverResult {
    pub outcome: SolveOutcome,
    /// Distinct states seen, including the initial one
    pub states_visited: usize,
    /// Nodes whose successors were generated
    pub nodes_expanded: usize,
    /// Deepest level dequeued
    pub max_depth_reached: usize,
    /// Time elapsed in milliseconds
    pub time_elapsed_ms: u64,
}

impl SolverResult {
    pub fn is_solved(&self) -> bool {
        matches!(self.outcome, SolveOutcome::Solved(_))
    }

    pub fn solution(&self) -> Option<&Solution> {
        match &self.outcome {
            SolveOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self.outcome {
            SolveOutcome::Solved(solution) => Some(solution),
            _ => None,
        }
    }
}

/// Arena entry; the root has no incoming edge
#[derive(Debug, Clone, Copy)]
struct SearchNode {
    edge: Option<(usize, Move)>,
    depth: usize,
}

/// Find a shortest solution with no search bounds.
///
/// Returns `None` when no goal is reachable.
pub fn solve(initial: &Configuration) -> Option<Solution> {
    solve_with(initial, &SolverConfig::default()).into_solution()
}

/// Breadth-first search from `initial` under the given bounds
pub fn solve_with(initial: &Configuration, config: &SolverConfig) -> SolverResult {
    let start_time = Instant::now();
    let deadline = config.timeout.map(|timeout| start_time + timeout);

    info!(
        "solving {} containers of capacity {} ({} must end empty)",
        initial.params().container_count,
        initial.params().capacity,
        initial.params().required_empty,
    );

    let mut nodes = vec![SearchNode {
        edge: None,
        depth: 0,
    }];
    let mut visited: FxHashSet<CanonicalKey> = FxHashSet::default();
    visited.insert(canonical_key(initial));

    let mut nodes_expanded = 0;
    let mut current_depth = 0;

    let finish = |outcome: SolveOutcome, visited: usize, expanded: usize, depth: usize| {
        let result = SolverResult {
            outcome,
            states_visited: visited,
            nodes_expanded: expanded,
            max_depth_reached: depth,
            time_elapsed_ms: start_time.elapsed().as_millis() as u64,
        };
        match &result.outcome {
            SolveOutcome::Solved(solution) => info!(
                "solved in {} moves after visiting {} states",
                solution.move_count(),
                result.states_visited
            ),
            SolveOutcome::Exhausted => info!(
                "no solution after visiting {} states",
                result.states_visited
            ),
            SolveOutcome::Aborted(reason) => info!(
                "search aborted ({}) after visiting {} states",
                reason.as_str(),
                result.states_visited
            ),
        }
        result
    };

    if !goal_is_reachable(initial) {
        debug!("colour counts cannot fill the required containers");
        return finish(SolveOutcome::Exhausted, visited.len(), 0, 0);
    }

    let mut queue: VecDeque<(usize, Configuration)> = VecDeque::new();
    queue.push_back((0, initial.clone()));

    while let Some((index, state)) = queue.pop_front() {
        // Oldest node first; log each new level once
        let depth = nodes[index].depth;
        if depth > current_depth {
            current_depth = depth;
            debug!(
                "depth {depth}: {} queued, {} visited",
                queue.len() + 1,
                visited.len()
            );
        }

        // Goal test on dequeue
        if is_goal(&state) {
            let solution = reconstruct(initial, &nodes, index);
            return finish(
                SolveOutcome::Solved(solution),
                visited.len(),
                nodes_expanded,
                current_depth,
            );
        }

        // Bounds are checked between expansions only
        let abort = if config.is_cancelled() {
            Some(AbortReason::Cancelled)
        } else if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            Some(AbortReason::Timeout)
        } else if config.max_states.is_some_and(|max| visited.len() >= max) {
            Some(AbortReason::StateLimit)
        } else {
            None
        };
        if let Some(reason) = abort {
            return finish(
                SolveOutcome::Aborted(reason),
                visited.len(),
                nodes_expanded,
                current_depth,
            );
        }

        // Depth cap: tested above, never expanded
        if config.max_depth.is_some_and(|max| depth >= max) {
            continue;
        }

        // Expand in (from, to) order; skip states already seen
        nodes_expanded += 1;
        for mv in available_moves(&state) {
            let next = pour(&state, mv);
            if !visited.insert(canonical_key(&next)) {
                continue;
            }
            trace!("node {index} --{mv}--> node {}", nodes.len());
            nodes.push(SearchNode {
                edge: Some((index, mv)),
                depth: depth + 1,
            });
            queue.push_back((nodes.len() - 1, next));
        }
    }

    finish(
        SolveOutcome::Exhausted,
        visited.len(),
        nodes_expanded,
        current_depth,
    )
}

/// Walk parent links back from `goal` and replay the moves forward
fn reconstruct(initial: &Configuration, nodes: &[SearchNode], goal: usize) -> Solution {
    let mut moves = std::iter::successors(nodes[goal].edge, |&(parent, _)| nodes[parent].edge)
        .map(|(_, mv)| mv)
        .collect::<Vec<_>>();
    moves.reverse();

    let mut states = Vec::with_capacity(moves.len() + 1);
    states.push(initial.clone());
    for &mv in &moves {
        let next = pour(&states[states.len() - 1], mv);
        states.push(next);
    }
    Solution { states, moves }
}
