//! Search-free verdicts on a configuration.
//!
//! These checks decide outcomes the breadth-first search would eventually
//! reach on its own, without expanding a single node.

use crate::executor::available_moves;
use crate::state::Configuration;

/// Upper bound on how many full monochrome containers the colour units of
/// `config` could ever form
pub fn max_complete_containers(config: &Configuration) -> usize {
    let capacity = config.params().capacity;
    config
        .color_counts()
        .values()
        .map(|&count| count / capacity)
        .sum()
}

/// Check whether the colour counts allow a goal state at all.
///
/// Pours conserve every colour, so a goal needs at least
/// `container_count - required_empty` full loads of a single colour.
pub fn goal_is_reachable(config: &Configuration) -> bool {
    max_complete_containers(config) >= config.params().filled_count()
}

/// No legal move exists
pub fn is_deadlock(config: &Configuration) -> bool {
    available_moves(config).next().is_none()
}
