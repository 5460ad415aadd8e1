//! Move rules: legality, pouring and the goal test.
//!
//! Everything here is a pure function of its inputs. A pour moves the whole
//! same-colour run on top of the source, or as much of it as the target can
//! take; whatever does not fit stays behind.

use thiserror::Error;

use crate::state::{Configuration, Move};

/// Errors raised by the public move operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("invalid move {0}")]
    InvalidMove(Move),
    #[error("state {step} is not one pour away from its successor")]
    Disconnected { step: usize },
}

/// Check whether pouring from `from` into `to` is legal
pub fn is_valid_move(config: &Configuration, from: usize, to: usize) -> bool {
    if from == to {
        return false;
    }
    let (Some(source), Some(target)) = (config.container(from), config.container(to)) else {
        return false;
    };

    // Nothing to pour
    if source.is_empty() {
        return false;
    }

    // No room
    if target.is_full() {
        return false;
    }

    // Any colour may start an empty container
    if target.is_empty() {
        return true;
    }

    source.top() == target.top()
}

/// Pour without re-checking legality. The move must already be valid.
pub(crate) fn pour(config: &Configuration, mv: Move) -> Configuration {
    let run_length = config[mv.from].top_run_length();
    let movable = run_length.min(config[mv.to].free_space());
    config.with_transfer(mv.from, mv.to, movable)
}

/// Apply a move, returning the new configuration.
///
/// The input is left untouched. Moves the validator rejects yield
/// [`MoveError::InvalidMove`] instead of a silent no-op.
pub fn apply_move(config: &Configuration, mv: Move) -> Result<Configuration, MoveError> {
    if !is_valid_move(config, mv.from, mv.to) {
        return Err(MoveError::InvalidMove(mv));
    }
    Ok(pour(config, mv))
}

/// All legal moves, `from` ascending then `to` ascending
pub fn available_moves(config: &Configuration) -> impl Iterator<Item = Move> + '_ {
    let count = config.len();
    (0..count)
        .flat_map(move |from| (0..count).map(move |to| Move::new(from, to)))
        .filter(move |mv| is_valid_move(config, mv.from, mv.to))
}

/// Check whether the configuration is solved: exactly
/// `container_count - required_empty` containers are full and monochrome
pub fn is_goal(config: &Configuration) -> bool {
    config.complete_count() == config.params().filled_count()
}

/// Recover the moves linking consecutive states of a path
pub fn moves_along(path: &[Configuration]) -> Result<Vec<Move>, MoveError> {
    path.windows(2)
        .enumerate()
        .map(|(step, pair)| {
            available_moves(&pair[0])
                .find(|&mv| pour(&pair[0], mv) == pair[1])
                .ok_or(MoveError::Disconnected { step })
        })
        .collect()
}

/// Apply a sequence of moves, stopping at the first invalid one
pub fn replay(
    config: &Configuration,
    moves: impl IntoIterator<Item = Move>,
) -> Result<Configuration, MoveError> {
    moves
        .into_iter()
        .try_fold(config.clone(), |state, mv| apply_move(&state, mv))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ColorId;

    const R: ColorId = ColorId(0);
    const G: ColorId = ColorId(1);
    const B: ColorId = ColorId(2);

    fn create_config(capacity: usize, empty: usize, stacks: &[&[ColorId]]) -> Configuration {
        Configuration::from_stacks(capacity, empty, stacks.iter().map(|s| s.to_vec())).unwrap()
    }

    fn stacks(config: &Configuration) -> Vec<Vec<ColorId>> {
        config
            .containers()
            .iter()
            .map(|c| c.colors().to_vec())
            .collect()
    }

    #[test]
    fn test_rejects_same_and_out_of_range() {
        let config = create_config(4, 1, &[&[R, R], &[R], &[]]);
        for i in 0..config.len() {
            assert!(!is_valid_move(&config, i, i));
            assert!(!is_valid_move(&config, i, config.len()));
            assert!(!is_valid_move(&config, config.len() + 5, i));
        }
    }

    #[test]
    fn test_validator_rules() {
        let config = create_config(2, 1, &[&[R, G], &[G], &[], &[R, R]]);
        // Empty source
        assert!(!is_valid_move(&config, 2, 1));
        // Full target
        assert!(!is_valid_move(&config, 1, 0));
        // Empty target takes anything
        assert!(is_valid_move(&config, 0, 2));
        assert!(is_valid_move(&config, 3, 2));
        // Matching tops
        assert!(is_valid_move(&config, 0, 1));
        // Mismatched tops (target has room but wrong colour)
        let config = create_config(3, 0, &[&[R], &[G]]);
        assert!(!is_valid_move(&config, 0, 1));
    }

    #[test]
    fn test_single_pour_to_empty() {
        let config = create_config(4, 2, &[&[R, R, R], &[R], &[]]);
        let next = apply_move(&config, Move::new(1, 2)).unwrap();
        assert_eq!(stacks(&next), vec![vec![R, R, R], vec![], vec![R]]);
    }

    #[test]
    fn test_single_pour_onto_matching_top() {
        let config = create_config(4, 2, &[&[R, R, R], &[R], &[]]);
        let next = apply_move(&config, Move::new(1, 0)).unwrap();
        assert_eq!(stacks(&next), vec![vec![R, R, R, R], vec![], vec![]]);
        assert!(is_goal(&next));
    }

    #[test]
    fn test_whole_run_moves_when_it_fits() {
        let config = create_config(4, 0, &[&[B, R, R, R], &[R]]);
        let next = apply_move(&config, Move::new(0, 1)).unwrap();
        assert_eq!(stacks(&next), vec![vec![B], vec![R, R, R, R]]);
    }

    #[test]
    fn test_partial_pour_keeps_remainder() {
        let config = create_config(4, 0, &[&[B, R, R, R], &[G, G, R]]);
        let next = apply_move(&config, Move::new(0, 1)).unwrap();
        assert_eq!(stacks(&next), vec![vec![B, R, R], vec![G, G, R, R]]);
    }

    #[test]
    fn test_invalid_move_is_an_error() {
        let config = create_config(2, 0, &[&[R, G], &[G, R]]);
        assert_eq!(
            apply_move(&config, Move::new(0, 1)),
            Err(MoveError::InvalidMove(Move::new(0, 1)))
        );
        assert_eq!(
            apply_move(&config, Move::new(0, 0)),
            Err(MoveError::InvalidMove(Move::new(0, 0)))
        );
    }

    #[test]
    fn test_conservation_and_free_space_symmetry() {
        let config = create_config(4, 2, &[&[B, R, G, G], &[R, G], &[B, B, R], &[], &[R, B]]);
        for mv in available_moves(&config).collect::<Vec<_>>() {
            let next = apply_move(&config, mv).unwrap();
            assert_eq!(config.color_counts(), next.color_counts(), "move {mv}");

            let before = config[mv.from].free_space() + config[mv.to].free_space();
            let after = next[mv.from].free_space() + next[mv.to].free_space();
            assert_eq!(before, after, "move {mv}");

            for i in (0..config.len()).filter(|&i| i != mv.from && i != mv.to) {
                assert_eq!(config[i], next[i]);
            }
        }
    }

    #[test]
    fn test_earlier_states_are_never_modified() {
        let start = create_config(4, 2, &[&[G, R, R], &[R, G], &[], &[G]]);
        let snapshot = start.clone();

        let first = apply_move(&start, Move::new(0, 2)).unwrap();
        let first_snapshot = first.clone();
        let second = apply_move(&first, Move::new(1, 3)).unwrap();
        let third = apply_move(&second, Move::new(1, 2)).unwrap();
        let fourth = apply_move(&third, Move::new(0, 3)).unwrap();
        assert_eq!(fourth[3].colors(), &[G, G, G]);

        assert_eq!(start, snapshot);
        assert_eq!(first, first_snapshot);
    }

    #[test]
    fn test_goal_test() {
        assert!(is_goal(&create_config(4, 1, &[&[R, R, R, R], &[]])));
        assert!(is_goal(&create_config(2, 1, &[&[R, R], &[G, G], &[]])));
        // Full but mixed
        assert!(!is_goal(&create_config(2, 1, &[&[R, G], &[G, R], &[]])));
        // Monochrome but not full
        assert!(!is_goal(&create_config(4, 1, &[&[R, R, R], &[R]])));
    }

    #[test]
    fn test_available_moves_order() {
        let config = create_config(3, 1, &[&[R], &[R], &[]]);
        let moves: Vec<_> = available_moves(&config).collect();
        assert_eq!(
            moves,
            vec![
                Move::new(0, 1),
                Move::new(0, 2),
                Move::new(1, 0),
                Move::new(1, 2)
            ]
        );
    }

    #[test]
    fn test_moves_along_and_replay() {
        let start = create_config(2, 1, &[&[R, G], &[G, R], &[]]);
        let moves = vec![Move::new(0, 2), Move::new(1, 0), Move::new(1, 2)];
        let mut path = vec![start.clone()];
        for &mv in &moves {
            let next = apply_move(path.last().unwrap(), mv).unwrap();
            path.push(next);
        }
        assert_eq!(moves_along(&path).unwrap(), moves);
        assert_eq!(&replay(&start, moves).unwrap(), path.last().unwrap());

        let broken = vec![path[0].clone(), path[2].clone()];
        assert_eq!(
            moves_along(&broken),
            Err(MoveError::Disconnected { step: 0 })
        );
    }
}
