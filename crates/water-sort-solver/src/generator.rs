//! Random and blank puzzle layouts.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::puzzle::{ColorTable, PuzzleError, PuzzleSettings};
use crate::state::{Configuration, Container};

/// Default colour palette, one entry per possible filled bottle
pub const PALETTE: [&str; 12] = [
    "#FF0000", // Red
    "#FFA500", // Orange
    "#FFFF00", // Yellow
    "#008000", // Green
    "#00FFFF", // Cyan
    "#0000FF", // Blue
    "#800080", // Purple
    "#FFC0CB", // Pink
    "#A52A2A", // Brown
    "#808080", // Gray
    "#ADD8E6", // Light Blue
    "#FF00FF", // Magenta
];

/// Generate a shuffled puzzle from a seed.
///
/// Picks one palette colour per filled bottle, shuffles `bottle_length`
/// units of each and pours them into the first bottles; the remaining
/// `empty_bottles` start empty.
pub fn generate(
    settings: &PuzzleSettings,
    seed: u64,
) -> Result<(Configuration, ColorTable), PuzzleError> {
    settings.validate()?;
    let filled = settings.filled_bottles();
    if filled > PALETTE.len() {
        return Err(PuzzleError::InvalidSettings(format!(
            "{filled} filled bottles but only {} palette colours",
            PALETTE.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut table = ColorTable::new();
    let mut units = Vec::with_capacity(filled * settings.bottle_length);
    for name in PALETTE.choose_multiple(&mut rng, filled) {
        let id = table.intern(name)?;
        units.extend(std::iter::repeat(id).take(settings.bottle_length));
    }
    units.shuffle(&mut rng);

    let mut containers = units
        .chunks(settings.bottle_length)
        .map(|chunk| Container::with_colors(settings.bottle_length, chunk.iter().copied()))
        .collect::<Result<Vec<_>, _>>()?;
    containers.resize(settings.num_bottles, Container::new(settings.bottle_length));

    let config = Configuration::new(settings.parameters(), containers)?;
    Ok((config, table))
}

/// All bottles empty, ready for hand-authoring
pub fn empty_layout(settings: &PuzzleSettings) -> Result<Configuration, PuzzleError> {
    let containers = vec![Container::new(settings.bottle_length); settings.num_bottles];
    Ok(Configuration::new(settings.parameters(), containers)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::solve;

    #[test]
    fn test_generate_shape() {
        let settings = PuzzleSettings::default();
        let (config, table) = generate(&settings, 7).unwrap();

        assert_eq!(config.len(), 12);
        assert_eq!(table.len(), 10);
        for container in &config.containers()[..10] {
            assert!(container.is_full());
        }
        for container in &config.containers()[10..] {
            assert!(container.is_empty());
        }
        for (_, count) in config.color_counts() {
            assert_eq!(count, settings.bottle_length);
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let settings = PuzzleSettings::default();
        let (a, _) = generate(&settings, 42).unwrap();
        let (b, _) = generate(&settings, 42).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_small_generated_puzzle_solves() {
        let settings = PuzzleSettings {
            num_bottles: 5,
            empty_bottles: 2,
            bottle_length: 3,
        };
        let (config, _) = generate(&settings, 3).unwrap();
        // Three colours, two spare bottles of three: always solvable
        let solution = solve(&config).unwrap();
        assert_eq!(solution.states()[0], config);
    }

    #[test]
    fn test_generate_rejects_bad_settings() {
        let settings = PuzzleSettings {
            num_bottles: 3,
            empty_bottles: 1,
            bottle_length: 4,
        };
        assert!(matches!(
            generate(&settings, 0),
            Err(PuzzleError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_empty_layout() {
        let config = empty_layout(&PuzzleSettings::default()).unwrap();
        assert_eq!(config.len(), 12);
        assert!(config.containers().iter().all(|c| c.is_empty()));
    }
}
