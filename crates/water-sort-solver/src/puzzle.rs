//! Puzzle types that match the host application's JSON format.
//!
//! Bottles arrive as `{ "colors": [...], "freeSpace": n }` with colours as
//! opaque strings (usually hex codes). They are interned into dense
//! [`ColorId`]s on the way in and translated back on the way out.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::{ColorId, Configuration, ConfigurationError, Container, PuzzleParameters};

pub const MIN_BOTTLES: usize = 4;
pub const MAX_BOTTLES: usize = 14;
pub const MIN_EMPTY_BOTTLES: usize = 2;
pub const MIN_BOTTLE_LENGTH: usize = 2;
pub const MAX_BOTTLE_LENGTH: usize = 7;

/// Most distinct colours a single puzzle may use
pub const MAX_COLORS: usize = u8::MAX as usize + 1;

/// Errors raised while importing or exporting puzzles
#[derive(Debug, Error)]
pub enum PuzzleError {
    #[error("puzzle has no bottles")]
    NoBottles,
    #[error("bottle {index} has capacity {actual}, expected {expected}")]
    InconsistentCapacity {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("bottle {index} capacity does not fit in memory")]
    CapacityOverflow { index: usize },
    #[error("puzzle uses more than 256 distinct colours")]
    TooManyColors,
    #[error("colour id {0} is not in the colour table")]
    UnknownColor(ColorId),
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("malformed puzzle JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A bottle as exchanged with the host application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BottleData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<usize>,
    pub colors: Vec<String>,
    pub free_space: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl BottleData {
    /// `colors + freeSpace`, or `None` if the sum overflows
    pub fn capacity(&self) -> Option<usize> {
        self.colors.len().checked_add(self.free_space)
    }
}

/// Puzzle settings as stored by the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleSettings {
    pub num_bottles: usize,
    pub empty_bottles: usize,
    pub bottle_length: usize,
}

impl Default for PuzzleSettings {
    fn default() -> Self {
        Self {
            num_bottles: 12,
            empty_bottles: 2,
            bottle_length: 4,
        }
    }
}

impl PuzzleSettings {
    /// Bottles that start (and end) filled
    pub fn filled_bottles(&self) -> usize {
        self.num_bottles.saturating_sub(self.empty_bottles)
    }

    pub fn parameters(&self) -> PuzzleParameters {
        PuzzleParameters::new(self.num_bottles, self.bottle_length, self.empty_bottles)
    }

    /// Check the settings against the ranges the game allows
    pub fn validate(&self) -> Result<(), PuzzleError> {
        if !(MIN_BOTTLES..=MAX_BOTTLES).contains(&self.num_bottles) {
            return Err(PuzzleError::InvalidSettings(format!(
                "numBottles {} not in {MIN_BOTTLES}..={MAX_BOTTLES}",
                self.num_bottles
            )));
        }
        if !(MIN_BOTTLE_LENGTH..=MAX_BOTTLE_LENGTH).contains(&self.bottle_length) {
            return Err(PuzzleError::InvalidSettings(format!(
                "bottleLength {} not in {MIN_BOTTLE_LENGTH}..={MAX_BOTTLE_LENGTH}",
                self.bottle_length
            )));
        }
        let max_empty = self.num_bottles - 2;
        if !(MIN_EMPTY_BOTTLES..=max_empty).contains(&self.empty_bottles) {
            return Err(PuzzleError::InvalidSettings(format!(
                "emptyBottles {} not in {MIN_EMPTY_BOTTLES}..={max_empty}",
                self.empty_bottles
            )));
        }
        Ok(())
    }
}

/// Two-way mapping between colour names and dense ids
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    names: Vec<String>,
    ids: FxHashMap<String, ColorId>,
}

impl ColorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `name`, assigning the next free one on first sight
    pub fn intern(&mut self, name: &str) -> Result<ColorId, PuzzleError> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }
        if self.names.len() >= MAX_COLORS {
            return Err(PuzzleError::TooManyColors);
        }
        let id = ColorId(self.names.len() as u8);
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn name(&self, id: ColorId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Build a configuration from exported bottles.
///
/// Every bottle must have the same capacity (`colors + freeSpace`).
pub fn import_bottles(
    bottles: &[BottleData],
    required_empty: usize,
) -> Result<(Configuration, ColorTable), PuzzleError> {
    let first = bottles.first().ok_or(PuzzleError::NoBottles)?;
    let capacity = first
        .capacity()
        .ok_or(PuzzleError::CapacityOverflow { index: 0 })?;

    let mut table = ColorTable::new();
    let mut containers = Vec::with_capacity(bottles.len());
    for (index, bottle) in bottles.iter().enumerate() {
        let actual = bottle
            .capacity()
            .ok_or(PuzzleError::CapacityOverflow { index })?;
        if actual != capacity {
            return Err(PuzzleError::InconsistentCapacity {
                index,
                expected: capacity,
                actual,
            });
        }
        let colors = bottle
            .colors
            .iter()
            .map(|name| table.intern(name))
            .collect::<Result<Vec<_>, _>>()?;
        containers.push(Container::with_colors(capacity, colors)?);
    }

    let params = PuzzleParameters::new(bottles.len(), capacity, required_empty);
    let config = Configuration::new(params, containers)?;
    Ok((config, table))
}

/// Parse a JSON bottle array into a configuration
pub fn parse_bottles(
    json: &str,
    required_empty: usize,
) -> Result<(Configuration, ColorTable), PuzzleError> {
    let bottles: Vec<BottleData> = serde_json::from_str(json)?;
    import_bottles(&bottles, required_empty)
}

/// Convert a configuration back into exported bottles
pub fn export_bottles(
    config: &Configuration,
    table: &ColorTable,
) -> Result<Vec<BottleData>, PuzzleError> {
    config
        .containers()
        .iter()
        .enumerate()
        .map(|(index, container)| {
            let colors = container
                .colors()
                .iter()
                .map(|&id| {
                    table
                        .name(id)
                        .map(str::to_string)
                        .ok_or(PuzzleError::UnknownColor(id))
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(BottleData {
                id: Some(index),
                colors,
                free_space: container.free_space(),
                label: None,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_bottle(colors: &[&str], free_space: usize) -> BottleData {
        BottleData {
            id: None,
            colors: colors.iter().map(|c| c.to_string()).collect(),
            free_space,
            label: None,
        }
    }

    #[test]
    fn test_parse_host_json() {
        let json = r##"[
            {"id": 0, "colors": ["#FF0000", "#0000FF"], "freeSpace": 2, "label": "1"},
            {"id": 1, "colors": ["#0000FF"], "freeSpace": 3},
            {"colors": [], "freeSpace": 4}
        ]"##;
        let (config, table) = parse_bottles(json, 1).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(config.params().capacity, 4);
        assert_eq!(config.params().container_count, 3);
        assert_eq!(config.params().required_empty, 1);
        assert_eq!(config[0].colors(), &[ColorId(0), ColorId(1)]);
        assert_eq!(config[1].colors(), &[ColorId(1)]);
        assert!(config[2].is_empty());
        assert_eq!(table.name(ColorId(1)), Some("#0000FF"));
    }

    #[test]
    fn test_export_restores_names() {
        let bottles = vec![
            create_bottle(&["red", "blue"], 0),
            create_bottle(&["blue"], 1),
            create_bottle(&[], 2),
        ];
        let (config, table) = import_bottles(&bottles, 1).unwrap();
        let exported = export_bottles(&config, &table).unwrap();
        assert_eq!(exported[0].colors, vec!["red", "blue"]);
        assert_eq!(exported[1].free_space, 1);
        assert_eq!(exported[2].id, Some(2));
        assert!(exported[2].colors.is_empty());

        let json = serde_json::to_string(&exported[1]).unwrap();
        assert_eq!(json, r#"{"id":1,"colors":["blue"],"freeSpace":1}"#);
    }

    #[test]
    fn test_rejects_mixed_capacities() {
        let bottles = vec![create_bottle(&["red"], 3), create_bottle(&["red"], 2)];
        assert!(matches!(
            import_bottles(&bottles, 0),
            Err(PuzzleError::InconsistentCapacity {
                index: 1,
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn test_rejects_empty_and_malformed_input() {
        assert!(matches!(import_bottles(&[], 0), Err(PuzzleError::NoBottles)));
        assert!(matches!(
            parse_bottles(r#"[{"colors": ["a"]}]"#, 0),
            Err(PuzzleError::Json(_))
        ));
        assert!(matches!(
            parse_bottles(r#"[{"colors": [], "freeSpace": 0}]"#, 0),
            Err(PuzzleError::Configuration(
                ConfigurationError::InvalidCapacity(0)
            ))
        ));
    }

    #[test]
    fn test_rejects_overflowing_free_space() {
        let json = format!(r#"[{{"colors": ["a"], "freeSpace": {}}}]"#, usize::MAX);
        assert!(matches!(
            parse_bottles(&json, 0),
            Err(PuzzleError::CapacityOverflow { index: 0 })
        ));

        let json = format!(
            r#"[{{"colors": ["a"], "freeSpace": 1}}, {{"colors": ["a"], "freeSpace": {}}}]"#,
            usize::MAX
        );
        assert!(matches!(
            parse_bottles(&json, 0),
            Err(PuzzleError::CapacityOverflow { index: 1 })
        ));
    }

    #[test]
    fn test_color_table_limit() {
        let mut table = ColorTable::new();
        for i in 0..MAX_COLORS {
            table.intern(&format!("c{i}")).unwrap();
        }
        assert_eq!(table.intern("c7").unwrap(), ColorId(7));
        assert!(matches!(
            table.intern("one-too-many"),
            Err(PuzzleError::TooManyColors)
        ));
    }

    #[test]
    fn test_settings_validation() {
        assert!(PuzzleSettings::default().validate().is_ok());
        let too_many = PuzzleSettings {
            num_bottles: 15,
            ..Default::default()
        };
        assert!(too_many.validate().is_err());
        let too_long = PuzzleSettings {
            bottle_length: 8,
            ..Default::default()
        };
        assert!(too_long.validate().is_err());
        let no_filled = PuzzleSettings {
            num_bottles: 4,
            empty_bottles: 3,
            bottle_length: 4,
        };
        assert!(no_filled.validate().is_err());
    }

    #[test]
    fn test_settings_json_names() {
        let settings: PuzzleSettings =
            serde_json::from_str(r#"{"numBottles": 6, "emptyBottles": 2, "bottleLength": 3}"#)
                .unwrap();
        assert_eq!(settings.filled_bottles(), 4);
        assert_eq!(settings.parameters(), PuzzleParameters::new(6, 3, 2));
    }
}
