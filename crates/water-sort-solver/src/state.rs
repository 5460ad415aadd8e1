//! In-memory puzzle state: containers, configurations and moves.
//!
//! A [`Configuration`] is an immutable value. Every pour produces a fresh
//! configuration, so a state handed out earlier can never change underneath
//! its holder.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Largest supported container capacity (stack lengths must fit in a byte)
pub const MAX_CAPACITY: usize = u8::MAX as usize;

/// Dense colour id assigned by a [`ColorTable`](crate::puzzle::ColorTable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorId(pub u8);

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Colour stack of a single container, bottom first
pub type Colors = SmallVec<[ColorId; 8]>;

/// Errors raised while building a configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("expected {expected} containers but got {actual}")]
    ContainerCount { expected: usize, actual: usize },
    #[error("capacity must be between 1 and 255, got {0}")]
    InvalidCapacity(usize),
    #[error("container {index} has capacity {actual}, expected {expected}")]
    CapacityMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },
    #[error("container holds {len} units but its capacity is {capacity}")]
    Overfull { len: usize, capacity: usize },
    #[error("{required_empty} empty containers required but the puzzle has only {container_count}")]
    TooManyEmpty {
        required_empty: usize,
        container_count: usize,
    },
}

/// Static puzzle parameters shared by every state of one puzzle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleParameters {
    pub container_count: usize,
    pub capacity: usize,
    pub required_empty: usize,
}

impl PuzzleParameters {
    pub fn new(container_count: usize, capacity: usize, required_empty: usize) -> Self {
        Self {
            container_count,
            capacity,
            required_empty,
        }
    }

    /// Number of containers that must end up full and monochrome
    pub fn filled_count(&self) -> usize {
        self.container_count.saturating_sub(self.required_empty)
    }
}

/// A single vessel: a stack of colour units with a fixed capacity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Container {
    colors: Colors,
    capacity: usize,
}

impl Container {
    /// Create an empty container
    pub fn new(capacity: usize) -> Self {
        Self {
            colors: Colors::new(),
            capacity,
        }
    }

    /// Create a container holding `colors` (bottom first)
    pub fn with_colors(
        capacity: usize,
        colors: impl IntoIterator<Item = ColorId>,
    ) -> Result<Self, ConfigurationError> {
        let colors: Colors = colors.into_iter().collect();
        if colors.len() > capacity {
            return Err(ConfigurationError::Overfull {
                len: colors.len(),
                capacity,
            });
        }
        Ok(Self { colors, capacity })
    }

    pub fn colors(&self) -> &[ColorId] {
        &self.colors
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn free_space(&self) -> usize {
        self.capacity - self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.colors.len() == self.capacity
    }

    /// The pourable colour, if any
    pub fn top(&self) -> Option<ColorId> {
        self.colors.last().copied()
    }

    /// Length of the same-colour run sitting on top
    pub fn top_run_length(&self) -> usize {
        match self.top() {
            Some(top) => self.colors.iter().rev().take_while(|&&c| c == top).count(),
            None => 0,
        }
    }

    /// All units share one colour (vacuously true when empty)
    pub fn is_monochrome(&self) -> bool {
        self.colors.windows(2).all(|w| w[0] == w[1])
    }

    /// Full and monochrome
    pub fn is_complete(&self) -> bool {
        self.is_full() && self.is_monochrome()
    }

    pub(crate) fn remove_top(&mut self, count: usize) {
        let len = self.colors.len();
        self.colors.truncate(len - count);
    }

    pub(crate) fn push_units(&mut self, color: ColorId, count: usize) {
        self.colors.extend(std::iter::repeat(color).take(count));
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        "[".fmt(f)?;
        for (i, color) in self.colors.iter().enumerate() {
            if i > 0 {
                " ".fmt(f)?;
            }
            color.fmt(f)?;
        }
        for _ in 0..self.free_space() {
            " .".fmt(f)?;
        }
        "]".fmt(f)
    }
}

/// A complete puzzle state: every container plus the puzzle parameters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Configuration {
    params: PuzzleParameters,
    containers: Box<[Container]>,
}

impl Index<usize> for Configuration {
    type Output = Container;
    fn index(&self, index: usize) -> &Self::Output {
        &self.containers[index]
    }
}

impl Configuration {
    /// Build a configuration, checking the structural invariants
    pub fn new(
        params: PuzzleParameters,
        containers: Vec<Container>,
    ) -> Result<Self, ConfigurationError> {
        if params.capacity == 0 || params.capacity > MAX_CAPACITY {
            return Err(ConfigurationError::InvalidCapacity(params.capacity));
        }
        if containers.len() != params.container_count {
            return Err(ConfigurationError::ContainerCount {
                expected: params.container_count,
                actual: containers.len(),
            });
        }
        if params.required_empty > params.container_count {
            return Err(ConfigurationError::TooManyEmpty {
                required_empty: params.required_empty,
                container_count: params.container_count,
            });
        }
        for (index, container) in containers.iter().enumerate() {
            if container.capacity != params.capacity {
                return Err(ConfigurationError::CapacityMismatch {
                    index,
                    expected: params.capacity,
                    actual: container.capacity,
                });
            }
            if container.len() > container.capacity {
                return Err(ConfigurationError::Overfull {
                    len: container.len(),
                    capacity: container.capacity,
                });
            }
        }
        Ok(Self {
            params,
            containers: containers.into_boxed_slice(),
        })
    }

    /// Build a configuration from raw colour stacks; the container count is
    /// taken from the number of stacks
    pub fn from_stacks<S>(
        capacity: usize,
        required_empty: usize,
        stacks: impl IntoIterator<Item = S>,
    ) -> Result<Self, ConfigurationError>
    where
        S: IntoIterator<Item = ColorId>,
    {
        let containers = stacks
            .into_iter()
            .map(|stack| Container::with_colors(capacity, stack))
            .collect::<Result<Vec<_>, _>>()?;
        let params = PuzzleParameters::new(containers.len(), capacity, required_empty);
        Self::new(params, containers)
    }

    pub fn params(&self) -> &PuzzleParameters {
        &self.params
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn container(&self, index: usize) -> Option<&Container> {
        self.containers.get(index)
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Units of each colour across all containers, ordered by colour id
    pub fn color_counts(&self) -> BTreeMap<ColorId, usize> {
        let mut counts = BTreeMap::new();
        for color in self.containers.iter().flat_map(|c| c.colors.iter()) {
            *counts.entry(*color).or_insert(0) += 1;
        }
        counts
    }

    /// Number of containers that are full and monochrome
    pub fn complete_count(&self) -> usize {
        self.containers.iter().filter(|c| c.is_complete()).count()
    }

    /// Clone with the top `count` units of `from` moved onto `to`.
    /// Callers guarantee the move fits.
    pub(crate) fn with_transfer(&self, from: usize, to: usize, count: usize) -> Self {
        let mut containers = self.containers.clone();
        if let Some(color) = containers[from].top() {
            containers[from].remove_top(count);
            containers[to].push_units(color, count);
        }
        Self {
            params: self.params,
            containers,
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, container) in self.containers.iter().enumerate() {
            writeln!(f, "{i:>2}: {container}")?;
        }
        Ok(())
    }
}

/// A pour from one container index to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

impl Move {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}>{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid move {0:?}, expected `from>to`")]
pub struct ParseMoveError(String);

impl FromStr for Move {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoveError(s.to_string());
        let (from, to) = s.trim().split_once('>').ok_or_else(err)?;
        let from = from.trim().parse().map_err(|_| err())?;
        let to = to.trim().parse().map_err(|_| err())?;
        Ok(Self { from, to })
    }
}
