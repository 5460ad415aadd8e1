//! Order-independent state keys for duplicate detection.
//!
//! Two configurations are the same search state when their containers hold
//! the same stacks, whatever their positions. Sorting the per-container
//! tokens gives that in O(n log n).

use std::fmt;

use smallvec::SmallVec;

use crate::state::{ColorId, Configuration};

/// Canonical form of a configuration.
///
/// Each container contributes a length byte followed by its colour ids
/// (bottom first); containers appear in sorted order. The length prefix
/// keeps token boundaries unambiguous.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalKey(Box<[u8]>);

impl CanonicalKey {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Per-container tokens in canonical order
    fn tokens(&self) -> impl Iterator<Item = &[u8]> + '_ {
        let mut rest = &self.0[..];
        std::iter::from_fn(move || {
            let (&len, tail) = rest.split_first()?;
            let (token, tail) = tail.split_at(len as usize);
            rest = tail;
            Some(token)
        })
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens().enumerate() {
            if i > 0 {
                "|".fmt(f)?;
            }
            for (j, color) in token.iter().enumerate() {
                if j > 0 {
                    ",".fmt(f)?;
                }
                color.fmt(f)?;
            }
        }
        Ok(())
    }
}

/// Compute the canonical key of a configuration
pub fn canonical_key(config: &Configuration) -> CanonicalKey {
    let mut tokens: SmallVec<[&[ColorId]; 16]> =
        config.containers().iter().map(|c| c.colors()).collect();
    tokens.sort_unstable();

    let units: usize = tokens.iter().map(|t| t.len()).sum();
    let mut bytes = Vec::with_capacity(units + tokens.len());
    for token in tokens {
        // Configuration::new caps capacity at u8::MAX
        bytes.push(token.len() as u8);
        bytes.extend(token.iter().map(|c| c.0));
    }
    CanonicalKey(bytes.into_boxed_slice())
}
