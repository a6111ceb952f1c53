//! Deterministic string-to-color assignment.
//!
//! Slices and counter series are colored by name so that the same name
//! always lands on the same palette entry, across imports and regardless
//! of the order names are first seen in. The assigner is an injected
//! service shared by reference, not a process-wide global.

use crate::utils::config::PALETTE_SIZE;
use std::collections::HashMap;

/// Index into the fixed color palette
pub type ColorId = u32;

/// Assigns palette slots to names.
///
/// Assignment is a stable FNV-1a hash of the name modulo the palette
/// size, so it is deterministic and independent of lookup order. Results
/// are memoized per name.
#[derive(Debug, Default)]
pub struct ColorAssigner {
    cache: HashMap<String, ColorId>,
}

impl ColorAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the color id for a name, computing and caching it on first use
    pub fn color_for(&mut self, name: &str) -> ColorId {
        if let Some(&id) = self.cache.get(name) {
            return id;
        }
        let id = hash_name(name) % PALETTE_SIZE;
        self.cache.insert(name.to_string(), id);
        id
    }
}

/// FNV-1a over the name bytes.
///
/// std's DefaultHasher is not guaranteed stable across releases, and the
/// assignment must stay identical for traces saved and reloaded later.
fn hash_name(name: &str) -> u32 {
    const FNV_OFFSET: u32 = 0x811c_9dc5;
    const FNV_PRIME: u32 = 0x0100_0193;

    let mut hash = FNV_OFFSET;
    for byte in name.as_bytes() {
        hash ^= u32::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_color() {
        let mut assigner = ColorAssigner::new();
        let a = assigner.color_for("compositor");
        let b = assigner.color_for("compositor");
        assert_eq!(a, b);
    }

    #[test]
    fn test_order_independent() {
        let mut first = ColorAssigner::new();
        first.color_for("alpha");
        let alpha_then_beta = first.color_for("beta");

        let mut second = ColorAssigner::new();
        let beta_alone = second.color_for("beta");

        assert_eq!(alpha_then_beta, beta_alone);
    }

    #[test]
    fn test_within_palette() {
        let mut assigner = ColorAssigner::new();
        for name in ["a", "b", "longer_event_name", ""] {
            assert!(assigner.color_for(name) < PALETTE_SIZE);
        }
    }
}
