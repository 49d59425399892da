//! Degree bounds and construction-time configuration.
//!
//! The degree bounds are fixed for every tree:
//!
//! | Level    | Min | Max |
//! |----------|-----|-----|
//! | Leaf     | 64  | 128 |
//! | Internal | 8   | 16  |
//!
//! A root leaf may hold anywhere from 0 to [`MAX_EXT`] elements, and a root
//! internode needs only two children.

/// Minimum occupancy of a non-root leaf block.
pub const MIN_EXT: usize = 64;

/// Maximum occupancy of a leaf block.
pub const MAX_EXT: usize = 128;

/// Minimum child count of a non-root internode.
pub const MIN_INT: usize = 8;

/// Maximum child count of an internode.
pub const MAX_INT: usize = 16;

/// Upper bound on tree height.
///
/// With the bounds above, a tree of height 24 would need more than
/// `64 * 2 * 8^22` elements, which exceeds `usize::MAX`.
pub const MAX_HEIGHT: usize = 24;

/// Behaviour selected when a [`BpTreeArray`](crate::array::BpTreeArray) is built.
///
/// `ordered` keeps elements sorted under the comparator and enables the
/// search operations; `multi` permits equivalent keys. A sequence is
/// `multi && !ordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArrayConfig {
    /// Equivalent keys may be stored more than once.
    pub multi: bool,
    /// Elements are kept in comparator order.
    pub ordered: bool,
}

impl ArrayConfig {
    /// Sorted, duplicate keys rejected (set, map).
    pub const UNIQUE: Self = Self {
        multi: false,
        ordered: true,
    };

    /// Sorted, duplicate keys kept (multiset, multimap).
    pub const MULTI: Self = Self {
        multi: true,
        ordered: true,
    };

    /// Positional only; order is whatever the caller builds.
    pub const SEQUENCE: Self = Self {
        multi: true,
        ordered: false,
    };

    /// Return a copy with the `multi` flag replaced.
    #[must_use]
    pub const fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    /// Return a copy with the `ordered` flag replaced.
    #[must_use]
    pub const fn with_ordered(mut self, ordered: bool) -> Self {
        self.ordered = ordered;
        self
    }

    /// Whether an insert must reject a key already present.
    #[inline]
    #[must_use]
    pub const fn rejects_duplicates(&self) -> bool {
        self.ordered && !self.multi
    }
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self::SEQUENCE
    }
}

/// Distance beyond which a cursor re-descends from the root instead of
/// stepping block by block.
#[inline(always)]
#[must_use]
pub const fn local_limit(height: usize) -> usize {
    (height + 1) * MIN_INT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert!(ArrayConfig::UNIQUE.rejects_duplicates());
        assert!(!ArrayConfig::MULTI.rejects_duplicates());
        assert!(!ArrayConfig::SEQUENCE.rejects_duplicates());
        assert_eq!(ArrayConfig::default(), ArrayConfig::SEQUENCE);
    }

    #[test]
    fn test_builders() {
        let config = ArrayConfig::SEQUENCE.with_ordered(true);
        assert_eq!(config, ArrayConfig::MULTI);
        assert_eq!(config.with_multi(false), ArrayConfig::UNIQUE);
    }

    #[test]
    fn test_bounds_leave_room_for_split() {
        assert!(2 * MIN_EXT <= MAX_EXT);
        assert!(2 * MIN_INT <= MAX_INT);
        assert_eq!(local_limit(1), 16);
    }
}
