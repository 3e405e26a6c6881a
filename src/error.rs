use thiserror::Error;

/// Errors reported by [`OrderedIndex`](crate::OrderedIndex).
///
/// Lookups never fail: an absent key is `None`.  Errors are reserved for
/// operations whose caller must react to the outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// `remove` was asked for a key the index does not hold.
    #[error("key not found")]
    KeyNotFound,

    /// Input to a sorted build is not strictly ascending at `index`.
    #[error("input is not strictly ascending by key at position {index}")]
    Unsorted {
        /// Position of the first pair that is not greater than its predecessor.
        index: usize,
    },

    /// An in-order walk found the key at `index` not greater than the one
    /// before it.
    #[error("ordering invariant broken at in-order position {index}")]
    OutOfOrder {
        /// In-order position of the offending entry.
        index: usize,
    },

    /// The stored entry count disagrees with the number of reachable nodes.
    #[error("index records {expected} entries but holds {found}")]
    LenMismatch {
        /// The count kept by the index.
        expected: usize,
        /// The number of nodes actually reachable from the root.
        found: usize,
    },
}
