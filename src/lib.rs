//! # An ordered index for keys known up front
//!
//! `better-bst` provides [`OrderedIndex`], a binary search tree keyed by any
//! [`Ord`] type.  The tree is meant to be bulk built from a complete set of
//! entries with [`OrderedIndex::from_sorted`] (or
//! [`OrderedIndex::from_unsorted`]), which yields a tree of minimal height in
//! linear time.  Afterwards it supports the usual point updates, which follow
//! the plain binary search tree rules and do not rebalance.
//!
//! Range questions are answered by [`OrderedIndex::filter_keys`], which takes
//! a lower and an upper predicate over keys and prunes every subtree that the
//! ordering proves cannot match.
//!
//! ```
//! use better_bst::OrderedIndex;
//!
//! let mut m = OrderedIndex::from_unsorted(vec![(30, "c"), (10, "a"), (20, "b")]);
//! m.insert(40, "d");
//! assert_eq!(m.filter_keys(|&k| k > 10, |&k| k < 40), vec![(&20, &"b"), (&30, &"c")]);
//! assert!(m.remove(&99).is_err());
//! ```
//!
//! The `serde` feature serializes an index as a map.

mod error;
pub use error::Error;

mod bst;
pub use bst::{IntoIter, Iter, OrderedIndex};

#[cfg(feature = "serde")]
mod serde;
