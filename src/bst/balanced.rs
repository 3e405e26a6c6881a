use super::{IntoIter, Node, OptNode, OrderedIndex};
use crate::Error;

use tracing::debug;

// Builds the subtree holding the next `n` pairs of `src`.  The root is the
// lower midpoint of the range, and since the left half is built first, `src`
// is consumed in ascending order.  Every node is attached directly under its
// parent midpoint, so the whole build is O(n) with O(log n) recursion depth.
fn build<K, V, I>(src: &mut I, n: usize) -> OptNode<K, V>
where
    I: Iterator<Item = (K, V)>,
{
    if n == 0 {
        return None;
    }

    let mid = (n - 1) / 2;
    let left = build(src, mid);
    let (key, val) = src.next()?;
    let right = build(src, n - 1 - mid);

    Some(Box::new(Node {
        key,
        val,
        left,
        right,
    }))
}

// Position of the first pair that does not strictly follow its predecessor.
fn first_unsorted<K: Ord, V>(pairs: &[(K, V)]) -> Option<usize> {
    pairs
        .windows(2)
        .position(|w| w[0].0 >= w[1].0)
        .map(|i| i + 1)
}

impl<K: Ord, V> OrderedIndex<K, V> {
    /// Builds an index of minimal height from pairs sorted ascending by key.
    ///
    /// The pair at the midpoint of the input becomes the root, and the halves
    /// on either side become its subtrees, recursively.  The result has
    /// height `ceil(log2(n + 1))` and is built in O(n).
    ///
    /// The input must be strictly ascending by key.  Debug builds assert
    /// this; release builds produce an index whose lookups are unspecified.
    /// Use [`try_from_sorted`](#method.try_from_sorted) to have the order
    /// checked, or [`from_unsorted`](#method.from_unsorted) to sort first.
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let m = OrderedIndex::from_sorted([(1, 'a'), (2, 'b'), (3, 'c')]);
    /// assert_eq!(m.height(), 2);
    /// assert_eq!(m.get(&2), Some(&'b'));
    ///
    /// let empty = OrderedIndex::<u8, char>::from_sorted([]);
    /// assert!(empty.is_empty());
    /// ```
    pub fn from_sorted<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs: Vec<_> = pairs.into_iter().collect();
        debug_assert!(
            first_unsorted(&pairs).is_none(),
            "from_sorted requires strictly ascending keys"
        );
        Self::build_from(pairs)
    }

    /// Like [`from_sorted`](#method.from_sorted), but verifies the order of
    /// the input first.
    ///
    /// # Errors
    /// [`Error::Unsorted`] naming the first pair whose key is not greater
    /// than the key before it.
    ///
    /// # Examples
    /// ```
    /// use better_bst::{Error, OrderedIndex};
    ///
    /// let bad = OrderedIndex::try_from_sorted(vec![(1, ()), (3, ()), (2, ())]);
    /// assert_eq!(bad.err(), Some(Error::Unsorted { index: 2 }));
    /// ```
    pub fn try_from_sorted<I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let pairs: Vec<_> = pairs.into_iter().collect();
        if let Some(index) = first_unsorted(&pairs) {
            return Err(Error::Unsorted { index });
        }
        Ok(Self::build_from(pairs))
    }

    /// Sorts the pairs by key and builds an index of minimal height.
    ///
    /// The sort is stable.  When a key occurs more than once, the pair that
    /// came last in the input wins, as it would with repeated
    /// [`insert`](#method.insert).  Cost is O(n log n), dominated by the
    /// sort.
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let m = OrderedIndex::from_unsorted(vec![(3, "x"), (1, "y"), (3, "z")]);
    /// assert_eq!(m.len(), 2);
    /// assert_eq!(m.get(&3), Some(&"z"));
    /// ```
    pub fn from_unsorted(mut pairs: Vec<(K, V)>) -> Self {
        // Reversing first puts the latest duplicate ahead of its elders once
        // the stable sort is done, so dedup keeps it.
        pairs.reverse();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        pairs.dedup_by(|later, earlier| later.0 == earlier.0);
        Self::build_from(pairs)
    }

    /// Restores minimal height after a run of inserts and removes.
    ///
    /// The entries are moved out in order and re-linked with the same
    /// midpoint rule as [`from_sorted`](#method.from_sorted), in O(n) time.
    /// Insert and remove never do this on their own.
    pub fn rebuild(&mut self) {
        let before = self.height();
        let mut drain = IntoIter::new(self.root.take(), self.len);
        self.root = build(&mut drain, self.len);

        debug!(len = self.len, before, after = self.height(), "rebuilt index");
        chk_index!(self);
    }

    fn build_from(pairs: Vec<(K, V)>) -> Self {
        let len = pairs.len();
        let root = build(&mut pairs.into_iter(), len);
        let m = OrderedIndex { len, root };

        debug!(len, height = m.height(), "built balanced index");
        chk_index!(m);
        m
    }
}
