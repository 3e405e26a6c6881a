use super::{Node, OrderedIndex};
use std::borrow::Borrow;
use std::ops::{Bound, RangeBounds};
use Bound::*;

enum FilterStep<'a, K, V> {
    Descend(&'a Node<K, V>),
    Return((&'a K, &'a V)),
}

impl<K, V> OrderedIndex<K, V> {
    /// Returns, in ascending key order, every entry whose key satisfies both
    /// `lower` and `upper`.
    ///
    /// Both predicates must be monotone over the key order: once `lower`
    /// holds for a key it holds for every greater key, and once `upper` holds
    /// for a key it holds for every lesser key.  The walk relies on this to
    /// skip the left subtree of any node failing `lower` and the right
    /// subtree of any node failing `upper`.  With predicates that are not
    /// monotone, entries in skipped subtrees are silently missing from the
    /// result.
    ///
    /// Each predicate is called at most once per visited node.  A narrow
    /// window on a balanced index visits O(log n + k) nodes for k results;
    /// a window covering most keys visits O(n).
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let m = OrderedIndex::from_sorted([
    ///     (1, "a"), (2, "b"), (3, "c"), (4, "d"), (5, "e"),
    /// ]);
    /// let hits = m.filter_keys(|&k| k > 1, |&k| k < 5);
    /// assert_eq!(hits, vec![(&2, &"b"), (&3, &"c"), (&4, &"d")]);
    /// ```
    pub fn filter_keys<L, U>(&self, mut lower: L, mut upper: U) -> Vec<(&K, &V)>
    where
        L: FnMut(&K) -> bool,
        U: FnMut(&K) -> bool,
    {
        use FilterStep::*;

        let mut found = Vec::new();
        let mut work: Vec<FilterStep<'_, K, V>> =
            self.root.as_deref().map(Descend).into_iter().collect();

        // Steps are pushed right-to-left so they pop in key order.
        while let Some(step) = work.pop() {
            match step {
                Descend(n) => {
                    let above_lower = lower(&n.key);
                    let below_upper = upper(&n.key);

                    if below_upper {
                        work.extend(n.right.as_deref().map(Descend));
                    }

                    if above_lower && below_upper {
                        work.push(Return((&n.key, &n.val)));
                    }

                    if above_lower {
                        work.extend(n.left.as_deref().map(Descend));
                    }
                }

                Return(entry) => found.push(entry),
            }
        }

        found
    }

    /// Returns the entries whose keys fall in `range`, in ascending order.
    ///
    /// The bounds become the two monotone predicates of
    /// [`filter_keys`](#method.filter_keys), so the same pruning applies.  An
    /// empty or inverted range yields no entries.
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let m = OrderedIndex::from_sorted((0..10).map(|i| (i, i * i)));
    /// assert_eq!(m.range(3..5), vec![(&3, &9), (&4, &16)]);
    /// assert_eq!(m.range(7..=7), vec![(&7, &49)]);
    /// ```
    pub fn range<Q, R>(&self, range: R) -> Vec<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
        R: RangeBounds<Q>,
    {
        let lower = |k: &K| {
            let k: &Q = k.borrow();
            match range.start_bound() {
                Included(lb) => k >= lb,
                Excluded(lb) => k > lb,
                Unbounded => true,
            }
        };

        let upper = |k: &K| {
            let k: &Q = k.borrow();
            match range.end_bound() {
                Included(ub) => k <= ub,
                Excluded(ub) => k < ub,
                Unbounded => true,
            }
        };

        self.filter_keys(lower, upper)
    }
}

#[cfg(test)]
mod test {
    extern crate quickcheck;
    use super::*;
    use quickcheck::quickcheck;
    use std::cell::Cell;

    fn letters() -> OrderedIndex<u32, &'static str> {
        OrderedIndex::from_sorted([
            (1, "a"),
            (2, "b"),
            (3, "c"),
            (4, "d"),
            (5, "e"),
        ])
    }

    // the unpruned answer: filter a full in-order walk
    fn brute<'a, K: Ord, V>(
        m: &'a OrderedIndex<K, V>,
        lo: &K,
        hi: &K,
    ) -> Vec<(&'a K, &'a V)> {
        m.iter().filter(|(k, _)| *k > lo && *k < hi).collect()
    }

    #[test]
    fn open_window() {
        let m = letters();
        let hits = m.filter_keys(|&k| k > 1, |&k| k < 5);
        assert_eq!(hits, vec![(&2, &"b"), (&3, &"c"), (&4, &"d")]);
    }

    #[test]
    fn point_window() {
        let m = letters();
        assert_eq!(m.filter_keys(|&k| k >= 4, |&k| k <= 4), vec![(&4, &"d")]);
        assert_eq!(m.range(4..=4), vec![(&4, &"d")]);
        assert!(m.range(9..=9).is_empty());
    }

    #[test]
    fn empty_and_inverted() {
        let m = letters();
        assert!(m.filter_keys(|&k| k > 5, |_| true).is_empty());
        assert!(m.filter_keys(|&k| k > 4, |&k| k < 2).is_empty());

        let empty: OrderedIndex<u32, ()> = OrderedIndex::new();
        assert!(empty.filter_keys(|_| true, |_| true).is_empty());
    }

    #[test]
    fn narrow_window_prunes() {
        let n = 1 << 12;
        let m = OrderedIndex::from_sorted((0..n).map(|i| (i, ())));
        let calls = Cell::new(0);
        let hits = m.filter_keys(
            |&k| {
                calls.set(calls.get() + 1);
                k >= 1000
            },
            |&k| {
                calls.set(calls.get() + 1);
                k <= 1002
            },
        );

        assert_eq!(hits.len(), 3);
        // two calls per visited node, and only O(height + k) nodes visited
        assert!(calls.get() <= 2 * (2 * m.height() + hits.len()));
    }

    #[test]
    fn each_predicate_once_per_node() {
        let m = letters();
        let calls = Cell::new(0);
        m.filter_keys(
            |_| {
                calls.set(calls.get() + 1);
                true
            },
            |_| true,
        );
        assert_eq!(calls.get(), m.len());
    }

    #[test]
    fn non_monotone_predicates_miss_entries() {
        // `lower` fails at the root (3) but passes at 1, so 1 is never seen
        let m = letters();
        let hits = m.filter_keys(|&k| k != 3, |_| true);
        assert_eq!(hits, vec![(&4, &"d"), (&5, &"e")]);
    }

    quickcheck! {
        fn qc_filter_matches_walk(ks: Vec<u8>, lo: u8, hi: u8) -> bool {
            let m: OrderedIndex<_, _> = ks.into_iter().map(|k| (k, ())).collect();
            m.filter_keys(|k| k > &lo, |k| k < &hi) == brute(&m, &lo, &hi)
        }

        fn qc_filter_matches_walk_balanced(ks: Vec<u8>, lo: u8, hi: u8) -> bool {
            let m = OrderedIndex::from_unsorted(
                ks.into_iter().map(|k| (k, k)).collect(),
            );
            m.filter_keys(|k| k > &lo, |k| k < &hi) == brute(&m, &lo, &hi)
        }
    }
}
