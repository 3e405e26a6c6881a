use proptest::prelude::*;
use std::ops::Bound;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

#[allow(dead_code)]
pub(super) type SmallIntPairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::vec((0u16..1024u16, 0u16..1024u16), 0..512)
}

#[allow(dead_code)]
pub(super) fn string_u16_pairs() -> impl Strategy<Value = Vec<(String, u16)>> {
    prop::collection::vec(("[a-z]{0,2}", 0u16..1024u16), 0..512)
}

// Sorted, duplicate-free pairs, the input the balanced builder expects.
#[allow(dead_code)]
pub(super) fn sorted_unique_pairs() -> impl Strategy<Value = SmallIntPairs> {
    prop::collection::btree_map(0u16..1024u16, 0u16..1024u16, 0..512)
        .prop_map(|m| m.into_iter().collect())
}

#[allow(dead_code)]
pub(super) fn range_bounds_1k(
) -> impl Strategy<Value = (Bound<u16>, Bound<u16>)> {
    use Bound::*;

    (1u16..1023)
        .prop_flat_map(|n| {
            (
                prop_oneof![
                    Just(Bound::Unbounded),
                    (0u16..=n).prop_map(Bound::Excluded),
                    (0u16..=n).prop_map(Bound::Included),
                ],
                prop_oneof![
                    Just(Bound::Unbounded),
                    (n..1024).prop_map(Bound::Excluded),
                    (n..1024).prop_map(Bound::Included),
                ],
            )
        })
        .prop_map(|(lb, ub)| match (lb, ub) {
            (Excluded(x), Excluded(y)) if x == y => {
                // std's range panics here; the index just returns nothing,
                // so map it to a case both can answer
                (Included(x), Excluded(y))
            }

            xy => xy,
        })
}

// ceil(log2(n + 1))
#[allow(dead_code)]
pub(super) fn min_height(n: usize) -> usize {
    (usize::BITS - n.leading_zeros()) as usize
}
