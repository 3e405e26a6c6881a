//! An index fed keys in ascending order through `insert` degenerates into a
//! list as tall as it is long.  None of its operations may recurse on that
//! height, so each test runs on a thread whose stack is far too small for a
//! recursive walk of the list.

use better_bst::OrderedIndex;
use std::thread;

const N: u32 = 10_000;

fn on_small_stack<F: FnOnce() + Send + 'static>(f: F) {
    thread::Builder::new()
        .stack_size(128 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap();
}

fn list_shaped() -> OrderedIndex<u32, u32> {
    (0..N).map(|i| (i, i)).collect()
}

#[test]
fn tall_tree_survives_every_operation() {
    on_small_stack(|| {
        let mut m = list_shaped();
        assert_eq!(m.height(), N as usize);
        assert_eq!(m.check(), Ok(()));

        assert_eq!(m.get(&(N - 1)), Some(&(N - 1)));
        assert_eq!(m.insert(N, N), None);
        assert_eq!(m.iter().count(), N as usize + 1);

        let hits = m.filter_keys(|&k| k >= N - 2, |_| true);
        assert_eq!(hits.len(), 3);

        assert_eq!(m.remove(&(N / 2)), Ok(N / 2));
        assert_eq!(m.remove(&N), Ok(N));
        assert_eq!(m.len(), N as usize - 1);

        drop(m);
    });
}

#[test]
fn tall_tree_into_iter_and_clear() {
    on_small_stack(|| {
        let m = list_shaped();
        let mut it = m.into_iter();
        assert_eq!(it.next(), Some((0, 0)));
        drop(it);

        let mut m = list_shaped();
        m.clear();
        assert!(m.is_empty());
    });
}

#[test]
fn tall_tree_rebuilds_balanced() {
    on_small_stack(|| {
        let mut m: OrderedIndex<_, _> = (0..N).rev().map(|i| (i, ())).collect();
        m.rebuild();
        assert_eq!(m.height(), 14);
        assert!(m.keys().copied().eq(0..N));
    });
}
