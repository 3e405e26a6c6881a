#![warn(missing_docs)]
use std::borrow::Borrow;
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::mem::replace;

use tracing::trace;

use crate::Error;

type OptNode<K, V> = Option<Box<Node<K, V>>>;

// Re-verifies the whole index after a mutation, but only in this crate's unit
// tests.  The check is O(n), so it stays out of every other build.
#[cfg(test)]
macro_rules! chk_index {
    ( $x:expr ) => {{
        if let Err(e) = $x.check() {
            panic!("invariant violated: {e}");
        }
    }};
}

#[cfg(not(test))]
macro_rules! chk_index {
    ( $x:expr ) => {{
        let _ = &$x;
    }};
}

mod balanced;
mod filter;

struct Node<K, V> {
    key: K,
    val: V,
    left: OptNode<K, V>,
    right: OptNode<K, V>,
}

impl<K, V> Node<K, V> {
    fn new(key: K, val: V) -> Self {
        Node {
            key,
            val,
            left: None,
            right: None,
        }
    }
}

/// An ordered key/value index backed by an unbalanced binary search tree.
///
/// Built with [`from_sorted`](#method.from_sorted) (or one of its siblings),
/// the tree has minimal height.  Later calls to [`insert`](#method.insert) and
/// [`remove`](#method.remove) follow the classic binary search tree rules and
/// never rebalance, so a long run of updates can leave the tree lopsided.  Use
/// [`rebuild`](#method.rebuild) to restore the minimal shape.
///
/// Every operation that may walk a lopsided tree (point updates and lookups,
/// iteration, [`filter_keys`](#method.filter_keys), and drop) is iterative, so
/// tree height is bounded only by memory.
///
/// Keys are compared only through [`Ord`].  A key type whose `Ord` is not a
/// total order (say, a float wrapper that lets NaN through) makes every result
/// unspecified, though never memory unsafe.
pub struct OrderedIndex<K, V> {
    len: usize,
    root: OptNode<K, V>,
}

// Walks down from `slot` to the slot that holds `key`, or to the empty slot
// where `key` would be attached.
fn slot_of<'a, K, V, Q>(
    mut slot: &'a mut OptNode<K, V>,
    key: &Q,
) -> &'a mut OptNode<K, V>
where
    K: Borrow<Q>,
    Q: Ord + ?Sized,
{
    while let Some(ord) = slot.as_deref().map(|n| key.cmp(n.key.borrow())) {
        if ord == Equal {
            break;
        }

        let Some(n) = slot else { break };
        slot = if ord == Less { &mut n.left } else { &mut n.right };
    }

    slot
}

// Detaches the leftmost node of the subtree at `slot`, splicing its right
// child into its place.
fn take_leftmost<K, V>(mut slot: &mut OptNode<K, V>) -> OptNode<K, V> {
    while slot.as_ref().is_some_and(|n| n.left.is_some()) {
        let Some(n) = slot else { break };
        slot = &mut n.left;
    }

    let mut min = slot.take()?;
    *slot = min.right.take();
    Some(min)
}

// Drops a subtree one node at a time.  A recursive drop would overflow the
// stack on a tree that has degenerated into a list.
fn release<K, V>(root: OptNode<K, V>) {
    let mut work: Vec<Box<Node<K, V>>> = root.into_iter().collect();
    while let Some(mut n) = work.pop() {
        work.extend(n.left.take());
        work.extend(n.right.take());
    }
}

impl<K, V> OrderedIndex<K, V> {
    /// Creates a new, empty index.
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    /// let m: OrderedIndex<u32, &str> = OrderedIndex::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        OrderedIndex { len: 0, root: None }
    }

    /// Drops all entries from the index.
    pub fn clear(&mut self) {
        self.len = 0;
        release(self.root.take());
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of nodes on the longest path from the root to a
    /// leaf; an empty index has height 0.
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let m = OrderedIndex::from_sorted((0..7).map(|i| (i, ())));
    /// assert_eq!(m.height(), 3);
    /// ```
    pub fn height(&self) -> usize {
        let mut tallest = 0;
        let mut work: Vec<(&Node<K, V>, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();
        while let Some((n, depth)) = work.pop() {
            tallest = tallest.max(depth);
            work.extend(n.left.as_deref().map(|c| (c, depth + 1)));
            work.extend(n.right.as_deref().map(|c| (c, depth + 1)));
        }
        tallest
    }

    /// Creates an iterator over the entries, sorted by key.
    ///
    /// The iterator is lazy and holds only the left spine of the part of the
    /// tree it has yet to visit.  Call `iter` again to restart the walk.
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let m = OrderedIndex::from_sorted([(0, 1), (1, 2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i + 1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut iter = Iter {
            work: Vec::new(),
            len: self.len,
        };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    /// Produces an iterator over the keys of the index, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|p| p.0)
    }

    /// Produces an iterator over the values of the index, ordered by their
    /// associated keys.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|p| p.1)
    }

    /// Returns the key-value pair for the least key in the index.
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let m = OrderedIndex::from_unsorted(vec![(2, 0), (1, 0)]);
    /// assert_eq!(m.first_key_value(), Some((&1, &0)));
    /// ```
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(n) = curr.left.as_deref() {
            curr = n;
        }
        Some((&curr.key, &curr.val))
    }

    /// Returns the key-value pair for the greatest key in the index.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut curr = self.root.as_deref()?;
        while let Some(n) = curr.right.as_deref() {
            curr = n;
        }
        Some((&curr.key, &curr.val))
    }
}

impl<K: Ord, V> OrderedIndex<K, V> {
    /// Inserts a key-value pair and returns the value it replaced, if any.
    ///
    /// A new key is attached as a leaf below the last node on its search path;
    /// nothing is rotated, so the cost is the depth of that path.  An existing
    /// key keeps its node and only has its value overwritten.
    ///
    /// # Examples
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let mut m = OrderedIndex::new();
    /// assert_eq!(m.insert(0, "a"), None);
    /// assert_eq!(m.insert(0, "b"), Some("a"));
    /// assert_eq!(m.get(&0), Some(&"b"));
    /// assert_eq!(m.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        let slot = slot_of(&mut self.root, &key);
        let ret = match slot {
            Some(n) => Some(replace(&mut n.val, val)),
            None => {
                *slot = Some(Box::new(Node::new(key, val)));
                self.len += 1;
                None
            }
        };

        chk_index!(self);
        ret
    }

    /// Removes a key from the index and returns its value.
    ///
    /// A node with at most one child is replaced by that child.  A node with
    /// two children is replaced by its in-order successor, the leftmost node
    /// of its right subtree, which is first unlinked from its old position.
    ///
    /// # Errors
    /// [`Error::KeyNotFound`] if the key is absent; the index is unchanged.
    ///
    /// # Examples
    /// ```
    /// use better_bst::{Error, OrderedIndex};
    ///
    /// let mut m = OrderedIndex::from_sorted([(1, 2), (2, 3)]);
    /// assert_eq!(m.remove(&2), Ok(3));
    /// assert_eq!(m.remove(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V, Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.remove_entry(key).map(|e| e.1)
    }

    /// Removes a key from the index and returns the stored key and value.
    ///
    /// # Errors
    /// [`Error::KeyNotFound`] if the key is absent.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V), Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let slot = slot_of(&mut self.root, key);
        let Some(mut n) = slot.take() else {
            trace!("remove of absent key");
            return Err(Error::KeyNotFound);
        };

        match (n.left.take(), n.right.take()) {
            (None, child) | (child, None) => *slot = child,

            (Some(left), Some(right)) => {
                let mut right = Some(right);
                let mut succ = match take_leftmost(&mut right) {
                    Some(succ) => succ,
                    None => unreachable!("a non-empty subtree has a leftmost node"),
                };
                succ.left = Some(left);
                succ.right = right;
                *slot = Some(succ);
            }
        }

        self.len -= 1;
        chk_index!(self);
        Ok((n.key, n.val))
    }

    /// Tests if self contains an entry for the given key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns a reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let mut m = OrderedIndex::new();
    /// m.insert(0, false);
    ///
    /// assert_eq!(m.get(&0), Some(&false));
    /// assert_eq!(m.get(&1), None);
    /// ```
    pub fn get<Q>(&self, k: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_key_value(k).map(|e| e.1)
    }

    /// Returns the stored key and its value for the given key.
    pub fn get_key_value<Q>(&self, k: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = &self.root;
        while let Some(n) = curr {
            match k.cmp(n.key.borrow()) {
                Less => curr = &n.left,
                Equal => return Some((&n.key, &n.val)),
                Greater => curr = &n.right,
            }
        }

        None
    }

    /// Returns a mutable reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use better_bst::OrderedIndex;
    ///
    /// let mut m = OrderedIndex::new();
    /// m.insert(1, 7);
    ///
    /// if let Some(v) = m.get_mut(&1) {
    ///     *v = 2;
    /// }
    /// assert_eq!(m.get(&1), Some(&2));
    /// ```
    pub fn get_mut<Q>(&mut self, k: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        slot_of(&mut self.root, k).as_deref_mut().map(|n| &mut n.val)
    }

    /// Verifies that the keys ascend strictly in order and that
    /// [`len`](#method.len) matches the number of nodes in the tree.
    ///
    /// # Errors
    /// [`Error::OutOfOrder`] or [`Error::LenMismatch`] for the first problem
    /// found.
    pub fn check(&self) -> Result<(), Error> {
        let mut found = 0;
        let mut prev: Option<&K> = None;
        let mut work: Vec<&Node<K, V>> = Vec::new();
        let mut curr = self.root.as_deref();

        loop {
            while let Some(n) = curr {
                work.push(n);
                curr = n.left.as_deref();
            }

            let Some(n) = work.pop() else { break };
            if prev.is_some_and(|p| p >= &n.key) {
                return Err(Error::OutOfOrder { index: found });
            }

            prev = Some(&n.key);
            found += 1;
            curr = n.right.as_deref();
        }

        if found != self.len {
            return Err(Error::LenMismatch {
                expected: self.len,
                found,
            });
        }

        Ok(())
    }
}

impl<K, V> Drop for OrderedIndex<K, V> {
    fn drop(&mut self) {
        release(self.root.take());
    }
}

impl<K, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// The clone is rebuilt balanced, so it may have a different shape than the
// original while holding the same entries.
impl<K: Clone + Ord, V: Clone> Clone for OrderedIndex<K, V> {
    fn clone(&self) -> Self {
        OrderedIndex::from_sorted(
            self.iter().map(|(k, v)| (k.clone(), v.clone())),
        )
    }
}

impl<K: Debug, V: Debug> Debug for OrderedIndex<K, V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("OrderedIndex(#{}, ", self.len))?;
        f.debug_map().entries(self.iter()).finish()?;
        f.write_str(")")
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedIndex<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().zip(other.iter()).all(|(x, y)| x == y)
    }
}

impl<K: Eq, V: Eq> Eq for OrderedIndex<K, V> {}

impl<K, Q, V> std::ops::Index<&Q> for OrderedIndex<K, V>
where
    K: Borrow<Q> + Ord,
    Q: Ord + ?Sized,
{
    type Output = V;

    fn index(&self, index: &Q) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in OrderedIndex"),
        }
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedIndex<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

/// Collects by repeated [`insert`](OrderedIndex::insert), so the shape
/// depends on the order of the input.  Prefer
/// [`from_unsorted`](OrderedIndex::from_unsorted) for a balanced result.
impl<K: Ord, V> FromIterator<(K, V)> for OrderedIndex<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut m = OrderedIndex::new();
        m.extend(iter);
        m
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedIndex<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> IntoIterator for OrderedIndex<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(mut self) -> Self::IntoIter {
        let len = replace(&mut self.len, 0);
        IntoIter::new(self.root.take(), len)
    }
}

/// In-order iterator over borrowed entries; see [`OrderedIndex::iter`].
pub struct Iter<'a, K, V> {
    work: Vec<&'a Node<K, V>>,
    len: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            work: self.work.clone(),
            len: self.len,
        }
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn push_left_spine(&mut self, mut curr: Option<&'a Node<K, V>>) {
        while let Some(n) = curr {
            self.work.push(n);
            curr = n.left.as_deref();
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.work.pop()?;
        self.len -= 1;
        self.push_left_spine(n.right.as_deref());
        Some((&n.key, &n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// In-order iterator that moves entries out of an index.
pub struct IntoIter<K, V> {
    work: Vec<Box<Node<K, V>>>,
    len: usize,
}

impl<K, V> IntoIter<K, V> {
    fn new(root: OptNode<K, V>, len: usize) -> Self {
        let mut iter = IntoIter {
            work: Vec::new(),
            len,
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut curr: OptNode<K, V>) {
        while let Some(mut n) = curr {
            curr = n.left.take();
            self.work.push(n);
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.work.pop()?;
        self.len -= 1;
        let Node { key, val, right, .. } = *n;
        self.push_left_spine(right);
        Some((key, val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> Drop for IntoIter<K, V> {
    fn drop(&mut self) {
        for n in self.work.drain(..) {
            release(Some(n));
        }
    }
}
