//! Iteration over a `ChainHashMap` in bucket-then-chain order.
//!
//! One shared iterator and one mutable iterator, each double-ended, cover
//! the four traversal variants: `iter()` / `iter_mut()` walk forward,
//! `.rev()` walks the exact mirror. Both are driven by the cursor state
//! machine, so iteration order and cursor order always agree.

use crate::cursor::{Cursor, Pos};
use crate::map::{ChainHashMap, Node};
use slotmap::DefaultKey;

/// Shared iterator over `(&K, &V)` pairs, created by
/// [`ChainHashMap::iter`]. Walks cursors directly; no allocation.
pub struct Iter<'a, K, V> {
    map: &'a ChainHashMap<K, V>,
    front: Cursor,
    back: Cursor,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.map.entry(self.front).ok()?;
        self.front = self.map.advance(self.front);
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K, V> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = self.map.entry(self.back).ok()?;
        self.back = self.map.retreat(self.back);
        self.remaining -= 1;
        Some(item)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

/// Mutable iterator over `(&K, &mut V)` pairs, created by
/// [`ChainHashMap::iter_mut`].
///
/// The traversal order is snapshotted up front and the arena is split into
/// per-entry borrows once, so handing out `&mut V` never re-borrows the
/// map.
pub struct IterMut<'a, K, V> {
    order: std::vec::IntoIter<DefaultKey>,
    entries: hashbrown::HashMap<DefaultKey, (&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.order.next()?;
        // Every ordered key is a live arena key, each visited once.
        Some(self.entries.remove(&node).unwrap())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.order.next_back()?;
        Some(self.entries.remove(&node).unwrap())
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> core::iter::FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator in traversal order, created by `into_iter()`.
pub struct IntoIter<K, V> {
    order: std::vec::IntoIter<DefaultKey>,
    slots: slotmap::SlotMap<DefaultKey, Node<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.order.next()?;
        self.slots.remove(node).map(|n| (n.key, n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let node = self.order.next_back()?;
        self.slots.remove(node).map(|n| (n.key, n.value))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> core::iter::FusedIterator for IntoIter<K, V> {}

impl<K, V> ChainHashMap<K, V> {
    /// Arena keys in bucket-then-chain order.
    fn traversal_order(&self) -> Vec<DefaultKey> {
        let mut order = Vec::with_capacity(self.len());
        let mut c = self.cursor_front().unwrap_or(Cursor::EMPTY);
        while let Pos::Valid { node, .. } = c.0 {
            order.push(node);
            c = self.advance(c);
        }
        order
    }

    /// Iterate shared references in bucket-then-chain order; `.rev()` is
    /// the exact mirror.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            front: self.cursor_front().unwrap_or(Cursor::EMPTY),
            back: self.cursor_back().unwrap_or(Cursor::EMPTY),
            remaining: self.len(),
        }
    }

    /// Iterate with mutable value references, same order as
    /// [`iter`](Self::iter).
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let order = self.traversal_order();
        let entries = self
            .slots
            .iter_mut()
            .map(|(k, n)| {
                let Node { key, value, .. } = n;
                (k, (&*key, value))
            })
            .collect();
        IterMut {
            order: order.into_iter(),
            entries,
        }
    }
}

impl<'a, K, V> IntoIterator for &'a ChainHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut ChainHashMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for ChainHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let order = self.traversal_order();
        IntoIter {
            order: order.into_iter(),
            slots: self.slots,
        }
    }
}
