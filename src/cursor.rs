//! Cursors: positions inside a `ChainHashMap` and the stepping logic that
//! moves them across chain and bucket boundaries.
//!
//! A cursor is one of four states, made explicit as a tagged union rather
//! than a nullable node plus flags:
//!
//! - *valid*: references a live entry (bucket index + arena key);
//! - *end sentinel*: one past the last entry of the last non-empty bucket;
//! - *begin sentinel*: one before the first entry of the first non-empty
//!   bucket;
//! - *empty*: default-constructed or not-found, distinct from both
//!   sentinels.
//!
//! Stepping never calls user code, so cursors can be moved while the map is
//! borrowed elsewhere. A cursor whose entry has been erased is stale; thanks
//! to generational arena keys it degrades to the empty state instead of
//! aliasing a reused slot.

use crate::map::{AccessError, ChainHashMap, Node};
use slotmap::DefaultKey;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Pos {
    Valid { bucket: usize, node: DefaultKey },
    End,
    Begin,
    Empty,
}

/// A position in a [`ChainHashMap`].
///
/// Cursors are small `Copy` handles in the style of a slot key: they do not
/// borrow the map, and every access goes through it
/// ([`key`](Cursor::key), [`value`](Cursor::value),
/// [`value_mut`](Cursor::value_mut), [`ChainHashMap::entry`]).
///
/// Two valid cursors are equal iff they reference the same entry; each
/// sentinel state is equal only to itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cursor(pub(crate) Pos);

impl Cursor {
    /// The forward "one past the last entry" sentinel.
    pub const END: Cursor = Cursor(Pos::End);
    /// The reverse "one before the first entry" sentinel.
    pub const BEGIN: Cursor = Cursor(Pos::Begin);
    /// The default-constructed / not-found cursor.
    pub const EMPTY: Cursor = Cursor(Pos::Empty);

    pub(crate) fn valid(bucket: usize, node: DefaultKey) -> Self {
        Cursor(Pos::Valid { bucket, node })
    }

    /// Whether this cursor references an entry. A `true` here can still be
    /// stale if the entry was erased since; accessors report that as absent.
    pub fn is_valid(&self) -> bool {
        matches!(self.0, Pos::Valid { .. })
    }

    pub fn is_end(&self) -> bool {
        self.0 == Pos::End
    }

    pub fn is_begin(&self) -> bool {
        self.0 == Pos::Begin
    }

    pub fn is_empty(&self) -> bool {
        self.0 == Pos::Empty
    }

    /// The key at this cursor, if it references a live entry.
    pub fn key<'a, K, V>(&self, map: &'a ChainHashMap<K, V>) -> Option<&'a K> {
        map.entry(*self).ok().map(|(k, _)| k)
    }

    /// The value at this cursor, if it references a live entry.
    pub fn value<'a, K, V>(&self, map: &'a ChainHashMap<K, V>) -> Option<&'a V> {
        map.entry(*self).ok().map(|(_, v)| v)
    }

    pub fn value_mut<'a, K, V>(&self, map: &'a mut ChainHashMap<K, V>) -> Option<&'a mut V> {
        map.entry_mut(*self).ok().map(|(_, v)| v)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::EMPTY
    }
}

impl<K, V> ChainHashMap<K, V> {
    /// A cursor at the first entry in traversal order (head of the first
    /// non-empty bucket).
    ///
    /// Errors with [`AccessError::EmptyTable`] when the table has no
    /// entries; there is no position to reference.
    pub fn cursor_front(&self) -> Result<Cursor, AccessError> {
        self.next_occupied(0)
            .map(|(b, k)| Cursor::valid(b, k))
            .ok_or(AccessError::EmptyTable)
    }

    /// A cursor at the last entry in traversal order (tail of the last
    /// non-empty bucket). Errors like [`cursor_front`](Self::cursor_front)
    /// on an empty table.
    pub fn cursor_back(&self) -> Result<Cursor, AccessError> {
        self.prev_occupied_tail(self.buckets.len())
            .map(|(b, k)| Cursor::valid(b, k))
            .ok_or(AccessError::EmptyTable)
    }

    /// One step forward: chain successor, else the head of the next
    /// non-empty bucket, else [`Cursor::END`].
    ///
    /// `advance` of the begin sentinel lands on the first entry (or the end
    /// sentinel of an empty table); the end sentinel and the empty cursor
    /// are fixed points. A stale cursor degrades to [`Cursor::EMPTY`].
    pub fn advance(&self, cursor: Cursor) -> Cursor {
        match cursor.0 {
            Pos::Valid { bucket, node } => {
                let Some(n) = self.slots.get(node) else {
                    return Cursor::EMPTY;
                };
                match n.next {
                    Some(next) => Cursor::valid(bucket, next),
                    None => self
                        .next_occupied(bucket + 1)
                        .map(|(b, k)| Cursor::valid(b, k))
                        .unwrap_or(Cursor::END),
                }
            }
            Pos::Begin => self.cursor_front().unwrap_or(Cursor::END),
            Pos::End => Cursor::END,
            Pos::Empty => Cursor::EMPTY,
        }
    }

    /// One step backward: chain predecessor, else the tail of the previous
    /// non-empty bucket, else [`Cursor::BEGIN`].
    ///
    /// `retreat` of the end sentinel lands on the last entry; one step
    /// consumes the sentinel. The begin sentinel and the empty cursor are
    /// fixed points; a stale cursor degrades to [`Cursor::EMPTY`].
    pub fn retreat(&self, cursor: Cursor) -> Cursor {
        match cursor.0 {
            Pos::Valid { bucket, node } => {
                let Some(n) = self.slots.get(node) else {
                    return Cursor::EMPTY;
                };
                match n.prev {
                    Some(prev) => Cursor::valid(bucket, prev),
                    None => self
                        .prev_occupied_tail(bucket)
                        .map(|(b, k)| Cursor::valid(b, k))
                        .unwrap_or(Cursor::BEGIN),
                }
            }
            Pos::End => self.cursor_back().unwrap_or(Cursor::BEGIN),
            Pos::Begin => Cursor::BEGIN,
            Pos::Empty => Cursor::EMPTY,
        }
    }

    /// The `(key, value)` pair at `cursor`.
    ///
    /// Errors with [`AccessError::AbsentCursor`] on sentinels, the empty
    /// cursor, and stale cursors.
    pub fn entry(&self, cursor: Cursor) -> Result<(&K, &V), AccessError> {
        match cursor.0 {
            Pos::Valid { node, .. } => self
                .slots
                .get(node)
                .map(|n| (&n.key, &n.value))
                .ok_or(AccessError::AbsentCursor),
            _ => Err(AccessError::AbsentCursor),
        }
    }

    /// Like [`entry`](Self::entry), with a mutable value reference.
    pub fn entry_mut(&mut self, cursor: Cursor) -> Result<(&K, &mut V), AccessError> {
        match cursor.0 {
            Pos::Valid { node, .. } => self
                .slots
                .get_mut(node)
                .map(|n| {
                    let Node { key, value, .. } = n;
                    (&*key, value)
                })
                .ok_or(AccessError::AbsentCursor),
            _ => Err(AccessError::AbsentCursor),
        }
    }

    /// First non-empty bucket at or after `from`, with its chain head.
    fn next_occupied(&self, from: usize) -> Option<(usize, DefaultKey)> {
        self.buckets
            .iter()
            .enumerate()
            .skip(from)
            .find_map(|(i, head)| head.map(|k| (i, k)))
    }

    /// Last non-empty bucket strictly before `upto`, with its chain tail.
    fn prev_occupied_tail(&self, upto: usize) -> Option<(usize, DefaultKey)> {
        self.buckets[..upto]
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, head)| head.map(|k| (i, self.chain_tail(k))))
    }

    fn chain_tail(&self, mut node: DefaultKey) -> DefaultKey {
        while let Some(next) = self.slots[node].next {
            node = next;
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_chain(keys: &[&'static str]) -> ChainHashMap<&'static str, usize> {
        // One bucket: traversal order == insertion order.
        let mut t = ChainHashMap::with_bucket_count(1);
        for (i, k) in keys.iter().enumerate() {
            t.insert(*k, i);
        }
        t
    }

    /// Forward walk: front, across the chain, then the end sentinel, which
    /// is a fixed point of `advance`.
    #[test]
    fn advance_walks_to_end_sentinel() {
        let t = single_chain(&["a", "b", "c"]);
        let mut c = t.cursor_front().unwrap();
        assert_eq!(c.key(&t), Some(&"a"));
        c = t.advance(c);
        assert_eq!(c.key(&t), Some(&"b"));
        c = t.advance(c);
        assert_eq!(c.key(&t), Some(&"c"));
        c = t.advance(c);
        assert!(c.is_end());
        assert!(t.advance(c).is_end());
    }

    /// One retreat consumes the end sentinel and lands on the last entry.
    #[test]
    fn retreat_consumes_end_sentinel() {
        let t = single_chain(&["a", "b"]);
        let c = t.retreat(Cursor::END);
        assert_eq!(c.key(&t), Some(&"b"));
        let c = t.retreat(c);
        assert_eq!(c.key(&t), Some(&"a"));
        let c = t.retreat(c);
        assert!(c.is_begin());
        assert!(t.retreat(c).is_begin());
    }

    /// Stepping crosses empty buckets to the next non-empty one.
    #[test]
    fn stepping_skips_empty_buckets() {
        let mut t: ChainHashMap<u32, u32> = ChainHashMap::with_bucket_count(97);
        for k in 0..6 {
            t.insert(k, k);
        }
        // Walk forward collecting keys, then backward; the backward walk
        // must mirror the forward one whatever the bucket layout is.
        let mut forward = Vec::new();
        let mut c = t.cursor_front().unwrap();
        while c.is_valid() {
            forward.push(*c.key(&t).unwrap());
            c = t.advance(c);
        }
        assert!(c.is_end());

        let mut backward = Vec::new();
        let mut c = t.retreat(Cursor::END);
        while c.is_valid() {
            backward.push(*c.key(&t).unwrap());
            c = t.retreat(c);
        }
        assert!(c.is_begin());

        backward.reverse();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 6);
    }

    /// Empty table: no first/last position exists, and the sentinels map to
    /// each other under stepping.
    #[test]
    fn empty_table_positions_error() {
        let t: ChainHashMap<u32, u32> = ChainHashMap::new();
        assert_eq!(t.cursor_front(), Err(AccessError::EmptyTable));
        assert_eq!(t.cursor_back(), Err(AccessError::EmptyTable));
        assert!(t.advance(Cursor::BEGIN).is_end());
        assert!(t.retreat(Cursor::END).is_begin());
    }

    /// Dereference of sentinel, empty, and stale cursors is an error;
    /// nothing panics.
    #[test]
    fn absent_cursor_access_errors() {
        let mut t = single_chain(&["a"]);
        assert_eq!(t.entry(Cursor::END), Err(AccessError::AbsentCursor));
        assert_eq!(t.entry(Cursor::BEGIN), Err(AccessError::AbsentCursor));
        assert_eq!(t.entry(Cursor::EMPTY), Err(AccessError::AbsentCursor));

        let stale = t.find("a");
        assert!(t.erase("a"));
        assert_eq!(t.entry(stale), Err(AccessError::AbsentCursor));
        assert_eq!(stale.value(&t), None);
        assert!(t.advance(stale).is_empty(), "stale cursors degrade to empty");
    }

    /// Cursor equality: same entry ⇒ equal; sentinels equal only
    /// themselves.
    #[test]
    fn cursor_equality() {
        let t = single_chain(&["a", "b"]);
        assert_eq!(t.find("a"), t.cursor_front().unwrap());
        assert_ne!(t.find("a"), t.find("b"));
        assert_eq!(Cursor::END, Cursor::END);
        assert_ne!(Cursor::END, Cursor::EMPTY);
        assert_ne!(Cursor::END, Cursor::BEGIN);
        assert_eq!(Cursor::default(), Cursor::EMPTY);
    }

    /// `erase_at` splices without re-hashing and leaves the cursor on the
    /// forward successor.
    #[test]
    fn erase_at_advances_to_successor() {
        let mut t = single_chain(&["a", "b", "c"]);
        let mut c = t.advance(t.cursor_front().unwrap()); // at "b"
        assert!(t.erase_at(&mut c));
        assert_eq!(t.len(), 2);
        assert_eq!(c.key(&t), Some(&"c"));
        t.assert_invariants();

        // Erasing the last entry leaves the cursor at the end sentinel.
        assert!(t.erase_at(&mut c));
        assert!(c.is_end());
        assert_eq!(t.len(), 1);

        // Sentinel and stale cursors fail without touching the table.
        assert!(!t.erase_at(&mut c));
        let mut empty = Cursor::EMPTY;
        assert!(!t.erase_at(&mut empty));
        assert_eq!(t.len(), 1);
    }

    /// Erase-while-iterating: `erase_at` composes into a filtering sweep.
    #[test]
    fn erase_during_iteration_composes() {
        let mut t: ChainHashMap<u32, u32> = ChainHashMap::new();
        for k in 0..10 {
            t.insert(k, k);
        }
        let mut c = t.cursor_front().unwrap();
        while c.is_valid() {
            let odd = *c.key(&t).unwrap() % 2 == 1;
            if odd {
                assert!(t.erase_at(&mut c));
            } else {
                c = t.advance(c);
            }
        }
        assert!(c.is_end());
        assert_eq!(t.len(), 5);
        for k in 0..10u32 {
            assert_eq!(t.contains_key(&k), k % 2 == 0);
        }
        t.assert_invariants();
    }
}
