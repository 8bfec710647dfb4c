//! ChainHashMap: bucket array, chained nodes, keyed operations, and
//! lifecycle.

use crate::cursor::{Cursor, Pos};
use crate::digest::Digest;
use crate::guard::DebugExclusion;
use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;
use slotmap::{DefaultKey, SlotMap};

/// Bucket count used by [`ChainHashMap::new`].
pub const DEFAULT_BUCKET_COUNT: usize = 13;

/// One stored entry plus its chain links. Nodes live in the slot arena and
/// reference each other by key, never by pointer.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) prev: Option<DefaultKey>,
    pub(crate) next: Option<DefaultKey>,
}

/// A hash map with separate chaining over a bucket array whose size is fixed
/// at construction.
///
/// Entries are kept in a slot arena; each bucket holds the arena key of its
/// chain head and each node links to its chain neighbors. Traversal order is
/// bucket-then-chain order, and reverse traversal is its exact mirror.
///
/// # Known limitation
///
/// The bucket array never grows. Chains lengthen without bound as entries
/// accumulate, so lookups degrade to O(chain length) under load. Pick the
/// bucket count for the expected population via
/// [`with_bucket_count`](Self::with_bucket_count).
pub struct ChainHashMap<K, V> {
    pub(crate) buckets: Box<[Option<DefaultKey>]>,
    pub(crate) slots: SlotMap<DefaultKey, Node<K, V>>,
    pub(crate) exclusion: DebugExclusion,
}

/// Failures raised at the point of misuse. Every operation that can fail
/// does so before mutating anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// Read-only keyed access to a key the table does not hold.
    KeyNotFound,
    /// Dereference of a cursor that is a sentinel, default-constructed, or
    /// stale (its entry was erased).
    AbsentCursor,
    /// First/last position requested on a table with no entries.
    EmptyTable,
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            AccessError::KeyNotFound => "key not found in table",
            AccessError::AbsentCursor => "cursor does not reference a live entry",
            AccessError::EmptyTable => "table is empty",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for AccessError {}

impl<K, V> ChainHashMap<K, V> {
    /// An empty table with [`DEFAULT_BUCKET_COUNT`] buckets.
    pub fn new() -> Self {
        Self::with_bucket_count(DEFAULT_BUCKET_COUNT)
    }

    /// An empty table with `buckets` chain heads. The count is fixed for the
    /// table's lifetime; there is no rehashing.
    ///
    /// # Panics
    ///
    /// Panics if `buckets` is zero.
    pub fn with_bucket_count(buckets: usize) -> Self {
        assert!(buckets > 0, "bucket count must be nonzero");
        Self {
            buckets: vec![None; buckets].into_boxed_slice(),
            slots: SlotMap::with_key(),
            exclusion: DebugExclusion::new(),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of buckets, fixed at construction.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Drops every entry and resets all chain heads. Bucket capacity is
    /// retained.
    pub fn clear(&mut self) {
        for head in self.buckets.iter_mut() {
            *head = None;
        }
        self.slots.clear();
    }

    pub(crate) fn bucket_index(&self, digest: u64) -> usize {
        (digest % self.buckets.len() as u64) as usize
    }

    /// Splice `node` out of its chain. The arena entry itself is untouched;
    /// the caller removes it once links are consistent again.
    fn unlink(
        buckets: &mut [Option<DefaultKey>],
        slots: &mut SlotMap<DefaultKey, Node<K, V>>,
        bucket: usize,
        node: DefaultKey,
    ) {
        let (prev, next) = {
            let n = &slots[node];
            (n.prev, n.next)
        };
        match prev {
            Some(p) => slots[p].next = next,
            None => buckets[bucket] = next,
        }
        if let Some(nx) = next {
            slots[nx].prev = prev;
        }
    }

    /// Removes the entry the cursor references, splicing it out of its chain
    /// without re-hashing the key. On success the cursor is advanced to the
    /// next position in forward order (the end sentinel when the removed
    /// entry was last), so `erase_at` composes with iteration.
    ///
    /// Returns `false`, leaving the cursor and table unchanged, when the
    /// cursor is a sentinel, default-constructed, or stale.
    pub fn erase_at(&mut self, cursor: &mut Cursor) -> bool {
        let Pos::Valid { bucket, node } = cursor.0 else {
            return false;
        };
        if !self.slots.contains_key(node) {
            return false;
        }
        // The successor outlives the splice: only the removed node's
        // neighbors are relinked.
        let next = self.advance(*cursor);
        {
            let _g = self.exclusion.enter();
            Self::unlink(&mut self.buckets, &mut self.slots, bucket, node);
        }
        self.slots.remove(node);
        *cursor = next;
        true
    }
}

impl<K, V> ChainHashMap<K, V>
where
    K: Digest + Eq,
{
    /// Chain walk shared by the keyed operations. No guard here; callers
    /// hold it.
    fn locate<Q>(&self, q: &Q) -> Option<(usize, DefaultKey)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Digest + Eq,
    {
        let bucket = self.bucket_index(q.digest());
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let node = &self.slots[k];
            if node.key.borrow() == q {
                return Some((bucket, k));
            }
            cur = node.next;
        }
        None
    }

    /// Walk the key's chain; overwrite on a match, append at the tail
    /// otherwise. `make` runs on both paths.
    fn upsert<F>(&mut self, key: K, make: F) -> (bool, usize, DefaultKey)
    where
        F: FnOnce() -> V,
    {
        let _g = self.exclusion.enter();
        let bucket = self.bucket_index(key.digest());
        let mut tail = None;
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            if self.slots[k].key == key {
                self.slots[k].value = make();
                return (false, bucket, k);
            }
            tail = Some(k);
            cur = self.slots[k].next;
        }
        let fresh = self.slots.insert(Node {
            key,
            value: make(),
            prev: tail,
            next: None,
        });
        match tail {
            Some(t) => self.slots[t].next = Some(fresh),
            None => self.buckets[bucket] = Some(fresh),
        }
        (true, bucket, fresh)
    }

    /// A cursor at the entry for `q`, or [`Cursor::EMPTY`] if absent. Never
    /// mutates.
    pub fn find<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized + Digest + Eq,
    {
        let _g = self.exclusion.enter();
        match self.locate(q) {
            Some((bucket, node)) => Cursor::valid(bucket, node),
            None => Cursor::EMPTY,
        }
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Digest + Eq,
    {
        let _g = self.exclusion.enter();
        self.locate(q).is_some()
    }

    /// Inserts `value` under `key`, overwriting in place when the key is
    /// already present. Returns whether a new entry was created (the count
    /// changes only then) and a cursor at the entry.
    pub fn insert(&mut self, key: K, value: V) -> (bool, Cursor) {
        let (inserted, bucket, node) = self.upsert(key, move || value);
        (inserted, Cursor::valid(bucket, node))
    }

    /// Like [`insert`](Self::insert), but the value is built by `construct`.
    /// The overwrite path also reconstructs the value.
    pub fn emplace<F>(&mut self, key: K, construct: F)
    where
        F: FnOnce() -> V,
    {
        let _ = self.upsert(key, construct);
    }

    /// Removes the entry for `q`, reporting whether one existed.
    pub fn erase<Q>(&mut self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Digest + Eq,
    {
        let node = {
            let _g = self.exclusion.enter();
            let Some((bucket, node)) = self.locate(q) else {
                return false;
            };
            Self::unlink(&mut self.buckets, &mut self.slots, bucket, node);
            node
        };
        // Links are consistent again; user Drop code may run freely.
        self.slots.remove(node);
        true
    }

    /// Read-only keyed access. Never inserts; absent keys are an error.
    pub fn get<Q>(&self, q: &Q) -> Result<&V, AccessError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Digest + Eq,
    {
        let _g = self.exclusion.enter();
        match self.locate(q) {
            Some((_, node)) => Ok(&self.slots[node].value),
            None => Err(AccessError::KeyNotFound),
        }
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V, AccessError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Digest + Eq,
    {
        let found = {
            let _g = self.exclusion.enter();
            self.locate(q)
        };
        match found {
            Some((_, node)) => Ok(&mut self.slots[node].value),
            None => Err(AccessError::KeyNotFound),
        }
    }

    /// Mutable keyed access: returns the entry for `key`, inserting one
    /// built by `default` first when absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let found = {
            let _g = self.exclusion.enter();
            self.locate(&key).map(|(_, node)| node)
        };
        let node = match found {
            Some(node) => node,
            None => self.upsert(key, default).2,
        };
        &mut self.slots[node].value
    }

    /// [`get_or_insert_with`](Self::get_or_insert_with) with
    /// `V::default()`, matching map-style `table[key] = value` semantics.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut seen = std::collections::HashSet::new();
        let mut reachable = 0;
        for (bucket, head) in self.buckets.iter().enumerate() {
            let mut prev = None;
            let mut cur = *head;
            while let Some(k) = cur {
                let node = &self.slots[k];
                assert_eq!(node.prev, prev, "prev link out of sync");
                assert_eq!(
                    self.bucket_index(node.key.digest()),
                    bucket,
                    "node stored in the wrong bucket"
                );
                assert!(seen.insert(k), "node reachable twice");
                reachable += 1;
                prev = Some(k);
                cur = node.next;
            }
        }
        assert_eq!(reachable, self.slots.len(), "count != reachable nodes");
    }
}

impl<K, V> Default for ChainHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for ChainHashMap<K, V>
where
    K: Digest + Eq + Clone,
    V: Clone,
{
    /// Deep clone: a fresh table with the same bucket count, re-inserting
    /// every pair in forward traversal order.
    fn clone(&self) -> Self {
        let mut fresh = Self::with_bucket_count(self.bucket_count());
        for (k, v) in self.iter() {
            fresh.insert(k.clone(), v.clone());
        }
        fresh
    }
}

impl<K, V> FromIterator<(K, V)> for ChainHashMap<K, V>
where
    K: Digest + Eq,
{
    /// Inserts pairs in order; a repeated key keeps the last value but
    /// counts once.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(pairs: I) -> Self {
        let mut table = Self::new();
        for (k, v) in pairs {
            table.insert(k, v);
        }
        table
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for ChainHashMap<K, V>
where
    K: Digest + Eq,
{
    fn from(pairs: [(K, V); N]) -> Self {
        Self::from_iter(pairs)
    }
}

impl<K, V, Q> Index<&Q> for ChainHashMap<K, V>
where
    K: Digest + Eq + Borrow<Q>,
    Q: ?Sized + Digest + Eq,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is absent. Use [`ChainHashMap::get`] for a
    /// recoverable lookup or [`ChainHashMap::get_or_default`] for the
    /// inserting form.
    fn index(&self, q: &Q) -> &V {
        match self.get(q) {
            Ok(v) => v,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<K, V> fmt::Debug for ChainHashMap<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
