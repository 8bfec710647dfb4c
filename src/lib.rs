//! chain-hashmap: a single-threaded hash map with separate chaining over a
//! fixed bucket array and bidirectional cursors over bucket-then-chain
//! order.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a reusable in-memory key/value table whose traversal machinery
//!   (cursors and sentinels) is explicit and safe, built in small layers
//!   that can be reasoned about independently.
//! - Layers:
//!   - Digest: deterministic hash strategies per key type (bit-mixing for
//!     integers, djb2 for strings). No `BuildHasher` randomness; bucket
//!     placement is stable across runs.
//!   - ChainHashMap<K, V>: the bucket array plus a slot arena of chained
//!     nodes. Buckets hold the arena key of their chain head; nodes hold
//!     prev/next arena keys. All splicing is O(1) index surgery, no
//!     pointers.
//!   - Cursor: a tagged position (valid entry, end sentinel, begin
//!     sentinel, or empty) with `advance`/`retreat` stepping across chain
//!     and bucket boundaries. Reverse traversal steps with the opposite
//!     function.
//!   - Iter/IterMut/IntoIter: double-ended iterators driven by the cursor
//!     state machine; `.rev()` is the mirror of the forward walk.
//!
//! Constraints
//! - Single-threaded: no internal locking; the map owns its arena and
//!   bucket array exclusively.
//! - Fixed bucket count for the map's lifetime: no rehashing or
//!   load-factor growth. Chains grow without bound, so lookups degrade to
//!   O(chain length) under load. This is a deliberate design limit, not an
//!   oversight; size the bucket count up front.
//! - Mutation invalidates cursors into the affected bucket. Generational
//!   arena keys make stale cursors fail safely (they read as absent) rather
//!   than alias reused storage.
//! - A debug-only exclusion guard panics on reentry from key code (`Eq`,
//!   `Digest`, emplace constructors) while chain links are transiently
//!   inconsistent; it compiles away in release builds.
//!
//! Error model
//! - Three misuse classes, all synchronous and raised before any mutation:
//!   `KeyNotFound` (read-only keyed access to an absent key),
//!   `AbsentCursor` (dereferencing a sentinel/empty/stale cursor), and
//!   `EmptyTable` (first/last position of an empty map).
//!
//! Notes and non-goals
//! - No thread safety, no persistence, no custom allocators.
//! - `Clone` is a deep copy in traversal order; moved-from behavior is
//!   plain Rust move semantics (`mem::take` with `Default` reproduces the
//!   reusable-empty-source pattern).
//! - Keys are immutable post-insert; only values can be mutated in place.

mod chain_map_proptest;
mod cursor;
mod digest;
mod guard;
mod iter;
mod map;

// Public surface
pub use cursor::Cursor;
pub use digest::Digest;
pub use iter::{IntoIter, Iter, IterMut};
pub use map::{AccessError, ChainHashMap, DEFAULT_BUCKET_COUNT};
