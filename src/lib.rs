//! chained-hashmap: a single-threaded, separately chained hash map with
//! cached spread hashes and growth driven by bucket occupancy.
//!
//! Internal Design:
//!
//! Summary
//! - Structure: a bucket array whose length is always a power of two;
//!   each bucket heads a singly linked chain of nodes. A node owns its key,
//!   its value, the key's spread hash and the link to the next node.
//! - Nodes live in a generational arena (`slotmap`); chain links and bucket
//!   heads are arena keys. Removal splices a node out and frees its slot,
//!   resize relinks keys into a fresh bucket array without moving nodes.
//! - Layers inside `ChainedHashMap<K, V, S>`:
//!   - a raw table that owns buckets, nodes and resize bookkeeping and never
//!     calls `K: Hash`;
//!   - the public map, which hashes keys with `S`, spreads the hash and
//!     guards each structural walk with a debug-only reentrancy check.
//!
//! Hashing and indexing
//! - The native hash (from `S`, folded to 32 bits) is spread with
//!   `h ^= (h >>> 20) ^ (h >>> 12); h ^= (h >>> 7) ^ (h >>> 4)` and cached on
//!   the node. Index is `hash & (capacity - 1)`.
//! - `K: Hash` is never invoked after insertion; resize uses cached hashes.
//!
//! Growth
//! - `threshold = floor(capacity * load_factor)` is compared with the number
//!   of non-empty buckets, not the number of entries. The check runs at the
//!   start of every insert, so occupancy may exceed the threshold until the
//!   next insert. Capacity doubles up to `MAX_CAPACITY`.
//!
//! Views
//! - `entry_set`, `key_set` and `values` are collected fresh from one pass
//!   over buckets then chains. For an unmodified table the three agree
//!   positionally and repeat the same order between calls.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (no locking, no atomics).
//! - Removal of an absent key is the only recoverable runtime error
//!   (`RemoveError::KeyNotFound`); bad construction parameters are rejected
//!   with `ConfigError`.
//! - Reentrancy from `K: Eq`/`K: Hash` into the same map panics in debug
//!   builds and is not checked in release builds.

mod chained_hash_map;
mod chained_hash_map_proptest;
pub mod config;
mod error;
mod reentrancy;
mod spread;

// Public surface
pub use chained_hash_map::{ChainedHashMap, EntryRef, Handle, Iter, IterMut};
pub use config::{TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MAX_CAPACITY};
pub use error::{ConfigError, RemoveError};
