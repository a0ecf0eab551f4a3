//! ChainedHashMap: bucket array of singly linked chains over a node arena.

use crate::config::{threshold_for, TableConfig, DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR, MAX_CAPACITY};
use crate::error::{ConfigError, RemoveError};
use crate::reentrancy::OpGuard;
use crate::spread::{index_for, native_hash, spread};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use core::iter::FusedIterator;
use core::mem;
use hashbrown::hash_map::DefaultHashBuilder;
use log::{debug, trace};
use slotmap::{DefaultKey, SlotMap};

/// Stable reference to one stored association.
///
/// Handles stay valid across inserts and resizes and stop resolving once
/// their entry is removed or the table is cleared, even if the arena slot is
/// reused by a later insert.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Option<&'a K> {
        map.table.nodes.get(self.0).map(|n| &n.key)
    }

    pub fn value<'a, K, V, S>(&self, map: &'a ChainedHashMap<K, V, S>) -> Option<&'a V> {
        map.table.nodes.get(self.0).map(|n| &n.value)
    }

    pub fn value_mut<'a, K, V, S>(&self, map: &'a mut ChainedHashMap<K, V, S>) -> Option<&'a mut V> {
        map.table.nodes.get_mut(self.0).map(|n| &mut n.value)
    }
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    hash: u32,
    key: K,
    value: V,
    next: Option<DefaultKey>,
}

/// Chain structure and resize bookkeeping. Never calls `K: Hash`; key
/// equality is only evaluated through the closures callers pass in.
#[derive(Debug, Clone)]
struct RawTable<K, V> {
    heads: Vec<Option<DefaultKey>>,
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    load_factor: f64,
    threshold: usize,
    occupied: usize,
}

impl<K, V> RawTable<K, V> {
    fn new(capacity: usize, load_factor: f64) -> Self {
        Self {
            heads: vec![None; capacity],
            nodes: SlotMap::with_key(),
            load_factor,
            threshold: threshold_for(capacity, load_factor),
            occupied: 0,
        }
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.heads.len()
    }

    fn find<F>(&self, hash: u32, mut eq: F) -> Option<DefaultKey>
    where
        F: FnMut(&K) -> bool,
    {
        let mut cur = self.heads[index_for(hash, self.capacity())];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.hash == hash && eq(&node.key) {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    /// Grows first if the previous insert left occupancy above the
    /// threshold, then replaces the value of an equal key or links a new
    /// head node.
    fn insert(&mut self, hash: u32, key: K, value: V) -> (Handle, Option<V>)
    where
        K: Eq,
    {
        if self.occupied > self.threshold {
            self.grow();
        }
        let idx = index_for(hash, self.capacity());
        let head = self.heads[idx];
        if head.is_none() {
            self.occupied += 1;
        }
        let mut cur = head;
        while let Some(k) = cur {
            let node = &mut self.nodes[k];
            if node.hash == hash && node.key == key {
                return (Handle(k), Some(mem::replace(&mut node.value, value)));
            }
            cur = node.next;
        }
        let k = self.nodes.insert(Node {
            hash,
            key,
            value,
            next: head,
        });
        self.heads[idx] = Some(k);
        (Handle(k), None)
    }

    /// Splices the matching node out of its chain and frees its slot.
    fn unlink<F>(&mut self, hash: u32, mut eq: F) -> Option<(K, V)>
    where
        F: FnMut(&K) -> bool,
    {
        let idx = index_for(hash, self.capacity());
        let mut prev: Option<DefaultKey> = None;
        let mut cur = self.heads[idx];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.hash == hash && eq(&node.key) {
                let next = node.next;
                match prev {
                    Some(p) => self.nodes[p].next = next,
                    None => self.heads[idx] = next,
                }
                if self.heads[idx].is_none() {
                    self.occupied -= 1;
                }
                let node = self.nodes.remove(k)?;
                return Some((node.key, node.value));
            }
            prev = cur;
            cur = node.next;
        }
        None
    }

    /// Doubles the bucket array and relinks every node by its cached hash.
    fn grow(&mut self) {
        let old_capacity = self.capacity();
        if old_capacity >= MAX_CAPACITY {
            return;
        }
        let new_capacity = old_capacity * 2;
        let mut heads: Vec<Option<DefaultKey>> = vec![None; new_capacity];
        let mut occupied = 0;
        for mut cur in mem::take(&mut self.heads) {
            while let Some(k) = cur {
                let node = &mut self.nodes[k];
                cur = node.next;
                let idx = index_for(node.hash, new_capacity);
                if heads[idx].is_none() {
                    occupied += 1;
                }
                node.next = heads[idx];
                heads[idx] = Some(k);
            }
        }
        self.heads = heads;
        self.occupied = occupied;
        self.threshold = threshold_for(new_capacity, self.load_factor);
        debug!(
            "grew chained hash map from {} to {} buckets ({} entries, {} occupied)",
            old_capacity,
            new_capacity,
            self.nodes.len(),
            occupied
        );
    }

    fn clear(&mut self) {
        let n = self.nodes.len();
        self.heads.fill(None);
        self.nodes.clear();
        self.occupied = 0;
        trace!("cleared {} entries from chained hash map", n);
    }
}

/// Separately chained hash map.
///
/// Keys are hashed once with `S`, spread, and cached on their node. The
/// bucket array doubles when the number of non-empty buckets exceeded
/// `floor(capacity * load_factor)` at the start of an insert.
pub struct ChainedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    table: RawTable<K, V>,
    guard: OpGuard,
}

impl<K, V> ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// Empty map with 16 buckets and load factor 0.75.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }

    pub fn with_capacity(capacity: usize) -> Result<Self, ConfigError> {
        Self::with_config_and_hasher(TableConfig::new().capacity(capacity), Default::default())
    }

    pub fn with_capacity_and_load_factor(capacity: usize, load_factor: f64) -> Result<Self, ConfigError> {
        let config = TableConfig::new().capacity(capacity).load_factor(load_factor);
        Self::with_config_and_hasher(config, Default::default())
    }
}

impl<K, V> Default for ChainedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over entries in bucket order, then chain order within a bucket.
pub struct Iter<'a, K, V> {
    heads: core::slice::Iter<'a, Option<DefaultKey>>,
    nodes: &'a SlotMap<DefaultKey, Node<K, V>>,
    cur: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (Handle, &'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        loop {
            if let Some(k) = self.cur {
                let node = &nodes[k];
                self.cur = node.next;
                self.remaining -= 1;
                return Some((Handle(k), &node.key, &node.value));
            }
            self.cur = *self.heads.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Iterator over mutable entries. Visits each entry once, in arena order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Node<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (Handle, &'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(k, n)| (Handle(k), &n.key, &mut n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// One association in a materialized entry view.
pub struct EntryRef<'a, K, V> {
    handle: Handle,
    key: &'a K,
    value: &'a V,
}

impl<'a, K, V> EntryRef<'a, K, V> {
    pub fn handle(&self) -> Handle {
        self.handle
    }
    pub fn key(&self) -> &'a K {
        self.key
    }
    pub fn value(&self) -> &'a V {
        self.value
    }
}

impl<K, V> Clone for EntryRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for EntryRef<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for EntryRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntryRef")
            .field(self.key)
            .field(self.value)
            .finish()
    }
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for EntryRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

impl<K, V, S> ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Empty map with the default configuration and the given hasher.
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            table: RawTable::new(DEFAULT_CAPACITY, DEFAULT_LOAD_FACTOR),
            guard: OpGuard::new(),
        }
    }

    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            hasher,
            table: RawTable::new(config.initial_capacity(), config.get_load_factor()),
            guard: OpGuard::new(),
        })
    }

    #[inline]
    fn make_hash<Q>(&self, q: &Q) -> u32
    where
        Q: ?Sized + Hash,
    {
        spread(native_hash(&self.hasher, q))
    }

    pub fn len(&self) -> usize {
        self.table.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.nodes.is_empty()
    }

    /// Current bucket count; always a power of two.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.load_factor
    }

    pub fn threshold(&self) -> usize {
        self.table.threshold
    }

    /// Number of non-empty buckets. Drives growth; not the entry count.
    pub fn occupied_buckets(&self) -> usize {
        self.table.occupied
    }

    /// Associates `value` with `key`, returning the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.insert_full(key, value).1
    }

    /// Like `insert`, also returning the handle of the entry now holding `value`.
    pub fn insert_full(&mut self, key: K, value: V) -> (Handle, Option<V>) {
        let _g = self.guard.enter("insert");
        let hash = self.make_hash(&key);
        self.table.insert(hash, key, value)
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(q)?;
        self.table.nodes.get(k.0).map(|n| &n.value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(q)?;
        self.table.nodes.get_mut(k.0).map(|n| &mut n.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub fn find<Q>(&self, q: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.guard.enter("find");
        let hash = self.make_hash(q);
        self.table.find(hash, |k| k.borrow() == q).map(Handle)
    }

    /// Removes `q`'s association and returns its value.
    pub fn remove<Q>(&mut self, q: &Q) -> Result<V, RemoveError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Removes `q`'s association and returns the stored key and value.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Result<(K, V), RemoveError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        // The guard is released before the caller drops K or V.
        let removed = {
            let _g = self.guard.enter("remove");
            let hash = self.make_hash(q);
            self.table.unlink(hash, |k| k.borrow() == q)
        };
        removed.ok_or(RemoveError::KeyNotFound)
    }

    /// Removes every entry, keeping capacity and load factor.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a copy of every association in `source`; later pairs
    /// overwrite existing keys.
    pub fn put_all<S2>(&mut self, source: &ChainedHashMap<K, V, S2>)
    where
        K: Clone,
        V: Clone,
        S2: BuildHasher,
    {
        for (_, k, v) in source.iter() {
            self.insert(k.clone(), v.clone());
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            heads: self.table.heads.iter(),
            nodes: &self.table.nodes,
            cur: None,
            remaining: self.table.nodes.len(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.table.nodes.iter_mut(),
        }
    }

    /// Every association, in `iter` order, collected fresh on each call.
    pub fn entry_set(&self) -> Vec<EntryRef<'_, K, V>> {
        self.iter()
            .map(|(handle, key, value)| EntryRef { handle, key, value })
            .collect()
    }

    /// Every key, positionally aligned with `values`.
    pub fn key_set(&self) -> Vec<&K> {
        self.iter().map(|(_, k, _)| k).collect()
    }

    /// Every value, positionally aligned with `key_set`.
    pub fn values(&self) -> Vec<&V> {
        self.iter().map(|(_, _, v)| v).collect()
    }

    /// Walks the whole structure and panics on any broken invariant.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let t = &self.table;
        assert!(t.capacity().is_power_of_two());
        assert_eq!(t.threshold, threshold_for(t.capacity(), t.load_factor));
        let mut occupied = 0;
        let mut reachable = 0;
        for (idx, head) in t.heads.iter().enumerate() {
            if head.is_some() {
                occupied += 1;
            }
            let mut cur = *head;
            while let Some(k) = cur {
                let node = &t.nodes[k];
                assert_eq!(index_for(node.hash, t.capacity()), idx, "node in wrong bucket");
                assert_eq!(node.hash, self.make_hash(&node.key), "stale cached hash");
                reachable += 1;
                cur = node.next;
            }
        }
        assert_eq!(occupied, t.occupied, "occupied bucket count drifted");
        assert_eq!(reachable, t.nodes.len(), "unreachable or orphaned nodes");
        assert!(self.len() >= t.occupied);
        assert_eq!(self.is_empty(), t.occupied == 0);
    }
}

impl<K, V, S> Clone for ChainedHashMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            table: self.table.clone(),
            guard: OpGuard::new(),
        }
    }
}

impl<K, V, S> fmt::Debug for ChainedHashMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(_, k, v)| (k, v)))
            .finish()
    }
}

impl<K, V, S> Extend<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ChainedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}
