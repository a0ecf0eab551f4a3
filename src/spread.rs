//! Hash spreading and bucket index derivation.
//!
//! Bucket indices are taken from the low bits of the hash by masking, so
//! native hashes that differ only in their high bits would pile into the
//! same bucket. `spread` folds high bits down before the mask is applied.

use core::hash::{BuildHasher, Hash};

/// Hashes `q` with `hasher` and folds the 64-bit result to 32 bits.
#[inline]
pub(crate) fn native_hash<Q, S>(hasher: &S, q: &Q) -> u32
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    let h = hasher.hash_one(q);
    (h ^ (h >> 32)) as u32
}

/// Supplemental hash: `h ^= (h >>> 20) ^ (h >>> 12); h ^= (h >>> 7) ^ (h >>> 4)`.
#[inline]
pub(crate) fn spread(mut h: u32) -> u32 {
    h ^= (h >> 20) ^ (h >> 12);
    h ^ (h >> 7) ^ (h >> 4)
}

/// Bucket for `hash` in a table of `capacity` buckets; `capacity` is a power of two.
#[inline]
pub(crate) fn index_for(hash: u32, capacity: usize) -> usize {
    debug_assert!(capacity.is_power_of_two());
    (hash as usize) & (capacity - 1)
}
