//! Key hashing.
//!
//! Both custom hash tables work on 32-bit hash codes. A key is first hashed
//! with the cache's [`BuildHasher`] and folded to 32 bits, then passed
//! through a supplemental spreading function that defends against weak
//! hashers. Power-of-two tables (the segmented cache) need the stronger
//! Wang/Jenkins spread because they only look at a few bits; the 3Q cache
//! indexes with a modulus and uses the cheaper shift-xor spread.

use core::hash::{BuildHasher, Hash};

/// Hashes `key` with `hash_builder` and folds the result to 32 bits.
#[inline]
pub(crate) fn hash_key<Q, S>(hash_builder: &S, key: &Q) -> u32
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    let h = hash_builder.hash_one(key);
    #[allow(clippy::cast_possible_truncation)]
    let folded = (h ^ (h >> 32)) as u32;
    folded
}

/// Single-word Wang/Jenkins spread, used to pick both the segment (upper
/// bits) and the bucket inside the segment (lower bits).
#[inline]
pub(crate) fn spread_segmented(mut h: u32) -> u32 {
    h = h.wrapping_add((h << 15) ^ 0xffff_cd7d);
    h ^= h >> 10;
    h = h.wrapping_add(h << 3);
    h ^= h >> 6;
    h = h.wrapping_add((h << 2).wrapping_add(h << 14));
    h ^ (h >> 16)
}

/// Shift-xor spread bounding collisions for hash codes that differ only by
/// constant multiples at each bit position.
#[inline]
pub(crate) fn spread_chained(mut h: u32) -> u32 {
    h ^= (h >> 20) ^ (h >> 12);
    h ^ (h >> 7) ^ (h >> 4)
}
