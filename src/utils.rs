use std::hash::{BuildHasher, Hash};

#[cfg(feature = "ahash")]
use ahash::RandomState;

#[cfg(all(feature = "foldhash", not(feature = "ahash")))]
use foldhash::fast::FixedState;

#[cfg(all(not(feature = "ahash"), not(feature = "foldhash")))]
use std::collections::hash_map::DefaultHasher;
#[cfg(all(not(feature = "ahash"), not(feature = "foldhash")))]
use std::hash::BuildHasherDefault;

// Fixed seeds keep iteration order stable between runs and processes.
#[cfg(feature = "ahash")]
const SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// Hash a key down to the 32 bits that are sliced into the hash trie.
#[inline]
pub(crate) fn hash_key<Q: Hash + ?Sized>(k: &Q) -> u32 {
    #[cfg(feature = "ahash")]
    let h = RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]).hash_one(k);

    #[cfg(all(feature = "foldhash", not(feature = "ahash")))]
    let h = FixedState::default().hash_one(k);

    #[cfg(all(not(feature = "ahash"), not(feature = "foldhash")))]
    let h = BuildHasherDefault::<DefaultHasher>::default().hash_one(k);

    fold(h)
}

#[inline]
fn fold(h: u64) -> u32 {
    (h ^ (h >> 32)) as u32
}

/// The physical index of the slot for `bit` in a node holding `bitmap`.
#[inline]
pub(crate) fn slot_index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utils_hash_stable() {
        assert_eq!(hash_key(&42u64), hash_key(&42u64));
        assert_eq!(hash_key("a"), hash_key(&String::from("a")));
    }

    #[test]
    fn test_utils_slot_index() {
        let bitmap = 0b1011_0010;
        assert_eq!(slot_index(bitmap, 1 << 1), 0);
        assert_eq!(slot_index(bitmap, 1 << 4), 1);
        assert_eq!(slot_index(bitmap, 1 << 5), 2);
        assert_eq!(slot_index(bitmap, 1 << 7), 3);
        assert_eq!(slot_index(0, 1 << 31), 0);
        assert_eq!(slot_index(u32::MAX, 1 << 31), 31);
    }
}
