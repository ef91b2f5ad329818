//! Fast hash map and hash set type aliases.
//!
//! Torrent ids and path segments are short strings produced by our own API
//! client, so the Fx hash from `rustc-hash` is used instead of SipHash.
//! Denial-of-service resistance is not a concern for these maps.
//!
//! # Examples
//!
//! ```
//! use tb_core::{FxHashMap, TorrentId};
//!
//! let mut counts: FxHashMap<TorrentId, usize> = FxHashMap::default();
//! counts.insert(TorrentId::from("8010485"), 1509);
//! assert_eq!(counts.get(&TorrentId::from("8010485")), Some(&1509));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// Creates a new [`FxHashSet`] sized for `capacity` elements.
#[inline]
#[must_use]
pub fn fx_hash_set_with_capacity<V>(capacity: usize) -> FxHashSet<V> {
    FxHashSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fx_hash_set_with_capacity() {
        let mut set: FxHashSet<String> = fx_hash_set_with_capacity(16);
        assert!(set.capacity() >= 16);
        assert!(set.insert("a".to_owned()));
        assert!(!set.insert("a".to_owned()));
    }
}
