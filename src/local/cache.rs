//! Direct-mapped distance cache for the local-search hot path.

use crate::problem::DistanceProvider;

/// Largest item index the cache can key. Pairs beyond it bypass the cache.
pub const MAX_CACHED_INDEX: usize = 0xFFFE;

/// Default number of cache slots.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

const EMPTY: u32 = u32::MAX;

/// Fixed-capacity, direct-mapped cache of pairwise distances.
///
/// Keys are canonicalized to `(min(i, j), max(i, j))`, so `(i, j)` and
/// `(j, i)` share one slot. A `put` into an occupied slot overwrites it
/// unconditionally: collisions cost misses, never wrong values.
///
/// Keys and values live in two parallel arrays. Each index must be at most
/// [`MAX_CACHED_INDEX`]; [`distance`](Self::distance) falls through to the
/// provider for larger indices.
///
/// The cache is not thread-safe. Each local-search strategy owns one and
/// clears it at the start of every call.
///
/// # Examples
///
/// ```
/// use u_permevo::local::DistanceCache;
///
/// let mut cache = DistanceCache::new(64);
/// cache.put(3, 7, 1.5);
/// assert_eq!(cache.try_get(7, 3), Some(1.5));
/// assert_eq!(cache.hits(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct DistanceCache {
    keys: Vec<u32>,
    values: Vec<f64>,
    mask: usize,
    hits: u64,
    misses: u64,
}

impl DistanceCache {
    /// Creates a cache with `capacity` slots, rounded up to a power of two.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1).next_power_of_two();
        Self {
            keys: vec![EMPTY; capacity],
            values: vec![0.0; capacity],
            mask: capacity - 1,
            hits: 0,
            misses: 0,
        }
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.keys.len()
    }

    /// Looks up the distance for the pair, counting a hit or a miss.
    #[inline]
    pub fn try_get(&mut self, i: usize, j: usize) -> Option<f64> {
        let key = pack(i, j);
        let slot = self.slot(key);
        if self.keys[slot] == key {
            self.hits += 1;
            Some(self.values[slot])
        } else {
            self.misses += 1;
            None
        }
    }

    /// Stores the distance for the pair, evicting whatever shared its slot.
    #[inline]
    pub fn put(&mut self, i: usize, j: usize, value: f64) {
        let key = pack(i, j);
        let slot = self.slot(key);
        self.keys[slot] = key;
        self.values[slot] = value;
    }

    /// Empties every slot and resets the hit/miss counters.
    pub fn clear(&mut self) {
        self.keys.fill(EMPTY);
        self.hits = 0;
        self.misses = 0;
    }

    /// Cache-backed distance lookup. Computes and stores on a miss.
    #[inline]
    pub fn distance<D: DistanceProvider + ?Sized>(
        &mut self,
        provider: &D,
        i: usize,
        j: usize,
    ) -> f64 {
        if i > MAX_CACHED_INDEX || j > MAX_CACHED_INDEX {
            return provider.distance(i, j);
        }
        if let Some(d) = self.try_get(i, j) {
            return d;
        }
        let d = provider.distance(i, j);
        self.put(i, j, d);
        d
    }

    /// Number of lookups that found their key.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of lookups that did not.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Fraction of lookups that hit, or 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    #[inline]
    fn slot(&self, key: u32) -> usize {
        // Fibonacci hashing, folded so the high product bits reach the mask.
        let h = key.wrapping_mul(0x9E37_79B1);
        (h ^ (h >> 15)) as usize & self.mask
    }
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[inline]
fn pack(i: usize, j: usize) -> u32 {
    debug_assert!(i <= MAX_CACHED_INDEX && j <= MAX_CACHED_INDEX);
    let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
    ((lo as u32) << 16) | hi as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::DistanceMatrix;

    #[test]
    fn test_put_then_get() {
        let mut cache = DistanceCache::new(64);
        cache.put(2, 9, 4.25);
        assert_eq!(cache.try_get(2, 9), Some(4.25));
    }

    #[test]
    fn test_symmetric_keys_share_slot() {
        let mut cache = DistanceCache::new(64);
        cache.put(9, 2, 4.25);
        assert_eq!(cache.try_get(2, 9), Some(4.25));
        assert_eq!(cache.try_get(9, 2), Some(4.25));
        assert_eq!((cache.hits(), cache.misses()), (2, 0));
    }

    #[test]
    fn test_clear_resets_counters_and_data() {
        let mut cache = DistanceCache::new(64);
        cache.put(1, 2, 3.0);
        cache.try_get(1, 2);
        cache.try_get(4, 5);
        assert_eq!((cache.hits(), cache.misses()), (1, 1));

        cache.clear();
        assert_eq!((cache.hits(), cache.misses()), (0, 0));
        assert_eq!(cache.try_get(1, 2), None);
    }

    #[test]
    fn test_capacity_rounds_to_power_of_two() {
        assert_eq!(DistanceCache::new(50).capacity(), 64);
        assert_eq!(DistanceCache::new(0).capacity(), 1);
        assert_eq!(DistanceCache::default().capacity(), 64);
    }

    #[test]
    fn test_eviction_causes_misses() {
        let mut cache = DistanceCache::new(64);
        let keys: Vec<(usize, usize)> = (0..100).map(|k| (k, k + 1)).collect();

        for &(i, j) in &keys {
            cache.put(i, j, (i + j) as f64);
            // A key read right after its own put always hits.
            assert_eq!(cache.try_get(i, j), Some((i + j) as f64));
        }
        let hits_after_fill = cache.hits();
        assert_eq!(hits_after_fill, 100);
        assert_eq!(cache.misses(), 0);

        for &(i, j) in &keys {
            cache.try_get(i, j);
        }
        // 100 keys cannot fit in 64 slots.
        assert!(cache.misses() >= 36, "misses = {}", cache.misses());
    }

    #[test]
    fn test_distance_fills_on_miss() {
        let m = DistanceMatrix::from_coordinates(&[(0.0, 0.0), (3.0, 4.0), (6.0, 8.0)]);
        let mut cache = DistanceCache::new(8);

        assert!((cache.distance(&m, 0, 1) - 5.0).abs() < 1e-12);
        assert_eq!(cache.misses(), 1);
        assert!((cache.distance(&m, 1, 0) - 5.0).abs() < 1e-12);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let mut cache = DistanceCache::new(4);
        assert_eq!(cache.hit_rate(), 0.0);
        cache.put(0, 1, 1.0);
        cache.try_get(0, 1);
        cache.try_get(0, 2);
        assert!((cache.hit_rate() - 0.5).abs() < 1e-12);
    }
}
