use crate::error::{check_positive, Error, Result};
use crate::hash::{Hasher, Murmur3Hasher};
use crate::serializer::{ByteSerializer, Serializer};
use crate::util::FINGERPRINT_SEED;
use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;
use std::borrow::Borrow;
use std::collections::HashMap;
use tracing::trace;

const DEFAULT_SEED: u64 = 0x2545_f491_4f6c_dd1d;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Bucket {
    fingerprint: u64,
    count: u64,
}

#[derive(Debug)]
struct Candidate<O> {
    item: O,
    count: u64,
}

/// A HeavyKeeper sketch for finding the heavy hitters of a skewed stream in bounded memory.
///
/// The sketch is `depth` rows of `width` buckets, each holding an item fingerprint and a count.
/// Each row picks a bucket with its own seeded hash. A bucket holding the item's fingerprint is
/// incremented, but only if the item is already a top-k candidate or the bucket's count does not
/// exceed the smallest candidate count. A bucket holding another fingerprint decays by one with
/// probability `decay_base^-count` and is taken over by the item once it reaches zero. Items
/// whose largest bucket count exceeds the smallest candidate count by exactly one replace the
/// smallest candidate.
///
/// Row seeds and decay coins come from a `XorShiftRng` seeded at construction, so a given seed
/// and input stream always produce the same sketch.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::top_k::HeavyKeeperTopK;
///
/// let mut top_k = HeavyKeeperTopK::<str>::new(3, 100, 2, 1.08).unwrap();
///
/// for i in 0..1000 {
///     top_k.insert(&format!("player-{}", i)).unwrap();
/// }
/// for _ in 0..1000 {
///     top_k.insert("messi").unwrap();
/// }
///
/// assert!(top_k.query("messi").unwrap().unwrap() > 900);
/// ```
#[derive(Debug)]
pub struct HeavyKeeperTopK<T, S = ByteSerializer, H = Murmur3Hasher>
where
    T: ToOwned + ?Sized,
{
    depth: usize,
    width: usize,
    k: usize,
    decay_base: f64,
    buckets: Vec<Bucket>,
    seeds: Vec<u64>,
    rng: XorShiftRng,
    candidates: HashMap<Vec<u8>, Candidate<T::Owned>>,
    hasher: H,
    serializer: S,
}

impl<T> HeavyKeeperTopK<T>
where
    T: ToOwned + ?Sized,
    ByteSerializer: Serializer<T>,
{
    /// Constructs a new, empty `HeavyKeeperTopK` with `depth` rows of `width` buckets, tracking
    /// `k` candidates, with decay base `decay_base`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `depth`, `width` or `k` is zero, or `decay_base` is
    /// not greater than 1.
    pub fn new(depth: usize, width: usize, k: usize, decay_base: f64) -> Result<Self> {
        Self::with_parts(depth, width, k, decay_base, Murmur3Hasher, ByteSerializer)
    }
}

impl<T, S, H> HeavyKeeperTopK<T, S, H>
where
    T: ToOwned + ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    /// Constructs a new, empty `HeavyKeeperTopK` with a hasher and a serializer.
    pub fn with_parts(
        depth: usize,
        width: usize,
        k: usize,
        decay_base: f64,
        hasher: H,
        serializer: S,
    ) -> Result<Self> {
        Self::with_seed(depth, width, k, decay_base, DEFAULT_SEED, hasher, serializer)
    }

    /// Constructs a new, empty `HeavyKeeperTopK` whose row seeds and decay coins are drawn from
    /// a generator seeded with `seed`.
    pub fn with_seed(
        depth: usize,
        width: usize,
        k: usize,
        decay_base: f64,
        seed: u64,
        hasher: H,
        serializer: S,
    ) -> Result<Self> {
        check_positive("depth", depth)?;
        check_positive("width", width)?;
        check_positive("k", k)?;
        if !(decay_base > 1.0 && decay_base.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "`decay_base` must be greater than 1, got {}",
                decay_base
            )));
        }

        let mut rng = XorShiftRng::seed_from_u64(seed);
        let seeds = (0..depth).map(|_| rng.gen()).collect();
        Ok(HeavyKeeperTopK {
            depth,
            width,
            k,
            decay_base,
            buckets: vec![Bucket::default(); depth * width],
            seeds,
            rng,
            candidates: HashMap::with_capacity(k + 1),
            hasher,
            serializer,
        })
    }

    fn min_candidate(&self) -> Option<(&Vec<u8>, u64)> {
        self.candidates
            .iter()
            .map(|(key, candidate)| (key, candidate.count))
            .min_by_key(|(_, count)| *count)
    }

    /// Records one occurrence of an item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the item cannot be serialized, in which case nothing
    /// is modified.
    pub fn insert(&mut self, item: &T) -> Result<()> {
        let key = self.serializer.serialize(item)?;
        let is_candidate = self.candidates.contains_key(&*key);
        let min_count = self.min_candidate().map_or(0, |(_, count)| count);
        let fingerprint = self.hasher.hash(&key, FINGERPRINT_SEED);

        let mut max_count = 0;
        for row in 0..self.depth {
            let column = (self.hasher.hash(&key, self.seeds[row]) % self.width as u64) as usize;
            let bucket = &mut self.buckets[row * self.width + column];

            if bucket.fingerprint == fingerprint {
                if is_candidate || bucket.count <= min_count {
                    bucket.count += 1;
                    max_count = max_count.max(bucket.count);
                }
            } else if self.rng.gen::<f64>() < self.decay_base.powf(-(bucket.count as f64)) {
                bucket.count = bucket.count.saturating_sub(1);
                if bucket.count == 0 {
                    bucket.fingerprint = fingerprint;
                    bucket.count = 1;
                    max_count = max_count.max(1);
                }
            }
        }

        if let Some(candidate) = self.candidates.get_mut(&*key) {
            candidate.count = candidate.count.max(max_count);
        } else if self.candidates.len() < self.k || max_count == min_count + 1 {
            // A count one above the minimum means the item has just displaced a colliding
            // fingerprint rather than reached its bucket through a collision.
            self.candidates.insert(
                key.into_owned(),
                Candidate {
                    item: item.to_owned(),
                    count: max_count,
                },
            );
            if self.candidates.len() > self.k {
                if let Some(evicted) = self.min_candidate().map(|(key, _)| key.clone()) {
                    trace!(count = min_count, "evicting heavy keeper candidate");
                    self.candidates.remove(&evicted);
                }
            }
        }
        Ok(())
    }

    /// Returns the count of an item if it is a top-k candidate.
    pub fn query(&self, item: &T) -> Result<Option<u64>> {
        let key = self.serializer.serialize(item)?;
        Ok(self
            .candidates
            .get(&*key)
            .map(|candidate| candidate.count))
    }

    /// Returns a snapshot of the top-k candidates and their counts, highest count first.
    pub fn get_top_k(&self) -> Vec<(T::Owned, u64)> {
        let mut top_k: Vec<(T::Owned, u64)> = self
            .candidates
            .values()
            .map(|candidate| {
                let item: &T = candidate.item.borrow();
                (item.to_owned(), candidate.count)
            })
            .collect();
        top_k.sort_by(|a, b| b.1.cmp(&a.1));
        top_k
    }

    /// Returns the maximum number of candidates.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of candidates.
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Returns `true` if there are no candidates.
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
