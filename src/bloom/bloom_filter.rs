use crate::bit_vec::BitVec;
use crate::error::{check_open_unit, check_positive, Error, Result};
use crate::hash::{Hasher, Murmur3Hasher};
use crate::serializer::{ByteSerializer, Serializer};
use crate::util::HashPair;
use std::f64::consts::LN_2;
use std::marker::PhantomData;

/// The bit array of a bloom filter, addressed by precomputed hash pairs.
///
/// The array is partitioned into `hasher_count` slices of `slice_len` bits and probe `i` only
/// touches slice `i`.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RawBloomFilter {
    bit_vec: BitVec,
    error_rate: f64,
    capacity: usize,
    hasher_count: usize,
    slice_len: usize,
}

impl RawBloomFilter {
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self> {
        check_positive("capacity", capacity)?;
        check_open_unit("error_rate", error_rate)?;

        let bit_count = (-(capacity as f64) * error_rate.ln() / (LN_2 * LN_2)).ceil() as usize;
        let hasher_count = ((bit_count as f64 / capacity as f64) * LN_2).round() as usize;
        let hasher_count = hasher_count.max(1);
        let slice_len = ((bit_count as f64 / hasher_count as f64).ceil() as usize).max(1);

        Ok(RawBloomFilter {
            bit_vec: BitVec::new(slice_len * hasher_count),
            error_rate,
            capacity,
            hasher_count,
            slice_len,
        })
    }

    fn offsets(&self, hashes: HashPair) -> impl Iterator<Item = usize> {
        let slice_len = self.slice_len;
        hashes
            .iter()
            .take(self.hasher_count)
            .enumerate()
            .map(move |(slice, hash)| slice * slice_len + (hash % slice_len as u64) as usize)
    }

    pub fn insert(&mut self, hashes: HashPair) {
        for offset in self.offsets(hashes) {
            self.bit_vec.set(offset);
        }
    }

    pub fn contains(&self, hashes: HashPair) -> bool {
        self.offsets(hashes).all(|offset| self.bit_vec[offset])
    }

    /// More than half of the bits are set.
    pub fn is_saturated(&self) -> bool {
        self.bit_vec.count_ones() * 2 > self.bit_vec.len()
    }

    pub fn union(&mut self, other: &RawBloomFilter) -> Result<()> {
        if self.hasher_count != other.hasher_count || self.slice_len != other.slice_len {
            return Err(Error::incompatible(format!(
                "bloom filter shapes differ: {} slices of {} bits vs {} slices of {} bits",
                self.hasher_count, self.slice_len, other.hasher_count, other.slice_len,
            )));
        }
        self.bit_vec.union(&other.bit_vec);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.bit_vec.len()
    }

    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn hasher_count(&self) -> usize {
        self.hasher_count
    }

    pub fn slice_len(&self) -> usize {
        self.slice_len
    }

    pub fn count_ones(&self) -> usize {
        self.bit_vec.count_ones()
    }

    pub fn count_zeros(&self) -> usize {
        self.bit_vec.count_zeros()
    }

    pub fn estimated_fpp(&self) -> f64 {
        let single_fpp = self.bit_vec.count_ones() as f64 / self.bit_vec.len() as f64;
        single_fpp.powi(self.hasher_count as i32)
    }

    pub fn clear(&mut self) {
        self.bit_vec.clear()
    }
}

/// A space-efficient probabilistic data structure to test for membership in a set.
///
/// The bit array is sized once from the expected number of items `n` and the target false
/// positive probability `p`: `m = ceil(-n * ln(p) / ln(2)^2)` bits and
/// `k = round(m / n * ln(2))` probes. The array is split into `k` slices of `ceil(m / k)` bits
/// and probe `i` sets a bit in slice `i` at `(h1 + i * h2) mod slice_len`, where `h1` and `h2`
/// are two differently seeded hashes of the serialized item.
///
/// Inserted items are always reported as present. The false positive rate approaches `p` as the
/// filter reaches its capacity and keeps rising past it.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::bloom::BloomFilter;
///
/// let mut filter = BloomFilter::<str>::new(10, 0.01).unwrap();
///
/// assert!(!filter.contains("foo").unwrap());
/// filter.add("foo").unwrap();
/// assert!(filter.contains("foo").unwrap());
///
/// filter.clear();
/// assert!(!filter.contains("foo").unwrap());
///
/// assert_eq!(filter.len(), 98);
/// assert_eq!(filter.num_hashes(), 7);
/// ```
#[derive(Debug)]
pub struct BloomFilter<T: ?Sized, S = ByteSerializer, H = Murmur3Hasher> {
    filter: RawBloomFilter,
    hasher: H,
    serializer: S,
    _marker: PhantomData<T>,
}

impl<T> BloomFilter<T>
where
    T: ?Sized,
    ByteSerializer: Serializer<T>,
{
    /// Constructs a new, empty `BloomFilter` with an estimated max capacity of `item_count`
    /// items and a maximum false positive probability of `error_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `item_count` is zero or `error_rate` is not in
    /// `(0, 1)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let filter = BloomFilter::<str>::new(10, 0.01).unwrap();
    /// assert!(BloomFilter::<str>::new(10, 1.0).is_err());
    /// ```
    pub fn new(item_count: usize, error_rate: f64) -> Result<Self> {
        Self::with_parts(item_count, error_rate, Murmur3Hasher, ByteSerializer)
    }
}

impl<T, S, H> BloomFilter<T, S, H>
where
    T: ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    /// Constructs a new, empty `BloomFilter` with an estimated max capacity of `item_count`
    /// items, a maximum false positive probability of `error_rate`, a hasher and a serializer.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    /// use probabilistic_sketches::hash::SipByteHasher;
    ///
    /// let mut filter = BloomFilter::<u32, _, _>::with_parts(
    ///     100,
    ///     0.01,
    ///     SipByteHasher,
    ///     |item: &u32| item.to_le_bytes().to_vec(),
    /// )
    /// .unwrap();
    ///
    /// filter.add(&7).unwrap();
    /// assert!(filter.contains(&7).unwrap());
    /// ```
    pub fn with_parts(
        item_count: usize,
        error_rate: f64,
        hasher: H,
        serializer: S,
    ) -> Result<Self> {
        Ok(BloomFilter {
            filter: RawBloomFilter::new(item_count, error_rate)?,
            hasher,
            serializer,
            _marker: PhantomData,
        })
    }

    fn hash_pair(&self, item: &T) -> Result<HashPair> {
        let bytes = self.serializer.serialize(item)?;
        Ok(HashPair::new(&self.hasher, &bytes))
    }

    /// Inserts an element into the bloom filter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the item cannot be serialized, in which case the
    /// filter is left untouched.
    pub fn add(&mut self, item: &T) -> Result<()> {
        let hashes = self.hash_pair(item)?;
        self.filter.insert(hashes);
        Ok(())
    }

    /// Checks if an element is possibly in the bloom filter.
    pub fn contains(&self, item: &T) -> Result<bool> {
        let hashes = self.hash_pair(item)?;
        Ok(self.filter.contains(hashes))
    }

    /// Merges `other` into this bloom filter, so that it reports every item present in either.
    ///
    /// Both filters must use the same hasher and serializer for the result to be meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Incompatible`] if the filters have different numbers of hashes or slice
    /// lengths.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let mut filter1 = BloomFilter::<str>::new(10, 0.01).unwrap();
    /// let mut filter2 = BloomFilter::<str>::new(10, 0.01).unwrap();
    /// filter1.add("foo").unwrap();
    /// filter2.add("bar").unwrap();
    ///
    /// filter1.union(&filter2).unwrap();
    /// assert!(filter1.contains("foo").unwrap());
    /// assert!(filter1.contains("bar").unwrap());
    /// ```
    pub fn union(&mut self, other: &Self) -> Result<()> {
        self.filter.union(&other.filter)
    }

    /// Returns the number of bits in the bloom filter.
    pub fn len(&self) -> usize {
        self.filter.len()
    }

    /// Returns `true` if the bloom filter has no bits. Never true for a constructed filter.
    pub fn is_empty(&self) -> bool {
        self.filter.len() == 0
    }

    /// Returns the number of hash probes per item, which is also the number of slices.
    pub fn num_hashes(&self) -> usize {
        self.filter.hasher_count()
    }

    /// Returns the number of bits in each slice.
    pub fn slice_size(&self) -> usize {
        self.filter.slice_len()
    }

    /// Returns the false positive probability the filter was sized for.
    pub fn error_rate(&self) -> f64 {
        self.filter.error_rate()
    }

    /// Returns the number of items the filter was sized for.
    pub fn capacity(&self) -> usize {
        self.filter.capacity()
    }

    /// Returns the number of set bits in the bloom filter.
    pub fn count_ones(&self) -> usize {
        self.filter.count_ones()
    }

    /// Returns the number of unset bits in the bloom filter.
    pub fn count_zeros(&self) -> usize {
        self.filter.count_zeros()
    }

    /// Returns `true` once more than half of the bits are set.
    pub fn is_saturated(&self) -> bool {
        self.filter.is_saturated()
    }

    /// Returns the estimated false positive probability of the bloom filter. This value will
    /// increase as more items are added.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::BloomFilter;
    ///
    /// let mut filter = BloomFilter::<str>::new(100, 0.01).unwrap();
    /// assert!(filter.estimated_fpp() < std::f64::EPSILON);
    ///
    /// filter.add("foo").unwrap();
    /// assert!(filter.estimated_fpp() > std::f64::EPSILON);
    /// assert!(filter.estimated_fpp() < 0.01);
    /// ```
    pub fn estimated_fpp(&self) -> f64 {
        self.filter.estimated_fpp()
    }

    /// Clears the bloom filter, removing all elements.
    pub fn clear(&mut self) {
        self.filter.clear()
    }
}

impl<T, S, H> Clone for BloomFilter<T, S, H>
where
    T: ?Sized,
    S: Clone,
    H: Clone,
{
    fn clone(&self) -> Self {
        BloomFilter {
            filter: self.filter.clone(),
            hasher: self.hasher.clone(),
            serializer: self.serializer.clone(),
            _marker: PhantomData,
        }
    }
}
