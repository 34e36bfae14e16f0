use crate::bloom::bloom_filter::RawBloomFilter;
use crate::error::{check_open_unit, check_positive, Error, Result};
use crate::hash::{Hasher, Murmur3Hasher};
use crate::serializer::{ByteSerializer, Serializer};
use crate::util::HashPair;
use std::iter;
use std::marker::PhantomData;
use std::mem;
use tracing::debug;

/// A growable, space-efficient probabilistic data structure to test for membership in a set.
///
/// A scalable bloom filter is an append-only chain of bloom filters. Only the newest filter
/// receives insertions and every filter is queried on lookup. As soon as more than half of the
/// newest filter's bits are set, another filter is appended with `growth_rate` times its
/// capacity and `tightening_ratio` times its false positive probability. The first filter gets
/// `error_rate * (1 - tightening_ratio)`, so the budgets of the whole chain sum to at most
/// `error_rate`.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::bloom::ScalableBloomFilter;
///
/// let mut filter = ScalableBloomFilter::<str>::new(100, 0.01, 2.0, 0.5).unwrap();
///
/// assert!(!filter.contains("foo").unwrap());
/// filter.add("foo").unwrap();
/// assert!(filter.contains("foo").unwrap());
///
/// filter.clear();
/// assert!(!filter.contains("foo").unwrap());
///
/// assert_eq!(filter.len(), 1104);
/// assert_eq!(filter.filter_count(), 1);
/// ```
#[derive(Debug)]
pub struct ScalableBloomFilter<T: ?Sized, S = ByteSerializer, H = Murmur3Hasher> {
    sealed: Vec<RawBloomFilter>,
    active: RawBloomFilter,
    error_rate: f64,
    growth_rate: f64,
    tightening_ratio: f64,
    hasher: H,
    serializer: S,
    _marker: PhantomData<T>,
}

impl<T> ScalableBloomFilter<T>
where
    T: ?Sized,
    ByteSerializer: Serializer<T>,
{
    /// Constructs a new, empty `ScalableBloomFilter` whose first filter holds
    /// `initial_capacity` items, with an overall maximum false positive probability of
    /// `error_rate`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `initial_capacity` is zero, `error_rate` or
    /// `tightening_ratio` is not in `(0, 1)`, or `growth_rate` is not greater than 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::bloom::ScalableBloomFilter;
    ///
    /// let filter = ScalableBloomFilter::<str>::new(100, 0.01, 2.0, 0.5).unwrap();
    /// assert!(ScalableBloomFilter::<str>::new(100, 0.01, 1.0, 0.5).is_err());
    /// ```
    pub fn new(
        initial_capacity: usize,
        error_rate: f64,
        growth_rate: f64,
        tightening_ratio: f64,
    ) -> Result<Self> {
        Self::with_parts(
            initial_capacity,
            error_rate,
            growth_rate,
            tightening_ratio,
            Murmur3Hasher,
            ByteSerializer,
        )
    }
}

impl<T, S, H> ScalableBloomFilter<T, S, H>
where
    T: ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    /// Constructs a new, empty `ScalableBloomFilter` with a hasher and a serializer. See
    /// [`ScalableBloomFilter::new`] for the parameters.
    pub fn with_parts(
        initial_capacity: usize,
        error_rate: f64,
        growth_rate: f64,
        tightening_ratio: f64,
        hasher: H,
        serializer: S,
    ) -> Result<Self> {
        check_positive("initial_capacity", initial_capacity)?;
        check_open_unit("error_rate", error_rate)?;
        check_open_unit("tightening_ratio", tightening_ratio)?;
        if !(growth_rate > 1.0 && growth_rate.is_finite()) {
            return Err(Error::invalid_argument(format!(
                "`growth_rate` must be greater than 1, got {}",
                growth_rate
            )));
        }

        Ok(ScalableBloomFilter {
            sealed: Vec::new(),
            active: RawBloomFilter::new(initial_capacity, error_rate * (1.0 - tightening_ratio))?,
            error_rate,
            growth_rate,
            tightening_ratio,
            hasher,
            serializer,
            _marker: PhantomData,
        })
    }

    fn filters(&self) -> impl Iterator<Item = &RawBloomFilter> {
        self.sealed.iter().chain(iter::once(&self.active))
    }

    fn hash_pair(&self, item: &T) -> Result<HashPair> {
        let bytes = self.serializer.serialize(item)?;
        Ok(HashPair::new(&self.hasher, &bytes))
    }

    fn try_grow(&mut self) -> Result<()> {
        if !self.active.is_saturated() {
            return Ok(());
        }

        let error_rate = self.active.error_rate() * self.tightening_ratio;
        let capacity = (self.active.capacity() as f64 * self.growth_rate) as usize;
        let filter = RawBloomFilter::new(capacity, error_rate)?;
        debug!(
            filter_count = self.sealed.len() + 2,
            error_rate,
            capacity,
            "appending filter to scalable bloom filter"
        );
        let sealed = mem::replace(&mut self.active, filter);
        self.sealed.push(sealed);
        Ok(())
    }

    /// Inserts an element into the scalable bloom filter.
    ///
    /// Items that are already reported as present are not inserted again. Otherwise a new
    /// filter is appended first if the newest one is saturated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the item cannot be serialized, or
    /// [`Error::InvalidArgument`] if the chain has tightened its error budget down to zero.
    /// Either way the filter is left untouched.
    pub fn add(&mut self, item: &T) -> Result<()> {
        let hashes = self.hash_pair(item)?;
        if self.filters().any(|filter| filter.contains(hashes)) {
            return Ok(());
        }
        self.try_grow()?;
        self.active.insert(hashes);
        Ok(())
    }

    /// Checks if an element is possibly in the scalable bloom filter.
    pub fn contains(&self, item: &T) -> Result<bool> {
        let hashes = self.hash_pair(item)?;
        Ok(self.filters().any(|filter| filter.contains(hashes)))
    }

    /// Returns the number of bits across all filters.
    pub fn len(&self) -> usize {
        self.filters().map(|filter| filter.len()).sum()
    }

    /// Returns `true` if the scalable bloom filter has no bits. Never true for a constructed
    /// filter.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of filters in the chain.
    pub fn filter_count(&self) -> usize {
        self.sealed.len() + 1
    }

    /// Returns the overall false positive probability the chain was configured with.
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Returns the number of items the chain can hold before it grows again.
    pub fn capacity(&self) -> usize {
        self.filters().map(|filter| filter.capacity()).sum()
    }

    /// Returns the number of set bits across all filters.
    pub fn count_ones(&self) -> usize {
        self.filters().map(|filter| filter.count_ones()).sum()
    }

    /// Returns the number of unset bits across all filters.
    pub fn count_zeros(&self) -> usize {
        self.filters().map(|filter| filter.count_zeros()).sum()
    }

    /// Returns the estimated false positive probability of the scalable bloom filter. This
    /// value will increase as more items are added.
    pub fn estimated_fpp(&self) -> f64 {
        1.0 - self
            .filters()
            .map(|filter| 1.0 - filter.estimated_fpp())
            .product::<f64>()
    }

    /// Clears the scalable bloom filter, removing all elements and every filter but the first.
    pub fn clear(&mut self) {
        self.sealed.truncate(1);
        if let Some(first) = self.sealed.pop() {
            self.active = first;
        }
        self.active.clear();
    }
}
