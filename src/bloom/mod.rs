//! Space-efficient probabilistic data structure for approximate membership queries in a set.

mod bloom_filter;
mod scalable_bloom_filter;

pub use self::bloom_filter::BloomFilter;
pub use self::scalable_bloom_filter::ScalableBloomFilter;

use crate::error::Result;
use crate::hash::Hasher;
use crate::serializer::Serializer;

/// Approximate membership over items of type `T`. Never reports a false negative.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::bloom::{BloomFilter, Filter, ScalableBloomFilter};
///
/// fn add_all(filter: &mut dyn Filter<str>, items: &[&str]) {
///     for item in items {
///         filter.add(item).unwrap();
///     }
/// }
///
/// let mut fixed = BloomFilter::<str>::new(100, 0.01).unwrap();
/// let mut scalable = ScalableBloomFilter::<str>::new(100, 0.01, 2.0, 0.5).unwrap();
/// add_all(&mut fixed, &["foo", "bar"]);
/// add_all(&mut scalable, &["foo", "bar"]);
///
/// assert!(fixed.contains("bar").unwrap());
/// assert!(scalable.contains("bar").unwrap());
/// ```
pub trait Filter<T: ?Sized> {
    /// Inserts an item.
    fn add(&mut self, item: &T) -> Result<()>;

    /// Checks if an item is possibly present.
    fn contains(&self, item: &T) -> Result<bool>;
}

impl<T, S, H> Filter<T> for BloomFilter<T, S, H>
where
    T: ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    fn add(&mut self, item: &T) -> Result<()> {
        BloomFilter::add(self, item)
    }

    fn contains(&self, item: &T) -> Result<bool> {
        BloomFilter::contains(self, item)
    }
}

impl<T, S, H> Filter<T> for ScalableBloomFilter<T, S, H>
where
    T: ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    fn add(&mut self, item: &T) -> Result<()> {
        ScalableBloomFilter::add(self, item)
    }

    fn contains(&self, item: &T) -> Result<bool> {
        ScalableBloomFilter::contains(self, item)
    }
}
