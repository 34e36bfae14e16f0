//! Space-efficient probabilistic data structure for estimating the number of item occurrences.

use crate::error::{check_open_unit, Error, Result};
use crate::hash::{Hasher, Murmur3Hasher};
use crate::serializer::{ByteSerializer, Serializer};
use crate::util::HashPair;
use std::marker::PhantomData;

/// A space-efficient probabilistic data structure that serves as a frequency table of events in a
/// stream of data.
///
/// `CountMinSketch` keeps a `depth x width` grid of counters with `depth = ceil(ln(1 / delta))`
/// and `width = ceil(e / epsilon)`. Every insertion bumps one counter per row, in column
/// `(h1 + row * h2) mod width`, and the estimate of an item is the smallest of its counters.
/// Collisions only ever inflate counters, so estimates never undercount. With probability at
/// least `1 - delta` an estimate exceeds the true count by no more than `epsilon` times the total
/// inserted weight.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::count_min_sketch::CountMinSketch;
///
/// let mut count_min_sketch = CountMinSketch::<str>::new(0.1, 0.05).unwrap();
///
/// count_min_sketch.add("foo", 3).unwrap();
/// count_min_sketch.add("bar", 5).unwrap();
/// assert!(count_min_sketch.estimate_count("foo").unwrap() >= 3);
/// assert!(count_min_sketch.estimate_count("bar").unwrap() >= 5);
/// assert!(count_min_sketch.add("foo", -1).is_err());
///
/// assert_eq!(count_min_sketch.width(), 28);
/// assert_eq!(count_min_sketch.depth(), 3);
/// assert_eq!(count_min_sketch.error_bound(), 1);
/// ```
#[derive(Debug)]
pub struct CountMinSketch<T: ?Sized, S = ByteSerializer, H = Murmur3Hasher> {
    // A 2D grid represented as a 1D row-major vector.
    depth: usize,
    width: usize,
    epsilon: f64,
    delta: f64,
    total_count: i64,
    grid: Vec<i64>,
    hasher: H,
    serializer: S,
    _marker: PhantomData<T>,
}

impl<T> CountMinSketch<T>
where
    T: ?Sized,
    ByteSerializer: Serializer<T>,
{
    /// Constructs a new, empty `CountMinSketch` with an additive error of `epsilon` times the
    /// total weight, exceeded with probability at most `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `epsilon` or `delta` is not in `(0, 1)`.
    pub fn new(epsilon: f64, delta: f64) -> Result<Self> {
        Self::with_parts(epsilon, delta, Murmur3Hasher, ByteSerializer)
    }
}

impl<T, S, H> CountMinSketch<T, S, H>
where
    T: ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    /// Constructs a new, empty `CountMinSketch` with a hasher and a serializer.
    pub fn with_parts(epsilon: f64, delta: f64, hasher: H, serializer: S) -> Result<Self> {
        check_open_unit("epsilon", epsilon)?;
        check_open_unit("delta", delta)?;

        let depth = (1.0 / delta).ln().ceil() as usize;
        let width = (std::f64::consts::E / epsilon).ceil() as usize;
        Ok(CountMinSketch {
            depth,
            width,
            epsilon,
            delta,
            total_count: 0,
            grid: vec![0; depth * width],
            hasher,
            serializer,
            _marker: PhantomData,
        })
    }

    fn cells(&self, hashes: HashPair) -> impl Iterator<Item = usize> {
        let width = self.width;
        hashes
            .iter()
            .take(self.depth)
            .enumerate()
            .map(move |(row, hash)| row * width + (hash % width as u64) as usize)
    }

    pub(crate) fn serialize<'a>(&self, item: &'a T) -> Result<std::borrow::Cow<'a, [u8]>> {
        self.serializer.serialize(item)
    }

    pub(crate) fn add_bytes(&mut self, bytes: &[u8], value: i64) -> Result<()> {
        if value < 0 {
            return Err(Error::invalid_argument(format!(
                "negative values are not supported, got {}",
                value
            )));
        }
        let overflow = || {
            Error::invalid_argument(format!("adding {} would overflow a counter", value))
        };
        let total_count = self.total_count.checked_add(value).ok_or_else(overflow)?;
        let hashes = HashPair::new(&self.hasher, bytes);
        // Total count bounds every cell, so the cells cannot overflow once the total does not.
        for cell in self.cells(hashes) {
            self.grid[cell] += value;
        }
        self.total_count = total_count;
        Ok(())
    }

    pub(crate) fn estimate_bytes(&self, bytes: &[u8]) -> i64 {
        let hashes = HashPair::new(&self.hasher, bytes);
        self.cells(hashes)
            .map(|cell| self.grid[cell])
            .min()
            .unwrap_or(0)
    }

    /// Adds `value` occurrences of an item.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `value` is negative or would overflow the total
    /// count, or [`Error::Serialization`] if the item cannot be serialized. Either way the sketch
    /// is left untouched.
    pub fn add(&mut self, item: &T, value: i64) -> Result<()> {
        let bytes = self.serializer.serialize(item)?;
        self.add_bytes(&bytes, value)
    }

    /// Returns the estimated number of occurrences of an item. Never less than the true count.
    pub fn estimate_count(&self, item: &T) -> Result<i64> {
        let bytes = self.serializer.serialize(item)?;
        Ok(self.estimate_bytes(&bytes))
    }

    /// Returns `round(epsilon * total_count)`, the additive error that estimates stay within
    /// with probability at least `1 - delta`.
    pub fn error_bound(&self) -> i64 {
        (self.epsilon * self.total_count as f64).round() as i64
    }

    /// Adds every counter of `other` into this sketch, as if this sketch had also seen every
    /// insertion into `other`.
    ///
    /// Both sketches must use the same hasher and serializer for the result to be meaningful.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Incompatible`] if the sketches have different dimensions, or
    /// [`Error::InvalidArgument`] if the combined total count would overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::count_min_sketch::CountMinSketch;
    ///
    /// let mut cms1 = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
    /// let mut cms2 = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
    /// cms1.add("foo", 3).unwrap();
    /// cms2.add("foo", 4).unwrap();
    ///
    /// cms1.merge(&cms2).unwrap();
    /// assert_eq!(cms1.total_count(), 7);
    /// assert!(cms1.estimate_count("foo").unwrap() >= 7);
    /// ```
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.depth != other.depth || self.width != other.width {
            return Err(Error::incompatible(format!(
                "count-min sketch dimensions differ: {}x{} vs {}x{}",
                self.depth, self.width, other.depth, other.width,
            )));
        }
        let total_count = self
            .total_count
            .checked_add(other.total_count)
            .ok_or_else(|| Error::invalid_argument("merged total count would overflow"))?;
        for (value, other_value) in self.grid.iter_mut().zip(&other.grid) {
            *value += *other_value;
        }
        self.total_count = total_count;
        Ok(())
    }

    /// Clears the count-min sketch.
    pub fn clear(&mut self) {
        for value in &mut self.grid {
            *value = 0
        }
        self.total_count = 0;
    }

    /// Returns the number of rows.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the number of columns in each row.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the relative error factor the sketch was sized for.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Returns the failure probability the sketch was sized for.
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Returns the total weight inserted so far.
    pub fn total_count(&self) -> i64 {
        self.total_count
    }
}

#[cfg(test)]
mod tests {
    use super::CountMinSketch;
    use crate::error::Error;
    use crate::hash::Murmur3Hasher;
    use crate::util::tests::{RejectingSerializer, REJECTED};
    use std::collections::HashMap;

    #[test]
    fn test_new() {
        let cms = CountMinSketch::<str>::new(0.1, 0.05).unwrap();

        assert_eq!(cms.width(), 28);
        assert_eq!(cms.depth(), 3);
        assert_eq!(cms.total_count(), 0);
        assert_eq!(cms.error_bound(), 0);

        let cms = CountMinSketch::<str>::new(0.001, 0.001).unwrap();
        assert_eq!(cms.width(), 2719);
        assert_eq!(cms.depth(), 7);
    }

    #[test]
    fn test_invalid_parameters() {
        for &(epsilon, delta) in &[(0.0, 0.1), (1.0, 0.1), (0.1, 0.0), (0.1, 1.0), (-0.1, 0.5)] {
            assert!(matches!(
                CountMinSketch::<str>::new(epsilon, delta),
                Err(Error::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn test_add() {
        let mut cms = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
        cms.add("foo", 3).unwrap();
        cms.add("foo", 2).unwrap();
        cms.add("bar", 0).unwrap();
        assert_eq!(cms.estimate_count("foo").unwrap(), 5);
        assert_eq!(cms.estimate_count("bar").unwrap(), 0);
        assert_eq!(cms.total_count(), 5);
    }

    #[test]
    fn test_negative_value() {
        let mut cms = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
        cms.add("foo", 3).unwrap();
        let grid = cms.grid.clone();

        assert!(matches!(cms.add("foo", -1), Err(Error::InvalidArgument(_))));
        assert_eq!(cms.grid, grid);
        assert_eq!(cms.total_count(), 3);
        assert_eq!(cms.estimate_count("foo").unwrap(), 3);
    }

    #[test]
    fn test_overflow() {
        let mut cms = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
        cms.add("foo", i64::MAX).unwrap();
        let grid = cms.grid.clone();

        assert!(matches!(cms.add("foo", 1), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            cms.add("bar", i64::MAX),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(cms.grid, grid);
        assert_eq!(cms.total_count(), i64::MAX);
        assert_eq!(cms.estimate_count("foo").unwrap(), i64::MAX);

        let mut other = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
        other.add("bar", 1).unwrap();
        let other_grid = other.grid.clone();
        assert!(matches!(other.merge(&cms), Err(Error::InvalidArgument(_))));
        assert_eq!(other.grid, other_grid);
        assert_eq!(other.total_count(), 1);
    }

    #[test]
    fn test_rejected_item() {
        let mut cms =
            CountMinSketch::<u32, _, _>::with_parts(0.01, 0.01, Murmur3Hasher, RejectingSerializer)
                .unwrap();
        cms.add(&1, 3).unwrap();
        let grid = cms.grid.clone();

        assert!(matches!(cms.add(&REJECTED, 1), Err(Error::Serialization(_))));
        assert!(matches!(
            cms.estimate_count(&REJECTED),
            Err(Error::Serialization(_))
        ));
        assert_eq!(cms.grid, grid);
        assert_eq!(cms.total_count(), 3);
    }

    #[test]
    fn test_clear() {
        let mut cms = CountMinSketch::<str>::new(0.1, 0.05).unwrap();
        cms.add("foo", 3).unwrap();
        cms.clear();
        assert_eq!(cms.estimate_count("foo").unwrap(), 0);
        assert_eq!(cms.total_count(), 0);
    }

    #[test]
    fn test_merge() {
        let mut cms1 = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
        let mut cms2 = CountMinSketch::<str>::new(0.01, 0.01).unwrap();
        cms1.add("foo", 3).unwrap();
        cms2.add("foo", 4).unwrap();
        cms2.add("bar", 1).unwrap();

        cms1.merge(&cms2).unwrap();
        assert_eq!(cms1.estimate_count("foo").unwrap(), 7);
        assert!(cms1.estimate_count("bar").unwrap() >= 1);
        assert_eq!(cms1.total_count(), 8);

        let cms3 = CountMinSketch::<str>::new(0.1, 0.01).unwrap();
        assert!(matches!(cms1.merge(&cms3), Err(Error::Incompatible(_))));
        assert_eq!(cms1.total_count(), 8);
    }

    #[test]
    fn test_error_bound() {
        let configs = [
            (0.01, 0.01, 100, 5000),
            (0.005, 0.01, 500, 20_000),
            (0.01, 0.05, 200, 2000),
        ];
        for &(epsilon, delta, frequent_count, rare_count) in &configs {
            let mut cms = CountMinSketch::<str>::new(epsilon, delta).unwrap();
            let mut true_counts = HashMap::new();

            for i in 0..frequent_count {
                let item = format!("frequent-{}", i);
                let value = 1000 + (i * 7919) % 500;
                cms.add(&item, value).unwrap();
                true_counts.insert(item, value);
            }
            for i in 0..rare_count {
                let item = format!("rare-{}", i);
                let value = 1 + i % 5;
                cms.add(&item, value).unwrap();
                true_counts.insert(item, value);
            }

            let error_bound = cms.error_bound();
            let mut violations = 0;
            for (item, true_count) in &true_counts {
                let estimate = cms.estimate_count(item).unwrap();
                assert!(estimate >= *true_count);
                if estimate > true_count + error_bound {
                    violations += 1;
                }
            }
            let violation_rate = f64::from(violations) / true_counts.len() as f64;
            assert!(
                violation_rate <= delta,
                "violation rate {} exceeds {}",
                violation_rate,
                delta,
            );
        }
    }
}
