use crate::count_min_sketch::CountMinSketch;
use crate::error::{check_positive, Result};
use crate::hash::{Hasher, Murmur3Hasher};
use crate::serializer::{ByteSerializer, Serializer};
use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

#[derive(Debug)]
struct Element<O> {
    item: O,
    count: i64,
    handle: u64,
}

/// A top-k tracker layered on a [`CountMinSketch`].
///
/// Every insertion updates the sketch and re-estimates the item. The `k` items with the highest
/// estimates seen so far are kept in a map from serialized item to element, and in an ordered
/// index keyed by `(count, handle)` whose first entry is the minimum. `handle` is a sequence
/// number assigned when an item enters the top-k, so updating a count is a removal and a
/// reinsertion in the index.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::top_k::CountAllTopK;
///
/// let mut top_k = CountAllTopK::<str>::new(0.001, 0.001, 2).unwrap();
///
/// top_k.add("foo", 5).unwrap();
/// top_k.add("bar", 3).unwrap();
/// top_k.add("baz", 4).unwrap();
///
/// assert_eq!(
///     top_k.get_top_k(),
///     vec![("foo".to_string(), 5), ("baz".to_string(), 4)],
/// );
/// ```
#[derive(Debug)]
pub struct CountAllTopK<T, S = ByteSerializer, H = Murmur3Hasher>
where
    T: ToOwned + ?Sized,
{
    sketch: CountMinSketch<T, S, H>,
    k: usize,
    elements: HashMap<Vec<u8>, Element<T::Owned>>,
    ranking: BTreeMap<(i64, u64), Vec<u8>>,
    next_handle: u64,
}

impl<T> CountAllTopK<T>
where
    T: ToOwned + ?Sized,
    ByteSerializer: Serializer<T>,
{
    /// Constructs a new, empty `CountAllTopK` tracking `k` items over a count-min sketch sized
    /// from `epsilon` and `delta`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `epsilon` or `delta` is not in `(0, 1)`, or `k` is
    /// zero.
    ///
    /// [`Error::InvalidArgument`]: crate::error::Error::InvalidArgument
    pub fn new(epsilon: f64, delta: f64, k: usize) -> Result<Self> {
        Self::with_parts(epsilon, delta, k, Murmur3Hasher, ByteSerializer)
    }
}

impl<T, S, H> CountAllTopK<T, S, H>
where
    T: ToOwned + ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    /// Constructs a new, empty `CountAllTopK` with a hasher and a serializer.
    pub fn with_parts(
        epsilon: f64,
        delta: f64,
        k: usize,
        hasher: H,
        serializer: S,
    ) -> Result<Self> {
        let sketch = CountMinSketch::with_parts(epsilon, delta, hasher, serializer)?;
        check_positive("k", k)?;
        Ok(CountAllTopK {
            sketch,
            k,
            elements: HashMap::with_capacity(k),
            ranking: BTreeMap::new(),
            next_handle: 0,
        })
    }

    fn track(&mut self, key: Vec<u8>, item: &T, count: i64) {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.ranking.insert((count, handle), key.clone());
        self.elements.insert(
            key,
            Element {
                item: item.to_owned(),
                count,
                handle,
            },
        );
    }

    /// Adds `value` occurrences of an item and refreshes the top-k.
    ///
    /// A tracked item gets its new estimate. An untracked item is tracked if there is room, or
    /// if its estimate is strictly greater than the smallest tracked count, which is evicted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `value` is negative or would overflow the sketch's
    /// total count, or [`Error::Serialization`] if the item cannot be serialized. Either way
    /// nothing is modified.
    ///
    /// [`Error::InvalidArgument`]: crate::error::Error::InvalidArgument
    /// [`Error::Serialization`]: crate::error::Error::Serialization
    pub fn add(&mut self, item: &T, value: i64) -> Result<()> {
        let key = self.sketch.serialize(item)?.into_owned();
        self.sketch.add_bytes(&key, value)?;
        let estimate = self.sketch.estimate_bytes(&key);

        if let Some(element) = self.elements.get_mut(&key) {
            let key = self
                .ranking
                .remove(&(element.count, element.handle))
                .unwrap_or(key);
            element.count = estimate;
            self.ranking.insert((estimate, element.handle), key);
        } else if self.elements.len() < self.k {
            self.track(key, item, estimate);
        } else {
            let min = self.ranking.keys().next().copied();
            if let Some((min_count, handle)) = min {
                if estimate > min_count {
                    if let Some(evicted) = self.ranking.remove(&(min_count, handle)) {
                        trace!(count = min_count, "evicting top-k element");
                        self.elements.remove(&evicted);
                    }
                    self.track(key, item, estimate);
                }
            }
        }
        Ok(())
    }

    /// Returns the tracked items and their estimated counts, highest count first.
    pub fn get_top_k(&self) -> Vec<(T::Owned, i64)> {
        self.ranking
            .values()
            .rev()
            .filter_map(|key| self.elements.get(key))
            .map(|element| {
                let item: &T = element.item.borrow();
                (item.to_owned(), element.count)
            })
            .collect()
    }

    /// Returns the estimated number of occurrences of an item, tracked or not.
    pub fn estimate_count(&self, item: &T) -> Result<i64> {
        self.sketch.estimate_count(item)
    }

    /// Returns the additive error bound of the underlying sketch.
    pub fn error_bound(&self) -> i64 {
        self.sketch.error_bound()
    }

    /// Returns the maximum number of tracked items.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Returns the number of tracked items.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if no item is tracked.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Returns a reference to the underlying count-min sketch.
    pub fn sketch(&self) -> &CountMinSketch<T, S, H> {
        &self.sketch
    }
}

#[cfg(test)]
mod tests {
    use super::CountAllTopK;
    use crate::error::Error;
    use crate::hash::Murmur3Hasher;
    use crate::util::tests::{RejectingSerializer, REJECTED};

    fn assert_in_sync(top_k: &CountAllTopK<str>) {
        assert_eq!(top_k.elements.len(), top_k.ranking.len());
        for ((count, handle), key) in &top_k.ranking {
            let element = &top_k.elements[key];
            assert_eq!(element.count, *count);
            assert_eq!(element.handle, *handle);
        }
    }

    #[test]
    fn test_new() {
        let top_k = CountAllTopK::<str>::new(0.01, 0.01, 3).unwrap();
        assert_eq!(top_k.k(), 3);
        assert!(top_k.is_empty());
        assert!(top_k.get_top_k().is_empty());

        assert!(matches!(
            CountAllTopK::<str>::new(0.01, 0.01, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            CountAllTopK::<str>::new(0.0, 0.01, 3),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_update_tracked() {
        let mut top_k = CountAllTopK::<str>::new(0.001, 0.001, 2).unwrap();
        top_k.add("foo", 1).unwrap();
        top_k.add("bar", 2).unwrap();
        top_k.add("foo", 5).unwrap();

        assert_eq!(
            top_k.get_top_k(),
            vec![("foo".to_string(), 6), ("bar".to_string(), 2)],
        );
        assert_in_sync(&top_k);
    }

    #[test]
    fn test_eviction() {
        let mut top_k = CountAllTopK::<str>::new(0.001, 0.001, 2).unwrap();
        top_k.add("foo", 3).unwrap();
        top_k.add("bar", 2).unwrap();

        top_k.add("baz", 2).unwrap();
        assert_eq!(top_k.len(), 2);
        assert_eq!(
            top_k.get_top_k(),
            vec![("foo".to_string(), 3), ("bar".to_string(), 2)],
        );

        top_k.add("qux", 4).unwrap();
        assert_eq!(
            top_k.get_top_k(),
            vec![("qux".to_string(), 4), ("foo".to_string(), 3)],
        );
        assert_eq!(top_k.estimate_count("bar").unwrap(), 2);
        assert_in_sync(&top_k);
    }

    #[test]
    fn test_negative_value() {
        let mut top_k = CountAllTopK::<str>::new(0.01, 0.01, 2).unwrap();
        top_k.add("foo", 1).unwrap();
        assert!(matches!(top_k.add("foo", -1), Err(Error::InvalidArgument(_))));
        assert!(matches!(top_k.add("bar", -1), Err(Error::InvalidArgument(_))));
        assert_eq!(top_k.get_top_k(), vec![("foo".to_string(), 1)]);
        assert_eq!(top_k.sketch().total_count(), 1);
    }

    #[test]
    fn test_rejected_item() {
        let mut top_k = CountAllTopK::<u32, _, _>::with_parts(
            0.01,
            0.01,
            1,
            Murmur3Hasher,
            RejectingSerializer,
        )
        .unwrap();
        top_k.add(&1, 2).unwrap();
        let ranking = top_k.ranking.clone();

        assert!(matches!(top_k.add(&REJECTED, 5), Err(Error::Serialization(_))));
        assert_eq!(top_k.ranking, ranking);
        assert_eq!(top_k.next_handle, 1);
        assert_eq!(top_k.sketch().total_count(), 2);
        assert_eq!(top_k.get_top_k(), vec![(1, 2)]);
    }

    #[test]
    fn test_heavy_items() {
        let mut top_k = CountAllTopK::<str>::new(0.001, 0.001, 5).unwrap();
        for round in 0..1000 {
            for j in 0..5 {
                top_k.add(&format!("heavy-{}", j), j + 1).unwrap();
            }
            top_k.add(&format!("noise-{}", round), 1).unwrap();
        }

        let result = top_k.get_top_k();
        let items: Vec<&str> = result.iter().map(|(item, _)| item.as_str()).collect();
        assert_eq!(items, vec!["heavy-4", "heavy-3", "heavy-2", "heavy-1", "heavy-0"]);
        for (j, (_, count)) in result.iter().rev().enumerate() {
            let true_count = (j as i64 + 1) * 1000;
            assert!(*count >= true_count);
            assert!(*count <= true_count + top_k.error_bound());
        }
        assert_in_sync(&top_k);
    }
}
