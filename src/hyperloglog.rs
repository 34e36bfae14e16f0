//! Space-efficient probabilistic data structure for estimating the number of distinct items in a
//! multiset.

use crate::error::{Error, Result};
use crate::hash::{Hasher, Murmur3Hasher};
use crate::serializer::{ByteSerializer, Serializer};
use crate::util::PRIMARY_HASH_SEED;
use std::cmp;
use std::marker::PhantomData;
use tracing::debug;

const MIN_PRECISION: u8 = 4;
const MAX_PRECISION: u8 = 16;

fn alpha_mm(register_count: usize) -> f64 {
    let m = register_count as f64;
    let alpha = match register_count {
        16 => 0.673,
        32 => 0.697,
        64 => 0.709,
        _ => 0.7213 / (1.0 + 1.079 / m),
    };
    alpha * m * m
}

/// A space-efficient probabilistic data structure to count the number of distinct items in a
/// multiset.
///
/// A `HyperLogLog` hashes every item to 64 bits. The top `precision` bits select one of
/// `m = 2^precision` registers and the register keeps the largest rank seen, where the rank is one
/// more than the number of leading zeros in the remaining bits. The estimate is a bias-corrected
/// harmonic mean of `2^register`, with linear counting for small cardinalities. The relative
/// standard error is about `1.04 / sqrt(m)`.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::hyperloglog::HyperLogLog;
///
/// let mut hll = HyperLogLog::<str>::new(10).unwrap();
///
/// assert!(hll.is_empty());
///
/// for key in &["foo", "bar", "baz", "foo", "bar"] {
///     hll.add(key).unwrap();
/// }
///
/// assert_eq!(hll.estimate(), 3);
/// ```
#[derive(Debug)]
pub struct HyperLogLog<T: ?Sized, S = ByteSerializer, H = Murmur3Hasher> {
    precision: u8,
    alpha_mm: f64,
    registers: Vec<u8>,
    hasher: H,
    serializer: S,
    _marker: PhantomData<T>,
}

impl<T> HyperLogLog<T>
where
    T: ?Sized,
    ByteSerializer: Serializer<T>,
{
    /// Constructs a new, empty `HyperLogLog` with `2^precision` registers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `precision` is not in `4..=16`.
    pub fn new(precision: u8) -> Result<Self> {
        Self::with_parts(precision, Murmur3Hasher, ByteSerializer)
    }
}

impl<T, S, H> HyperLogLog<T, S, H>
where
    T: ?Sized,
    S: Serializer<T>,
    H: Hasher,
{
    /// Constructs a new, empty `HyperLogLog` with a hasher and a serializer.
    pub fn with_parts(precision: u8, hasher: H, serializer: S) -> Result<Self> {
        if precision < MIN_PRECISION || precision > MAX_PRECISION {
            return Err(Error::invalid_argument(format!(
                "`precision` must be in [{}, {}], got {}",
                MIN_PRECISION, MAX_PRECISION, precision
            )));
        }
        let register_count = 1 << precision;
        Ok(HyperLogLog {
            precision,
            alpha_mm: alpha_mm(register_count),
            registers: vec![0; register_count],
            hasher,
            serializer,
            _marker: PhantomData,
        })
    }

    /// Adds an item. Adding the same item again has no effect.
    pub fn add(&mut self, item: &T) -> Result<()> {
        let bytes = self.serializer.serialize(item)?;
        let hash = self.hasher.hash(&bytes, PRIMARY_HASH_SEED);
        let index = (hash >> (64 - self.precision)) as usize;
        // The shifted-in zeros cap the rank at `64 - precision + 1`.
        let max_rank = 64 - u32::from(self.precision);
        let rank = cmp::min((hash << self.precision).leading_zeros(), max_rank) + 1;
        self.registers[index] = cmp::max(self.registers[index], rank as u8);
        Ok(())
    }

    /// Returns the estimated number of distinct items added.
    pub fn estimate(&self) -> u64 {
        let m = self.registers.len() as f64;
        let sum: f64 = self
            .registers
            .iter()
            .map(|value| 2.0f64.powi(-i32::from(*value)))
            .sum();
        let raw = self.alpha_mm / sum;

        let zeros = self.registers.iter().filter(|value| **value == 0).count();
        let estimate = if raw <= 2.5 * m && zeros > 0 {
            m * (m / zeros as f64).ln()
        } else {
            raw
        };
        estimate.round() as u64
    }

    /// Merges `other` into this sketch by taking the maximum of each register pair. The result is
    /// the sketch of the union of both streams.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Incompatible`] if the sketches have different precisions. This is an
    /// invalid argument to `merge`, reported with the same variant as every other structural
    /// mismatch in the crate. `self` is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hyperloglog::HyperLogLog;
    ///
    /// let mut hll1 = HyperLogLog::<str>::new(10).unwrap();
    /// hll1.add("foo").unwrap();
    /// hll1.add("bar").unwrap();
    ///
    /// let mut hll2 = HyperLogLog::<str>::new(10).unwrap();
    /// hll2.add("foo").unwrap();
    /// hll2.add("baz").unwrap();
    ///
    /// hll1.merge(&hll2).unwrap();
    /// assert_eq!(hll1.estimate(), 3);
    /// ```
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.registers.len() != other.registers.len() {
            return Err(Error::incompatible(format!(
                "register counts differ: {} vs {}",
                self.registers.len(),
                other.registers.len(),
            )));
        }
        for (value, other_value) in self.registers.iter_mut().zip(&other.registers) {
            *value = cmp::max(*value, *other_value);
        }
        debug!(precision = self.precision, "merged hyperloglog sketches");
        Ok(())
    }

    /// Returns the number of index bits.
    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Returns the number of registers, `2^precision`.
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Returns the relative standard error of the estimate, `1.04 / sqrt(register_count)`.
    pub fn standard_error(&self) -> f64 {
        1.04 / (self.registers.len() as f64).sqrt()
    }

    /// Returns `true` if no item has been added.
    pub fn is_empty(&self) -> bool {
        self.registers.iter().all(|value| *value == 0)
    }

    /// Clears the `HyperLogLog`, resetting every register.
    pub fn clear(&mut self) {
        for value in &mut self.registers {
            *value = 0;
        }
    }
}

impl<T, S, H> Clone for HyperLogLog<T, S, H>
where
    T: ?Sized,
    S: Clone,
    H: Clone,
{
    fn clone(&self) -> Self {
        HyperLogLog {
            precision: self.precision,
            alpha_mm: self.alpha_mm,
            registers: self.registers.clone(),
            hasher: self.hasher.clone(),
            serializer: self.serializer.clone(),
            _marker: PhantomData,
        }
    }
}
