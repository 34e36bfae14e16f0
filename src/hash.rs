//! Seeded byte hashers used as the only source of randomness in the crate.

use byteorder::{ByteOrder, LittleEndian};
use siphasher::sip::SipHasher;
use std::hash::Hasher as _;

/// Trait for deterministic, seed-dependent hash functions over byte sequences.
///
/// Implementations must return the same value for the same bytes and seed on every call and in
/// every process, so that error-bound checks are reproducible.
pub trait Hasher {
    /// Hashes `bytes` with `seed` into a 64-bit value.
    fn hash(&self, bytes: &[u8], seed: u64) -> u64;
}

impl<H> Hasher for &H
where
    H: Hasher + ?Sized,
{
    fn hash(&self, bytes: &[u8], seed: u64) -> u64 {
        (**self).hash(bytes, seed)
    }
}

const C1: u64 = 0x87c3_7b91_1142_53d5;
const C2: u64 = 0x4cf5_ad43_2745_937f;

/// MurmurHash3 x64_128, truncated to the low 64 bits.
///
/// Output is bit-for-bit compatible with the reference implementation when the seed fits in 32
/// bits. Wider seeds initialize both accumulators with the full 64-bit value.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::hash::{Hasher, Murmur3Hasher};
///
/// let hasher = Murmur3Hasher;
/// assert_eq!(
///     hasher.hash(b"The quick brown fox jumps over the lazy dog", 0),
///     0xe34b_bc7b_bc07_1b6c,
/// );
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Murmur3Hasher;

impl Murmur3Hasher {
    #[inline]
    fn mix_k1(k1: u64) -> u64 {
        k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2)
    }

    #[inline]
    fn mix_k2(k2: u64) -> u64 {
        k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1)
    }

    #[inline]
    fn fmix(mut k: u64) -> u64 {
        k ^= k >> 33;
        k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
        k ^= k >> 33;
        k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        k ^ (k >> 33)
    }

    /// Returns both halves `(h1, h2)` of the 128-bit hash.
    ///
    /// # Examples
    ///
    /// ```
    /// use probabilistic_sketches::hash::Murmur3Hasher;
    ///
    /// assert_eq!(Murmur3Hasher::hash128(b"", 0), (0, 0));
    /// ```
    pub fn hash128(bytes: &[u8], seed: u64) -> (u64, u64) {
        let mut h1 = seed;
        let mut h2 = seed;

        let mut blocks = bytes.chunks_exact(16);
        for block in &mut blocks {
            h1 ^= Self::mix_k1(LittleEndian::read_u64(&block[..8]));
            h1 = h1
                .rotate_left(27)
                .wrapping_add(h2)
                .wrapping_mul(5)
                .wrapping_add(0x52dc_e729);

            h2 ^= Self::mix_k2(LittleEndian::read_u64(&block[8..]));
            h2 = h2
                .rotate_left(31)
                .wrapping_add(h1)
                .wrapping_mul(5)
                .wrapping_add(0x3849_5ab5);
        }

        let tail = blocks.remainder();
        if tail.len() > 8 {
            let k2 = tail[8..]
                .iter()
                .enumerate()
                .fold(0u64, |acc, (i, byte)| acc ^ u64::from(*byte) << (i * 8));
            h2 ^= Self::mix_k2(k2);
        }
        if !tail.is_empty() {
            let k1 = tail
                .iter()
                .take(8)
                .enumerate()
                .fold(0u64, |acc, (i, byte)| acc ^ u64::from(*byte) << (i * 8));
            h1 ^= Self::mix_k1(k1);
        }

        let len = bytes.len() as u64;
        h1 ^= len;
        h2 ^= len;

        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);

        h1 = Self::fmix(h1);
        h2 = Self::fmix(h2);

        h1 = h1.wrapping_add(h2);
        h2 = h2.wrapping_add(h1);

        (h1, h2)
    }
}

impl Hasher for Murmur3Hasher {
    #[inline]
    fn hash(&self, bytes: &[u8], seed: u64) -> u64 {
        Self::hash128(bytes, seed).0
    }
}

/// SipHash-2-4 keyed with the seed.
///
/// Slower than [`Murmur3Hasher`], but a keyed PRF: useful when inputs may be chosen by an
/// adversary and the seeds are kept private.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SipByteHasher;

impl Hasher for SipByteHasher {
    fn hash(&self, bytes: &[u8], seed: u64) -> u64 {
        let mut sip = SipHasher::new_with_keys(seed, !seed);
        sip.write(bytes);
        sip.finish()
    }
}
