use crate::hash::Hasher;

/// Seed of `h1` in the double hashing pair.
pub(crate) const PRIMARY_HASH_SEED: u64 = 0x9747_b28c;
/// Seed of `h2` in the double hashing pair.
pub(crate) const SECONDARY_HASH_SEED: u64 = 0xc6a4_a793_5bd1_e995;
/// Seed of item fingerprints in HeavyKeeper buckets.
pub(crate) const FINGERPRINT_SEED: u64 = 0;

/// Two independently seeded hashes of the same bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HashPair {
    h1: u64,
    h2: u64,
}

impl HashPair {
    pub fn new(hasher: &impl Hasher, bytes: &[u8]) -> Self {
        HashPair {
            h1: hasher.hash(bytes, PRIMARY_HASH_SEED),
            h2: hasher.hash(bytes, SECONDARY_HASH_SEED),
        }
    }

    /// Yields `h1 + i * h2` for `i = 0, 1, 2, ...` in wrapping arithmetic.
    pub fn iter(self) -> HashIter {
        HashIter {
            a: self.h1,
            b: self.h2,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct HashIter {
    a: u64,
    b: u64,
}

impl Iterator for HashIter {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let ret = self.a;
        self.a = self.a.wrapping_add(self.b);
        Some(ret)
    }
}

#[cfg(test)]
pub mod tests {
    use super::HashPair;
    use crate::error::{Error, Result};
    use crate::hash::Murmur3Hasher;
    use crate::serializer::Serializer;
    use std::borrow::Cow;

    /// Serializer for integer test items.
    pub fn u32_bytes(item: &u32) -> Vec<u8> {
        item.to_le_bytes().to_vec()
    }

    /// The one item [`RejectingSerializer`] cannot encode.
    pub const REJECTED: u32 = u32::MAX;

    /// Serializer for integer test items that fails on [`REJECTED`].
    #[derive(Clone, Copy, Debug)]
    pub struct RejectingSerializer;

    impl Serializer<u32> for RejectingSerializer {
        fn serialize<'a>(&self, item: &'a u32) -> Result<Cow<'a, [u8]>> {
            if *item == REJECTED {
                Err(Error::serialization(format!("cannot encode {}", item)))
            } else {
                Ok(Cow::Owned(u32_bytes(item)))
            }
        }
    }

    #[test]
    fn test_hash_iter() {
        let pair = HashPair {
            h1: u64::MAX,
            h2: 3,
        };
        assert_eq!(
            pair.iter().take(3).collect::<Vec<u64>>(),
            vec![u64::MAX, 2, 5],
        );
    }

    #[test]
    fn test_hash_pair() {
        let pair = HashPair::new(&Murmur3Hasher, b"foo");
        assert_eq!(pair, HashPair::new(&Murmur3Hasher, b"foo"));
        assert_ne!(pair.h1, pair.h2);
    }

    #[test]
    fn test_rejecting_serializer() {
        assert_eq!(&*RejectingSerializer.serialize(&1).unwrap(), &[1, 0, 0, 0]);
        assert!(matches!(
            RejectingSerializer.serialize(&REJECTED),
            Err(Error::Serialization(_))
        ));
    }
}
