//! Conversion of items into the byte sequences that get hashed.
//!
//! Structures never look at an item directly. Two items are the same item exactly when their
//! serialized bytes are equal, so a serializer must be deterministic for logically-equal items.

use crate::error::Result;
#[cfg(feature = "serde")]
use crate::error::Error;
#[cfg(feature = "serde")]
use serde_crate::Serialize;
use std::borrow::Cow;

/// Trait for types that turn an item into bytes.
pub trait Serializer<T: ?Sized> {
    /// Serializes `item`. Borrows from the item when no encoding is needed.
    fn serialize<'a>(&self, item: &'a T) -> Result<Cow<'a, [u8]>>;
}

/// Serializer for anything that already is a byte sequence: `str`, `String`, `[u8]`, `Vec<u8>`.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::serializer::{ByteSerializer, Serializer};
///
/// let bytes = ByteSerializer.serialize("foo").unwrap();
/// assert_eq!(&*bytes, b"foo");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ByteSerializer;

impl<T> Serializer<T> for ByteSerializer
where
    T: AsRef<[u8]> + ?Sized,
{
    #[inline]
    fn serialize<'a>(&self, item: &'a T) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(item.as_ref()))
    }
}

/// Any `Fn(&T) -> Vec<u8>` closure is a serializer.
///
/// # Examples
///
/// ```
/// use probabilistic_sketches::serializer::Serializer;
///
/// let serializer = |item: &u32| item.to_le_bytes().to_vec();
/// assert_eq!(&*serializer.serialize(&1u32).unwrap(), &[1, 0, 0, 0]);
/// ```
impl<T, F> Serializer<T> for F
where
    T: ?Sized,
    F: Fn(&T) -> Vec<u8>,
{
    fn serialize<'a>(&self, item: &'a T) -> Result<Cow<'a, [u8]>> {
        Ok(Cow::Owned(self(item)))
    }
}

/// Serializer for any `serde::Serialize` type, encoded with `bincode`.
#[cfg(feature = "serde")]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BincodeSerializer;

#[cfg(feature = "serde")]
impl<T> Serializer<T> for BincodeSerializer
where
    T: Serialize + ?Sized,
{
    fn serialize<'a>(&self, item: &'a T) -> Result<Cow<'a, [u8]>> {
        bincode::serialize(item)
            .map(Cow::Owned)
            .map_err(|err| Error::serialization(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ByteSerializer, Serializer};

    #[test]
    fn test_byte_serializer() {
        assert_eq!(&*ByteSerializer.serialize("foo").unwrap(), b"foo");
        assert_eq!(
            &*ByteSerializer.serialize(&String::from("foo")).unwrap(),
            b"foo"
        );
        assert_eq!(&*ByteSerializer.serialize(&vec![1u8, 2]).unwrap(), &[1, 2]);
        assert!(ByteSerializer.serialize("").unwrap().is_empty());
    }

    #[test]
    fn test_closure_serializer() {
        let serializer = |item: &(u16, char)| {
            let mut bytes = item.0.to_be_bytes().to_vec();
            bytes.extend_from_slice(item.1.to_string().as_bytes());
            bytes
        };
        assert_eq!(&*serializer.serialize(&(1u16, 'a')).unwrap(), &[0, 1, b'a']);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_bincode_serializer() {
        use super::BincodeSerializer;

        let first = BincodeSerializer.serialize(&(1u32, "foo")).unwrap();
        let second = BincodeSerializer.serialize(&(1u32, "foo")).unwrap();
        assert_eq!(first, second);
        assert_ne!(first, BincodeSerializer.serialize(&(2u32, "foo")).unwrap());
    }
}
