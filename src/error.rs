//! Error type shared by every structure in the crate.

use thiserror::Error;

/// Result type alias using the crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by constructors and operations.
///
/// Every variant is a caller contract violation. A call that returns an error leaves the
/// structure exactly as it was before the call.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum Error {
    /// A construction parameter or call argument is out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two structures with different shapes were combined.
    #[error("incompatible structures: {0}")]
    Incompatible(String),

    /// The serializer could not encode an item.
    #[error("failed to serialize item: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    pub(crate) fn incompatible(msg: impl Into<String>) -> Self {
        Error::Incompatible(msg.into())
    }

    /// Creates a serialization error. Intended for custom [`Serializer`] implementations.
    ///
    /// [`Serializer`]: crate::serializer::Serializer
    pub fn serialization(msg: impl Into<String>) -> Self {
        Error::Serialization(msg.into())
    }
}

/// Checks that `value` lies strictly between 0 and 1.
pub(crate) fn check_open_unit(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!(
            "`{}` must be in (0, 1), got {}",
            name, value
        )))
    }
}

/// Checks that `value` is non-zero.
pub(crate) fn check_positive(name: &str, value: usize) -> Result<()> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::invalid_argument(format!("`{}` must be positive", name)))
    }
}
