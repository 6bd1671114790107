use thiserror::Error;

/// Errors reported by [`KeyedSet`][crate::KeyedSet] operations.
///
/// Looking up or deleting a key that isn't present is not an error, nor is an insert that changes
/// nothing. Those are reported through `Option`, `bool` or [`AddOutcome`][crate::AddOutcome].
#[derive(Debug, Error)]
pub enum Error {
    /// An insert was handed no element. The set is left untouched.
    #[error("cannot insert an absent element")]
    NullElement,

    /// A rebuild was handed elements whose keys are not strictly ascending.
    #[error("elements out of order at position {position}")]
    InvalidRange {
        /// Index of the first element whose key is not greater than its predecessor's.
        position: usize,
    },

    /// A caller supplied key comparison failed.
    #[error("key comparison failed")]
    KeyComparison(#[source] Box<dyn std::error::Error + Send + Sync + 'static>),
}

/// Result type for fallible set operations.
pub type Result<T> = std::result::Result<T, Error>;
