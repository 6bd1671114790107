//! The [`Keyed`] trait ties an element to the key it is ordered by.
//!
//! A [`KeyedSet`][crate::KeyedSet] only ever compares keys while searching. Whether two elements
//! with the same key are "the same element" is decided by the element's own `PartialEq`, which
//! may look at more than the key. That's what lets one structure act as a strict set (elements are
//! their own keys) or as a map (a pair keyed by its first field, replaced when the second differs).
//!
//! ```
//! use keyed_set::{AddOutcome, KeyedSet};
//!
//! let map = KeyedSet::new().add((1, "one"));
//!
//! let (map, outcome) = map.insert((1, "uno"));
//! assert_eq!(outcome, AddOutcome::Replaced);
//! assert_eq!(map.get(&1), Some(&(1, "uno")));
//! ```

/// An element that exposes the key a [`KeyedSet`][crate::KeyedSet] orders it by.
pub trait Keyed {
    /// The ordered key.
    type Key: Ord;

    /// Borrows this element's key.
    fn key(&self) -> &Self::Key;
}

/// Pairs are keyed by their first field, which makes a set of pairs behave like a map.
impl<K, V> Keyed for (K, V)
where
    K: Ord,
{
    type Key = K;

    fn key(&self) -> &K {
        &self.0
    }
}

macro_rules! keyed_by_self {
    ($($t:ty),* $(,)?) => {
        $(
            impl Keyed for $t {
                type Key = $t;

                fn key(&self) -> &$t {
                    self
                }
            }
        )*
    };
}

keyed_by_self!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, String,
    &'static str,
);
