/// Shared pointer used for every node and element in a set.
///
/// With the `arc` feature this is `std::sync::Arc` so snapshots can be handed
/// to other threads. Otherwise it's the cheaper `std::rc::Rc`.
#[cfg(feature = "arc")]
pub(crate) type Ref<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type Ref<T> = std::rc::Rc<T>;

/// What an insert did to the set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AddOutcome {
    /// The key wasn't present. The new set is one element larger.
    Added,
    /// The key was present with an element that isn't equal to the new one. The new set has the
    /// same size but holds the new element.
    Replaced,
    /// The key was present with an equal element. The original set is returned.
    Unchanged,
}

impl AddOutcome {
    /// Whether the returned set differs from the original.
    pub fn changed(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// What to do when an inserted element's key is already in the tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum OnMatch {
    /// Swap in the new element unless it's equal to the existing one.
    Replace,
    /// Leave the existing element alone.
    Keep,
}
