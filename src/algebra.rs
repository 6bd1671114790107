//! Bulk operations: union, intersection and difference, plus the linear-time rebuild of a
//! balanced tree from sorted elements that backs them.
//!
//! Union and intersection pick one of two algorithms based on the heights of their operands.
//! When one tree is much taller than the other, the elements of the shorter tree are folded into
//! the taller one, one `O(log n)` insert or lookup at a time. When the heights are comparable,
//! both trees are walked in order, the two sorted sequences are merged, and a balanced tree is
//! rebuilt directly from the merged sequence in `O(n)`. The choice only affects cost, never the
//! result.
//!
//! ```
//! use keyed_set::{AlgebraConfig, KeyedSet, Strategy};
//!
//! let evens: KeyedSet<i32> = (0..10).step_by(2).collect();
//! let small: KeyedSet<i32> = (0..5).collect();
//!
//! let union = evens.union(&small);
//! assert_eq!(union.iter().copied().collect::<Vec<_>>(), [0, 1, 2, 3, 4, 6, 8]);
//!
//! let pinned = AlgebraConfig::default().with_strategy(Strategy::Elementwise);
//! assert_eq!(evens.union_with(&small, &pinned), union);
//! ```

use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::iter::Direction;
use crate::keyed::Keyed;
use crate::set::{Child, KeyedSet, Node};
use crate::util::{OnMatch, Ref};

/// Which algorithm union and intersection use.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Fold elementwise when one tree is more than
    /// [`height_ratio`][AlgebraConfig::height_ratio] times taller than the other, otherwise
    /// merge and rebuild.
    #[default]
    Auto,
    /// Always fold the shorter tree into the taller one.
    Elementwise,
    /// Always merge both trees in order and rebuild.
    Rebuild,
}

/// Tuning for [`union_with`][KeyedSet::union_with] and
/// [`intersection_with`][KeyedSet::intersection_with].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct AlgebraConfig {
    /// Which algorithm to use.
    pub strategy: Strategy,
    /// How many times taller one tree must be before [`Strategy::Auto`] folds elementwise.
    pub height_ratio: usize,
}

impl Default for AlgebraConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Auto,
            height_ratio: 2,
        }
    }
}

impl AlgebraConfig {
    /// Returns this config with a different strategy.
    pub fn with_strategy(self, strategy: Strategy) -> Self {
        Self { strategy, ..self }
    }

    /// Returns this config with a different height ratio.
    pub fn with_height_ratio(self, height_ratio: usize) -> Self {
        Self {
            height_ratio,
            ..self
        }
    }

    fn plan(&self, left_height: usize, right_height: usize) -> Plan {
        match self.strategy {
            Strategy::Rebuild => Plan::Rebuild,
            Strategy::Elementwise if right_height > left_height => Plan::FoldIntoRight,
            Strategy::Elementwise => Plan::FoldIntoLeft,
            Strategy::Auto if left_height > right_height.saturating_mul(self.height_ratio) => {
                Plan::FoldIntoLeft
            }
            Strategy::Auto if right_height > left_height.saturating_mul(self.height_ratio) => {
                Plan::FoldIntoRight
            }
            Strategy::Auto => Plan::Rebuild,
        }
    }
}

/// The algorithm picked for one call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Plan {
    /// The left operand is the base. Walk the right one.
    FoldIntoLeft,
    /// The right operand is the base. Walk the left one.
    FoldIntoRight,
    Rebuild,
}

impl<T> KeyedSet<T>
where
    T: Keyed + PartialEq,
{
    /// Returns a set with every element of `self` and `other`. Where both hold the same key,
    /// `self`'s element is kept.
    pub fn union(&self, other: &Self) -> Self {
        self.union_with(other, &AlgebraConfig::default())
    }

    /// [`union`][Self::union] with an explicit [`AlgebraConfig`].
    pub fn union_with(&self, other: &Self, config: &AlgebraConfig) -> Self {
        let plan = self.plan(other, config, "union");
        match plan {
            Plan::FoldIntoLeft => other.shared_elements().fold(self.clone(), |set, element| {
                set.insert_shared(element, OnMatch::Keep).0
            }),
            Plan::FoldIntoRight => self.shared_elements().fold(other.clone(), |set, element| {
                set.insert_shared(element, OnMatch::Replace).0
            }),
            Plan::Rebuild => Self::treeify(&merge_union(
                self.shared_elements(),
                other.shared_elements(),
            )),
        }
    }

    /// Returns a set with the elements of `self` whose keys are also in `other`.
    pub fn intersection(&self, other: &Self) -> Self {
        self.intersection_with(other, &AlgebraConfig::default())
    }

    /// [`intersection`][Self::intersection] with an explicit [`AlgebraConfig`].
    pub fn intersection_with(&self, other: &Self, config: &AlgebraConfig) -> Self {
        let plan = self.plan(other, config, "intersection");
        match plan {
            Plan::FoldIntoLeft => other.keys().fold(Self::new(), |set, key| {
                match self.find_node(key) {
                    Some(node) => set.insert_shared(Ref::clone(&node.element), OnMatch::Keep).0,
                    None => set,
                }
            }),
            Plan::FoldIntoRight => self
                .shared_elements()
                .filter(|element| other.contains_key(element.key()))
                .fold(Self::new(), |set, element| {
                    set.insert_shared(element, OnMatch::Keep).0
                }),
            Plan::Rebuild => Self::treeify(&merge_intersection(
                self.shared_elements(),
                other.shared_elements(),
            )),
        }
    }

    /// Returns a set without any element whose key matches one of `elements`.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::KeyedSet;
    ///
    /// let all: KeyedSet<i32> = (0..10).collect();
    /// let evens: KeyedSet<i32> = (0..10).step_by(2).collect();
    ///
    /// let odds = all.difference(&evens);
    /// assert_eq!(odds.iter().copied().collect::<Vec<_>>(), [1, 3, 5, 7, 9]);
    /// ```
    pub fn difference<'a, I>(&self, elements: I) -> Self
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        elements
            .into_iter()
            .fold(self.clone(), |set, element| set.delete(element.key()))
    }

    /// Returns a set with every one of `elements` added, in order.
    ///
    /// An incoming element replaces an unequal one already stored under its key, as with
    /// [`add`][Self::add]. If nothing changed, the original set is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::KeyedSet;
    ///
    /// let set: KeyedSet<(i32, char)> = [(1, 'a'), (2, 'b')].into_iter().collect();
    /// let set = set.add_all([(2, 'z'), (3, 'c')]);
    /// assert_eq!(set.iter().copied().collect::<Vec<_>>(), [(1, 'a'), (2, 'z'), (3, 'c')]);
    /// ```
    pub fn add_all<I>(&self, elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        elements
            .into_iter()
            .fold(self.clone(), |set, element| set.add(element))
    }

    /// Returns a set with only the elements of `self` whose keys match one of `elements`.
    ///
    /// Elements are matched by key only; the stored element is kept even if it isn't equal
    /// to the one passed in.
    pub fn retain_all<'a, I>(&self, elements: I) -> Self
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        elements.into_iter().fold(Self::new(), |set, element| {
            match self.find_node(element.key()) {
                Some(node) => set.insert_shared(Ref::clone(&node.element), OnMatch::Keep).0,
                None => set,
            }
        })
    }

    /// Whether every one of `elements` is in the set. See [`contains`][Self::contains].
    pub fn contains_all<'a, I>(&self, elements: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        elements.into_iter().all(|element| self.contains(element))
    }

    /// Whether at least one of `elements` is in the set. See [`contains`][Self::contains].
    pub fn contains_any<'a, I>(&self, elements: I) -> bool
    where
        T: 'a,
        I: IntoIterator<Item = &'a T>,
    {
        elements.into_iter().any(|element| self.contains(element))
    }

    /// Whether every element of `self` is also in `other`.
    ///
    /// Elements are compared by key and value, so an element of `self` whose key `other`
    /// stores with a different value makes this false.
    pub fn is_subset(&self, other: &Self) -> bool {
        other.contains_all(self)
    }

    /// Whether `self` and `other` have no keys in common.
    ///
    /// Unlike [`is_subset`][Self::is_subset], this compares keys only: two elements sharing a
    /// key count as overlapping even if their values differ.
    pub fn is_disjoint(&self, other: &Self) -> bool {
        !self.keys().any(|key| other.contains_key(key))
    }

    /// Returns a set with every element of `self` mapped through `f`.
    ///
    /// `f` may change keys, so the result is built by inserting each mapped element. When two
    /// mapped elements land on the same key, the one mapped from the larger original key wins.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: FnMut(&T) -> T,
    {
        self.iter().map(f).collect()
    }

    fn plan(&self, other: &Self, config: &AlgebraConfig, operation: &'static str) -> Plan {
        let (left_height, right_height) = (self.height(), other.height());
        let plan = config.plan(left_height, right_height);
        trace!(operation, left_height, right_height, ?plan, "planned set operation");
        plan
    }
}

impl<T> KeyedSet<T>
where
    T: Keyed,
{
    /// Builds a balanced set from elements already in strictly ascending key order, in `O(n)`.
    ///
    /// Fails with [`Error::InvalidRange`] at the first element whose key isn't greater than the
    /// key before it.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::{Error, KeyedSet};
    ///
    /// let set = KeyedSet::from_sorted(0..100).unwrap();
    /// assert_eq!(set.len(), 100);
    /// assert!(set.is_balanced());
    ///
    /// let unsorted = KeyedSet::from_sorted([1, 3, 2]);
    /// assert!(matches!(unsorted, Err(Error::InvalidRange { position: 2 })));
    /// ```
    pub fn from_sorted<I>(elements: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let sorted: Vec<Ref<T>> = elements.into_iter().map(Ref::new).collect();
        if let Some(index) = sorted
            .windows(2)
            .position(|pair| pair[0].key() >= pair[1].key())
        {
            let position = index + 1;
            debug!(position, len = sorted.len(), "rejected unsorted rebuild input");
            return Err(Error::InvalidRange { position });
        }
        Ok(Self::treeify(&sorted))
    }

    /// Clones the elements out in ascending key order.
    pub fn to_sorted_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Returns a set with only the elements for which `predicate` returns `true`.
    ///
    /// If every element passes, the original set is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::KeyedSet;
    ///
    /// let set: KeyedSet<i32> = (0..10).collect();
    /// let small = set.filter(|x| *x < 3);
    /// assert_eq!(small.iter().copied().collect::<Vec<_>>(), [0, 1, 2]);
    ///
    /// assert!(set.filter(|_| true).ptr_eq(&set));
    /// ```
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&T) -> bool,
    {
        let mut dropped_any = false;
        let kept: Vec<Ref<T>> = self
            .nodes(Direction::Ascending)
            .filter(|node| {
                let keep = predicate(node.element());
                dropped_any |= !keep;
                keep
            })
            .map(|node| Ref::clone(&node.element))
            .collect();

        if dropped_any {
            Self::treeify(&kept)
        } else {
            self.clone()
        }
    }

    /// Every element's shared pointer, in ascending key order.
    fn shared_elements(&self) -> impl Iterator<Item = Ref<T>> + '_ {
        self.nodes(Direction::Ascending)
            .map(|node| Ref::clone(&node.element))
    }

    /// Builds a tree of minimum height from elements in ascending key order.
    pub(crate) fn treeify(sorted: &[Ref<T>]) -> Self {
        debug!(len = sorted.len(), "rebuilding balanced tree");
        // Every leaf in the new tree shares this one empty subtree.
        let empty = Child::empty();
        build(sorted, &empty).into_set()
    }
}

/// Recurses on halves, so the depth is the height of the tree being built.
fn build<T>(sorted: &[Ref<T>], empty: &Child<T>) -> Child<T> {
    let leaf = |element: &Ref<T>| Child::from_node(Node::leaf(Ref::clone(element), empty.clone()));
    let node = match sorted {
        [] => return empty.clone(),
        [only] => return leaf(only),
        [low, high] => Node::new(Ref::clone(high), leaf(low), empty.clone()),
        [low, mid, high] => Node::new(Ref::clone(mid), leaf(low), leaf(high)),
        _ => {
            let mid = sorted.len() / 2;
            Node::new(
                Ref::clone(&sorted[mid]),
                build(&sorted[..mid], empty),
                build(&sorted[mid + 1..], empty),
            )
        }
    };
    Child::from_node(node)
}

/// Merges two ascending sequences, keeping `left`'s element where the keys match.
fn merge_union<T, L, R>(left: L, right: R) -> Vec<Ref<T>>
where
    T: Keyed,
    L: Iterator<Item = Ref<T>>,
    R: Iterator<Item = Ref<T>>,
{
    let mut merged = Vec::new();
    let mut left = left.peekable();
    let mut right = right.peekable();
    loop {
        let ordering = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.key().cmp(r.key()),
            _ => break,
        };
        match ordering {
            Ordering::Less => merged.extend(left.next()),
            Ordering::Equal => {
                merged.extend(left.next());
                right.next();
            }
            Ordering::Greater => merged.extend(right.next()),
        }
    }
    // At most one side has anything left, and each side drains from itself.
    merged.extend(left);
    merged.extend(right);
    merged
}

/// Keeps `left`'s elements whose keys also appear in `right`. Both must be ascending.
fn merge_intersection<T, L, R>(left: L, right: R) -> Vec<Ref<T>>
where
    T: Keyed,
    L: Iterator<Item = Ref<T>>,
    R: Iterator<Item = Ref<T>>,
{
    let mut merged = Vec::new();
    let mut left = left.peekable();
    let mut right = right.peekable();
    loop {
        let ordering = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l.key().cmp(r.key()),
            _ => break,
        };
        match ordering {
            Ordering::Less => {
                left.next();
            }
            Ordering::Equal => {
                merged.extend(left.next());
                right.next();
            }
            Ordering::Greater => {
                right.next();
            }
        }
    }
    merged
}
