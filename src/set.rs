//! A persistent keyed set. This is modeled after the sets one would see in
//! a functional language. Any operation that one would expect to modify the
//! set (e.g. `insert` or `delete`) instead returns a new set that references
//! every subtree of the original that the operation didn't touch.
//!
//! # Examples
//!
//! ```
//! use keyed_set::KeyedSet;
//!
//! let set: KeyedSet<(i32, &str)> = KeyedSet::new();
//!
//! // Nothing in here yet.
//! assert_eq!(set.get(&1), None);
//!
//! // This `add` returns a new set!
//! let new_set = set.add((1, "one"));
//!
//! // The new set has the element but the old one doesn't.
//! assert_eq!(new_set.get(&1), Some(&(1, "one")));
//! assert_eq!(set.get(&1), None);
//!
//! // Adding a different element with the same key gives yet another set.
//! let newer_set = new_set.add((1, "uno"));
//!
//! // And delete it for good measure.
//! let newest_set = newer_set.delete(&1);
//!
//! // All history is preserved.
//! assert_eq!(newest_set.get(&1), None);
//! assert_eq!(newer_set.get(&1), Some(&(1, "uno")));
//! assert_eq!(new_set.get(&1), Some(&(1, "one")));
//! assert_eq!(set.get(&1), None);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::keyed::Keyed;
use crate::util::{AddOutcome, OnMatch, Ref};

/// An immutable, ordered set of [`Keyed`] elements, kept balanced as an AVL tree.
///
/// Cloning a set is `O(1)` and shares all of its structure.
pub enum KeyedSet<T> {
    /// The empty set. Every leaf of a tree points at one of these.
    Empty,
    /// A `Node` that has an element and two children (which are both `KeyedSet`s). This enum
    /// trivially wraps the [`Node`] struct.
    Node(Node<T>),
}

impl<T> Default for KeyedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for KeyedSet<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Node(n) => Self::Node(n.clone()),
        }
    }
}

impl<T> KeyedSet<T> {
    /// Generates a new, empty `KeyedSet`.
    pub fn new() -> Self {
        Self::Empty
    }

    /// Whether this set holds no elements. This is `O(1)`.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Counts the elements in this set.
    ///
    /// Nodes don't cache their subtree sizes so this walks the whole tree in `O(n)`. Callers that
    /// need the size often should track it alongside the set, e.g. by counting
    /// [`AddOutcome::Added`] and successful deletes.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Node(n) => 1 + n.left.set().len() + n.right.set().len(),
        }
    }

    /// Gets the height of this set's tree. The empty set has a height of 0.
    pub fn height(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Node(n) => n.height,
        }
    }

    /// The smallest element in the set.
    pub fn first(&self) -> Option<&T> {
        let mut node = self.root()?;
        while let Some(left) = node.left.node() {
            node = left;
        }
        Some(node.element())
    }

    /// The largest element in the set.
    pub fn last(&self) -> Option<&T> {
        let mut node = self.root()?;
        while let Some(right) = node.right.node() {
            node = right;
        }
        Some(node.element())
    }

    /// Returns a new set without its smallest element. The empty set stays empty.
    pub fn delete_first(&self) -> Self {
        match self.root() {
            None => Self::new(),
            Some(root) => root.delete_smallest().1.into_set(),
        }
    }

    /// Returns a new set without its largest element. The empty set stays empty.
    pub fn delete_last(&self) -> Self {
        match self.root() {
            None => Self::new(),
            Some(root) => root.delete_largest().1.into_set(),
        }
    }

    /// Returns the smallest element along with a new set that doesn't have it.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::KeyedSet;
    ///
    /// let set: KeyedSet<i32> = (1..=3).collect();
    /// let (first, rest) = set.pop_first().unwrap();
    ///
    /// assert_eq!(*first, 1);
    /// assert_eq!(rest.first(), Some(&2));
    /// assert_eq!(set.len(), 3);
    /// ```
    pub fn pop_first(&self) -> Option<(&T, Self)> {
        let first = self.first()?;
        Some((first, self.delete_first()))
    }

    /// Returns the largest element along with a new set that doesn't have it.
    pub fn pop_last(&self) -> Option<(&T, Self)> {
        let last = self.last()?;
        Some((last, self.delete_last()))
    }

    /// Whether both sets are the very same snapshot, i.e. one was cloned from the other or was
    /// returned unchanged by an operation. Equal sets built separately are not `ptr_eq`.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Empty, Self::Empty) => true,
            (Self::Node(a), Self::Node(b)) => {
                Ref::ptr_eq(&a.element, &b.element)
                    && Ref::ptr_eq(&a.left.0, &b.left.0)
                    && Ref::ptr_eq(&a.right.0, &b.right.0)
            }
            _ => false,
        }
    }

    /// Checks that every node satisfies the AVL invariant and that each cached height matches
    /// the heights of its children.
    pub fn is_balanced(&self) -> bool {
        self.checked_height().is_some()
    }

    /// Recomputes the height of this tree, or `None` if any node is out of balance or caches the
    /// wrong height.
    fn checked_height(&self) -> Option<usize> {
        match self {
            Self::Empty => Some(0),
            Self::Node(n) => {
                let left = n.left.set().checked_height()?;
                let right = n.right.set().checked_height()?;
                let valid = left.abs_diff(right) <= 1 && n.height == left.max(right) + 1;
                valid.then_some(n.height)
            }
        }
    }

    /// Renders the tree sideways, one element per line: right subtree first, each element
    /// followed by the height of its node and indented by its depth.
    pub fn pretty(&self) -> String
    where
        T: fmt::Debug,
    {
        let mut out = String::new();
        self.write_pretty(&mut out, 0);
        out
    }

    fn write_pretty(&self, out: &mut String, depth: usize)
    where
        T: fmt::Debug,
    {
        if let Self::Node(n) = self {
            n.right.set().write_pretty(out, depth + 1);
            out.push_str(&format!(
                "{:indent$}{:?}-{}\n",
                "",
                n.element,
                n.height,
                indent = depth * 2
            ));
            n.left.set().write_pretty(out, depth + 1);
        }
    }

    pub(crate) fn root(&self) -> Option<&Node<T>> {
        match self {
            Self::Empty => None,
            Self::Node(n) => Some(n),
        }
    }
}

impl<T> KeyedSet<T>
where
    T: Keyed,
{
    /// Potentially finds the element stored under the given key. If no element has the key,
    /// `None` is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::KeyedSet;
    ///
    /// let set = KeyedSet::new().add((1, 2));
    ///
    /// assert_eq!(set.get(&1), Some(&(1, 2)));
    /// assert_eq!(set.get(&42), None);
    /// ```
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.find_node(key).map(Node::element)
    }

    /// Whether some element is stored under the given key.
    pub fn contains_key(&self, key: &T::Key) -> bool {
        self.find_node(key).is_some()
    }

    /// Like [`get`][Self::get] but the search is steered by a comparison that may fail.
    ///
    /// As with [`slice::binary_search_by`], `compare` is handed the key of each element visited
    /// and returns how that key orders relative to the one being searched for. The first error it
    /// returns ends the search and is reported as [`Error::KeyComparison`].
    pub fn try_get_by<F, E>(&self, mut compare: F) -> Result<Option<&T>>
    where
        F: FnMut(&T::Key) -> std::result::Result<Ordering, E>,
        E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
    {
        let mut current = self;
        while let Self::Node(node) = current {
            let ordering =
                compare(node.element.key()).map_err(|e| Error::KeyComparison(e.into()))?;
            current = match ordering {
                Ordering::Less => node.right.set(),
                Ordering::Equal => return Ok(Some(node.element())),
                Ordering::Greater => node.left.set(),
            };
        }
        Ok(None)
    }

    /// Returns a new set without the element stored under `key`, and whether there was one.
    ///
    /// If nothing was stored under `key`, the original set is returned.
    pub fn delete_by_key(&self, key: &T::Key) -> (Self, bool) {
        self.delete_where(key, |_| true)
    }

    /// Returns a new set without the element stored under `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::KeyedSet;
    ///
    /// let set = KeyedSet::new().add(1);
    /// let newer_set = set.delete(&1);
    ///
    /// // All history is preserved.
    /// assert_eq!(newer_set.get(&1), None);
    /// assert_eq!(set.get(&1), Some(&1));
    /// ```
    pub fn delete(&self, key: &T::Key) -> Self {
        self.delete_by_key(key).0
    }

    pub(crate) fn find_node(&self, key: &T::Key) -> Option<&Node<T>> {
        self.root().and_then(|n| n.find(key))
    }

    fn delete_where<F>(&self, key: &T::Key, should_delete: F) -> (Self, bool)
    where
        F: FnOnce(&T) -> bool,
    {
        match self.root().and_then(|root| root.delete(key, should_delete)) {
            Some(remaining) => (remaining.into_set(), true),
            None => (self.clone(), false),
        }
    }

    /// Checks that an in-order walk yields strictly ascending keys.
    pub fn is_ordered(&self) -> bool {
        self.keys().zip(self.keys().skip(1)).all(|(a, b)| a < b)
    }
}

impl<T> KeyedSet<T>
where
    T: Keyed + PartialEq,
{
    /// Returns a new set containing `element`, and what happened to get there.
    ///
    /// If an element with the same key is already present, it is replaced only when it isn't
    /// equal to `element`. Otherwise the original set is returned as is.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::{AddOutcome, KeyedSet};
    ///
    /// let set = KeyedSet::new();
    /// let (set, outcome) = set.insert((1, 'a'));
    /// assert_eq!(outcome, AddOutcome::Added);
    ///
    /// let (same, outcome) = set.insert((1, 'a'));
    /// assert_eq!(outcome, AddOutcome::Unchanged);
    /// assert!(same.ptr_eq(&set));
    ///
    /// let (replaced, outcome) = set.insert((1, 'b'));
    /// assert_eq!(outcome, AddOutcome::Replaced);
    /// assert_eq!(replaced.get(&1), Some(&(1, 'b')));
    /// ```
    pub fn insert(&self, element: T) -> (Self, AddOutcome) {
        self.insert_shared(Ref::new(element), OnMatch::Replace)
    }

    /// Returns a new set containing `element`. See [`insert`][Self::insert].
    pub fn add(&self, element: T) -> Self {
        self.insert(element).0
    }

    /// Inserts an element that may be absent, e.g. one read from an optional field.
    ///
    /// Fails with [`Error::NullElement`] when there is no element.
    pub fn try_insert(&self, element: Option<T>) -> Result<(Self, AddOutcome)> {
        let element = element.ok_or(Error::NullElement)?;
        Ok(self.insert(element))
    }

    /// Whether an element with the same key as `element`, and equal to it, is in the set.
    pub fn contains(&self, element: &T) -> bool {
        self.get(element.key()) == Some(element)
    }

    /// Returns a new set without `element`, and whether it was removed.
    ///
    /// Unlike [`delete_by_key`][Self::delete_by_key], the stored element is only removed if it is
    /// equal to `element`, not merely stored under the same key.
    pub fn remove(&self, element: &T) -> (Self, bool) {
        self.delete_where(element.key(), |existing| existing == element)
    }

    pub(crate) fn insert_shared(&self, element: Ref<T>, on_match: OnMatch) -> (Self, AddOutcome) {
        match self {
            Self::Empty => (
                Self::Node(Node::leaf(element, Child::empty())),
                AddOutcome::Added,
            ),
            Self::Node(root) => match root.insert(element, on_match) {
                Some((root, outcome)) => (Self::Node(root), outcome),
                None => (self.clone(), AddOutcome::Unchanged),
            },
        }
    }
}

impl<T> FromIterator<T> for KeyedSet<T>
where
    T: Keyed + PartialEq,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), |set, element| set.add(element))
    }
}

/// Two sets are equal when they yield equal elements in the same order. Their shapes may differ.
impl<T> PartialEq for KeyedSet<T>
where
    T: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.iter().eq(other.iter())
    }
}

impl<T> Eq for KeyedSet<T> where T: Eq {}

impl<T> Hash for KeyedSet<T>
where
    T: Hash,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut len = 0;
        for element in self {
            element.hash(state);
            len += 1;
        }
        state.write_usize(len);
    }
}

impl<T> fmt::Debug for KeyedSet<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

pub(crate) struct Child<T>(pub(crate) Ref<KeyedSet<T>>);

impl<T> Clone for Child<T> {
    fn clone(&self) -> Self {
        Self(Ref::clone(&self.0))
    }
}

impl<T> Child<T> {
    pub(crate) fn empty() -> Self {
        Self(Ref::new(KeyedSet::Empty))
    }

    pub(crate) fn from_node(node: Node<T>) -> Self {
        Self(Ref::new(KeyedSet::Node(node)))
    }

    pub(crate) fn set(&self) -> &KeyedSet<T> {
        &self.0
    }

    pub(crate) fn node(&self) -> Option<&Node<T>> {
        self.0.root()
    }

    /// Unwraps the subtree, only copying its root if it is still shared.
    pub(crate) fn into_set(self) -> KeyedSet<T> {
        Ref::try_unwrap(self.0).unwrap_or_else(|shared| (*shared).clone())
    }

    fn height(&self) -> usize {
        self.0.height()
    }

    fn balance_factor(&self) -> isize {
        self.node().map_or(0, Node::balance_factor)
    }

    fn rotated_left(&self) -> Self {
        match self.node() {
            None => self.clone(),
            Some(n) => Self::from_node(n.rotate_left()),
        }
    }

    fn rotated_right(&self) -> Self {
        match self.node() {
            None => self.clone(),
            Some(n) => Self::from_node(n.rotate_right()),
        }
    }

    /// Returns `None` if the insert left this subtree as it was.
    fn insert(&self, element: Ref<T>, on_match: OnMatch) -> Option<(Self, AddOutcome)>
    where
        T: Keyed + PartialEq,
    {
        match self.node() {
            // Both children of the new leaf reuse this empty subtree.
            None => Some((
                Self::from_node(Node::leaf(element, self.clone())),
                AddOutcome::Added,
            )),
            Some(n) => n
                .insert(element, on_match)
                .map(|(n, outcome)| (Self::from_node(n), outcome)),
        }
    }

    fn find(&self, key: &T::Key) -> Option<&Node<T>>
    where
        T: Keyed,
    {
        self.node().and_then(|n| n.find(key))
    }

    fn delete<F>(&self, key: &T::Key, should_delete: F) -> Option<Self>
    where
        T: Keyed,
        F: FnOnce(&T) -> bool,
    {
        self.node().and_then(|n| n.delete(key, should_delete))
    }
}

/// A `Node` has an element that is ordered by its key. It always has two children although
/// those children may be [`Empty`][KeyedSet::Empty].
pub struct Node<T> {
    pub(crate) element: Ref<T>,
    pub(crate) left: Child<T>,
    pub(crate) right: Child<T>,

    /// How many levels are in the subtree rooted at this node.
    /// A node with no children has a height of 1.
    height: usize,
}

/// Manual implementation of `Clone` so we don't clone elements when `T` isn't `Clone` itself.
/// Only the references are copied.
impl<T> Clone for Node<T> {
    fn clone(&self) -> Self {
        Self {
            height: self.height,
            element: Ref::clone(&self.element),
            left: self.left.clone(),
            right: self.right.clone(),
        }
    }
}

impl<T> Node<T> {
    /// The element stored in this node.
    pub fn element(&self) -> &T {
        &self.element
    }

    /// The subtree of elements with smaller keys.
    pub fn left(&self) -> &KeyedSet<T> {
        self.left.set()
    }

    /// The subtree of elements with larger keys.
    pub fn right(&self) -> &KeyedSet<T> {
        self.right.set()
    }

    /// How many levels are in the subtree rooted at this node.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Construct a new node with no children. Both children share `empty`.
    pub(crate) fn leaf(element: Ref<T>, empty: Child<T>) -> Self {
        Self {
            height: 1,
            element,
            left: empty.clone(),
            right: empty,
        }
    }

    /// Construct a node over the given children without rebalancing.
    pub(crate) fn new(element: Ref<T>, left: Child<T>, right: Child<T>) -> Self {
        Self {
            height: left.height().max(right.height()) + 1,
            element,
            left,
            right,
        }
    }

    /// Create a new node with the same element as this node but with the given children.
    fn with_children(&self, left: Child<T>, right: Child<T>) -> Self {
        Self::new(Ref::clone(&self.element), left, right).balance()
    }

    fn balance_factor(&self) -> isize {
        self.left.height() as isize - self.right.height() as isize
    }

    fn find(&self, key: &T::Key) -> Option<&Self>
    where
        T: Keyed,
    {
        match key.cmp(self.element.key()) {
            Ordering::Less => self.left.find(key),
            Ordering::Equal => Some(self),
            Ordering::Greater => self.right.find(key),
        }
    }

    /// Returns `None` if the insert didn't change anything, so callers can keep their existing
    /// child.
    fn insert(&self, element: Ref<T>, on_match: OnMatch) -> Option<(Self, AddOutcome)>
    where
        T: Keyed + PartialEq,
    {
        match element.key().cmp(self.element.key()) {
            Ordering::Less => {
                let (new_left, outcome) = self.left.insert(element, on_match)?;
                Some((self.with_children(new_left, self.right.clone()), outcome))
            }
            Ordering::Equal => match on_match {
                OnMatch::Replace if *element != *self.element => Some((
                    Self {
                        height: self.height,
                        element,
                        left: self.left.clone(),
                        right: self.right.clone(),
                    },
                    AddOutcome::Replaced,
                )),
                _ => None,
            },
            Ordering::Greater => {
                let (new_right, outcome) = self.right.insert(element, on_match)?;
                Some((self.with_children(self.left.clone(), new_right), outcome))
            }
        }
    }

    /// Returns the subtree that replaces this one, or `None` if nothing was deleted.
    fn delete<F>(&self, key: &T::Key, should_delete: F) -> Option<Child<T>>
    where
        T: Keyed,
        F: FnOnce(&T) -> bool,
    {
        match key.cmp(self.element.key()) {
            Ordering::Less => {
                let new_left = self.left.delete(key, should_delete)?;
                Some(Child::from_node(
                    self.with_children(new_left, self.right.clone()),
                ))
            }
            Ordering::Equal => {
                if should_delete(self.element()) {
                    Some(self.without_element())
                } else {
                    None
                }
            }
            Ordering::Greater => {
                let new_right = self.right.delete(key, should_delete)?;
                Some(Child::from_node(
                    self.with_children(self.left.clone(), new_right),
                ))
            }
        }
    }

    /// The subtree left behind when this node's own element is deleted.
    fn without_element(&self) -> Child<T> {
        match (self.left.node(), self.right.node()) {
            // The empty left child stands in for this leaf.
            (None, None) => self.left.clone(),
            (None, Some(_)) => self.right.clone(),
            (Some(_), None) => self.left.clone(),

            // If we have two children we have to figure out
            // which node to promote. We choose here this node's
            // predecessor. That is, the largest node in this node's
            // left subtree.
            (Some(left), Some(_)) => {
                let (predecessor, new_left) = left.delete_largest();
                Child::from_node(Self::new(predecessor, new_left, self.right.clone()).balance())
            }
        }
    }

    /// Returns the largest element and a new subtree without it.
    fn delete_largest(&self) -> (Ref<T>, Child<T>) {
        match self.right.node() {
            None => (Ref::clone(&self.element), self.left.clone()),
            Some(r) => {
                let (largest, new_right) = r.delete_largest();
                (
                    largest,
                    Child::from_node(self.with_children(self.left.clone(), new_right)),
                )
            }
        }
    }

    /// Returns the smallest element and a new subtree without it.
    fn delete_smallest(&self) -> (Ref<T>, Child<T>) {
        match self.left.node() {
            None => (Ref::clone(&self.element), self.right.clone()),
            Some(l) => {
                let (smallest, new_left) = l.delete_smallest();
                (
                    smallest,
                    Child::from_node(self.with_children(new_left, self.right.clone())),
                )
            }
        }
    }

    /// Returns a new tree by rotating the right child up to become the root. The right child's
    /// left subtree moves across to become the old root's right subtree.
    fn rotate_left(&self) -> Self {
        match self.right.node() {
            None => self.clone(),
            Some(pivot) => {
                let new_left = Self::new(
                    Ref::clone(&self.element),
                    self.left.clone(),
                    pivot.left.clone(),
                );
                Self::new(
                    Ref::clone(&pivot.element),
                    Child::from_node(new_left),
                    pivot.right.clone(),
                )
            }
        }
    }

    /// Returns a new tree by rotating the left child up to become the root. The left child's
    /// right subtree moves across to become the old root's left subtree.
    fn rotate_right(&self) -> Self {
        match self.left.node() {
            None => self.clone(),
            Some(pivot) => {
                let new_right = Self::new(
                    Ref::clone(&self.element),
                    pivot.right.clone(),
                    self.right.clone(),
                );
                Self::new(
                    Ref::clone(&pivot.element),
                    pivot.left.clone(),
                    Child::from_node(new_right),
                )
            }
        }
    }

    /// Balances a tree using the heights of the children.
    ///
    /// **Note** This takes `self` instead of `&self` to save a clone when the node is already
    /// balanced.
    fn balance(self) -> Self {
        let factor = self.balance_factor();
        let return_node = if factor > 1 {
            // A right-leaning left child has to be straightened out first or the rotation just
            // moves the imbalance to the other side.
            let node = if self.left.balance_factor() < 0 {
                Self::new(
                    Ref::clone(&self.element),
                    self.left.rotated_left(),
                    self.right.clone(),
                )
            } else {
                self
            };
            node.rotate_right()
        } else if factor < -1 {
            let node = if self.right.balance_factor() > 0 {
                Self::new(
                    Ref::clone(&self.element),
                    self.left.clone(),
                    self.right.rotated_right(),
                )
            } else {
                self
            };
            node.rotate_left()
        } else {
            self
        };

        // In tests, after balancing, assert that we've restored/maintained the AVL invariant.
        if cfg!(test) {
            assert!(return_node.balance_factor().abs() <= 1);
        }
        return_node
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_no_children() {
        let mut set = KeyedSet::new();
        set = set.add((1, 2));
        set = set.add((2, 3));
        set = set.delete(&2);

        assert_eq!(set.get(&1), Some(&(1, 2)));
        assert_eq!(set.get(&2), None);
    }

    #[test]
    fn test_delete_no_left_child() {
        let mut set = KeyedSet::new();
        set = set.add((1, 2));
        set = set.add((2, 3));
        set = set.delete(&1);

        assert_eq!(set.get(&1), None);
        assert_eq!(set.get(&2), Some(&(2, 3)));
    }

    #[test]
    fn test_delete_no_right_child() {
        let mut set = KeyedSet::new();
        set = set.add((2, 3));
        set = set.add((1, 2));
        set = set.delete(&2);

        assert_eq!(set.get(&1), Some(&(1, 2)));
        assert_eq!(set.get(&2), None);
    }

    #[test]
    fn test_delete_two_children_with_no_grandchildren() {
        let mut set = KeyedSet::new();
        set = set.add((2, 3));
        set = set.add((1, 2));
        set = set.add((3, 4));
        set = set.delete(&2);

        assert_eq!(set.get(&1), Some(&(1, 2)));
        assert_eq!(set.get(&2), None);
        assert_eq!(set.get(&3), Some(&(3, 4)));
    }

    #[test]
    fn test_delete_two_children_with_grandchild() {
        let mut set = KeyedSet::new();
        set = set.add((2, 3));
        set = set.add((1, 2));
        set = set.add((3, 4));
        set = set.add((0, 1));
        set = set.delete(&2);

        assert_eq!(set.get(&0), Some(&(0, 1)));
        assert_eq!(set.get(&1), Some(&(1, 2)));
        assert_eq!(set.get(&2), None);
        assert_eq!(set.get(&3), Some(&(3, 4)));
    }

    #[test]
    fn test_delete_promotes_deep_predecessor() {
        // 4 has a left child (2) with a right child (3), so 3 is spliced out of the left subtree.
        let set: KeyedSet<i32> = [4, 2, 6, 1, 3, 5, 7].into_iter().collect();
        let root = set.root().map(|n| *n.element());
        assert_eq!(root, Some(4));

        let (set, removed) = set.delete_by_key(&4);
        assert!(removed);
        assert_eq!(set.root().map(|n| *n.element()), Some(3));
        assert!(set.is_balanced());
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn test_delete_missing_key_shares_original() {
        let set: KeyedSet<i32> = (0..10).collect();
        let (same, removed) = set.delete_by_key(&42);

        assert!(!removed);
        assert!(same.ptr_eq(&set));
    }

    #[test]
    fn test_remove_requires_equal_element() {
        let set = KeyedSet::new().add((1, "one"));

        let (same, removed) = set.remove(&(1, "uno"));
        assert!(!removed);
        assert!(same.ptr_eq(&set));

        let (set, removed) = set.remove(&(1, "one"));
        assert!(removed);
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_keeps_larger_tree_balanced() {
        let mut set: KeyedSet<(i32, char)> = (0..64).map(|k| (k, 'a')).collect();

        for k in (0..64).step_by(3) {
            let (same, removed) = set.remove(&(k, 'b'));
            assert!(!removed);
            assert!(same.ptr_eq(&set));

            let (smaller, removed) = set.remove(&(k, 'a'));
            assert!(removed);
            assert!(smaller.is_balanced() && smaller.is_ordered());
            assert_eq!(smaller.get(&k), None);
            set = smaller;
        }
        assert_eq!(set.len(), 64 - 22);
    }

    #[test]
    fn test_node_accessors() {
        let set: KeyedSet<i32> = (1..=3).collect();
        let root = match set.root() {
            Some(root) => root,
            None => panic!("set has a root"),
        };

        assert_eq!(root.element(), &2);
        assert_eq!(root.height(), 2);
        assert_eq!(root.left().iter().copied().collect::<Vec<_>>(), [1]);
        assert_eq!(root.right().iter().copied().collect::<Vec<_>>(), [3]);
        assert_eq!(root.left().height(), 1);
    }

    #[test]
    fn test_insert_outcomes() {
        let (set, outcome) = KeyedSet::new().insert((1, 'a'));
        assert_eq!(outcome, AddOutcome::Added);

        let (unchanged, outcome) = set.insert((1, 'a'));
        assert_eq!(outcome, AddOutcome::Unchanged);
        assert!(unchanged.ptr_eq(&set));

        let (replaced, outcome) = set.insert((1, 'b'));
        assert_eq!(outcome, AddOutcome::Replaced);
        assert_eq!(replaced.len(), 1);
        assert_eq!(replaced.get(&1), Some(&(1, 'b')));
        assert_eq!(set.get(&1), Some(&(1, 'a')));
    }

    #[test]
    fn test_unchanged_insert_deep_in_tree_shares_original() {
        let set: KeyedSet<i32> = (0..100).collect();
        let (same, outcome) = set.insert(37);

        assert_eq!(outcome, AddOutcome::Unchanged);
        assert!(same.ptr_eq(&set));
    }

    #[test]
    fn test_insert_shares_untouched_subtree() {
        let set: KeyedSet<i32> = (0..15).collect();
        let bigger = set.add(100);

        let (old_root, new_root) = match (set.root(), bigger.root()) {
            (Some(a), Some(b)) => (a, b),
            _ => panic!("both sets have roots"),
        };
        assert!(Ref::ptr_eq(&old_root.left.0, &new_root.left.0));
        assert!(!Ref::ptr_eq(&old_root.right.0, &new_root.right.0));
    }

    #[test]
    fn test_try_insert_rejects_absent_element() {
        let set: KeyedSet<i32> = (0..3).collect();
        assert!(matches!(set.try_insert(None), Err(Error::NullElement)));

        let (set, outcome) = set.try_insert(Some(3)).unwrap();
        assert_eq!(outcome, AddOutcome::Added);
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn test_try_get_by_reports_comparison_failure() {
        let set: KeyedSet<i32> = (0..10).collect();

        let found = set.try_get_by(|key| Ok::<_, std::fmt::Error>(key.cmp(&7)));
        assert_eq!(found.unwrap(), Some(&7));

        let failed = set.try_get_by(|_| Err::<Ordering, _>(std::fmt::Error));
        assert!(matches!(failed, Err(Error::KeyComparison(_))));
    }

    #[test]
    fn test_first_last_and_pops() {
        let set: KeyedSet<i32> = [5, 3, 8, 1, 9].into_iter().collect();
        assert_eq!(set.first(), Some(&1));
        assert_eq!(set.last(), Some(&9));

        assert_eq!(set.delete_first().first(), Some(&3));
        assert_eq!(set.delete_last().last(), Some(&8));

        let (last, rest) = set.pop_last().unwrap();
        assert_eq!(*last, 9);
        assert_eq!(rest.len(), 4);

        let empty: KeyedSet<i32> = KeyedSet::new();
        assert!(empty.pop_first().is_none());
        assert!(empty.delete_first().is_empty());
    }

    #[test]
    fn test_left_right_case_double_rotation() {
        let set: KeyedSet<i32> = [3, 1, 2].into_iter().collect();
        assert_eq!(set.root().map(|n| *n.element()), Some(2));
        assert_eq!(set.height(), 2);

        let set: KeyedSet<i32> = [1, 3, 2].into_iter().collect();
        assert_eq!(set.root().map(|n| *n.element()), Some(2));
        assert_eq!(set.height(), 2);
    }

    #[test]
    fn test_pretty_prints_right_subtree_first() {
        let set: KeyedSet<i32> = [2, 1, 3].into_iter().collect();
        assert_eq!(set.pretty(), "  3-1\n2-2\n  1-1\n");
    }

    #[test]
    fn test_equality_ignores_shape() {
        let ascending: KeyedSet<i32> = (0..20).collect();
        let descending: KeyedSet<i32> = (0..20).rev().collect();

        assert_eq!(ascending, descending);
        assert_ne!(ascending, descending.delete(&3));
        assert_eq!(format!("{:?}", KeyedSet::new().add(1).add(2)), "{1, 2}");
    }

    /// Assert the heights of the root, left child, and right child of a set.
    macro_rules! assert_heights {
        ($set:ident, $height:expr, $left_height:expr, $right_height:expr) => {{
            assert_eq!($set.height(), $height);

            if let KeyedSet::Node(n) = &$set {
                assert_eq!(n.height(), $height);

                assert_eq!(n.right().height(), $right_height);
                assert_eq!(n.left().height(), $left_height);
            }
        }};
    }

    #[test]
    fn test_height() {
        let mut set = KeyedSet::new();
        assert_eq!(set.height(), 0);

        set = set.add(1);
        assert_heights!(set, 1, 0, 0);

        // Insert a value to the right making it taller.
        set = set.add(2);
        assert_heights!(set, 2, 0, 1);

        // Insert a value to the left not changing the overall height.
        set = set.add(0);
        assert_heights!(set, 2, 1, 1);

        // Delete that left value to get to the previous heights.
        set = set.delete(&0);
        assert_heights!(set, 2, 0, 1);

        // Put it back and delete the root. It'll be replaced with its left child
        // so we have just the root and a right child.
        set = set.add(0);
        set = set.delete(&1);
        assert_heights!(set, 2, 0, 1);
    }
}
