//! In-order traversal of a [`KeyedSet`].
//!
//! Iterators keep an explicit stack of the nodes they are partway through instead of recursing,
//! so the stack never grows past the height of the tree. Since a set never changes, an iterator
//! stays valid for as long as it borrows the set, and calling [`KeyedSet::iter`] again always
//! starts a fresh, independent walk.

use std::iter::FusedIterator;
use std::ops::ControlFlow;

use crate::keyed::Keyed;
use crate::set::{Child, KeyedSet, Node};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// The child visited before a node's own element.
    fn near<T>(self, node: &Node<T>) -> &Child<T> {
        match self {
            Self::Ascending => &node.left,
            Self::Descending => &node.right,
        }
    }

    /// The child visited after a node's own element.
    fn far<T>(self, node: &Node<T>) -> &Child<T> {
        match self {
            Self::Ascending => &node.right,
            Self::Descending => &node.left,
        }
    }
}

/// Where to pick a node back up the next time it's on top of the stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Resume {
    /// Nothing done yet. Descend into the near child.
    Descend,
    /// The near child is finished. Yield this node.
    VisitSelf,
    /// This node was yielded. Replace it with its far child.
    DescendFar,
}

struct Frame<'a, T> {
    node: &'a Node<T>,
    resume: Resume,
}

impl<'a, T> Frame<'a, T> {
    fn new(node: &'a Node<T>) -> Self {
        Self {
            node,
            resume: Resume::Descend,
        }
    }
}

/// Walks the nodes of a tree in key order.
pub(crate) struct Nodes<'a, T> {
    stack: Vec<Frame<'a, T>>,
    direction: Direction,
}

impl<'a, T> Nodes<'a, T> {
    pub(crate) fn new(set: &'a KeyedSet<T>, direction: Direction) -> Self {
        let mut stack = Vec::with_capacity(set.height());
        if let Some(root) = set.root() {
            stack.push(Frame::new(root));
        }
        Self { stack, direction }
    }
}

impl<'a, T> Iterator for Nodes<'a, T> {
    type Item = &'a Node<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let direction = self.direction;
        loop {
            let frame = self.stack.last_mut()?;
            let node = frame.node;
            match frame.resume {
                Resume::Descend => {
                    frame.resume = Resume::VisitSelf;
                    if let Some(child) = direction.near(node).node() {
                        self.stack.push(Frame::new(child));
                    }
                }
                Resume::VisitSelf => {
                    frame.resume = Resume::DescendFar;
                    return Some(node);
                }
                Resume::DescendFar => {
                    // Nothing is left to do for this node once its far child is started.
                    self.stack.pop();
                    if let Some(child) = direction.far(node).node() {
                        self.stack.push(Frame::new(child));
                    }
                }
            }
        }
    }
}

impl<T> FusedIterator for Nodes<'_, T> {}

/// An iterator over the elements of a [`KeyedSet`], either ascending ([`KeyedSet::iter`]) or
/// descending ([`KeyedSet::rev_iter`]) by key.
pub struct Iter<'a, T> {
    nodes: Nodes<'a, T>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.nodes.next().map(Node::element)
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

/// An iterator over the keys of a [`KeyedSet`], either ascending ([`KeyedSet::keys`]) or
/// descending ([`KeyedSet::rev_keys`]).
pub struct Keys<'a, T> {
    nodes: Nodes<'a, T>,
}

impl<'a, T> Iterator for Keys<'a, T>
where
    T: Keyed,
{
    type Item = &'a T::Key;

    fn next(&mut self) -> Option<&'a T::Key> {
        self.nodes.next().map(|node| node.element().key())
    }
}

impl<T> FusedIterator for Keys<'_, T> where T: Keyed {}

impl<'a, T> IntoIterator for &'a KeyedSet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> KeyedSet<T> {
    /// Iterates over the elements in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use keyed_set::KeyedSet;
    ///
    /// let set: KeyedSet<i32> = [3, 1, 2].into_iter().collect();
    /// assert_eq!(set.iter().collect::<Vec<_>>(), [&1, &2, &3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: self.nodes(Direction::Ascending),
        }
    }

    /// Iterates over the elements in descending key order.
    pub fn rev_iter(&self) -> Iter<'_, T> {
        Iter {
            nodes: self.nodes(Direction::Descending),
        }
    }

    /// Calls `f` on every element in ascending key order.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let _ = self.try_for_each(|element| {
            f(element);
            ControlFlow::<()>::Continue(())
        });
    }

    /// Calls `f` on every element in descending key order.
    pub fn for_each_rev<F>(&self, mut f: F)
    where
        F: FnMut(&T),
    {
        let _ = self.try_for_each_rev(|element| {
            f(element);
            ControlFlow::<()>::Continue(())
        });
    }

    /// Calls `f` on elements in ascending key order until it breaks, and returns the break.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::ops::ControlFlow;
    /// use keyed_set::KeyedSet;
    ///
    /// let set: KeyedSet<i32> = (1..100).collect();
    /// let first_square = set.try_for_each(|x| {
    ///     if *x > 1 && (2..*x).any(|d| d * d == *x) {
    ///         ControlFlow::Break(*x)
    ///     } else {
    ///         ControlFlow::Continue(())
    ///     }
    /// });
    /// assert_eq!(first_square, ControlFlow::Break(4));
    /// ```
    pub fn try_for_each<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        self.visit(Direction::Ascending, &mut f)
    }

    /// Calls `f` on elements in descending key order until it breaks, and returns the break.
    pub fn try_for_each_rev<B, F>(&self, mut f: F) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        self.visit(Direction::Descending, &mut f)
    }

    pub(crate) fn nodes(&self, direction: Direction) -> Nodes<'_, T> {
        Nodes::new(self, direction)
    }

    fn visit<B, F>(&self, direction: Direction, f: &mut F) -> ControlFlow<B>
    where
        F: FnMut(&T) -> ControlFlow<B>,
    {
        self.nodes(direction).try_for_each(|node| f(node.element()))
    }
}

impl<T> KeyedSet<T>
where
    T: Keyed,
{
    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, T> {
        Keys {
            nodes: self.nodes(Direction::Ascending),
        }
    }

    /// Iterates over the keys in descending order.
    pub fn rev_keys(&self) -> Keys<'_, T> {
        Keys {
            nodes: self.nodes(Direction::Descending),
        }
    }
}
