//! This crate provides [`KeyedSet`], a persistent ordered set of elements that are
//! each ordered by a key.
//!
//! ## Persistent Sets
//!
//! A persistent set never changes once it is built. Operations that would modify
//! it (insert, delete, union, ...) return a new set instead, and the old one stays
//! valid and unchanged. The new set shares every subtree the operation didn't
//! touch with the old one, so an insert or delete only allocates the `O(lg N)`
//! nodes on the path it walked. Keeping many versions around is cheap, and a set
//! can be read by any number of holders at once without locking.
//!
//! ## AVL Trees
//!
//! Sets are stored as Binary Search Trees (BSTs). A BST is defined recursively
//! using the notion of a `Node`. A `Node` stores an element and has two children.
//! The most important invariants of a BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree have a
//!    key less than its own key.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree have a
//!    key greater than its own key.
//!
//! On top of that, an AVL tree requires that the heights of the two subtrees of
//! every `Node` differ by at most one. Each insert or delete restores this by
//! rotating nodes on its way back up to the root, which keeps the height of the
//! tree, and with it the cost of every lookup, insert and delete, at `O(lg N)`.
//!
//! ## Keys and Equality
//!
//! Elements are ordered only by their [`Keyed::key`]. Whether two elements with
//! the same key are the same is decided by the element's own `PartialEq`, which
//! can look at more than the key. A set of `(K, V)` pairs, keyed by `K`, works as
//! a persistent map.
//!
//! ```
//! use keyed_set::KeyedSet;
//!
//! let lengths: KeyedSet<(&str, usize)> = ["apple", "fig", "kiwi"]
//!     .into_iter()
//!     .map(|word| (word, word.len()))
//!     .collect();
//!
//! assert_eq!(lengths.get(&"fig"), Some(&("fig", 3)));
//! assert_eq!(lengths.keys().copied().collect::<Vec<_>>(), ["apple", "fig", "kiwi"]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod algebra;
mod error;
mod iter;
mod keyed;
mod set;
mod util;


pub use algebra::{AlgebraConfig, Strategy};
pub use error::{Error, Result};
pub use iter::{Iter, Keys};
pub use keyed::Keyed;
pub use set::{KeyedSet, Node};
pub use util::AddOutcome;
