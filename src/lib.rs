//! A dynamic bounding-volume hierarchy for broad-phase spatial queries over
//! moving keys, in either two dimensions ([`Rect`]) or one ([`Interval`]).
//!
//! Built for scenes where every payload moves every tick and a query is
//! issued every frame: [`Tree::update`]/[`Tree::move_leaf`] absorb small
//! motions into a padded ("fat") key without touching the tree's shape, and
//! only a motion large enough to escape that padding pays for a real
//! remove-then-reinsert. Insertion picks its sibling via a branch-and-bound
//! search over a surface-area cost (the same heuristic Box2D's
//! `b2DynamicTree` uses), and an AVL-style rotation keeps the tree
//! height-balanced along the insert/remove path.
//!
//! ```
//! use bvh_tree::{AabbTree, Rect};
//!
//! let mut tree = AabbTree::new();
//! let h = tree.add(Rect::new(0.0, 0.0, 10.0, 10.0), "crate");
//! assert_eq!(tree.query(Rect::new(1.0, 1.0, 0.0, 0.0)).next(), Some(&"crate"));
//! tree.remove(h);
//! assert!(tree.query_all().next().is_none());
//! ```
//!
//! Out of scope: ray casts, nearest-neighbor queries, 3-D generalization,
//! persistence, and multi-threaded mutation. The tree stores payloads by
//! value and never interprets them; it only returns what callers gave it.

mod error;
mod key;
mod node;
mod query;
mod tree;
mod view;

pub use error::TreeError;
pub use key::{Interval, Key, Rect};
pub use node::LeafHandle;
pub use query::{KeyIter, PayloadIter};
pub use tree::{Tree, TreeConfig, DEFAULT_EXPAND_CONSTANT, DEFAULT_INITIAL_CAPACITY, DEFAULT_MOVE_CONSTANT};
pub use view::NodeView;

/// The 2-D monomorphization of [`Tree`]: keys are axis-aligned rectangles.
pub type AabbTree<T> = Tree<Rect, T>;

/// The 1-D monomorphization of [`Tree`]: keys are intervals.
pub type IntervalTree<T> = Tree<Interval, T>;
