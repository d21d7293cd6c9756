//! The four DFS query shapes: query-by-key, query-all, debug-nodes-by-key,
//! debug-all-nodes. All four share one explicit-stack depth-first walk;
//! they differ only in whether an overlap filter prunes the walk and
//! whether branch nodes are themselves emitted.
//!
//! Modeled as two generic iterator types (`PayloadIter`, `KeyIter`) rather
//! than four concrete ones — see `DESIGN.md`. Each snapshots the tree's
//! [`version`](crate::tree::Tree) at construction and reports
//! [`TreeError::ConcurrentModification`](crate::TreeError::ConcurrentModification)
//! if that version has moved by the time it's asked to advance or read its
//! current element, rather than silently walking a mutated tree.

use thunderdome::Index;

use crate::error::TreeError;
use crate::key::Key;
use crate::node::NodeKind;
use crate::tree::Tree;

/// Shared DFS-with-explicit-stack plumbing behind [`PayloadIter`] and
/// [`KeyIter`]. The stack is a plain growable `Vec` rather than a
/// fixed-size one, so deep trees never overflow it.
struct Dfs<'a, K, T> {
    tree: &'a Tree<K, T>,
    filter: Option<K>,
    emit_branches: bool,
    stack: Vec<Index>,
    snapshot_version: u64,
}

impl<'a, K: Key, T> Dfs<'a, K, T> {
    fn new(tree: &'a Tree<K, T>, filter: Option<K>, emit_branches: bool) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = tree.root {
            stack.push(root);
        }
        Self {
            tree,
            filter,
            emit_branches,
            stack,
            snapshot_version: tree.version,
        }
    }

    fn check_version(&self) -> Result<(), TreeError> {
        if self.tree.version == self.snapshot_version {
            Ok(())
        } else {
            Err(TreeError::ConcurrentModification)
        }
    }

    /// Pops nodes until one should be emitted (a leaf, always; a branch,
    /// only when `emit_branches`), pushing a matching branch's children
    /// along the way (first child then second child, so they pop in the
    /// reverse order — second child first). A branch whose key fails the
    /// overlap filter is dropped without descending into it: every
    /// descendant's key is a subset of its own, so none of them could
    /// match either.
    fn advance_index(&mut self) -> Result<Option<Index>, TreeError> {
        self.check_version()?;

        while let Some(idx) = self.stack.pop() {
            let node = self.tree.raw_node(idx);

            if let Some(filter) = self.filter {
                if !filter.overlaps(node.key) {
                    continue;
                }
            }

            match node.kind {
                NodeKind::Branch { children } => {
                    self.stack.extend(children);
                    if self.emit_branches {
                        return Ok(Some(idx));
                    }
                }
                NodeKind::Leaf { .. } => return Ok(Some(idx)),
            }
        }

        Ok(None)
    }
}

/// Lazy DFS sequence of `&T` payloads: backs `Tree::query`/`Tree::query_all`.
///
/// Exposes both an enumerator-style `advance`/`current` pair and a
/// standard `Iterator` impl built on top of it; ordinary
/// Rust callers just iterate, callers that need to distinguish "not
/// started"/"exhausted" from a real concurrent-modification failure can
/// call `current()` directly.
pub struct PayloadIter<'a, K, T> {
    dfs: Dfs<'a, K, T>,
    current: Option<Index>,
}

impl<'a, K: Key, T> PayloadIter<'a, K, T> {
    pub(crate) fn new(tree: &'a Tree<K, T>, filter: Option<K>) -> Self {
        Self {
            dfs: Dfs::new(tree, filter, false),
            current: None,
        }
    }

    /// Advances to the next payload. `Ok(true)` if one was found, `Ok(false)`
    /// if the sequence is now exhausted, `Err` if the tree was mutated since
    /// construction (or the last successful advance).
    pub fn advance(&mut self) -> Result<bool, TreeError> {
        self.current = self.dfs.advance_index()?;
        Ok(self.current.is_some())
    }

    /// The payload at the current position. Fails with
    /// [`TreeError::InvalidIteratorState`] before the first `advance()` or
    /// after the sequence is exhausted, and with
    /// [`TreeError::ConcurrentModification`] if the tree changed since.
    pub fn current(&self) -> Result<&'a T, TreeError> {
        self.dfs.check_version()?;
        let idx = self.current.ok_or(TreeError::InvalidIteratorState)?;
        Ok(self.dfs.tree.raw_node(idx).leaf_value())
    }
}

impl<'a, K: Key, T> Iterator for PayloadIter<'a, K, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => self.current().ok(),
            _ => None,
        }
    }
}

/// Lazy DFS sequence of `K` keys: backs `Tree::debug_nodes`/`Tree::debug_all_nodes`.
/// Unlike [`PayloadIter`], branch nodes are emitted too, not just leaves.
pub struct KeyIter<'a, K, T> {
    dfs: Dfs<'a, K, T>,
    current: Option<Index>,
}

impl<'a, K: Key, T> KeyIter<'a, K, T> {
    pub(crate) fn new(tree: &'a Tree<K, T>, filter: Option<K>) -> Self {
        Self {
            dfs: Dfs::new(tree, filter, true),
            current: None,
        }
    }

    pub fn advance(&mut self) -> Result<bool, TreeError> {
        self.current = self.dfs.advance_index()?;
        Ok(self.current.is_some())
    }

    pub fn current(&self) -> Result<K, TreeError> {
        self.dfs.check_version()?;
        let idx = self.current.ok_or(TreeError::InvalidIteratorState)?;
        Ok(self.dfs.tree.raw_node(idx).key)
    }
}

impl<K: Key, T> Iterator for KeyIter<'_, K, T> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(true) => self.current().ok(),
            _ => None,
        }
    }
}
