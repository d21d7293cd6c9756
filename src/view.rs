use derive_where::derive_where;
use smallvec::SmallVec;
use thunderdome::Index;

use crate::node::{LeafHandle, Node, NodeKind};
use crate::tree::Tree;

/// A read-only, borrowed view of one node — leaf or branch — used for
/// tree introspection (invariant checks, debug-node walking).
///
/// A thin cursor that borrows the tree and one of its nodes together so
/// callers can walk parent/child links without re-indexing the arena by
/// hand.
#[derive_where(Copy, Clone)]
pub struct NodeView<'a, K, T> {
    tree: &'a Tree<K, T>,
    node: &'a Node<K, T>,
    index: Index,
}

impl<'a, K, T> NodeView<'a, K, T> {
    pub(crate) fn new(tree: &'a Tree<K, T>, index: Index) -> Self {
        Self {
            tree,
            node: tree.raw_node(index),
            index,
        }
    }

    fn view_of(self, index: Index) -> Self {
        Self::new(self.tree, index)
    }

    pub fn is_leaf(self) -> bool {
        self.node.is_leaf()
    }

    pub fn is_branch(self) -> bool {
        self.node.is_branch()
    }

    pub fn key(self) -> K
    where
        K: Copy,
    {
        self.node.key
    }

    pub fn height(self) -> u32 {
        self.node.height
    }

    pub fn handle(self) -> Option<LeafHandle> {
        self.is_leaf().then_some(LeafHandle(self.index))
    }

    pub fn parent(self) -> Option<Self> {
        self.node.parent.map(|p| self.view_of(p))
    }

    pub fn children(self) -> SmallVec<[Self; 2]> {
        match self.node.kind {
            NodeKind::Branch { children } => {
                children.into_iter().map(|c| self.view_of(c)).collect()
            }
            NodeKind::Leaf { .. } => SmallVec::new(),
        }
    }

    pub fn value(self) -> Option<&'a T> {
        match &self.node.kind {
            NodeKind::Leaf { value } => Some(value),
            NodeKind::Branch { .. } => None,
        }
    }
}

// === Tests === //

#[cfg(test)]
mod tests {
    use crate::key::Rect;
    use crate::tree::Tree;

    #[test]
    fn leaf_view_reports_no_children_and_its_own_handle() {
        let mut tree: Tree<Rect, &str> = Tree::new();
        let h = tree.add(Rect::new(0.0, 0.0, 10.0, 10.0), "A");

        let view = tree.node(h);
        assert!(view.is_leaf());
        assert!(!view.is_branch());
        assert!(view.children().is_empty());
        assert_eq!(view.handle(), Some(h));
        assert_eq!(view.value(), Some(&"A"));
        assert!(view.parent().is_none());
    }

    #[test]
    fn branch_view_sees_both_children_and_their_parent_back() {
        let mut tree: Tree<Rect, &str> = Tree::new();
        let a = tree.add(Rect::new(0.0, 0.0, 10.0, 10.0), "A");
        let b = tree.add(Rect::new(100.0, 100.0, 10.0, 10.0), "B");

        let root = tree.root().expect("non-empty tree has a root");
        assert!(root.is_branch());
        assert!(root.value().is_none());
        assert!(root.handle().is_none());

        let children = root.children();
        assert_eq!(children.len(), 2);
        for child in children {
            assert!(child.is_leaf());
            assert_eq!(child.parent().unwrap().key(), root.key());
            assert!(child.handle() == Some(a) || child.handle() == Some(b));
        }
    }
}
