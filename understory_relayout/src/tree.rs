// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small retained layout tree that implements [`LayoutHost`].

use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;
use smallvec::SmallVec;

use crate::host::LayoutHost;
use crate::types::{LocalBox, NodeFlags, NodeId, StackLayout};

/// Errors from editing a [`LayoutTree`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TreeError {
    /// The node id no longer refers to a live node.
    StaleNode(NodeId),
    /// Making `parent` the parent of `node` would create a cycle.
    WouldCycle {
        /// The node being moved.
        node: NodeId,
        /// The requested parent, which is `node` itself or one of its descendants.
        parent: NodeId,
    },
    /// All `u32` slot indices are in use.
    CapacityExceeded,
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StaleNode(id) => write!(f, "node {id:?} is not alive"),
            Self::WouldCycle { node, parent } => {
                write!(f, "moving {node:?} under {parent:?} would create a cycle")
            }
            Self::CapacityExceeded => f.write_str("layout tree slot capacity exceeded"),
        }
    }
}

impl core::error::Error for TreeError {}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    local: LocalBox,
    /// Size computed by the last rebuild of a container.
    size: Size,
    rebuilds: u32,
}

impl Node {
    fn current_size(&self) -> Size {
        if self.local.layout.is_some() {
            self.size
        } else {
            self.local.preferred_size
        }
    }

    fn measured(&self) -> bool {
        self.local.flags.contains(NodeFlags::ACTIVE)
            && !self.local.flags.contains(NodeFlags::IGNORE_LAYOUT)
    }
}

#[derive(Clone, Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// A retained tree of boxes, some of which carry auto-sizing stack containers.
///
/// Containers only update their size when rebuilt, and a rebuild reads the
/// sizes its children have *right now*. Rebuilding a parent before a child
/// therefore leaves the parent with a stale size, which is the situation
/// [`RelayoutOrderer`](crate::RelayoutOrderer) exists to avoid.
///
/// Leaves always report their preferred size.
#[derive(Clone, Debug, Default)]
pub struct LayoutTree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl LayoutTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the tree has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_ref()
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.generation() {
            return None;
        }
        slot.node.as_mut()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, TreeError> {
        self.get_mut(id).ok_or(TreeError::StaleNode(id))
    }

    /// Returns `true` if `id` refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Insert a node, appended as the last child of `parent` (or as a root).
    pub fn insert(&mut self, parent: Option<NodeId>, local: LocalBox) -> Result<NodeId, TreeError> {
        if let Some(parent) = parent {
            if !self.is_alive(parent) {
                return Err(TreeError::StaleNode(parent));
            }
        }

        let size = if local.layout.is_some() {
            Size::ZERO
        } else {
            local.preferred_size
        };
        let node = Node {
            parent,
            children: SmallVec::new(),
            local,
            size,
            rebuilds: 0,
        };

        let id = if let Some(idx) = self.free.pop() {
            let slot = &mut self.slots[idx as usize];
            slot.generation = slot.generation.wrapping_add(1);
            slot.node = Some(node);
            NodeId::new(idx, slot.generation)
        } else {
            let idx = u32::try_from(self.slots.len()).map_err(|_| TreeError::CapacityExceeded)?;
            self.slots.push(Slot {
                generation: 1,
                node: Some(node),
            });
            NodeId::new(idx, 1)
        };
        self.live += 1;

        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.push(id);
        }
        Ok(id)
    }

    /// Remove a node and its whole subtree.
    ///
    /// Returns `false` if `id` was already stale. All removed ids go stale.
    pub fn remove(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.get(id).map(|n| n.parent) else {
            return false;
        };
        if let Some(parent) = parent.and_then(|p| self.get_mut(p)) {
            parent.children.retain(|c| *c != id);
        }

        let mut stack = alloc::vec![id];
        while let Some(current) = stack.pop() {
            let slot = &mut self.slots[current.idx()];
            if let Some(node) = slot.node.take() {
                stack.extend(node.children);
                self.free.push(current.0);
                self.live -= 1;
            }
        }
        true
    }

    /// Move `id` to the end of `new_parent`'s children, or detach it as a root.
    pub fn reparent(&mut self, id: NodeId, new_parent: Option<NodeId>) -> Result<(), TreeError> {
        let old_parent = self.get(id).ok_or(TreeError::StaleNode(id))?.parent;
        if let Some(parent) = new_parent {
            let mut cursor = Some(parent);
            while let Some(current) = cursor {
                if current == id {
                    return Err(TreeError::WouldCycle { node: id, parent });
                }
                cursor = self.get(current).ok_or(TreeError::StaleNode(current))?.parent;
            }
        }

        if let Some(old) = old_parent.and_then(|p| self.get_mut(p)) {
            old.children.retain(|c| *c != id);
        }
        if let Some(new) = new_parent.and_then(|p| self.get_mut(p)) {
            new.children.push(id);
        }
        self.node_mut(id)?.parent = new_parent;
        Ok(())
    }

    /// Parent of a live node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.parent
    }

    /// Children of a live node, in insertion order. Empty for stale ids.
    #[must_use]
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Some(node) => node.children.as_slice(),
            None => &[],
        }
    }

    /// Local data of a live node.
    #[must_use]
    pub fn local(&self, id: NodeId) -> Option<&LocalBox> {
        self.get(id).map(|n| &n.local)
    }

    /// Flags of a live node.
    #[must_use]
    pub fn flags(&self, id: NodeId) -> Option<NodeFlags> {
        self.get(id).map(|n| n.local.flags)
    }

    /// Current size of a live node.
    ///
    /// For containers this is the result of the last rebuild, which may be stale.
    #[must_use]
    pub fn size(&self, id: NodeId) -> Option<Size> {
        self.get(id).map(Node::current_size)
    }

    /// How many times a live node has been rebuilt.
    #[must_use]
    pub fn rebuild_count(&self, id: NodeId) -> Option<u32> {
        self.get(id).map(|n| n.rebuilds)
    }

    /// Replace the flags of a node.
    pub fn set_flags(&mut self, id: NodeId, flags: NodeFlags) -> Result<(), TreeError> {
        self.node_mut(id)?.local.flags = flags;
        Ok(())
    }

    /// Toggle [`NodeFlags::ACTIVE`] on a node.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<(), TreeError> {
        self.node_mut(id)?.local.flags.set(NodeFlags::ACTIVE, active);
        Ok(())
    }

    /// Replace the preferred size of a node.
    pub fn set_preferred_size(&mut self, id: NodeId, size: Size) -> Result<(), TreeError> {
        self.node_mut(id)?.local.preferred_size = size;
        Ok(())
    }

    /// Attach, replace, or remove (`None`) the layout container of a node.
    ///
    /// A newly attached container starts with a zero size until rebuilt.
    pub fn set_layout(&mut self, id: NodeId, layout: Option<StackLayout>) -> Result<(), TreeError> {
        let node = self.node_mut(id)?;
        if node.local.layout.is_none() && layout.is_some() {
            node.size = Size::ZERO;
        }
        node.local.layout = layout;
        Ok(())
    }

    /// Recompute the size of a node from the current sizes of its children.
    ///
    /// Does nothing for stale ids. Leaves just count the rebuild.
    pub fn rebuild(&mut self, id: NodeId) {
        let Some(node) = self.get(id) else {
            return;
        };
        let size = match node.local.layout {
            Some(layout) => layout.measure(
                node.children
                    .iter()
                    .filter_map(|&child| self.get(child))
                    .filter(|child| child.measured())
                    .map(Node::current_size),
            ),
            None => node.local.preferred_size,
        };
        if let Some(node) = self.get_mut(id) {
            node.size = size;
            node.rebuilds += 1;
        }
    }
}

impl LayoutHost for LayoutTree {
    type Node = NodeId;

    fn is_alive(&self, node: NodeId) -> bool {
        self.get(node).is_some()
    }

    fn children(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children_of(node).iter().copied()
    }

    fn has_layout(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|n| n.local.layout.is_some())
    }

    fn force_rebuild(&mut self, node: NodeId) {
        self.rebuild(node);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn removed_ids_go_stale_and_slots_are_reused() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(None, LocalBox::stack(StackLayout::vertical())).unwrap();
        let child = tree.insert(Some(root), LocalBox::default()).unwrap();
        let grandchild = tree.insert(Some(child), LocalBox::default()).unwrap();
        assert_eq!(tree.len(), 3);

        assert!(tree.remove(child));
        assert!(!tree.is_alive(child));
        assert!(!tree.is_alive(grandchild));
        assert!(tree.children_of(root).is_empty());
        assert_eq!(tree.len(), 1);
        assert!(!tree.remove(child));

        let reused = tree.insert(Some(root), LocalBox::default()).unwrap();
        assert!(reused == NodeId::new(grandchild.0, 2) || reused == NodeId::new(child.0, 2));
        assert!(!tree.is_alive(child));
        assert!(!tree.is_alive(grandchild));
    }

    #[test]
    fn insert_under_stale_parent_fails() {
        let mut tree = LayoutTree::new();
        let root = tree.insert(None, LocalBox::default()).unwrap();
        tree.remove(root);
        assert_eq!(
            tree.insert(Some(root), LocalBox::default()),
            Err(TreeError::StaleNode(root))
        );
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut tree = LayoutTree::new();
        let a = tree.insert(None, LocalBox::default()).unwrap();
        let b = tree.insert(Some(a), LocalBox::default()).unwrap();
        let c = tree.insert(Some(b), LocalBox::default()).unwrap();

        let err = tree.reparent(a, Some(c)).unwrap_err();
        assert_eq!(err, TreeError::WouldCycle { node: a, parent: c });
        assert!(err.to_string().contains("cycle"));

        tree.reparent(c, Some(a)).unwrap();
        assert_eq!(tree.children_of(a), &[b, c]);
        assert!(tree.children_of(b).is_empty());
        assert_eq!(tree.parent(c), Some(a));
    }

    #[test]
    fn rebuild_reads_current_child_sizes() {
        let mut tree = LayoutTree::new();
        let outer = tree.insert(None, LocalBox::stack(StackLayout::vertical())).unwrap();
        let inner = tree.insert(Some(outer), LocalBox::stack(StackLayout::vertical())).unwrap();
        tree.insert(Some(inner), LocalBox::leaf(Size::new(10.0, 10.0))).unwrap();

        // Parent first: it still sees the inner container's zero size.
        tree.rebuild(outer);
        tree.rebuild(inner);
        assert_eq!(tree.size(inner), Some(Size::new(10.0, 10.0)));
        assert_eq!(tree.size(outer), Some(Size::ZERO));

        tree.rebuild(outer);
        assert_eq!(tree.size(outer), Some(Size::new(10.0, 10.0)));
        assert_eq!(tree.rebuild_count(outer), Some(2));
    }

    #[test]
    fn inactive_and_ignored_children_are_not_measured() {
        let mut tree = LayoutTree::new();
        let stack = tree.insert(None, LocalBox::stack(StackLayout::horizontal())).unwrap();
        let a = tree.insert(Some(stack), LocalBox::leaf(Size::new(10.0, 5.0))).unwrap();
        tree.insert(
            Some(stack),
            LocalBox::leaf(Size::new(99.0, 99.0))
                .with_flags(NodeFlags::ACTIVE | NodeFlags::IGNORE_LAYOUT),
        )
        .unwrap();
        tree.insert(Some(stack), LocalBox::leaf(Size::new(20.0, 8.0))).unwrap();

        tree.rebuild(stack);
        assert_eq!(tree.size(stack), Some(Size::new(30.0, 8.0)));

        tree.set_active(a, false).unwrap();
        tree.rebuild(stack);
        assert_eq!(tree.size(stack), Some(Size::new(20.0, 8.0)));
    }

    #[test]
    fn host_reports_layout_capability() {
        let mut tree = LayoutTree::new();
        let node = tree.insert(None, LocalBox::leaf(Size::new(1.0, 1.0))).unwrap();
        assert!(!LayoutHost::has_layout(&tree, node));

        tree.set_layout(node, Some(StackLayout::vertical())).unwrap();
        assert!(LayoutHost::has_layout(&tree, node));
        assert_eq!(tree.size(node), Some(Size::ZERO));

        tree.remove(node);
        assert!(!LayoutHost::has_layout(&tree, node));
        assert_eq!(tree.set_flags(node, NodeFlags::empty()), Err(TreeError::StaleNode(node)));
    }
}
