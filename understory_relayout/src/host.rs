// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the orderer and the UI framework that owns the nodes.

use core::fmt::Debug;
use core::hash::Hash;

/// Access to a host UI hierarchy.
///
/// Hosts can implement this trait over a scene graph, an ECS, or any other
/// structure that owns nodes and knows how to lay them out.
/// [`LayoutTree`](crate::LayoutTree) is a ready-made implementation.
///
/// ## Handles
///
/// [`LayoutHost::Node`] is a non-owning handle: holding one must never keep a
/// node alive. When a node is destroyed, its handle goes stale and
/// [`LayoutHost::is_alive`] reports `false` from then on. A stale handle is
/// treated exactly like an absent node.
pub trait LayoutHost {
    /// Non-owning node handle, such as a generational id.
    type Node: Copy + Eq + Hash + Debug;

    /// Returns `true` if `node` still refers to a live node.
    fn is_alive(&self, node: Self::Node) -> bool;

    /// Direct children of `node`, in the host's stable order.
    ///
    /// Only called for live nodes.
    fn children(&self, node: Self::Node) -> impl Iterator<Item = Self::Node> + '_;

    /// Returns `true` if `node` carries an auto-sizing layout container.
    fn has_layout(&self, node: Self::Node) -> bool;

    /// Recompute the layout of `node` immediately, bypassing any deferred update.
    ///
    /// Only called for live nodes.
    fn force_rebuild(&mut self, node: Self::Node);
}
