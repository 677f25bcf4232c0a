// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Breadth-first discovery and reverse-order forced rebuilds.

use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashSet;

use crate::host::LayoutHost;
use crate::trace::{RelayoutTrace, SkipReason};

/// A layout-bearing node captured during discovery.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct LayoutEntry<N> {
    /// The node handle.
    pub node: N,
    /// Distance from the discovery root. The root itself is at depth `0`.
    pub depth: u32,
}

/// Whether an orderer currently holds a discovered structure.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum CacheState {
    /// No discovery has completed since construction or the last
    /// [`invalidate`](RelayoutOrderer::invalidate).
    #[default]
    Uncached,
    /// A discovery has completed and its root and entries are cached.
    Cached,
}

/// Summary of what a single [`RelayoutOrderer::refresh`] did.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RefreshReport {
    /// A new discovery ran before rebuilding.
    pub rediscovered: bool,
    /// Cached entries the rebuild primitive ran on.
    pub rebuilt: usize,
    /// Cached entries passed over because they went stale or lost their layout.
    pub skipped: usize,
    /// The final root rebuild ran.
    pub root_rebuilt: bool,
}

impl RefreshReport {
    /// Total number of rebuild primitives issued, including the root rebuild.
    #[must_use]
    pub fn triggers(&self) -> usize {
        self.rebuilt + usize::from(self.root_rebuilt)
    }

    /// Returns `true` if the refresh neither discovered nor rebuilt anything.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        !self.rediscovered && self.triggers() == 0
    }
}

/// Forces nested layout containers to rebuild children-first.
///
/// Some layout passes rebuild containers top-down, so a parent measures its
/// children before they have been re-measured and keeps a stale size until the
/// next frame. `RelayoutOrderer` walks a subtree once, caching every
/// layout-bearing node in breadth-first order, and then rebuilds them in
/// reverse order: deepest first, so each parent sees correctly sized children.
/// A final rebuild of the root pushes any change to the top of the subtree.
///
/// The orderer only holds non-owning handles. Nodes destroyed between
/// discovery and refresh are skipped.
///
/// ## Staleness
///
/// A refresh with the cached root does not re-walk the subtree. After adding,
/// removing or moving nodes below an unchanged root, call
/// [`invalidate`](Self::invalidate) so the next refresh discovers again.
///
/// ## Example
///
/// ```rust
/// use kurbo::Size;
/// use understory_relayout::{LayoutTree, LocalBox, RelayoutOrderer, StackLayout};
///
/// let mut tree = LayoutTree::new();
/// let root = tree.insert(None, LocalBox::stack(StackLayout::vertical())).unwrap();
/// let row = tree.insert(Some(root), LocalBox::stack(StackLayout::horizontal())).unwrap();
/// tree.insert(Some(row), LocalBox::leaf(Size::new(10.0, 4.0))).unwrap();
/// tree.insert(Some(row), LocalBox::leaf(Size::new(20.0, 6.0))).unwrap();
///
/// let mut orderer = RelayoutOrderer::new();
/// let report = orderer.refresh(&mut tree, Some(root));
///
/// assert!(report.rediscovered);
/// assert_eq!(report.triggers(), 3);
/// assert_eq!(tree.size(row), Some(Size::new(30.0, 6.0)));
/// assert_eq!(tree.size(root), Some(Size::new(30.0, 6.0)));
/// ```
#[derive(Clone, Debug)]
pub struct RelayoutOrderer<N>
where
    N: Copy + Eq + Hash,
{
    entries: Vec<LayoutEntry<N>>,
    root: Option<N>,
    queue: VecDeque<(N, u32)>,
    visited: HashSet<N>,
}

impl<N> Default for RelayoutOrderer<N>
where
    N: Copy + Eq + Hash,
{
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            root: None,
            queue: VecDeque::new(),
            visited: HashSet::new(),
        }
    }
}

impl<N> RelayoutOrderer<N>
where
    N: Copy + Eq + Hash,
{
    /// Creates an orderer with no cached structure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cache state.
    #[must_use]
    pub fn state(&self) -> CacheState {
        if self.root.is_some() {
            CacheState::Cached
        } else {
            CacheState::Uncached
        }
    }

    /// Returns `true` if a discovery has completed and not been invalidated.
    #[must_use]
    pub fn is_cached(&self) -> bool {
        self.root.is_some()
    }

    /// Root of the most recent discovery, if any.
    #[must_use]
    pub fn cached_root(&self) -> Option<N> {
        self.root
    }

    /// Cached layout-bearing nodes in discovery (breadth-first) order.
    #[must_use]
    pub fn entries(&self) -> &[LayoutEntry<N>] {
        &self.entries
    }

    /// Number of cached layout-bearing nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no layout-bearing nodes are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached nodes in the order a refresh rebuilds them (reverse discovery order).
    ///
    /// The final root rebuild is not part of this sequence.
    pub fn rebuild_order(&self) -> impl DoubleEndedIterator<Item = N> + '_ {
        self.entries.iter().rev().map(|entry| entry.node)
    }

    /// Drops the cached structure and returns to [`CacheState::Uncached`].
    ///
    /// Allocations are kept for the next discovery. A following
    /// [`refresh`](Self::refresh) with a root discovers again even if that
    /// root was the cached one.
    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.root = None;
    }

    /// Walks the subtree under `root` and caches its layout-bearing nodes.
    ///
    /// See [`discover_with_trace`](Self::discover_with_trace).
    pub fn discover<H>(&mut self, host: &H, root: N) -> Option<usize>
    where
        H: LayoutHost<Node = N>,
    {
        self.discover_with_trace(host, root, &mut ())
    }

    /// Walks the subtree under `root` and caches its layout-bearing nodes.
    ///
    /// - A stale `root` is a no-op: the previous cache is left untouched and
    ///   `None` is returned.
    /// - Otherwise the previous entries are replaced wholesale. `root` and all
    ///   of its live descendants are visited level by level using a FIFO queue,
    ///   and each node with a layout container is appended in visit order.
    /// - Each node is visited at most once, even if the host reports it twice.
    ///
    /// Returns the number of cached entries.
    pub fn discover_with_trace<H, T>(&mut self, host: &H, root: N, trace: &mut T) -> Option<usize>
    where
        H: LayoutHost<Node = N>,
        T: RelayoutTrace<N>,
    {
        if !host.is_alive(root) {
            return None;
        }

        self.entries.clear();
        self.root = Some(root);

        self.queue.clear();
        self.visited.clear();
        self.queue.push_back((root, 0));
        self.visited.insert(root);

        while let Some((node, depth)) = self.queue.pop_front() {
            if host.has_layout(node) {
                self.entries.push(LayoutEntry { node, depth });
                trace.discovered(node, depth);
            }
            for child in host.children(node) {
                if host.is_alive(child) && self.visited.insert(child) {
                    self.queue.push_back((child, depth + 1));
                }
            }
        }

        self.visited.clear();
        Some(self.entries.len())
    }

    /// Rebuilds the cached layout containers children-first.
    ///
    /// See [`refresh_with_trace`](Self::refresh_with_trace).
    pub fn refresh<H>(&mut self, host: &mut H, root: Option<N>) -> RefreshReport
    where
        H: LayoutHost<Node = N>,
    {
        self.refresh_with_trace(host, root, &mut ())
    }

    /// Rebuilds the cached layout containers children-first.
    ///
    /// 1. If `root` is given, alive, and not the cached root, the subtree is
    ///    discovered first. A stale `root` counts as absent.
    /// 2. If nothing is cached, nothing happens.
    /// 3. Cached entries are rebuilt in reverse discovery order. Entries that
    ///    went stale or lost their layout container are skipped.
    /// 4. The cached root is rebuilt once more, unless it went stale.
    pub fn refresh_with_trace<H, T>(
        &mut self,
        host: &mut H,
        root: Option<N>,
        trace: &mut T,
    ) -> RefreshReport
    where
        H: LayoutHost<Node = N>,
        T: RelayoutTrace<N>,
    {
        let mut report = RefreshReport::default();

        if let Some(root) = root.filter(|&root| host.is_alive(root)) {
            if self.root != Some(root) {
                report.rediscovered = self.discover_with_trace(&*host, root, trace).is_some();
            }
        }

        let Some(root) = self.root else {
            return report;
        };

        for entry in self.entries.iter().rev() {
            let node = entry.node;
            if !host.is_alive(node) {
                report.skipped += 1;
                trace.skipped(node, SkipReason::Stale);
            } else if !host.has_layout(node) {
                report.skipped += 1;
                trace.skipped(node, SkipReason::LayoutRemoved);
            } else {
                host.force_rebuild(node);
                report.rebuilt += 1;
                trace.rebuilt(node);
            }
        }

        if host.is_alive(root) {
            host.force_rebuild(root);
            report.root_rebuilt = true;
            trace.root_rebuilt(root);
        } else {
            trace.skipped(root, SkipReason::StaleRoot);
        }

        report
    }
}
