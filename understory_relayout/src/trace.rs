// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observability hooks for discovery and refresh.
//!
//! The orderer does not store a history of what it did. When an embedder wants
//! to answer "which containers were rebuilt, and in what order?", it can pass a
//! [`RelayoutTrace`] sink to
//! [`RelayoutOrderer::refresh_with_trace`](crate::RelayoutOrderer::refresh_with_trace)
//! or [`RelayoutOrderer::discover_with_trace`](crate::RelayoutOrderer::discover_with_trace).
//!
//! [`RelayoutLog`] is a small recorder that keeps every event in order.

use alloc::vec::Vec;

/// Why a node was passed over during a refresh.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum SkipReason {
    /// The cached node has been destroyed since discovery.
    Stale,
    /// The cached node is alive but no longer carries a layout container.
    LayoutRemoved,
    /// The cached root has been destroyed, so the final root rebuild was skipped.
    StaleRoot,
}

/// A callback sink for relayout tracing.
pub trait RelayoutTrace<N> {
    /// Called for each layout-bearing node found during discovery, in discovery order.
    ///
    /// `depth` is the distance from the discovery root (the root itself is `0`).
    fn discovered(&mut self, node: N, depth: u32);

    /// Called after the rebuild primitive ran on a cached node.
    fn rebuilt(&mut self, node: N);

    /// Called when a node is skipped instead of rebuilt.
    fn skipped(&mut self, node: N, reason: SkipReason);

    /// Called after the final rebuild of the refresh root.
    fn root_rebuilt(&mut self, node: N);
}

impl<N> RelayoutTrace<N> for () {
    #[inline]
    fn discovered(&mut self, _node: N, _depth: u32) {}

    #[inline]
    fn rebuilt(&mut self, _node: N) {}

    #[inline]
    fn skipped(&mut self, _node: N, _reason: SkipReason) {}

    #[inline]
    fn root_rebuilt(&mut self, _node: N) {}
}

/// One recorded step of a discovery or refresh.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TraceEvent<N> {
    /// A layout-bearing node was appended to the cache.
    Discovered {
        /// The discovered node.
        node: N,
        /// Distance from the discovery root.
        depth: u32,
    },
    /// A cached node was rebuilt.
    Rebuilt(N),
    /// A node was skipped.
    Skipped {
        /// The skipped node.
        node: N,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// The refresh root received its final rebuild.
    RootRebuilt(N),
}

/// Records every trace event in the order it was reported.
#[derive(Clone, Debug)]
pub struct RelayoutLog<N> {
    events: Vec<TraceEvent<N>>,
}

impl<N> Default for RelayoutLog<N> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<N: Copy> RelayoutLog<N> {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent<N>] {
        &self.events
    }

    /// Every node the rebuild primitive ran on, in call order.
    ///
    /// This includes the final root rebuild.
    #[must_use]
    pub fn rebuilt_nodes(&self) -> Vec<N> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                TraceEvent::Rebuilt(node) | TraceEvent::RootRebuilt(node) => Some(node),
                _ => None,
            })
            .collect()
    }

    /// Nodes reported during discovery, in discovery order.
    #[must_use]
    pub fn discovered_nodes(&self) -> Vec<N> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                TraceEvent::Discovered { node, .. } => Some(node),
                _ => None,
            })
            .collect()
    }

    /// Clears all recorded events.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<N> RelayoutTrace<N> for RelayoutLog<N> {
    fn discovered(&mut self, node: N, depth: u32) {
        self.events.push(TraceEvent::Discovered { node, depth });
    }

    fn rebuilt(&mut self, node: N) {
        self.events.push(TraceEvent::Rebuilt(node));
    }

    fn skipped(&mut self, node: N, reason: SkipReason) {
        self.events.push(TraceEvent::Skipped { node, reason });
    }

    fn root_rebuilt(&mut self, node: N) {
        self.events.push(TraceEvent::RootRebuilt(node));
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use alloc::vec;

    #[test]
    fn rebuilt_nodes_include_root_rebuild() {
        let mut log = RelayoutLog::new();
        log.discovered('a', 0);
        log.rebuilt('b');
        log.skipped('c', SkipReason::Stale);
        log.rebuilt('a');
        log.root_rebuilt('a');

        assert_eq!(log.rebuilt_nodes(), vec!['b', 'a', 'a']);
        assert_eq!(log.discovered_nodes(), vec!['a']);
        assert_eq!(
            log.events()[2],
            TraceEvent::Skipped {
                node: 'c',
                reason: SkipReason::Stale
            }
        );

        log.clear();
        assert!(log.events().is_empty());
    }
}
