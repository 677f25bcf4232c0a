// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_relayout --heading-base-level=0

//! Understory Relayout: bottom-up forced rebuilds for nested layout containers.
//!
//! Many retained UI toolkits rebuild auto-sizing layout containers top-down.
//! When containers are nested, a parent measures its children before they have
//! been re-measured, so it keeps a stale size until a later pass. The classic
//! symptom is a panel that lays out wrongly the first time one of its children
//! is shown or hidden, and correctly the second time.
//!
//! This crate fixes the order rather than the layout. [`RelayoutOrderer`]
//! walks a subtree once, breadth-first, caching every node that carries a
//! layout container. A refresh then forces rebuilds in reverse discovery
//! order, so every container is rebuilt before any of its container
//! ancestors, and finishes with one more rebuild of the root.
//!
//! It does not measure or arrange anything itself; the host framework does,
//! through the [`LayoutHost`] trait.
//!
//! ## API overview
//!
//! - [`LayoutHost`]: the host seam (children, layout capability, liveness, force rebuild).
//! - [`RelayoutOrderer`]: caches the structure and issues rebuilds.
//!   - [`RelayoutOrderer::discover`] → number of cached layout nodes.
//!   - [`RelayoutOrderer::refresh`] → [`RefreshReport`].
//!   - [`RelayoutOrderer::invalidate`] after structural edits below an unchanged root.
//! - [`RelayoutTrace`] / [`RelayoutLog`]: optional tracing of every discovery and rebuild.
//! - [`LayoutTree`]: a small generational tree of [`StackLayout`] containers that
//!   implements [`LayoutHost`], for tests, tools, and hosts without their own tree.
//!
//! ## Example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_relayout::{LayoutTree, LocalBox, RelayoutOrderer, StackLayout};
//!
//! let mut tree = LayoutTree::new();
//! let root = tree.insert(None, LocalBox::stack(StackLayout::vertical())).unwrap();
//! let panel = tree
//!     .insert(Some(root), LocalBox::stack(StackLayout::vertical().with_spacing(4.0)))
//!     .unwrap();
//! let item = tree.insert(Some(panel), LocalBox::leaf(Size::new(40.0, 10.0))).unwrap();
//! tree.insert(Some(panel), LocalBox::leaf(Size::new(60.0, 10.0))).unwrap();
//!
//! let mut orderer = RelayoutOrderer::new();
//! orderer.refresh(&mut tree, Some(root));
//! assert_eq!(tree.size(root), Some(Size::new(60.0, 24.0)));
//!
//! // Hiding an item shrinks both containers in a single refresh.
//! tree.set_active(item, false).unwrap();
//! orderer.refresh(&mut tree, None);
//! assert_eq!(tree.size(panel), Some(Size::new(60.0, 10.0)));
//! assert_eq!(tree.size(root), Some(Size::new(60.0, 10.0)));
//! ```
//!
//! ## Threading
//!
//! Everything here is synchronous and bounded by the subtree size. Rebuild
//! primitives are normally only safe on the UI thread; keep the orderer there.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod host;
mod orderer;
mod trace;
mod tree;
mod types;

pub use host::LayoutHost;
pub use orderer::{CacheState, LayoutEntry, RefreshReport, RelayoutOrderer};
pub use trace::{RelayoutLog, RelayoutTrace, SkipReason, TraceEvent};
pub use tree::{LayoutTree, TreeError};
pub use types::{Axis, LocalBox, NodeFlags, NodeId, StackLayout};
