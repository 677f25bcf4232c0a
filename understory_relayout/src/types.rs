// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the layout tree: node identifiers, flags, and local layout data.

use kurbo::Size;

/// Identifier for a node in a [`LayoutTree`](crate::LayoutTree).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove, the slot is freed; any existing `NodeId` for it is now stale.
/// - On reuse of a freed slot, its generation is incremented, producing a new, distinct `NodeId`.
///
/// Stale `NodeId`s never alias a different live node because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn generation(self) -> u32 {
        self.1
    }
}

bitflags::bitflags! {
    /// Node flags controlling participation in the parent's layout.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeFlags: u8 {
        /// Node is active (shown, and measured by its parent container).
        const ACTIVE        = 0b0000_0001;
        /// Node is shown but excluded from its parent container's measurement.
        const IGNORE_LAYOUT = 0b0000_0010;
    }
}

impl Default for NodeFlags {
    fn default() -> Self {
        Self::ACTIVE
    }
}

/// Main axis of a [`StackLayout`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Axis {
    /// Children are placed left to right.
    Horizontal,
    /// Children are placed top to bottom.
    #[default]
    Vertical,
}

impl Axis {
    /// Split a size into `(main, cross)` extents along this axis.
    #[must_use]
    pub fn split(self, size: Size) -> (f64, f64) {
        match self {
            Self::Horizontal => (size.width, size.height),
            Self::Vertical => (size.height, size.width),
        }
    }

    /// Build a size from `(main, cross)` extents along this axis.
    #[must_use]
    pub fn pack(self, main: f64, cross: f64) -> Size {
        match self {
            Self::Horizontal => Size::new(main, cross),
            Self::Vertical => Size::new(cross, main),
        }
    }
}

/// An auto-sizing stack container.
///
/// A stack sizes itself to fit its measured children: their extents are
/// summed along the main axis with `spacing` between neighbours, the largest
/// cross extent wins, and `padding` is added on every side.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct StackLayout {
    /// Main axis.
    pub axis: Axis,
    /// Gap between adjacent children along the main axis.
    pub spacing: f64,
    /// Inset applied on all four sides.
    pub padding: f64,
}

impl StackLayout {
    /// A vertical stack with no spacing or padding.
    #[must_use]
    pub fn vertical() -> Self {
        Self {
            axis: Axis::Vertical,
            ..Self::default()
        }
    }

    /// A horizontal stack with no spacing or padding.
    #[must_use]
    pub fn horizontal() -> Self {
        Self {
            axis: Axis::Horizontal,
            ..Self::default()
        }
    }

    /// Returns this layout with the given spacing.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    /// Returns this layout with the given padding.
    #[must_use]
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Size of a container holding children of the given sizes.
    #[must_use]
    pub fn measure(&self, children: impl IntoIterator<Item = Size>) -> Size {
        let mut main = 0.0;
        let mut cross: f64 = 0.0;
        let mut count = 0_usize;
        for size in children {
            let (m, c) = self.axis.split(size);
            main += m;
            cross = cross.max(c);
            count += 1;
        }
        if count > 1 {
            main += self.spacing * (count - 1) as f64;
        }
        let inset = 2.0 * self.padding;
        self.axis.pack(main + inset, cross + inset)
    }
}

/// Local data for a node.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalBox {
    /// Size of a leaf. Ignored while `layout` is set.
    pub preferred_size: Size,
    /// Layout container attached to this node, if any.
    pub layout: Option<StackLayout>,
    /// Participation flags.
    pub flags: NodeFlags,
}

impl LocalBox {
    /// A leaf with a fixed preferred size.
    #[must_use]
    pub fn leaf(preferred_size: Size) -> Self {
        Self {
            preferred_size,
            ..Self::default()
        }
    }

    /// A node carrying a stack container.
    #[must_use]
    pub fn stack(layout: StackLayout) -> Self {
        Self {
            layout: Some(layout),
            ..Self::default()
        }
    }

    /// Returns this box with the given flags.
    #[must_use]
    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }
}
