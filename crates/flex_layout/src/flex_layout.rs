//! # Flex layout
//!
//! A flexbox layout engine for trees of styled boxes, independent of any rendering toolkit.
//!
//! Nodes live in a [`LayoutTree`] arena and are addressed by [`NodeId`]. Each node carries a
//! [`Style`], an ordered list of children and a computed [`Layout`]. Calling
//! [`LayoutTree::calculate_layout`] on a root turns the styles and an available size into a
//! rectangle for every node of the subtree:
//!
//! ```ignore
//! let mut tree = LayoutTree::new();
//! let root = tree.new_node();
//! tree.node_mut(root)?.flex_direction(FlexDirection::Row).width(300.0).height(100.0);
//! let child = tree.new_node();
//! tree.node_mut(child)?.flex_grow(1.0);
//! tree.push_child(root, child)?;
//!
//! tree.calculate_layout(root, size(None, None), Direction::Ltr)?;
//! assert_eq!(tree.layout(child)?.width(), 300.0);
//! ```
//!
//! Leaves whose size depends on content, such as text, register a [`MeasureFunc`]. Results of
//! measurement queries are cached per node, so a clean subtree laid out again with the same
//! constraints does not invoke measure callbacks.

mod cache;
mod compute;
mod config;
mod error;
mod events;
mod geometry;
mod layout;
mod node;
mod print;
mod style;
mod tree;

pub use config::{CloneNodeFn, Config, ExperimentalFeature, LogLevel, Logger};
pub use error::{ErrorKind, LayoutError, LayoutResult};
pub use events::{LayoutEvents, LayoutPassReason};
pub use geometry::{Bounds, Point, Size, point, size};
pub use layout::{Layout, LayoutEdge};
pub use node::{BaselineFunc, DirtiedFunc, FreezeFunc, MeasureFunc, MeasureMode, NodeId, NodeType};
pub use print::PrintOptions;
pub use style::{
    Align, Direction, Display, Edge, EdgeValues, FlexDirection, Justify, Length, Overflow,
    PositionType, Style, Wrap,
};
pub use tree::{LayoutTree, NodeMut};
