//! Lays out externally owned boxes, such as widgets of a UI toolkit, with `flex_layout`.
//!
//! Every box added to a [`FlexHost`] gets a node of its own. Its flex properties are changed
//! through [`FlexHost::tree_mut`], and [`FlexHost::layout`] hands the computed rectangles back
//! to the boxes in host coordinates.

use anyhow::{Context as _, Result, anyhow};
use flex_layout::{
    Bounds, Config, Direction, LayoutEdge, LayoutTree, Length, NodeId, Point, Size, point, size,
};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A box whose position and size are managed by a [`FlexHost`].
pub trait HostedBox {
    /// The size the box would like to have.
    fn preferred_size(&self) -> Size<f32>;

    /// The smallest size the box can be shown at.
    ///
    /// Boxes that return `None` keep their preferred size as a fixed size.
    fn min_size(&self) -> Option<Size<f32>> {
        None
    }

    /// Places the box, in host coordinates.
    fn set_bounds(&mut self, bounds: Bounds<f32>);
}

/// The direction in which y coordinates grow in the host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum YAxis {
    #[default]
    Down,
    Up,
}

struct HostedEntry<B> {
    boxed: B,
    min_width_manual: bool,
    min_height_manual: bool,
}

/// Owns a layout tree whose nodes stand in for hosted boxes.
pub struct FlexHost<B> {
    tree: LayoutTree,
    root: NodeId,
    entries: FxHashMap<NodeId, HostedEntry<B>>,
    // Insertion order of `entries`.
    hosted: Vec<NodeId>,
    size: Size<f32>,
    y_axis: YAxis,
    preferred_size: Option<Size<f32>>,
    absolute_origins: FxHashMap<NodeId, Point<f32>>,
}

impl<B: HostedBox> FlexHost<B> {
    pub fn new(config: Arc<Config>) -> Self {
        let mut tree = LayoutTree::with_config(config);
        let root = tree.new_node();
        FlexHost {
            tree,
            root,
            entries: FxHashMap::default(),
            hosted: Vec::new(),
            size: size(0.0, 0.0),
            y_axis: YAxis::default(),
            preferred_size: None,
            absolute_origins: FxHashMap::default(),
        }
    }

    /// The node all top level boxes are added to.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &LayoutTree {
        &self.tree
    }

    /// Gives access to node styles. Any change may affect the preferred size, so the cached
    /// one is dropped.
    pub fn tree_mut(&mut self) -> &mut LayoutTree {
        self.preferred_size = None;
        &mut self.tree
    }

    pub fn add(&mut self, boxed: B) -> Result<NodeId> {
        let index = self.tree.child_count(self.root)?;
        self.add_as_child(self.root, boxed, index)
    }

    pub fn add_at(&mut self, boxed: B, index: usize) -> Result<NodeId> {
        self.add_as_child(self.root, boxed, index)
    }

    /// Adds a node without a box, to group other nodes.
    pub fn add_empty(&mut self) -> Result<NodeId> {
        let index = self.tree.child_count(self.root)?;
        self.add_empty_as_child(self.root, index)
    }

    pub fn add_as_child(&mut self, parent: NodeId, boxed: B, index: usize) -> Result<NodeId> {
        let node = self.insert_node(parent, index)?;
        let mut style = self.tree.node_mut(node)?;
        match boxed.min_size() {
            Some(min_size) => {
                style.min_width(min_size.width).min_height(min_size.height);
            }
            None => {
                let preferred = boxed.preferred_size();
                style.width(preferred.width).height(preferred.height);
            }
        }

        self.entries.insert(
            node,
            HostedEntry {
                boxed,
                min_width_manual: false,
                min_height_manual: false,
            },
        );
        self.hosted.push(node);
        Ok(node)
    }

    pub fn add_empty_as_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        self.insert_node(parent, index)
    }

    fn insert_node(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let node = self.tree.new_node();
        if let Err(error) = self.tree.insert_child(parent, node, index) {
            self.tree.free(node)?;
            return Err(error).with_context(|| format!("inserting node at index {index}"));
        }
        self.preferred_size = None;
        Ok(node)
    }

    /// Removes `node` and everything nested in it, returning the boxes that were hosted by
    /// the removed nodes.
    pub fn remove(&mut self, node: NodeId) -> Result<Vec<B>> {
        if node == self.root {
            return Err(anyhow!("the root node of a host cannot be removed"));
        }
        if let Some(owner) = self.tree.owner(node)? {
            self.tree
                .remove_child(owner, node)
                .context("detaching removed node")?;
        }

        let mut removed = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            stack.extend(self.tree.children(id)?.iter().copied());
            if let Some(entry) = self.entries.remove(&id) {
                removed.push(entry.boxed);
            }
        }
        self.hosted.retain(|id| self.entries.contains_key(id));
        self.tree.free_recursive(node)?;
        self.absolute_origins.clear();
        self.preferred_size = None;
        Ok(removed)
    }

    /// Removes every node below the root.
    pub fn clear_children(&mut self) -> Result<()> {
        for child in self.tree.children(self.root)?.to_vec() {
            self.tree.remove_child(self.root, child)?;
            self.tree.free_recursive(child)?;
        }
        self.entries.clear();
        self.hosted.clear();
        self.absolute_origins.clear();
        self.preferred_size = None;
        Ok(())
    }

    /// Sets the min width of `node` and stops copying the hosted box's min width into it.
    pub fn set_min_width_override(
        &mut self,
        node: NodeId,
        width: impl Into<Length>,
    ) -> Result<()> {
        self.tree_mut().node_mut(node)?.min_width(width);
        if let Some(entry) = self.entries.get_mut(&node) {
            entry.min_width_manual = true;
        }
        Ok(())
    }

    /// Sets the min height of `node` and stops copying the hosted box's min height into it.
    pub fn set_min_height_override(
        &mut self,
        node: NodeId,
        height: impl Into<Length>,
    ) -> Result<()> {
        self.tree_mut().node_mut(node)?.min_height(height);
        if let Some(entry) = self.entries.get_mut(&node) {
            entry.min_height_manual = true;
        }
        Ok(())
    }

    /// Resumes copying the hosted box's min size into `node` on the next layout.
    pub fn clear_min_size_overrides(&mut self, node: NodeId) -> Result<()> {
        let entry = self
            .entries
            .get_mut(&node)
            .with_context(|| format!("{node:?} does not host a box"))?;
        entry.min_width_manual = false;
        entry.min_height_manual = false;
        self.preferred_size = None;
        Ok(())
    }

    pub fn size(&self) -> Size<f32> {
        self.size
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        let new_size = size(width, height);
        if self.size != new_size {
            self.size = new_size;
            self.preferred_size = None;
        }
    }

    pub fn y_axis(&self) -> YAxis {
        self.y_axis
    }

    pub fn set_y_axis(&mut self, y_axis: YAxis) {
        self.y_axis = y_axis;
    }

    /// Lays out the tree at the host's size and moves every hosted box into place.
    ///
    /// Boxes receive their node's content box: the node's padding is left around them.
    pub fn layout(&mut self) -> Result<()> {
        self.propagate_min_sizes()?;
        self.calculate(size(Some(self.size.width), Some(self.size.height)))?;

        for index in 0..self.hosted.len() {
            let node = self.hosted[index];
            let origin = self.absolute_origin(node)?;
            let layout = self.tree.layout(node)?;
            let padding_left = layout.padding(LayoutEdge::Left);
            let padding_top = layout.padding(LayoutEdge::Top);
            let padding_right = layout.padding(LayoutEdge::Right);
            let padding_bottom = layout.padding(LayoutEdge::Bottom);
            let width = layout.width();
            let height = layout.height();

            let y = match self.y_axis {
                YAxis::Down => origin.y + padding_top,
                YAxis::Up => self.size.height - origin.y - height + padding_bottom,
            };
            let bounds = Bounds {
                origin: point(origin.x + padding_left, y),
                size: size(
                    width - padding_left - padding_right,
                    height - padding_top - padding_bottom,
                ),
            };
            if let Some(entry) = self.entries.get_mut(&node) {
                entry.boxed.set_bounds(bounds);
            }
        }
        Ok(())
    }

    fn propagate_min_sizes(&mut self) -> Result<()> {
        for node in &self.hosted {
            let Some(entry) = self.entries.get(node) else {
                continue;
            };
            let Some(min_size) = entry.boxed.min_size() else {
                continue;
            };
            let layout = self.tree.layout(*node)?;
            let padding_width =
                layout.padding(LayoutEdge::Left) + layout.padding(LayoutEdge::Right);
            let padding_height =
                layout.padding(LayoutEdge::Top) + layout.padding(LayoutEdge::Bottom);
            let (width_manual, height_manual) = (entry.min_width_manual, entry.min_height_manual);

            let mut style = self.tree.node_mut(*node)?;
            if !width_manual {
                style.min_width(min_size.width + padding_width);
            }
            if !height_manual {
                style.min_height(min_size.height + padding_height);
            }
        }
        Ok(())
    }

    fn calculate(&mut self, available_space: Size<Option<f32>>) -> Result<()> {
        self.absolute_origins.clear();
        self.tree
            .calculate_layout(self.root, available_space, Direction::Ltr)
            .with_context(|| format!("laying out host at {available_space:?}"))?;
        log::debug!(
            "laid out {} hosted boxes at {available_space:?}",
            self.hosted.len()
        );
        Ok(())
    }

    /// The smallest width at the host's height and the smallest height at the host's width
    /// that fit every hosted box. Cached until the tree or the host size changes.
    ///
    /// The tree is left laid out at the host's size, so [`Self::layout_bounds`] keeps
    /// reporting the geometry of the last [`Self::layout`].
    pub fn preferred_size(&mut self) -> Result<Size<f32>> {
        if let Some(preferred_size) = self.preferred_size {
            return Ok(preferred_size);
        }

        self.calculate(size(Some(0.0), Some(self.size.height)))?;
        let mut width: f32 = 0.0;
        for index in 0..self.hosted.len() {
            let node = self.hosted[index];
            let right = self.absolute_origin(node)?.x + self.tree.layout(node)?.width();
            width = width.max(right);
        }

        self.calculate(size(Some(self.size.width), Some(0.0)))?;
        let mut height: f32 = 0.0;
        for index in 0..self.hosted.len() {
            let node = self.hosted[index];
            let bottom = self.absolute_origin(node)?.y + self.tree.layout(node)?.height();
            height = height.max(bottom);
        }
        self.calculate(size(Some(self.size.width), Some(self.size.height)))?;

        let preferred_size = size(width, height);
        self.preferred_size = Some(preferred_size);
        Ok(preferred_size)
    }

    /// Bounds of `node` from the last layout, relative to the host's top left corner.
    pub fn layout_bounds(&mut self, node: NodeId) -> Result<Bounds<f32>> {
        let origin = self.absolute_origin(node)?;
        let layout = self.tree.layout(node)?;
        Ok(Bounds {
            origin,
            size: layout.size(),
        })
    }

    fn absolute_origin(&mut self, node: NodeId) -> Result<Point<f32>> {
        if let Some(origin) = self.absolute_origins.get(&node) {
            return Ok(*origin);
        }

        let layout = self.tree.layout(node)?;
        let mut origin = point(layout.left(), layout.top());
        if let Some(owner) = self.tree.owner(node)? {
            origin += self.absolute_origin(owner)?;
        }
        self.absolute_origins.insert(node, origin);
        Ok(origin)
    }

    pub fn boxed(&self, node: NodeId) -> Option<&B> {
        self.entries.get(&node).map(|entry| &entry.boxed)
    }

    pub fn boxed_mut(&mut self, node: NodeId) -> Option<&mut B> {
        self.entries.get_mut(&node).map(|entry| &mut entry.boxed)
    }

    /// Nodes that host a box, in the order they were added.
    pub fn hosted_nodes(&self) -> &[NodeId] {
        &self.hosted
    }
}
