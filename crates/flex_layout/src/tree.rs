use crate::{
    Config,
    error::{LayoutError, LayoutResult},
    events::LayoutEvents,
    geometry::Size,
    layout::{Layout, LayoutState},
    node::{BaselineFunc, DirtiedFunc, FreezeFunc, MeasureFunc, NodeData, NodeId, NodeType},
    style::{
        Align, Direction, Display, Edge, FlexDirection, Justify, Length, Overflow, PositionType,
        Style, Wrap,
    },
};
use slotmap::SlotMap;
use std::{any::Any, sync::Arc};

/// An arena of layout nodes.
///
/// Nodes are addressed by [`NodeId`]. A node is owned by the tree; the parent/child
/// relationship between nodes is expressed through child lists and a non-owning back
/// reference to the owner, so a node can be detached and reattached freely.
pub struct LayoutTree {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    pub(crate) config: Arc<Config>,
    pub(crate) generation: u32,
    pub(crate) events: LayoutEvents,
}

impl Default for LayoutTree {
    fn default() -> Self {
        LayoutTree::new()
    }
}

impl LayoutTree {
    pub fn new() -> Self {
        LayoutTree::with_config(Config::default_shared())
    }

    pub fn with_config(config: Arc<Config>) -> Self {
        LayoutTree {
            nodes: SlotMap::with_key(),
            config,
            generation: 0,
            events: LayoutEvents::default(),
        }
    }

    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Creates a detached node with the default style of the tree's config.
    pub fn new_node(&mut self) -> NodeId {
        self.nodes.insert(NodeData::new(self.config.clone()))
    }

    /// Creates a detached node that uses its own config instead of the tree's.
    pub fn new_node_with_config(&mut self, config: Arc<Config>) -> NodeId {
        self.nodes.insert(NodeData::new(config))
    }

    pub fn new_node_with_style(&mut self, style: Style) -> NodeId {
        let mut data = NodeData::new(self.config.clone());
        data.style = style;
        self.nodes.insert(data)
    }

    /// Counters from the most recent [`calculate_layout`](Self::calculate_layout).
    pub fn events(&self) -> &LayoutEvents {
        &self.events
    }

    pub(crate) fn data(&self, id: NodeId) -> LayoutResult<&NodeData> {
        self.nodes.get(id).ok_or(LayoutError::InvalidNode(id))
    }

    fn data_mut(&mut self, id: NodeId) -> LayoutResult<&mut NodeData> {
        self.nodes.get_mut(id).ok_or(LayoutError::InvalidNode(id))
    }

    /// Style mutation handle for `id`. Every setter dirties the node and its owners when it
    /// changes a value.
    pub fn node_mut(&mut self, id: NodeId) -> LayoutResult<NodeMut<'_>> {
        self.data(id)?;
        Ok(NodeMut { tree: self, id })
    }

    pub fn style(&self, id: NodeId) -> LayoutResult<&Style> {
        Ok(&self.data(id)?.style)
    }

    pub fn set_style(&mut self, id: NodeId, style: Style) -> LayoutResult<()> {
        let node = self.data_mut(id)?;
        if node.style != style {
            node.style = style;
            self.mark_dirty_and_propagate(id);
        }
        Ok(())
    }

    /// Copies the style of `src` onto `dst`, dirtying `dst` only when they differ.
    pub fn copy_style(&mut self, dst: NodeId, src: NodeId) -> LayoutResult<()> {
        let style = self.data(src)?.style.clone();
        self.set_style(dst, style)
    }

    pub fn layout(&self, id: NodeId) -> LayoutResult<&Layout> {
        Ok(&self.data(id)?.layout)
    }

    pub fn children(&self, id: NodeId) -> LayoutResult<&[NodeId]> {
        Ok(&self.data(id)?.children)
    }

    pub fn child_count(&self, id: NodeId) -> LayoutResult<usize> {
        Ok(self.data(id)?.children.len())
    }

    pub fn child_at(&self, id: NodeId, index: usize) -> LayoutResult<Option<NodeId>> {
        Ok(self.data(id)?.children.get(index).copied())
    }

    pub fn owner(&self, id: NodeId) -> LayoutResult<Option<NodeId>> {
        Ok(self.data(id)?.owner)
    }

    pub fn index_of(&self, owner: NodeId, child: NodeId) -> LayoutResult<Option<usize>> {
        Ok(self
            .data(owner)?
            .children
            .iter()
            .position(|candidate| *candidate == child))
    }

    /// Attaches `child` to `owner` at `index`.
    ///
    /// The child must be detached, must not be `owner` or one of its owners, and the owner
    /// must not measure itself.
    pub fn insert_child(&mut self, owner: NodeId, child: NodeId, index: usize) -> LayoutResult<()> {
        self.check_attachable(owner, child)?;
        let owner_data = self.data(owner)?;
        if owner_data.measure.is_some() {
            return Err(LayoutError::MeasuredNodeWithChildren(owner));
        }
        let len = owner_data.children.len();
        if index > len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }

        self.nodes[owner].children.insert(index, child);
        self.nodes[child].owner = Some(owner);
        self.mark_dirty_and_propagate(owner);
        Ok(())
    }

    pub fn push_child(&mut self, owner: NodeId, child: NodeId) -> LayoutResult<()> {
        let len = self.child_count(owner)?;
        self.insert_child(owner, child, len)
    }

    /// Detaches and returns the child at `index`. The child keeps its style and can be
    /// inserted elsewhere.
    pub fn remove_child_at(&mut self, owner: NodeId, index: usize) -> LayoutResult<NodeId> {
        let owner_data = self.data_mut(owner)?;
        let len = owner_data.children.len();
        if index >= len {
            return Err(LayoutError::IndexOutOfRange { index, len });
        }
        let child = owner_data.children.remove(index);
        self.detach(owner, child);
        self.mark_dirty_and_propagate(owner);
        Ok(child)
    }

    /// Removes `child` from `owner` if it is one of its children.
    pub fn remove_child(&mut self, owner: NodeId, child: NodeId) -> LayoutResult<()> {
        self.data(child)?;
        if let Some(index) = self.index_of(owner, child)? {
            self.remove_child_at(owner, index)?;
        }
        Ok(())
    }

    pub fn remove_all_children(&mut self, owner: NodeId) -> LayoutResult<()> {
        let children = std::mem::take(&mut self.data_mut(owner)?.children);
        if children.is_empty() {
            return Ok(());
        }
        for child in children {
            self.detach(owner, child);
        }
        self.mark_dirty_and_propagate(owner);
        Ok(())
    }

    /// Puts `child` in the slot at `index`, detaching whichever node was there.
    pub fn swap_child(&mut self, owner: NodeId, child: NodeId, index: usize) -> LayoutResult<()> {
        self.check_attachable(owner, child)?;
        let owner_data = self.data_mut(owner)?;
        let len = owner_data.children.len();
        let Some(slot) = owner_data.children.get_mut(index) else {
            return Err(LayoutError::IndexOutOfRange { index, len });
        };
        let previous = std::mem::replace(slot, child);
        self.detach(owner, previous);
        self.nodes[child].owner = Some(owner);
        self.mark_dirty_and_propagate(owner);
        Ok(())
    }

    /// A detached node can go under `owner` unless that would close a cycle.
    fn check_attachable(&self, owner: NodeId, child: NodeId) -> LayoutResult<()> {
        if let Some(current) = self.data(child)?.owner {
            return Err(LayoutError::AlreadyOwned {
                child,
                owner: current,
            });
        }
        let mut ancestor = Some(owner);
        while let Some(id) = ancestor {
            if id == child {
                return Err(LayoutError::CyclicChild { child, owner });
            }
            ancestor = self.data(id)?.owner;
        }
        Ok(())
    }

    fn detach(&mut self, owner: NodeId, child: NodeId) {
        if let Some(data) = self.nodes.get_mut(child) {
            if data.owner == Some(owner) {
                data.layout = Layout::default();
                data.state = LayoutState::default();
                data.owner = None;
            }
        }
    }

    /// Releases a node. It is removed from its owner and its children become detached.
    pub fn free(&mut self, id: NodeId) -> LayoutResult<()> {
        let data = self.nodes.remove(id).ok_or(LayoutError::InvalidNode(id))?;
        if let Some(owner) = data.owner {
            if let Some(owner_data) = self.nodes.get_mut(owner) {
                owner_data.children.retain(|child| *child != id);
                self.mark_dirty_and_propagate(owner);
            }
        }
        for child in data.children {
            if let Some(child) = self.nodes.get_mut(child) {
                child.owner = None;
            }
        }
        Ok(())
    }

    /// Releases a node and every descendant it owns.
    pub fn free_recursive(&mut self, id: NodeId) -> LayoutResult<()> {
        let mut stack = vec![id];
        let mut to_free = Vec::new();
        while let Some(id) = stack.pop() {
            let data = self.data(id)?;
            stack.extend(
                data.children
                    .iter()
                    .copied()
                    .filter(|child| self.nodes.get(*child).and_then(|c| c.owner) == Some(id)),
            );
            to_free.push(id);
        }
        // Children first, so that freeing the root is the only step that touches its owner.
        for id in to_free.into_iter().rev() {
            self.free(id)?;
        }
        Ok(())
    }

    /// Restores a detached, childless node to the state of a freshly created one.
    pub fn reset(&mut self, id: NodeId) -> LayoutResult<()> {
        let data = self.data_mut(id)?;
        if !data.children.is_empty() || data.owner.is_some() {
            return Err(LayoutError::AttachedNode(id));
        }
        *data = NodeData::new(data.config.clone());
        Ok(())
    }

    /// Copies a node without its children. The copy is detached and shares the source's
    /// callbacks and user data.
    pub fn clone_without_children(&mut self, id: NodeId) -> LayoutResult<NodeId> {
        let copy = self.data(id)?.detached_copy();
        Ok(self.nodes.insert(copy))
    }

    /// Copies a whole subtree. Every copy is owned by the copy of its source's owner, and the
    /// config's clone hook gets to adjust the style of each copy.
    pub fn clone_with_children(&mut self, id: NodeId) -> LayoutResult<NodeId> {
        self.clone_subtree(id, true)
    }

    pub(crate) fn clone_subtree(&mut self, id: NodeId, apply_hook: bool) -> LayoutResult<NodeId> {
        let root = self.clone_node(id, None, 0, apply_hook)?;
        let mut stack = vec![(id, root)];
        while let Some((source, copy)) = stack.pop() {
            let children = self.nodes[source].children.clone();
            for (index, child) in children.into_iter().enumerate() {
                let child_copy = self.clone_node(child, Some(copy), index, apply_hook)?;
                self.nodes[child_copy].owner = Some(copy);
                self.nodes[copy].children.push(child_copy);
                stack.push((child, child_copy));
            }
        }
        Ok(root)
    }

    fn clone_node(
        &mut self,
        source: NodeId,
        owner: Option<NodeId>,
        index: usize,
        apply_hook: bool,
    ) -> LayoutResult<NodeId> {
        let mut copy = self.data(source)?.detached_copy();
        if apply_hook {
            if let Some(hook) = copy.config.clone_node_hook().cloned() {
                hook(source, owner, index, &mut copy.style);
            }
        }
        Ok(self.nodes.insert(copy))
    }

    pub fn is_dirty(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.data(id)?.is_dirty)
    }

    /// Forces a self-measuring node to be measured again on the next layout.
    ///
    /// Other nodes are dirtied by changing their style.
    pub fn mark_dirty(&mut self, id: NodeId) -> LayoutResult<()> {
        if self.data(id)?.measure.is_none() {
            return Err(LayoutError::MeasureFunctionUndefined(id));
        }
        self.mark_dirty_and_propagate(id);
        Ok(())
    }

    pub fn mark_dirty_all_descendants(&mut self, id: NodeId) -> LayoutResult<()> {
        self.data(id)?;
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let data = &mut self.nodes[id];
            data.is_dirty = true;
            stack.extend(data.children.iter().copied());
        }
        Ok(())
    }

    pub(crate) fn mark_dirty_and_propagate(&mut self, id: NodeId) {
        let mut current = Some(id);
        while let Some(id) = current {
            let Some(data) = self.nodes.get_mut(id) else {
                break;
            };
            if data.is_dirty {
                break;
            }
            data.is_dirty = true;
            data.state.computed_flex_basis = f32::NAN;
            current = data.owner;
            if let Some(dirtied) = data.dirtied.clone() {
                dirtied(id);
            }
        }
    }

    /// Whether the layout of `id` changed since [`mark_layout_seen`](Self::mark_layout_seen)
    /// was last called for it.
    pub fn has_new_layout(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.data(id)?.has_new_layout)
    }

    pub fn mark_layout_seen(&mut self, id: NodeId) -> LayoutResult<()> {
        self.data_mut(id)?.has_new_layout = false;
        Ok(())
    }

    /// Installs or removes the measure callback. Nodes with a measure callback are text
    /// nodes and cannot have children.
    pub fn set_measure_func(
        &mut self,
        id: NodeId,
        measure: Option<MeasureFunc>,
    ) -> LayoutResult<()> {
        let data = self.data_mut(id)?;
        match measure {
            Some(measure) => {
                if !data.children.is_empty() {
                    return Err(LayoutError::MeasuredNodeWithChildren(id));
                }
                data.measure = Some(measure);
                data.node_type = NodeType::Text;
            }
            None => {
                data.measure = None;
                data.node_type = NodeType::Default;
            }
        }
        Ok(())
    }

    pub fn has_measure_func(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.data(id)?.measure.is_some())
    }

    pub fn set_baseline_func(
        &mut self,
        id: NodeId,
        baseline: Option<BaselineFunc>,
    ) -> LayoutResult<()> {
        self.data_mut(id)?.baseline = baseline;
        Ok(())
    }

    pub fn has_baseline_func(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.data(id)?.baseline.is_some())
    }

    pub fn set_dirtied_func(
        &mut self,
        id: NodeId,
        dirtied: Option<DirtiedFunc>,
    ) -> LayoutResult<()> {
        self.data_mut(id)?.dirtied = dirtied;
        Ok(())
    }

    pub fn set_freeze_func(&mut self, id: NodeId, freeze: Option<FreezeFunc>) -> LayoutResult<()> {
        self.data_mut(id)?.freeze = freeze;
        Ok(())
    }

    /// Attaches arbitrary user data to a node.
    pub fn set_context(
        &mut self,
        id: NodeId,
        context: Option<Arc<dyn Any + Send + Sync>>,
    ) -> LayoutResult<()> {
        self.data_mut(id)?.context = context;
        Ok(())
    }

    pub fn context<T: Any>(&self, id: NodeId) -> LayoutResult<Option<&T>> {
        Ok(self
            .data(id)?
            .context
            .as_deref()
            .and_then(|context| context.downcast_ref::<T>()))
    }

    pub fn node_type(&self, id: NodeId) -> LayoutResult<NodeType> {
        Ok(self.data(id)?.node_type)
    }

    pub fn set_node_type(&mut self, id: NodeId, node_type: NodeType) -> LayoutResult<()> {
        self.data_mut(id)?.node_type = node_type;
        Ok(())
    }

    pub fn is_reference_baseline(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.data(id)?.is_reference_baseline)
    }

    pub fn set_reference_baseline(&mut self, id: NodeId, reference: bool) -> LayoutResult<()> {
        let data = self.data_mut(id)?;
        if data.is_reference_baseline != reference {
            data.is_reference_baseline = reference;
            self.mark_dirty_and_propagate(id);
        }
        Ok(())
    }

    /// Whether the last layout of `id` would have differed without the legacy stretch
    /// behaviour. Only computed when the config asks for the comparison.
    pub fn does_legacy_stretch_flag_affect_layout(&self, id: NodeId) -> LayoutResult<bool> {
        Ok(self.data(id)?.state.does_legacy_stretch_flag_affect_layout)
    }
}

/// Chainable style setters for one node, obtained from [`LayoutTree::node_mut`].
pub struct NodeMut<'a> {
    tree: &'a mut LayoutTree,
    id: NodeId,
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn style(&self) -> &Style {
        &self.tree.nodes[self.id].style
    }

    fn update(&mut self, f: impl FnOnce(&mut Style)) -> &mut Self {
        let style = &mut self.tree.nodes[self.id].style;
        let before = style.clone();
        f(style);
        if *style != before {
            self.tree.mark_dirty_and_propagate(self.id);
        }
        self
    }

    pub fn direction(&mut self, direction: Direction) -> &mut Self {
        self.update(|style| style.direction = direction)
    }

    pub fn flex_direction(&mut self, flex_direction: FlexDirection) -> &mut Self {
        self.update(|style| style.flex_direction = flex_direction)
    }

    pub fn justify_content(&mut self, justify: Justify) -> &mut Self {
        self.update(|style| style.justify_content = justify)
    }

    pub fn align_content(&mut self, align: Align) -> &mut Self {
        self.update(|style| style.align_content = align)
    }

    pub fn align_items(&mut self, align: Align) -> &mut Self {
        self.update(|style| style.align_items = align)
    }

    pub fn align_self(&mut self, align: Align) -> &mut Self {
        self.update(|style| style.align_self = align)
    }

    pub fn position_type(&mut self, position_type: PositionType) -> &mut Self {
        self.update(|style| style.position_type = position_type)
    }

    pub fn flex_wrap(&mut self, wrap: Wrap) -> &mut Self {
        self.update(|style| style.flex_wrap = wrap)
    }

    pub fn overflow(&mut self, overflow: Overflow) -> &mut Self {
        self.update(|style| style.overflow = overflow)
    }

    pub fn display(&mut self, display: Display) -> &mut Self {
        self.update(|style| style.display = display)
    }

    /// Shorthand for grow, shrink and basis. NaN clears it.
    pub fn flex(&mut self, flex: f32) -> &mut Self {
        self.update(|style| style.flex = defined(flex))
    }

    pub fn flex_grow(&mut self, grow: f32) -> &mut Self {
        self.update(|style| style.flex_grow = defined(grow))
    }

    pub fn flex_shrink(&mut self, shrink: f32) -> &mut Self {
        self.update(|style| style.flex_shrink = defined(shrink))
    }

    pub fn flex_basis(&mut self, basis: impl Into<Length>) -> &mut Self {
        let basis = basis.into();
        self.update(|style| style.flex_basis = basis)
    }

    pub fn flex_basis_auto(&mut self) -> &mut Self {
        self.flex_basis(Length::Auto)
    }

    pub fn width(&mut self, width: impl Into<Length>) -> &mut Self {
        let width = width.into();
        self.update(|style| style.size.width = width)
    }

    pub fn height(&mut self, height: impl Into<Length>) -> &mut Self {
        let height = height.into();
        self.update(|style| style.size.height = height)
    }

    pub fn width_auto(&mut self) -> &mut Self {
        self.width(Length::Auto)
    }

    pub fn height_auto(&mut self) -> &mut Self {
        self.height(Length::Auto)
    }

    pub fn size(&mut self, size: Size<Length>) -> &mut Self {
        self.update(|style| style.size = size)
    }

    pub fn min_width(&mut self, width: impl Into<Length>) -> &mut Self {
        let width = width.into().without_auto();
        self.update(|style| style.min_size.width = width)
    }

    pub fn min_height(&mut self, height: impl Into<Length>) -> &mut Self {
        let height = height.into().without_auto();
        self.update(|style| style.min_size.height = height)
    }

    pub fn min_size(&mut self, size: Size<Length>) -> &mut Self {
        let size = size.map(Length::without_auto);
        self.update(|style| style.min_size = size)
    }

    pub fn max_width(&mut self, width: impl Into<Length>) -> &mut Self {
        let width = width.into().without_auto();
        self.update(|style| style.max_size.width = width)
    }

    pub fn max_height(&mut self, height: impl Into<Length>) -> &mut Self {
        let height = height.into().without_auto();
        self.update(|style| style.max_size.height = height)
    }

    pub fn max_size(&mut self, size: Size<Length>) -> &mut Self {
        let size = size.map(Length::without_auto);
        self.update(|style| style.max_size = size)
    }

    pub fn margin(&mut self, edge: Edge, margin: impl Into<Length>) -> &mut Self {
        let margin = margin.into();
        self.update(|style| style.margin.set(edge, margin))
    }

    pub fn margin_auto(&mut self, edge: Edge) -> &mut Self {
        self.margin(edge, Length::Auto)
    }

    pub fn padding(&mut self, edge: Edge, padding: impl Into<Length>) -> &mut Self {
        let padding = padding.into().without_auto();
        self.update(|style| style.padding.set(edge, padding))
    }

    pub fn border(&mut self, edge: Edge, width: f32) -> &mut Self {
        self.update(|style| style.border.set(edge, Length::points(width)))
    }

    pub fn position(&mut self, edge: Edge, offset: impl Into<Length>) -> &mut Self {
        let offset = offset.into().without_auto();
        self.update(|style| style.position.set(edge, offset))
    }

    /// Width divided by height. NaN clears it.
    pub fn aspect_ratio(&mut self, ratio: f32) -> &mut Self {
        self.update(|style| style.aspect_ratio = defined(ratio))
    }
}

fn defined(value: f32) -> Option<f32> {
    (!value.is_nan()).then_some(value)
}
