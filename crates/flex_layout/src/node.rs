use crate::{
    Config,
    geometry::{Size, size},
    layout::{Layout, LayoutState},
    style::{Length, Style},
};
use smallvec::SmallVec;
use std::{any::Any, fmt, sync::Arc};
use strum::Display;

slotmap::new_key_type! {
    /// Handle to a node owned by a [`LayoutTree`](crate::LayoutTree).
    pub struct NodeId;
}

/// Constraint semantics of one axis of a measurement query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum MeasureMode {
    /// No constraint, the node picks its natural size.
    Undefined,
    /// The node has to be exactly the given size.
    Exactly,
    /// The node can be at most the given size.
    AtMost,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum NodeType {
    #[default]
    Default,
    /// Content measured by a callback. Text sizes are rounded up to the pixel grid so that
    /// glyphs are never clipped.
    Text,
}

/// Measures a self-sizing leaf: `(node, width, width_mode, height, height_mode)`.
///
/// Sizes handed to the callback exclude the node's padding and border.
pub type MeasureFunc =
    Arc<dyn Fn(NodeId, f32, MeasureMode, f32, MeasureMode) -> Size<f32> + Send + Sync>;

/// Reports the distance from the top of a node to its baseline given its laid out size.
pub type BaselineFunc = Arc<dyn Fn(NodeId, f32, f32) -> f32 + Send + Sync>;

/// Invoked when a node goes from clean to dirty.
pub type DirtiedFunc = Arc<dyn Fn(NodeId) + Send + Sync>;

/// Invoked for every node of a subtree, with its owner, before that subtree is laid out.
pub type FreezeFunc = Arc<dyn Fn(NodeId, Option<NodeId>) + Send + Sync>;

#[derive(Clone)]
pub(crate) struct NodeData {
    pub style: Style,
    pub layout: Layout,
    pub state: LayoutState,
    pub children: SmallVec<[NodeId; 4]>,
    pub owner: Option<NodeId>,
    pub config: Arc<Config>,
    pub node_type: NodeType,
    pub is_reference_baseline: bool,
    pub is_dirty: bool,
    pub has_new_layout: bool,
    pub resolved_dimensions: Size<Length>,
    pub measure: Option<MeasureFunc>,
    pub baseline: Option<BaselineFunc>,
    pub dirtied: Option<DirtiedFunc>,
    pub freeze: Option<FreezeFunc>,
    pub context: Option<Arc<dyn Any + Send + Sync>>,
}

impl NodeData {
    pub fn new(config: Arc<Config>) -> Self {
        NodeData {
            style: config.default_style(),
            layout: Layout::default(),
            state: LayoutState::default(),
            children: SmallVec::new(),
            owner: None,
            config,
            node_type: NodeType::Default,
            is_reference_baseline: false,
            is_dirty: false,
            has_new_layout: true,
            resolved_dimensions: size(Length::Undefined, Length::Undefined),
            measure: None,
            baseline: None,
            dirtied: None,
            freeze: None,
            context: None,
        }
    }

    /// A copy that shares hooks and data but belongs to no tree position.
    pub fn detached_copy(&self) -> Self {
        NodeData {
            children: SmallVec::new(),
            owner: None,
            ..self.clone()
        }
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeData")
            .field("style", &self.style)
            .field("layout", &self.layout)
            .field("children", &self.children)
            .field("owner", &self.owner)
            .field("node_type", &self.node_type)
            .field("is_dirty", &self.is_dirty)
            .field("has_new_layout", &self.has_new_layout)
            .field("measure", &self.measure.is_some())
            .field("baseline", &self.baseline.is_some())
            .finish_non_exhaustive()
    }
}
