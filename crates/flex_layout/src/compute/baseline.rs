use crate::{
    LayoutTree, NodeId,
    style::{Align, Display, Edge, PositionType},
};

impl LayoutTree {
    /// Distance from the top of `id` to its baseline.
    ///
    /// A node without a baseline callback takes the baseline of its first child on the first
    /// line, preferring a child that is itself baseline aligned or marked as the reference
    /// baseline. A node without such a child uses its bottom edge.
    pub(crate) fn baseline(&self, id: NodeId) -> f32 {
        let mut offset = 0.0;
        let mut current = id;
        loop {
            let node = &self.nodes[current];
            if let Some(baseline) = &node.baseline {
                let size = node.state.measured_dimensions;
                return offset + baseline(current, size.width, size.height);
            }

            let mut baseline_child = None;
            for child in node.children.iter().copied() {
                let data = &self.nodes[child];
                if data.state.line_index > 0 {
                    break;
                }
                if data.style.position_type == PositionType::Absolute
                    || data.style.display == Display::None
                {
                    continue;
                }
                if data.align_item(node) == Align::Baseline || data.is_reference_baseline {
                    baseline_child = Some(child);
                    break;
                }
                if baseline_child.is_none() {
                    baseline_child = Some(child);
                }
            }

            match baseline_child {
                Some(child) => {
                    offset += self.nodes[child].layout_position(Edge::Top);
                    current = child;
                }
                None => return offset + node.state.measured_dimensions.height,
            }
        }
    }

    /// Whether the items of `id` are aligned on their baselines.
    pub(crate) fn is_baseline_layout(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        if node.style.flex_direction.is_column() {
            return false;
        }
        if node.style.align_items == Align::Baseline {
            return true;
        }
        node.children.iter().any(|child| {
            let data = &self.nodes[*child];
            data.style.position_type == PositionType::Relative
                && data.style.align_self == Align::Baseline
        })
    }
}
