use super::numeric::floats_equal;
use crate::{LayoutTree, NodeId, node::NodeType, style::Edge};

/// Snaps `value` to the grid of `1 / point_scale_factor`.
///
/// Computed in f64 so that large coordinates keep their fractional part.
pub(crate) fn round_value_to_pixel_grid(
    value: f32,
    point_scale_factor: f32,
    force_ceil: bool,
    force_floor: bool,
) -> f32 {
    let scale = point_scale_factor as f64;
    let mut scaled = value as f64 * scale;
    let mut fraction = scaled % 1.0;
    if fraction < 0.0 {
        // Negative values: make `scaled - fraction` the floor.
        fraction += 1.0;
    }

    if floats_equal(fraction as f32, 0.0) {
        scaled -= fraction;
    } else if floats_equal(fraction as f32, 1.0) {
        scaled = scaled - fraction + 1.0;
    } else if force_ceil {
        scaled = scaled - fraction + 1.0;
    } else if force_floor {
        scaled -= fraction;
    } else {
        let round_up = !fraction.is_nan() && (fraction > 0.5 || floats_equal(fraction as f32, 0.5));
        scaled = scaled - fraction + if round_up { 1.0 } else { 0.0 };
    }

    if scaled.is_nan() || scale.is_nan() {
        f32::NAN
    } else {
        (scaled / scale) as f32
    }
}

fn has_fraction(value: f32, point_scale_factor: f32) -> bool {
    let fraction = (value as f64 * point_scale_factor as f64) % 1.0;
    !floats_equal(fraction as f32, 0.0) && !floats_equal(fraction as f32, 1.0)
}

impl LayoutTree {
    /// Rounds positions and sizes of a laid out subtree.
    ///
    /// Sizes are derived from rounded absolute edges, so two boxes that touch before rounding
    /// still touch afterwards.
    pub(crate) fn round_to_pixel_grid(&mut self, root: NodeId, point_scale_factor: f32) {
        if point_scale_factor == 0.0 {
            return;
        }

        let mut stack = vec![(root, 0.0_f32, 0.0_f32)];
        while let Some((id, absolute_left, absolute_top)) = stack.pop() {
            let node = &mut self.nodes[id];
            let left = node.layout.position[Edge::Left as usize];
            let top = node.layout.position[Edge::Top as usize];
            let width = node.layout.dimensions.width;
            let height = node.layout.dimensions.height;

            let absolute_node_left = absolute_left + left;
            let absolute_node_top = absolute_top + top;
            let absolute_node_right = absolute_node_left + width;
            let absolute_node_bottom = absolute_node_top + height;

            // Text is never rounded down, that would clip glyphs.
            let text = node.node_type == NodeType::Text;
            let fractional_width = has_fraction(width, point_scale_factor);
            let fractional_height = has_fraction(height, point_scale_factor);

            node.layout.position[Edge::Left as usize] =
                round_value_to_pixel_grid(left, point_scale_factor, false, text);
            node.layout.position[Edge::Top as usize] =
                round_value_to_pixel_grid(top, point_scale_factor, false, text);

            node.layout.dimensions.width = round_value_to_pixel_grid(
                absolute_node_right,
                point_scale_factor,
                text && fractional_width,
                text && !fractional_width,
            ) - round_value_to_pixel_grid(
                absolute_node_left,
                point_scale_factor,
                false,
                text,
            );
            node.layout.dimensions.height = round_value_to_pixel_grid(
                absolute_node_bottom,
                point_scale_factor,
                text && fractional_height,
                text && !fractional_height,
            ) - round_value_to_pixel_grid(
                absolute_node_top,
                point_scale_factor,
                false,
                text,
            );

            stack.extend(
                node.children
                    .iter()
                    .map(|child| (*child, absolute_node_left, absolute_node_top)),
            );
        }
    }
}
