use super::{
    FlexContainer,
    flex_line::FlexLine,
    numeric::{float_max, floats_equal, is_undefined},
};
use crate::{
    LayoutTree,
    events::LayoutPassReason,
    node::MeasureMode,
    style::{Align, Display, Edge, FlexDirection, PositionType},
};

impl LayoutTree {
    /// Positions the items of one line along the cross axis, stretching those that ask for
    /// it.
    pub(super) fn align_line_cross_axis(
        &mut self,
        container: &FlexContainer,
        line: &FlexLine,
        start: usize,
        container_cross_axis: f32,
        total_line_cross_dim: f32,
        leading_padding_and_border_cross: f32,
    ) {
        let id = container.id;
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let available_inner_width = container.available_inner_width;
        let leading_edge = cross_axis.leading_edge();

        for index in start..line.end_of_line_index {
            let child = self.nodes[id].children[index];
            let owner = &self.nodes[id];
            let data = &self.nodes[child];
            if data.style.display == Display::None {
                continue;
            }

            if data.style.position_type == PositionType::Absolute {
                // Explicit offsets are relative to the padding box, the margin box otherwise.
                let leading_border = owner.leading_border(cross_axis);
                let leading_margin = data.leading_margin(cross_axis, available_inner_width);
                let mut position = f32::NAN;
                if data.is_leading_position_defined(cross_axis) {
                    position = data
                        .leading_position(cross_axis, container.available_inner_cross_dim)
                        + leading_border
                        + leading_margin;
                }
                if is_undefined(position) {
                    position = leading_border + leading_margin;
                }
                self.nodes[child].set_layout_position(leading_edge, position);
                continue;
            }

            let mut leading_cross_dim = leading_padding_and_border_cross;
            let align = data.align_item(owner);

            if align == Align::Stretch && !data.has_auto_cross_margin(cross_axis) {
                // Items with a definite cross size do not stretch.
                if !data.is_style_dim_defined(cross_axis, container.available_inner_cross_dim) {
                    let mut child_main_size = data.measured(main_axis);
                    let mut child_cross_size = match data.style.aspect_ratio {
                        Some(ratio) => {
                            data.margin_for_axis(cross_axis, available_inner_width)
                                + if container.is_main_axis_row {
                                    child_main_size / ratio
                                } else {
                                    child_main_size * ratio
                                }
                        }
                        None => line.cross_dim,
                    };
                    child_main_size += data.margin_for_axis(main_axis, available_inner_width);

                    let mut child_main_mode = MeasureMode::Exactly;
                    let mut child_cross_mode = MeasureMode::Exactly;
                    data.constrain_max_size_for_mode(
                        main_axis,
                        container.available_inner_main_dim,
                        available_inner_width,
                        &mut child_main_mode,
                        &mut child_main_size,
                    );
                    data.constrain_max_size_for_mode(
                        cross_axis,
                        container.available_inner_cross_dim,
                        available_inner_width,
                        &mut child_cross_mode,
                        &mut child_cross_size,
                    );

                    let (child_width, child_height) = if container.is_main_axis_row {
                        (child_main_size, child_cross_size)
                    } else {
                        (child_cross_size, child_main_size)
                    };
                    let mode_for = |size: f32| {
                        if is_undefined(size) {
                            MeasureMode::Undefined
                        } else {
                            MeasureMode::Exactly
                        }
                    };
                    self.layout_node_internal(
                        child,
                        child_width,
                        child_height,
                        container.direction,
                        mode_for(child_width),
                        mode_for(child_height),
                        available_inner_width,
                        container.available_inner_height,
                        true,
                        LayoutPassReason::Stretch,
                    );
                }
            } else {
                let remaining_cross_dim =
                    container_cross_axis - data.dim_with_margin(cross_axis, available_inner_width);
                let leading_auto = data.margin_leading_value(cross_axis).is_auto();
                let trailing_auto = data.margin_trailing_value(cross_axis).is_auto();

                if leading_auto && trailing_auto {
                    leading_cross_dim += float_max(0.0, remaining_cross_dim / 2.0);
                } else if trailing_auto {
                    // The item stays at the start.
                } else if leading_auto {
                    leading_cross_dim += float_max(0.0, remaining_cross_dim);
                } else if align == Align::FlexStart {
                    // Already at the start.
                } else if align == Align::Center {
                    leading_cross_dim += remaining_cross_dim / 2.0;
                } else {
                    leading_cross_dim += remaining_cross_dim;
                }
            }

            let data = &mut self.nodes[child];
            let position =
                data.layout_position(leading_edge) + total_line_cross_dim + leading_cross_dim;
            data.set_layout_position(leading_edge, position);
        }
    }

    /// Distributes the lines of a container along its cross axis and aligns the items of
    /// each line within it.
    pub(super) fn align_content(
        &mut self,
        container: &FlexContainer,
        line_count: usize,
        total_line_cross_dim: f32,
        leading_padding_and_border_cross: f32,
    ) {
        let id = container.id;
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let available_inner_width = container.available_inner_width;
        let remaining_align_content_dim =
            container.available_inner_cross_dim - total_line_cross_dim;

        let mut cross_dim_lead = 0.0;
        let mut current_lead = leading_padding_and_border_cross;

        match self.nodes[id].style.align_content {
            Align::FlexEnd => current_lead += remaining_align_content_dim,
            Align::Center => current_lead += remaining_align_content_dim / 2.0,
            Align::Stretch => {
                if container.available_inner_cross_dim > total_line_cross_dim {
                    cross_dim_lead = remaining_align_content_dim / line_count as f32;
                }
            }
            Align::SpaceAround => {
                if container.available_inner_cross_dim > total_line_cross_dim {
                    current_lead += remaining_align_content_dim / (2 * line_count) as f32;
                    if line_count > 1 {
                        cross_dim_lead = remaining_align_content_dim / line_count as f32;
                    }
                } else {
                    current_lead += remaining_align_content_dim / 2.0;
                }
            }
            Align::SpaceBetween => {
                if container.available_inner_cross_dim > total_line_cross_dim && line_count > 1 {
                    cross_dim_lead = remaining_align_content_dim / (line_count - 1) as f32;
                }
            }
            Align::Auto | Align::FlexStart | Align::Baseline => {}
        }

        let child_count = self.nodes[id].children.len();
        let mut end_index = 0;
        for line in 0..line_count {
            let start_index = end_index;

            // Size the line from its items.
            let mut line_height: f32 = 0.0;
            let mut max_ascent: f32 = 0.0;
            let mut max_descent: f32 = 0.0;
            let mut index = start_index;
            while index < child_count {
                let child = self.nodes[id].children[index];
                let owner = &self.nodes[id];
                let data = &self.nodes[child];
                if data.style.display == Display::None {
                    index += 1;
                    continue;
                }
                if data.style.position_type == PositionType::Relative {
                    if data.state.line_index != line {
                        break;
                    }
                    if data.is_layout_dim_defined(cross_axis) {
                        line_height = float_max(
                            line_height,
                            data.measured(cross_axis)
                                + data.margin_for_axis(cross_axis, available_inner_width),
                        );
                    }
                    if data.align_item(owner) == Align::Baseline {
                        let ascent = self.baseline(child)
                            + data.leading_margin(FlexDirection::Column, available_inner_width);
                        let descent = data.measured(FlexDirection::Column)
                            + data.margin_for_axis(FlexDirection::Column, available_inner_width)
                            - ascent;
                        max_ascent = float_max(max_ascent, ascent);
                        max_descent = float_max(max_descent, descent);
                        line_height = float_max(line_height, max_ascent + max_descent);
                    }
                }
                index += 1;
            }
            end_index = index;
            line_height += cross_dim_lead;

            for index in start_index..end_index {
                let child = self.nodes[id].children[index];
                let owner = &self.nodes[id];
                let data = &self.nodes[child];
                if data.style.display == Display::None
                    || data.style.position_type != PositionType::Relative
                {
                    continue;
                }

                match data.align_item(owner) {
                    Align::FlexStart => {
                        let position = current_lead
                            + data.leading_margin(cross_axis, available_inner_width);
                        self.nodes[child].set_layout_position(cross_axis.leading_edge(), position);
                    }
                    Align::FlexEnd => {
                        let position = current_lead + line_height
                            - data.trailing_margin(cross_axis, available_inner_width)
                            - data.measured(cross_axis);
                        self.nodes[child].set_layout_position(cross_axis.leading_edge(), position);
                    }
                    Align::Center => {
                        let position =
                            current_lead + (line_height - data.measured(cross_axis)) / 2.0;
                        self.nodes[child].set_layout_position(cross_axis.leading_edge(), position);
                    }
                    Align::Stretch => {
                        let position = current_lead
                            + data.leading_margin(cross_axis, available_inner_width);
                        let style_defined = data
                            .is_style_dim_defined(cross_axis, container.available_inner_cross_dim);
                        let margin_main = data.margin_for_axis(main_axis, available_inner_width);
                        let margin_cross = data.margin_for_axis(cross_axis, available_inner_width);
                        let measured = data.state.measured_dimensions;
                        self.nodes[child].set_layout_position(cross_axis.leading_edge(), position);

                        // Items were stretched to the container before the lines were
                        // distributed; stretch them again to their line.
                        if !style_defined {
                            let (child_width, child_height) = if container.is_main_axis_row {
                                (measured.width + margin_main, line_height)
                            } else {
                                (line_height, measured.height + margin_main)
                            };
                            let (margin_row, margin_column) = if container.is_main_axis_row {
                                (margin_main, margin_cross)
                            } else {
                                (margin_cross, margin_main)
                            };
                            // Available sizes include margins, measured sizes do not.
                            if !(floats_equal(child_width - margin_row, measured.width)
                                && floats_equal(child_height - margin_column, measured.height))
                            {
                                self.layout_node_internal(
                                    child,
                                    child_width,
                                    child_height,
                                    container.direction,
                                    MeasureMode::Exactly,
                                    MeasureMode::Exactly,
                                    available_inner_width,
                                    container.available_inner_height,
                                    true,
                                    LayoutPassReason::MultilineStretch,
                                );
                            }
                        }
                    }
                    Align::Baseline => {
                        let position = current_lead + max_ascent - self.baseline(child)
                            + data.leading_position(
                                FlexDirection::Column,
                                container.available_inner_cross_dim,
                            );
                        self.nodes[child].set_layout_position(Edge::Top, position);
                    }
                    Align::Auto | Align::SpaceBetween | Align::SpaceAround => {}
                }
            }

            current_lead += line_height;
        }
    }
}
