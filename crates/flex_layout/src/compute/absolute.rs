use super::{
    FlexContainer,
    numeric::{UNDEFINED, is_undefined},
    resolve::resolve_value,
};
use crate::{
    LayoutTree, NodeId,
    events::LayoutPassReason,
    node::MeasureMode,
    style::{Align, FlexDirection, Justify, Wrap},
};

impl LayoutTree {
    /// Lays out an absolutely positioned child once its container has its final size.
    ///
    /// Offsets on both sides of an axis give the child its size along that axis. An axis
    /// without a leading offset places the child by the container's `justify-content` or
    /// `align-items`, as if it were the only item of a line.
    pub(super) fn layout_absolute_child(
        &mut self,
        container: &FlexContainer,
        child: NodeId,
        width_mode: MeasureMode,
    ) {
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let is_main_axis_row = container.is_main_axis_row;
        let width = container.available_inner_width;
        let height = container.available_inner_height;
        let direction = container.direction;

        let node = &self.nodes[container.id];
        let data = &self.nodes[child];
        let margin_row = data.margin_for_axis(FlexDirection::Row, width);
        let margin_column = data.margin_for_axis(FlexDirection::Column, width);

        let mut child_width = UNDEFINED;
        let mut child_height = UNDEFINED;

        if data.is_style_dim_defined(FlexDirection::Row, width) {
            child_width =
                resolve_value(data.resolved_dimension(FlexDirection::Row), width) + margin_row;
        } else if data.is_leading_position_defined(FlexDirection::Row)
            && data.is_trailing_position_defined(FlexDirection::Row)
        {
            child_width = node.measured(FlexDirection::Row)
                - (node.leading_border(FlexDirection::Row)
                    + node.trailing_border(FlexDirection::Row))
                - (data.leading_position(FlexDirection::Row, width)
                    + data.trailing_position(FlexDirection::Row, width));
            child_width = data.bound_axis(FlexDirection::Row, child_width, width, width);
        }

        if data.is_style_dim_defined(FlexDirection::Column, height) {
            child_height = resolve_value(data.resolved_dimension(FlexDirection::Column), height)
                + margin_column;
        } else if data.is_leading_position_defined(FlexDirection::Column)
            && data.is_trailing_position_defined(FlexDirection::Column)
        {
            child_height = node.measured(FlexDirection::Column)
                - (node.leading_border(FlexDirection::Column)
                    + node.trailing_border(FlexDirection::Column))
                - (data.leading_position(FlexDirection::Column, height)
                    + data.trailing_position(FlexDirection::Column, height));
            child_height = data.bound_axis(FlexDirection::Column, child_height, height, width);
        }

        // An aspect ratio derives the missing size from the known one.
        if is_undefined(child_width) != is_undefined(child_height) {
            if let Some(ratio) = data.style.aspect_ratio {
                if is_undefined(child_width) {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                } else {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                }
            }
        }

        if is_undefined(child_width) || is_undefined(child_height) {
            let mut child_width_mode = if is_undefined(child_width) {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };
            let child_height_mode = if is_undefined(child_height) {
                MeasureMode::Undefined
            } else {
                MeasureMode::Exactly
            };

            // Content wraps at the container's width when it has one.
            if !is_main_axis_row
                && is_undefined(child_width)
                && width_mode != MeasureMode::Undefined
                && !is_undefined(width)
                && width > 0.0
            {
                child_width = width;
                child_width_mode = MeasureMode::AtMost;
            }

            self.layout_node_internal(
                child,
                child_width,
                child_height,
                direction,
                child_width_mode,
                child_height_mode,
                child_width,
                child_height,
                false,
                LayoutPassReason::AbsMeasureChild,
            );
            let data = &self.nodes[child];
            child_width = data.measured(FlexDirection::Row) + margin_row;
            child_height = data.measured(FlexDirection::Column) + margin_column;
        }

        self.layout_node_internal(
            child,
            child_width,
            child_height,
            direction,
            MeasureMode::Exactly,
            MeasureMode::Exactly,
            child_width,
            child_height,
            true,
            LayoutPassReason::AbsLayout,
        );

        let node = &self.nodes[container.id];
        let data = &self.nodes[child];
        let justify_content = node.style.justify_content;
        let align = data.align_item(node);
        let wrap_reverse = node.style.flex_wrap == Wrap::WrapReverse;

        let main_free = node.measured(main_axis) - data.measured(main_axis);
        let main_position = if data.is_trailing_position_defined(main_axis)
            && !data.is_leading_position_defined(main_axis)
        {
            let axis_size = if is_main_axis_row { width } else { height };
            Some(
                main_free
                    - node.trailing_border(main_axis)
                    - data.trailing_margin(main_axis, width)
                    - data.trailing_position(main_axis, axis_size),
            )
        } else if !data.is_leading_position_defined(main_axis) && justify_content == Justify::Center
        {
            Some(main_free / 2.0)
        } else if !data.is_leading_position_defined(main_axis)
            && justify_content == Justify::FlexEnd
        {
            Some(main_free)
        } else {
            None
        };

        let cross_free = node.measured(cross_axis) - data.measured(cross_axis);
        let cross_position = if data.is_trailing_position_defined(cross_axis)
            && !data.is_leading_position_defined(cross_axis)
        {
            let axis_size = if is_main_axis_row { height } else { width };
            Some(
                cross_free
                    - node.trailing_border(cross_axis)
                    - data.trailing_margin(cross_axis, width)
                    - data.trailing_position(cross_axis, axis_size),
            )
        } else if !data.is_leading_position_defined(cross_axis) && align == Align::Center {
            Some(cross_free / 2.0)
        } else if !data.is_leading_position_defined(cross_axis)
            && ((align == Align::FlexEnd) != wrap_reverse)
        {
            Some(cross_free)
        } else {
            None
        };

        let data = &mut self.nodes[child];
        if let Some(position) = main_position {
            data.set_layout_position(main_axis.leading_edge(), position);
        }
        if let Some(position) = cross_position {
            data.set_layout_position(cross_axis.leading_edge(), position);
        }
    }
}
