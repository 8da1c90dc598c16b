use super::{
    FlexContainer,
    numeric::{UNDEFINED, float_max, floats_equal, is_undefined},
    resolve::resolve_value,
};
use crate::{
    LayoutTree, NodeId,
    config::ExperimentalFeature,
    events::LayoutPassReason,
    node::MeasureMode,
    style::{Align, Display, FlexDirection, Overflow, PositionType},
};

impl LayoutTree {
    /// Computes the flex basis of every child of the container and positions displayed
    /// children at their margins. Returns the sum of the outer flex bases of the children in
    /// flow.
    pub(super) fn compute_flex_basis_for_children(&mut self, container: &FlexContainer) -> f32 {
        let children = self.nodes[container.id].children.clone();

        // A container with a single child that can both grow and shrink hands it all the
        // space, whatever its basis.
        let mut single_flex_child = None;
        if container.main_mode == MeasureMode::Exactly {
            for child in &children {
                let data = &self.nodes[*child];
                if !data.is_flexible() {
                    continue;
                }
                if single_flex_child.is_some()
                    || floats_equal(data.resolve_flex_grow(), 0.0)
                    || floats_equal(data.resolve_flex_shrink(), 0.0)
                {
                    single_flex_child = None;
                    break;
                }
                single_flex_child = Some(*child);
            }
        }

        let generation = self.generation;
        let mut total_outer_flex_basis = 0.0;
        for child in children {
            let data = &mut self.nodes[child];
            data.resolve_dimensions();

            if data.style.display == Display::None {
                self.zero_out_layout(child);
                let data = &mut self.nodes[child];
                data.has_new_layout = true;
                data.is_dirty = false;
                continue;
            }

            if container.perform_layout {
                let child_direction = data.resolve_direction(container.direction);
                let (main_size, cross_size) = if container.is_main_axis_row {
                    (container.available_inner_width, container.available_inner_height)
                } else {
                    (container.available_inner_height, container.available_inner_width)
                };
                data.set_position(
                    child_direction,
                    main_size,
                    cross_size,
                    container.available_inner_width,
                );
            }

            if data.style.position_type == PositionType::Absolute {
                continue;
            }

            if Some(child) == single_flex_child {
                data.state.computed_flex_basis_generation = generation;
                data.state.computed_flex_basis = 0.0;
            } else {
                self.compute_flex_basis_for_child(container, child);
            }

            let data = &self.nodes[child];
            total_outer_flex_basis += data.state.computed_flex_basis
                + data.margin_for_axis(container.main_axis, container.available_inner_width);
        }
        total_outer_flex_basis
    }

    fn compute_flex_basis_for_child(&mut self, container: &FlexContainer, child: NodeId) {
        let generation = self.generation;
        let main_axis = container.main_axis;
        let is_main_axis_row = container.is_main_axis_row;
        let width = container.available_inner_width;
        let height = container.available_inner_height;
        let owner_width = width;
        let owner_height = height;
        let main_axis_size = if is_main_axis_row { width } else { height };

        let owner = &self.nodes[container.id];
        let data = &self.nodes[child];
        let resolved_flex_basis = resolve_value(data.resolve_flex_basis(), main_axis_size);
        let is_row_style_dim_defined = data.is_style_dim_defined(FlexDirection::Row, owner_width);
        let is_column_style_dim_defined =
            data.is_style_dim_defined(FlexDirection::Column, owner_height);

        if !is_undefined(resolved_flex_basis) && !is_undefined(main_axis_size) {
            let recompute = is_undefined(data.state.computed_flex_basis)
                || (data
                    .config
                    .is_experimental_feature_enabled(ExperimentalFeature::WebFlexBasis)
                    && data.state.computed_flex_basis_generation != generation);
            if recompute {
                let padding_and_border = data.padding_and_border_for_axis(main_axis, owner_width);
                self.nodes[child].state.computed_flex_basis =
                    float_max(resolved_flex_basis, padding_and_border);
            }
        } else if is_main_axis_row && is_row_style_dim_defined {
            let basis = float_max(
                resolve_value(data.resolved_dimension(FlexDirection::Row), owner_width),
                data.padding_and_border_for_axis(FlexDirection::Row, owner_width),
            );
            self.nodes[child].state.computed_flex_basis = basis;
        } else if !is_main_axis_row && is_column_style_dim_defined {
            let basis = float_max(
                resolve_value(data.resolved_dimension(FlexDirection::Column), owner_height),
                data.padding_and_border_for_axis(FlexDirection::Column, owner_width),
            );
            self.nodes[child].state.computed_flex_basis = basis;
        } else {
            // Neither a basis nor a size along the main axis: measure the content.
            let mut child_width = UNDEFINED;
            let mut child_height = UNDEFINED;
            let mut child_width_mode = MeasureMode::Undefined;
            let mut child_height_mode = MeasureMode::Undefined;

            let margin_row = data.margin_for_axis(FlexDirection::Row, owner_width);
            let margin_column = data.margin_for_axis(FlexDirection::Column, owner_width);

            if is_row_style_dim_defined {
                child_width =
                    resolve_value(data.resolved_dimension(FlexDirection::Row), owner_width)
                        + margin_row;
                child_width_mode = MeasureMode::Exactly;
            }
            if is_column_style_dim_defined {
                child_height =
                    resolve_value(data.resolved_dimension(FlexDirection::Column), owner_height)
                        + margin_column;
                child_height_mode = MeasureMode::Exactly;
            }

            // A scrolling container does not limit its children along the scroll axis.
            let scrolls = owner.style.overflow == Overflow::Scroll;
            if !(is_main_axis_row && scrolls) && is_undefined(child_width) && !is_undefined(width)
            {
                child_width = width;
                child_width_mode = MeasureMode::AtMost;
            }
            if !(!is_main_axis_row && scrolls)
                && is_undefined(child_height)
                && !is_undefined(height)
            {
                child_height = height;
                child_height_mode = MeasureMode::AtMost;
            }

            if let Some(ratio) = data.style.aspect_ratio {
                if !is_main_axis_row && child_width_mode == MeasureMode::Exactly {
                    child_height = margin_column + (child_width - margin_row) / ratio;
                    child_height_mode = MeasureMode::Exactly;
                } else if is_main_axis_row && child_height_mode == MeasureMode::Exactly {
                    child_width = margin_row + (child_height - margin_column) * ratio;
                    child_width_mode = MeasureMode::Exactly;
                }
            }

            // Stretched children take the container's cross size when it is known.
            let stretches = data.align_item(owner) == Align::Stretch;
            let width_mode = container.width_mode;
            let height_mode = container.height_mode;
            if !is_main_axis_row
                && !is_undefined(width)
                && !is_row_style_dim_defined
                && width_mode == MeasureMode::Exactly
                && stretches
            {
                child_width = width;
                child_width_mode = MeasureMode::Exactly;
                if let Some(ratio) = data.style.aspect_ratio {
                    child_height = (child_width - margin_row) / ratio;
                    child_height_mode = MeasureMode::Exactly;
                }
            }
            if is_main_axis_row
                && !is_undefined(height)
                && !is_column_style_dim_defined
                && height_mode == MeasureMode::Exactly
                && stretches
            {
                child_height = height;
                child_height_mode = MeasureMode::Exactly;
                if let Some(ratio) = data.style.aspect_ratio {
                    child_width = (child_height - margin_column) * ratio;
                    child_width_mode = MeasureMode::Exactly;
                }
            }

            data.constrain_max_size_for_mode(
                FlexDirection::Row,
                owner_width,
                owner_width,
                &mut child_width_mode,
                &mut child_width,
            );
            data.constrain_max_size_for_mode(
                FlexDirection::Column,
                owner_height,
                owner_width,
                &mut child_height_mode,
                &mut child_height,
            );

            self.layout_node_internal(
                child,
                child_width,
                child_height,
                container.direction,
                child_width_mode,
                child_height_mode,
                owner_width,
                owner_height,
                false,
                LayoutPassReason::MeasureChild,
            );

            let data = &mut self.nodes[child];
            data.state.computed_flex_basis = float_max(
                data.measured(main_axis),
                data.padding_and_border_for_axis(main_axis, owner_width),
            );
        }

        self.nodes[child].state.computed_flex_basis_generation = generation;
    }
}
