//! Line collection, flexible length resolution and main axis justification.

use super::{
    FlexContainer,
    numeric::{float_max, is_undefined},
    resolve::resolve_value,
};
use crate::{
    LayoutTree, NodeId,
    events::LayoutPassReason,
    node::MeasureMode,
    style::{Align, Display, FlexDirection, Justify, Length, PositionType},
};
use smallvec::{SmallVec, smallvec};

/// One line of a flex container and the running totals of its items.
#[derive(Debug, Default)]
pub(crate) struct FlexLine {
    pub items_on_line: usize,
    /// Outer flex bases of the line's items, bounded by their min and max sizes.
    pub size_consumed: f32,
    pub total_flex_grow_factors: f32,
    /// Sum of `-flex_shrink * flex_basis` over the line's flexible items.
    pub total_flex_shrink_scaled_factors: f32,
    /// Index one past the last child on this line, absolute children included.
    pub end_of_line_index: usize,
    pub relative_children: SmallVec<[NodeId; 8]>,
    pub remaining_free_space: f32,
    pub main_dim: f32,
    pub cross_dim: f32,
}

impl LayoutTree {
    /// Collects the children starting at `start` that fit on one line.
    pub(super) fn collect_flex_line(
        &mut self,
        container: &FlexContainer,
        start: usize,
        line_index: usize,
    ) -> FlexLine {
        let mut line = FlexLine {
            end_of_line_index: start,
            ..Default::default()
        };
        let child_count = self.nodes[container.id].children.len();

        let mut index = start;
        while index < child_count {
            let child = self.nodes[container.id].children[index];
            let data = &mut self.nodes[child];
            if data.style.display == Display::None
                || data.style.position_type == PositionType::Absolute
            {
                index += 1;
                continue;
            }
            data.state.line_index = line_index;

            let margin = data.margin_for_axis(container.main_axis, container.available_inner_width);
            let flex_basis = data.bound_axis_within_min_max(
                container.main_axis,
                data.state.computed_flex_basis,
                container.main_axis_owner_size,
            );

            // Every line holds at least one item.
            if line.size_consumed + flex_basis + margin > container.available_inner_main_dim
                && container.is_wrap
                && line.items_on_line > 0
            {
                break;
            }

            line.size_consumed += flex_basis + margin;
            line.items_on_line += 1;
            if data.is_flexible() {
                line.total_flex_grow_factors += data.resolve_flex_grow();
                line.total_flex_shrink_scaled_factors +=
                    -data.resolve_flex_shrink() * data.state.computed_flex_basis;
            }
            line.relative_children.push(child);
            index += 1;
        }

        // Factors summing to less than one distribute as if they summed to one.
        if line.total_flex_grow_factors > 0.0 && line.total_flex_grow_factors < 1.0 {
            line.total_flex_grow_factors = 1.0;
        }
        let shrink_factors = line.total_flex_shrink_scaled_factors;
        if shrink_factors > 0.0 && shrink_factors < 1.0 {
            line.total_flex_shrink_scaled_factors = 1.0;
        }

        line.end_of_line_index = index;
        line
    }

    /// Distributes the line's free space over its flexible items and lays them out at their
    /// final main size.
    pub(super) fn resolve_flexible_length(
        &mut self,
        container: &FlexContainer,
        line: &mut FlexLine,
        flex_basis_overflows: bool,
    ) {
        let original_free_space = line.remaining_free_space;
        let pinned = self.pin_constrained_items(container, line);
        let distributed =
            self.distribute_free_space(container, line, &pinned, flex_basis_overflows);
        line.remaining_free_space = original_free_space - distributed;
    }

    /// Takes items whose flexed size would violate their min or max size out of the
    /// distribution, repeatedly, until no further item is pinned.
    ///
    /// A pinned item keeps its clamped size, returned at the item's index. The space it did
    /// not take, or took beyond its share, is handed to the items that are still flexible.
    fn pin_constrained_items(
        &self,
        container: &FlexContainer,
        line: &mut FlexLine,
    ) -> SmallVec<[Option<f32>; 8]> {
        let mut pinned: SmallVec<[Option<f32>; 8]> =
            smallvec![None; line.relative_children.len()];
        let growing = line.remaining_free_space > 0.0;

        loop {
            let mut delta_free_space = 0.0;
            let mut pinned_any = false;

            for (index, child) in line.relative_children.iter().enumerate() {
                if pinned[index].is_some() {
                    continue;
                }
                let data = &self.nodes[*child];
                let flex_basis = data.bound_axis_within_min_max(
                    container.main_axis,
                    data.state.computed_flex_basis,
                    container.main_axis_owner_size,
                );

                if line.remaining_free_space < 0.0 {
                    let shrink_scaled_factor = -data.resolve_flex_shrink() * flex_basis;
                    if is_undefined(shrink_scaled_factor) || shrink_scaled_factor == 0.0 {
                        continue;
                    }
                    let base_main_size = flex_basis
                        + line.remaining_free_space / line.total_flex_shrink_scaled_factors
                            * shrink_scaled_factor;
                    let bound_main_size = data.bound_axis(
                        container.main_axis,
                        base_main_size,
                        container.available_inner_main_dim,
                        container.available_inner_width,
                    );
                    if !is_undefined(base_main_size)
                        && !is_undefined(bound_main_size)
                        && base_main_size != bound_main_size
                    {
                        delta_free_space += bound_main_size - flex_basis;
                        line.total_flex_shrink_scaled_factors -= shrink_scaled_factor;
                        pinned[index] = Some(bound_main_size);
                        pinned_any = true;
                    }
                } else if line.remaining_free_space > 0.0 {
                    let grow_factor = data.resolve_flex_grow();
                    if is_undefined(grow_factor) || grow_factor == 0.0 {
                        continue;
                    }
                    let base_main_size = flex_basis
                        + line.remaining_free_space / line.total_flex_grow_factors * grow_factor;
                    let bound_main_size = data.bound_axis(
                        container.main_axis,
                        base_main_size,
                        container.available_inner_main_dim,
                        container.available_inner_width,
                    );
                    if !is_undefined(base_main_size)
                        && !is_undefined(bound_main_size)
                        && base_main_size != bound_main_size
                    {
                        delta_free_space += bound_main_size - flex_basis;
                        line.total_flex_grow_factors -= grow_factor;
                        pinned[index] = Some(bound_main_size);
                        pinned_any = true;
                    }
                }
            }

            line.remaining_free_space -= delta_free_space;

            let same_direction = if growing {
                line.remaining_free_space > 0.0
            } else {
                line.remaining_free_space < 0.0
            };
            if !pinned_any || !same_direction {
                return pinned;
            }
        }
    }

    /// Sizes every item of the line along the main axis and lays it out. Returns how much of
    /// the free space the items took.
    fn distribute_free_space(
        &mut self,
        container: &FlexContainer,
        line: &FlexLine,
        pinned: &[Option<f32>],
        flex_basis_overflows: bool,
    ) -> f32 {
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let available_inner_width = container.available_inner_width;
        let available_inner_cross_dim = container.available_inner_cross_dim;
        let mut delta_free_space = 0.0;

        for (index, child) in line.relative_children.iter().copied().enumerate() {
            let owner = &self.nodes[container.id];
            let data = &self.nodes[child];
            let flex_basis = data.bound_axis_within_min_max(
                main_axis,
                data.state.computed_flex_basis,
                container.main_axis_owner_size,
            );
            let mut updated_main_size = flex_basis;

            if let Some(size) = pinned[index] {
                updated_main_size = size;
            } else if line.remaining_free_space < 0.0 {
                let shrink_scaled_factor = -data.resolve_flex_shrink() * flex_basis;
                if shrink_scaled_factor != 0.0 {
                    let child_size = if line.total_flex_shrink_scaled_factors == 0.0 {
                        flex_basis + shrink_scaled_factor
                    } else {
                        flex_basis
                            + line.remaining_free_space / line.total_flex_shrink_scaled_factors
                                * shrink_scaled_factor
                    };
                    updated_main_size = data.bound_axis(
                        main_axis,
                        child_size,
                        container.available_inner_main_dim,
                        available_inner_width,
                    );
                }
            } else if line.remaining_free_space > 0.0 {
                let grow_factor = data.resolve_flex_grow();
                if !is_undefined(grow_factor) && grow_factor != 0.0 {
                    updated_main_size = data.bound_axis(
                        main_axis,
                        flex_basis
                            + line.remaining_free_space / line.total_flex_grow_factors
                                * grow_factor,
                        container.available_inner_main_dim,
                        available_inner_width,
                    );
                }
            }
            delta_free_space += updated_main_size - flex_basis;

            let margin_main = data.margin_for_axis(main_axis, available_inner_width);
            let margin_cross = data.margin_for_axis(cross_axis, available_inner_width);
            let mut child_main_size = updated_main_size + margin_main;
            let mut child_main_mode = MeasureMode::Exactly;
            let mut child_cross_size;
            let mut child_cross_mode;

            let align = data.align_item(owner);
            let stretches = align == Align::Stretch && !data.has_auto_cross_margin(cross_axis);
            let cross_style_defined =
                data.is_style_dim_defined(cross_axis, available_inner_cross_dim);

            if let Some(ratio) = data.style.aspect_ratio {
                child_cross_size = if container.is_main_axis_row {
                    (child_main_size - margin_main) / ratio
                } else {
                    (child_main_size - margin_main) * ratio
                } + margin_cross;
                child_cross_mode = MeasureMode::Exactly;
            } else if !is_undefined(available_inner_cross_dim)
                && !cross_style_defined
                && container.cross_mode == MeasureMode::Exactly
                && !(container.is_wrap && flex_basis_overflows)
                && stretches
            {
                child_cross_size = available_inner_cross_dim;
                child_cross_mode = MeasureMode::Exactly;
            } else if !cross_style_defined {
                child_cross_size = available_inner_cross_dim;
                child_cross_mode = if is_undefined(child_cross_size) {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::AtMost
                };
            } else {
                let resolved = data.resolved_dimension(cross_axis);
                child_cross_size =
                    resolve_value(resolved, available_inner_cross_dim) + margin_cross;
                // A percentage of a cross size that is not final yet cannot be trusted.
                let loose_percentage = matches!(resolved, Length::Percent(_))
                    && container.cross_mode != MeasureMode::Exactly;
                child_cross_mode = if is_undefined(child_cross_size) || loose_percentage {
                    MeasureMode::Undefined
                } else {
                    MeasureMode::Exactly
                };
            }

            data.constrain_max_size_for_mode(
                main_axis,
                container.available_inner_main_dim,
                available_inner_width,
                &mut child_main_mode,
                &mut child_main_size,
            );
            data.constrain_max_size_for_mode(
                cross_axis,
                available_inner_cross_dim,
                available_inner_width,
                &mut child_cross_mode,
                &mut child_cross_size,
            );

            // Stretched items are laid out again once the line's cross size is known.
            let requires_stretch_layout = !cross_style_defined && stretches;

            let (child_width, child_height, width_mode, height_mode) = if container.is_main_axis_row
            {
                (child_main_size, child_cross_size, child_main_mode, child_cross_mode)
            } else {
                (child_cross_size, child_main_size, child_cross_mode, child_main_mode)
            };

            let perform_layout = container.perform_layout && !requires_stretch_layout;
            self.layout_node_internal(
                child,
                child_width,
                child_height,
                container.direction,
                width_mode,
                height_mode,
                available_inner_width,
                container.available_inner_height,
                perform_layout,
                if perform_layout {
                    LayoutPassReason::FlexLayout
                } else {
                    LayoutPassReason::FlexMeasure
                },
            );

            let had_overflow = self.nodes[child].layout.had_overflow;
            self.nodes[container.id].layout.had_overflow |= had_overflow;
        }

        delta_free_space
    }

    /// Positions the line's items along the main axis and computes the line's main and
    /// cross size.
    pub(super) fn justify_main_axis(
        &mut self,
        container: &FlexContainer,
        line: &mut FlexLine,
        start: usize,
    ) {
        let id = container.id;
        let main_axis = container.main_axis;
        let cross_axis = container.cross_axis;
        let available_inner_width = container.available_inner_width;
        let perform_layout = container.perform_layout;

        let node = &self.nodes[id];
        let leading_padding_and_border_main =
            node.leading_padding_and_border(main_axis, container.owner_width);
        let trailing_padding_and_border_main =
            node.trailing_padding_and_border(main_axis, container.owner_width);
        let leading_border_main = node.leading_border(main_axis);
        let justify_content = node.style.justify_content;

        // Content smaller than the container's min size is justified within that min size.
        if container.main_mode == MeasureMode::AtMost && line.remaining_free_space > 0.0 {
            let min = node.style.min_dimension(main_axis.dimension());
            let resolved_min = resolve_value(min, container.main_axis_owner_size);
            line.remaining_free_space = if !is_undefined(resolved_min) {
                let min_available_main_dim = resolved_min
                    - leading_padding_and_border_main
                    - trailing_padding_and_border_main;
                let occupied_space =
                    container.available_inner_main_dim - line.remaining_free_space;
                float_max(0.0, min_available_main_dim - occupied_space)
            } else {
                0.0
            };
        }

        let mut auto_margins = 0;
        for index in start..line.end_of_line_index {
            let data = &self.nodes[self.nodes[id].children[index]];
            if data.style.position_type == PositionType::Relative {
                if data.margin_leading_value(main_axis).is_auto() {
                    auto_margins += 1;
                }
                if data.margin_trailing_value(main_axis).is_auto() {
                    auto_margins += 1;
                }
            }
        }

        // Automatic margins take precedence over justify-content.
        let mut leading_main_dim = 0.0;
        let mut between_main_dim = 0.0;
        let remaining = line.remaining_free_space;
        let items = line.items_on_line;
        if auto_margins == 0 {
            match justify_content {
                Justify::FlexStart => {}
                Justify::Center => leading_main_dim = remaining / 2.0,
                Justify::FlexEnd => leading_main_dim = remaining,
                Justify::SpaceBetween => {
                    if items > 1 {
                        between_main_dim = float_max(remaining, 0.0) / (items - 1) as f32;
                    }
                }
                Justify::SpaceEvenly => {
                    between_main_dim = remaining / (items + 1) as f32;
                    leading_main_dim = between_main_dim;
                }
                Justify::SpaceAround => {
                    if items > 0 {
                        between_main_dim = remaining / items as f32;
                        leading_main_dim = between_main_dim / 2.0;
                    }
                }
            }
        }

        let is_baseline_layout = self.is_baseline_layout(id);
        let can_skip_flex = !perform_layout && container.cross_mode == MeasureMode::Exactly;
        let mut main_dim = leading_padding_and_border_main + leading_main_dim;
        let mut cross_dim: f32 = 0.0;
        let mut max_ascent: f32 = 0.0;
        let mut max_descent: f32 = 0.0;

        for index in start..line.end_of_line_index {
            let child = self.nodes[id].children[index];
            let data = &self.nodes[child];
            if data.style.display == Display::None {
                continue;
            }
            let leading_edge = main_axis.leading_edge();

            if data.style.position_type == PositionType::Absolute
                && data.is_leading_position_defined(main_axis)
            {
                if perform_layout {
                    // Explicit offsets are relative to the padding box.
                    let position = data
                        .leading_position(main_axis, container.available_inner_main_dim)
                        + leading_border_main
                        + data.leading_margin(main_axis, available_inner_width);
                    self.nodes[child].set_layout_position(leading_edge, position);
                }
                continue;
            }

            if data.style.position_type == PositionType::Absolute {
                // Without a leading offset the item starts where the line's content starts.
                if perform_layout {
                    let data = &mut self.nodes[child];
                    let position =
                        data.layout_position(leading_edge) + leading_border_main + leading_main_dim;
                    data.set_layout_position(leading_edge, position);
                }
                continue;
            }

            let auto_margin_space = if auto_margins > 0 {
                remaining / auto_margins as f32
            } else {
                0.0
            };
            if data.margin_leading_value(main_axis).is_auto() {
                main_dim += auto_margin_space;
            }
            if perform_layout {
                let data = &mut self.nodes[child];
                let position = data.layout_position(leading_edge) + main_dim;
                data.set_layout_position(leading_edge, position);
            }
            let data = &self.nodes[child];
            if data.margin_trailing_value(main_axis).is_auto() {
                main_dim += auto_margin_space;
            }

            if can_skip_flex {
                // The flexed sizes are unknown, the bases are a good enough estimate.
                main_dim += between_main_dim
                    + data.margin_for_axis(main_axis, available_inner_width)
                    + data.state.computed_flex_basis;
                cross_dim = container.available_inner_cross_dim;
            } else {
                main_dim +=
                    between_main_dim + data.dim_with_margin(main_axis, available_inner_width);
                if is_baseline_layout {
                    let ascent = self.baseline(child)
                        + data.leading_margin(FlexDirection::Column, available_inner_width);
                    let descent = data.measured(FlexDirection::Column)
                        + data.margin_for_axis(FlexDirection::Column, available_inner_width)
                        - ascent;
                    max_ascent = float_max(max_ascent, ascent);
                    max_descent = float_max(max_descent, descent);
                } else {
                    cross_dim = float_max(
                        cross_dim,
                        data.dim_with_margin(cross_axis, available_inner_width),
                    );
                }
            }
        }
        main_dim += trailing_padding_and_border_main;

        if is_baseline_layout {
            cross_dim = max_ascent + max_descent;
        }
        line.main_dim = main_dim;
        line.cross_dim = cross_dim;
    }
}
