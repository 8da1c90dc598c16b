//! The flexbox layout algorithm.
//!
//! [`LayoutTree::calculate_layout`] lays out a subtree in a single depth-first pass. Every
//! node is visited through [`LayoutTree::layout_node_internal`], which consults the node's
//! measurement cache before running the algorithm. Containers then go through the numbered
//! steps of the flex algorithm:
//!
//! 1. resolve the container's own constraints,
//! 2. compute the available inner size,
//! 3. determine each child's flex basis,
//! 4. collect children into lines,
//! 5. resolve flexible lengths on each line,
//! 6. justify each line along the main axis,
//! 7. align children along the cross axis,
//! 8. distribute lines along the cross axis,
//! 9. compute the container's final size,
//! 10. lay out absolutely positioned children,
//! 11. fill in trailing positions for reversed axes.

mod absolute;
mod align;
pub(crate) mod axis;
mod baseline;
mod flex_basis;
mod flex_line;
pub(crate) mod numeric;
mod resolve;
pub(crate) mod rounding;

use crate::{
    LayoutTree, NodeId,
    cache::{CachedMeasurement, MAX_CACHED_MEASUREMENTS, can_use_cached_measurement},
    config::LogLevel,
    error::{LayoutError, LayoutResult},
    events::{LayoutEvents, LayoutPassReason},
    geometry::Size,
    node::{MeasureFunc, MeasureMode, NodeType},
    print::PrintOptions,
    style::{Direction, Display, Edge, FlexDirection, Length, Overflow, PositionType, Wrap},
};
use numeric::{UNDEFINED, float_max, float_min, is_undefined};
use resolve::resolve_value;
use stacksafe::stacksafe;
use std::{collections::VecDeque, sync::Arc};

/// Values of a container that the steps of the flex algorithm share.
pub(crate) struct FlexContainer {
    pub id: NodeId,
    pub direction: Direction,
    pub main_axis: FlexDirection,
    pub cross_axis: FlexDirection,
    pub is_main_axis_row: bool,
    pub is_wrap: bool,
    pub owner_width: f32,
    pub main_axis_owner_size: f32,
    pub width_mode: MeasureMode,
    pub height_mode: MeasureMode,
    pub available_inner_width: f32,
    pub available_inner_height: f32,
    pub available_inner_main_dim: f32,
    pub available_inner_cross_dim: f32,
    pub main_mode: MeasureMode,
    pub cross_mode: MeasureMode,
    pub perform_layout: bool,
}

impl LayoutTree {
    /// Lays out the subtree rooted at `root`.
    ///
    /// An undefined available size sizes that axis to its content. The subtree is validated
    /// before any layout field is written, so on error the previous layout stays intact.
    ///
    /// `root` is expected to be the root of the tree being laid out. Calling this on a node
    /// that has an owner lays out only that subtree, relative to an owner it knows nothing
    /// about.
    pub fn calculate_layout(
        &mut self,
        root: NodeId,
        available_space: Size<Option<f32>>,
        direction: Direction,
    ) -> LayoutResult<()> {
        self.data(root)?;
        self.freeze_subtree(root);
        self.validate_subtree(root)?;

        self.events = LayoutEvents::default();
        self.generation = self.generation.wrapping_add(1);

        let owner_width = available_space.width.unwrap_or(UNDEFINED);
        let owner_height = available_space.height.unwrap_or(UNDEFINED);

        let node = &mut self.nodes[root];
        node.resolve_dimensions();
        let (width, width_mode) = root_constraint(
            node.is_style_dim_defined(FlexDirection::Row, owner_width),
            resolve_value(node.resolved_dimension(FlexDirection::Row), owner_width)
                + node.margin_for_axis(FlexDirection::Row, owner_width),
            resolve_value(node.style.max_size.width, owner_width),
            owner_width,
        );
        let (height, height_mode) = root_constraint(
            node.is_style_dim_defined(FlexDirection::Column, owner_height),
            resolve_value(node.resolved_dimension(FlexDirection::Column), owner_height)
                + node.margin_for_axis(FlexDirection::Column, owner_width),
            resolve_value(node.style.max_size.height, owner_height),
            owner_height,
        );

        self.layout_node_internal(
            root,
            width,
            height,
            direction,
            width_mode,
            height_mode,
            owner_width,
            owner_height,
            true,
            LayoutPassReason::Initial,
        );
        // A cache hit copies the unrounded measured size back into the layout.
        self.finish_root(root, owner_width, owner_height);

        let config = self.nodes[root].config.clone();
        if config.print_tree() {
            let options = PrintOptions::LAYOUT | PrintOptions::STYLE | PrintOptions::CHILDREN;
            let printed = self.print_tree(root, options)?;
            config.log(Some(root), LogLevel::Debug, &printed);
        }

        if config.should_diff_layout_without_legacy_stretch_behaviour()
            && self.used_legacy_flag(root)
        {
            self.diff_without_legacy_stretch(
                root,
                (width, width_mode),
                (height, height_mode),
                owner_width,
                owner_height,
                direction,
            )?;
        }

        Ok(())
    }

    fn finish_root(&mut self, root: NodeId, owner_width: f32, owner_height: f32) {
        let node = &mut self.nodes[root];
        let direction = node.layout.direction;
        node.set_position(direction, owner_width, owner_height, owner_width);
        let point_scale_factor = node.config.point_scale_factor();
        self.round_to_pixel_grid(root, point_scale_factor);
    }

    /// Gives every node a chance to snapshot external state, root first and then breadth
    /// first.
    fn freeze_subtree(&self, root: NodeId) {
        let mut queue = VecDeque::from([(root, None)]);
        while let Some((id, owner)) = queue.pop_front() {
            let node = &self.nodes[id];
            if let Some(freeze) = &node.freeze {
                freeze(id, owner);
            }
            queue.extend(node.children.iter().map(|child| (*child, Some(id))));
        }
    }

    fn validate_subtree(&self, root: NodeId) -> LayoutResult<()> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            let definite = |length: Length| {
                matches!(length, Length::Points(v) | Length::Percent(v) if v >= 0.0)
            };
            if node.node_type == NodeType::Text
                && node.measure.is_none()
                && !(definite(node.style.size.width) && definite(node.style.size.height))
            {
                return Err(LayoutError::MeasureFunctionUndefined(id));
            }
            stack.extend(node.children.iter().copied());
        }
        Ok(())
    }

    /// Lays out or measures a node, reusing a cached result when the node is clean and the
    /// query matches a previous one.
    #[stacksafe]
    pub(crate) fn layout_node_internal(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        owner_direction: Direction,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
        perform_layout: bool,
        reason: LayoutPassReason,
    ) {
        let generation = self.generation;
        let node = &mut self.nodes[id];
        let need_to_visit = (node.is_dirty && node.state.generation_count != generation)
            || node.state.last_owner_direction != Some(owner_direction);
        if need_to_visit {
            node.state.cache.clear();
        }

        let cached = if node.measure.is_some() {
            // Self-measuring nodes are the most expensive to measure, so looser matches are
            // accepted for them.
            let margin_row = node.margin_for_axis(FlexDirection::Row, owner_width);
            let margin_column = node.margin_for_axis(FlexDirection::Column, owner_width);
            let point_scale_factor = node.config.point_scale_factor();
            let usable = |entry: &CachedMeasurement| {
                can_use_cached_measurement(
                    width_mode,
                    available_width,
                    height_mode,
                    available_height,
                    entry,
                    margin_row,
                    margin_column,
                    point_scale_factor,
                )
            };
            let cache = &node.state.cache;
            if usable(cache.layout_entry()) {
                Some(*cache.layout_entry())
            } else {
                cache.measurements().iter().find(|entry| usable(entry)).copied()
            }
        } else if perform_layout {
            let entry = node.state.cache.layout_entry();
            entry
                .matches_exactly(available_width, width_mode, available_height, height_mode)
                .then_some(*entry)
        } else {
            node.state
                .cache
                .measurements()
                .iter()
                .find(|entry| {
                    entry.matches_exactly(
                        available_width,
                        width_mode,
                        available_height,
                        height_mode,
                    )
                })
                .copied()
        };

        match cached {
            Some(cached) if !need_to_visit => {
                node.state.measured_dimensions.width = cached.computed_width;
                node.state.measured_dimensions.height = cached.computed_height;
                if perform_layout {
                    self.events.cached_layouts += 1;
                } else {
                    self.events.cached_measures += 1;
                }
            }
            _ => {
                self.layout_impl(
                    id,
                    available_width,
                    available_height,
                    owner_direction,
                    width_mode,
                    height_mode,
                    owner_width,
                    owner_height,
                    perform_layout,
                    reason,
                );

                let node = &mut self.nodes[id];
                node.state.last_owner_direction = Some(owner_direction);
                if cached.is_none() {
                    let slots = node.state.cache.next_len().min(MAX_CACHED_MEASUREMENTS) as u32;
                    self.events.max_measure_cache = self.events.max_measure_cache.max(slots);
                    let entry = CachedMeasurement::new(
                        available_width,
                        width_mode,
                        available_height,
                        height_mode,
                        node.state.measured_dimensions.width,
                        node.state.measured_dimensions.height,
                    );
                    if node.state.cache.store(perform_layout, entry) {
                        node.config
                            .log(Some(id), LogLevel::Verbose, "Out of cache entries!");
                    }
                }
            }
        }

        let node = &mut self.nodes[id];
        if perform_layout {
            node.layout.dimensions = node.state.measured_dimensions;
            node.has_new_layout = true;
            node.is_dirty = false;
        }
        node.state.generation_count = generation;
    }

    fn layout_impl(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        owner_direction: Direction,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
        perform_layout: bool,
        reason: LayoutPassReason,
    ) {
        if perform_layout {
            self.events.layouts += 1;
        } else {
            self.events.measures += 1;
        }

        let node = &mut self.nodes[id];
        let direction = node.resolve_direction(owner_direction);
        node.layout.direction = direction;

        let flex_row = FlexDirection::Row.resolve(direction);
        let flex_column = FlexDirection::Column.resolve(direction);
        let (start_edge, end_edge) = if direction == Direction::Rtl {
            (Edge::Right, Edge::Left)
        } else {
            (Edge::Left, Edge::Right)
        };

        let edges = [
            (start_edge, flex_row, true),
            (end_edge, flex_row, false),
            (Edge::Top, flex_column, true),
            (Edge::Bottom, flex_column, false),
        ];
        for (edge, axis, leading) in edges {
            let slot = edge as usize;
            if leading {
                node.layout.margin[slot] = node.leading_margin(axis, owner_width);
                node.layout.border[slot] = node.leading_border(axis);
                node.layout.padding[slot] = node.leading_padding(axis, owner_width);
            } else {
                node.layout.margin[slot] = node.trailing_margin(axis, owner_width);
                node.layout.border[slot] = node.trailing_border(axis);
                node.layout.padding[slot] = node.trailing_padding(axis, owner_width);
            }
        }

        if let Some(measure) = node.measure.clone() {
            self.measure_leaf(
                id,
                measure,
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_width,
                owner_height,
                reason,
            );
            return;
        }

        if node.children.is_empty() {
            self.size_empty_container(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_width,
                owner_height,
            );
            return;
        }

        // Measuring a container whose size is already known needs no work.
        if !perform_layout
            && self.size_fixed_container(
                id,
                available_width,
                available_height,
                width_mode,
                height_mode,
                owner_width,
                owner_height,
            )
        {
            return;
        }

        self.nodes[id].layout.had_overflow = false;
        self.layout_flex_container(
            id,
            direction,
            available_width,
            available_height,
            width_mode,
            height_mode,
            owner_width,
            owner_height,
            perform_layout,
        );
    }

    fn measure_leaf(
        &mut self,
        id: NodeId,
        measure: MeasureFunc,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
        reason: LayoutPassReason,
    ) {
        let node = &self.nodes[id];
        let padding_and_border_row =
            node.padding_and_border_for_axis(FlexDirection::Row, available_width);
        let padding_and_border_column =
            node.padding_and_border_for_axis(FlexDirection::Column, available_width);
        let margin_row = node.margin_for_axis(FlexDirection::Row, available_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, available_width);

        if width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly {
            let width = node.bound_axis(
                FlexDirection::Row,
                available_width - margin_row,
                owner_width,
                owner_width,
            );
            let height = node.bound_axis(
                FlexDirection::Column,
                available_height - margin_column,
                owner_height,
                owner_width,
            );
            let node = &mut self.nodes[id];
            node.state.measured_dimensions.width = width;
            node.state.measured_dimensions.height = height;
            return;
        }

        // Never ask the callback to fit into a negative size.
        let inner_width = if is_undefined(available_width) {
            available_width
        } else {
            float_max(0.0, available_width - margin_row - padding_and_border_row)
        };
        let inner_height = if is_undefined(available_height) {
            available_height
        } else {
            float_max(0.0, available_height - margin_column - padding_and_border_column)
        };

        let measured = measure(id, inner_width, width_mode, inner_height, height_mode);
        self.events.record_measure_callback(reason);

        let node = &mut self.nodes[id];
        let content_width = match width_mode {
            MeasureMode::Undefined | MeasureMode::AtMost => {
                measured.width + padding_and_border_row
            }
            MeasureMode::Exactly => available_width - margin_row,
        };
        let content_height = match height_mode {
            MeasureMode::Undefined | MeasureMode::AtMost => {
                measured.height + padding_and_border_column
            }
            MeasureMode::Exactly => available_height - margin_column,
        };
        let width = node.bound_axis(FlexDirection::Row, content_width, owner_width, owner_width);
        let height =
            node.bound_axis(FlexDirection::Column, content_height, owner_height, owner_width);
        node.state.measured_dimensions.width = width;
        node.state.measured_dimensions.height = height;
    }

    /// A container without children is as large as its padding and border unless its size is
    /// imposed.
    fn size_empty_container(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
    ) {
        let node = &mut self.nodes[id];
        let padding_and_border_row =
            node.padding_and_border_for_axis(FlexDirection::Row, owner_width);
        let padding_and_border_column =
            node.padding_and_border_for_axis(FlexDirection::Column, owner_width);
        let margin_row = node.margin_for_axis(FlexDirection::Row, owner_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, owner_width);

        let width = match width_mode {
            MeasureMode::Undefined | MeasureMode::AtMost => padding_and_border_row,
            MeasureMode::Exactly => available_width - margin_row,
        };
        let height = match height_mode {
            MeasureMode::Undefined | MeasureMode::AtMost => padding_and_border_column,
            MeasureMode::Exactly => available_height - margin_column,
        };
        node.state.measured_dimensions.width =
            node.bound_axis(FlexDirection::Row, width, owner_width, owner_width);
        node.state.measured_dimensions.height =
            node.bound_axis(FlexDirection::Column, height, owner_height, owner_width);
    }

    fn size_fixed_container(
        &mut self,
        id: NodeId,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
    ) -> bool {
        let no_room = |available: f32, mode: MeasureMode| {
            !is_undefined(available) && mode == MeasureMode::AtMost && available <= 0.0
        };
        let exact = width_mode == MeasureMode::Exactly && height_mode == MeasureMode::Exactly;
        if !(exact
            || no_room(available_width, width_mode)
            || no_room(available_height, height_mode))
        {
            return false;
        }

        let node = &mut self.nodes[id];
        let margin_row = node.margin_for_axis(FlexDirection::Row, owner_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, owner_width);
        let clamp = |available: f32, mode: MeasureMode, margin: f32| {
            if is_undefined(available) || (mode == MeasureMode::AtMost && available < 0.0) {
                0.0
            } else {
                available - margin
            }
        };
        let width = clamp(available_width, width_mode, margin_row);
        let height = clamp(available_height, height_mode, margin_column);
        node.state.measured_dimensions.width =
            node.bound_axis(FlexDirection::Row, width, owner_width, owner_width);
        node.state.measured_dimensions.height =
            node.bound_axis(FlexDirection::Column, height, owner_height, owner_width);
        true
    }

    fn layout_flex_container(
        &mut self,
        id: NodeId,
        direction: Direction,
        available_width: f32,
        available_height: f32,
        width_mode: MeasureMode,
        height_mode: MeasureMode,
        owner_width: f32,
        owner_height: f32,
        perform_layout: bool,
    ) {
        // STEP 1: values used throughout the algorithm.
        let node = &self.nodes[id];
        let main_axis = node.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);
        let is_main_axis_row = main_axis.is_row();
        let is_wrap = node.style.flex_wrap != Wrap::NoWrap;

        let (main_axis_owner_size, cross_axis_owner_size) = if is_main_axis_row {
            (owner_width, owner_height)
        } else {
            (owner_height, owner_width)
        };

        let leading_padding_and_border_cross =
            node.leading_padding_and_border(cross_axis, owner_width);
        let padding_and_border_main = node.padding_and_border_for_axis(main_axis, owner_width);
        let padding_and_border_cross = node.padding_and_border_for_axis(cross_axis, owner_width);

        let (main_mode, cross_mode) = if is_main_axis_row {
            (width_mode, height_mode)
        } else {
            (height_mode, width_mode)
        };
        let (padding_and_border_row, padding_and_border_column) = if is_main_axis_row {
            (padding_and_border_main, padding_and_border_cross)
        } else {
            (padding_and_border_cross, padding_and_border_main)
        };

        let margin_row = node.margin_for_axis(FlexDirection::Row, owner_width);
        let margin_column = node.margin_for_axis(FlexDirection::Column, owner_width);

        let min_inner_width =
            resolve_value(node.style.min_size.width, owner_width) - padding_and_border_row;
        let max_inner_width =
            resolve_value(node.style.max_size.width, owner_width) - padding_and_border_row;
        let min_inner_height =
            resolve_value(node.style.min_size.height, owner_height) - padding_and_border_column;
        let max_inner_height =
            resolve_value(node.style.max_size.height, owner_height) - padding_and_border_column;
        let (min_inner_main_dim, max_inner_main_dim) = if is_main_axis_row {
            (min_inner_width, max_inner_width)
        } else {
            (min_inner_height, max_inner_height)
        };

        // STEP 2: available size inside padding and border.
        let available_inner_width = self.available_inner_dim(
            id,
            FlexDirection::Row,
            available_width - margin_row,
            owner_width,
            owner_width,
        );
        let available_inner_height = self.available_inner_dim(
            id,
            FlexDirection::Column,
            available_height - margin_column,
            owner_height,
            owner_width,
        );
        let (available_inner_main_dim, available_inner_cross_dim) = if is_main_axis_row {
            (available_inner_width, available_inner_height)
        } else {
            (available_inner_height, available_inner_width)
        };

        let mut container = FlexContainer {
            id,
            direction,
            main_axis,
            cross_axis,
            is_main_axis_row,
            is_wrap,
            owner_width,
            main_axis_owner_size,
            width_mode,
            height_mode,
            available_inner_width,
            available_inner_height,
            available_inner_main_dim,
            available_inner_cross_dim,
            main_mode,
            cross_mode,
            perform_layout,
        };

        // STEP 3: flex basis of every child.
        let total_outer_flex_basis = self.compute_flex_basis_for_children(&container);
        let flex_basis_overflows = container.main_mode != MeasureMode::Undefined
            && total_outer_flex_basis > container.available_inner_main_dim;
        if is_wrap && flex_basis_overflows && container.main_mode == MeasureMode::AtMost {
            container.main_mode = MeasureMode::Exactly;
        }

        // STEP 4: collect children into lines, then lay out each line.
        let child_count = self.nodes[id].children.len();
        let mut start_of_line = 0;
        let mut line_count = 0;
        let mut total_line_cross_dim = 0.0;
        let mut max_line_main_dim: f32 = 0.0;

        while start_of_line < child_count {
            let mut line = self.collect_flex_line(&container, start_of_line, line_count);

            // Measuring with an exact cross size does not need the flexed sizes.
            let can_skip_flex = !perform_layout && container.cross_mode == MeasureMode::Exactly;

            // STEP 5: resolve flexible lengths.
            let mut size_based_on_content = false;
            if container.main_mode != MeasureMode::Exactly {
                if !is_undefined(min_inner_main_dim) && line.size_consumed < min_inner_main_dim {
                    container.available_inner_main_dim = min_inner_main_dim;
                } else if !is_undefined(max_inner_main_dim)
                    && line.size_consumed > max_inner_main_dim
                {
                    container.available_inner_main_dim = max_inner_main_dim;
                } else {
                    let node = &mut self.nodes[id];
                    let legacy = node.config.use_legacy_stretch_behaviour();
                    if legacy {
                        node.state.did_use_legacy_flag = true;
                    }
                    size_based_on_content = !legacy;
                }
            }

            if !size_based_on_content && !is_undefined(container.available_inner_main_dim) {
                line.remaining_free_space = container.available_inner_main_dim - line.size_consumed;
            } else if line.size_consumed < 0.0 {
                // Sized by content that wants a negative size: it gets zero.
                line.remaining_free_space = -line.size_consumed;
            }

            if !can_skip_flex {
                self.resolve_flexible_length(&container, &mut line, flex_basis_overflows);
            }
            self.nodes[id].layout.had_overflow |= line.remaining_free_space < 0.0;

            // STEP 6: main axis justification and cross size of the line.
            self.justify_main_axis(&container, &mut line, start_of_line);

            let node = &self.nodes[id];
            let mut container_cross_axis = container.available_inner_cross_dim;
            if matches!(container.cross_mode, MeasureMode::Undefined | MeasureMode::AtMost) {
                container_cross_axis = node.bound_axis(
                    cross_axis,
                    line.cross_dim + padding_and_border_cross,
                    cross_axis_owner_size,
                    owner_width,
                ) - padding_and_border_cross;
            }

            // Without wrapping, the single line takes the container's cross size.
            if !is_wrap && container.cross_mode == MeasureMode::Exactly {
                line.cross_dim = container.available_inner_cross_dim;
            }
            line.cross_dim = node.bound_axis(
                cross_axis,
                line.cross_dim + padding_and_border_cross,
                cross_axis_owner_size,
                owner_width,
            ) - padding_and_border_cross;

            // STEP 7: cross axis alignment within the line.
            if perform_layout {
                self.align_line_cross_axis(
                    &container,
                    &line,
                    start_of_line,
                    container_cross_axis,
                    total_line_cross_dim,
                    leading_padding_and_border_cross,
                );
            }

            total_line_cross_dim += line.cross_dim;
            max_line_main_dim = float_max(max_line_main_dim, line.main_dim);
            line_count += 1;
            start_of_line = line.end_of_line_index;
        }

        // STEP 8: distribute lines along the cross axis.
        if perform_layout
            && (line_count > 1 || self.is_baseline_layout(id))
            && !is_undefined(container.available_inner_cross_dim)
        {
            self.align_content(
                &container,
                line_count,
                total_line_cross_dim,
                leading_padding_and_border_cross,
            );
        }

        // STEP 9: final size of the container.
        let node = &mut self.nodes[id];
        let width = node.bound_axis(
            FlexDirection::Row,
            available_width - margin_row,
            owner_width,
            owner_width,
        );
        let height = node.bound_axis(
            FlexDirection::Column,
            available_height - margin_column,
            owner_height,
            owner_width,
        );
        node.state.measured_dimensions.width = width;
        node.state.measured_dimensions.height = height;

        let scrolls = node.style.overflow == Overflow::Scroll;
        if container.main_mode == MeasureMode::Undefined
            || (!scrolls && container.main_mode == MeasureMode::AtMost)
        {
            let size =
                node.bound_axis(main_axis, max_line_main_dim, main_axis_owner_size, owner_width);
            node.set_measured(main_axis, size);
        } else if container.main_mode == MeasureMode::AtMost && scrolls {
            let size = float_max(
                float_min(
                    container.available_inner_main_dim + padding_and_border_main,
                    node.bound_axis_within_min_max(
                        main_axis,
                        max_line_main_dim,
                        main_axis_owner_size,
                    ),
                ),
                padding_and_border_main,
            );
            node.set_measured(main_axis, size);
        }

        if container.cross_mode == MeasureMode::Undefined
            || (!scrolls && container.cross_mode == MeasureMode::AtMost)
        {
            let size = node.bound_axis(
                cross_axis,
                total_line_cross_dim + padding_and_border_cross,
                cross_axis_owner_size,
                owner_width,
            );
            node.set_measured(cross_axis, size);
        } else if container.cross_mode == MeasureMode::AtMost && scrolls {
            let size = float_max(
                float_min(
                    container.available_inner_cross_dim + padding_and_border_cross,
                    node.bound_axis_within_min_max(
                        cross_axis,
                        total_line_cross_dim + padding_and_border_cross,
                        cross_axis_owner_size,
                    ),
                ),
                padding_and_border_cross,
            );
            node.set_measured(cross_axis, size);
        }

        let children = node.children.clone();

        // Lines were laid out in normal order; wrap-reverse mirrors them.
        if perform_layout && node.style.flex_wrap == Wrap::WrapReverse {
            let cross_size = node.measured(cross_axis);
            for child in &children {
                let child = &mut self.nodes[*child];
                if child.style.position_type != PositionType::Relative
                    || child.style.display == Display::None
                {
                    continue;
                }
                let leading = cross_axis.leading_edge();
                let position =
                    cross_size - child.layout_position(leading) - child.measured(cross_axis);
                child.set_layout_position(leading, position);
            }
        }

        if perform_layout {
            // STEP 10: absolutely positioned children.
            let absolute_width_mode = if is_main_axis_row {
                container.main_mode
            } else {
                container.cross_mode
            };
            for child in &children {
                let data = &self.nodes[*child];
                if data.style.display == Display::None
                    || data.style.position_type != PositionType::Absolute
                {
                    continue;
                }
                self.layout_absolute_child(&container, *child, absolute_width_mode);
            }

            // STEP 11: trailing positions for reversed axes.
            let needs_main_trailing = main_axis.is_reverse();
            let needs_cross_trailing = cross_axis.is_reverse();
            if needs_main_trailing || needs_cross_trailing {
                for child in &children {
                    if self.nodes[*child].style.display == Display::None {
                        continue;
                    }
                    if needs_main_trailing {
                        self.set_child_trailing_position(id, *child, main_axis);
                    }
                    if needs_cross_trailing {
                        self.set_child_trailing_position(id, *child, cross_axis);
                    }
                }
            }
        }
    }

    /// The space left for children along `axis` once margin, padding and border are taken
    /// out, clamped by the node's min and max size.
    fn available_inner_dim(
        &self,
        id: NodeId,
        axis: FlexDirection,
        available: f32,
        owner_size: f32,
        owner_width: f32,
    ) -> f32 {
        let node = &self.nodes[id];
        let dimension = axis.dimension();
        let padding_and_border = node.padding_and_border_for_axis(axis, owner_width);
        let inner = available - padding_and_border;
        if is_undefined(inner) {
            return inner;
        }

        let min = resolve_value(node.style.min_dimension(dimension), owner_size);
        let max = resolve_value(node.style.max_dimension(dimension), owner_size);
        let min_inner = if is_undefined(min) {
            0.0
        } else {
            min - padding_and_border
        };
        let max_inner = if is_undefined(max) {
            f32::MAX
        } else {
            max - padding_and_border
        };
        float_max(float_min(inner, max_inner), min_inner)
    }

    /// Resets the layout of a subtree that is not displayed.
    fn zero_out_layout(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id];
            node.layout = Default::default();
            node.layout.dimensions.width = 0.0;
            node.layout.dimensions.height = 0.0;
            node.state = Default::default();
            node.has_new_layout = true;
            stack.extend(node.children.iter().copied());
        }
    }

    fn set_child_trailing_position(&mut self, id: NodeId, child: NodeId, axis: FlexDirection) {
        let owner_size = self.nodes[id].measured(axis);
        let child = &mut self.nodes[child];
        let position =
            owner_size - child.measured(axis) - child.layout_position(axis.leading_edge());
        child.set_layout_position(axis.trailing_edge(), position);
    }

    fn used_legacy_flag(&self, root: NodeId) -> bool {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.state.did_use_legacy_flag {
                return true;
            }
            stack.extend(node.children.iter().copied());
        }
        false
    }

    /// Lays out a copy of the subtree without the legacy stretch behaviour and records on
    /// the root whether that changes any layout.
    fn diff_without_legacy_stretch(
        &mut self,
        root: NodeId,
        (width, width_mode): (f32, MeasureMode),
        (height, height_mode): (f32, MeasureMode),
        owner_width: f32,
        owner_height: f32,
        direction: Direction,
    ) -> LayoutResult<()> {
        let copy = self.clone_subtree(root, false)?;
        let mut stack = vec![copy];
        while let Some(id) = stack.pop() {
            let node = &mut self.nodes[id];
            node.config = Arc::new(
                (*node.config)
                    .clone()
                    .with_legacy_stretch_behaviour(false),
            );
            node.state.did_use_legacy_flag = false;
            stack.extend(node.children.iter().copied());
        }
        self.nodes[copy].resolve_dimensions();
        self.mark_dirty_all_descendants(copy)?;

        let events = std::mem::take(&mut self.events);
        self.generation = self.generation.wrapping_add(1);
        self.layout_node_internal(
            copy,
            width,
            height,
            direction,
            width_mode,
            height_mode,
            owner_width,
            owner_height,
            true,
            LayoutPassReason::Initial,
        );
        self.finish_root(copy, owner_width, owner_height);
        self.events = events;

        let affects_layout = !self.same_layout_tree(root, copy);
        self.nodes[root].state.does_legacy_stretch_flag_affect_layout = affects_layout;
        self.nodes[root].config.log(
            Some(root),
            LogLevel::Debug,
            &format!("legacy stretch behaviour affects layout: {affects_layout}"),
        );

        self.free_recursive(copy)
    }

    fn same_layout_tree(&self, a: NodeId, b: NodeId) -> bool {
        let mut stack = vec![(a, b)];
        while let Some((a, b)) = stack.pop() {
            let (a, b) = (&self.nodes[a], &self.nodes[b]);
            if a.children.len() != b.children.len() || !a.layout.same_as(&b.layout) {
                return false;
            }
            stack.extend(a.children.iter().copied().zip(b.children.iter().copied()));
        }
        true
    }
}

/// The constraint the root is laid out with along one axis: its own size, else its max
/// size as an upper bound, else the available space.
fn root_constraint(
    has_definite_size: bool,
    size_with_margin: f32,
    max_size: f32,
    available: f32,
) -> (f32, MeasureMode) {
    if has_definite_size {
        (size_with_margin, MeasureMode::Exactly)
    } else if !is_undefined(max_size) {
        (max_size, MeasureMode::AtMost)
    } else if is_undefined(available) {
        (available, MeasureMode::Undefined)
    } else {
        (available, MeasureMode::Exactly)
    }
}
