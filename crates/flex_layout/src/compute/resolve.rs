//! Style values of a node resolved against concrete owner sizes.

use super::numeric::{UNDEFINED, float_max, is_undefined};
use crate::{
    geometry::Dimension,
    node::{MeasureMode, NodeData},
    style::{Align, Direction, Edge, FlexDirection, Length, PositionType},
};

pub(crate) fn resolve_value(length: Length, owner_size: f32) -> f32 {
    length.resolve(Some(owner_size)).unwrap_or(UNDEFINED)
}

/// Automatic margins take no space until free space is handed out.
fn resolve_margin(length: Length, owner_size: f32) -> f32 {
    if length.is_auto() {
        0.0
    } else {
        resolve_value(length, owner_size)
    }
}

impl NodeData {
    pub(crate) fn resolve_direction(&self, owner_direction: Direction) -> Direction {
        match self.style.direction {
            Direction::Inherit if owner_direction != Direction::Inherit => owner_direction,
            Direction::Inherit => Direction::Ltr,
            direction => direction,
        }
    }

    /// The size style used for layout: a max size pinned to the min size wins over the
    /// declared size.
    pub(crate) fn resolve_dimensions(&mut self) {
        for dimension in [Dimension::Width, Dimension::Height] {
            let max = self.style.max_dimension(dimension);
            let resolved = if !max.is_undefined() && max == self.style.min_dimension(dimension) {
                max
            } else {
                self.style.dimension(dimension)
            };
            self.resolved_dimensions.set(dimension, resolved);
        }
    }

    pub(crate) fn is_style_dim_defined(&self, axis: FlexDirection, owner_size: f32) -> bool {
        match self.resolved_dimensions.get(axis.dimension()) {
            Length::Auto | Length::Undefined => false,
            Length::Points(value) => value >= 0.0,
            Length::Percent(value) => value >= 0.0 && !is_undefined(owner_size),
        }
    }

    pub(crate) fn is_layout_dim_defined(&self, axis: FlexDirection) -> bool {
        let value = self.state.measured_dimensions.get(axis.dimension());
        !is_undefined(value) && value >= 0.0
    }

    pub(crate) fn resolved_dimension(&self, axis: FlexDirection) -> Length {
        self.resolved_dimensions.get(axis.dimension())
    }

    pub(crate) fn measured(&self, axis: FlexDirection) -> f32 {
        self.state.measured_dimensions.get(axis.dimension())
    }

    pub(crate) fn set_measured(&mut self, axis: FlexDirection, value: f32) {
        self.state.measured_dimensions.set(axis.dimension(), value);
    }

    pub(crate) fn layout_position(&self, edge: Edge) -> f32 {
        self.layout.position[edge as usize]
    }

    pub(crate) fn set_layout_position(&mut self, edge: Edge, value: f32) {
        self.layout.position[edge as usize] = value;
    }

    pub(crate) fn is_leading_position_defined(&self, axis: FlexDirection) -> bool {
        (axis.is_row()
            && !self
                .style
                .position
                .computed(Edge::Start, Length::Undefined)
                .is_undefined())
            || !self
                .style
                .position
                .computed(axis.leading_edge(), Length::Undefined)
                .is_undefined()
    }

    pub(crate) fn is_trailing_position_defined(&self, axis: FlexDirection) -> bool {
        (axis.is_row()
            && !self
                .style
                .position
                .computed(Edge::End, Length::Undefined)
                .is_undefined())
            || !self
                .style
                .position
                .computed(axis.trailing_edge(), Length::Undefined)
                .is_undefined()
    }

    /// Offset from the leading edge, 0 when unset.
    pub(crate) fn leading_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if axis.is_row() {
            let start = self.style.position.computed(Edge::Start, Length::Undefined);
            if !start.is_undefined() {
                return resolve_value(start, axis_size);
            }
        }
        let leading = self
            .style
            .position
            .computed(axis.leading_edge(), Length::Undefined);
        if leading.is_undefined() {
            0.0
        } else {
            resolve_value(leading, axis_size)
        }
    }

    pub(crate) fn trailing_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if axis.is_row() {
            let end = self.style.position.computed(Edge::End, Length::Undefined);
            if !end.is_undefined() {
                return resolve_value(end, axis_size);
            }
        }
        let trailing = self
            .style
            .position
            .computed(axis.trailing_edge(), Length::Undefined);
        if trailing.is_undefined() {
            0.0
        } else {
            resolve_value(trailing, axis_size)
        }
    }

    /// Offset applied by relative positioning. A leading offset wins over a trailing one.
    pub(crate) fn relative_position(&self, axis: FlexDirection, axis_size: f32) -> f32 {
        if self.is_leading_position_defined(axis) {
            self.leading_position(axis, axis_size)
        } else {
            -self.trailing_position(axis, axis_size)
        }
    }

    pub(crate) fn leading_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let start = self.style.margin.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() {
            return resolve_margin(start, width_size);
        }
        resolve_margin(
            self.style
                .margin
                .computed(axis.leading_edge(), Length::Points(0.0)),
            width_size,
        )
    }

    pub(crate) fn trailing_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let end = self.style.margin.get(Edge::End);
        if axis.is_row() && !end.is_undefined() {
            return resolve_margin(end, width_size);
        }
        resolve_margin(
            self.style
                .margin
                .computed(axis.trailing_edge(), Length::Points(0.0)),
            width_size,
        )
    }

    pub(crate) fn margin_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_margin(axis, width_size) + self.trailing_margin(axis, width_size)
    }

    /// The margin value as declared, used to detect automatic margins.
    pub(crate) fn margin_leading_value(&self, axis: FlexDirection) -> Length {
        let start = self.style.margin.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() {
            start
        } else {
            self.style.margin.get(axis.leading_edge())
        }
    }

    pub(crate) fn margin_trailing_value(&self, axis: FlexDirection) -> Length {
        let end = self.style.margin.get(Edge::End);
        if axis.is_row() && !end.is_undefined() {
            end
        } else {
            self.style.margin.get(axis.trailing_edge())
        }
    }

    pub(crate) fn has_auto_cross_margin(&self, axis: FlexDirection) -> bool {
        self.margin_leading_value(axis).is_auto() || self.margin_trailing_value(axis).is_auto()
    }

    pub(crate) fn leading_border(&self, axis: FlexDirection) -> f32 {
        let start = self.style.border.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() && start.value() >= 0.0 {
            return start.value();
        }
        let computed = self
            .style
            .border
            .computed(axis.leading_edge(), Length::Points(0.0));
        float_max(computed.value(), 0.0)
    }

    pub(crate) fn trailing_border(&self, axis: FlexDirection) -> f32 {
        let end = self.style.border.get(Edge::End);
        if axis.is_row() && !end.is_undefined() && end.value() >= 0.0 {
            return end.value();
        }
        let computed = self
            .style
            .border
            .computed(axis.trailing_edge(), Length::Points(0.0));
        float_max(computed.value(), 0.0)
    }

    pub(crate) fn leading_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let start = self.style.padding.get(Edge::Start);
        if axis.is_row() && !start.is_undefined() {
            let resolved = resolve_value(start, width_size);
            if resolved >= 0.0 {
                return resolved;
            }
        }
        let computed = self
            .style
            .padding
            .computed(axis.leading_edge(), Length::Points(0.0));
        float_max(resolve_value(computed, width_size), 0.0)
    }

    pub(crate) fn trailing_padding(&self, axis: FlexDirection, width_size: f32) -> f32 {
        let end = self.style.padding.get(Edge::End);
        if axis.is_row() && !end.is_undefined() {
            let resolved = resolve_value(end, width_size);
            if resolved >= 0.0 {
                return resolved;
            }
        }
        let computed = self
            .style
            .padding
            .computed(axis.trailing_edge(), Length::Points(0.0));
        float_max(resolve_value(computed, width_size), 0.0)
    }

    pub(crate) fn leading_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding(axis, width_size) + self.leading_border(axis)
    }

    pub(crate) fn trailing_padding_and_border(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.trailing_padding(axis, width_size) + self.trailing_border(axis)
    }

    pub(crate) fn padding_and_border_for_axis(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.leading_padding_and_border(axis, width_size)
            + self.trailing_padding_and_border(axis, width_size)
    }

    /// Measured size plus margins along `axis`.
    pub(crate) fn dim_with_margin(&self, axis: FlexDirection, width_size: f32) -> f32 {
        self.measured(axis) + self.margin_for_axis(axis, width_size)
    }

    pub(crate) fn resolve_flex_grow(&self) -> f32 {
        if self.owner.is_none() {
            return 0.0;
        }
        if let Some(grow) = self.style.flex_grow {
            return grow;
        }
        match self.style.flex {
            Some(flex) if flex > 0.0 => flex,
            _ => 0.0,
        }
    }

    pub(crate) fn resolve_flex_shrink(&self) -> f32 {
        if self.owner.is_none() {
            return 0.0;
        }
        if let Some(shrink) = self.style.flex_shrink {
            return shrink;
        }
        let web_defaults = self.config.use_web_defaults();
        match self.style.flex {
            Some(flex) if !web_defaults && flex < 0.0 => -flex,
            _ if web_defaults => 1.0,
            _ => 0.0,
        }
    }

    pub(crate) fn resolve_flex_basis(&self) -> Length {
        let basis = self.style.flex_basis;
        if !basis.is_auto() && !basis.is_undefined() {
            return basis;
        }
        match self.style.flex {
            Some(flex) if flex > 0.0 => {
                if self.config.use_web_defaults() {
                    Length::Auto
                } else {
                    Length::Points(0.0)
                }
            }
            _ => Length::Auto,
        }
    }

    pub(crate) fn is_flexible(&self) -> bool {
        self.style.position_type != PositionType::Absolute
            && (self.resolve_flex_grow() != 0.0 || self.resolve_flex_shrink() != 0.0)
    }

    /// Clamps `value` to the min and max size along `axis`.
    pub(crate) fn bound_axis_within_min_max(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
    ) -> f32 {
        let dimension = axis.dimension();
        let min = resolve_value(self.style.min_dimension(dimension), axis_size);
        let max = resolve_value(self.style.max_dimension(dimension), axis_size);

        let mut bound = value;
        if !is_undefined(max) && max >= 0.0 && bound > max {
            bound = max;
        }
        if !is_undefined(min) && min >= 0.0 && bound < min {
            bound = min;
        }
        bound
    }

    /// Like [`Self::bound_axis_within_min_max`], but never smaller than padding and border.
    pub(crate) fn bound_axis(
        &self,
        axis: FlexDirection,
        value: f32,
        axis_size: f32,
        width_size: f32,
    ) -> f32 {
        float_max(
            self.bound_axis_within_min_max(axis, value, axis_size),
            self.padding_and_border_for_axis(axis, width_size),
        )
    }

    /// Applies the max size along `axis` to a pending measurement query.
    pub(crate) fn constrain_max_size_for_mode(
        &self,
        axis: FlexDirection,
        owner_axis_size: f32,
        owner_width: f32,
        mode: &mut MeasureMode,
        size: &mut f32,
    ) {
        let max_size = resolve_value(
            self.style.max_dimension(axis.dimension()),
            owner_axis_size,
        ) + self.margin_for_axis(axis, owner_width);
        match *mode {
            MeasureMode::Exactly | MeasureMode::AtMost => {
                if !is_undefined(max_size) && !(*size < max_size) {
                    *size = max_size;
                }
            }
            MeasureMode::Undefined => {
                if !is_undefined(max_size) {
                    *mode = MeasureMode::AtMost;
                    *size = max_size;
                }
            }
        }
    }

    /// Where this child sits on its owner's cross axis.
    pub(crate) fn align_item(&self, owner: &NodeData) -> Align {
        let align = if self.style.align_self == Align::Auto {
            owner.style.align_items
        } else {
            self.style.align_self
        };
        if align == Align::Baseline && owner.style.flex_direction.is_column() {
            Align::FlexStart
        } else {
            align
        }
    }

    /// Sets the position slots from margins and relative offsets.
    pub(crate) fn set_position(
        &mut self,
        direction: Direction,
        main_size: f32,
        cross_size: f32,
        owner_width: f32,
    ) {
        // The root has no owner to inherit a direction from.
        let direction = if self.owner.is_some() {
            direction
        } else {
            Direction::Ltr
        };
        let main_axis = self.style.flex_direction.resolve(direction);
        let cross_axis = main_axis.cross(direction);

        let relative_main = self.relative_position(main_axis, main_size);
        let relative_cross = self.relative_position(cross_axis, cross_size);

        let leading_main = self.leading_margin(main_axis, owner_width) + relative_main;
        let trailing_main = self.trailing_margin(main_axis, owner_width) + relative_main;
        let leading_cross = self.leading_margin(cross_axis, owner_width) + relative_cross;
        let trailing_cross = self.trailing_margin(cross_axis, owner_width) + relative_cross;

        self.set_layout_position(main_axis.leading_edge(), leading_main);
        self.set_layout_position(main_axis.trailing_edge(), trailing_main);
        self.set_layout_position(cross_axis.leading_edge(), leading_cross);
        self.set_layout_position(cross_axis.trailing_edge(), trailing_cross);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Config, NodeId, geometry::size};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn node() -> NodeData {
        NodeData::new(Arc::new(Config::new()))
    }

    fn owned(config: Config) -> NodeData {
        let mut data = NodeData::new(Arc::new(config));
        data.owner = Some(NodeId::default());
        data
    }

    #[test]
    fn test_flex_shorthand_resolution() {
        let mut data = owned(Config::new());
        data.style.flex = Some(2.0);
        assert_eq!(data.resolve_flex_grow(), 2.0);
        assert_eq!(data.resolve_flex_shrink(), 0.0);
        assert_eq!(data.resolve_flex_basis(), Length::Points(0.0));

        data.style.flex = Some(-1.5);
        assert_eq!(data.resolve_flex_grow(), 0.0);
        assert_eq!(data.resolve_flex_shrink(), 1.5);
        assert_eq!(data.resolve_flex_basis(), Length::Auto);

        let mut web = owned(Config::web());
        web.style.flex = Some(1.0);
        assert_eq!(web.resolve_flex_shrink(), 1.0);
        assert_eq!(web.resolve_flex_basis(), Length::Auto);
    }

    #[test]
    fn test_root_never_flexes() {
        let mut data = node();
        data.style.flex_grow = Some(1.0);
        assert_eq!(data.resolve_flex_grow(), 0.0);
        assert!(!data.is_flexible());
    }

    #[test]
    fn test_start_margin_wins_on_rows() {
        let mut data = node();
        data.style.margin.set(Edge::Left, Length::points(5.0));
        data.style.margin.set(Edge::Start, Length::points(7.0));
        data.style.margin.set(Edge::Top, Length::Auto);
        assert_eq!(data.leading_margin(FlexDirection::Row, 100.0), 7.0);
        assert_eq!(data.leading_margin(FlexDirection::RowReverse, 100.0), 7.0);
        assert_eq!(data.trailing_margin(FlexDirection::RowReverse, 100.0), 5.0);
        assert_eq!(data.trailing_margin(FlexDirection::Row, 100.0), 0.0);
        assert_eq!(data.leading_margin(FlexDirection::Column, 100.0), 0.0);
        assert!(data.margin_leading_value(FlexDirection::Column).is_auto());
    }

    #[test]
    fn test_percent_padding_resolves_against_width() {
        let mut data = node();
        data.style.padding.set(Edge::All, Length::percent(10.0));
        assert_eq!(data.padding_and_border_for_axis(FlexDirection::Column, 200.0), 40.0);
        assert_eq!(data.padding_and_border_for_axis(FlexDirection::Row, f32::NAN), 0.0);
    }

    #[test]
    fn test_bound_axis() {
        let mut data = node();
        data.style.min_size = size(Length::points(10.0), Length::Undefined);
        data.style.max_size = size(Length::points(50.0), Length::Undefined);
        data.style.padding.set(Edge::Horizontal, Length::points(15.0));
        assert_eq!(data.bound_axis_within_min_max(FlexDirection::Row, 5.0, 100.0), 10.0);
        assert_eq!(data.bound_axis_within_min_max(FlexDirection::Row, 80.0, 100.0), 50.0);
        assert_eq!(data.bound_axis(FlexDirection::Row, 5.0, 100.0, 100.0), 30.0);
    }

    #[test]
    fn test_resolved_dimension_prefers_pinned_max() {
        let mut data = node();
        data.style.size.width = Length::points(10.0);
        data.style.min_size.width = Length::points(40.0);
        data.style.max_size.width = Length::points(40.0);
        data.resolve_dimensions();
        assert_eq!(data.resolved_dimension(FlexDirection::Row), Length::points(40.0));
        assert_eq!(data.resolved_dimension(FlexDirection::Column), Length::Auto);
        assert!(data.is_style_dim_defined(FlexDirection::Row, f32::NAN));
        assert!(!data.is_style_dim_defined(FlexDirection::Column, 100.0));
    }
}
