//! Results of a layout pass as seen by consumers, and the bookkeeping the engine keeps next
//! to them between passes.

use crate::{
    cache::MeasureCache,
    compute::numeric::{UNDEFINED, floats_equal},
    geometry::{Bounds, Size, point, size},
    style::{Direction, Edge},
};
use strum::Display;

/// Edges of a computed layout. `Start` and `End` follow the resolved layout direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum LayoutEdge {
    Left,
    Top,
    Right,
    Bottom,
    Start,
    End,
}

/// The computed box of a node, relative to its owner's origin.
#[derive(Clone, Debug)]
pub struct Layout {
    pub(crate) position: [f32; 4],
    pub(crate) dimensions: Size<f32>,
    pub(crate) margin: [f32; 4],
    pub(crate) border: [f32; 4],
    pub(crate) padding: [f32; 4],
    pub(crate) direction: Direction,
    pub(crate) had_overflow: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            position: [0.0; 4],
            dimensions: size(UNDEFINED, UNDEFINED),
            margin: [0.0; 4],
            border: [0.0; 4],
            padding: [0.0; 4],
            direction: Direction::Inherit,
            had_overflow: false,
        }
    }
}

impl Layout {
    pub fn left(&self) -> f32 {
        self.position[Edge::Left as usize]
    }

    pub fn top(&self) -> f32 {
        self.position[Edge::Top as usize]
    }

    pub fn right(&self) -> f32 {
        self.position[Edge::Right as usize]
    }

    pub fn bottom(&self) -> f32 {
        self.position[Edge::Bottom as usize]
    }

    /// Undefined (NaN) until the node has been laid out once.
    pub fn width(&self) -> f32 {
        self.dimensions.width
    }

    pub fn height(&self) -> f32 {
        self.dimensions.height
    }

    pub fn size(&self) -> Size<f32> {
        self.dimensions
    }

    pub fn bounds(&self) -> Bounds<f32> {
        Bounds {
            origin: point(self.left(), self.top()),
            size: self.dimensions,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the children of this node did not fit along the main axis.
    pub fn had_overflow(&self) -> bool {
        self.had_overflow
    }

    pub fn margin(&self, edge: LayoutEdge) -> f32 {
        self.margin[self.physical_edge(edge) as usize]
    }

    pub fn border(&self, edge: LayoutEdge) -> f32 {
        self.border[self.physical_edge(edge) as usize]
    }

    pub fn padding(&self, edge: LayoutEdge) -> f32 {
        self.padding[self.physical_edge(edge) as usize]
    }

    fn physical_edge(&self, edge: LayoutEdge) -> Edge {
        let rtl = self.direction == Direction::Rtl;
        match edge {
            LayoutEdge::Left => Edge::Left,
            LayoutEdge::Top => Edge::Top,
            LayoutEdge::Right => Edge::Right,
            LayoutEdge::Bottom => Edge::Bottom,
            LayoutEdge::Start if rtl => Edge::Right,
            LayoutEdge::Start => Edge::Left,
            LayoutEdge::End if rtl => Edge::Left,
            LayoutEdge::End => Edge::Right,
        }
    }

    /// Compares two layouts, treating undefined values as equal to each other.
    pub fn same_as(&self, other: &Layout) -> bool {
        let same = |a: &[f32], b: &[f32]| a.iter().zip(b).all(|(a, b)| floats_equal(*a, *b));
        same(&self.position, &other.position)
            && floats_equal(self.dimensions.width, other.dimensions.width)
            && floats_equal(self.dimensions.height, other.dimensions.height)
            && same(&self.margin, &other.margin)
            && same(&self.border, &other.border)
            && same(&self.padding, &other.padding)
            && self.direction == other.direction
            && self.had_overflow == other.had_overflow
    }
}

/// Intermediate values the algorithm keeps on a node between and during passes.
#[derive(Clone, Debug)]
pub(crate) struct LayoutState {
    pub computed_flex_basis: f32,
    pub computed_flex_basis_generation: u32,
    pub generation_count: u32,
    /// `None` until the node has been visited, which forces the first visit.
    pub last_owner_direction: Option<Direction>,
    pub measured_dimensions: Size<f32>,
    pub cache: MeasureCache,
    pub line_index: usize,
    pub did_use_legacy_flag: bool,
    pub does_legacy_stretch_flag_affect_layout: bool,
}

impl Default for LayoutState {
    fn default() -> Self {
        LayoutState {
            computed_flex_basis: UNDEFINED,
            computed_flex_basis_generation: 0,
            generation_count: 0,
            last_owner_direction: None,
            measured_dimensions: size(UNDEFINED, UNDEFINED),
            cache: MeasureCache::default(),
            line_index: 0,
            did_use_legacy_flag: false,
            does_legacy_stretch_flag_affect_layout: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_start_and_end_follow_direction() {
        let mut layout = Layout::default();
        layout.margin = [1.0, 2.0, 3.0, 4.0];

        layout.direction = Direction::Ltr;
        assert_eq!(layout.margin(LayoutEdge::Start), 1.0);
        assert_eq!(layout.margin(LayoutEdge::End), 3.0);

        layout.direction = Direction::Rtl;
        assert_eq!(layout.margin(LayoutEdge::Start), 3.0);
        assert_eq!(layout.margin(LayoutEdge::End), 1.0);
        assert_eq!(layout.margin(LayoutEdge::Bottom), 4.0);
    }

    #[test]
    fn test_fresh_layouts_compare_equal() {
        let a = Layout::default();
        let mut b = Layout::default();
        assert!(a.width().is_nan());
        assert!(a.same_as(&b));

        b.position[0] = 1.0;
        assert!(!a.same_as(&b));
    }
}
