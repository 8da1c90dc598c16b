//! The style model: typed length values, the flexbox enums and the per-node [`Style`] record.
//!
//! Every attribute is a plain typed field. Lengths carry their unit so that resolution can
//! distinguish a fixed size, a fraction of the owner's size, an automatic size and an unset
//! value. An unset value never silently becomes zero: resolving it yields `None`.

use crate::geometry::{Dimension, Size};
use strum::Display;

const VALUE_EPSILON: f32 = 0.0001;

/// A length along one axis.
#[derive(Clone, Copy, Debug, Default)]
pub enum Length {
    /// No value has been set.
    #[default]
    Undefined,
    /// An absolute length in points.
    Points(f32),
    /// A percentage of the owner's size along the same axis.
    Percent(f32),
    /// Sized by the layout algorithm.
    Auto,
}

impl Length {
    /// An absolute length. NaN is treated as unset.
    pub fn points(value: f32) -> Self {
        if value.is_nan() {
            Length::Undefined
        } else {
            Length::Points(value)
        }
    }

    /// A percentage of the owner's size. NaN is treated as unset.
    pub fn percent(value: f32) -> Self {
        if value.is_nan() {
            Length::Undefined
        } else {
            Length::Percent(value)
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Length::Undefined)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Length::Auto)
    }

    /// Resolves this length against the owner's size along the same axis.
    ///
    /// Percentages only resolve against a definite reference. `Auto` and unset lengths
    /// never resolve.
    pub fn resolve(self, reference: Option<f32>) -> Option<f32> {
        match self {
            Length::Points(value) => Some(value),
            Length::Percent(percent) => reference
                .filter(|reference| !reference.is_nan())
                .map(|reference| percent * reference * 0.01),
            Length::Undefined | Length::Auto => None,
        }
    }

    pub(crate) fn value(&self) -> f32 {
        match self {
            Length::Points(value) | Length::Percent(value) => *value,
            Length::Undefined | Length::Auto => f32::NAN,
        }
    }

    /// Lengths on attributes that have no automatic behavior fall back to unset.
    pub(crate) fn without_auto(self) -> Self {
        match self {
            Length::Auto => Length::Undefined,
            other => other,
        }
    }
}

impl PartialEq for Length {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Length::Undefined, Length::Undefined) | (Length::Auto, Length::Auto) => true,
            (Length::Points(a), Length::Points(b)) | (Length::Percent(a), Length::Percent(b)) => {
                (a - b).abs() < VALUE_EPSILON
            }
            _ => false,
        }
    }
}

impl From<f32> for Length {
    fn from(value: f32) -> Self {
        Length::points(value)
    }
}

/// Text direction used to resolve `start`/`end` edges and row orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Direction {
    #[default]
    Inherit,
    Ltr,
    Rtl,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Column,
    ColumnReverse,
    Row,
    RowReverse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Justify {
    #[default]
    FlexStart,
    Center,
    FlexEnd,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

/// Alignment used by `align-items`, `align-self` and `align-content`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Align {
    #[default]
    Auto,
    FlexStart,
    Center,
    FlexEnd,
    Stretch,
    Baseline,
    SpaceBetween,
    SpaceAround,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum PositionType {
    #[default]
    Relative,
    Absolute,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Wrap {
    #[default]
    NoWrap,
    Wrap,
    WrapReverse,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Display {
    #[default]
    Flex,
    None,
}

/// Addressable edges of margin, padding, border and position.
///
/// `Horizontal`, `Vertical` and `All` are shorthands that apply wherever a more specific
/// edge is unset. `Start` and `End` follow the layout direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    Start,
    End,
    Horizontal,
    Vertical,
    All,
}

const EDGE_COUNT: usize = 9;

/// Per-edge lengths with shorthand fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EdgeValues([Length; EDGE_COUNT]);

impl EdgeValues {
    /// The value stored for exactly this edge, without shorthand fallback.
    pub fn get(&self, edge: Edge) -> Length {
        self.0[edge as usize]
    }

    pub fn set(&mut self, edge: Edge, value: Length) {
        self.0[edge as usize] = value;
    }

    /// The value that applies to `edge` once shorthands are taken into account.
    ///
    /// `Start` and `End` never fall back to `default`; they stay unset so that the physical
    /// edge they map to can take over.
    pub fn computed(&self, edge: Edge, default: Length) -> Length {
        let own = self.get(edge);
        if !own.is_undefined() {
            return own;
        }

        let vertical = self.get(Edge::Vertical);
        if matches!(edge, Edge::Top | Edge::Bottom) && !vertical.is_undefined() {
            return vertical;
        }

        let horizontal = self.get(Edge::Horizontal);
        if matches!(edge, Edge::Left | Edge::Right | Edge::Start | Edge::End)
            && !horizontal.is_undefined()
        {
            return horizontal;
        }

        let all = self.get(Edge::All);
        if !all.is_undefined() {
            return all;
        }

        if matches!(edge, Edge::Start | Edge::End) {
            return Length::Undefined;
        }

        default
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.iter().all(Length::is_undefined)
    }
}

/// All style attributes of a node.
#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub direction: Direction,
    pub flex_direction: FlexDirection,
    pub justify_content: Justify,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub position_type: PositionType,
    pub flex_wrap: Wrap,
    pub overflow: Overflow,
    pub display: Display,
    pub flex: Option<f32>,
    pub flex_grow: Option<f32>,
    pub flex_shrink: Option<f32>,
    pub flex_basis: Length,
    pub margin: EdgeValues,
    pub position: EdgeValues,
    pub padding: EdgeValues,
    pub border: EdgeValues,
    pub size: Size<Length>,
    pub min_size: Size<Length>,
    pub max_size: Size<Length>,
    pub aspect_ratio: Option<f32>,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            direction: Direction::Inherit,
            flex_direction: FlexDirection::Column,
            justify_content: Justify::FlexStart,
            align_content: Align::FlexStart,
            align_items: Align::Stretch,
            align_self: Align::Auto,
            position_type: PositionType::Relative,
            flex_wrap: Wrap::NoWrap,
            overflow: Overflow::Visible,
            display: Display::Flex,
            flex: None,
            flex_grow: None,
            flex_shrink: None,
            flex_basis: Length::Auto,
            margin: EdgeValues::default(),
            position: EdgeValues::default(),
            padding: EdgeValues::default(),
            border: EdgeValues::default(),
            size: Size {
                width: Length::Auto,
                height: Length::Auto,
            },
            min_size: Size::default(),
            max_size: Size::default(),
            aspect_ratio: None,
        }
    }
}

impl Style {
    /// The default stylesheet browsers apply to flex containers.
    pub fn web() -> Self {
        Style {
            flex_direction: FlexDirection::Row,
            align_content: Align::Stretch,
            ..Style::default()
        }
    }

    pub(crate) fn dimension(&self, dimension: Dimension) -> Length {
        self.size.get(dimension)
    }

    pub(crate) fn min_dimension(&self, dimension: Dimension) -> Length {
        self.min_size.get(dimension)
    }

    pub(crate) fn max_dimension(&self, dimension: Dimension) -> Length {
        self.max_size.get(dimension)
    }
}
