use crate::{
    geometry::Dimension,
    style::{Direction, Edge, FlexDirection},
};

impl FlexDirection {
    pub(crate) fn is_row(self) -> bool {
        matches!(self, FlexDirection::Row | FlexDirection::RowReverse)
    }

    pub(crate) fn is_column(self) -> bool {
        !self.is_row()
    }

    /// Rows flip under right-to-left text.
    pub(crate) fn resolve(self, direction: Direction) -> FlexDirection {
        match (self, direction) {
            (FlexDirection::Row, Direction::Rtl) => FlexDirection::RowReverse,
            (FlexDirection::RowReverse, Direction::Rtl) => FlexDirection::Row,
            (flex_direction, _) => flex_direction,
        }
    }

    pub(crate) fn cross(self, direction: Direction) -> FlexDirection {
        if self.is_column() {
            FlexDirection::Row.resolve(direction)
        } else {
            FlexDirection::Column
        }
    }

    /// The physical edge items start from.
    pub(crate) fn leading_edge(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Top,
            FlexDirection::ColumnReverse => Edge::Bottom,
            FlexDirection::Row => Edge::Left,
            FlexDirection::RowReverse => Edge::Right,
        }
    }

    pub(crate) fn trailing_edge(self) -> Edge {
        match self {
            FlexDirection::Column => Edge::Bottom,
            FlexDirection::ColumnReverse => Edge::Top,
            FlexDirection::Row => Edge::Right,
            FlexDirection::RowReverse => Edge::Left,
        }
    }

    pub(crate) fn dimension(self) -> Dimension {
        if self.is_row() {
            Dimension::Width
        } else {
            Dimension::Height
        }
    }

    pub(crate) fn is_reverse(self) -> bool {
        matches!(self, FlexDirection::RowReverse | FlexDirection::ColumnReverse)
    }
}
