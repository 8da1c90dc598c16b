//! Small geometry value types shared by the engine and its consumers.

use std::ops::AddAssign;

/// A width/height pair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size<T> {
    pub width: T,
    pub height: T,
}

/// Constructs a [`Size`] from a width and a height.
pub const fn size<T>(width: T, height: T) -> Size<T> {
    Size { width, height }
}

impl<T: Copy> Size<T> {
    pub fn map<U>(self, f: impl Fn(T) -> U) -> Size<U> {
        Size {
            width: f(self.width),
            height: f(self.height),
        }
    }

    pub(crate) fn get(&self, dimension: Dimension) -> T {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    pub(crate) fn set(&mut self, dimension: Dimension, value: T) {
        match dimension {
            Dimension::Width => self.width = value,
            Dimension::Height => self.height = value,
        }
    }
}

/// A position in a two dimensional space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}

/// Constructs a [`Point`] from its coordinates.
pub const fn point<T>(x: T, y: T) -> Point<T> {
    Point { x, y }
}

impl<T: AddAssign> AddAssign for Point<T> {
    fn add_assign(&mut self, other: Self) {
        self.x += other.x;
        self.y += other.y;
    }
}

/// An axis-aligned rectangle described by its origin and size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds<T> {
    pub origin: Point<T>,
    pub size: Size<T>,
}

/// The physical dimension measured along an axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Dimension {
    Width,
    Height,
}
