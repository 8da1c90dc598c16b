//! Float helpers for the layout passes. Undefined values are NaN and propagate through
//! arithmetic; the helpers here are the only places that pick a defined operand over an
//! undefined one.

pub(crate) const UNDEFINED: f32 = f32::NAN;

const EPSILON: f32 = 0.0001;

pub(crate) fn is_undefined(value: f32) -> bool {
    value.is_nan()
}

pub(crate) fn floats_equal(a: f32, b: f32) -> bool {
    if a.is_nan() || b.is_nan() {
        return a.is_nan() && b.is_nan();
    }
    (a - b).abs() < EPSILON
}

/// The larger operand, or the defined one when only one is defined.
pub(crate) fn float_max(a: f32, b: f32) -> f32 {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.max(b),
        (true, _) => b,
        (false, true) => a,
    }
}

pub(crate) fn float_min(a: f32, b: f32) -> f32 {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.min(b),
        (true, _) => b,
        (false, true) => a,
    }
}
