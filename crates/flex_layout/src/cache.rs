//! Per-node memo of previous layout and measurement queries.
//!
//! A node keeps one entry for its last full layout and a small ring of entries for
//! measurement-only passes. Entries are keyed by the available size and measure mode on each
//! axis and store the size the node computed for that query.

use crate::{
    compute::{numeric::floats_equal, rounding::round_value_to_pixel_grid},
    node::MeasureMode,
};

pub(crate) const MAX_CACHED_MEASUREMENTS: usize = 16;

#[derive(Clone, Copy, Debug)]
pub(crate) struct CachedMeasurement {
    pub available_width: f32,
    pub available_height: f32,
    /// `None` marks an entry that has never been written.
    pub width_mode: Option<MeasureMode>,
    pub height_mode: Option<MeasureMode>,
    pub computed_width: f32,
    pub computed_height: f32,
}

impl Default for CachedMeasurement {
    fn default() -> Self {
        CachedMeasurement {
            available_width: 0.0,
            available_height: 0.0,
            width_mode: None,
            height_mode: None,
            computed_width: -1.0,
            computed_height: -1.0,
        }
    }
}

impl CachedMeasurement {
    pub fn new(
        available_width: f32,
        width_mode: MeasureMode,
        available_height: f32,
        height_mode: MeasureMode,
        computed_width: f32,
        computed_height: f32,
    ) -> Self {
        CachedMeasurement {
            available_width,
            available_height,
            width_mode: Some(width_mode),
            height_mode: Some(height_mode),
            computed_width,
            computed_height,
        }
    }

    /// Whether this entry answers exactly the same query.
    pub fn matches_exactly(
        &self,
        available_width: f32,
        width_mode: MeasureMode,
        available_height: f32,
        height_mode: MeasureMode,
    ) -> bool {
        self.width_mode == Some(width_mode)
            && self.height_mode == Some(height_mode)
            && floats_equal(self.available_width, available_width)
            && floats_equal(self.available_height, available_height)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct MeasureCache {
    layout: CachedMeasurement,
    measurements: [CachedMeasurement; MAX_CACHED_MEASUREMENTS],
    /// Written measurement slots, at most `MAX_CACHED_MEASUREMENTS`.
    len: usize,
    /// Slot the next measurement goes to; once the ring is full this is the oldest entry.
    next_index: usize,
}

impl MeasureCache {
    pub fn clear(&mut self) {
        self.layout = CachedMeasurement::default();
        self.len = 0;
        self.next_index = 0;
    }

    pub fn layout_entry(&self) -> &CachedMeasurement {
        &self.layout
    }

    pub fn measurements(&self) -> &[CachedMeasurement] {
        &self.measurements[..self.len]
    }

    /// Number of measurement slots in use, counting the one about to be written.
    pub fn next_len(&self) -> usize {
        self.len + 1
    }

    /// Stores a result. Measurement entries are written round robin; returns true when the
    /// ring was full and the oldest entry got overwritten.
    pub fn store(&mut self, perform_layout: bool, entry: CachedMeasurement) -> bool {
        if perform_layout {
            self.layout = entry;
            return false;
        }

        let full = self.len == MAX_CACHED_MEASUREMENTS;
        self.measurements[self.next_index] = entry;
        self.next_index = (self.next_index + 1) % MAX_CACHED_MEASUREMENTS;
        if !full {
            self.len += 1;
        }
        full
    }
}

fn size_is_exact_and_matches_old_measured_size(
    mode: MeasureMode,
    size: f32,
    last_computed_size: f32,
) -> bool {
    mode == MeasureMode::Exactly && floats_equal(size, last_computed_size)
}

fn old_size_is_unspecified_and_still_fits(
    mode: MeasureMode,
    size: f32,
    last_mode: Option<MeasureMode>,
    last_computed_size: f32,
) -> bool {
    mode == MeasureMode::AtMost
        && last_mode == Some(MeasureMode::Undefined)
        && (size >= last_computed_size || floats_equal(size, last_computed_size))
}

fn new_measure_size_is_stricter_and_still_valid(
    mode: MeasureMode,
    size: f32,
    last_mode: Option<MeasureMode>,
    last_size: f32,
    last_computed_size: f32,
) -> bool {
    last_mode == Some(MeasureMode::AtMost)
        && mode == MeasureMode::AtMost
        && !last_size.is_nan()
        && !size.is_nan()
        && !last_computed_size.is_nan()
        && last_size > size
        && (last_computed_size <= size || floats_equal(size, last_computed_size))
}

/// Decides whether a previous measurement of a self-measuring node still answers a new query.
///
/// Besides identical queries this accepts a new query whose constraint the old result
/// already satisfies, so that text measured once unconstrained is not measured again when
/// the owner later offers at least as much room.
pub(crate) fn can_use_cached_measurement(
    width_mode: MeasureMode,
    width: f32,
    height_mode: MeasureMode,
    height: f32,
    last: &CachedMeasurement,
    margin_row: f32,
    margin_column: f32,
    point_scale_factor: f32,
) -> bool {
    if (!last.computed_height.is_nan() && last.computed_height < 0.0)
        || (!last.computed_width.is_nan() && last.computed_width < 0.0)
    {
        return false;
    }

    let round = |value: f32| {
        if point_scale_factor != 0.0 {
            round_value_to_pixel_grid(value, point_scale_factor, false, false)
        } else {
            value
        }
    };

    let has_same_width_spec = last.width_mode == Some(width_mode)
        && floats_equal(round(last.available_width), round(width));
    let has_same_height_spec = last.height_mode == Some(height_mode)
        && floats_equal(round(last.available_height), round(height));

    let width_is_compatible = has_same_width_spec
        || size_is_exact_and_matches_old_measured_size(
            width_mode,
            width - margin_row,
            last.computed_width,
        )
        || old_size_is_unspecified_and_still_fits(
            width_mode,
            width - margin_row,
            last.width_mode,
            last.computed_width,
        )
        || new_measure_size_is_stricter_and_still_valid(
            width_mode,
            width - margin_row,
            last.width_mode,
            last.available_width,
            last.computed_width,
        );

    let height_is_compatible = has_same_height_spec
        || size_is_exact_and_matches_old_measured_size(
            height_mode,
            height - margin_column,
            last.computed_height,
        )
        || old_size_is_unspecified_and_still_fits(
            height_mode,
            height - margin_column,
            last.height_mode,
            last.computed_height,
        )
        || new_measure_size_is_stricter_and_still_valid(
            height_mode,
            height - margin_column,
            last.height_mode,
            last.available_height,
            last.computed_height,
        );

    width_is_compatible && height_is_compatible
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(width: f32, width_mode: MeasureMode, computed_width: f32) -> CachedMeasurement {
        CachedMeasurement::new(
            width,
            width_mode,
            100.0,
            MeasureMode::Exactly,
            computed_width,
            100.0,
        )
    }

    #[test]
    fn test_unwritten_entries_never_match() {
        let last = CachedMeasurement::default();
        assert!(!can_use_cached_measurement(
            MeasureMode::Exactly,
            0.0,
            MeasureMode::Exactly,
            0.0,
            &last,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn test_identical_query_matches() {
        let last = entry(50.0, MeasureMode::AtMost, 30.0);
        assert!(can_use_cached_measurement(
            MeasureMode::AtMost,
            50.0,
            MeasureMode::Exactly,
            100.0,
            &last,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn test_unconstrained_result_fits_looser_bound() {
        let last = entry(f32::NAN, MeasureMode::Undefined, 30.0);
        assert!(can_use_cached_measurement(
            MeasureMode::AtMost,
            40.0,
            MeasureMode::Exactly,
            100.0,
            &last,
            0.0,
            0.0,
            1.0,
        ));
        assert!(!can_use_cached_measurement(
            MeasureMode::AtMost,
            20.0,
            MeasureMode::Exactly,
            100.0,
            &last,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn test_stricter_bound_still_valid() {
        let last = entry(80.0, MeasureMode::AtMost, 30.0);
        assert!(can_use_cached_measurement(
            MeasureMode::AtMost,
            60.0,
            MeasureMode::Exactly,
            100.0,
            &last,
            0.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn test_exact_size_matching_old_result() {
        let last = entry(f32::NAN, MeasureMode::Undefined, 30.0);
        assert!(can_use_cached_measurement(
            MeasureMode::Exactly,
            35.0,
            MeasureMode::Exactly,
            100.0,
            &last,
            5.0,
            0.0,
            1.0,
        ));
    }

    #[test]
    fn test_measurements_wrap_around() {
        let mut cache = MeasureCache::default();
        for i in 0..MAX_CACHED_MEASUREMENTS {
            assert!(!cache.store(false, entry(i as f32, MeasureMode::Exactly, i as f32)));
        }
        assert_eq!(cache.measurements().len(), MAX_CACHED_MEASUREMENTS);
        assert!(cache.store(false, entry(99.0, MeasureMode::Exactly, 99.0)));
        assert_eq!(cache.measurements().len(), MAX_CACHED_MEASUREMENTS);

        // Only the oldest entry made room.
        let widths: Vec<f32> = cache
            .measurements()
            .iter()
            .map(|entry| entry.computed_width)
            .collect();
        assert_eq!(widths[0], 99.0);
        assert_eq!(widths[1], 1.0);
        assert_eq!(widths[MAX_CACHED_MEASUREMENTS - 1], 15.0);

        cache.clear();
        assert_eq!(cache.measurements().len(), 0);
        assert_eq!(cache.layout_entry().width_mode, None);
    }
}
