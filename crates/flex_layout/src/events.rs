use strum::{Display, EnumCount};

/// Why the engine visited a node during a layout pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumCount)]
#[strum(serialize_all = "kebab-case")]
pub enum LayoutPassReason {
    Initial,
    AbsLayout,
    Stretch,
    MultilineStretch,
    FlexLayout,
    MeasureChild,
    AbsMeasureChild,
    FlexMeasure,
}

/// Counters collected while computing a single layout.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayoutEvents {
    /// Nodes that ran the full layout algorithm.
    pub layouts: u32,
    /// Nodes that ran the algorithm only to determine their size.
    pub measures: u32,
    /// Largest number of measurement cache slots any node needed.
    pub max_measure_cache: u32,
    pub cached_layouts: u32,
    pub cached_measures: u32,
    /// Invocations of measure callbacks.
    pub measure_callbacks: u32,
    pub measure_callback_reasons: [u32; LayoutPassReason::COUNT],
}

impl LayoutEvents {
    pub fn measure_callbacks_for(&self, reason: LayoutPassReason) -> u32 {
        self.measure_callback_reasons[reason as usize]
    }

    pub(crate) fn record_measure_callback(&mut self, reason: LayoutPassReason) {
        self.measure_callbacks += 1;
        self.measure_callback_reasons[reason as usize] += 1;
    }
}
