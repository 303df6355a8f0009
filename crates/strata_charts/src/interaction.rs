use crate::interval_set::SelectionInterval;

/// Per-chart mutable interaction state.
///
/// Owned by the chart model and lent to the brush and tooltip for the
/// duration of one pointer callback.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionState {
    /// In-progress selection, not yet committed.
    pub current_selection: Option<SelectionInterval>,
    pub hovered_key: Option<f64>,
    pub hovered_lane: Option<usize>,
    pub tooltip_visible: bool,
}

impl InteractionState {
    pub fn clear_hover(&mut self) {
        self.hovered_key = None;
        self.hovered_lane = None;
    }
}
