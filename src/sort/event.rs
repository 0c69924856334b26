/// Step events produced by a visual sort run
///
/// Events are sent from the sort worker and applied to a `DisplaySurface`
/// on the rendering loop, never on the worker itself.

use crate::state::data::{BookRecord, SortKey};

/// A discrete, ordered notification of sort progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    /// A new pass begins; `pass` is the slot being filled
    PassStart { pass: usize },
    /// The record at `index` is about to be compared to the running minimum
    CompareStart { index: usize },
    /// The comparison at `index` is done
    CompareEnd { index: usize },
    /// End of a pass. The records were exchanged only if `pass != min_index`.
    Swap { pass: usize, min_index: usize },
    /// Terminal: every pass ran
    SortComplete { key: SortKey },
    /// Terminal: the run was stopped early
    Cancelled,
}

impl StepEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepEvent::SortComplete { .. } | StepEvent::Cancelled)
    }

    /// True for a `Swap` that actually moved records
    pub fn swapped(&self) -> bool {
        matches!(self, StepEvent::Swap { pass, min_index } if pass != min_index)
    }
}

/// What the worker sends over its channel
#[derive(Debug, Clone, PartialEq)]
pub enum SortUpdate {
    Step(StepEvent),
    StoreChanged(Vec<BookRecord>),
}

impl SortUpdate {
    /// Apply this update to a display surface
    pub fn deliver(self, surface: &mut impl DisplaySurface) {
        match self {
            SortUpdate::Step(event) => surface.on_step_event(event),
            SortUpdate::StoreChanged(snapshot) => surface.on_store_changed(snapshot),
        }
    }
}

/// Anything that renders the catalog and reacts to sort progress
pub trait DisplaySurface {
    fn on_step_event(&mut self, event: StepEvent);
    fn on_store_changed(&mut self, snapshot: Vec<BookRecord>);
}
