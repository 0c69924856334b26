/// Visual sort module
///
/// - `engine.rs` - the cancellable selection-sort worker and its handle
/// - `event.rs` - step events and the `DisplaySurface` they are delivered to

pub mod engine;
pub mod event;

pub use engine::{SortEngine, SortHandle};
pub use event::{DisplaySurface, SortUpdate, StepEvent};
