pub mod criterion;
pub mod environment;
pub mod event;
pub mod selection;

#[rustfmt::skip]
pub use self::{
    criterion::Criterion,
    environment::ExecutionEnvironment,
    event::{JobEvent, JobFinishedReason},
    selection::{ClusterSelectionContext, CommandSelectionContext, SelectionResult},
};
