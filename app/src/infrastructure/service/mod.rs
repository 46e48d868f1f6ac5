mod event_bus;
mod job_launcher;

#[rustfmt::skip]
pub use self::{
    event_bus::FlumeEventBus,
    job_launcher::LocalJobLauncher,
};
