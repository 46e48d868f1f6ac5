mod inbox_watcher;
mod job_events;
mod node_status;

pub mod prelude {
    #[rustfmt::skip]
    pub use super::{
        inbox_watcher::InboxWatcher,
        job_events::JobEventDispatcher,
        node_status::NodeStatusReporter,
    };
}
