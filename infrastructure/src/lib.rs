pub mod process;
pub mod sync;
pub mod task;
