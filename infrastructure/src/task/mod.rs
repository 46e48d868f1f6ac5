mod scheduler;

pub use self::scheduler::TokioTaskScheduler;
