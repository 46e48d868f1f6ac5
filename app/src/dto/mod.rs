mod submission;

pub use self::submission::{JobSubmission, KillRequest};
