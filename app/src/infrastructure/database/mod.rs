mod json;

pub use self::json::{Catalog, JobRecord, JsonDb, RuntimeEnvironment};
