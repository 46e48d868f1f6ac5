pub mod catalog;
pub mod job;
pub mod specification;

#[rustfmt::skip]
pub use self::{
    catalog::{Application, Cluster, Command, ResourceMetadata},
    job::{
        AgentConfigRequest, ExecutionMode, ExecutionResourceCriteria, JobExecution, JobMetadata,
        JobRequest, JobStatus,
    },
    specification::{ExecutionResource, JobEnvironment, JobSpecification, ResolvedJob},
};
