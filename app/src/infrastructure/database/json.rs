use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use domain::model::entity::{
    Application, Cluster, Command, JobExecution, JobRequest, JobStatus, ResolvedJob,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

const JOBS_FILE: &str = "jobs.json";

/// Registered clusters, commands and applications, loaded once at start up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub applications: Vec<Application>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEnvironment {
    pub cluster_id: String,
    pub command_id: String,
    pub application_ids: Vec<String>,
    pub memory: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub request: JobRequest,
    pub status: JobStatus,
    #[serde(default)]
    pub status_message: Option<String>,
    /// Launched by a remote agent instead of this node.
    #[serde(default)]
    pub agent: bool,
    #[serde(default)]
    pub resolved: Option<ResolvedJob>,
    #[serde(default)]
    pub runtime: Option<RuntimeEnvironment>,
    #[serde(default)]
    pub execution: Option<JobExecution>,
    /// Reason of a kill the agent hasn't acted on yet.
    #[serde(default)]
    pub kill_request: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl JobRecord {
    pub fn new(request: JobRequest) -> Self {
        let now = Utc::now();
        Self {
            request,
            status: JobStatus::Init,
            status_message: None,
            agent: false,
            resolved: None,
            runtime: None,
            execution: None,
            kill_request: None,
            created: now,
            updated: now,
        }
    }
}

pub struct JsonDb {
    pub(in crate::infrastructure) catalog: Catalog,
    pub(in crate::infrastructure) jobs: Mutex<HashMap<String, JobRecord>>,
    pub(in crate::infrastructure) save_dir: PathBuf,
}

impl JsonDb {
    pub async fn new(catalog_path: &Path, save_dir: &Path) -> anyhow::Result<Self> {
        let catalog: Catalog = match read_json(catalog_path).await? {
            Some(catalog) => catalog,
            None => {
                tracing::warn!("No catalog at {}, starting empty", catalog_path.display());
                Catalog::default()
            }
        };
        let jobs = read_json(&save_dir.join(JOBS_FILE))
            .await?
            .unwrap_or_default();
        tracing::info!(
            clusters = catalog.clusters.len(),
            commands = catalog.commands.len(),
            applications = catalog.applications.len(),
            "Catalog loaded"
        );

        Ok(Self::with_jobs(catalog, jobs, save_dir))
    }

    pub fn with_jobs(
        catalog: Catalog,
        jobs: HashMap<String, JobRecord>,
        save_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            catalog,
            jobs: Mutex::new(jobs),
            save_dir: save_dir.into(),
        }
    }

    pub(in crate::infrastructure) async fn save_changed(
        &self,
        jobs: &HashMap<String, JobRecord>,
    ) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.save_dir)
            .await
            .with_context(|| format!("Failed to create {}", self.save_dir.display()))?;
        let path = self.save_dir.join(JOBS_FILE);
        let json = serde_json::to_vec(jobs)?;
        tokio::fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if !path.is_file() {
        return Ok(None);
    }
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value = serde_json::from_slice(&bytes)
        .with_context(|| format!("Malformed json in {}", path.display()))?;
    Ok(Some(value))
}
