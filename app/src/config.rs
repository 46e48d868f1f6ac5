use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::*;
use service::prelude::ResolutionMode;

pub fn build_config() -> anyhow::Result<Config> {
    Ok(Config::builder()
        .add_source(File::with_name("config").required(false))
        .add_source(
            Environment::with_prefix("CONDUCTOR")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeConfig {
    #[serde(default = "NodeConfig::default_hostname")]
    pub hostname: String,

    #[serde(default = "Default::default")]
    pub jobs: JobsConfig,

    #[serde(default = "Default::default")]
    pub locations: LocationsConfig,

    #[serde(default = "NodeConfig::default_catalog_path")]
    pub catalog_path: PathBuf,

    #[serde(default = "NodeConfig::default_save_path")]
    pub save_path: PathBuf,

    #[serde(default = "Default::default")]
    pub resolution: ResolutionConfig,

    #[serde(default = "Default::default")]
    pub process: ProcessConfig,

    /// In seconds.
    #[serde(default = "NodeConfig::default_node_status_interval")]
    pub node_status_interval: u64,

    #[serde(default = "Default::default")]
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobsConfig {
    #[serde(default = "Default::default")]
    pub memory: MemoryConfig,

    #[serde(default = "Default::default")]
    pub users: UsersConfig,

    /// In seconds.
    #[serde(default = "Default::default")]
    pub default_timeout: Option<u32>,

    #[serde(default = "Default::default")]
    pub run_as_user: bool,
}

/// All values in MB.
#[derive(Debug, Clone, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "MemoryConfig::default_job_memory")]
    pub default_job_memory: u32,

    #[serde(default = "MemoryConfig::default_max_job_memory")]
    pub max_job_memory: u32,

    #[serde(default = "MemoryConfig::default_max_system_memory")]
    pub max_system_memory: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersConfig {
    #[serde(default = "Default::default")]
    pub active_limit: ActiveLimitConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveLimitConfig {
    #[serde(default = "Default::default")]
    pub enabled: bool,

    #[serde(default = "ActiveLimitConfig::default_count")]
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationsConfig {
    #[serde(default = "LocationsConfig::default_jobs")]
    pub jobs: PathBuf,

    #[serde(default = "LocationsConfig::default_archives")]
    pub archives: PathBuf,

    #[serde(default = "LocationsConfig::default_inbox")]
    pub inbox: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default = "Default::default")]
    pub mode: ResolutionMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessConfig {
    /// In seconds.
    #[serde(default = "ProcessConfig::default_check_timeout")]
    pub check_timeout: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "TelemetryConfig::default_level")]
    pub level: String,
}

impl NodeConfig {
    pub fn default_hostname() -> String {
        std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_owned())
    }

    pub fn default_catalog_path() -> PathBuf {
        "catalog.json".into()
    }

    pub fn default_save_path() -> PathBuf {
        "/tmp/conductor/db".into()
    }

    pub fn default_node_status_interval() -> u64 {
        30
    }

    pub fn user_limit(&self) -> Option<u64> {
        let limit = &self.jobs.users.active_limit;
        limit.enabled.then_some(limit.count)
    }
}

impl MemoryConfig {
    pub fn default_job_memory() -> u32 {
        1024
    }

    pub fn default_max_job_memory() -> u32 {
        10240
    }

    pub fn default_max_system_memory() -> u32 {
        30720
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            default_job_memory: Self::default_job_memory(),
            max_job_memory: Self::default_max_job_memory(),
            max_system_memory: Self::default_max_system_memory(),
        }
    }
}

impl ActiveLimitConfig {
    pub fn default_count() -> u64 {
        100
    }
}

impl Default for ActiveLimitConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            count: Self::default_count(),
        }
    }
}

impl LocationsConfig {
    pub fn default_jobs() -> PathBuf {
        "/tmp/conductor/jobs".into()
    }

    pub fn default_archives() -> PathBuf {
        "/tmp/conductor/archives".into()
    }

    pub fn default_inbox() -> PathBuf {
        "/tmp/conductor/inbox".into()
    }
}

impl Default for LocationsConfig {
    fn default() -> Self {
        Self {
            jobs: Self::default_jobs(),
            archives: Self::default_archives(),
            inbox: Self::default_inbox(),
        }
    }
}

impl ProcessConfig {
    pub fn default_check_timeout() -> u64 {
        86400
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            check_timeout: Self::default_check_timeout(),
        }
    }
}

impl TelemetryConfig {
    pub fn default_level() -> String {
        "info".to_owned()
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;
    use indoc::indoc;

    use super::*;

    fn parse(yaml: &str) -> NodeConfig {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse("");

        assert_eq!(config.jobs.memory.default_job_memory, 1024);
        assert_eq!(config.jobs.memory.max_job_memory, 10240);
        assert_eq!(config.jobs.memory.max_system_memory, 30720);
        assert_eq!(config.user_limit(), None);
        assert!(!config.jobs.run_as_user);
        assert_eq!(config.locations.inbox, PathBuf::from("/tmp/conductor/inbox"));
        assert_eq!(config.resolution.mode, ResolutionMode::PerCriterion);
        assert_eq!(config.process.check_timeout, 86400);
        assert_eq!(config.node_status_interval, 30);
        assert_eq!(config.telemetry.level, "info");
    }

    #[test]
    fn nested_values_override_defaults() {
        let config = parse(indoc! {"
            hostname: node-7
            jobs:
              memory:
                max_system_memory: 4096
              users:
                active_limit:
                  enabled: true
              default_timeout: 600
            resolution:
              mode: legacy
            locations:
              jobs: /data/jobs
        "});

        assert_eq!(config.hostname, "node-7");
        assert_eq!(config.jobs.memory.max_system_memory, 4096);
        assert_eq!(config.jobs.memory.max_job_memory, 10240);
        assert_eq!(config.user_limit(), Some(100));
        assert_eq!(config.jobs.default_timeout, Some(600));
        assert_eq!(config.resolution.mode, ResolutionMode::Legacy);
        assert_eq!(config.locations.jobs, PathBuf::from("/data/jobs"));
        assert_eq!(config.locations.archives, PathBuf::from("/tmp/conductor/archives"));
    }
}
