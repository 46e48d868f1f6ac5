use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use domain::service::JobCoordinatorService;
use notify::{Config, Event, PollWatcher, RecursiveMode, Watcher};
use tokio_util::sync::CancellationToken;
use tracing::instrument::Instrument;

use crate::dto::{JobSubmission, KillRequest};

const JOB_SUFFIX: &str = ".job.json";
const KILL_SUFFIX: &str = ".kill.json";
const FAILED_SUFFIX: &str = ".failed";

#[derive(Debug, PartialEq, Eq)]
enum InboxFile {
    Submission,
    Kill,
}

impl InboxFile {
    fn classify(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        if name.ends_with(JOB_SUFFIX) {
            Some(Self::Submission)
        } else if name.ends_with(KILL_SUFFIX) {
            Some(Self::Kill)
        } else {
            None
        }
    }
}

/// Picks up job submissions and kill requests dropped into the inbox directory.
pub struct InboxWatcher {
    coordinator: Arc<dyn JobCoordinatorService>,
    inbox: PathBuf,
}

impl InboxWatcher {
    pub fn new(coordinator: Arc<dyn JobCoordinatorService>, inbox: PathBuf) -> Self {
        Self { coordinator, inbox }
    }

    pub async fn run(self, token: CancellationToken) {
        let this = Arc::new(self);
        let (sender, receiver) = flume::unbounded();
        let mut watcher = match PollWatcher::new(
            FlumeEventHandler(sender),
            Config::default().with_poll_interval(Duration::from_secs(2)),
        ) {
            Ok(x) => x,
            Err(e) => {
                tracing::error!("Unable to start inbox watcher: {e}");
                return;
            }
        };
        if let Err(e) = tokio::fs::create_dir_all(&this.inbox).await {
            tracing::error!("Unable to create inbox {}: {e}", this.inbox.display());
            return;
        }
        if let Err(e) = watcher.watch(&this.inbox, RecursiveMode::NonRecursive) {
            tracing::error!("Unable to watch inbox {}: {e}", this.inbox.display());
            return;
        }
        tracing::info!("Watching inbox {}", this.inbox.display());

        // Files dropped while the node was down.
        match this.pending_files().await {
            Ok(paths) => {
                for path in paths {
                    this.spawn_handle(path);
                }
            }
            Err(e) => tracing::error!("Failed to list inbox: {e:#}"),
        }

        loop {
            let result = tokio::select! {
                _ = token.cancelled() => break,
                result = receiver.recv_async() => result,
            };
            match result {
                Ok(Ok(event)) => {
                    tracing::trace!("{:?}", event);
                    if event.kind.is_create() {
                        for path in event.paths {
                            this.spawn_handle(path);
                        }
                    }
                }
                Ok(Err(e)) => tracing::error!("Watcher error: {e}"),
                Err(e) => {
                    tracing::error!("Watcher receive event error: {e}");
                    break;
                }
            }
        }
    }

    async fn pending_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(&self.inbox).await?;
        let mut paths = vec![];
        while let Some(entry) = entries.next_entry().await? {
            paths.push(entry.path());
        }
        paths.sort();
        Ok(paths)
    }

    fn spawn_handle(self: &Arc<Self>, path: PathBuf) {
        if !path.is_file() || InboxFile::classify(&path).is_none() {
            return;
        }
        let this = self.clone();
        let span = tracing::info_span!("inbox_file", path = %path.display());
        tokio::spawn(async move { this.handle_file(&path).await }.instrument(span));
    }

    /// Processes one inbox file, removing it on success and renaming it to `*.failed` otherwise.
    async fn handle_file(&self, path: &Path) {
        let Some(kind) = InboxFile::classify(path) else {
            return;
        };
        match self.process(kind, path).await {
            Ok(()) => {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    tracing::warn!("Failed to remove processed inbox file: {e}");
                }
            }
            Err(e) => {
                tracing::error!("Inbox file rejected: {e:#}");
                let mut failed = path.as_os_str().to_owned();
                failed.push(FAILED_SUFFIX);
                if let Err(e) = tokio::fs::rename(path, &failed).await {
                    tracing::warn!("Failed to set rejected inbox file aside: {e}");
                }
            }
        }
    }

    async fn process(&self, kind: InboxFile, path: &Path) -> anyhow::Result<()> {
        let content = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match kind {
            InboxFile::Submission => {
                let submission: JobSubmission =
                    serde_json::from_slice(&content).context("Malformed job submission")?;
                let id = submission.job_id();
                let id = self.coordinator.coordinate_job(&id, submission.request).await?;
                tracing::info!(job_id = %id, "Job scheduled");
            }
            InboxFile::Kill => {
                let kill: KillRequest =
                    serde_json::from_slice(&content).context("Malformed kill request")?;
                self.coordinator.kill_job(&kill.id, &kill.reason).await?;
                tracing::info!(job_id = %kill.id, "Job killed");
            }
        }
        Ok(())
    }
}

struct FlumeEventHandler(flume::Sender<notify::Result<Event>>);

impl notify::EventHandler for FlumeEventHandler {
    fn handle_event(&mut self, event: notify::Result<Event>) {
        if let Err(e) = self.0.send(event) {
            tracing::error!("File watcher send event error. {}", e)
        }
    }
}
