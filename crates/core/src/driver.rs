//! Operation driver
//!
//! Every command runs through the same pipeline: check the buckets, select
//! the sources (exact lookup or list + filter), resolve one destination per
//! source, then execute one storage primitive per source in listing order.
//! The first failure aborts the rest of the batch; objects that already
//! completed are left as they are.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::matching::{MatchMode, Pattern, SourceSpec, list_candidates, list_local_candidates};
use crate::path::{DestinationSpec, ObjectRef};
use crate::traits::ObjectStore;

/// The operation a command performs, with the locations it needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Fetch objects into files under `local_root`
    Download { bucket: String, local_root: PathBuf },
    /// Push files found under `local_root` into the bucket
    Upload { bucket: String, local_root: PathBuf },
    /// Copy objects to the destination bucket, then delete the source
    Move {
        source_bucket: String,
        destination_bucket: String,
    },
    /// Delete objects
    Delete { bucket: String },
}

/// Operation kind without its locations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Download,
    Upload,
    Move,
    Delete,
}

impl ActionKind {
    pub const fn verb(self) -> &'static str {
        match self {
            ActionKind::Download => "download",
            ActionKind::Upload => "upload",
            ActionKind::Move => "move",
            ActionKind::Delete => "delete",
        }
    }

    pub const fn progressive(self) -> &'static str {
        match self {
            ActionKind::Download => "Downloading",
            ActionKind::Upload => "Uploading",
            ActionKind::Move => "Moving",
            ActionKind::Delete => "Deleting",
        }
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Download { .. } => ActionKind::Download,
            Action::Upload { .. } => ActionKind::Upload,
            Action::Move { .. } => ActionKind::Move,
            Action::Delete { .. } => ActionKind::Delete,
        }
    }

    /// Buckets that must exist before anything runs
    fn buckets(&self) -> Vec<&str> {
        match self {
            Action::Download { bucket, .. }
            | Action::Upload { bucket, .. }
            | Action::Delete { bucket } => vec![bucket.as_str()],
            Action::Move {
                source_bucket,
                destination_bucket,
            } if source_bucket == destination_bucket => vec![source_bucket.as_str()],
            Action::Move {
                source_bucket,
                destination_bucket,
            } => vec![source_bucket.as_str(), destination_bucket.as_str()],
        }
    }
}

/// A full command invocation
#[derive(Debug, Clone)]
pub struct Request {
    pub action: Action,
    pub source: SourceSpec,
    pub destination: DestinationSpec,
    /// Select and plan, but do not execute
    pub dry_run: bool,
}

/// One planned unit of work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// 1-based position in listing order
    pub index: usize,
    /// Number of steps in the batch
    pub total: usize,
    /// Source object name, or local path relative to the local root for uploads
    pub source: String,
    /// Resolved destination; `None` for deletes
    pub destination: Option<String>,
}

/// Result of one completed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub operation: ActionKind,
    pub index: usize,
    pub total: usize,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_human: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub dry_run: bool,
}

impl Outcome {
    fn new(operation: ActionKind, step: &Step, source: String, destination: Option<String>) -> Self {
        Self {
            operation,
            index: step.index,
            total: step.total,
            source,
            destination,
            size_bytes: None,
            size_human: None,
            dry_run: false,
        }
    }

    fn with_size(mut self, size: u64, human: String) -> Self {
        self.size_bytes = Some(size);
        self.size_human = Some(human);
        self
    }

    /// Human-readable confirmation line
    pub fn message(&self) -> String {
        let destination = self.destination.as_deref().unwrap_or_default();

        if self.dry_run {
            return match self.operation {
                ActionKind::Delete => format!("Would delete: {}", self.source),
                op => format!("Would {}: {} -> {destination}", op.verb(), self.source),
            };
        }

        match self.operation {
            ActionKind::Download => {
                format!("{} successfully downloaded to {destination}", self.source)
            }
            ActionKind::Upload => format!("{} successfully uploaded to {destination}", self.source),
            ActionKind::Move => format!("File moved from {} to {destination}", self.source),
            ActionKind::Delete => format!("{} successfully deleted", self.source),
        }
    }
}

/// Everything that completed in a run
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub matched: usize,
    pub completed: Vec<Outcome>,
}

/// Progress callbacks, invoked in order as the batch runs
pub trait Reporter {
    /// Number of sources a regex selected
    fn matched(&mut self, _kind: ActionKind, _count: usize) {}

    /// A step is about to execute
    fn step_started(&mut self, _kind: ActionKind, _step: &Step) {}

    /// A step finished successfully
    fn step_completed(&mut self, _outcome: &Outcome) {}

    /// A step failed; no further steps will run
    fn step_failed(&mut self, _step: &Step, _error: &Error) {}
}

/// Reporter that ignores every event
#[derive(Debug, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Build the ordered steps for a set of selected sources
///
/// Destination names are enumerated only when a regex selected more than one
/// source, so a single regex hit keeps its name unchanged.
pub fn plan(
    kind: ActionKind,
    sources: Vec<String>,
    mode: MatchMode,
    destination: &DestinationSpec,
) -> Vec<Step> {
    let total = sources.len();
    let enumerate = mode == MatchMode::Regex && total > 1;

    sources
        .into_iter()
        .enumerate()
        .map(|(i, source)| {
            let index = i + 1;
            let destination = match kind {
                ActionKind::Delete => None,
                _ => Some(
                    destination
                        .resolve(&source, enumerate.then_some(index))
                        .into_string(),
                ),
            };
            Step {
                index,
                total,
                source,
                destination,
            }
        })
        .collect()
}

/// Runs requests against an object store, one object at a time
pub struct Driver<'a> {
    store: &'a dyn ObjectStore,
}

impl<'a> Driver<'a> {
    pub fn new(store: &'a dyn ObjectStore) -> Self {
        Self { store }
    }

    /// Run a request to completion or to its first failure
    pub async fn run(&self, request: &Request, reporter: &mut dyn Reporter) -> Result<Summary> {
        let kind = request.action.kind();

        self.check_buckets(&request.action).await?;

        let sources = self.select(&request.action, &request.source).await?;
        if request.source.mode == MatchMode::Regex {
            reporter.matched(kind, sources.len());
        }

        let steps = plan(kind, sources, request.source.mode, &request.destination);
        check_destinations(&steps)?;

        let mut summary = Summary {
            matched: steps.len(),
            completed: Vec::with_capacity(steps.len()),
        };

        for step in &steps {
            reporter.step_started(kind, step);
            tracing::debug!(
                operation = kind.verb(),
                index = step.index,
                total = step.total,
                source = %step.source,
                destination = ?step.destination,
                "Executing step"
            );

            match self.execute(&request.action, step, request.dry_run).await {
                Ok(outcome) => {
                    reporter.step_completed(&outcome);
                    summary.completed.push(outcome);
                }
                Err(e) => {
                    tracing::debug!(index = step.index, error = %e, "Step failed, aborting batch");
                    reporter.step_failed(step, &e);
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }

    async fn check_buckets(&self, action: &Action) -> Result<()> {
        for bucket in action.buckets() {
            if !self.store.bucket_exists(bucket).await? {
                return Err(Error::BucketNotFound(bucket.to_string()));
            }
        }
        Ok(())
    }

    /// Produce the ordered source set; exact and regex modes differ only here
    async fn select(&self, action: &Action, source: &SourceSpec) -> Result<Vec<String>> {
        match (action, source.mode) {
            (Action::Upload { local_root, .. }, MatchMode::Exact) => {
                let full_path = source.full_path();
                if local_root.join(&full_path).is_file() {
                    Ok(vec![full_path])
                } else {
                    Err(Error::ObjectNotFound(full_path))
                }
            }
            (Action::Upload { local_root, .. }, MatchMode::Regex) => {
                let pattern = Pattern::compile(&source.file_name)?;
                let candidates = list_local_candidates(local_root, &source.folder)?;
                Ok(pattern.filter(candidates))
            }
            (_, MatchMode::Exact) => {
                let object = ObjectRef::new(source_bucket(action), source.full_path());
                match self.store.get(&object).await? {
                    Some(_) => Ok(vec![object.path]),
                    None => Err(Error::ObjectNotFound(object.to_string())),
                }
            }
            (_, MatchMode::Regex) => {
                let pattern = Pattern::compile(&source.file_name)?;
                let candidates = list_candidates(
                    self.store,
                    source_bucket(action),
                    &source.listing_prefix(),
                )
                .await?;
                Ok(pattern
                    .filter(candidates)
                    .into_iter()
                    .map(|object| object.path)
                    .collect())
            }
        }
    }

    async fn execute(&self, action: &Action, step: &Step, dry_run: bool) -> Result<Outcome> {
        let kind = action.kind();
        let destination = step.destination.as_deref().unwrap_or_default();

        match action {
            Action::Download { bucket, local_root } => {
                let object = ObjectRef::new(bucket, &step.source);
                let local_path = local_root.join(destination);
                let outcome = Outcome::new(
                    kind,
                    step,
                    object.to_string(),
                    Some(local_path.display().to_string()),
                );
                if dry_run {
                    return Ok(Outcome { dry_run, ..outcome });
                }

                if let Some(parent) = local_path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                let info = self.store.fetch(&object, &local_path).await?;
                Ok(outcome.with_size(info.size_bytes, info.size_human))
            }
            Action::Upload { bucket, local_root } => {
                let local_path = local_root.join(&step.source);
                let object = ObjectRef::new(bucket, destination);
                let outcome = Outcome::new(
                    kind,
                    step,
                    local_path.display().to_string(),
                    Some(object.to_string()),
                );
                if dry_run {
                    return Ok(Outcome { dry_run, ..outcome });
                }

                let info = self.store.put(&local_path, &object).await?;
                Ok(outcome.with_size(info.size_bytes, info.size_human))
            }
            Action::Move {
                source_bucket,
                destination_bucket,
            } => {
                let source = ObjectRef::new(source_bucket, &step.source);
                let target = ObjectRef::new(destination_bucket, destination);
                if source == target {
                    return Err(Error::General(format!(
                        "Source and destination are the same object: {source}"
                    )));
                }

                let outcome =
                    Outcome::new(kind, step, source.to_string(), Some(target.to_string()));
                if dry_run {
                    return Ok(Outcome { dry_run, ..outcome });
                }

                self.store.copy(&source, &target).await?;
                if let Err(e) = self.store.remove(&source).await {
                    tracing::warn!(
                        source = %source,
                        destination = %target,
                        error = %e,
                        "Copy succeeded but source delete failed"
                    );
                    return Err(Error::IncompleteMove {
                        source_object: source.to_string(),
                        destination: target.to_string(),
                        reason: e.to_string(),
                    });
                }
                Ok(outcome)
            }
            Action::Delete { bucket } => {
                let object = ObjectRef::new(bucket, &step.source);
                let outcome = Outcome::new(kind, step, object.to_string(), None);
                if dry_run {
                    return Ok(Outcome { dry_run, ..outcome });
                }

                self.store.remove(&object).await?;
                Ok(outcome)
            }
        }
    }
}

/// Refuse a plan where two sources would land on the same destination
///
/// Executing it would overwrite earlier results, and for a move the
/// overwritten source is deleted as well.
fn check_destinations(steps: &[Step]) -> Result<()> {
    let mut by_destination: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for step in steps {
        if let Some(destination) = step.destination.as_deref() {
            by_destination
                .entry(destination)
                .or_default()
                .push(&step.source);
        }
    }

    match by_destination
        .into_iter()
        .find(|(_, sources)| sources.len() > 1)
    {
        Some((destination, sources)) => Err(Error::DestinationConflict {
            destination: destination.to_string(),
            sources: sources.into_iter().map(String::from).collect(),
        }),
        None => Ok(()),
    }
}

fn source_bucket(action: &Action) -> &str {
    match action {
        Action::Download { bucket, .. }
        | Action::Upload { bucket, .. }
        | Action::Delete { bucket } => bucket,
        Action::Move { source_bucket, .. } => source_bucket,
    }
}
