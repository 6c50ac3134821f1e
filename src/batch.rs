use crate::config::{FailurePolicy, PipelineConfig};
use crate::error::BatchError;
use crate::files::{transition, FileState};
use crate::loader::{load_ingredients, load_snapshots, LoadStats};
use crate::store::Store;

use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Ingredients,
    InventorySnapshot,
}

#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub kind: FileKind,
    pub state: FileState,
    pub stats: Option<LoadStats>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub files: Vec<FileReport>,
}

impl BatchReport {
    pub fn processed(&self) -> usize {
        self.count(FileState::Processed)
    }

    pub fn rejected(&self) -> usize {
        self.count(FileState::Rejected)
    }

    fn count(&self, state: FileState) -> usize {
        self.files.iter().filter(|f| f.state == state).count()
    }
}

pub struct BatchDriver {
    store: Store,
    config: PipelineConfig,
}

impl BatchDriver {
    pub fn new(store: Store, config: PipelineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Loads the well-known ingredient file. A missing file is an open
    /// failure like any other.
    pub async fn run_ingredients(&self) -> Result<BatchReport, BatchError> {
        let path = self.config.ingredient_path();
        self.run_files(vec![(path, FileKind::Ingredients)]).await
    }

    /// Loads every `inventory_snapshot_*.csv` in the inbox in name order.
    pub async fn run_inventory(&self) -> Result<BatchReport, BatchError> {
        let files = self
            .discover_snapshots()?
            .into_iter()
            .map(|path| (path, FileKind::InventorySnapshot))
            .collect::<Vec<_>>();

        if files.is_empty() {
            info!(inbox = %self.config.inbox().display(), "No inventory snapshots to load");
        }

        self.run_files(files).await
    }

    /// Ingredients first (when the file is present), then snapshots.
    pub async fn run_all(&self) -> Result<BatchReport, BatchError> {
        let mut files = Vec::new();

        let ingredients = self.config.ingredient_path();
        if ingredients.exists() {
            files.push((ingredients, FileKind::Ingredients));
        } else {
            info!(file = %ingredients.display(), "No ingredient file, skipping");
        }

        files.extend(
            self.discover_snapshots()?
                .into_iter()
                .map(|path| (path, FileKind::InventorySnapshot)),
        );

        self.run_files(files).await
    }

    /// Snapshot files in the inbox, sorted by file name. A missing inbox is
    /// the same as an empty one.
    pub fn discover_snapshots(&self) -> Result<Vec<PathBuf>, BatchError> {
        let inbox = self.config.inbox();
        let entries = match fs::read_dir(&inbox) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(BatchError::Discover { dir: inbox, source }),
        };

        let mut files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|source| BatchError::Discover {
                    dir: inbox.clone(),
                    source,
                })?
                .path();
            if path.is_file() && self.config.is_snapshot_file(&path) {
                files.push(path);
            }
        }

        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    async fn run_files(&self, files: Vec<(PathBuf, FileKind)>) -> Result<BatchReport, BatchError> {
        let mut report = BatchReport::default();
        let mut rejected = Vec::new();

        for (path, kind) in files {
            let outcome = match kind {
                FileKind::Ingredients => load_ingredients(&self.store, &path).await,
                FileKind::InventorySnapshot => load_snapshots(&self.store, &path).await,
            };

            let state = FileState::after(&outcome);
            transition(&path, state, &self.config)?;

            match outcome {
                Ok(stats) => report.files.push(FileReport {
                    path,
                    kind,
                    state,
                    stats: Some(stats),
                }),
                Err(source) => {
                    error!(file = %path.display(), error = %source, "Load failed");
                    match self.config.policy {
                        FailurePolicy::Halt => return Err(BatchError::Load { path, source }),
                        FailurePolicy::Continue => {
                            rejected.push(path.clone());
                            report.files.push(FileReport {
                                path,
                                kind,
                                state,
                                stats: None,
                            });
                        }
                    }
                }
            }
        }

        info!(
            processed = report.processed(),
            rejected = report.rejected(),
            "Batch finished"
        );

        if !rejected.is_empty() {
            return Err(BatchError::FilesRejected { files: rejected });
        }

        Ok(report)
    }
}

