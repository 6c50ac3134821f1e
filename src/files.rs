use crate::config::PipelineConfig;
use crate::error::FileMoveError;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Inbox,
    Processed,
    Rejected,
}

impl FileState {
    /// Terminal state for a finished load. Only a committed file counts as
    /// processed; skipped rows do not matter here.
    pub fn after<T, E>(outcome: &Result<T, E>) -> Self {
        match outcome {
            Ok(_) => FileState::Processed,
            Err(_) => FileState::Rejected,
        }
    }

    fn directory(self, config: &PipelineConfig) -> Option<PathBuf> {
        match self {
            FileState::Inbox => None,
            FileState::Processed => Some(config.processed()),
            FileState::Rejected => Some(config.rejects()),
        }
    }
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileState::Inbox => write!(f, "inbox"),
            FileState::Processed => write!(f, "processed"),
            FileState::Rejected => write!(f, "rejects"),
        }
    }
}

/// Result of a transition request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Moved {
    To(PathBuf),
    /// The source was already moved or deleted before the decision.
    AlreadyGone,
    /// Asked to stay in the inbox; nothing was touched.
    Stayed,
}

/// Moves `path` into the directory for `state`, keeping its file name.
pub fn transition(
    path: &Path,
    state: FileState,
    config: &PipelineConfig,
) -> Result<Moved, FileMoveError> {
    let Some(dir) = state.directory(config) else {
        return Ok(Moved::Stayed);
    };

    let moved = move_into(path, &dir)?;
    match &moved {
        Moved::To(dest) => match state {
            FileState::Rejected => {
                warn!(file = %path.display(), dest = %dest.display(), "Moved to rejects")
            }
            _ => info!(file = %path.display(), dest = %dest.display(), "Moved to {}", state),
        },
        Moved::AlreadyGone => {
            debug!(file = %path.display(), %state, "Source already gone, nothing to move")
        }
        Moved::Stayed => {}
    }

    Ok(moved)
}

/// Creates `dir` if needed and renames `path` into it. A missing source is
/// not an error; an existing file of the same name in `dir` is never replaced.
pub fn move_into(path: &Path, dir: &Path) -> Result<Moved, FileMoveError> {
    if !path.exists() {
        return Ok(Moved::AlreadyGone);
    }

    fs::create_dir_all(dir).map_err(|source| FileMoveError::CreateDir {
        dir: dir.to_path_buf(),
        source,
    })?;

    let Some(name) = path.file_name() else {
        return Err(FileMoveError::Rename {
            from: path.to_path_buf(),
            to: dir.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        });
    };
    let dest = dir.join(name);

    if dest.exists() {
        return Err(FileMoveError::Rename {
            from: path.to_path_buf(),
            to: dest,
            source: io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists"),
        });
    }

    fs::rename(path, &dest).map_err(|source| FileMoveError::Rename {
        from: path.to_path_buf(),
        to: dest.clone(),
        source,
    })?;

    Ok(Moved::To(dest))
}
