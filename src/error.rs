use std::path::PathBuf;

use thiserror::Error;

/// A single row failed validation or lookup. The row is skipped and the file
/// keeps loading.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowError {
    #[error("missing field: {field}")]
    MissingField { field: &'static str },

    #[error("malformed date: {value:?} (expected YYYY-MM-DD)")]
    MalformedDate { value: String },

    #[error("malformed number: {value:?}")]
    MalformedNumber { value: String },

    #[error("negative quantity: {value}")]
    NegativeQuantity { value: String },

    #[error("quantity out of range: {value}")]
    QuantityOutOfRange { value: String },

    #[error("ingredient not found: {name:?}")]
    IngredientNotFound { name: String },
}

/// A whole file could not be loaded. Nothing from the file is committed.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse {}: {source}", .path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error("store error: {0}")]
    Store(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum FileMoveError {
    #[error("cannot create directory {}: {source}", .dir.display())]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot move {} to {}: {source}", .from.display(), .to.display())]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("failed to load {}: {source}", .path.display())]
    Load { path: PathBuf, source: LoadError },

    #[error(transparent)]
    Move(#[from] FileMoveError),

    #[error("cannot list inbox {}: {source}", .dir.display())]
    Discover {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("{} file(s) moved to rejects: {}", .files.len(), display_paths(.files))]
    FilesRejected { files: Vec<PathBuf> },
}

fn display_paths(files: &[PathBuf]) -> String {
    files
        .iter()
        .map(|f| f.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
