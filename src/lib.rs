pub mod batch;
pub mod config;
pub mod error;
pub mod files;
pub mod ingredient;
pub mod loader;
pub mod logging;
pub mod snapshot;
pub mod store;
pub mod validate;


use crate::error::LoadError;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Opens a headered CSV file and yields one deserialized record per data row.
///
/// Opening is the only failure reported up front; structural problems in a
/// row (wrong field count, missing column, bad UTF-8) come out of the
/// iterator so the caller decides whether they are fatal.
pub fn stream_rows<T: DeserializeOwned>(
    path: &Path,
) -> Result<impl Iterator<Item = Result<T, LoadError>>, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(file);

    let path: PathBuf = path.to_path_buf();
    Ok(rdr.into_deserialize::<T>().map(move |result| {
        result.map_err(|source| LoadError::Csv {
            path: path.clone(),
            source,
        })
    }))
}
